//! The platform audio capability the recorder talks to.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Opaque handle to an in-progress recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionHandle(u64);

impl SessionHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Opaque handle to a loaded, playable sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ClipHandle(u64);

impl ClipHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ClipHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clip#{}", self.0)
    }
}

/// Answer to a microphone permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
}

/// Session-wide audio routing options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioMode {
    /// Allow the input to be opened while output is active
    pub recording_enabled: bool,
    /// Keep playing when the device ringer is switched to silent
    pub silent_mode_playback_enabled: bool,
}

impl AudioMode {
    /// Mode needed before a recording can begin
    pub const RECORDING: AudioMode = AudioMode {
        recording_enabled: true,
        silent_mode_playback_enabled: true,
    };
}

/// Capture quality presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingPreset {
    HighQuality,
    LowQuality,
}

impl RecordingPreset {
    pub fn sample_rate(&self) -> u32 {
        match self {
            RecordingPreset::HighQuality => 44100,
            RecordingPreset::LowQuality => 22050,
        }
    }

    pub fn channels(&self) -> u16 {
        match self {
            RecordingPreset::HighQuality => 2,
            RecordingPreset::LowQuality => 1,
        }
    }
}

/// Audio capability provided by the platform
///
/// Every call may suspend on device I/O or a permission prompt. Handles
/// returned from `end_recording` and `load_sound_asset` belong to the caller
/// until passed to `release`.
#[async_trait::async_trait]
pub trait AudioHost: Send + Sync {
    async fn request_microphone_permission(&self) -> Result<Permission>;

    async fn configure_audio_mode(&self, mode: AudioMode) -> Result<()>;

    async fn begin_recording(&self, preset: RecordingPreset) -> Result<SessionHandle>;

    /// Stop the session and load what it captured
    ///
    /// `Ok(None)` means the session ended without producing a usable clip.
    /// The session is consumed either way, including when this returns `Err`.
    async fn end_recording(&self, session: SessionHandle) -> Result<Option<ClipHandle>>;

    async fn load_sound_asset(&self, asset: &Path) -> Result<ClipHandle>;

    /// Play from the start
    async fn play(&self, clip: ClipHandle) -> Result<()>;

    /// Play an already-loaded clip again from the start
    async fn replay(&self, clip: ClipHandle) -> Result<()>;

    async fn release(&self, clip: ClipHandle) -> Result<()>;
}
