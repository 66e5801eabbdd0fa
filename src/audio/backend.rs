use anyhow::Result;
use std::path::PathBuf;
use tokio::sync::mpsc;

use super::sources::{FileBackend, ToneBackend};

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture (or playback) started
    pub timestamp_ms: u64,
}

impl AudioFrame {
    /// Number of sample frames (samples per channel) in this buffer
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }
}

/// Configuration for a capture backend
#[derive(Debug, Clone)]
pub struct AudioBackendConfig {
    /// Sample rate the backend should produce
    pub target_sample_rate: u32,
    /// Channel count (1 = mono, 2 = stereo)
    pub target_channels: u16,
    /// Buffer size in milliseconds (affects latency)
    pub buffer_duration_ms: u64,
}

impl Default for AudioBackendConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 44100,
            target_channels: 2,
            buffer_duration_ms: 100,
        }
    }
}

impl AudioBackendConfig {
    /// Samples (all channels) in one buffer
    pub fn samples_per_buffer(&self) -> usize {
        let frames = self.target_sample_rate as u64 * self.buffer_duration_ms / 1000;
        (frames.max(1) * self.target_channels.max(1) as u64) as usize
    }
}

/// Audio capture backend trait
///
/// Implementations:
/// - Tone: generated sine signal (default microphone stand-in)
/// - File: loops a WAV file as if it were live input
#[async_trait::async_trait]
pub trait AudioBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames. The channel
    /// closes once the backend has been stopped or runs out of input.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing audio
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Audio backend factory
pub struct AudioBackendFactory;

impl AudioBackendFactory {
    /// Create a capture backend for the configured input
    pub fn create(source: &AudioSource, config: AudioBackendConfig) -> Result<Box<dyn AudioBackend>> {
        match source {
            AudioSource::Tone { frequency_hz } => {
                Ok(Box::new(ToneBackend::new(*frequency_hz, config)))
            }

            AudioSource::File(path) => {
                if !path.exists() {
                    anyhow::bail!("Input file not found: {}", path.display());
                }
                Ok(Box::new(FileBackend::new(path.clone(), config)))
            }
        }
    }
}

/// Where captured audio comes from
#[derive(Debug, Clone, PartialEq)]
pub enum AudioSource {
    /// Generated sine tone
    Tone { frequency_hz: f32 },
    /// WAV file replayed as live input
    File(PathBuf),
}
