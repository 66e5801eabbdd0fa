//! Desktop implementation of the audio host
//!
//! Captures through an [`AudioBackend`], stores each recording as a WAV file
//! and plays clips into a [`PlaybackFrame`] sink.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::backend::{AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioSource};
use super::file::AudioFile;
use super::host::{AudioHost, AudioMode, ClipHandle, Permission, RecordingPreset, SessionHandle};
use super::playback::{spawn_playback, PlaybackFrame};
use super::writer::{ClipMetadata, ClipRecorder};
use crate::config::{AudioConfig, PermissionPolicy};

/// Settings for [`LocalHost`]
#[derive(Debug, Clone)]
pub struct LocalHostSettings {
    /// Where recorded WAV files go
    pub recordings_path: PathBuf,
    /// What the "microphone" is
    pub input: AudioSource,
    /// How permission requests are answered
    pub permission: PermissionPolicy,
    /// Capture and playback buffer size
    pub buffer_duration_ms: u64,
}

impl From<&AudioConfig> for LocalHostSettings {
    fn from(config: &AudioConfig) -> Self {
        Self {
            recordings_path: config.recordings_path.clone(),
            input: config.input_source(),
            permission: config.permission,
            buffer_duration_ms: config.buffer_duration_ms,
        }
    }
}

struct ActiveCapture {
    backend: Box<dyn AudioBackend>,
    writer: JoinHandle<Result<Option<ClipMetadata>>>,
}

struct LoadedClip {
    audio: Arc<AudioFile>,
    playback: Option<JoinHandle<()>>,
}

impl LoadedClip {
    /// Abort any running playback; tells the sink if it was cut short
    fn stop_playback(&mut self, clip: ClipHandle, sink: &mpsc::Sender<PlaybackFrame>) {
        let Some(task) = self.playback.take() else {
            return;
        };
        if task.is_finished() {
            return;
        }
        task.abort();

        let marker = PlaybackFrame::stopped(clip, self.audio.sample_rate, self.audio.channels);
        if sink.try_send(marker).is_err() {
            debug!("Playback sink busy; stop marker for {} dropped", clip);
        }
    }
}

pub struct LocalHost {
    settings: LocalHostSettings,
    sink: mpsc::Sender<PlaybackFrame>,
    mode: Mutex<Option<AudioMode>>,
    next_id: AtomicU64,
    captures: Mutex<HashMap<SessionHandle, ActiveCapture>>,
    clips: Mutex<HashMap<ClipHandle, LoadedClip>>,
}

impl LocalHost {
    pub fn new(settings: LocalHostSettings, sink: mpsc::Sender<PlaybackFrame>) -> Self {
        info!(
            "Local audio host: input {:?}, recordings in {}",
            settings.input,
            settings.recordings_path.display()
        );

        Self {
            settings,
            sink,
            mode: Mutex::new(None),
            next_id: AtomicU64::new(1),
            captures: Mutex::new(HashMap::new()),
            clips: Mutex::new(HashMap::new()),
        }
    }

    /// Number of clips currently loaded (not yet released)
    pub async fn loaded_clips(&self) -> usize {
        self.clips.lock().await.len()
    }

    /// Duration of a loaded clip in seconds
    pub async fn clip_duration(&self, clip: ClipHandle) -> Option<f64> {
        self.clips
            .lock()
            .await
            .get(&clip)
            .map(|loaded| loaded.audio.duration_seconds)
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    async fn register(&self, audio: AudioFile) -> ClipHandle {
        let handle = ClipHandle::new(self.next_id());
        let loaded = LoadedClip {
            audio: Arc::new(audio),
            playback: None,
        };
        self.clips.lock().await.insert(handle, loaded);
        handle
    }

    async fn start_playback(&self, clip: ClipHandle) -> Result<()> {
        let mut clips = self.clips.lock().await;
        let loaded = clips
            .get_mut(&clip)
            .with_context(|| format!("{} is not loaded", clip))?;

        loaded.stop_playback(clip, &self.sink);
        loaded.playback = Some(spawn_playback(
            clip,
            Arc::clone(&loaded.audio),
            self.settings.buffer_duration_ms,
            self.sink.clone(),
        ));
        Ok(())
    }
}

#[async_trait::async_trait]
impl AudioHost for LocalHost {
    async fn request_microphone_permission(&self) -> Result<Permission> {
        let permission = match self.settings.permission {
            PermissionPolicy::Granted => Permission::Granted,
            PermissionPolicy::Denied => Permission::Denied,
        };
        debug!("Microphone permission: {:?}", permission);
        Ok(permission)
    }

    async fn configure_audio_mode(&self, mode: AudioMode) -> Result<()> {
        debug!("Audio mode: {:?}", mode);
        *self.mode.lock().await = Some(mode);
        Ok(())
    }

    async fn begin_recording(&self, preset: RecordingPreset) -> Result<SessionHandle> {
        let recording_enabled = self
            .mode
            .lock()
            .await
            .is_some_and(|mode| mode.recording_enabled);
        if !recording_enabled {
            anyhow::bail!("Audio mode does not allow recording");
        }

        let config = AudioBackendConfig {
            target_sample_rate: preset.sample_rate(),
            target_channels: preset.channels(),
            buffer_duration_ms: self.settings.buffer_duration_ms,
        };
        let mut backend = AudioBackendFactory::create(&self.settings.input, config)
            .context("Failed to create capture backend")?;

        let file_path = self
            .settings
            .recordings_path
            .join(format!("{}.wav", uuid::Uuid::new_v4()));
        let recorder = ClipRecorder::new(file_path)?;

        let audio_rx = backend
            .start()
            .await
            .context("Failed to start audio capture")?;
        let writer = tokio::spawn(recorder.record(audio_rx));

        let session = SessionHandle::new(self.next_id());
        info!("Recording {} started on {} backend", session, backend.name());

        self.captures
            .lock()
            .await
            .insert(session, ActiveCapture { backend, writer });
        Ok(session)
    }

    async fn end_recording(&self, session: SessionHandle) -> Result<Option<ClipHandle>> {
        let mut capture = self
            .captures
            .lock()
            .await
            .remove(&session)
            .with_context(|| format!("{} is not recording", session))?;

        capture.backend.stop().await?;
        let metadata = capture
            .writer
            .await
            .context("Clip writer task panicked")??;

        let Some(metadata) = metadata else {
            warn!("{} captured no audio", session);
            return Ok(None);
        };

        let audio = AudioFile::open(&metadata.file_path)?;
        let clip = self.register(audio).await;
        info!("{} saved as {} ({})", session, clip, metadata.file_path.display());
        Ok(Some(clip))
    }

    async fn load_sound_asset(&self, asset: &Path) -> Result<ClipHandle> {
        let audio = AudioFile::load(asset)?;
        let clip = self.register(audio).await;
        debug!("Asset {} loaded as {}", asset.display(), clip);
        Ok(clip)
    }

    async fn play(&self, clip: ClipHandle) -> Result<()> {
        self.start_playback(clip).await
    }

    async fn replay(&self, clip: ClipHandle) -> Result<()> {
        self.start_playback(clip).await
    }

    async fn release(&self, clip: ClipHandle) -> Result<()> {
        let mut loaded = self
            .clips
            .lock()
            .await
            .remove(&clip)
            .with_context(|| format!("{} was already released", clip))?;
        loaded.stop_playback(clip, &self.sink);
        debug!("Released {}", clip);
        Ok(())
    }
}
