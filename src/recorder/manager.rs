use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

use super::error::RecorderError;
use super::state::{
    ClipSummary, PlayOutcome, RecordedClip, RecorderSnapshot, RecorderState, StartOutcome,
    StopOutcome, TeardownReport,
};
use crate::audio::{AudioHost, AudioMode, ClipHandle, Permission, RecordingPreset, SessionHandle};

pub const PERMISSION_DENIED_NOTICE: &str = "Permission to access microphone denied!";

#[derive(Default)]
struct Shared {
    state: RecorderState,
    clips: Vec<RecordedClip>,
    /// Set by teardown; later presses are no-ops
    torn_down: bool,
}

/// Owns the recording lifecycle and every clip handle it creates
pub struct RecordingManager {
    host: Arc<dyn AudioHost>,

    /// Bundled sound for `play_prerecorded`
    asset: PathBuf,

    /// Single-flight guard: start/stop/teardown run one at a time
    flight: Mutex<()>,

    /// State + clip list; never held across a host call
    shared: RwLock<Shared>,

    /// Held across release-then-load so concurrent presses cannot leak a handle
    prerecorded: Mutex<Option<ClipHandle>>,
}

impl RecordingManager {
    pub fn new(host: Arc<dyn AudioHost>, asset: impl Into<PathBuf>) -> Self {
        Self {
            host,
            asset: asset.into(),
            flight: Mutex::new(()),
            shared: RwLock::new(Shared::default()),
            prerecorded: Mutex::new(None),
        }
    }

    pub async fn state(&self) -> RecorderState {
        self.shared.read().await.state
    }

    pub async fn is_recording(&self) -> bool {
        self.state().await.is_recording()
    }

    pub async fn clip_count(&self) -> usize {
        self.shared.read().await.clips.len()
    }

    /// Handles in recording order
    pub async fn clip_handles(&self) -> Vec<ClipHandle> {
        self.shared
            .read()
            .await
            .clips
            .iter()
            .map(|clip| clip.handle)
            .collect()
    }

    pub async fn snapshot(&self) -> RecorderSnapshot {
        let shared = self.shared.read().await;
        RecorderSnapshot {
            recording: shared.state.is_recording(),
            clips: shared
                .clips
                .iter()
                .enumerate()
                .map(|(index, clip)| ClipSummary {
                    index,
                    number: index + 1,
                    recorded_at: clip.recorded_at,
                })
                .collect(),
        }
    }

    /// Ask for the microphone and begin a high-quality recording
    pub async fn start_recording(&self) -> StartOutcome {
        let _flight = self.flight.lock().await;

        if self.is_torn_down().await {
            warn!("Ignoring record press after teardown");
            return StartOutcome::ShutDown;
        }

        if self.state().await.is_recording() {
            info!("Recording is already in progress");
            return StartOutcome::AlreadyRecording;
        }

        match self.open_session().await {
            Ok(session) => {
                self.shared.write().await.state = RecorderState::Recording(session);
                info!("Recording started ({})", session);
                StartOutcome::Started
            }
            Err(RecorderError::PermissionDenied) => {
                warn!("Microphone permission denied");
                StartOutcome::PermissionDenied {
                    notice: PERMISSION_DENIED_NOTICE.to_string(),
                }
            }
            Err(e) => {
                error!("Failed to start recording: {}", e);
                StartOutcome::Failed
            }
        }
    }

    async fn open_session(&self) -> Result<SessionHandle, RecorderError> {
        let permission = self
            .host
            .request_microphone_permission()
            .await
            .map_err(RecorderError::host("request_microphone_permission"))?;
        if permission != Permission::Granted {
            return Err(RecorderError::PermissionDenied);
        }

        self.host
            .configure_audio_mode(AudioMode::RECORDING)
            .await
            .map_err(RecorderError::host("configure_audio_mode"))?;

        self.host
            .begin_recording(RecordingPreset::HighQuality)
            .await
            .map_err(RecorderError::host("begin_recording"))
    }

    /// End the active recording and keep the result for replay
    pub async fn stop_recording(&self) -> StopOutcome {
        let _flight = self.flight.lock().await;

        let RecorderState::Recording(session) = self.state().await else {
            return StopOutcome::NotRecording;
        };

        match self.host.end_recording(session).await {
            Ok(Some(handle)) => {
                // Append and clear under one write lock
                let mut shared = self.shared.write().await;
                shared.clips.push(RecordedClip {
                    handle,
                    recorded_at: chrono::Utc::now(),
                });
                shared.state = RecorderState::Idle;
                let index = shared.clips.len() - 1;
                info!("Recorded sound {} saved ({})", index + 1, handle);
                StopOutcome::Saved { index }
            }
            Ok(None) => {
                warn!("{} ({})", RecorderError::EmptyResult, session);
                self.shared.write().await.state = RecorderState::Idle;
                StopOutcome::NoClip
            }
            Err(e) => {
                // The host consumes the session even when it fails
                error!(
                    "Failed to stop recording, abandoning {}: {}",
                    session,
                    RecorderError::host("end_recording")(e)
                );
                self.shared.write().await.state = RecorderState::Idle;
                StopOutcome::Failed
            }
        }
    }

    /// Load the bundled sound fresh and play it from the start
    ///
    /// The previous prerecorded clip, if any, is released first.
    pub async fn play_prerecorded(&self) -> PlayOutcome {
        let mut slot = self.prerecorded.lock().await;

        if self.is_torn_down().await {
            warn!("Ignoring prerecorded play after teardown");
            return PlayOutcome::ShutDown;
        }

        if let Some(previous) = slot.take() {
            if let Err(e) = self.host.release(previous).await {
                warn!("Failed to release previous prerecorded sound {}: {:#}", previous, e);
            }
        }

        let clip = match self.host.load_sound_asset(&self.asset).await {
            Ok(clip) => clip,
            Err(e) => {
                error!(
                    "Failed to play prerecorded sound: {}",
                    RecorderError::host("load_sound_asset")(e)
                );
                return PlayOutcome::Failed;
            }
        };
        *slot = Some(clip);

        match self.host.play(clip).await {
            Ok(()) => PlayOutcome::Played,
            Err(e) => {
                error!(
                    "Failed to play prerecorded sound: {}",
                    RecorderError::host("play")(e)
                );
                PlayOutcome::Failed
            }
        }
    }

    /// Replay recorded clip `index` (zero-based, recording order) from its beginning
    pub async fn play_recorded(&self, index: usize) -> PlayOutcome {
        let handle = {
            let shared = self.shared.read().await;
            if shared.torn_down {
                warn!("Ignoring recorded play after teardown");
                return PlayOutcome::ShutDown;
            }
            match shared.clips.get(index) {
                Some(clip) => clip.handle,
                None => {
                    warn!(
                        "{}",
                        RecorderError::InvalidIndex {
                            index,
                            len: shared.clips.len()
                        }
                    );
                    return PlayOutcome::InvalidIndex;
                }
            }
        };

        match self.host.replay(handle).await {
            Ok(()) => PlayOutcome::Played,
            Err(e) => {
                error!(
                    "Failed to play recorded sound: {}",
                    RecorderError::host("replay")(e)
                );
                PlayOutcome::Failed
            }
        }
    }

    async fn is_torn_down(&self) -> bool {
        self.shared.read().await.torn_down
    }

    /// Release every clip handle exactly once
    ///
    /// An active session is abandoned, not stopped. Afterwards every press
    /// is a no-op and a second call finds nothing left to release.
    pub async fn teardown(&self) -> TeardownReport {
        let _flight = self.flight.lock().await;
        let mut report = TeardownReport::default();

        let (state, clips) = {
            let mut shared = self.shared.write().await;
            shared.torn_down = true;
            let state = std::mem::take(&mut shared.state);
            (state, std::mem::take(&mut shared.clips))
        };

        if let RecorderState::Recording(session) = state {
            warn!("Tearing down with {} still active; abandoning it", session);
            report.abandoned_session = true;
        }

        let prerecorded = self.prerecorded.lock().await.take();
        let handles = prerecorded
            .into_iter()
            .chain(clips.into_iter().map(|clip| clip.handle));

        for handle in handles {
            match self.host.release(handle).await {
                Ok(()) => report.released += 1,
                Err(e) => {
                    warn!("Failed to release {}: {:#}", handle, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Teardown complete: {} released, {} failed",
            report.released, report.failed
        );
        report
    }
}

impl Drop for RecordingManager {
    fn drop(&mut self) {
        let unreleased = self.shared.get_mut().clips.len()
            + usize::from(self.prerecorded.get_mut().is_some());
        if unreleased > 0 {
            warn!(
                "Recording manager dropped with {} unreleased sound(s); call teardown first",
                unreleased
            );
        }
    }
}
