use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::audio::{ClipHandle, SessionHandle};

/// Recording lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    #[default]
    Idle,
    Recording(SessionHandle),
}

impl RecorderState {
    pub fn is_recording(&self) -> bool {
        matches!(self, RecorderState::Recording(_))
    }
}

/// A finished recording owned by the manager
#[derive(Debug, Clone)]
pub struct RecordedClip {
    pub handle: ClipHandle,
    pub recorded_at: DateTime<Utc>,
}

/// Public view of one recorded clip
#[derive(Debug, Clone, Serialize)]
pub struct ClipSummary {
    /// Zero-based replay index
    pub index: usize,
    /// One-based number shown on the button
    pub number: usize,
    pub recorded_at: DateTime<Utc>,
}

/// State and clip list read at a single instant
#[derive(Debug, Clone, Serialize)]
pub struct RecorderSnapshot {
    pub recording: bool,
    pub clips: Vec<ClipSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StartOutcome {
    Started,
    AlreadyRecording,
    /// Carries the notice the user must see
    PermissionDenied { notice: String },
    Failed,
    /// The manager has been torn down
    ShutDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StopOutcome {
    Saved { index: usize },
    NoClip,
    NotRecording,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlayOutcome {
    Played,
    InvalidIndex,
    Failed,
    ShutDown,
}

/// Result of releasing everything at shutdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeardownReport {
    pub released: usize,
    pub failed: usize,
    pub abandoned_session: bool,
}
