//! Recording lifecycle and clip ownership
//!
//! This module provides the `RecordingManager` that:
//! - Guards the Idle/Recording state machine against overlapping presses
//! - Turns stopped sessions into an append-only list of playable clips
//! - Owns every clip handle and releases each one exactly once at teardown

mod error;
mod manager;
mod state;

pub use error::RecorderError;
pub use manager::{RecordingManager, PERMISSION_DENIED_NOTICE};
pub use state::{
    ClipSummary, PlayOutcome, RecordedClip, RecorderSnapshot, RecorderState, StartOutcome,
    StopOutcome, TeardownReport,
};
