//! The three-button surface: labels derived from recorder state, presses
//! dispatched to recorder operations.

use serde::Serialize;

use crate::recorder::{PlayOutcome, RecorderSnapshot, RecordingManager, StartOutcome, StopOutcome};

/// A press the user can make
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Start when idle, stop when recording
    ToggleRecording,
    PlayPrerecorded,
    /// Zero-based index into the recorded clips
    PlayRecorded(usize),
}

/// One visible button
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Control {
    pub label: String,
    /// Where the HTTP surface accepts the press
    pub action: String,
}

/// Buttons in display order: toggle, prerecorded, then one per clip
pub fn controls(snapshot: &RecorderSnapshot) -> Vec<Control> {
    let toggle = if snapshot.recording {
        "Stop Recording"
    } else {
        "Start Recording"
    };

    let mut controls = vec![
        Control {
            label: toggle.to_string(),
            action: "/controls/record".to_string(),
        },
        Control {
            label: "Play Prerecorded Sound".to_string(),
            action: "/controls/prerecorded".to_string(),
        },
    ];

    controls.extend(snapshot.clips.iter().map(|clip| Control {
        label: format!("Play Recorded Sound {}", clip.number),
        action: format!("/controls/recordings/{}", clip.number),
    }));

    controls
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PressOutcome {
    Start(StartOutcome),
    Stop(StopOutcome),
    Play(PlayOutcome),
}

impl PressOutcome {
    /// Text that must be shown to the user, if any
    pub fn notice(&self) -> Option<&str> {
        match self {
            PressOutcome::Start(StartOutcome::PermissionDenied { notice }) => Some(notice.as_str()),
            _ => None,
        }
    }
}

/// Dispatch a button press
pub async fn press(manager: &RecordingManager, button: Button) -> PressOutcome {
    match button {
        Button::ToggleRecording => {
            if manager.is_recording().await {
                PressOutcome::Stop(manager.stop_recording().await)
            } else {
                PressOutcome::Start(manager.start_recording().await)
            }
        }
        Button::PlayPrerecorded => PressOutcome::Play(manager.play_prerecorded().await),
        Button::PlayRecorded(index) => PressOutcome::Play(manager.play_recorded(index).await),
    }
}
