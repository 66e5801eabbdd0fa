use super::state::AppState;
use crate::controls::{self, Button, Control, PressOutcome};
use crate::recorder::{ClipSummary, PlayOutcome};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::{info, warn};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ControlsResponse {
    pub recording: bool,
    pub controls: Vec<Control>,
}

#[derive(Debug, Serialize)]
pub struct PressResponse {
    #[serde(flatten)]
    pub outcome: PressOutcome,
    /// Blocking notice for the user (permission denial only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub recording: bool,
    pub controls: Vec<Control>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn respond(state: &AppState, outcome: PressOutcome) -> Json<PressResponse> {
    let snapshot = state.manager.snapshot().await;
    let notice = outcome.notice().map(str::to_string);
    Json(PressResponse {
        outcome,
        notice,
        recording: snapshot.recording,
        controls: controls::controls(&snapshot),
    })
}

/// GET /controls
pub async fn get_controls(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.manager.snapshot().await;
    Json(ControlsResponse {
        recording: snapshot.recording,
        controls: controls::controls(&snapshot),
    })
}

/// POST /controls/record
/// Start or stop recording depending on the current state
pub async fn toggle_recording(State(state): State<AppState>) -> impl IntoResponse {
    info!("Record button pressed");
    let outcome = controls::press(&state.manager, Button::ToggleRecording).await;
    respond(&state, outcome).await
}

/// POST /controls/prerecorded
pub async fn play_prerecorded(State(state): State<AppState>) -> impl IntoResponse {
    info!("Play prerecorded button pressed");
    let outcome = controls::press(&state.manager, Button::PlayPrerecorded).await;
    respond(&state, outcome).await
}

/// POST /controls/recordings/:number
/// Replay "Play Recorded Sound {number}"
pub async fn play_recorded(
    State(state): State<AppState>,
    Path(number): Path<usize>,
) -> impl IntoResponse {
    info!("Play recorded sound {} pressed", number);
    let outcome = match number.checked_sub(1) {
        Some(index) => controls::press(&state.manager, Button::PlayRecorded(index)).await,
        None => {
            warn!("Recorded sounds are numbered from 1");
            PressOutcome::Play(PlayOutcome::InvalidIndex)
        }
    };
    respond(&state, outcome).await
}

/// GET /recordings
pub async fn list_recordings(State(state): State<AppState>) -> impl IntoResponse {
    let clips: Vec<ClipSummary> = state.manager.snapshot().await.clips;
    (StatusCode::OK, Json(clips))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
