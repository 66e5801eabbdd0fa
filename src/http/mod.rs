//! HTTP surface for the three controls
//!
//! - GET /controls - Visible buttons and recording state
//! - POST /controls/record - Toggle recording
//! - POST /controls/prerecorded - Play the bundled sound
//! - POST /controls/recordings/:n - Replay recorded sound n (1-based)
//! - GET /recordings - Recorded clip list
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
