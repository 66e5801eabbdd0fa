pub mod audio;
pub mod config;
pub mod controls;
pub mod http;
pub mod recorder;

pub use audio::{
    AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFile, AudioFrame, AudioHost,
    AudioMode, AudioSource, ClipHandle, LocalHost, LocalHostSettings, Permission,
    RecordingPreset, SessionHandle,
};
pub use config::Config;
pub use controls::{press, Button, Control, PressOutcome};
pub use http::{create_router, AppState};
pub use recorder::{PlayOutcome, RecorderError, RecordingManager, StartOutcome, StopOutcome};
