pub mod backend;
pub mod file;
pub mod host;
pub mod local;
pub mod playback;
pub mod sources;
pub mod writer;

pub use backend::{AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame, AudioSource};
pub use file::AudioFile;
pub use host::{AudioHost, AudioMode, ClipHandle, Permission, RecordingPreset, SessionHandle};
pub use local::{LocalHost, LocalHostSettings};
pub use playback::{run_level_meter, LevelMeter, Levels, PlaybackFrame};
pub use writer::{ClipMetadata, ClipRecorder};
