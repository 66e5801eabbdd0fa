use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

use crate::audio::AudioSource;

const DEFAULT_CONFIG: &str = "config/voice-memos";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    pub recordings_path: PathBuf,
    pub asset_path: PathBuf,
    /// `tone`, or a path to a WAV file used as the microphone
    pub input: String,
    pub tone_hz: f32,
    pub buffer_duration_ms: u64,
    pub permission: PermissionPolicy,
}

/// How the local host answers microphone permission requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionPolicy {
    Granted,
    Denied,
}

impl AudioConfig {
    pub fn input_source(&self) -> AudioSource {
        if self.input.eq_ignore_ascii_case("tone") {
            AudioSource::Tone {
                frequency_hz: self.tone_hz,
            }
        } else {
            AudioSource::File(PathBuf::from(&self.input))
        }
    }
}

impl Config {
    /// Defaults, then the TOML file, then `VOICE_MEMOS_<SECTION>__<KEY>`
    /// environment variables (`__` separates nested keys).
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::with_name(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG).required(false),
        };

        let settings = config::Config::builder()
            .set_default("service.name", "voice-memos")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 8750i64)?
            .set_default("audio.recordings_path", "recordings")?
            .set_default("audio.asset_path", "assets/sounds/sound.wav")?
            .set_default("audio.input", "tone")?
            .set_default("audio.tone_hz", 440.0)?
            .set_default("audio.buffer_duration_ms", 100i64)?
            .set_default("audio.permission", "granted")?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("VOICE_MEMOS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
