//! Capture backends that stand in for a microphone on hosts without one.

use anyhow::{Context, Result};
use std::f32::consts::TAU;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::backend::{AudioBackend, AudioBackendConfig, AudioFrame};
use super::file::AudioFile;

const TONE_AMPLITUDE: f32 = 0.25;

/// Sine tone generator
pub struct ToneBackend {
    frequency_hz: f32,
    config: AudioBackendConfig,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl ToneBackend {
    pub fn new(frequency_hz: f32, config: AudioBackendConfig) -> Self {
        Self {
            frequency_hz,
            config,
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }
}

#[async_trait::async_trait]
impl AudioBackend for ToneBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.running.swap(true, Ordering::SeqCst) {
            anyhow::bail!("Tone backend is already capturing");
        }

        let (tx, rx) = mpsc::channel(32);
        let running = Arc::clone(&self.running);
        let config = self.config.clone();
        let step = TAU * self.frequency_hz / config.target_sample_rate as f32;
        let channels = config.target_channels.max(1) as usize;
        let frames_per_buffer = config.samples_per_buffer() / channels;

        info!(
            "Tone capture started: {:.0}Hz, {}Hz, {} channels",
            self.frequency_hz, config.target_sample_rate, channels
        );

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(config.buffer_duration_ms.max(1)));
            let mut phase = 0.0f32;
            let mut timestamp_ms = 0u64;

            loop {
                ticker.tick().await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                let mut samples = Vec::with_capacity(frames_per_buffer * channels);
                for _ in 0..frames_per_buffer {
                    let value = (phase.sin() * TONE_AMPLITUDE * i16::MAX as f32) as i16;
                    samples.extend(std::iter::repeat(value).take(channels));
                    phase = (phase + step) % TAU;
                }

                let frame = AudioFrame {
                    samples,
                    sample_rate: config.target_sample_rate,
                    channels: config.target_channels,
                    timestamp_ms,
                };
                if tx.send(frame).await.is_err() {
                    debug!("Tone receiver dropped");
                    break;
                }
                timestamp_ms += config.buffer_duration_ms;
            }
        }));

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.await.context("Tone capture task panicked")?;
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "tone"
    }
}

/// Replays a WAV file in a loop, paced like a live input
pub struct FileBackend {
    path: PathBuf,
    config: AudioBackendConfig,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl FileBackend {
    pub fn new(path: PathBuf, config: AudioBackendConfig) -> Self {
        Self {
            path,
            config,
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }
}

#[async_trait::async_trait]
impl AudioBackend for FileBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.running.load(Ordering::SeqCst) {
            anyhow::bail!("File backend is already capturing");
        }

        let audio = AudioFile::open(&self.path)?;
        let (tx, rx) = mpsc::channel(32);

        if audio.samples.is_empty() {
            warn!("Input file {} has no samples", self.path.display());
            return Ok(rx);
        }

        if audio.sample_rate != self.config.target_sample_rate
            || audio.channels != self.config.target_channels
        {
            debug!(
                "Input file is {}Hz/{}ch, preset asks for {}Hz/{}ch; passing through",
                audio.sample_rate,
                audio.channels,
                self.config.target_sample_rate,
                self.config.target_channels
            );
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let buffer_ms = self.config.buffer_duration_ms;
        let channels = audio.channels.max(1) as usize;
        let frames_per_buffer = (audio.sample_rate as u64 * buffer_ms / 1000).max(1) as usize;
        let chunk_len = frames_per_buffer * channels;

        info!("File capture started: {}", self.path.display());

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(buffer_ms.max(1)));
            let mut timestamp_ms = 0u64;

            for chunk in audio.samples.chunks(chunk_len).cycle() {
                ticker.tick().await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                let frame = AudioFrame {
                    samples: chunk.to_vec(),
                    sample_rate: audio.sample_rate,
                    channels: audio.channels,
                    timestamp_ms,
                };
                if tx.send(frame).await.is_err() {
                    break;
                }
                timestamp_ms += buffer_ms;
            }
        }));

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.await.context("File capture task panicked")?;
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "file"
    }
}
