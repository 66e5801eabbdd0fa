use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::backend::AudioFrame;

/// What ended up on disk for one recording
#[derive(Debug, Clone)]
pub struct ClipMetadata {
    /// WAV file holding the clip
    pub file_path: PathBuf,
    /// Sample rate
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Number of samples written (all channels)
    pub sample_count: usize,
    /// Timestamp of the last frame, relative to the first
    pub duration_ms: u64,
}

/// Drains a capture channel into a single WAV file
///
/// The file is created on the first frame, so a capture that produced
/// nothing leaves nothing behind.
pub struct ClipRecorder {
    file_path: PathBuf,
}

impl ClipRecorder {
    pub fn new(file_path: PathBuf) -> Result<Self> {
        if let Some(dir) = file_path.parent() {
            fs::create_dir_all(dir).context("Failed to create recordings directory")?;
        }
        Ok(Self { file_path })
    }

    /// Record until the sender side closes
    ///
    /// Returns `None` when no samples arrived.
    pub async fn record(self, mut audio_rx: mpsc::Receiver<AudioFrame>) -> Result<Option<ClipMetadata>> {
        let mut writer: Option<ClipWriter> = None;
        let mut first_ms = None;

        while let Some(frame) = audio_rx.recv().await {
            if frame.samples.is_empty() {
                continue;
            }
            let start_ms = *first_ms.get_or_insert(frame.timestamp_ms);

            if writer.is_none() {
                writer = Some(ClipWriter::new(
                    self.file_path.clone(),
                    frame.sample_rate,
                    frame.channels,
                )?);
            }
            let Some(current) = writer.as_mut() else {
                continue;
            };

            if frame.channels != current.metadata.channels {
                warn!(
                    "Dropping frame with {} channels in a {} channel clip",
                    frame.channels, current.metadata.channels
                );
                continue;
            }

            current.write_frame(&frame, start_ms)?;
        }

        match writer {
            Some(writer) => {
                let metadata = writer.finish()?;
                info!(
                    "Clip complete: {} ({:.1}s, {} samples)",
                    metadata.file_path.display(),
                    metadata.duration_ms as f64 / 1000.0,
                    metadata.sample_count
                );
                Ok(Some(metadata))
            }
            None => {
                info!("Capture ended without audio");
                Ok(None)
            }
        }
    }
}

/// Writes a single clip to disk as WAV file
struct ClipWriter {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    metadata: ClipMetadata,
}

impl ClipWriter {
    fn new(file_path: PathBuf, sample_rate: u32, channels: u16) -> Result<Self> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let writer = hound::WavWriter::create(&file_path, spec)
            .with_context(|| format!("Failed to create WAV file: {:?}", file_path))?;

        Ok(Self {
            writer: Some(writer),
            metadata: ClipMetadata {
                file_path,
                sample_rate,
                channels,
                sample_count: 0,
                duration_ms: 0,
            },
        })
    }

    fn write_frame(&mut self, frame: &AudioFrame, start_ms: u64) -> Result<()> {
        if let Some(writer) = &mut self.writer {
            for &sample in &frame.samples {
                writer
                    .write_sample(sample)
                    .context("Failed to write sample to WAV")?;
            }

            self.metadata.duration_ms = frame.timestamp_ms.saturating_sub(start_ms);
            self.metadata.sample_count += frame.samples.len();
        }

        Ok(())
    }

    fn finish(mut self) -> Result<ClipMetadata> {
        if let Some(writer) = self.writer.take() {
            writer.finalize().context("Failed to finalize WAV file")?;
        }

        Ok(self.metadata.clone())
    }
}

impl Drop for ClipWriter {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.finalize() {
                warn!("Failed to finalize WAV writer on drop: {}", e);
            }
        }
    }
}
