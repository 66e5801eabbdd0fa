//! Clip playback into an output sink

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::backend::AudioFrame;
use super::file::AudioFile;
use super::host::ClipHandle;

/// One buffer of a playing clip, as delivered to the output
#[derive(Debug, Clone)]
pub struct PlaybackFrame {
    pub clip: ClipHandle,
    pub frame: AudioFrame,
    /// Set on the final buffer of the clip
    pub last: bool,
}

impl PlaybackFrame {
    /// Marker for a playback cut short by a replay or a release
    pub fn stopped(clip: ClipHandle, sample_rate: u32, channels: u16) -> Self {
        Self {
            clip,
            frame: AudioFrame {
                samples: Vec::new(),
                sample_rate,
                channels,
                timestamp_ms: 0,
            },
            last: true,
        }
    }

    pub fn is_stop_marker(&self) -> bool {
        self.last && self.frame.samples.is_empty()
    }
}

/// Stream `audio` into `sink` from the first sample, paced in real time
pub fn spawn_playback(
    clip: ClipHandle,
    audio: Arc<AudioFile>,
    buffer_duration_ms: u64,
    sink: mpsc::Sender<PlaybackFrame>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let channels = audio.channels.max(1) as usize;
        let frames_per_buffer = (audio.sample_rate as u64 * buffer_duration_ms / 1000).max(1) as usize;
        let chunks: Vec<&[i16]> = audio.samples.chunks(frames_per_buffer * channels).collect();
        let total = chunks.len();

        debug!("Playing {} ({} buffers)", clip, total);

        let mut ticker = tokio::time::interval(Duration::from_millis(buffer_duration_ms.max(1)));
        let mut timestamp_ms = 0u64;

        for (i, chunk) in chunks.into_iter().enumerate() {
            ticker.tick().await;

            let frame = PlaybackFrame {
                clip,
                frame: AudioFrame {
                    samples: chunk.to_vec(),
                    sample_rate: audio.sample_rate,
                    channels: audio.channels,
                    timestamp_ms,
                },
                last: i + 1 == total,
            };
            if sink.send(frame).await.is_err() {
                debug!("Playback sink closed");
                return;
            }
            timestamp_ms += buffer_duration_ms;
        }
    })
}

/// Peak/RMS accumulator for one clip
#[derive(Debug, Default, Clone, Copy)]
pub struct Levels {
    pub peak: i16,
    sum_squares: f64,
    count: usize,
}

impl Levels {
    pub fn add(&mut self, samples: &[i16]) {
        for &s in samples {
            self.peak = self.peak.max(s.saturating_abs());
            let v = s as f64 / i16::MAX as f64;
            self.sum_squares += v * v;
        }
        self.count += samples.len();
    }

    pub fn rms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.sum_squares / self.count as f64).sqrt()
        }
    }
}

/// Per-clip levels for the playback currently in flight
///
/// A frame stamped at 0 ms starts a new run, so a replay that interrupts an
/// earlier one never mixes the two.
#[derive(Debug, Default)]
pub struct LevelMeter {
    levels: HashMap<ClipHandle, Levels>,
}

impl LevelMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of clips with a run in progress
    pub fn in_flight(&self) -> usize {
        self.levels.len()
    }

    /// Feed one frame; returns the totals when a run completes
    pub fn observe(&mut self, played: &PlaybackFrame) -> Option<Levels> {
        if played.is_stop_marker() {
            if self.levels.remove(&played.clip).is_some() {
                debug!("Playback of {} stopped early", played.clip);
            }
            return None;
        }

        if played.frame.timestamp_ms == 0 {
            self.levels.remove(&played.clip);
        }
        self.levels
            .entry(played.clip)
            .or_default()
            .add(&played.frame.samples);

        if played.last {
            self.levels.remove(&played.clip)
        } else {
            None
        }
    }
}

/// Output stand-in for hosts without a speaker: logs levels per played clip
pub async fn run_level_meter(mut rx: mpsc::Receiver<PlaybackFrame>) {
    let mut meter = LevelMeter::new();

    while let Some(played) = rx.recv().await {
        if let Some(done) = meter.observe(&played) {
            info!(
                "Finished playing {}: peak {:.2}, rms {:.3}",
                played.clip,
                done.peak as f64 / i16::MAX as f64,
                done.rms()
            );
        }
    }
}
