// Integration tests for the local audio host
//
// These drive real capture backends into WAV files on disk and play the
// results back into a playback channel.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use voice_memos::audio::{
    AudioHost, AudioMode, AudioSource, LocalHost, LocalHostSettings, Permission, PlaybackFrame,
    RecordingPreset,
};
use voice_memos::config::PermissionPolicy;
use voice_memos::recorder::{PlayOutcome, RecordingManager, StartOutcome, StopOutcome};

fn settings(dir: &Path, input: AudioSource) -> LocalHostSettings {
    LocalHostSettings {
        recordings_path: dir.join("recordings"),
        input,
        permission: PermissionPolicy::Granted,
        buffer_duration_ms: 20,
    }
}

fn tone() -> AudioSource {
    AudioSource::Tone { frequency_hz: 440.0 }
}

fn write_wav(path: &PathBuf, samples: &[i16]) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &s in samples {
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    Ok(())
}

fn wav_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|e| e == "wav"))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_permission_follows_policy() -> Result<()> {
    let dir = TempDir::new()?;
    let (tx, _rx) = mpsc::channel(8);

    let mut denied = settings(dir.path(), tone());
    denied.permission = PermissionPolicy::Denied;
    let host = LocalHost::new(denied, tx.clone());
    assert_eq!(host.request_microphone_permission().await?, Permission::Denied);

    let host = LocalHost::new(settings(dir.path(), tone()), tx);
    assert_eq!(host.request_microphone_permission().await?, Permission::Granted);
    Ok(())
}

#[tokio::test]
async fn test_recording_requires_recording_mode() -> Result<()> {
    let dir = TempDir::new()?;
    let (tx, _rx) = mpsc::channel(8);
    let host = LocalHost::new(settings(dir.path(), tone()), tx);

    assert!(host.begin_recording(RecordingPreset::HighQuality).await.is_err());

    host.configure_audio_mode(AudioMode {
        recording_enabled: false,
        silent_mode_playback_enabled: true,
    })
    .await?;
    assert!(host.begin_recording(RecordingPreset::HighQuality).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_tone_recording_round_trip() -> Result<()> {
    let dir = TempDir::new()?;
    let (tx, mut rx) = mpsc::channel(256);
    let host = LocalHost::new(settings(dir.path(), tone()), tx);

    host.configure_audio_mode(AudioMode::RECORDING).await?;
    let session = host.begin_recording(RecordingPreset::HighQuality).await?;
    tokio::time::sleep(Duration::from_millis(120)).await;
    let clip = host.end_recording(session).await?.expect("tone clip");

    let files = wav_files(&dir.path().join("recordings"));
    assert_eq!(files.len(), 1);
    let reader = hound::WavReader::open(&files[0])?;
    assert_eq!(reader.spec().sample_rate, 44100);
    assert_eq!(reader.spec().channels, 2);
    assert!(reader.len() > 0);

    assert!(host.clip_duration(clip).await.is_some_and(|d| d > 0.0));

    host.replay(clip).await?;
    let first: PlaybackFrame = rx.recv().await.expect("playback frame");
    assert_eq!(first.clip, clip);
    assert_eq!(first.frame.timestamp_ms, 0);

    host.release(clip).await?;
    assert_eq!(host.loaded_clips().await, 0);
    assert!(host.release(clip).await.is_err(), "double release must fail");
    Ok(())
}

#[tokio::test]
async fn test_silent_input_yields_no_clip() -> Result<()> {
    let dir = TempDir::new()?;
    let input = dir.path().join("empty.wav");
    write_wav(&input, &[])?;

    let (tx, _rx) = mpsc::channel(8);
    let host = LocalHost::new(settings(dir.path(), AudioSource::File(input)), tx);
    host.configure_audio_mode(AudioMode::RECORDING).await?;

    let session = host.begin_recording(RecordingPreset::LowQuality).await?;
    assert!(host.end_recording(session).await?.is_none());
    assert!(wav_files(&dir.path().join("recordings")).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_missing_input_file_fails_to_begin() -> Result<()> {
    let dir = TempDir::new()?;
    let (tx, _rx) = mpsc::channel(8);
    let host = LocalHost::new(
        settings(dir.path(), AudioSource::File(dir.path().join("absent.wav"))),
        tx,
    );
    host.configure_audio_mode(AudioMode::RECORDING).await?;

    assert!(host.begin_recording(RecordingPreset::HighQuality).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_end_unknown_session_fails() -> Result<()> {
    let dir = TempDir::new()?;
    let (tx, _rx) = mpsc::channel(8);
    let host = LocalHost::new(settings(dir.path(), tone()), tx);

    let session = voice_memos::audio::SessionHandle::new(99);
    assert!(host.end_recording(session).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_asset_plays_from_the_start() -> Result<()> {
    let dir = TempDir::new()?;
    let asset = dir.path().join("chime.wav");
    let samples: Vec<i16> = (0..800).map(|i| (i % 100) as i16 * 100).collect();
    write_wav(&asset, &samples)?;

    let (tx, mut rx) = mpsc::channel(256);
    let host = LocalHost::new(settings(dir.path(), tone()), tx);

    let clip = host.load_sound_asset(&asset).await?;
    host.play(clip).await?;

    let mut played = Vec::new();
    while let Some(frame) = rx.recv().await {
        played.extend(frame.frame.samples);
        if frame.last {
            break;
        }
    }
    assert_eq!(played, samples);

    host.release(clip).await?;
    Ok(())
}

#[tokio::test]
async fn test_manager_over_local_host() -> Result<()> {
    let dir = TempDir::new()?;
    let asset = dir.path().join("chime.wav");
    write_wav(&asset, &[1000; 400])?;

    let (tx, _rx) = mpsc::channel(1024);
    let host = Arc::new(LocalHost::new(settings(dir.path(), tone()), tx));
    let manager = RecordingManager::new(host.clone(), &asset);

    assert_eq!(manager.start_recording().await, StartOutcome::Started);
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(manager.stop_recording().await, StopOutcome::Saved { index: 0 });

    assert_eq!(manager.play_recorded(0).await, PlayOutcome::Played);
    assert_eq!(manager.play_prerecorded().await, PlayOutcome::Played);
    assert_eq!(manager.play_prerecorded().await, PlayOutcome::Played);
    assert_eq!(host.loaded_clips().await, 2);

    let report = manager.teardown().await;
    assert_eq!(report.released, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(host.loaded_clips().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_failed_stop_over_local_host_returns_to_idle() -> Result<()> {
    let dir = TempDir::new()?;
    let asset = dir.path().join("chime.wav");
    write_wav(&asset, &[1000; 400])?;

    let (tx, _rx) = mpsc::channel(64);
    let host = Arc::new(LocalHost::new(settings(dir.path(), tone()), tx));
    let manager = RecordingManager::new(host.clone(), &asset);

    assert_eq!(manager.start_recording().await, StartOutcome::Started);
    tokio::time::sleep(Duration::from_millis(80)).await;

    // The captured file vanishes before it can be loaded back
    std::fs::remove_dir_all(dir.path().join("recordings"))?;
    assert_eq!(manager.stop_recording().await, StopOutcome::Failed);
    assert!(!manager.is_recording().await);
    assert_eq!(manager.clip_count().await, 0);
    assert_eq!(manager.stop_recording().await, StopOutcome::NotRecording);

    // The next session recreates the directory and saves normally
    assert_eq!(manager.start_recording().await, StartOutcome::Started);
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(manager.stop_recording().await, StopOutcome::Saved { index: 0 });

    manager.teardown().await;
    Ok(())
}

#[tokio::test]
async fn test_replay_mid_stream_signals_the_cut() -> Result<()> {
    let dir = TempDir::new()?;
    let asset = dir.path().join("chime.wav");
    write_wav(&asset, &[1000; 800])?;

    let (tx, mut rx) = mpsc::channel(256);
    let host = LocalHost::new(settings(dir.path(), tone()), tx);

    let clip = host.load_sound_asset(&asset).await?;
    host.play(clip).await?;
    let first = rx.recv().await.expect("first buffer");
    assert!(!first.last);

    host.replay(clip).await?;

    // Anything the aborted run had queued, then the marker, then a fresh run
    while !rx.recv().await.expect("playback frame").is_stop_marker() {}

    let restart = rx.recv().await.expect("restarted buffer");
    assert_eq!(restart.frame.timestamp_ms, 0);
    assert!(!restart.is_stop_marker());

    host.release(clip).await?;
    Ok(())
}
