/*!
 * Tests for audio clip duration probing
 */

use anyhow::Result;
use narravid::audio_utils;
use crate::common;

/// Test that WAV duration is read from the header
#[test]
fn test_wav_duration_withOneSecondClip_shouldReportOneSecond() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let wav = common::create_test_wav(&temp_dir.path().to_path_buf(), "one_second.wav", 1.0)?;

    let duration = audio_utils::wav_duration_seconds(&wav)?;

    assert!((duration - 1.0).abs() < 1e-3, "got {}", duration);

    Ok(())
}

/// Test that fractional durations survive the sample math
#[test]
fn test_wav_duration_withShortClip_shouldReportFraction() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let wav = common::create_test_wav(&temp_dir.path().to_path_buf(), "short.wav", 0.25)?;

    let duration = audio_utils::wav_duration_seconds(&wav)?;

    assert!((duration - 0.25).abs() < 1e-3, "got {}", duration);

    Ok(())
}

/// Test that a zero-length clip reports zero without failing
#[test]
fn test_wav_duration_withEmptyClip_shouldReportZero() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let wav = common::create_test_wav(&temp_dir.path().to_path_buf(), "empty.wav", 0.0)?;

    let duration = audio_utils::wav_duration_seconds(&wav)?;

    assert_eq!(duration, 0.0);

    Ok(())
}

/// Test that a missing file is an error
#[test]
fn test_wav_duration_withMissingFile_shouldReturnError() {
    assert!(audio_utils::wav_duration_seconds("no_such_clip.wav").is_err());
}

/// Test that a file that is not a WAV is an error
#[test]
fn test_wav_duration_withGarbageFile_shouldReturnError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let garbage = common::create_test_file(&temp_dir.path().to_path_buf(), "garbage.wav", "not audio")?;

    assert!(audio_utils::wav_duration_seconds(&garbage).is_err());

    Ok(())
}

/// Test that clip_duration_seconds takes the header path for WAV files,
/// so no external tool is needed
#[test]
fn test_clip_duration_withWavExtension_shouldUseHeader() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let wav = common::create_test_wav(&temp_dir.path().to_path_buf(), "clip.wav", 0.5)?;

    let duration = tokio_test::block_on(audio_utils::clip_duration_seconds(&wav))?;

    assert!((duration - 0.5).abs() < 1e-3, "got {}", duration);

    Ok(())
}

/// Test that concatenation refuses an empty clip list up front
#[test]
fn test_concat_audio_clips_withNoClips_shouldReturnError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output = temp_dir.path().join("joined.wav");

    let clips: Vec<std::path::PathBuf> = Vec::new();
    let result = tokio_test::block_on(audio_utils::concat_audio_clips(&clips, &output));

    assert!(result.is_err());

    Ok(())
}
