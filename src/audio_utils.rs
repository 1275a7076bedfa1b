use std::path::Path;
use anyhow::{anyhow, Context, Result};
use hound::WavReader;
use log::{debug, error};
use serde_json::{from_str, Value};
use tokio::process::Command;

// @module: Audio clip inspection and assembly

/// Duration of a WAV file in seconds, read from the header
pub fn wav_duration_seconds<P: AsRef<Path>>(path: P) -> Result<f64> {
    let path = path.as_ref();
    let reader = WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {:?}", path))?;

    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(anyhow!("WAV file has a zero sample rate: {:?}", path));
    }

    // duration() counts inter-channel samples, so this is already per channel
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}

/// Duration of any audio file in seconds, read with ffprobe
pub async fn probe_duration_seconds<P: AsRef<Path>>(path: P) -> Result<f64> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(anyhow!("Audio file not found: {:?}", path));
    }

    // Add timeout to prevent hanging on problematic files
    let ffprobe_future = Command::new("ffprobe")
        .args([
            "-v", "quiet",
            "-print_format", "json",
            "-show_format",
            path.to_str().unwrap_or(""),
        ])
        .output();

    let timeout_duration = std::time::Duration::from_secs(60); // 1 minute timeout
    let output = tokio::select! {
        result = ffprobe_future => {
            result.map_err(|e| anyhow!("Failed to execute ffprobe command: {}", e))?
        },
        _ = tokio::time::sleep(timeout_duration) => {
            return Err(anyhow!("ffprobe command timed out after 60 seconds"));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("ffprobe failed: {}", stderr);
        return Err(anyhow!("ffprobe command failed: {}", stderr));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: Value = from_str(&stdout)
        .context("Failed to parse ffprobe JSON output")?;

    json.get("format")
        .and_then(|f| f.get("duration"))
        .and_then(|d| d.as_str())
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| anyhow!("ffprobe reported no duration for {:?}", path))
}

/// Duration of a narration clip in seconds.
///
/// WAV headers are read directly, anything else goes through ffprobe.
pub async fn clip_duration_seconds<P: AsRef<Path>>(path: P) -> Result<f64> {
    let path = path.as_ref();
    let is_wav = path
        .extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("wav"))
        .unwrap_or(false);

    if is_wav {
        wav_duration_seconds(path)
    } else {
        probe_duration_seconds(path).await
    }
}

/// Concatenate audio clips into one file with the concat demuxer.
///
/// Tries a stream copy first and falls back to a pcm_s16le re-encode when the
/// clip parameters do not line up.
pub async fn concat_audio_clips<P1, P2>(clips: &[P1], output: P2) -> Result<()>
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
{
    if clips.is_empty() {
        return Err(anyhow!("No audio clips to concatenate"));
    }

    let output = output.as_ref();
    let list_path = output.with_extension("txt");
    let mut list_content = String::new();
    for clip in clips {
        list_content.push_str(&format!("file '{}'\n", clip.as_ref().display()));
    }
    std::fs::write(&list_path, &list_content)
        .with_context(|| format!("Failed to write concat list: {:?}", list_path))?;

    let copy_result = run_concat(&list_path, output, true).await?;
    if copy_result {
        return Ok(());
    }

    debug!("Stream copy concat failed, re-encoding to pcm_s16le");
    if run_concat(&list_path, output, false).await? {
        return Ok(());
    }

    Err(anyhow!("Failed to concatenate {} audio clips", clips.len()))
}

async fn run_concat(list_path: &Path, output: &Path, stream_copy: bool) -> Result<bool> {
    let codec_args: [&str; 2] = if stream_copy {
        ["-c", "copy"]
    } else {
        ["-c:a", "pcm_s16le"]
    };

    let ffmpeg_future = Command::new("ffmpeg")
        .args([
            "-y",
            "-f", "concat",
            "-safe", "0",
            "-i", list_path.to_str().unwrap_or_default(),
        ])
        .args(codec_args)
        .arg(output.to_str().unwrap_or_default())
        .output();

    let timeout_duration = std::time::Duration::from_secs(120); // 2 minute timeout for ffmpeg
    let result = tokio::select! {
        result = ffmpeg_future => {
            result.map_err(|e| anyhow!("Failed to execute ffmpeg command for audio concat: {}", e))?
        },
        _ = tokio::time::sleep(timeout_duration) => {
            return Err(anyhow!("ffmpeg command timed out after 2 minutes"));
        }
    };

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let filtered = filter_ffmpeg_stderr(&stderr);
        if stream_copy {
            debug!("Audio concat with stream copy failed: {}", filtered);
        } else {
            error!("Audio concat failed: {}", filtered);
        }
        return Ok(false);
    }

    Ok(true)
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
pub(crate) fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let dominated_prefixes = [
        "ffmpeg version",
        "  built with",
        "  configuration:",
        "  lib",
        "Input #",
        "  Metadata:",
        "  Duration:",
        "  Chapter",
        "    Chapter",
        "  Stream #",
        "      Metadata:",
        "        title",
        "        BPS",
        "        DURATION",
        "        NUMBER_OF",
        "        _STATISTICS",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return false;
            }
            !dominated_prefixes.iter().any(|p| trimmed.starts_with(p))
        })
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
