use async_trait::async_trait;
use log::debug;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::audio_utils;
use crate::errors::SynthesisError;
use crate::synthesis::{NarrationClip, SpeechSynthesizer};

/// eSpeak NG subprocess engine
///
/// Runs `espeak-ng -v <voice> -s <wpm> -w <wav> <text>` per unit.
#[derive(Debug)]
pub struct EspeakSynthesizer {
    /// Voice identifier, e.g. "en-us"
    voice: String,
    /// Speaking rate in words per minute
    speed_wpm: u32,
    /// Timeout per synthesized unit in seconds
    timeout_secs: u64,
}

impl EspeakSynthesizer {
    /// Create a new eSpeak NG engine
    pub fn new(voice: impl Into<String>, speed_wpm: u32, timeout_secs: u64) -> Self {
        Self {
            voice: voice.into(),
            speed_wpm,
            timeout_secs,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for EspeakSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        output_path: &Path,
    ) -> Result<NarrationClip, SynthesisError> {
        let espeak_future = Command::new("espeak-ng")
            .args([
                "-v",
                &self.voice,
                "-s",
                &self.speed_wpm.to_string(),
                "-w",
                output_path.to_str().unwrap_or_default(),
            ])
            .arg(text)
            .output();

        let timeout_duration = std::time::Duration::from_secs(self.timeout_secs);
        let output = tokio::select! {
            result = espeak_future => {
                result.map_err(|e| SynthesisError::SpawnFailed(format!("espeak-ng: {}", e)))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(SynthesisError::Timeout(self.timeout_secs));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SynthesisError::EngineFailed(format!(
                "espeak-ng exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let duration_secs = audio_utils::wav_duration_seconds(output_path)
            .map_err(|e| SynthesisError::InvalidAudio(e.to_string()))?;

        debug!("espeak-ng wrote {:.2}s of audio to {:?}", duration_secs, output_path);

        Ok(NarrationClip {
            path: output_path.to_path_buf(),
            duration_secs,
        })
    }

    async fn test_availability(&self) -> Result<(), SynthesisError> {
        let status = Command::new("espeak-ng")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| SynthesisError::SpawnFailed(format!("espeak-ng: {}", e)))?;

        if !status.success() {
            return Err(SynthesisError::EngineFailed(format!(
                "espeak-ng --version exited with {}",
                status
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "espeak"
    }
}
