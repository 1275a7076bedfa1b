use async_trait::async_trait;
use log::debug;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::audio_utils;
use crate::errors::SynthesisError;
use crate::synthesis::{NarrationClip, SpeechSynthesizer};

/// Piper subprocess engine
///
/// Runs `piper --model <onnx> --output_file <wav>` per unit and streams the
/// unit text to it on stdin.
#[derive(Debug)]
pub struct PiperSynthesizer {
    /// Path to the voice model (.onnx)
    model: String,
    /// Timeout per synthesized unit in seconds
    timeout_secs: u64,
}

impl PiperSynthesizer {
    /// Create a new Piper engine with the given voice model
    pub fn new(model: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            model: model.into(),
            timeout_secs,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for PiperSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        output_path: &Path,
    ) -> Result<NarrationClip, SynthesisError> {
        let mut child = Command::new("piper")
            .args([
                "--model",
                &self.model,
                "--output_file",
                output_path.to_str().unwrap_or_default(),
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SynthesisError::SpawnFailed(format!("piper: {}", e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| {
                    SynthesisError::EngineFailed(format!("failed to write text to piper: {}", e))
                })?;
            // stdin drops here so piper sees end of input
        }

        let timeout_duration = std::time::Duration::from_secs(self.timeout_secs);
        let output = tokio::select! {
            result = child.wait_with_output() => {
                result.map_err(|e| SynthesisError::EngineFailed(format!("piper: {}", e)))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(SynthesisError::Timeout(self.timeout_secs));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SynthesisError::EngineFailed(format!(
                "piper exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let duration_secs = audio_utils::wav_duration_seconds(output_path)
            .map_err(|e| SynthesisError::InvalidAudio(e.to_string()))?;

        debug!("piper wrote {:.2}s of audio to {:?}", duration_secs, output_path);

        Ok(NarrationClip {
            path: output_path.to_path_buf(),
            duration_secs,
        })
    }

    async fn test_availability(&self) -> Result<(), SynthesisError> {
        if !Path::new(&self.model).exists() {
            return Err(SynthesisError::EngineFailed(format!(
                "voice model not found: {}",
                self.model
            )));
        }

        // Any exit proves the binary is on PATH, piper prints help to stderr
        Command::new("piper")
            .arg("--help")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| SynthesisError::SpawnFailed(format!("piper: {}", e)))?;

        Ok(())
    }

    fn name(&self) -> &str {
        "piper"
    }
}
