use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, error};
use reqwest::Client;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

use crate::audio_utils;
use crate::errors::SynthesisError;
use crate::synthesis::{NarrationClip, SpeechSynthesizer};

/// HTTP TTS server engine
///
/// Posts one JSON request per unit to a configured endpoint and writes the
/// returned audio bytes to the clip path.
#[derive(Debug)]
pub struct ServerSynthesizer {
    /// Endpoint URL of the TTS service
    endpoint: String,
    /// Voice identifier passed through to the service
    voice: String,
    /// HTTP client for making requests
    client: Client,
}

/// Speech request sent to the TTS server
#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    /// Text to narrate
    text: &'a str,
    /// Voice identifier
    voice: &'a str,
}

impl ServerSynthesizer {
    /// Create a new server engine for the given endpoint
    pub fn new(endpoint: impl Into<String>, voice: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            endpoint: endpoint.into(),
            voice: voice.into(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ServerSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        output_path: &Path,
    ) -> Result<NarrationClip, SynthesisError> {
        let request = SpeechRequest {
            text,
            voice: &self.voice,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| SynthesisError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("TTS server error ({}): {}", status, message);
            return Err(SynthesisError::ServerError {
                status_code: status.as_u16(),
                message,
            });
        }

        let audio: Bytes = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::RequestFailed(format!("failed to read audio payload: {}", e)))?;

        if audio.is_empty() {
            return Err(SynthesisError::InvalidAudio(
                "server returned an empty audio payload".to_string(),
            ));
        }

        std::fs::write(output_path, &audio)
            .map_err(|e| SynthesisError::InvalidAudio(format!("failed to write clip: {}", e)))?;

        let duration_secs = audio_utils::clip_duration_seconds(output_path)
            .await
            .map_err(|e| SynthesisError::InvalidAudio(e.to_string()))?;

        debug!(
            "TTS server returned {} bytes, {:.2}s of audio for {:?}",
            audio.len(),
            duration_secs,
            output_path
        );

        Ok(NarrationClip {
            path: output_path.to_path_buf(),
            duration_secs,
        })
    }

    async fn test_availability(&self) -> Result<(), SynthesisError> {
        // Any HTTP response proves the service is reachable
        self.client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| SynthesisError::RequestFailed(format!("cannot reach TTS server: {}", e)))?;

        Ok(())
    }

    fn name(&self) -> &str {
        "server"
    }
}
