/*!
 * Speech synthesis engines for narration.
 *
 * This module contains engine implementations that turn one caption unit of
 * text into one audio clip:
 * - Piper: local neural TTS subprocess, text on stdin
 * - eSpeak NG: local formant TTS subprocess
 * - Server: HTTP TTS server speaking JSON
 * - Mock: deterministic silent clips for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use crate::app_config::{SynthesisConfig, SynthesisEngine};
use crate::errors::SynthesisError;

/// One synthesized narration clip
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationClip {
    /// Where the audio was written
    pub path: PathBuf,
    /// Clip length in seconds
    pub duration_secs: f64,
}

/// Common trait for all speech synthesis engines
///
/// This trait defines the interface that all engine implementations must follow,
/// allowing them to be used interchangeably by the pipeline. One call
/// synthesizes exactly one caption unit, and calls are made sequentially.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + Debug {
    /// Synthesize speech for a single unit of text
    ///
    /// # Arguments
    /// * `text` - The unit text to narrate
    /// * `output_path` - Where the audio clip should be written
    ///
    /// # Returns
    /// * `Result<NarrationClip, SynthesisError>` - The written clip with its
    ///   measured duration, or an error
    async fn synthesize(&self, text: &str, output_path: &Path)
        -> Result<NarrationClip, SynthesisError>;

    /// Check that the engine can be used before starting a run
    ///
    /// # Returns
    /// * `Result<(), SynthesisError>` - Ok if the engine is reachable, or an error
    async fn test_availability(&self) -> Result<(), SynthesisError>;

    /// Short engine name for logs
    fn name(&self) -> &str;
}

/// Build the configured synthesis engine
pub fn create_synthesizer(config: &SynthesisConfig) -> Box<dyn SpeechSynthesizer> {
    match config.engine {
        SynthesisEngine::Piper => Box::new(piper::PiperSynthesizer::new(
            config.get_model(),
            config.get_timeout_secs(),
        )),
        SynthesisEngine::Espeak => Box::new(espeak::EspeakSynthesizer::new(
            config.get_voice(),
            config.get_speed_wpm(),
            config.get_timeout_secs(),
        )),
        SynthesisEngine::Server => Box::new(server::ServerSynthesizer::new(
            config.get_endpoint(),
            config.get_voice(),
            config.get_timeout_secs(),
        )),
        SynthesisEngine::Mock => Box::new(mock::MockSynthesizer::working()),
    }
}

pub mod cache;
pub mod espeak;
pub mod mock;
pub mod piper;
pub mod server;
