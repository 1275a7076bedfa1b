/*!
 * Mock synthesis engine for testing.
 *
 * This module provides a mock engine that simulates different behaviors:
 * - `MockSynthesizer::working()` - Always succeeds, duration tracks text length
 * - `MockSynthesizer::fixed(secs)` - Always succeeds with the same clip length
 * - `MockSynthesizer::failing()` - Always fails with an error
 *
 * Clips are real silent WAV files so duration probing works downstream.
 */

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::SynthesisError;
use crate::synthesis::{NarrationClip, SpeechSynthesizer};

/// Seconds of audio per character in the working behavior
const SECS_PER_CHAR: f64 = 0.05;

/// Shortest clip the working behavior produces
const MIN_CLIP_SECS: f64 = 0.2;

/// Behavior mode for the mock engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockSynthesisBehavior {
    /// Always succeeds, clip length proportional to the text length
    Working,
    /// Always succeeds with the same clip length
    FixedDuration { secs: f64 },
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Simulates slow synthesis (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock engine for testing pipeline behavior
#[derive(Debug)]
pub struct MockSynthesizer {
    /// Behavior mode
    behavior: MockSynthesisBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
}

impl MockSynthesizer {
    /// Create a new mock engine with the specified behavior
    pub fn new(behavior: MockSynthesisBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock engine that always succeeds
    pub fn working() -> Self {
        Self::new(MockSynthesisBehavior::Working)
    }

    /// Create a mock engine that always produces clips of the same length
    pub fn fixed(secs: f64) -> Self {
        Self::new(MockSynthesisBehavior::FixedDuration { secs })
    }

    /// Create an intermittently failing mock engine
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockSynthesisBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock engine that always errors
    pub fn failing() -> Self {
        Self::new(MockSynthesisBehavior::Failing)
    }

    /// Create a slow mock engine
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockSynthesisBehavior::Slow { delay_ms })
    }

    /// Number of synthesize calls made so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Clip length the working behavior produces for a given text
    pub fn expected_duration(text: &str) -> f64 {
        (text.chars().count() as f64 * SECS_PER_CHAR).max(MIN_CLIP_SECS)
    }

    fn write_silent_wav(path: &Path, duration_secs: f64) -> Result<(), SynthesisError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path, spec)
            .map_err(|e| SynthesisError::InvalidAudio(e.to_string()))?;

        let samples = (duration_secs * spec.sample_rate as f64).round() as usize;
        for _ in 0..samples {
            writer
                .write_sample(0i16)
                .map_err(|e| SynthesisError::InvalidAudio(e.to_string()))?;
        }

        writer
            .finalize()
            .map_err(|e| SynthesisError::InvalidAudio(e.to_string()))?;

        Ok(())
    }
}

impl Clone for MockSynthesizer {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        output_path: &Path,
    ) -> Result<NarrationClip, SynthesisError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        let duration_secs = match self.behavior {
            MockSynthesisBehavior::Working => Self::expected_duration(text),

            MockSynthesisBehavior::FixedDuration { secs } => secs,

            MockSynthesisBehavior::Intermittent { fail_every } => {
                // A zero period behaves like one, failing every request
                let period = fail_every.max(1);
                if count % period == period - 1 {
                    return Err(SynthesisError::EngineFailed(format!(
                        "Simulated intermittent failure (request #{})",
                        count + 1
                    )));
                }
                Self::expected_duration(text)
            }

            MockSynthesisBehavior::Failing => {
                return Err(SynthesisError::EngineFailed(
                    "Simulated engine failure".to_string(),
                ));
            }

            MockSynthesisBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Self::expected_duration(text)
            }
        };

        Self::write_silent_wav(output_path, duration_secs)?;

        Ok(NarrationClip {
            path: output_path.to_path_buf(),
            duration_secs,
        })
    }

    async fn test_availability(&self) -> Result<(), SynthesisError> {
        match self.behavior {
            MockSynthesisBehavior::Failing => Err(SynthesisError::EngineFailed(
                "Simulated engine failure".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
