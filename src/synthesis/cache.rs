/*!
 * Narration clip caching functionality.
 *
 * This module provides a content-addressed cache of synthesized clips so
 * unchanged units are not sent to the engine again on later runs. Keys
 * combine engine, voice, model and unit text, so switching any of them
 * invalidates the cached narration; clips live under the user cache
 * directory and survive between runs. Disabled by default.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;
use log::debug;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};

use crate::file_utils::FileManager;
use crate::synthesis::NarrationClip;

/// Narration cache for storing and retrieving synthesized clips
pub struct NarrationCache {
    /// Directory holding the cached clips
    cache_dir: PathBuf,

    /// Cache hit counter
    hits: Arc<RwLock<usize>>,

    /// Cache miss counter
    misses: Arc<RwLock<usize>>,

    /// Whether caching is enabled
    enabled: bool,
}

impl NarrationCache {
    /// Create a new narration cache under the user cache directory
    pub fn new(enabled: bool) -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("narravid");

        Self::with_dir(enabled, cache_dir)
    }

    /// Create a narration cache with an explicit directory
    pub fn with_dir(enabled: bool, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            hits: Arc::new(RwLock::new(0)),
            misses: Arc::new(RwLock::new(0)),
            enabled,
        }
    }

    /// Get a cached clip, copying it to `output_path`
    pub fn fetch(
        &self,
        engine: &str,
        voice: &str,
        model: &str,
        text: &str,
        output_path: &Path,
    ) -> Option<NarrationClip> {
        if !self.enabled {
            return None;
        }

        let label = voice_label(voice, model);
        let cached = self.cache_dir.join(Self::cache_key(engine, voice, model, text));
        if !cached.is_file() {
            let mut misses = self.misses.write();
            *misses += 1;

            debug!("Cache miss for '{}' ({}/{})", truncate_text(text, 30), engine, label);
            return None;
        }

        let restored = FileManager::copy_file(&cached, output_path)
            .and_then(|_| crate::audio_utils::wav_duration_seconds(output_path));

        match restored {
            Ok(duration_secs) => {
                let mut hits = self.hits.write();
                *hits += 1;

                debug!("Cache hit for '{}' ({}/{})", truncate_text(text, 30), engine, label);

                Some(NarrationClip {
                    path: output_path.to_path_buf(),
                    duration_secs,
                })
            }
            Err(e) => {
                // Unreadable entries count as misses and are dropped
                debug!("Discarding unreadable cache entry {:?}: {}", cached, e);
                let _ = std::fs::remove_file(&cached);

                let mut misses = self.misses.write();
                *misses += 1;

                None
            }
        }
    }

    /// Store a synthesized clip in the cache
    pub fn store(&self, engine: &str, voice: &str, model: &str, text: &str, clip: &NarrationClip) {
        if !self.enabled {
            return;
        }

        let cached = self.cache_dir.join(Self::cache_key(engine, voice, model, text));
        if let Err(e) = FileManager::copy_file(&clip.path, &cached) {
            debug!("Failed to cache clip for '{}': {}", truncate_text(text, 30), e);
            return;
        }

        debug!(
            "Cached clip for '{}' ({}/{})",
            truncate_text(text, 30),
            engine,
            voice_label(voice, model)
        );
    }

    /// Get cache statistics
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = *self.hits.read();
        let misses = *self.misses.read();
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        (hits, misses, hit_rate)
    }

    /// Remove every cached clip and reset the counters
    pub fn clear(&self) {
        if self.cache_dir.is_dir() {
            let _ = std::fs::remove_dir_all(&self.cache_dir);
        }

        let mut hits = self.hits.write();
        *hits = 0;

        let mut misses = self.misses.write();
        *misses = 0;

        debug!("Narration cache cleared");
    }

    /// Enable or disable the cache
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Check if the cache is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    // Content-addressed file name for one engine/voice/model/text combination.
    // The model takes part because piper identifies its speaker by model file
    // while voice stays empty.
    fn cache_key(engine: &str, voice: &str, model: &str, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(engine.as_bytes());
        hasher.update(b"\n");
        hasher.update(voice.as_bytes());
        hasher.update(b"\n");
        hasher.update(model.as_bytes());
        hasher.update(b"\n");
        hasher.update(text.as_bytes());

        format!("{:x}.wav", hasher.finalize())
    }
}

impl Default for NarrationCache {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Clone for NarrationCache {
    fn clone(&self) -> Self {
        Self {
            cache_dir: self.cache_dir.clone(),
            hits: self.hits.clone(),
            misses: self.misses.clone(),
            enabled: self.enabled,
        }
    }
}

// Log label for whichever of voice or model identifies the speaker
fn voice_label<'a>(voice: &'a str, model: &'a str) -> &'a str {
    if !voice.is_empty() {
        voice
    } else if !model.is_empty() {
        model
    } else {
        "default"
    }
}

/// Truncate text to a maximum length with ellipsis
fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_length).collect::<String>())
    }
}
