/*!
 * Tests for narration clip caching
 */

use anyhow::Result;
use narravid::synthesis::NarrationClip;
use narravid::synthesis::cache::NarrationCache;
use crate::common;

/// Test that a disabled cache never returns clips
#[test]
fn test_cache_fetch_withDisabledCache_shouldReturnNone() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let cache = NarrationCache::with_dir(false, temp_dir.path().join("cache"));

    let wav = common::create_test_wav(&temp_dir.path().to_path_buf(), "clip.wav", 0.5)?;
    let clip = NarrationClip { path: wav, duration_secs: 0.5 };
    cache.store("mock", "default", "", "hello", &clip);

    let output = temp_dir.path().join("restored.wav");
    let result = cache.fetch("mock", "default", "", "hello", &output);

    assert!(result.is_none());
    assert!(!cache.is_enabled());

    Ok(())
}

/// Test that a stored clip comes back on the next fetch
#[test]
fn test_cache_fetch_withStoredClip_shouldRestoreClip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let cache = NarrationCache::with_dir(true, temp_dir.path().join("cache"));

    let wav = common::create_test_wav(&temp_dir.path().to_path_buf(), "clip.wav", 0.5)?;
    let clip = NarrationClip { path: wav, duration_secs: 0.5 };
    cache.store("mock", "default", "", "hello", &clip);

    let output = temp_dir.path().join("restored.wav");
    let restored = cache.fetch("mock", "default", "", "hello", &output);

    let restored = restored.expect("stored clip should be restored");
    assert_eq!(restored.path, output);
    assert!((restored.duration_secs - 0.5).abs() < 1e-3);
    assert!(output.is_file());

    Ok(())
}

/// Test that the first fetch of unseen text is a miss
#[test]
fn test_cache_fetch_withUnseenText_shouldReturnNone() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let cache = NarrationCache::with_dir(true, temp_dir.path().join("cache"));

    let output = temp_dir.path().join("restored.wav");
    let result = cache.fetch("mock", "default", "", "never synthesized", &output);

    assert!(result.is_none());
    assert!(!output.exists());

    Ok(())
}

/// Test that engine, voice, model and text all take part in the key
#[test]
fn test_cache_fetch_withDifferentKeyParts_shouldMiss() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let cache = NarrationCache::with_dir(true, temp_dir.path().join("cache"));

    let wav = common::create_test_wav(&temp_dir.path().to_path_buf(), "clip.wav", 0.5)?;
    let clip = NarrationClip { path: wav, duration_secs: 0.5 };
    cache.store("piper", "lessac", "medium.onnx", "hello", &clip);

    let output = temp_dir.path().join("restored.wav");

    // Different engine
    assert!(cache.fetch("espeak-ng", "lessac", "medium.onnx", "hello", &output).is_none());
    // Different voice
    assert!(cache.fetch("piper", "amy", "medium.onnx", "hello", &output).is_none());
    // Different model
    assert!(cache.fetch("piper", "lessac", "high.onnx", "hello", &output).is_none());
    // Different text
    assert!(cache.fetch("piper", "lessac", "medium.onnx", "goodbye", &output).is_none());
    // Exact key still hits
    assert!(cache.fetch("piper", "lessac", "medium.onnx", "hello", &output).is_some());

    Ok(())
}

/// Test that a model switch misses instead of serving narration recorded
/// by the previous model
#[test]
fn test_cache_fetch_withChangedModel_shouldNotServeStaleClip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let cache = NarrationCache::with_dir(true, temp_dir.path().join("cache"));

    // Piper leaves the voice empty and identifies the speaker by model file
    let wav = common::create_test_wav(&temp_dir.path().to_path_buf(), "clip.wav", 1.0)?;
    let clip = NarrationClip { path: wav, duration_secs: 1.0 };
    cache.store("piper", "", "en_US-lessac-medium.onnx", "Hello world.", &clip);

    let output = temp_dir.path().join("restored.wav");
    let other_model = cache.fetch("piper", "", "en_GB-alba-medium.onnx", "Hello world.", &output);
    assert!(other_model.is_none());

    let same_model = cache.fetch("piper", "", "en_US-lessac-medium.onnx", "Hello world.", &output);
    assert!(same_model.is_some());

    Ok(())
}

/// Test that hit and miss counters feed the hit rate
#[test]
fn test_cache_stats_withHitsAndMisses_shouldReportRate() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let cache = NarrationCache::with_dir(true, temp_dir.path().join("cache"));

    let wav = common::create_test_wav(&temp_dir.path().to_path_buf(), "clip.wav", 0.25)?;
    let clip = NarrationClip { path: wav, duration_secs: 0.25 };
    cache.store("mock", "default", "", "hello", &clip);

    let output = temp_dir.path().join("restored.wav");
    let _ = cache.fetch("mock", "default", "", "hello", &output);
    let _ = cache.fetch("mock", "default", "", "missing one", &output);
    let _ = cache.fetch("mock", "default", "", "missing two", &output);

    let (hits, misses, hit_rate) = cache.stats();
    assert_eq!(hits, 1);
    assert_eq!(misses, 2);
    assert!((hit_rate - 1.0 / 3.0).abs() < 1e-9);

    Ok(())
}

/// Test that a fresh cache reports a zero hit rate
#[test]
fn test_cache_stats_withNoActivity_shouldReportZeroRate() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let cache = NarrationCache::with_dir(true, temp_dir.path().join("cache"));

    let (hits, misses, hit_rate) = cache.stats();
    assert_eq!(hits, 0);
    assert_eq!(misses, 0);
    assert!(hit_rate.abs() < f64::EPSILON);

    Ok(())
}

/// Test that clear drops stored clips and resets the counters
#[test]
fn test_cache_clear_withStoredClips_shouldForgetEverything() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let cache = NarrationCache::with_dir(true, temp_dir.path().join("cache"));

    let wav = common::create_test_wav(&temp_dir.path().to_path_buf(), "clip.wav", 0.5)?;
    let clip = NarrationClip { path: wav, duration_secs: 0.5 };
    cache.store("mock", "default", "", "hello", &clip);

    let output = temp_dir.path().join("restored.wav");
    assert!(cache.fetch("mock", "default", "", "hello", &output).is_some());

    cache.clear();

    assert!(cache.fetch("mock", "default", "", "hello", &output).is_none());
    let (hits, misses, _) = cache.stats();
    assert_eq!(hits, 0);
    // The post-clear fetch registered as the only miss
    assert_eq!(misses, 1);

    Ok(())
}

/// Test that clones share one set of counters
#[test]
fn test_cache_clone_withSharedCounters_shouldSeeEachOthersStats() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let cache = NarrationCache::with_dir(true, temp_dir.path().join("cache"));
    let clone = cache.clone();

    let output = temp_dir.path().join("restored.wav");
    let _ = clone.fetch("mock", "default", "", "missing", &output);

    let (_, misses, _) = cache.stats();
    assert_eq!(misses, 1);

    Ok(())
}

/// Test that an unreadable cache entry is discarded instead of returned
#[test]
fn test_cache_fetch_withCorruptEntry_shouldDiscardAndMiss() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let cache_dir = temp_dir.path().join("cache");
    let cache = NarrationCache::with_dir(true, &cache_dir);

    let wav = common::create_test_wav(&temp_dir.path().to_path_buf(), "clip.wav", 0.5)?;
    let clip = NarrationClip { path: wav, duration_secs: 0.5 };
    cache.store("mock", "default", "", "hello", &clip);

    // Truncate the single stored entry to garbage
    let entry = std::fs::read_dir(&cache_dir)?
        .next()
        .expect("cache entry should exist")?
        .path();
    std::fs::write(&entry, b"not a wav")?;

    let output = temp_dir.path().join("restored.wav");
    assert!(cache.fetch("mock", "default", "", "hello", &output).is_none());
    assert!(!entry.exists(), "corrupt entry should be removed");

    Ok(())
}

/// Test that the default cache starts disabled
#[test]
fn test_cache_default_shouldBeDisabled() {
    let cache = NarrationCache::default();
    assert!(!cache.is_enabled());
}

/// Test that set_enabled flips the switch
#[test]
fn test_cache_setEnabled_withToggle_shouldChangeState() {
    let mut cache = NarrationCache::default();
    assert!(!cache.is_enabled());

    cache.set_enabled(true);
    assert!(cache.is_enabled());
}
