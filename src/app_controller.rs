use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

use crate::app_config::{Config, RenderMode};
use crate::audio_utils;
use crate::file_utils::{FileManager, FileType};
use crate::segmenter::{CaptionUnit, Segmenter};
use crate::synthesis::cache::NarrationCache;
use crate::synthesis::{create_synthesizer, NarrationClip, SpeechSynthesizer};
use crate::timeline::CaptionTimeline;
use crate::video_renderer::VideoRenderer;

// @module: Application controller for the narration pipeline

/// Main application controller for script-to-video rendering
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Active speech engine
    synthesizer: Box<dyn SpeechSynthesizer>,

    // @field: Narration clip cache keyed by engine, voice and text
    cache: NarrationCache,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let synthesizer = create_synthesizer(&config.synthesis);
        let cache = NarrationCache::new(config.synthesis.cache_enabled);

        Ok(Self {
            config,
            synthesizer,
            cache,
        })
    }

    /// Create a controller with an injected speech engine
    pub fn with_synthesizer(config: Config, synthesizer: Box<dyn SpeechSynthesizer>) -> Self {
        let cache = NarrationCache::new(config.synthesis.cache_enabled);

        Self {
            config,
            synthesizer,
            cache,
        }
    }

    /// Access the active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Short name of the active speech engine
    pub fn engine_name(&self) -> &str {
        self.synthesizer.name()
    }

    /// Segment a script without synthesizing anything, for dry runs
    pub fn list_units(&self, script_file: &Path) -> Result<Vec<CaptionUnit>> {
        let lines = FileManager::read_document_lines(script_file)?;
        Ok(Segmenter::segment(&lines))
    }

    /// Run the main workflow for one script file
    pub async fn run(
        &self,
        script_file: PathBuf,
        image_file: PathBuf,
        output_file: Option<PathBuf>,
        captions_file: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<()> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(
            script_file,
            image_file,
            output_file,
            captions_file,
            &multi_progress,
            force_overwrite,
        )
        .await
    }

    /// Run the pipeline with progress reporting
    async fn run_with_progress(
        &self,
        script_file: PathBuf,
        image_file: PathBuf,
        output_file: Option<PathBuf>,
        captions_file: Option<PathBuf>,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<()> {
        // Start timing the process
        let start_time = std::time::Instant::now();

        if !FileManager::file_exists(&script_file) {
            return Err(anyhow::anyhow!("Script file does not exist: {:?}", script_file));
        }
        if !FileManager::file_exists(&image_file) {
            return Err(anyhow::anyhow!("Image file does not exist: {:?}", image_file));
        }

        let file_type = FileManager::detect_file_type(&script_file)?;
        if file_type != FileType::Script {
            warn!("Input {:?} does not look like a text script", script_file);
        }

        // Resolve the output path next to the script unless one was given
        let output_path = match output_file {
            Some(path) => path,
            None => FileManager::generate_output_path(&script_file, "mp4"),
        };
        if output_path.exists() && !force_overwrite {
            // Skip if the video already exists and no force flag
            warn!("Skipping file, output already exists (use -f to force overwrite)");
            return Ok(());
        }

        let lines = FileManager::read_document_lines(&script_file)?;
        let units = Segmenter::segment(&lines);
        if units.is_empty() {
            warn!("No caption units found in {:?}, nothing to render", script_file);
            return Ok(());
        }
        info!("Segmented script into {} caption units", units.len());

        self.synthesizer.test_availability().await.with_context(|| {
            format!(
                "Speech engine '{}' is not available",
                self.synthesizer.name()
            )
        })?;

        // Working directory for clips, caption text files and filter scripts
        let workdir = tempfile::Builder::new()
            .prefix("narravid")
            .tempdir()
            .context("Failed to create working directory")?;
        let workdir_path = workdir.path().to_path_buf();

        let clips = self
            .synthesize_units_with_progress(&units, &workdir_path, multi_progress)
            .await?;
        let durations: Vec<f64> = clips.iter().map(|clip| clip.duration_secs).collect();

        let timeline = CaptionTimeline::build(units, &durations)?;
        debug!(
            "Timeline spans {:.2}s across {} entries",
            timeline.total_duration(),
            timeline.len()
        );

        let renderer = VideoRenderer::new(self.config.captions.clone(), self.config.video.clone());
        match self.config.video.mode {
            RenderMode::Composite => {
                // One narration track, one ffmpeg pass
                let combined_audio = workdir_path.join("narration.wav");
                let clip_paths: Vec<PathBuf> =
                    clips.iter().map(|clip| clip.path.clone()).collect();
                audio_utils::concat_audio_clips(&clip_paths, &combined_audio).await?;

                renderer
                    .render_composite(
                        &timeline,
                        &image_file,
                        &combined_audio,
                        &workdir_path,
                        &output_path,
                    )
                    .await?;
            }
            RenderMode::Segments => {
                renderer
                    .render_segments(&timeline, &image_file, &clips, &workdir_path, &output_path)
                    .await?;
            }
        }

        if let Some(captions_path) = captions_file {
            FileManager::write_to_file(&captions_path, &timeline.to_srt())?;
            info!("Captions written to {}", captions_path.display());
        }

        if self.cache.is_enabled() {
            let (hits, misses, hit_rate) = self.cache.stats();
            debug!(
                "Narration cache: {} hits, {} misses ({:.0}% hit rate)",
                hits,
                misses,
                hit_rate * 100.0
            );
        }

        if self.config.video.keep_intermediates {
            let kept = workdir.into_path();
            info!("Intermediate files kept in {:?}", kept);
        }

        let elapsed = start_time.elapsed();
        info!(
            "Success: {} ({})",
            output_path.display(),
            Self::format_duration(elapsed)
        );

        Ok(())
    }

    /// Narrate every unit in order with a progress bar, checking the cache first
    async fn synthesize_units_with_progress(
        &self,
        units: &[CaptionUnit],
        workdir: &Path,
        multi_progress: &MultiProgress,
    ) -> Result<Vec<NarrationClip>> {
        let clips_dir = workdir.join("clips");
        FileManager::ensure_dir(&clips_dir)?;

        let progress_bar = multi_progress.add(ProgressBar::new(units.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} units ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));

        info!(
            "🚀 narravid: {} - {} units",
            self.config.synthesis.engine.display_name(),
            units.len()
        );
        progress_bar.set_message("Narrating");

        let engine = self.synthesizer.name();
        let voice = self.config.synthesis.get_voice();
        // Piper identifies its speaker by model file, so the model is part
        // of the cache key as well
        let model = self.config.synthesis.get_model();

        let mut clips = Vec::with_capacity(units.len());
        for (index, unit) in units.iter().enumerate() {
            let clip_path = clips_dir.join(format!("unit_{}.wav", index));

            let clip = match self.cache.fetch(engine, &voice, &model, &unit.text, &clip_path) {
                Some(cached) => cached,
                None => {
                    let fresh = self
                        .synthesizer
                        .synthesize(&unit.text, &clip_path)
                        .await
                        .with_context(|| format!("Failed to narrate unit {}", index + 1))?;
                    self.cache.store(engine, &voice, &model, &unit.text, &fresh);
                    fresh
                }
            };

            debug!("Unit {}: {:.2}s of narration", index + 1, clip.duration_secs);
            progress_bar.set_position((index + 1) as u64);
            clips.push(clip);
        }

        // Clear rather than finish so only the folder progress bar remains
        // visible when processing multiple files
        progress_bar.finish_and_clear();

        Ok(clips)
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Run the workflow in folder mode, rendering every script in a directory.
    /// Files that already have a rendered video will be skipped.
    pub async fn run_folder(
        &self,
        input_dir: PathBuf,
        image_file: PathBuf,
        force_overwrite: bool,
    ) -> Result<()> {
        // Start timing the process
        let start_time = std::time::Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow::anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        // Find all script files in the directory (recursive, sorted)
        let script_files = FileManager::find_script_files(&input_dir)?;

        if script_files.is_empty() {
            return Err(anyhow::anyhow!(
                "No script files found in directory: {:?}",
                input_dir
            ));
        }

        let multi_progress = MultiProgress::new();

        let folder_pb = multi_progress.add(ProgressBar::new(script_files.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));
        folder_pb.set_message("Processing files");

        // Track success and failure counts
        let mut success_count = 0;
        let mut error_count = 0;
        let mut skip_count = 0;

        for script_file in script_files.iter() {
            let file_name = script_file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            folder_pb.set_message(format!("Processing: {}", file_name));

            let output_path = FileManager::generate_output_path(script_file, "mp4");
            if output_path.exists() && !force_overwrite {
                // Skip if the video already exists and no force flag
                warn!("Skipping file, output already exists (use -f to force overwrite)");
                skip_count += 1;
                folder_pb.inc(1);
                continue;
            }

            match self
                .run_with_progress(
                    script_file.clone(),
                    image_file.clone(),
                    Some(output_path),
                    None,
                    &multi_progress,
                    force_overwrite,
                )
                .await
            {
                Ok(_) => {
                    success_count += 1;
                }
                Err(e) => {
                    error!("Error processing file {}: {}", file_name, e);
                    error_count += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        let duration = start_time.elapsed();
        info!(
            "Folder processing completed: {} rendered, {} skipped, {} errors in {}",
            success_count,
            skip_count,
            error_count,
            Self::format_duration(duration)
        );

        Ok(())
    }
}
