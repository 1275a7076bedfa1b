use std::path::{Path, PathBuf};
use log::{debug, info};
use serde_json::{from_str, Value};
use tokio::process::Command;

use crate::app_config::{CaptionAlign, CaptionStyle, VideoConfig};
use crate::audio_utils::filter_ffmpeg_stderr;
use crate::errors::RenderError;
use crate::synthesis::NarrationClip;
use crate::timeline::CaptionTimeline;

// @module: ffmpeg-backed video assembly with timed caption overlays

// Upper bounds for external tool runs
const PROBE_TIMEOUT_SECS: u64 = 60;
const RENDER_TIMEOUT_SECS: u64 = 600;

// Average glyph width as a fraction of the font size, close enough for
// DejaVu Sans at caption sizes
const GLYPH_WIDTH_FACTOR: f64 = 0.6;

// Vertical advance of one rendered text line relative to the font size
const LINE_HEIGHT_FACTOR: f64 = 1.2;

// @struct: Wrapped caption text with its fixed stack position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionBlock {
    // @field: Wrapped caption text, lines joined with newlines
    pub text: String,

    // @field: Top edge of this block, in pixels
    pub y_offset: u32,

    // @field: Number of wrapped lines
    pub line_count: usize,
}

// @struct: Video assembly collaborator
#[derive(Debug, Clone)]
pub struct VideoRenderer {
    captions: CaptionStyle,
    video: VideoConfig,
}

impl VideoRenderer {
    /// Create a new renderer with the given presentation settings
    pub fn new(captions: CaptionStyle, video: VideoConfig) -> Self {
        VideoRenderer { captions, video }
    }

    /// Probe the pixel dimensions of the background image
    pub async fn probe_image_dimensions<P: AsRef<Path>>(
        image_path: P,
    ) -> Result<(u32, u32), RenderError> {
        let image_path = image_path.as_ref();

        // Add timeout to prevent hanging on problematic files
        let ffprobe_future = Command::new("ffprobe")
            .args([
                "-v", "quiet",
                "-print_format", "json",
                "-show_streams",
                "-select_streams", "v:0",
                image_path.to_str().unwrap_or(""),
            ])
            .output();

        let timeout_duration = std::time::Duration::from_secs(PROBE_TIMEOUT_SECS);
        let output = tokio::select! {
            result = ffprobe_future => {
                result.map_err(|e| RenderError::LaunchFailed {
                    tool: "ffprobe".to_string(),
                    message: e.to_string(),
                })?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(RenderError::Timeout {
                    tool: "ffprobe".to_string(),
                    seconds: PROBE_TIMEOUT_SECS,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::ToolFailed {
                tool: "ffprobe".to_string(),
                message: stderr.trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let json: Value =
            from_str(&stdout).map_err(|e| RenderError::ProbeParseError(e.to_string()))?;

        let stream = json
            .get("streams")
            .and_then(|s| s.as_array())
            .and_then(|s| s.first())
            .ok_or_else(|| {
                RenderError::ProbeParseError(format!(
                    "no video stream found in {:?}",
                    image_path
                ))
            })?;

        let width = stream
            .get("width")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| RenderError::ProbeParseError("missing stream width".to_string()))?;
        let height = stream
            .get("height")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| RenderError::ProbeParseError("missing stream height".to_string()))?;

        Ok((width as u32, height as u32))
    }

    /// Columns available for caption text at a given frame width
    pub fn caption_columns(&self, frame_width: u32) -> usize {
        let box_width = frame_width as f64 * self.captions.wrap_width_ratio;
        let glyph_width = self.captions.font_size as f64 * GLYPH_WIDTH_FACTOR;

        ((box_width / glyph_width).floor() as usize).max(1)
    }

    /// Greedy word wrap to a column budget.
    ///
    /// Words longer than the budget get a line of their own rather than being
    /// broken mid-word.
    pub fn wrap_caption(text: &str, max_columns: usize) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();

        for word in text.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else if current.chars().count() + 1 + word.chars().count() <= max_columns {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(current);
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        if lines.is_empty() {
            lines.push(String::new());
        }

        lines
    }

    /// Fixed stack layout for every unit of the timeline.
    ///
    /// Each unit keeps the same vertical position across all entries it is
    /// visible in, so earlier captions never shift when new ones appear.
    pub fn caption_layout(&self, timeline: &CaptionTimeline, frame_width: u32) -> Vec<CaptionBlock> {
        let columns = self.caption_columns(frame_width);
        let line_height = (self.captions.font_size as f64 * LINE_HEIGHT_FACTOR).round() as u32;

        let mut blocks = Vec::with_capacity(timeline.units().len());
        let mut y_offset = self.captions.position_y;

        for unit in timeline.units() {
            let lines = Self::wrap_caption(&unit.text, columns);
            let line_count = lines.len();

            blocks.push(CaptionBlock {
                text: lines.join("\n"),
                y_offset,
                line_count,
            });

            y_offset += line_height * line_count as u32 + self.captions.line_spacing;
        }

        blocks
    }

    // x position expression for the configured alignment, text_w is resolved
    // by drawtext at render time
    fn alignment_x_expr(&self, frame_width: u32) -> String {
        let box_width = (frame_width as f64 * self.captions.wrap_width_ratio).round() as u32;

        match self.captions.align {
            CaptionAlign::Left => format!("{}", self.captions.position_x),
            CaptionAlign::Center => {
                format!("{}+({}-text_w)/2", self.captions.position_x, box_width)
            }
            CaptionAlign::Right => format!("{}+{}-text_w", self.captions.position_x, box_width),
        }
    }

    // One wrapped text file per unit, referenced via textfile= so caption
    // text never needs filter-graph escaping
    fn write_caption_textfiles(
        &self,
        blocks: &[CaptionBlock],
        workdir: &Path,
    ) -> Result<Vec<PathBuf>, RenderError> {
        let captions_dir = workdir.join("captions");
        std::fs::create_dir_all(&captions_dir)?;

        let mut paths = Vec::with_capacity(blocks.len());
        for (index, block) in blocks.iter().enumerate() {
            let path = captions_dir.join(format!("unit_{}.txt", index));
            std::fs::write(&path, &block.text)?;
            paths.push(path);
        }

        Ok(paths)
    }

    fn drawtext_filter(
        &self,
        textfile: &Path,
        block: &CaptionBlock,
        color: &str,
        x_expr: &str,
        enable: Option<(f64, f64)>,
    ) -> String {
        let mut filter = format!(
            "drawtext=textfile='{}':font='{}':fontsize={}:fontcolor={}:x='{}':y={}",
            textfile.display(),
            self.captions.font,
            self.captions.font_size,
            color,
            x_expr,
            block.y_offset,
        );

        if let Some((start, end)) = enable {
            filter.push_str(&format!(":enable='between(t,{:.3},{:.3})'", start, end));
        }

        filter
    }

    // Whole-timeline filter graph. Each unit gets a highlighted window while
    // it is narrated and a base-colored window for the rest of the video, so
    // the filter count stays linear in the number of units.
    fn composite_filter_script(
        &self,
        timeline: &CaptionTimeline,
        blocks: &[CaptionBlock],
        textfiles: &[PathBuf],
        frame_width: u32,
    ) -> String {
        let x_expr = self.alignment_x_expr(frame_width);
        let total = timeline.total_duration();

        let mut filters = vec!["[0:v]scale=trunc(iw/2)*2:trunc(ih/2)*2".to_string()];
        for entry in timeline.entries() {
            let block = &blocks[entry.index];
            let textfile = &textfiles[entry.index];

            filters.push(self.drawtext_filter(
                textfile,
                block,
                &self.captions.highlight_color,
                &x_expr,
                Some((entry.start_secs, entry.end_secs())),
            ));

            // The base-colored layer comes later in the chain, so at the
            // boundary frame it wins over the highlight
            if entry.end_secs() < total {
                filters.push(self.drawtext_filter(
                    textfile,
                    block,
                    &self.captions.base_color,
                    &x_expr,
                    Some((entry.end_secs(), total)),
                ));
            }
        }

        format!("{}[v]", filters.join(",\n"))
    }

    /// Render the whole timeline in one ffmpeg pass over the looped image
    /// and the concatenated narration audio.
    pub async fn render_composite(
        &self,
        timeline: &CaptionTimeline,
        image_path: &Path,
        audio_path: &Path,
        workdir: &Path,
        output_path: &Path,
    ) -> Result<(), RenderError> {
        let (frame_width, frame_height) = Self::probe_image_dimensions(image_path).await?;
        debug!("Background image is {}x{}", frame_width, frame_height);

        let blocks = self.caption_layout(timeline, frame_width);
        let textfiles = self.write_caption_textfiles(&blocks, workdir)?;
        let script = self.composite_filter_script(timeline, &blocks, &textfiles, frame_width);

        let script_path = workdir.join("filter_complex.txt");
        std::fs::write(&script_path, &script)?;
        debug!(
            "Wrote filter script for {} entries to {:?}",
            timeline.len(),
            script_path
        );

        let total = timeline.total_duration();
        let args: Vec<String> = vec![
            "-y".into(),
            "-loop".into(), "1".into(),
            "-framerate".into(), self.video.fps.to_string(),
            "-i".into(), image_path.to_string_lossy().into_owned(),
            "-i".into(), audio_path.to_string_lossy().into_owned(),
            "-filter_complex_script".into(), script_path.to_string_lossy().into_owned(),
            "-map".into(), "[v]".into(),
            "-map".into(), "1:a".into(),
            "-t".into(), format!("{:.3}", total),
            "-r".into(), self.video.fps.to_string(),
            "-c:v".into(), self.video.codec.clone(),
            "-pix_fmt".into(), "yuv420p".into(),
            "-c:a".into(), "aac".into(),
            output_path.to_string_lossy().into_owned(),
        ];

        Self::run_ffmpeg(&args, RENDER_TIMEOUT_SECS).await?;

        info!(
            "Rendered {} captions over {:.1}s into {:?}",
            timeline.len(),
            total,
            output_path
        );
        Ok(())
    }

    /// Render one clip per unit with its cumulative caption stack, then join
    /// the clips with short silent pauses.
    pub async fn render_segments(
        &self,
        timeline: &CaptionTimeline,
        image_path: &Path,
        clips: &[NarrationClip],
        workdir: &Path,
        output_path: &Path,
    ) -> Result<(), RenderError> {
        let (frame_width, frame_height) = Self::probe_image_dimensions(image_path).await?;
        debug!("Background image is {}x{}", frame_width, frame_height);

        let blocks = self.caption_layout(timeline, frame_width);
        let textfiles = self.write_caption_textfiles(&blocks, workdir)?;
        let x_expr = self.alignment_x_expr(frame_width);

        let segments_dir = workdir.join("segments");
        std::fs::create_dir_all(&segments_dir)?;

        let mut segment_paths = Vec::with_capacity(timeline.len());
        for entry in timeline.entries() {
            let mut filters = vec!["[0:v]scale=trunc(iw/2)*2:trunc(ih/2)*2".to_string()];
            for (position, visible) in timeline.visible_units(entry).into_iter().enumerate() {
                let color = if visible.highlighted {
                    &self.captions.highlight_color
                } else {
                    &self.captions.base_color
                };
                filters.push(self.drawtext_filter(
                    &textfiles[position],
                    &blocks[position],
                    color,
                    &x_expr,
                    None,
                ));
            }
            let script = format!("{}[v]", filters.join(",\n"));
            let script_path = segments_dir.join(format!("segment_{}.txt", entry.index));
            std::fs::write(&script_path, &script)?;

            let segment_path = segments_dir.join(format!("segment_{}.mp4", entry.index));
            let args: Vec<String> = vec![
                "-y".into(),
                "-loop".into(), "1".into(),
                "-framerate".into(), self.video.fps.to_string(),
                "-i".into(), image_path.to_string_lossy().into_owned(),
                "-i".into(), clips[entry.index].path.to_string_lossy().into_owned(),
                "-filter_complex_script".into(), script_path.to_string_lossy().into_owned(),
                "-map".into(), "[v]".into(),
                "-map".into(), "1:a".into(),
                "-t".into(), format!("{:.3}", entry.duration_secs),
                "-r".into(), self.video.fps.to_string(),
                "-c:v".into(), self.video.codec.clone(),
                "-pix_fmt".into(), "yuv420p".into(),
                // Uniform audio parameters so the final concat can stream-copy
                "-c:a".into(), "aac".into(),
                "-ar".into(), "44100".into(),
                "-ac".into(), "2".into(),
                segment_path.to_string_lossy().into_owned(),
            ];

            Self::run_ffmpeg(&args, RENDER_TIMEOUT_SECS).await?;
            debug!("Rendered segment {} of {}", entry.index + 1, timeline.len());
            segment_paths.push(segment_path);
        }

        // One silent pause clip rendered once and reused between segments
        let pause_path = if self.video.pause_secs > 0.0 && segment_paths.len() > 1 {
            Some(self.render_pause_clip(image_path, &segments_dir).await?)
        } else {
            None
        };

        // Concat list with pauses interleaved, no pause after the last segment
        let list_path = segments_dir.join("concat.txt");
        let mut list_content = String::new();
        for (index, segment) in segment_paths.iter().enumerate() {
            list_content.push_str(&format!("file '{}'\n", segment.display()));
            if let Some(pause) = &pause_path {
                if index + 1 < segment_paths.len() {
                    list_content.push_str(&format!("file '{}'\n", pause.display()));
                }
            }
        }
        std::fs::write(&list_path, &list_content)?;

        let concat_args: Vec<String> = vec![
            "-y".into(),
            "-f".into(), "concat".into(),
            "-safe".into(), "0".into(),
            "-i".into(), list_path.to_string_lossy().into_owned(),
            "-c".into(), "copy".into(),
            output_path.to_string_lossy().into_owned(),
        ];
        Self::run_ffmpeg(&concat_args, RENDER_TIMEOUT_SECS).await?;

        info!(
            "Joined {} segments into {:?}",
            segment_paths.len(),
            output_path
        );
        Ok(())
    }

    async fn render_pause_clip(
        &self,
        image_path: &Path,
        segments_dir: &Path,
    ) -> Result<PathBuf, RenderError> {
        let pause_path = segments_dir.join("pause.mp4");
        let args: Vec<String> = vec![
            "-y".into(),
            "-loop".into(), "1".into(),
            "-framerate".into(), self.video.fps.to_string(),
            "-i".into(), image_path.to_string_lossy().into_owned(),
            "-f".into(), "lavfi".into(),
            "-i".into(), "anullsrc=channel_layout=stereo:sample_rate=44100".into(),
            "-vf".into(), "scale=trunc(iw/2)*2:trunc(ih/2)*2".into(),
            "-t".into(), format!("{:.3}", self.video.pause_secs),
            "-r".into(), self.video.fps.to_string(),
            "-c:v".into(), self.video.codec.clone(),
            "-pix_fmt".into(), "yuv420p".into(),
            "-c:a".into(), "aac".into(),
            "-ar".into(), "44100".into(),
            "-ac".into(), "2".into(),
            pause_path.to_string_lossy().into_owned(),
        ];

        Self::run_ffmpeg(&args, RENDER_TIMEOUT_SECS).await?;
        Ok(pause_path)
    }

    async fn run_ffmpeg(args: &[String], timeout_secs: u64) -> Result<(), RenderError> {
        let ffmpeg_future = Command::new("ffmpeg").args(args).output();

        let timeout_duration = std::time::Duration::from_secs(timeout_secs);
        let result = tokio::select! {
            result = ffmpeg_future => {
                result.map_err(|e| RenderError::LaunchFailed {
                    tool: "ffmpeg".to_string(),
                    message: e.to_string(),
                })?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(RenderError::Timeout {
                    tool: "ffmpeg".to_string(),
                    seconds: timeout_secs,
                });
            }
        };

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(RenderError::ToolFailed {
                tool: "ffmpeg".to_string(),
                message: filter_ffmpeg_stderr(&stderr),
            });
        }

        Ok(())
    }
}
