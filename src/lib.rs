/*!
 * # narravid - Narrated Video Renderer
 *
 * A Rust library for turning plain-text scripts into narrated videos with
 * progressively revealed captions.
 *
 * ## Features
 *
 * - Segment a plain-text document into caption units, keeping bullet and
 *   numbered list lines verbatim
 * - Narrate each unit with a speech engine:
 *   - Piper (local neural TTS)
 *   - eSpeak NG (local formant TTS)
 *   - HTTP TTS server
 * - Build a cumulative caption timeline from measured clip durations
 * - Render over a static background image with ffmpeg, highlighting the
 *   unit that is currently narrated
 * - Export the timeline as an SRT caption file
 * - Batch processing for whole script directories
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `segmenter`: Document-to-caption-unit segmentation
 * - `timeline`: Caption timeline built from clip durations
 * - `synthesis`: Speech engines behind a common trait:
 *   - `synthesis::piper`: Piper subprocess engine
 *   - `synthesis::espeak`: eSpeak NG subprocess engine
 *   - `synthesis::server`: HTTP TTS server engine
 *   - `synthesis::mock`: Deterministic silent engine for tests
 *   - `synthesis::cache`: Content-addressed narration clip cache
 * - `audio_utils`: Clip duration probing and concatenation
 * - `video_renderer`: ffmpeg filter graphs and render passes
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
// Add other lints you want to allow but not auto-fix

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod audio_utils;
pub mod errors;
pub mod file_utils;
pub mod segmenter;
pub mod synthesis;
pub mod timeline;
pub mod video_renderer;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use segmenter::{CaptionUnit, Segmenter};
pub use synthesis::{NarrationClip, SpeechSynthesizer};
pub use timeline::{CaptionTimeline, TimelineEntry, VisibleUnit};
pub use errors::{AppError, RenderError, SynthesisError, TimelineError};
