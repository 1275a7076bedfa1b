// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_arguments)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app_config::{CaptionAlign, Config, RenderMode, SynthesisEngine};
use app_controller::Controller;

mod app_config;
mod app_controller;
mod audio_utils;
mod errors;
mod file_utils;
mod segmenter;
mod synthesis;
mod timeline;
mod video_renderer;

/// CLI Wrapper for SynthesisEngine to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSynthesisEngine {
    Piper,
    Espeak,
    Server,
    Mock,
}

impl From<CliSynthesisEngine> for SynthesisEngine {
    fn from(cli_engine: CliSynthesisEngine) -> Self {
        match cli_engine {
            CliSynthesisEngine::Piper => SynthesisEngine::Piper,
            CliSynthesisEngine::Espeak => SynthesisEngine::Espeak,
            CliSynthesisEngine::Server => SynthesisEngine::Server,
            CliSynthesisEngine::Mock => SynthesisEngine::Mock,
        }
    }
}

/// CLI Wrapper for CaptionAlign to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliCaptionAlign {
    Left,
    Center,
    Right,
}

impl From<CliCaptionAlign> for CaptionAlign {
    fn from(cli_align: CliCaptionAlign) -> Self {
        match cli_align {
            CliCaptionAlign::Left => CaptionAlign::Left,
            CliCaptionAlign::Center => CaptionAlign::Center,
            CliCaptionAlign::Right => CaptionAlign::Right,
        }
    }
}

/// CLI Wrapper for RenderMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliRenderMode {
    Composite,
    Segments,
}

impl From<CliRenderMode> for RenderMode {
    fn from(cli_mode: CliRenderMode) -> Self {
        match cli_mode {
            CliRenderMode::Composite => RenderMode::Composite,
            CliRenderMode::Segments => RenderMode::Segments,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a narrated video from a script and a background image (default command)
    #[command(alias = "render")]
    Render(RenderArgs),

    /// Generate shell completions for narravid
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input script file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Background image for the video
    #[arg(short, long, value_name = "IMAGE")]
    image: PathBuf,

    /// Output video path (defaults to the script path with an mp4 extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Speech engine to use
    #[arg(short, long, value_enum)]
    engine: Option<CliSynthesisEngine>,

    /// Voice name to use for narration
    #[arg(short, long)]
    voice: Option<String>,

    /// Render mode: one pass or per-unit segments
    #[arg(short, long, value_enum)]
    mode: Option<CliRenderMode>,

    /// Also write the caption timeline as an SRT file
    #[arg(long, value_name = "SRT_PATH")]
    captions: Option<PathBuf>,

    /// Caption font size in pixels
    #[arg(long)]
    font_size: Option<u32>,

    /// Caption wrap width as a fraction of the frame width
    #[arg(long)]
    wrap_ratio: Option<f64>,

    /// Caption alignment inside the wrap box
    #[arg(long, value_enum)]
    align: Option<CliCaptionAlign>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// List the caption units without synthesizing or rendering
    #[arg(short, long)]
    dry_run: bool,
}

/// narravid - Narrated Video Renderer
///
/// Turns a plain-text script and a static background image into a narrated
/// video with progressively revealed captions.
#[derive(Parser, Debug)]
#[command(name = "narravid")]
#[command(author = "narravid Team")]
#[command(version = "1.0.0")]
#[command(about = "Script-to-video narration tool")]
#[command(long_about = "narravid reads a plain-text script, narrates it with a \
local or remote speech engine, and renders a video in which each caption unit \
appears as it is spoken and stays on screen afterwards.

EXAMPLES:
    narravid -i cover.png script.txt            # Render using default config
    narravid -i cover.png -f script.txt         # Force overwrite existing files
    narravid -i cover.png -e espeak script.txt  # Use a specific speech engine
    narravid -i cover.png -m segments script.txt # Render one clip per unit
    narravid -i cover.png --captions out.srt script.txt # Also write an SRT file
    narravid -i cover.png -d script.txt         # Show caption units, render nothing
    narravid -i cover.png /scripts/             # Process an entire directory
    narravid completions bash > narravid.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.

SUPPORTED ENGINES:
    piper   - Local Piper TTS subprocess (default: en_US-lessac-medium.onnx)
    espeak  - Local eSpeak NG subprocess
    server  - HTTP TTS server speaking JSON
    mock    - Silent deterministic clips, for tests and dry runs")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input script file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Background image for the video
    #[arg(short, long, value_name = "IMAGE")]
    image: Option<PathBuf>,

    /// Output video path (defaults to the script path with an mp4 extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Speech engine to use
    #[arg(short, long, value_enum)]
    engine: Option<CliSynthesisEngine>,

    /// Voice name to use for narration
    #[arg(short, long)]
    voice: Option<String>,

    /// Render mode: one pass or per-unit segments
    #[arg(short, long, value_enum)]
    mode: Option<CliRenderMode>,

    /// Also write the caption timeline as an SRT file
    #[arg(long, value_name = "SRT_PATH")]
    captions: Option<PathBuf>,

    /// Caption font size in pixels
    #[arg(long)]
    font_size: Option<u32>,

    /// Caption wrap width as a fraction of the frame width
    #[arg(long)]
    wrap_ratio: Option<f64>,

    /// Caption alignment inside the wrap box
    #[arg(long, value_enum)]
    align: Option<CliCaptionAlign>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// List the caption units without synthesizing or rendering
    #[arg(short, long)]
    dry_run: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");

            let mut stderr = std::io::stderr();
            let emoji = Self::get_emoji_for_level(record.level());
            let _ = match record.level() {
                Level::Error => writeln!(
                    stderr,
                    "\x1B[1;31m{} {} {}\x1B[0m",
                    now,
                    emoji,
                    record.args()
                ),
                Level::Warn => writeln!(
                    stderr,
                    "\x1B[1;33m{} {} {}\x1B[0m",
                    now,
                    emoji,
                    record.args()
                ),
                Level::Info => writeln!(
                    stderr,
                    "\x1B[1;32m{} {} {}\x1B[0m",
                    now,
                    emoji,
                    record.args()
                ),
                Level::Debug => writeln!(
                    stderr,
                    "\x1B[1;36m{} {} {}\x1B[0m",
                    now,
                    emoji,
                    record.args()
                ),
                Level::Trace => writeln!(
                    stderr,
                    "\x1B[1;35m{} {} {}\x1B[0m",
                    now,
                    emoji,
                    record.args()
                ),
            };
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "narravid", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Render(args)) => run_render(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;
            let image = cli
                .image
                .ok_or_else(|| anyhow!("--image is required when no subcommand is specified"))?;

            let render_args = RenderArgs {
                input_path,
                image,
                output: cli.output,
                force_overwrite: cli.force_overwrite,
                engine: cli.engine,
                voice: cli.voice,
                mode: cli.mode,
                captions: cli.captions,
                font_size: cli.font_size,
                wrap_ratio: cli.wrap_ratio,
                align: cli.align,
                config_path: cli.config_path,
                log_level: cli.log_level,
                dry_run: cli.dry_run,
            };
            run_render(render_args).await
        }
    }
}

async fn run_render(options: RenderArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        let log_level = match config_log_level {
            app_config::LogLevel::Error => LevelFilter::Error,
            app_config::LogLevel::Warn => LevelFilter::Warn,
            app_config::LogLevel::Info => LevelFilter::Info,
            app_config::LogLevel::Debug => LevelFilter::Debug,
            app_config::LogLevel::Trace => LevelFilter::Trace,
        };
        log::set_max_level(log_level);
    }

    // Load or create configuration
    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        // Load existing configuration
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;

        config
    } else {
        // Create default configuration if not exists
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );

        let config = Config::default();

        // Save default config
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Override config with CLI options if provided
    if let Some(engine) = &options.engine {
        config.synthesis.engine = engine.clone().into();
    }

    if let Some(voice) = &options.voice {
        // Find the active engine config and update the voice
        let engine_str = config.synthesis.engine.to_lowercase_string();
        if let Some(engine_config) = config
            .synthesis
            .available_engines
            .iter_mut()
            .find(|e| e.engine_type == engine_str)
        {
            engine_config.voice = voice.clone();
        }
    }

    if let Some(mode) = &options.mode {
        config.video.mode = mode.clone().into();
    }

    if let Some(font_size) = options.font_size {
        config.captions.font_size = font_size;
    }

    if let Some(wrap_ratio) = options.wrap_ratio {
        config.captions.wrap_width_ratio = wrap_ratio;
    }

    if let Some(align) = &options.align {
        config.captions.align = align.clone().into();
    }

    // Update log level in config if specified via command line
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    // Validate the configuration after loading and overriding
    config
        .validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        let log_level = match config.log_level {
            app_config::LogLevel::Error => LevelFilter::Error,
            app_config::LogLevel::Warn => LevelFilter::Warn,
            app_config::LogLevel::Info => LevelFilter::Info,
            app_config::LogLevel::Debug => LevelFilter::Debug,
            app_config::LogLevel::Trace => LevelFilter::Trace,
        };

        // Just update the max level without reinitializing the logger
        log::set_max_level(log_level);
    }

    // Create controller
    let controller = Controller::with_config(config.clone())?;

    // Handle dry-run mode: segment only, render nothing
    if options.dry_run {
        if !options.input_path.is_file() {
            return Err(anyhow!(
                "Dry run requires a script file, got: {:?}",
                options.input_path
            ));
        }

        let units = controller.list_units(&options.input_path)?;
        info!(
            "{:?} segments into {} caption units:",
            options.input_path,
            units.len()
        );
        for (index, unit) in units.iter().enumerate() {
            info!("  {:>3}. {}", index + 1, unit.text);
        }

        return Ok(());
    }

    // Run the controller with the input file(s)
    if options.input_path.is_file() {
        // Process a single file
        controller
            .run(
                options.input_path.clone(),
                options.image.clone(),
                options.output.clone(),
                options.captions.clone(),
                options.force_overwrite,
            )
            .await?;
    } else if options.input_path.is_dir() {
        // Process a directory
        controller
            .run_folder(
                options.input_path.clone(),
                options.image.clone(),
                options.force_overwrite,
            )
            .await?;
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    Ok(())
}
