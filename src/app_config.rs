use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Speech synthesis config
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Caption presentation config
    #[serde(default)]
    pub captions: CaptionStyle,

    /// Video assembly config
    #[serde(default)]
    pub video: VideoConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Speech synthesis engine type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisEngine {
    // @engine: Piper (local neural TTS subprocess)
    #[default]
    Piper,
    // @engine: eSpeak NG (local formant TTS subprocess)
    Espeak,
    // @engine: HTTP TTS server
    Server,
    // @engine: Deterministic silent clips, for tests and dry machinery runs
    Mock,
}

impl SynthesisEngine {
    // @returns: Capitalized engine name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Piper => "Piper",
            Self::Espeak => "eSpeak NG",
            Self::Server => "TTS server",
            Self::Mock => "Mock",
        }
    }

    // @returns: Lowercase engine identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Piper => "piper".to_string(),
            Self::Espeak => "espeak".to_string(),
            Self::Server => "server".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }
}

// Implement Display trait for SynthesisEngine
impl std::fmt::Display for SynthesisEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for SynthesisEngine
impl std::str::FromStr for SynthesisEngine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "piper" => Ok(Self::Piper),
            "espeak" | "espeak-ng" => Ok(Self::Espeak),
            "server" => Ok(Self::Server),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid synthesis engine: {}", s)),
        }
    }
}

/// Engine configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    // @field: Engine type identifier
    #[serde(rename = "type")]
    pub engine_type: String,

    // @field: Model file or model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: Voice identifier
    #[serde(default = "String::new")]
    pub voice: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Speaking rate in words per minute
    #[serde(default = "default_speed_wpm")]
    pub speed_wpm: u32,

    // @field: Timeout seconds per synthesized unit
    #[serde(default = "default_engine_timeout_secs")]
    pub timeout_secs: u64,
}

impl EngineConfig {
    // @param engine: Engine enum
    // @returns: Engine config with defaults
    pub fn new(engine: SynthesisEngine) -> Self {
        match engine {
            SynthesisEngine::Piper => Self {
                engine_type: "piper".to_string(),
                model: default_piper_model(),
                voice: String::new(),
                endpoint: String::new(),
                speed_wpm: default_speed_wpm(),
                timeout_secs: default_engine_timeout_secs(),
            },
            SynthesisEngine::Espeak => Self {
                engine_type: "espeak".to_string(),
                model: String::new(),
                voice: default_espeak_voice(),
                endpoint: String::new(),
                speed_wpm: default_speed_wpm(),
                timeout_secs: default_engine_timeout_secs(),
            },
            SynthesisEngine::Server => Self {
                engine_type: "server".to_string(),
                model: String::new(),
                voice: default_server_voice(),
                endpoint: default_server_endpoint(),
                speed_wpm: default_speed_wpm(),
                timeout_secs: default_engine_timeout_secs(),
            },
            SynthesisEngine::Mock => Self {
                engine_type: "mock".to_string(),
                model: String::new(),
                voice: String::new(),
                endpoint: String::new(),
                speed_wpm: default_speed_wpm(),
                timeout_secs: default_engine_timeout_secs(),
            },
        }
    }
}

/// Speech synthesis service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SynthesisConfig {
    /// Synthesis engine to use
    #[serde(default)]
    pub engine: SynthesisEngine,

    /// Available synthesis engines
    #[serde(default)]
    pub available_engines: Vec<EngineConfig>,

    /// Reuse previously synthesized clips keyed by engine, voice, model and text
    #[serde(default)]
    pub cache_enabled: bool,
}

impl SynthesisConfig {
    /// Get the active engine configuration from the available_engines array
    pub fn get_active_engine_config(&self) -> Option<&EngineConfig> {
        let engine_str = self.engine.to_lowercase_string();
        self.available_engines
            .iter()
            .find(|e| e.engine_type == engine_str)
    }

    /// Get a specific engine configuration by type for testing
    pub fn get_engine_config(&self, engine: &SynthesisEngine) -> Option<&EngineConfig> {
        let engine_str = engine.to_lowercase_string();
        self.available_engines
            .iter()
            .find(|e| e.engine_type == engine_str)
    }

    /// Get the model for the active engine
    pub fn get_model(&self) -> String {
        if let Some(engine_config) = self.get_active_engine_config() {
            if !engine_config.model.is_empty() {
                return engine_config.model.clone();
            }
        }

        // Default fallback based on engine type
        match self.engine {
            SynthesisEngine::Piper => default_piper_model(),
            _ => String::new(),
        }
    }

    /// Get the voice for the active engine
    pub fn get_voice(&self) -> String {
        if let Some(engine_config) = self.get_active_engine_config() {
            if !engine_config.voice.is_empty() {
                return engine_config.voice.clone();
            }
        }

        // Default fallback based on engine type
        match self.engine {
            SynthesisEngine::Espeak => default_espeak_voice(),
            SynthesisEngine::Server => default_server_voice(),
            _ => String::new(),
        }
    }

    /// Get the endpoint for the active engine
    pub fn get_endpoint(&self) -> String {
        if let Some(engine_config) = self.get_active_engine_config() {
            if !engine_config.endpoint.is_empty() {
                return engine_config.endpoint.clone();
            }
        }

        // Default fallback, only the server engine has one
        match self.engine {
            SynthesisEngine::Server => default_server_endpoint(),
            _ => String::new(),
        }
    }

    /// Get the speaking rate for the active engine
    pub fn get_speed_wpm(&self) -> u32 {
        if let Some(engine_config) = self.get_active_engine_config() {
            if engine_config.speed_wpm > 0 {
                return engine_config.speed_wpm;
            }
        }

        default_speed_wpm()
    }

    /// Get the per-unit timeout for the active engine
    pub fn get_timeout_secs(&self) -> u64 {
        if let Some(engine_config) = self.get_active_engine_config() {
            if engine_config.timeout_secs > 0 {
                return engine_config.timeout_secs;
            }
        }

        default_engine_timeout_secs()
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        let mut config = Self {
            engine: SynthesisEngine::default(),
            available_engines: Vec::new(),
            cache_enabled: false,
        };

        // Add default engines
        config.available_engines.push(EngineConfig::new(SynthesisEngine::Piper));
        config.available_engines.push(EngineConfig::new(SynthesisEngine::Espeak));
        config.available_engines.push(EngineConfig::new(SynthesisEngine::Server));
        config.available_engines.push(EngineConfig::new(SynthesisEngine::Mock));

        config
    }
}

/// Caption text alignment within the wrap box
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaptionAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl std::fmt::Display for CaptionAlign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for CaptionAlign {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "left" | "west" => Ok(Self::Left),
            "center" | "centre" => Ok(Self::Center),
            "right" | "east" => Ok(Self::Right),
            _ => Err(anyhow!("Invalid caption alignment: {}", s)),
        }
    }
}

/// Caption presentation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CaptionStyle {
    /// Font family passed to the renderer
    #[serde(default = "default_font")]
    pub font: String,

    /// Font size in points
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Left edge of the caption block, in pixels
    #[serde(default = "default_position")]
    pub position_x: u32,

    /// Top edge of the caption block, in pixels
    #[serde(default = "default_position")]
    pub position_y: u32,

    /// Caption block width as a fraction of the frame width
    #[serde(default = "default_wrap_width_ratio")]
    pub wrap_width_ratio: f64,

    /// Vertical gap between stacked captions, in pixels
    #[serde(default = "default_line_spacing")]
    pub line_spacing: u32,

    /// Horizontal alignment within the wrap box
    #[serde(default)]
    pub align: CaptionAlign,

    /// Color of the unit currently narrated
    #[serde(default = "default_highlight_color")]
    pub highlight_color: String,

    /// Color of already narrated units
    #[serde(default = "default_base_color")]
    pub base_color: String,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font: default_font(),
            font_size: default_font_size(),
            position_x: default_position(),
            position_y: default_position(),
            wrap_width_ratio: default_wrap_width_ratio(),
            line_spacing: default_line_spacing(),
            align: CaptionAlign::default(),
            highlight_color: default_highlight_color(),
            base_color: default_base_color(),
        }
    }
}

/// Video assembly mode
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// One ffmpeg pass over the whole timeline
    #[default]
    Composite,
    /// One clip per unit, joined with short pauses
    Segments,
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Composite => "composite",
            Self::Segments => "segments",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for RenderMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "composite" => Ok(Self::Composite),
            "segments" => Ok(Self::Segments),
            _ => Err(anyhow!("Invalid render mode: {}", s)),
        }
    }
}

/// Video assembly settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VideoConfig {
    /// Output frame rate
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Output video codec
    #[serde(default = "default_codec")]
    pub codec: String,

    /// Silent gap between units in segments mode, in seconds
    #[serde(default = "default_pause_secs")]
    pub pause_secs: f64,

    /// Assembly mode
    #[serde(default)]
    pub mode: RenderMode,

    /// Keep the per-run working directory with clips and filter scripts
    #[serde(default)]
    pub keep_intermediates: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            codec: default_codec(),
            pause_secs: default_pause_secs(),
            mode: RenderMode::default(),
            keep_intermediates: false,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_font() -> String {
    "DejaVu Sans".to_string()
}

fn default_font_size() -> u32 {
    40
}

fn default_position() -> u32 {
    50
}

fn default_wrap_width_ratio() -> f64 {
    0.85
}

fn default_line_spacing() -> u32 {
    10
}

fn default_highlight_color() -> String {
    "blue".to_string()
}

fn default_base_color() -> String {
    "black".to_string()
}

fn default_fps() -> u32 {
    24
}

fn default_codec() -> String {
    "libx264".to_string()
}

fn default_pause_secs() -> f64 {
    0.3
}

fn default_speed_wpm() -> u32 {
    175
}

fn default_engine_timeout_secs() -> u64 {
    60
}

fn default_piper_model() -> String {
    "en_US-lessac-medium.onnx".to_string()
}

fn default_espeak_voice() -> String {
    "en-us".to_string()
}

fn default_server_voice() -> String {
    "default".to_string()
}

fn default_server_endpoint() -> String {
    "http://localhost:5002/api/tts".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate caption style
        if self.captions.font_size == 0 {
            return Err(anyhow!("Caption font size must be greater than zero"));
        }
        if self.captions.wrap_width_ratio <= 0.0 || self.captions.wrap_width_ratio > 1.0 {
            return Err(anyhow!(
                "Caption wrap width ratio must be in (0, 1], got {}",
                self.captions.wrap_width_ratio
            ));
        }
        if self.captions.highlight_color.is_empty() || self.captions.base_color.is_empty() {
            return Err(anyhow!("Caption colors must not be empty"));
        }

        // Validate video settings
        if self.video.fps == 0 {
            return Err(anyhow!("Frame rate must be greater than zero"));
        }
        if self.video.pause_secs < 0.0 {
            return Err(anyhow!(
                "Pause between segments cannot be negative, got {}",
                self.video.pause_secs
            ));
        }

        // Validate endpoint for the server engine
        if self.synthesis.engine == SynthesisEngine::Server {
            let endpoint = self.synthesis.get_endpoint();
            Url::parse(&endpoint)
                .map_err(|e| anyhow!("Invalid server endpoint '{}': {}", endpoint, e))?;
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            synthesis: SynthesisConfig::default(),
            captions: CaptionStyle::default(),
            video: VideoConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
