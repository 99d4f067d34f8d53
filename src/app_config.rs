use std::default::Default;
use std::fs;
use std::path::{Path, PathBuf};

use log::{LevelFilter, info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::script::TagKind;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Parser run settings
    #[serde(default)]
    pub parser: ParserConfig,

    /// Downstream production rates
    #[serde(default)]
    pub costs: RateTable,

    /// Speech timing model
    #[serde(default)]
    pub timing: SpeechConfig,

    /// Content validation rules
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Parser run settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ParserConfig {
    /// Parser version written into every output document
    #[serde(default = "default_version")]
    pub version: String,

    /// Output directory used when none is given on the command line
    #[serde(default = "default_output_dir")]
    pub default_output_dir: PathBuf,

    /// Write debug dumps without `--debug`
    #[serde(default)]
    pub default_debug_mode: bool,

    /// Soft processing time limit per episode; exceeding it adds a warning
    #[serde(default = "default_max_processing_time_seconds")]
    pub max_processing_time_seconds: f64,

    /// Write `<episode>_cost_report.txt` next to the JSON output
    #[serde(default = "default_true")]
    pub write_cost_report: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            default_output_dir: default_output_dir(),
            default_debug_mode: false,
            max_processing_time_seconds: default_max_processing_time_seconds(),
            write_cost_report: default_true(),
        }
    }
}

/// Unit prices of the downstream production services
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RateTable {
    /// Currency code used in reports
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Voice synthesis price per spoken character
    #[serde(default = "default_voice_per_character")]
    pub voice_per_character: f64,

    /// Price of one generated image
    #[serde(default = "default_image_per_generation")]
    pub image_per_generation: f64,

    /// Price of one sound effect, ambient bed or transition
    #[serde(default = "default_effect_per_use")]
    pub effect_per_use: f64,

    /// Price of one music cue
    #[serde(default = "default_music_per_cue")]
    pub music_per_cue: f64,

    /// Spoken characters per minute of audio, used for cost per minute
    #[serde(default = "default_expected_characters_per_minute")]
    pub expected_characters_per_minute: f64,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            voice_per_character: default_voice_per_character(),
            image_per_generation: default_image_per_generation(),
            effect_per_use: default_effect_per_use(),
            music_per_cue: default_music_per_cue(),
            expected_characters_per_minute: default_expected_characters_per_minute(),
        }
    }
}

/// Speech timing model
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpeechConfig {
    /// Speaking rate in words per minute
    #[serde(default = "default_speech_rate_wpm")]
    pub speech_rate_wpm: f64,

    /// Silence between two consecutive dialogues of a scene
    #[serde(default = "default_inter_speaker_pause_seconds")]
    pub inter_speaker_pause_seconds: f64,

    /// Gap between two consecutive scenes
    #[serde(default = "default_scene_transition_seconds")]
    pub scene_transition_seconds: f64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            speech_rate_wpm: default_speech_rate_wpm(),
            inter_speaker_pause_seconds: default_inter_speaker_pause_seconds(),
            scene_transition_seconds: default_scene_transition_seconds(),
        }
    }
}

/// Content validation settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ValidationConfig {
    /// Speakers that must say at least one line
    #[serde(default)]
    pub required_speakers: Vec<String>,

    /// Tag kinds that must appear at least once
    #[serde(default = "default_required_multimedia")]
    pub required_multimedia: Vec<TagKind>,

    /// Also raise a warning for each missing tag kind
    #[serde(default = "default_true")]
    pub warn_on_missing_tags: bool,

    /// Mark the episode as failed when a critical finding fires
    #[serde(default)]
    pub fail_on_critical_errors: bool,

    /// Individual rule switches
    #[serde(default)]
    pub rules: RuleToggles,

    /// Quality thresholds
    #[serde(default)]
    pub thresholds: QualityThresholds,

    /// JSON schema the output document must satisfy
    #[serde(default)]
    pub schema_path: Option<PathBuf>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            required_speakers: Vec::new(),
            required_multimedia: default_required_multimedia(),
            warn_on_missing_tags: default_true(),
            fail_on_critical_errors: false,
            rules: RuleToggles::default(),
            thresholds: QualityThresholds::default(),
            schema_path: None,
        }
    }
}

/// Switches for each validation rule
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RuleToggles {
    #[serde(default = "default_true")]
    pub required_speakers: bool,

    #[serde(default = "default_true")]
    pub required_multimedia: bool,

    /// Empty episode and empty scene checks
    #[serde(default = "default_true")]
    pub structure: bool,

    /// Dialogue volume and length checks
    #[serde(default = "default_true")]
    pub quality: bool,

    #[serde(default = "default_true")]
    pub image_coverage: bool,

    #[serde(default = "default_true")]
    pub duplicate_scene_ids: bool,
}

impl Default for RuleToggles {
    fn default() -> Self {
        Self {
            required_speakers: true,
            required_multimedia: true,
            structure: true,
            quality: true,
            image_coverage: true,
            duplicate_scene_ids: true,
        }
    }
}

/// Thresholds for quality suggestions
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QualityThresholds {
    #[serde(default = "default_min_dialogue_count")]
    pub min_dialogue_count: usize,

    #[serde(default = "default_min_character_count")]
    pub min_character_count: usize,

    #[serde(default = "default_min_dialogues_per_scene")]
    pub min_dialogues_per_scene: f64,

    /// Shorter dialogues get a suggestion
    #[serde(default = "default_min_dialogue_length")]
    pub min_dialogue_length: usize,

    /// Longer dialogues are a format violation
    #[serde(default = "default_max_dialogue_length")]
    pub max_dialogue_length: usize,

    /// Fraction of scenes expected to carry at least one image tag
    #[serde(default = "default_min_image_scene_ratio")]
    pub min_image_scene_ratio: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_dialogue_count: default_min_dialogue_count(),
            min_character_count: default_min_character_count(),
            min_dialogues_per_scene: default_min_dialogues_per_scene(),
            min_dialogue_length: default_min_dialogue_length(),
            max_dialogue_length: default_max_dialogue_length(),
            min_image_scene_ratio: default_min_image_scene_ratio(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output/json")
}

fn default_max_processing_time_seconds() -> f64 {
    10.0
}

fn default_true() -> bool {
    true
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_voice_per_character() -> f64 {
    0.0003
}

fn default_image_per_generation() -> f64 {
    0.04
}

fn default_effect_per_use() -> f64 {
    0.01
}

fn default_music_per_cue() -> f64 {
    0.05
}

fn default_expected_characters_per_minute() -> f64 {
    750.0
}

fn default_speech_rate_wpm() -> f64 {
    150.0
}

fn default_inter_speaker_pause_seconds() -> f64 {
    0.5
}

fn default_scene_transition_seconds() -> f64 {
    2.0
}

fn default_required_multimedia() -> Vec<TagKind> {
    vec![TagKind::Image, TagKind::Sfx, TagKind::Music]
}

fn default_min_dialogue_count() -> usize {
    10
}

fn default_min_character_count() -> usize {
    500
}

fn default_min_dialogues_per_scene() -> f64 {
    2.0
}

fn default_min_dialogue_length() -> usize {
    10
}

fn default_max_dialogue_length() -> usize {
    1000
}

fn default_min_image_scene_ratio() -> f64 {
    0.5
}

impl Config {
    /// Read and validate a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, falling back to defaults.
    ///
    /// A missing file silently yields the defaults. A file that cannot be
    /// read, parsed or validated is reported and also yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("Config file not found at '{}', using defaults", path.display());
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{}. Using default configuration.", e);
                Self::default()
            }
        }
    }

    /// Write the default configuration as pretty JSON
    pub fn write_default<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&Self::default()).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, json).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let costs = &self.costs;
        let rates = [
            ("costs.voice_per_character", costs.voice_per_character),
            ("costs.image_per_generation", costs.image_per_generation),
            ("costs.effect_per_use", costs.effect_per_use),
            ("costs.music_per_cue", costs.music_per_cue),
        ];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{} must be a non-negative number, got {}", name, value)));
            }
        }

        let wpm = self.timing.speech_rate_wpm;
        if !wpm.is_finite() || wpm <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "timing.speech_rate_wpm must be positive, got {}",
                self.timing.speech_rate_wpm
            )));
        }

        let thresholds = &self.validation.thresholds;
        if thresholds.min_dialogue_length > thresholds.max_dialogue_length {
            return Err(ConfigError::Invalid(format!(
                "validation.thresholds.min_dialogue_length ({}) exceeds max_dialogue_length ({})",
                thresholds.min_dialogue_length, thresholds.max_dialogue_length
            )));
        }

        if !(0.0..=1.0).contains(&thresholds.min_image_scene_ratio) {
            return Err(ConfigError::Invalid(format!(
                "validation.thresholds.min_image_scene_ratio must be within 0..=1, got {}",
                thresholds.min_image_scene_ratio
            )));
        }

        Ok(())
    }
}
