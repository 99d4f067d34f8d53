/*!
 * Tests for application configuration functionality
 */

use std::path::PathBuf;

use epiparse::app_config::{Config, LogLevel};
use epiparse::errors::ConfigError;
use epiparse::script::TagKind;

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.parser.default_output_dir, PathBuf::from("output/json"));
    assert_eq!(config.parser.max_processing_time_seconds, 10.0);
    assert!(config.parser.write_cost_report);

    assert_eq!(config.costs.currency, "USD");
    assert_eq!(config.costs.voice_per_character, 0.0003);
    assert_eq!(config.costs.image_per_generation, 0.04);
    assert_eq!(config.costs.effect_per_use, 0.01);
    assert_eq!(config.costs.music_per_cue, 0.05);
    assert_eq!(config.costs.expected_characters_per_minute, 750.0);

    assert_eq!(config.timing.speech_rate_wpm, 150.0);
    assert_eq!(config.timing.inter_speaker_pause_seconds, 0.5);
    assert_eq!(config.timing.scene_transition_seconds, 2.0);

    assert_eq!(
        config.validation.required_multimedia,
        vec![TagKind::Image, TagKind::Sfx, TagKind::Music]
    );
    assert!(!config.validation.fail_on_critical_errors);
    assert_eq!(config.validation.thresholds.max_dialogue_length, 1000);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.costs.image_per_generation = -0.01;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    config.costs.image_per_generation = 0.04;

    config.timing.speech_rate_wpm = 0.0;
    assert!(config.validate().is_err());
    config.timing.speech_rate_wpm = 150.0;

    config.validation.thresholds.min_dialogue_length = 2000;
    assert!(config.validate().is_err());
    config.validation.thresholds.min_dialogue_length = 10;

    config.validation.thresholds.min_image_scene_ratio = 1.5;
    assert!(config.validate().is_err());
    config.validation.thresholds.min_image_scene_ratio = 0.5;

    assert!(config.validate().is_ok());
}

#[test]
fn test_loadOrDefault_withPartialFile_shouldFillDefaults() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        dir.path(),
        "config.json",
        r#"{ "costs": { "currency": "EUR", "image_per_generation": 0.1 }, "log_level": "debug" }"#,
    )?;

    let config = Config::load_or_default(&path);
    assert_eq!(config.costs.currency, "EUR");
    assert_eq!(config.costs.image_per_generation, 0.1);
    assert_eq!(config.costs.voice_per_character, 0.0003);
    assert_eq!(config.timing.speech_rate_wpm, 150.0);
    assert_eq!(config.log_level, LogLevel::Debug);
    Ok(())
}

#[test]
fn test_loadOrDefault_withMalformedOrInvalidFile_shouldFallBack() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;

    let malformed = common::create_test_file(dir.path(), "broken.json", "{ not json")?;
    assert_eq!(Config::load_or_default(&malformed), Config::default());
    assert!(matches!(Config::from_file(&malformed), Err(ConfigError::Parse { .. })));

    let invalid = common::create_test_file(dir.path(), "invalid.json", r#"{ "timing": { "speech_rate_wpm": -5 } }"#)?;
    assert_eq!(Config::load_or_default(&invalid), Config::default());

    let missing = dir.path().join("nope.json");
    assert_eq!(Config::load_or_default(&missing), Config::default());
    assert!(matches!(Config::from_file(&missing), Err(ConfigError::Read { .. })));
    Ok(())
}

#[test]
fn test_writeDefault_shouldRoundTripThroughLoad() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("config.json");

    Config::write_default(&path)?;
    assert_eq!(Config::from_file(&path)?, Config::default());
    Ok(())
}
