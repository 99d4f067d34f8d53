/*!
 * End-to-end tests for episode processing
 */

use anyhow::Result;

use epiparse::app_config::Config;
use epiparse::assembler::{EpisodeAssembler, EpisodeDocument, NO_SCENES_WARNING};
use epiparse::errors::ParseError;
use epiparse::script::TagKind;
use epiparse::validation::{OutputSchema, ValidationStatus};

use crate::common;

#[test]
fn test_assemble_withoutSceneMarkers_shouldWarnAndReturnNoScenes() {
    let document = common::assemble(common::NO_SCENES, Config::default());

    assert!(document.scenes.is_empty());
    assert_eq!(document.episode_metadata.total_scenes, 0);
    assert!(document.warnings.iter().any(|w| w == NO_SCENES_WARNING));
    assert!(document.warnings[0].starts_with("No scene markers found"));
    assert_ne!(document.status(), ValidationStatus::Passed);
}

#[test]
fn test_assemble_withSingleDialogue_shouldPriceFiveCharacters() {
    let document = common::assemble(&common::single_scene("THORAK: \"Hello\""), common::quiet_config());

    assert_eq!(document.scenes.len(), 1);
    let dialogues = &document.scenes[0].dialogues;
    assert_eq!(dialogues.len(), 1);
    assert_eq!(dialogues[0].speaker, "THORAK");
    assert_eq!(dialogues[0].character_count, 5);

    let voice = &document.metadata.detailed_cost_analysis.voice_generation;
    assert!((voice.total_cost - 5.0 * 0.0003).abs() < 1e-9);
    assert_eq!(document.metadata.character_count_by_speaker.get("THORAK"), Some(&5));
    assert_eq!(document.metadata.estimated_downstream_costs.voice_character_count, 5);
}

#[test]
fn test_assemble_withImagePrompt_shouldAddExactlyOneImageRate() {
    let without = common::assemble(&common::single_scene("THORAK: \"Hello\""), common::quiet_config());
    let with = common::assemble(
        &common::single_scene("\\[IMG: cave\\]\nPROMPT: \"A cave\"\n\nTHORAK: \"Hello\""),
        common::quiet_config(),
    );

    let images = with.scenes[0].multimedia.get(TagKind::Image);
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].tag_id.as_deref(), Some("cave"));
    assert_eq!(images[0].prompt.as_deref(), Some("A cave"));

    let delta = with.metadata.detailed_cost_analysis.total_episode_cost
        - without.metadata.detailed_cost_analysis.total_episode_cost;
    assert!((delta - 0.04).abs() < 1e-9, "delta was {}", delta);
}

#[test]
fn test_assemble_withTagsInCodeBlock_shouldNeverExtractThem() {
    let body = "```markdown\n\\[IMG: x\\]\n\\[SFX: y\\]\n\\[MUSIC: z\\]\n\\[AMBIENT: w\\]\n\\[TRANSITION: v\\]\n\\[THUMBNAIL\\]\n```\n\nTHORAK: \"Hello\"";
    let document = common::assemble(&common::single_scene(body), common::quiet_config());

    let multimedia = &document.scenes[0].multimedia;
    for kind in TagKind::ALL {
        let expected = if kind == TagKind::Scene { 1 } else { 0 };
        assert_eq!(multimedia.count(kind), expected, "unexpected {} tags", kind);
    }
    assert_eq!(document.metadata.detailed_cost_analysis.image_generation.total_images, 0);
}

#[test]
fn test_assemble_withTwoDialogues_shouldIncludeOnePause() {
    let document = common::assemble(&common::single_scene("A: \"Hi\"\nB: \"Yo\""), common::quiet_config());

    let timing = &document.metadata.timing_estimates;
    // 2 words at 150 wpm (0.8s) plus a single 0.5s pause
    assert_eq!(timing.scene_timings[0].dialogue_duration_seconds, 1.3);
    assert_eq!(timing.total_duration_seconds, 1.3);
    assert_eq!(timing.scene_timings[0].dialogue_count, 2);
}

#[test]
fn test_assemble_withOversizedDialogue_shouldWarnButStillParse() {
    let text = common::single_scene(&format!("THORAK: \"{}\"", "a".repeat(1001)));

    let document = common::assemble(&text, common::quiet_config());
    assert_eq!(document.scenes[0].dialogues[0].character_count, 1001);
    assert_eq!(document.status(), ValidationStatus::Warning);
    assert_eq!(document.feedback.format_violations.len(), 1);
    assert!(document.warnings.iter().any(|w| w.contains("1001 characters")));

    let mut strict = common::quiet_config();
    strict.validation.fail_on_critical_errors = true;
    let failed = common::assemble(&text, strict);
    assert_eq!(failed.status(), ValidationStatus::Failed);
    assert_eq!(failed.scenes.len(), 1);
}

#[test]
fn test_assemble_withFullEpisode_shouldPassQuietValidation() {
    let document = common::assemble(common::FULL_EPISODE, common::quiet_config());

    assert_eq!(document.status(), ValidationStatus::Passed);
    assert!(document.warnings.is_empty());
    assert_eq!(document.episode_metadata.total_scenes, 2);
    assert_eq!(document.episode_metadata.number, "episode_test");
    assert!(document.episode_metadata.content_preview.starts_with("# The Crystal Cave"));
    assert!(document.episode_metadata.content_preview.ends_with("..."));
}

#[test]
fn test_assemble_withMissingFile_shouldReturnFailedEmergencyDocument() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let assembler = EpisodeAssembler::new(Config::default())?;

    let document = assembler.assemble(&temp_dir.path().join("episode_404.md"));
    assert_eq!(document.status(), ValidationStatus::Failed);
    assert!(document.scenes.is_empty());
    assert!(document.warnings[0].starts_with("Parser failed:"));
    assert_eq!(document.episode_metadata.number, "episode_404");
    Ok(())
}

#[test]
fn test_assemble_withSchema_shouldFailOnViolation() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let schema_path = common::create_test_file(
        temp_dir.path(),
        "schema.json",
        r#"{ "type": "object", "required": ["metadata", "release_date"] }"#,
    )?;

    let mut config = common::quiet_config();
    config.validation.schema_path = Some(schema_path);
    let document = common::assemble(common::FULL_EPISODE, config);

    assert_eq!(document.status(), ValidationStatus::Failed);
    assert!(document.feedback.format_violations.iter().any(|v| v.contains("release_date")));
    Ok(())
}

fn bundled_schema_path() -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("schemas")
        .join("episode.schema.json")
}

#[test]
fn test_emergency_withBundledSchema_shouldConform() -> Result<()> {
    let schema = OutputSchema::load(bundled_schema_path())?;
    let path = std::path::Path::new("scripts/episode_404.md");
    let document = EpisodeDocument::emergency(path, &ParseError::NotFound(path.to_path_buf()));

    let violations = schema.validate(&serde_json::to_value(&document)?);
    assert!(violations.is_empty(), "{:?}", violations);
    assert_eq!(document.status(), ValidationStatus::Failed);
    Ok(())
}

#[test]
fn test_assemble_withBundledSchema_shouldProduceConformingDocument() {
    let mut config = Config::default();
    config.validation.schema_path = Some(bundled_schema_path());
    let document = common::assemble(common::FULL_EPISODE, config);

    assert!(
        !document.feedback.format_violations.iter().any(|v| v.starts_with("Schema violation")),
        "{:?}",
        document.feedback.format_violations
    );
}
