/*!
 * Integration tests for controller runs over files and folders
 */

use anyhow::Result;
use std::fs;

use epiparse::app_config::Config;
use epiparse::app_controller::Controller;
use epiparse::assembler::EpisodeDocument;
use epiparse::validation::ValidationStatus;

use crate::common;

/// Test the controller initialization with default config
#[test]
fn test_controller_initialization_withDefaultConfig_shouldSucceed() -> Result<()> {
    let controller = Controller::new_for_test()?;
    assert_eq!(controller.config(), &Config::default());
    Ok(())
}

#[test]
fn test_run_withValidScript_shouldWriteAllOutputs() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_episode(temp_dir.path())?;
    let output_dir = temp_dir.path().join("out");

    let run = Controller::new_for_test()?.run(&input, &output_dir, false)?;

    assert_eq!(run.outputs.json, output_dir.join("episode_001.json"));
    assert!(run.outputs.json.exists());
    assert!(output_dir.join("episode_001_validation.txt").exists());
    assert!(output_dir.join("episode_001_cost_report.txt").exists());
    assert!(run.outputs.debug_dump.is_none());
    assert!(!output_dir.join("debug").exists());

    let document: EpisodeDocument = serde_json::from_str(&fs::read_to_string(&run.outputs.json)?)?;
    assert_eq!(document.status(), run.status);
    assert_eq!(document.scenes.len(), 2);
    assert_eq!(document.episode_metadata.title, "Episode 001");
    Ok(())
}

#[test]
fn test_run_withDebug_shouldWriteDebugDump() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_episode(temp_dir.path())?;
    let output_dir = temp_dir.path().join("out");

    let run = Controller::new_for_test()?.run(&input, &output_dir, true)?;

    let debug_path = output_dir.join("debug").join("episode_001_debug.json");
    assert_eq!(run.outputs.debug_dump.as_ref(), Some(&debug_path));
    let dump: serde_json::Value = serde_json::from_str(&fs::read_to_string(&debug_path)?)?;
    assert!(dump["debug_info"]["scene_spans"].is_array());
    let tags = dump["debug_info"]["scene_spans"][0]["tags"].as_array().cloned().unwrap_or_default();
    let ids: Vec<&str> = tags.iter().filter_map(|tag| tag["id"].as_str()).collect();
    assert_eq!(ids, ["COLD OPEN", "cave_entrance", "dripping_water", "ominous_theme"]);
    assert_eq!(tags[0]["kind"], "scene");
    assert!(dump["debug_info"]["configuration"]["costs"].is_object());
    Ok(())
}

#[test]
fn test_run_withCostReportDisabled_shouldSkipIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_episode(temp_dir.path())?;
    let output_dir = temp_dir.path().join("out");

    let mut config = Config::default();
    config.parser.write_cost_report = false;
    let run = Controller::with_config(config)?.run(&input, &output_dir, false)?;

    assert!(run.outputs.cost_report.is_none());
    assert!(!output_dir.join("episode_001_cost_report.txt").exists());
    Ok(())
}

#[test]
fn test_run_withMissingInput_shouldStillWriteFailedDocument() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("out");

    let run = Controller::new_for_test()?.run(&temp_dir.path().join("episode_404.md"), &output_dir, false)?;

    assert_eq!(run.status, ValidationStatus::Failed);
    let report = fs::read_to_string(output_dir.join("episode_404_validation.txt"))?;
    assert!(report.contains("Status: failed"));
    assert!(report.contains("Parser failed:"));
    Ok(())
}

#[test]
fn test_runFolder_shouldProcessEveryScriptAndReturnWorstStatus() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let scripts = temp_dir.path().join("scripts");
    fs::create_dir_all(scripts.join("season_1"))?;
    common::create_test_file(&scripts, "episode_001.md", common::FULL_EPISODE)?;
    common::create_test_file(&scripts.join("season_1"), "episode_002.md", common::NO_SCENES)?;
    common::create_test_file(&scripts, "notes.txt", "ignored")?;
    let output_dir = temp_dir.path().join("out");

    let status = Controller::new_for_test()?.run_folder(&scripts, &output_dir, false)?;

    assert_eq!(status, ValidationStatus::Warning);
    assert!(output_dir.join("episode_001.json").exists());
    assert!(output_dir.join("season_1").join("episode_002.json").exists());
    assert!(!output_dir.join("notes.json").exists());
    Ok(())
}

#[test]
fn test_runFolder_withSameStemInSiblingDirs_shouldKeepBothOutputs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let scripts = temp_dir.path().join("scripts");
    fs::create_dir_all(scripts.join("season1"))?;
    fs::create_dir_all(scripts.join("season2"))?;
    common::create_test_file(&scripts.join("season1"), "episode_001.md", common::FULL_EPISODE)?;
    common::create_test_file(&scripts.join("season2"), "episode_001.md", &common::single_scene("ZARA: \"Alone.\""))?;
    let output_dir = temp_dir.path().join("out");

    Controller::new_for_test()?.run_folder(&scripts, &output_dir, false)?;

    let first: EpisodeDocument =
        serde_json::from_str(&fs::read_to_string(output_dir.join("season1").join("episode_001.json"))?)?;
    let second: EpisodeDocument =
        serde_json::from_str(&fs::read_to_string(output_dir.join("season2").join("episode_001.json"))?)?;
    assert_eq!(first.scenes.len(), 2);
    assert_eq!(second.scenes.len(), 1);
    assert!(output_dir.join("season2").join("episode_001_validation.txt").exists());
    assert!(!output_dir.join("episode_001.json").exists());
    Ok(())
}

#[test]
fn test_runFolder_withSameStemInOneDir_shouldSkipSecondAndFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let scripts = temp_dir.path().join("scripts");
    fs::create_dir_all(&scripts)?;
    // Sorted order puts .markdown before .md
    common::create_test_file(&scripts, "episode_001.markdown", common::FULL_EPISODE)?;
    common::create_test_file(&scripts, "episode_001.md", common::NO_SCENES)?;
    let output_dir = temp_dir.path().join("out");

    let status = Controller::new_for_test()?.run_folder(&scripts, &output_dir, false)?;

    assert_eq!(status, ValidationStatus::Failed);
    let document: EpisodeDocument = serde_json::from_str(&fs::read_to_string(output_dir.join("episode_001.json"))?)?;
    assert_eq!(document.scenes.len(), 2);
    Ok(())
}

#[test]
fn test_runFolder_withoutScripts_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = Controller::new_for_test()?.run_folder(temp_dir.path(), &temp_dir.path().join("out"), false);
    assert!(result.is_err());
    Ok(())
}

#[test]
fn test_regenerateCostReport_shouldRebuildFromJson() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_episode(temp_dir.path())?;
    let output_dir = temp_dir.path().join("out");

    let mut config = Config::default();
    config.parser.write_cost_report = false;
    let run = Controller::with_config(config)?.run(&input, &output_dir, false)?;

    let report_path = Controller::regenerate_cost_report(&run.outputs.json)?;
    assert_eq!(report_path, output_dir.join("episode_001_cost_report.txt"));
    let report = fs::read_to_string(&report_path)?;
    assert!(report.contains("EPISODE PRODUCTION COST ESTIMATION REPORT"));
    assert!(report.contains("Episode: Episode 001"));
    Ok(())
}
