/*!
 * Tests that run the epiparse binary
 */

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

use crate::common;

/// Helper to create a CLI command
fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_epiparse"))
}

#[test]
fn test_help_shouldListCommands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("parse"))
        .stdout(predicate::str::contains("escape"))
        .stdout(predicate::str::contains("init-config"));
}

#[test]
fn test_parse_withValidScript_shouldExitZeroAndWriteJson() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_episode(temp_dir.path()).unwrap();
    let output_dir = temp_dir.path().join("out");

    cli()
        .current_dir(temp_dir.path())
        .arg("parse")
        .arg(&input)
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output_dir.join("episode_001.json")).unwrap()).unwrap();
    assert_eq!(json["episode_metadata"]["number"], "episode_001");
    assert_eq!(json["scenes"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_parse_withoutSubcommand_shouldDefaultToParse() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_episode(temp_dir.path()).unwrap();
    let output_dir = temp_dir.path().join("out");

    cli()
        .current_dir(temp_dir.path())
        .arg(&input)
        .arg("-o")
        .arg(&output_dir)
        .assert()
        .success();

    assert!(output_dir.join("episode_001_validation.txt").exists());
}

#[test]
fn test_parse_withMissingFile_shouldExitOneAndWriteFailedDocument() {
    let temp_dir = common::create_temp_dir().unwrap();
    let output_dir = temp_dir.path().join("out");

    cli()
        .current_dir(temp_dir.path())
        .arg("parse")
        .arg(temp_dir.path().join("episode_404.md"))
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .failure()
        .code(1);

    let json = fs::read_to_string(output_dir.join("episode_404.json")).unwrap();
    assert!(json.contains("\"validation_status\": \"failed\""));
}

#[test]
fn test_parse_withFailOnCriticalConfig_shouldExitOne() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(temp_dir.path(), "episode_009.md", common::NO_SCENES).unwrap();
    let config = common::create_test_file(
        temp_dir.path(),
        "strict.json",
        r#"{ "validation": { "fail_on_critical_errors": true } }"#,
    )
    .unwrap();

    cli()
        .current_dir(temp_dir.path())
        .arg("parse")
        .arg(&input)
        .arg("--config-path")
        .arg(&config)
        .arg("-o")
        .arg(temp_dir.path().join("out"))
        .assert()
        .code(1);
}

#[test]
fn test_escape_withVerify_shouldReportWhetherProcessingIsNeeded() {
    let temp_dir = common::create_temp_dir().unwrap();
    let bare = common::create_test_file(temp_dir.path(), "bare.md", "[SFX: boom]\n").unwrap();
    let clean = common::create_test_file(temp_dir.path(), "clean.md", "\\[SFX: boom\\]\n").unwrap();

    cli().arg("escape").arg(&bare).arg("--verify").assert().success();
    cli().arg("escape").arg(&clean).arg("--verify").assert().code(1);
    assert!(!temp_dir.path().join("bare_processed.md").exists());
}

#[test]
fn test_escape_withJson_shouldPrintReport() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(temp_dir.path(), "episode_001.md", "[IMG: a]\n[THUMBNAIL]\n").unwrap();

    cli()
        .arg("escape")
        .arg(&input)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_fixed\": 2"));

    let written = fs::read_to_string(temp_dir.path().join("episode_001_processed.md")).unwrap();
    assert_eq!(written, "\\[IMG: a\\]\n\\[THUMBNAIL\\]\n");
}

#[test]
fn test_initConfig_shouldRefuseToOverwriteWithoutForce() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("config.json");

    cli().arg("init-config").arg("--config-path").arg(&path).assert().success();
    assert!(path.exists());

    cli().arg("init-config").arg("--config-path").arg(&path).assert().failure();
    cli()
        .arg("init-config")
        .arg("--config-path")
        .arg(&path)
        .arg("--force")
        .assert()
        .success();
}

#[test]
fn test_report_shouldRegenerateCostReport() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_episode(temp_dir.path()).unwrap();
    let output_dir = temp_dir.path().join("out");

    cli()
        .current_dir(temp_dir.path())
        .arg("parse")
        .arg(&input)
        .arg("-o")
        .arg(&output_dir)
        .assert()
        .success();
    let report_path = output_dir.join("episode_001_cost_report.txt");
    fs::remove_file(&report_path).unwrap();

    cli().arg("report").arg(output_dir.join("episode_001.json")).assert().success();
    assert!(report_path.exists());
}

#[test]
fn test_completions_shouldPrintScript() {
    cli()
        .arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("epiparse"));
}
