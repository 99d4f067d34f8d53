/*!
 * Tests for the tag escaping pre-processor
 */

use anyhow::Result;
use std::path::Path;

use epiparse::escaper::TagEscaper;
use epiparse::script::{ScriptGrammar, TagKind, parse_script};

use crate::common;

const BARE_SCRIPT: &str = "## **[SCENE: COLD OPEN]**\n\n[IMG: cave] PROMPT: \"A cave\"\n[SFX: drip]\n\nTHORAK: \"Hello there\"\n";

#[test]
fn test_processFile_shouldWriteEscapedCopy() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "episode_001.md", BARE_SCRIPT)?;

    let report = TagEscaper::process_file(&input, None, false)?;
    assert!(report.needs_processing);
    assert!(report.written);
    assert_eq!(report.total_fixed, 3);
    assert_eq!(report.output_file, temp_dir.path().join("episode_001_processed.md"));

    let written = std::fs::read_to_string(&report.output_file)?;
    assert!(written.contains("## **\\[SCENE: COLD OPEN\\]**"));
    // The input is left untouched
    assert_eq!(std::fs::read_to_string(&input)?, BARE_SCRIPT);
    Ok(())
}

#[test]
fn test_processFile_withDryRun_shouldNotWrite() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "episode_001.md", BARE_SCRIPT)?;
    let output = temp_dir.path().join("out.md");

    let report = TagEscaper::process_file(&input, Some(&output), true)?;
    assert!(report.needs_processing);
    assert!(!report.written);
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_processFile_withMissingInput_shouldFail() {
    let result = TagEscaper::process_file(Path::new("/nonexistent/episode_001.md"), None, false);
    assert!(result.is_err());
}

#[test]
fn test_escape_thenParse_shouldRecoverAllTags() {
    let escaped = TagEscaper::escape(BARE_SCRIPT).content;
    let grammar = ScriptGrammar::new().expect("grammar should compile");

    let before = parse_script(&grammar, BARE_SCRIPT, Path::new("episode_001.md"));
    let after = parse_script(&grammar, &escaped, Path::new("episode_001.md"));

    assert!(before.scenes.is_empty());
    assert_eq!(after.scenes.len(), 1);
    assert_eq!(after.tag_count(TagKind::Image), 1);
    assert_eq!(after.tag_count(TagKind::Sfx), 1);
    assert_eq!(after.dialogue_count(), 1);
}
