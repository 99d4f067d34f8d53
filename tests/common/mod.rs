/*!
 * Common test utilities for the epiparse test suite
 */

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use epiparse::app_config::Config;
use epiparse::assembler::{EpisodeAssembler, EpisodeDocument};

/// A complete, well-formed episode with every tag kind
pub const FULL_EPISODE: &str = r#"# The Crystal Cave

\[THUMBNAIL\]

## **\[SCENE: COLD OPEN\]**

\[IMG: cave_entrance\] PROMPT: "A glowing cave mouth at dusk"
\[AMBIENT: dripping_water\]
\[MUSIC: ominous_theme\]

THORAK: "The crystals hum louder every night, and nobody in the village will tell me why."
ZARA: (whispering) "Because the last person who asked never came back from the cave."
THORAK: "Then I will be the first to come back."

## **\[SCENE: THE DESCENT\]**

\[TRANSITION: fade_to_black\]
\[IMG: crystal_hall\] PROMPT: "A vast hall of violet crystals"
\[SFX: rock_fall\]

ZARA: "Watch your step, the floor is nothing but loose shale down here."
THORAK: (shouting) "Too late for that advice, I am already sliding!"
ZARA: "Grab the rope, now!"
"#;

/// A script without any scene marker
pub const NO_SCENES: &str = "# Draft\n\nJust some notes about the plot, no scenes yet.\n";

/// Route library logs to the test harness; safe to call from every test
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates the full sample episode as `episode_001.md`
pub fn create_test_episode(dir: &Path) -> Result<PathBuf> {
    create_test_file(dir, "episode_001.md", FULL_EPISODE)
}

/// Wraps dialogue lines into a single scene
pub fn single_scene(body: &str) -> String {
    format!("## **\\[SCENE: ONLY SCENE\\]**\n\n{}\n", body)
}

/// Configuration without required multimedia, so short test scripts only
/// collect quality suggestions and keep a passed status
pub fn quiet_config() -> Config {
    let mut config = Config::default();
    config.validation.required_multimedia.clear();
    config
}

/// Assemble an in-memory script with the given configuration
pub fn assemble(text: &str, config: Config) -> EpisodeDocument {
    EpisodeAssembler::new(config)
        .expect("grammar should compile")
        .assemble_source(text, Path::new("episode_test.md"))
}
