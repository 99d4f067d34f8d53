/*!
 * Individual content rules.
 *
 * Each rule inspects the parsed episode and records what it finds into a
 * shared `Findings` collector. Rules never fail; a rule that finds nothing
 * simply records nothing.
 */

use std::collections::BTreeMap;

use log::debug;

use crate::app_config::{QualityThresholds, ValidationConfig};
use crate::script::{Episode, TagKind};

/// Everything the rules found, grouped the way it is reported
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Findings {
    pub warnings: Vec<String>,
    pub missing_tags: Vec<String>,
    pub format_violations: Vec<String>,
    pub quality_suggestions: Vec<String>,
    /// Set once any critical finding has been recorded
    pub critical: bool,
}

impl Findings {
    pub fn warn(&mut self, message: String) {
        debug!("Validation warning: {}", message);
        self.warnings.push(message);
    }

    /// Record a format violation; violations are always critical
    pub fn violation(&mut self, message: String) {
        debug!("Format violation: {}", message);
        self.format_violations.push(message);
        self.critical = true;
    }

    pub fn missing(&mut self, entry: String) {
        self.missing_tags.push(entry);
    }

    pub fn suggest(&mut self, message: String) {
        self.quality_suggestions.push(message);
    }
}

/// Every configured speaker must say at least one line
pub fn check_required_speakers(episode: &Episode, config: &ValidationConfig, findings: &mut Findings) {
    for required in &config.required_speakers {
        let wanted = required.trim();
        if wanted.is_empty() {
            continue;
        }
        let speaks = episode
            .dialogues()
            .any(|d| d.speaker.eq_ignore_ascii_case(wanted));
        if !speaks {
            findings.warn(format!("Required speaker '{}' has no dialogue", wanted));
            findings.missing(format!("speaker:{}", wanted));
        }
    }
}

/// Every configured tag kind must appear at least once
pub fn check_required_multimedia(episode: &Episode, config: &ValidationConfig, findings: &mut Findings) {
    for kind in &config.required_multimedia {
        if episode.tag_count(*kind) > 0 {
            continue;
        }
        findings.missing(format!("tag:{}", kind));
        if config.warn_on_missing_tags {
            findings.warn(format!(
                "No {} tags found (expected at least one \\[{}: ...\\])",
                kind,
                kind.keyword()
            ));
        }
    }
}

/// An episode needs scenes, and every scene needs dialogue
pub fn check_structure(episode: &Episode, findings: &mut Findings) {
    if episode.scenes.is_empty() {
        findings.violation("Episode contains no scenes".to_string());
        return;
    }

    for scene in &episode.scenes {
        if scene.dialogues.is_empty() {
            findings.warn(format!("Scene '{}' has no dialogue", scene.scene_name));
            findings.violation(format!(
                "Empty scene: {} (line {})",
                scene.scene_id, scene.start_line
            ));
        }
    }
}

/// Volume and length heuristics
pub fn check_quality(episode: &Episode, thresholds: &QualityThresholds, findings: &mut Findings) {
    let dialogue_count = episode.dialogue_count();
    if dialogue_count < thresholds.min_dialogue_count {
        findings.suggest(format!(
            "Episode has {} dialogues; consider at least {}",
            dialogue_count, thresholds.min_dialogue_count
        ));
    }

    let character_count = episode.character_count();
    if character_count < thresholds.min_character_count {
        findings.suggest(format!(
            "Episode has {} spoken characters; consider at least {}",
            character_count, thresholds.min_character_count
        ));
    }

    if !episode.scenes.is_empty() {
        let average = dialogue_count as f64 / episode.scenes.len() as f64;
        if average < thresholds.min_dialogues_per_scene {
            findings.suggest(format!(
                "Average of {:.1} dialogues per scene is below {:.1}",
                average, thresholds.min_dialogues_per_scene
            ));
        }
    }

    for dialogue in episode.dialogues() {
        if dialogue.character_count < thresholds.min_dialogue_length {
            findings.suggest(format!(
                "Short dialogue from {} at line {} ({} characters)",
                dialogue.speaker, dialogue.line_position, dialogue.character_count
            ));
        } else if dialogue.character_count > thresholds.max_dialogue_length {
            findings.warn(format!(
                "Dialogue from {} at line {} is {} characters long (max {})",
                dialogue.speaker, dialogue.line_position, dialogue.character_count, thresholds.max_dialogue_length
            ));
            findings.violation(format!(
                "Oversized dialogue at line {}: check for an unclosed quote or unescaped tag",
                dialogue.line_position
            ));
        }
    }
}

/// At least a share of scenes should carry an image
pub fn check_image_coverage(episode: &Episode, min_ratio: f64, findings: &mut Findings) {
    if episode.scenes.is_empty() {
        return;
    }

    let with_images = episode
        .scenes
        .iter()
        .filter(|scene| scene.multimedia.count(TagKind::Image) > 0)
        .count();
    let ratio = with_images as f64 / episode.scenes.len() as f64;
    if ratio < min_ratio {
        findings.suggest(format!(
            "Only {} of {} scenes have an image tag ({:.0}%, target {:.0}%)",
            with_images,
            episode.scenes.len(),
            ratio * 100.0,
            min_ratio * 100.0
        ));
    }
}

/// Differently named scenes must not collapse onto the same id
pub fn check_duplicate_scene_ids(episode: &Episode, findings: &mut Findings) {
    let mut first_by_id: BTreeMap<&str, &str> = BTreeMap::new();
    for scene in &episode.scenes {
        match first_by_id.get(scene.scene_id.as_str()) {
            Some(first_name) if *first_name != scene.scene_name => {
                findings.warn(format!(
                    "Scenes '{}' and '{}' share the id '{}'",
                    first_name, scene.scene_name, scene.scene_id
                ));
            }
            Some(_) => {}
            None => {
                first_by_id.insert(&scene.scene_id, &scene.scene_name);
            }
        }
    }
}
