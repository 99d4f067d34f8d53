/*!
 * Plain-text reports written next to the JSON output.
 *
 * - `render_validation_report`: status, warnings and author feedback
 * - `render_cost_report`: cost breakdown, content statistics and per-scene timing
 *
 * Both work from an `EpisodeDocument`, so a report can be regenerated from a
 * previously written JSON file.
 */

use std::fmt::Write as _;

use chrono::Local;

use crate::assembler::EpisodeDocument;

const RULE_WIDTH: usize = 80;
const SECTION_WIDTH: usize = 40;

/// Render the `<episode>_validation.txt` report
pub fn render_validation_report(document: &EpisodeDocument) -> String {
    let metadata = &document.metadata;
    let mut out = String::new();

    let _ = writeln!(out, "Episode Script Parser - Validation Report");
    let _ = writeln!(out, "Generated: {}", metadata.processing_timestamp);
    let _ = writeln!(out, "Episode: {}", document.episode_metadata.number);
    let _ = writeln!(out, "Processing time: {}s", metadata.total_processing_time_seconds);
    let _ = writeln!(out, "Status: {}", metadata.validation_status);
    out.push('\n');

    if document.warnings.is_empty() {
        out.push_str("No warnings generated.\n");
    } else {
        write_list(&mut out, "WARNINGS", &document.warnings);
    }

    let feedback = &document.feedback;
    if feedback.is_empty() {
        return out;
    }
    for (title, items) in [
        ("MISSING TAGS", &feedback.missing_tags),
        ("FORMAT VIOLATIONS", &feedback.format_violations),
        ("QUALITY SUGGESTIONS", &feedback.quality_suggestions),
    ] {
        if !items.is_empty() {
            out.push('\n');
            write_list(&mut out, title, items);
        }
    }

    out
}

/// Render the `<episode>_cost_report.txt` report
pub fn render_cost_report(document: &EpisodeDocument) -> String {
    let metadata = &document.metadata;
    let costs = &metadata.detailed_cost_analysis;
    let timing = &metadata.timing_estimates;
    let currency = &costs.currency;
    let total_characters = metadata.estimated_downstream_costs.voice_character_count;

    let mut lines: Vec<String> = Vec::new();
    lines.push("=".repeat(RULE_WIDTH));
    lines.push("EPISODE PRODUCTION COST ESTIMATION REPORT".to_string());
    lines.push("=".repeat(RULE_WIDTH));
    lines.push(String::new());
    lines.push(format!("Episode: {}", document.episode_metadata.title));
    lines.push(format!("Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S")));
    lines.push(format!("Estimated Duration: {:.2} minutes", timing.total_duration_minutes));
    lines.push(format!("Total Characters: {}", group_thousands(total_characters)));
    lines.push(String::new());
    lines.push("=".repeat(RULE_WIDTH));
    lines.push("COST BREAKDOWN SUMMARY".to_string());
    lines.push("=".repeat(RULE_WIDTH));
    lines.push(String::new());
    lines.push(format!("TOTAL EPISODE COST: {:.4} {}", costs.total_episode_cost, currency));
    lines.push(format!("Cost per Minute: {:.4} {}", costs.cost_per_minute, currency));
    lines.push(String::new());

    section(&mut lines, "PIPELINE COMPONENT COSTS:");
    for (name, cost) in costs.pipeline_component_costs.entries() {
        if cost > 0.0 {
            lines.push(format!("  {}: {:.4} {}", humanize(name), cost, currency));
        } else {
            lines.push(format!("  {}: No external costs", humanize(name)));
        }
    }
    lines.push(String::new());

    let voice = &costs.voice_generation;
    section(&mut lines, "VOICE GENERATION:");
    lines.push(format!("  Total Cost: {:.4} {}", voice.total_cost, currency));
    lines.push(format!("  Cost per Character: {:.6} {}", voice.cost_per_character, currency));
    lines.push(format!("  Total Characters: {}", group_thousands(voice.total_characters)));
    lines.push(String::new());
    lines.push("  Costs by Speaker:".to_string());
    for (speaker, speaker_cost) in &voice.costs_by_speaker {
        lines.push(format!(
            "    {}: {:.4} ({} characters)",
            speaker,
            speaker_cost.cost,
            group_thousands(speaker_cost.characters)
        ));
    }
    lines.push(String::new());

    let image = &costs.image_generation;
    section(&mut lines, "IMAGE GENERATION:");
    lines.push(format!("  Total Cost: {:.4} {}", image.total_cost, currency));
    lines.push(format!("  Cost per Image: {:.4} {}", image.cost_per_image, currency));
    lines.push(format!("  Total Images: {}", image.total_images));
    lines.push(String::new());

    let audio = &costs.audio_processing;
    section(&mut lines, "AUDIO PROCESSING:");
    lines.push(format!("  Total Cost: {:.4} {}", audio.total_cost, currency));
    lines.push(String::new());
    lines.push("  Breakdown by Type:".to_string());
    lines.push(format!("    SFX: {:.4} ({} effects)", audio.sfx_cost, audio.sfx_count));
    lines.push(format!("    Music: {:.4} ({} cues)", audio.music_cost, audio.music_count));
    lines.push(format!("    Ambient: {:.4} ({} tracks)", audio.ambient_cost, audio.ambient_count));
    lines.push(format!(
        "    Transitions: {:.4} ({} transitions)",
        audio.transition_cost, audio.transition_count
    ));
    lines.push(String::new());

    let scene_count = document.scenes.len();
    let total_dialogues: usize = document.scenes.iter().map(|s| s.dialogues.len()).sum();
    section(&mut lines, "CONTENT STATISTICS:");
    lines.push(format!("  Total Scenes: {}", scene_count));
    lines.push(format!("  Total Dialogues: {}", total_dialogues));
    if scene_count > 0 {
        lines.push(format!(
            "  Average Dialogues per Scene: {:.1}",
            total_dialogues as f64 / scene_count as f64
        ));
    } else {
        lines.push("  Average Dialogues per Scene: 0".to_string());
    }
    lines.push(format!(
        "  Processing Time: {:.3} seconds",
        metadata.total_processing_time_seconds
    ));
    lines.push(String::new());

    if costs.total_episode_cost > 0.0 && timing.total_duration_minutes > 0.0 {
        section(&mut lines, "EFFICIENCY METRICS:");
        lines.push(format!(
            "  Characters per {}: {:.0}",
            currency,
            total_characters as f64 / costs.total_episode_cost
        ));
        lines.push(format!(
            "  Minutes per {}: {:.2}",
            currency,
            timing.total_duration_minutes / costs.total_episode_cost
        ));
        lines.push(String::new());
    }

    if !timing.scene_timings.is_empty() {
        section(&mut lines, "SCENE-BY-SCENE BREAKDOWN:");
        for scene in &timing.scene_timings {
            lines.push(format!(
                "  {}: {:.1}s, {} dialogues, {} words",
                humanize(&scene.scene_id),
                scene.dialogue_duration_seconds,
                scene.dialogue_count,
                scene.word_count
            ));
        }
        lines.push(String::new());
    }

    lines.push("=".repeat(RULE_WIDTH));
    lines.push(format!("Timestamp: {}", metadata.processing_timestamp));
    lines.push("=".repeat(RULE_WIDTH));

    lines.join("\n")
}

fn section(lines: &mut Vec<String>, title: &str) {
    lines.push(title.to_string());
    lines.push("-".repeat(SECTION_WIDTH));
}

fn write_list(out: &mut String, title: &str, items: &[String]) {
    let _ = writeln!(out, "{}:", title);
    for item in items {
        let _ = writeln!(out, "  - {}", item);
    }
}

/// `scene_id` style identifier to `Scene Id`
fn humanize(identifier: &str) -> String {
    identifier
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 1234567 -> "1,234,567"
fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
