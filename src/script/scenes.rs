/*!
 * Scene segmentation.
 *
 * Scenes are delimited purely by marker positions: a scene owns everything
 * from the end of its marker to the start of the next marker, or to the end
 * of the document for the last one.
 */

use log::{debug, warn};

use super::grammar::ScriptGrammar;
use super::source::ScriptSource;
use super::types::SceneSpan;

/// A scene located by the segmenter, before extraction
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedScene {
    pub scene_name: String,
    pub start_line: usize,
    pub span: SceneSpan,
}

/// Split a document into ordered scene spans.
///
/// Returns an empty list when no marker is present; the caller decides how
/// to report that.
pub fn segment_scenes(grammar: &ScriptGrammar, source: &ScriptSource<'_>) -> Vec<SegmentedScene> {
    let text = source.text();
    let markers: Vec<_> = grammar
        .scene_marker
        .captures_iter(text)
        .filter_map(|caps| Some((caps.get(0)?, caps.get(1)?.as_str().trim().to_string())))
        .collect();

    if markers.is_empty() {
        warn!("No scenes found in the script");
        return Vec::new();
    }

    let mut scenes = Vec::with_capacity(markers.len());
    for (i, (marker, scene_name)) in markers.iter().enumerate() {
        let content_end = markers
            .get(i + 1)
            .map(|(next, _)| next.start())
            .unwrap_or(text.len());

        let span = SceneSpan {
            marker_start: marker.start(),
            content_start: marker.end(),
            content_end,
        };
        let start_line = source.line_of(marker.start());
        debug!("Found scene marker: {} (line {})", scene_name, start_line);

        scenes.push(SegmentedScene {
            scene_name: scene_name.clone(),
            start_line,
            span,
        });
    }

    scenes
}

/// Derive a scene id from its heading text.
///
/// Lowercases, maps spaces to underscores and `&` to `and`, drops anything
/// outside `[a-z0-9_]`, collapses underscore runs and trims underscores.
/// Applying it to its own output returns the same string.
pub fn normalize_scene_id(scene_name: &str) -> String {
    let lowered = scene_name.to_lowercase().replace(' ', "_").replace('&', "and");

    let mut scene_id = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        if !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
            continue;
        }
        if c == '_' && scene_id.ends_with('_') {
            continue;
        }
        scene_id.push(c);
    }

    scene_id.trim_matches('_').to_string()
}
