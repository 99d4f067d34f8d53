/*!
 * Multimedia tag extraction.
 *
 * Recognized tags (brackets must be escaped):
 * - `\[IMG: id\]`, optionally followed by `PROMPT: "text"`
 * - `\[SFX: id\]`, `\[MUSIC: id\]`, `\[AMBIENT: id\]`, `\[TRANSITION: id\]`
 * - `\[THUMBNAIL\]`
 * - `\[SCENE: id\]`, which also matches the scene's own heading
 *
 * Tags inside fenced code blocks are skipped. All matches are visited in
 * offset order against a single forward-moving fence tracker.
 */

use std::ops::Range;

use log::debug;

use super::grammar::ScriptGrammar;
use super::source::ScriptSource;
use super::types::{MultimediaSet, MultimediaTag, TagKind};

/// Extract tags from a scene range.
///
/// Pass the scene's full range (marker included) so the heading is counted
/// as a scene-kind tag.
pub fn extract_tags(
    grammar: &ScriptGrammar,
    source: &ScriptSource<'_>,
    range: Range<usize>,
) -> MultimediaSet {
    let offset = range.start;
    let content = source.slice(range);

    let mut found: Vec<(usize, TagKind, Option<String>, Option<String>)> = Vec::new();

    for caps in grammar.image_tag.captures_iter(content) {
        let (Some(whole), Some(id)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let prompt = caps.get(2).map(|p| p.as_str().trim().to_string());
        found.push((
            whole.start(),
            TagKind::Image,
            Some(id.as_str().trim().to_string()),
            prompt,
        ));
    }

    for caps in grammar.cue_tag.captures_iter(content) {
        let (Some(whole), Some(keyword), Some(id)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let Some(kind) = TagKind::from_keyword(keyword.as_str()) else {
            continue;
        };
        found.push((whole.start(), kind, Some(id.as_str().trim().to_string()), None));
    }

    for whole in grammar.thumbnail_tag.find_iter(content) {
        found.push((whole.start(), TagKind::Thumbnail, None, None));
    }

    for caps in grammar.scene_tag.captures_iter(content) {
        let (Some(whole), Some(id)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        found.push((
            whole.start(),
            TagKind::Scene,
            Some(id.as_str().trim().to_string()),
            None,
        ));
    }

    // Line-anchored patterns may report leading indentation; order by the
    // match start, which is what the fence check uses.
    found.sort_by_key(|(start, kind, _, _)| (*start, *kind));

    let mut tracker = source.fence_tracker(offset);
    let mut set = MultimediaSet::default();
    for (start, kind, tag_id, prompt) in found {
        let absolute = offset + start;
        if tracker.is_inside(absolute) {
            debug!("Skipping {} tag inside code block (offset {})", kind, absolute);
            continue;
        }

        let line_position = source.line_of(absolute);
        debug!(
            "Found {} tag: {} (line {})",
            kind.keyword(),
            tag_id.as_deref().unwrap_or("-"),
            line_position
        );
        set.push(MultimediaTag {
            kind,
            tag_id,
            prompt,
            line_position,
        });
    }

    set
}
