/*!
 * Episode script parsing.
 *
 * The parser is a pipeline of independent passes over one document:
 * - `scenes`: locate scene markers and cut the document into spans
 * - `dialogue`: pull `SPEAKER: "text"` lines out of each span
 * - `tags`: pull escaped multimedia tags out of each span, skipping code blocks
 *
 * All passes share one `ScriptGrammar` and one `ScriptSource` index, held by
 * a `ParserContext` that is built once per invocation and only read after.
 */

pub mod dialogue;
pub mod grammar;
pub mod scenes;
pub mod source;
pub mod tags;
pub mod types;

use std::path::Path;

use log::{debug, info};

use crate::app_config::Config;
use crate::errors::ParseError;

pub use dialogue::extract_dialogues;
pub use grammar::ScriptGrammar;
pub use scenes::{SegmentedScene, normalize_scene_id, segment_scenes};
pub use source::{FenceTracker, ScriptSource};
pub use tags::extract_tags;
pub use types::{Dialogue, Episode, MultimediaSet, MultimediaTag, Scene, SceneSpan, TagKind};

/// Prefix every episode number carries
pub const EPISODE_PREFIX: &str = "episode_";

/// Compiled grammar plus a read-only configuration snapshot
#[derive(Debug, Clone)]
pub struct ParserContext {
    pub grammar: ScriptGrammar,
    pub config: Config,
}

impl ParserContext {
    pub fn new(config: Config) -> Result<Self, ParseError> {
        Ok(Self {
            grammar: ScriptGrammar::new()?,
            config,
        })
    }

    /// Parse a script held in memory
    pub fn parse(&self, text: &str, path: &Path) -> Episode {
        parse_script(&self.grammar, text, path)
    }
}

/// Parse a whole script into an `Episode`.
///
/// Never fails: a document without scene markers yields an episode with no
/// scenes, and malformed lines are simply not matched.
pub fn parse_script(grammar: &ScriptGrammar, text: &str, path: &Path) -> Episode {
    let source = ScriptSource::new(text);
    let (title, number) = episode_identity(path);

    let scenes: Vec<Scene> = segment_scenes(grammar, &source)
        .into_iter()
        .map(|segment| build_scene(grammar, &source, segment))
        .collect();

    info!(
        "Parsed {}: {} scenes, {} lines",
        title,
        scenes.len(),
        source.line_count()
    );

    Episode {
        title,
        number,
        source_path: path.to_path_buf(),
        scenes,
    }
}

fn build_scene(grammar: &ScriptGrammar, source: &ScriptSource<'_>, segment: SegmentedScene) -> Scene {
    let span = segment.span;
    let dialogues = extract_dialogues(grammar, source, span.content_range());
    let multimedia = extract_tags(grammar, source, span.full_range());

    debug!(
        "Extracted scene: {} (line {}, {} dialogues, {} tags)",
        segment.scene_name,
        segment.start_line,
        dialogues.len(),
        multimedia.total()
    );

    Scene {
        scene_id: normalize_scene_id(&segment.scene_name),
        scene_name: segment.scene_name,
        start_line: segment.start_line,
        span,
        content: source.slice(span.content_range()).trim().to_string(),
        dialogues,
        multimedia,
    }
}

/// Derive `(title, number)` from the script's file name.
///
/// `episode_007.md` gives `("Episode 007", "episode_007")`; a stem without
/// the prefix gets it added, so `pilot_cut.md` gives
/// `("Episode Pilot Cut", "episode_pilot_cut")`.
pub fn episode_identity(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let number = if stem.starts_with(EPISODE_PREFIX) {
        stem
    } else {
        format!("{}{}", EPISODE_PREFIX, stem)
    };

    let bare = number.replace(EPISODE_PREFIX, "").replace('_', " ");
    let title = format!("Episode {}", title_case(&bare));
    (title, number)
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest
fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_alphabetic = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_alphabetic {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            previous_alphabetic = true;
        } else {
            result.push(c);
            previous_alphabetic = false;
        }
    }
    result
}
