/*!
 * Compiled patterns for the episode script grammar.
 *
 * Tag brackets are expected to be backslash-escaped (`\[SFX: id\]`) so the
 * markdown renderer does not read them as link syntax. Unescaped brackets are
 * plain prose.
 */

use regex::Regex;

/// Scene heading: `## **\[SCENE: NAME\]**` on its own line
const SCENE_MARKER_PATTERN: &str = r"(?m)^## \*\*\\\[SCENE: ([^\]\\\n]+)\\\]\*\*[ \t]*\r?$";

/// `SPEAKER: (direction) "text"`; the direction and the quote may start on
/// later lines, and the quoted text may run over several lines
const DIALOGUE_PATTERN: &str = r#"(?m)^([A-Z][A-Z ]*?):\s*(?:\(([^)\n]+)\))?\s*"([^"]+)""#;

/// `\[IMG: id\]` with an optional `PROMPT: "text"` continuation
const IMAGE_TAG_PATTERN: &str =
    r#"(?m)^[ \t]*\\\[IMG:[ \t]*([^\]\\\n]+?)[ \t]*\\\](?:\s*PROMPT:[ \t]*"([^"]+)")?"#;

/// `\[SFX: id\]`, `\[MUSIC: id\]`, `\[AMBIENT: id\]`, `\[TRANSITION: id\]`
const CUE_TAG_PATTERN: &str =
    r"(?m)^[ \t]*\\\[(SFX|MUSIC|AMBIENT|TRANSITION):[ \t]*([^\]\\\n]+?)[ \t]*\\\]";

const THUMBNAIL_TAG_PATTERN: &str = r"(?m)^[ \t]*\\\[THUMBNAIL\\\]";

/// Scene directive at the start of a line, including the scene's own heading
const SCENE_TAG_PATTERN: &str = r"(?m)^[ \t]*(?:## \*\*)?\\\[SCENE:[ \t]*([^\]\\\n]+?)[ \t]*\\\]";

/// Reserved keyword that introduces an image prompt, never a speaker
pub const PROMPT_KEYWORD: &str = "PROMPT";

/// All patterns needed to read one episode script
#[derive(Debug, Clone)]
pub struct ScriptGrammar {
    pub scene_marker: Regex,
    pub dialogue: Regex,
    pub image_tag: Regex,
    pub cue_tag: Regex,
    pub thumbnail_tag: Regex,
    pub scene_tag: Regex,
}

impl ScriptGrammar {
    /// Compile the grammar
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            scene_marker: Regex::new(SCENE_MARKER_PATTERN)?,
            dialogue: Regex::new(DIALOGUE_PATTERN)?,
            image_tag: Regex::new(IMAGE_TAG_PATTERN)?,
            cue_tag: Regex::new(CUE_TAG_PATTERN)?,
            thumbnail_tag: Regex::new(THUMBNAIL_TAG_PATTERN)?,
            scene_tag: Regex::new(SCENE_TAG_PATTERN)?,
        })
    }
}
