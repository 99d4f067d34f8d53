/*!
 * Structured representation of a parsed episode script.
 */

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Kind of multimedia cue embedded in a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Image,
    Sfx,
    Music,
    Ambient,
    Transition,
    Thumbnail,
    Scene,
}

impl TagKind {
    /// Every kind, in output order
    pub const ALL: [TagKind; 7] = [
        TagKind::Image,
        TagKind::Sfx,
        TagKind::Music,
        TagKind::Ambient,
        TagKind::Transition,
        TagKind::Thumbnail,
        TagKind::Scene,
    ];

    /// Keyword used inside the brackets, e.g. `IMG` in `\[IMG: id\]`
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Image => "IMG",
            Self::Sfx => "SFX",
            Self::Music => "MUSIC",
            Self::Ambient => "AMBIENT",
            Self::Transition => "TRANSITION",
            Self::Thumbnail => "THUMBNAIL",
            Self::Scene => "SCENE",
        }
    }

    /// Lowercase identifier used in JSON and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Sfx => "sfx",
            Self::Music => "music",
            Self::Ambient => "ambient",
            Self::Transition => "transition",
            Self::Thumbnail => "thumbnail",
            Self::Scene => "scene",
        }
    }

    /// Look up a kind from its bracket keyword
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.keyword() == keyword)
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TagKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lowered || kind.keyword().eq_ignore_ascii_case(&lowered))
            .ok_or_else(|| anyhow!("Invalid multimedia tag kind: {}", s))
    }
}

/// A single multimedia cue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultimediaTag {
    pub kind: TagKind,

    /// Free-form identifier; absent for thumbnails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<String>,

    /// Generation prompt, image tags only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// 1-based line in the whole document
    pub line_position: usize,
}

/// Multimedia tags of one scene, grouped by kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultimediaSet {
    #[serde(default)]
    pub image_tags: Vec<MultimediaTag>,
    #[serde(default)]
    pub sfx_tags: Vec<MultimediaTag>,
    #[serde(default)]
    pub music_tags: Vec<MultimediaTag>,
    #[serde(default)]
    pub ambient_tags: Vec<MultimediaTag>,
    #[serde(default)]
    pub transition_tags: Vec<MultimediaTag>,
    #[serde(default)]
    pub thumbnail_tags: Vec<MultimediaTag>,
    #[serde(default)]
    pub scene_tags: Vec<MultimediaTag>,
}

impl MultimediaSet {
    /// Tags of the given kind, in document order
    pub fn get(&self, kind: TagKind) -> &[MultimediaTag] {
        match kind {
            TagKind::Image => &self.image_tags,
            TagKind::Sfx => &self.sfx_tags,
            TagKind::Music => &self.music_tags,
            TagKind::Ambient => &self.ambient_tags,
            TagKind::Transition => &self.transition_tags,
            TagKind::Thumbnail => &self.thumbnail_tags,
            TagKind::Scene => &self.scene_tags,
        }
    }

    /// Append a tag to the list for its kind
    pub fn push(&mut self, tag: MultimediaTag) {
        let list = match tag.kind {
            TagKind::Image => &mut self.image_tags,
            TagKind::Sfx => &mut self.sfx_tags,
            TagKind::Music => &mut self.music_tags,
            TagKind::Ambient => &mut self.ambient_tags,
            TagKind::Transition => &mut self.transition_tags,
            TagKind::Thumbnail => &mut self.thumbnail_tags,
            TagKind::Scene => &mut self.scene_tags,
        };
        list.push(tag);
    }

    pub fn count(&self, kind: TagKind) -> usize {
        self.get(kind).len()
    }

    pub fn total(&self) -> usize {
        TagKind::ALL.iter().map(|kind| self.count(*kind)).sum()
    }

    /// All tags across kinds, ordered by line
    pub fn iter_ordered(&self) -> Vec<&MultimediaTag> {
        let mut tags: Vec<&MultimediaTag> = TagKind::ALL
            .iter()
            .flat_map(|kind| self.get(*kind).iter())
            .collect();
        tags.sort_by_key(|tag| tag.line_position);
        tags
    }
}

/// One spoken line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dialogue {
    /// Upper-case speaker token
    #[serde(alias = "character")]
    pub speaker: String,

    /// Parenthetical stage direction
    #[serde(default)]
    pub direction: Option<String>,

    pub text: String,

    /// Number of characters in `text`
    pub character_count: usize,

    /// 1-based line in the whole document
    pub line_position: usize,
}

impl Dialogue {
    pub fn new(speaker: String, direction: Option<String>, text: String, line_position: usize) -> Self {
        let character_count = text.chars().count();
        Self {
            speaker,
            direction,
            text,
            character_count,
            line_position,
        }
    }

    /// Whitespace-separated words in the spoken text
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Byte offsets of a scene inside its source document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneSpan {
    /// Start of the scene marker line
    pub marker_start: usize,
    /// First byte after the marker
    pub content_start: usize,
    /// Start of the next marker, or the end of the document
    pub content_end: usize,
}

impl SceneSpan {
    pub fn content_range(&self) -> std::ops::Range<usize> {
        self.content_start..self.content_end
    }

    /// The marker plus its content
    pub fn full_range(&self) -> std::ops::Range<usize> {
        self.marker_start..self.content_end
    }
}

/// A narrative segment delimited by scene markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub scene_id: String,
    pub scene_name: String,
    pub start_line: usize,
    #[serde(default)]
    pub span: SceneSpan,
    pub content: String,
    #[serde(default)]
    pub dialogues: Vec<Dialogue>,
    #[serde(default)]
    pub multimedia: MultimediaSet,
}

impl Scene {
    pub fn dialogue_count(&self) -> usize {
        self.dialogues.len()
    }

    pub fn character_count(&self) -> usize {
        self.dialogues.iter().map(|d| d.character_count).sum()
    }
}

/// A parsed episode script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub title: String,
    pub number: String,
    pub source_path: PathBuf,
    pub scenes: Vec<Scene>,
}

impl Episode {
    /// Iterate over every dialogue in scene order
    pub fn dialogues(&self) -> impl Iterator<Item = &Dialogue> {
        self.scenes.iter().flat_map(|scene| scene.dialogues.iter())
    }

    pub fn dialogue_count(&self) -> usize {
        self.scenes.iter().map(Scene::dialogue_count).sum()
    }

    pub fn character_count(&self) -> usize {
        self.scenes.iter().map(Scene::character_count).sum()
    }

    /// Tag count of one kind across all scenes
    pub fn tag_count(&self, kind: TagKind) -> usize {
        self.scenes.iter().map(|scene| scene.multimedia.count(kind)).sum()
    }
}
