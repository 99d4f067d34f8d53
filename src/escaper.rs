/*!
 * Multimedia tag escaping pre-processor.
 *
 * Authors tend to write tags with bare brackets (`[SFX: boom]`), which the
 * parser treats as prose. This module rewrites them into the escaped form
 * (`\[SFX: boom\]`) the parser expects:
 * - bare tags get both brackets escaped
 * - half-escaped tags (`\[SFX: boom]`) get the missing backslash
 * - fully escaped tags and anything inside fenced code blocks are left alone
 */

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::file_utils::FileManager;
use crate::script::TagKind;
use crate::script::source::{FenceTracker, fence_offsets};

/// Any tag, escaped or not: `\?[KIND: id\?]` or `\?[THUMBNAIL\?]`
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\?\[(?:(IMG|SFX|MUSIC|AMBIENT|TRANSITION|SCENE):[ \t]*[^\]\\\n]+?[ \t]*|(THUMBNAIL))\\?\]")
        .expect("Invalid tag regex")
});

/// Number of rewrites kept as samples
const MAX_SAMPLES: usize = 5;

/// Per-kind counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCounts {
    pub fixed: usize,
    pub already_escaped: usize,
}

/// Counters for one escaping run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EscapeStats {
    pub by_kind: BTreeMap<TagKind, TagCounts>,
}

impl EscapeStats {
    pub fn get(&self, kind: TagKind) -> TagCounts {
        self.by_kind.get(&kind).copied().unwrap_or_default()
    }

    pub fn total_fixed(&self) -> usize {
        self.by_kind.values().map(|c| c.fixed).sum()
    }

    pub fn total_already_escaped(&self) -> usize {
        self.by_kind.values().map(|c| c.already_escaped).sum()
    }
}

/// A single rewrite, kept for reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscapeSample {
    pub original: String,
    pub escaped: String,
}

/// Result of escaping one document
#[derive(Debug, Clone, PartialEq)]
pub struct EscapeOutcome {
    pub content: String,
    pub stats: EscapeStats,
    pub samples: Vec<EscapeSample>,
}

impl EscapeOutcome {
    pub fn needs_processing(&self) -> bool {
        self.stats.total_fixed() > 0
    }
}

/// Result of escaping one file, as reported by the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscapeReport {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub dry_run: bool,
    pub stats: EscapeStats,
    pub total_fixed: usize,
    pub total_already_escaped: usize,
    pub sample_fixes: Vec<EscapeSample>,
    pub needs_processing: bool,
    pub written: bool,
}

/// Rewrites unescaped multimedia tags
pub struct TagEscaper;

impl TagEscaper {
    /// Escape every bare or half-escaped tag outside code blocks
    pub fn escape(content: &str) -> EscapeOutcome {
        let fences = fence_offsets(content);
        let mut tracker = FenceTracker::new(&fences);

        let mut stats = EscapeStats::default();
        let mut samples = Vec::new();
        let mut output = String::with_capacity(content.len() + 64);
        let mut last_end = 0;

        for caps in TAG_REGEX.captures_iter(content) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let keyword = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()).unwrap_or_default();
            let Some(kind) = TagKind::from_keyword(keyword) else {
                continue;
            };
            if tracker.is_inside(whole.start()) {
                continue;
            }

            let original = whole.as_str();
            let opening_escaped = original.starts_with('\\');
            let closing_escaped = original.ends_with("\\]");
            let counts = stats.by_kind.entry(kind).or_default();
            if opening_escaped && closing_escaped {
                counts.already_escaped += 1;
                continue;
            }

            let escaped = escape_tag(original, opening_escaped, closing_escaped);
            counts.fixed += 1;
            debug!("Escaping {} tag: {} -> {}", kind.keyword(), original, escaped);

            output.push_str(&content[last_end..whole.start()]);
            output.push_str(&escaped);
            last_end = whole.end();

            if samples.len() < MAX_SAMPLES {
                samples.push(EscapeSample {
                    original: original.to_string(),
                    escaped,
                });
            }
        }
        output.push_str(&content[last_end..]);

        EscapeOutcome {
            content: output,
            stats,
            samples,
        }
    }

    /// Default output path: `<stem>_processed.<ext>` next to the input
    pub fn default_output_path(input: &Path) -> PathBuf {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        let extension = input
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        input.with_file_name(format!("{}_processed{}", stem, extension))
    }

    /// Escape a file, writing the result unless `dry_run` or nothing changed
    pub fn process_file(input: &Path, output: Option<&Path>, dry_run: bool) -> Result<EscapeReport> {
        if !FileManager::file_exists(input) {
            return Err(anyhow!("Input file not found: {}", input.display()));
        }
        let output_file = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| Self::default_output_path(input));

        let content = FileManager::read_to_string(input)?;
        let outcome = Self::escape(&content);
        let needs_processing = outcome.needs_processing();

        let written = !dry_run && needs_processing;
        if written {
            FileManager::write_to_file(&output_file, &outcome.content)?;
            info!("Processed file saved: {}", output_file.display());
        }

        Ok(EscapeReport {
            input_file: input.to_path_buf(),
            output_file,
            dry_run,
            total_fixed: outcome.stats.total_fixed(),
            total_already_escaped: outcome.stats.total_already_escaped(),
            stats: outcome.stats,
            sample_fixes: outcome.samples,
            needs_processing,
            written,
        })
    }
}

fn escape_tag(original: &str, opening_escaped: bool, closing_escaped: bool) -> String {
    let mut escaped = String::with_capacity(original.len() + 2);
    if !opening_escaped {
        escaped.push('\\');
    }
    if closing_escaped {
        escaped.push_str(original);
    } else {
        // The match always ends with a bare `]` here.
        escaped.push_str(&original[..original.len() - 1]);
        escaped.push_str("\\]");
    }
    escaped
}
