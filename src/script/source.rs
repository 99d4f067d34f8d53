/*!
 * Source text with precomputed line and code-fence indexes.
 *
 * Both indexes are built in one pass per document so extractors can map a
 * byte offset to a line number, or to "inside a fenced code block", without
 * rescanning the text before it.
 */

use std::ops::Range;

/// Triple-backtick fence delimiter
const FENCE: &str = "```";

/// A script document plus its offset indexes
#[derive(Debug, Clone)]
pub struct ScriptSource<'a> {
    text: &'a str,
    newlines: Vec<usize>,
    fences: Vec<usize>,
}

impl<'a> ScriptSource<'a> {
    pub fn new(text: &'a str) -> Self {
        let newlines = text
            .bytes()
            .enumerate()
            .filter(|(_, b)| *b == b'\n')
            .map(|(i, _)| i)
            .collect();
        let fences = fence_offsets(text);

        Self {
            text,
            newlines,
            fences,
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn slice(&self, range: Range<usize>) -> &'a str {
        &self.text[range]
    }

    /// 1-based line number of a byte offset
    pub fn line_of(&self, offset: usize) -> usize {
        self.newlines.partition_point(|&nl| nl < offset) + 1
    }

    /// Number of lines in the document
    pub fn line_count(&self) -> usize {
        if self.text.is_empty() {
            0
        } else {
            self.line_of(self.text.len())
        }
    }

    /// Fence tracker positioned for queries at or after `offset`
    pub fn fence_tracker(&self, offset: usize) -> FenceTracker<'_> {
        FenceTracker::starting_at(&self.fences, offset)
    }
}

/// Byte offsets of every non-overlapping fence delimiter
pub fn fence_offsets(text: &str) -> Vec<usize> {
    text.match_indices(FENCE).map(|(i, _)| i).collect()
}

/// Forward-only fence parity tracker.
///
/// A position is inside a code block when an odd number of complete fence
/// delimiters precede it. Queries must come in non-decreasing offset order.
#[derive(Debug, Clone)]
pub struct FenceTracker<'f> {
    fences: &'f [usize],
    cursor: usize,
    last_offset: usize,
}

impl<'f> FenceTracker<'f> {
    pub fn new(fences: &'f [usize]) -> Self {
        Self {
            fences,
            cursor: 0,
            last_offset: 0,
        }
    }

    /// Tracker whose first query may be at `offset`
    pub fn starting_at(fences: &'f [usize], offset: usize) -> Self {
        let cursor = fences.partition_point(|&f| f + FENCE.len() <= offset);
        Self {
            fences,
            cursor,
            last_offset: offset,
        }
    }

    /// Whether `offset` lies inside a fenced code block
    pub fn is_inside(&mut self, offset: usize) -> bool {
        debug_assert!(offset >= self.last_offset, "fence queries must move forward");
        self.last_offset = offset;

        while self.cursor < self.fences.len() && self.fences[self.cursor] + FENCE.len() <= offset {
            self.cursor += 1;
        }
        self.cursor % 2 == 1
    }
}
