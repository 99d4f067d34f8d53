/*!
 * Dialogue extraction.
 *
 * A dialogue line starts with an all-caps speaker token and a colon,
 * optionally followed by a parenthetical direction, then the quoted
 * utterance. The quote may close on a later line.
 */

use std::ops::Range;

use log::debug;

use super::grammar::{PROMPT_KEYWORD, ScriptGrammar};
use super::source::ScriptSource;
use super::types::Dialogue;

/// Extract dialogue lines from one scene's content range, in document order
pub fn extract_dialogues(
    grammar: &ScriptGrammar,
    source: &ScriptSource<'_>,
    range: Range<usize>,
) -> Vec<Dialogue> {
    let offset = range.start;
    let content = source.slice(range);

    let mut dialogues = Vec::new();
    for caps in grammar.dialogue.captures_iter(content) {
        let (Some(whole), Some(speaker), Some(text)) = (caps.get(0), caps.get(1), caps.get(3)) else {
            continue;
        };

        let speaker = speaker.as_str().trim();
        if speaker == PROMPT_KEYWORD {
            continue;
        }

        let direction = caps
            .get(2)
            .map(|d| d.as_str().trim().to_string())
            .filter(|d| !d.is_empty());
        let line_position = source.line_of(offset + whole.start());

        let dialogue = Dialogue::new(
            speaker.to_string(),
            direction,
            text.as_str().trim().to_string(),
            line_position,
        );
        debug!(
            "Found dialogue: {} ({} chars, line {})",
            dialogue.speaker, dialogue.character_count, line_position
        );
        dialogues.push(dialogue);
    }

    dialogues
}
