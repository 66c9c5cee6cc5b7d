use lazy_static::lazy_static;
use regex::Regex;
use std::ops::Range;

lazy_static! {
    static ref PUNCTUATION: Regex = Regex::new(r"[.,!?:]").unwrap();
}

// Tabs and runs of spaces get no special handling.
const DELIMITER: char = ' ';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSpan {
    pub start: usize,
    pub end: usize,
}

impl WordSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn to_absolute(self, block_start: usize) -> Range<usize> {
        block_start + self.start..block_start + self.end
    }

    pub fn slice(&self, text: &str) -> String {
        text.chars().skip(self.start).take(self.len()).collect()
    }
}

/// Bounds of the word containing `cursor`. Cursors past the end clamp to it.
pub fn locate(text: &str, cursor: usize) -> WordSpan {
    let chars: Vec<char> = text.chars().collect();
    let cursor = cursor.min(chars.len());

    let start = chars[..cursor]
        .iter()
        .rposition(|&ch| ch == DELIMITER)
        .map_or(0, |index| index + 1);
    let end = chars[cursor..]
        .iter()
        .position(|&ch| ch == DELIMITER)
        .map_or(chars.len(), |index| cursor + index);

    WordSpan { start, end }
}

pub fn strip_punctuation(word: &str) -> String {
    PUNCTUATION.replace_all(word, "").into_owned()
}

/// Text to ask for suggestions for a flagged run. Falls back to the run
/// itself when nothing is left after stripping.
pub fn suggestion_query(run: &str) -> String {
    let token = strip_punctuation(run);
    if token.is_empty() {
        run.to_string()
    } else {
        token
    }
}

/// The span under the cursor and its checkable token; `None` when the token is empty.
pub fn current_word(text: &str, cursor: usize) -> Option<(WordSpan, String)> {
    let span = locate(text, cursor);
    let token = strip_punctuation(&span.slice(text));
    if token.is_empty() {
        None
    } else {
        Some((span, token))
    }
}
