use super::{suggestions, Checker, DictError};
use fst::{Automaton, IntoStreamer, Set, Streamer};

/// Plain word-list checker backed by an in-memory FST set.
pub struct WordList {
    set: Set<Vec<u8>>,
}

impl WordList {
    /// Build from a newline separated word list. Blank lines and `#` comments are skipped.
    pub fn parse(language: &str, content: &str) -> Result<Self, DictError> {
        let mut words: Vec<String> = content
            .lines()
            .map(|line| line.trim().to_lowercase())
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();
        words.sort();
        words.dedup();

        if words.is_empty() {
            return Err(DictError::Empty {
                language: language.to_string(),
            });
        }

        let set = Set::from_iter(words).map_err(|e| DictError::Parse {
            language: language.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self { set })
    }

    pub fn contains(&self, word: &str) -> bool {
        self.set.contains(word.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Get all words with a given prefix
    pub fn words_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut results = Vec::new();
        let mut stream = self
            .set
            .search(fst::automaton::Str::new(prefix).starts_with())
            .into_stream();

        while let Some(key) = stream.next() {
            if let Ok(word) = String::from_utf8(key.to_vec()) {
                results.push(word);
            }
        }

        results
    }

    /// Stream every word in the set.
    ///
    /// This walks the whole FST; prefer `words_with_prefix()` or `contains()`.
    pub fn all_words(&self) -> Vec<String> {
        let mut words = Vec::new();
        let mut stream = self.set.stream();

        while let Some(key) = stream.next() {
            if let Ok(word) = String::from_utf8(key.to_vec()) {
                words.push(word);
            }
        }

        words
    }
}

impl Checker for WordList {
    fn is_correct(&self, word: &str) -> bool {
        self.contains(&word.to_lowercase())
    }

    fn suggest(&self, word: &str, limit: usize) -> Vec<String> {
        suggestions::generate(&word.to_lowercase(), self, limit)
    }
}
