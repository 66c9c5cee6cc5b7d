pub mod hunspell;
pub mod suggestions;
pub mod wordlist;

use crate::config::DictionaryFormat;
use crate::Config;
use anyhow::{Context, Result};
use hunspell::Hunspell;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fs;
use thiserror::Error;
use tracing::{debug, warn};
use wordlist::WordList;

#[derive(Debug, Error)]
pub enum DictError {
    #[error("failed to parse dictionary for `{language}`: {message}")]
    Parse { language: String, message: String },

    #[error("dictionary for `{language}` contains no words")]
    Empty { language: String },

    #[error("no dictionary registered for `{0}`")]
    MissingLanguage(String),
}

/// A loaded linguistic model for one language.
pub trait Checker {
    fn is_correct(&self, word: &str) -> bool;

    /// Candidate corrections, best first, at most `limit` of them.
    fn suggest(&self, word: &str, limit: usize) -> Vec<String>;
}

/// One checker per language key, plus the personal words and ignore
/// patterns shared by every language.
pub struct DictionaryStore {
    checkers: HashMap<String, Box<dyn Checker>>,
    personal_words: HashSet<String>,
    ignore_patterns: Vec<Regex>,
    max_suggestions: usize,
}

impl Default for DictionaryStore {
    fn default() -> Self {
        Self {
            checkers: HashMap::new(),
            personal_words: HashSet::new(),
            ignore_patterns: Vec::new(),
            max_suggestions: 5,
        }
    }
}

impl DictionaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store carrying the personal dictionary and ignore patterns from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut personal_words = HashSet::new();
        if let Some(personal_dict_path) = &config.personal_dictionary {
            if personal_dict_path.exists() {
                let content = fs::read_to_string(personal_dict_path)
                    .context("Failed to read personal dictionary")?;
                for line in content.lines() {
                    let word = line.trim();
                    if !word.is_empty() && !word.starts_with('#') {
                        personal_words.insert(word.to_lowercase());
                    }
                }
                debug!(
                    path = %personal_dict_path.display(),
                    words = personal_words.len(),
                    "loaded personal dictionary"
                );
            }
        }

        let mut ignore_patterns = Vec::new();
        for pattern in &config.ignore_patterns {
            match Regex::new(pattern) {
                Ok(re) => ignore_patterns.push(re),
                Err(e) => warn!(%pattern, error = %e, "invalid ignore pattern"),
            }
        }

        Ok(Self {
            checkers: HashMap::new(),
            personal_words,
            ignore_patterns,
            max_suggestions: config.max_suggestions,
        })
    }

    /// Parse a Hunspell affix/dictionary pair and register it under `language`.
    pub fn load(&mut self, language: &str, aff: &str, dic: &str) -> Result<(), DictError> {
        let checker = Hunspell::parse(language, aff, dic)?;
        self.register(language, Box::new(checker));
        Ok(())
    }

    /// Parse a plain word list and register it under `language`.
    pub fn load_wordlist(&mut self, language: &str, words: &str) -> Result<(), DictError> {
        let checker = WordList::parse(language, words)?;
        self.register(language, Box::new(checker));
        Ok(())
    }

    pub fn load_format(
        &mut self,
        language: &str,
        format: DictionaryFormat,
        aff: &str,
        dic: &str,
    ) -> Result<(), DictError> {
        match format {
            DictionaryFormat::Hunspell => self.load(language, aff, dic),
            DictionaryFormat::Wordlist => self.load_wordlist(language, dic),
        }
    }

    /// Register a checker, replacing any previous one for the key.
    pub fn register(&mut self, language: &str, checker: Box<dyn Checker>) {
        debug!(%language, "registered checker");
        self.checkers.insert(language.to_string(), checker);
    }

    pub fn contains(&self, language: &str) -> bool {
        self.checkers.contains_key(language)
    }

    /// Registered keys, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.checkers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn add_personal_word(&mut self, word: &str) {
        self.personal_words.insert(word.to_lowercase());
    }

    pub fn should_ignore(&self, token: &str) -> bool {
        self.ignore_patterns.iter().any(|re| re.is_match(token))
    }

    pub fn is_correct(&self, word: &str, language: &str) -> Result<bool, DictError> {
        let checker = self.checker(language)?;
        if self.personal_words.contains(&word.to_lowercase()) {
            return Ok(true);
        }
        Ok(checker.is_correct(word))
    }

    pub fn suggest(&self, word: &str, language: &str) -> Result<Vec<String>, DictError> {
        let checker = self.checker(language)?;
        Ok(checker.suggest(word, self.max_suggestions))
    }

    fn checker(&self, language: &str) -> Result<&dyn Checker, DictError> {
        self.checkers
            .get(language)
            .map(|checker| checker.as_ref())
            .ok_or_else(|| DictError::MissingLanguage(language.to_string()))
    }
}
