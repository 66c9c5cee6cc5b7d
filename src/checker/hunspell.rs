use super::{Checker, DictError};
use spellbook::Dictionary;

/// Affix/dictionary checker (Hunspell format).
pub struct Hunspell {
    dict: Dictionary,
}

impl Hunspell {
    pub fn parse(language: &str, aff: &str, dic: &str) -> Result<Self, DictError> {
        let dict = Dictionary::new(aff, dic).map_err(|e| DictError::Parse {
            language: language.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self { dict })
    }
}

impl Checker for Hunspell {
    fn is_correct(&self, word: &str) -> bool {
        self.dict.check(word)
    }

    fn suggest(&self, word: &str, limit: usize) -> Vec<String> {
        let mut suggestions = Vec::new();
        self.dict.suggest(word, &mut suggestions);
        suggestions.truncate(limit);
        suggestions
    }
}
