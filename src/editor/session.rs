use crate::checker::DictionaryStore;
use serde::Serialize;
use tracing::{debug, info};

/// Per-editor spellcheck state shared by the update and pointer cycles.
///
/// Starts with no language. The language is set once dictionaries finish
/// loading and can only be changed by the user after that.
#[derive(Debug, Clone, Default)]
pub struct Session {
    loaded: bool,
    language: Option<String>,
    highlight: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiState {
    pub highlight_enabled: bool,
    pub active_language: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the load gate and select `default` if it has a checker.
    /// Returns whether a language is now active.
    pub fn dictionaries_loaded(&mut self, store: &DictionaryStore, default: &str) -> bool {
        if self.loaded {
            return self.language.is_some();
        }
        self.loaded = true;
        if store.contains(default) {
            info!(language = %default, "spellcheck ready");
            self.language = Some(default.to_string());
        } else {
            info!(language = %default, "default dictionary unavailable, spellcheck disabled");
        }
        self.language.is_some()
    }

    /// User picked a language. Ignored until dictionaries have loaded.
    pub fn select_language(&mut self, language: &str) -> bool {
        if !self.loaded {
            debug!(%language, "language selected before dictionaries loaded, ignoring");
            return false;
        }
        self.language = Some(language.to_string());
        true
    }

    pub fn toggle_highlight(&mut self) -> bool {
        if self.language.is_some() {
            self.highlight = !self.highlight;
        }
        self.highlight
    }

    pub fn set_highlight(&mut self, enabled: bool) {
        if self.language.is_some() {
            self.highlight = enabled;
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn highlight(&self) -> bool {
        self.highlight
    }

    pub fn selected_language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// The language queries run against, or `None` when unset or when the
    /// selected key has no checker.
    pub fn active_language<'a>(&'a self, store: &DictionaryStore) -> Option<&'a str> {
        self.language
            .as_deref()
            .filter(|language| store.contains(language))
    }

    pub fn ui_state(&self) -> UiState {
        UiState {
            highlight_enabled: self.highlight,
            active_language: self.language.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DictionaryStore {
        let mut store = DictionaryStore::new();
        store.load_wordlist("en", "the\nfox").unwrap();
        store
    }

    #[test]
    fn test_unset_until_loaded() {
        let store = store();
        let mut session = Session::new();
        assert_eq!(session.active_language(&store), None);
        assert!(!session.select_language("en"));
        assert!(!session.toggle_highlight());
        assert_eq!(session.active_language(&store), None);

        assert!(session.dictionaries_loaded(&store, "en"));
        assert_eq!(session.active_language(&store), Some("en"));
    }

    #[test]
    fn test_failed_default_stays_unset() {
        let store = DictionaryStore::new();
        let mut session = Session::new();
        assert!(!session.dictionaries_loaded(&store, "en"));
        assert!(session.is_loaded());
        assert_eq!(session.selected_language(), None);
    }

    #[test]
    fn test_unregistered_selection_is_inactive() {
        let store = store();
        let mut session = Session::new();
        session.dictionaries_loaded(&store, "en");

        assert!(session.select_language("fr"));
        assert_eq!(session.selected_language(), Some("fr"));
        assert_eq!(session.active_language(&store), None);
    }

    #[test]
    fn test_toggle_highlight() {
        let store = store();
        let mut session = Session::new();
        session.dictionaries_loaded(&store, "en");

        assert!(session.toggle_highlight());
        assert_eq!(
            session.ui_state(),
            UiState {
                highlight_enabled: true,
                active_language: Some("en".to_string()),
            }
        );
        assert!(!session.toggle_highlight());
    }
}
