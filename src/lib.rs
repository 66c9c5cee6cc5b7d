pub mod checker;
pub mod cli;
pub mod config;
pub mod dict;
pub mod editor;

pub use checker::{Checker, DictError, DictionaryStore};
pub use config::Config;
pub use editor::{Document, Editor, Session};

use serde::Serialize;

/// A flagged run found after a replay, with its suggestions.
#[derive(Debug, Clone, Serialize)]
pub struct SpellError {
    pub word: String,
    /// 1-based block number.
    pub line: usize,
    /// 1-based character column inside the block.
    pub column: usize,
    /// Absolute document range of the run.
    pub start: usize,
    pub end: usize,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckResult {
    pub error_count: usize,
    pub fixed_count: usize,
    pub errors: Vec<SpellError>,
}
