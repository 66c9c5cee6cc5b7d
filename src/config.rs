use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const DICTIONARY_CDN: &str = "https://cdn.jsdelivr.net/npm";

/// How a language's payloads are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DictionaryFormat {
    /// Hunspell affix + dictionary pair.
    #[default]
    Hunspell,
    /// One word per line; `aff` is ignored.
    Wordlist,
}

/// Where a language's data comes from. Each location is an `http(s)://` URL,
/// a `file://` URL or a plain path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionarySource {
    #[serde(default)]
    pub aff: String,
    pub dic: String,
    #[serde(default)]
    pub format: DictionaryFormat,
}

impl DictionarySource {
    fn npm(package: &str) -> Self {
        Self {
            aff: format!("{}/{}/index.aff", DICTIONARY_CDN, package),
            dic: format!("{}/{}/index.dic", DICTIONARY_CDN, package),
            format: DictionaryFormat::Hunspell,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_language")]
    pub default_language: String,

    #[serde(default)]
    pub dictionaries: BTreeMap<String, DictionarySource>,

    pub personal_dictionary: Option<PathBuf>,

    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    /// Unset keys leave lower-priority layers in place.
    pub highlight: Option<bool>,

    pub cache: Option<bool>,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_max_suggestions() -> usize {
    5
}

impl Default for Config {
    fn default() -> Self {
        let mut dictionaries = BTreeMap::new();
        dictionaries.insert("en".to_string(), DictionarySource::npm("dictionary-en"));
        dictionaries.insert("fr".to_string(), DictionarySource::npm("dictionary-fr"));

        Self {
            default_language: default_language(),
            dictionaries,
            personal_dictionary: None,
            ignore_patterns: vec![
                r"^https?://\S+$".to_string(),                                   // URLs
                r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$".to_string(), // Emails
                r"^[0-9]+$".to_string(),                                         // Numbers
            ],
            max_suggestions: default_max_suggestions(),
            highlight: None,
            cache: None,
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(
        language: Option<String>,
        personal_dict: Option<PathBuf>,
        cli_patterns: Vec<String>,
    ) -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global_config = Self::from_file(&global_path)?;
                config = config.merge(global_config);
            }
        }

        let local_path = PathBuf::from(".livespell.toml");
        if local_path.exists() {
            let local_config = Self::from_file(&local_path)?;
            config = config.merge(local_config);
        }

        if let Some(language) = language {
            config.default_language = language;
        }
        if let Some(dict) = personal_dict {
            config.personal_dictionary = Some(dict);
        }
        if !cli_patterns.is_empty() {
            config.ignore_patterns.extend(cli_patterns);
        }

        if config.personal_dictionary.is_none() {
            config.personal_dictionary = Self::default_personal_dict_path();
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        // other's values override self's if they differ from defaults
        if other.default_language != default_language() {
            self.default_language = other.default_language;
        }
        // Sources are merged per language so a local file can add one
        // language without restating the others.
        self.dictionaries.extend(other.dictionaries);
        if other.personal_dictionary.is_some() {
            self.personal_dictionary = other.personal_dictionary;
        }
        if !other.ignore_patterns.is_empty() {
            self.ignore_patterns = other.ignore_patterns;
        }
        if other.max_suggestions != default_max_suggestions() {
            self.max_suggestions = other.max_suggestions;
        }
        if other.highlight.is_some() {
            self.highlight = other.highlight;
        }
        if other.cache.is_some() {
            self.cache = other.cache;
        }
        self
    }

    pub fn highlight_enabled(&self) -> bool {
        self.highlight.unwrap_or(false)
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.unwrap_or(true)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "livespell").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn default_personal_dict_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "livespell").map(|dirs| dirs.config_dir().join("personal.txt"))
    }

    pub fn cache_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "livespell").map(|dirs| dirs.cache_dir().to_path_buf())
    }
}
