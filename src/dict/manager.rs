use crate::config::{Config, DictionaryFormat, DictionarySource};
use crate::checker::DictionaryStore;
use anyhow::{anyhow, Context, Result};
use colored::*;
use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// Raw payloads for one language, ready to parse.
#[derive(Debug, Clone)]
pub struct Payload {
    pub language: String,
    pub format: DictionaryFormat,
    pub aff: String,
    pub dic: String,
}

/// Outcome of loading every configured language.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl LoadReport {
    pub fn is_loaded(&self, language: &str) -> bool {
        self.loaded.iter().any(|l| l == language)
    }
}

enum Location<'a> {
    Remote(&'a str),
    Local(PathBuf),
}

fn classify(location: &str) -> Location<'_> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Location::Remote(location)
    } else if let Some(path) = location.strip_prefix("file://") {
        Location::Local(PathBuf::from(path))
    } else {
        Location::Local(PathBuf::from(location))
    }
}

/// Cache file for a remote location, keyed by the SHA-256 of its URL.
pub fn cache_path(cache_dir: &Path, url: &str) -> PathBuf {
    let digest = Sha256::digest(url.as_bytes());
    cache_dir.join(format!("{:x}.cache", digest))
}

fn decode(location: &str, bytes: Vec<u8>) -> Result<String> {
    if location.ends_with(".gz") {
        let mut text = String::new();
        GzDecoder::new(bytes.as_slice())
            .read_to_string(&mut text)
            .with_context(|| format!("Failed to decompress {}", location))?;
        Ok(text)
    } else {
        String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", location))
    }
}

async fn fetch_bytes(client: &reqwest::Client, url: &str, cache: bool) -> Result<Vec<u8>> {
    let cached = if cache {
        Config::cache_dir().map(|dir| cache_path(&dir, url))
    } else {
        None
    };

    if let Some(path) = &cached {
        if path.exists() {
            debug!(%url, path = %path.display(), "using cached payload");
            return fs::read(path)
                .with_context(|| format!("Failed to read cache file: {}", path.display()));
        }
    }

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", url))?;
    if !response.status().is_success() {
        anyhow::bail!("Failed to download {}: HTTP {}", url, response.status());
    }
    let bytes = response.bytes().await?.to_vec();

    if let Some(path) = &cached {
        let written = path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|_| fs::write(path, &bytes));
        if let Err(e) = written {
            warn!(path = %path.display(), error = %e, "failed to cache payload");
        }
    }

    Ok(bytes)
}

/// Read one payload location, remote or local.
pub async fn fetch_location(client: &reqwest::Client, location: &str, cache: bool) -> Result<String> {
    let bytes = match classify(location) {
        Location::Remote(url) => fetch_bytes(client, url, cache).await?,
        Location::Local(path) => fs::read(&path)
            .with_context(|| format!("Failed to read dictionary file: {}", path.display()))?,
    };
    decode(location, bytes)
}

pub async fn fetch_payload(
    client: &reqwest::Client,
    language: &str,
    source: &DictionarySource,
    cache: bool,
) -> Result<Payload> {
    let aff = match source.format {
        DictionaryFormat::Hunspell => fetch_location(client, &source.aff, cache).await?,
        DictionaryFormat::Wordlist => String::new(),
    };
    let dic = fetch_location(client, &source.dic, cache).await?;

    Ok(Payload {
        language: language.to_string(),
        format: source.format,
        aff,
        dic,
    })
}

type Fetched = (String, Result<Payload>);

/// Drain `tasks`, sorted by language. Languages in `pending` whose task never
/// reported back come out as failures.
async fn join_payloads(mut tasks: JoinSet<Fetched>, mut pending: BTreeSet<String>) -> Vec<Fetched> {
    let mut payloads = Vec::new();
    let mut task_error = None;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => {
                pending.remove(&result.0);
                payloads.push(result);
            }
            Err(e) => {
                error!(error = %e, "dictionary task failed");
                task_error = Some(e.to_string());
            }
        }
    }

    for language in pending {
        let reason = task_error.as_deref().unwrap_or("task did not complete");
        payloads.push((language, Err(anyhow!("dictionary task failed: {}", reason))));
    }
    payloads.sort_by(|a, b| a.0.cmp(&b.0));
    payloads
}

/// Fetch every configured language concurrently and register what parses.
/// A failing language is logged once and left unregistered.
pub async fn load_dictionaries(config: &Config, store: &mut DictionaryStore) -> LoadReport {
    let client = reqwest::Client::new();
    let mut tasks = JoinSet::new();

    for (language, source) in &config.dictionaries {
        let client = client.clone();
        let language = language.clone();
        let source = source.clone();
        let cache = config.cache_enabled();
        tasks.spawn(async move {
            let payload = fetch_payload(&client, &language, &source, cache).await;
            (language, payload)
        });
    }

    let pending = config.dictionaries.keys().cloned().collect();
    let payloads = join_payloads(tasks, pending).await;

    let mut report = LoadReport::default();
    for (language, payload) in payloads {
        let registered = payload.and_then(|payload| {
            store
                .load_format(&payload.language, payload.format, &payload.aff, &payload.dic)
                .map_err(anyhow::Error::from)
        });
        match registered {
            Ok(()) => {
                debug!(%language, "dictionary loaded");
                report.loaded.push(language);
            }
            Err(e) => {
                error!(%language, error = %format!("{:#}", e), "failed to load dictionary");
                report.failed.push((language, format!("{:#}", e)));
            }
        }
    }

    report
}

pub fn list_dictionaries(config: &Config) -> Result<()> {
    if config.dictionaries.is_empty() {
        println!("{}", "No dictionaries configured.".yellow());
        return Ok(());
    }

    println!("{}", "Configured dictionaries:".bold());
    println!();

    let cache_dir = Config::cache_dir();
    for (language, source) in &config.dictionaries {
        let default_marker = if *language == config.default_language {
            " (default)".dimmed().to_string()
        } else {
            String::new()
        };
        println!("  {}{}", language.cyan().bold(), default_marker);

        let locations = match source.format {
            DictionaryFormat::Hunspell => vec![&source.aff, &source.dic],
            DictionaryFormat::Wordlist => vec![&source.dic],
        };
        for location in locations {
            let status = match (classify(location), &cache_dir) {
                (Location::Remote(url), Some(dir)) if cache_path(dir, url).exists() => {
                    "cached".green()
                }
                (Location::Remote(_), _) => "remote".yellow(),
                (Location::Local(path), _) if path.exists() => "local".green(),
                (Location::Local(_), _) => "missing".red(),
            };
            println!("    {} {}", status, location.dimmed());
        }
    }

    if let Some(dir) = cache_dir {
        println!();
        println!("Cache directory: {}", dir.display().to_string().dimmed());
    }

    Ok(())
}

/// Download remote payloads into the cache.
pub async fn fetch_dictionaries(config: &Config, language: Option<&str>) -> Result<()> {
    let selected: Vec<_> = config
        .dictionaries
        .iter()
        .filter(|(key, _)| language.map_or(true, |l| l == key.as_str()))
        .collect();

    if selected.is_empty() {
        anyhow::bail!(
            "Language '{}' is not configured.",
            language.unwrap_or_default()
        );
    }

    let client = reqwest::Client::new();
    for (key, source) in selected {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Fetching {}...", key));

        let payload = fetch_payload(&client, key, source, true).await;
        match payload {
            Ok(payload) => {
                pb.finish_and_clear();
                println!(
                    "{} {} ({} KB)",
                    "✓".green().bold(),
                    key.cyan(),
                    (payload.aff.len() + payload.dic.len()) / 1024
                );
            }
            Err(e) => {
                pb.finish_and_clear();
                println!("{} {}: {:#}", "✗".red().bold(), key.yellow(), e);
            }
        }
    }

    Ok(())
}

pub fn clear_cache() -> Result<()> {
    let Some(dir) = Config::cache_dir() else {
        anyhow::bail!("Failed to get cache directory");
    };
    if !dir.exists() {
        println!("{}", "Cache is already empty.".yellow());
        return Ok(());
    }

    let mut removed = 0;
    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("cache") {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            removed += 1;
        }
    }

    println!("{} Removed {} cached payloads", "✓".green().bold(), removed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::collections::BTreeMap;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_cache_path_is_stable() {
        let dir = Path::new("/tmp/cache");
        let a = cache_path(dir, "https://example.com/en.dic");
        let b = cache_path(dir, "https://example.com/en.dic");
        let c = cache_path(dir, "https://example.com/fr.dic");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.extension().and_then(|e| e.to_str()), Some("cache"));
    }

    #[test]
    fn test_decode_gzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"hello\nworld\n").unwrap();
        let bytes = encoder.finish().unwrap();

        assert_eq!(decode("words.txt.gz", bytes).unwrap(), "hello\nworld\n");
        assert!(decode("words.txt", vec![0xff, 0xfe]).is_err());
    }

    #[tokio::test]
    async fn test_failed_language_is_left_out() {
        let dir = tempdir().unwrap();
        let en = dir.path().join("en.txt");
        fs::write(&en, "the\nfox\n").unwrap();

        let mut dictionaries = BTreeMap::new();
        dictionaries.insert(
            "en".to_string(),
            DictionarySource {
                aff: String::new(),
                dic: format!("file://{}", en.display()),
                format: DictionaryFormat::Wordlist,
            },
        );
        dictionaries.insert(
            "fr".to_string(),
            DictionarySource {
                aff: dir.path().join("missing.aff").display().to_string(),
                dic: dir.path().join("missing.dic").display().to_string(),
                format: DictionaryFormat::Hunspell,
            },
        );
        let config = Config {
            dictionaries,
            cache: Some(false),
            ..Default::default()
        };

        let mut store = DictionaryStore::new();
        let report = load_dictionaries(&config, &mut store).await;

        assert!(report.is_loaded("en"));
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "fr");
        assert!(store.contains("en"));
        assert!(!store.contains("fr"));
    }

    async fn crashing_fetch() -> Fetched {
        panic!("fetch crashed")
    }

    #[tokio::test]
    async fn test_crashed_task_is_reported_by_language() {
        let mut tasks: JoinSet<Fetched> = JoinSet::new();
        tasks.spawn(async {
            let payload = Payload {
                language: "en".to_string(),
                format: DictionaryFormat::Wordlist,
                aff: String::new(),
                dic: "the".to_string(),
            };
            ("en".to_string(), Ok(payload))
        });
        tasks.spawn(crashing_fetch());

        let pending = ["en", "fr"].iter().map(|l| l.to_string()).collect();
        let payloads = join_payloads(tasks, pending).await;

        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].0, "en");
        assert!(payloads[0].1.is_ok());
        assert_eq!(payloads[1].0, "fr");
        assert!(payloads[1].1.is_err());
    }
}
