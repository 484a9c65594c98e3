pub mod cache;
pub mod fetch;
pub mod sample;
pub mod word_list;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::engine::card::RawCard;
use cache::DiskCache;
use fetch::{FetchOutcome, RetryPolicy};

/// Where the loaded cards came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WordSource {
    File(PathBuf),
    Remote(String),
    Cached(String),
    Sample,
}

impl fmt::Display for WordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordSource::File(path) => write!(f, "file {}", path.display()),
            WordSource::Remote(url) => write!(f, "{url}"),
            WordSource::Cached(url) => write!(f, "cached copy of {url}"),
            WordSource::Sample => f.write_str("built-in sample"),
        }
    }
}

pub struct LoadedWords {
    pub cards: Vec<RawCard>,
    pub source: WordSource,
    /// Why earlier sources were skipped, for the status line.
    pub warnings: Vec<String>,
}

pub fn read_word_file(path: &Path) -> Result<Vec<RawCard>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(word_list::parse_tsv(&text))
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Resolve the configured word list: local file, then remote URL, then the
/// cached copy of that URL, then the built-in sample. A source that yields
/// no cards is skipped like one that fails.
pub fn load_cards(config: &Config) -> LoadedWords {
    let cache = DiskCache::new();
    load_cards_with(config, cache.as_ref(), fetch::fetch_with_retry)
}

pub fn load_cards_with<F>(config: &Config, cache: Option<&DiskCache>, fetch: F) -> LoadedWords
where
    F: FnOnce(&str, &RetryPolicy) -> FetchOutcome,
{
    let mut warnings = Vec::new();

    if let Some(ref path) = config.word_list_path {
        let path = expand_home(path);
        match read_word_file(&path) {
            Ok(cards) if !cards.is_empty() => {
                info!(path = %path.display(), count = cards.len(), "loaded word list");
                return LoadedWords {
                    cards,
                    source: WordSource::File(path),
                    warnings,
                };
            }
            Ok(_) => warnings.push(format!("{} has no usable rows", path.display())),
            Err(err) => warnings.push(format!("{err:#}")),
        }
    }

    if let Some(ref url) = config.word_list_url {
        let policy = RetryPolicy {
            max_attempts: config.fetch_max_attempts,
            timeout: Duration::from_secs(config.fetch_timeout_secs),
            ..RetryPolicy::default()
        };
        match fetch(url, &policy) {
            FetchOutcome::Fetched(body) => {
                let cards = word_list::parse_tsv(&body);
                if !cards.is_empty() {
                    if let Some(cache) = cache {
                        cache.put(url, &body);
                    }
                    info!(url, count = cards.len(), "loaded remote word list");
                    return LoadedWords {
                        cards,
                        source: WordSource::Remote(url.clone()),
                        warnings,
                    };
                }
                warnings.push(format!("{url} has no usable rows"));
            }
            FetchOutcome::Exhausted {
                attempts,
                last_error,
            } => warnings.push(format!(
                "fetching {url} failed after {attempts} attempts: {last_error}"
            )),
        }

        if let Some(body) = cache.and_then(|c| c.get(url)) {
            let cards = word_list::parse_tsv(&body);
            if !cards.is_empty() {
                info!(url, count = cards.len(), "using cached word list");
                return LoadedWords {
                    cards,
                    source: WordSource::Cached(url.clone()),
                    warnings,
                };
            }
        }
    }

    for warning in &warnings {
        warn!("{warning}");
    }
    LoadedWords {
        cards: sample::sample_cards(),
        source: WordSource::Sample,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_fetch(_: &str, _: &RetryPolicy) -> FetchOutcome {
        panic!("fetch should not be called")
    }

    #[test]
    fn test_no_sources_gives_sample() {
        let loaded = load_cards_with(&Config::default(), None, no_fetch);
        assert_eq!(loaded.source, WordSource::Sample);
        assert_eq!(loaded.cards.len(), 5);
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_file_source_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.tsv");
        fs::write(&path, "犬\tdog\n猫\tcat\n").unwrap();
        let config = Config {
            word_list_path: Some(path.to_string_lossy().to_string()),
            word_list_url: Some("https://example.com/w.tsv".to_string()),
            ..Config::default()
        };
        let loaded = load_cards_with(&config, None, no_fetch);
        assert_eq!(loaded.source, WordSource::File(path));
        assert_eq!(loaded.cards.len(), 2);
    }

    #[test]
    fn test_missing_file_falls_through_to_remote_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::with_base_dir(dir.path().join("cache")).unwrap();
        let url = "https://example.com/w.tsv";
        let config = Config {
            word_list_path: Some(dir.path().join("missing.tsv").to_string_lossy().to_string()),
            word_list_url: Some(url.to_string()),
            ..Config::default()
        };
        let loaded = load_cards_with(&config, Some(&cache), |_, policy| {
            assert_eq!(policy.max_attempts, 4);
            FetchOutcome::Fetched("山\tmountain\n".to_string())
        });
        assert_eq!(loaded.source, WordSource::Remote(url.to_string()));
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(cache.get(url).as_deref(), Some("山\tmountain\n"));
    }

    #[test]
    fn test_exhausted_fetch_uses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::with_base_dir(dir.path().to_path_buf()).unwrap();
        let url = "https://example.com/w.tsv";
        cache.put(url, "川\triver\n空\tsky\n");
        let config = Config {
            word_list_url: Some(url.to_string()),
            ..Config::default()
        };
        let loaded = load_cards_with(&config, Some(&cache), |_, _| FetchOutcome::Exhausted {
            attempts: 4,
            last_error: "timeout".to_string(),
        });
        assert_eq!(loaded.source, WordSource::Cached(url.to_string()));
        assert_eq!(loaded.cards.len(), 2);
        assert!(loaded.warnings[0].contains("after 4 attempts"));
    }

    #[test]
    fn test_exhausted_fetch_without_cache_gives_sample() {
        let config = Config {
            word_list_url: Some("https://example.com/w.tsv".to_string()),
            ..Config::default()
        };
        let loaded = load_cards_with(&config, None, |_, _| FetchOutcome::Exhausted {
            attempts: 4,
            last_error: "dns".to_string(),
        });
        assert_eq!(loaded.source, WordSource::Sample);
        assert_eq!(loaded.warnings.len(), 1);
    }
}
