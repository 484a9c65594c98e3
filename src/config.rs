use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::card_store::OrderingMode;
use crate::engine::scheduler::DEFAULT_NEW_WORDS_THRESHOLD;

/// Which side of the card is shown before flipping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontMode {
    #[default]
    Term,
    Meaning,
}

impl FrontMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FrontMode::Term => "term",
            FrontMode::Meaning => "meaning",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            FrontMode::Term => FrontMode::Meaning,
            FrontMode::Meaning => FrontMode::Term,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub ordering: OrderingMode,
    #[serde(default)]
    pub front: FrontMode,
    #[serde(default = "default_new_words_threshold")]
    pub new_words_threshold: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_list_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_list_url: Option<String>,
    #[serde(default = "default_fetch_max_attempts")]
    pub fetch_max_attempts: u32,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_resume_window_hours")]
    pub resume_window_hours: u32,
}

fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_new_words_threshold() -> u32 {
    DEFAULT_NEW_WORDS_THRESHOLD
}
fn default_fetch_max_attempts() -> u32 {
    4
}
fn default_fetch_timeout_secs() -> u64 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_resume_window_hours() -> u32 {
    24
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            ordering: OrderingMode::default(),
            front: FrontMode::default(),
            new_words_threshold: default_new_words_threshold(),
            word_list_path: None,
            word_list_url: None,
            fetch_max_attempts: default_fetch_max_attempts(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            log_level: default_log_level(),
            resume_window_hours: default_resume_window_hours(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let mut config: Config = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tango")
            .join("config.toml")
    }

    /// Clamp values a hand-edited file could leave unusable.
    pub fn validate(&mut self) {
        self.new_words_threshold = self.new_words_threshold.clamp(1, 1000);
        self.fetch_max_attempts = self.fetch_max_attempts.clamp(1, 10);
        self.fetch_timeout_secs = self.fetch_timeout_secs.clamp(1, 120);
        if self.word_list_path.as_deref().is_some_and(|p| p.trim().is_empty()) {
            self.word_list_path = None;
        }
        if self.word_list_url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            self.word_list_url = None;
        }
    }

    pub fn resume_window(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.resume_window_hours))
    }
}
