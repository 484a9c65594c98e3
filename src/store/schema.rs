use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::engine::card::{CardId, CardStats};
use crate::engine::card_store::StudySnapshot;

pub const SCHEMA_VERSION: u32 = 1;

/// Per-card statistics and favorites for one word list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyData {
    pub schema_version: u32,
    #[serde(default)]
    pub cards: BTreeMap<CardId, CardStats>,
    #[serde(default)]
    pub favorite_words: Vec<CardId>,
}

impl Default for StudyData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            cards: BTreeMap::new(),
            favorite_words: Vec::new(),
        }
    }
}

impl StudyData {
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }

    pub fn from_snapshot(snapshot: StudySnapshot) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            cards: snapshot.cards,
            favorite_words: snapshot.favorite_words,
        }
    }

    pub fn to_snapshot(&self) -> StudySnapshot {
        StudySnapshot {
            cards: self.cards.clone(),
            favorite_words: self.favorite_words.clone(),
        }
    }
}

/// Where the learner left off. Restored only when recent enough.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub schema_version: u32,
    pub current_index: usize,
    pub is_flipped: bool,
    #[serde(default)]
    pub favorites_only: bool,
    #[serde(default)]
    pub new_words_seen: u32,
    #[serde(default)]
    pub active_order: Vec<CardId>,
    pub last_session_time: DateTime<Utc>,
}

pub const EXPORT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub tango_export_version: u32,
    pub exported_at: DateTime<Utc>,
    pub config: Config,
    pub study: StudyData,
    #[serde(default)]
    pub session: Option<SessionData>,
}
