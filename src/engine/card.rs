use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type CardId = u32;

/// A card as it arrives from a word source, before ids are assigned.
///
/// Only `term` and `meaning` are required. Statistics carried by the source
/// (the word list keeps running totals in extra columns) override the
/// zero defaults when present.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCard {
    pub term: String,
    pub meaning: String,
    #[serde(default)]
    pub reading: String,
    #[serde(default)]
    pub wrong_count: Option<u32>,
    #[serde(default)]
    pub understood_count: Option<u32>,
    #[serde(default)]
    pub ng_count: Option<u32>,
    #[serde(default)]
    pub total_points: Option<i64>,
    #[serde(default)]
    pub last_studied: Option<DateTime<Utc>>,
}

impl RawCard {
    pub fn new(term: &str, meaning: &str, reading: &str) -> Self {
        Self {
            term: term.to_string(),
            meaning: meaning.to_string(),
            reading: reading.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub term: String,
    pub meaning: String,
    pub reading: String,
    pub wrong_count: u32,
    pub understood_count: u32,
    pub ng_count: u32,
    pub total_points: i64,
    pub consecutive_understood: i64,
    pub last_studied: Option<DateTime<Utc>>,
    pub next_review: DateTime<Utc>,
    pub is_favorite: bool,
}

impl Card {
    pub fn from_raw(id: CardId, raw: RawCard, now: DateTime<Utc>) -> Self {
        let mut card = Self {
            id,
            term: raw.term,
            meaning: raw.meaning,
            reading: raw.reading,
            wrong_count: raw.wrong_count.unwrap_or(0),
            understood_count: raw.understood_count.unwrap_or(0),
            ng_count: raw.ng_count.unwrap_or(0),
            total_points: raw.total_points.unwrap_or(0),
            consecutive_understood: 0,
            last_studied: raw.last_studied,
            next_review: now,
            is_favorite: false,
        };
        card.reconcile_points();
        card
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }

    /// True once any answer has been counted for this card.
    pub fn has_answers(&self) -> bool {
        self.understood_count > 0 || self.ng_count > 0
    }

    /// Never studied: no timestamp and no counted answers.
    pub fn is_new(&self) -> bool {
        self.last_studied.is_none() && !self.has_answers()
    }

    /// Force `total_points` back to `understood_count - ng_count`.
    /// Returns true if the stored value disagreed.
    pub fn reconcile_points(&mut self) -> bool {
        let expected = i64::from(self.understood_count) - i64::from(self.ng_count);
        if self.total_points == expected {
            return false;
        }
        self.total_points = expected;
        true
    }

    /// Overlay persisted statistics. Present fields win, absent fields keep
    /// whatever the card already holds.
    pub fn apply_stats(&mut self, stats: &CardStats) {
        if let Some(v) = stats.wrong_count {
            self.wrong_count = v;
        }
        if let Some(v) = stats.understood_count {
            self.understood_count = v;
        }
        if let Some(v) = stats.ng_count {
            self.ng_count = v;
        }
        if let Some(v) = stats.total_points {
            self.total_points = v;
        }
        if let Some(v) = stats.consecutive_understood {
            self.consecutive_understood = v;
        }
        if let Some(v) = stats.last_studied {
            self.last_studied = Some(v);
        }
        if let Some(v) = stats.next_review {
            self.next_review = v;
        }
    }

    pub fn stats(&self) -> CardStats {
        CardStats {
            wrong_count: Some(self.wrong_count),
            understood_count: Some(self.understood_count),
            ng_count: Some(self.ng_count),
            total_points: Some(self.total_points),
            consecutive_understood: Some(self.consecutive_understood),
            last_studied: self.last_studied,
            next_review: Some(self.next_review),
        }
    }
}

/// Persisted per-card statistics, keyed by card id in the study data file.
/// Unknown fields are a parse error rather than being carried along.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CardStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrong_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub understood_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ng_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_points: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consecutive_understood: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_studied: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review: Option<DateTime<Utc>>,
}
