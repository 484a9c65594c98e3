use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::engine::card::{Card, CardId, CardStats, RawCard};
use crate::engine::error::CoreError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderingMode {
    Sequential,
    #[default]
    Shuffled,
}

impl OrderingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderingMode::Sequential => "sequential",
            OrderingMode::Shuffled => "shuffled",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            OrderingMode::Sequential => OrderingMode::Shuffled,
            OrderingMode::Shuffled => OrderingMode::Sequential,
        }
    }
}

impl fmt::Display for OrderingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" | "original" => Ok(OrderingMode::Sequential),
            "shuffled" | "shuffle" => Ok(OrderingMode::Shuffled),
            other => Err(format!("unknown ordering '{other}' (expected sequential or shuffled)")),
        }
    }
}

/// Everything needed to restore study progress for one word list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StudySnapshot {
    pub cards: BTreeMap<CardId, CardStats>,
    pub favorite_words: Vec<CardId>,
}

/// Cards in source order plus the working list used for display.
///
/// `cards[i].id == i` always holds, so the source order doubles as the id
/// index. `active_order` holds ids and can be shuffled or filtered without
/// touching `cards`.
#[derive(Clone, Debug)]
pub struct CardStore {
    cards: Vec<Card>,
    active_order: Vec<CardId>,
    ordering: OrderingMode,
    favorites_only: bool,
}

impl CardStore {
    /// Build cards with ids in input order. The working list starts out in
    /// source order.
    pub fn load(raw_cards: Vec<RawCard>, now: DateTime<Utc>) -> Result<Self, CoreError> {
        if raw_cards.is_empty() {
            return Err(CoreError::EmptyData);
        }
        let cards: Vec<Card> = raw_cards
            .into_iter()
            .enumerate()
            .map(|(idx, raw)| Card::from_raw(idx as CardId, raw, now))
            .collect();
        let active_order = cards.iter().map(|c| c.id).collect();
        Ok(Self {
            cards,
            active_order,
            ordering: OrderingMode::Sequential,
            favorites_only: false,
        })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// All cards in source order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id as usize)
    }

    pub fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.get_mut(id as usize)
    }

    pub fn active_order(&self) -> &[CardId] {
        &self.active_order
    }

    /// Cards of the working list, in display order.
    pub fn active_cards(&self) -> Vec<&Card> {
        self.active_order
            .iter()
            .filter_map(|&id| self.card(id))
            .collect()
    }

    pub fn ordering(&self) -> OrderingMode {
        self.ordering
    }

    pub fn favorites_only(&self) -> bool {
        self.favorites_only
    }

    pub fn favorite_ids(&self) -> Vec<CardId> {
        self.cards
            .iter()
            .filter(|c| c.is_favorite)
            .map(|c| c.id)
            .collect()
    }

    /// Rebuild the working list from every card, in source order or as a
    /// uniform shuffle. Drops any favorites-only filter.
    pub fn apply_ordering<R: Rng + ?Sized>(&mut self, mode: OrderingMode, rng: &mut R) {
        self.ordering = mode;
        self.favorites_only = false;
        self.active_order = self.cards.iter().map(|c| c.id).collect();
        if mode == OrderingMode::Shuffled {
            self.active_order.shuffle(rng);
        }
    }

    /// Restrict the working list to favorites (kept in source order), or
    /// lift the restriction by reapplying the current ordering.
    pub fn set_favorites_only<R: Rng + ?Sized>(
        &mut self,
        enabled: bool,
        rng: &mut R,
    ) -> Result<(), CoreError> {
        if !enabled {
            self.apply_ordering(self.ordering, rng);
            return Ok(());
        }
        let favorites = self.favorite_ids();
        if favorites.is_empty() {
            return Err(CoreError::NoFavorites);
        }
        self.active_order = favorites;
        self.favorites_only = true;
        Ok(())
    }

    /// Flip the favorite flag. Returns the new state, or `None` for an
    /// unknown id.
    pub fn toggle_favorite(&mut self, id: CardId) -> Option<bool> {
        let card = self.card_mut(id)?;
        card.is_favorite = !card.is_favorite;
        Some(card.is_favorite)
    }

    /// Reinstate a working list saved by an earlier run. Rejected (returning
    /// false, nothing changed) if it names unknown or repeated ids, is not a
    /// full permutation when unfiltered, or lists a non-favorite when
    /// filtered.
    pub fn restore_active_order(&mut self, ids: &[CardId], favorites_only: bool) -> bool {
        if ids.is_empty() {
            return false;
        }
        let mut seen = vec![false; self.cards.len()];
        for &id in ids {
            match seen.get_mut(id as usize) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        let valid = if favorites_only {
            ids.iter().all(|&id| self.cards[id as usize].is_favorite)
        } else {
            ids.len() == self.cards.len()
        };
        if valid {
            self.active_order = ids.to_vec();
            self.favorites_only = favorites_only;
        }
        valid
    }

    pub fn snapshot(&self) -> StudySnapshot {
        StudySnapshot {
            cards: self.cards.iter().map(|c| (c.id, c.stats())).collect(),
            favorite_words: self.favorite_ids(),
        }
    }

    /// Overlay persisted statistics and favorites onto the loaded cards.
    /// Ids not present in this word list are ignored. Returns how many
    /// cards had their points corrected to match their answer counts.
    pub fn merge_persisted(&mut self, snapshot: &StudySnapshot) -> usize {
        let mut reconciled = 0;
        for (&id, stats) in &snapshot.cards {
            if let Some(card) = self.card_mut(id) {
                card.apply_stats(stats);
                if card.reconcile_points() {
                    reconciled += 1;
                }
            }
        }
        for &id in &snapshot.favorite_words {
            if let Some(card) = self.card_mut(id) {
                card.is_favorite = true;
            }
        }
        if self.favorites_only {
            self.active_order = self.favorite_ids();
        }
        reconciled
    }
}
