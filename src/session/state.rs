use chrono::{DateTime, Duration, Utc};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::debug;

use crate::engine::card::{Card, CardId};
use crate::engine::card_store::{CardStore, OrderingMode};
use crate::engine::error::CoreError;
use crate::engine::scheduler;
use crate::engine::scoring;
use crate::store::schema::{SCHEMA_VERSION, SessionData};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Answer { correct: bool },
    Flip,
    Reorder(OrderingMode),
    ToggleFavoritesOnly,
}

/// What an action changed, for the caller's status line and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Answered {
        card_id: CardId,
        first_study: bool,
        next_review: DateTime<Utc>,
    },
    Flipped(bool),
    Reordered(OrderingMode),
    FavoritesOnly(bool),
}

#[derive(Clone, Copy, Debug)]
pub struct CurrentCard<'a> {
    pub card: &'a Card,
    pub is_flipped: bool,
    pub position: usize,
    pub total: usize,
}

/// Study session over a card store.
///
/// `current_index` always points into the store's working list, which is
/// never empty: loading rejects empty input and the favorites-only filter
/// refuses to produce an empty list.
pub struct Session {
    store: CardStore,
    current_index: usize,
    is_flipped: bool,
    new_words_seen: u32,
    new_words_threshold: u32,
    rng: SmallRng,
}

impl Session {
    pub fn new(store: CardStore, new_words_threshold: u32) -> Self {
        Self::with_rng(store, new_words_threshold, SmallRng::from_entropy())
    }

    pub fn with_seed(store: CardStore, new_words_threshold: u32, seed: u64) -> Self {
        Self::with_rng(store, new_words_threshold, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(store: CardStore, new_words_threshold: u32, rng: SmallRng) -> Self {
        Self {
            store,
            current_index: 0,
            is_flipped: false,
            new_words_seen: 0,
            new_words_threshold,
            rng,
        }
    }

    pub fn store(&self) -> &CardStore {
        &self.store
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_flipped(&self) -> bool {
        self.is_flipped
    }

    pub fn new_words_seen(&self) -> u32 {
        self.new_words_seen
    }

    pub fn new_words_threshold(&self) -> u32 {
        self.new_words_threshold
    }

    pub fn set_new_words_threshold(&mut self, threshold: u32) {
        self.new_words_threshold = threshold;
    }

    pub fn current(&self) -> Option<CurrentCard<'_>> {
        let id = *self.store.active_order().get(self.current_index)?;
        Some(CurrentCard {
            card: self.store.card(id)?,
            is_flipped: self.is_flipped,
            position: self.current_index,
            total: self.store.active_order().len(),
        })
    }

    pub fn advance(&mut self, action: Action, now: DateTime<Utc>) -> Result<Outcome, CoreError> {
        match action {
            Action::Answer { correct } => self.answer(correct, now),
            Action::Flip => {
                self.is_flipped = !self.is_flipped;
                Ok(Outcome::Flipped(self.is_flipped))
            }
            Action::Reorder(mode) => {
                self.store.apply_ordering(mode, &mut self.rng);
                self.reset_position();
                Ok(Outcome::Reordered(mode))
            }
            Action::ToggleFavoritesOnly => {
                let enable = !self.store.favorites_only();
                self.store.set_favorites_only(enable, &mut self.rng)?;
                self.reset_position();
                Ok(Outcome::FavoritesOnly(enable))
            }
        }
    }

    fn answer(&mut self, correct: bool, now: DateTime<Utc>) -> Result<Outcome, CoreError> {
        let card_id = *self
            .store
            .active_order()
            .get(self.current_index)
            .ok_or(CoreError::EmptyPool)?;
        let card = self.store.card_mut(card_id).ok_or(CoreError::EmptyPool)?;
        let result = scoring::record_answer(card, correct, now);
        if result.first_study {
            self.new_words_seen += 1;
        }

        let active = self.store.active_cards();
        self.current_index =
            scheduler::select_next(&active, self.new_words_seen, self.new_words_threshold, now)?;
        self.is_flipped = false;

        debug!(
            card_id,
            correct,
            next_index = self.current_index,
            new_words_seen = self.new_words_seen,
            "answer recorded"
        );
        Ok(Outcome::Answered {
            card_id,
            first_study: result.first_study,
            next_review: result.next_review,
        })
    }

    /// Flip the favorite flag of the card on screen.
    pub fn toggle_current_favorite(&mut self) -> Option<bool> {
        let id = *self.store.active_order().get(self.current_index)?;
        self.store.toggle_favorite(id)
    }

    /// Apply the configured ordering at startup.
    pub fn apply_ordering(&mut self, mode: OrderingMode) {
        self.store.apply_ordering(mode, &mut self.rng);
        self.reset_position();
    }

    fn reset_position(&mut self) {
        self.current_index = 0;
        self.is_flipped = false;
    }

    pub fn to_session_data(&self, now: DateTime<Utc>) -> SessionData {
        SessionData {
            schema_version: SCHEMA_VERSION,
            current_index: self.current_index,
            is_flipped: self.is_flipped,
            favorites_only: self.store.favorites_only(),
            new_words_seen: self.new_words_seen,
            active_order: self.store.active_order().to_vec(),
            last_session_time: now,
        }
    }

    /// Pick up where a previous run stopped, if it ended within `window` and
    /// its working list still fits the loaded cards. Returns whether the
    /// saved position was restored.
    pub fn resume(&mut self, saved: &SessionData, now: DateTime<Utc>, window: Duration) -> bool {
        if now - saved.last_session_time >= window {
            debug!("previous session too old, starting fresh");
            return false;
        }
        if !self
            .store
            .restore_active_order(&saved.active_order, saved.favorites_only)
        {
            debug!("saved working list does not match word list, starting fresh");
            return false;
        }
        self.new_words_seen = saved.new_words_seen;
        if saved.current_index < self.store.active_order().len() {
            self.current_index = saved.current_index;
            self.is_flipped = saved.is_flipped;
        } else {
            self.reset_position();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::card::RawCard;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 7, 7, 0, 0).unwrap()
    }

    fn session(n: usize) -> Session {
        let raw = (0..n)
            .map(|i| RawCard::new(&format!("t{i}"), &format!("m{i}"), ""))
            .collect();
        Session::with_seed(CardStore::load(raw, now()).unwrap(), 10, 42)
    }

    #[test]
    fn test_flip_toggles() {
        let mut s = session(2);
        assert_eq!(s.advance(Action::Flip, now()), Ok(Outcome::Flipped(true)));
        assert!(s.current().unwrap().is_flipped);
        assert_eq!(s.advance(Action::Flip, now()), Ok(Outcome::Flipped(false)));
    }

    #[test]
    fn test_answer_moves_to_scheduled_card() {
        let mut s = session(3);
        s.advance(Action::Flip, now()).unwrap();
        let outcome = s.advance(Action::Answer { correct: false }, now()).unwrap();
        assert!(matches!(
            outcome,
            Outcome::Answered { card_id: 0, first_study: true, .. }
        ));
        assert!(!s.is_flipped());
        assert_eq!(s.new_words_seen(), 1);
        // card 0 is no longer due; cards 1 and 2 tie at 0 points, lowest id wins
        assert_eq!(s.current().unwrap().card.id, 1);
    }

    #[test]
    fn test_only_first_answer_counts_as_new() {
        let mut s = session(1);
        s.advance(Action::Answer { correct: true }, now()).unwrap();
        s.advance(Action::Answer { correct: true }, now()).unwrap();
        assert_eq!(s.new_words_seen(), 1);
        let card = s.current().unwrap().card;
        assert_eq!(card.understood_count, 2);
        assert_eq!(card.next_review, now() + Duration::days(3));
    }

    #[test]
    fn test_reorder_resets_position() {
        let mut s = session(5);
        s.advance(Action::Answer { correct: true }, now()).unwrap();
        s.advance(Action::Flip, now()).unwrap();
        let outcome = s
            .advance(Action::Reorder(OrderingMode::Shuffled), now())
            .unwrap();
        assert_eq!(outcome, Outcome::Reordered(OrderingMode::Shuffled));
        assert_eq!(s.current_index(), 0);
        assert!(!s.is_flipped());
        assert_eq!(s.store().active_order().len(), 5);
    }

    #[test]
    fn test_toggle_favorites_only() {
        let mut s = session(4);
        assert_eq!(
            s.advance(Action::ToggleFavoritesOnly, now()),
            Err(CoreError::NoFavorites)
        );
        assert!(!s.store().favorites_only());

        s.advance(Action::Reorder(OrderingMode::Sequential), now())
            .unwrap();
        s.advance(Action::Answer { correct: true }, now()).unwrap();
        assert_eq!(s.toggle_current_favorite(), Some(true));
        let fav_id = s.current().unwrap().card.id;

        assert_eq!(
            s.advance(Action::ToggleFavoritesOnly, now()),
            Ok(Outcome::FavoritesOnly(true))
        );
        assert_eq!(s.store().active_order(), &[fav_id]);
        assert_eq!(s.current().unwrap().card.id, fav_id);

        assert_eq!(
            s.advance(Action::ToggleFavoritesOnly, now()),
            Ok(Outcome::FavoritesOnly(false))
        );
        assert_eq!(s.store().active_order(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_resume_within_window() {
        let mut s = session(4);
        s.advance(Action::Reorder(OrderingMode::Shuffled), now())
            .unwrap();
        s.advance(Action::Answer { correct: false }, now()).unwrap();
        s.advance(Action::Flip, now()).unwrap();
        let saved = s.to_session_data(now());

        let mut resumed = session(4);
        let later = now() + Duration::hours(2);
        assert!(resumed.resume(&saved, later, Duration::hours(24)));
        assert_eq!(resumed.store().active_order(), s.store().active_order());
        assert_eq!(resumed.current_index(), s.current_index());
        assert!(resumed.is_flipped());
        assert_eq!(resumed.new_words_seen(), 1);
    }

    #[test]
    fn test_resume_rejects_stale_or_mismatched() {
        let s = session(3);
        let saved = s.to_session_data(now());

        let mut stale = session(3);
        assert!(!stale.resume(&saved, now() + Duration::hours(30), Duration::hours(24)));

        let mut other_list = session(5);
        assert!(!other_list.resume(&saved, now(), Duration::hours(24)));
        assert_eq!(other_list.store().active_order().len(), 5);
    }

    #[test]
    fn test_resume_clamps_out_of_range_index() {
        let s = session(3);
        let mut saved = s.to_session_data(now());
        saved.current_index = 9;
        saved.is_flipped = true;
        let mut resumed = session(3);
        assert!(resumed.resume(&saved, now(), Duration::hours(24)));
        assert_eq!(resumed.current_index(), 0);
        assert!(!resumed.is_flipped());
    }
}
