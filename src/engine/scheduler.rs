use chrono::{DateTime, Duration, Utc};

use crate::engine::card::Card;
use crate::engine::error::CoreError;

/// Consecutive correct answers that trigger the mastery delay.
pub const MASTERY_STREAK: i64 = 2;
pub const MASTERY_DELAY_DAYS: i64 = 3;
pub const STRUGGLING_DELAY_MINUTES: i64 = 5;
pub const NEUTRAL_DELAY_HOURS: i64 = 1;
pub const MAX_DELAY_DAYS: i64 = 7;

pub const FAVORITE_MULTIPLIER: f64 = 0.7;
pub const WEAK_WORD_MULTIPLIER: f64 = 0.5;
pub const DEFAULT_NEW_WORDS_THRESHOLD: u32 = 10;

/// Delay until the card is due again, from its current statistics.
pub fn review_delay(card: &Card) -> Duration {
    if card.consecutive_understood >= MASTERY_STREAK {
        Duration::days(MASTERY_DELAY_DAYS)
    } else if card.total_points < 0 {
        Duration::minutes(STRUGGLING_DELAY_MINUTES)
    } else if card.total_points == 0 {
        Duration::hours(NEUTRAL_DELAY_HOURS)
    } else {
        Duration::days(card.total_points.min(MAX_DELAY_DAYS))
    }
}

/// Set `next_review` from the card's statistics and return it.
pub fn compute_next_review(card: &mut Card, now: DateTime<Utc>) -> DateTime<Utc> {
    card.next_review = now + review_delay(card);
    card.next_review
}

/// Weighted selection score. Lower is shown sooner.
///
/// The favorite multiplier scales the raw points toward zero, which pulls
/// positive-scoring favorites ahead but pushes negative-scoring favorites
/// behind an equally weak non-favorite.
pub fn priority(card: &Card, new_words_seen: u32, new_words_threshold: u32) -> f64 {
    let points = card.total_points as f64;
    if new_words_seen >= new_words_threshold && card.total_points < 0 {
        return points * WEAK_WORD_MULTIPLIER;
    }
    if card.is_favorite {
        points * FAVORITE_MULTIPLIER
    } else {
        points
    }
}

/// Pick the position in `active` of the next card to show.
///
/// Due cards are preferred; when none are due every card is a candidate so
/// the caller always gets something to display. Ties fall back to the
/// earliest `next_review`, then the lowest id.
pub fn select_next(
    active: &[&Card],
    new_words_seen: u32,
    new_words_threshold: u32,
    now: DateTime<Utc>,
) -> Result<usize, CoreError> {
    if active.is_empty() {
        return Err(CoreError::EmptyPool);
    }
    let any_due = active.iter().any(|card| card.is_due(now));

    active
        .iter()
        .enumerate()
        .filter(|(_, card)| !any_due || card.is_due(now))
        .map(|(idx, card)| (idx, card, priority(card, new_words_seen, new_words_threshold)))
        .min_by(|(_, a, pa), (_, b, pb)| {
            pa.total_cmp(pb)
                .then_with(|| a.next_review.cmp(&b.next_review))
                .then_with(|| a.id.cmp(&b.id))
        })
        .map(|(idx, _, _)| idx)
        .ok_or(CoreError::EmptyPool)
}
