use chrono::{DateTime, Utc};

use crate::engine::card::Card;
use crate::engine::scheduler;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// This was the card's first recorded answer.
    pub first_study: bool,
    pub next_review: DateTime<Utc>,
}

/// Apply one answer to `card` and reschedule it.
pub fn record_answer(card: &mut Card, is_correct: bool, now: DateTime<Utc>) -> AnswerOutcome {
    let first_study = card.is_new();
    card.last_studied = Some(now);

    // Counters saturate; a sheet can hand us values at the u32 limit.
    if is_correct {
        card.understood_count = card.understood_count.saturating_add(1);
        card.consecutive_understood = card.consecutive_understood.saturating_add(1);
    } else {
        card.ng_count = card.ng_count.saturating_add(1);
        card.wrong_count = card.wrong_count.saturating_add(1);
        card.consecutive_understood = 0;
    }
    card.total_points = i64::from(card.understood_count) - i64::from(card.ng_count);

    let next_review = scheduler::compute_next_review(card, now);
    AnswerOutcome {
        first_study,
        next_review,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::card::RawCard;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 20, 8, 0, 0).unwrap()
    }

    fn fresh() -> Card {
        Card::from_raw(0, RawCard::new("本", "book", "ほん"), now())
    }

    #[test]
    fn test_correct_answer_updates_counters() {
        let mut card = fresh();
        let outcome = record_answer(&mut card, true, now());
        assert_eq!(card.understood_count, 1);
        assert_eq!(card.total_points, 1);
        assert_eq!(card.consecutive_understood, 1);
        assert_eq!(card.last_studied, Some(now()));
        assert!(outcome.first_study);
        assert_eq!(outcome.next_review, now() + Duration::days(1));
    }

    #[test]
    fn test_incorrect_answer_resets_streak() {
        let mut card = fresh();
        record_answer(&mut card, true, now());
        let outcome = record_answer(&mut card, false, now());
        assert_eq!(card.ng_count, 1);
        assert_eq!(card.wrong_count, 1);
        assert_eq!(card.consecutive_understood, 0);
        assert_eq!(card.total_points, 0);
        assert!(!outcome.first_study);
        assert_eq!(card.next_review, now() + Duration::hours(1));
    }

    #[test]
    fn test_points_track_counts() {
        let mut card = fresh();
        let pattern = [true, false, false, true, true, false, true, true, true];
        for (i, &correct) in pattern.iter().enumerate() {
            record_answer(&mut card, correct, now() + Duration::minutes(i as i64));
            assert_eq!(
                card.total_points,
                i64::from(card.understood_count) - i64::from(card.ng_count)
            );
        }
    }

    #[test]
    fn test_two_correct_in_a_row_waits_three_days() {
        let mut card = fresh();
        card.ng_count = 5;
        card.total_points = -5;
        record_answer(&mut card, true, now());
        let second = now() + Duration::minutes(5);
        record_answer(&mut card, true, second);
        assert_eq!(card.total_points, -3);
        assert!(card.next_review >= second + Duration::days(3));
    }

    #[test]
    fn test_negative_points_review_in_five_minutes() {
        let mut card = fresh();
        record_answer(&mut card, false, now());
        assert_eq!(card.total_points, -1);
        assert_eq!(card.next_review, now() + Duration::minutes(5));
    }

    #[test]
    fn test_card_with_imported_counts_is_not_first_study() {
        let mut card = fresh();
        card.understood_count = 1;
        card.total_points = 1;
        let outcome = record_answer(&mut card, true, now());
        assert!(!outcome.first_study);
    }

    #[test]
    fn test_counters_saturate_at_u32_max() {
        let raw = RawCard {
            understood_count: Some(u32::MAX),
            ..RawCard::new("犬", "dog", "")
        };
        let mut card = Card::from_raw(0, raw, now());
        record_answer(&mut card, true, now());
        assert_eq!(card.understood_count, u32::MAX);
        assert_eq!(card.total_points, i64::from(u32::MAX));

        record_answer(&mut card, false, now());
        assert_eq!(card.ng_count, 1);
        assert_eq!(card.total_points, i64::from(u32::MAX) - 1);

        card.ng_count = u32::MAX;
        card.wrong_count = u32::MAX;
        record_answer(&mut card, false, now());
        assert_eq!(card.ng_count, u32::MAX);
        assert_eq!(card.wrong_count, u32::MAX);
        assert_eq!(card.total_points, 0);
    }
}
