use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};

use crate::engine::card::Card;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StudySummary {
    pub total_words: usize,
    pub studied_words: usize,
    pub total_understood: u64,
    pub total_ng: u64,
    pub total_points: i64,
}

impl StudySummary {
    pub fn from_cards<'a>(cards: impl IntoIterator<Item = &'a Card>) -> Self {
        let mut summary = Self::default();
        for card in cards {
            summary.total_words += 1;
            if card.has_answers() {
                summary.studied_words += 1;
            }
            summary.total_understood += u64::from(card.understood_count);
            summary.total_ng += u64::from(card.ng_count);
            summary.total_points += card.total_points;
        }
        summary
    }

    /// Percentage of answers that were correct, rounded. 0 with no answers.
    pub fn success_rate(&self) -> u32 {
        let answered = self.total_understood + self.total_ng;
        if answered == 0 {
            return 0;
        }
        ((self.total_understood as f64 / answered as f64) * 100.0).round() as u32
    }
}

/// Share of cards with a `last_studied` timestamp.
pub fn progress(cards: &[&Card]) -> f64 {
    if cards.is_empty() {
        return 0.0;
    }
    let studied = cards.iter().filter(|c| c.last_studied.is_some()).count();
    studied as f64 / cards.len() as f64
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayPerformance {
    pub date: NaiveDate,
    /// Cards whose most recent answer fell on this day.
    pub total: usize,
    /// Of those, cards answered correctly at least once.
    pub understood: usize,
}

impl DayPerformance {
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            ((self.understood as f64 / self.total as f64) * 100.0).round() as u32
        }
    }
}

/// One entry per UTC day, oldest first, ending at `today`.
///
/// Only the latest study time per card is known, so each card counts toward
/// a single day.
pub fn daily_performance(cards: &[Card], days: u32, today: NaiveDate) -> Vec<DayPerformance> {
    (0..days)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(i64::from(offset));
            let studied: Vec<&Card> = cards
                .iter()
                .filter(|c| c.last_studied.is_some_and(|t| t.date_naive() == date))
                .collect();
            DayPerformance {
                date,
                total: studied.len(),
                understood: studied.iter().filter(|c| c.understood_count > 0).count(),
            }
        })
        .collect()
}

/// Window for the performance table, matching the week/month/3-month views.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatsPeriod {
    #[default]
    Week,
    Month,
    ThreeMonths,
}

impl StatsPeriod {
    pub fn days(self) -> u32 {
        match self {
            StatsPeriod::Week => 7,
            StatsPeriod::Month => 30,
            StatsPeriod::ThreeMonths => 90,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatsPeriod::Week => "week",
            StatsPeriod::Month => "month",
            StatsPeriod::ThreeMonths => "3months",
        }
    }

    pub fn next(self) -> Self {
        match self {
            StatsPeriod::Week => StatsPeriod::Month,
            StatsPeriod::Month => StatsPeriod::ThreeMonths,
            StatsPeriod::ThreeMonths => StatsPeriod::Week,
        }
    }
}

impl fmt::Display for StatsPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatsPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" | "7" => Ok(StatsPeriod::Week),
            "month" | "30" => Ok(StatsPeriod::Month),
            "3months" | "90" => Ok(StatsPeriod::ThreeMonths),
            other => Err(format!(
                "unknown period '{other}' (expected week, month or 3months)"
            )),
        }
    }
}

pub fn period_performance(
    cards: &[Card],
    period: StatsPeriod,
    today: NaiveDate,
) -> Vec<DayPerformance> {
    daily_performance(cards, period.days(), today)
}

/// Cards with at least one counted answer, in word list order.
pub fn studied_cards(cards: &[Card]) -> Vec<&Card> {
    cards.iter().filter(|c| c.has_answers()).collect()
}
