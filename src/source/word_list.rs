use chrono::{DateTime, NaiveDate, Utc};
use icu_normalizer::ComposingNormalizerBorrowed;

use crate::engine::card::{Card, RawCard};

/// Readings that spreadsheet exports leave behind when a formula hasn't
/// resolved. They are treated as missing.
const PLACEHOLDER_READINGS: &[&str] = &["Loading...", "#N/A"];

/// Parse a tab-separated word list.
///
/// Columns: term, meaning, reading, wrong count, last studied, understood
/// count, NG count, total points. Only the first two are required. Blank
/// lines and lines starting with `#` are skipped, as are rows missing a term
/// or meaning. Malformed numbers and dates are treated as absent.
pub fn parse_tsv(text: &str) -> Vec<RawCard> {
    let nfc = ComposingNormalizerBorrowed::new_nfc();
    text.lines()
        .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .filter_map(|line| {
            let cols: Vec<String> = line
                .split('\t')
                .map(|col| nfc.normalize(col.trim()).into_owned())
                .collect();
            let col = |i: usize| cols.get(i).map(String::as_str).unwrap_or("");

            let term = col(0);
            let meaning = col(1);
            if term.is_empty() || meaning.is_empty() {
                return None;
            }
            let reading = col(2);
            let reading = if PLACEHOLDER_READINGS.contains(&reading) {
                ""
            } else {
                reading
            };

            Some(RawCard {
                term: term.to_string(),
                meaning: meaning.to_string(),
                reading: reading.to_string(),
                wrong_count: col(3).parse().ok(),
                last_studied: parse_timestamp(col(4)),
                understood_count: col(5).parse().ok(),
                ng_count: col(6).parse().ok(),
                total_points: col(7).parse().ok(),
            })
        })
        .collect()
}

/// RFC 3339, or a bare `YYYY-MM-DD` taken as midnight UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Render cards back into the column layout `parse_tsv` reads.
pub fn to_tsv<'a>(cards: impl IntoIterator<Item = &'a Card>) -> String {
    let mut out = String::from("# term\tmeaning\treading\twrong\tlast_studied\tunderstood\tng\tpoints\n");
    for card in cards {
        let last = card
            .last_studied
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            card.term,
            card.meaning,
            card.reading,
            card.wrong_count,
            last,
            card.understood_count,
            card.ng_count,
            card.total_points
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_minimal_rows() {
        let cards = parse_tsv("犬\tdog\n猫\tcat\tねこ\n");
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].term, "犬");
        assert_eq!(cards[0].reading, "");
        assert_eq!(cards[1].reading, "ねこ");
        assert_eq!(cards[1].total_points, None);
    }

    #[test]
    fn test_skips_comments_blank_and_incomplete_rows() {
        let text = "# header\n\n山\tmountain\n\tno term\n川\t\n  \n空\tsky\n";
        let terms: Vec<String> = parse_tsv(text).into_iter().map(|c| c.term).collect();
        assert_eq!(terms, vec!["山", "空"]);
    }

    #[test]
    fn test_parses_stat_columns() {
        let text = "雨\train\tあめ\t2\t2025-03-04\t5\t2\t3\n";
        let card = &parse_tsv(text)[0];
        assert_eq!(card.wrong_count, Some(2));
        assert_eq!(
            card.last_studied,
            Some(Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap())
        );
        assert_eq!(card.understood_count, Some(5));
        assert_eq!(card.ng_count, Some(2));
        assert_eq!(card.total_points, Some(3));
    }

    #[test]
    fn test_malformed_stats_are_absent() {
        let card = &parse_tsv("雪\tsnow\t\tmany\tyesterday\t-1\tx\t1.5\n")[0];
        assert_eq!(card.wrong_count, None);
        assert_eq!(card.last_studied, None);
        assert_eq!(card.understood_count, None);
        assert_eq!(card.ng_count, None);
        assert_eq!(card.total_points, None);
    }

    #[test]
    fn test_placeholder_reading_is_dropped() {
        let cards = parse_tsv("月\tmoon\t#N/A\n星\tstar\tLoading...\n");
        assert!(cards.iter().all(|c| c.reading.is_empty()));
    }

    #[test]
    fn test_text_is_nfc_normalized() {
        // "か" + combining dakuten composes to "が"
        let cards = parse_tsv("\u{304B}\u{3099}\tmoth\n");
        assert_eq!(cards[0].term, "\u{304C}");
    }

    #[test]
    fn test_rfc3339_timestamp() {
        assert_eq!(
            parse_timestamp("2025-01-02T03:04:05+09:00"),
            Some(Utc.with_ymd_and_hms(2025, 1, 1, 18, 4, 5).unwrap())
        );
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_to_tsv_reparses() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let mut card = Card::from_raw(0, RawCard::new("花", "flower", "はな"), now);
        card.understood_count = 1;
        card.total_points = 1;
        card.last_studied = Some(now);
        let parsed = parse_tsv(&to_tsv([&card]));
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].term, "花");
        assert_eq!(parsed[0].last_studied, Some(now));
        assert_eq!(parsed[0].total_points, Some(1));
    }
}
