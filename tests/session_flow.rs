use chrono::{DateTime, Duration, TimeZone, Utc};

use tango::engine::card_store::{CardStore, OrderingMode};
use tango::engine::error::CoreError;
use tango::engine::{scheduler, scoring};
use tango::engine::stats::StudySummary;
use tango::session::{Action, Outcome, Session};
use tango::source::word_list::{parse_tsv, to_tsv};
use tango::store::json_store::JsonStore;
use tango::store::schema::StudyData;

const WORDS: &str = "\
# term\tmeaning\treading
犬\tdog\tいぬ
猫\tcat\tねこ
鳥\tbird\tとり
魚\tfish\tさかな
";

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

fn open(store: &JsonStore, now: DateTime<Utc>) -> Session {
    let mut cards = CardStore::load(parse_tsv(WORDS), now).unwrap();
    cards.merge_persisted(&store.load_study_data().to_snapshot());
    let mut session = Session::with_seed(cards, 2, 99);
    session.apply_ordering(OrderingMode::Sequential);
    if let Some(saved) = store.load_session() {
        session.resume(&saved, now, Duration::hours(24));
    }
    session
}

fn save(store: &JsonStore, session: &Session, now: DateTime<Utc>) {
    store
        .save_study_data(&StudyData::from_snapshot(session.store().snapshot()))
        .unwrap();
    store.save_session(&session.to_session_data(now)).unwrap();
}

#[test]
fn test_study_save_and_resume() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let now = start();

    let mut session = open(&store, now);
    assert_eq!(session.current().unwrap().card.term, "犬");

    session.advance(Action::Flip, now).unwrap();
    let outcome = session
        .advance(Action::Answer { correct: false }, now)
        .unwrap();
    assert!(matches!(outcome, Outcome::Answered { card_id: 0, first_study: true, .. }));
    // 犬 is not due for five minutes, the untouched cards tie and the lowest id wins
    assert_eq!(session.current().unwrap().card.term, "猫");
    session.advance(Action::Answer { correct: true }, now).unwrap();
    save(&store, &session, now);

    let later = now + Duration::hours(1);
    let resumed = open(&store, later);
    assert_eq!(resumed.current_index(), session.current_index());
    assert_eq!(resumed.new_words_seen(), 2);

    let summary = StudySummary::from_cards(resumed.store().cards());
    assert_eq!(summary.studied_words, 2);
    assert_eq!(summary.total_understood, 1);
    assert_eq!(summary.total_ng, 1);
    assert_eq!(summary.total_points, 0);
}

#[test]
fn test_weak_word_boost_changes_the_winner() {
    let now = start();
    // columns: term, meaning, reading, wrong, last studied, understood, ng, points
    let words = "犬\tdog\t\t3\t\t0\t3\t-3\n猫\tcat\t\t4\t\t0\t4\t-4\n";
    let mut cards = CardStore::load(parse_tsv(words), now).unwrap();
    assert_eq!(cards.toggle_favorite(1), Some(true));
    let active = cards.active_cards();

    // favorite 猫 scores -4 * 0.7 = -2.8, so 犬 at -3 comes first
    assert_eq!(scheduler::select_next(&active, 1, 2, now), Ok(0));
    // past the threshold both are halved: 猫 at -2.0 beats 犬 at -1.5
    assert_eq!(scheduler::select_next(&active, 2, 2, now), Ok(1));
}

#[test]
fn test_answer_on_card_at_counter_limit() {
    let now = start();
    let words = "犬\tdog\t\t0\t\t4294967295\t0\t0\n";
    let mut cards = CardStore::load(parse_tsv(words), now).unwrap();
    let card = cards.card_mut(0).unwrap();
    assert_eq!(card.total_points, i64::from(u32::MAX));

    scoring::record_answer(card, true, now);
    assert_eq!(card.understood_count, u32::MAX);
    assert_eq!(
        card.total_points,
        i64::from(card.understood_count) - i64::from(card.ng_count)
    );
}

#[test]
fn test_favorites_only_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let now = start();
    let mut session = open(&store, now);

    assert_eq!(
        session.advance(Action::ToggleFavoritesOnly, now),
        Err(CoreError::NoFavorites)
    );
    assert_eq!(session.toggle_current_favorite(), Some(true));
    assert_eq!(
        session.advance(Action::ToggleFavoritesOnly, now),
        Ok(Outcome::FavoritesOnly(true))
    );
    save(&store, &session, now);

    let resumed = open(&store, now + Duration::minutes(1));
    assert!(resumed.store().favorites_only());
    assert_eq!(resumed.store().active_order(), &[0]);
}

#[test]
fn test_tsv_export_keeps_counters() {
    let now = start();
    let cards = CardStore::load(parse_tsv(WORDS), now).unwrap();
    let mut session = Session::with_seed(cards, 10, 1);
    session.apply_ordering(OrderingMode::Sequential);
    session.advance(Action::Answer { correct: true }, now).unwrap();

    let tsv = to_tsv(session.store().cards());
    let reparsed = CardStore::load(parse_tsv(&tsv), now).unwrap();
    let dog = reparsed.card(0).unwrap();
    assert_eq!(dog.term, "犬");
    assert_eq!(dog.reading, "いぬ");
    assert_eq!(dog.understood_count, 1);
    assert_eq!(dog.total_points, 1);
    assert_eq!(dog.last_studied, Some(now));
}
