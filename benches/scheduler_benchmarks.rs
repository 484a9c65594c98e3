use chrono::{Duration, TimeZone, Utc};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use tango::engine::card::RawCard;
use tango::engine::card_store::{CardStore, OrderingMode};
use tango::engine::scheduler;
use tango::engine::scoring;

fn make_store(count: usize) -> CardStore {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let raw = (0..count)
        .map(|i| RawCard::new(&format!("term{i}"), &format!("meaning{i}"), ""))
        .collect();
    let mut store = CardStore::load(raw, now).unwrap();
    // a mix of due, struggling and mastered cards
    for id in 0..count as u32 {
        let card = store.card_mut(id).unwrap();
        match id % 4 {
            0 => {}
            1 => {
                scoring::record_answer(card, false, now - Duration::hours(1));
            }
            2 => {
                scoring::record_answer(card, true, now);
                scoring::record_answer(card, true, now);
            }
            _ => {
                scoring::record_answer(card, true, now - Duration::days(3));
            }
        }
        card.is_favorite = id % 10 == 0;
    }
    let mut rng = SmallRng::seed_from_u64(7);
    store.apply_ordering(OrderingMode::Shuffled, &mut rng);
    store
}

fn bench_select_next(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
    for count in [100, 2_000] {
        let store = make_store(count);
        let active = store.active_cards();
        c.bench_function(&format!("select_next ({count} cards)"), |b| {
            b.iter(|| scheduler::select_next(black_box(&active), 12, 10, now))
        });
    }
}

fn bench_shuffle(c: &mut Criterion) {
    let mut store = make_store(2_000);
    let mut rng = SmallRng::seed_from_u64(11);
    c.bench_function("apply_ordering shuffled (2000 cards)", |b| {
        b.iter(|| store.apply_ordering(black_box(OrderingMode::Shuffled), &mut rng))
    });
}

criterion_group!(benches, bench_select_next, bench_shuffle);
criterion_main!(benches);
