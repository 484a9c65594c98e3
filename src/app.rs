use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use tango::config::Config;
use tango::engine::card_store::{CardStore, OrderingMode};
use tango::engine::error::CoreError;
use tango::engine::stats::StatsPeriod;
use tango::session::faces::CardFaces;
use tango::session::{Action, CurrentCard, Outcome, Session};
use tango::source::{LoadedWords, WordSource, sample};
use tango::store::json_store::JsonStore;
use tango::store::schema::StudyData;

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Study,
    Stats,
    Settings,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Correct,
    Incorrect,
    Warning,
}

#[derive(Clone, Debug)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

pub const SETTINGS_FIELDS: usize = 4;

pub struct App {
    pub screen: AppScreen,
    pub session: Session,
    pub config: Config,
    pub theme: &'static Theme,
    pub store: Option<JsonStore>,
    pub source: WordSource,
    pub status: Option<StatusMessage>,
    pub should_quit: bool,
    pub settings_selected: usize,
    pub stats_period: StatsPeriod,
}

impl App {
    pub fn new(
        config: Config,
        loaded: LoadedWords,
        store: Option<JsonStore>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

        let LoadedWords {
            cards,
            source,
            warnings,
        } = loaded;
        let (mut card_store, source) = match CardStore::load(cards, now) {
            Ok(card_store) => (card_store, source),
            Err(CoreError::EmptyData) => {
                warn!(%source, "word list is empty, using built-in sample");
                (
                    CardStore::load(sample::sample_cards(), now)?,
                    WordSource::Sample,
                )
            }
            Err(err) => return Err(err.into()),
        };

        if let Some(ref s) = store {
            if s.check_interrupted_import() {
                warn!("removed backups left by an interrupted import");
            }
            let study = s.load_study_data();
            let reconciled = card_store.merge_persisted(&study.to_snapshot());
            if reconciled > 0 {
                info!(reconciled, "corrected points that disagreed with answer counts");
            }
        }

        let mut session = Session::new(card_store, config.new_words_threshold);
        session.apply_ordering(config.ordering);

        let resumed = match store.as_ref().and_then(|s| s.load_session()) {
            Some(saved) => session.resume(&saved, now, config.resume_window()),
            None => false,
        };

        let status = if let Some(last) = warnings.last() {
            StatusMessage {
                text: last.clone(),
                kind: StatusKind::Warning,
            }
        } else if resumed {
            StatusMessage {
                text: "Resumed previous session".to_string(),
                kind: StatusKind::Info,
            }
        } else {
            StatusMessage {
                text: format!("Loaded {} words from {source}", session.store().len()),
                kind: StatusKind::Info,
            }
        };
        info!(%source, words = session.store().len(), resumed, "study session ready");

        Ok(Self {
            screen: AppScreen::Study,
            session,
            config,
            theme,
            store,
            source,
            status: Some(status),
            should_quit: false,
            settings_selected: 0,
            stats_period: StatsPeriod::default(),
        })
    }

    pub fn current(&self) -> Option<CurrentCard<'_>> {
        self.session.current()
    }

    pub fn faces(&self) -> Option<CardFaces> {
        self.current()
            .map(|current| CardFaces::new(current.card, self.config.front))
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    pub fn flip(&mut self, now: DateTime<Utc>) {
        if self.session.advance(Action::Flip, now).is_ok() {
            self.save_data(now);
        }
    }

    pub fn answer(&mut self, correct: bool, now: DateTime<Utc>) {
        match self.session.advance(Action::Answer { correct }, now) {
            Ok(Outcome::Answered { next_review, .. }) => {
                let (label, kind) = if correct {
                    ("Correct", StatusKind::Correct)
                } else {
                    ("Wrong", StatusKind::Incorrect)
                };
                self.set_status(
                    format!("{label}, next review in {}", format_delay(next_review - now)),
                    kind,
                );
                self.save_data(now);
            }
            Ok(_) => {}
            Err(err) => self.set_status(err.to_string(), StatusKind::Warning),
        }
    }

    pub fn toggle_favorite(&mut self, now: DateTime<Utc>) {
        match self.session.toggle_current_favorite() {
            Some(true) => self.set_status("Added to favorites", StatusKind::Info),
            Some(false) => self.set_status("Removed from favorites", StatusKind::Info),
            None => return,
        }
        self.save_data(now);
    }

    pub fn toggle_favorites_only(&mut self, now: DateTime<Utc>) {
        match self.session.advance(Action::ToggleFavoritesOnly, now) {
            Ok(Outcome::FavoritesOnly(true)) => {
                self.set_status("Studying favorites only", StatusKind::Info)
            }
            Ok(_) => self.set_status("Studying all words", StatusKind::Info),
            Err(CoreError::NoFavorites) => {
                self.set_status("No favorite words yet, press * to add one", StatusKind::Warning);
                return;
            }
            Err(err) => {
                self.set_status(err.to_string(), StatusKind::Warning);
                return;
            }
        }
        self.save_data(now);
    }

    pub fn set_ordering(&mut self, mode: OrderingMode, now: DateTime<Utc>) {
        if self.session.advance(Action::Reorder(mode), now).is_ok() {
            self.config.ordering = mode;
            self.set_status(format!("Order: {mode}"), StatusKind::Info);
            self.save_data(now);
        }
    }

    pub fn toggle_ordering(&mut self, now: DateTime<Utc>) {
        let mode = self.session.store().ordering().toggled();
        self.set_ordering(mode, now);
    }

    pub fn toggle_front(&mut self) {
        self.config.front = self.config.front.toggled();
    }

    /// Persist study statistics and the session position. Failures are
    /// logged and surfaced in the status line; the session keeps running.
    pub fn save_data(&mut self, now: DateTime<Utc>) {
        let Some(ref store) = self.store else {
            return;
        };
        let study = StudyData::from_snapshot(self.session.store().snapshot());
        let session = self.session.to_session_data(now);
        let result = store
            .save_study_data(&study)
            .and_then(|_| store.save_session(&session));
        if let Err(err) = result {
            warn!(error = %format!("{err:#}"), "saving study data failed");
            self.set_status(format!("Could not save progress: {err}"), StatusKind::Warning);
        }
    }

    pub fn go_to_study(&mut self) {
        self.screen = AppScreen::Study;
    }

    pub fn go_to_stats(&mut self) {
        self.screen = AppScreen::Stats;
    }

    pub fn cycle_stats_period(&mut self) {
        self.stats_period = self.stats_period.next();
    }

    pub fn go_to_settings(&mut self) {
        self.settings_selected = 0;
        self.screen = AppScreen::Settings;
    }

    pub fn leave_settings(&mut self) {
        if let Err(err) = self.config.save() {
            warn!(error = %format!("{err:#}"), "saving config failed");
            self.set_status(format!("Could not save settings: {err}"), StatusKind::Warning);
        }
        self.go_to_study();
    }

    pub fn settings_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Order", self.config.ordering.to_string()),
            ("Card Front", self.config.front.as_str().to_string()),
            (
                "New Word Threshold",
                self.config.new_words_threshold.to_string(),
            ),
            ("Theme", self.config.theme.clone()),
        ]
    }

    pub fn settings_cycle_forward(&mut self, now: DateTime<Utc>) {
        self.settings_cycle(true, now);
    }

    pub fn settings_cycle_backward(&mut self, now: DateTime<Utc>) {
        self.settings_cycle(false, now);
    }

    fn settings_cycle(&mut self, forward: bool, now: DateTime<Utc>) {
        match self.settings_selected {
            0 => self.toggle_ordering(now),
            1 => self.toggle_front(),
            2 => {
                let threshold = if forward {
                    self.config.new_words_threshold.saturating_add(1)
                } else {
                    self.config.new_words_threshold.saturating_sub(1)
                };
                self.config.new_words_threshold = threshold.clamp(1, 1000);
                self.session
                    .set_new_words_threshold(self.config.new_words_threshold);
            }
            3 => {
                let themes = Theme::available_themes();
                if themes.is_empty() {
                    return;
                }
                let idx = themes
                    .iter()
                    .position(|t| *t == self.config.theme)
                    .unwrap_or(0);
                let next = if forward {
                    (idx + 1) % themes.len()
                } else if idx == 0 {
                    themes.len() - 1
                } else {
                    idx - 1
                };
                self.config.theme = themes[next].clone();
                if let Some(theme) = Theme::load(&self.config.theme) {
                    self.theme = Box::leak(Box::new(theme));
                }
            }
            _ => {}
        }
    }
}

pub fn format_delay(delay: Duration) -> String {
    if delay.num_days() >= 1 {
        format!("{}d", delay.num_days())
    } else if delay.num_hours() >= 1 {
        format!("{}h", delay.num_hours())
    } else {
        format!("{}m", delay.num_minutes().max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tango::engine::card::RawCard;

    fn loaded(n: usize) -> LoadedWords {
        LoadedWords {
            cards: (0..n)
                .map(|i| RawCard::new(&format!("t{i}"), &format!("m{i}"), ""))
                .collect(),
            source: WordSource::Sample,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_empty_word_list_falls_back_to_sample() {
        let app = App::new(Config::default(), loaded(0), None, Utc::now()).unwrap();
        assert_eq!(app.source, WordSource::Sample);
        assert_eq!(app.session.store().len(), 5);
    }

    #[test]
    fn test_answers_persist_and_resume() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc::now();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut app = App::new(Config::default(), loaded(3), Some(store), now).unwrap();
        app.answer(true, now);
        app.toggle_favorite(now);

        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let again = App::new(Config::default(), loaded(3), Some(store), now).unwrap();
        let answered: u32 = again
            .session
            .store()
            .cards()
            .iter()
            .map(|c| c.understood_count)
            .sum();
        assert_eq!(answered, 1);
        assert_eq!(again.session.store().favorite_ids().len(), 1);
        assert_eq!(
            again.session.store().active_order(),
            app.session.store().active_order()
        );
    }

    #[test]
    fn test_favorites_only_without_favorites_warns() {
        let mut app = App::new(Config::default(), loaded(2), None, Utc::now()).unwrap();
        app.toggle_favorites_only(Utc::now());
        assert!(!app.session.store().favorites_only());
        assert_eq!(app.status.as_ref().map(|s| s.kind), Some(StatusKind::Warning));
    }

    #[test]
    fn test_stats_period_cycles() {
        let mut app = App::new(Config::default(), loaded(2), None, Utc::now()).unwrap();
        assert_eq!(app.stats_period, StatsPeriod::Week);
        app.cycle_stats_period();
        assert_eq!(app.stats_period, StatsPeriod::Month);
        app.cycle_stats_period();
        app.cycle_stats_period();
        assert_eq!(app.stats_period, StatsPeriod::Week);
    }

    #[test]
    fn test_format_delay() {
        assert_eq!(format_delay(Duration::minutes(5)), "5m");
        assert_eq!(format_delay(Duration::hours(1)), "1h");
        assert_eq!(format_delay(Duration::days(3)), "3d");
    }
}
