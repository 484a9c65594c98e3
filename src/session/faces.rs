use crate::config::FrontMode;
use crate::engine::card::Card;

/// Text for both sides of a card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardFaces {
    pub front: String,
    pub back: String,
    /// Reading shown under the back; empty when there is nothing to add.
    pub back_hint: String,
}

impl CardFaces {
    pub fn new(card: &Card, mode: FrontMode) -> Self {
        match mode {
            FrontMode::Term => Self {
                front: card.term.clone(),
                back: card.meaning.clone(),
                back_hint: card.reading.clone(),
            },
            FrontMode::Meaning => {
                let front = if card.reading.is_empty() {
                    card.meaning.clone()
                } else {
                    format!("{} ({})", card.meaning, card.reading)
                };
                Self {
                    front,
                    back: card.term.clone(),
                    back_hint: String::new(),
                }
            }
        }
    }
}
