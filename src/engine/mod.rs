pub mod card;
pub mod card_store;
pub mod error;
pub mod scheduler;
pub mod scoring;
pub mod stats;

pub use card::{Card, CardId, CardStats, RawCard};
pub use card_store::{CardStore, OrderingMode, StudySnapshot};
pub use error::CoreError;
