use thiserror::Error;

/// Failures reported by the card store, scheduler and session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The word list produced no cards. Callers fall back to the sample set.
    #[error("word list contains no cards")]
    EmptyData,
    /// Favorites-only view requested with nothing favorited. Recoverable.
    #[error("no favorite words found, add some words to favorites first")]
    NoFavorites,
    #[error("cannot select a card from an empty list")]
    EmptyPool,
}
