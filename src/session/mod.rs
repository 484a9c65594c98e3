pub mod faces;
pub mod state;

pub use state::{Action, CurrentCard, Outcome, Session};
