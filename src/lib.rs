// Scheduling core plus its adapters. The terminal UI lives in the binary
// (main.rs, app.rs, event.rs, ui/) and drives everything through this crate.

pub mod config;
pub mod engine;
pub mod logging;
pub mod session;
pub mod source;
pub mod store;
