pub mod card_view;
pub mod progress_bar;
pub mod stats_panel;
