use rust_embed::Embed;

use crate::engine::card::RawCard;
use crate::source::word_list;

#[derive(Embed)]
#[folder = "assets/words/"]
struct WordAssets;

const SAMPLE_FILE: &str = "sample.tsv";

/// The bundled five-word list.
pub fn sample_cards() -> Vec<RawCard> {
    WordAssets::get(SAMPLE_FILE)
        .and_then(|file| {
            std::str::from_utf8(file.data.as_ref())
                .ok()
                .map(word_list::parse_tsv)
        })
        .unwrap_or_default()
}
