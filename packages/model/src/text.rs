//! Plain-text projection of the block sequence.
//!
//! Only blocks that carry prose contribute: text, hero titles, FAQ pairs,
//! highlight/tip items and call-to-action text. Everything derived here is
//! recomputed from the blocks on demand.

use crate::block::{Block, BlockData};

const WORDS_PER_MINUTE: usize = 200;

/// Prose carried by a single block, if any
pub fn block_text(block: &Block) -> Option<String> {
    let text = match &block.data {
        BlockData::Text(data) => data.contents.clone(),
        BlockData::Hero(data) => data.title.clone(),
        BlockData::Faq(data) => format!("{} {}", data.question, data.answer),
        BlockData::Highlights(data) => data.items.join(" "),
        BlockData::Tips(data) => data.items.join(" "),
        BlockData::Cta(data) => data.text.clone(),
        _ => return None,
    };

    Some(text)
}

/// All block prose joined with single spaces
pub fn content_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .filter_map(block_text)
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whitespace-separated word count over all block prose
pub fn word_count(blocks: &[Block]) -> usize {
    blocks
        .iter()
        .filter_map(block_text)
        .map(|text| text.split_whitespace().count())
        .sum()
}

/// Estimated reading time, rounded up to whole minutes
pub fn reading_time_minutes(words: usize) -> usize {
    words.div_ceil(WORDS_PER_MINUTE)
}
