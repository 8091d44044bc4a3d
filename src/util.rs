//! Small shared helpers used by the propagator.

use std::collections::HashMap;

use crate::dictionary::DictWord;

/// Per-position letter frequency counts over a set of matching words:
/// `freq[i][letter]` is how many of the matching words have `letter` at
/// position `i`.
pub type PositionFrequencies = Vec<HashMap<char, u32>>;

/// Accumulate per-position letter frequencies over the given matching words.
#[must_use]
pub fn build_position_frequencies(length: usize, matching_words: &[&DictWord]) -> PositionFrequencies {
    let mut frequencies: PositionFrequencies = vec![HashMap::new(); length];
    for word in matching_words {
        for (position, &letter) in word.letters.iter().enumerate() {
            *frequencies[position].entry(letter).or_insert(0) += 1;
        }
    }
    frequencies
}
