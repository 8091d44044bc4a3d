//! Alphabet-aware word storage, grouped by length for the propagator's lookups.
//!
//! Loading drops anything that isn't alphabet-only, non-empty, and (optionally)
//! short enough, case-folds the rest, and groups words by length in load order.
//! The hot-path query, [`Dictionary::matching_words`], is backed by
//! per-length/per-position/per-letter posting lists rather than a regex — this
//! is the final design, not a placeholder.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::types::{Alphabet, MAX_ALPHABET_SIZE};

/// A single dictionary entry, retained both as text (for `allWords`-style output)
/// and as a glyph vector (for the per-position lookups the propagator needs).
#[derive(Debug, Clone)]
pub struct DictWord {
    pub text: String,
    pub letters: Vec<char>,
}

/// A set of admissible letters for one position of a word extent. Mirrors a
/// cell's admissible-letter set, so `Crossword::update_word_options` can build
/// one of these straight from `Cell::admissible_letters`.
pub type LetterClass = SmallVec<[char; MAX_ALPHABET_SIZE]>;

/// Posting lists for a single word length: for each position, a map from letter
/// to the (ascending) indices of words in that length bucket containing that
/// letter at that position.
#[derive(Debug, Default)]
struct PostingsForLength {
    by_position: Vec<HashMap<char, Vec<u32>>>,
}

/// A dictionary of words, case-folded and filtered against an [`Alphabet`],
/// indexed by length for the propagator's pattern queries.
#[derive(Debug)]
pub struct Dictionary {
    alphabet: Alphabet,
    words_by_len: HashMap<usize, Vec<DictWord>>,
    postings_by_len: HashMap<usize, PostingsForLength>,
}

impl Dictionary {
    /// Build a dictionary from a raw word source. Each candidate is
    /// case-folded, then retained iff it's non-empty, alphabet-only, and (if
    /// `max_length` is given) no longer than it. Insertion order is preserved
    /// within each length bucket.
    #[must_use]
    pub fn new<I, S>(words: I, alphabet: Alphabet, max_length: Option<usize>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words_by_len: HashMap<usize, Vec<DictWord>> = HashMap::new();

        for raw in words {
            let lowered = raw.as_ref().to_lowercase();
            if lowered.is_empty() {
                continue;
            }
            let letters: Vec<char> = lowered.chars().collect();
            if let Some(max_length) = max_length {
                if letters.len() > max_length {
                    continue;
                }
            }
            if !letters.iter().all(|&c| alphabet.contains(c)) {
                continue;
            }
            words_by_len
                .entry(letters.len())
                .or_default()
                .push(DictWord {
                    text: lowered,
                    letters,
                });
        }

        let postings_by_len = words_by_len
            .iter()
            .map(|(&len, words)| (len, build_postings(len, words)))
            .collect();

        Dictionary {
            alphabet,
            words_by_len,
            postings_by_len,
        }
    }

    #[must_use]
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// All words of a given length, in load order. Empty for lengths the
    /// dictionary has no entries for — unknown lengths are not an error.
    #[must_use]
    pub fn words_of_length(&self, len: usize) -> &[DictWord] {
        self.words_by_len
            .get(&len)
            .map_or(&[], |words| words.as_slice())
    }

    /// Every word of the given length whose letter at each position lies in
    /// the corresponding class. Returned in insertion order. An unknown
    /// length yields an empty result, not an error.
    #[must_use]
    pub fn matching_words(&self, len: usize, classes: &[LetterClass]) -> Vec<&DictWord> {
        debug_assert_eq!(classes.len(), len);

        let Some(words) = self.words_by_len.get(&len) else {
            return Vec::new();
        };
        let Some(postings) = self.postings_by_len.get(&len) else {
            return Vec::new();
        };
        if len == 0 {
            return words.iter().collect();
        }

        // Candidate id sets per position, smallest-first so the intersection
        // below discards as much as possible as early as possible.
        let mut per_position: Vec<Vec<u32>> = classes
            .iter()
            .enumerate()
            .map(|(position, class)| {
                let mut ids: Vec<u32> = class
                    .iter()
                    .filter_map(|letter| postings.by_position[position].get(letter))
                    .flatten()
                    .copied()
                    .collect();
                ids.sort_unstable();
                ids.dedup();
                ids
            })
            .collect();
        per_position.sort_by_key(Vec::len);

        let mut surviving = per_position[0].clone();
        for ids in &per_position[1..] {
            if surviving.is_empty() {
                break;
            }
            surviving.retain(|id| ids.binary_search(id).is_ok());
        }

        if surviving.is_empty() {
            return Vec::new();
        }
        surviving.sort_unstable();

        words
            .iter()
            .enumerate()
            .filter(|(index, _)| surviving.binary_search(&(*index as u32)).is_ok())
            .map(|(_, word)| word)
            .collect()
    }
}

fn build_postings(len: usize, words: &[DictWord]) -> PostingsForLength {
    let mut by_position: Vec<HashMap<char, Vec<u32>>> = vec![HashMap::new(); len];
    for (index, word) in words.iter().enumerate() {
        for (position, &letter) in word.letters.iter().enumerate() {
            by_position[position]
                .entry(letter)
                .or_default()
                .push(index as u32);
        }
    }
    PostingsForLength { by_position }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_non_alphabet_and_overlong_words() {
        let dict = Dictionary::new(
            vec!["cat", "car", "c4t", "caterpillar", "ALSO"],
            Alphabet::english(),
            Some(5),
        );
        let words: Vec<&str> = dict.words_of_length(3).iter().map(|w| w.text.as_str()).collect();
        assert_eq!(words, vec!["cat", "car"]);
        assert_eq!(dict.words_of_length(11).len(), 0, "caterpillar is too long");
        assert_eq!(dict.words_of_length(4).len(), 1, "ALSO case-folds to also");
    }

    #[test]
    fn unknown_length_is_empty_not_an_error() {
        let dict = Dictionary::new(vec!["cat"], Alphabet::english(), None);
        assert!(dict.words_of_length(12).is_empty());
        assert!(dict.matching_words(12, &[]).is_empty());
    }

    #[test]
    fn matching_words_respects_per_position_classes_and_order() {
        let dict = Dictionary::new(vec!["cat", "car", "cot", "cab"], Alphabet::english(), None);
        let classes: Vec<LetterClass> = vec![
            SmallVec::from_slice(&['c']),
            SmallVec::from_slice(&['a', 'o']),
            SmallVec::from_slice(&['t', 'r']),
        ];
        let matches: Vec<&str> = dict
            .matching_words(3, &classes)
            .into_iter()
            .map(|w| w.text.as_str())
            .collect();
        assert_eq!(matches, vec!["cat", "car", "cot"]);
    }
}
