//! A single grid position and its weighted set of admissible letters.

use rand::Rng;
use smallvec::SmallVec;

use crate::dictionary::LetterClass;
use crate::types::{Alphabet, Coordinate, BLOCK_LETTER, MAX_ALPHABET_SIZE};

/// Weight given to every letter on [`Cell::reset`] — a large positive sentinel so
/// that a freshly reset cell's entropy is well-defined and every letter starts
/// equally likely.
const INITIAL_WEIGHT: u32 = 9999;

/// A cell's weighted options, stored as a flat `(letter, weight)` vector rather
/// than a map. Keeps cloning a crossword snapshot during search descent a
/// plain memory copy, with no hashing or heap traffic for the common
/// alphabet sizes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    coords: Coordinate,
    options: SmallVec<[(char, u32); MAX_ALPHABET_SIZE]>,
    blacklist: Vec<char>,
    mask: bool,
}

impl Cell {
    /// A fresh cell at `coords` with every alphabet letter (plus the block
    /// letter) admissible at the initial sentinel weight.
    #[must_use]
    pub fn new(coords: Coordinate, alphabet: &Alphabet) -> Self {
        let mut cell = Cell {
            coords,
            options: SmallVec::new(),
            blacklist: Vec::new(),
            mask: false,
        };
        cell.reset(alphabet);
        cell
    }

    #[must_use]
    pub fn coords(&self) -> Coordinate {
        self.coords
    }

    #[must_use]
    pub fn mask(&self) -> bool {
        self.mask
    }

    pub fn set_mask(&mut self, mask: bool) {
        self.mask = mask;
    }

    #[must_use]
    pub fn blacklist(&self) -> &[char] {
        &self.blacklist
    }

    /// Clear mask, empty the blacklist, and restore every *alphabet* letter to
    /// [`INITIAL_WEIGHT`]. The block letter is never part of a reset cell's
    /// options — it's only ever installed explicitly via [`Cell::set_letter`].
    pub fn reset(&mut self, alphabet: &Alphabet) {
        self.mask = false;
        self.blacklist.clear();
        self.options.clear();
        for letter in alphabet.iter() {
            self.options.push((letter, INITIAL_WEIGHT));
        }
    }

    fn index_of(&self, letter: char) -> Option<usize> {
        self.options.iter().position(|&(l, _)| l == letter)
    }

    #[must_use]
    pub fn weight_of(&self, letter: char) -> u32 {
        self.index_of(letter).map_or(0, |i| self.options[i].1)
    }

    /// Every letter currently in `options`, admissible or not.
    pub fn all_letters(&self) -> impl Iterator<Item = char> + '_ {
        self.options.iter().map(|&(l, _)| l)
    }

    /// Letters with strictly positive weight.
    pub fn admissible_letters(&self) -> impl Iterator<Item = char> + '_ {
        self.options
            .iter()
            .filter(|&&(_, w)| w > 0)
            .map(|&(l, _)| l)
    }

    #[must_use]
    pub fn admissible_letter_class(&self) -> LetterClass {
        self.admissible_letters().collect()
    }

    #[must_use]
    pub fn admissible_count(&self) -> usize {
        self.options.iter().filter(|&&(_, w)| w > 0).count()
    }

    #[must_use]
    pub fn total_weight(&self) -> u64 {
        self.options.iter().map(|&(_, w)| u64::from(w)).sum()
    }

    /// Sets `options := {letter -> 1}`, discarding every other option. Ignores
    /// `mask` — this is how a user-fixed letter gets installed *before* `mask`
    /// is set.
    pub fn set_letter(&mut self, letter: char) {
        self.options.clear();
        self.options.push((letter, 1));
    }

    /// Sets the weight of a single letter, a no-op while `mask` is true. A
    /// weight of 0 keeps the key present rather than removing it, so a
    /// previously-admissible letter stays visible to anything iterating
    /// [`Cell::all_letters`] even after it's ruled out.
    pub fn set_letter_count(&mut self, letter: char, count: u32) {
        if self.mask {
            return;
        }
        match self.index_of(letter) {
            Some(i) => self.options[i].1 = count,
            None => self.options.push((letter, count)),
        }
    }

    /// Append `letter` to the blacklist if it isn't already present.
    pub fn add_to_blacklist(&mut self, letter: char) {
        if !self.blacklist.contains(&letter) {
            self.blacklist.push(letter);
        }
    }

    /// Shannon entropy in nats, over admissible letters only. A cell with one
    /// admissible letter returns 0 by convention.
    #[must_use]
    pub fn shannon_entropy(&self) -> f64 {
        let total: f64 = self
            .options
            .iter()
            .filter(|&&(_, w)| w > 0)
            .map(|&(_, w)| f64::from(w))
            .sum();
        if total <= 0.0 {
            return 0.0;
        }
        let mut entropy = 0.0;
        for &(_, weight) in &self.options {
            if weight == 0 {
                continue;
            }
            let p = f64::from(weight) / total;
            entropy -= p * p.ln();
        }
        entropy
    }

    /// Exactly one admissible letter remains.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.admissible_count() == 1
    }

    /// The sole admissible letter is the block letter.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.admissible_count() == 1 && self.weight_of(BLOCK_LETTER) > 0
    }

    /// Zero admissible letters remain — a contradiction.
    #[must_use]
    pub fn is_deadend(&self) -> bool {
        self.admissible_count() == 0
    }

    /// Sample a letter proportional to weight, commit it via [`Cell::set_letter`],
    /// and return the chosen letter.
    pub fn define<R: Rng + ?Sized>(&mut self, rng: &mut R) -> char {
        let total = self.total_weight();
        debug_assert!(total > 0, "define() called on a deadend cell");
        let mut roll = rng.gen_range(0..total.max(1));
        let mut chosen = self.options[0].0;
        for &(letter, weight) in &self.options {
            if weight == 0 {
                continue;
            }
            let weight = u64::from(weight);
            if roll < weight {
                chosen = letter;
                break;
            }
            roll -= weight;
        }
        self.set_letter(chosen);
        chosen
    }
}
