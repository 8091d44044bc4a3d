//! Binds a [`Grid`] to a [`Dictionary`] and implements constraint propagation
//! and full-word validity.

use std::sync::Arc;

use crate::dictionary::Dictionary;
use crate::error::CoreError;
use crate::grid::Grid;
use crate::types::{Alphabet, Coordinate};
use crate::util::build_position_frequencies;

/// A grid paired with the dictionary it's being filled against. Owns no other
/// state — propagation and validity are pure functions of `grid` and
/// `dictionary`.
#[derive(Debug, Clone)]
pub struct Crossword {
    grid: Grid,
    dictionary: Arc<Dictionary>,
}

impl Crossword {
    /// # Errors
    /// Returns [`CoreError::InvalidDimensions`] if either dimension is zero.
    pub fn new(width: usize, height: usize, dictionary: Arc<Dictionary>) -> Result<Self, CoreError> {
        let grid = Grid::new(width, height, dictionary.alphabet())?;
        Ok(Crossword { grid, dictionary })
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    #[must_use]
    pub fn dictionary(&self) -> &Arc<Dictionary> {
        &self.dictionary
    }

    fn alphabet(&self) -> &Alphabet {
        self.dictionary.alphabet()
    }

    pub fn reset(&mut self) {
        let alphabet = self.dictionary.alphabet().clone();
        self.grid.reset(&alphabet);
    }

    // -- Core API, forwarded onto the grid --------------------------------------

    /// Install a user letter at `coords`, discarding other options. Does not
    /// itself set `mask` — callers that want the cell protected from
    /// propagation must call [`Crossword::set_mask`] as well.
    pub fn set_letter(&mut self, coords: Coordinate, letter: char) {
        self.grid.get_mut(coords).set_letter(letter);
    }

    pub fn set_mask(&mut self, coords: Coordinate, mask: bool) {
        self.grid.get_mut(coords).set_mask(mask);
    }

    /// Restore the alphabet-wide options for `coords`.
    pub fn reset_cell(&mut self, coords: Coordinate) {
        let alphabet = self.alphabet().clone();
        self.grid.get_mut(coords).reset(&alphabet);
    }

    // -- Propagation -----------------------------------------------------------

    /// Tighten the options of the word extent through `coords` using the
    /// dictionary's per-position letter frequencies.
    fn update_word_options(&mut self, coords: &[Coordinate]) {
        let classes: Vec<_> = coords
            .iter()
            .map(|&c| self.grid.get(c).admissible_letter_class())
            .collect();

        let matching = self.dictionary.matching_words(coords.len(), &classes);
        let frequencies = build_position_frequencies(coords.len(), &matching);

        for (position, &coord) in coords.iter().enumerate() {
            let cell = self.grid.get_mut(coord);
            for letter in cell.all_letters().collect::<Vec<_>>() {
                let blacklisted = cell.blacklist().contains(&letter);
                match frequencies[position].get(&letter) {
                    Some(&freq) if !blacklisted => {
                        let narrowed = cell.weight_of(letter).min(freq);
                        cell.set_letter_count(letter, narrowed);
                    }
                    _ => cell.set_letter_count(letter, 0),
                }
            }
        }
    }

    /// Iteratively tighten every cell's options until no further narrowing is
    /// possible or a deadend is detected. Returns the number of passes run.
    pub fn update_options(&mut self) -> usize {
        let mut old_total = self.grid.total_options();
        let mut passes = 0;

        loop {
            passes += 1;

            for cell in self.grid.iter_mut() {
                for letter in cell.blacklist().to_vec() {
                    cell.set_letter_count(letter, 0);
                }
            }

            if self.grid.is_deadend() {
                break;
            }

            let width = self.grid.width();
            let height = self.grid.height();
            let mut horizontal_done = vec![false; width * height];
            let mut vertical_done = vec![false; width * height];

            'rows: for y in 0..height {
                for x in 0..width {
                    let coords = Coordinate::new(x as i32, y as i32);
                    let idx = y * width + x;
                    let cell = self.grid.get(coords);
                    if cell.is_defined() || cell.mask() {
                        continue;
                    }

                    if self.grid.is_deadend() {
                        break 'rows;
                    }

                    if !horizontal_done[idx] {
                        let extent = self.grid.find_horizontal_word(coords);
                        if extent.len() >= 3 {
                            self.update_word_options(&extent);
                        }
                        for &c in &extent {
                            horizontal_done[(c.y as usize) * width + c.x as usize] = true;
                        }
                    }

                    if self.grid.is_deadend() {
                        break 'rows;
                    }

                    if !vertical_done[idx] {
                        let extent = self.grid.find_vertical_word(coords);
                        if extent.len() >= 3 {
                            self.update_word_options(&extent);
                        }
                        for &c in &extent {
                            vertical_done[(c.y as usize) * width + c.x as usize] = true;
                        }
                    }
                }
            }

            let new_total = self.grid.total_options();
            if new_total >= old_total {
                break;
            }
            old_total = new_total;
        }

        passes
    }

    /// True iff every maximal, fully-defined extent of length >= 3 (skipping
    /// masked and blocked starting points) is a dictionary word.
    #[must_use]
    pub fn is_fully_valid(&self) -> bool {
        self.grid
            .all_words()
            .iter()
            .all(|word| {
                self.dictionary
                    .words_of_length(word.chars().count())
                    .iter()
                    .any(|w| &w.text == word)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Alphabet;

    fn crossword_with(words: &[&str], width: usize, height: usize) -> Crossword {
        let dictionary = Arc::new(Dictionary::new(words.to_vec(), Alphabet::english(), None));
        Crossword::new(width, height, dictionary).unwrap()
    }

    /// Blacklisting a letter before any propagation narrows the grid to the
    /// single still-admissible word.
    #[test]
    fn blacklist_narrows_to_the_only_remaining_word() {
        let mut crossword = crossword_with(&["cat", "car"], 3, 1);
        crossword
            .grid_mut()
            .get_mut(Coordinate::new(2, 0))
            .add_to_blacklist('t');

        crossword.update_options();

        assert!(crossword.grid().is_fully_defined());
        assert_eq!(crossword.grid().all_words(), vec!["car".to_string()]);
    }

    /// A single-word dictionary over a fully-crossing grid propagates to a
    /// full solution with no search at all.
    #[test]
    fn single_word_dictionary_propagates_without_search() {
        let mut crossword = crossword_with(&["aaa"], 3, 3);
        crossword.update_options();
        assert!(crossword.grid().is_fully_defined());
        for word in crossword.grid().all_words() {
            assert_eq!(word, "aaa");
        }
    }

    /// Masking a preset letter steers propagation to the dictionary entry
    /// that's consistent with it.
    #[test]
    fn masked_letter_steers_propagation_to_the_consistent_word() {
        let mut crossword = crossword_with(&["abc", "def"], 3, 1);
        crossword.set_letter(Coordinate::new(0, 0), 'a');
        crossword.set_mask(Coordinate::new(0, 0), true);
        crossword.update_options();
        assert_eq!(crossword.grid().all_words(), vec!["abc".to_string()]);
    }

    /// A masked letter inconsistent with every dictionary entry of that
    /// length propagates to a deadend, not a crash.
    #[test]
    fn inconsistent_masked_letter_is_a_deadend() {
        let mut crossword = crossword_with(&["abc"], 3, 1);
        crossword.set_letter(Coordinate::new(0, 0), 'd');
        crossword.set_mask(Coordinate::new(0, 0), true);
        crossword.update_options();
        assert!(crossword.grid().is_deadend());
    }

    #[test]
    fn update_options_is_idempotent_once_quiescent() {
        let mut crossword = crossword_with(&["cat", "car", "cot"], 3, 1);
        crossword.update_options();
        let totals_before = crossword.grid().total_options();
        crossword.update_options();
        assert_eq!(crossword.grid().total_options(), totals_before);
    }

    #[test]
    fn narrowing_never_increases_total_options() {
        let mut crossword = crossword_with(&["cat", "car", "cot", "dog"], 3, 3);
        let mut previous = crossword.grid().total_options();
        for _ in 0..5 {
            crossword.update_options();
            let current = crossword.grid().total_options();
            assert!(current <= previous);
            previous = current;
        }
    }

    /// A block cell at the grid's edge splits a row into two shorter extents
    /// instead of one spanning the block.
    #[test]
    fn block_cell_splits_a_row_into_two_extents() {
        use indoc::indoc;

        // A 5x1 preset row: "cat" then a block, then a single open cell,
        // which is too short (length 1) to ever become a word extent.
        let preset = indoc! {"
            cat-.
        "};

        let mut crossword = crossword_with(&["cat"], 5, 1);
        for (x, letter) in preset.trim().chars().enumerate() {
            if letter == '.' {
                continue;
            }
            crossword.set_letter(Coordinate::new(x as i32, 0), letter);
        }

        assert_eq!(
            crossword.grid().find_horizontal_word(Coordinate::new(0, 0)).len(),
            3
        );
        assert_eq!(
            crossword.grid().find_horizontal_word(Coordinate::new(4, 0)).len(),
            1,
            "too short to ever form a word extent"
        );
        assert_eq!(crossword.grid().all_words(), vec!["cat".to_string()]);
    }
}
