//! A `W`x`H` array of cells with word-extent discovery and grid-wide predicates.

use float_ord::FloatOrd;
use rand::Rng;

use crate::cell::Cell;
use crate::error::CoreError;
use crate::types::{Alphabet, Coordinate, DOWN, RIGHT};

/// A rectangular grid of cells, stored row-major.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// A fresh `width`x`height` grid with every cell reset against `alphabet`.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDimensions`] if either dimension is zero.
    pub fn new(width: usize, height: usize, alphabet: &Alphabet) -> Result<Self, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| Coordinate::new(x as i32, y as i32)))
            .map(|coords| Cell::new(coords, alphabet))
            .collect();
        Ok(Grid {
            width,
            height,
            cells,
        })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    fn index_of(&self, coords: Coordinate) -> usize {
        assert!(
            coords.in_bounds(self.width, self.height),
            "coordinate {:?} out of bounds for a {}x{} grid",
            coords,
            self.width,
            self.height
        );
        coords.y as usize * self.width + coords.x as usize
    }

    /// Bounds-checked cell access. Panics on an out-of-bounds coordinate, which
    /// is a programmer error, not a recoverable outcome.
    #[must_use]
    pub fn get(&self, coords: Coordinate) -> &Cell {
        &self.cells[self.index_of(coords)]
    }

    pub fn get_mut(&mut self, coords: Coordinate) -> &mut Cell {
        let index = self.index_of(coords);
        &mut self.cells[index]
    }

    /// Non-panicking lookup, for callers that don't already know the
    /// coordinate is in bounds.
    #[must_use]
    pub fn checked_get(&self, coords: Coordinate) -> Option<&Cell> {
        if coords.in_bounds(self.width, self.height) {
            Some(self.get(coords))
        } else {
            None
        }
    }

    pub fn set(&mut self, coords: Coordinate, cell: Cell) {
        let index = self.index_of(coords);
        self.cells[index] = cell;
    }

    /// Restore every cell to its freshly-reset state.
    pub fn reset(&mut self, alphabet: &Alphabet) {
        for cell in &mut self.cells {
            cell.reset(alphabet);
        }
    }

    /// Row-major iteration over every cell.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| Coordinate::new(x as i32, y as i32))
        })
    }

    /// Scan outward from `coords` along `step` (and `-step`) while neighbouring
    /// cells aren't blocked, returning the maximal contiguous run in natural
    /// reading order. Empty if `coords` itself is blocked.
    fn find_word_extent(&self, coords: Coordinate, step: Coordinate) -> Vec<Coordinate> {
        if self.get(coords).is_blocked() {
            return Vec::new();
        }

        let mut start = coords;
        loop {
            let prev = start + -step;
            match self.checked_get(prev) {
                Some(cell) if !cell.is_blocked() => start = prev,
                _ => break,
            }
        }

        let mut extent = Vec::new();
        let mut cur = start;
        loop {
            extent.push(cur);
            let next = cur + step;
            match self.checked_get(next) {
                Some(cell) if !cell.is_blocked() => cur = next,
                _ => break,
            }
        }
        extent
    }

    /// The maximal contiguous non-blocked run through `coords`, scanning left
    /// to right.
    #[must_use]
    pub fn find_horizontal_word(&self, coords: Coordinate) -> Vec<Coordinate> {
        self.find_word_extent(coords, RIGHT)
    }

    /// The maximal contiguous non-blocked run through `coords`, scanning top to
    /// bottom.
    #[must_use]
    pub fn find_vertical_word(&self, coords: Coordinate) -> Vec<Coordinate> {
        self.find_word_extent(coords, DOWN)
    }

    /// True iff any cell has zero admissible letters.
    #[must_use]
    pub fn is_deadend(&self) -> bool {
        self.cells.iter().any(Cell::is_deadend)
    }

    /// True iff every cell is defined.
    #[must_use]
    pub fn is_fully_defined(&self) -> bool {
        self.cells.iter().all(Cell::is_defined)
    }

    /// `Σ Σ w_i` over every cell's options — a scalar progress measure that
    /// strictly decreases across useful propagation passes.
    #[must_use]
    pub fn total_options(&self) -> u64 {
        self.cells.iter().map(Cell::total_weight).sum()
    }

    /// The coordinates of the lowest-entropy non-defined cell, ties broken by
    /// row-major order. With `noise > 0`, jitters each entropy by
    /// `noise * U(0,1) / 1000` before comparing, for deterministic variety
    /// under a seeded RNG. `None` if every cell is already defined.
    pub fn find_min_entropy<R: Rng + ?Sized>(
        &self,
        noise: Option<f64>,
        rng: &mut R,
    ) -> Option<Coordinate> {
        let jittered: Vec<(Coordinate, f64)> = self
            .coordinates()
            .filter_map(|coords| {
                let cell = self.get(coords);
                if cell.is_defined() {
                    return None;
                }
                let mut entropy = cell.shannon_entropy();
                if let Some(noise) = noise {
                    if noise > 0.0 {
                        entropy -= noise * rng.gen::<f64>() / 1000.0;
                    }
                }
                Some((coords, entropy))
            })
            .collect();

        // `min_by_key` keeps the first of equal-key elements, so row-major
        // order naturally wins ties.
        jittered
            .into_iter()
            .min_by_key(|&(_, entropy)| FloatOrd(entropy))
            .map(|(coords, _)| coords)
    }

    /// Every maximal, fully-defined horizontal or vertical extent of length
    /// >= 3, de-duplicated by marking covered cells. Masked and blocked cells
    /// are never extent starting points.
    #[must_use]
    pub fn all_words(&self) -> Vec<String> {
        let mut words = Vec::new();
        let mut horizontal_seen = vec![false; self.cells.len()];
        let mut vertical_seen = vec![false; self.cells.len()];

        for coords in self.coordinates() {
            let cell = self.get(coords);
            if cell.is_blocked() || cell.mask() {
                continue;
            }

            let idx = self.index_of(coords);
            if !horizontal_seen[idx] {
                self.collect_extent_word(
                    self.find_horizontal_word(coords),
                    &mut horizontal_seen,
                    &mut words,
                );
            }
            if !vertical_seen[idx] {
                self.collect_extent_word(
                    self.find_vertical_word(coords),
                    &mut vertical_seen,
                    &mut words,
                );
            }
        }
        words
    }

    fn collect_extent_word(&self, extent: Vec<Coordinate>, seen: &mut [bool], words: &mut Vec<String>) {
        if extent.len() < 3 {
            return;
        }
        for &c in &extent {
            seen[self.index_of(c)] = true;
        }
        if extent.iter().all(|&c| self.get(c).is_defined()) {
            let word: String = extent
                .iter()
                .map(|&c| {
                    self.get(c)
                        .admissible_letters()
                        .next()
                        .expect("defined cell has exactly one admissible letter")
                })
                .collect();
            words.push(word);
        }
    }
}
