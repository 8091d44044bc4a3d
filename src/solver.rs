//! Orchestrates iterate/backtrack until solved or exhausted.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::crossword::Crossword;
use crate::search_tree::SearchStack;

/// Running totals kept across a solve, returned to the caller rather than
/// logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Statistics {
    pub iterations: usize,
    pub backtracks: usize,
    pub propagation_passes: usize,
}

/// The non-exceptional result of a [`Solver::solve`] call; neither variant is
/// an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolveOutcome {
    /// The current node's grid is fully defined and fully valid.
    Solved,
    /// Search returned all the way to the root and the root is a deadend; no
    /// assignment exists under the current fixed letters and dictionary.
    Exhausted,
}

/// Entropy jitter applied by [`crate::grid::Grid::find_min_entropy`] to break
/// exact ties with deterministic, seed-dependent noise.
const ENTROPY_NOISE: f64 = 1.0;

/// Drives the wavefunction-collapse search: descend by collapsing the
/// lowest-entropy cell, propagate, and backtrack with a learned per-cell
/// blacklist whenever propagation finds a contradiction.
pub struct Solver {
    stack: SearchStack,
    rng: SmallRng,
    statistics: Statistics,
}

impl Solver {
    /// The RNG is an explicit, seedable collaborator, so a given seed always
    /// produces the same search.
    #[must_use]
    pub fn new(root: Crossword, rng_seed: u64) -> Self {
        Solver {
            stack: SearchStack::new(root),
            rng: SmallRng::seed_from_u64(rng_seed),
            statistics: Statistics::default(),
        }
    }

    /// Replace the live crossword and discard the search tree and counters.
    pub fn reset(&mut self, root: Crossword) {
        self.stack.reset(root);
        self.statistics = Statistics::default();
    }

    #[must_use]
    pub fn current(&self) -> &Crossword {
        self.stack.current()
    }

    pub fn current_mut(&mut self) -> &mut Crossword {
        self.stack.current_mut()
    }

    #[must_use]
    pub fn statistics(&self) -> Statistics {
        self.statistics
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// A single step of the algorithm: backtrack if the current node is a
    /// deadend or invalid, otherwise collapse the minimum-entropy cell and
    /// descend. Either branch ends by propagating the new current node.
    pub fn iterate(&mut self) {
        let should_backtrack = {
            let cur = self.stack.current();
            cur.grid().is_deadend() || !cur.is_fully_valid()
        };

        if should_backtrack {
            if let Some(frame) = self.stack.pop() {
                self.stack
                    .current_mut()
                    .grid_mut()
                    .get_mut(frame.coords)
                    .add_to_blacklist(frame.letter);
                self.statistics.backtracks += 1;
            }
            // If the stack was already at the root, there's nothing to undo;
            // `solve()` is responsible for recognising that as exhaustion
            // before calling `iterate` again.
        } else if let Some(coords) = self
            .stack
            .current()
            .grid()
            .find_min_entropy(Some(ENTROPY_NOISE), &mut self.rng)
        {
            let mut snapshot = self.stack.current().clone();
            let letter = snapshot.grid_mut().get_mut(coords).define(&mut self.rng);
            self.stack.push(coords, letter, snapshot);
        }

        self.statistics.propagation_passes += self.stack.current_mut().update_options();
        self.statistics.iterations += 1;
    }

    /// Runs [`Solver::iterate`] until the current node is fully defined and
    /// fully valid, or the search has returned to a deadend root.
    ///
    /// Before the first decision, this runs one propagation pass on the
    /// current node. Skipping it would let an adversarial RNG draw pick a
    /// letter no word supports even when propagation alone would have
    /// resolved the grid, forcing an avoidable backtrack. Establishing
    /// consistency before search starts is the same idea as running an
    /// arc-consistency pass before a retry loop: cheap, and it only ever
    /// removes work the search would otherwise redo by trial and error.
    pub fn solve(&mut self) -> SolveOutcome {
        self.statistics.propagation_passes += self.stack.current_mut().update_options();
        loop {
            let cur = self.stack.current();
            if cur.grid().is_fully_defined() && cur.is_fully_valid() {
                return SolveOutcome::Solved;
            }
            if self.stack.is_at_root() && cur.grid().is_deadend() {
                return SolveOutcome::Exhausted;
            }
            self.iterate();
        }
    }
}
