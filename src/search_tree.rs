//! Backtracking search state.
//!
//! Only the path from the root to the current node is ever live during a
//! search, so this is a flat `Vec` of frames rather than a general tree of
//! nodes with parent links.

use crate::crossword::Crossword;
use crate::types::Coordinate;

/// A single collapse on the search path: the `(coord, letter)` choice that was
/// made, and an independent snapshot of the crossword *after* that choice and
/// after propagation.
#[derive(Debug, Clone)]
pub struct Frame {
    pub coords: Coordinate,
    pub letter: char,
    pub snapshot: Crossword,
}

/// The root crossword plus the stack of frames describing the current search
/// path. `current()` is the top of the stack, or the root if the stack is
/// empty (i.e. no moves have been made yet, or every move has been undone).
#[derive(Debug, Clone)]
pub struct SearchStack {
    root: Crossword,
    frames: Vec<Frame>,
}

impl SearchStack {
    #[must_use]
    pub fn new(root: Crossword) -> Self {
        SearchStack {
            root,
            frames: Vec::new(),
        }
    }

    /// Discard every frame and replace the root.
    pub fn reset(&mut self, root: Crossword) {
        self.root = root;
        self.frames.clear();
    }

    #[must_use]
    pub fn is_at_root(&self) -> bool {
        self.frames.is_empty()
    }

    /// Depth of the current node.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn current(&self) -> &Crossword {
        self.frames.last().map_or(&self.root, |frame| &frame.snapshot)
    }

    pub fn current_mut(&mut self) -> &mut Crossword {
        self.frames
            .last_mut()
            .map_or(&mut self.root, |frame| &mut frame.snapshot)
    }

    /// Descend: record a new move as a child of the current node.
    pub fn push(&mut self, coords: Coordinate, letter: char, snapshot: Crossword) {
        self.frames.push(Frame {
            coords,
            letter,
            snapshot,
        });
    }

    /// Backtrack: discard the current node, returning the move that led to it
    /// so the caller can blacklist it on the (now-current) parent. `None` if
    /// already at the root — the caller is expected to have already checked
    /// [`SearchStack::is_at_root`] before treating this as exhaustion.
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }
}
