#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::comparison_chain)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::match_on_vec_items)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod cell;
pub mod crossword;
pub mod dictionary;
pub mod error;
pub mod grid;
pub mod search_tree;
pub mod solver;
pub mod types;
pub mod util;
pub mod worker;

pub use crossword::Crossword;
pub use dictionary::Dictionary;
pub use error::CoreError;
pub use grid::Grid;
pub use solver::{SolveOutcome, Solver, Statistics};
pub use types::{Alphabet, Coordinate};

/// The maximum length a single word extent is expected to reach; sized for a
/// generous crossword grid dimension.
pub const MAX_WORD_LENGTH: usize = 64;
