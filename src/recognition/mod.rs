//! Tile value recognition.
//!
//! Reads tile values by comparing glyph projections against templates the
//! recognizer learns during play.

pub mod recognizer;
pub mod template;

pub use recognizer::{TileMatch, TileRecognizer};
pub use template::{reduce, similarity, Symbol, Template, SYMBOL_COUNT};
