//! Chess plumbing shared by the statistics crates: PGN splitting and parsing,
//! replayed game records, position keys and the concurrent opening tree.

pub mod error;
pub mod game_data;
pub mod opening_tree;
pub mod pgn;
pub mod position;
