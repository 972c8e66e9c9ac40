//! Per-game statistics extraction and the mergeable aggregate built from it.

pub mod extractor;
pub mod heat_grid;
pub mod ply_context;
pub mod ply_series;
pub mod provenance;
pub mod statistics;

pub use extractor::{extract, ExtractionContext, OpeningTries};
pub use statistics::{GameStatistics, PlayerColor};
