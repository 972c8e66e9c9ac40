//! PGN parsing error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PgnError {
    #[error("No tag pairs found")]
    MissingTags,

    #[error("Illegal or unparsable move {san:?} at ply {ply}")]
    IllegalMove { san: String, ply: usize },

    #[error("Game has no Result tag")]
    MissingResult,

    #[error("Non-standard starting position: {0}")]
    NonStandardStart(String),
}

impl PgnError {
    /// Excluded records are structurally valid games we deliberately skip,
    /// as opposed to malformed input.
    pub fn is_exclusion(&self) -> bool {
        matches!(self, PgnError::MissingResult | PgnError::NonStandardStart(_))
    }
}
