//! Attributes moves to the piece making them, identified by its starting square.

use std::collections::BTreeMap;

use serde::ser::{Serialize, Serializer};
use shakmaty::Square;

/// A single piece displacement; castling is fed as two of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FromTo {
    pub from: Square,
    pub to: Square,
}

impl FromTo {
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }
}

/// Tracks piece identity across a game. `square_origin` is per-game scratch
/// state; only `moves_by_origin` is merged and exported.
#[derive(Debug, Clone)]
pub struct PieceProvenanceTracker {
    square_origin: [Option<Square>; 64],
    moves_by_origin: BTreeMap<Square, BTreeMap<FromTo, u64>>,
}

impl Default for PieceProvenanceTracker {
    fn default() -> Self {
        Self {
            square_origin: [None; 64],
            moves_by_origin: BTreeMap::new(),
        }
    }
}

impl PartialEq for PieceProvenanceTracker {
    fn eq(&self, other: &Self) -> bool {
        self.moves_by_origin == other.moves_by_origin
    }
}

impl PieceProvenanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Origin square of the piece currently standing on `square`, if it has moved.
    #[cfg(test)]
    fn origin_of(&self, square: Square) -> Option<Square> {
        self.square_origin[square as usize]
    }

    /// Record one displacement. A piece seen for the first time is identified by
    /// the square it moves from; a promoted piece becomes a new identity keyed
    /// by its promotion square.
    pub fn track(&mut self, step: FromTo, promotion: bool) {
        let origin = self.square_origin[step.from as usize].unwrap_or(step.from);
        self.square_origin[step.from as usize] = None;
        self.square_origin[step.to as usize] = Some(origin);

        *self
            .moves_by_origin
            .entry(origin)
            .or_default()
            .entry(step)
            .or_insert(0) += 1;

        if promotion {
            self.square_origin[step.to as usize] = Some(step.to);
        }
    }

    pub fn moves_of(&self, origin: Square) -> Option<&BTreeMap<FromTo, u64>> {
        self.moves_by_origin.get(&origin)
    }

    pub fn merge(&mut self, other: &PieceProvenanceTracker) {
        for (origin, moves) in &other.moves_by_origin {
            let target = self.moves_by_origin.entry(*origin).or_default();
            for (step, count) in moves {
                *target.entry(*step).or_insert(0) += count;
            }
        }
    }
}

impl Serialize for PieceProvenanceTracker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.moves_by_origin.iter().map(|(origin, moves)| {
            let moves: BTreeMap<String, u64> = moves
                .iter()
                .map(|(step, count)| (format!("{}-{}", step.from, step.to), *count))
                .collect();
            (origin.to_string(), moves)
        }))
    }
}
