//! The aggregate record: one per game from the extractor, one per cohort in
//! the reducer.

use std::collections::BTreeMap;
use std::sync::Arc;

use chess_core::opening_tree::OpeningTrie;
use serde::Serialize;
use shakmaty::Color;

use crate::heat_grid::HeatGrid;
use crate::ply_series::PlySeries;
use crate::provenance::PieceProvenanceTracker;

/// Position key -> number of times reached.
pub type PositionCounts = BTreeMap<String, u64>;

/// Label -> count histogram (ratings, years).
pub type Histogram = BTreeMap<String, u64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlayerColor {
    #[serde(rename = "w")]
    White,
    #[serde(rename = "b")]
    Black,
}

impl From<Color> for PlayerColor {
    fn from(color: Color) -> Self {
        match color {
            Color::White => PlayerColor::White,
            Color::Black => PlayerColor::Black,
        }
    }
}

impl From<PlayerColor> for Color {
    fn from(color: PlayerColor) -> Self {
        match color {
            PlayerColor::White => Color::White,
            PlayerColor::Black => Color::Black,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Heatmaps {
    pub square_utilization: HeatGrid,
    pub move_squares: HeatGrid,
    pub capture_squares: HeatGrid,
    pub check_squares: HeatGrid,
    /// Where the first capture of the game happened.
    pub first_blood: HeatGrid,
    pub promotion_squares: HeatGrid,
    /// Square of the king that got mated.
    pub mate_squares: HeatGrid,
    /// Square of the piece that delivered mate.
    pub mate_delivery_squares: HeatGrid,
    /// Square of the stalemated king.
    pub stalemate_squares: HeatGrid,
}

impl Heatmaps {
    pub fn merge(&mut self, other: &Heatmaps) {
        self.square_utilization.merge(&other.square_utilization);
        self.move_squares.merge(&other.move_squares);
        self.capture_squares.merge(&other.capture_squares);
        self.check_squares.merge(&other.check_squares);
        self.first_blood.merge(&other.first_blood);
        self.promotion_squares.merge(&other.promotion_squares);
        self.mate_squares.merge(&other.mate_squares);
        self.mate_delivery_squares.merge(&other.mate_delivery_squares);
        self.stalemate_squares.merge(&other.stalemate_squares);
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatistics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<PlayerColor>,
    pub total: u64,
    pub game_lengths: PlySeries,
    pub branching_factor: PlySeries,
    pub material_count: PlySeries,
    pub material_diff: PlySeries,
    pub game_end_material_count: PlySeries,
    pub game_end_material_diff: PlySeries,
    pub ratings: Histogram,
    pub years: Histogram,
    pub heatmaps: Heatmaps,
    pub piece_paths: PieceProvenanceTracker,
    pub positions: PositionCounts,
    pub total_positions: u64,
    pub unique_positions: PositionCounts,
    pub total_unique_positions: u64,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_openings"
    )]
    pub openings: Option<Arc<OpeningTrie>>,
    #[serde(skip)]
    normalized: bool,
}

impl PartialEq for GameStatistics {
    fn eq(&self, other: &Self) -> bool {
        let same_trie = match (&self.openings, &other.openings) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };

        same_trie
            && self.color == other.color
            && self.total == other.total
            && self.game_lengths == other.game_lengths
            && self.branching_factor == other.branching_factor
            && self.material_count == other.material_count
            && self.material_diff == other.material_diff
            && self.game_end_material_count == other.game_end_material_count
            && self.game_end_material_diff == other.game_end_material_diff
            && self.ratings == other.ratings
            && self.years == other.years
            && self.heatmaps == other.heatmaps
            && self.piece_paths == other.piece_paths
            && self.positions == other.positions
            && self.total_positions == other.total_positions
            && self.unique_positions == other.unique_positions
            && self.total_unique_positions == other.total_unique_positions
            && self.normalized == other.normalized
    }
}

impl GameStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty cohort accumulator sharing `openings` with the extractors.
    pub fn with_openings(color: Option<PlayerColor>, openings: Arc<OpeningTrie>) -> Self {
        Self {
            color,
            openings: Some(openings),
            ..Self::default()
        }
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Fold one per-game record into this total. Every call counts as exactly
    /// one game, whatever `other.total` says.
    pub fn merge(&mut self, other: &GameStatistics) {
        self.game_lengths.merge(&other.game_lengths);
        self.branching_factor.merge(&other.branching_factor);
        self.material_count.merge(&other.material_count);
        self.material_diff.merge(&other.material_diff);
        self.game_end_material_count
            .merge(&other.game_end_material_count);
        self.game_end_material_diff
            .merge(&other.game_end_material_diff);

        merge_counts(&mut self.ratings, &other.ratings);
        merge_counts(&mut self.years, &other.years);
        merge_counts(&mut self.positions, &other.positions);
        merge_counts(&mut self.unique_positions, &other.unique_positions);

        self.total_positions += other.total_positions;
        self.total_unique_positions = self.unique_positions.len() as u64;

        self.heatmaps.merge(&other.heatmaps);
        self.piece_paths.merge(&other.piece_paths);

        self.total += 1;
    }

    /// Turn running sums into per-game rates. Per-ply series are divided by
    /// the number of games; end-of-game series by the number of games that
    /// ended on that ply. Only the first call has an effect.
    pub fn normalize(&mut self) {
        if self.normalized {
            return;
        }

        let games = self.total as f64;
        self.branching_factor.divide_by(games);
        self.material_count.divide_by(games);
        self.material_diff.divide_by(games);

        self.game_end_material_count
            .divide_by_series(&self.game_lengths);
        self.game_end_material_diff
            .divide_by_series(&self.game_lengths);

        self.normalized = true;
    }

    /// Drop rare positions and opening lines (count strictly below `threshold`).
    pub fn prune(&mut self, threshold: u64) {
        prune_counts(&mut self.positions, threshold);
        prune_counts(&mut self.unique_positions, threshold);
        if let Some(openings) = &self.openings {
            openings.prune(threshold);
        }
    }
}

fn serialize_openings<S: serde::Serializer>(
    openings: &Option<Arc<OpeningTrie>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match openings {
        Some(trie) => trie.as_ref().serialize(serializer),
        None => serializer.serialize_none(),
    }
}

fn merge_counts(target: &mut BTreeMap<String, u64>, source: &BTreeMap<String, u64>) {
    for (key, count) in source {
        *target.entry(key.clone()).or_insert(0) += count;
    }
}

pub fn prune_counts(counts: &mut BTreeMap<String, u64>, threshold: u64) {
    counts.retain(|_, count| *count >= threshold);
}
