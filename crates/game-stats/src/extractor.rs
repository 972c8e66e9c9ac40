//! Single-pass extraction of one game's statistics.

use std::sync::Arc;

use chess_core::game_data::GameRecord;
use chess_core::opening_tree::{OpeningCursor, OpeningTrie};
use chess_core::position::{legal_move_count, material, position_key, unique_position_key};
use shakmaty::{Color, Position};

use crate::heat_grid::HeatGrid;
use crate::ply_context::{king_square, PlyContext};
use crate::provenance::FromTo;
use crate::statistics::{GameStatistics, Heatmaps, PlayerColor};

pub const DEFAULT_OPENING_DEPTH: usize = 10;

/// Opening tries shared by all extraction workers. `white` and `black` are
/// only present when filtering by player.
#[derive(Debug, Clone, Default)]
pub struct OpeningTries {
    pub all: Option<Arc<OpeningTrie>>,
    pub white: Option<Arc<OpeningTrie>>,
    pub black: Option<Arc<OpeningTrie>>,
}

impl OpeningTries {
    pub fn new(per_color: bool) -> Self {
        let make = || Some(Arc::new(OpeningTrie::new()));
        Self {
            all: make(),
            white: if per_color { make() } else { None },
            black: if per_color { make() } else { None },
        }
    }

    pub fn for_color(&self, color: Option<Color>) -> Option<&Arc<OpeningTrie>> {
        match color? {
            Color::White => self.white.as_ref(),
            Color::Black => self.black.as_ref(),
        }
    }
}

/// Everything an extraction worker needs besides the game itself.
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    pub filter_player: Option<String>,
    pub openings: OpeningTries,
    pub opening_depth: usize,
}

impl Default for ExtractionContext {
    fn default() -> Self {
        Self {
            filter_player: None,
            openings: OpeningTries::default(),
            opening_depth: DEFAULT_OPENING_DEPTH,
        }
    }
}

/// Build the statistics of one game. Returns `None` when a player filter is
/// set and the player took part on neither side.
pub fn extract(game: &GameRecord, ctx: &ExtractionContext) -> Option<GameStatistics> {
    let player = match &ctx.filter_player {
        Some(name) => Some(game.color_of(name)?),
        None => None,
    };

    let mut gs = GameStatistics::new();
    gs.total = 1;
    gs.color = player.map(PlayerColor::from);

    let mut cursors: Vec<OpeningCursor<'_>> = ctx
        .openings
        .all
        .iter()
        .chain(ctx.openings.for_color(player))
        .map(|trie| trie.begin_game())
        .collect();

    let mut first_capture_seen = false;

    for node in game.mainline() {
        // The initial position has no move leading to it
        let (Some(mv), Some(parent)) = (&node.mv, game.parent(node)) else {
            continue;
        };
        let ply = node.ply;
        let is_last = node.is_last();
        let pos = &node.position;

        if ply <= ctx.opening_depth {
            if let Some(san) = &node.san {
                for cursor in cursors.iter_mut() {
                    cursor.advance(san);
                }
            }
        }

        gs.branching_factor.add(ply, legal_move_count(pos) as f64);

        let (count, diff) = material(pos.board());
        gs.material_count.add(ply, f64::from(count));
        gs.material_diff.add(ply, f64::from(diff));
        if is_last {
            gs.game_end_material_count.add(ply, f64::from(count));
            gs.game_end_material_diff.add(ply, f64::from(diff));
        }

        // Everything above is shared; the rest only counts the filtered player's moves
        let here = PlyContext::new(ply, mv, &parent.position, pos, player, is_last);
        if !here.is_player_move {
            continue;
        }

        record_move_heatmaps(&mut gs.heatmaps, &here);

        if !first_capture_seen && here.is_capture() {
            if let Some(step) = here.displacements().first() {
                gs.heatmaps.first_blood.count(step.piece, step.to);
            }
            first_capture_seen = true;
        }

        if is_last {
            record_game_end(&mut gs.heatmaps, &here);
        }

        for step in here.displacements() {
            gs.piece_paths
                .track(FromTo::new(step.from, step.to), step.promoted.is_some());
        }

        let fen = position_key(pos);
        *gs.unique_positions
            .entry(unique_position_key(&fen))
            .or_insert(0) += 1;
        *gs.positions.entry(fen).or_insert(0) += 1;
    }

    gs.total_positions = gs.positions.values().sum();
    gs.total_unique_positions = gs.unique_positions.len() as u64;

    gs.game_lengths.set(game.plies(), 1.0);

    for tag in ["WhiteElo", "BlackElo"] {
        if let Some(rating) = game.tag(tag).and_then(|v| v.trim().parse::<u32>().ok()) {
            *gs.ratings.entry(rating.to_string()).or_insert(0) += 1;
        }
    }

    if let Some(year) = game_year(game) {
        *gs.years.entry(year.to_string()).or_insert(0) += 1;
    }

    Some(gs)
}

/// Year from `Date` (or `UTCDate`), e.g. `2019.03.??` -> 2019.
fn game_year(game: &GameRecord) -> Option<u32> {
    ["Date", "UTCDate"].iter().find_map(|tag| {
        game.tag(tag)
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    })
}

fn record_move_heatmaps(heatmaps: &mut Heatmaps, ctx: &PlyContext<'_>) {
    let steps = ctx.displacements();
    for step in &steps {
        heatmaps.square_utilization.count(step.piece, step.to);
        heatmaps.move_squares.count(step.piece, step.from);
        if let Some(promoted) = step.promoted {
            heatmaps.promotion_squares.count(promoted, step.to);
        }
    }

    if ctx.is_capture() {
        if let Some(step) = steps.first() {
            heatmaps.capture_squares.count(step.piece, step.to);
        }
    }

    // Mate is credited separately on the last ply
    if ctx.gives_check() && !ctx.after.is_checkmate() {
        credit_delivery(&mut heatmaps.check_squares, ctx);
    }
}

fn record_game_end(heatmaps: &mut Heatmaps, ctx: &PlyContext<'_>) {
    let board = ctx.after.board();
    let defender = ctx.after.turn();

    if ctx.after.is_checkmate() {
        credit_delivery(&mut heatmaps.mate_delivery_squares, ctx);
        if let Some(sq) = king_square(board, defender) {
            heatmaps.mate_squares.count(defender.king(), sq);
        }
    } else if ctx.after.is_stalemate() {
        if let Some(sq) = king_square(board, defender) {
            heatmaps.stalemate_squares.count(defender.king(), sq);
        }
    }
}

fn credit_delivery(grid: &mut HeatGrid, ctx: &PlyContext<'_>) {
    if let Some(piece) = ctx.delivering_piece() {
        grid.count(piece, ctx.delivering_square());
    }
}
