//! Per-square, per-piece occurrence counters.

use serde::ser::{Serialize, SerializeMap, Serializer};
use shakmaty::{Color, Piece, Role, Square};

/// Piece symbols in FEN notation; the order defines the column layout.
pub const PIECE_SYMBOLS: [char; 12] = ['K', 'Q', 'R', 'B', 'N', 'P', 'k', 'q', 'r', 'b', 'n', 'p'];

fn symbol_index(piece: Piece) -> usize {
    let role = match piece.role {
        Role::King => 0,
        Role::Queen => 1,
        Role::Rook => 2,
        Role::Bishop => 3,
        Role::Knight => 4,
        Role::Pawn => 5,
    };
    match piece.color {
        Color::White => role,
        Color::Black => role + 6,
    }
}

/// Cell index of a square: row-major from a8 (0) to h1 (63), the way a board
/// diagram is printed from white's side.
pub fn cell_index(square: Square) -> usize {
    let i = square as usize;
    let (file, rank) = (i % 8, i / 8);
    (7 - rank) * 8 + file
}

const CELLS: usize = 64;

/// 64-cell heatmap. Merging is cell-wise, symbol-wise addition, so the empty
/// grid is the identity and merge order never matters.
///
/// Cells are boxed; statistics records are moved between tasks by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatGrid {
    cells: Box<[[u64; 12]]>,
}

impl Default for HeatGrid {
    fn default() -> Self {
        Self {
            cells: vec![[0; 12]; CELLS].into_boxed_slice(),
        }
    }
}

impl HeatGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&mut self, piece: Piece, square: Square) {
        self.cells[cell_index(square)][symbol_index(piece)] += 1;
    }

    pub fn get(&self, piece: Piece, square: Square) -> u64 {
        self.cells[cell_index(square)][symbol_index(piece)]
    }

    /// Sum over all pieces on one square.
    #[cfg(test)]
    fn square_total(&self, square: Square) -> u64 {
        self.cells[cell_index(square)].iter().sum()
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }

    /// Number of cells with at least one hit.
    #[cfg(test)]
    fn occupied_cells(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.iter().any(|&n| n > 0))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn merge(&mut self, other: &HeatGrid) {
        for (cell, add) in self.cells.iter_mut().zip(other.cells.iter()) {
            for (n, a) in cell.iter_mut().zip(add.iter()) {
                *n += a;
            }
        }
    }
}

struct Cell<'a>(&'a [u64; 12]);

impl Serialize for Cell<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let hits = self.0.iter().filter(|&&n| n > 0).count();
        let mut map = serializer.serialize_map(Some(hits))?;
        for (symbol, &n) in PIECE_SYMBOLS.iter().zip(self.0.iter()) {
            if n > 0 {
                map.serialize_entry(symbol, &n)?;
            }
        }
        map.end()
    }
}

impl Serialize for HeatGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.cells.iter().map(Cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE_PAWN: Piece = Piece {
        color: Color::White,
        role: Role::Pawn,
    };
    const BLACK_KING: Piece = Piece {
        color: Color::Black,
        role: Role::King,
    };

    #[test]
    fn test_grid_is_heap_allocated() {
        assert!(std::mem::size_of::<HeatGrid>() <= 2 * std::mem::size_of::<usize>());
        assert_eq!(HeatGrid::new().cells.len(), 64);
    }

    #[test]
    fn test_cell_layout() {
        assert_eq!(cell_index(Square::A8), 0);
        assert_eq!(cell_index(Square::H8), 7);
        assert_eq!(cell_index(Square::A1), 56);
        assert_eq!(cell_index(Square::H1), 63);
        assert_eq!(cell_index(Square::E4), 36);
    }

    #[test]
    fn test_merge_with_empty_is_identity() {
        let mut grid = HeatGrid::new();
        grid.count(WHITE_PAWN, Square::E4);
        grid.count(BLACK_KING, Square::G8);
        let before = grid.clone();

        grid.merge(&HeatGrid::new());
        assert_eq!(grid, before);

        let mut empty = HeatGrid::new();
        empty.merge(&before);
        assert_eq!(empty, before);
    }

    #[test]
    fn test_merge_adds_per_symbol() {
        let mut a = HeatGrid::new();
        a.count(WHITE_PAWN, Square::E4);
        let mut b = HeatGrid::new();
        b.count(WHITE_PAWN, Square::E4);
        b.count(BLACK_KING, Square::E4);

        a.merge(&b);
        assert_eq!(a.get(WHITE_PAWN, Square::E4), 2);
        assert_eq!(a.get(BLACK_KING, Square::E4), 1);
        assert_eq!(a.square_total(Square::E4), 3);
        assert_eq!(a.occupied_cells(), 1);
    }

    #[test]
    fn test_serializes_64_maps() {
        let mut grid = HeatGrid::new();
        grid.count(WHITE_PAWN, Square::A8);
        grid.count(BLACK_KING, Square::A8);

        let json = serde_json::to_value(&grid).unwrap();
        let cells = json.as_array().unwrap();
        assert_eq!(cells.len(), 64);
        assert_eq!(cells[0], serde_json::json!({"P": 1, "k": 1}));
        assert_eq!(cells[1], serde_json::json!({}));
    }
}
