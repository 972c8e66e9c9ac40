//! Position helpers: move generation counts, FEN keys and material.

use shakmaty::{fen::Fen, Board, Chess, Color, EnPassantMode, Position, Role};

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Number of legal moves available to the side to move.
pub fn legal_move_count(pos: &Chess) -> usize {
    pos.legal_moves().len()
}

/// Full FEN, including halfmove clock and fullmove number.
pub fn position_key(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

/// FEN without move counters (placement + side + castling + ep), so that
/// positions reached at different points of a game compare equal.
pub fn unique_position_key(fen: &str) -> String {
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

pub fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => 1,
        Role::Knight => 3,
        Role::Bishop => 3,
        Role::Rook => 5,
        Role::Queen => 9,
        Role::King => 0,
    }
}

/// Total material on the board and white-minus-black difference.
pub fn material(board: &Board) -> (i32, i32) {
    let mut white = 0i32;
    let mut black = 0i32;
    for sq in board.occupied() {
        if let Some(piece) = board.piece_at(sq) {
            match piece.color {
                Color::White => white += piece_value(piece.role),
                Color::Black => black += piece_value(piece.role),
            }
        }
    }
    (white + black, white - black)
}
