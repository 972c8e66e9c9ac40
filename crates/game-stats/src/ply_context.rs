//! What happened on a single ply, as seen by the extractor.

use shakmaty::{Board, CastlingSide, Chess, Color, Move, Piece, Position, Role, Square};

/// One piece moving from one square to another. A castling move is two of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Displacement {
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
    pub promoted: Option<Piece>,
}

/// Context available to the extractor at each ply.
pub struct PlyContext<'a> {
    pub ply: usize,
    pub mv: &'a Move,
    pub before: &'a Chess, // Board state BEFORE the move
    pub after: &'a Chess,
    pub mover: Color,
    pub is_player_move: bool,
    pub is_last: bool,
}

impl<'a> PlyContext<'a> {
    /// `player` is the filtered player's color, `None` when every move counts.
    pub fn new(
        ply: usize,
        mv: &'a Move,
        before: &'a Chess,
        after: &'a Chess,
        player: Option<Color>,
        is_last: bool,
    ) -> Self {
        // Side to move is recorded *after* the move, so the mover is the other side
        let mover = !after.turn();
        Self {
            ply,
            mv,
            before,
            after,
            mover,
            is_player_move: player.map_or(true, |c| c == mover),
            is_last,
        }
    }

    /// The real piece displacements of this move. Castling is encoded as the
    /// king moving onto its own rook, so it is split into the king's and the
    /// rook's actual moves.
    pub fn displacements(&self) -> Vec<Displacement> {
        match *self.mv {
            Move::Castle { king, rook } => {
                let side = if rook > king {
                    CastlingSide::KingSide
                } else {
                    CastlingSide::QueenSide
                };
                vec![
                    Displacement {
                        piece: self.mover.king(),
                        from: king,
                        to: side.king_to(self.mover),
                        promoted: None,
                    },
                    Displacement {
                        piece: self.mover.rook(),
                        from: rook,
                        to: side.rook_to(self.mover),
                        promoted: None,
                    },
                ]
            }
            _ => {
                let Some(from) = self.mv.from() else {
                    return Vec::new();
                };
                vec![Displacement {
                    piece: Piece {
                        color: self.mover,
                        role: self.mv.role(),
                    },
                    from,
                    to: self.mv.to(),
                    promoted: self.mv.promotion().map(|role| Piece {
                        color: self.mover,
                        role,
                    }),
                }]
            }
        }
    }

    /// Square of the piece that gives check or mate with this move. For
    /// castling that is the rook: the king never delivers check.
    pub fn delivering_square(&self) -> Square {
        match *self.mv {
            Move::Castle { king, rook } => {
                let side = if rook > king {
                    CastlingSide::KingSide
                } else {
                    CastlingSide::QueenSide
                };
                side.rook_to(self.mover)
            }
            _ => self.mv.to(),
        }
    }

    pub fn delivering_piece(&self) -> Option<Piece> {
        self.after.board().piece_at(self.delivering_square())
    }

    /// Did this move take a piece? Decided from the destination square's
    /// occupant before the move; en passant is the one capture onto an empty square.
    pub fn is_capture(&self) -> bool {
        match self.before.board().piece_at(self.mv.to()) {
            Some(victim) => victim.color != self.mover,
            None => self.mv.is_en_passant(),
        }
    }

    pub fn gives_check(&self) -> bool {
        self.after.is_check()
    }
}

/// Locate the king of `color` by scanning the board.
pub fn king_square(board: &Board, color: Color) -> Option<Square> {
    let king = Piece {
        color,
        role: Role::King,
    };
    board
        .occupied()
        .into_iter()
        .find(|&sq| board.piece_at(sq) == Some(king))
}
