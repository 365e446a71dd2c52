// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Move legality, check detection and the "king has no escape" test.
//!
//! Legality here is geometric: a move is legal when the piece can reach the
//! destination by its own movement rules and the destination does not hold a
//! friendly piece. Whether the move exposes the mover's own king is not
//! checked, and neither is castling out of or through check.
//!
//! The same per-piece rules also run in *attack mode*, which answers "could
//! this piece capture on that square" without regard to whose turn it is.
//! Attack mode drives check detection.
use std::error::Error;
use std::fmt;
use std::ops::Deref;

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::moves::Move;
use crate::types::{CastleStatus, Color, Piece, PieceKind, Square};

pub type SquareVec = ArrayVec<[Square; 64]>;

/// Column the kings start on.
const KING_HOME_COL: usize = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Is this a legal move for the side to move?
    Legal,
    /// Could the piece capture on the target square?
    Attack,
}

/// The secondary effect a validated move carries. The board changes it
/// describes are applied by `special::resolve` once the primary move has been
/// made.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Special {
    None,
    /// The king moved two files; the rook moves alongside it.
    Castle { rook: Move },
    /// The capturing pawn lands behind `pawn`, which is removed from `square`.
    EnPassant { pawn: Piece, square: Square },
    /// The pawn reached the far rank and must be exchanged.
    Promotion { pawn: Piece },
}

/// A move that passed validation, together with everything needed to commit
/// it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ValidatedMove {
    pub mv: Move,
    pub captured: Option<Piece>,
    pub special: Special,
}

/// Reasons a move can be rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IllegalMove {
    SameSquare(Square),
    EmptySource(Square),
    WrongColor(Square),
    OwnPieceOnTarget(Square),
    Unreachable(Move),
}

impl fmt::Display for IllegalMove {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IllegalMove::SameSquare(sq) => write!(f, "{} is both source and destination", sq),
            IllegalMove::EmptySource(sq) => write!(f, "there is no piece on {}", sq),
            IllegalMove::WrongColor(sq) => write!(f, "the piece on {} is not yours", sq),
            IllegalMove::OwnPieceOnTarget(sq) => write!(f, "{} holds one of your pieces", sq),
            IllegalMove::Unreachable(mv) => write!(
                f,
                "a {} cannot move from {} to {}",
                mv.piece.kind.name(),
                mv.from,
                mv.to
            ),
        }
    }
}

impl Error for IllegalMove {}

/// Validates moves against a board. `last_move` is the primary move of the
/// previous ply, which en passant depends on.
pub struct Validator<'a> {
    board: &'a Board,
    castling: CastleStatus,
    last_move: Option<Move>,
}

impl<'a> Validator<'a> {
    pub fn new(board: &'a Board, castling: CastleStatus, last_move: Option<Move>) -> Validator<'a> {
        Validator {
            board,
            castling,
            last_move,
        }
    }

    /// Checks whether `mover` may move the piece on `from` to `to`.
    pub fn try_move(
        &self,
        from: Square,
        to: Square,
        mover: Color,
    ) -> Result<ValidatedMove, IllegalMove> {
        if from == to {
            return Err(IllegalMove::SameSquare(from));
        }

        let piece = match self.board.piece_at(from) {
            Some(piece) => piece,
            None => return Err(IllegalMove::EmptySource(from)),
        };

        if piece.color != mover {
            return Err(IllegalMove::WrongColor(from));
        }

        let captured = self.board.piece_at(to);
        if let Some(target) = captured {
            if target.color == mover {
                return Err(IllegalMove::OwnPieceOnTarget(to));
            }
        }

        let mv = Move::new(piece, from, to);
        let special = match piece.kind {
            PieceKind::Pawn => self.pawn_move(mv),
            PieceKind::King => self.king_move(mv),
            PieceKind::Rook | PieceKind::Knight | PieceKind::Bishop | PieceKind::Queen => {
                if reaches(self.board, mv) {
                    Some(Special::None)
                } else {
                    None
                }
            }
        };

        match special {
            Some(special) => Ok(ValidatedMove {
                mv,
                captured,
                special,
            }),
            None => Err(IllegalMove::Unreachable(mv)),
        }
    }

    /// Every square the piece on `from` may legally move to.
    pub fn destinations(&self, from: Square) -> SquareVec {
        let mut squares = SquareVec::new();
        let mover = match self.board.piece_at(from) {
            Some(piece) => piece.color,
            None => return squares,
        };

        for to in Square::all() {
            if self.try_move(from, to, mover).is_ok() {
                squares.push(to);
            }
        }

        squares
    }

    fn pawn_move(&self, mv: Move) -> Option<Special> {
        let color = mv.piece.color;
        let dir = color.pawn_direction();
        let (drow, dcol) = (mv.row_delta(), mv.col_delta());
        let target = self.board.piece_at(mv.to);
        let arrival = if mv.to.row() == color.promotion_row() {
            Special::Promotion { pawn: mv.piece }
        } else {
            Special::None
        };

        if dcol == 0 && target.is_none() {
            if drow == dir {
                return Some(arrival);
            }

            if drow == 2 * dir && mv.from.row() == color.pawn_row() {
                let skipped = mv.from.offset(dir, 0)?;
                if self.board.is_empty(skipped) {
                    return Some(Special::None);
                }
            }

            return None;
        }

        if dcol.abs() != 1 || drow != dir {
            return None;
        }

        if target.is_some() {
            return Some(arrival);
        }

        // En passant: the previous ply must have been an enemy pawn's double
        // step that landed beside this pawn, on the file being moved to.
        let last = self.last_move?;
        if last.piece.kind == PieceKind::Pawn
            && last.piece.color != color
            && last.row_delta().abs() == 2
            && last.to.row() == mv.from.row()
            && last.to.col() == mv.to.col()
        {
            return Some(Special::EnPassant {
                pawn: last.piece,
                square: last.to,
            });
        }

        None
    }

    fn king_move(&self, mv: Move) -> Option<Special> {
        if let Some(rook) = self.castle_rook(mv) {
            return Some(Special::Castle { rook });
        }

        if is_king_step(mv) {
            Some(Special::None)
        } else {
            None
        }
    }

    /// If `mv` is a castling move that is currently allowed, the rook move
    /// that goes with it.
    fn castle_rook(&self, mv: Move) -> Option<Move> {
        let color = mv.piece.color;
        let row = color.back_row();
        let dcol = mv.col_delta();
        if mv.from != Square::new(row, KING_HOME_COL)? || mv.to.row() != row || dcol.abs() != 2 {
            return None;
        }

        // The king-side rook carries ordinal 1 and the queen-side rook 0.
        let (rook_col, ordinal, right, rook_to) = if dcol > 0 {
            (7, 1, CastleStatus::kingside(color), mv.to.offset(0, -1)?)
        } else {
            (0, 0, CastleStatus::queenside(color), mv.to.offset(0, 1)?)
        };

        if !self.castling.contains(right) {
            return None;
        }

        let rook_from = Square::new(row, rook_col)?;
        let rook = self.board.piece_at(rook_from)?;
        if rook.kind != PieceKind::Rook || rook.color != color || rook.ordinal != ordinal {
            return None;
        }

        if !path_is_clear(self.board, mv.from, rook_from) {
            return None;
        }

        Some(Move::new(rook, rook_from, rook_to))
    }
}

/// Whether `mv` follows the movement geometry of its piece for the line
/// movers and the knight, with every intermediate square empty.
fn reaches(board: &Board, mv: Move) -> bool {
    match mv.piece.kind {
        PieceKind::Rook => is_straight(mv) && path_is_clear(board, mv.from, mv.to),
        PieceKind::Bishop => is_diagonal(mv) && path_is_clear(board, mv.from, mv.to),
        PieceKind::Queen => {
            (is_straight(mv) || is_diagonal(mv)) && path_is_clear(board, mv.from, mv.to)
        }
        PieceKind::Knight => {
            let (drow, dcol) = (mv.row_delta().abs(), mv.col_delta().abs());
            (drow == 2 && dcol == 1) || (drow == 1 && dcol == 2)
        }
        PieceKind::King => is_king_step(mv),
        PieceKind::Pawn => {
            mv.row_delta() == mv.piece.color.pawn_direction() && mv.col_delta().abs() == 1
        }
    }
}

fn is_straight(mv: Move) -> bool {
    (mv.row_delta() == 0) != (mv.col_delta() == 0)
}

fn is_diagonal(mv: Move) -> bool {
    mv.row_delta() != 0 && mv.row_delta().abs() == mv.col_delta().abs()
}

fn is_king_step(mv: Move) -> bool {
    let (drow, dcol) = (mv.row_delta().abs(), mv.col_delta().abs());
    drow <= 1 && dcol <= 1 && drow + dcol > 0
}

/// Walks the straight or diagonal line between `from` and `to`, exclusive of
/// both ends, and reports whether every square on it is empty.
fn path_is_clear(board: &Board, from: Square, to: Square) -> bool {
    let drow = (to.row() as i32 - from.row() as i32).signum();
    let dcol = (to.col() as i32 - from.col() as i32).signum();
    let mut current = from;
    loop {
        current = match current.offset(drow, dcol) {
            Some(sq) => sq,
            None => return false,
        };

        if current == to {
            return true;
        }

        if !board.is_empty(current) {
            return false;
        }
    }
}

/// Attack mode: whether the piece on `from` could capture on `to`. Pawns
/// attack their forward diagonals whether or not anything stands there, and
/// pieces never attack squares held by their own side.
pub fn attacks(board: &Board, from: Square, to: Square) -> bool {
    if from == to {
        return false;
    }

    let piece = match board.piece_at(from) {
        Some(piece) => piece,
        None => return false,
    };

    if let Some(target) = board.piece_at(to) {
        if target.color == piece.color {
            return false;
        }
    }

    reaches(board, Move::new(piece, from, to))
}

/// Attack mode over the whole board: every square the piece on `from` attacks.
pub fn attacked_squares(board: &Board, from: Square) -> SquareVec {
    Square::all().filter(|&to| attacks(board, from, to)).collect()
}

/// Whether any piece of `attacker` could capture on `square`.
pub fn is_attacked(board: &Board, square: Square, attacker: Color) -> bool {
    board
        .pieces()
        .any(|(from, piece)| piece.color == attacker && attacks(board, from, square))
}

/// Whether the king of `color` is attacked. A missing king counts as check.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    match board.find_king(color) {
        Some(king) => is_attacked(board, king, color.toggle()),
        None => true,
    }
}

/// Whether the king of `color` has no square to step to that is free from
/// attack. Only king moves are considered: blocking the check or capturing
/// the checking piece with another piece does not count as an escape. A
/// missing king has no escape.
///
/// Each candidate square is tried by moving the king there on `board`; the
/// board is put back before the next candidate and before returning.
pub fn has_no_escape(board: &mut Board, color: Color) -> bool {
    let king = match board.find_king(color) {
        Some(king) => king,
        None => return true,
    };

    let candidates = attacked_squares(board, king);
    candidates.iter().all(|&to| {
        let trial = Relocation::new(&mut *board, king, to);
        trial.is_attacked_by(to, color.toggle())
    })
}

/// Temporarily moves a piece on a board. The board is restored when the
/// relocation is dropped.
struct Relocation<'a> {
    board: &'a mut Board,
    from: Square,
    to: Square,
    displaced: Option<Piece>,
}

impl<'a> Relocation<'a> {
    fn new(board: &'a mut Board, from: Square, to: Square) -> Relocation<'a> {
        let moving = board.clear(from);
        let displaced = board.piece_at(to);
        board.set(to, moving);
        Relocation {
            board,
            from,
            to,
            displaced,
        }
    }

    fn is_attacked_by(&self, square: Square, attacker: Color) -> bool {
        is_attacked(self, square, attacker)
    }
}

impl<'a> Deref for Relocation<'a> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl<'a> Drop for Relocation<'a> {
    fn drop(&mut self) {
        let moving = self.board.piece_at(self.to);
        self.board.set(self.from, moving);
        self.board.set(self.to, self.displaced);
    }
}
