// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The record of committed plies, which doubles as the feed a presentation
//! layer animates from and as the move list sent to the engine.
use std::fmt;
use std::slice;

use crate::moves::{Move, MoveToken};
use crate::types::{Color, Piece, PieceKind, Square, BOARD_SIZE};

/// A presentation position. Board squares map to slots with the same row and
/// column; captured pieces rest on slots above and below the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Slot {
    pub row: i8,
    pub col: i8,
}

impl Slot {
    pub fn new(row: i8, col: i8) -> Slot {
        Slot { row, col }
    }

    pub fn is_on_board(self) -> bool {
        self.square().is_some()
    }

    /// The board square this slot covers, if any.
    pub fn square(self) -> Option<Square> {
        if self.row < 0 || self.col < 0 {
            return None;
        }

        Square::new(self.row as usize, self.col as usize)
    }
}

impl From<Square> for Slot {
    fn from(sq: Square) -> Slot {
        Slot::new(sq.row() as i8, sq.col() as i8)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Where a captured piece comes to rest. White's casualties line up below
/// rank 1 and Black's above rank 8, pawns on the row nearest the board.
pub fn rest_slot(piece: Piece) -> Slot {
    let size = BOARD_SIZE as i8;
    let ordinal = piece.ordinal as i8;
    let back = match piece.color {
        Color::White => -3,
        Color::Black => size + 2,
    };

    match piece.kind {
        PieceKind::Pawn => {
            let row = match piece.color {
                Color::White => -2,
                Color::Black => size + 1,
            };
            Slot::new(row, ordinal)
        }
        PieceKind::Rook => Slot::new(back, (size - 1) * ordinal),
        PieceKind::Knight => Slot::new(back, (size - 2) * ordinal),
        PieceKind::Bishop => Slot::new(back, (size - 3) * ordinal),
        PieceKind::Queen => Slot::new(back, 3 * (ordinal + 1)),
        PieceKind::King => Slot::new(back, 4 * (ordinal + 1)),
    }
}

/// A piece leaving a board square as a side effect of a ply: the castling
/// rook, or a captured piece on its way to its resting slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Displacement {
    pub piece: Piece,
    pub from: Square,
    pub to: Slot,
}

impl Displacement {
    pub fn capture(piece: Piece, square: Square) -> Displacement {
        Displacement {
            piece,
            from: square,
            to: rest_slot(piece),
        }
    }

    pub fn rook(rook: Move) -> Displacement {
        Displacement {
            piece: rook.piece,
            from: rook.from,
            to: rook.to.into(),
        }
    }
}

/// One piece animation, in presentation coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Motion {
    pub piece: Piece,
    pub from: Slot,
    pub to: Slot,
}

/// A committed half-move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ply {
    pub primary: Move,
    pub secondary: Option<Displacement>,
    pub promotion: Option<PieceKind>,
}

impl Ply {
    pub fn new(primary: Move) -> Ply {
        Ply {
            primary,
            secondary: None,
            promotion: None,
        }
    }

    /// The motions to animate, primary first.
    pub fn motions(&self) -> impl Iterator<Item = Motion> {
        let primary = Motion {
            piece: self.primary.piece,
            from: self.primary.from.into(),
            to: self.primary.to.into(),
        };

        let secondary = self.secondary.map(|d| Motion {
            piece: d.piece,
            from: d.from.into(),
            to: d.to,
        });

        Some(primary).into_iter().chain(secondary)
    }

    /// The ply in coordinate notation, with the promotion letter if any.
    pub fn token(&self) -> MoveToken {
        MoveToken {
            from: self.primary.from,
            to: self.primary.to,
            promotion: self.promotion,
        }
    }
}

impl fmt::Display for Ply {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.primary.piece.color,
            self.primary.piece.kind.name(),
            self.token()
        )?;

        if let Some(d) = self.secondary {
            match d.to.square() {
                Some(to) => write!(f, ", {} {}{}", d.piece.kind.name(), d.from, to)?,
                None => write!(f, ", captures {} on {}", d.piece.kind.name(), d.from)?,
            }
        }

        Ok(())
    }
}

/// Append-only list of committed plies.
#[derive(Clone, Debug, Default)]
pub struct History {
    plies: Vec<Ply>,
}

impl History {
    pub fn new() -> History {
        History::default()
    }

    /// Appends a ply and hands back the recorded copy.
    pub fn push(&mut self, ply: Ply) -> &Ply {
        self.plies.push(ply);
        &self.plies[self.plies.len() - 1]
    }

    /// The most recent ply. `None` on an empty history.
    pub fn last(&self) -> Option<&Ply> {
        self.plies.last()
    }

    pub fn len(&self) -> usize {
        self.plies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plies.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<Ply> {
        self.plies.iter()
    }

    /// Every ply in order, in the notation the engine expects.
    pub fn tokens(&self) -> Vec<String> {
        self.plies.iter().map(|ply| ply.token().to_string()).collect()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Ply;
    type IntoIter = slice::Iter<'a, Ply>;

    fn into_iter(self) -> slice::Iter<'a, Ply> {
        self.plies.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{rest_slot, Displacement, History, Ply, Slot};
    use crate::moves::Move;
    use crate::types::{Color, Piece, PieceKind, Square};

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn resting_slots() {
        let white_pawn = Piece::new(PieceKind::Pawn, Color::White, 5);
        assert_eq!(Slot::new(-2, 5), rest_slot(white_pawn));

        let black_pawn = Piece::new(PieceKind::Pawn, Color::Black, 0);
        assert_eq!(Slot::new(9, 0), rest_slot(black_pawn));

        let rook = Piece::new(PieceKind::Rook, Color::Black, 1);
        assert_eq!(Slot::new(10, 7), rest_slot(rook));

        let knight = Piece::new(PieceKind::Knight, Color::White, 1);
        assert_eq!(Slot::new(-3, 6), rest_slot(knight));

        let bishop = Piece::new(PieceKind::Bishop, Color::White, 1);
        assert_eq!(Slot::new(-3, 5), rest_slot(bishop));

        let queen = Piece::new(PieceKind::Queen, Color::White, 0);
        assert_eq!(Slot::new(-3, 3), rest_slot(queen));

        let king = Piece::new(PieceKind::King, Color::Black, 0);
        assert_eq!(Slot::new(10, 4), rest_slot(king));
        assert!(!rest_slot(king).is_on_board());
    }

    #[test]
    fn empty_history_has_no_last() {
        let history = History::new();
        assert!(history.last().is_none());
        assert!(history.tokens().is_empty());
    }

    #[test]
    fn tokens_carry_promotion_letter() {
        let pawn = Piece::new(PieceKind::Pawn, Color::White, 0);
        let mut history = History::new();
        history.push(Ply::new(Move::new(pawn, sq("a2"), sq("a4"))));
        let mut promoting = Ply::new(Move::new(pawn, sq("a7"), sq("a8")));
        promoting.promotion = Some(PieceKind::Knight);
        history.push(promoting);
        assert_eq!(vec!["a2a4", "a7a8n"], history.tokens());
        assert_eq!(Some(&promoting), history.last());
    }

    #[test]
    fn capture_motions() {
        let rook = Piece::new(PieceKind::Rook, Color::White, 0);
        let knight = Piece::new(PieceKind::Knight, Color::Black, 0);
        let mut ply = Ply::new(Move::new(rook, sq("a1"), sq("a5")));
        ply.secondary = Some(Displacement::capture(knight, sq("a5")));

        let motions: Vec<_> = ply.motions().collect();
        assert_eq!(2, motions.len());
        assert_eq!(rook, motions[0].piece);
        assert_eq!(Slot::new(0, 0), motions[0].from);
        assert_eq!(Slot::new(4, 0), motions[0].to);
        assert_eq!(knight, motions[1].piece);
        assert_eq!(Slot::new(4, 0), motions[1].from);
        assert_eq!(Slot::new(10, 0), motions[1].to);
    }
}
