// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::error::Error;
use std::fmt;

use crate::types::{Color, Piece, PieceKind, Square, BOARD_SIZE};
use crate::types::{FILES, RANKS};

/// Piece placement of the standard starting position.
pub const START_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// Possible errors that can arise when parsing a piece placement string into
/// a `Board`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlacementError {
    UnexpectedChar(char),
    UnexpectedEnd,
    InvalidDigit,
    FileDoesNotSumToEight,
    UnknownPiece,
    TrailingInput,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlacementError::UnexpectedChar(c) => write!(f, "unexpected character '{}'", c),
            PlacementError::UnexpectedEnd => write!(f, "unexpected end of placement"),
            PlacementError::InvalidDigit => write!(f, "invalid empty-square count"),
            PlacementError::FileDoesNotSumToEight => write!(f, "rank does not sum to eight"),
            PlacementError::UnknownPiece => write!(f, "unknown piece"),
            PlacementError::TrailingInput => write!(f, "trailing input after placement"),
        }
    }
}

impl Error for PlacementError {}

/// The 8x8 grid of pieces. This is a plain container: it places and removes
/// pieces wherever it is told to and leaves all rule checking to `rules`.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn empty() -> Board {
        Board {
            squares: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// The standard starting position.
    pub fn standard() -> Board {
        Board::from_placement(START_PLACEMENT).unwrap()
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.row()][square.col()]
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    /// Puts `piece` on `square`, returning whatever stood there before.
    pub fn place(&mut self, square: Square, piece: Piece) -> Option<Piece> {
        self.squares[square.row()][square.col()].replace(piece)
    }

    /// Empties `square`, returning the piece that stood there.
    pub fn clear(&mut self, square: Square) -> Option<Piece> {
        self.squares[square.row()][square.col()].take()
    }

    /// Overwrites `square` with `contents`, empty or not.
    pub fn set(&mut self, square: Square, contents: Option<Piece>) {
        self.squares[square.row()][square.col()] = contents;
    }

    /// Locates the king of the given color. `None` means the king is gone,
    /// which callers treat as a lost game.
    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|&(_, piece)| piece.kind == PieceKind::King && piece.color == color)
            .map(|(square, _)| square)
    }

    /// Number of pieces of the given kind and color on the board.
    pub fn count(&self, kind: PieceKind, color: Color) -> usize {
        self.pieces()
            .filter(|&(_, piece)| piece.kind == kind && piece.color == color)
            .count()
    }

    /// Iterates over every occupied square, a1 through h8.
    pub fn pieces<'a>(&'a self) -> impl Iterator<Item = (Square, Piece)> + 'a {
        Square::all().filter_map(move |sq| self.piece_at(sq).map(|piece| (sq, piece)))
    }

    /// Parses the piece placement field of a FEN string. A rook on one of its
    /// own back-rank corners takes that corner's ordinal (0 on the a-file, 1 on
    /// the h-file); every other piece takes the lowest ordinal still free for
    /// its kind and color, in a1..h8 order. This reproduces the ordinals of
    /// the standard setup.
    pub fn from_placement<S: AsRef<str>>(placement: S) -> Result<Board, PlacementError> {
        use std::iter::Peekable;
        use std::str::Chars;

        type Stream<'a> = Peekable<Chars<'a>>;

        fn eat<'a>(iter: &mut Stream<'a>, expected: char) -> Result<(), PlacementError> {
            match iter.next() {
                Some(c) if c == expected => Ok(()),
                Some(c) => Err(PlacementError::UnexpectedChar(c)),
                None => Err(PlacementError::UnexpectedEnd),
            }
        }

        fn peek<'a>(iter: &mut Stream<'a>) -> Result<char, PlacementError> {
            if let Some(c) = iter.peek() {
                Ok(*c)
            } else {
                Err(PlacementError::UnexpectedEnd)
            }
        }

        let mut placed = Vec::new();
        let iter = &mut placement.as_ref().chars().peekable();
        for (rank_idx, &rank) in RANKS.iter().enumerate().rev() {
            let mut file = 0;
            while file < FILES.len() {
                let c = peek(iter)?;
                // digits 1 through 8 indicate empty squares.
                if c.is_digit(10) {
                    if c < '1' || c > '8' {
                        return Err(PlacementError::InvalidDigit);
                    }

                    file += c as usize - '0' as usize;
                    if file > FILES.len() {
                        return Err(PlacementError::FileDoesNotSumToEight);
                    }

                    iter.next();
                    continue;
                }

                let (kind, color) = piece_from_char(c).ok_or(PlacementError::UnknownPiece)?;
                placed.push((Square::of(rank, FILES[file]), kind, color));
                iter.next();
                file += 1;
            }

            if rank_idx != 0 {
                eat(iter, '/')?;
            }
        }

        if iter.next().is_some() {
            return Err(PlacementError::TrailingInput);
        }

        let mut board = Board::empty();
        placed.sort_by_key(|&(sq, _, _)| (sq.row(), sq.col()));
        for &(square, kind, color) in &placed {
            if let Some(ordinal) = corner_rook_ordinal(square, kind, color) {
                board.place(square, Piece::new(kind, color, ordinal));
            }
        }

        for &(square, kind, color) in &placed {
            if corner_rook_ordinal(square, kind, color).is_none() {
                let ordinal = board.free_ordinal(kind, color);
                board.place(square, Piece::new(kind, color, ordinal));
            }
        }

        Ok(board)
    }

    fn free_ordinal(&self, kind: PieceKind, color: Color) -> u8 {
        let mut ordinal = 0;
        while self
            .pieces()
            .any(|(_, p)| p.kind == kind && p.color == color && p.ordinal == ordinal)
        {
            ordinal += 1;
        }

        ordinal
    }
}

/// The ordinal a rook carries on its home corner: 0 queen-side, 1 king-side.
fn corner_rook_ordinal(square: Square, kind: PieceKind, color: Color) -> Option<u8> {
    if kind != PieceKind::Rook || square.row() != color.back_row() {
        return None;
    }

    match square.col() {
        0 => Some(0),
        7 => Some(1),
        _ => None,
    }
}

fn piece_from_char(c: char) -> Option<(PieceKind, Color)> {
    let kind = match c.to_ascii_lowercase() {
        'p' => PieceKind::Pawn,
        'n' => PieceKind::Knight,
        'b' => PieceKind::Bishop,
        'r' => PieceKind::Rook,
        'q' => PieceKind::Queen,
        'k' => PieceKind::King,
        _ => return None,
    };

    let color = if c.is_ascii_uppercase() {
        Color::White
    } else {
        Color::Black
    };

    Some((kind, color))
}

impl Default for Board {
    fn default() -> Self {
        Board::standard()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &rank in RANKS.iter().rev() {
            for &file in &FILES {
                let sq = Square::of(rank, file);
                if let Some(piece) = self.piece_at(sq) {
                    write!(f, " {} ", piece)?;
                } else {
                    write!(f, " . ")?;
                }
            }

            writeln!(f, "| {}", rank)?;
        }

        for _ in &FILES {
            write!(f, "---")?;
        }

        writeln!(f)?;
        for &file in &FILES {
            write!(f, " {} ", file)?;
        }

        writeln!(f)?;
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f)?;
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::{Board, PlacementError};
    use crate::types::{Color, Piece, PieceKind, Square};

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn standard_setup_ordinals() {
        let board = Board::standard();
        assert_eq!(
            Some(Piece::new(PieceKind::Rook, Color::White, 0)),
            board.piece_at(sq("a1"))
        );
        assert_eq!(
            Some(Piece::new(PieceKind::Rook, Color::White, 1)),
            board.piece_at(sq("h1"))
        );
        assert_eq!(
            Some(Piece::new(PieceKind::Knight, Color::Black, 1)),
            board.piece_at(sq("g8"))
        );
        assert_eq!(
            Some(Piece::new(PieceKind::Pawn, Color::Black, 4)),
            board.piece_at(sq("e7"))
        );
        assert_eq!(
            Some(Piece::new(PieceKind::Queen, Color::White, 0)),
            board.piece_at(sq("d1"))
        );
        assert_eq!(32, board.pieces().count());
    }

    #[test]
    fn corner_rooks_keep_home_ordinals() {
        // a lone king-side rook is still the king-side rook
        let board = Board::from_placement("4k3/8/8/8/8/8/8/4K2R").unwrap();
        assert_eq!(
            Some(Piece::new(PieceKind::Rook, Color::White, 1)),
            board.piece_at(sq("h1"))
        );

        // rooks off their corners number around the corner rooks
        let board = Board::from_placement("r3k3/8/8/8/8/8/8/R2RK2R").unwrap();
        assert_eq!(0, board.piece_at(sq("a1")).unwrap().ordinal);
        assert_eq!(2, board.piece_at(sq("d1")).unwrap().ordinal);
        assert_eq!(1, board.piece_at(sq("h1")).unwrap().ordinal);
        assert_eq!(0, board.piece_at(sq("a8")).unwrap().ordinal);

        // a white rook on h8 is not on its own back rank
        let board = Board::from_placement("4k2R/8/8/8/8/8/8/4K3").unwrap();
        assert_eq!(0, board.piece_at(sq("h8")).unwrap().ordinal);
    }

    #[test]
    fn find_king_and_missing_king() {
        let board = Board::standard();
        assert_eq!(Some(sq("e1")), board.find_king(Color::White));
        assert_eq!(Some(sq("e8")), board.find_king(Color::Black));

        let lonely = Board::from_placement("8/8/8/8/8/8/8/4K3").unwrap();
        assert_eq!(None, lonely.find_king(Color::Black));
    }

    #[test]
    fn place_and_clear() {
        let mut board = Board::empty();
        let queen = Piece::new(PieceKind::Queen, Color::Black, 0);
        assert_eq!(None, board.place(sq("d4"), queen));
        assert_eq!(1, board.count(PieceKind::Queen, Color::Black));
        assert_eq!(Some(queen), board.clear(sq("d4")));
        assert!(board.is_empty(sq("d4")));
        assert_eq!(None, board.clear(sq("d4")));
    }

    #[test]
    fn placement_errors() {
        assert_eq!(
            Err(PlacementError::UnexpectedEnd),
            Board::from_placement("")
        );
        assert_eq!(
            Err(PlacementError::UnknownPiece),
            Board::from_placement("z7/8/8/8/8/8/8/8")
        );
        assert_eq!(
            Err(PlacementError::InvalidDigit),
            Board::from_placement("9/8/8/8/8/8/8/8")
        );
        assert_eq!(
            Err(PlacementError::FileDoesNotSumToEight),
            Board::from_placement("pppp5/8/8/8/8/8/8/8")
        );
        assert_eq!(
            Err(PlacementError::TrailingInput),
            Board::from_placement("8/8/8/8/8/8/8/8 w")
        );
    }

    #[test]
    fn display_renders_ranks_top_down() {
        let text = Board::standard().to_string();
        let first = text.lines().next().unwrap();
        assert!(first.starts_with(" r  n  b  q  k  b  n  r "));
        assert!(first.ends_with("| 8"));
    }
}
