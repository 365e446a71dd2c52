// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use num_traits::{FromPrimitive, ToPrimitive};
use std::convert::TryFrom;
use std::fmt::{self, Display, Write};

/// Number of rows and columns on the board.
pub const BOARD_SIZE: usize = 8;

// TableIndex is a trait for all types that can serve as an index into a table.
// Ranks and files index rows and columns of the board, so this trait allows
// any type implementing To and FromPrimitive to be used as table indices.
pub trait TableIndex {
    fn as_index(self) -> usize;
    fn from_index(idx: usize) -> Self;
}

impl<T> TableIndex for T
where
    T: FromPrimitive + ToPrimitive,
{
    fn as_index(self) -> usize {
        self.to_u32().unwrap() as usize
    }

    fn from_index(idx: usize) -> T {
        <T as FromPrimitive>::from_u64(idx as u64).unwrap()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, FromPrimitive, ToPrimitive)]
pub enum Rank {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
}

impl Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let chr = match self {
            Rank::One => '1',
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
        };
        f.write_char(chr)
    }
}

impl TryFrom<char> for Rank {
    type Error = ();

    fn try_from(value: char) -> Result<Self, Self::Error> {
        let res = match value {
            '1' => Rank::One,
            '2' => Rank::Two,
            '3' => Rank::Three,
            '4' => Rank::Four,
            '5' => Rank::Five,
            '6' => Rank::Six,
            '7' => Rank::Seven,
            '8' => Rank::Eight,
            _ => return Err(()),
        };
        Ok(res)
    }
}

pub static RANKS: [Rank; 8] = [
    Rank::One,
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, FromPrimitive, ToPrimitive)]
pub enum File {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl Display for File {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let chr = match self {
            File::A => 'a',
            File::B => 'b',
            File::C => 'c',
            File::D => 'd',
            File::E => 'e',
            File::F => 'f',
            File::G => 'g',
            File::H => 'h',
        };
        f.write_char(chr)
    }
}

impl TryFrom<char> for File {
    type Error = ();

    fn try_from(value: char) -> Result<Self, Self::Error> {
        let res = match value {
            'a' => File::A,
            'b' => File::B,
            'c' => File::C,
            'd' => File::D,
            'e' => File::E,
            'f' => File::F,
            'g' => File::G,
            'h' => File::H,
            _ => return Err(()),
        };
        Ok(res)
    }
}

pub static FILES: [File; 8] = [
    File::A,
    File::B,
    File::C,
    File::D,
    File::E,
    File::F,
    File::G,
    File::H,
];

/// A square on the board, addressed by zero-based row (rank) and column (file).
/// Row 0 is White's back rank and column 0 is the a-file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    pub fn new(row: usize, col: usize) -> Option<Square> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Square {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    pub fn of(rank: Rank, file: File) -> Square {
        Square {
            row: rank.as_index() as u8,
            col: file.as_index() as u8,
        }
    }

    pub fn row(self) -> usize {
        self.row as usize
    }

    pub fn col(self) -> usize {
        self.col as usize
    }

    pub fn rank(self) -> Rank {
        Rank::from_index(self.row())
    }

    pub fn file(self) -> File {
        File::from_index(self.col())
    }

    /// The square `drow` rows and `dcol` columns away, if it is on the board.
    pub fn offset(self, drow: i32, dcol: i32) -> Option<Square> {
        let row = self.row as i32 + drow;
        let col = self.col as i32 + dcol;
        if row < 0 || col < 0 {
            return None;
        }

        Square::new(row as usize, col as usize)
    }

    /// Iterates over all 64 squares, a1 through h8 in row-major order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE * BOARD_SIZE).map(|idx| Square {
            row: (idx / BOARD_SIZE) as u8,
            col: (idx % BOARD_SIZE) as u8,
        })
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn toggle(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Direction pawns of this color advance in, in rows.
    pub fn pawn_direction(self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Row holding this color's king and rooks at setup.
    pub fn back_row(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => BOARD_SIZE - 1,
        }
    }

    /// Row this color's pawns start on.
    pub fn pawn_row(self) -> usize {
        match self {
            Color::White => 1,
            Color::Black => BOARD_SIZE - 2,
        }
    }

    /// Row on which this color's pawns promote.
    pub fn promotion_row(self) -> usize {
        self.toggle().back_row()
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Color::White => f.write_str("White"),
            Color::Black => f.write_str("Black"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    King,
    Queen,
}

impl PieceKind {
    pub fn name(self) -> &'static str {
        match self {
            PieceKind::Pawn => "pawn",
            PieceKind::Rook => "rook",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::King => "king",
            PieceKind::Queen => "queen",
        }
    }
}

impl Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let chr = match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        f.write_char(chr)
    }
}

impl TryFrom<char> for PieceKind {
    type Error = ();

    fn try_from(c: char) -> Result<Self, Self::Error> {
        let res = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return Err(()),
        };
        Ok(res)
    }
}

bitflags! {
    pub struct CastleStatus: u8 {
        const NONE = 0;
        const WHITE_KINGSIDE = 0b0000_0001;
        const WHITE_QUEENSIDE =0b0000_0010;
        const WHITE = Self::WHITE_KINGSIDE.bits | Self::WHITE_QUEENSIDE.bits;
        const BLACK_KINGSIDE = 0b0000_0100;
        const BLACK_QUEENSIDE = 0b0000_1000;
        const BLACK = Self::BLACK_KINGSIDE.bits | Self::BLACK_QUEENSIDE.bits;
    }
}

impl CastleStatus {
    pub fn kingside(color: Color) -> CastleStatus {
        match color {
            Color::White => CastleStatus::WHITE_KINGSIDE,
            Color::Black => CastleStatus::BLACK_KINGSIDE,
        }
    }

    pub fn queenside(color: Color) -> CastleStatus {
        match color {
            Color::White => CastleStatus::WHITE_QUEENSIDE,
            Color::Black => CastleStatus::BLACK_QUEENSIDE,
        }
    }

    pub fn both(color: Color) -> CastleStatus {
        match color {
            Color::White => CastleStatus::WHITE,
            Color::Black => CastleStatus::BLACK,
        }
    }
}

/// A piece on the board. `ordinal` tells apart pieces of the same kind and
/// color (the queen-side rook is 0, the king-side rook is 1, pawns are
/// numbered by their starting file) so that presentation layers can keep a
/// stable identity for each piece.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub ordinal: u8,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color, ordinal: u8) -> Piece {
        Piece {
            kind,
            color,
            ordinal,
        }
    }

    /// Stable presentation identity, e.g. `white-rook-2`.
    pub fn identity(&self) -> String {
        let color = match self.color {
            Color::White => "white",
            Color::Black => "black",
        };
        format!("{}-{}-{}", color, self.kind.name(), self.ordinal as u32 + 1)
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let chr = match self.kind {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };

        match self.color {
            Color::White => f.write_char(chr.to_ascii_uppercase()),
            Color::Black => f.write_char(chr),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use super::{Color, File, Piece, PieceKind, Rank, Square};

    #[test]
    fn square_display_matches_notation() {
        let sq = Square::of(Rank::Four, File::E);
        assert_eq!(3, sq.row());
        assert_eq!(4, sq.col());
        assert_eq!("e4", sq.to_string());
    }

    #[test]
    fn square_offset_stays_on_board() {
        let a1 = Square::new(0, 0).unwrap();
        assert!(a1.offset(-1, 0).is_none());
        assert!(a1.offset(0, -1).is_none());
        assert_eq!(Square::new(2, 1), a1.offset(2, 1));
        assert!(Square::new(7, 7).unwrap().offset(1, 0).is_none());
        assert!(Square::new(8, 0).is_none());
    }

    #[test]
    fn all_squares_in_row_major_order() {
        let squares: Vec<_> = Square::all().collect();
        assert_eq!(64, squares.len());
        assert_eq!("a1", squares[0].to_string());
        assert_eq!("h1", squares[7].to_string());
        assert_eq!("a2", squares[8].to_string());
        assert_eq!("h8", squares[63].to_string());
    }

    #[test]
    fn piece_display_and_identity() {
        let rook = Piece::new(PieceKind::Rook, Color::White, 1);
        assert_eq!("R", rook.to_string());
        assert_eq!("white-rook-2", rook.identity());

        let pawn = Piece::new(PieceKind::Pawn, Color::Black, 0);
        assert_eq!("p", pawn.to_string());
        assert_eq!("black-pawn-1", pawn.identity());
    }

    #[test]
    fn piece_kind_from_letter() {
        assert_eq!(Ok(PieceKind::Queen), PieceKind::try_from('Q'));
        assert_eq!(Ok(PieceKind::Knight), PieceKind::try_from('n'));
        assert!(PieceKind::try_from('x').is_err());
    }

    #[test]
    fn color_rows() {
        assert_eq!(0, Color::White.back_row());
        assert_eq!(7, Color::Black.back_row());
        assert_eq!(1, Color::White.pawn_row());
        assert_eq!(6, Color::Black.pawn_row());
        assert_eq!(7, Color::White.promotion_row());
        assert_eq!(0, Color::Black.promotion_row());
    }
}
