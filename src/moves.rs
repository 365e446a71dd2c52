// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::convert::TryFrom;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

use crate::types::{File, Piece, PieceKind, Rank, Square};

/// A piece moving between two squares of the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Move {
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(piece: Piece, from: Square, to: Square) -> Move {
        Move { piece, from, to }
    }

    pub fn row_delta(&self) -> i32 {
        self.to.row() as i32 - self.from.row() as i32
    }

    pub fn col_delta(&self) -> i32 {
        self.to.col() as i32 - self.from.col() as i32
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// Possible errors that can arise when parsing move notation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NotationError {
    InvalidLength(usize),
    InvalidFile(char),
    InvalidRank(char),
    InvalidPromotion(char),
}

impl fmt::Display for NotationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NotationError::InvalidLength(len) => {
                write!(f, "move must be four characters, found {}", len)
            }
            NotationError::InvalidFile(c) => write!(f, "invalid file '{}'", c),
            NotationError::InvalidRank(c) => write!(f, "invalid rank '{}'", c),
            NotationError::InvalidPromotion(c) => write!(f, "invalid promotion piece '{}'", c),
        }
    }
}

impl Error for NotationError {}

impl FromStr for Square {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Square, NotationError> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 2 {
            return Err(NotationError::InvalidLength(chars.len()));
        }

        let file = File::try_from(chars[0]).map_err(|_| NotationError::InvalidFile(chars[0]))?;
        let rank = Rank::try_from(chars[1]).map_err(|_| NotationError::InvalidRank(chars[1]))?;
        Ok(Square::of(rank, file))
    }
}

/// A move in coordinate notation, as typed by the user and exchanged with the
/// engine: file and rank of the source square followed by file and rank of the
/// destination, e.g. `e2e4`. Engines append the promotion piece as a fifth
/// letter (`e7e8q`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MoveToken {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl FromStr for MoveToken {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<MoveToken, NotationError> {
        let len = s.chars().count();
        if len != 4 && len != 5 {
            return Err(NotationError::InvalidLength(len));
        }

        let chars: Vec<char> = s.chars().collect();
        let square = |file: char, rank: char| -> Result<Square, NotationError> {
            let file = File::try_from(file).map_err(|_| NotationError::InvalidFile(file))?;
            let rank = Rank::try_from(rank).map_err(|_| NotationError::InvalidRank(rank))?;
            Ok(Square::of(rank, file))
        };

        let from = square(chars[0], chars[1])?;
        let to = square(chars[2], chars[3])?;
        let promotion = match chars.get(4) {
            None => None,
            Some(&c) => match PieceKind::try_from(c) {
                Ok(kind @ PieceKind::Rook)
                | Ok(kind @ PieceKind::Knight)
                | Ok(kind @ PieceKind::Bishop)
                | Ok(kind @ PieceKind::Queen) => Some(kind),
                _ => return Err(NotationError::InvalidPromotion(c)),
            },
        };

        Ok(MoveToken {
            from,
            to,
            promotion,
        })
    }
}

impl MoveToken {
    /// Parses a move typed at the console. The person playing always gives
    /// exactly four characters; promotions are chosen from a menu instead.
    pub fn parse_typed(s: &str) -> Result<MoveToken, NotationError> {
        let len = s.chars().count();
        if len != 4 {
            return Err(NotationError::InvalidLength(len));
        }

        s.parse()
    }
}

impl fmt::Display for MoveToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MoveToken, NotationError};
    use crate::types::{PieceKind, Square};

    #[test]
    fn parses_coordinate_move() {
        let token: MoveToken = "e2e4".parse().unwrap();
        assert_eq!(Square::new(1, 4), Some(token.from));
        assert_eq!(Square::new(3, 4), Some(token.to));
        assert_eq!(None, token.promotion);
        assert_eq!("e2e4", token.to_string());
    }

    #[test]
    fn typed_moves_are_four_characters() {
        assert!(MoveToken::parse_typed("e2e4").is_ok());
        assert_eq!(
            Err(NotationError::InvalidLength(5)),
            MoveToken::parse_typed("e2e4q")
        );
        assert_eq!(
            Err(NotationError::InvalidLength(3)),
            MoveToken::parse_typed("e2e")
        );
    }

    #[test]
    fn parses_promotion_suffix() {
        let token: MoveToken = "a7a8q".parse().unwrap();
        assert_eq!(Some(PieceKind::Queen), token.promotion);
        assert_eq!("a7a8q", token.to_string());
    }

    #[test]
    fn rejects_bad_tokens() {
        assert_eq!(
            Err(NotationError::InvalidLength(3)),
            "e2e".parse::<MoveToken>()
        );
        assert_eq!(
            Err(NotationError::InvalidFile('i')),
            "i2e4".parse::<MoveToken>()
        );
        assert_eq!(
            Err(NotationError::InvalidRank('9')),
            "e2e9".parse::<MoveToken>()
        );
        assert_eq!(
            Err(NotationError::InvalidPromotion('k')),
            "e7e8k".parse::<MoveToken>()
        );
        assert_eq!(
            Err(NotationError::InvalidLength(6)),
            "(none)".parse::<MoveToken>()
        );
    }

    #[test]
    fn parses_square() {
        let sq: Square = "h8".parse().unwrap();
        assert_eq!(7, sq.row());
        assert_eq!(7, sq.col());
        assert!("z1".parse::<Square>().is_err());
    }
}
