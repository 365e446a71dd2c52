// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::error::Error;
use std::fmt;

use crate::board::Board;
use crate::history::{History, Ply};
use crate::moves::{Move, MoveToken, NotationError};
use crate::rules::{self, IllegalMove, SquareVec, ValidatedMove, Validator};
use crate::special::{self, PromotionNotice, PromotionSource};
use crate::types::{CastleStatus, Color, PieceKind, Square};

/// Reasons `Game::play` can refuse a move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveError {
    Notation(NotationError),
    Illegal(IllegalMove),
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MoveError::Notation(e) => write!(f, "invalid move notation: {}", e),
            MoveError::Illegal(e) => write!(f, "illegal move: {}", e),
        }
    }
}

impl Error for MoveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MoveError::Notation(e) => Some(e),
            MoveError::Illegal(e) => Some(e),
        }
    }
}

impl From<NotationError> for MoveError {
    fn from(e: NotationError) -> MoveError {
        MoveError::Notation(e)
    }
}

impl From<IllegalMove> for MoveError {
    fn from(e: IllegalMove) -> MoveError {
        MoveError::Illegal(e)
    }
}

/// A game in progress: the board, the plies played so far, the castling
/// rights still held and the last promotion not yet shown.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    history: History,
    castling: CastleStatus,
    promotion: Option<PromotionNotice>,
}

impl Game {
    /// A new game from the standard starting position.
    pub fn new() -> Game {
        Game::from_board(Board::standard(), CastleStatus::all())
    }

    /// A new game from an arbitrary position.
    pub fn from_board(board: Board, castling: CastleStatus) -> Game {
        Game {
            board,
            history: History::new(),
            castling,
            promotion: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn castling(&self) -> CastleStatus {
        self.castling
    }

    pub fn last_ply(&self) -> Option<&Ply> {
        self.history.last()
    }

    /// The move list to send to the engine.
    pub fn move_tokens(&self) -> Vec<String> {
        self.history.tokens()
    }

    fn validator(&self) -> Validator {
        Validator::new(
            &self.board,
            self.castling,
            self.history.last().map(|ply| ply.primary),
        )
    }

    pub fn try_move(
        &self,
        from: Square,
        to: Square,
        mover: Color,
    ) -> Result<ValidatedMove, IllegalMove> {
        self.validator().try_move(from, to, mover)
    }

    /// Legal destinations for the piece on `from`.
    pub fn destinations(&self, from: Square) -> SquareVec {
        self.validator().destinations(from)
    }

    /// Parses, validates and commits a move in coordinate notation.
    pub fn play(
        &mut self,
        token: &str,
        mover: Color,
        promotions: &mut dyn PromotionSource,
    ) -> Result<&Ply, MoveError> {
        let token: MoveToken = token.parse()?;
        self.play_token(token, mover, promotions)
    }

    pub fn play_token(
        &mut self,
        token: MoveToken,
        mover: Color,
        promotions: &mut dyn PromotionSource,
    ) -> Result<&Ply, MoveError> {
        let validated = self.try_move(token.from, token.to, mover)?;
        Ok(self.commit(validated, promotions))
    }

    /// Makes a validated move on the board, resolves its special effect and
    /// records the ply.
    pub fn commit(
        &mut self,
        validated: ValidatedMove,
        promotions: &mut dyn PromotionSource,
    ) -> &Ply {
        let ValidatedMove { mv, .. } = validated;
        self.board.clear(mv.from);
        self.board.place(mv.to, mv.piece);

        let resolution = special::resolve(&mut self.board, &validated, promotions);
        self.revoke_castling(mv);

        let ply = Ply {
            primary: mv,
            secondary: resolution.secondary,
            promotion: resolution.promotion.map(|notice| notice.promoted.kind),
        };

        info!("{}", ply);
        if resolution.promotion.is_some() {
            self.promotion = resolution.promotion;
        }

        self.history.push(ply)
    }

    /// Drops the castling rights a move gives up: a king leaving its home
    /// square, or anything leaving or landing on a rook's home corner.
    fn revoke_castling(&mut self, mv: Move) {
        let before = self.castling;
        for &sq in &[mv.from, mv.to] {
            self.castling.remove(rights_tied_to(sq));
        }

        if mv.piece.kind == PieceKind::King {
            self.castling.remove(CastleStatus::both(mv.piece.color));
        }

        if before != self.castling {
            debug!("castling rights now {:?}", self.castling);
        }
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        rules::is_in_check(&self.board, color)
    }

    /// See `rules::has_no_escape`. The board is borrowed mutably while the
    /// king's flight squares are tried, and is unchanged afterwards.
    pub fn has_no_escape(&mut self, color: Color) -> bool {
        rules::has_no_escape(&mut self.board, color)
    }

    /// Takes the notice of the most recent promotion, if it has not been
    /// taken already.
    pub fn take_promotion(&mut self) -> Option<PromotionNotice> {
        self.promotion.take()
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

fn rights_tied_to(sq: Square) -> CastleStatus {
    match (sq.row(), sq.col()) {
        (0, 0) => CastleStatus::WHITE_QUEENSIDE,
        (0, 7) => CastleStatus::WHITE_KINGSIDE,
        (0, 4) => CastleStatus::WHITE,
        (7, 0) => CastleStatus::BLACK_QUEENSIDE,
        (7, 7) => CastleStatus::BLACK_KINGSIDE,
        (7, 4) => CastleStatus::BLACK,
        _ => CastleStatus::NONE,
    }
}
