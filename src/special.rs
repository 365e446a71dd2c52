// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Side effects of castling, en passant and promotion, applied after the
//! primary move has been made on the board.
use std::io::{self, BufRead, Write};

use crate::board::Board;
use crate::history::Displacement;
use crate::rules::{Special, ValidatedMove};
use crate::types::{Piece, PieceKind, Square};

/// The pieces a pawn may promote to, in menu order.
pub const PROMOTION_CHOICES: [PieceKind; 4] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
];

/// Parses a promotion selection: a menu number `1` through `4`, a piece name
/// or a piece letter, in any case.
pub fn parse_selection(input: &str) -> Option<PieceKind> {
    let input = input.trim().to_ascii_lowercase();
    if let Ok(index) = input.parse::<usize>() {
        if index >= 1 && index <= PROMOTION_CHOICES.len() {
            return Some(PROMOTION_CHOICES[index - 1]);
        }

        return None;
    }

    PROMOTION_CHOICES
        .iter()
        .cloned()
        .find(|kind| input == kind.name() || input == kind.to_string())
}

/// Something that can be asked which piece a pawn promotes to.
pub trait PromotionSource {
    /// Produces the next raw selection. `None` means no selection will be
    /// made, in which case the pawn becomes a queen.
    fn next_selection(&mut self) -> Option<String>;

    /// Called with every selection that did not parse.
    fn rejected(&mut self, input: &str) {
        warn!("invalid promotion selection: {:?}", input);
    }
}

/// Asks `source` until it produces a valid selection.
pub fn select_promotion(source: &mut dyn PromotionSource) -> PieceKind {
    loop {
        let input = match source.next_selection() {
            Some(input) => input,
            None => return PieceKind::Queen,
        };

        match parse_selection(&input) {
            Some(kind) => return kind,
            None => source.rejected(&input),
        }
    }
}

/// Always promotes to the same piece. Used for engine moves, whose tokens
/// carry the promotion letter.
pub struct FixedPromotion(pub PieceKind);

impl PromotionSource for FixedPromotion {
    fn next_selection(&mut self) -> Option<String> {
        Some(self.0.name().to_owned())
    }
}

/// Prompts on a writer and reads selections line by line from a reader.
pub struct ConsolePromotion<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsolePromotion<R, W> {
    pub fn new(input: R, output: W) -> ConsolePromotion<R, W> {
        ConsolePromotion { input, output }
    }

    fn prompt(&mut self) -> io::Result<Option<String>> {
        writeln!(self.output, "Pawn promotion")?;
        for (i, kind) in PROMOTION_CHOICES.iter().enumerate() {
            let name = kind.name();
            writeln!(self.output, "{}. {}{}", i + 1, name[..1].to_uppercase(), &name[1..])?;
        }

        write!(self.output, "Select a piece (1-4): ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim().to_owned()))
    }
}

impl<R: BufRead, W: Write> PromotionSource for ConsolePromotion<R, W> {
    fn next_selection(&mut self) -> Option<String> {
        match self.prompt() {
            Ok(selection) => selection,
            Err(e) => {
                warn!("failed to read promotion selection: {}", e);
                None
            }
        }
    }

    fn rejected(&mut self, input: &str) {
        let _ = writeln!(self.output, "Invalid promotion type {:?}", input);
    }
}

/// A completed promotion, kept for the presentation layer until it is taken.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PromotionNotice {
    pub square: Square,
    pub pawn: Piece,
    pub promoted: Piece,
}

/// What resolving a move did beyond the primary move.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    pub secondary: Option<Displacement>,
    pub promotion: Option<PromotionNotice>,
}

/// Applies the secondary effect of `validated`, whose primary move has
/// already been made on `board`.
pub fn resolve(
    board: &mut Board,
    validated: &ValidatedMove,
    promotions: &mut dyn PromotionSource,
) -> Resolution {
    let captured = validated
        .captured
        .map(|piece| Displacement::capture(piece, validated.mv.to));

    match validated.special {
        Special::None => Resolution {
            secondary: captured,
            promotion: None,
        },
        Special::Castle { rook } => {
            board.clear(rook.from);
            board.place(rook.to, rook.piece);
            debug!("castled: rook {} -> {}", rook.from, rook.to);
            Resolution {
                secondary: Some(Displacement::rook(rook)),
                promotion: None,
            }
        }
        Special::EnPassant { pawn, square } => {
            board.clear(square);
            debug!("en passant: removed {} from {}", pawn.identity(), square);
            Resolution {
                secondary: Some(Displacement::capture(pawn, square)),
                promotion: None,
            }
        }
        Special::Promotion { pawn } => {
            let kind = select_promotion(promotions);
            let ordinal = board.count(kind, pawn.color) as u8;
            let promoted = Piece::new(kind, pawn.color, ordinal);
            board.place(validated.mv.to, promoted);
            debug!("promoted {} to {}", pawn.identity(), promoted.identity());
            Resolution {
                secondary: captured,
                promotion: Some(PromotionNotice {
                    square: validated.mv.to,
                    pawn,
                    promoted,
                }),
            }
        }
    }
}
