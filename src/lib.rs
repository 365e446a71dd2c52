// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A chess rules engine that plays against an external UCI engine process.

#[macro_use]
extern crate num_derive;
#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

pub mod board;
pub mod config;
pub mod engine;
pub mod game;
pub mod history;
pub mod moves;
pub mod record;
pub mod rules;
pub mod session;
pub mod special;
pub mod turn;
pub mod types;
pub mod uci;

pub use board::Board;
pub use game::{Game, MoveError};
pub use history::{History, Ply};
pub use moves::{Move, MoveToken};
pub use rules::{IllegalMove, Special, ValidatedMove};
pub use types::{CastleStatus, Color, File, Piece, PieceKind, Rank, Square};
