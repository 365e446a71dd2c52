// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Ownership of, and conversation with, an external engine process.
use std::path::PathBuf;
use std::time::Duration;

mod client;
mod error;

pub use self::client::{ClientState, EngineClient};
pub use self::error::EngineError;
use crate::uci::BestMove;

/// Everything needed to start and talk to an engine.
#[derive(Clone, Debug)]
pub struct EngineSettings {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub search_depth: u32,
    /// How long each wait for engine output lasts before the reply deadline
    /// is checked again.
    pub poll_interval: Duration,
    /// `None` waits for a reply forever.
    pub reply_timeout: Option<Duration>,
    /// How long the engine gets to exit on its own after `quit`.
    pub shutdown_grace: Duration,
}

impl Default for EngineSettings {
    fn default() -> EngineSettings {
        EngineSettings {
            program: PathBuf::from("stockfish"),
            args: vec![],
            search_depth: 10,
            poll_interval: Duration::from_millis(100),
            reply_timeout: Some(Duration::from_secs(120)),
            shutdown_grace: Duration::from_secs(2),
        }
    }
}

/// Something that picks a move for a position given as the list of moves
/// played from the starting position.
pub trait Engine {
    fn best_move(&mut self, moves: &[String]) -> Result<BestMove, EngineError>;
}

impl Engine for EngineClient {
    fn best_move(&mut self, moves: &[String]) -> Result<BestMove, EngineError> {
        self.send_position(moves)?;
        self.response_move()
    }
}
