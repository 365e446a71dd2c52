// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The client half of the universal chess interface (UCI): the commands sent
//! to an engine and the parts of its replies that matter here.
use std::io::{self, Write};

use regex::Regex;

/// Commands the client sends to the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Tells the engine to use the UCI protocol.
    Uci,

    /// Asks the engine to reply `readyok` once it has caught up.
    IsReady,

    /// Sets up the starting position and plays `moves` on it.
    Position { moves: Vec<String> },

    /// Starts a search limited to `depth` plies.
    Go { depth: u32 },

    /// Quit the program as soon as possible.
    Quit,
}

pub trait ToUciWire {
    fn to_uci_wire<W: Write>(&self, writer: &mut W) -> io::Result<()>;
}

impl ToUciWire for Command {
    fn to_uci_wire<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match *self {
            Command::Uci => writeln!(writer, "uci"),
            Command::IsReady => writeln!(writer, "isready"),
            Command::Position { ref moves } => {
                write!(writer, "position startpos")?;
                if !moves.is_empty() {
                    write!(writer, " moves {}", moves.join(" "))?;
                }

                writeln!(writer)
            }
            Command::Go { depth } => writeln!(writer, "go depth {}", depth),
            Command::Quit => writeln!(writer, "quit"),
        }
    }
}

/// The engine's answer to `go`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BestMove {
    /// A move in coordinate notation, possibly with a promotion letter.
    Move(String),
    /// The engine has no move to play (`bestmove (none)` or `bestmove 0000`).
    None,
}

lazy_static! {
    static ref BEST_MOVE: Regex = Regex::new(r"^\s*bestmove\s+(\S+)").unwrap();
}

/// Scans one line of engine output for a best-move reply. Anything else
/// (`info`, `readyok`, identification lines) yields `None`.
pub fn parse_best_move(line: &str) -> Option<BestMove> {
    let captures = BEST_MOVE.captures(line)?;
    let token = captures.get(1)?.as_str();
    match token {
        "(none)" | "0000" => Some(BestMove::None),
        _ => Some(BestMove::Move(token.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_best_move, BestMove, Command, ToUciWire};

    fn wire(command: Command) -> String {
        let mut buf = Vec::new();
        command.to_uci_wire(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn position_lines() {
        assert_eq!(
            "position startpos\n",
            wire(Command::Position { moves: vec![] })
        );
        assert_eq!(
            "position startpos moves e2e4 e7e5\n",
            wire(Command::Position {
                moves: vec!["e2e4".to_owned(), "e7e5".to_owned()],
            })
        );
    }

    #[test]
    fn simple_commands() {
        assert_eq!("uci\n", wire(Command::Uci));
        assert_eq!("isready\n", wire(Command::IsReady));
        assert_eq!("go depth 10\n", wire(Command::Go { depth: 10 }));
        assert_eq!("quit\n", wire(Command::Quit));
    }

    #[test]
    fn best_move_lines() {
        assert_eq!(
            Some(BestMove::Move("g1f3".to_owned())),
            parse_best_move("bestmove g1f3")
        );
        assert_eq!(
            Some(BestMove::Move("e7e8q".to_owned())),
            parse_best_move("bestmove e7e8q ponder a2a3\r")
        );
        assert_eq!(Some(BestMove::None), parse_best_move("bestmove (none)"));
        assert_eq!(Some(BestMove::None), parse_best_move("bestmove 0000"));
        assert_eq!(None, parse_best_move("info depth 10 pv e2e4 bestmove"));
        assert_eq!(None, parse_best_move("readyok"));
        assert_eq!(None, parse_best_move("bestmove"));
    }
}
