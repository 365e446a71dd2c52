// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A game between a person at the console and an engine.
//!
//! Three loops share one `Game` behind a mutex and hand control to each
//! other through a `TurnCoordinator`:
//!
//! * the human loop reads commands and moves from the console,
//! * the engine loop asks the engine for a move on the engine's turn,
//! * the presenter loop prints every committed move and the board.
use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, Builder};
use std::time::Duration;

use crate::engine::Engine;
use crate::game::{Game, MoveError};
use crate::history::Ply;
use crate::moves::MoveToken;
use crate::record::{GameRecorder, NullGameRecorder};
use crate::special::{ConsolePromotion, FixedPromotion, PromotionSource};
use crate::turn::{Side, TurnCoordinator, TurnState};
use crate::types::{Color, PieceKind, Square};
use crate::uci::BestMove;

const HELP: &str = "\
Commands:
  move <from><to>   play a move, e.g. move e2e4
  moves <square>    list where the piece on a square can move
  board             print the board
  history           list the moves played so far
  help              show this message
  quit              end the game";

const INVALID: &str = "Invalid command or move!!";

/// Shared, line-oriented console output.
#[derive(Clone)]
pub struct Console {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Console {
    pub fn new<W: Write + Send + 'static>(out: W) -> Console {
        Console {
            out: Arc::new(Mutex::new(Box::new(out))),
        }
    }

    pub fn stdout() -> Console {
        Console::new(io::stdout())
    }

    fn lock(&self) -> MutexGuard<Box<dyn Write + Send>> {
        self.out.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn say<D: Display>(&self, text: D) {
        let mut out = self.lock();
        if let Err(e) = writeln!(out, "{}", text).and_then(|_| out.flush()) {
            warn!("failed to write to console: {}", e);
        }
    }

    pub fn prompt<D: Display>(&self, text: D) {
        let mut out = self.lock();
        if let Err(e) = write!(out, "{}", text).and_then(|_| out.flush()) {
            warn!("failed to write to console: {}", e);
        }
    }
}

impl Write for Console {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().flush()
    }
}

/// Commands typed at the console.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LocalCommand {
    Move(String),
    Moves(String),
    Board,
    History,
    Help,
    Quit,
    Invalid,
}

impl LocalCommand {
    pub fn parse(line: &str) -> LocalCommand {
        let components: Vec<_> = line.split_whitespace().collect();
        match components.split_first().unwrap_or((&"", &[])) {
            (&"move", [token]) => LocalCommand::Move(token.to_string()),
            (&"moves", [square]) => LocalCommand::Moves(square.to_string()),
            (&"board", []) => LocalCommand::Board,
            (&"history", []) => LocalCommand::History,
            (&"help", []) => LocalCommand::Help,
            (&"quit", []) => LocalCommand::Quit,
            _ => LocalCommand::Invalid,
        }
    }
}

/// Timing of the session loops.
#[derive(Copy, Clone, Debug)]
pub struct SessionOptions {
    /// How long an idle loop sleeps before looking at the turn again.
    pub poll_interval: Duration,
    /// How long the presenter lingers on each move.
    pub animation_time: Duration,
}

impl Default for SessionOptions {
    fn default() -> SessionOptions {
        SessionOptions {
            poll_interval: Duration::from_millis(100),
            animation_time: Duration::from_millis(250),
        }
    }
}

#[derive(Clone)]
pub struct Session {
    game: Arc<Mutex<Game>>,
    turns: TurnCoordinator,
    console: Console,
    recorder: Arc<dyn GameRecorder + Send + Sync>,
    human: Color,
    options: SessionOptions,
}

impl Session {
    /// A session in which the person plays `human` and the engine the other
    /// color. White moves first.
    pub fn new(game: Game, human: Color, options: SessionOptions, console: Console) -> Session {
        let first = if human == Color::White {
            Side::Human
        } else {
            Side::Engine
        };

        Session {
            game: Arc::new(Mutex::new(game)),
            turns: TurnCoordinator::new(first),
            console,
            recorder: Arc::new(NullGameRecorder),
            human,
            options,
        }
    }

    pub fn with_recorder<R>(mut self, recorder: R) -> Session
    where
        R: GameRecorder + Send + Sync + 'static,
    {
        self.recorder = Arc::new(recorder);
        self
    }

    pub fn turns(&self) -> &TurnCoordinator {
        &self.turns
    }

    pub fn engine_color(&self) -> Color {
        self.human.toggle()
    }

    /// A snapshot of the game.
    pub fn game(&self) -> Game {
        self.lock_game().clone()
    }

    fn lock_game(&self) -> MutexGuard<Game> {
        self.game.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs the human and engine loops on their own threads and the
    /// presenter on this one, returning once the game is over and both
    /// threads have finished.
    pub fn run<R, E>(&self, input: R, mut engine: E) -> io::Result<()>
    where
        R: BufRead + Send + 'static,
        E: Engine + Send + 'static,
    {
        self.console.say(format!(
            "You play {}, the engine plays {}. Type `help` for commands.",
            self.human,
            self.engine_color()
        ));

        let human = self.clone();
        let human_thread = Builder::new()
            .name("human".to_owned())
            .spawn(move || human.human_loop(input))?;

        let this = self.clone();
        let engine_thread = Builder::new()
            .name("engine".to_owned())
            .spawn(move || this.engine_loop(&mut engine));

        let engine_thread = match engine_thread {
            Ok(handle) => handle,
            Err(e) => {
                self.turns.end_game();
                let _ = human_thread.join();
                return Err(e);
            }
        };

        self.presenter_loop();
        for (name, handle) in vec![("human", human_thread), ("engine", engine_thread)] {
            if handle.join().is_err() {
                error!("{} thread panicked", name);
            }
        }

        Ok(())
    }

    /// Announces check for `color` and ends the game if its king has no
    /// escape. Returns true if the game is over.
    fn announce_check(&self, color: Color) -> bool {
        let mut game = self.lock_game();
        if !game.is_in_check(color) {
            return false;
        }

        self.console.say(format!("Check {} King", color));
        if game.has_no_escape(color) {
            self.console
                .say(format!("Checkmate! {} wins.", color.toggle()));
            info!("{} has no escape, game over", color);
            self.turns.end_game();
            return true;
        }

        false
    }

    fn play(
        &self,
        token: MoveToken,
        color: Color,
        promotions: &mut dyn PromotionSource,
    ) -> Result<Ply, MoveError> {
        let mut game = self.lock_game();
        let ply = *game.play_token(token, color, promotions)?;
        self.recorder.record(game.history().len(), &ply);
        Ok(ply)
    }

    /// Reads and carries out console commands on the human's turns.
    pub fn human_loop<R: BufRead>(&self, mut input: R) {
        let side = Side::Human;
        let mut checked_at = None;
        loop {
            if self.turns.is_game_over() {
                break;
            }

            if !self.turns.is_turn(side) {
                thread::sleep(self.options.poll_interval);
                continue;
            }

            // announce once per position, not once per prompt
            let plies = self.lock_game().history().len();
            if checked_at != Some(plies) {
                checked_at = Some(plies);
                if self.announce_check(self.human) {
                    break;
                }
            }

            self.console.prompt(format!("{} to move> ", self.human));
            let mut line = String::new();
            match input.read_line(&mut line) {
                Ok(0) => {
                    info!("console input closed");
                    self.turns.end_game();
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    error!("failed to read console input: {}", e);
                    self.turns.end_game();
                    break;
                }
            }

            match LocalCommand::parse(&line) {
                LocalCommand::Move(token) => self.human_move(&token, &mut input),
                LocalCommand::Moves(square) => self.show_destinations(&square),
                LocalCommand::Board => self.console.say(self.lock_game().board()),
                LocalCommand::History => self.show_history(),
                LocalCommand::Help => self.console.say(HELP),
                LocalCommand::Quit => {
                    self.console.say("Bye.");
                    self.turns.end_game();
                    break;
                }
                LocalCommand::Invalid => self.console.say(INVALID),
            }
        }

        debug!("human loop finished");
    }

    fn human_move<R: BufRead>(&self, token: &str, input: &mut R) {
        let token = match MoveToken::parse_typed(token) {
            Ok(token) => token,
            Err(e) => {
                self.console.say(format!("{} ({})", INVALID, e));
                return;
            }
        };

        let mut promotions = ConsolePromotion::new(input, self.console.clone());
        match self.play(token, self.human, &mut promotions) {
            Ok(_) => {
                self.turns.complete_move(Side::Human);
            }
            Err(e) => self.console.say(format!("{} ({})", INVALID, e)),
        }
    }

    fn show_destinations(&self, square: &str) {
        let square = match square.parse::<Square>() {
            Ok(square) => square,
            Err(e) => {
                self.console.say(format!("{} ({})", INVALID, e));
                return;
            }
        };

        let destinations = self.lock_game().destinations(square);
        if destinations.is_empty() {
            self.console.say(format!("No moves from {}", square));
            return;
        }

        let list: Vec<_> = destinations.iter().map(|sq| sq.to_string()).collect();
        self.console.say(list.join(" "));
    }

    fn show_history(&self) {
        let game = self.lock_game();
        if game.history().is_empty() {
            self.console.say("No moves yet.");
            return;
        }

        for (i, ply) in game.history().iter().enumerate() {
            self.console.say(format!("{:3}. {}", i + 1, ply));
        }
    }

    /// Asks the engine for a move on each of its turns.
    pub fn engine_loop<E: Engine + ?Sized>(&self, engine: &mut E) {
        let side = Side::Engine;
        let color = self.engine_color();
        loop {
            if self.turns.is_game_over() {
                break;
            }

            if !self.turns.is_turn(side) {
                thread::sleep(self.options.poll_interval);
                continue;
            }

            if self.announce_check(color) {
                break;
            }

            let moves = self.lock_game().move_tokens();
            debug!("asking engine for a move after {} plies", moves.len());
            let reply = match engine.best_move(&moves) {
                Ok(BestMove::Move(token)) => token,
                Ok(BestMove::None) => {
                    self.console.say("The engine has no move. Game over.");
                    self.turns.end_game();
                    break;
                }
                Err(e) => {
                    error!("engine failure: {}", e);
                    self.console.say(format!("Engine failure: {}. Game over.", e));
                    self.turns.end_game();
                    break;
                }
            };

            let played = reply
                .parse::<MoveToken>()
                .map_err(MoveError::from)
                .and_then(|token| {
                    let kind = token.promotion.unwrap_or(PieceKind::Queen);
                    self.play(token, color, &mut FixedPromotion(kind))
                });

            match played {
                Ok(_) => {
                    self.console.say(format!("Engine plays {}", reply));
                    self.turns.complete_move(side);
                }
                Err(e) => {
                    warn!("engine replied with {}: {}", reply, e);
                    self.console
                        .say(format!("Engine sent an invalid move {} ({}). Game over.", reply, e));
                    self.turns.end_game();
                    break;
                }
            }
        }

        debug!("engine loop finished");
    }

    /// Shows each committed move, then hands the turn over.
    pub fn presenter_loop(&self) {
        loop {
            match self.turns.state() {
                TurnState::GameOver => break,
                TurnState::Turn(_) => thread::sleep(self.options.poll_interval),
                TurnState::Animating { .. } => {
                    self.present_last_move();
                    thread::sleep(self.options.animation_time);
                    self.turns.complete_animation();
                }
            }
        }

        debug!("presenter loop finished");
    }

    fn present_last_move(&self) {
        let mut game = self.lock_game();
        if let Some(ply) = game.last_ply() {
            for motion in ply.motions() {
                trace!(
                    "animate {} {} -> {}",
                    motion.piece.identity(),
                    motion.from,
                    motion.to
                );
            }

            self.console.say(ply);
        }

        if let Some(notice) = game.take_promotion() {
            self.console.say(format!(
                "{} {} promoted to {} on {}",
                notice.pawn.color,
                notice.pawn.kind.name(),
                notice.promoted.kind.name(),
                notice.square
            ));
        }

        self.console.say(game.board());
    }
}
