// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// The two parties to a game.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    Human,
    Engine,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Human => Side::Engine,
            Side::Engine => Side::Human,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TurnState {
    /// `Side` may move.
    Turn(Side),
    /// A move is being shown; `next` moves once it has been.
    Animating { next: Side },
    GameOver,
}

const HUMAN: u8 = 0;
const ENGINE: u8 = 1;
const ANIMATING_TO_HUMAN: u8 = 2;
const ANIMATING_TO_ENGINE: u8 = 3;
const GAME_OVER: u8 = 4;

impl TurnState {
    fn encode(self) -> u8 {
        match self {
            TurnState::Turn(Side::Human) => HUMAN,
            TurnState::Turn(Side::Engine) => ENGINE,
            TurnState::Animating { next: Side::Human } => ANIMATING_TO_HUMAN,
            TurnState::Animating { next: Side::Engine } => ANIMATING_TO_ENGINE,
            TurnState::GameOver => GAME_OVER,
        }
    }

    fn decode(raw: u8) -> TurnState {
        match raw {
            HUMAN => TurnState::Turn(Side::Human),
            ENGINE => TurnState::Turn(Side::Engine),
            ANIMATING_TO_HUMAN => TurnState::Animating { next: Side::Human },
            ANIMATING_TO_ENGINE => TurnState::Animating { next: Side::Engine },
            _ => TurnState::GameOver,
        }
    }
}

/// Whose turn it is, shared between the human, engine and presenter
/// threads. Clones share the same state.
///
/// `complete_move` and `complete_animation` only succeed from the state
/// they expect, so once `end_game` has been called no later transition can
/// bring the game back.
#[derive(Clone, Debug)]
pub struct TurnCoordinator {
    state: Arc<AtomicU8>,
}

impl TurnCoordinator {
    pub fn new(first: Side) -> TurnCoordinator {
        TurnCoordinator {
            state: Arc::new(AtomicU8::new(TurnState::Turn(first).encode())),
        }
    }

    pub fn state(&self) -> TurnState {
        TurnState::decode(self.state.load(Ordering::Acquire))
    }

    pub fn is_turn(&self, side: Side) -> bool {
        self.state() == TurnState::Turn(side)
    }

    pub fn is_game_over(&self) -> bool {
        self.state() == TurnState::GameOver
    }

    /// `side` has moved; the move is shown before the other side's turn.
    /// Returns false if it was not `side`'s turn.
    pub fn complete_move(&self, side: Side) -> bool {
        self.transition(
            TurnState::Turn(side),
            TurnState::Animating { next: side.other() },
        )
    }

    /// The last move has been shown. Returns false if none was being shown.
    pub fn complete_animation(&self) -> bool {
        match self.state() {
            TurnState::Animating { next } => {
                self.transition(TurnState::Animating { next }, TurnState::Turn(next))
            }
            _ => false,
        }
    }

    pub fn end_game(&self) {
        let previous = self.state.swap(GAME_OVER, Ordering::AcqRel);
        if previous != GAME_OVER {
            debug!("turn: {:?} -> GameOver", TurnState::decode(previous));
        }
    }

    fn transition(&self, from: TurnState, to: TurnState) -> bool {
        let swapped = self
            .state
            .compare_exchange(from.encode(), to.encode(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if swapped {
            debug!("turn: {:?} -> {:?}", from, to);
        }

        swapped
    }
}
