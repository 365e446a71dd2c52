// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::error::Error;
use std::fmt;
use std::io;
use std::time::Duration;

use super::ClientState;

/// Failures talking to the engine process.
#[derive(Debug)]
pub enum EngineError {
    /// The engine program could not be started.
    Spawn(io::Error),
    /// The child was started but one of its standard streams was not piped.
    PipeUnavailable(&'static str),
    /// Writing a command to the engine failed.
    Write(io::Error),
    /// Reading the engine's output failed.
    Read(io::Error),
    /// The engine closed its output before replying.
    Disconnected,
    /// No reply arrived within the configured time.
    Timeout(Duration),
    /// The operation is not valid in the client's current state.
    NotReady(ClientState),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EngineError::Spawn(e) => write!(f, "failed to start engine: {}", e),
            EngineError::PipeUnavailable(stream) => {
                write!(f, "engine {} is not available", stream)
            }
            EngineError::Write(e) => write!(f, "failed to write to engine: {}", e),
            EngineError::Read(e) => write!(f, "failed to read from engine: {}", e),
            EngineError::Disconnected => write!(f, "engine closed its output"),
            EngineError::Timeout(after) => {
                write!(f, "engine did not reply within {} ms", after.as_millis())
            }
            EngineError::NotReady(state) => {
                write!(f, "engine client cannot do that while {:?}", state)
            }
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EngineError::Spawn(e) | EngineError::Write(e) | EngineError::Read(e) => Some(e),
            _ => None,
        }
    }
}
