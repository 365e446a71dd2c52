// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::EngineSettings;
use crate::types::Color;

/// Settings for a session, read from a JSON file. Every field is optional:
///
/// ```json
/// {
///     "engine": "/usr/bin/stockfish",
///     "engine_args": [],
///     "depth": 10,
///     "poll_interval_ms": 100,
///     "reply_timeout_ms": 120000,
///     "shutdown_grace_ms": 2000,
///     "animation_ms": 250,
///     "color": "white",
///     "record": "game.csv"
/// }
/// ```
///
/// A `null` reply timeout waits for the engine forever.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: PathBuf,
    pub engine_args: Vec<String>,
    pub depth: u32,
    pub poll_interval_ms: u64,
    pub reply_timeout_ms: Option<u64>,
    pub shutdown_grace_ms: u64,
    pub animation_ms: u64,
    pub color: Option<Color>,
    pub record: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            engine: PathBuf::from("stockfish"),
            engine_args: vec![],
            depth: 10,
            poll_interval_ms: 100,
            reply_timeout_ms: Some(120_000),
            shutdown_grace_ms: 2_000,
            animation_ms: 250,
            color: None,
            record: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "could not read config: {}", e),
            ConfigError::Json(e) => write!(f, "invalid config: {}", e),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> ConfigError {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> ConfigError {
        ConfigError::Json(e)
    }
}

impl Config {
    pub fn from_reader<R: Read>(reader: R) -> Result<Config, ConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        Config::from_reader(file)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn animation_time(&self) -> Duration {
        Duration::from_millis(self.animation_ms)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            program: self.engine.clone(),
            args: self.engine_args.clone(),
            search_depth: self.depth,
            poll_interval: self.poll_interval(),
            reply_timeout: self.reply_timeout_ms.map(Duration::from_millis),
            shutdown_grace: Duration::from_millis(self.shutdown_grace_ms),
        }
    }
}
