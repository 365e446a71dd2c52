// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#[macro_use]
extern crate clap;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process;

use clap::{App, Arg, ArgMatches};
use kibitz::config::Config;
use kibitz::engine::EngineClient;
use kibitz::record::CsvGameRecorder;
use kibitz::session::{Console, Session, SessionOptions};
use kibitz::{Color, Game};

fn main() {
    env_logger::init();
    let matches = App::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about(crate_description!())
        .arg(
            Arg::with_name("ENGINE")
                .help("UCI engine program to play against")
                .index(1),
        )
        .arg(
            Arg::with_name("ENGINE_ARGS")
                .help("Arguments passed to the engine program")
                .multiple(true)
                .last(true),
        )
        .arg(
            Arg::with_name("config")
                .help("JSON configuration file")
                .value_name("FILE")
                .short("c")
                .long("config")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("depth")
                .help("Search depth requested from the engine")
                .value_name("DEPTH")
                .short("d")
                .long("depth")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("color")
                .help("Color to play")
                .value_name("COLOR")
                .long("color")
                .possible_values(&["white", "black"])
                .takes_value(true),
        )
        .arg(
            Arg::with_name("timeout")
                .help("Milliseconds to wait for an engine reply, 0 to wait forever")
                .value_name("MS")
                .short("t")
                .long("timeout")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("record")
                .help("Write the moves of the game to a CSV file")
                .value_name("FILE")
                .short("r")
                .long("record")
                .takes_value(true),
        )
        .get_matches();

    let config = load_config(&matches);
    let color = match config.color {
        Some(color) => color,
        None => prompt_color(),
    };

    let engine = match EngineClient::spawn(&config.engine_settings()) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("could not start {}: {}", config.engine.display(), e);
            process::exit(1);
        }
    };

    let options = SessionOptions {
        poll_interval: config.poll_interval(),
        animation_time: config.animation_time(),
    };
    let session = Session::new(Game::new(), color, options, Console::stdout());
    let session = match config.record {
        Some(ref path) => match File::create(path) {
            Ok(file) => session.with_recorder(CsvGameRecorder::new(file)),
            Err(e) => {
                eprintln!("could not create {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => session,
    };

    if let Err(e) = session.run(BufReader::new(io::stdin()), engine) {
        eprintln!("session failed: {}", e);
        process::exit(1);
    }
}

/// The configuration file, if any, with command-line flags applied on top.
fn load_config(matches: &ArgMatches) -> Config {
    let mut config = match matches.value_of("config") {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}: {}", path, e);
                process::exit(1);
            }
        },
        None => Config::default(),
    };

    if let Some(engine) = matches.value_of("ENGINE") {
        config.engine = PathBuf::from(engine);
    }

    if let Some(args) = matches.values_of("ENGINE_ARGS") {
        config.engine_args = args.map(str::to_owned).collect();
    }

    if matches.is_present("depth") {
        config.depth = value_t_or_exit!(matches, "depth", u32);
    }

    if matches.is_present("timeout") {
        config.reply_timeout_ms = match value_t_or_exit!(matches, "timeout", u64) {
            0 => None,
            ms => Some(ms),
        };
    }

    match matches.value_of("color") {
        Some("white") => config.color = Some(Color::White),
        Some("black") => config.color = Some(Color::Black),
        _ => {}
    }

    if let Some(path) = matches.value_of("record") {
        config.record = Some(PathBuf::from(path));
    }

    config
}

fn prompt_color() -> Color {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        print!("Choose your color (1. White, 2. Black): ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => process::exit(0),
            Ok(_) => {}
        }

        match line.trim() {
            "1" => return Color::White,
            "2" => return Color::Black,
            other => println!("Invalid choice {:?}", other),
        }
    }
}
