// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#[macro_use]
extern crate criterion;

use criterion::black_box;
use criterion::Criterion;
use kibitz::rules::{self, Validator};
use kibitz::{Board, CastleStatus, Color, Square};

fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("is_in_check start", |b| {
        let board = Board::standard();
        b.iter(|| rules::is_in_check(black_box(&board), Color::White))
    });

    c.bench_function("has_no_escape back rank", |b| {
        let mut board = Board::from_placement("6k1/8/8/8/8/8/5PPP/3r2K1").unwrap();
        b.iter(|| rules::has_no_escape(black_box(&mut board), Color::White))
    });

    c.bench_function("try_move queen d1h5", |b| {
        let board = Board::from_placement("rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR")
            .unwrap();
        let validator = Validator::new(&board, CastleStatus::all(), None);
        b.iter(|| validator.try_move(black_box(sq("d1")), sq("h5"), Color::White))
    });

    c.bench_function("destinations start", |b| {
        let board = Board::standard();
        let validator = Validator::new(&board, CastleStatus::all(), None);
        b.iter(|| {
            for from in Square::all() {
                black_box(validator.destinations(from));
            }
        });
    });

    c.bench_function("board clone", |b| {
        let board = Board::standard();
        b.iter(|| black_box(&board).clone())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
