// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use kibitz::rules::{has_no_escape, is_in_check};
use kibitz::{Board, Color};

#[test]
fn smoke_test_starting_position() {
    let mut board = Board::standard();

    // nobody is in check.
    assert!(!is_in_check(&board, Color::White));
    assert!(!is_in_check(&board, Color::Black));

    // the king cannot move, but the board must come back untouched.
    has_no_escape(&mut board, Color::White);
    assert_eq!(Board::standard(), board);
}

#[test]
fn fools_mate() {
    let mut board = Board::from_placement("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR").unwrap();

    // white is checkmated
    assert!(is_in_check(&board, Color::White));
    assert!(has_no_escape(&mut board, Color::White));
}

#[test]
fn sliding_piece_blocked() {
    let board = Board::from_placement("4k3/8/4q3/8/8/8/4P3/4K3").unwrap();

    // white is not checked, the white pawn is blocking the queen
    assert!(!is_in_check(&board, Color::White));
}

#[test]
fn rook_check_on_file() {
    let board = Board::from_placement("4k3/8/8/8/8/8/8/r3K3").unwrap();
    assert!(is_in_check(&board, Color::White));

    // a piece between the rook and the king blocks the check
    let board = Board::from_placement("4k3/8/8/8/8/8/8/r1N1K3").unwrap();
    assert!(!is_in_check(&board, Color::White));
}

#[test]
fn knight_check_jumps_over_pieces() {
    let board = Board::from_placement("4k3/8/8/8/8/3n4/3PPP2/4K3").unwrap();
    assert!(is_in_check(&board, Color::White));
}

#[test]
fn check_with_escape_is_not_mate() {
    let mut board = Board::from_placement("4k3/8/8/8/8/8/8/r3K3").unwrap();

    // the king steps up off the rank
    assert!(!has_no_escape(&mut board, Color::White));
}

#[test]
fn missing_king_counts_as_lost() {
    let mut board = Board::from_placement("4k3/8/8/8/8/8/8/8").unwrap();
    assert!(is_in_check(&board, Color::White));
    assert!(has_no_escape(&mut board, Color::White));
}
