// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use kibitz::special::{FixedPromotion, PromotionSource};
use kibitz::{Board, CastleStatus, Color, Game, PieceKind, Square};

fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

fn queen() -> FixedPromotion {
    FixedPromotion(PieceKind::Queen)
}

/// Answers the promotion prompt with the menu number for a queen.
struct TypesFour;

impl PromotionSource for TypesFour {
    fn next_selection(&mut self) -> Option<String> {
        Some("4".to_owned())
    }
}

#[test]
fn plain_moves_reverse_cleanly() {
    let mut game = Game::new();

    // rook, bishop, queen and knight moves, each undone by the reverse move.
    let board = Board::from_placement("4k3/8/8/8/8/8/8/RB1QK1N1").unwrap();
    let mut other = Game::from_board(board.clone(), CastleStatus::NONE);
    for &(there, back) in &[
        ("a1a6", "a6a1"),
        ("b1f5", "f5b1"),
        ("d1d7", "d7d1"),
        ("g1h3", "h3g1"),
        ("e1f2", "f2e1"),
    ] {
        other.play(there, Color::White, &mut queen()).unwrap();
        other.play(back, Color::White, &mut queen()).unwrap();
        assert_eq!(&board, other.board());
    }

    game.play("b1c3", Color::White, &mut queen()).unwrap();
    game.play("c3b1", Color::White, &mut queen()).unwrap();
    assert_eq!(&Board::standard(), game.board());
}

#[test]
fn pawn_steps() {
    let game = Game::new();

    // one or two steps from the starting rank, never three
    assert!(game.try_move(sq("e2"), sq("e3"), Color::White).is_ok());
    assert!(game.try_move(sq("e2"), sq("e4"), Color::White).is_ok());
    assert!(game.try_move(sq("e2"), sq("e5"), Color::White).is_err());
}

#[test]
fn kingside_castle_moves_rook() {
    let board = Board::from_placement("4k3/8/8/8/8/8/8/4K2R").unwrap();
    let mut game = Game::from_board(board, CastleStatus::all());
    game.play("e1g1", Color::White, &mut queen()).unwrap();

    // king on g1, rook on f1, h1 empty
    assert_eq!(Some(PieceKind::King), game.board().piece_at(sq("g1")).map(|p| p.kind));
    assert_eq!(Some(PieceKind::Rook), game.board().piece_at(sq("f1")).map(|p| p.kind));
    assert!(game.board().is_empty(sq("h1")));
    assert!(game.board().is_empty(sq("e1")));
}

#[test]
fn en_passant_removes_passed_pawn() {
    let board = Board::from_placement("4k3/3p4/8/4P3/8/8/8/4K3").unwrap();
    let mut game = Game::from_board(board, CastleStatus::NONE);
    game.play("d7d5", Color::Black, &mut queen()).unwrap();
    game.play("e5d6", Color::White, &mut queen()).unwrap();

    // the captured pawn stood on d5, not on the destination d6
    assert!(game.board().is_empty(sq("d5")));
    let pawn = game.board().piece_at(sq("d6")).unwrap();
    assert_eq!(PieceKind::Pawn, pawn.kind);
    assert_eq!(Color::White, pawn.color);
    assert_eq!(1, game.board().count(PieceKind::Pawn, Color::White));
    assert_eq!(0, game.board().count(PieceKind::Pawn, Color::Black));
}

#[test]
fn promotion_by_menu_number() {
    let board = Board::from_placement("4k3/P7/8/8/8/8/8/Q3K3").unwrap();
    let mut game = Game::from_board(board, CastleStatus::NONE);
    let queens_before = game.board().count(PieceKind::Queen, Color::White);
    game.play("a7a8", Color::White, &mut TypesFour).unwrap();

    let promoted = game.board().piece_at(sq("a8")).unwrap();
    assert_eq!(PieceKind::Queen, promoted.kind);
    assert_eq!(queens_before as u8, promoted.ordinal);
    assert_eq!(vec!["a7a8q"], game.move_tokens());
}

#[test]
fn engine_move_list_from_game() {
    let mut game = Game::new();
    for &(token, color) in &[
        ("e2e4", Color::White),
        ("e7e5", Color::Black),
        ("g1f3", Color::White),
    ] {
        game.play(token, color, &mut queen()).unwrap();
    }

    assert_eq!(vec!["e2e4", "e7e5", "g1f3"], game.move_tokens());
}
