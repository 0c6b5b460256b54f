//! Exhaustive checks of the board evaluator over every 3^9 board.

use reto_tictactoe::{BOARD_SIZE, Board, GameState, LINES, Player, Square, evaluate};

fn all_boards() -> impl Iterator<Item = Board> {
    (0..3u32.pow(BOARD_SIZE as u32)).map(|mut code| {
        let mut squares = [Square::Empty; BOARD_SIZE];
        for square in squares.iter_mut() {
            *square = match code % 3 {
                0 => Square::Empty,
                1 => Square::Occupied(Player::X),
                _ => Square::Occupied(Player::O),
            };
            code /= 3;
        }
        Board::from_squares(squares)
    })
}

fn owns_line(board: &Board, player: Player) -> bool {
    LINES
        .iter()
        .any(|line| line.iter().all(|&cell| board.get(cell) == Some(Square::Occupied(player))))
}

#[test]
fn test_single_winner_boards_report_that_winner() {
    for board in all_boards() {
        let x = owns_line(&board, Player::X);
        let o = owns_line(&board, Player::O);
        match (x, o) {
            (true, false) => assert_eq!(evaluate(&board), GameState::WinnerX, "{}", board.display()),
            (false, true) => assert_eq!(evaluate(&board), GameState::WinnerO, "{}", board.display()),
            (true, true) => assert!(evaluate(&board).winner().is_some()),
            (false, false) => assert!(evaluate(&board).winner().is_none()),
        }
    }
}

#[test]
fn test_full_boards_without_line_are_ties() {
    for board in all_boards() {
        let full = board.empty_cells().is_empty();
        let any_line = owns_line(&board, Player::X) || owns_line(&board, Player::O);
        if full && !any_line {
            assert_eq!(evaluate(&board), GameState::Tie);
        }
        if !full && !any_line {
            assert_eq!(evaluate(&board), GameState::InProgress);
        }
    }
}

#[test]
fn test_invalid_apply_move_never_mutates() {
    for board in all_boards().step_by(37) {
        for cell in 0..=BOARD_SIZE {
            if board.is_empty(cell) {
                continue;
            }
            for player in [Player::X, Player::O] {
                let mut copy = board.clone();
                assert!(copy.apply_move(cell, player).is_err());
                assert_eq!(copy, board);
            }
        }
    }
}

#[test]
fn test_top_row_scenario() {
    let mut board = Board::new();
    board.apply_move(0, Player::X).unwrap();
    board.apply_move(1, Player::X).unwrap();
    assert_eq!(evaluate(&board), GameState::InProgress);
    board.apply_move(2, Player::X).unwrap();
    assert_eq!(evaluate(&board), GameState::WinnerX);
}

#[test]
fn test_full_board_tie_scenario() {
    let board: Board = "XOX OXO OXO".parse().unwrap();
    assert_eq!(evaluate(&board), GameState::Tie);
}
