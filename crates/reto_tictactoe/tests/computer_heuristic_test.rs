//! Tests for the computer opponent across difficulty levels.

use rand::SeedableRng;
use rand::rngs::StdRng;
use reto_tictactoe::{
    Board, BOARD_SIZE, DifficultyLevel, Player, Square, blocking_move, check_winner, choose_move,
    winning_move,
};

/// Every board reachable in play with O (the computer) to move.
fn reachable_o_to_move() -> Vec<Board> {
    let mut out = Vec::new();
    let mut stack = vec![(Board::new(), Player::X)];
    let mut seen = std::collections::HashSet::new();

    while let Some((board, to_move)) = stack.pop() {
        if !seen.insert((board.clone(), to_move)) || check_winner(&board).is_some() {
            continue;
        }
        if to_move == Player::O && !board.empty_cells().is_empty() {
            out.push(board.clone());
        }
        for cell in board.empty_cells() {
            let mut next = board.clone();
            next.apply_move(cell, to_move).unwrap();
            stack.push((next, to_move.opponent()));
        }
    }
    out
}

fn wins_after(board: &Board, cell: usize, player: Player) -> bool {
    let mut next = board.clone();
    next.apply_move(cell, player).unwrap();
    check_winner(&next) == Some(player)
}

#[test]
fn test_expert_always_blocks_when_no_win() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut checked = 0;

    for board in reachable_o_to_move() {
        let threats: Vec<usize> = board
            .empty_cells()
            .into_iter()
            .filter(|&cell| wins_after(&board, cell, Player::X))
            .collect();
        if threats.is_empty() || winning_move(&board, Player::O).is_some() {
            continue;
        }

        let cell = choose_move(&board, Player::O, DifficultyLevel::Expert, &mut rng).unwrap();
        assert!(threats.contains(&cell), "expected a block on\n{}", board.display());
        checked += 1;
    }

    assert!(checked > 0);
}

#[test]
fn test_harder_and_expert_always_take_wins() {
    let mut rng = StdRng::seed_from_u64(11);

    for board in reachable_o_to_move() {
        if winning_move(&board, Player::O).is_none() {
            continue;
        }
        for level in [DifficultyLevel::Harder, DifficultyLevel::Expert] {
            let cell = choose_move(&board, Player::O, level, &mut rng).unwrap();
            assert!(wins_after(&board, cell, Player::O), "{level} missed a win");
        }
    }
}

#[test]
fn test_moves_always_on_open_squares() {
    let mut rng = StdRng::seed_from_u64(5);

    for board in reachable_o_to_move().into_iter().step_by(11) {
        for level in [DifficultyLevel::Easy, DifficultyLevel::Harder, DifficultyLevel::Expert] {
            let cell = choose_move(&board, Player::O, level, &mut rng).unwrap();
            assert!(cell < BOARD_SIZE);
            assert_eq!(board.get(cell), Some(Square::Empty));
        }
    }
}

#[test]
fn test_easy_may_skip_the_block() {
    // X threatens the top row at 2.
    let board: Board = "XX. .O. ...".parse().unwrap();
    assert_eq!(blocking_move(&board, Player::O), Some(2));

    let non_blocking = (0..100).any(|seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        choose_move(&board, Player::O, DifficultyLevel::Easy, &mut rng) != Some(2)
    });
    assert!(non_blocking);
}

#[test]
fn test_easy_is_roughly_uniform() {
    let board = Board::new();
    let mut rng = StdRng::seed_from_u64(99);
    let mut counts = [0usize; BOARD_SIZE];

    for _ in 0..9000 {
        let cell = choose_move(&board, Player::O, DifficultyLevel::Easy, &mut rng).unwrap();
        counts[cell] += 1;
    }

    for count in counts {
        assert!((700..1300).contains(&count), "skewed distribution: {:?}", counts);
    }
}
