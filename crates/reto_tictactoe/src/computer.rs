//! Computer opponent heuristic.
//!
//! No search tree: the computer looks one move ahead only.
//! - `Easy` plays a uniformly random open square.
//! - `Harder` takes an immediate win when one exists.
//! - `Expert` additionally blocks the opponent's immediate win.

use crate::rules::check_winner;
use crate::types::{Board, DifficultyLevel, Player, Square};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, instrument};

/// First open cell (index order) where `player` would complete a line.
#[instrument(skip(board))]
pub fn winning_move(board: &Board, player: Player) -> Option<usize> {
    board
        .empty_cells()
        .into_iter()
        .find(|&cell| check_winner(&board.with_square(cell, Square::Occupied(player))) == Some(player))
}

/// Open cell that stops `player`'s opponent from completing a line.
///
/// When the opponent has several threats the last one in index order is
/// returned; only one of them can be blocked anyway.
#[instrument(skip(board))]
pub fn blocking_move(board: &Board, player: Player) -> Option<usize> {
    let opponent = player.opponent();
    board
        .empty_cells()
        .into_iter()
        .rfind(|&cell| check_winner(&board.with_square(cell, Square::Occupied(opponent))) == Some(opponent))
}

/// Picks the computer's next cell, or `None` when the board is full.
///
/// A winning move always takes precedence over a block.
#[instrument(skip(board, rng))]
pub fn choose_move<R: Rng + ?Sized>(
    board: &Board,
    computer: Player,
    difficulty: DifficultyLevel,
    rng: &mut R,
) -> Option<usize> {
    if difficulty != DifficultyLevel::Easy {
        if let Some(cell) = winning_move(board, computer) {
            debug!(cell, "Taking winning move");
            return Some(cell);
        }

        if difficulty == DifficultyLevel::Expert
            && let Some(cell) = blocking_move(board, computer)
        {
            debug!(cell, "Blocking opponent");
            return Some(cell);
        }
    }

    let cell = board.empty_cells().choose(rng).copied();
    debug!(cell = ?cell, "Random move");
    cell
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_winning_move_found() {
        let board: Board = "OO. XX. X..".parse().unwrap();
        assert_eq!(winning_move(&board, Player::O), Some(2));
        assert_eq!(winning_move(&board, Player::X), Some(2));
    }

    #[test]
    fn test_winning_move_first_in_index_order() {
        // O can win at 2 (top row) or 6 (left column).
        let board: Board = "OO. OXX .X.".parse().unwrap();
        assert_eq!(winning_move(&board, Player::O), Some(2));
    }

    #[test]
    fn test_blocking_move_last_in_index_order() {
        // X threatens 2 (top row) and 6 (left column).
        let board: Board = "XX. XO. .O.".parse().unwrap();
        assert_eq!(blocking_move(&board, Player::O), Some(6));
    }

    #[test]
    fn test_no_moves_on_full_board() {
        let board: Board = "XOX OXO OXO".parse().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(choose_move(&board, Player::O, DifficultyLevel::Expert, &mut rng), None);
    }

    #[test]
    fn test_expert_prefers_win_over_block() {
        // X threatens 2, but O completes the middle row at 5.
        let board: Board = "XX. OO. X..".parse().unwrap();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(choose_move(&board, Player::O, DifficultyLevel::Expert, &mut rng), Some(5));
        }
    }

    #[test]
    fn test_harder_does_not_block() {
        // X threatens 2 and O has no win: Harder falls back to random.
        let board: Board = "XX. .O. ...".parse().unwrap();
        let picks: std::collections::HashSet<usize> = (0..50)
            .filter_map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                choose_move(&board, Player::O, DifficultyLevel::Harder, &mut rng)
            })
            .collect();
        assert!(picks.len() > 1, "Harder should not always pick the block");
        assert!(picks.iter().all(|cell| board.is_empty(*cell)));
    }
}
