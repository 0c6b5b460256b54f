//! Core domain types for tic-tac-toe.

use crate::action::MoveError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, instrument};

/// Number of squares on the board.
pub const BOARD_SIZE: usize = 9;

/// Player in the game.
///
/// `X` is player one, `O` is player two. In local games the human is
/// always `X`; online, the creator of a game plays `X` and the joiner `O`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
pub enum Player {
    /// Player one.
    X,
    /// Player two.
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

/// A square on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Square {
    /// Open square.
    #[default]
    Empty,
    /// Square occupied by a player.
    Occupied(Player),
}

impl Square {
    /// Returns the occupying player, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Square::Empty => None,
            Square::Occupied(player) => Some(player),
        }
    }
}

/// 3x3 tic-tac-toe board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    /// Squares in row-major order (index = row * 3 + col).
    squares: [Square; BOARD_SIZE],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            squares: [Square::Empty; BOARD_SIZE],
        }
    }

    /// Creates a board from explicit squares.
    pub fn from_squares(squares: [Square; BOARD_SIZE]) -> Self {
        Self { squares }
    }

    /// Gets the square at the given cell (0-8).
    pub fn get(&self, cell: usize) -> Option<Square> {
        self.squares.get(cell).copied()
    }

    /// Checks if a square is empty. Out-of-range cells are never empty.
    pub fn is_empty(&self, cell: usize) -> bool {
        matches!(self.get(cell), Some(Square::Empty))
    }

    /// Whether the square still accepts a mark.
    ///
    /// A square is disabled as soon as a mark is placed on it.
    pub fn is_enabled(&self, cell: usize) -> bool {
        self.is_empty(cell)
    }

    /// Returns all squares.
    pub fn squares(&self) -> &[Square; BOARD_SIZE] {
        &self.squares
    }

    /// Indices of all open squares, ascending.
    pub fn empty_cells(&self) -> Vec<usize> {
        (0..BOARD_SIZE).filter(|&cell| self.is_empty(cell)).collect()
    }

    /// Number of marks placed by `player`.
    pub fn count(&self, player: Player) -> usize {
        self.squares
            .iter()
            .filter(|sq| **sq == Square::Occupied(player))
            .count()
    }

    /// Places `player`'s mark on `cell`.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::OutOfRange`] if `cell` is not in `0..9` and
    /// [`MoveError::SquareOccupied`] if it already holds a mark. In both cases
    /// the board is left untouched.
    #[instrument(skip(self))]
    pub fn apply_move(&mut self, cell: usize, player: Player) -> Result<(), MoveError> {
        match self.squares.get_mut(cell) {
            None => {
                debug!(cell, "Cell out of range");
                Err(MoveError::OutOfRange(cell))
            }
            Some(Square::Occupied(_)) => {
                debug!(cell, "Cell already occupied");
                Err(MoveError::SquareOccupied(cell))
            }
            Some(square) => {
                *square = Square::Occupied(player);
                Ok(())
            }
        }
    }

    /// Returns a copy with `cell` set to `square`, bypassing validation.
    ///
    /// Used by the computer heuristic to simulate hypothetical moves.
    pub(crate) fn with_square(&self, cell: usize, square: Square) -> Self {
        let mut board = self.clone();
        board.squares[cell] = square;
        board
    }

    /// Formats the board as a human-readable string.
    ///
    /// Open squares show their cell number so players can type it.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let cell = row * 3 + col;
                let symbol = match self.squares[cell] {
                    Square::Empty => cell.to_string(),
                    Square::Occupied(player) => player.to_string(),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Board {
    type Err = String;

    /// Parses nine characters (`X`, `O`, `.`), whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let marks: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        if marks.len() != BOARD_SIZE {
            return Err(format!("expected {} squares, found {}", BOARD_SIZE, marks.len()));
        }

        let mut squares = [Square::Empty; BOARD_SIZE];
        for (square, mark) in squares.iter_mut().zip(marks) {
            *square = match mark {
                'X' | 'x' => Square::Occupied(Player::X),
                'O' | 'o' => Square::Occupied(Player::O),
                '.' | '-' | '_' => Square::Empty,
                other => return Err(format!("invalid square '{}'", other)),
            };
        }
        Ok(Self { squares })
    }
}

/// State of a game, derived from the board by [`crate::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum GameState {
    /// No winner yet and open squares remain.
    InProgress,
    /// Board full without a winning line.
    Tie,
    /// Player X completed a line.
    WinnerX,
    /// Player O completed a line.
    WinnerO,
}

impl GameState {
    /// Whether the game has ended.
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameState::InProgress)
    }

    /// Returns the winner if there is one.
    pub fn winner(self) -> Option<Player> {
        match self {
            GameState::WinnerX => Some(Player::X),
            GameState::WinnerO => Some(Player::O),
            GameState::InProgress | GameState::Tie => None,
        }
    }

    /// The winning state for `player`.
    pub fn won_by(player: Player) -> Self {
        match player {
            Player::X => GameState::WinnerX,
            Player::O => GameState::WinnerO,
        }
    }
}

/// Strength of the computer opponent.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum DifficultyLevel {
    /// Random open square.
    Easy,
    /// Takes an immediate win when one exists.
    Harder,
    /// Takes an immediate win, otherwise blocks the opponent's.
    #[default]
    Expert,
}

/// Who the human plays against.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum GameMode {
    /// Human against the computer on one device.
    #[default]
    SinglePlayer,
    /// Two humans sharing a game through the online store.
    Multiplayer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_board() {
        let board: Board = "XO. .X. ..O".parse().unwrap();
        assert_eq!(board.get(0), Some(Square::Occupied(Player::X)));
        assert_eq!(board.get(1), Some(Square::Occupied(Player::O)));
        assert_eq!(board.get(2), Some(Square::Empty));
        assert_eq!(board.count(Player::X), 2);
        assert_eq!(board.empty_cells(), vec![2, 3, 5, 6, 7]);
    }

    #[test]
    fn test_parse_board_wrong_length() {
        assert!("XOX".parse::<Board>().is_err());
        assert!("XOXOXOXO?".parse::<Board>().is_err());
    }

    #[test]
    fn test_apply_move_disables_square() {
        let mut board = Board::new();
        assert!(board.is_enabled(4));
        board.apply_move(4, Player::O).unwrap();
        assert!(!board.is_enabled(4));
        assert_eq!(board.get(4), Some(Square::Occupied(Player::O)));
    }

    #[test]
    fn test_display_shows_cell_numbers() {
        let board: Board = "X........".parse().unwrap();
        assert_eq!(board.display(), "X|1|2\n-+-+-\n3|4|5\n-+-+-\n6|7|8");
    }

    #[test]
    fn test_difficulty_parse_case_insensitive() {
        assert_eq!("easy".parse::<DifficultyLevel>().unwrap(), DifficultyLevel::Easy);
        assert_eq!("EXPERT".parse::<DifficultyLevel>().unwrap(), DifficultyLevel::Expert);
        assert_eq!(DifficultyLevel::default(), DifficultyLevel::Expert);
    }

    #[test]
    fn test_game_state_winner() {
        assert_eq!(GameState::WinnerO.winner(), Some(Player::O));
        assert_eq!(GameState::Tie.winner(), None);
        assert!(GameState::Tie.is_terminal());
        assert!(!GameState::InProgress.is_terminal());
        assert_eq!(GameState::won_by(Player::X), GameState::WinnerX);
    }
}
