//! Tic-Tac-Toe implementation for the Q-learning core.
//!
//! Tic-Tac-Toe is small enough for a plain table to cover every reachable
//! state, which makes it a convenient check that the core learns anything.
//!
//! ## Board Layout
//!
//! Positions are numbered row by row, and the action for a position is its
//! index:
//!
//! ```text
//! 0 | 1 | 2
//! ---------
//! 3 | 4 | 5
//! ---------
//! 6 | 7 | 8
//! ```
//!
//! ## Encoding
//!
//! Cells map to `0` (empty), `1` (X) and `2` (O). The state key is the
//! one-hot [`BitKey`] of that board, two bits per cell.
//!
//! ## Payoffs
//!
//! - Winner: +1
//! - Loser: -1
//! - Draw: +0.5 for both players

use std::fmt;
use std::sync::Arc;

use crate::qlearn::encoding::BitKey;
use crate::qlearn::game::Game;
use crate::qlearn::output_format::OutputFormat;

/// Number of positions on the board.
pub const BOARD_SIZE: usize = 9;

/// All winning lines as position triples.
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Payoff for a drawn game.
pub const DRAW_PAYOFF: f64 = 0.5;

/// A cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// Nobody has played here.
    #[default]
    Empty,
    /// Marked by X.
    X,
    /// Marked by O.
    O,
}

impl Cell {
    fn to_char(self) -> char {
        match self {
            Cell::Empty => '_',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }
}

/// A player; X moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    /// First player, index 0.
    X,
    /// Second player, index 1.
    O,
}

impl Player {
    /// Get the opponent player.
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// The mark this player leaves.
    pub fn cell(self) -> Cell {
        match self {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }

    /// Player index used by the [`Game`] trait.
    pub fn index(self) -> usize {
        match self {
            Player::X => 0,
            Player::O => 1,
        }
    }
}

/// Where the game stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Moves remain and nobody has won.
    Playing,
    /// X completed a line.
    XWon,
    /// O completed a line.
    OWon,
    /// The board is full without a line.
    Draw,
}

/// A game of Tic-Tac-Toe.
#[derive(Debug, Clone)]
pub struct TicTacToe {
    cells: [Cell; BOARD_SIZE],
    current: Player,
    status: GameStatus,
    format: Arc<OutputFormat>,
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl TicTacToe {
    /// Create an empty board with X to move.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; BOARD_SIZE],
            current: Player::X,
            status: GameStatus::Playing,
            format: Arc::new(OutputFormat::positions(BOARD_SIZE)),
        }
    }

    /// Build a position from a 9-character string of `X`, `O` and `_`/`.`.
    ///
    /// The player to move is derived from the piece counts. Returns `None` for
    /// malformed strings.
    pub fn from_board(board: &str) -> Option<Self> {
        let chars: Vec<char> = board.chars().filter(|c| !c.is_whitespace()).collect();
        if chars.len() != BOARD_SIZE {
            return None;
        }

        let mut game = Self::new();
        for (i, c) in chars.iter().enumerate() {
            game.cells[i] = match c {
                'X' | 'x' => Cell::X,
                'O' | 'o' => Cell::O,
                '_' | '.' => Cell::Empty,
                _ => return None,
            };
        }

        let xs = game.cells.iter().filter(|&&c| c == Cell::X).count();
        let os = game.cells.iter().filter(|&&c| c == Cell::O).count();
        game.current = match xs.checked_sub(os) {
            Some(0) => Player::X,
            Some(1) => Player::O,
            _ => return None,
        };
        game.update_status();
        Some(game)
    }

    /// Current cells, row by row.
    pub fn cells(&self) -> &[Cell; BOARD_SIZE] {
        &self.cells
    }

    /// Player to move.
    pub fn player(&self) -> Player {
        self.current
    }

    /// Where the game stands.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Recompute the status from the board.
    fn update_status(&mut self) {
        for line in WINNING_LINES {
            let first = self.cells[line[0]];
            if first != Cell::Empty && line.iter().all(|&i| self.cells[i] == first) {
                self.status = if first == Cell::X {
                    GameStatus::XWon
                } else {
                    GameStatus::OWon
                };
                return;
            }
        }

        self.status = if self.cells.iter().any(|&c| c == Cell::Empty) {
            GameStatus::Playing
        } else {
            GameStatus::Draw
        };
    }
}

impl Game for TicTacToe {
    type Key = BitKey;

    fn current_player(&self) -> usize {
        self.current.index()
    }

    fn max_player_index(&self) -> usize {
        2
    }

    fn board_size(&self) -> usize {
        BOARD_SIZE
    }

    fn output_format(&self) -> Arc<OutputFormat> {
        Arc::clone(&self.format)
    }

    fn board_state(&self) -> Vec<usize> {
        self.cells
            .iter()
            .map(|c| match c {
                Cell::Empty => 0,
                Cell::X => 1,
                Cell::O => 2,
            })
            .collect()
    }

    fn legal_moves(&self) -> Vec<usize> {
        if self.status != GameStatus::Playing {
            return vec![];
        }
        (0..BOARD_SIZE)
            .filter(|&i| self.cells[i] == Cell::Empty)
            .collect()
    }

    fn encode_board(&self) -> BitKey {
        BitKey::one_hot(&self.board_state(), self.max_player_index())
    }

    fn apply_action(&mut self, action: usize) {
        assert!(
            self.status == GameStatus::Playing,
            "move {} played after the game ended ({:?})",
            action,
            self.status
        );
        assert!(action < BOARD_SIZE, "move {} is off the board", action);
        assert!(
            self.cells[action] == Cell::Empty,
            "position {} is already occupied",
            action
        );

        self.cells[action] = self.current.cell();
        self.current = self.current.opponent();
        self.update_status();
    }

    fn payoff(&self, player: usize) -> f64 {
        let winner = match self.status {
            GameStatus::Playing => return 0.0,
            GameStatus::Draw => return DRAW_PAYOFF,
            GameStatus::XWon => Player::X,
            GameStatus::OWon => Player::O,
        };
        if winner.index() == player {
            1.0
        } else {
            -1.0
        }
    }

    fn reset(&mut self) {
        self.cells = [Cell::Empty; BOARD_SIZE];
        self.current = Player::X;
        self.status = GameStatus::Playing;
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TicTacToe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(3) {
            let line: String = row.iter().map(|c| c.to_char()).collect();
            writeln!(f, "{}", line)?;
        }
        match self.status {
            GameStatus::XWon => write!(f, "X Won!"),
            GameStatus::OWon => write!(f, "O Won!"),
            GameStatus::Draw => write!(f, "Draw!"),
            GameStatus::Playing => write!(f, "{:?} to move", self.current),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_initial_state() {
        let game = TicTacToe::new();
        assert_eq!(game.current_player(), 0);
        assert_eq!(game.legal_moves(), (0..9).collect::<Vec<_>>());
        assert_eq!(game.board_state(), vec![0; 9]);
        assert_eq!(game.output_format().action_count(), game.board_size());
        assert!(!game.is_terminal());
    }

    #[test]
    fn test_turns_alternate() {
        let mut game = TicTacToe::new();
        game.apply_action(4);
        assert_eq!(game.current_player(), 1);
        assert_eq!(game.board_state()[4], 1);
        game.apply_action(0);
        assert_eq!(game.current_player(), 0);
        assert_eq!(game.board_state()[0], 2);
        assert_eq!(game.legal_moves().len(), 7);
    }

    #[test]
    fn test_row_win() {
        let mut game = TicTacToe::new();
        for action in [0, 3, 1, 4, 2] {
            game.apply_action(action);
        }
        assert_eq!(game.status(), GameStatus::XWon);
        assert!(game.is_terminal());
        assert!(game.legal_moves().is_empty());
        assert_eq!(game.payoff(0), 1.0);
        assert_eq!(game.payoff(1), -1.0);
    }

    #[test]
    fn test_diagonal_win_for_o() {
        let game = TicTacToe::from_board("XXO_O_OX_").unwrap();
        assert_eq!(game.status(), GameStatus::OWon);
        assert_eq!(game.payoff(1), 1.0);
    }

    #[test]
    fn test_draw() {
        let game = TicTacToe::from_board("XOXXOOOXX").unwrap();
        assert_eq!(game.status(), GameStatus::Draw);
        assert_eq!(game.payoff(0), DRAW_PAYOFF);
        assert_eq!(game.payoff(1), DRAW_PAYOFF);
    }

    #[test]
    fn test_from_board_rejects_bad_input() {
        assert!(TicTacToe::from_board("XX").is_none());
        assert!(TicTacToe::from_board("XXX______").is_none());
        assert!(TicTacToe::from_board("Q________").is_none());
    }

    #[test]
    fn test_encoding_is_order_sensitive() {
        let a = TicTacToe::from_board("XO_______").unwrap();
        let b = TicTacToe::from_board("OX_______").unwrap();
        assert_ne!(a.encode_board(), b.encode_board());
        assert_eq!(a.encode_board(), TicTacToe::from_board("XO_______").unwrap().encode_board());
        assert_eq!(a.encode_board().to_string(), "100100000000000000");
    }

    #[test]
    fn test_decode_action_uses_legal_moves() {
        let game = TicTacToe::from_board("____X____").unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let scores = [0.2, 0.9, 0.0, 0.0, 1.0, 0.0, 0.0, 0.9, 0.3];
        assert_eq!(game.decode_action(&scores, false, &mut rng), Ok(1));
    }

    #[test]
    fn test_reset() {
        let mut game = TicTacToe::from_board("XO_______").unwrap();
        game.reset();
        assert_eq!(game.board_state(), vec![0; 9]);
        assert_eq!(game.player(), Player::X);
    }

    #[test]
    #[should_panic(expected = "already occupied")]
    fn test_occupied_cell_panics() {
        let mut game = TicTacToe::new();
        game.apply_action(4);
        game.apply_action(4);
    }

    #[test]
    fn test_render() {
        let game = TicTacToe::from_board("XOO_X___X").unwrap();
        assert_eq!(game.render(), "XOO\n_X_\n__X\nX Won!");
    }
}
