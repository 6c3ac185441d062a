//! Game trait definition for the Q-learning core.
//!
//! Any turn-based game that implements [`Game`] can be played and trained by
//! the agents in this crate. The core only sees action indices, score vectors
//! and opaque state keys; the board representation stays with the game.

use std::sync::Arc;

use rand::Rng;

use crate::qlearn::encoding::StateKey;
use crate::qlearn::output_format::{FormatError, OutputFormat};

/// The interface a game exposes to the Q-learning core.
///
/// Unlike a pure state-transition model, a `Game` value is the live game:
/// [`apply_action`](Game::apply_action) mutates it in place.
///
/// # Example
/// ```ignore
/// struct MyGame { /* board, turn, status */ }
///
/// impl Game for MyGame {
///     type Key = BitKey;
///
///     // ... implement required methods
/// }
/// ```
pub trait Game: Clone + Send + Sync {
    /// Opaque key type used to index the Q-table.
    type Key: StateKey;

    /// Index of the player whose turn it is.
    fn current_player(&self) -> usize;

    /// Highest value a board cell can hold, which is also the number of
    /// players when cell values are player marks.
    fn max_player_index(&self) -> usize;

    /// Number of discrete positions in the action space.
    fn board_size(&self) -> usize;

    /// The action-space descriptor, shared with any table built for the game.
    fn output_format(&self) -> Arc<OutputFormat>;

    /// Current per-cell values, in position order.
    fn board_state(&self) -> Vec<usize>;

    /// Currently legal action indices, ascending. Empty once the game is over.
    fn legal_moves(&self) -> Vec<usize>;

    /// Encode the current state as a table key.
    fn encode_board(&self) -> Self::Key;

    /// Apply `action` for the current player and advance the turn.
    ///
    /// # Panics
    /// Implementations panic on an illegal action; callers pick actions from
    /// [`legal_moves`](Game::legal_moves).
    fn apply_action(&mut self, action: usize);

    /// Reward for `player` at the current state. Zero while the game is on.
    fn payoff(&self, player: usize) -> f64;

    /// Resolve a score vector to one currently legal action.
    ///
    /// # Errors
    /// Returns [`FormatError::NoLegalMoves`] when the game is over.
    fn decode_action<R: Rng + ?Sized>(
        &self,
        scores: &[f64],
        randomize: bool,
        rng: &mut R,
    ) -> Result<usize, FormatError> {
        self.output_format()
            .convert_output(scores, &self.legal_moves(), randomize, rng)
    }

    /// Check if the game is over.
    fn is_terminal(&self) -> bool {
        self.legal_moves().is_empty()
    }

    /// Restart from the initial position.
    fn reset(&mut self);

    /// Human-readable board, used for diagnostics.
    fn render(&self) -> String {
        format!("{:?}", self.board_state())
    }
}
