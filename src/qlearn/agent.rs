//! Move-picking agents.
//!
//! These sit outside the learning core: they ask a [`Game`] for its legal
//! moves and either choose one at random or decode a score vector through
//! the game's [`OutputFormat`](crate::qlearn::OutputFormat).

use std::fmt;

use rand::Rng;

use crate::qlearn::encoding::StateKey;
use crate::qlearn::game::Game;
use crate::qlearn::output_format::FormatError;
use crate::qlearn::q_table::QTable;

/// Pick an index into a list of `num_moves` legal moves uniformly at random.
///
/// # Errors
/// Returns [`AgentError::NoMovesAvailable`] when `num_moves` is zero; the
/// caller should have checked whether the game is over.
pub fn random_agent_play<R: Rng + ?Sized>(
    num_moves: usize,
    rng: &mut R,
) -> Result<usize, AgentError> {
    match num_moves {
        0 => Err(AgentError::NoMovesAvailable),
        1 => Ok(0),
        n => Ok(rng.gen_range(0..n)),
    }
}

/// Decode an externally produced score vector into a legal action for `game`.
pub fn q_agent_play<G: Game, R: Rng + ?Sized>(
    game: &G,
    scores: &[f64],
    randomize: bool,
    rng: &mut R,
) -> Result<usize, AgentError> {
    Ok(game.decode_action(scores, randomize, rng)?)
}

/// How a player chooses moves.
#[derive(Debug, Clone)]
pub enum Agent {
    /// Uniformly random legal move.
    Random,
    /// Fixed score vector, e.g. the output of an external model.
    Scores(Vec<f64>),
    /// Greedy on the table's current scores, random tie-break.
    Greedy,
}

impl Agent {
    /// Choose an action for the current player of `game`.
    ///
    /// `table` is only read; unseen states use the table's initial value.
    pub fn choose<G, R>(
        &self,
        game: &G,
        table: &QTable<G::Key>,
        rng: &mut R,
    ) -> Result<usize, AgentError>
    where
        G: Game,
        R: Rng + ?Sized,
    {
        match self {
            Agent::Random => {
                let moves = game.legal_moves();
                let index = random_agent_play(moves.len(), rng)?;
                Ok(moves[index])
            }
            Agent::Scores(scores) => q_agent_play(game, scores, false, rng),
            Agent::Greedy => greedy_action(game, table, true, rng),
        }
    }
}

/// Greedy action for the current state of `game` according to `table`.
pub fn greedy_action<G, K, R>(
    game: &G,
    table: &QTable<K>,
    randomize: bool,
    rng: &mut R,
) -> Result<usize, AgentError>
where
    G: Game<Key = K>,
    K: StateKey,
    R: Rng + ?Sized,
{
    let key = game.encode_board();
    match table.peek(&key) {
        Some(value) => q_agent_play(game, value.scores(), randomize, rng),
        None => q_agent_play(game, &table.default_q_value().scores(), randomize, rng),
    }
}

/// Errors raised while choosing a move.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentError {
    /// The game has no legal moves left.
    NoMovesAvailable,
    /// The score vector could not be decoded.
    Format(FormatError),
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::NoMovesAvailable => write!(f, "No moves available; game over?"),
            AgentError::Format(e) => write!(f, "Could not decode action: {}", e),
        }
    }
}

impl std::error::Error for AgentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AgentError::Format(e) => Some(e),
            AgentError::NoMovesAvailable => None,
        }
    }
}

impl From<FormatError> for AgentError {
    fn from(e: FormatError) -> Self {
        match e {
            FormatError::NoLegalMoves => AgentError::NoMovesAvailable,
            other => AgentError::Format(other),
        }
    }
}
