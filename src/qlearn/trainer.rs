//! Epsilon-greedy self-play training and greedy evaluation.
//!
//! The core only offers greedy selection with a random tie-break. This module
//! is the loop around it: it decides when to explore, remembers every chosen
//! `(state, action)` in the mover's trail, and once an episode ends credits
//! each trail entry on its state's [`QValue`](crate::qlearn::QValue) with the
//! mover's own payoff.
//!
//! Nothing is left pending on the table between episodes, so players that
//! reach the same state key never drain each other's moves.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::qlearn::agent::{greedy_action, random_agent_play, AgentError};
use crate::qlearn::config::{ConfigError, TrainingConfig, TrainingStats};
use crate::qlearn::game::Game;
use crate::qlearn::q_table::QTable;

/// How an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeOutcome {
    /// The given player had the single best payoff.
    Win(usize),
    /// No single player came out ahead.
    Draw,
}

impl EpisodeOutcome {
    /// Classify the terminal state of `game`.
    pub fn of<G: Game>(game: &G, num_players: usize) -> Self {
        let payoffs: Vec<f64> = (0..num_players).map(|p| game.payoff(p)).collect();
        let best = payoffs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let leaders: Vec<usize> = (0..num_players).filter(|&p| payoffs[p] == best).collect();

        match leaders.as_slice() {
            [winner] => EpisodeOutcome::Win(*winner),
            _ => EpisodeOutcome::Draw,
        }
    }
}

/// Self-play trainer sharing one table between all players.
///
/// # Example
/// ```ignore
/// use rust_qlearn::qlearn::{Trainer, TrainingConfig};
/// use rust_qlearn::games::tictactoe::TicTacToe;
///
/// let config = TrainingConfig::default().with_episodes(10_000).with_seed(42);
/// let mut trainer = Trainer::new(TicTacToe::new(), config)?;
/// let stats = trainer.train()?;
/// println!("{} states after {} episodes", stats.states, stats.episodes);
/// ```
pub struct Trainer<G: Game> {
    /// Prototype game; each episode plays on a fresh clone.
    game: G,

    /// Configuration for the trainer.
    config: TrainingConfig,

    /// The table being trained.
    table: QTable<G::Key>,

    /// Current exploration probability.
    epsilon: f64,

    /// Statistics tracking.
    stats: TrainingStats,

    /// Random number generator.
    rng: StdRng,
}

impl<G: Game> Trainer<G> {
    /// Create a trainer for `game`.
    ///
    /// # Errors
    /// Returns the first problem [`TrainingConfig::validate`] finds.
    pub fn new(game: G, config: TrainingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let table = QTable::with_config(game.output_format(), config.q.clone());
        let num_players = game.max_player_index();

        Ok(Self {
            game,
            epsilon: config.epsilon,
            config,
            table,
            stats: TrainingStats::new(num_players),
            rng,
        })
    }

    /// Play one self-play episode and credit every move made in it.
    ///
    /// Moves are only written to the table once the episode has ended, so an
    /// error part way through leaves no pending actions behind.
    pub fn play_episode(&mut self) -> Result<EpisodeOutcome, AgentError> {
        let num_players = self.game.max_player_index();
        let mut game = self.game.clone();
        game.reset();

        // (state, action) per player, oldest first.
        let mut trails: Vec<Vec<(G::Key, usize)>> = vec![Vec::new(); num_players];

        while !game.is_terminal() {
            let player = game.current_player();
            let key = game.encode_board();
            let explore = self.rng.gen::<f64>() < self.epsilon;

            let action = if explore {
                let moves = game.legal_moves();
                moves[random_agent_play(moves.len(), &mut self.rng)?]
            } else {
                let value = self.table.get_q_value(key.clone());
                game.decode_action(value.scores(), self.config.randomize_ties, &mut self.rng)?
            };

            trails[player].push((key, action));
            game.apply_action(action);
        }

        for (player, trail) in trails.into_iter().enumerate() {
            let reward = game.payoff(player);
            let mut scale = self.config.learning_rate;
            for (key, action) in trail.into_iter().rev() {
                let value = self.table.get_q_value(key);
                value.to_update(action);
                value.update(scale * reward);
                scale *= self.config.discount;
            }
        }

        let outcome = EpisodeOutcome::of(&game, num_players);
        match outcome {
            EpisodeOutcome::Win(player) => self.stats.wins[player] += 1,
            EpisodeOutcome::Draw => self.stats.draws += 1,
        }
        self.stats.episodes += 1;
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.min_epsilon);

        Ok(outcome)
    }

    /// Run the configured number of episodes.
    pub fn train(&mut self) -> Result<&TrainingStats, AgentError> {
        self.train_with_callback(0, |_| {})
    }

    /// Train with a callback for progress tracking.
    ///
    /// # Arguments
    /// * `callback_interval` - How often to call the callback (0 = never)
    /// * `callback` - Function called every `callback_interval` episodes
    pub fn train_with_callback<F>(
        &mut self,
        callback_interval: u64,
        mut callback: F,
    ) -> Result<&TrainingStats, AgentError>
    where
        F: FnMut(&TrainingStats),
    {
        let start_time = Instant::now();

        for i in 0..self.config.episodes {
            self.play_episode()?;

            if callback_interval > 0 && (i + 1) % callback_interval == 0 {
                self.refresh_stats(start_time);
                callback(&self.stats);
            }
        }

        self.refresh_stats(start_time);
        tracing::debug!(
            episodes = self.stats.episodes,
            states = self.stats.states,
            epsilon = self.epsilon,
            "training finished"
        );

        Ok(&self.stats)
    }

    fn refresh_stats(&mut self, start_time: Instant) {
        self.stats.states = self.table.len();
        self.stats.epsilon = self.epsilon;
        self.stats.elapsed_seconds = start_time.elapsed().as_secs_f64();
        self.stats.update_rate();
    }

    /// The trained table.
    pub fn table(&self) -> &QTable<G::Key> {
        &self.table
    }

    /// Consume the trainer and keep the table.
    pub fn into_table(self) -> QTable<G::Key> {
        self.table
    }

    /// Current exploration probability.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Get training statistics.
    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    /// Get the configuration.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Get the prototype game.
    pub fn game(&self) -> &G {
        &self.game
    }
}

/// Results of a batch of evaluation games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalStats {
    /// Games played.
    pub games: usize,
    /// Games the greedy player won.
    pub wins: usize,
    /// Games the greedy player lost.
    pub losses: usize,
    /// Games without a single winner.
    pub draws: usize,
}

impl EvalStats {
    fn record(outcome: EpisodeOutcome, learner: usize) -> Self {
        let mut stats = Self {
            games: 1,
            ..Default::default()
        };
        match outcome {
            EpisodeOutcome::Win(p) if p == learner => stats.wins = 1,
            EpisodeOutcome::Win(_) => stats.losses = 1,
            EpisodeOutcome::Draw => stats.draws = 1,
        }
        stats
    }

    fn merge(self, other: Self) -> Self {
        Self {
            games: self.games + other.games,
            wins: self.wins + other.wins,
            losses: self.losses + other.losses,
            draws: self.draws + other.draws,
        }
    }

    /// Fraction of games won.
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64
        }
    }

    /// Fraction of games not lost.
    pub fn non_loss_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            (self.wins + self.draws) as f64 / self.games as f64
        }
    }
}

/// Play `games` games of greedy `learner` against random opponents, in parallel.
///
/// The table is only read, so any number of games can share it. Game `i` is
/// seeded with `seed + i`, which makes the result independent of scheduling.
pub fn evaluate<G: Game>(
    table: &QTable<G::Key>,
    game: &G,
    learner: usize,
    games: usize,
    seed: u64,
) -> Result<EvalStats, AgentError> {
    let num_players = game.max_player_index();

    let outcomes: Vec<EpisodeOutcome> = (0..games)
        .into_par_iter()
        .map(|i| -> Result<EpisodeOutcome, AgentError> {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            let mut game = game.clone();
            game.reset();

            while !game.is_terminal() {
                let action = if game.current_player() == learner {
                    greedy_action(&game, table, true, &mut rng)?
                } else {
                    let moves = game.legal_moves();
                    moves[random_agent_play(moves.len(), &mut rng)?]
                };
                game.apply_action(action);
            }

            Ok(EpisodeOutcome::of(&game, num_players))
        })
        .collect::<Result<_, _>>()?;

    Ok(outcomes
        .into_iter()
        .map(|o| EvalStats::record(o, learner))
        .fold(EvalStats::default(), EvalStats::merge))
}
