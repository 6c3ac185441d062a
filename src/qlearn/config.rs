//! Configuration options for Q-tables and self-play training.
//!
//! [`QConfig`] shapes the values a table creates. [`TrainingConfig`] drives the
//! epsilon-greedy training loop and can be loaded from JSON so that runs can
//! be tuned without recompiling.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::qlearn::q_value::{DEFAULT_CHAIN_DECAY, NEUTRAL_VALUE};

/// Configuration for values created by a [`QTable`](crate::qlearn::QTable).
///
/// # Example
/// ```
/// use rust_qlearn::qlearn::QConfig;
///
/// let config = QConfig::default();
/// assert_eq!(config.initial_value, 0.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QConfig {
    /// Score every action of a newly seen state starts with.
    pub initial_value: f64,

    /// Factor applied to the carried reward for each older action in a
    /// pending chain. 1.0 credits the whole chain equally.
    pub chain_decay: f64,
}

impl Default for QConfig {
    fn default() -> Self {
        Self {
            initial_value: NEUTRAL_VALUE,
            chain_decay: DEFAULT_CHAIN_DECAY,
        }
    }
}

impl QConfig {
    /// Create a QConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the initial action value.
    pub fn with_initial_value(mut self, value: f64) -> Self {
        self.initial_value = value;
        self
    }

    /// Builder method: set the chain decay.
    pub fn with_chain_decay(mut self, decay: f64) -> Self {
        self.chain_decay = decay;
        self
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_value.is_finite() {
            return Err(ConfigError::NonFinite("initial value", self.initial_value));
        }
        if !(0.0..=1.0).contains(&self.chain_decay) {
            return Err(ConfigError::InvalidFactor("chain decay", self.chain_decay));
        }
        Ok(())
    }
}

/// Configuration for the self-play training loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of self-play episodes to run.
    pub episodes: u64,

    /// Probability of playing a uniformly random legal move instead of the
    /// greedy one.
    pub epsilon: f64,

    /// Multiplier decaying epsilon after every episode.
    pub epsilon_decay: f64,

    /// Lower bound for epsilon after decay.
    pub min_epsilon: f64,

    /// Scale applied to every reward before it is credited.
    pub learning_rate: f64,

    /// Discount applied per step back through a player's moves in an episode.
    pub discount: f64,

    /// Break ties between equal greedy scores at random.
    pub randomize_ties: bool,

    /// Settings for the values the table creates.
    pub q: QConfig,

    /// Random seed for reproducibility. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 50_000,
            epsilon: 0.3,
            epsilon_decay: 0.9999,
            min_epsilon: 0.05,
            learning_rate: 0.1,
            discount: 0.9,
            randomize_ties: true,
            q: QConfig::default(),
            seed: None,
        }
    }
}

impl TrainingConfig {
    /// Create a TrainingConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the number of episodes.
    pub fn with_episodes(mut self, episodes: u64) -> Self {
        self.episodes = episodes;
        self
    }

    /// Builder method: set the exploration probability.
    ///
    /// Lowers `min_epsilon` to match when it would otherwise be above it.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon.clamp(0.0, 1.0);
        self.min_epsilon = self.min_epsilon.min(self.epsilon);
        self
    }

    /// Builder method: set the learning rate.
    pub fn with_learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = rate;
        self
    }

    /// Builder method: set the per-step discount.
    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string. Missing fields use defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("epsilon", self.epsilon),
            ("epsilon decay", self.epsilon_decay),
            ("min epsilon", self.min_epsilon),
            ("learning rate", self.learning_rate),
            ("discount", self.discount),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidFactor(name, value));
            }
        }
        if self.min_epsilon > self.epsilon {
            return Err(ConfigError::EpsilonBounds {
                epsilon: self.epsilon,
                min_epsilon: self.min_epsilon,
            });
        }
        self.q.validate()
    }
}

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A probability or factor is out of range [0, 1].
    InvalidFactor(&'static str, f64),
    /// A value must be a finite number.
    NonFinite(&'static str, f64),
    /// `min_epsilon` is above the starting epsilon.
    EpsilonBounds {
        /// Starting epsilon.
        epsilon: f64,
        /// Floor for decayed epsilon.
        min_epsilon: f64,
    },
    /// Failed to read the config file.
    IoError(String),
    /// Failed to parse the config JSON.
    ParseError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidFactor(name, val) => {
                write!(f, "{} {} is out of range [0, 1]", name, val)
            }
            ConfigError::NonFinite(name, val) => write!(f, "{} {} is not finite", name, val),
            ConfigError::EpsilonBounds {
                epsilon,
                min_epsilon,
            } => write!(
                f,
                "min epsilon {} is greater than epsilon {}",
                min_epsilon, epsilon
            ),
            ConfigError::IoError(msg) => write!(f, "Failed to read config: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Statistics tracked during training.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Total number of episodes completed.
    pub episodes: u64,

    /// Wins per player index.
    pub wins: Vec<u64>,

    /// Episodes that ended without a winner.
    pub draws: u64,

    /// Number of distinct states in the table.
    pub states: usize,

    /// Exploration probability after the last episode.
    pub epsilon: f64,

    /// Total time spent training (in seconds).
    pub elapsed_seconds: f64,

    /// Episodes per second.
    pub episodes_per_second: f64,
}

impl TrainingStats {
    /// Create new empty stats for `num_players` players.
    pub fn new(num_players: usize) -> Self {
        Self {
            wins: vec![0; num_players],
            ..Default::default()
        }
    }

    /// Update episodes per second based on elapsed time.
    pub fn update_rate(&mut self) {
        if self.elapsed_seconds > 0.0 {
            self.episodes_per_second = self.episodes as f64 / self.elapsed_seconds;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(QConfig::default().validate().is_ok());
        assert!(TrainingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_chain_decay() {
        let config = QConfig::new().with_chain_decay(1.5);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidFactor("chain decay", 1.5))
        );
    }

    #[test]
    fn test_with_epsilon_keeps_floor_below_start() {
        let config = TrainingConfig::new().with_epsilon(0.0);
        assert_eq!(config.min_epsilon, 0.0);
        assert!(config.validate().is_ok());

        let config = TrainingConfig::new().with_epsilon(0.5);
        assert_eq!(config.min_epsilon, 0.05);
    }

    #[test]
    fn test_epsilon_bounds() {
        let mut config = TrainingConfig::new().with_epsilon(0.01);
        config.min_epsilon = 0.1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EpsilonBounds { .. })
        ));
    }

    #[test]
    fn test_from_json_uses_defaults_for_missing_fields() {
        let config =
            TrainingConfig::from_json_str(r#"{ "episodes": 10, "seed": 7 }"#).unwrap();
        assert_eq!(config.episodes, 10);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.epsilon, TrainingConfig::default().epsilon);
        assert_eq!(config.q.initial_value, 0.5);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        let err = TrainingConfig::from_json_str(r#"{ "learning_rate": 2.0 }"#).unwrap_err();
        assert_eq!(err, ConfigError::InvalidFactor("learning rate", 2.0));

        let err = TrainingConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_stats_rate() {
        let mut stats = TrainingStats::new(2);
        stats.episodes = 100;
        stats.elapsed_seconds = 2.0;
        stats.update_rate();
        assert_eq!(stats.episodes_per_second, 50.0);
        assert_eq!(stats.wins, vec![0, 0]);
    }
}
