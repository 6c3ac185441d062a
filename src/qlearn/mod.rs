//! Tabular Q-learning module.
//!
//! This module provides a small, game-agnostic Q-learning core:
//!
//! - [`OutputFormat`] describes the action space and turns a score vector into
//!   one legal action (greedy, with an optional random tie-break).
//! - [`QValue`] holds one state's scores and a chain of actions awaiting a
//!   reward.
//! - [`QTable`] maps state keys to values, creating neutral entries on first
//!   lookup.
//! - [`Game`] is the contract a game implements to be played by the agents.
//!
//! # Usage
//!
//! 1. Implement the `Game` trait for your game
//! 2. Build a `QTable` from the game's output format
//! 3. Look up the current state, pick an action, record it with `to_update`
//! 4. Once the outcome is known, call `update` with the reward
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rand::SeedableRng;
//! use rust_qlearn::qlearn::{OutputFormat, QTable};
//!
//! let format = Arc::new(OutputFormat::positions(3));
//! let mut table: QTable<&str> = QTable::new(Arc::clone(&format));
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//!
//! let value = table.get_q_value("start");
//! let action = format.convert_output(value.scores(), &[0, 2], false, &mut rng).unwrap();
//! value.to_update(action);
//! value.update(1.0);
//!
//! assert_eq!(table.get_q_value("start")[0], 1.5);
//! ```
//!
//! # Update rule
//!
//! Actions recorded on a value form a chain. A reward `r` is credited most
//! recent first:
//! ```text
//! carry = r
//! for action in chain (newest to oldest):
//!     score[action] += carry
//!     carry *= decay
//! ```

pub mod agent;
pub mod config;
pub mod encoding;
pub mod game;
pub mod output_format;
pub mod q_table;
pub mod q_value;
pub mod self_test;
pub mod trainer;

// Re-export main types for convenient access
pub use agent::{q_agent_play, random_agent_play, Agent, AgentError};
pub use config::{ConfigError, QConfig, TrainingConfig, TrainingStats};
pub use encoding::{BitKey, StateKey};
pub use game::Game;
pub use output_format::{FormatError, OutputFormat, Segment, SegmentKind};
pub use q_table::QTable;
pub use q_value::{QValue, DEFAULT_CHAIN_DECAY, NEUTRAL_VALUE};
pub use trainer::{evaluate, EpisodeOutcome, EvalStats, Trainer};
