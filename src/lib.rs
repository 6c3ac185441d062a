//! # Rust Q-Learn
//!
//! A tabular Q-learning core for turn-based board games.
//!
//! ## Features
//!
//! - **Generic over games**: Works with any game implementing the `Game` trait
//! - **Sparse table**: States are created on first lookup with a neutral value
//! - **Chained rewards**: One outcome is credited to a chain of earlier moves
//! - **Legal-move aware selection**: Greedy choice restricted to legal moves,
//!   with an optional random tie-break
//! - **Self-play training**: Epsilon-greedy loop and parallel evaluation
//!
//! ## Quick Start
//!
//! ```ignore
//! use rust_qlearn::qlearn::{Game, QTable};
//!
//! // 1. Implement the Game trait for your game
//! // 2. Build a table from its output format
//! let mut table = QTable::new(game.output_format());
//!
//! // 3. Pick, record and reward a move
//! let value = table.get_q_value(game.encode_board());
//! let action = game.decode_action(value.scores(), true, &mut rng)?;
//! value.to_update(action);
//! game.apply_action(action);
//! value.update(reward);
//! ```
//!
//! ## Modules
//!
//! - [`qlearn`]: Core table, values, action encoding and training loop
//! - [`games`]: Example game implementations (Tic-Tac-Toe)
//! - [`logging`]: Process-wide message log
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Q-Learning Core (Generic)                    │
//! │  - QTable (state -> QValue)   - Chained reward updates          │
//! │  - OutputFormat               - Greedy / tie-break selection    │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ implements Game trait
//!                               ▼
//!                        ┌─────────────┐
//!                        │ Tic-Tac-Toe │
//!                        └─────────────┘
//! ```

#![warn(missing_docs)]

/// Q-learning module.
///
/// This is the core module containing the table, values and action encoding.
pub mod qlearn;

/// Game implementations module.
///
/// Contains example games like Tic-Tac-Toe for testing and validation.
pub mod games;

/// Logging module.
///
/// Process-wide logger that reports at info, debug, warning and error level.
pub mod logging;

// Re-export commonly used types at crate root for convenience
pub use qlearn::{Game, OutputFormat, QConfig, QTable, QValue, Trainer, TrainingConfig};
