//! Game implementations for the Q-learning core.
//!
//! The games in this module are consumers of the core: they implement the
//! `Game` trait and are played by the agents in [`crate::qlearn`]. They serve
//! as:
//!
//! 1. **Validation**: small games where a table can cover every state show
//!    that training actually improves play.
//!
//! 2. **Examples**: Demonstrate how to implement the `Game` trait for new games.
//!
//! 3. **Benchmarks**: Provide standardized games for performance testing.
//!
//! ## Available Games
//!
//! - [`tictactoe`]: 3x3 Tic-Tac-Toe
//!
//! ## Adding New Games
//!
//! To add a new game:
//!
//! 1. Create a new module under `src/games/`
//! 2. Choose a state key type (`BitKey` works for cell boards)
//! 3. Implement the `Game` trait
//! 4. Add tests that verify expected behavior
//!
//! See the [`tictactoe`] module for a complete example.

pub mod tictactoe;
