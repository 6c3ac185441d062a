//! Machine-learning self-test.
//!
//! Checks the table default and the chained update rule, then plays one game
//! of Tic-Tac-Toe: X follows a fixed score vector, O plays at random.
//!
//! Usage: `ml_selftest [--log-file] [--override-log] [--seed N]`

use std::env;
use std::process::ExitCode;

use rand::rngs::StdRng;
use rand::SeedableRng;

use rust_qlearn::games::tictactoe::{GameStatus, Player, TicTacToe};
use rust_qlearn::logging::{self, init_logger, LogLevel, LogMode, LoggerConfig};
use rust_qlearn::qlearn::{self_test, Agent, Game, QTable};

/// Stand-in for a trained model's output.
const STUB_SCORES: [f64; 9] = [0.2, 0.9, 0.0, 0.0, 1.0, 0.0, 0.0, 0.9, 0.3];

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    let mode = if args.iter().any(|a| a == "--log-file") {
        LogMode::Both
    } else {
        LogMode::Console
    };
    let seed = args
        .iter()
        .position(|a| a == "--seed")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse::<u64>().ok());

    let log_config = LoggerConfig::new("ml_selftest")
        .with_mode(mode)
        .with_override(args.iter().any(|a| a == "--override-log"));
    if let Err(e) = init_logger(&log_config) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    println!("=== Machine Learning Self-Test ===\n");

    let report = self_test::run_all(&mut logging::log);
    println!();
    println!("QTable default: {}", if report.q_table { "pass" } else { "FAIL" });
    println!("QValue chain:   {}", if report.q_value { "pass" } else { "FAIL" });
    println!();

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut game = TicTacToe::new();
    let table = QTable::new(game.output_format());
    let x_agent = Agent::Scores(STUB_SCORES.to_vec());
    let o_agent = Agent::Random;

    println!("{}\n", game);
    while game.status() == GameStatus::Playing {
        let agent = match game.player() {
            Player::X => &x_agent,
            Player::O => &o_agent,
        };
        let action = match agent.choose(&game, &table, &mut rng) {
            Ok(action) => action,
            Err(e) => {
                logging::log(LogLevel::Error, &e.to_string());
                return ExitCode::FAILURE;
            }
        };
        logging::log(
            LogLevel::Debug,
            &format!("{:?} plays {}", game.player(), action),
        );
        game.apply_action(action);
        println!("{}\n", game);
    }

    if report.passed() {
        ExitCode::SUCCESS
    } else {
        logging::log(LogLevel::Warning, "self-test reported failures");
        ExitCode::FAILURE
    }
}
