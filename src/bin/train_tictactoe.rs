//! Tic-Tac-Toe self-play trainer.
//!
//! Trains a table by epsilon-greedy self-play, then measures greedy play
//! against a random opponent from both seats.
//!
//! Usage: `train_tictactoe [config.json]`

use std::env;
use std::process::ExitCode;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

use rust_qlearn::games::tictactoe::TicTacToe;
use rust_qlearn::logging::{init_logger, LoggerConfig};
use rust_qlearn::qlearn::{evaluate, Trainer, TrainingConfig};

const EVAL_GAMES: usize = 10_000;

fn load_config() -> Result<TrainingConfig, String> {
    match env::args().nth(1) {
        Some(path) => {
            println!("Loading config from {}", path);
            TrainingConfig::from_json_file(&path).map_err(|e| e.to_string())
        }
        None => Ok(TrainingConfig::default().with_seed(42)),
    }
}

fn main() -> ExitCode {
    if let Err(e) = init_logger(&LoggerConfig::new("train_tictactoe")) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    println!("=== Tic-Tac-Toe Q-Learning ===\n");

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    println!(
        "Episodes: {} | Epsilon: {} -> {} | Learning rate: {} | Discount: {}",
        config.episodes, config.epsilon, config.min_epsilon, config.learning_rate, config.discount
    );
    println!();

    let start = Instant::now();
    let episodes = config.episodes;
    let seed = config.seed.unwrap_or(0);
    let mut trainer = match Trainer::new(TicTacToe::new(), config) {
        Ok(trainer) => trainer,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let pb = ProgressBar::new(episodes);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let interval = (episodes / 100).max(1);
    let result = trainer.train_with_callback(interval, |stats| {
        pb.set_position(stats.episodes);
        pb.set_message(format!("{} states, eps {:.3}", stats.states, stats.epsilon));
    });
    let stats = match result {
        Ok(stats) => stats.clone(),
        Err(e) => {
            pb.abandon();
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    pb.finish_with_message(format!("{} states", stats.states));

    println!();
    println!("Trained {} episodes in {:.2}s ({:.0} episodes/s)",
        stats.episodes, stats.elapsed_seconds, stats.episodes_per_second);
    println!("Self-play: X wins {}, O wins {}, draws {}",
        stats.wins[0], stats.wins[1], stats.draws);
    println!();

    let game = trainer.game().clone();
    for (learner, name) in [(0, "X"), (1, "O")] {
        match evaluate(trainer.table(), &game, learner, EVAL_GAMES, seed) {
            Ok(eval) => println!(
                "Greedy {} vs random: {} won, {} lost, {} drawn (win {:.1}%, not lost {:.1}%)",
                name,
                eval.wins,
                eval.losses,
                eval.draws,
                100.0 * eval.win_rate(),
                100.0 * eval.non_loss_rate()
            ),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    println!("\nTotal time: {:.2}s", start.elapsed().as_secs_f64());
    ExitCode::SUCCESS
}
