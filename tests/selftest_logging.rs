//! The self-test reports through the process logger, one line per message.
//!
//! Lives in its own test binary because it installs the global logger.

use rust_qlearn::logging::{self, init_logger, LogMode, LoggerConfig};
use rust_qlearn::qlearn::self_test;

#[test]
fn test_self_test_lines_are_logged_once() {
    let dir = std::env::temp_dir().join(format!("rust_qlearn_selftest_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let config = LoggerConfig::new("ml_selftest")
        .with_mode(LogMode::File)
        .with_override(true)
        .with_log_dir(dir.clone());
    init_logger(&config).unwrap();

    let report = self_test::run_all(&mut logging::log);
    assert!(report.passed());

    let contents = std::fs::read_to_string(config.log_path()).unwrap();
    assert_eq!(contents.matches("Initial QValues").count(), 1, "{}", contents);
    assert_eq!(contents.matches("q value chain").count(), 1, "{}", contents);
    assert!(!contents.contains("failed"));

    std::fs::remove_dir_all(&dir).unwrap();
}
