//! Golden-value checks for the table and the chained update rule.
//!
//! Each check reports a failed expectation through the sink it is given, at
//! [`LogLevel::Warning`], and returns whether everything held. Pass
//! [`crate::logging::log`] to route failures into the process log.

use std::sync::Arc;

use crate::logging::LogLevel;
use crate::qlearn::encoding::BitKey;
use crate::qlearn::output_format::OutputFormat;
use crate::qlearn::q_table::QTable;
use crate::qlearn::q_value::{QValue, NEUTRAL_VALUE};

/// Tolerance for float comparisons.
pub const F_ERR: f64 = 0.01;

/// Outcome of [`run_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelfTestReport {
    /// New table entries start at the neutral value.
    pub q_table: bool,
    /// Chained updates match the expected scores.
    pub q_value: bool,
}

impl SelfTestReport {
    /// Whether every check passed.
    pub fn passed(&self) -> bool {
        self.q_table && self.q_value
    }
}

/// Check that a fresh table entry holds the neutral value for every action.
pub fn check_q_table_default<F>(format: Arc<OutputFormat>, key: BitKey, sink: &mut F) -> bool
where
    F: FnMut(LogLevel, &str),
{
    let mut table = QTable::new(format);
    let value = table.get_q_value(key);
    let passes = value.scores().iter().all(|&s| s == NEUTRAL_VALUE);

    sink(
        LogLevel::Info,
        &format!("Initial QValues = {}? {} {}", NEUTRAL_VALUE, passes, value),
    );
    if !passes {
        sink(LogLevel::Warning, "Initial QValue check failed");
    }
    passes
}

fn expect<F>(value: &QValue, expected: [f64; 3], label: &str, sink: &mut F) -> bool
where
    F: FnMut(LogLevel, &str),
{
    let ok = expected
        .iter()
        .enumerate()
        .all(|(i, &want)| (value[i] - want).abs() <= F_ERR);
    if !ok {
        sink(
            LogLevel::Warning,
            &format!("{} failed. Expected: {:?}, Actual: {}", label, expected, value),
        );
    }
    ok
}

/// Walk a three-action value through a fixed sequence of chained updates.
///
/// The actions model a turn: LEFT=0, CENTER=1, RIGHT=2.
pub fn check_q_value_chain<F>(sink: &mut F) -> bool
where
    F: FnMut(LogLevel, &str),
{
    let mut passes = true;
    let mut value = QValue::new(vec![0.0, 0.0, 0.0]);

    value.to_update(0);
    value.update(-1.0);
    passes &= expect(&value, [-1.0, 0.0, 0.0], "LEFT turn", sink);

    value.to_update(0);
    value.to_update(1);
    value.update(-0.7);
    passes &= expect(&value, [-1.7, -0.7, 0.0], "LEFT CENTER turn", sink);

    value.to_update(1);
    value.to_update(2);
    value.update(1.0);
    passes &= expect(&value, [-1.7, 0.3, 1.0], "RIGHT CENTER turn", sink);

    // No action taken.
    value.update(999.0);
    passes &= expect(&value, [-1.7, 0.3, 1.0], "NULL update", sink);

    sink(LogLevel::Info, &format!("q value chain: {}", value));
    passes
}

/// Run every check against a 3x3 position format.
pub fn run_all<F>(sink: &mut F) -> SelfTestReport
where
    F: FnMut(LogLevel, &str),
{
    let format = Arc::new(OutputFormat::positions(9));
    let key = BitKey::one_hot(&[0; 9], 2);
    SelfTestReport {
        q_table: check_q_table_default(format, key, sink),
        q_value: check_q_value_chain(sink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checks_pass_without_warnings() {
        let mut warnings = Vec::new();
        let report = run_all(&mut |level: LogLevel, msg: &str| {
            if level == LogLevel::Warning {
                warnings.push(msg.to_string());
            }
        });
        assert!(report.passed(), "warnings: {:?}", warnings);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_failed_expectation_is_reported() {
        let mut messages = Vec::new();
        let value = QValue::new(vec![0.0, 0.0, 0.0]);
        let ok = expect(&value, [1.0, 0.0, 0.0], "probe", &mut |level: LogLevel, msg: &str| {
            messages.push((level, msg.to_string()))
        });
        assert!(!ok);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, LogLevel::Warning);
        assert!(messages[0].1.starts_with("probe failed"));
    }
}
