//! Action values for a single state.
//!
//! A [`QValue`] holds one score per action and a chain of actions that were
//! chosen from this state but have not been rewarded yet. A reward applied
//! with [`QValue::update`] is credited to the whole chain, most recent action
//! first, with a carry that shrinks by the decay factor at each step back.

use std::fmt;
use std::ops::Index;

use crate::qlearn::output_format::OutputFormat;

/// Score every action starts with when a table creates a new state.
pub const NEUTRAL_VALUE: f64 = 0.5;

/// Factor applied to the carried reward for each older action in a chain.
pub const DEFAULT_CHAIN_DECAY: f64 = 1.0;

/// Action values and pending action chain for one state.
#[derive(Debug, Clone, PartialEq)]
pub struct QValue {
    /// One score per action.
    scores: Vec<f64>,

    /// Actions recorded since the last update, oldest first.
    pending: Vec<usize>,

    /// Multiplier applied to the carry between consecutive chain entries.
    decay: f64,
}

impl QValue {
    /// Create a value from a raw score vector.
    pub fn new(scores: Vec<f64>) -> Self {
        Self::with_decay(scores, DEFAULT_CHAIN_DECAY)
    }

    /// Create a value with a custom chain decay.
    pub fn with_decay(scores: Vec<f64>, decay: f64) -> Self {
        Self {
            scores,
            pending: Vec::new(),
            decay,
        }
    }

    /// Create a value of `len` actions, all set to `value`.
    pub fn filled(len: usize, value: f64) -> Self {
        Self::new(vec![value; len])
    }

    /// Create a neutral value shaped by `format`. Locks the format.
    pub fn for_format(format: &OutputFormat) -> Self {
        format.lock();
        Self::filled(format.action_count(), NEUTRAL_VALUE)
    }

    /// Score of `action`, or `None` when out of range.
    pub fn get(&self, action: usize) -> Option<f64> {
        self.scores.get(action).copied()
    }

    /// All scores, in action order.
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether the value has no actions at all.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Actions awaiting a reward, oldest first.
    pub fn pending(&self) -> &[usize] {
        &self.pending
    }

    /// The chain decay factor.
    pub fn decay(&self) -> f64 {
        self.decay
    }

    /// Record `action` as taken; it is credited on the next [`update`](Self::update).
    ///
    /// # Panics
    /// Panics if `action` is not a valid action index.
    pub fn to_update(&mut self, action: usize) {
        assert!(
            action < self.scores.len(),
            "action {} out of range for {} actions",
            action,
            self.scores.len()
        );
        self.pending.push(action);
    }

    /// Credit `reward` to every pending action and clear the chain.
    ///
    /// The most recent action receives `reward`; each older one receives the
    /// previous delta scaled by the decay factor. Does nothing when no action
    /// is pending.
    pub fn update(&mut self, reward: f64) {
        let mut carry = reward;
        while let Some(action) = self.pending.pop() {
            self.scores[action] += carry;
            carry *= self.decay;
        }
    }

    /// Drop pending actions without changing any score.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Index and score of the best action overall, lowest index on ties.
    pub fn best_action(&self) -> Option<(usize, f64)> {
        self.scores
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best, (i, score)| match best {
                Some((_, b)) if b >= score => best,
                _ => Some((i, score)),
            })
    }
}

impl Index<usize> for QValue {
    type Output = f64;

    fn index(&self, action: usize) -> &Self::Output {
        &self.scores[action]
    }
}

impl AsRef<[f64]> for QValue {
    fn as_ref(&self) -> &[f64] {
        &self.scores
    }
}

impl From<Vec<f64>> for QValue {
    fn from(scores: Vec<f64>) -> Self {
        Self::new(scores)
    }
}

impl fmt::Display for QValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, score) in self.scores.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.4}", score)?;
        }
        write!(f, "]")
    }
}
