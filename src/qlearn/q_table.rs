//! Sparse state-to-value table.
//!
//! This module provides the [`QTable`], which maps an encoded state to the
//! [`QValue`] holding its action scores. Entries are created on first lookup
//! and never evicted, so the table grows with the number of distinct states
//! encountered. That is fine for small discrete games; larger state spaces
//! need a bound on top of this.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::qlearn::config::QConfig;
use crate::qlearn::encoding::StateKey;
use crate::qlearn::output_format::OutputFormat;
use crate::qlearn::q_value::QValue;

/// Lazily populated map from state key to [`QValue`].
///
/// Every value the table creates has [`OutputFormat::action_count`] actions,
/// all set to the configured initial value. The table owns every value it
/// creates; the format is shared.
///
/// The table is not synchronized. Lookup-or-create needs `&mut self`, so
/// concurrent writers must wrap the table in a lock of their own.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use rust_qlearn::qlearn::{OutputFormat, QTable};
///
/// let mut table: QTable<u32> = QTable::new(Arc::new(OutputFormat::positions(9)));
/// let value = table.get_q_value(0b1010);
/// assert_eq!(value.len(), 9);
/// assert_eq!(value[0], 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct QTable<K: StateKey> {
    /// Values per state: key -> [score per action]
    values: FxHashMap<K, QValue>,

    /// Shape shared by every value.
    format: Arc<OutputFormat>,

    /// Settings for newly created values.
    config: QConfig,
}

impl<K: StateKey> QTable<K> {
    /// Create an empty table with default settings. Locks `format`.
    pub fn new(format: Arc<OutputFormat>) -> Self {
        Self::with_config(format, QConfig::default())
    }

    /// Create an empty table with custom settings. Locks `format`.
    pub fn with_config(format: Arc<OutputFormat>, config: QConfig) -> Self {
        format.lock();
        Self {
            values: FxHashMap::default(),
            format,
            config,
        }
    }

    /// Create a table with pre-allocated capacity.
    pub fn with_capacity(format: Arc<OutputFormat>, config: QConfig, capacity: usize) -> Self {
        format.lock();
        Self {
            values: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            format,
            config,
        }
    }

    /// Get the value for `key`, creating a neutral one on first lookup.
    ///
    /// Repeated lookups of the same key return the same entry, so changes made
    /// through one reference are seen by the next.
    pub fn get_q_value(&mut self, key: K) -> &mut QValue {
        let len = self.format.action_count();
        let config = &self.config;
        self.values.entry(key).or_insert_with(|| {
            QValue::with_decay(vec![config.initial_value; len], config.chain_decay)
        })
    }

    /// Read-only lookup; `None` for states not seen yet.
    pub fn peek(&self, key: &K) -> Option<&QValue> {
        self.values.get(key)
    }

    /// The value a new state would start with.
    pub fn default_q_value(&self) -> QValue {
        QValue::with_decay(
            vec![self.config.initial_value; self.format.action_count()],
            self.config.chain_decay,
        )
    }

    /// Scores for `key`, falling back to the initial value for unseen states.
    pub fn scores_or_default(&self, key: &K) -> Vec<f64> {
        match self.values.get(key) {
            Some(value) => value.scores().to_vec(),
            None => vec![self.config.initial_value; self.format.action_count()],
        }
    }

    /// Number of actions in every value.
    pub fn action_count(&self) -> usize {
        self.format.action_count()
    }

    /// The shared action-space descriptor.
    pub fn format(&self) -> &Arc<OutputFormat> {
        &self.format
    }

    /// Settings used for new values.
    pub fn config(&self) -> &QConfig {
        &self.config
    }

    /// Number of states stored.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no state has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check if a state exists in the table.
    pub fn contains(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    /// Iterate over stored states and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &QValue)> {
        self.values.iter()
    }

    /// Drop pending chains on every value without touching scores.
    pub fn clear_pending(&mut self) {
        for value in self.values.values_mut() {
            value.clear_pending();
        }
    }

    /// Remove all stored states.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Get total memory usage estimate in bytes.
    pub fn memory_usage(&self) -> usize {
        self.values
            .values()
            .map(|v| {
                std::mem::size_of::<K>()
                    + std::mem::size_of::<QValue>()
                    + v.len() * std::mem::size_of::<f64>()
                    + v.pending().len() * std::mem::size_of::<usize>()
            })
            .sum()
    }
}
