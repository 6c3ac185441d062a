//! State key trait and a bit-packed board encoding.
//!
//! The table never looks inside a key; it only hashes and compares it. Games
//! are free to use any key type, but [`BitKey`] covers the common case of a
//! board made of small enumerated cells.

use std::fmt;
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for keys that identify a state in a [`QTable`](crate::qlearn::QTable).
///
/// Two semantically identical states must produce equal keys.
pub trait StateKey: Clone + Eq + Hash + Debug + Send + Sync {}

impl<T> StateKey for T where T: Clone + Eq + Hash + Debug + Send + Sync {}

/// A fixed-width bit string packed into 64-bit words.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BitKey {
    words: Vec<u64>,
    len: usize,
}

impl BitKey {
    /// Create a key of `len` zero bits.
    pub fn zeros(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
        }
    }

    /// Build a key from a sequence of booleans.
    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        let mut key = Self::default();
        for bit in bits {
            key.push(bit);
        }
        key
    }

    /// One-hot encode a board.
    ///
    /// Each cell holds a value in `0..=max_index`, where 0 means empty. A cell
    /// becomes `max_index` bits with bit `v - 1` set for value `v`, so an empty
    /// cell is all zeros.
    ///
    /// ```text
    /// {X, O, X,        {1, 2, 1,       [10 01 10 | 00 01 00 | 00 00 00]
    ///  _, O, _,   ->    0, 2, 0,   ->
    ///  _, _, _}         0, 0, 0}
    /// ```
    ///
    /// # Panics
    /// Panics if a cell value is greater than `max_index`.
    pub fn one_hot(cells: &[usize], max_index: usize) -> Self {
        let mut key = Self::zeros(cells.len() * max_index);
        for (i, &value) in cells.iter().enumerate() {
            assert!(
                value <= max_index,
                "cell value {} exceeds max index {}",
                value,
                max_index
            );
            if value > 0 {
                key.set(i * max_index + value - 1, true);
            }
        }
        key
    }

    /// Append one bit.
    pub fn push(&mut self, bit: bool) {
        if self.len % 64 == 0 {
            self.words.push(0);
        }
        self.len += 1;
        self.set(self.len - 1, bit);
    }

    /// Read bit `index`.
    ///
    /// # Panics
    /// Panics if `index >= len`.
    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.len, "bit {} out of range for {} bits", index, self.len);
        (self.words[index / 64] >> (index % 64)) & 1 == 1
    }

    /// Write bit `index`.
    ///
    /// # Panics
    /// Panics if `index >= len`.
    pub fn set(&mut self, index: usize, bit: bool) {
        assert!(index < self.len, "bit {} out of range for {} bits", index, self.len);
        let mask = 1u64 << (index % 64);
        if bit {
            self.words[index / 64] |= mask;
        } else {
            self.words[index / 64] &= !mask;
        }
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the key has no bits.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of bits set.
    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Iterate over the bits in order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }
}

impl fmt::Display for BitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            write!(f, "{}", if bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_hot_layout() {
        let key = BitKey::one_hot(&[1, 2, 1, 0, 2, 0, 0, 0, 0], 2);
        assert_eq!(key.len(), 18);
        assert_eq!(key.to_string(), "100110000100000000");
        assert_eq!(key.count_ones(), 4);
    }

    #[test]
    fn test_equal_boards_encode_equal() {
        let a = BitKey::one_hot(&[0, 1, 2, 0], 2);
        let b = BitKey::one_hot(&[0, 1, 2, 0], 2);
        let c = BitKey::one_hot(&[0, 2, 1, 0], 2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_push_spans_words() {
        let mut key = BitKey::zeros(63);
        key.push(true);
        key.push(true);
        assert_eq!(key.len(), 65);
        assert!(key.get(63));
        assert!(key.get(64));
        assert!(!key.get(0));
        assert_eq!(key.count_ones(), 2);
    }

    #[test]
    fn test_from_bits_round_trip() {
        let bits = [true, false, false, true, true];
        let key = BitKey::from_bits(bits);
        assert_eq!(key.iter().collect::<Vec<_>>(), bits.to_vec());
    }

    #[test]
    #[should_panic(expected = "exceeds max index")]
    fn test_one_hot_rejects_large_values() {
        BitKey::one_hot(&[3], 2);
    }
}
