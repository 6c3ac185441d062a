//! Action-space descriptor.
//!
//! An [`OutputFormat`] describes how a flat score vector is laid out: an
//! ordered list of typed segments whose sizes add up to the number of
//! actions. It is also responsible for turning a score vector back into a
//! single legal action index.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::seq::SliceRandom;
use rand::Rng;

/// Kind of a segment in the action vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// One action per board position.
    Position,
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentKind::Position => write!(f, "Position"),
        }
    }
}

/// A contiguous run of actions of a single kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// What the actions in this segment mean.
    pub kind: SegmentKind,
    /// Number of discrete choices covered by the segment.
    pub size: usize,
}

/// Describes the layout of an action vector.
///
/// Once the format has sized a [`QValue`](crate::qlearn::QValue) or a
/// [`QTable`](crate::qlearn::QTable) it is locked, and adding segments
/// afterwards is rejected so that every value vector keeps the same shape.
///
/// # Example
/// ```
/// use rust_qlearn::qlearn::{OutputFormat, SegmentKind};
///
/// let mut format = OutputFormat::new();
/// format.add_type(SegmentKind::Position, 9).unwrap();
/// assert_eq!(format.action_count(), 9);
/// ```
#[derive(Debug, Default)]
pub struct OutputFormat {
    segments: Vec<Segment>,
    locked: AtomicBool,
}

impl OutputFormat {
    /// Create an empty format.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a format with a single `Position` segment of `size` actions.
    pub fn positions(size: usize) -> Self {
        Self {
            segments: vec![Segment {
                kind: SegmentKind::Position,
                size,
            }],
            locked: AtomicBool::new(false),
        }
    }

    /// Append a segment of the given kind and size.
    ///
    /// # Errors
    /// - [`FormatError::Locked`] if the format has already been used to size
    ///   a value vector.
    /// - [`FormatError::EmptySegment`] if `size` is zero.
    pub fn add_type(&mut self, kind: SegmentKind, size: usize) -> Result<(), FormatError> {
        if self.is_locked() {
            return Err(FormatError::Locked);
        }
        if size == 0 {
            return Err(FormatError::EmptySegment(kind));
        }
        self.segments.push(Segment { kind, size });
        Ok(())
    }

    /// Total number of actions (sum of all segment sizes).
    pub fn action_count(&self) -> usize {
        self.segments.iter().map(|s| s.size).sum()
    }

    /// The declared segments, in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Offset of the `index`-th segment in the flat action vector.
    pub fn segment_offset(&self, index: usize) -> Option<usize> {
        if index >= self.segments.len() {
            return None;
        }
        Some(self.segments[..index].iter().map(|s| s.size).sum())
    }

    /// Freeze the layout. Called when the format sizes a value vector.
    pub fn lock(&self) {
        self.locked.store(true, Ordering::Release);
    }

    /// Whether the layout has been frozen.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Pick the best allowed action from a score vector.
    ///
    /// `allowed_indices` are relative to the segment starting at
    /// `segment_offset`, and so is the returned index. Scores of actions
    /// outside `allowed_indices` are ignored even when they are higher.
    ///
    /// Ties are compared with exact equality. With `randomize` set, one of the
    /// tied actions is chosen uniformly at random; otherwise the lowest index
    /// wins.
    ///
    /// # Errors
    /// - [`FormatError::NoLegalMoves`] if `allowed_indices` is empty.
    /// - [`FormatError::IndexOutOfRange`] if an allowed index does not fit in
    ///   `scores`.
    pub fn get_max_position<R: Rng + ?Sized>(
        &self,
        scores: &[f64],
        segment_offset: usize,
        allowed_indices: &[usize],
        randomize: bool,
        rng: &mut R,
    ) -> Result<usize, FormatError> {
        if allowed_indices.is_empty() {
            return Err(FormatError::NoLegalMoves);
        }

        let mut best = f64::NEG_INFINITY;
        let mut tied: Vec<usize> = Vec::with_capacity(allowed_indices.len());

        for &index in allowed_indices {
            let score = *scores
                .get(segment_offset + index)
                .ok_or(FormatError::IndexOutOfRange {
                    index: segment_offset + index,
                    len: scores.len(),
                })?;

            if tied.is_empty() || score > best {
                best = score;
                tied.clear();
                tied.push(index);
            } else if score == best {
                tied.push(index);
            }
        }

        if randomize && tied.len() > 1 {
            // Non-empty, checked above.
            return Ok(*tied.choose(rng).unwrap_or(&tied[0]));
        }

        Ok(tied.iter().copied().min().unwrap_or(tied[0]))
    }

    /// [`get_max_position`](Self::get_max_position) over the first segment.
    pub fn convert_output<R: Rng + ?Sized>(
        &self,
        scores: &[f64],
        allowed_indices: &[usize],
        randomize: bool,
        rng: &mut R,
    ) -> Result<usize, FormatError> {
        self.get_max_position(scores, 0, allowed_indices, randomize, rng)
    }
}

impl Clone for OutputFormat {
    fn clone(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            locked: AtomicBool::new(self.is_locked()),
        }
    }
}

impl PartialEq for OutputFormat {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|s| format!("{}x{}", s.kind, s.size))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Errors raised by [`OutputFormat`].
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// A segment was added after the format sized a value vector.
    Locked,
    /// A segment was declared with zero actions.
    EmptySegment(SegmentKind),
    /// No legal actions were supplied; the game is probably over.
    NoLegalMoves,
    /// An action index does not fit in the score vector.
    IndexOutOfRange {
        /// Offending flat index.
        index: usize,
        /// Length of the score vector.
        len: usize,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::Locked => {
                write!(f, "Output format is locked; segments cannot be added after first use")
            }
            FormatError::EmptySegment(kind) => {
                write!(f, "{} segment must cover at least one action", kind)
            }
            FormatError::NoLegalMoves => write!(f, "No moves available; game over?"),
            FormatError::IndexOutOfRange { index, len } => {
                write!(f, "Action index {} is out of range for {} scores", index, len)
            }
        }
    }
}

impl std::error::Error for FormatError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_action_count_sums_segments() {
        let mut format = OutputFormat::new();
        format.add_type(SegmentKind::Position, 9).unwrap();
        format.add_type(SegmentKind::Position, 3).unwrap();
        assert_eq!(format.action_count(), 12);
        assert_eq!(format.segment_offset(0), Some(0));
        assert_eq!(format.segment_offset(1), Some(9));
        assert_eq!(format.segment_offset(2), None);
        assert_eq!(format.to_string(), "[Positionx9, Positionx3]");
    }

    #[test]
    fn test_add_type_after_lock_fails() {
        let mut format = OutputFormat::positions(9);
        format.lock();
        assert_eq!(
            format.add_type(SegmentKind::Position, 1),
            Err(FormatError::Locked)
        );
        assert_eq!(format.action_count(), 9);
    }

    #[test]
    fn test_empty_segment_rejected() {
        let mut format = OutputFormat::new();
        assert_eq!(
            format.add_type(SegmentKind::Position, 0),
            Err(FormatError::EmptySegment(SegmentKind::Position))
        );
    }

    #[test]
    fn test_max_position_ignores_illegal_moves() {
        let format = OutputFormat::positions(9);
        let mut rng = StdRng::seed_from_u64(7);
        let scores = [0.2, 0.9, 0.0, 0.0, 1.0, 0.0, 0.0, 0.9, 0.3];

        // Index 4 holds the global maximum but is not legal.
        let legal = [0, 2, 7, 8];
        let chosen = format.convert_output(&scores, &legal, false, &mut rng).unwrap();
        assert_eq!(chosen, 7);
        assert!(legal.contains(&chosen));
    }

    #[test]
    fn test_tie_break_without_randomize_picks_lowest() {
        let format = OutputFormat::positions(9);
        let mut rng = StdRng::seed_from_u64(1);
        let scores = [0.2, 0.9, 0.0, 0.0, 1.0, 0.0, 0.0, 0.9, 0.3];

        // 1 and 7 tie; order of the legal list must not matter.
        for _ in 0..50 {
            let chosen = format
                .convert_output(&scores, &[7, 1, 0], false, &mut rng)
                .unwrap();
            assert_eq!(chosen, 1);
        }
    }

    #[test]
    fn test_tie_break_with_randomize_covers_all_ties() {
        let format = OutputFormat::positions(4);
        let mut rng = StdRng::seed_from_u64(42);
        let scores = [0.5, 0.5, 0.1, 0.5];

        let mut seen = [false; 4];
        for _ in 0..200 {
            let chosen = format
                .convert_output(&scores, &[0, 1, 2, 3], true, &mut rng)
                .unwrap();
            seen[chosen] = true;
        }
        assert!(seen[0] && seen[1] && seen[3]);
        assert!(!seen[2]);
    }

    #[test]
    fn test_segment_offset_is_respected() {
        let mut format = OutputFormat::new();
        format.add_type(SegmentKind::Position, 2).unwrap();
        format.add_type(SegmentKind::Position, 3).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let scores = [9.0, 9.0, 0.1, 0.7, 0.3];

        let offset = format.segment_offset(1).unwrap();
        let chosen = format
            .get_max_position(&scores, offset, &[0, 1, 2], false, &mut rng)
            .unwrap();
        assert_eq!(chosen, 1);
    }

    #[test]
    fn test_no_legal_moves_is_an_error() {
        let format = OutputFormat::positions(3);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            format.convert_output(&[0.1, 0.2, 0.3], &[], true, &mut rng),
            Err(FormatError::NoLegalMoves)
        );
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        let format = OutputFormat::positions(3);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            format.convert_output(&[0.1, 0.2, 0.3], &[1, 5], false, &mut rng),
            Err(FormatError::IndexOutOfRange { index: 5, len: 3 })
        );
    }
}
