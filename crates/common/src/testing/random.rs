//! Scripted random sources

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::random::RandomGenerator;

/// Generator that replays a fixed sequence, repeating the last value
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "test-utils")]
/// # {
/// use retrygate_common::random::RandomGenerator;
/// use retrygate_common::testing::SequenceRandom;
///
/// let rng = SequenceRandom::new([3, 9]);
/// assert_eq!(rng.random(), 3);
/// assert_eq!(rng.random(), 9);
/// assert_eq!(rng.random(), 9);
/// # }
/// ```
#[derive(Debug)]
pub struct SequenceRandom {
    state: Mutex<(VecDeque<u64>, u64)>,
}

impl SequenceRandom {
    /// Replay `values`, then keep returning the last one.
    pub fn new(values: impl IntoIterator<Item = u64>) -> Self {
        Self { state: Mutex::new((values.into_iter().collect(), 0)) }
    }

    /// A generator that always returns `value`.
    pub fn constant(value: u64) -> Self {
        Self::new([value])
    }

    /// Append more values to the script.
    pub fn push(&self, value: u64) {
        self.state.lock().0.push_back(value);
    }
}

impl RandomGenerator for SequenceRandom {
    fn random(&self) -> u64 {
        let mut state = self.state.lock();
        let (queue, last) = &mut *state;
        if let Some(next) = queue.pop_front() {
            *last = next;
        }
        *last
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for testing::random.
    use super::*;

    #[test]
    fn test_empty_sequence_yields_zero() {
        let rng = SequenceRandom::new([]);
        assert_eq!(rng.random(), 0);
    }

    #[test]
    fn test_push_extends_script() {
        let rng = SequenceRandom::constant(1);
        assert_eq!(rng.random(), 1);
        rng.push(5);
        assert_eq!(rng.random(), 5);
        assert_eq!(rng.random(), 5);
    }
}
