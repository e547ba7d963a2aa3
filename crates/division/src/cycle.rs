use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use thiserror::Error;
use tracing::trace;

/// How a [`CycleDetector`] responds when a key is seen for the second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleMode {
    /// Report the cycle boundaries as a normal result.
    #[default]
    Describe,
    /// Treat any recurrence as an error.
    Fail,
}

/// Boundaries of a detected cycle, in sequence positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cycle {
    /// Position at which the recurring key was first observed.
    pub start: usize,
    /// Number of positions between the first and second observation.
    pub length: usize,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Cycle detected. start: {start}, position: {position}")]
pub struct CycleDetected {
    pub start: usize,
    pub position: usize,
}

/// Records the first position at which each key was observed.
///
/// At most one entry is held per distinct key. A detector is intended to live
/// for a single walk of a sequence and then be dropped.
#[derive(Debug)]
pub struct CycleDetector<K> {
    first_seen: HashMap<K, usize>,
    mode: CycleMode,
}

impl<K> CycleDetector<K>
where
    K: Eq + Hash + Debug,
{
    pub fn new(mode: CycleMode) -> Self {
        Self {
            first_seen: HashMap::new(),
            mode,
        }
    }

    /// Observes `key` at `position`.
    ///
    /// Returns `Ok(None)` the first time a key is seen. On a recurrence, returns the
    /// cycle in [`CycleMode::Describe`] mode, or an error in [`CycleMode::Fail`] mode.
    /// The recorded position of a recurring key is left unchanged.
    pub fn observe(&mut self, key: K, position: usize) -> Result<Option<Cycle>, CycleDetected> {
        match self.first_seen.get(&key) {
            Some(&start) => {
                trace!("Key recurred. key: {:?}, start: {}, position: {}", key, start, position);
                match self.mode {
                    CycleMode::Describe => Ok(Some(Cycle {
                        start,
                        length: position - start,
                    })),
                    CycleMode::Fail => Err(CycleDetected {
                        start,
                        position,
                    }),
                }
            }
            None => {
                self.first_seen.insert(key, position);
                Ok(None)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(CycleMode::Describe)]
    #[case(CycleMode::Fail)]
    fn first_sightings_are_not_cycles(#[case] mode: CycleMode) {
        // given
        let mut detector = CycleDetector::new(mode);

        // when
        let results: Vec<_> = [4, 6, 2]
            .into_iter()
            .enumerate()
            .map(|(position, key)| detector.observe(key, position))
            .collect();

        // then
        assert_eq!(results, vec![Ok(None), Ok(None), Ok(None)]);
        assert_eq!(detector.len(), 3);
    }

    #[test]
    fn recurrence_is_described() {
        // given
        let mut detector = CycleDetector::new(CycleMode::Describe);
        detector.observe(1, 0).unwrap();
        detector.observe(4, 1).unwrap();
        detector.observe(6, 2).unwrap();

        // when
        let result = detector.observe(4, 3);

        // then
        assert_eq!(
            result,
            Ok(Some(Cycle {
                start: 1,
                length: 2
            }))
        );
        assert_eq!(detector.len(), 3);
    }

    #[test]
    fn recurrence_fails_in_fail_mode() {
        // given
        let mut detector = CycleDetector::new(CycleMode::Fail);
        detector.observe("a", 0).unwrap();
        detector.observe("b", 1).unwrap();

        // when
        let result = detector.observe("a", 2);

        // then
        assert_eq!(
            result,
            Err(CycleDetected {
                start: 0,
                position: 2
            })
        );
    }
}
