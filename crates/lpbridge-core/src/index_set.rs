//! Entity index sets used by delete and change operations.

use crate::error::BridgeError;
use crate::types::HighsInt;

/// Deduplicated, ascending set of row or column indices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexSet {
    indices: Vec<usize>,
}

impl IndexSet {
    /// Build a set from a host index array; duplicates are dropped.
    pub fn from_host(
        operation: &'static str,
        argument: &'static str,
        raw: &[HighsInt],
    ) -> Result<Self, BridgeError> {
        let indices = checked_indices(operation, argument, raw)?;
        Ok(Self::from_indices(indices))
    }

    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut indices: Vec<usize> = indices.into_iter().collect();
        indices.sort_unstable();
        indices.dedup();
        Self { indices }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    pub fn max(&self) -> Option<usize> {
        self.indices.last().copied()
    }

    /// Membership mask over `0..dim`, or `None` when an index is out of range.
    pub fn mask(&self, dim: usize) -> Option<Vec<bool>> {
        if self.max().is_some_and(|max| max >= dim) {
            return None;
        }
        let mut mask = vec![false; dim];
        for &index in &self.indices {
            mask[index] = true;
        }
        Some(mask)
    }
}

/// Convert host indices to `usize`, keeping order and duplicates.
///
/// Negative entries fail with [`BridgeError::InvalidIndex`]; the upper range
/// is the engine's to check.
pub fn checked_indices(
    operation: &'static str,
    argument: &'static str,
    raw: &[HighsInt],
) -> Result<Vec<usize>, BridgeError> {
    raw.iter()
        .enumerate()
        .map(|(position, &value)| {
            usize::try_from(value).map_err(|_| BridgeError::InvalidIndex {
                operation,
                argument,
                position,
                value: i64::from(value),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_removed_and_sorted() {
        let set = IndexSet::from_host("deleting rows", "indices", &[4, 1, 4, 0, 1]).unwrap();
        assert_eq!(set.as_slice(), &[0, 1, 4]);
        assert_eq!(set.len(), 3);
        assert!(set.contains(4));
        assert!(!set.contains(2));
    }

    #[test]
    fn negative_index_is_rejected_with_position() {
        let err = IndexSet::from_host("deleting columns", "indices", &[0, -3]).unwrap_err();
        assert_eq!(
            err,
            BridgeError::InvalidIndex {
                operation: "deleting columns",
                argument: "indices",
                position: 1,
                value: -3,
            }
        );
    }

    #[test]
    fn mask_rejects_out_of_range() {
        let set = IndexSet::from_indices([0, 2]);
        assert_eq!(set.mask(3), Some(vec![true, false, true]));
        assert_eq!(set.mask(2), None);
        assert_eq!(IndexSet::default().mask(0), Some(Vec::new()));
    }

    #[test]
    fn checked_indices_keep_order() {
        assert_eq!(checked_indices("op", "cols", &[2, 0, 2]).unwrap(), vec![2, 0, 2]);
    }
}
