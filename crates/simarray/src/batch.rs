//! Batch partitioning.
//!
//! Splits the ordered list of simulation folders into fixed-size groups.
//! Batches are numbered from 1 without gaps, keep the original order, and
//! only the last one may be short.

use std::num::NonZeroUsize;

/// One group of consecutive items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch<T> {
    /// 1-based batch number
    pub index: usize,
    pub members: Vec<T>,
}

impl<T> Batch<T> {
    /// Container name for this batch (`batch_` + index).
    pub fn name(&self, prefix: &str) -> String {
        batch_name(prefix, self.index)
    }
}

/// Container name for batch `index`.
pub fn batch_name(prefix: &str, index: usize) -> String {
    format!("{}{}", prefix, index)
}

/// 1-based batch number of the item at `position` (0-based).
pub fn batch_index(position: usize, size: NonZeroUsize) -> usize {
    position / size.get() + 1
}

/// Partition `items` into batches of `size`, preserving order.
pub fn partition<T>(items: impl IntoIterator<Item = T>, size: NonZeroUsize) -> Vec<Batch<T>> {
    let mut batches: Vec<Batch<T>> = Vec::new();
    for (position, item) in items.into_iter().enumerate() {
        let index = batch_index(position, size);
        match batches.last_mut() {
            Some(batch) if batch.index == index => batch.members.push(item),
            _ => batches.push(Batch {
                index,
                members: vec![item],
            }),
        }
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_three_into_two() {
        let batches = partition(["a", "b", "c"], size(2));

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].index, 1);
        assert_eq!(batches[0].members, vec!["a", "b"]);
        assert_eq!(batches[1].index, 2);
        assert_eq!(batches[1].members, vec!["c"]);
        assert_eq!(batches[1].name("batch_"), "batch_2");
    }

    #[test]
    fn test_partition_properties() {
        for total in 0..20usize {
            for by in 1..7usize {
                let items: Vec<usize> = (0..total).collect();
                let batches = partition(items.clone(), size(by));

                assert_eq!(batches.len(), total.div_ceil(by));
                for (i, batch) in batches.iter().enumerate() {
                    assert_eq!(batch.index, i + 1);
                    if i + 1 < batches.len() {
                        assert_eq!(batch.members.len(), by);
                    } else {
                        assert!(!batch.members.is_empty() && batch.members.len() <= by);
                    }
                }

                let flattened: Vec<usize> =
                    batches.into_iter().flat_map(|b| b.members).collect();
                assert_eq!(flattened, items);
            }
        }
    }

    #[test]
    fn test_batch_index() {
        assert_eq!(batch_index(0, size(3)), 1);
        assert_eq!(batch_index(2, size(3)), 1);
        assert_eq!(batch_index(3, size(3)), 2);
    }
}
