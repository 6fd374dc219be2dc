//! Partition trees
//!
//! Partitions are numbered in post-order. `start_of_subtree[i]` is the lowest
//! partition in the subtree rooted at `i`, so `j` is an ancestor-or-self of
//! `i` iff `start_of_subtree[j] <= i <= j`. The last partition is the root;
//! every other partition gets one interpolant.

use crate::error::{InterpolationError, InterpolationResult};
use rustc_hash::FxHashMap;

/// User-facing description of a partitioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSpec {
    /// Hypothesis source names per partition
    pub partitions: Vec<Vec<String>>,
    /// Lowest partition index of each partition's subtree
    pub start_of_subtree: Vec<usize>,
}

impl PartitionSpec {
    /// A chain `0 -> 1 -> ... -> n`, giving classic sequence interpolants.
    #[must_use]
    pub fn sequence(partitions: Vec<Vec<String>>) -> Self {
        let start_of_subtree = vec![0; partitions.len()];
        Self {
            partitions,
            start_of_subtree,
        }
    }

    /// Two partitions `A` and `B` with one source name each.
    #[must_use]
    pub fn binary(a: &str, b: &str) -> Self {
        Self::sequence(vec![vec![a.to_string()], vec![b.to_string()]])
    }
}

/// A validated partition tree.
#[derive(Debug, Clone)]
pub struct PartitionTree {
    start_of_subtree: Vec<usize>,
    source_index: FxHashMap<String, usize>,
}

impl PartitionTree {
    /// Validate a spec.
    pub fn new(spec: &PartitionSpec) -> InterpolationResult<Self> {
        let n = spec.start_of_subtree.len();
        if n == 0 {
            return Err(InterpolationError::InvalidPartitionTree(
                "no partitions".into(),
            ));
        }
        if spec.partitions.len() != n {
            return Err(InterpolationError::InvalidPartitionTree(format!(
                "{} partitions but {} subtree starts",
                spec.partitions.len(),
                n
            )));
        }
        let start = &spec.start_of_subtree;
        if start[n - 1] != 0 {
            return Err(InterpolationError::InvalidPartitionTree(
                "root does not span all partitions".into(),
            ));
        }
        for (i, &s) in start.iter().enumerate() {
            if s > i {
                return Err(InterpolationError::InvalidPartitionTree(format!(
                    "start of subtree {} is {}",
                    i, s
                )));
            }
            // Every member of a subtree must have its own subtree inside it.
            if let Some(j) = (s..i).find(|&j| start[j] < s) {
                return Err(InterpolationError::InvalidPartitionTree(format!(
                    "subtree of {} overlaps subtree of {}",
                    i, j
                )));
            }
        }
        let mut source_index = FxHashMap::default();
        for (i, names) in spec.partitions.iter().enumerate() {
            for name in names {
                if let Some(prev) = source_index.insert(name.clone(), i) {
                    if prev != i {
                        return Err(InterpolationError::InvalidPartitionTree(format!(
                            "source `{}` in partitions {} and {}",
                            name, prev, i
                        )));
                    }
                }
            }
        }
        Ok(Self {
            start_of_subtree: start.clone(),
            source_index,
        })
    }

    /// Number of partitions, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.start_of_subtree.len()
    }

    /// Always false for a validated tree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start_of_subtree.is_empty()
    }

    /// Number of interpolants (partitions minus the root).
    #[must_use]
    pub fn num_interpolants(&self) -> usize {
        self.len() - 1
    }

    /// Lowest partition in the subtree of `p`.
    #[must_use]
    pub fn start(&self, p: usize) -> usize {
        self.start_of_subtree[p]
    }

    /// True if `q` lies in the subtree rooted at `p`.
    #[must_use]
    pub fn in_subtree(&self, p: usize, q: usize) -> bool {
        self.start_of_subtree[p] <= q && q <= p
    }

    /// Partition of a hypothesis source name.
    #[must_use]
    pub fn partition_of(&self, source: &str) -> Option<usize> {
        self.source_index.get(source).copied()
    }

    /// Direct children of `p`, highest index first.
    #[must_use]
    pub fn children(&self, p: usize) -> Vec<usize> {
        let mut result = Vec::new();
        let lo = self.start_of_subtree[p];
        let mut c = p;
        while c > lo {
            let child = c - 1;
            result.push(child);
            c = self.start_of_subtree[child];
        }
        result
    }
}
