//! Partition coloring
//!
//! Every symbol occurring in an input clause is tagged with the partitions
//! it occurs in. From that, each term gets an [`Occurrence`]: for partition
//! `p`, `in_a[p]` holds if all its symbols occur in the subtree of `p` and
//! `in_b[p]` if all occur outside of it.

use crate::error::{InterpolationError, InterpolationResult};
use crate::partition::PartitionTree;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::{smallvec, SmallVec};
use tinterp_core::{TermId, TermStore};
use tinterp_proof::{Leaf, ProofDag, ProofNode, ProofNodeId};

/// A fixed-size set of partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSet {
    words: SmallVec<[u64; 2]>,
}

impl PartitionSet {
    /// The empty set over `n` partitions.
    #[must_use]
    pub fn empty(n: usize) -> Self {
        Self {
            words: smallvec![0; n.div_ceil(64).max(1)],
        }
    }

    /// The set of all `n` partitions.
    #[must_use]
    pub fn full(n: usize) -> Self {
        let mut set = Self::empty(n);
        for i in 0..n {
            set.insert(i);
        }
        set
    }

    /// Add partition `i`.
    pub fn insert(&mut self, i: usize) {
        self.words[i / 64] |= 1 << (i % 64);
    }

    /// Membership test.
    #[must_use]
    pub fn contains(&self, i: usize) -> bool {
        self.words
            .get(i / 64)
            .is_some_and(|w| w & (1 << (i % 64)) != 0)
    }

    /// Intersect in place.
    pub fn intersect_with(&mut self, other: &PartitionSet) {
        for (w, o) in self.words.iter_mut().zip(&other.words) {
            *w &= o;
        }
    }
}

/// Locality of a term or literal at one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locality {
    /// Only in the subtree
    ALocal,
    /// Only outside the subtree
    BLocal,
    /// Both in and outside the subtree
    Shared,
    /// Neither: mixes A-local and B-local symbols
    Mixed,
}

/// Where a term occurs, per interpolated partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Partitions whose subtree contains all symbols of the term
    pub in_a: PartitionSet,
    /// Partitions whose complement contains all symbols of the term
    pub in_b: PartitionSet,
}

impl Occurrence {
    /// Occurrence of a symbol-free term: shared everywhere.
    #[must_use]
    pub fn everywhere(n: usize) -> Self {
        Self {
            in_a: PartitionSet::full(n),
            in_b: PartitionSet::full(n),
        }
    }

    /// Locality at partition `p`.
    #[must_use]
    pub fn locality(&self, p: usize) -> Locality {
        match (self.in_a.contains(p), self.in_b.contains(p)) {
            (true, false) => Locality::ALocal,
            (false, true) => Locality::BLocal,
            (true, true) => Locality::Shared,
            (false, false) => Locality::Mixed,
        }
    }

    /// Restrict to what both occurrences have in common.
    pub fn intersect_with(&mut self, other: &Occurrence) {
        self.in_a.intersect_with(&other.in_a);
        self.in_b.intersect_with(&other.in_b);
    }
}

/// Symbol occurrences and per-partition hypotheses of one proof.
#[derive(Debug)]
pub struct Coloring {
    num_interpolants: usize,
    symbols: FxHashMap<String, Occurrence>,
    terms: FxHashMap<TermId, Occurrence>,
    hypotheses: Vec<Vec<TermId>>,
}

impl Coloring {
    /// Color every input clause reachable from `root`.
    pub fn compute(
        terms: &mut TermStore,
        dag: &ProofDag,
        tree: &PartitionTree,
        root: ProofNodeId,
    ) -> InterpolationResult<Self> {
        let mut hypotheses = vec![Vec::new(); tree.len()];
        let mut partitions: FxHashMap<String, FxHashSet<usize>> = FxHashMap::default();
        let mut visited: FxHashSet<ProofNodeId> = FxHashSet::default();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let node = dag
                .get(id)
                .ok_or_else(|| InterpolationError::MalformedProof(format!("missing node {}", id)))?;
            let ProofNode::Leaf(leaf) = node else {
                stack.extend(node.premises());
                continue;
            };
            let (source, clause) = match leaf {
                Leaf::Asserted { source, clause } | Leaf::Clause { source, clause } => {
                    (source, clause)
                }
                _ => continue,
            };
            let q = tree
                .partition_of(source)
                .ok_or_else(|| InterpolationError::UnknownSource(source.clone()))?;
            let mut disjuncts = Vec::with_capacity(clause.len());
            for lit in clause {
                for symbol in terms.symbols(lit.atom) {
                    partitions.entry(symbol).or_default().insert(q);
                }
                disjuncts.push(lit.to_term(terms));
            }
            hypotheses[q].push(terms.mk_or(disjuncts));
        }

        let n = tree.num_interpolants();
        let symbols = partitions
            .into_iter()
            .map(|(name, parts)| {
                let mut occ = Occurrence {
                    in_a: PartitionSet::empty(n),
                    in_b: PartitionSet::empty(n),
                };
                for p in 0..n {
                    for &q in &parts {
                        if tree.in_subtree(p, q) {
                            occ.in_a.insert(p);
                        } else {
                            occ.in_b.insert(p);
                        }
                    }
                }
                (name, occ)
            })
            .collect();
        Ok(Self {
            num_interpolants: n,
            symbols,
            terms: FxHashMap::default(),
            hypotheses,
        })
    }

    /// Occurrence of a term or atom.
    pub fn occurrence(&mut self, terms: &TermStore, t: TermId) -> &Occurrence {
        let n = self.num_interpolants;
        let symbols = &self.symbols;
        self.terms.entry(t).or_insert_with(|| {
            let mut occ = Occurrence::everywhere(n);
            for name in terms.symbols(t) {
                match symbols.get(&name) {
                    Some(sym) => occ.intersect_with(sym),
                    None => {
                        occ.in_a = PartitionSet::empty(n);
                        occ.in_b = PartitionSet::empty(n);
                    }
                }
            }
            occ
        })
    }

    /// Locality of `t` at partition `p`.
    pub fn locality(&mut self, terms: &TermStore, t: TermId, p: usize) -> Locality {
        self.occurrence(terms, t).locality(p)
    }

    /// True if symbol `name` occurs both inside and outside the subtree of `p`.
    #[must_use]
    pub fn is_shared_symbol(&self, name: &str, p: usize) -> bool {
        self.symbols
            .get(name)
            .is_some_and(|occ| occ.locality(p) == Locality::Shared)
    }

    /// Input clauses (as disjunctions) of partition `q`.
    #[must_use]
    pub fn hypotheses(&self, q: usize) -> &[TermId] {
        &self.hypotheses[q]
    }

    /// Number of interpolated partitions.
    #[must_use]
    pub fn num_interpolants(&self) -> usize {
        self.num_interpolants
    }
}
