//! Arena-allocated resolution proofs
//!
//! A [`ProofDag`] owns its nodes; children are referenced by
//! [`ProofNodeId`], so shared subproofs are stored once. Every literal that
//! enters the DAG has its atom classified into a [`LitShape`] on the way in.

use crate::lemma::{CcLemma, CcStep, Clause, LaLemma, TrichotomyLemma};
use crate::literal::{LitShape, Literal};
use num_traits::Zero;
use rustc_hash::FxHashMap;
use std::fmt;
use thiserror::Error;
use tinterp_core::{TermId, TermStore};

/// Index of a node in a [`ProofDag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProofNodeId(pub u32);

impl ProofNodeId {
    /// Position in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ProofNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Errors raised while building a proof DAG.
#[derive(Debug, Error)]
pub enum ProofError {
    /// A child id does not refer to an existing node
    #[error("unknown proof node {0}")]
    UnknownNode(ProofNodeId),
    /// An inner node has no antecedents or rewrites
    #[error("{0} node without premises")]
    NoPremises(&'static str),
    /// A lemma literal does not have the shape the lemma requires
    #[error("lemma literal {literal} has unexpected shape: {expected}")]
    ShapeMismatch {
        /// Offending literal in SMT-LIB syntax
        literal: String,
        /// What the lemma needed
        expected: &'static str,
    },
    /// The literals of a trichotomy lemma are not over one affine term
    #[error("trichotomy lemma over different terms: {0}")]
    TrichotomyMismatch(String),
    /// A congruence path and its steps disagree in length
    #[error("congruence path of {terms} terms has {steps} steps")]
    PathLength {
        /// Number of path terms
        terms: usize,
        /// Number of steps
        steps: usize,
    },
}

/// A leaf of a resolution proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leaf {
    /// An input clause asserted in the named partition
    Asserted {
        /// Partition name
        source: String,
        /// Clause literals
        clause: Clause,
    },
    /// A clause derived from input of the named partition only (for example
    /// by clausification)
    Clause {
        /// Partition name
        source: String,
        /// Clause literals
        clause: Clause,
    },
    /// Congruence-closure lemma
    CcLemma(CcLemma),
    /// Linear-arithmetic Farkas lemma
    LaLemma(LaLemma),
    /// Trichotomy lemma
    Trichotomy(TrichotomyLemma),
    /// A clause containing an atom in both polarities
    Tautology {
        /// Clause literals
        clause: Clause,
    },
    /// A valid equality `u = v` justified by rewriting
    Rewrite {
        /// Positive equality literal
        equality: Literal,
    },
    /// A leaf produced by a rule the interpolation engine has no procedure
    /// for (quantifier instantiation, external lemmas)
    Opaque {
        /// Rule name
        rule: String,
        /// Clause literals
        clause: Clause,
    },
}

impl Leaf {
    /// Short name of the leaf kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Leaf::Asserted { .. } => "asserted",
            Leaf::Clause { .. } => "clause",
            Leaf::CcLemma(_) => "cc-lemma",
            Leaf::LaLemma(_) => "la-lemma",
            Leaf::Trichotomy(_) => "trichotomy",
            Leaf::Tautology { .. } => "tautology",
            Leaf::Rewrite { .. } => "rewrite",
            Leaf::Opaque { rule, .. } => rule,
        }
    }

    /// The literals of the leaf's clause.
    #[must_use]
    pub fn clause(&self) -> Clause {
        match self {
            Leaf::Asserted { clause, .. }
            | Leaf::Clause { clause, .. }
            | Leaf::Tautology { clause }
            | Leaf::Opaque { clause, .. } => clause.clone(),
            Leaf::CcLemma(lemma) => lemma.clause(),
            Leaf::LaLemma(lemma) => lemma.clause(),
            Leaf::Trichotomy(lemma) => lemma.clause(),
            Leaf::Rewrite { equality } => Clause::from_slice(&[*equality]),
        }
    }
}

/// An antecedent of a resolution step.
///
/// `pivot` occurs in the antecedent's clause; its negation occurs in the
/// clause derived so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Antecedent {
    /// Pivot literal as it occurs in `node`
    pub pivot: Literal,
    /// The antecedent proof
    pub node: ProofNodeId,
}

/// One rewrite of a substitution step.
///
/// `justification` proves a clause containing `equality`; the negated
/// equality is resolved away against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rewrite {
    /// Positive equality literal used for the rewrite
    pub equality: Literal,
    /// Proof of the equality
    pub justification: ProofNodeId,
}

/// A proof node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofNode {
    /// A leaf clause
    Leaf(Leaf),
    /// Hyper-resolution: the primary resolved in order with each antecedent
    Resolution {
        /// Main premise
        primary: ProofNodeId,
        /// Side premises in resolution order
        antecedents: Vec<Antecedent>,
    },
    /// A literal of the primary rewritten by proven equalities
    Substitution {
        /// Main premise
        primary: ProofNodeId,
        /// Equalities applied in order
        rewrites: Vec<Rewrite>,
    },
}

impl ProofNode {
    /// Ids of the direct premises, primary first.
    #[must_use]
    pub fn premises(&self) -> Vec<ProofNodeId> {
        match self {
            ProofNode::Leaf(_) => Vec::new(),
            ProofNode::Resolution {
                primary,
                antecedents,
            } => std::iter::once(*primary)
                .chain(antecedents.iter().map(|a| a.node))
                .collect(),
            ProofNode::Substitution { primary, rewrites } => std::iter::once(*primary)
                .chain(rewrites.iter().map(|r| r.justification))
                .collect(),
        }
    }
}

/// A resolution refutation stored as a DAG.
#[derive(Debug, Default)]
pub struct ProofDag {
    nodes: Vec<ProofNode>,
    shapes: FxHashMap<TermId, LitShape>,
}

impl ProofDag {
    /// Create an empty DAG.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the DAG has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node.
    #[must_use]
    pub fn get(&self, id: ProofNodeId) -> Option<&ProofNode> {
        self.nodes.get(id.index())
    }

    /// Iterate over all nodes with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (ProofNodeId, &ProofNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (ProofNodeId(i as u32), node))
    }

    /// Shape of a registered atom.
    #[must_use]
    pub fn shape(&self, atom: TermId) -> Option<&LitShape> {
        self.shapes.get(&atom)
    }

    /// Classify `atom` and remember its shape.
    pub fn register_atom(&mut self, terms: &TermStore, atom: TermId) -> &LitShape {
        self.shapes
            .entry(atom)
            .or_insert_with(|| LitShape::classify(terms, atom))
    }

    fn register_all(&mut self, terms: &TermStore, literals: &[Literal]) {
        for lit in literals {
            self.register_atom(terms, lit.atom);
        }
    }

    fn push(&mut self, node: ProofNode) -> ProofNodeId {
        let id = ProofNodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn check_node(&self, id: ProofNodeId) -> Result<(), ProofError> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(ProofError::UnknownNode(id))
        }
    }

    fn expect_shape(
        &mut self,
        terms: &TermStore,
        literal: Literal,
        expected: &'static str,
        accept: fn(&LitShape) -> bool,
    ) -> Result<(), ProofError> {
        if accept(self.register_atom(terms, literal.atom)) {
            Ok(())
        } else {
            Err(ProofError::ShapeMismatch {
                literal: literal.to_smtlib(terms),
                expected,
            })
        }
    }

    /// Add an input clause of partition `source`.
    pub fn add_asserted(
        &mut self,
        terms: &TermStore,
        source: impl Into<String>,
        literals: &[Literal],
    ) -> ProofNodeId {
        self.register_all(terms, literals);
        self.push(ProofNode::Leaf(Leaf::Asserted {
            source: source.into(),
            clause: Clause::from_slice(literals),
        }))
    }

    /// Add a clause derived from partition `source` alone.
    pub fn add_clause(
        &mut self,
        terms: &TermStore,
        source: impl Into<String>,
        literals: &[Literal],
    ) -> ProofNodeId {
        self.register_all(terms, literals);
        self.push(ProofNode::Leaf(Leaf::Clause {
            source: source.into(),
            clause: Clause::from_slice(literals),
        }))
    }

    /// Add a tautological clause.
    pub fn add_tautology(&mut self, terms: &TermStore, literals: &[Literal]) -> ProofNodeId {
        self.register_all(terms, literals);
        self.push(ProofNode::Leaf(Leaf::Tautology {
            clause: Clause::from_slice(literals),
        }))
    }

    /// Add a valid equality proven by rewriting.
    pub fn add_rewrite(
        &mut self,
        terms: &TermStore,
        equality: Literal,
    ) -> Result<ProofNodeId, ProofError> {
        self.expect_shape(terms, equality, "equality", LitShape::is_equality)?;
        Ok(self.push(ProofNode::Leaf(Leaf::Rewrite { equality })))
    }

    /// Add a leaf of a rule without interpolation support.
    pub fn add_opaque(
        &mut self,
        terms: &TermStore,
        rule: impl Into<String>,
        literals: &[Literal],
    ) -> ProofNodeId {
        self.register_all(terms, literals);
        self.push(ProofNode::Leaf(Leaf::Opaque {
            rule: rule.into(),
            clause: Clause::from_slice(literals),
        }))
    }

    /// Add a Farkas lemma. Every literal must be arithmetic.
    pub fn add_la_lemma(
        &mut self,
        terms: &TermStore,
        lemma: LaLemma,
    ) -> Result<ProofNodeId, ProofError> {
        for (lit, _) in &lemma.literals {
            self.expect_shape(terms, *lit, "arithmetic atom", |s| s.affine().is_some())?;
        }
        Ok(self.push(ProofNode::Leaf(Leaf::LaLemma(lemma))))
    }

    /// Add a trichotomy lemma.
    pub fn add_trichotomy(
        &mut self,
        terms: &TermStore,
        lemma: TrichotomyLemma,
    ) -> Result<ProofNodeId, ProofError> {
        let is_bound = |s: &LitShape| matches!(s, LitShape::Bound { .. });
        self.expect_shape(terms, lemma.less, "bound", is_bound)?;
        self.expect_shape(terms, lemma.greater, "bound", is_bound)?;
        self.expect_shape(terms, lemma.equal, "arithmetic equality", |s| {
            matches!(s, LitShape::LaEquality { .. })
        })?;
        let mismatch = || {
            ProofError::TrichotomyMismatch(format!(
                "{} / {} / {}",
                lemma.less.to_smtlib(terms),
                lemma.equal.to_smtlib(terms),
                lemma.greater.to_smtlib(terms)
            ))
        };
        let (less, greater, equal) = match (
            self.shapes.get(&lemma.less.atom),
            self.shapes.get(&lemma.greater.atom),
            self.shapes.get(&lemma.equal.atom),
        ) {
            (
                Some(LitShape::Bound {
                    affine: less,
                    epsilon: less_slack,
                }),
                Some(LitShape::Bound {
                    affine: greater,
                    epsilon: greater_slack,
                }),
                Some(LitShape::LaEquality { affine: equal }),
            ) => {
                let mut less = less.clone();
                less.add_constant(-less_slack.clone());
                let mut greater = greater.clone();
                greater.add_constant(-greater_slack.clone());
                (less, greater, equal)
            }
            _ => return Err(mismatch()),
        };
        // `less - slack` and `greater - slack` cancel, and the equality is a
        // multiple of `less - slack`
        let sum = less.plus(&greater);
        if !sum.is_constant() || !sum.constant().is_zero() {
            return Err(mismatch());
        }
        let Some((atom, coeff)) = less.atoms().next() else {
            return Err(mismatch());
        };
        let ratio = equal.coeff(atom) / coeff;
        if ratio.is_zero() || less.scaled(&ratio) != *equal {
            return Err(mismatch());
        }
        Ok(self.push(ProofNode::Leaf(Leaf::Trichotomy(lemma))))
    }

    /// Add a congruence-closure lemma.
    pub fn add_cc_lemma(
        &mut self,
        terms: &TermStore,
        lemma: CcLemma,
    ) -> Result<ProofNodeId, ProofError> {
        if lemma.path.len() != lemma.steps.len() + 1 {
            return Err(ProofError::PathLength {
                terms: lemma.path.len(),
                steps: lemma.steps.len(),
            });
        }
        self.expect_shape(terms, lemma.goal, "equality", LitShape::is_equality)?;
        for step in &lemma.steps {
            let literals = match step {
                CcStep::Equality(eq) => std::slice::from_ref(eq),
                CcStep::Congruence { args } => args.as_slice(),
            };
            for lit in literals {
                self.expect_shape(terms, *lit, "equality", LitShape::is_equality)?;
            }
        }
        Ok(self.push(ProofNode::Leaf(Leaf::CcLemma(lemma))))
    }

    /// Add a resolution step.
    pub fn add_resolution(
        &mut self,
        terms: &TermStore,
        primary: ProofNodeId,
        antecedents: Vec<Antecedent>,
    ) -> Result<ProofNodeId, ProofError> {
        if antecedents.is_empty() {
            return Err(ProofError::NoPremises("resolution"));
        }
        self.check_node(primary)?;
        for ante in &antecedents {
            self.check_node(ante.node)?;
            self.register_atom(terms, ante.pivot.atom);
        }
        Ok(self.push(ProofNode::Resolution {
            primary,
            antecedents,
        }))
    }

    /// Add a substitution step.
    pub fn add_substitution(
        &mut self,
        terms: &TermStore,
        primary: ProofNodeId,
        rewrites: Vec<Rewrite>,
    ) -> Result<ProofNodeId, ProofError> {
        if rewrites.is_empty() {
            return Err(ProofError::NoPremises("substitution"));
        }
        self.check_node(primary)?;
        for rw in &rewrites {
            self.check_node(rw.justification)?;
            self.expect_shape(terms, rw.equality, "equality", LitShape::is_equality)?;
        }
        Ok(self.push(ProofNode::Substitution { primary, rewrites }))
    }

    /// Number of parents of every node reachable from `root`.
    #[must_use]
    pub fn reference_counts(&self, root: ProofNodeId) -> FxHashMap<ProofNodeId, usize> {
        let mut counts: FxHashMap<ProofNodeId, usize> = FxHashMap::default();
        counts.insert(root, 1);
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            for child in node.premises() {
                let count = counts.entry(child).or_insert(0);
                *count += 1;
                if *count == 1 {
                    stack.push(child);
                }
            }
        }
        counts
    }
}
