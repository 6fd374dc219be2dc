//! Theory lemma payloads
//!
//! Lemmas are leaves of a refutation whose clause is valid in a theory. Each
//! payload carries the annotation the interpolation engine needs to split the
//! theory reasoning between partitions.

use crate::literal::Literal;
use num_rational::BigRational;
use smallvec::SmallVec;
use tinterp_core::TermId;

/// Literals of a clause.
pub type Clause = SmallVec<[Literal; 4]>;

/// One step of a congruence-closure justification path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CcStep {
    /// The two path terms are equal by the negated clause literal `¬(u = v)`;
    /// the literal stored here is the positive equality atom.
    Equality(Literal),
    /// The two path terms are applications of the same function whose
    /// arguments are pairwise equal. Trivially identical argument pairs have
    /// no literal.
    Congruence {
        /// Positive equality atoms justifying differing argument pairs
        args: Vec<Literal>,
    },
}

/// A congruence-closure lemma `¬e₁ ∨ … ∨ ¬eₘ ∨ (a = b)`.
///
/// `path[0]` is `a`, `path[n]` is `b` and `steps[i]` connects `path[i]` with
/// `path[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CcLemma {
    /// The positive goal equality `a = b`
    pub goal: Literal,
    /// Terms along the justification path
    pub path: Vec<TermId>,
    /// Justification of each consecutive pair
    pub steps: Vec<CcStep>,
}

impl CcLemma {
    /// The literals of the lemma clause.
    #[must_use]
    pub fn clause(&self) -> Clause {
        let mut clause: Clause = SmallVec::new();
        clause.push(self.goal);
        for step in &self.steps {
            match step {
                CcStep::Equality(eq) => clause.push(eq.negate()),
                CcStep::Congruence { args } => clause.extend(args.iter().map(|a| a.negate())),
            }
        }
        clause
    }
}

/// A linear-arithmetic conflict with one Farkas coefficient per literal.
///
/// For a positive coefficient the literal's negation reads `affine ≤ 0`; for
/// a negative one it reads `affine > 0`. Summing `c·affine` over all
/// literals, with `|c|·ε` slack for negative coefficients on bounds, yields
/// a positive constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaLemma {
    /// Clause literals paired with their signed coefficients
    pub literals: Vec<(Literal, BigRational)>,
}

impl LaLemma {
    /// The literals of the lemma clause.
    #[must_use]
    pub fn clause(&self) -> Clause {
        self.literals.iter().map(|(lit, _)| *lit).collect()
    }
}

/// The trichotomy lemma `a < 0 ∨ a = 0 ∨ a > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrichotomyLemma {
    /// Positive literal of the atom `a < 0`
    pub less: Literal,
    /// Positive literal of the atom `a = 0`
    pub equal: Literal,
    /// Positive literal of the atom `a > 0`
    pub greater: Literal,
}

impl TrichotomyLemma {
    /// The literals of the lemma clause.
    #[must_use]
    pub fn clause(&self) -> Clause {
        SmallVec::from_slice(&[self.less, self.equal, self.greater])
    }
}
