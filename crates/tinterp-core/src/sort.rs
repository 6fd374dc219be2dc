//! Sort system for tinterp
//!
//! Only the sorts the interpolation engine reasons about are modelled:
//! propositions, the two arithmetic sorts and uninterpreted sorts for
//! congruence-closure terms.

use std::fmt;

/// A sort (type) in the SMT-LIB language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sort {
    /// Boolean sort
    Bool,
    /// Integer sort
    Int,
    /// Real sort
    Real,
    /// Uninterpreted sort
    Uninterpreted(String),
}

impl Sort {
    /// True for `Int` and `Real`.
    #[must_use]
    pub fn is_arith(&self) -> bool {
        matches!(self, Sort::Int | Sort::Real)
    }

    /// True for `Int`.
    #[must_use]
    pub fn is_int(&self) -> bool {
        matches!(self, Sort::Int)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Bool => write!(f, "Bool"),
            Sort::Int => write!(f, "Int"),
            Sort::Real => write!(f, "Real"),
            Sort::Uninterpreted(name) => write!(f, "{}", name),
        }
    }
}
