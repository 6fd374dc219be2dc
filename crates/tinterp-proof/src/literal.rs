//! Literals and their theory-specific shapes
//!
//! A [`Literal`] is an atom with a polarity. The shape of the atom
//! ([`LitShape`]) is resolved once when the literal enters a proof and then
//! looked up by atom, so the interpolation engine never re-parses terms.

use num_rational::BigRational;
use num_traits::One;
use std::fmt;
use tinterp_core::term::{OP_EQ, OP_LE, OP_LT};
use tinterp_core::{AffineTerm, InfNumber, TermData, TermId, TermStore};

/// A signed atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    /// The (boolean) atom
    pub atom: TermId,
    /// Polarity
    pub positive: bool,
}

impl Literal {
    /// The atom itself.
    #[must_use]
    pub fn pos(atom: TermId) -> Self {
        Literal {
            atom,
            positive: true,
        }
    }

    /// The negated atom.
    #[must_use]
    pub fn neg(atom: TermId) -> Self {
        Literal {
            atom,
            positive: false,
        }
    }

    /// The complementary literal.
    #[must_use]
    pub fn negate(self) -> Self {
        Literal {
            atom: self.atom,
            positive: !self.positive,
        }
    }

    /// The literal as a term.
    pub fn to_term(self, terms: &mut TermStore) -> TermId {
        if self.positive {
            self.atom
        } else {
            terms.mk_not(self.atom)
        }
    }
}

impl Literal {
    /// The literal in SMT-LIB syntax.
    #[must_use]
    pub fn to_smtlib(self, terms: &TermStore) -> String {
        let atom = terms.to_smtlib(self.atom);
        if self.positive {
            atom
        } else {
            format!("(not {})", atom)
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.positive {
            write!(f, "{}", self.atom)
        } else {
            write!(f, "~{}", self.atom)
        }
    }
}

/// Theory view of an atom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LitShape {
    /// A purely propositional atom
    Boolean,
    /// Equality between two non-arithmetic terms
    CcEquality {
        /// Left argument
        lhs: TermId,
        /// Right argument
        rhs: TermId,
    },
    /// Arithmetic equality `affine = 0`
    LaEquality {
        /// `lhs - rhs`
        affine: AffineTerm,
    },
    /// Bound constraint `affine ≤ 0`
    Bound {
        /// `lhs - rhs`, plus `ε` (or `1` over the integers) for strict atoms
        affine: AffineTerm,
        /// Slack of the negated atom: `1` for integer atoms, `ε` for reals
        epsilon: InfNumber,
    },
}

impl LitShape {
    /// Classify an atom by its top-level structure.
    #[must_use]
    pub fn classify(terms: &TermStore, atom: TermId) -> LitShape {
        let TermData::App(sym, args) = terms.get(atom) else {
            return LitShape::Boolean;
        };
        if args.len() != 2 {
            return LitShape::Boolean;
        }
        let (lhs, rhs) = (args[0], args[1]);
        match sym.name() {
            OP_EQ if terms.sort(lhs).is_arith() => LitShape::LaEquality {
                affine: difference(terms, lhs, rhs),
            },
            OP_EQ => LitShape::CcEquality { lhs, rhs },
            op @ (OP_LE | OP_LT) => {
                let mut affine = difference(terms, lhs, rhs);
                let integral = affine.is_integral(terms);
                if op == OP_LT {
                    if integral {
                        affine.add_constant(InfNumber::one());
                    } else {
                        affine.add_constant(InfNumber::epsilon());
                    }
                }
                let epsilon = if integral {
                    InfNumber::one()
                } else {
                    InfNumber::epsilon()
                };
                LitShape::Bound { affine, epsilon }
            }
            _ => LitShape::Boolean,
        }
    }

    /// True for CC and LA equalities.
    #[must_use]
    pub fn is_equality(&self) -> bool {
        matches!(self, LitShape::CcEquality { .. } | LitShape::LaEquality { .. })
    }

    /// The affine term of an arithmetic atom.
    #[must_use]
    pub fn affine(&self) -> Option<&AffineTerm> {
        match self {
            LitShape::LaEquality { affine } | LitShape::Bound { affine, .. } => Some(affine),
            _ => None,
        }
    }
}

fn difference(terms: &TermStore, lhs: TermId, rhs: TermId) -> AffineTerm {
    let mut affine = AffineTerm::from_term(terms, lhs);
    let rhs = AffineTerm::from_term(terms, rhs);
    if !rhs.is_constant() || !rhs.constant().is_zero() {
        affine.add_scaled(&rhs, &-BigRational::one());
    }
    affine
}
