//! Affine terms over rational coefficients and infinitesimal numbers
//!
//! An [`AffineTerm`] is `Σ cᵢ·tᵢ + k` where every `tᵢ` is an arithmetic term
//! treated as an opaque atom (a variable, an uninterpreted application or a
//! `div` term) and `k` is an [`InfNumber`]. Strict inequalities are encoded by
//! a positive epsilon part of the constant: `s < 0` is `s + ε ≤ 0`.

use crate::term::{Constant, TermData, TermId, TermStore, OP_ADD, OP_MUL, OP_SUB};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Neg};

/// A rational number extended with a signed infinitesimal: `real + eps·ε`.
///
/// Only the sign of the infinitesimal part is tracked, since no bound in an
/// interpolation proof ever needs more than one epsilon of slack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InfNumber {
    /// Standard part
    pub real: BigRational,
    /// Sign of the infinitesimal part (-1, 0 or 1)
    pub eps: i8,
}

impl InfNumber {
    /// The number zero.
    #[must_use]
    pub fn zero() -> Self {
        InfNumber {
            real: BigRational::zero(),
            eps: 0,
        }
    }

    /// The number one.
    #[must_use]
    pub fn one() -> Self {
        Self::from_rational(BigRational::one())
    }

    /// The infinitesimal `ε`.
    #[must_use]
    pub fn epsilon() -> Self {
        InfNumber {
            real: BigRational::zero(),
            eps: 1,
        }
    }

    /// Embed a rational.
    #[must_use]
    pub fn from_rational(real: BigRational) -> Self {
        InfNumber { real, eps: 0 }
    }

    /// Embed an integer.
    #[must_use]
    pub fn from_int(value: i64) -> Self {
        Self::from_rational(BigRational::from_integer(BigInt::from(value)))
    }

    /// True if both parts are zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.real.is_zero() && self.eps == 0
    }

    /// Sign of the number (-1, 0, 1), comparing the standard part first.
    #[must_use]
    pub fn signum(&self) -> i8 {
        if self.real.is_positive() {
            1
        } else if self.real.is_negative() {
            -1
        } else {
            self.eps.signum()
        }
    }

    /// Multiply by a rational factor.
    #[must_use]
    pub fn mul_rational(&self, factor: &BigRational) -> Self {
        let sign = if factor.is_positive() {
            1
        } else if factor.is_negative() {
            -1
        } else {
            0
        };
        InfNumber {
            real: &self.real * factor,
            eps: self.eps * sign,
        }
    }

    /// Magnitude of the number.
    #[must_use]
    pub fn abs(&self) -> Self {
        if self.signum() < 0 {
            -self.clone()
        } else {
            self.clone()
        }
    }
}

impl Add for InfNumber {
    type Output = InfNumber;

    fn add(self, rhs: InfNumber) -> InfNumber {
        InfNumber {
            real: self.real + rhs.real,
            eps: (self.eps + rhs.eps).signum(),
        }
    }
}

impl Neg for InfNumber {
    type Output = InfNumber;

    fn neg(self) -> InfNumber {
        InfNumber {
            real: -self.real,
            eps: -self.eps,
        }
    }
}

impl fmt::Display for InfNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.eps {
            0 => write!(f, "{}", self.real),
            e if e > 0 => write!(f, "{}+eps", self.real),
            _ => write!(f, "{}-eps", self.real),
        }
    }
}

/// A linear combination of arithmetic atoms plus an infinitesimal constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AffineTerm {
    coeffs: BTreeMap<TermId, BigRational>,
    constant: InfNumber,
}

impl Default for InfNumber {
    fn default() -> Self {
        Self::zero()
    }
}

impl AffineTerm {
    /// The zero term.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A constant term.
    #[must_use]
    pub fn constant_term(constant: InfNumber) -> Self {
        AffineTerm {
            coeffs: BTreeMap::new(),
            constant,
        }
    }

    /// `1·atom`.
    #[must_use]
    pub fn atom(atom: TermId) -> Self {
        let mut term = Self::new();
        term.add_atom(atom, BigRational::one());
        term
    }

    /// Add `coeff·atom` in place, dropping the atom if it cancels out.
    pub fn add_atom(&mut self, atom: TermId, coeff: BigRational) {
        if coeff.is_zero() {
            return;
        }
        let entry = self.coeffs.entry(atom).or_insert_with(BigRational::zero);
        *entry += coeff;
        if entry.is_zero() {
            self.coeffs.remove(&atom);
        }
    }

    /// Add `factor·other` in place.
    pub fn add_scaled(&mut self, other: &AffineTerm, factor: &BigRational) {
        for (&atom, coeff) in &other.coeffs {
            self.add_atom(atom, coeff * factor);
        }
        let scaled = other.constant.mul_rational(factor);
        self.constant = std::mem::take(&mut self.constant) + scaled;
    }

    /// Add a constant in place.
    pub fn add_constant(&mut self, constant: InfNumber) {
        self.constant = std::mem::take(&mut self.constant) + constant;
    }

    /// Return `factor·self`.
    #[must_use]
    pub fn scaled(&self, factor: &BigRational) -> AffineTerm {
        let mut result = AffineTerm::new();
        result.add_scaled(self, factor);
        result
    }

    /// Return `self + other`.
    #[must_use]
    pub fn plus(&self, other: &AffineTerm) -> AffineTerm {
        let mut result = self.clone();
        result.add_scaled(other, &BigRational::one());
        result
    }

    /// Coefficient of `atom` (zero if absent).
    #[must_use]
    pub fn coeff(&self, atom: TermId) -> BigRational {
        self.coeffs
            .get(&atom)
            .cloned()
            .unwrap_or_else(BigRational::zero)
    }

    /// True if `atom` occurs with a non-zero coefficient.
    #[must_use]
    pub fn contains(&self, atom: TermId) -> bool {
        self.coeffs.contains_key(&atom)
    }

    /// Remove `atom`, returning its coefficient.
    pub fn remove_atom(&mut self, atom: TermId) -> Option<BigRational> {
        self.coeffs.remove(&atom)
    }

    /// Iterate over `(atom, coefficient)` pairs in atom order.
    pub fn atoms(&self) -> impl Iterator<Item = (TermId, &BigRational)> {
        self.coeffs.iter().map(|(&atom, coeff)| (atom, coeff))
    }

    /// The constant part.
    #[must_use]
    pub fn constant(&self) -> &InfNumber {
        &self.constant
    }

    /// True if no atom occurs.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Copy of this term without its constant.
    #[must_use]
    pub fn without_constant(&self) -> AffineTerm {
        AffineTerm {
            coeffs: self.coeffs.clone(),
            constant: InfNumber::zero(),
        }
    }

    /// True if every atom has integer sort and every coefficient is integral.
    #[must_use]
    pub fn is_integral(&self, terms: &TermStore) -> bool {
        self.coeffs
            .iter()
            .all(|(&atom, coeff)| terms.sort(atom).is_int() && coeff.is_integer())
    }

    /// True if every atom has integer sort. Constant terms count as integer.
    #[must_use]
    pub fn has_int_sort(&self, terms: &TermStore) -> bool {
        self.coeffs.keys().all(|&atom| terms.sort(atom).is_int())
    }

    /// Scale the term so its coefficients are coprime integers.
    ///
    /// The scaling factor is positive, so `self ≤ 0` keeps its meaning. When
    /// `integral` holds the constant is rounded up, turning strict bounds into
    /// non-strict ones: for an integer `x`, `x + c ≤ 0` iff `x + ⌈c⌉ ≤ 0`.
    /// Returns the applied factor.
    pub fn normalize(&mut self, integral: bool) -> BigRational {
        if self.coeffs.is_empty() {
            return BigRational::one();
        }
        let mut denom_lcm = BigInt::one();
        for coeff in self.coeffs.values() {
            denom_lcm = denom_lcm.lcm(coeff.denom());
        }
        let mut numer_gcd = BigInt::zero();
        for coeff in self.coeffs.values() {
            let numer = coeff.numer() * (&denom_lcm / coeff.denom());
            numer_gcd = numer_gcd.gcd(&numer);
        }
        let factor = BigRational::new(denom_lcm, numer_gcd);
        for coeff in self.coeffs.values_mut() {
            *coeff = &*coeff * &factor;
        }
        self.constant = self.constant.mul_rational(&factor);
        if integral {
            let c = &self.constant.real;
            let rounded = if self.constant.eps > 0 {
                c.floor() + BigRational::one()
            } else {
                c.ceil()
            };
            self.constant = InfNumber::from_rational(rounded);
        }
        factor
    }

    /// Replace `atom` by `replacement`.
    #[must_use]
    pub fn substitute(&self, atom: TermId, replacement: &AffineTerm) -> AffineTerm {
        let mut result = self.clone();
        if let Some(coeff) = result.remove_atom(atom) {
            result.add_scaled(replacement, &coeff);
        }
        result
    }

    /// Read an arithmetic term as an affine term.
    ///
    /// Sums, differences, negations, constant multiples and constants are
    /// interpreted; every other subterm becomes an atom.
    #[must_use]
    pub fn from_term(terms: &TermStore, term: TermId) -> AffineTerm {
        let mut result = AffineTerm::new();
        let mut stack = vec![(term, BigRational::one())];
        while let Some((t, factor)) = stack.pop() {
            match terms.get(t) {
                TermData::Const(Constant::Int(n)) => {
                    let value = BigRational::from_integer(n.clone()) * &factor;
                    result.add_constant(InfNumber::from_rational(value));
                }
                TermData::Const(Constant::Rational(r)) => {
                    result.add_constant(InfNumber::from_rational(r * &factor));
                }
                TermData::App(sym, args) if sym.name() == OP_ADD => {
                    stack.extend(args.iter().map(|&a| (a, factor.clone())));
                }
                TermData::App(sym, args) if sym.name() == OP_SUB && args.len() == 1 => {
                    stack.push((args[0], -factor));
                }
                TermData::App(sym, args) if sym.name() == OP_SUB && !args.is_empty() => {
                    stack.push((args[0], factor.clone()));
                    stack.extend(args[1..].iter().map(|&a| (a, -factor.clone())));
                }
                TermData::App(sym, args) if sym.name() == OP_MUL && args.len() == 2 => {
                    match (terms.numeral(args[0]), terms.numeral(args[1])) {
                        (Some(c), _) => stack.push((args[1], &factor * c)),
                        (None, Some(c)) => stack.push((args[0], &factor * c)),
                        (None, None) => result.add_atom(t, factor),
                    }
                }
                _ => result.add_atom(t, factor),
            }
        }
        result
    }
}

impl fmt::Display for AffineTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (atom, coeff) in &self.coeffs {
            if !first {
                write!(f, " + ")?;
            }
            first = false;
            write!(f, "{}*t{}", coeff, atom.0)?;
        }
        if first || !self.constant.is_zero() {
            if !first {
                write!(f, " + ")?;
            }
            write!(f, "{}", self.constant)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sort;

    fn rat(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_add_and_cancel() {
        let mut terms = TermStore::new();
        let x = terms.mk_var("x", Sort::Real);
        let mut a = AffineTerm::atom(x);
        a.add_atom(x, rat(-1, 1));
        assert!(a.is_constant());
        assert!(a.constant().is_zero());
    }

    #[test]
    fn test_normalize_real_keeps_epsilon() {
        let mut terms = TermStore::new();
        let x = terms.mk_var("x", Sort::Real);
        let y = terms.mk_var("y", Sort::Real);
        let mut a = AffineTerm::new();
        a.add_atom(x, rat(2, 3));
        a.add_atom(y, rat(-4, 3));
        a.add_constant(InfNumber::epsilon());
        let factor = a.normalize(false);
        assert_eq!(factor, rat(3, 2));
        assert_eq!(a.coeff(x), rat(1, 1));
        assert_eq!(a.coeff(y), rat(-2, 1));
        assert_eq!(a.constant().eps, 1);
    }

    #[test]
    fn test_normalize_integral_rounds_constant_up() {
        let mut terms = TermStore::new();
        let x = terms.mk_var("x", Sort::Int);
        let mut a = AffineTerm::new();
        a.add_atom(x, rat(2, 1));
        a.add_constant(InfNumber::from_int(-3));
        a.normalize(true);
        // 2x - 3 <= 0  ~>  x - 3/2 <= 0  ~>  x - 1 <= 0
        assert_eq!(a.coeff(x), rat(1, 1));
        assert_eq!(a.constant().real, rat(-1, 1));
    }

    #[test]
    fn test_normalize_integral_strict() {
        let mut terms = TermStore::new();
        let x = terms.mk_var("x", Sort::Int);
        let mut a = AffineTerm::atom(x);
        a.add_constant(InfNumber::from_int(-5) + InfNumber::epsilon());
        a.normalize(true);
        // x - 5 < 0  ~>  x - 4 <= 0
        assert_eq!(a.constant().real, rat(-4, 1));
        assert_eq!(a.constant().eps, 0);
    }

    #[test]
    fn test_from_term_roundtrips_linear_structure() {
        let mut terms = TermStore::new();
        let x = terms.mk_var("x", Sort::Int);
        let y = terms.mk_var("y", Sort::Int);
        let three = terms.mk_int(BigInt::from(3));
        let three_y = terms.mk_mul(three, y);
        let seven = terms.mk_int(BigInt::from(7));
        let diff = terms.mk_sub(x, three_y);
        let sum = terms.mk_add(vec![diff, seven]);
        let a = AffineTerm::from_term(&terms, sum);
        assert_eq!(a.coeff(x), rat(1, 1));
        assert_eq!(a.coeff(y), rat(-3, 1));
        assert_eq!(a.constant().real, rat(7, 1));
    }

    #[test]
    fn test_substitute() {
        let mut terms = TermStore::new();
        let x = terms.mk_var("x", Sort::Real);
        let y = terms.mk_var("y", Sort::Real);
        let mut a = AffineTerm::atom(x);
        a.add_atom(y, rat(2, 1));
        let mut repl = AffineTerm::atom(y);
        repl.add_constant(InfNumber::from_int(1));
        let b = a.substitute(x, &repl);
        assert!(!b.contains(x));
        assert_eq!(b.coeff(y), rat(3, 1));
        assert_eq!(b.constant().real, rat(1, 1));
    }

    #[test]
    fn test_inf_number_ordering_and_sign() {
        let minus_eps = -InfNumber::epsilon();
        assert_eq!(minus_eps.signum(), -1);
        let k = InfNumber::from_int(-1).mul_rational(&rat(3, 1));
        assert_eq!(k.real, rat(-3, 1));
        assert_eq!((InfNumber::epsilon() + minus_eps).eps, 0);
    }
}
