//! Elimination of auxiliary variables of mixed pivots
//!
//! Equalities: every `AuxEq(x, s)` in the interpolant of the clause that
//! contains the equality positively is replaced by the other interpolant
//! with `x := s`.
//!
//! Inequalities: the interpolant of the clause containing `a ≤ 0` carries
//! wrappers `(c1·x + s1, k1, F1)`, the other one wrappers
//! `(-c2·x + s2, k2, F2)`. Each pair is replaced by a wrapper over
//! `c2·s1 + c1·s2` whose formula is `∃x. F1 ∧ F2` written without `x`.

use crate::error::{InterpolationError, InterpolationResult};
use crate::interpolant::{map_aux_eqs, map_wrappers};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive};
use tinterp_core::{AffineTerm, BoundedTerm, InfNumber, TermId, TermStore};
use tracing::debug;

/// Eliminate the auxiliary variable `x` of a mixed equality pivot.
pub(crate) fn eliminate_equality(
    terms: &mut TermStore,
    x: TermId,
    i_eq: TermId,
    i_neq: TermId,
) -> TermId {
    map_aux_eqs(terms, i_eq, x, |store, s| store.substitute(i_neq, x, s))
}

/// Eliminate the auxiliary variable `x` of a mixed bound pivot.
///
/// `upper` is the interpolant of the clause containing the bound atom
/// positively. Returns the combined term and the number of integer
/// candidates enumerated.
pub(crate) fn eliminate_inequality(
    terms: &mut TermStore,
    x: TermId,
    upper: TermId,
    lower: TermId,
) -> InterpolationResult<(TermId, usize)> {
    let mut candidates = 0;
    let result = map_wrappers(terms, upper, x, |store, up| {
        map_wrappers(store, lower, x, |store, low| {
            let (combined, n) = combine_wrappers(store, x, up, low)?;
            candidates += n;
            Ok(combined)
        })
    })?;
    Ok((result, candidates))
}

/// Combine one upper and one lower wrapper on `x`.
pub(crate) fn combine_wrappers(
    terms: &mut TermStore,
    x: TermId,
    up: &BoundedTerm,
    low: &BoundedTerm,
) -> InterpolationResult<(TermId, usize)> {
    let c1 = up.affine.coeff(x);
    let c2 = -low.affine.coeff(x);
    if !c1.is_positive() || !c2.is_positive() {
        return Err(InterpolationError::Internal(format!(
            "auxiliary variable {} has coefficients {} and {}",
            x, c1, -c2
        )));
    }
    let mut s1 = up.affine.clone();
    s1.remove_atom(x);
    let mut s2 = low.affine.clone();
    s2.remove_atom(x);

    let mut combined = s1.scaled(&c2);
    combined.add_scaled(&s2, &c1);
    let integral = terms.sort(x).is_int();
    let mut bound = up.bound.mul_rational(&c2) + low.bound.mul_rational(&c1);
    if integral {
        bound = bound + InfNumber::from_rational(-(&c1 * &c2));
    }

    let (formula, candidates) = if integral {
        integer_case_split(terms, x, up, low, (&c1, &s1), (&c2, &s2))?
    } else {
        (real_elimination(terms, x, up, low, (&c1, &s1), (&c2, &s2), &combined), 0)
    };
    debug!(aux = %x, candidates, "combined bounded wrappers");
    Ok((terms.mk_bounded(combined, bound, formula), candidates))
}

fn real_elimination(
    terms: &mut TermStore,
    x: TermId,
    up: &BoundedTerm,
    low: &BoundedTerm,
    (c1, s1): (&BigRational, &AffineTerm),
    (c2, s2): (&BigRational, &AffineTerm),
    combined: &AffineTerm,
) -> TermId {
    // x = -s1/c1 is the largest value F1 admits, x = s2/c2 the smallest for F2.
    let x_up = s1.scaled(&-c1.recip());
    let x_low = s2.scaled(&c2.recip());
    let up_exact = up.inner == terms.mk_affine_le0(&up.affine);
    let low_exact = low.inner == terms.mk_affine_le0(&low.affine);
    if up_exact {
        let value = terms.mk_affine(&x_up);
        return terms.substitute(low.inner, x, value);
    }
    if low_exact {
        let value = terms.mk_affine(&x_low);
        return terms.substitute(up.inner, x, value);
    }
    let mut strict = combined.clone();
    strict.add_constant(InfNumber::epsilon());
    let overlap = terms.mk_affine_le0(&strict);
    let value = terms.mk_affine(&x_up);
    let f1 = terms.substitute(up.inner, x, value);
    let f2 = terms.substitute(low.inner, x, value);
    let touching = terms.mk_and(vec![f1, f2]);
    terms.mk_or(vec![overlap, touching])
}

/// Number of integer values of `x` for which `c·x + s` lies in `[k, 0]`.
fn candidate_count(bound: &InfNumber, c: &BigRational) -> InterpolationResult<usize> {
    let count = ((bound.real.abs() + BigRational::one()) / c).ceil();
    count
        .to_integer()
        .to_usize()
        .ok_or_else(|| InterpolationError::Internal(format!("case split over {} values", count)))
}

fn integer_case_split(
    terms: &mut TermStore,
    x: TermId,
    up: &BoundedTerm,
    low: &BoundedTerm,
    (c1, s1): (&BigRational, &AffineTerm),
    (c2, s2): (&BigRational, &AffineTerm),
) -> InterpolationResult<(TermId, usize)> {
    let n_up = candidate_count(&up.bound, c1)?;
    let n_low = candidate_count(&low.bound, c2)?;
    // Enumerate from the side with the narrower window: upwards from the
    // least x with -c2·x + s2 ≤ 0, or downwards from the greatest x with
    // c1·x + s1 ≤ 0.
    let (base, count, step) = if n_low <= n_up {
        let mut numer = s2.clone();
        numer.add_constant(InfNumber::from_rational(c2 - BigRational::one()));
        (floor_div_term(terms, &numer, c2), n_low, 1i64)
    } else {
        (floor_div_term(terms, &s1.scaled(&-BigRational::one()), c1), n_up, -1i64)
    };
    let mut disjuncts = Vec::with_capacity(count);
    for i in 0..count {
        let offset = step * i as i64;
        let value = if offset == 0 {
            base
        } else {
            let k = terms.mk_int(BigInt::from(offset));
            terms.mk_add(vec![base, k])
        };
        let f1 = terms.substitute(up.inner, x, value);
        let f2 = terms.substitute(low.inner, x, value);
        disjuncts.push(terms.mk_and(vec![f1, f2]));
    }
    Ok((terms.mk_or(disjuncts), count))
}

/// `⌊numer / c⌋` as an integer term.
fn floor_div_term(terms: &mut TermStore, numer: &AffineTerm, c: &BigRational) -> TermId {
    let t = terms.mk_affine(numer);
    let divisor = c.to_integer();
    if divisor.is_one() {
        t
    } else {
        terms.mk_intdiv(t, divisor)
    }
}
