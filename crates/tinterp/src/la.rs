//! Linear-arithmetic lemma interpolation
//!
//! A Farkas lemma is split per partition: the A-local literals (and the
//! A-parts of mixed literals) are summed with their coefficients. The sum is
//! what the A side proves to be `≤ 0`, while the B side proves it positive.

use crate::context::Context;
use crate::error::{InterpolationError, InterpolationResult};
use crate::occurrence::Locality;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use tinterp_core::{AffineTerm, InfNumber, TermId};
use tinterp_proof::{LaLemma, LitShape, Literal, TrichotomyLemma};
use tracing::trace;

/// The constraint `g ≤ 0` contributed by the negation of `lit` scaled by
/// `coeff`.
fn conflict_constraint(
    ctx: &Context<'_>,
    lit: Literal,
    coeff: &BigRational,
) -> InterpolationResult<AffineTerm> {
    let malformed = || {
        InterpolationError::MalformedProof(format!(
            "coefficient {} does not fit literal {}",
            coeff, lit
        ))
    };
    match ctx.shape(lit)? {
        LitShape::Bound { affine, epsilon } => {
            if lit.positive && coeff.is_negative() {
                let mut g = affine.scaled(coeff);
                g.add_constant(epsilon.mul_rational(&coeff.abs()));
                Ok(g)
            } else if !lit.positive && coeff.is_positive() {
                Ok(affine.scaled(coeff))
            } else {
                Err(malformed())
            }
        }
        LitShape::LaEquality { affine } if !lit.positive => Ok(affine.scaled(coeff)),
        _ => Err(malformed()),
    }
}

/// Add the contribution of a literal at partition `p` to `sum`.
///
/// Returns true if the literal is mixed, i.e. `sum` now mentions its
/// auxiliary variable.
fn add_contribution(
    ctx: &mut Context<'_>,
    sum: &mut AffineTerm,
    lit: Literal,
    coeff: &BigRational,
    constraint: &AffineTerm,
    p: usize,
) -> InterpolationResult<bool> {
    match ctx.locality(lit.atom, p) {
        Locality::ALocal => {
            sum.add_scaled(constraint, &BigRational::one());
            Ok(false)
        }
        Locality::Mixed => {
            let affine = ctx
                .shape(lit)?
                .affine()
                .ok_or_else(|| ctx.unsupported(lit))?;
            let a_part = ctx.a_part(affine, p);
            let x = ctx.aux_var(lit)?;
            sum.add_scaled(&a_part, coeff);
            sum.add_atom(x, -coeff.clone());
            Ok(true)
        }
        Locality::BLocal | Locality::Shared => Ok(false),
    }
}

/// `sum ≤ 0`, wrapped when it still mentions auxiliary variables.
fn finish(ctx: &mut Context<'_>, mut sum: AffineTerm, has_aux: bool) -> TermId {
    let integral = sum.has_int_sort(ctx.terms);
    sum.normalize(integral);
    let atom = ctx.terms.mk_affine_le0(&sum);
    if has_aux {
        let bound = interval_bound(integral);
        ctx.terms.mk_bounded(sum, bound, atom)
    } else {
        atom
    }
}

/// Width of the window of a fresh wrapper: one unit over the integers, one
/// infinitesimal over the reals.
pub(crate) fn interval_bound(integral: bool) -> InfNumber {
    if integral {
        InfNumber::from_int(-1)
    } else {
        -InfNumber::epsilon()
    }
}

/// Interpolate a Farkas lemma.
pub(crate) fn interpolate_farkas(
    ctx: &mut Context<'_>,
    lemma: &LaLemma,
) -> InterpolationResult<Vec<TermId>> {
    let mut constraints = Vec::with_capacity(lemma.literals.len());
    let mut total = AffineTerm::new();
    for (lit, coeff) in &lemma.literals {
        if coeff.is_zero() {
            continue;
        }
        let g = conflict_constraint(ctx, *lit, coeff)?;
        total.add_scaled(&g, &BigRational::one());
        constraints.push((*lit, coeff.clone(), g));
    }
    if !total.is_constant() || total.constant().signum() <= 0 {
        return Err(InterpolationError::MalformedProof(format!(
            "Farkas coefficients sum to {}",
            total
        )));
    }

    let mut result = Vec::with_capacity(ctx.n());
    for p in 0..ctx.n() {
        let mut sum = AffineTerm::new();
        let mut has_aux = false;
        for (lit, coeff, g) in &constraints {
            has_aux |= add_contribution(ctx, &mut sum, *lit, coeff, g, p)?;
        }
        trace!(partition = p, sum = %sum, has_aux, "la lemma");
        result.push(finish(ctx, sum, has_aux));
    }
    Ok(result)
}

/// Interpolate the trichotomy lemma `a < 0 ∨ a = 0 ∨ a > 0`.
///
/// Both inequalities take coefficient `-1`; their constraints `-a ≤ 0` and
/// `a ≤ 0` sum to zero, and the equality supplies the strictness.
pub(crate) fn interpolate_trichotomy(
    ctx: &mut Context<'_>,
    lemma: &TrichotomyLemma,
) -> InterpolationResult<Vec<TermId>> {
    let minus_one = -BigRational::one();
    let ineqs = [lemma.less, lemma.greater];
    let mut constraints = Vec::with_capacity(2);
    for lit in ineqs {
        let g = conflict_constraint(ctx, lit, &minus_one)?;
        constraints.push((lit, g));
    }

    let mut result = Vec::with_capacity(ctx.n());
    for p in 0..ctx.n() {
        let mut sum = AffineTerm::new();
        let mut has_aux = false;
        let mut a_local_ineqs = 0;
        for (lit, g) in &constraints {
            if ctx.locality(lit.atom, p) == Locality::ALocal {
                a_local_ineqs += 1;
            }
            has_aux |= add_contribution(ctx, &mut sum, *lit, &minus_one, g, p)?;
        }
        let interpolant = match ctx.locality(lemma.equal.atom, p) {
            Locality::ALocal => {
                if a_local_ineqs == 0 && !has_aux && sum.is_constant() {
                    ctx.terms.mk_not(lemma.equal.atom)
                } else {
                    sum.add_constant(InfNumber::epsilon());
                    finish(ctx, sum, has_aux)
                }
            }
            Locality::Mixed => {
                let x = ctx.aux_var(lemma.equal)?;
                let anchor = equality_anchor(ctx, lemma, p)?;
                let integral = sum.has_int_sort(ctx.terms);
                sum.normalize(integral);
                let mut strict = sum.clone();
                strict.add_constant(InfNumber::epsilon());
                let below = ctx.terms.mk_affine_le0(&strict);
                let at = ctx.terms.mk_affine_le0(&sum);
                let eq = ctx.terms.mk_aux_eq(x, anchor);
                let on_edge = ctx.terms.mk_and(vec![at, eq]);
                let inner = ctx.terms.mk_or(vec![below, on_edge]);
                if has_aux {
                    ctx.terms.mk_bounded(sum, interval_bound(integral), inner)
                } else {
                    inner
                }
            }
            Locality::BLocal | Locality::Shared => {
                if a_local_ineqs == constraints.len() && sum.is_constant() {
                    lemma.equal.atom
                } else {
                    finish(ctx, sum, has_aux)
                }
            }
        };
        trace!(partition = p, "trichotomy lemma");
        result.push(interpolant);
    }
    Ok(result)
}

/// The value of the equality's A-part when the sum of a mixed trichotomy
/// lemma is zero, in terms of the auxiliary variable of `less`.
///
/// The `less` constraint pins its variable to the A-part of `less`, and the
/// equality is a multiple of `less` over the same atoms.
fn equality_anchor(
    ctx: &mut Context<'_>,
    lemma: &TrichotomyLemma,
    p: usize,
) -> InterpolationResult<TermId> {
    let less = ctx
        .shape(lemma.less)?
        .affine()
        .ok_or_else(|| ctx.unsupported(lemma.less))?;
    let equal = ctx
        .shape(lemma.equal)?
        .affine()
        .ok_or_else(|| ctx.unsupported(lemma.equal))?;
    if ctx.locality(lemma.less.atom, p) != Locality::Mixed {
        return Err(ctx.unsupported(lemma.equal));
    }
    let less_part = ctx.a_part(less, p);
    let equal_part = ctx.a_part(equal, p);
    let ratio = less_part
        .atoms()
        .next()
        .map(|(atom, coeff)| equal_part.coeff(atom) / coeff)
        .filter(|r| !r.is_zero())
        .ok_or_else(|| ctx.unsupported(lemma.equal))?;
    let x = ctx.aux_var(lemma.less)?;
    let anchor = AffineTerm::atom(x).scaled(&ratio);
    Ok(ctx.terms.mk_affine(&anchor))
}
