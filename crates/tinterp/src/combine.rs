//! Combination of partial interpolants at resolution steps
//!
//! With `pivot` as it occurs in the antecedent clause and its negation in
//! the clause derived so far, the interpolant at partition `p` is
//!
//! - `I_prim ∨ I_ante` for an A-local pivot,
//! - `I_prim ∧ I_ante` for a B-local pivot,
//! - `ite(pivot, I_prim, I_ante)` for a shared pivot,
//!
//! and the elimination of the pivot's auxiliary variable for a mixed one.

use crate::context::Context;
use crate::engine::InterpolationStats;
use crate::error::{InterpolationError, InterpolationResult};
use crate::mixed::{eliminate_equality, eliminate_inequality};
use crate::occurrence::Locality;
use tinterp_core::TermId;
use tinterp_proof::{LitShape, Literal};
use tracing::trace;

/// Resolve the interpolants of the derived clause (`primary`) and of an
/// antecedent (`ante`) on `pivot`.
pub(crate) fn combine(
    ctx: &mut Context<'_>,
    primary: &[TermId],
    ante: &[TermId],
    pivot: Literal,
    stats: &mut InterpolationStats,
) -> InterpolationResult<Vec<TermId>> {
    if primary.len() != ctx.n() || ante.len() != ctx.n() {
        return Err(InterpolationError::Internal(format!(
            "combining {} and {} interpolants over {} partitions",
            primary.len(),
            ante.len(),
            ctx.n()
        )));
    }
    stats.resolution_steps += 1;
    let mut result = Vec::with_capacity(ctx.n());
    for p in 0..ctx.n() {
        let (i_prim, i_ante) = (primary[p], ante[p]);
        let interpolant = match ctx.locality(pivot.atom, p) {
            Locality::ALocal => ctx.terms.mk_or(vec![i_prim, i_ante]),
            Locality::BLocal => ctx.terms.mk_and(vec![i_prim, i_ante]),
            Locality::Shared => {
                let cond = pivot.to_term(ctx.terms);
                ctx.terms.mk_ite(cond, i_prim, i_ante)
            }
            Locality::Mixed => {
                stats.mixed_eliminations += 1;
                mixed_pivot(ctx, i_prim, i_ante, pivot, stats)?
            }
        };
        result.push(interpolant);
    }
    trace!(pivot = %pivot, "combined interpolants");
    Ok(result)
}

fn mixed_pivot(
    ctx: &mut Context<'_>,
    i_prim: TermId,
    i_ante: TermId,
    pivot: Literal,
    stats: &mut InterpolationStats,
) -> InterpolationResult<TermId> {
    let x = ctx.aux_var(pivot)?;
    // the antecedent holds the atom with the pivot's polarity
    let (with_atom, with_negation) = if pivot.positive {
        (i_ante, i_prim)
    } else {
        (i_prim, i_ante)
    };
    match ctx.shape(pivot)? {
        LitShape::CcEquality { .. } | LitShape::LaEquality { .. } => Ok(eliminate_equality(
            ctx.terms,
            x,
            with_atom,
            with_negation,
        )),
        LitShape::Bound { .. } => {
            let (combined, candidates) =
                eliminate_inequality(ctx.terms, x, with_atom, with_negation)?;
            stats.case_split_candidates += candidates;
            Ok(combined)
        }
        LitShape::Boolean => Err(ctx.unsupported(pivot)),
    }
}
