//! Leaf interpolation
//!
//! Input clauses get the tree-interpolant leaf rule; theory lemmas are
//! delegated to the CC and LA interpolators.

use crate::cc::interpolate_cc;
use crate::context::Context;
use crate::error::{InterpolationError, InterpolationResult};
use crate::la::{interpolate_farkas, interpolate_trichotomy};
use crate::occurrence::Locality;
use tinterp_core::TermId;
use tinterp_proof::{Clause, Leaf, Literal};
use tracing::trace;

/// Per-partition interpolants of a leaf.
pub(crate) fn interpolate_leaf(
    ctx: &mut Context<'_>,
    leaf: &Leaf,
) -> InterpolationResult<Vec<TermId>> {
    trace!(kind = leaf.kind(), "interpolating leaf");
    match leaf {
        Leaf::Asserted { source, .. } | Leaf::Clause { source, .. } => {
            let q = ctx
                .tree
                .partition_of(source)
                .ok_or_else(|| InterpolationError::UnknownSource(source.clone()))?;
            Ok((0..ctx.n())
                .map(|p| ctx.terms.mk_bool(!ctx.tree.in_subtree(p, q)))
                .collect())
        }
        Leaf::Tautology { clause } => tautology(ctx, clause),
        Leaf::Rewrite { equality } => rewrite(ctx, *equality),
        Leaf::CcLemma(lemma) => interpolate_cc(ctx, lemma),
        Leaf::LaLemma(lemma) => interpolate_farkas(ctx, lemma),
        Leaf::Trichotomy(lemma) => interpolate_trichotomy(ctx, lemma),
        Leaf::Opaque { rule, .. } => Err(InterpolationError::UnsupportedLeaf(rule.clone())),
    }
}

fn tautology(ctx: &mut Context<'_>, clause: &Clause) -> InterpolationResult<Vec<TermId>> {
    let complementary = clause
        .iter()
        .find(|lit| clause.contains(&lit.negate()))
        .ok_or_else(|| {
            InterpolationError::MalformedProof("tautology without a complementary pair".into())
        })?;
    let mut result = Vec::with_capacity(ctx.n());
    for p in 0..ctx.n() {
        let interpolant = match ctx.locality(complementary.atom, p) {
            Locality::BLocal => ctx.terms.true_term(),
            Locality::ALocal | Locality::Shared => ctx.terms.false_term(),
            Locality::Mixed => {
                return Err(ctx.unsupported(*complementary))
            }
        };
        result.push(interpolant);
    }
    Ok(result)
}

fn rewrite(ctx: &mut Context<'_>, equality: Literal) -> InterpolationResult<Vec<TermId>> {
    let mut result = Vec::with_capacity(ctx.n());
    for p in 0..ctx.n() {
        let interpolant = match ctx.locality(equality.atom, p) {
            Locality::BLocal => ctx.terms.true_term(),
            Locality::ALocal | Locality::Shared => ctx.terms.false_term(),
            Locality::Mixed => {
                let x = ctx.aux_var(equality)?;
                let s = ctx.a_side_term(equality, p)?;
                ctx.terms.mk_aux_eq(x, s)
            }
        };
        result.push(interpolant);
    }
    Ok(result)
}
