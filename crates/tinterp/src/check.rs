//! Soundness self-check of computed interpolants
//!
//! For every partition `p` below the root, the interpolants of the
//! children together with the input clauses of `p` must entail `I_p`, and
//! `I_p` may only mention symbols shared at `p`. At the root the children's
//! interpolants and the root's clauses must be inconsistent.

use crate::context::Context;
use crate::error::{InterpolationError, InterpolationResult};
use rustc_hash::FxHashSet;
use tinterp_core::{TermData, TermId, TermStore};
use tracing::{debug, warn};

/// Outcome of a satisfiability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatResult {
    /// The asserted formulas have a model
    Sat,
    /// The asserted formulas are inconsistent
    Unsat,
    /// The solver gave up
    Unknown,
}

/// An incremental solver used to validate interpolants.
pub trait ReferenceSolver {
    /// Open an assertion scope.
    fn push(&mut self);
    /// Drop the innermost assertion scope.
    fn pop(&mut self);
    /// Assert a boolean term.
    fn assert_term(&mut self, terms: &TermStore, t: TermId);
    /// Check the current assertions.
    fn check_sat(&mut self) -> SatResult;
}

/// Validate `interpolants` (one per non-root partition).
pub(crate) fn self_check(
    ctx: &mut Context<'_>,
    interpolants: &[TermId],
    solver: &mut dyn ReferenceSolver,
) -> InterpolationResult<()> {
    let n = ctx.n();
    let aux_names: FxHashSet<String> = ctx
        .aux_vars()
        .filter_map(|x| match ctx.terms.get(x) {
            TermData::Var(name, _) => Some(name.clone()),
            _ => None,
        })
        .collect();

    for p in 0..=n {
        if p < n {
            check_symbols(ctx, interpolants[p], p, &aux_names)?;
        }
        solver.push();
        for child in ctx.tree.children(p) {
            solver.assert_term(ctx.terms, interpolants[child]);
        }
        for &hyp in ctx.coloring.hypotheses(p) {
            solver.assert_term(ctx.terms, hyp);
        }
        if p < n {
            let negated = ctx.terms.mk_not(interpolants[p]);
            solver.assert_term(ctx.terms, negated);
        }
        let outcome = solver.check_sat();
        solver.pop();
        debug!(partition = p, ?outcome, "self-check");
        match outcome {
            SatResult::Unsat => {}
            SatResult::Sat => {
                return Err(InterpolationError::SelfCheckFailed {
                    partition: p,
                    reason: if p < n {
                        "interpolant is not implied".into()
                    } else {
                        "root partition is consistent with its children".into()
                    },
                })
            }
            SatResult::Unknown => warn!(partition = p, "self-check inconclusive"),
        }
    }
    Ok(())
}

fn check_symbols(
    ctx: &Context<'_>,
    interpolant: TermId,
    p: usize,
    aux_names: &FxHashSet<String>,
) -> InterpolationResult<()> {
    for name in ctx.terms.symbols(interpolant) {
        if aux_names.contains(&name) {
            return Err(InterpolationError::SelfCheckFailed {
                partition: p,
                reason: format!("auxiliary variable {} was not eliminated", name),
            });
        }
        if !ctx.coloring.is_shared_symbol(&name, p) {
            return Err(InterpolationError::SelfCheckFailed {
                partition: p,
                reason: format!("symbol {} is not shared", name),
            });
        }
    }
    Ok(())
}
