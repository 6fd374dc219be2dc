//! Congruence-closure lemma interpolation
//!
//! The justification path of a CC lemma is cut into maximal runs of steps
//! justified on the same side. If the goal disequality is on the B side the
//! interpolant is the conjunction of the equalities summarizing the A-runs;
//! if it is on the A side, the disjunction of the negated B-run summaries.
//! A mixed step is split at the auxiliary variable of its equality, a
//! congruence step with mixed arguments at the application to their
//! auxiliary variables, and a mixed goal yields an `AuxEq` for the run
//! touching the goal's A-local end.

use crate::context::Context;
use crate::error::{InterpolationError, InterpolationResult};
use crate::occurrence::Locality;
use tinterp_core::{TermData, TermId};
use tinterp_proof::{CcLemma, CcStep, Literal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    A,
    B,
}

#[derive(Debug)]
struct Segment {
    from: TermId,
    to: TermId,
    side: Side,
}

/// Path segments at one partition plus the argument equalities justified on
/// the side opposite to the segment they belong to.
struct SplitPath {
    segments: Vec<Segment>,
    side_atoms: Vec<TermId>,
}

fn side_of(loc: Locality) -> Side {
    if loc == Locality::ALocal {
        Side::A
    } else {
        Side::B
    }
}

fn split_path(
    ctx: &mut Context<'_>,
    lemma: &CcLemma,
    p: usize,
    mode: Side,
) -> InterpolationResult<SplitPath> {
    let mut segments = Vec::with_capacity(lemma.steps.len());
    let mut side_atoms = Vec::new();
    for (i, step) in lemma.steps.iter().enumerate() {
        let (from, to) = (lemma.path[i], lemma.path[i + 1]);
        match step {
            CcStep::Equality(eq) => match ctx.locality(eq.atom, p) {
                Locality::Mixed => {
                    let x = ctx.aux_var(*eq)?;
                    let (first, second) = if ctx.locality(from, p) == Locality::ALocal {
                        (Side::A, Side::B)
                    } else if ctx.locality(to, p) == Locality::ALocal {
                        (Side::B, Side::A)
                    } else {
                        return Err(ctx.unsupported(*eq));
                    };
                    segments.push(Segment {
                        from,
                        to: x,
                        side: first,
                    });
                    segments.push(Segment {
                        from: x,
                        to,
                        side: second,
                    });
                }
                loc => segments.push(Segment {
                    from,
                    to,
                    side: side_of(loc),
                }),
            },
            CcStep::Congruence { args } => {
                let mut sides = Vec::with_capacity(args.len());
                let mut mixed = false;
                for arg in args {
                    match ctx.locality(arg.atom, p) {
                        Locality::Mixed => mixed = true,
                        loc => sides.push((arg.atom, side_of(loc))),
                    }
                }
                if mixed {
                    split_congruence(ctx, args, from, to, p, &mut segments)?;
                    continue;
                }
                let side = if !sides.is_empty() && sides.iter().all(|(_, s)| *s == Side::A) {
                    Side::A
                } else if !sides.is_empty() && sides.iter().all(|(_, s)| *s == Side::B) {
                    Side::B
                } else {
                    mode
                };
                side_atoms.extend(sides.iter().filter(|(_, s)| *s != side).map(|(a, _)| *a));
                segments.push(Segment { from, to, side });
            }
        }
    }
    Ok(SplitPath {
        segments,
        side_atoms,
    })
}

/// Split a congruence step `f(ā) = f(b̄)` with mixed argument equalities at
/// `f(m̄)`. A mixed argument becomes its auxiliary variable; any other
/// argument is converted on its own side, so both halves are single-sided.
fn split_congruence(
    ctx: &mut Context<'_>,
    args: &[Literal],
    from: TermId,
    to: TermId,
    p: usize,
    segments: &mut Vec<Segment>,
) -> InterpolationResult<()> {
    let (name, from_args) = match ctx.terms.get(from).clone() {
        TermData::App(sym, xs) => (sym.name().to_string(), xs),
        _ => return Err(malformed_congruence(ctx, from, to)),
    };
    let to_args = match ctx.terms.get(to).clone() {
        TermData::App(sym, xs) if sym.name() == name && xs.len() == from_args.len() => xs,
        _ => return Err(malformed_congruence(ctx, from, to)),
    };

    let mut first: Option<Side> = None;
    let mut pairs = Vec::with_capacity(from_args.len());
    for (&u, &v) in from_args.iter().zip(&to_args) {
        if u == v {
            pairs.push((u, v, None));
            continue;
        }
        let atom = ctx.terms.mk_eq(u, v);
        let Some(&lit) = args.iter().find(|l| l.atom == atom) else {
            return Err(malformed_congruence(ctx, from, to));
        };
        let loc = ctx.locality(atom, p);
        if loc == Locality::Mixed {
            let lead = if ctx.locality(u, p) == Locality::ALocal {
                Side::A
            } else if ctx.locality(v, p) == Locality::ALocal {
                Side::B
            } else {
                return Err(ctx.unsupported(lit));
            };
            if first.is_some_and(|s| s != lead) {
                return Err(ctx.unsupported(lit));
            }
            first = Some(lead);
        }
        pairs.push((u, v, Some((lit, loc))));
    }
    let Some(first) = first else {
        return Err(InterpolationError::Internal(
            "congruence split without a mixed argument".into(),
        ));
    };
    let second = if first == Side::A { Side::B } else { Side::A };

    let mut mid_args = Vec::with_capacity(pairs.len());
    for (u, v, justification) in pairs {
        let m = match justification {
            None => u,
            Some((lit, Locality::Mixed)) => ctx.aux_var(lit)?,
            Some((_, loc)) if side_of(loc) == first => v,
            Some(_) => u,
        };
        mid_args.push(m);
    }
    let sort = ctx.terms.sort(from).clone();
    let mid = ctx.terms.mk_app(name, mid_args, sort);
    segments.push(Segment {
        from,
        to: mid,
        side: first,
    });
    segments.push(Segment {
        from: mid,
        to,
        side: second,
    });
    Ok(())
}

fn malformed_congruence(ctx: &Context<'_>, from: TermId, to: TermId) -> InterpolationError {
    InterpolationError::MalformedProof(format!(
        "congruence step between {} and {}",
        ctx.terms.to_smtlib(from),
        ctx.terms.to_smtlib(to)
    ))
}

/// Maximal runs of segments on `side`, as `(start, end)` terms.
fn runs(segments: &[Segment], side: Side) -> Vec<(TermId, TermId)> {
    let mut result: Vec<(TermId, TermId)> = Vec::new();
    let mut open = false;
    for seg in segments {
        if seg.side == side {
            match result.last_mut() {
                Some(run) if open => run.1 = seg.to,
                _ => result.push((seg.from, seg.to)),
            }
            open = true;
        } else {
            open = false;
        }
    }
    result
}

/// Interpolate a CC lemma.
pub(crate) fn interpolate_cc(
    ctx: &mut Context<'_>,
    lemma: &CcLemma,
) -> InterpolationResult<Vec<TermId>> {
    let (Some(&first), Some(&last)) = (lemma.path.first(), lemma.path.last()) else {
        return Err(InterpolationError::MalformedProof("empty congruence path".into()));
    };
    let mut result = Vec::with_capacity(ctx.n());
    for p in 0..ctx.n() {
        let goal_loc = ctx.locality(lemma.goal.atom, p);
        let interpolant = match goal_loc {
            Locality::ALocal => {
                let split = split_path(ctx, lemma, p, Side::A)?;
                let mut disjuncts = Vec::new();
                for (s, t) in runs(&split.segments, Side::B) {
                    let eq = ctx.terms.mk_eq(s, t);
                    disjuncts.push(ctx.terms.mk_not(eq));
                }
                for atom in split.side_atoms {
                    disjuncts.push(ctx.terms.mk_not(atom));
                }
                ctx.terms.mk_or(disjuncts)
            }
            Locality::BLocal | Locality::Shared => {
                let split = split_path(ctx, lemma, p, Side::B)?;
                let mut conjuncts = split.side_atoms;
                for (s, t) in runs(&split.segments, Side::A) {
                    conjuncts.push(ctx.terms.mk_eq(s, t));
                }
                ctx.terms.mk_and(conjuncts)
            }
            Locality::Mixed => mixed_goal(ctx, lemma, p, first, last)?,
        };
        result.push(interpolant);
    }
    Ok(result)
}

fn mixed_goal(
    ctx: &mut Context<'_>,
    lemma: &CcLemma,
    p: usize,
    first: TermId,
    last: TermId,
) -> InterpolationResult<TermId> {
    let goal: Literal = lemma.goal;
    let x = ctx.aux_var(goal)?;
    let split = split_path(ctx, lemma, p, Side::B)?;
    let a_runs = runs(&split.segments, Side::A);
    let starts_in_a = split.segments.first().is_some_and(|s| s.side == Side::A);
    let ends_in_a = split.segments.last().is_some_and(|s| s.side == Side::A);

    let (anchor, rest): (TermId, Vec<(TermId, TermId)>) =
        if ctx.locality(first, p) == Locality::ALocal {
            if starts_in_a {
                (a_runs[0].1, a_runs[1..].to_vec())
            } else {
                (first, a_runs)
            }
        } else if ctx.locality(last, p) == Locality::ALocal {
            if ends_in_a {
                let n = a_runs.len();
                (a_runs[n - 1].0, a_runs[..n - 1].to_vec())
            } else {
                (last, a_runs)
            }
        } else {
            return Err(ctx.unsupported(goal));
        };

    let mut conjuncts = split.side_atoms;
    conjuncts.push(ctx.terms.mk_aux_eq(x, anchor));
    for (s, t) in rest {
        conjuncts.push(ctx.terms.mk_eq(s, t));
    }
    Ok(ctx.terms.mk_and(conjuncts))
}
