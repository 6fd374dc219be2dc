//! Interpolant terms and bounded-affine-term wrappers
//!
//! A partial interpolant is a formula that may contain
//! `Bounded { affine: s, bound: k, inner: F }` subterms. Such a wrapper is
//! read as `s ≤ k ⇒ F ⇒ s ≤ 0` (with `k ≤ 0`): `F` agrees with `s ≤ 0`
//! except on the window `k < s ≤ 0`. Wrappers only occur while `s`
//! mentions an auxiliary variable of a mixed literal; once the variable is
//! eliminated the wrapper can be replaced by `F`.

use crate::error::{InterpolationError, InterpolationResult};
use tinterp_core::{BoundedTerm, TermData, TermId, TermStore};

/// A view of an interpolant term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpolant {
    /// A formula without a top-level wrapper
    Plain(TermId),
    /// A bounded-affine-term wrapper
    Bounded(BoundedTerm),
}

impl Interpolant {
    /// Inspect the top level of `t`.
    #[must_use]
    pub fn view(terms: &TermStore, t: TermId) -> Interpolant {
        match terms.get(t) {
            TermData::Bounded(b) => Interpolant::Bounded((**b).clone()),
            _ => Interpolant::Plain(t),
        }
    }

    /// Intern the interpolant as a term.
    pub fn into_term(self, terms: &mut TermStore) -> TermId {
        match self {
            Interpolant::Plain(t) => t,
            Interpolant::Bounded(b) => terms.mk_bounded(b.affine, b.bound, b.inner),
        }
    }
}

/// Replace every wrapper below `root` by its inner formula.
pub fn unfold_bounded(terms: &mut TermStore, root: TermId) -> TermId {
    let mut current = root;
    loop {
        let next = terms.rewrite(current, |store, t| match store.get(t) {
            TermData::Bounded(b) => Some(b.inner),
            _ => None,
        });
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Replace every wrapper below `root` whose affine term mentions `x`.
///
/// `replace` gets the wrapper and returns its replacement. Wrappers not
/// mentioning `x` are left alone; their inner formula is still searched.
pub fn map_wrappers<F>(
    terms: &mut TermStore,
    root: TermId,
    x: TermId,
    mut replace: F,
) -> InterpolationResult<TermId>
where
    F: FnMut(&mut TermStore, &BoundedTerm) -> InterpolationResult<TermId>,
{
    let mut failure: Option<InterpolationError> = None;
    let result = terms.rewrite(root, |store, t| {
        if failure.is_some() {
            return Some(t);
        }
        let TermData::Bounded(b) = store.get(t) else {
            return None;
        };
        if !b.affine.contains(x) {
            return None;
        }
        let wrapper = (**b).clone();
        match replace(store, &wrapper) {
            Ok(replacement) => Some(replacement),
            Err(err) => {
                failure = Some(err);
                Some(t)
            }
        }
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(result),
    }
}

/// Replace every `AuxEq(x, s)` below `root` by `build(s)`.
pub fn map_aux_eqs<F>(terms: &mut TermStore, root: TermId, x: TermId, mut build: F) -> TermId
where
    F: FnMut(&mut TermStore, TermId) -> TermId,
{
    terms.rewrite(root, |store, t| match store.get(t) {
        TermData::AuxEq(var, s) if *var == x => {
            let s = *s;
            Some(build(store, s))
        }
        _ => None,
    })
}
