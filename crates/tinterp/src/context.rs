//! Per-session state shared by the leaf interpolators and the combinator

use crate::error::{InterpolationError, InterpolationResult};
use crate::occurrence::{Coloring, Locality};
use crate::partition::PartitionTree;
use rustc_hash::{FxHashMap, FxHashSet};
use tinterp_core::{AffineTerm, Sort, TermId, TermStore};
use tinterp_proof::{LitShape, Literal, ProofDag};

/// Terms, proof, coloring and auxiliary variables of one session.
pub(crate) struct Context<'a> {
    pub terms: &'a mut TermStore,
    pub dag: &'a ProofDag,
    pub tree: PartitionTree,
    pub coloring: Coloring,
    aux_vars: FxHashMap<TermId, TermId>,
    aux_set: FxHashSet<TermId>,
}

impl<'a> Context<'a> {
    pub fn new(
        terms: &'a mut TermStore,
        dag: &'a ProofDag,
        tree: PartitionTree,
        coloring: Coloring,
    ) -> Self {
        Self {
            terms,
            dag,
            tree,
            coloring,
            aux_vars: FxHashMap::default(),
            aux_set: FxHashSet::default(),
        }
    }

    /// Number of interpolated partitions.
    pub fn n(&self) -> usize {
        self.tree.num_interpolants()
    }

    /// Shape of a literal's atom.
    pub fn shape(&self, lit: Literal) -> InterpolationResult<&'a LitShape> {
        let dag: &'a ProofDag = self.dag;
        dag.shape(lit.atom).ok_or_else(|| {
            InterpolationError::MalformedProof(format!(
                "unregistered atom {}",
                self.terms.to_smtlib(lit.atom)
            ))
        })
    }

    /// A literal in SMT-LIB syntax.
    pub fn render(&self, lit: Literal) -> String {
        let atom = self.terms.to_smtlib(lit.atom);
        if lit.positive {
            atom
        } else {
            format!("(not {})", atom)
        }
    }

    pub fn unsupported(&self, lit: Literal) -> InterpolationError {
        InterpolationError::UnsupportedMixedLiteral(self.render(lit))
    }

    /// Locality of a term at partition `p`.
    pub fn locality(&mut self, t: TermId, p: usize) -> Locality {
        self.coloring.locality(self.terms, t, p)
    }

    /// The auxiliary variable of a mixed atom, created on first use.
    pub fn aux_var(&mut self, lit: Literal) -> InterpolationResult<TermId> {
        if let Some(&x) = self.aux_vars.get(&lit.atom) {
            return Ok(x);
        }
        let sort = match self.shape(lit)? {
            LitShape::CcEquality { lhs, .. } => self.terms.sort(*lhs).clone(),
            LitShape::LaEquality { affine } | LitShape::Bound { affine, .. } => {
                if affine.has_int_sort(self.terms) {
                    Sort::Int
                } else {
                    Sort::Real
                }
            }
            LitShape::Boolean => return Err(self.unsupported(lit)),
        };
        let x = self.terms.mk_fresh_var("@aux", sort);
        self.aux_vars.insert(lit.atom, x);
        self.aux_set.insert(x);
        Ok(x)
    }

    /// Auxiliary variables created so far.
    pub fn aux_vars(&self) -> impl Iterator<Item = TermId> + '_ {
        self.aux_set.iter().copied()
    }

    /// The part of `affine` made of atoms that are A-local at `p`.
    pub fn a_part(&mut self, affine: &AffineTerm, p: usize) -> AffineTerm {
        let mut result = AffineTerm::new();
        for (atom, coeff) in affine.atoms() {
            if self.locality(atom, p) == Locality::ALocal {
                result.add_atom(atom, coeff.clone());
            }
        }
        result
    }

    /// The side of a mixed equality that is A-local at `p`.
    pub fn a_side_term(&mut self, lit: Literal, p: usize) -> InterpolationResult<TermId> {
        match self.shape(lit)? {
            LitShape::CcEquality { lhs, rhs } => {
                if self.locality(*lhs, p) == Locality::ALocal {
                    Ok(*lhs)
                } else if self.locality(*rhs, p) == Locality::ALocal {
                    Ok(*rhs)
                } else {
                    Err(self.unsupported(lit))
                }
            }
            LitShape::LaEquality { affine } => {
                let part = self.a_part(affine, p);
                Ok(self.terms.mk_affine(&part))
            }
            _ => Err(self.unsupported(lit)),
        }
    }
}
