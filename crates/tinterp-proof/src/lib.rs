//! Resolution proofs for tinterp
//!
//! Refutations are stored as an arena DAG of [`ProofNode`]s. Leaves are
//! input clauses or theory lemmas annotated with the data interpolation
//! needs (congruence paths, Farkas coefficients). Literal atoms are classified
//! into [`LitShape`]s when they enter the DAG.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod lemma;
pub mod literal;
pub mod proof;

pub use lemma::{CcLemma, CcStep, Clause, LaLemma, TrichotomyLemma};
pub use literal::{LitShape, Literal};
pub use proof::{Antecedent, Leaf, ProofDag, ProofError, ProofNode, ProofNodeId, Rewrite};
