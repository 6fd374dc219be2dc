//! tinterp Core - Terms, sorts and affine arithmetic
//!
//! This crate is the term-side collaborator of the interpolation engine:
//! - Hash-consed term DAG with boolean and arithmetic smart constructors
//! - Sort system
//! - Affine terms with infinitesimal constants for strict bounds
//! - The bounded-affine-term wrapper used while mixed inequalities are open

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod affine;
pub mod sort;
pub mod term;

pub use affine::{AffineTerm, InfNumber};
pub use sort::Sort;
pub use term::{BoundedTerm, Constant, Symbol, TermData, TermId, TermStore};
