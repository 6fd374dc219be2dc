//! Tree and Craig interpolation from resolution refutations
//!
//! Given a refutation whose leaves are input clauses and theory lemmas
//! (congruence closure, linear arithmetic), and a tree of named
//! partitions, [`Interpolator`] computes one interpolant per non-root
//! partition. The interpolant of partition `p` is implied by the input
//! clauses in the subtree of `p`, is inconsistent with the remaining clauses,
//! and mentions only symbols shared between the two.
//!
//! Literals whose symbols straddle a partition boundary ("mixed" literals)
//! are handled with auxiliary variables that are eliminated when the
//! literal is resolved on.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod cc;
pub mod check;
mod combine;
pub mod config;
mod context;
pub mod engine;
pub mod error;
pub mod interpolant;
mod la;
mod leaf;
mod mixed;
pub mod occurrence;
pub mod partition;

pub use check::{ReferenceSolver, SatResult};
pub use config::InterpolationConfig;
pub use engine::{InterpolationStats, Interpolator};
pub use error::{InterpolationError, InterpolationResult};
pub use interpolant::{unfold_bounded, Interpolant};
pub use occurrence::{Coloring, Locality, Occurrence};
pub use partition::{PartitionSpec, PartitionTree};
