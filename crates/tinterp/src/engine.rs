//! Interpolation session: proof traversal and post-processing
//!
//! The proof DAG is walked with an explicit work stack so deep resolution
//! chains do not exhaust the call stack. Every node is interpolated once;
//! repeated visits reuse the cached per-partition interpolants.

use crate::check::{self_check, ReferenceSolver};
use crate::combine::combine;
use crate::config::InterpolationConfig;
use crate::context::Context;
use crate::error::{InterpolationError, InterpolationResult};
use crate::interpolant::unfold_bounded;
use crate::leaf::interpolate_leaf;
use crate::occurrence::Coloring;
use crate::partition::{PartitionSpec, PartitionTree};
use rustc_hash::FxHashMap;
use tinterp_core::{TermData, TermId, TermStore};
use tinterp_proof::{Literal, ProofDag, ProofError, ProofNode, ProofNodeId};
use tracing::{debug, warn};

/// Counters of one interpolation session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterpolationStats {
    /// Proof nodes interpolated (cache hits excluded)
    pub nodes_visited: usize,
    /// Leaves among the visited nodes
    pub leaves: usize,
    /// Visits answered from the cache
    pub cache_hits: usize,
    /// Resolution and substitution steps combined
    pub resolution_steps: usize,
    /// Per-partition eliminations of auxiliary variables
    pub mixed_eliminations: usize,
    /// Integer candidates enumerated by case splits
    pub case_split_candidates: usize,
}

#[derive(Debug, Clone, Copy)]
enum Task {
    Visit(ProofNodeId),
    /// Pop the antecedent's and the derived clause's interpolants and
    /// resolve them on the pivot.
    Combine(Literal),
    /// The node's interpolants are on top of the result stack.
    Summarize(ProofNodeId),
}

/// A tree-interpolation session over one refutation.
///
/// ```ignore
/// let spec = PartitionSpec::binary("A", "B");
/// let mut interpolator = Interpolator::new(&mut terms, &dag, &spec, config)?;
/// let interpolants = interpolator.interpolate(root)?;
/// ```
pub struct Interpolator<'a> {
    terms: &'a mut TermStore,
    dag: &'a ProofDag,
    tree: PartitionTree,
    config: InterpolationConfig,
    terminate: Option<Box<dyn Fn() -> bool + 'a>>,
    solver: Option<&'a mut dyn ReferenceSolver>,
    stats: InterpolationStats,
    used: bool,
}

impl<'a> Interpolator<'a> {
    /// Create a session; fails if `spec` is not a valid partition tree.
    pub fn new(
        terms: &'a mut TermStore,
        dag: &'a ProofDag,
        spec: &PartitionSpec,
        config: InterpolationConfig,
    ) -> InterpolationResult<Self> {
        let tree = PartitionTree::new(spec)?;
        Ok(Self {
            terms,
            dag,
            tree,
            config,
            terminate: None,
            solver: None,
            stats: InterpolationStats::default(),
            used: false,
        })
    }

    /// Poll `terminate` during the traversal; returning true cancels.
    #[must_use]
    pub fn with_terminate(mut self, terminate: impl Fn() -> bool + 'a) -> Self {
        self.terminate = Some(Box::new(terminate));
        self
    }

    /// Solver used by the self-check.
    #[must_use]
    pub fn with_reference_solver(mut self, solver: &'a mut dyn ReferenceSolver) -> Self {
        self.solver = Some(solver);
        self
    }

    /// Counters of the last run.
    #[must_use]
    pub fn stats(&self) -> &InterpolationStats {
        &self.stats
    }

    /// Compute one interpolant per non-root partition from the refutation
    /// rooted at `root`.
    pub fn interpolate(&mut self, root: ProofNodeId) -> InterpolationResult<Vec<TermId>> {
        if self.used {
            return Err(InterpolationError::Internal(
                "interpolator sessions are single use".into(),
            ));
        }
        self.used = true;
        let clause = derived_clause(self.terms, self.dag, root)?;
        if !clause.is_empty() {
            let rendered: Vec<String> = clause.iter().map(|l| l.to_smtlib(self.terms)).collect();
            return Err(InterpolationError::MalformedProof(format!(
                "root {} derives ({}) instead of the empty clause",
                root,
                rendered.join(" ")
            )));
        }
        debug!(
            root = %root,
            nodes = self.dag.len(),
            partitions = self.tree.len(),
            "starting interpolation"
        );

        let coloring = Coloring::compute(self.terms, self.dag, &self.tree, root)?;
        let mut ctx = Context::new(&mut *self.terms, self.dag, self.tree.clone(), coloring);
        let mut walk = Walk {
            config: &self.config,
            terminate: self.terminate.as_deref(),
            stats: &mut self.stats,
            steps: 0,
        };
        let raw = walk.run(&mut ctx, root)?;

        let mut interpolants = Vec::with_capacity(raw.len());
        for t in raw {
            let unfolded = unfold_bounded(ctx.terms, t);
            if let Some(x) = ctx.aux_vars().find(|&x| ctx.terms.contains(unfolded, x)) {
                return Err(InterpolationError::Internal(format!(
                    "auxiliary variable {} survived elimination",
                    x
                )));
            }
            interpolants.push(if self.config.unfold_bounded { unfolded } else { t });
        }

        if self.config.self_check {
            match self.solver.as_deref_mut() {
                Some(solver) => {
                    let unfolded: Vec<TermId> = interpolants
                        .iter()
                        .map(|&t| unfold_bounded(ctx.terms, t))
                        .collect();
                    self_check(&mut ctx, &unfolded, solver)?;
                }
                None => warn!("self-check requested without a reference solver"),
            }
        }
        debug!(stats = ?self.stats, "finished interpolation");
        Ok(interpolants)
    }
}

/// The clause a proof node derives, computed bottom-up without recursion.
///
/// A substitution rewrites the literals of its primary clause with each
/// equality and adds the rest of the equality's justification.
fn derived_clause(
    terms: &mut TermStore,
    dag: &ProofDag,
    root: ProofNodeId,
) -> InterpolationResult<Vec<Literal>> {
    let mut clauses: FxHashMap<ProofNodeId, Vec<Literal>> = FxHashMap::default();
    let mut stack = vec![(root, false)];
    while let Some((id, expanded)) = stack.pop() {
        if clauses.contains_key(&id) {
            continue;
        }
        let node = dag.get(id).ok_or(ProofError::UnknownNode(id))?;
        if !expanded {
            stack.push((id, true));
            for child in node.premises() {
                if !clauses.contains_key(&child) {
                    stack.push((child, false));
                }
            }
            continue;
        }
        let clause = match node {
            ProofNode::Leaf(leaf) => leaf.clause().to_vec(),
            ProofNode::Resolution {
                primary,
                antecedents,
            } => {
                let mut clause = derived(&clauses, *primary)?.clone();
                for ante in antecedents {
                    clause.retain(|&l| l != ante.pivot.negate());
                    for &lit in derived(&clauses, ante.node)? {
                        if lit != ante.pivot && !clause.contains(&lit) {
                            clause.push(lit);
                        }
                    }
                }
                clause
            }
            ProofNode::Substitution { primary, rewrites } => {
                let mut clause = derived(&clauses, *primary)?.clone();
                for rw in rewrites {
                    let TermData::App(_, sides) = terms.get(rw.equality.atom) else {
                        return Err(InterpolationError::MalformedProof(format!(
                            "rewrite by {}",
                            rw.equality.to_smtlib(terms)
                        )));
                    };
                    let [lhs, rhs] = sides[..] else {
                        return Err(InterpolationError::MalformedProof(format!(
                            "rewrite by {}",
                            rw.equality.to_smtlib(terms)
                        )));
                    };
                    let mut rewritten = Vec::with_capacity(clause.len());
                    for lit in clause {
                        let atom = if terms.contains(lit.atom, lhs) {
                            terms.substitute(lit.atom, lhs, rhs)
                        } else if terms.contains(lit.atom, rhs) {
                            terms.substitute(lit.atom, rhs, lhs)
                        } else {
                            lit.atom
                        };
                        let falsified = if lit.positive {
                            terms.is_false(atom)
                        } else {
                            terms.is_true(atom)
                        };
                        let lit = Literal {
                            atom,
                            positive: lit.positive,
                        };
                        if !falsified && !rewritten.contains(&lit) {
                            rewritten.push(lit);
                        }
                    }
                    for &lit in derived(&clauses, rw.justification)? {
                        if lit != rw.equality && !rewritten.contains(&lit) {
                            rewritten.push(lit);
                        }
                    }
                    clause = rewritten;
                }
                clause
            }
        };
        clauses.insert(id, clause);
    }
    clauses
        .remove(&root)
        .ok_or_else(|| InterpolationError::Internal("root clause not derived".into()))
}

fn derived(
    clauses: &FxHashMap<ProofNodeId, Vec<Literal>>,
    id: ProofNodeId,
) -> InterpolationResult<&Vec<Literal>> {
    clauses
        .get(&id)
        .ok_or_else(|| InterpolationError::Internal(format!("clause of {} not derived", id)))
}

/// State of one traversal.
struct Walk<'s> {
    config: &'s InterpolationConfig,
    terminate: Option<&'s (dyn Fn() -> bool + 's)>,
    stats: &'s mut InterpolationStats,
    steps: usize,
}

impl Walk<'_> {
    fn poll(&mut self) -> InterpolationResult<()> {
        self.steps += 1;
        if self.steps % self.config.cancel_poll_interval.max(1) != 0 {
            return Ok(());
        }
        match self.terminate {
            Some(terminate) if terminate() => Err(InterpolationError::Cancelled),
            _ => Ok(()),
        }
    }

    fn run(
        &mut self,
        ctx: &mut Context<'_>,
        root: ProofNodeId,
    ) -> InterpolationResult<Vec<TermId>> {
        let dag = ctx.dag;
        let mut cache: FxHashMap<ProofNodeId, Vec<TermId>> = FxHashMap::default();
        let mut results: Vec<Vec<TermId>> = Vec::new();
        let mut tasks = vec![Task::Visit(root)];

        while let Some(task) = tasks.pop() {
            match task {
                Task::Visit(id) => {
                    self.poll()?;
                    if let Some(cached) = cache.get(&id) {
                        self.stats.cache_hits += 1;
                        results.push(cached.clone());
                        continue;
                    }
                    self.stats.nodes_visited += 1;
                    let node = dag.get(id).ok_or(ProofError::UnknownNode(id))?;
                    match node {
                        ProofNode::Leaf(leaf) => {
                            self.stats.leaves += 1;
                            let interpolants = interpolate_leaf(ctx, leaf)?;
                            cache.insert(id, interpolants.clone());
                            results.push(interpolants);
                        }
                        ProofNode::Resolution {
                            primary,
                            antecedents,
                        } => {
                            tasks.push(Task::Summarize(id));
                            for ante in antecedents.iter().rev() {
                                tasks.push(Task::Combine(ante.pivot));
                                tasks.push(Task::Visit(ante.node));
                            }
                            tasks.push(Task::Visit(*primary));
                        }
                        ProofNode::Substitution { primary, rewrites } => {
                            tasks.push(Task::Summarize(id));
                            for rw in rewrites.iter().rev() {
                                tasks.push(Task::Combine(rw.equality));
                                tasks.push(Task::Visit(rw.justification));
                            }
                            tasks.push(Task::Visit(*primary));
                        }
                    }
                }
                Task::Combine(pivot) => {
                    let (Some(ante), Some(primary)) = (results.pop(), results.pop()) else {
                        return Err(InterpolationError::Internal(
                            "result stack underflow".into(),
                        ));
                    };
                    results.push(combine(ctx, &primary, &ante, pivot, self.stats)?);
                }
                Task::Summarize(id) => {
                    self.poll()?;
                    let top = results.last().ok_or_else(|| {
                        InterpolationError::Internal("result stack underflow".into())
                    })?;
                    cache.insert(id, top.clone());
                }
            }
        }

        match (results.pop(), results.is_empty()) {
            (Some(result), true) => Ok(result),
            _ => Err(InterpolationError::Internal(
                "unbalanced result stack".into(),
            )),
        }
    }
}
