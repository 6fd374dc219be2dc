//! Hash-consed term DAG
//!
//! Every term is interned once in a [`TermStore`] and referred to by its
//! [`TermId`]. Structural equality therefore coincides with id equality,
//! which the interpolation engine relies on for its memo tables.
//!
//! Besides the usual SMT-LIB constructs the store knows two interpolation
//! specific nodes: [`TermData::AuxEq`], the marked equality between an
//! auxiliary variable and a term, and [`TermData::Bounded`], the
//! bounded-affine-term wrapper that carries an unresolved inequality.

use crate::affine::{AffineTerm, InfNumber};
use crate::sort::Sort;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

/// Conjunction
pub const OP_AND: &str = "and";
/// Disjunction
pub const OP_OR: &str = "or";
/// Equality
pub const OP_EQ: &str = "=";
/// Non-strict inequality `a <= b`
pub const OP_LE: &str = "<=";
/// Strict inequality `a < b`
pub const OP_LT: &str = "<";
/// N-ary addition
pub const OP_ADD: &str = "+";
/// Subtraction or unary minus
pub const OP_SUB: &str = "-";
/// Binary multiplication
pub const OP_MUL: &str = "*";
/// Integer division (floor division for positive divisors)
pub const OP_DIV: &str = "div";

/// Index of a term in a [`TermStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(pub u32);

impl TermId {
    /// Index into the store's arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A function symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// A plain named symbol
    Named(String),
}

impl Symbol {
    /// Create a named symbol.
    pub fn named(name: impl Into<String>) -> Self {
        Symbol::Named(name.into())
    }

    /// The symbol's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Symbol::Named(name) => name,
        }
    }

    /// True for the boolean connectives and arithmetic operators the store
    /// builds itself. Everything else is uninterpreted.
    #[must_use]
    pub fn is_interpreted(&self) -> bool {
        matches!(
            self.name(),
            OP_AND | OP_OR | OP_EQ | OP_LE | OP_LT | OP_ADD | OP_SUB | OP_MUL | OP_DIV
        )
    }
}

/// A constant value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    /// Boolean constant
    Bool(bool),
    /// Integer numeral
    Int(BigInt),
    /// Real numeral
    Rational(BigRational),
}

/// The bounded-affine-term wrapper.
///
/// Stands for the formula `inner` together with the guarantee
/// `affine ≤ bound ⇒ inner ⇒ affine ≤ 0`, where `bound ≤ 0`. The affine part
/// still mentions the auxiliary variable of a mixed inequality that has not
/// been resolved yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundedTerm {
    /// The affine term `s`
    pub affine: AffineTerm,
    /// The interval bound `k`
    pub bound: InfNumber,
    /// The formula `F`
    pub inner: TermId,
}

/// Structure of an interned term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermData {
    /// A constant
    Const(Constant),
    /// A free variable (constant symbol) with its sort
    Var(String, Sort),
    /// Negation
    Not(TermId),
    /// If-then-else
    Ite(TermId, TermId, TermId),
    /// Function application
    App(Symbol, Vec<TermId>),
    /// Marked equality `x = s` between an auxiliary variable and a term
    AuxEq(TermId, TermId),
    /// Bounded-affine-term wrapper
    Bounded(Box<BoundedTerm>),
}

/// Arena of hash-consed terms with their sorts.
pub struct TermStore {
    terms: Vec<TermData>,
    sorts: Vec<Sort>,
    index: FxHashMap<TermData, TermId>,
    fresh_counter: u32,
    true_term: TermId,
    false_term: TermId,
}

impl Default for TermStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TermStore {
    /// Create a store containing only `true` and `false`.
    #[must_use]
    pub fn new() -> Self {
        let mut store = TermStore {
            terms: Vec::new(),
            sorts: Vec::new(),
            index: FxHashMap::default(),
            fresh_counter: 0,
            true_term: TermId(0),
            false_term: TermId(0),
        };
        store.true_term = store.intern(TermData::Const(Constant::Bool(true)), Sort::Bool);
        store.false_term = store.intern(TermData::Const(Constant::Bool(false)), Sort::Bool);
        store
    }

    fn intern(&mut self, data: TermData, sort: Sort) -> TermId {
        if let Some(&id) = self.index.get(&data) {
            return id;
        }
        let id = TermId(self.terms.len() as u32);
        self.terms.push(data.clone());
        self.sorts.push(sort);
        self.index.insert(data, id);
        id
    }

    /// Number of interned terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if only the boolean constants are interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.len() <= 2
    }

    /// Structure of a term.
    #[must_use]
    pub fn get(&self, id: TermId) -> &TermData {
        &self.terms[id.index()]
    }

    /// Sort of a term.
    #[must_use]
    pub fn sort(&self, id: TermId) -> &Sort {
        &self.sorts[id.index()]
    }

    /// The term `true`.
    #[must_use]
    pub fn true_term(&self) -> TermId {
        self.true_term
    }

    /// The term `false`.
    #[must_use]
    pub fn false_term(&self) -> TermId {
        self.false_term
    }

    /// True if `id` is the constant `true`.
    #[must_use]
    pub fn is_true(&self, id: TermId) -> bool {
        id == self.true_term
    }

    /// True if `id` is the constant `false`.
    #[must_use]
    pub fn is_false(&self, id: TermId) -> bool {
        id == self.false_term
    }

    /// Value of a numeral, if `id` is one.
    #[must_use]
    pub fn numeral(&self, id: TermId) -> Option<BigRational> {
        match self.get(id) {
            TermData::Const(Constant::Int(n)) => Some(BigRational::from_integer(n.clone())),
            TermData::Const(Constant::Rational(r)) => Some(r.clone()),
            _ => None,
        }
    }

    /// True for constants (numerals and booleans).
    #[must_use]
    pub fn is_constant(&self, id: TermId) -> bool {
        matches!(self.get(id), TermData::Const(_))
    }

    /// Boolean constant.
    #[must_use]
    pub fn mk_bool(&self, value: bool) -> TermId {
        if value {
            self.true_term
        } else {
            self.false_term
        }
    }

    /// Variable of the given sort.
    pub fn mk_var(&mut self, name: impl Into<String>, sort: Sort) -> TermId {
        let name = name.into();
        self.intern(TermData::Var(name, sort.clone()), sort)
    }

    /// Variable whose name is not yet used in this store.
    pub fn mk_fresh_var(&mut self, prefix: &str, sort: Sort) -> TermId {
        loop {
            let name = format!("{}!{}", prefix, self.fresh_counter);
            self.fresh_counter += 1;
            let data = TermData::Var(name.clone(), sort.clone());
            if !self.index.contains_key(&data) {
                return self.mk_var(name, sort);
            }
        }
    }

    /// Integer numeral.
    pub fn mk_int(&mut self, value: BigInt) -> TermId {
        self.intern(TermData::Const(Constant::Int(value)), Sort::Int)
    }

    /// Real numeral.
    pub fn mk_rational(&mut self, value: BigRational) -> TermId {
        self.intern(TermData::Const(Constant::Rational(value)), Sort::Real)
    }

    /// Numeral of the given arithmetic sort. Non-integral values are always real.
    pub fn mk_numeral(&mut self, value: BigRational, int_sort: bool) -> TermId {
        if int_sort && value.is_integer() {
            self.mk_int(value.to_integer())
        } else {
            self.mk_rational(value)
        }
    }

    /// Application of an uninterpreted (or interpreted) symbol.
    pub fn mk_app(&mut self, name: impl Into<String>, args: Vec<TermId>, sort: Sort) -> TermId {
        self.intern(TermData::App(Symbol::named(name), args), sort)
    }

    /// Negation with constant folding and double-negation removal.
    pub fn mk_not(&mut self, t: TermId) -> TermId {
        if t == self.true_term {
            return self.false_term;
        }
        if t == self.false_term {
            return self.true_term;
        }
        if let TermData::Not(inner) = self.get(t) {
            return *inner;
        }
        self.intern(TermData::Not(t), Sort::Bool)
    }

    fn mk_junction(&mut self, args: Vec<TermId>, is_and: bool) -> TermId {
        let (unit, zero, op) = if is_and {
            (self.true_term, self.false_term, OP_AND)
        } else {
            (self.false_term, self.true_term, OP_OR)
        };
        let mut seen = FxHashSet::default();
        let mut flat = Vec::with_capacity(args.len());
        let mut pending: Vec<TermId> = args.into_iter().rev().collect();
        while let Some(arg) = pending.pop() {
            if arg == unit {
                continue;
            }
            if arg == zero {
                return zero;
            }
            if let TermData::App(sym, inner) = self.get(arg) {
                if sym.name() == op {
                    pending.extend(inner.iter().rev().copied());
                    continue;
                }
            }
            if seen.insert(arg) {
                flat.push(arg);
            }
        }
        for &arg in &flat {
            if let TermData::Not(inner) = self.get(arg) {
                if seen.contains(inner) {
                    return zero;
                }
            }
        }
        match flat.len() {
            0 => unit,
            1 => flat[0],
            _ => self.intern(TermData::App(Symbol::named(op), flat), Sort::Bool),
        }
    }

    /// Conjunction; flattens nested conjunctions and folds constants.
    pub fn mk_and(&mut self, args: Vec<TermId>) -> TermId {
        self.mk_junction(args, true)
    }

    /// Disjunction; flattens nested disjunctions and folds constants.
    pub fn mk_or(&mut self, args: Vec<TermId>) -> TermId {
        self.mk_junction(args, false)
    }

    /// Implication `a => b`.
    pub fn mk_implies(&mut self, a: TermId, b: TermId) -> TermId {
        let not_a = self.mk_not(a);
        self.mk_or(vec![not_a, b])
    }

    /// If-then-else, simplified when the condition or branches are constant.
    pub fn mk_ite(&mut self, cond: TermId, then_t: TermId, else_t: TermId) -> TermId {
        if cond == self.true_term || then_t == else_t {
            return then_t;
        }
        if cond == self.false_term {
            return else_t;
        }
        if let TermData::Not(inner) = self.get(cond) {
            let inner = *inner;
            return self.mk_ite(inner, else_t, then_t);
        }
        if *self.sort(then_t) == Sort::Bool {
            let (t, f) = (self.true_term, self.false_term);
            if then_t == t && else_t == f {
                return cond;
            }
            if then_t == f && else_t == t {
                return self.mk_not(cond);
            }
            if then_t == t {
                return self.mk_or(vec![cond, else_t]);
            }
            if else_t == f {
                return self.mk_and(vec![cond, then_t]);
            }
            if then_t == f {
                let not_cond = self.mk_not(cond);
                return self.mk_and(vec![not_cond, else_t]);
            }
            if else_t == t {
                let not_cond = self.mk_not(cond);
                return self.mk_or(vec![not_cond, then_t]);
            }
        }
        let sort = self.sort(then_t).clone();
        self.intern(TermData::Ite(cond, then_t, else_t), sort)
    }

    /// Equality with argument ordering by id, so `a = b` and `b = a` coincide.
    pub fn mk_eq(&mut self, a: TermId, b: TermId) -> TermId {
        if a == b {
            return self.true_term;
        }
        if let (Some(x), Some(y)) = (self.numeral(a), self.numeral(b)) {
            return self.mk_bool(x == y);
        }
        if self.is_constant(a) && self.is_constant(b) && *self.sort(a) == Sort::Bool {
            return self.false_term;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        self.intern(TermData::App(Symbol::named(OP_EQ), vec![lo, hi]), Sort::Bool)
    }

    /// Disequality `a != b`.
    pub fn mk_distinct(&mut self, a: TermId, b: TermId) -> TermId {
        let eq = self.mk_eq(a, b);
        self.mk_not(eq)
    }

    fn arith_sort(&self, args: &[TermId]) -> Sort {
        if args.iter().all(|&a| self.sort(a).is_int()) {
            Sort::Int
        } else {
            Sort::Real
        }
    }

    /// N-ary sum.
    pub fn mk_add(&mut self, args: Vec<TermId>) -> TermId {
        match args.len() {
            0 => self.mk_int(BigInt::zero()),
            1 => args[0],
            _ => {
                let sort = self.arith_sort(&args);
                self.intern(TermData::App(Symbol::named(OP_ADD), args), sort)
            }
        }
    }

    /// Difference `a - b`.
    pub fn mk_sub(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.arith_sort(&[a, b]);
        self.intern(TermData::App(Symbol::named(OP_SUB), vec![a, b]), sort)
    }

    /// Product `a * b`; at least one side is expected to be a numeral.
    pub fn mk_mul(&mut self, a: TermId, b: TermId) -> TermId {
        if self.numeral(a).is_some_and(|c| c.is_one()) {
            return b;
        }
        if self.numeral(b).is_some_and(|c| c.is_one()) {
            return a;
        }
        let sort = self.arith_sort(&[a, b]);
        self.intern(TermData::App(Symbol::named(OP_MUL), vec![a, b]), sort)
    }

    /// Integer division by a positive constant.
    pub fn mk_intdiv(&mut self, a: TermId, divisor: BigInt) -> TermId {
        if divisor.is_one() {
            return a;
        }
        if let Some(value) = self.numeral(a) {
            if value.is_integer() {
                return self.mk_int(value.to_integer().div_floor(&divisor));
            }
        }
        let d = self.mk_int(divisor);
        self.intern(TermData::App(Symbol::named(OP_DIV), vec![a, d]), Sort::Int)
    }

    /// The arithmetic term for an affine combination, ignoring any epsilon.
    pub fn mk_affine(&mut self, affine: &AffineTerm) -> TermId {
        let int_sort = affine.has_int_sort(self);
        let mut summands = Vec::new();
        for (atom, coeff) in affine.atoms() {
            let c = self.mk_numeral(coeff.clone(), int_sort);
            summands.push(self.mk_mul(c, atom));
        }
        let constant = &affine.constant().real;
        if !constant.is_zero() || summands.is_empty() {
            summands.push(self.mk_numeral(constant.clone(), int_sort));
        }
        self.mk_add(summands)
    }

    /// The atom `affine ≤ 0`, strict when the constant carries `+ε`.
    ///
    /// Constant terms fold to `true` or `false`.
    pub fn mk_affine_le0(&mut self, affine: &AffineTerm) -> TermId {
        let constant = affine.constant();
        if affine.is_constant() {
            return self.mk_bool(constant.signum() <= 0);
        }
        let strict = constant.eps > 0;
        let int_sort = affine.has_int_sort(self);
        let mut lhs_affine = affine.without_constant();
        lhs_affine.add_constant(InfNumber::from_rational(constant.real.clone()));
        let lhs = self.mk_affine(&lhs_affine);
        let zero = self.mk_numeral(BigRational::zero(), int_sort);
        let op = if strict { OP_LT } else { OP_LE };
        self.intern(TermData::App(Symbol::named(op), vec![lhs, zero]), Sort::Bool)
    }

    /// `a <= b`
    pub fn mk_le(&mut self, a: TermId, b: TermId) -> TermId {
        let affine = self.difference(a, b);
        self.mk_affine_le0(&affine)
    }

    /// `a < b`
    pub fn mk_lt(&mut self, a: TermId, b: TermId) -> TermId {
        let mut affine = self.difference(a, b);
        affine.add_constant(InfNumber::epsilon());
        self.mk_affine_le0(&affine)
    }

    /// `a >= b`
    pub fn mk_ge(&mut self, a: TermId, b: TermId) -> TermId {
        self.mk_le(b, a)
    }

    /// `a > b`
    pub fn mk_gt(&mut self, a: TermId, b: TermId) -> TermId {
        self.mk_lt(b, a)
    }

    fn difference(&self, a: TermId, b: TermId) -> AffineTerm {
        let lhs = AffineTerm::from_term(self, a);
        let rhs = AffineTerm::from_term(self, b);
        lhs.plus(&rhs.scaled(&-BigRational::one()))
    }

    /// Marked equality between the auxiliary variable `x` and `s`.
    pub fn mk_aux_eq(&mut self, x: TermId, s: TermId) -> TermId {
        self.intern(TermData::AuxEq(x, s), Sort::Bool)
    }

    /// Bounded-affine-term wrapper around `inner`.
    ///
    /// Constant `inner` formulas carry no information about the affine term
    /// and are returned unwrapped.
    pub fn mk_bounded(&mut self, affine: AffineTerm, bound: InfNumber, inner: TermId) -> TermId {
        if inner == self.true_term || inner == self.false_term {
            return inner;
        }
        let data = TermData::Bounded(Box::new(BoundedTerm {
            affine,
            bound,
            inner,
        }));
        self.intern(data, Sort::Bool)
    }

    /// Direct subterms of `id`, including the atoms of a bounded wrapper.
    #[must_use]
    pub fn children(&self, id: TermId) -> Vec<TermId> {
        match self.get(id) {
            TermData::Const(_) | TermData::Var(_, _) => Vec::new(),
            TermData::Not(a) => vec![*a],
            TermData::Ite(c, t, e) => vec![*c, *t, *e],
            TermData::App(_, args) => args.clone(),
            TermData::AuxEq(x, s) => vec![*x, *s],
            TermData::Bounded(b) => {
                let mut kids: Vec<TermId> = b.affine.atoms().map(|(a, _)| a).collect();
                kids.push(b.inner);
                kids
            }
        }
    }

    /// Rebuild `id` with its children mapped through `done`.
    fn rebuild(&mut self, id: TermId, done: &FxHashMap<TermId, TermId>) -> TermId {
        let map = |t: &TermId| done.get(t).copied().unwrap_or(*t);
        match self.get(id).clone() {
            TermData::Const(_) | TermData::Var(_, _) => id,
            TermData::Not(a) => self.mk_not(map(&a)),
            TermData::Ite(c, t, e) => self.mk_ite(map(&c), map(&t), map(&e)),
            TermData::AuxEq(x, s) => self.mk_aux_eq(map(&x), map(&s)),
            TermData::App(sym, args) => {
                let new_args: Vec<TermId> = args.iter().map(map).collect();
                if new_args == args {
                    return id;
                }
                let sort = self.sort(id).clone();
                let name = sym.name().to_string();
                match name.as_str() {
                    OP_AND => self.mk_and(new_args),
                    OP_OR => self.mk_or(new_args),
                    OP_EQ if new_args.len() == 2 => self.mk_eq(new_args[0], new_args[1]),
                    OP_LE if new_args.len() == 2 => self.mk_le(new_args[0], new_args[1]),
                    OP_LT if new_args.len() == 2 => self.mk_lt(new_args[0], new_args[1]),
                    OP_MUL if new_args.len() == 2 => self.mk_mul(new_args[0], new_args[1]),
                    OP_DIV if new_args.len() == 2 => match self.numeral(new_args[1]) {
                        Some(d) if d.is_integer() && d.is_positive() => {
                            self.mk_intdiv(new_args[0], d.to_integer())
                        }
                        _ => self.intern(TermData::App(sym, new_args), sort),
                    },
                    _ => self.intern(TermData::App(sym, new_args), sort),
                }
            }
            TermData::Bounded(b) => {
                let mut affine = AffineTerm::constant_term(b.affine.constant().clone());
                for (atom, coeff) in b.affine.atoms() {
                    let new_atom = map(&atom);
                    if new_atom == atom {
                        affine.add_atom(atom, coeff.clone());
                    } else {
                        let replacement = AffineTerm::from_term(self, new_atom);
                        affine.add_scaled(&replacement, coeff);
                    }
                }
                let inner = map(&b.inner);
                self.mk_bounded(affine, b.bound.clone(), inner)
            }
        }
    }

    /// Bottom-up rewrite of the DAG below `root`.
    ///
    /// `hook` is consulted before descending into a term; returning
    /// `Some(replacement)` stops the descent there. All other terms are
    /// rebuilt from their rewritten children, so simplifications of the
    /// smart constructors apply. Runs on an explicit stack.
    pub fn rewrite<F>(&mut self, root: TermId, mut hook: F) -> TermId
    where
        F: FnMut(&mut TermStore, TermId) -> Option<TermId>,
    {
        let mut done: FxHashMap<TermId, TermId> = FxHashMap::default();
        let mut stack = vec![(root, false)];
        while let Some((t, expanded)) = stack.pop() {
            if done.contains_key(&t) {
                continue;
            }
            if expanded {
                let rebuilt = self.rebuild(t, &done);
                done.insert(t, rebuilt);
                continue;
            }
            if let Some(replacement) = hook(self, t) {
                done.insert(t, replacement);
                continue;
            }
            stack.push((t, true));
            for child in self.children(t) {
                if !done.contains_key(&child) {
                    stack.push((child, false));
                }
            }
        }
        done.get(&root).copied().unwrap_or(root)
    }

    /// Replace every occurrence of `var` below `root` by `replacement`.
    pub fn substitute(&mut self, root: TermId, var: TermId, replacement: TermId) -> TermId {
        self.rewrite(root, |_, t| (t == var).then_some(replacement))
    }

    /// True if `needle` occurs in the DAG below `root`.
    #[must_use]
    pub fn contains(&self, root: TermId, needle: TermId) -> bool {
        let mut seen = FxHashSet::default();
        let mut stack = vec![root];
        while let Some(t) = stack.pop() {
            if t == needle {
                return true;
            }
            if seen.insert(t) {
                stack.extend(self.children(t));
            }
        }
        false
    }

    /// Names of the free variables and uninterpreted symbols below `root`.
    #[must_use]
    pub fn symbols(&self, root: TermId) -> FxHashSet<String> {
        let mut result = FxHashSet::default();
        let mut seen = FxHashSet::default();
        let mut stack = vec![root];
        while let Some(t) = stack.pop() {
            if !seen.insert(t) {
                continue;
            }
            match self.get(t) {
                TermData::Var(name, _) => {
                    result.insert(name.clone());
                }
                TermData::App(sym, _) if !sym.is_interpreted() => {
                    result.insert(sym.name().to_string());
                }
                _ => {}
            }
            stack.extend(self.children(t));
        }
        result
    }

    /// Render a term in SMT-LIB syntax.
    #[must_use]
    pub fn to_smtlib(&self, id: TermId) -> String {
        match self.get(id) {
            TermData::Const(Constant::Bool(b)) => b.to_string(),
            TermData::Const(Constant::Int(n)) => {
                if n.is_negative() {
                    format!("(- {})", n.magnitude())
                } else {
                    n.to_string()
                }
            }
            TermData::Const(Constant::Rational(r)) => {
                let body = if r.is_integer() {
                    format!("{}.0", r.numer().magnitude())
                } else {
                    format!("(/ {}.0 {}.0)", r.numer().magnitude(), r.denom())
                };
                if r.is_negative() {
                    format!("(- {})", body)
                } else {
                    body
                }
            }
            TermData::Var(name, _) => name.clone(),
            TermData::Not(a) => format!("(not {})", self.to_smtlib(*a)),
            TermData::Ite(c, t, e) => format!(
                "(ite {} {} {})",
                self.to_smtlib(*c),
                self.to_smtlib(*t),
                self.to_smtlib(*e)
            ),
            TermData::App(sym, args) => {
                if args.is_empty() {
                    return sym.name().to_string();
                }
                let args: Vec<String> = args.iter().map(|&a| self.to_smtlib(a)).collect();
                format!("({} {})", sym.name(), args.join(" "))
            }
            TermData::AuxEq(x, s) => format!("(@EQ {} {})", self.to_smtlib(*x), self.to_smtlib(*s)),
            TermData::Bounded(b) => format!(
                "(@LA ({}) {} {})",
                b.affine,
                b.bound,
                self.to_smtlib(b.inner)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_consing() {
        let mut terms = TermStore::new();
        let a = terms.mk_var("a", Sort::Int);
        let b = terms.mk_var("b", Sort::Int);
        assert_eq!(terms.mk_var("a", Sort::Int), a);
        assert_eq!(terms.mk_eq(a, b), terms.mk_eq(b, a));
    }

    #[test]
    fn test_boolean_folding() {
        let mut terms = TermStore::new();
        let p = terms.mk_var("p", Sort::Bool);
        let t = terms.true_term();
        let f = terms.false_term();
        assert_eq!(terms.mk_and(vec![p, t]), p);
        assert_eq!(terms.mk_or(vec![p, f]), p);
        assert_eq!(terms.mk_or(vec![p, t]), t);
        let not_p = terms.mk_not(p);
        assert_eq!(terms.mk_not(not_p), p);
        assert_eq!(terms.mk_and(vec![p, not_p]), f);
    }

    #[test]
    fn test_ite_on_negated_condition() {
        let mut terms = TermStore::new();
        let a = terms.mk_var("a", Sort::Int);
        let b = terms.mk_var("b", Sort::Int);
        let eq = terms.mk_eq(a, b);
        let neq = terms.mk_not(eq);
        let (t, f) = (terms.true_term(), terms.false_term());
        assert_eq!(terms.mk_ite(neq, f, t), eq);
    }

    #[test]
    fn test_le_folds_constants() {
        let mut terms = TermStore::new();
        let two = terms.mk_int(BigInt::from(2));
        let three = terms.mk_int(BigInt::from(3));
        let le = terms.mk_le(two, three);
        let gt = terms.mk_lt(three, two);
        let lt_self = terms.mk_lt(two, two);
        assert!(terms.is_true(le));
        assert!(terms.is_false(gt));
        assert!(terms.is_false(lt_self));
    }

    #[test]
    fn test_substitute_renormalizes_inequalities() {
        let mut terms = TermStore::new();
        let x = terms.mk_var("x", Sort::Int);
        let five = terms.mk_int(BigInt::from(5));
        let lt = terms.mk_lt(x, five);
        let four = terms.mk_int(BigInt::from(4));
        let seven = terms.mk_int(BigInt::from(7));
        let at_four = terms.substitute(lt, x, four);
        let at_seven = terms.substitute(lt, x, seven);
        assert!(terms.is_true(at_four));
        assert!(terms.is_false(at_seven));
    }

    #[test]
    fn test_substitute_inside_bounded_wrapper() {
        let mut terms = TermStore::new();
        let x = terms.mk_var("x", Sort::Real);
        let y = terms.mk_var("y", Sort::Real);
        let z = terms.mk_var("z", Sort::Real);
        let mut affine = AffineTerm::atom(x);
        affine.add_atom(y, BigRational::one());
        let inner = terms.mk_affine_le0(&affine);
        let wrapped = terms.mk_bounded(affine, -InfNumber::epsilon(), inner);
        let result = terms.substitute(wrapped, x, z);
        match terms.get(result) {
            TermData::Bounded(b) => {
                assert!(!b.affine.contains(x));
                assert!(b.affine.contains(z));
                assert!(!terms.contains(b.inner, x));
            }
            other => panic!("expected wrapper, got {:?}", other),
        }
    }

    #[test]
    fn test_fresh_vars_are_distinct() {
        let mut terms = TermStore::new();
        let a = terms.mk_fresh_var("aux", Sort::Int);
        let b = terms.mk_fresh_var("aux", Sort::Int);
        assert_ne!(a, b);
    }

    #[test]
    fn test_symbols_skip_interpreted_ops() {
        let mut terms = TermStore::new();
        let x = terms.mk_var("x", Sort::Int);
        let fx = terms.mk_app("f", vec![x], Sort::Int);
        let zero = terms.mk_int(BigInt::zero());
        let le = terms.mk_le(fx, zero);
        let syms = terms.symbols(le);
        assert!(syms.contains("x"));
        assert!(syms.contains("f"));
        assert!(!syms.contains("<="));
    }
}
