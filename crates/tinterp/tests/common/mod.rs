//! Shared helpers for the integration tests: a brute-force reference solver
//! over small finite domains.
//!
//! Uninterpreted functions over booleans and uninterpreted sorts are
//! enumerated as lookup tables, one grid variable per table cell.
//!
//! `Sat` answers are genuine models; `Unsat` only means no model exists
//! within the enumerated grid.

#![allow(dead_code)]

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use rustc_hash::FxHashMap;
use tinterp::{ReferenceSolver, SatResult};
use tinterp_core::{Constant, Sort, TermData, TermId, TermStore};
use tracing_subscriber::EnvFilter;

/// Install a test subscriber honouring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Bool(bool),
    Num(BigRational),
    Elem(u32),
}

#[derive(Debug, Clone)]
enum Expr {
    Const(Value),
    Var(usize),
    Not(Box<Expr>),
    Ite(Box<Expr>, Box<Expr>, Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    Le(Box<Expr>, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
    Add(Vec<Expr>),
    Sub(Vec<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    /// Table lookup: first cell variable, argument domain sizes, arguments
    App(usize, Vec<usize>, Vec<Expr>),
}

/// Enumerates assignments over a bounded grid:
/// integers in `-radius..=radius`, reals in steps of one half over the same
/// range, and `elements` values per uninterpreted sort.
pub struct BruteForceSolver {
    radius: i64,
    elements: u32,
    max_assignments: usize,
    vars: Vec<(String, Sort)>,
    var_index: FxHashMap<String, usize>,
    assertions: Vec<Option<Expr>>,
    scopes: Vec<usize>,
    pub checks: usize,
}

impl Default for BruteForceSolver {
    fn default() -> Self {
        Self::new(4, 3)
    }
}

impl BruteForceSolver {
    pub fn new(radius: i64, elements: u32) -> Self {
        Self {
            radius,
            elements,
            max_assignments: 4_000_000,
            vars: Vec::new(),
            var_index: FxHashMap::default(),
            assertions: Vec::new(),
            scopes: Vec::new(),
            checks: 0,
        }
    }

    fn var(&mut self, name: &str, sort: &Sort) -> usize {
        if let Some(&i) = self.var_index.get(name) {
            return i;
        }
        let i = self.vars.len();
        self.vars.push((name.to_string(), sort.clone()));
        self.var_index.insert(name.to_string(), i);
        i
    }

    /// `None` for terms outside the supported fragment.
    fn translate(&mut self, terms: &TermStore, t: TermId) -> Option<Expr> {
        let expr = match terms.get(t) {
            TermData::Const(Constant::Bool(b)) => Expr::Const(Value::Bool(*b)),
            TermData::Const(Constant::Int(n)) => {
                Expr::Const(Value::Num(BigRational::from_integer(n.clone())))
            }
            TermData::Const(Constant::Rational(r)) => Expr::Const(Value::Num(r.clone())),
            TermData::Var(name, sort) => Expr::Var(self.var(name, sort)),
            TermData::Not(a) => Expr::Not(Box::new(self.translate(terms, *a)?)),
            TermData::Ite(c, a, b) => Expr::Ite(
                Box::new(self.translate(terms, *c)?),
                Box::new(self.translate(terms, *a)?),
                Box::new(self.translate(terms, *b)?),
            ),
            TermData::AuxEq(x, s) => Expr::Eq(
                Box::new(self.translate(terms, *x)?),
                Box::new(self.translate(terms, *s)?),
            ),
            TermData::Bounded(b) => self.translate(terms, b.inner)?,
            TermData::App(sym, args) => {
                let mut xs = Vec::with_capacity(args.len());
                for &a in args {
                    xs.push(self.translate(terms, a)?);
                }
                let pair = |mut xs: Vec<Expr>| {
                    let b = xs.pop()?;
                    let a = xs.pop()?;
                    Some((Box::new(a), Box::new(b)))
                };
                match sym.name() {
                    "and" => Expr::And(xs),
                    "or" => Expr::Or(xs),
                    "+" => Expr::Add(xs),
                    "-" => Expr::Sub(xs),
                    "=" => {
                        let (a, b) = pair(xs)?;
                        Expr::Eq(a, b)
                    }
                    "<=" => {
                        let (a, b) = pair(xs)?;
                        Expr::Le(a, b)
                    }
                    "<" => {
                        let (a, b) = pair(xs)?;
                        Expr::Lt(a, b)
                    }
                    "*" => {
                        let (a, b) = pair(xs)?;
                        Expr::Mul(a, b)
                    }
                    "div" => {
                        let (a, b) = pair(xs)?;
                        Expr::Div(a, b)
                    }
                    name => {
                        let mut radices = Vec::with_capacity(args.len());
                        for &a in args {
                            radices.push(self.finite_size(terms.sort(a))?);
                        }
                        let cells = radices.iter().try_fold(1usize, |acc, r| acc.checked_mul(*r))?;
                        let base = self.table(name, cells, terms.sort(t));
                        Expr::App(base, radices, xs)
                    }
                }
            }
        };
        Some(expr)
    }

    fn finite_size(&self, sort: &Sort) -> Option<usize> {
        match sort {
            Sort::Bool => Some(2),
            Sort::Uninterpreted(_) => Some(self.elements as usize),
            Sort::Int | Sort::Real => None,
        }
    }

    /// First of the `cells` consecutive variables holding the table of `name`.
    fn table(&mut self, name: &str, cells: usize, sort: &Sort) -> usize {
        if let Some(&base) = self.var_index.get(&format!("{}@0", name)) {
            return base;
        }
        let base = self.vars.len();
        for i in 0..cells {
            self.var(&format!("{}@{}", name, i), sort);
        }
        base
    }

    fn domain(&self, sort: &Sort) -> Vec<Value> {
        match sort {
            Sort::Bool => vec![Value::Bool(false), Value::Bool(true)],
            Sort::Int => (-self.radius..=self.radius)
                .map(|i| Value::Num(BigRational::from_integer(BigInt::from(i))))
                .collect(),
            Sort::Real => (-2 * self.radius..=2 * self.radius)
                .map(|i| Value::Num(BigRational::new(BigInt::from(i), BigInt::from(2))))
                .collect(),
            Sort::Uninterpreted(_) => (0..self.elements).map(Value::Elem).collect(),
        }
    }

    fn used_vars(expr: &Expr, out: &mut Vec<usize>) {
        match expr {
            Expr::Const(_) => {}
            Expr::Var(i) => {
                if !out.contains(i) {
                    out.push(*i);
                }
            }
            Expr::Not(a) => Self::used_vars(a, out),
            Expr::Ite(c, a, b) => {
                Self::used_vars(c, out);
                Self::used_vars(a, out);
                Self::used_vars(b, out);
            }
            Expr::And(xs) | Expr::Or(xs) | Expr::Add(xs) | Expr::Sub(xs) => {
                for x in xs {
                    Self::used_vars(x, out);
                }
            }
            Expr::Eq(a, b) | Expr::Le(a, b) | Expr::Lt(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) => {
                Self::used_vars(a, out);
                Self::used_vars(b, out);
            }
            Expr::App(base, radices, args) => {
                let cells: usize = radices.iter().product();
                for i in *base..*base + cells {
                    if !out.contains(&i) {
                        out.push(i);
                    }
                }
                for a in args {
                    Self::used_vars(a, out);
                }
            }
        }
    }
}

fn num(v: Value) -> Option<BigRational> {
    match v {
        Value::Num(n) => Some(n),
        _ => None,
    }
}

fn truth(v: Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(b),
        _ => None,
    }
}

fn eval(expr: &Expr, env: &[Option<Value>]) -> Option<Value> {
    let value = match expr {
        Expr::Const(v) => v.clone(),
        Expr::Var(i) => env.get(*i)?.clone()?,
        Expr::Not(a) => Value::Bool(!truth(eval(a, env)?)?),
        Expr::Ite(c, a, b) => {
            if truth(eval(c, env)?)? {
                eval(a, env)?
            } else {
                eval(b, env)?
            }
        }
        Expr::And(xs) => {
            for x in xs {
                if !truth(eval(x, env)?)? {
                    return Some(Value::Bool(false));
                }
            }
            Value::Bool(true)
        }
        Expr::Or(xs) => {
            for x in xs {
                if truth(eval(x, env)?)? {
                    return Some(Value::Bool(true));
                }
            }
            Value::Bool(false)
        }
        Expr::Eq(a, b) => Value::Bool(eval(a, env)? == eval(b, env)?),
        Expr::Le(a, b) => Value::Bool(num(eval(a, env)?)? <= num(eval(b, env)?)?),
        Expr::Lt(a, b) => Value::Bool(num(eval(a, env)?)? < num(eval(b, env)?)?),
        Expr::Add(xs) => {
            let mut sum = BigRational::zero();
            for x in xs {
                sum += num(eval(x, env)?)?;
            }
            Value::Num(sum)
        }
        Expr::Sub(xs) => {
            let mut values = Vec::with_capacity(xs.len());
            for x in xs {
                values.push(num(eval(x, env)?)?);
            }
            let (first, rest) = values.split_first()?;
            if rest.is_empty() {
                Value::Num(-first.clone())
            } else {
                Value::Num(rest.iter().fold(first.clone(), |acc, v| acc - v))
            }
        }
        Expr::Mul(a, b) => Value::Num(num(eval(a, env)?)? * num(eval(b, env)?)?),
        Expr::Div(a, b) => {
            let d = num(eval(b, env)?)?;
            if d.is_zero() {
                return None;
            }
            Value::Num((num(eval(a, env)?)? / d).floor())
        }
        Expr::App(base, radices, args) => {
            let mut cell = 0usize;
            for (a, &radix) in args.iter().zip(radices) {
                let digit = match eval(a, env)? {
                    Value::Bool(b) => usize::from(b),
                    Value::Elem(e) => e as usize,
                    Value::Num(_) => return None,
                };
                cell = cell * radix + digit;
            }
            env.get(base + cell)?.clone()?
        }
    };
    Some(value)
}

impl ReferenceSolver for BruteForceSolver {
    fn push(&mut self) {
        self.scopes.push(self.assertions.len());
    }

    fn pop(&mut self) {
        if let Some(len) = self.scopes.pop() {
            self.assertions.truncate(len);
        }
    }

    fn assert_term(&mut self, terms: &TermStore, t: TermId) {
        let expr = self.translate(terms, t);
        self.assertions.push(expr);
    }

    fn check_sat(&mut self) -> SatResult {
        self.checks += 1;
        let mut exprs = Vec::with_capacity(self.assertions.len());
        for a in &self.assertions {
            match a {
                Some(e) => exprs.push(e.clone()),
                None => return SatResult::Unknown,
            }
        }
        let mut used = Vec::new();
        for e in &exprs {
            Self::used_vars(e, &mut used);
        }
        let domains: Vec<Vec<Value>> = used.iter().map(|&i| self.domain(&self.vars[i].1)).collect();
        let total = domains
            .iter()
            .try_fold(1usize, |acc, d| acc.checked_mul(d.len()));
        match total {
            Some(n) if n <= self.max_assignments => {}
            _ => return SatResult::Unknown,
        }

        let mut env: Vec<Option<Value>> = vec![None; self.vars.len()];
        let mut digits = vec![0usize; used.len()];
        loop {
            for (k, &i) in used.iter().enumerate() {
                env[i] = Some(domains[k][digits[k]].clone());
            }
            let model = exprs
                .iter()
                .all(|e| matches!(eval(e, &env), Some(Value::Bool(true))));
            if model {
                return SatResult::Sat;
            }
            // odometer increment
            let mut k = 0;
            loop {
                if k == digits.len() {
                    return SatResult::Unsat;
                }
                digits[k] += 1;
                if digits[k] < domains[k].len() {
                    break;
                }
                digits[k] = 0;
                k += 1;
            }
        }
    }
}

/// True if the conjunction of `premises` entails `conclusion` on the grid.
pub fn entails(terms: &mut TermStore, premises: &[TermId], conclusion: TermId) -> bool {
    let mut solver = BruteForceSolver::default();
    for &p in premises {
        solver.assert_term(terms, p);
    }
    let negated = terms.mk_not(conclusion);
    solver.assert_term(terms, negated);
    solver.check_sat() == SatResult::Unsat
}

/// The rational `n`.
pub fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// The rational one.
pub fn one() -> BigRational {
    BigRational::one()
}
