//! SAT backend
//!
//! Physical design talks to the solver only through [`SatBackend`]: fresh
//! variables, clauses, solving and model lookup, plus a scope stack so that
//! optimization bounds can be added and retracted incrementally.
//!
//! [`VarisatBackend`] implements scopes with activation literals: a clause
//! added inside a scope carries the negated activation literal of that scope,
//! every open scope is assumed while solving, and popping a scope disables its
//! clauses for good.

use crate::error::{PhysicalDesignError, Result};
use varisat::ExtendFormula;

/// A SAT variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(pub usize);

impl Var {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A SAT literal (variable with polarity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lit {
    var: Var,
    negated: bool,
}

impl Lit {
    pub fn positive(var: Var) -> Self {
        Lit {
            var,
            negated: false,
        }
    }

    pub fn negative(var: Var) -> Self {
        Lit { var, negated: true }
    }

    pub fn var(self) -> Var {
        self.var
    }

    pub fn is_negative(self) -> bool {
        self.negated
    }

    fn to_varisat(self) -> varisat::Lit {
        varisat::Lit::from_var(varisat::Var::from_index(self.var.0), !self.negated)
    }
}

impl std::ops::Not for Lit {
    type Output = Lit;

    fn not(self) -> Self::Output {
        Lit {
            var: self.var,
            negated: !self.negated,
        }
    }
}

/// Capabilities physical design needs from a SAT solver
pub trait SatBackend {
    /// Fresh variable, returned as its positive literal
    fn new_lit(&mut self) -> Lit;

    fn add_clause(&mut self, clause: &[Lit]);

    /// Open a scope; clauses added until the matching `pop` are retracted by it
    fn push(&mut self);

    fn pop(&mut self);

    /// `Ok(true)` if satisfiable, `Ok(false)` if not
    fn solve(&mut self) -> Result<bool>;

    /// Value of `lit` in the model of the last satisfiable `solve`
    fn value(&self, lit: Lit) -> bool;

    fn num_vars(&self) -> usize;

    fn num_clauses(&self) -> usize;
}

/// [`SatBackend`] on top of varisat
pub struct VarisatBackend {
    solver: varisat::Solver<'static>,
    /// Activation literals of the open scopes, innermost last
    scopes: Vec<Lit>,
    model: Vec<bool>,
    num_vars: usize,
    num_clauses: usize,
}

impl VarisatBackend {
    pub fn new() -> Self {
        Self {
            solver: varisat::Solver::new(),
            scopes: Vec::new(),
            model: Vec::new(),
            num_vars: 0,
            num_clauses: 0,
        }
    }
}

impl Default for VarisatBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SatBackend for VarisatBackend {
    fn new_lit(&mut self) -> Lit {
        let var = self.solver.new_var();
        self.num_vars += 1;
        Lit::positive(Var(var.index()))
    }

    fn add_clause(&mut self, clause: &[Lit]) {
        let mut lits: Vec<varisat::Lit> = clause.iter().map(|l| l.to_varisat()).collect();
        if let Some(act) = self.scopes.last() {
            lits.push((!*act).to_varisat());
        }
        self.solver.add_clause(&lits);
        self.num_clauses += 1;
    }

    fn push(&mut self) {
        let act = self.new_lit();
        self.scopes.push(act);
    }

    fn pop(&mut self) {
        if let Some(act) = self.scopes.pop() {
            // permanently satisfies every clause of the scope
            self.solver.add_clause(&[(!act).to_varisat()]);
        }
    }

    fn solve(&mut self) -> Result<bool> {
        let assumptions: Vec<varisat::Lit> = self.scopes.iter().map(|l| l.to_varisat()).collect();
        self.solver.assume(&assumptions);

        let sat = self
            .solver
            .solve()
            .map_err(|e| PhysicalDesignError::Solver(e.to_string()))?;

        self.model.clear();
        if sat {
            if let Some(model) = self.solver.model() {
                self.model = vec![false; self.num_vars];
                for lit in model {
                    if let Some(slot) = self.model.get_mut(lit.index()) {
                        *slot = lit.is_positive();
                    }
                }
            }
        }
        Ok(sat)
    }

    fn value(&self, lit: Lit) -> bool {
        let v = self.model.get(lit.var.0).copied().unwrap_or(false);
        v != lit.negated
    }

    fn num_vars(&self) -> usize {
        self.num_vars
    }

    fn num_clauses(&self) -> usize {
        self.num_clauses
    }
}

// ============================================================================
// Cardinality constraints
// ============================================================================

/// At least one of `lits`
pub fn at_least_one<B: SatBackend + ?Sized>(backend: &mut B, lits: &[Lit]) {
    backend.add_clause(lits);
}

/// At most one of `lits`: pairwise for short lists, sequential otherwise
pub fn at_most_one<B: SatBackend + ?Sized>(backend: &mut B, lits: &[Lit]) {
    if lits.len() <= 5 {
        for (i, a) in lits.iter().enumerate() {
            for b in &lits[i + 1..] {
                backend.add_clause(&[!*a, !*b]);
            }
        }
        return;
    }

    // s_i: some of lits[0..=i] is true
    let mut prev = backend.new_lit();
    backend.add_clause(&[!lits[0], prev]);
    for lit in &lits[1..lits.len() - 1] {
        let next = backend.new_lit();
        backend.add_clause(&[!*lit, next]);
        backend.add_clause(&[!prev, next]);
        backend.add_clause(&[!*lit, !prev]);
        prev = next;
    }
    backend.add_clause(&[!lits[lits.len() - 1], !prev]);
}

pub fn exactly_one<B: SatBackend + ?Sized>(backend: &mut B, lits: &[Lit]) {
    at_least_one(backend, lits);
    at_most_one(backend, lits);
}

/// Unary counter over a set of inputs
///
/// `outputs[j]` is forced true whenever at least `j + 1` inputs are true.
/// Only that direction is encoded, which is all an upper bound needs.
pub struct SequentialCounter {
    outputs: Vec<Lit>,
}

impl SequentialCounter {
    /// Count `inputs` up to `width`
    pub fn new<B: SatBackend + ?Sized>(backend: &mut B, inputs: &[Lit], width: usize) -> Self {
        if inputs.is_empty() || width == 0 {
            return Self {
                outputs: Vec::new(),
            };
        }

        let mut row: Vec<Lit> = (0..width).map(|_| backend.new_lit()).collect();
        backend.add_clause(&[!inputs[0], row[0]]);

        for input in &inputs[1..] {
            let next: Vec<Lit> = (0..width).map(|_| backend.new_lit()).collect();
            backend.add_clause(&[!*input, next[0]]);
            for j in 0..width {
                backend.add_clause(&[!row[j], next[j]]);
                if j > 0 {
                    backend.add_clause(&[!*input, !row[j - 1], next[j]]);
                }
            }
            row = next;
        }

        Self { outputs: row }
    }

    /// Literal that limits the count to `k`, if `k` is below the width
    pub fn at_most(&self, k: usize) -> Option<Lit> {
        self.outputs.get(k).map(|l| !*l)
    }

    pub fn width(&self) -> usize {
        self.outputs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_true(backend: &VarisatBackend, lits: &[Lit]) -> usize {
        lits.iter().filter(|l| backend.value(**l)).count()
    }

    #[test]
    fn test_simple_sat_and_unsat() {
        let mut backend = VarisatBackend::new();
        let a = backend.new_lit();
        let b = backend.new_lit();
        backend.add_clause(&[a, b]);
        backend.add_clause(&[!a]);
        assert!(backend.solve().unwrap());
        assert!(!backend.value(a));
        assert!(backend.value(b));

        backend.add_clause(&[!b]);
        assert!(!backend.solve().unwrap());
    }

    #[test]
    fn test_push_pop_retracts_clauses() {
        let mut backend = VarisatBackend::new();
        let a = backend.new_lit();
        backend.add_clause(&[a]);

        backend.push();
        backend.add_clause(&[!a]);
        assert!(!backend.solve().unwrap());
        backend.pop();

        assert!(backend.solve().unwrap());
        assert!(backend.value(a));
    }

    #[test]
    fn test_exactly_one() {
        for n in [2, 5, 9] {
            let mut backend = VarisatBackend::new();
            let lits: Vec<Lit> = (0..n).map(|_| backend.new_lit()).collect();
            exactly_one(&mut backend, &lits);
            assert!(backend.solve().unwrap());
            assert_eq!(count_true(&backend, &lits), 1);

            // forcing two breaks it
            backend.push();
            backend.add_clause(&[lits[0]]);
            backend.add_clause(&[lits[n - 1]]);
            assert!(!backend.solve().unwrap());
            backend.pop();
        }
    }

    #[test]
    fn test_sequential_counter_bounds() {
        let mut backend = VarisatBackend::new();
        let lits: Vec<Lit> = (0..6).map(|_| backend.new_lit()).collect();
        for lit in &lits[..3] {
            backend.add_clause(&[*lit]);
        }
        let counter = SequentialCounter::new(&mut backend, &lits, 6);
        assert_eq!(counter.width(), 6);

        backend.push();
        backend.add_clause(&[counter.at_most(2).unwrap()]);
        assert!(!backend.solve().unwrap());
        backend.pop();

        backend.push();
        backend.add_clause(&[counter.at_most(3).unwrap()]);
        assert!(backend.solve().unwrap());
        assert_eq!(count_true(&backend, &lits), 3);
        backend.pop();

        assert!(counter.at_most(6).is_none());
    }
}
