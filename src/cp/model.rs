//! CP model: variables, linear constraints, reification and no-overlap.
//!
//! This is the boundary handed to a constraint solver. It contains
//! only what rostering needs:
//! - boolean decision variables,
//! - bounded integer variables,
//! - linear (in)equalities over both,
//! - linear constraints enforced by a literal (half-reification),
//! - optional fixed-time intervals grouped into no-overlap sets,
//! - a linear minimization objective.
//!
//! Variables are handles (indices) into the model that created them.

use std::fmt;

/// Handle to a boolean variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoolVar(pub(crate) usize);

/// Handle to an integer variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntVar(pub(crate) usize);

/// A boolean variable or its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Literal {
    /// Underlying variable.
    pub var: BoolVar,
    /// Whether the literal is `!var`.
    pub negated: bool,
}

impl BoolVar {
    /// Index within the model.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }

    /// The negated literal.
    #[inline]
    pub fn not(self) -> Literal {
        Literal {
            var: self,
            negated: true,
        }
    }
}

impl IntVar {
    /// Index within the model.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<BoolVar> for Literal {
    fn from(var: BoolVar) -> Self {
        Literal {
            var,
            negated: false,
        }
    }
}

impl Literal {
    /// Value of the literal under a variable value.
    #[inline]
    pub fn holds(self, value: bool) -> bool {
        value != self.negated
    }
}

/// A variable appearing in a linear expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Var {
    /// Boolean (0/1) variable.
    Bool(BoolVar),
    /// Integer variable.
    Int(IntVar),
}

/// `Σ coef·var + constant`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    /// Terms `(coefficient, variable)`.
    pub terms: Vec<(i64, Var)>,
    /// Constant offset.
    pub constant: i64,
}

impl LinearExpr {
    /// Empty expression (zero).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of boolean variables with coefficient 1.
    pub fn sum(vars: impl IntoIterator<Item = BoolVar>) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (1, Var::Bool(v))).collect(),
            constant: 0,
        }
    }

    /// Adds `coef·var` for a boolean.
    pub fn add_bool(mut self, coef: i64, var: BoolVar) -> Self {
        self.terms.push((coef, Var::Bool(var)));
        self
    }

    /// Adds `coef·var` for an integer.
    pub fn add_int(mut self, coef: i64, var: IntVar) -> Self {
        self.terms.push((coef, Var::Int(var)));
        self
    }

    /// Adds every term of `other` scaled by `factor`.
    pub fn add_scaled(mut self, factor: i64, other: &LinearExpr) -> Self {
        self.terms
            .extend(other.terms.iter().map(|&(c, v)| (c * factor, v)));
        self.constant += factor * other.constant;
        self
    }

    /// Adds a constant.
    pub fn add_constant(mut self, k: i64) -> Self {
        self.constant += k;
        self
    }

    /// Whether the expression has no variable terms.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Merges duplicate variables and drops zero coefficients.
    pub fn normalized(mut self) -> Self {
        self.terms.sort_by_key(|&(_, v)| v);
        let mut merged: Vec<(i64, Var)> = Vec::with_capacity(self.terms.len());
        for (c, v) in self.terms {
            match merged.last_mut() {
                Some((mc, mv)) if *mv == v => *mc += c,
                _ => merged.push((c, v)),
            }
        }
        merged.retain(|&(c, _)| c != 0);
        self.terms = merged;
        self
    }

    /// Evaluates under complete assignments.
    pub fn evaluate(&self, bools: &[bool], ints: &[i64]) -> i64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|&(c, v)| match v {
                    Var::Bool(b) => c * bools[b.0] as i64,
                    Var::Int(i) => c * ints[i.0],
                })
                .sum::<i64>()
    }
}

/// Relational operator of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `expr ≤ rhs`
    Le,
    /// `expr ≥ rhs`
    Ge,
    /// `expr = rhs`
    Eq,
}

impl Comparison {
    /// Whether `lhs (op) rhs` holds.
    #[inline]
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Comparison::Le => lhs <= rhs,
            Comparison::Ge => lhs >= rhs,
            Comparison::Eq => lhs == rhs,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Comparison::Le => "<=",
            Comparison::Ge => ">=",
            Comparison::Eq => "==",
        })
    }
}

/// `expr (op) rhs`, with the expression's constant folded into `rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    /// Left-hand side (constant is always zero).
    pub expr: LinearExpr,
    /// Operator.
    pub cmp: Comparison,
    /// Right-hand side.
    pub rhs: i64,
}

impl LinearConstraint {
    fn new(expr: LinearExpr, cmp: Comparison, rhs: i64) -> Self {
        let rhs = rhs - expr.constant;
        let mut expr = expr.normalized();
        expr.constant = 0;
        Self { expr, cmp, rhs }
    }

    /// Whether the constraint holds under complete assignments.
    pub fn is_satisfied(&self, bools: &[bool], ints: &[i64]) -> bool {
        self.cmp.holds(self.expr.evaluate(bools, ints), self.rhs)
    }
}

/// An interval with fixed bounds, present only if its literal holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalVar {
    /// Name.
    pub name: String,
    /// Start (inclusive).
    pub start: i64,
    /// End (exclusive).
    pub end: i64,
    /// Presence literal; `None` means always present.
    pub presence: Option<Literal>,
}

impl IntervalVar {
    /// Whether two intervals intersect.
    #[inline]
    pub fn overlaps(&self, other: &IntervalVar) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A model constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Always enforced.
    Linear(LinearConstraint),
    /// Enforced only when `enforce` holds.
    Enforced {
        /// Enforcement literal.
        enforce: Literal,
        /// The linear constraint.
        constraint: LinearConstraint,
    },
    /// Present intervals (by index) must be pairwise disjoint.
    NoOverlap(Vec<usize>),
}

/// Integer variable declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntVarDef {
    /// Name.
    pub name: String,
    /// Lower bound.
    pub min: i64,
    /// Upper bound.
    pub max: i64,
}

/// A constraint model.
#[derive(Debug, Clone, Default)]
pub struct CpModel {
    /// Model name.
    pub name: String,
    bools: Vec<String>,
    ints: Vec<IntVarDef>,
    intervals: Vec<IntervalVar>,
    constraints: Vec<Constraint>,
    objective: Option<LinearExpr>,
}

impl CpModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Declares a boolean variable.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> BoolVar {
        self.bools.push(name.into());
        BoolVar(self.bools.len() - 1)
    }

    /// Declares an integer variable with domain `[min, max]`.
    pub fn new_int_var(&mut self, name: impl Into<String>, min: i64, max: i64) -> IntVar {
        self.ints.push(IntVarDef {
            name: name.into(),
            min,
            max,
        });
        IntVar(self.ints.len() - 1)
    }

    /// Declares a fixed interval present iff `presence` holds.
    pub fn new_optional_interval(
        &mut self,
        name: impl Into<String>,
        start: i64,
        end: i64,
        presence: impl Into<Literal>,
    ) -> usize {
        self.intervals.push(IntervalVar {
            name: name.into(),
            start,
            end,
            presence: Some(presence.into()),
        });
        self.intervals.len() - 1
    }

    /// Adds `expr (op) rhs`.
    pub fn add_linear(&mut self, expr: LinearExpr, cmp: Comparison, rhs: i64) {
        self.constraints
            .push(Constraint::Linear(LinearConstraint::new(expr, cmp, rhs)));
    }

    /// Adds `expr ≤ rhs`.
    pub fn add_le(&mut self, expr: LinearExpr, rhs: i64) {
        self.add_linear(expr, Comparison::Le, rhs);
    }

    /// Adds `expr ≥ rhs`.
    pub fn add_ge(&mut self, expr: LinearExpr, rhs: i64) {
        self.add_linear(expr, Comparison::Ge, rhs);
    }

    /// Adds `expr = rhs`.
    pub fn add_eq(&mut self, expr: LinearExpr, rhs: i64) {
        self.add_linear(expr, Comparison::Eq, rhs);
    }

    /// Adds `enforce ⇒ expr (op) rhs`.
    pub fn add_enforced(
        &mut self,
        enforce: impl Into<Literal>,
        expr: LinearExpr,
        cmp: Comparison,
        rhs: i64,
    ) {
        self.constraints.push(Constraint::Enforced {
            enforce: enforce.into(),
            constraint: LinearConstraint::new(expr, cmp, rhs),
        });
    }

    /// Requires the given intervals to be pairwise disjoint when present.
    pub fn add_no_overlap(&mut self, intervals: Vec<usize>) {
        if intervals.len() > 1 {
            self.constraints.push(Constraint::NoOverlap(intervals));
        }
    }

    /// Sets the minimization objective.
    pub fn minimize(&mut self, expr: LinearExpr) {
        self.objective = Some(expr.normalized());
    }

    /// Number of boolean variables.
    pub fn bool_count(&self) -> usize {
        self.bools.len()
    }

    /// Number of integer variables.
    pub fn int_count(&self) -> usize {
        self.ints.len()
    }

    /// Number of intervals.
    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Boolean variable name.
    pub fn bool_name(&self, var: BoolVar) -> &str {
        &self.bools[var.0]
    }

    /// Integer variable declarations.
    pub fn int_vars(&self) -> &[IntVarDef] {
        &self.ints
    }

    /// Intervals.
    pub fn intervals(&self) -> &[IntervalVar] {
        &self.intervals
    }

    /// Constraints.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Objective, if set.
    pub fn objective(&self) -> Option<&LinearExpr> {
        self.objective.as_ref()
    }

    /// Checks that every handle is in range and every domain non-empty.
    pub fn is_well_formed(&self) -> bool {
        let var_ok = |v: &Var| match *v {
            Var::Bool(b) => b.0 < self.bools.len(),
            Var::Int(i) => i.0 < self.ints.len(),
        };
        let expr_ok = |e: &LinearExpr| e.terms.iter().all(|(_, v)| var_ok(v));
        let lit_ok = |l: &Literal| l.var.0 < self.bools.len();

        self.ints.iter().all(|d| d.min <= d.max)
            && self
                .intervals
                .iter()
                .all(|iv| iv.start <= iv.end && iv.presence.as_ref().map_or(true, lit_ok))
            && self.constraints.iter().all(|c| match c {
                Constraint::Linear(lc) => expr_ok(&lc.expr),
                Constraint::Enforced {
                    enforce,
                    constraint,
                } => lit_ok(enforce) && expr_ok(&constraint.expr),
                Constraint::NoOverlap(ids) => ids.iter().all(|&i| i < self.intervals.len()),
            })
            && self.objective.as_ref().map_or(true, expr_ok)
    }

    /// Whether complete assignments satisfy every constraint and domain.
    pub fn is_satisfied(&self, bools: &[bool], ints: &[i64]) -> bool {
        if bools.len() != self.bools.len() || ints.len() != self.ints.len() {
            return false;
        }
        let in_domain = self
            .ints
            .iter()
            .zip(ints)
            .all(|(d, &v)| d.min <= v && v <= d.max);
        in_domain
            && self.constraints.iter().all(|c| match c {
                Constraint::Linear(lc) => lc.is_satisfied(bools, ints),
                Constraint::Enforced {
                    enforce,
                    constraint,
                } => !enforce.holds(bools[enforce.var.0]) || constraint.is_satisfied(bools, ints),
                Constraint::NoOverlap(ids) => {
                    let present: Vec<&IntervalVar> = ids
                        .iter()
                        .map(|&i| &self.intervals[i])
                        .filter(|iv| iv.presence.map_or(true, |l| l.holds(bools[l.var.0])))
                        .collect();
                    present
                        .iter()
                        .enumerate()
                        .all(|(i, a)| present[i + 1..].iter().all(|b| !a.overlaps(b)))
                }
            })
    }

    /// Objective value under complete assignments (0 if unset).
    pub fn objective_value(&self, bools: &[bool], ints: &[i64]) -> i64 {
        self.objective
            .as_ref()
            .map_or(0, |e| e.evaluate(bools, ints))
    }
}
