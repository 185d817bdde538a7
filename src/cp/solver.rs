//! Solver boundary and a reference branch-and-bound solver.
//!
//! [`CpSolver`] is the seam an external CP backend plugs into.
//! [`SimpleCpSolver`] is a depth-first branch-and-bound over the boolean
//! variables with literal propagation and interval propagation of integer
//! bounds. It is complete and returns proven optima on small models; on
//! large ones it stops at the time or node limit and reports the best
//! incumbent.
//!
//! # Algorithm
//! 1. The next decision is an open literal of the first `==`/`>=` row
//!    still short of its right-hand side, tried `true` first. Once every
//!    such row is met, the remaining literals are tried `false` first.
//! 2. After each decision, literals forced by a row's slack are fixed and
//!    integer bounds are tightened, to a fixpoint.
//! 3. A node is pruned when a constraint is violated by the bounds, two
//!    present intervals overlap, or the objective lower bound cannot beat
//!    the incumbent.
//! 4. At a leaf each integer takes the bound favored by its objective
//!    coefficient and the full assignment is re-checked.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

use super::model::{Comparison, Constraint, CpModel, LinearConstraint, Var};
use super::{BoolVar, IntVar};

/// Outcome of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    /// Proven optimal (or any solution, for a model without objective).
    Optimal,
    /// A solution was found but optimality is not proven.
    Feasible,
    /// Proven to have no solution.
    Infeasible,
    /// Limits were reached before any solution was found.
    Unknown,
    /// The model references unknown variables or has empty domains.
    ModelInvalid,
}

impl SolveStatus {
    /// Whether a usable assignment accompanies this status.
    #[inline]
    pub fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::Unknown => "UNKNOWN",
            SolveStatus::ModelInvalid => "MODEL_INVALID",
        })
    }
}

/// Solver limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Wall-clock limit in seconds.
    pub time_limit_secs: f64,
    /// Parallel workers hint for backends that support it.
    pub num_workers: usize,
    /// Optional cap on search nodes.
    pub node_limit: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: 30.0,
            num_workers: 4,
            node_limit: None,
        }
    }
}

impl SolverConfig {
    /// Sets the time limit.
    pub fn with_time_limit_secs(mut self, secs: f64) -> Self {
        self.time_limit_secs = secs;
        self
    }

    /// Sets the worker hint.
    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.num_workers = n.max(1);
        self
    }

    /// Sets the node limit.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    /// The wall-clock limit. Negative and NaN limits are zero; oversized
    /// ones saturate.
    pub fn time_limit(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_limit_secs.max(0.0)).unwrap_or(Duration::MAX)
    }
}

/// Result of a solve.
#[derive(Debug, Clone, PartialEq)]
pub struct CpSolution {
    /// Outcome.
    pub status: SolveStatus,
    /// Boolean values (empty unless a solution was found).
    pub bool_values: Vec<bool>,
    /// Integer values (empty unless a solution was found).
    pub int_values: Vec<i64>,
    /// Objective value of the returned assignment.
    pub objective: Option<i64>,
    /// Search nodes explored.
    pub nodes: u64,
    /// Wall-clock time in milliseconds.
    pub solve_time_ms: u64,
}

impl CpSolution {
    /// A solution carrying only a status.
    pub fn empty(status: SolveStatus) -> Self {
        Self {
            status,
            bool_values: Vec::new(),
            int_values: Vec::new(),
            objective: None,
            nodes: 0,
            solve_time_ms: 0,
        }
    }

    /// Whether an assignment is available.
    pub fn is_solution_found(&self) -> bool {
        self.status.has_solution()
    }

    /// Value of a boolean (false if no solution).
    pub fn value(&self, var: BoolVar) -> bool {
        self.bool_values.get(var.index()).copied().unwrap_or(false)
    }

    /// Value of an integer (0 if no solution).
    pub fn int_value(&self, var: IntVar) -> i64 {
        self.int_values.get(var.index()).copied().unwrap_or(0)
    }
}

/// A constraint solver backend.
pub trait CpSolver {
    /// Solves `model` within `config`'s limits.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}

/// Depth-first branch-and-bound solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleCpSolver;

impl SimpleCpSolver {
    /// Creates the solver.
    pub fn new() -> Self {
        Self
    }
}

type Bounds = Vec<(i64, i64)>;
type Values = Vec<Option<bool>>;

struct Search<'a> {
    model: &'a CpModel,
    /// Linear rows that want literals switched on (`==` or `>=` over
    /// positive boolean terms), in declaration order.
    demand_rows: Vec<usize>,
}

/// A branching point: the state before the decision and the value left
/// to try.
struct Frame {
    values: Values,
    bounds: Bounds,
    var: usize,
    alternative: Option<bool>,
}

impl<'a> Search<'a> {
    fn new(model: &'a CpModel) -> Self {
        let demand_rows = model
            .constraints()
            .iter()
            .enumerate()
            .filter_map(|(ci, c)| match c {
                Constraint::Linear(lc)
                    if matches!(lc.cmp, Comparison::Eq | Comparison::Ge)
                        && lc
                            .expr
                            .terms
                            .iter()
                            .any(|&(k, v)| k > 0 && matches!(v, Var::Bool(_))) =>
                {
                    Some(ci)
                }
                _ => None,
            })
            .collect();
        Self { model, demand_rows }
    }

    fn bool_range(values: &[Option<bool>], var: BoolVar) -> (i64, i64) {
        match values[var.index()] {
            Some(v) => (v as i64, v as i64),
            None => (0, 1),
        }
    }

    fn term_range(values: &[Option<bool>], bounds: &Bounds, coef: i64, var: Var) -> (i64, i64) {
        let (lo, hi) = match var {
            Var::Bool(b) => Self::bool_range(values, b),
            Var::Int(i) => bounds[i.index()],
        };
        if coef >= 0 {
            (coef * lo, coef * hi)
        } else {
            (coef * hi, coef * lo)
        }
    }

    fn expr_range(values: &[Option<bool>], bounds: &Bounds, lc: &LinearConstraint) -> (i64, i64) {
        lc.expr.terms.iter().fold((0i64, 0i64), |(a, b), &(k, v)| {
            let (lo, hi) = Self::term_range(values, bounds, k, v);
            (a + lo, b + hi)
        })
    }

    fn violated(lc: &LinearConstraint, (min, max): (i64, i64)) -> bool {
        match lc.cmp {
            Comparison::Le => min > lc.rhs,
            Comparison::Ge => max < lc.rhs,
            Comparison::Eq => min > lc.rhs || max < lc.rhs,
        }
    }

    /// Whether a constraint applies under the partial assignment.
    fn is_active<'c>(values: &[Option<bool>], c: &'c Constraint) -> Option<&'c LinearConstraint> {
        match c {
            Constraint::Linear(lc) => Some(lc),
            Constraint::Enforced {
                enforce,
                constraint,
            } => match values[enforce.var.index()] {
                Some(v) if enforce.holds(v) => Some(constraint),
                _ => None,
            },
            Constraint::NoOverlap(_) => None,
        }
    }

    /// Fixes literals and tightens integer bounds to a fixpoint.
    ///
    /// A boolean term whose upper (lower) contribution alone breaks a
    /// row's slack is fixed to its other value, so a saturated `<= 1`
    /// row switches its remaining literals off and an `== 1` row with a
    /// single open literal switches it on. An enforcement literal whose
    /// constraint can no longer hold is switched off, and a present
    /// interval switches off every optional interval it overlaps.
    /// Returns `None` on a conflict.
    fn propagate(&self, values: &mut Values, mut bounds: Bounds) -> Option<Bounds> {
        loop {
            let mut changed = false;
            for c in self.model.constraints() {
                match c {
                    Constraint::NoOverlap(ids) => {
                        changed |= self.propagate_no_overlap(values, ids)?;
                        continue;
                    }
                    Constraint::Enforced {
                        enforce,
                        constraint,
                    } if values[enforce.var.index()].is_none() => {
                        let range = Self::expr_range(values, &bounds, constraint);
                        if Self::violated(constraint, range) {
                            values[enforce.var.index()] = Some(enforce.negated);
                            changed = true;
                        }
                        continue;
                    }
                    _ => {}
                }
                let Some(lc) = Self::is_active(values, c) else {
                    continue;
                };
                let (min, max) = Self::expr_range(values, &bounds, lc);
                if Self::violated(lc, (min, max)) {
                    return None;
                }
                let upper = matches!(lc.cmp, Comparison::Le | Comparison::Eq);
                let lower = matches!(lc.cmp, Comparison::Ge | Comparison::Eq);

                for &(k, v) in &lc.expr.terms {
                    let (t_lo, t_hi) = Self::term_range(values, &bounds, k, v);
                    if t_lo == t_hi {
                        continue;
                    }
                    let (rest_min, rest_max) = (min - t_lo, max - t_hi);
                    match v {
                        Var::Bool(b) => {
                            // Which value of `b` yields the low contribution.
                            let low_value = k < 0;
                            if upper && rest_min + t_hi > lc.rhs {
                                values[b.index()] = Some(low_value);
                                changed = true;
                            } else if lower && rest_max + t_lo < lc.rhs {
                                values[b.index()] = Some(!low_value);
                                changed = true;
                            }
                        }
                        Var::Int(iv) => {
                            let (mut lo, mut hi) = bounds[iv.index()];
                            // k·x ≤ rhs - rest_min
                            if upper {
                                let cap = lc.rhs - rest_min;
                                if k > 0 {
                                    hi = hi.min(cap.div_euclid(k));
                                } else {
                                    lo = lo.max(ceil_div(cap, k));
                                }
                            }
                            // k·x ≥ rhs - rest_max
                            if lower {
                                let floor = lc.rhs - rest_max;
                                if k > 0 {
                                    lo = lo.max(ceil_div(floor, k));
                                } else {
                                    hi = hi.min(floor_div(floor, k));
                                }
                            }
                            if lo > hi {
                                return None;
                            }
                            if (lo, hi) != bounds[iv.index()] {
                                bounds[iv.index()] = (lo, hi);
                                changed = true;
                            }
                        }
                    }
                }
            }
            if !changed {
                return Some(bounds);
            }
        }
    }

    /// Present intervals exclude every optional interval they overlap.
    /// `Some(changed)`, or `None` when two present intervals overlap.
    fn propagate_no_overlap(&self, values: &mut Values, ids: &[usize]) -> Option<bool> {
        let intervals = self.model.intervals();
        let present = |values: &Values, i: usize| {
            intervals[i]
                .presence
                .map_or(Some(true), |l| values[l.var.index()].map(|v| l.holds(v)))
        };
        let mut changed = false;
        for (pos, &m) in ids.iter().enumerate() {
            if present(values, m) != Some(true) {
                continue;
            }
            for (other_pos, &o) in ids.iter().enumerate() {
                if other_pos == pos || !intervals[m].overlaps(&intervals[o]) {
                    continue;
                }
                match (present(values, o), intervals[o].presence) {
                    (Some(true), _) => return None,
                    (None, Some(l)) => {
                        values[l.var.index()] = Some(l.negated);
                        changed = true;
                    }
                    _ => {}
                }
            }
        }
        Some(changed)
    }

    /// Next decision: an open literal of the first unmet demand row, tried
    /// `true` first, else the first open literal tried `false` first.
    fn branch(&self, values: &[Option<bool>], bounds: &Bounds) -> Option<(usize, bool)> {
        let constraints = self.model.constraints();
        for &ci in &self.demand_rows {
            let Constraint::Linear(lc) = &constraints[ci] else {
                continue;
            };
            if Self::expr_range(values, bounds, lc).0 >= lc.rhs {
                continue;
            }
            let open = lc.expr.terms.iter().find_map(|&(k, v)| match v {
                Var::Bool(b) if k > 0 && values[b.index()].is_none() => Some(b.index()),
                _ => None,
            });
            if let Some(var) = open {
                return Some((var, true));
            }
        }
        values.iter().position(Option::is_none).map(|var| (var, false))
    }

    /// Applies a decision and propagates it. `None` when the node is
    /// infeasible or cannot beat the incumbent.
    fn assign(
        &self,
        values: &[Option<bool>],
        bounds: &Bounds,
        var: usize,
        value: bool,
        incumbent: Option<i64>,
    ) -> Option<(Values, Bounds)> {
        let mut values = values.to_vec();
        values[var] = Some(value);
        let bounds = self.propagate(&mut values, bounds.clone())?;
        let lb = self.objective_lower_bound(&values, &bounds);
        incumbent
            .map_or(true, |best| lb < best)
            .then_some((values, bounds))
    }

    fn objective_lower_bound(&self, values: &[Option<bool>], bounds: &Bounds) -> i64 {
        self.model.objective().map_or(0, |obj| {
            obj.constant
                + obj
                    .terms
                    .iter()
                    .map(|&(k, v)| Self::term_range(values, bounds, k, v).0)
                    .sum::<i64>()
        })
    }

    /// Picks integer values at a leaf and verifies the full assignment.
    fn complete(&self, values: &[Option<bool>], bounds: &Bounds) -> Option<(Vec<bool>, Vec<i64>)> {
        let bools: Vec<bool> = values.iter().map(|v| v.unwrap_or(false)).collect();
        let mut prefer_high = vec![false; self.model.int_count()];
        if let Some(obj) = self.model.objective() {
            for &(k, v) in &obj.terms {
                if let Var::Int(iv) = v {
                    prefer_high[iv.index()] = k < 0;
                }
            }
        }
        let ints: Vec<i64> = bounds
            .iter()
            .zip(&prefer_high)
            .map(|(&(lo, hi), &high)| if high { hi } else { lo })
            .collect();
        self.model
            .is_satisfied(&bools, &ints)
            .then_some((bools, ints))
    }
}

fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if (a % b != 0) && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

fn ceil_div(a: i64, b: i64) -> i64 {
    -floor_div(-a, b)
}

impl CpSolver for SimpleCpSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let started = Instant::now();
        if !model.is_well_formed() {
            return CpSolution::empty(SolveStatus::ModelInvalid);
        }

        let search = Search::new(model);
        let root: Bounds = model.int_vars().iter().map(|d| (d.min, d.max)).collect();
        let mut root_values: Values = vec![None; model.bool_count()];
        let has_objective = model.objective().is_some();

        let mut best: Option<(Vec<bool>, Vec<i64>, i64)> = None;
        let mut nodes: u64 = 0;
        let mut interrupted = false;
        let limit = config.time_limit();

        let Some(root_bounds) = search.propagate(&mut root_values, root) else {
            return CpSolution {
                solve_time_ms: started.elapsed().as_millis() as u64,
                ..CpSolution::empty(SolveStatus::Infeasible)
            };
        };

        let mut stack: Vec<Frame> = Vec::new();
        let mut current = Some((root_values, root_bounds));
        'search: loop {
            nodes += 1;
            if config.node_limit.is_some_and(|cap| nodes > cap)
                || (nodes % 16 == 0 && started.elapsed() >= limit)
            {
                interrupted = true;
                break;
            }

            if let Some((values, bounds)) = current.take() {
                match search.branch(&values, &bounds) {
                    Some((var, first)) => {
                        let incumbent = best.as_ref().map(|(_, _, obj)| *obj);
                        current = search.assign(&values, &bounds, var, first, incumbent);
                        stack.push(Frame {
                            values,
                            bounds,
                            var,
                            alternative: Some(!first),
                        });
                        if current.is_some() {
                            continue;
                        }
                    }
                    None => {
                        if let Some((bools, ints)) = search.complete(&values, &bounds) {
                            let obj = model.objective_value(&bools, &ints);
                            if best.as_ref().map_or(true, |(_, _, b)| obj < *b) {
                                best = Some((bools, ints, obj));
                            }
                            if !has_objective {
                                break 'search;
                            }
                        }
                    }
                }
            }

            // Backtrack to the deepest decision with a value left to try.
            loop {
                let Some(frame) = stack.last_mut() else {
                    break 'search;
                };
                let Some(value) = frame.alternative.take() else {
                    stack.pop();
                    continue;
                };
                let incumbent = best.as_ref().map(|(_, _, obj)| *obj);
                current = search.assign(&frame.values, &frame.bounds, frame.var, value, incumbent);
                if current.is_some() {
                    break;
                }
            }
        }

        let status = match (&best, interrupted) {
            (Some(_), false) => SolveStatus::Optimal,
            (Some(_), true) => SolveStatus::Feasible,
            (None, false) => SolveStatus::Infeasible,
            (None, true) => SolveStatus::Unknown,
        };
        let solve_time_ms = started.elapsed().as_millis() as u64;
        debug!(
            model = %model.name,
            %status,
            nodes,
            solve_time_ms,
            "simple cp solve finished"
        );

        match best {
            Some((bool_values, int_values, obj)) => CpSolution {
                status,
                bool_values,
                int_values,
                objective: Some(obj),
                nodes,
                solve_time_ms,
            },
            None => CpSolution {
                nodes,
                solve_time_ms,
                ..CpSolution::empty(status)
            },
        }
    }
}
