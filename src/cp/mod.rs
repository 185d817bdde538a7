//! CP-based rostering formulation.
//!
//! Translates eligibility and rules into a boolean decision model,
//! hands it to a [`CpSolver`], and decodes the chosen tuples back into
//! assignments. The exact path: every role slot is covered exactly once
//! or the run reports the solver status as a failure.
//!
//! # Reference
//! - Kohl & Karisch (2004), "Airline Crew Rostering: Problem Types,
//!   Modeling, and Optimization"
//! - Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"

mod builder;
mod model;
mod solver;

pub use builder::{Decision, RosterCpBuilder, RosterCpModel};
pub use model::{
    BoolVar, Comparison, Constraint, CpModel, IntVar, IntVarDef, IntervalVar, LinearConstraint,
    LinearExpr, Literal, Var,
};
pub use solver::{CpSolution, CpSolver, SimpleCpSolver, SolveStatus, SolverConfig};
