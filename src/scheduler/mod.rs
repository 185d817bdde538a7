//! Roster optimization runs and KPI evaluation.
//!
//! # Algorithm
//!
//! [`RosterOptimizer`] runs an explicit two-stage protocol: a
//! stability-aware genetic search, then (when it comes back empty) the
//! exact constraint model. Each stage reports a tagged [`StageOutcome`].
//!
//! # KPI
//!
//! [`RosterKpi`] computes coverage, average hours, overtime and (on the
//! genetic path) fitness from the final assignment list.
//!
//! # References
//!
//! - Kohl & Karisch (2004), "Airline Crew Rostering: Problem Types,
//!   Modeling, and Optimization"
//! - Kohl (2003), "Solving the Integrated Airline Recovery Problem"

mod kpi;
mod optimizer;

pub use kpi::{coverage_pct, RosterKpi};
pub use optimizer::{
    Engine, RosterOptimizer, RosterRequest, RosterSolution, SolveStrategy, StageOutcome,
};
