//! Aircrew rostering engine for the U-Engine ecosystem.
//!
//! Assigns crew to flights under regulatory, operational and fairness
//! constraints, and re-plans around delays, cancellations and sickness
//! while keeping as much of a prior roster as possible.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Flight`, `Crew`, `Rules`, `RosterProblem`,
//!   `Assignment`, `RosterAssignment`, `Violation`
//! - **`validation`**: Input integrity checks (duplicate IDs, times, demand)
//! - **`eligibility`**: Role slots and the (crew, flight, role) tuples both
//!   solving paths share
//! - **`cp`**: Solver-agnostic constraint model, a reference solver and the
//!   rostering encoder
//! - **`ga`**: Generic GA runner and the rostering chromosome, operators
//!   and fitness
//! - **`stability`**: Exclusion-aware baselines and roster diffs
//! - **`audit`**: Post-solve rule audit
//! - **`scheduler`**: Two-stage optimizer and KPIs
//!
//! # Architecture
//!
//! All regulatory arithmetic lives on [`models::Rules`]; the encoder, the
//! fitness/repair functions and the audit consume it identically, so the
//! two paths agree on what is legal. The library is stateless between
//! calls and never installs a tracing subscriber.
//!
//! # References
//!
//! - Kohl & Karisch (2004), "Airline Crew Rostering: Problem Types,
//!   Modeling, and Optimization"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization, and
//!   Machine Learning"

pub mod audit;
pub mod cp;
pub mod eligibility;
pub mod error;
pub mod ga;
pub mod models;
pub mod scheduler;
pub mod stability;
pub mod validation;

#[cfg(test)]
mod test_fixtures;

pub use error::RosterError;
pub use scheduler::{RosterOptimizer, RosterRequest, RosterSolution, SolveStrategy};
