//! Error types for rostering runs.

use thiserror::Error;

use crate::cp::SolveStatus;
use crate::validation::ValidationError;

/// Failure of an optimization run or one of its stages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RosterError {
    /// Inputs failed validation; no solve was attempted.
    #[error("invalid input data ({} issue(s)): {}", .0.len(), summarize(.0))]
    InvalidData(Vec<ValidationError>),

    /// The exact model has no feasible solution within its limits.
    #[error("constraint model not solved: {status}")]
    InfeasibleModel {
        /// Status reported by the solver.
        status: SolveStatus,
    },

    /// The genetic search produced no viable individual.
    #[error("genetic search found no roster: {reason}")]
    EmptySearchResult {
        /// Why the search came back empty.
        reason: String,
    },
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .take(3)
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
