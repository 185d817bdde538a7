//! Input validation for rostering problems.
//!
//! Checks structural integrity of flights, crew and rules before any
//! model is built. Detects:
//! - Duplicate flight or crew IDs
//! - Missing airports or aircraft types
//! - Arrivals not after departures
//! - Cabin demand below the seat-based minimum
//! - Rules tables that cannot be evaluated
//!
//! All issues are collected and returned together; a run aborts before
//! any solve attempt if the list is non-empty.

use std::collections::HashSet;
use thiserror::Error;

use crate::models::{Crew, Flight, Rules};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind:?}: {message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A required field is empty.
    MissingField,
    /// A field could not be parsed.
    MalformedField,
    /// A role string matches no known role.
    UnknownRole,
    /// Arrival is not after departure.
    InvalidTimes,
    /// Seat demand is inconsistent with composition rules.
    InvalidDemand,
    /// The rules configuration cannot be evaluated.
    InvalidRules,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input data for a rostering problem.
///
/// Checks:
/// 1. No duplicate flight IDs
/// 2. No duplicate crew IDs
/// 3. Every flight has airports, an aircraft type and `arr > dep`
/// 4. Cabin demand meets the seat-based minimum when seats are known
/// 5. Rules have a usable FDP table, WOCL factors in `[0, 1]` and a
///    positive ULH threshold
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(flights: &[Flight], crew: &[Crew], rules: &Rules) -> ValidationResult {
    let mut errors = Vec::new();

    let mut flight_ids = HashSet::new();
    for f in flights {
        if !flight_ids.insert(f.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate flight ID: {}", f.id),
            ));
        }
        if f.dep_airport.trim().is_empty() || f.arr_airport.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingField,
                format!("Flight '{}' is missing an airport code", f.id),
            ));
        }
        if f.aircraft_type.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingField,
                format!("Flight '{}' has no aircraft type", f.id),
            ));
        }
        if f.arr <= f.dep {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTimes,
                format!("Flight '{}' arrives at or before departure", f.id),
            ));
        }
        if let Some(seats) = f.seat_capacity {
            let min = rules.min_cabin_crew_for_seats(seats);
            if f.demand.cabin() < min {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidDemand,
                    format!(
                        "Flight '{}' needs at least {} cabin crew for {} seats, demand is {}",
                        f.id,
                        min,
                        seats,
                        f.demand.cabin()
                    ),
                ));
            }
        }
    }

    let mut crew_ids = HashSet::new();
    for c in crew {
        if !crew_ids.insert(c.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate crew ID: {}", c.id),
            ));
        }
        if c.base.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingField,
                format!("Crew '{}' has no home base", c.id),
            ));
        }
    }

    errors.extend(validate_rules(rules));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_rules(rules: &Rules) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut invalid = |message: String| {
        errors.push(ValidationError::new(ValidationErrorKind::InvalidRules, message));
    };

    if rules.fdp_rules.iter().filter(|r| !r.ulr).count() < 3 {
        invalid("FDP table needs at least three non-ULR rows".to_string());
    }
    for row in &rules.fdp_rules {
        if row.max_flight_time_hours <= 0.0 {
            invalid(format!(
                "FDP row has non-positive flight time {}",
                row.max_flight_time_hours
            ));
        }
    }
    let w = &rules.fdp_wocl_reduction;
    for (name, factor) in [
        ("starts_in_wocl_factor", w.starts_in_wocl_factor),
        ("overlaps_wocl_factor", w.overlaps_wocl_factor),
    ] {
        if !(0.0..=1.0).contains(&factor) {
            invalid(format!("WOCL factor {name} = {factor} is outside [0, 1]"));
        }
    }
    if rules.ulh_ft_threshold_hours <= 0.0 {
        invalid("ULH threshold must be positive".to_string());
    }
    if rules.max_consecutive_night_duties == 0 {
        invalid("max_consecutive_night_duties must be at least 1".to_string());
    }
    errors
}
