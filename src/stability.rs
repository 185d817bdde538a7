//! Stability-aware re-optimization support.
//!
//! A [`Baseline`] is the set of (crew, flight, role) triples of a prior
//! accepted roster, minus every triple touching a disrupted flight or an
//! excluded crew member. The caller names the exclusions explicitly.
//! The genetic path uses a baseline two ways:
//! - to seed the initial population ([`Baseline::seed`]),
//! - to reward preserved assignments ([`Baseline::stability_fraction`]).
//!
//! [`RosterChanges`] diffs two rosters for reporting.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::eligibility::Eligibility;
use crate::models::{Assignment, CrewRole, RosterAssignment};

/// Crew and flights whose baseline triples must not be reused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exclusions {
    /// Excluded crew IDs (e.g. newly sick).
    pub crew_ids: BTreeSet<String>,
    /// Excluded flight IDs (e.g. delayed or cancelled).
    pub flight_ids: BTreeSet<String>,
}

impl Exclusions {
    /// No exclusions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Excludes a crew member.
    pub fn with_crew(mut self, crew_id: impl Into<String>) -> Self {
        self.crew_ids.insert(crew_id.into());
        self
    }

    /// Excludes a flight.
    pub fn with_flight(mut self, flight_id: impl Into<String>) -> Self {
        self.flight_ids.insert(flight_id.into());
        self
    }

    /// Whether a triple touches an excluded crew member or flight.
    pub fn excludes(&self, a: &Assignment) -> bool {
        self.crew_ids.contains(&a.crew_id) || self.flight_ids.contains(&a.flight_id)
    }
}

/// Exclusion-aware baseline triples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Baseline {
    triples: BTreeSet<Assignment>,
}

impl Baseline {
    /// Builds a baseline from prior assignments, dropping excluded triples.
    pub fn new(prior: impl IntoIterator<Item = Assignment>, exclusions: &Exclusions) -> Self {
        Self {
            triples: prior
                .into_iter()
                .filter(|a| !exclusions.excludes(a))
                .collect(),
        }
    }

    /// Builds a baseline from expanded roster rows.
    pub fn from_roster(rows: &[RosterAssignment], exclusions: &Exclusions) -> Self {
        Self::new(rows.iter().map(RosterAssignment::assignment), exclusions)
    }

    /// Number of baseline triples.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Whether the baseline is empty.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Whether a triple is in the baseline.
    pub fn contains(&self, a: &Assignment) -> bool {
        self.triples.contains(a)
    }

    /// Baseline triples in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.triples.iter()
    }

    /// Fraction of baseline triples present in `genes` (0 if empty).
    pub fn stability_fraction(&self, genes: &[Assignment]) -> f64 {
        if self.triples.is_empty() {
            return 0.0;
        }
        let kept: BTreeSet<&Assignment> = genes.iter().filter(|g| self.contains(g)).collect();
        kept.len() as f64 / self.triples.len() as f64
    }

    /// Baseline triples still eligible under the current run, as genes.
    ///
    /// The result still needs the usual repair before use.
    pub fn seed(&self, eligibility: &Eligibility) -> Vec<Assignment> {
        self.triples
            .iter()
            .filter(|a| eligibility.is_eligible(&a.crew_id, &a.flight_id, a.role))
            .cloned()
            .collect()
    }
}

/// Direction of a roster change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Present only in the new roster.
    Added,
    /// Present only in the old roster.
    Removed,
}

/// One changed (crew, flight) assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewChange {
    /// Added or removed.
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// Crew member.
    pub crew_id: String,
    /// Flight.
    pub flight_id: String,
    /// Seat role.
    pub role: CrewRole,
    /// `"DEP-ARR <departure>"`.
    pub flight_details: String,
}

/// Change counts and coverage on both sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSummary {
    /// Added plus removed.
    pub total_changes: usize,
    /// Removed assignments.
    pub assignments_removed: usize,
    /// Added assignments.
    pub assignments_added: usize,
    /// Coverage of the old roster in percent.
    pub coverage_before: f64,
    /// Coverage of the new roster in percent.
    pub coverage_after: f64,
}

/// Diff of two rosters keyed by (crew, flight).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterChanges {
    /// Removed entries first, then added, each in (crew, flight) order.
    pub crew_changes: Vec<CrewChange>,
    /// Counts and coverage.
    pub summary: ChangeSummary,
}

impl RosterChanges {
    /// Diffs `before` against `after`, attaching both coverages.
    pub fn between(
        before: &[RosterAssignment],
        after: &[RosterAssignment],
        coverage_before: f64,
        coverage_after: f64,
    ) -> Self {
        let key = |r: &RosterAssignment| (r.crew_id.clone(), r.flight_id.clone());
        let old: BTreeMap<_, &RosterAssignment> = before.iter().map(|r| (key(r), r)).collect();
        let new: BTreeMap<_, &RosterAssignment> = after.iter().map(|r| (key(r), r)).collect();

        let change = |kind, r: &RosterAssignment| CrewChange {
            kind,
            crew_id: r.crew_id.clone(),
            flight_id: r.flight_id.clone(),
            role: r.role,
            flight_details: format!(
                "{}-{} {}",
                r.dep_airport,
                r.arr_airport,
                r.dep_dt.format("%Y-%m-%d %H:%M")
            ),
        };

        let mut crew_changes: Vec<CrewChange> = old
            .iter()
            .filter(|(k, _)| !new.contains_key(*k))
            .map(|(_, r)| change(ChangeKind::Removed, *r))
            .collect();
        let removed = crew_changes.len();
        crew_changes.extend(
            new.iter()
                .filter(|(k, _)| !old.contains_key(*k))
                .map(|(_, r)| change(ChangeKind::Added, *r)),
        );
        let added = crew_changes.len() - removed;

        Self {
            summary: ChangeSummary {
                total_changes: crew_changes.len(),
                assignments_removed: removed,
                assignments_added: added,
                coverage_before,
                coverage_after,
            },
            crew_changes,
        }
    }

    /// Whether the rosters are identical by (crew, flight).
    pub fn is_empty(&self) -> bool {
        self.crew_changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{apply_disruptions, Disruption};
    use crate::test_fixtures::{scenario_rotation, scenario_single_flight};

    fn cpt(crew: &str, flight: &str) -> Assignment {
        Assignment::new(crew, flight, CrewRole::Captain)
    }

    #[test]
    fn test_exclusions_drop_triples() {
        let prior = vec![cpt("CPT1", "D8O"), cpt("CPT2", "D8R"), cpt("CPT3", "D9O")];
        let ex = Exclusions::new().with_crew("CPT2").with_flight("D9O");
        let baseline = Baseline::new(prior, &ex);
        assert_eq!(baseline.len(), 1);
        assert!(baseline.contains(&cpt("CPT1", "D8O")));
    }

    #[test]
    fn test_cancelled_flight_absent_from_baseline_and_flights() {
        let problem = scenario_rotation();
        let disruptions = vec![Disruption::cancellation("D9O")];
        let flights = apply_disruptions(&problem.flights, &disruptions, None).unwrap();
        assert!(flights.iter().all(|f| f.id != "D9O"));

        let prior = vec![cpt("CPT1", "D9O"), cpt("CPT1", "D8O")];
        let baseline = Baseline::new(prior, &Exclusions::new().with_flight("D9O"));
        assert!(baseline.iter().all(|a| a.flight_id != "D9O"));
    }

    #[test]
    fn test_stability_fraction() {
        let baseline = Baseline::new(
            vec![cpt("CPT1", "D8O"), cpt("CPT2", "D8R")],
            &Exclusions::new(),
        );
        assert_eq!(baseline.stability_fraction(&[]), 0.0);
        assert_eq!(baseline.stability_fraction(&[cpt("CPT1", "D8O")]), 0.5);
        // duplicates count once
        let genes = vec![cpt("CPT1", "D8O"), cpt("CPT1", "D8O"), cpt("CPT2", "D8R")];
        assert_eq!(baseline.stability_fraction(&genes), 1.0);
        assert_eq!(Baseline::default().stability_fraction(&genes), 0.0);
    }

    #[test]
    fn test_seed_keeps_only_eligible_triples() {
        let problem = scenario_single_flight();
        let elig = Eligibility::build(&problem);
        let baseline = Baseline::new(
            vec![cpt("CPT1", "AI101"), cpt("CPT-B737", "AI101"), cpt("CPT1", "GONE")],
            &Exclusions::new(),
        );
        assert_eq!(baseline.seed(&elig), vec![cpt("CPT1", "AI101")]);
    }

    #[test]
    fn test_roster_changes() {
        let problem = scenario_rotation();
        let row = |c: &str, f: &str| {
            RosterAssignment::from_flight(&cpt(c, f), problem.flight(f).expect("fixture flight"))
        };
        let before = vec![row("CPT1", "D8O"), row("CPT2", "D8R")];
        let after = vec![row("CPT1", "D8O"), row("CPT3", "D8R")];

        let changes = RosterChanges::between(&before, &after, 100.0, 100.0);
        assert_eq!(changes.summary.total_changes, 2);
        assert_eq!(changes.summary.assignments_removed, 1);
        assert_eq!(changes.summary.assignments_added, 1);
        assert_eq!(changes.crew_changes[0].kind, ChangeKind::Removed);
        assert_eq!(changes.crew_changes[0].crew_id, "CPT2");
        assert_eq!(changes.crew_changes[1].flight_details, "BOM-DEL 2025-09-08 19:30");

        assert!(RosterChanges::between(&before, &before, 50.0, 50.0).is_empty());
    }
}
