//! Roster quality metrics (KPIs).
//!
//! Computed from the final assignment list the same way on both solve
//! paths, so reports never depend on internal search state.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Coverage | covered role slots / total role slots, in percent |
//! | Avg hours | mean block hours over crew with at least one flight |
//! | Overtime | Σ max(0, hours − weekly cap) over crew |
//! | Fitness | best GA fitness (genetic path only) |

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::cp::SolveStatus;
use crate::models::{minutes_by_crew, ObjectiveWeights, RosterAssignment, RosterProblem};

/// Roster performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterKpi {
    /// Solve status of the accepted stage.
    pub status: SolveStatus,
    /// Weights the run used.
    pub weights: ObjectiveWeights,
    /// Time limit of the accepted stage in seconds.
    pub time_limit_secs: f64,
    /// Required seats across all flights.
    pub total_role_slots: usize,
    /// Distinct (crew, flight) assignments.
    pub covered_slots: usize,
    /// `100 · covered / total`, rounded to two decimals.
    pub coverage_pct: f64,
    /// Mean assigned block hours per rostered crew member.
    pub avg_hours: f64,
    /// Hours beyond weekly caps, summed over crew.
    pub total_overtime_hours: f64,
    /// Best GA fitness; `None` on the exact path.
    pub fitness_score: Option<f64>,
}

impl RosterKpi {
    /// Computes KPIs for an expanded roster.
    pub fn calculate(
        status: SolveStatus,
        rows: &[RosterAssignment],
        problem: &RosterProblem,
        weights: ObjectiveWeights,
        time_limit_secs: f64,
    ) -> Self {
        let total_role_slots = problem.total_role_slots();
        let covered_slots = rows
            .iter()
            .map(|r| (r.crew_id.as_str(), r.flight_id.as_str()))
            .collect::<BTreeSet<_>>()
            .len();

        let minutes = minutes_by_crew(rows);
        let avg_hours = if minutes.is_empty() {
            0.0
        } else {
            minutes.values().sum::<i64>() as f64 / 60.0 / minutes.len() as f64
        };
        let total_overtime_hours = minutes
            .iter()
            .filter_map(|(id, &m)| {
                let crew = problem.crew_member(id)?;
                let over = m - problem.rules.weekly_cap_minutes(crew);
                (over > 0).then_some(over as f64 / 60.0)
            })
            .sum();

        Self {
            status,
            weights,
            time_limit_secs,
            total_role_slots,
            covered_slots,
            coverage_pct: coverage_pct(covered_slots, total_role_slots),
            avg_hours,
            total_overtime_hours,
            fitness_score: None,
        }
    }

    /// Attaches the GA fitness.
    pub fn with_fitness(mut self, fitness: f64) -> Self {
        self.fitness_score = Some(fitness);
        self
    }

    /// Whether every role slot is covered.
    pub fn is_fully_covered(&self) -> bool {
        self.covered_slots >= self.total_role_slots
    }
}

/// `100 · covered / max(1, total)`, rounded to two decimals.
pub fn coverage_pct(covered: usize, total: usize) -> f64 {
    let raw = 100.0 * covered as f64 / total.max(1) as f64;
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignment, CrewRole};
    use crate::test_fixtures::{scenario_rotation, scenario_single_flight};

    fn rows(problem: &RosterProblem, triples: &[(&str, &str, CrewRole)]) -> Vec<RosterAssignment> {
        triples
            .iter()
            .map(|(c, f, r)| {
                let flight = problem.flight(f).expect("fixture flight");
                RosterAssignment::from_flight(&Assignment::new(*c, *f, *r), flight)
            })
            .collect()
    }

    #[test]
    fn test_kpi_full_single_flight() {
        let problem = scenario_single_flight();
        let rows = rows(
            &problem,
            &[
                ("CPT1", "AI101", CrewRole::Captain),
                ("FO1", "AI101", CrewRole::FirstOfficer),
                ("CC1", "AI101", CrewRole::CabinCrew),
                ("CC2", "AI101", CrewRole::CabinCrew),
            ],
        );
        let kpi = RosterKpi::calculate(
            SolveStatus::Optimal,
            &rows,
            &problem,
            ObjectiveWeights::default(),
            30.0,
        );
        assert_eq!(kpi.total_role_slots, 4);
        assert_eq!(kpi.covered_slots, 4);
        assert_eq!(kpi.coverage_pct, 100.0);
        assert!((kpi.avg_hours - 2.25).abs() < 1e-10);
        assert_eq!(kpi.total_overtime_hours, 0.0);
        assert!(kpi.fitness_score.is_none());
        assert!(kpi.is_fully_covered());
    }

    #[test]
    fn test_kpi_overtime_and_partial_coverage() {
        let mut problem = scenario_rotation();
        problem.crew[0].weekly_max_duty_hours = Some(2);
        let rows = rows(
            &problem,
            &[
                ("CPT1", "D8O", CrewRole::Captain),
                ("CPT1", "D8R", CrewRole::Captain),
                ("FO1", "D8O", CrewRole::FirstOfficer),
            ],
        );
        let kpi = RosterKpi::calculate(
            SolveStatus::Feasible,
            &rows,
            &problem,
            ObjectiveWeights::default(),
            300.0,
        )
        .with_fitness(250.0);
        assert_eq!(kpi.total_role_slots, 12);
        assert_eq!(kpi.coverage_pct, 25.0);
        // CPT1 3.5h, FO1 1.5h
        assert!((kpi.avg_hours - 2.5).abs() < 1e-10);
        assert!((kpi.total_overtime_hours - 1.5).abs() < 1e-10);
        assert_eq!(kpi.fitness_score, Some(250.0));
    }

    #[test]
    fn test_coverage_pct_rounding() {
        assert_eq!(coverage_pct(1, 3), 33.33);
        assert_eq!(coverage_pct(0, 0), 0.0);
        assert_eq!(coverage_pct(2, 3), 66.67);
    }
}
