//! Two-stage roster optimization.
//!
//! # Protocol
//!
//! 1. Apply disruptions and the planning window, then validate.
//! 2. Build eligibility once.
//! 3. Run the first stage ([`SolveStrategy`] decides which).
//! 4. If the genetic stage comes back [`StageOutcome::Failed`] and the
//!    strategy allows it, run the exact stage without stability terms.
//!
//! Each stage returns a tagged [`StageOutcome`]; the optimizer inspects
//! the tag to decide on the fallback. Runs share no mutable state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, warn};
use u_metaheur::ga::GaRunner;

use super::kpi::{coverage_pct, RosterKpi};
use crate::audit::audit_roster;
use crate::cp::{CpSolver, RosterCpBuilder, SimpleCpSolver, SolveStatus, SolverConfig};
use crate::eligibility::Eligibility;
use crate::error::RosterError;
use crate::ga::{GaSettings, RosterGaProblem};
use crate::models::{
    apply_disruptions, Assignment, Crew, CrewPreference, Disruption, Flight, ObjectiveWeights,
    PlanningWindow, RosterAssignment, RosterProblem, Rules, SicknessCalendar, Violation,
};
use crate::stability::{Baseline, Exclusions, RosterChanges};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Coverage below which a genetic result is reported as `FEASIBLE`.
const GA_OPTIMAL_COVERAGE_PCT: f64 = 95.0;

/// Which stages a run may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStrategy {
    /// Genetic search, then the exact model if it comes back empty.
    #[default]
    GeneticWithFallback,
    /// Genetic search only.
    GeneticOnly,
    /// Exact model only.
    ExactOnly,
}

/// Engine that produced a stage outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    /// Genetic search.
    Genetic,
    /// Exact constraint model.
    Exact,
}

/// Input container for a rostering run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterRequest {
    /// Scheduled flights before disruptions.
    pub flights: Vec<Flight>,
    /// Crew pool.
    pub crew: Vec<Crew>,
    /// Regulatory configuration.
    pub rules: Rules,
    /// Optional per-crew preferences.
    pub preferences: Vec<CrewPreference>,
    /// Per-date sickness.
    pub sickness: SicknessCalendar,
    /// Delays and cancellations to apply.
    pub disruptions: Vec<Disruption>,
    /// Departure-date filter.
    pub planning_window: Option<PlanningWindow>,
    /// Prior accepted roster.
    pub baseline: Vec<Assignment>,
    /// Baseline triples that must not be reused.
    pub exclusions: Exclusions,
    /// Objective weights.
    pub weights: ObjectiveWeights,
    /// Genetic search controls.
    pub ga: GaSettings,
    /// Exact solver controls.
    pub solver: SolverConfig,
    /// Stage selection.
    pub strategy: SolveStrategy,
}

impl RosterRequest {
    /// Creates a request with default rules, weights and controls.
    pub fn new(flights: Vec<Flight>, crew: Vec<Crew>) -> Self {
        Self {
            flights,
            crew,
            ..Self::default()
        }
    }

    /// Sets the rules.
    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }

    /// Sets crew preferences.
    pub fn with_preferences(mut self, preferences: Vec<CrewPreference>) -> Self {
        self.preferences = preferences;
        self
    }

    /// Sets per-date sickness.
    pub fn with_sickness(mut self, sickness: SicknessCalendar) -> Self {
        self.sickness = sickness;
        self
    }

    /// Sets disruptions.
    pub fn with_disruptions(mut self, disruptions: Vec<Disruption>) -> Self {
        self.disruptions = disruptions;
        self
    }

    /// Restricts the run to a planning window.
    pub fn with_planning_window(mut self, window: PlanningWindow) -> Self {
        self.planning_window = Some(window);
        self
    }

    /// Sets the prior roster and the triples to exclude from it.
    pub fn with_baseline(mut self, baseline: Vec<Assignment>, exclusions: Exclusions) -> Self {
        self.baseline = baseline;
        self.exclusions = exclusions;
        self
    }

    /// Sets objective weights.
    pub fn with_weights(mut self, weights: ObjectiveWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets genetic search controls.
    pub fn with_ga_settings(mut self, settings: GaSettings) -> Self {
        self.ga = settings;
        self
    }

    /// Sets exact solver controls.
    pub fn with_solver_config(mut self, config: SolverConfig) -> Self {
        self.solver = config;
        self
    }

    /// Sets the stage selection.
    pub fn with_strategy(mut self, strategy: SolveStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Tagged result of one solve stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    /// The stage produced a roster.
    Solved {
        /// Producing engine.
        engine: Engine,
        /// Reported status.
        status: SolveStatus,
        /// Chosen triples.
        assignments: Vec<Assignment>,
        /// Best fitness (genetic stage only).
        fitness: Option<f64>,
        /// Time limit the stage ran under.
        time_limit_secs: f64,
    },
    /// The stage produced nothing usable.
    Failed {
        /// Failing engine.
        engine: Engine,
        /// Why.
        error: RosterError,
    },
}

impl StageOutcome {
    /// Whether the stage produced a roster.
    pub fn is_solved(&self) -> bool {
        matches!(self, StageOutcome::Solved { .. })
    }

    /// Engine that ran the stage.
    pub fn engine(&self) -> Engine {
        match self {
            StageOutcome::Solved { engine, .. } | StageOutcome::Failed { engine, .. } => *engine,
        }
    }
}

/// A successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterSolution {
    /// Expanded assignments in (flight, role, crew) order.
    pub assignments: Vec<RosterAssignment>,
    /// Quality metrics.
    pub kpi: RosterKpi,
    /// Advisory rule audit of the roster.
    pub violations: Vec<Violation>,
    /// Engine that produced the roster.
    pub engine: Engine,
    /// Whether the exact stage ran after a failed genetic stage.
    pub fallback_used: bool,
    /// Flights actually rostered (post-disruption).
    pub flights: Vec<Flight>,
    /// Crew considered (available only).
    pub crew: Vec<Crew>,
    /// Distinct departure dates.
    pub operating_days: usize,
    /// Diff against the baseline, when one was given.
    pub changes: Option<RosterChanges>,
}

/// Two-stage roster optimizer.
///
/// # Example
/// ```
/// use u_roster::models::{Crew, CrewRole, Flight, SeatDemand};
/// use u_roster::cp::SimpleCpSolver;
/// use u_roster::scheduler::{RosterOptimizer, RosterRequest, SolveStrategy};
/// use chrono::NaiveDate;
///
/// let d = NaiveDate::from_ymd_opt(2025, 9, 8).unwrap();
/// let flights = vec![Flight::new(
///     "AI101", "DEL", "BOM",
///     d.and_hms_opt(8, 0, 0).unwrap(),
///     d.and_hms_opt(10, 0, 0).unwrap(),
///     "A320",
/// )
/// .with_demand(SeatDemand::new(1, 0, 0, 0))];
/// let crew = vec![Crew::new("CPT1", CrewRole::Captain, "DEL").with_type("A320")];
///
/// let request = RosterRequest::new(flights, crew).with_strategy(SolveStrategy::ExactOnly);
/// let solution = RosterOptimizer::new(SimpleCpSolver::new())
///     .optimize(&request)
///     .unwrap();
/// assert_eq!(solution.kpi.coverage_pct, 100.0);
/// ```
#[derive(Debug, Clone)]
pub struct RosterOptimizer<S = SimpleCpSolver> {
    solver: S,
}

impl Default for RosterOptimizer<SimpleCpSolver> {
    fn default() -> Self {
        Self::new(SimpleCpSolver::new())
    }
}

impl<S: CpSolver> RosterOptimizer<S> {
    /// Creates an optimizer backed by `solver` for the exact stage.
    pub fn new(solver: S) -> Self {
        Self { solver }
    }

    /// Checks the run controls of the stages `request.strategy` may use.
    ///
    /// # Errors
    /// [`RosterError::InvalidData`] listing every unusable control.
    pub fn check_controls(request: &RosterRequest) -> Result<(), RosterError> {
        let mut errors = Vec::new();
        if request.strategy != SolveStrategy::ExactOnly {
            errors.extend(request.ga.validate().err().unwrap_or_default());
        }
        let limit = request.solver.time_limit_secs;
        if request.strategy != SolveStrategy::GeneticOnly && (limit.is_nan() || limit <= 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::MalformedField,
                format!("solver.time_limit_secs must be positive, got {limit}"),
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(RosterError::InvalidData(errors))
        }
    }

    /// Checks run controls, applies disruptions and the planning window,
    /// then validates.
    ///
    /// # Errors
    /// [`RosterError::InvalidData`] when a control, a disruption or the
    /// resulting data is invalid.
    pub fn prepare(request: &RosterRequest) -> Result<RosterProblem, RosterError> {
        Self::check_controls(request)?;
        let flights = apply_disruptions(
            &request.flights,
            &request.disruptions,
            request.planning_window.as_ref(),
        )
        .map_err(RosterError::InvalidData)?;
        Ok(
            RosterProblem::new(flights, request.crew.clone(), request.rules.clone())?
                .with_preferences(request.preferences.iter().cloned())
                .with_sickness(request.sickness.clone()),
        )
    }

    /// Runs the requested stages.
    ///
    /// # Errors
    /// - [`RosterError::InvalidData`] before any stage runs.
    /// - The last stage's error when no stage produced a roster.
    pub fn optimize(&self, request: &RosterRequest) -> Result<RosterSolution, RosterError> {
        let problem = Self::prepare(request)?;
        let eligibility = Eligibility::build(&problem);
        let baseline = Baseline::new(request.baseline.iter().cloned(), &request.exclusions);
        info!(
            flights = problem.flights.len(),
            crew = problem.crew.len(),
            role_slots = eligibility.total_role_slots(),
            baseline = baseline.len(),
            strategy = ?request.strategy,
            "roster optimization started"
        );

        let (outcome, fallback_used) = match request.strategy {
            SolveStrategy::ExactOnly => (self.run_exact(&problem, &eligibility, request), false),
            SolveStrategy::GeneticOnly => {
                (Self::run_genetic(&problem, &eligibility, &baseline, request), false)
            }
            SolveStrategy::GeneticWithFallback => {
                match Self::run_genetic(&problem, &eligibility, &baseline, request) {
                    StageOutcome::Failed { error, .. } => {
                        warn!(%error, "genetic stage failed; falling back to exact model");
                        (self.run_exact(&problem, &eligibility, request), true)
                    }
                    solved => (solved, false),
                }
            }
        };

        match outcome {
            StageOutcome::Solved {
                engine,
                status,
                assignments,
                fitness,
                time_limit_secs,
            } => {
                let mut kpi_weights = request.weights.clone();
                if engine == Engine::Exact {
                    kpi_weights.stability = 0.0;
                }
                let rows = expand(&assignments, &problem);
                let mut kpi =
                    RosterKpi::calculate(status, &rows, &problem, kpi_weights, time_limit_secs);
                if let Some(f) = fitness {
                    kpi = kpi.with_fitness(f);
                }
                let changes = (!request.baseline.is_empty())
                    .then(|| baseline_changes(request, &rows, kpi.coverage_pct));
                let solution = RosterSolution {
                    violations: audit_roster(&assignments, &problem),
                    assignments: rows,
                    kpi,
                    engine,
                    fallback_used,
                    operating_days: problem.operating_days().len(),
                    crew: problem.available_crew().cloned().collect(),
                    flights: problem.flights,
                    changes,
                };
                info!(
                    engine = ?solution.engine,
                    status = %solution.kpi.status,
                    coverage_pct = solution.kpi.coverage_pct,
                    violations = solution.violations.len(),
                    "roster optimization finished"
                );
                Ok(solution)
            }
            StageOutcome::Failed { error, .. } => Err(error),
        }
    }

    /// Genetic stage: stability-aware search over repaired chromosomes.
    pub fn run_genetic(
        problem: &RosterProblem,
        eligibility: &Eligibility,
        baseline: &Baseline,
        request: &RosterRequest,
    ) -> StageOutcome {
        let failed = |reason: String| StageOutcome::Failed {
            engine: Engine::Genetic,
            error: RosterError::EmptySearchResult { reason },
        };
        let total = eligibility.total_role_slots();
        if total == 0 {
            return failed("no role slots to fill".into());
        }

        if let Err(errors) = request.ga.validate() {
            return StageOutcome::Failed {
                engine: Engine::Genetic,
                error: RosterError::InvalidData(errors),
            };
        }

        let ga = RosterGaProblem::new(problem, eligibility)
            .with_weights(request.weights.clone())
            .with_mutation_rate(request.ga.mutation_rate)
            .with_baseline(baseline);
        let result = GaRunner::run(&ga, &request.ga.runner_config());
        let fitness = -result.best_fitness;
        if result.best.is_empty() {
            let uncoverable = eligibility.uncoverable_slots().count();
            return failed(format!(
                "no viable individual ({uncoverable} of {total} role slots have no eligible crew)"
            ));
        }

        let covered = result.best.len();
        let status = if result.timed_out || coverage_pct(covered, total) < GA_OPTIMAL_COVERAGE_PCT {
            SolveStatus::Feasible
        } else {
            SolveStatus::Optimal
        };
        info!(
            generations = result.generations,
            fitness,
            timed_out = result.timed_out,
            stagnated = result.stagnated,
            covered,
            total,
            %status,
            "genetic stage finished"
        );
        StageOutcome::Solved {
            engine: Engine::Genetic,
            status,
            assignments: result.best.genes,
            fitness: Some(fitness),
            time_limit_secs: request.ga.time_budget_secs,
        }
    }

    /// Exact stage: full-coverage CP model, no stability terms.
    pub fn run_exact(
        &self,
        problem: &RosterProblem,
        eligibility: &Eligibility,
        request: &RosterRequest,
    ) -> StageOutcome {
        let weights = request.weights.clone().with_stability(0.0);
        let (assignments, solution) = RosterCpBuilder::new(problem, eligibility)
            .with_weights(weights)
            .solve(&self.solver, &request.solver);
        if !solution.is_solution_found() {
            return StageOutcome::Failed {
                engine: Engine::Exact,
                error: RosterError::InfeasibleModel {
                    status: solution.status,
                },
            };
        }
        StageOutcome::Solved {
            engine: Engine::Exact,
            status: solution.status,
            assignments,
            fitness: None,
            time_limit_secs: request.solver.time_limit_secs,
        }
    }
}

/// Expands triples into rows in (flight, role, crew) order.
fn expand(assignments: &[Assignment], problem: &RosterProblem) -> Vec<RosterAssignment> {
    let order = |flight_id: &str| {
        problem
            .flights
            .iter()
            .position(|f| f.id == flight_id)
            .unwrap_or(usize::MAX)
    };
    let mut seen = BTreeSet::new();
    let mut rows: Vec<(usize, RosterAssignment)> = assignments
        .iter()
        .filter(|a| seen.insert((a.crew_id.as_str(), a.flight_id.as_str())))
        .filter_map(|a| {
            let flight = problem.flight(&a.flight_id)?;
            Some((order(&a.flight_id), RosterAssignment::from_flight(a, flight)))
        })
        .collect();
    rows.sort_by(|(ia, a), (ib, b)| {
        ia.cmp(ib)
            .then_with(|| a.role.cmp(&b.role))
            .then_with(|| a.crew_id.cmp(&b.crew_id))
    });
    rows.into_iter().map(|(_, r)| r).collect()
}

/// Diff of the new roster against the request's baseline.
///
/// Baseline rows resolve against the pre-disruption flights, so removed
/// assignments on cancelled flights still show up.
fn baseline_changes(
    request: &RosterRequest,
    after: &[RosterAssignment],
    coverage_after: f64,
) -> RosterChanges {
    let before: Vec<RosterAssignment> = request
        .baseline
        .iter()
        .filter_map(|a| {
            let flight = request.flights.iter().find(|f| f.id == a.flight_id)?;
            Some(RosterAssignment::from_flight(a, flight))
        })
        .collect();
    let slots: usize = request.flights.iter().map(|f| f.total_required() as usize).sum();
    let covered = before
        .iter()
        .map(|r| (r.crew_id.as_str(), r.flight_id.as_str()))
        .collect::<BTreeSet<_>>()
        .len();
    RosterChanges::between(&before, after, coverage_pct(covered, slots), coverage_after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CrewRole, ViolationType};
    use crate::stability::ChangeKind;
    use crate::test_fixtures::{
        captain, problem, scenario_rotation, scenario_single_flight,
        scenario_two_flights_one_captain, two_flights,
    };

    fn optimizer() -> RosterOptimizer {
        RosterOptimizer::default()
    }

    fn request_for(problem: &RosterProblem) -> RosterRequest {
        RosterRequest::new(problem.flights.clone(), problem.crew.clone()).with_ga_settings(
            GaSettings::default()
                .with_population_size(30)
                .with_max_generations(40)
                .with_seed(42),
        )
    }

    #[test]
    fn test_genetic_single_flight_full_coverage() {
        let request = request_for(&scenario_single_flight());
        let solution = optimizer().optimize(&request).expect("solved");

        assert_eq!(solution.engine, Engine::Genetic);
        assert!(!solution.fallback_used);
        assert_eq!(solution.assignments.len(), 4);
        assert_eq!(solution.kpi.coverage_pct, 100.0);
        assert_eq!(solution.kpi.total_overtime_hours, 0.0);
        assert_eq!(solution.kpi.status, SolveStatus::Optimal);
        assert!(solution.kpi.fitness_score.is_some());
        assert!(solution.violations.is_empty());
        assert_eq!(solution.operating_days, 1);
        assert!(solution.changes.is_none());
    }

    #[test]
    fn test_exact_single_flight() {
        let request =
            request_for(&scenario_single_flight()).with_strategy(SolveStrategy::ExactOnly);
        let solution = optimizer().optimize(&request).expect("solved");

        assert_eq!(solution.engine, Engine::Exact);
        assert_eq!(solution.kpi.status, SolveStatus::Optimal);
        assert_eq!(solution.kpi.coverage_pct, 100.0);
        assert!(solution.kpi.fitness_score.is_none());
        assert_eq!(solution.kpi.weights.stability, 0.0);
        let roles: Vec<CrewRole> = solution.assignments.iter().map(|r| r.role).collect();
        assert_eq!(
            roles,
            vec![
                CrewRole::Captain,
                CrewRole::FirstOfficer,
                CrewRole::CabinCrew,
                CrewRole::CabinCrew,
            ]
        );
        // off-type crew stay in the snapshot
        assert_eq!(solution.crew.len(), 5);
    }

    #[test]
    fn test_genetic_partial_coverage_is_feasible() {
        let request = request_for(&scenario_two_flights_one_captain());
        let solution = optimizer().optimize(&request).expect("solved");

        assert_eq!(solution.assignments.len(), 1);
        assert_eq!(solution.kpi.status, SolveStatus::Feasible);
        assert_eq!(solution.kpi.coverage_pct, 50.0);
        assert!(solution
            .violations
            .iter()
            .any(|v| v.violation_type == ViolationType::UncoveredSlot));
    }

    #[test]
    fn test_exact_infeasible_is_error() {
        let request = request_for(&scenario_two_flights_one_captain())
            .with_strategy(SolveStrategy::ExactOnly);
        let err = optimizer().optimize(&request).unwrap_err();
        assert_eq!(
            err,
            RosterError::InfeasibleModel {
                status: SolveStatus::Infeasible
            }
        );
    }

    #[test]
    fn test_empty_genetic_stage_falls_back() {
        let mut b737 = captain("CPT-B737", "DEL");
        b737.qualified_types = ["B737".to_string()].into_iter().collect();
        let problem = problem(two_flights(), vec![b737]);
        let request = request_for(&problem);

        let eligibility = Eligibility::build(&problem);
        let outcome = RosterOptimizer::<SimpleCpSolver>::run_genetic(
            &problem,
            &eligibility,
            &Baseline::default(),
            &request,
        );
        assert!(!outcome.is_solved());
        assert_eq!(outcome.engine(), Engine::Genetic);

        let only = request.clone().with_strategy(SolveStrategy::GeneticOnly);
        assert!(matches!(
            optimizer().optimize(&only),
            Err(RosterError::EmptySearchResult { .. })
        ));
        // the exact fallback runs and is infeasible too
        assert!(matches!(
            optimizer().optimize(&request),
            Err(RosterError::InfeasibleModel { .. })
        ));
    }

    #[test]
    fn test_invalid_data_aborts() {
        let mut flights = two_flights();
        flights[1].id = "F1".into();
        let request = RosterRequest::new(flights, vec![captain("CPT1", "DEL")]);
        assert!(matches!(
            optimizer().optimize(&request),
            Err(RosterError::InvalidData(_))
        ));
    }

    #[test]
    fn test_reoptimization_after_cancellation() {
        let base = scenario_rotation();
        let prior: Vec<Assignment> = ["D8O", "D8R", "D9O", "D9R"]
            .iter()
            .map(|f| Assignment::new("CPT1", *f, CrewRole::Captain))
            .collect();
        let request = request_for(&base)
            .with_disruptions(vec![Disruption::cancellation("D9O")])
            .with_baseline(prior, Exclusions::new().with_flight("D9O"));

        let solution = optimizer().optimize(&request).expect("solved");
        assert!(solution.flights.iter().all(|f| f.id != "D9O"));
        assert!(solution.assignments.iter().all(|r| r.flight_id != "D9O"));
        assert_eq!(solution.kpi.total_role_slots, 10);

        let changes = solution.changes.expect("baseline diff");
        assert!(changes
            .crew_changes
            .iter()
            .any(|c| c.kind == ChangeKind::Removed && c.flight_id == "D9O"));
        assert!((changes.summary.coverage_before - 33.33).abs() < 1e-9);
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: RosterRequest =
            serde_json::from_str(r#"{"strategy":"exact_only"}"#).expect("valid json");
        assert_eq!(request.strategy, SolveStrategy::ExactOnly);
        assert!(request.flights.is_empty());
        assert_eq!(request.ga, GaSettings::default());
    }

    #[test]
    fn test_oversized_ga_budget_saturates() {
        let mut request: RosterRequest =
            serde_json::from_str(r#"{"ga":{"time_budget_secs":1e30,"population_size":20,"max_generations":10,"seed":1}}"#)
                .expect("valid json");
        let base = scenario_single_flight();
        request.flights = base.flights.clone();
        request.crew = base.crew.clone();

        let solution = optimizer().optimize(&request).expect("solved");
        assert_eq!(solution.engine, Engine::Genetic);
        assert_eq!(solution.kpi.time_limit_secs, 1e30);
    }

    #[test]
    fn test_unusable_time_limits_are_invalid_data() {
        let base = scenario_single_flight();
        for bad in [f64::NAN, 0.0, -1.0] {
            let genetic = request_for(&base)
                .with_ga_settings(GaSettings::default().with_time_budget_secs(bad));
            assert!(matches!(
                optimizer().optimize(&genetic),
                Err(RosterError::InvalidData(_))
            ));

            let exact = request_for(&base)
                .with_strategy(SolveStrategy::ExactOnly)
                .with_solver_config(SolverConfig::default().with_time_limit_secs(bad));
            assert!(matches!(
                optimizer().optimize(&exact),
                Err(RosterError::InvalidData(_))
            ));
        }
        // an exact-only run ignores genetic controls
        let exact = request_for(&base)
            .with_strategy(SolveStrategy::ExactOnly)
            .with_ga_settings(GaSettings::default().with_population_size(0));
        assert!(optimizer().optimize(&exact).is_ok());
    }

    #[test]
    fn test_overflowing_delay_is_invalid_data() {
        let base = scenario_single_flight();
        let request = request_for(&base)
            .with_disruptions(vec![Disruption::delay("AI101", i64::MAX / 1000)]);
        let Err(RosterError::InvalidData(errors)) = optimizer().optimize(&request) else {
            panic!("expected invalid data");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidTimes);
    }
}
