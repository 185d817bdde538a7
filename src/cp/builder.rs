//! Roster encoder: eligibility and rules to a [`CpModel`].
//!
//! One boolean per eligible tuple. Every rule is encoded against the
//! shared [`Rules`](crate::models::Rules) arithmetic so the exact path
//! and the genetic path agree on what is legal.

use chrono::Duration;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::model::{Comparison, CpModel, IntVar, LinearExpr};
use super::solver::{CpSolution, CpSolver, SolverConfig};
use super::BoolVar;
use crate::eligibility::{Eligibility, EligibleTuple};
use crate::models::{Assignment, Crew, Flight, ObjectiveWeights, RosterProblem};

/// Penalty units per assignment on a requested day off.
const DAY_OFF_PENALTY: i64 = 1000;
/// Penalty units per assignment outside the preferred sectors.
const SECTOR_PENALTY: i64 = 1;
/// Penalty units per crew-day not ending at base.
const BASE_RETURN_PENALTY: i64 = 100;

/// A decision variable and the tuple it selects.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// The eligible tuple.
    pub tuple: EligibleTuple,
    /// Its boolean.
    pub var: BoolVar,
}

/// A built model with its variable map.
#[derive(Debug, Clone)]
pub struct RosterCpModel {
    /// The constraint model.
    pub model: CpModel,
    /// Decision variables in eligible-tuple order.
    pub decisions: Vec<Decision>,
    /// Overtime minutes per crew member.
    pub overtime: Vec<(String, IntVar)>,
}

/// Builds a CP model from a rostering problem.
///
/// # Example
/// ```no_run
/// use u_roster::cp::{RosterCpBuilder, SimpleCpSolver, SolverConfig};
/// use u_roster::eligibility::Eligibility;
/// # fn demo(problem: &u_roster::models::RosterProblem) {
/// let eligibility = Eligibility::build(problem);
/// let builder = RosterCpBuilder::new(problem, &eligibility);
/// let (assignments, solution) = builder.solve(&SimpleCpSolver::new(), &SolverConfig::default());
/// # }
/// ```
pub struct RosterCpBuilder<'a> {
    problem: &'a RosterProblem,
    eligibility: &'a Eligibility,
    weights: ObjectiveWeights,
}

/// Per-crew view of the decision variables.
struct CrewVars<'a> {
    crew: &'a Crew,
    /// Distinct potential flights sorted by departure.
    flights: Vec<&'a Flight>,
    /// Decision variables per flight ID.
    by_flight: BTreeMap<&'a str, Vec<BoolVar>>,
}

impl<'a> CrewVars<'a> {
    fn vars_of(&self, flight_id: &str) -> &[BoolVar] {
        self.by_flight
            .get(flight_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn sum_of<'f>(&self, flights: impl IntoIterator<Item = &'f Flight>) -> LinearExpr {
        flights.into_iter().fold(LinearExpr::new(), |e, f| {
            self.vars_of(&f.id)
                .iter()
                .fold(e, |e, &v| e.add_bool(1, v))
        })
    }

    fn minutes_of<'f>(&self, flights: impl IntoIterator<Item = &'f Flight>) -> LinearExpr {
        flights.into_iter().fold(LinearExpr::new(), |e, f| {
            let m = f.duration_minutes();
            self.vars_of(&f.id)
                .iter()
                .fold(e, |e, &v| e.add_bool(m, v))
        })
    }

    fn max_minutes(&self) -> i64 {
        self.flights.iter().map(|f| f.duration_minutes()).sum()
    }
}

fn scaled(weight: f64, units: i64) -> i64 {
    (weight * units as f64).round() as i64
}

impl<'a> RosterCpBuilder<'a> {
    /// Creates a builder with default objective weights.
    pub fn new(problem: &'a RosterProblem, eligibility: &'a Eligibility) -> Self {
        Self {
            problem,
            eligibility,
            weights: ObjectiveWeights::default(),
        }
    }

    /// Sets the objective weights.
    pub fn with_weights(mut self, weights: ObjectiveWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Builds the model.
    ///
    /// Creates, in order:
    /// - a boolean per eligible tuple,
    /// - coverage, single-seat and SCCM constraints,
    /// - per crew: no-overlap, minimum rest, night limits, daily duty
    ///   caps with FDP brackets and WOCL reduction, weekly overtime,
    ///   7-day flight-time cap, continuity and base return,
    /// - fairness deviations and the weighted objective.
    pub fn build(&self) -> RosterCpModel {
        let problem = self.problem;
        let rules = &problem.rules;
        let mut model = CpModel::new("roster");
        let mut objective = LinearExpr::new();

        let epoch = problem
            .flights
            .first()
            .map(|f| f.dep)
            .unwrap_or_default();

        // Decision variables
        let mut decisions = Vec::with_capacity(self.eligibility.eligible.len());
        let mut by_slot: BTreeMap<(&str, _, u32), Vec<BoolVar>> = BTreeMap::new();
        let mut by_crew: BTreeMap<&str, BTreeMap<&str, Vec<BoolVar>>> = BTreeMap::new();
        for t in &self.eligibility.eligible {
            let var = model.new_bool_var(format!(
                "x_{}_{}_{}_{}",
                t.crew_id, t.flight_id, t.role, t.slot_index
            ));
            by_slot
                .entry((t.flight_id.as_str(), t.role, t.slot_index))
                .or_default()
                .push(var);
            by_crew
                .entry(t.crew_id.as_str())
                .or_default()
                .entry(t.flight_id.as_str())
                .or_default()
                .push(var);
            decisions.push(Decision {
                tuple: t.clone(),
                var,
            });
        }

        // Coverage: exactly one crew per role slot
        for slot in &self.eligibility.role_slots {
            let vars = by_slot
                .get(&(slot.flight_id.as_str(), slot.role, slot.slot_index))
                .cloned()
                .unwrap_or_default();
            model.add_eq(LinearExpr::sum(vars), 1);
        }

        // Per-crew views, in problem order
        let crew_vars: Vec<CrewVars> = problem
            .available_crew()
            .map(|crew| {
                let by_flight = by_crew.remove(crew.id.as_str()).unwrap_or_default();
                let flights = problem
                    .flights
                    .iter()
                    .filter(|f| by_flight.contains_key(f.id.as_str()))
                    .collect();
                CrewVars {
                    crew,
                    flights,
                    by_flight,
                }
            })
            .collect();

        // Single seat per flight
        for cv in &crew_vars {
            for vars in cv.by_flight.values().filter(|v| v.len() > 1) {
                model.add_le(LinearExpr::sum(vars.iter().copied()), 1);
            }
        }

        self.add_sccm(&mut model, &crew_vars);

        let brackets = rules.landing_brackets();
        let max_nights = rules.max_consecutive_night_duties as i64;
        let mut totals: Vec<IntVar> = Vec::with_capacity(crew_vars.len());
        let mut overtime = Vec::with_capacity(crew_vars.len());

        for cv in &crew_vars {
            let crew = cv.crew;
            let cid = crew.id.as_str();

            // No-overlap with turnaround padding
            let turnaround = rules.turnaround_minutes as i64;
            let mut intervals = Vec::new();
            for f in &cv.flights {
                for &v in cv.vars_of(&f.id) {
                    intervals.push(model.new_optional_interval(
                        format!("iv_{cid}_{}", f.id),
                        f.dep_offset(epoch),
                        f.arr_offset(epoch) + turnaround,
                        v,
                    ));
                }
            }
            model.add_no_overlap(intervals);

            // Minimum rest between any two close flights
            for (i, a) in cv.flights.iter().enumerate() {
                for b in &cv.flights[i + 1..] {
                    if !rules.rest_insufficient(a, b) {
                        break;
                    }
                    model.add_le(cv.sum_of([*a, *b]), 1);
                }
            }

            // Night duties: weekly count and consecutive-date runs
            let nights: Vec<&Flight> = cv
                .flights
                .iter()
                .copied()
                .filter(|f| rules.is_night_duty(f))
                .collect();
            if !nights.is_empty() {
                model.add_le(
                    cv.sum_of(nights.iter().copied()),
                    rules.max_overnight_duties_per_week as i64,
                );
                let mut night_days = BTreeMap::new();
                for f in &nights {
                    let day = f.operating_day();
                    let ind = *night_days
                        .entry(day)
                        .or_insert_with(|| model.new_bool_var(format!("night_{cid}_{day}")));
                    for &v in cv.vars_of(&f.id) {
                        model.add_le(LinearExpr::new().add_bool(1, v).add_bool(-1, ind), 0);
                    }
                }
                for &start in night_days.keys() {
                    let end = start + Duration::days(max_nights);
                    let run: Vec<BoolVar> = night_days
                        .range(start..=end)
                        .map(|(_, &ind)| ind)
                        .collect();
                    if run.len() as i64 > max_nights {
                        model.add_le(LinearExpr::sum(run), max_nights);
                    }
                }
            }

            // Daily duty cap with FDP brackets and WOCL reduction
            let cap = rules.daily_cap_minutes(crew.role);
            let (full, half) = rules.wocl_reductions(crew.role);
            let mut days: BTreeMap<_, Vec<&Flight>> = BTreeMap::new();
            for f in &cv.flights {
                days.entry(f.operating_day()).or_default().push(*f);
            }
            for (day, flights) in &days {
                let duty = model.new_int_var(format!("duty_{cid}_{day}"), 0, cap);
                model.add_eq(
                    LinearExpr::new()
                        .add_int(1, duty)
                        .add_scaled(-1, &cv.minutes_of(flights.iter().copied())),
                    0,
                );
                let duty_expr = LinearExpr::new().add_int(1, duty);
                let landings = cv.sum_of(flights.iter().copied());

                let b_short = model.new_bool_var(format!("ft_le_{}_{cid}_{day}", brackets.first_threshold));
                let b_mid = model.new_bool_var(format!("ft_mid_{cid}_{day}"));
                let b_long = model.new_bool_var(format!("ft_gt_{}_{cid}_{day}", brackets.second_threshold));
                model.add_eq(LinearExpr::sum([b_short, b_mid, b_long]), 1);

                let (t1, t2) = (brackets.first_threshold, brackets.second_threshold);
                model.add_enforced(b_short, duty_expr.clone(), Comparison::Le, t1);
                model.add_enforced(b_short.not(), duty_expr.clone(), Comparison::Ge, t1 + 1);
                model.add_enforced(b_mid, duty_expr.clone(), Comparison::Ge, t1 + 1);
                model.add_enforced(b_mid, duty_expr.clone(), Comparison::Le, t2);
                model.add_enforced(b_long, duty_expr.clone(), Comparison::Ge, t2 + 1);
                model.add_enforced(b_long.not(), duty_expr.clone(), Comparison::Le, t2);
                for (b, limit) in [b_short, b_mid, b_long].into_iter().zip(brackets.landings) {
                    model.add_enforced(b, landings.clone(), Comparison::Le, limit as i64);
                }

                let starts: Vec<&Flight> = flights
                    .iter()
                    .copied()
                    .filter(|f| rules.starts_in_wocl(f))
                    .collect();
                let touches: Vec<&Flight> = flights
                    .iter()
                    .copied()
                    .filter(|f| rules.overlaps_wocl(f))
                    .collect();
                for (name, group, reduction) in
                    [("wocl_start", starts, full), ("wocl_overlap", touches, half)]
                {
                    if group.is_empty() || reduction == 0 {
                        continue;
                    }
                    let ind = model.new_bool_var(format!("{name}_{cid}_{day}"));
                    for f in group {
                        for &v in cv.vars_of(&f.id) {
                            model.add_le(LinearExpr::new().add_bool(1, v).add_bool(-1, ind), 0);
                        }
                    }
                    model.add_enforced(ind, duty_expr.clone(), Comparison::Le, cap - reduction);
                }
            }

            // Weekly overtime (soft) and 7-day flight time (hard)
            let max_total = cv.max_minutes();
            let weekly = rules.weekly_cap_minutes(crew);
            let total = model.new_int_var(format!("total_{cid}"), 0, max_total);
            model.add_eq(
                LinearExpr::new()
                    .add_int(1, total)
                    .add_scaled(-1, &cv.minutes_of(cv.flights.iter().copied())),
                0,
            );
            let ot = model.new_int_var(format!("ot_{cid}"), 0, (max_total - weekly).max(0));
            model.add_ge(LinearExpr::new().add_int(1, ot).add_int(-1, total), -weekly);
            objective = objective.add_int(scaled(self.weights.overtime, 1), ot);
            totals.push(total);
            overtime.push((crew.id.clone(), ot));

            let cap_7d = rules.flight_time_cap_7d_minutes();
            if max_total > cap_7d {
                for &start in days.keys() {
                    let end = start + Duration::days(6);
                    let window = cv
                        .flights
                        .iter()
                        .copied()
                        .filter(|f| (start..=end).contains(&f.operating_day()));
                    model.add_le(cv.minutes_of(window), cap_7d);
                }
            }

            // Location continuity between adjacent potential flights
            for pair in cv.flights.windows(2) {
                if !pair[1].continues_from(pair[0]) {
                    model.add_le(cv.sum_of([pair[0], pair[1]]), 1);
                }
            }

            // Base return: last chosen flight of the day should end at base
            for (day, flights) in &days {
                let mut penalty = None;
                for (i, f) in flights.iter().enumerate() {
                    if f.arr_airport == crew.base {
                        continue;
                    }
                    let pen = *penalty.get_or_insert_with(|| {
                        model.new_int_var(format!("base_{cid}_{day}"), 0, 1)
                    });
                    let expr = LinearExpr::new()
                        .add_int(1, pen)
                        .add_scaled(-1, &cv.sum_of([*f]))
                        .add_scaled(1, &cv.sum_of(flights[i + 1..].iter().copied()));
                    model.add_ge(expr, 0);
                }
                if let Some(pen) = penalty {
                    objective = objective.add_int(
                        scaled(self.weights.base_return, BASE_RETURN_PENALTY),
                        pen,
                    );
                }
            }

            // Preferences
            if let Some(pref) = problem.preference(cid) {
                for f in &cv.flights {
                    let mut units = 0;
                    if pref.requested_days_off.contains(&f.operating_day()) {
                        units += DAY_OFF_PENALTY;
                    }
                    if pref.dislikes_sector(&f.sector()) {
                        units += SECTOR_PENALTY;
                    }
                    let coef = scaled(self.weights.preference, units);
                    if coef != 0 {
                        for &v in cv.vars_of(&f.id) {
                            objective = objective.add_bool(coef, v);
                        }
                    }
                }
            }
        }

        // Fairness: n·total_c against the sum of totals
        let n = totals.len() as i64;
        if n > 1 {
            let sum_totals = totals
                .iter()
                .fold(LinearExpr::new(), |e, &t| e.add_int(1, t));
            let bound = n * crew_vars.iter().map(CrewVars::max_minutes).sum::<i64>();
            let w_fair = scaled(self.weights.fairness, 1);
            for (cv, &total) in crew_vars.iter().zip(&totals) {
                let cid = &cv.crew.id;
                let pos = model.new_int_var(format!("dev_pos_{cid}"), 0, bound);
                let neg = model.new_int_var(format!("dev_neg_{cid}"), 0, bound);
                model.add_ge(
                    LinearExpr::new()
                        .add_int(1, pos)
                        .add_int(-n, total)
                        .add_scaled(1, &sum_totals),
                    0,
                );
                model.add_ge(
                    LinearExpr::new()
                        .add_int(1, neg)
                        .add_int(n, total)
                        .add_scaled(-1, &sum_totals),
                    0,
                );
                objective = objective.add_int(w_fair, pos).add_int(w_fair, neg);
            }
        }

        model.minimize(objective);
        debug!(
            decisions = decisions.len(),
            bools = model.bool_count(),
            ints = model.int_count(),
            intervals = model.interval_count(),
            constraints = model.constraint_count(),
            "cp model built"
        );

        RosterCpModel {
            model,
            decisions,
            overtime,
        }
    }

    /// SCCM coverage on flights whose cabin demand exceeds one.
    fn add_sccm(&self, model: &mut CpModel, crew_vars: &[CrewVars]) {
        let rules = &self.problem.rules;
        for f in &self.problem.flights {
            let required = rules.sccm_required(f);
            if required == 0 {
                continue;
            }
            let vars: Vec<BoolVar> = crew_vars
                .iter()
                .filter(|cv| cv.crew.role.is_cabin() && rules.is_sccm_qualified(cv.crew))
                .flat_map(|cv| cv.vars_of(&f.id).iter().copied())
                .collect();
            if !vars.is_empty() {
                model.add_ge(LinearExpr::sum(vars), required as i64);
            }
        }
    }

    /// Builds, solves and decodes.
    ///
    /// Assignments are empty unless the solver returned a solution.
    pub fn solve<S: CpSolver>(
        &self,
        solver: &S,
        config: &SolverConfig,
    ) -> (Vec<Assignment>, CpSolution) {
        let encoded = self.build();
        let solution = solver.solve(&encoded.model, config);
        info!(
            status = %solution.status,
            objective = ?solution.objective,
            solve_time_ms = solution.solve_time_ms,
            "cp solve finished"
        );
        let assignments = Self::decode_solution(&encoded, &solution);
        (assignments, solution)
    }

    /// Decodes the chosen tuples of a solution.
    pub fn decode_solution(encoded: &RosterCpModel, solution: &CpSolution) -> Vec<Assignment> {
        if !solution.is_solution_found() {
            return Vec::new();
        }
        encoded
            .decisions
            .iter()
            .filter(|d| solution.value(d.var))
            .map(|d| Assignment::new(&d.tuple.crew_id, &d.tuple.flight_id, d.tuple.role))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::audit_roster;
    use crate::cp::{SimpleCpSolver, SolveStatus};
    use crate::models::{CrewPreference, CrewRole, SeatDemand, ViolationType};
    use crate::test_fixtures::{
        at, captain, day, first_officer, problem, scenario_single_flight,
        scenario_two_flights_one_captain, two_flights,
    };

    fn solve(problem: &RosterProblem) -> (Vec<Assignment>, CpSolution) {
        let elig = Eligibility::build(problem);
        RosterCpBuilder::new(problem, &elig).solve(&SimpleCpSolver::new(), &SolverConfig::default())
    }

    fn crew_on<'a>(assignments: &'a [Assignment], flight: &str) -> Vec<&'a str> {
        assignments
            .iter()
            .filter(|a| a.flight_id == flight)
            .map(|a| a.crew_id.as_str())
            .collect()
    }

    #[test]
    fn test_build_model() {
        let problem = scenario_single_flight();
        let elig = Eligibility::build(&problem);
        let encoded = RosterCpBuilder::new(&problem, &elig).build();

        assert_eq!(encoded.decisions.len(), 6);
        assert!(encoded.model.bool_count() >= 6);
        // one overtime variable per available crew member
        assert_eq!(encoded.overtime.len(), 5);
        assert!(encoded.model.is_well_formed());
    }

    #[test]
    fn test_single_flight_full_coverage() {
        let (assignments, solution) = solve(&scenario_single_flight());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(assignments.len(), 4);
        let mut crew = crew_on(&assignments, "AI101");
        crew.sort_unstable();
        assert_eq!(crew, vec!["CC1", "CC2", "CPT1", "FO1"]);
    }

    #[test]
    fn test_overlap_with_turnaround_is_infeasible_for_one_captain() {
        let (assignments, solution) = solve(&scenario_two_flights_one_captain());
        assert_eq!(solution.status, SolveStatus::Infeasible);
        assert!(assignments.is_empty());
    }

    #[test]
    fn test_two_captains_split_close_flights() {
        let problem = problem(
            two_flights(),
            vec![captain("CPT1", "DEL"), captain("CPT2", "DEL")],
        );
        let (assignments, solution) = solve(&problem);
        assert!(solution.is_solution_found());
        assert_eq!(assignments.len(), 2);
        assert_ne!(crew_on(&assignments, "F1"), crew_on(&assignments, "F2"));
    }

    #[test]
    fn test_continuity_breaks_are_exclusive() {
        let flights = vec![
            Flight::new("F1", "DEL", "BOM", at(8, 8, 0), at(8, 10, 0), "A320")
                .with_demand(SeatDemand::new(1, 0, 0, 0)),
            Flight::new("F2", "DEL", "HYD", at(9, 8, 0), at(9, 10, 0), "A320")
                .with_demand(SeatDemand::new(1, 0, 0, 0)),
        ];
        let problem = problem(flights, vec![captain("CPT1", "DEL"), captain("CPT2", "DEL")]);
        let (assignments, solution) = solve(&problem);
        assert!(solution.is_solution_found());
        assert_ne!(crew_on(&assignments, "F1"), crew_on(&assignments, "F2"));
    }

    #[test]
    fn test_day_off_preference_steers_choice() {
        let flights = vec![
            Flight::new("F1", "DEL", "BOM", at(8, 8, 0), at(8, 10, 0), "A320")
                .with_demand(SeatDemand::new(1, 0, 0, 0)),
        ];
        let problem = problem(flights, vec![captain("CPT1", "BOM"), captain("CPT2", "BOM")])
            .with_preferences([CrewPreference::new("CPT1").with_day_off(day(8))]);
        let (assignments, _) = solve(&problem);
        assert_eq!(crew_on(&assignments, "F1"), vec!["CPT2"]);
    }

    #[test]
    fn test_base_return_prefers_crew_based_at_arrival() {
        let flights = vec![
            Flight::new("F1", "DEL", "BOM", at(8, 8, 0), at(8, 10, 0), "A320")
                .with_demand(SeatDemand::new(1, 0, 0, 0)),
        ];
        let problem = problem(flights, vec![captain("CPT-DEL", "DEL"), captain("CPT-BOM", "BOM")]);
        let (assignments, solution) = solve(&problem);
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(crew_on(&assignments, "F1"), vec!["CPT-BOM"]);
    }

    #[test]
    fn test_sccm_required_on_multi_cabin_flight() {
        let flights = vec![
            Flight::new("F1", "DEL", "BOM", at(8, 8, 0), at(8, 10, 0), "A320")
                .with_demand(SeatDemand::new(0, 0, 0, 2)),
        ];
        let crew = vec![
            Crew::new("CC-A", CrewRole::CabinCrew, "BOM").with_type("A320"),
            Crew::new("CC-B", CrewRole::CabinCrew, "BOM").with_type("A320"),
            Crew::new("CC-S", CrewRole::CabinCrew, "BOM")
                .with_type("A320")
                .with_sccm(true, 36),
        ];
        let (assignments, solution) = solve(&problem(flights, crew));
        assert!(solution.is_solution_found());
        assert!(crew_on(&assignments, "F1").contains(&"CC-S"));
    }

    #[test]
    fn test_wocl_start_reduces_daily_cap() {
        // 9h block starting 03:00 exceeds the 10h cap less the 4h WOCL
        let early = vec![
            Flight::new("F1", "DEL", "BOM", at(8, 3, 0), at(8, 12, 0), "A320")
                .with_demand(SeatDemand::new(1, 0, 0, 0)),
        ];
        let (_, solution) = solve(&problem(early, vec![captain("CPT1", "BOM")]));
        assert_eq!(solution.status, SolveStatus::Infeasible);

        let daytime = vec![
            Flight::new("F1", "DEL", "BOM", at(8, 7, 0), at(8, 16, 0), "A320")
                .with_demand(SeatDemand::new(1, 0, 0, 0)),
        ];
        let (_, solution) = solve(&problem(daytime, vec![captain("CPT1", "BOM")]));
        assert_eq!(solution.status, SolveStatus::Optimal);
    }

    #[test]
    fn test_consecutive_night_limit() {
        let flights = vec![
            Flight::new("N1", "DEL", "BOM", at(8, 23, 0), at(9, 0, 30), "A320")
                .with_demand(SeatDemand::new(1, 0, 0, 0)),
            Flight::new("N2", "BOM", "DEL", at(9, 23, 0), at(10, 0, 30), "A320")
                .with_demand(SeatDemand::new(1, 0, 0, 0)),
        ];
        let mut strict = problem(flights.clone(), vec![captain("CPT1", "DEL")]);
        strict.rules.max_consecutive_night_duties = 1;
        let (_, solution) = solve(&strict);
        assert_eq!(solution.status, SolveStatus::Infeasible);

        let relaxed = problem(flights, vec![captain("CPT1", "DEL")]);
        let (assignments, solution) = solve(&relaxed);
        assert!(solution.is_solution_found());
        assert_eq!(assignments.len(), 2);
    }

    #[test]
    fn test_min_rest_splits_close_rotation() {
        // B departs 4h after A lands, below the 12h rest floor
        let flights = vec![
            Flight::new("A", "DEL", "BOM", at(8, 8, 0), at(8, 10, 0), "A320")
                .with_demand(SeatDemand::new(1, 0, 0, 0)),
            Flight::new("B", "BOM", "DEL", at(8, 14, 0), at(8, 16, 0), "A320")
                .with_demand(SeatDemand::new(1, 0, 0, 0)),
        ];
        let (_, solution) = solve(&problem(flights.clone(), vec![captain("CPT1", "DEL")]));
        assert_eq!(solution.status, SolveStatus::Infeasible);

        let pair = problem(flights, vec![captain("CPT1", "DEL"), captain("CPT2", "DEL")]);
        let (assignments, solution) = solve(&pair);
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(assignments.len(), 2);
        assert_ne!(crew_on(&assignments, "A"), crew_on(&assignments, "B"));
    }

    #[test]
    fn test_ulh_flight_needs_two_sccm() {
        let flights = vec![
            Flight::new("U1", "DEL", "BOM", at(8, 8, 0), at(8, 14, 0), "A320")
                .with_demand(SeatDemand::new(0, 0, 0, 3)),
        ];
        let cabin = |id: &str| Crew::new(id, CrewRole::CabinCrew, "BOM").with_type("A320");
        let sccm = |id: &str| cabin(id).with_sccm(true, 36);
        let ulh = |crew: Vec<Crew>| {
            let mut p = problem(flights.clone(), crew);
            p.rules.ulh_ft_threshold_hours = 5.0;
            p
        };

        let two = ulh(vec![cabin("CC-A"), cabin("CC-B"), sccm("CC-S1"), sccm("CC-S2")]);
        assert_eq!(two.rules.sccm_required(&two.flights[0]), 2);
        let (assignments, solution) = solve(&two);
        assert!(solution.is_solution_found());
        let on_board = crew_on(&assignments, "U1");
        assert_eq!(on_board.len(), 3);
        assert!(on_board.contains(&"CC-S1") && on_board.contains(&"CC-S2"));

        let one = ulh(vec![cabin("CC-A"), cabin("CC-B"), sccm("CC-S1")]);
        let (_, solution) = solve(&one);
        assert_eq!(solution.status, SolveStatus::Infeasible);
    }

    #[test]
    fn test_multi_day_fleet_solves_within_node_limit() {
        // 5 days of out-and-back, each leg needing 1 CPT, 1 FO and 2 CC
        let mut flights = Vec::new();
        for d in 8..=12 {
            flights.push(
                Flight::new(format!("O{d}"), "DEL", "BOM", at(d, 7, 0), at(d, 9, 0), "A320")
                    .with_demand(SeatDemand::new(1, 1, 0, 2)),
            );
            flights.push(
                Flight::new(format!("R{d}"), "BOM", "DEL", at(d, 21, 0), at(d, 22, 0), "A320")
                    .with_demand(SeatDemand::new(1, 1, 0, 2)),
            );
        }
        let mut crew = Vec::new();
        for n in 1..=6 {
            crew.push(captain(&format!("CPT{n}"), "DEL"));
            crew.push(first_officer(&format!("FO{n}"), "DEL"));
            let cc = Crew::new(format!("CC{n}"), CrewRole::CabinCrew, "DEL").with_type("A320");
            crew.push(if n <= 3 { cc.with_sccm(true, 36) } else { cc });
        }
        let fleet = problem(flights, crew);
        let elig = Eligibility::build(&fleet);
        let config = SolverConfig::default().with_node_limit(500);
        let (assignments, solution) =
            RosterCpBuilder::new(&fleet, &elig).solve(&SimpleCpSolver::new(), &config);

        assert!(solution.is_solution_found(), "status {}", solution.status);
        assert_eq!(assignments.len(), 40);
        for f in &fleet.flights {
            assert_eq!(crew_on(&assignments, &f.id).len(), 4, "flight {}", f.id);
        }
        let violations = audit_roster(&assignments, &fleet);
        assert!(violations.iter().all(|v| !matches!(
            v.violation_type,
            ViolationType::RestShortfall
                | ViolationType::Overlap
                | ViolationType::UncoveredSlot
                | ViolationType::SccmShortfall
        )));
    }

    #[test]
    fn test_decode_empty_without_solution() {
        let problem = scenario_single_flight();
        let elig = Eligibility::build(&problem);
        let encoded = RosterCpBuilder::new(&problem, &elig).build();
        let none = CpSolution::empty(SolveStatus::Unknown);
        assert!(RosterCpBuilder::decode_solution(&encoded, &none).is_empty());
    }
}
