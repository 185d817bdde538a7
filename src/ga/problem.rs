//! Rostering GA problem definition.
//!
//! Implements `u_metaheur::ga::GaProblem` over [`RosterChromosome`]s.
//! The roster score (higher is better) is:
//!
//! ```text
//! 1000·coverage − 0.1·w_ot·overtime_h + 0.1·w_fair·fairness
//!   − w_cont·continuity_breaks − 0.01·w_base·days_away
//!   + w_stab·stability_fraction
//! ```
//!
//! floored at 0.1 for any non-empty chromosome; an empty chromosome
//! scores −∞. The runner minimizes, so individuals are evaluated at the
//! negated score.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;
use tracing::debug;
use u_metaheur::ga::GaProblem;

use super::chromosome::{itineraries, reassign_mutation, repair, single_point_crossover, RosterChromosome};
use crate::eligibility::Eligibility;
use crate::models::{Assignment, ObjectiveWeights, RosterProblem};
use crate::stability::Baseline;

/// Lowest fitness of a non-empty chromosome.
pub const FITNESS_FLOOR: f64 = 0.1;

/// Fitness terms of one chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FitnessBreakdown {
    /// Covered share of role slots in `[0, 1]`.
    pub coverage: f64,
    /// Hours beyond weekly caps, summed over crew.
    pub overtime_hours: f64,
    /// `1 − std/mean` of per-crew hours, clamped to `[0, 1]`.
    pub fairness: f64,
    /// Adjacent flight pairs breaking the airport chain.
    pub continuity_breaks: usize,
    /// Crew-days whose last arrival is away from base.
    pub days_away_from_base: usize,
    /// Share of baseline triples kept.
    pub stability: f64,
}

/// GA problem for crew rostering.
///
/// # Example
/// ```no_run
/// use u_roster::eligibility::Eligibility;
/// use u_metaheur::ga::GaRunner;
/// use u_roster::ga::{GaSettings, RosterGaProblem};
/// # fn demo(problem: &u_roster::models::RosterProblem) {
/// let settings = GaSettings::default().with_seed(42);
/// let eligibility = Eligibility::build(problem);
/// let ga = RosterGaProblem::new(problem, &eligibility)
///     .with_mutation_rate(settings.mutation_rate);
/// let result = GaRunner::run(&ga, &settings.runner_config());
/// let score = -result.best_fitness;
/// # }
/// ```
pub struct RosterGaProblem<'a> {
    problem: &'a RosterProblem,
    eligibility: &'a Eligibility,
    weights: ObjectiveWeights,
    baseline: Option<&'a Baseline>,
    mutation_rate: f64,
    /// Set once the baseline seed has been handed out.
    seeded: AtomicBool,
}

impl<'a> RosterGaProblem<'a> {
    /// Creates the problem with default weights and no baseline.
    pub fn new(problem: &'a RosterProblem, eligibility: &'a Eligibility) -> Self {
        Self {
            problem,
            eligibility,
            weights: ObjectiveWeights::default(),
            baseline: None,
            mutation_rate: 0.1,
            seeded: AtomicBool::new(false),
        }
    }

    /// Sets the per-gene reassignment probability.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the objective weights.
    pub fn with_weights(mut self, weights: ObjectiveWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Seeds from and rewards agreement with a prior roster.
    pub fn with_baseline(mut self, baseline: &'a Baseline) -> Self {
        self.baseline = Some(baseline).filter(|b| !b.is_empty());
        self
    }

    /// Computes the fitness terms of a gene list.
    pub fn breakdown(&self, genes: &[Assignment]) -> FitnessBreakdown {
        let problem = self.problem;
        let rules = &problem.rules;
        let total_slots = self.eligibility.total_role_slots();
        let coverage = if total_slots == 0 {
            0.0
        } else {
            (genes.len() as f64 / total_slots as f64).min(1.0)
        };

        let plans = itineraries(genes, problem);
        let mut hours: BTreeMap<&str, f64> = BTreeMap::new();
        let mut overtime_hours = 0.0;
        let mut continuity_breaks = 0;
        let mut days_away_from_base = 0;

        for (crew_id, flights) in &plans {
            let minutes: i64 = flights.iter().map(|f| f.duration_minutes()).sum();
            hours.insert(crew_id.as_str(), minutes as f64 / 60.0);

            continuity_breaks += flights
                .windows(2)
                .filter(|w| !w[1].continues_from(w[0]))
                .count();

            let Some(crew) = problem.crew_member(crew_id) else {
                debug_assert!(false, "gene names unknown crew {crew_id}");
                continue;
            };
            let over = minutes - rules.weekly_cap_minutes(crew);
            if over > 0 {
                overtime_hours += over as f64 / 60.0;
            }

            let mut last_by_day: BTreeMap<_, &crate::models::Flight> = BTreeMap::new();
            for f in flights {
                let slot = last_by_day.entry(f.operating_day()).or_insert(*f);
                if f.arr > slot.arr {
                    *slot = *f;
                }
            }
            days_away_from_base += last_by_day
                .values()
                .filter(|f| f.arr_airport != crew.base)
                .count();
        }

        FitnessBreakdown {
            coverage,
            overtime_hours,
            fairness: fairness_score(hours.values().copied()),
            continuity_breaks,
            days_away_from_base,
            stability: self
                .baseline
                .map_or(0.0, |b| b.stability_fraction(genes)),
        }
    }

    /// Scores a gene list.
    pub fn score(&self, genes: &[Assignment]) -> f64 {
        if genes.is_empty() {
            return f64::NEG_INFINITY;
        }
        let b = self.breakdown(genes);
        let w = &self.weights;
        let fitness = 1000.0 * b.coverage - 0.1 * w.overtime * b.overtime_hours
            + 0.1 * w.fairness * b.fairness
            - w.continuity * b.continuity_breaks as f64
            - 0.01 * w.base_return * b.days_away_from_base as f64
            + w.stability * b.stability;
        fitness.max(FITNESS_FLOOR)
    }

    /// Repaired chromosome from the baseline, if any.
    pub fn baseline_seed(&self) -> Option<RosterChromosome> {
        let baseline = self.baseline?;
        let mut seed = RosterChromosome::from_genes(baseline.seed(self.eligibility));
        repair(&mut seed, self.problem);
        Some(seed)
    }
}

/// `1 − std/mean` over per-crew hours, in `[0, 1]`; 0 with no crew.
fn fairness_score(hours: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = hours.collect();
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return 1.0;
    }
    let variance = values.iter().map(|h| (h - mean).powi(2)).sum::<f64>() / n;
    (1.0 - variance.sqrt() / mean).max(0.0)
}

impl GaProblem for RosterGaProblem<'_> {
    type Individual = RosterChromosome;

    /// The first call yields the repaired baseline, when one is set, so
    /// the prior roster enters the initial population.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> RosterChromosome {
        if self.baseline.is_some() && !self.seeded.swap(true, Ordering::Relaxed) {
            if let Some(seed) = self.baseline_seed() {
                return seed;
            }
        }
        let mut ch = RosterChromosome::random(self.eligibility, rng);
        repair(&mut ch, self.problem);
        ch
    }

    fn evaluate(&self, individual: &RosterChromosome) -> f64 {
        -self.score(&individual.genes)
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &RosterChromosome,
        parent2: &RosterChromosome,
        rng: &mut R,
    ) -> Vec<RosterChromosome> {
        let (mut c1, mut c2) = single_point_crossover(parent1, parent2, rng);
        repair(&mut c1, self.problem);
        repair(&mut c2, self.problem);
        vec![c1, c2]
    }

    fn mutate<R: Rng>(&self, individual: &mut RosterChromosome, rng: &mut R) {
        reassign_mutation(individual, self.eligibility, self.mutation_rate, rng);
        repair(individual, self.problem);
    }

    fn on_generation(&self, generation: usize, best_fitness: f64) {
        if generation % 20 == 0 {
            debug!(generation, score = -best_fitness, "ga progress");
        }
    }
}
