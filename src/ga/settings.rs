//! Run controls for the genetic stage.
//!
//! [`GaSettings`] is the serializable form carried by a roster request.
//! [`GaSettings::runner_config`] maps it onto `u-metaheur`'s
//! [`GaConfig`]:
//!
//! | setting            | runner field                          |
//! |--------------------|---------------------------------------|
//! | `tournament_size`  | `selection = Tournament(k)`           |
//! | `elite_count`      | `elite_ratio` (count / population)    |
//! | `time_budget_secs` | `time_limit_ms`, saturating           |
//! | `mutation_rate`    | per-gene rate inside the problem; the runner mutates every child |

use serde::{Deserialize, Serialize};
use u_metaheur::ga::{GaConfig, Selection};

use crate::validation::{ValidationError, ValidationErrorKind, ValidationResult};

/// GA parameters of a roster request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaSettings {
    /// Individuals per generation.
    pub population_size: usize,
    /// Generation cap.
    pub max_generations: usize,
    /// Per-gene reassignment probability.
    pub mutation_rate: f64,
    /// Probability that two parents are recombined.
    pub crossover_rate: f64,
    /// Best individuals copied unchanged into the next generation.
    pub elite_count: usize,
    /// Tournament size for parent selection.
    pub tournament_size: usize,
    /// Wall-clock budget in seconds.
    pub time_budget_secs: f64,
    /// Generations without improvement before stopping; 0 disables.
    pub stagnation_limit: usize,
    /// RNG seed for reproducible runs.
    pub seed: Option<u64>,
    /// Evaluate offspring in parallel.
    pub parallel: bool,
}

impl Default for GaSettings {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 200,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            elite_count: 5,
            tournament_size: 5,
            time_budget_secs: 300.0,
            stagnation_limit: 0,
            seed: None,
            parallel: true,
        }
    }
}

impl GaSettings {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the generation cap.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the per-gene mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the elite count.
    pub fn with_elite_count(mut self, n: usize) -> Self {
        self.elite_count = n;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_time_budget_secs(mut self, secs: f64) -> Self {
        self.time_budget_secs = secs;
        self
    }

    /// Sets the stagnation limit.
    pub fn with_stagnation_limit(mut self, generations: usize) -> Self {
        self.stagnation_limit = generations;
        self
    }

    /// Sets the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Checks the settings a run cannot start from.
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        let mut reject = |message: String| {
            errors.push(ValidationError::new(ValidationErrorKind::MalformedField, message));
        };
        if self.population_size < 2 {
            reject(format!(
                "ga.population_size must be at least 2, got {}",
                self.population_size
            ));
        }
        if self.max_generations == 0 {
            reject("ga.max_generations must be at least 1".to_string());
        }
        for (name, rate) in [
            ("mutation_rate", self.mutation_rate),
            ("crossover_rate", self.crossover_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                reject(format!("ga.{name} must lie in [0, 1], got {rate}"));
            }
        }
        if self.time_budget_secs.is_nan() || self.time_budget_secs <= 0.0 {
            reject(format!(
                "ga.time_budget_secs must be positive, got {}",
                self.time_budget_secs
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Budget in whole milliseconds, at least one; oversized budgets
    /// saturate at `u64::MAX`.
    pub fn time_limit_ms(&self) -> u64 {
        // float-to-int `as` saturates and maps NaN to zero
        ((self.time_budget_secs * 1000.0).ceil() as u64).max(1)
    }

    /// The runner configuration for these settings.
    ///
    /// Elites are capped one below the population so at least one child
    /// is bred per generation.
    pub fn runner_config(&self) -> GaConfig {
        let population = self.population_size.max(2);
        let elites = self.elite_count.min(population - 1);
        let config = GaConfig::default()
            .with_population_size(population)
            .with_max_generations(self.max_generations.max(1))
            .with_selection(Selection::Tournament(self.tournament_size.max(1)))
            .with_elite_ratio((elites as f64 + 0.5) / population as f64)
            .with_crossover_rate(self.crossover_rate)
            .with_mutation_rate(1.0)
            .with_stagnation_limit(self.stagnation_limit)
            .with_parallel(self.parallel)
            .with_time_limit_ms(self.time_limit_ms());
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elite_count(config: &GaConfig) -> usize {
        (config.population_size as f64 * config.elite_ratio) as usize
    }

    #[test]
    fn test_defaults_map_onto_runner() {
        let config = GaSettings::default().with_seed(42).runner_config();
        assert_eq!(config.population_size, 100);
        assert_eq!(config.max_generations, 200);
        assert_eq!(config.selection, Selection::Tournament(5));
        assert_eq!(elite_count(&config), 5);
        assert_eq!(config.mutation_rate, 1.0);
        assert_eq!(config.stagnation_limit, 0);
        assert_eq!(config.time_limit_ms, Some(300_000));
        assert_eq!(config.seed, Some(42));
        assert!(config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_elite_count_survives_ratio_conversion() {
        for (population, elites) in [(30, 5), (7, 3), (100, 10), (3, 0)] {
            let config = GaSettings::default()
                .with_population_size(population)
                .with_elite_count(elites)
                .runner_config();
            assert_eq!(elite_count(&config), elites, "population {population}");
        }
    }

    #[test]
    fn test_elites_capped_below_population() {
        let config = GaSettings::default()
            .with_population_size(4)
            .with_elite_count(10)
            .runner_config();
        assert_eq!(elite_count(&config), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_huge_budget_saturates() {
        let settings = GaSettings::default().with_time_budget_secs(1e30);
        assert!(settings.validate().is_ok());
        assert_eq!(settings.time_limit_ms(), u64::MAX);
        assert_eq!(settings.runner_config().time_limit_ms, Some(u64::MAX));

        let unbounded = GaSettings::default().with_time_budget_secs(f64::INFINITY);
        assert_eq!(unbounded.time_limit_ms(), u64::MAX);
    }

    #[test]
    fn test_tiny_budget_rounds_up_to_one_ms() {
        let settings = GaSettings::default().with_time_budget_secs(1e-9);
        assert_eq!(settings.time_limit_ms(), 1);
        assert!(settings.runner_config().validate().is_ok());
    }

    #[test]
    fn test_rejects_unusable_settings() {
        for bad in [f64::NAN, 0.0, -3.0] {
            let errors = GaSettings::default()
                .with_time_budget_secs(bad)
                .validate()
                .unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].kind, ValidationErrorKind::MalformedField);
            assert!(errors[0].message.contains("time_budget_secs"));
        }
        let errors = GaSettings::default()
            .with_population_size(1)
            .with_max_generations(0)
            .with_mutation_rate(f64::NAN)
            .with_crossover_rate(1.5)
            .validate()
            .unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let settings: GaSettings =
            serde_json::from_str(r#"{"population_size": 20, "seed": 7}"#).unwrap();
        assert_eq!(settings.population_size, 20);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.tournament_size, 5);
    }
}
