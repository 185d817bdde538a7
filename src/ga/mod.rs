//! GA-based roster optimization.
//!
//! Implements the rostering encoding on top of `u-metaheur`'s generic GA
//! framework. [`RosterGaProblem`] is the `GaProblem`; [`GaSettings`] is the
//! request-facing form of the runner's configuration.
//!
//! # Encoding
//!
//! - **Genes**: (crew, flight, role) assignments drawn from the
//!   eligibility lists. Uncovered slots simply have no gene.
//! - **Repair**: runs after every variation so each crew member's
//!   flights stay de-duplicated, within demand, and airport-continuous.
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization,
//!   and Machine Learning"
//! - Levine (1996), "Application of a hybrid genetic algorithm to airline
//!   crew scheduling"

mod chromosome;
mod problem;
mod settings;

pub use chromosome::{
    is_continuous, reassign_mutation, repair, single_point_crossover, RosterChromosome,
};
pub(crate) use chromosome::itineraries;
pub use problem::{FitnessBreakdown, RosterGaProblem, FITNESS_FLOOR};
pub use settings::GaSettings;
