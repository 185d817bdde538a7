//! Assignment-list chromosome for rostering.
//!
//! # Encoding
//!
//! A chromosome is an unordered list of (crew, flight, role) genes. It
//! need not cover every role slot; coverage is rewarded by fitness.
//! After [`repair`] every chromosome satisfies:
//! - at most one gene per (crew, flight),
//! - at most the flight's demand of genes per (flight, role),
//! - each crew member's flights form an airport chain in time order.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use rand::prelude::IndexedRandom;
use rand::Rng;
use u_metaheur::ga::Individual;

use crate::eligibility::Eligibility;
use crate::models::{Assignment, CrewRole, Flight, RosterProblem};

/// Roster chromosome.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterChromosome {
    /// Assignment genes.
    pub genes: Vec<Assignment>,
    /// Cost: the negated roster score (lower is better).
    pub fitness: f64,
}

impl Individual for RosterChromosome {
    type Fitness = f64;

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

impl RosterChromosome {
    /// Wraps genes with an unevaluated fitness.
    pub fn from_genes(genes: Vec<Assignment>) -> Self {
        Self {
            genes,
            fitness: f64::INFINITY,
        }
    }

    /// Creates a random chromosome.
    ///
    /// Every role slot, in flight order, gets one uniformly chosen
    /// eligible crew member; slots without candidates stay uncovered.
    pub fn random<R: Rng>(eligibility: &Eligibility, rng: &mut R) -> Self {
        let genes = eligibility
            .role_slots
            .iter()
            .filter_map(|slot| {
                eligibility
                    .candidates(&slot.flight_id, slot.role)
                    .choose(rng)
                    .map(|crew_id| Assignment::new(crew_id, &slot.flight_id, slot.role))
            })
            .collect();
        Self::from_genes(genes)
    }

    /// Number of genes.
    #[inline]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether the chromosome has no genes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

/// Single-point crossover.
///
/// Children swap tails at a split drawn from `1..min_len`. Parents
/// shorter than two genes pass through unchanged.
pub fn single_point_crossover<R: Rng>(
    p1: &RosterChromosome,
    p2: &RosterChromosome,
    rng: &mut R,
) -> (RosterChromosome, RosterChromosome) {
    let min_len = p1.len().min(p2.len());
    if min_len < 2 {
        return (
            RosterChromosome::from_genes(p1.genes.clone()),
            RosterChromosome::from_genes(p2.genes.clone()),
        );
    }
    let cut = rng.random_range(1..min_len);
    let c1 = p1.genes[..cut].iter().chain(&p2.genes[cut..]).cloned().collect();
    let c2 = p2.genes[..cut].iter().chain(&p1.genes[cut..]).cloned().collect();
    (
        RosterChromosome::from_genes(c1),
        RosterChromosome::from_genes(c2),
    )
}

/// Reassign mutation.
///
/// Each gene, with probability `rate`, moves to a uniformly chosen other
/// eligible crew member of the same role.
pub fn reassign_mutation<R: Rng>(
    chromosome: &mut RosterChromosome,
    eligibility: &Eligibility,
    rate: f64,
    rng: &mut R,
) {
    let rate = rate.clamp(0.0, 1.0);
    for gene in &mut chromosome.genes {
        if !rng.random_bool(rate) {
            continue;
        }
        let alternatives: Vec<&String> = eligibility
            .candidates(&gene.flight_id, gene.role)
            .iter()
            .filter(|c| **c != gene.crew_id)
            .collect();
        if let Some(crew_id) = alternatives.choose(rng) {
            gene.crew_id = (*crew_id).clone();
        }
    }
    chromosome.fitness = f64::INFINITY;
}

/// Each crew member's distinct flights in departure order.
pub(crate) fn itineraries<'p>(
    genes: &[Assignment],
    problem: &'p RosterProblem,
) -> BTreeMap<String, Vec<&'p Flight>> {
    let mut seen = HashSet::new();
    let mut out: BTreeMap<String, Vec<&Flight>> = BTreeMap::new();
    for g in genes {
        if !seen.insert((g.crew_id.as_str(), g.flight_id.as_str())) {
            continue;
        }
        let flight = problem.flight(&g.flight_id);
        debug_assert!(flight.is_some(), "gene names unknown flight {}", g.flight_id);
        if let Some(f) = flight {
            out.entry(g.crew_id.clone()).or_default().push(f);
        }
    }
    for flights in out.values_mut() {
        flights.sort_by(|a, b| a.dep.cmp(&b.dep).then_with(|| a.id.cmp(&b.id)));
    }
    out
}

/// Repairs a chromosome in place.
///
/// 1. Drops repeated (crew, flight) genes, keeping the first.
/// 2. Drops genes beyond the flight's demand for their role.
/// 3. Per crew, walks flights in departure order, keeping the first and
///    every flight departing where the last kept one arrived; genes on
///    other flights are dropped and their slots left uncovered.
pub fn repair(chromosome: &mut RosterChromosome, problem: &RosterProblem) {
    let mut pairs = HashSet::new();
    let mut seats: BTreeMap<(String, CrewRole), u32> = BTreeMap::new();
    chromosome.genes.retain(|g| {
        let Some(flight) = problem.flight(&g.flight_id) else {
            debug_assert!(false, "gene names unknown flight {}", g.flight_id);
            return false;
        };
        if !pairs.insert((g.crew_id.clone(), g.flight_id.clone())) {
            return false;
        }
        let used = seats.entry((g.flight_id.clone(), g.role)).or_insert(0);
        if *used >= flight.needed(g.role) {
            return false;
        }
        *used += 1;
        true
    });

    let mut kept: BTreeSet<(String, String)> = BTreeSet::new();
    for (crew_id, flights) in itineraries(&chromosome.genes, problem) {
        let mut last: Option<&Flight> = None;
        for f in flights {
            if last.map_or(true, |prev| f.continues_from(prev)) {
                kept.insert((crew_id.clone(), f.id.clone()));
                last = Some(f);
            }
        }
    }
    chromosome
        .genes
        .retain(|g| kept.contains(&(g.crew_id.clone(), g.flight_id.clone())));
    chromosome.fitness = f64::INFINITY;
}

/// Whether every crew member's flights form an airport chain.
pub fn is_continuous(genes: &[Assignment], problem: &RosterProblem) -> bool {
    itineraries(genes, problem).values().all(|flights| {
        flights
            .windows(2)
            .all(|w| w[1].continues_from(w[0]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{
        captain, problem, scenario_rotation, scenario_single_flight, two_flights,
    };
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_covers_single_flight() {
        let problem = scenario_single_flight();
        let elig = Eligibility::build(&problem);
        let mut rng = SmallRng::seed_from_u64(42);
        let ch = RosterChromosome::random(&elig, &mut rng);
        assert_eq!(ch.len(), 4);
        assert!(ch.genes.iter().all(|g| elig.is_eligible(&g.crew_id, &g.flight_id, g.role)));
    }

    #[test]
    fn test_random_skips_uncoverable_slots() {
        let problem = scenario_rotation();
        let mut problem = problem;
        for c in problem.crew.iter_mut().filter(|c| c.role == CrewRole::FirstOfficer) {
            c.available = false;
        }
        let elig = Eligibility::build(&problem);
        let mut rng = SmallRng::seed_from_u64(7);
        let ch = RosterChromosome::random(&elig, &mut rng);
        assert_eq!(ch.len(), 6);
        assert!(ch.genes.iter().all(|g| g.role == CrewRole::Captain));
    }

    #[test]
    fn test_crossover_swaps_tails() {
        let a = |c: &str, f: &str| Assignment::new(c, f, CrewRole::Captain);
        let p1 = RosterChromosome::from_genes(vec![a("A", "1"), a("A", "2"), a("A", "3")]);
        let p2 = RosterChromosome::from_genes(vec![a("B", "1"), a("B", "2"), a("B", "3")]);
        let mut rng = SmallRng::seed_from_u64(42);
        let (c1, c2) = single_point_crossover(&p1, &p2, &mut rng);
        assert_eq!(c1.len(), 3);
        assert_eq!(c1.genes[0].crew_id, "A");
        assert_eq!(c1.genes[2].crew_id, "B");
        assert_eq!(c2.genes[0].crew_id, "B");
        assert_eq!(c2.genes[2].crew_id, "A");
    }

    #[test]
    fn test_crossover_short_parents_pass_through() {
        let p1 = RosterChromosome::from_genes(vec![Assignment::new("A", "1", CrewRole::Captain)]);
        let p2 = RosterChromosome::from_genes(vec![]);
        let mut rng = SmallRng::seed_from_u64(1);
        let (c1, c2) = single_point_crossover(&p1, &p2, &mut rng);
        assert_eq!(c1.genes, p1.genes);
        assert!(c2.is_empty());
    }

    #[test]
    fn test_mutation_picks_other_eligible_crew() {
        let problem = scenario_rotation();
        let elig = Eligibility::build(&problem);
        let mut ch = RosterChromosome::from_genes(vec![Assignment::new(
            "CPT1",
            "D8O",
            CrewRole::Captain,
        )]);
        let mut rng = SmallRng::seed_from_u64(3);
        reassign_mutation(&mut ch, &elig, 1.0, &mut rng);
        assert_ne!(ch.genes[0].crew_id, "CPT1");
        assert!(ch.genes[0].crew_id.starts_with("CPT"));
    }

    #[test]
    fn test_mutation_without_alternatives_keeps_gene() {
        let problem = scenario_single_flight();
        let elig = Eligibility::build(&problem);
        let mut ch = RosterChromosome::from_genes(vec![Assignment::new(
            "CPT1",
            "AI101",
            CrewRole::Captain,
        )]);
        let mut rng = SmallRng::seed_from_u64(3);
        reassign_mutation(&mut ch, &elig, 1.0, &mut rng);
        assert_eq!(ch.genes[0].crew_id, "CPT1");
    }

    #[test]
    fn test_repair_drops_continuity_break() {
        // F1 arrives BOM, F2 departs DEL 30 minutes later
        let problem = problem(two_flights(), vec![captain("CPT1", "DEL")]);
        let mut ch = RosterChromosome::from_genes(vec![
            Assignment::new("CPT1", "F2", CrewRole::Captain),
            Assignment::new("CPT1", "F1", CrewRole::Captain),
        ]);
        repair(&mut ch, &problem);
        assert_eq!(ch.genes, vec![Assignment::new("CPT1", "F1", CrewRole::Captain)]);
        assert!(is_continuous(&ch.genes, &problem));
    }

    #[test]
    fn test_repair_dedupes_and_caps_demand() {
        let problem = scenario_single_flight();
        let mut ch = RosterChromosome::from_genes(vec![
            Assignment::new("CC1", "AI101", CrewRole::CabinCrew),
            Assignment::new("CC1", "AI101", CrewRole::CabinCrew),
            Assignment::new("CPT1", "AI101", CrewRole::Captain),
            Assignment::new("CPT-B737", "AI101", CrewRole::Captain),
        ]);
        repair(&mut ch, &problem);
        assert_eq!(
            ch.genes,
            vec![
                Assignment::new("CC1", "AI101", CrewRole::CabinCrew),
                Assignment::new("CPT1", "AI101", CrewRole::Captain),
            ]
        );
    }

    #[test]
    fn test_repair_keeps_rotation_chain() {
        let problem = scenario_rotation();
        let genes: Vec<Assignment> = ["D8O", "D8R", "D9O", "D9R"]
            .iter()
            .map(|f| Assignment::new("CPT1", *f, CrewRole::Captain))
            .collect();
        let mut ch = RosterChromosome::from_genes(genes.clone());
        repair(&mut ch, &problem);
        assert_eq!(ch.genes, genes);
    }
}
