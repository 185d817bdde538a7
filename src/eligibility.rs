//! Eligibility builder.
//!
//! Expands each flight's seat demand into [`RoleSlot`]s and computes the
//! feasible (crew, flight, role, slot) relation. A crew member is
//! eligible for a slot when:
//! - their role matches the slot role,
//! - they are rated on the flight's aircraft type,
//! - they are available for the run,
//! - they are not sick on the flight's operating day.
//!
//! The build runs once per optimization run, in O(flights × crew).
//! All maps are ordered, so the output is identical for identical
//! inputs.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::models::{CrewRole, RosterProblem};

/// One required seat: (flight, role, slot index within that role).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoleSlot {
    /// Flight the seat belongs to.
    pub flight_id: String,
    /// Seat role.
    pub role: CrewRole,
    /// Index among the flight's seats of this role.
    pub slot_index: u32,
}

/// A crew member who may fill a given role slot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EligibleTuple {
    /// Candidate crew member.
    pub crew_id: String,
    /// Flight.
    pub flight_id: String,
    /// Seat role.
    pub role: CrewRole,
    /// Slot index.
    pub slot_index: u32,
}

/// Role slots, eligible tuples and per-flight derived maps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Eligibility {
    /// All role slots, flights in problem order, roles in [`CrewRole::ALL`] order.
    pub role_slots: Vec<RoleSlot>,
    /// Eligible tuples, grouped by slot in `role_slots` order.
    pub eligible: Vec<EligibleTuple>,
    /// Block minutes per flight.
    pub minutes_by_flight: BTreeMap<String, i64>,
    /// Operating day per flight.
    pub day_by_flight: BTreeMap<String, NaiveDate>,
    /// `"DEP-ARR"` sector per flight.
    pub sector_by_flight: BTreeMap<String, String>,
    /// Aircraft type per flight.
    pub aircraft_by_flight: BTreeMap<String, String>,
    /// Distinct operating days.
    pub operating_days: BTreeSet<NaiveDate>,
    candidates: BTreeMap<(String, CrewRole), Vec<String>>,
}

impl Eligibility {
    /// Builds slots and the eligible relation for a problem.
    pub fn build(problem: &RosterProblem) -> Self {
        let mut out = Self::default();

        for f in &problem.flights {
            let day = f.operating_day();
            out.minutes_by_flight.insert(f.id.clone(), f.duration_minutes());
            out.day_by_flight.insert(f.id.clone(), day);
            out.sector_by_flight.insert(f.id.clone(), f.sector());
            out.aircraft_by_flight
                .insert(f.id.clone(), f.aircraft_type.clone());
            out.operating_days.insert(day);

            for role in CrewRole::ALL {
                let needed = f.needed(role);
                if needed == 0 {
                    continue;
                }
                let pool: Vec<String> = problem
                    .crew
                    .iter()
                    .filter(|c| {
                        c.role == role
                            && c.available
                            && c.qualified_for(&f.aircraft_type)
                            && !problem.sickness.is_sick(&c.id, day)
                    })
                    .map(|c| c.id.clone())
                    .collect();

                for slot_index in 0..needed {
                    out.role_slots.push(RoleSlot {
                        flight_id: f.id.clone(),
                        role,
                        slot_index,
                    });
                    out.eligible.extend(pool.iter().map(|crew_id| EligibleTuple {
                        crew_id: crew_id.clone(),
                        flight_id: f.id.clone(),
                        role,
                        slot_index,
                    }));
                }
                out.candidates.insert((f.id.clone(), role), pool);
            }
        }

        debug!(
            flights = problem.flights.len(),
            crew = problem.crew.len(),
            role_slots = out.role_slots.len(),
            eligible = out.eligible.len(),
            "eligibility built"
        );
        out
    }

    /// Crew eligible for any `role` seat on `flight_id`.
    pub fn candidates(&self, flight_id: &str, role: CrewRole) -> &[String] {
        self.candidates
            .get(&(flight_id.to_string(), role))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `crew_id` may sit in a `role` seat on `flight_id`.
    pub fn is_eligible(&self, crew_id: &str, flight_id: &str, role: CrewRole) -> bool {
        self.candidates(flight_id, role).iter().any(|c| c == crew_id)
    }

    /// Role slots with no eligible crew at all.
    pub fn uncoverable_slots(&self) -> impl Iterator<Item = &RoleSlot> {
        self.role_slots
            .iter()
            .filter(|s| self.candidates(&s.flight_id, s.role).is_empty())
    }

    /// Total required seats.
    #[inline]
    pub fn total_role_slots(&self) -> usize {
        self.role_slots.len()
    }

    /// Block minutes of a flight (0 if unknown).
    pub fn minutes(&self, flight_id: &str) -> i64 {
        self.minutes_by_flight.get(flight_id).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{day, scenario_single_flight, scenario_two_flights_one_captain};
    use crate::models::SicknessCalendar;

    #[test]
    fn test_slots_in_role_order() {
        let problem = scenario_single_flight();
        let elig = Eligibility::build(&problem);

        assert_eq!(elig.total_role_slots(), 4);
        let roles: Vec<CrewRole> = elig.role_slots.iter().map(|s| s.role).collect();
        assert_eq!(
            roles,
            vec![
                CrewRole::Captain,
                CrewRole::FirstOfficer,
                CrewRole::CabinCrew,
                CrewRole::CabinCrew
            ]
        );
        assert_eq!(elig.role_slots[3].slot_index, 1);
        // 1 captain + 1 FO + 2 cabin crew x 2 slots
        assert_eq!(elig.eligible.len(), 6);
        assert_eq!(elig.sector_by_flight["AI101"], "DEL-BOM");
    }

    #[test]
    fn test_role_and_type_filters() {
        let problem = scenario_single_flight();
        let elig = Eligibility::build(&problem);
        assert!(elig.is_eligible("CPT1", "AI101", CrewRole::Captain));
        assert!(!elig.is_eligible("CPT1", "AI101", CrewRole::FirstOfficer));
        assert!(!elig.is_eligible("CPT-B737", "AI101", CrewRole::Captain));
        assert_eq!(elig.uncoverable_slots().count(), 0);
    }

    #[test]
    fn test_sick_crew_excluded_on_that_day_only() {
        let problem = scenario_single_flight()
            .with_sickness(SicknessCalendar::new().with_sick_day("CC1", day(8)));
        let elig = Eligibility::build(&problem);
        assert!(elig.eligible.iter().all(|t| t.crew_id != "CC1"));
        assert!(elig.is_eligible("CC2", "AI101", CrewRole::CabinCrew));

        let problem = scenario_single_flight()
            .with_sickness(SicknessCalendar::new().with_sick_day("CC1", day(9)));
        let elig = Eligibility::build(&problem);
        assert!(elig.is_eligible("CC1", "AI101", CrewRole::CabinCrew));
    }

    #[test]
    fn test_unavailable_crew_excluded() {
        let mut problem = scenario_single_flight();
        for c in problem.crew.iter_mut().filter(|c| c.id == "FO1") {
            c.available = false;
        }
        let elig = Eligibility::build(&problem);
        assert!(elig.candidates("AI101", CrewRole::FirstOfficer).is_empty());
        assert_eq!(elig.uncoverable_slots().count(), 1);
    }

    #[test]
    fn test_build_is_idempotent() {
        let problem = scenario_two_flights_one_captain();
        let a = Eligibility::build(&problem);
        let b = Eligibility::build(&problem);
        assert_eq!(a, b);
        assert_eq!(a.operating_days.len(), 1);
    }
}
