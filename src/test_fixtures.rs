//! Shared scenarios for unit tests.

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{Crew, CrewRole, Flight, RosterProblem, Rules, SeatDemand};

pub(crate) fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, d).expect("valid date")
}

pub(crate) fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
    day(d).and_hms_opt(h, m, 0).expect("valid time")
}

pub(crate) fn captain(id: &str, base: &str) -> Crew {
    Crew::new(id, CrewRole::Captain, base).with_type("A320")
}

pub(crate) fn first_officer(id: &str, base: &str) -> Crew {
    Crew::new(id, CrewRole::FirstOfficer, base).with_type("A320")
}

pub(crate) fn problem(flights: Vec<Flight>, crew: Vec<Crew>) -> RosterProblem {
    RosterProblem::new(flights, crew, Rules::default()).expect("valid fixture")
}

/// AI101 DEL→BOM needing 1 captain, 1 FO and 2 cabin crew, with exactly
/// one qualified crew member per seat plus a captain rated on another type.
pub(crate) fn scenario_single_flight() -> RosterProblem {
    let flights = vec![
        Flight::new("AI101", "DEL", "BOM", at(8, 8, 0), at(8, 10, 15), "A320")
            .with_demand(SeatDemand::new(1, 1, 0, 2)),
    ];
    let crew = vec![
        captain("CPT1", "DEL"),
        first_officer("FO1", "DEL"),
        Crew::new("CC1", CrewRole::CabinCrew, "DEL")
            .with_type("A320")
            .with_sccm(true, 24),
        Crew::new("CC2", CrewRole::CabinCrew, "DEL").with_type("A320"),
        Crew::new("CPT-B737", CrewRole::Captain, "DEL").with_type("B737"),
    ];
    problem(flights, crew)
}

/// F1 DEL→BOM then F2 DEL→HYD 30 minutes later, one captain each, and a
/// single captain in the pool.
pub(crate) fn scenario_two_flights_one_captain() -> RosterProblem {
    problem(two_flights(), vec![captain("CPT1", "DEL")])
}

pub(crate) fn two_flights() -> Vec<Flight> {
    vec![
        Flight::new("F1", "DEL", "BOM", at(8, 8, 0), at(8, 10, 0), "A320")
            .with_demand(SeatDemand::new(1, 0, 0, 0)),
        Flight::new("F2", "DEL", "HYD", at(8, 10, 30), at(8, 12, 0), "A320")
            .with_demand(SeatDemand::new(1, 0, 0, 0)),
    ]
}

/// Three days of DEL→BOM→DEL rotations, each leg needing a captain and
/// a first officer, with three of each based in DEL.
pub(crate) fn scenario_rotation() -> RosterProblem {
    let mut flights = Vec::new();
    for d in 8..=10 {
        flights.push(
            Flight::new(format!("D{d}O"), "DEL", "BOM", at(d, 6, 0), at(d, 7, 30), "A320")
                .with_demand(SeatDemand::new(1, 1, 0, 0)),
        );
        flights.push(
            Flight::new(format!("D{d}R"), "BOM", "DEL", at(d, 19, 30), at(d, 21, 30), "A320")
                .with_demand(SeatDemand::new(1, 1, 0, 0)),
        );
    }
    let crew = vec![
        captain("CPT1", "DEL"),
        captain("CPT2", "DEL"),
        captain("CPT3", "DEL"),
        first_officer("FO1", "DEL"),
        first_officer("FO2", "DEL"),
        first_officer("FO3", "DEL"),
    ];
    problem(flights, crew)
}
