//! Roster (solution) model.
//!
//! A roster is a flat list of crew-to-flight assignments. Candidate
//! solutions inside the search use the compact [`Assignment`] triple;
//! results handed to callers are expanded into [`RosterAssignment`]
//! rows carrying the flight details downstream consumers need.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{CrewRole, Flight};

/// A chosen (crew, flight, role) triple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned crew member.
    pub crew_id: String,
    /// Flight the crew member operates.
    pub flight_id: String,
    /// Seat role on that flight.
    pub role: CrewRole,
}

impl Assignment {
    /// Creates a new assignment.
    pub fn new(crew_id: impl Into<String>, flight_id: impl Into<String>, role: CrewRole) -> Self {
        Self {
            crew_id: crew_id.into(),
            flight_id: flight_id.into(),
            role,
        }
    }
}

/// An assignment expanded with flight details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterAssignment {
    /// Assigned crew member.
    pub crew_id: String,
    /// Flight identifier.
    pub flight_id: String,
    /// Seat role.
    pub role: CrewRole,
    /// Departure airport.
    pub dep_airport: String,
    /// Arrival airport.
    pub arr_airport: String,
    /// Local departure time.
    pub dep_dt: NaiveDateTime,
    /// Local arrival time.
    pub arr_dt: NaiveDateTime,
    /// Aircraft type.
    pub aircraft_type: String,
    /// Block time in minutes.
    pub duration_minutes: i64,
}

impl RosterAssignment {
    /// Expands an assignment with its flight's details.
    pub fn from_flight(assignment: &Assignment, flight: &Flight) -> Self {
        Self {
            crew_id: assignment.crew_id.clone(),
            flight_id: flight.id.clone(),
            role: assignment.role,
            dep_airport: flight.dep_airport.clone(),
            arr_airport: flight.arr_airport.clone(),
            dep_dt: flight.dep,
            arr_dt: flight.arr,
            aircraft_type: flight.aircraft_type.clone(),
            duration_minutes: flight.duration_minutes(),
        }
    }

    /// The compact triple.
    pub fn assignment(&self) -> Assignment {
        Assignment::new(self.crew_id.clone(), self.flight_id.clone(), self.role)
    }
}

/// Assigned minutes per crew member.
pub fn minutes_by_crew<'a>(
    assignments: impl IntoIterator<Item = &'a RosterAssignment>,
) -> BTreeMap<&'a str, i64> {
    let mut out: BTreeMap<&str, i64> = BTreeMap::new();
    for a in assignments {
        *out.entry(a.crew_id.as_str()).or_insert(0) += a.duration_minutes;
    }
    out
}

/// An advisory rule violation found in a roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity (crew or flight ID).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of roster violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Two turnaround-padded duties of one crew overlap.
    Overlap,
    /// Ground time between consecutive duties is below minimum rest.
    RestShortfall,
    /// Daily block time exceeds the (WOCL-reduced) role cap.
    DailyCapExceeded,
    /// Landings exceed the FDP bracket limit.
    LandingsExceeded,
    /// A flight lacks required SCCMs.
    SccmShortfall,
    /// Weekly or consecutive night-duty limit exceeded.
    NightLimit,
    /// 7-day cumulative flight time exceeded.
    FlightTimeCap,
    /// Consecutive flights do not chain airports.
    ContinuityBreak,
    /// A role slot is left unfilled.
    UncoveredSlot,
}

impl ViolationType {
    /// Default severity for this type.
    pub fn severity(self) -> i32 {
        match self {
            ViolationType::Overlap => 100,
            ViolationType::RestShortfall => 90,
            ViolationType::DailyCapExceeded => 85,
            ViolationType::FlightTimeCap => 85,
            ViolationType::LandingsExceeded => 80,
            ViolationType::NightLimit => 70,
            ViolationType::SccmShortfall => 75,
            ViolationType::ContinuityBreak => 60,
            ViolationType::UncoveredSlot => 50,
        }
    }
}

impl Violation {
    /// Creates a violation with the type's default severity.
    pub fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
            severity: violation_type.severity(),
        }
    }
}
