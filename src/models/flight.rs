//! Flight model.
//!
//! A flight is one scheduled sector with a per-role seat demand.
//! Flights are immutable once loaded for a run; disruptions are applied
//! beforehand (see [`apply_disruptions`](super::apply_disruptions)).
//!
//! # Time Representation
//! Departure and arrival are naive local timestamps. The operating day
//! of a flight is the calendar date of its departure.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{CrewRole, DutyInterval};

/// Number of crew required per role on one flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatDemand {
    /// Captains required.
    pub captains: u32,
    /// First officers required.
    pub first_officers: u32,
    /// Senior cabin crew required.
    pub senior_crew: u32,
    /// Cabin crew required.
    pub cabin_crew: u32,
}

impl SeatDemand {
    /// Creates a demand from per-role counts in slot order.
    pub fn new(captains: u32, first_officers: u32, senior_crew: u32, cabin_crew: u32) -> Self {
        Self {
            captains,
            first_officers,
            senior_crew,
            cabin_crew,
        }
    }

    /// Seats required for `role`.
    pub fn for_role(&self, role: CrewRole) -> u32 {
        match role {
            CrewRole::Captain => self.captains,
            CrewRole::FirstOfficer => self.first_officers,
            CrewRole::SeniorCrew => self.senior_crew,
            CrewRole::CabinCrew => self.cabin_crew,
        }
    }

    /// Total seats across all roles.
    pub fn total(&self) -> u32 {
        self.captains + self.first_officers + self.senior_crew + self.cabin_crew
    }

    /// Seats in the cabin (senior + regular cabin crew).
    pub fn cabin(&self) -> u32 {
        self.senior_crew + self.cabin_crew
    }
}

/// A scheduled flight requiring crew.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    /// Unique flight identifier.
    pub id: String,
    /// Departure airport code.
    pub dep_airport: String,
    /// Arrival airport code.
    pub arr_airport: String,
    /// Local departure time.
    pub dep: NaiveDateTime,
    /// Local arrival time.
    pub arr: NaiveDateTime,
    /// Aircraft type (matched against crew type ratings).
    pub aircraft_type: String,
    /// Seats required per role.
    pub demand: SeatDemand,
    /// Passenger seat count, if known (drives minimum cabin crew).
    #[serde(default)]
    pub seat_capacity: Option<u32>,
}

impl Flight {
    /// Creates a flight with no seat demand.
    pub fn new(
        id: impl Into<String>,
        dep_airport: impl Into<String>,
        arr_airport: impl Into<String>,
        dep: NaiveDateTime,
        arr: NaiveDateTime,
        aircraft_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            dep_airport: dep_airport.into(),
            arr_airport: arr_airport.into(),
            dep,
            arr,
            aircraft_type: aircraft_type.into(),
            demand: SeatDemand::default(),
            seat_capacity: None,
        }
    }

    /// Sets the seat demand.
    pub fn with_demand(mut self, demand: SeatDemand) -> Self {
        self.demand = demand;
        self
    }

    /// Sets the passenger seat capacity.
    pub fn with_seat_capacity(mut self, seats: u32) -> Self {
        self.seat_capacity = Some(seats);
        self
    }

    /// Block time in minutes (at least one).
    pub fn duration_minutes(&self) -> i64 {
        (self.arr - self.dep).num_minutes().max(1)
    }

    /// Block time in hours.
    pub fn duration_hours(&self) -> f64 {
        self.duration_minutes() as f64 / 60.0
    }

    /// Sector string, e.g. `"DEL-BOM"`.
    pub fn sector(&self) -> String {
        format!("{}-{}", self.dep_airport, self.arr_airport)
    }

    /// Whether this flight departs from where `prev` arrived.
    #[inline]
    pub fn continues_from(&self, prev: &Flight) -> bool {
        self.dep_airport == prev.arr_airport
    }

    /// Calendar date of departure.
    #[inline]
    pub fn operating_day(&self) -> NaiveDate {
        self.dep.date()
    }

    /// Seats required for `role`.
    #[inline]
    pub fn needed(&self, role: CrewRole) -> u32 {
        self.demand.for_role(role)
    }

    /// Total seats required.
    #[inline]
    pub fn total_required(&self) -> u32 {
        self.demand.total()
    }

    /// Duty interval `[dep, arr]` without turnaround padding.
    pub fn interval(&self) -> DutyInterval {
        DutyInterval::new(self.dep, self.arr)
    }

    /// Minutes from `epoch` to departure.
    pub fn dep_offset(&self, epoch: NaiveDateTime) -> i64 {
        (self.dep - epoch).num_minutes()
    }

    /// Minutes from `epoch` to arrival.
    pub fn arr_offset(&self, epoch: NaiveDateTime) -> i64 {
        (self.arr - epoch).num_minutes()
    }
}
