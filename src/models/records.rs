//! Raw ingestion records.
//!
//! Loosely-typed rows as they arrive from files or services, plus the
//! one place where raw strings are normalized into the typed model:
//! role names, `"A320|A321"` type lists, leave status, SCCM flags,
//! `|`-separated preference lists and timestamps.
//!
//! Malformed fields are [`ValidationError`]s; nothing is silently
//! defaulted except the documented optional fields.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{Crew, CrewPreference, CrewRole, Disruption, DisruptionKind, Flight, SeatDemand};
use crate::validation::{ValidationError, ValidationErrorKind};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Leave statuses that make a crew member unavailable for the whole run.
const UNAVAILABLE_STATUSES: [&str; 3] = ["on leave", "sick", "training"];

fn malformed(message: String) -> ValidationError {
    ValidationError::new(ValidationErrorKind::MalformedField, message)
}

fn parse_datetime(field: &str, raw: &str) -> Result<NaiveDateTime, ValidationError> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| malformed(format!("Field '{field}' is not a timestamp: '{raw}'")))
}

fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| malformed(format!("Expected date as YYYY-MM-DD, got '{raw}'")))
}

fn split_list<'a>(raw: &'a str, separators: &'a [char]) -> impl Iterator<Item = String> + 'a {
    raw.split(|c| separators.contains(&c))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "t"
    )
}

fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(
            ValidationErrorKind::MissingField,
            format!("Required field '{field}' is empty"),
        ));
    }
    Ok(())
}

/// A raw flight row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightRecord {
    /// Flight identifier.
    pub flight_id: String,
    /// Departure airport.
    pub dep_airport: String,
    /// Arrival airport.
    pub arr_airport: String,
    /// Departure timestamp (`YYYY-MM-DD HH:MM[:SS]`).
    pub dep_dt: String,
    /// Arrival timestamp.
    pub arr_dt: String,
    /// Aircraft type.
    pub aircraft_type: String,
    /// Captains required.
    pub needed_captains: u32,
    /// First officers required.
    pub needed_fo: u32,
    /// Senior crew required (absent in older files).
    #[serde(default)]
    pub needed_sc: u32,
    /// Cabin crew required.
    pub needed_cc: u32,
    /// Passenger seats.
    #[serde(default)]
    pub seat_capacity: Option<u32>,
}

impl TryFrom<FlightRecord> for Flight {
    type Error = ValidationError;

    fn try_from(r: FlightRecord) -> Result<Self, Self::Error> {
        require("flight_id", &r.flight_id)?;
        require("aircraft_type", &r.aircraft_type)?;
        let dep = parse_datetime("dep_dt", &r.dep_dt)?;
        let arr = parse_datetime("arr_dt", &r.arr_dt)?;
        let mut flight = Flight::new(
            r.flight_id.trim(),
            r.dep_airport.trim(),
            r.arr_airport.trim(),
            dep,
            arr,
            r.aircraft_type.trim(),
        )
        .with_demand(SeatDemand::new(
            r.needed_captains,
            r.needed_fo,
            r.needed_sc,
            r.needed_cc,
        ));
        flight.seat_capacity = r.seat_capacity;
        Ok(flight)
    }
}

/// A raw crew row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewRecord {
    /// Crew identifier.
    pub crew_id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Raw role string, e.g. `"Senior Cabin Crew"`.
    pub role: String,
    /// Home base.
    pub base: String,
    /// Type ratings, `|` or `,` separated.
    pub qualified_types: String,
    /// Personal weekly cap in hours.
    #[serde(default)]
    pub weekly_max_duty_hrs: Option<u32>,
    /// `Available`, `On Leave`, `Training` or `Sick`.
    #[serde(default)]
    pub leave_status: String,
    /// SCCM flag as written (`1/true/yes/y/t`).
    #[serde(default)]
    pub sccm_certified: Option<String>,
    /// Experience in months.
    #[serde(default)]
    pub experience_months: Option<u32>,
}

impl TryFrom<CrewRecord> for Crew {
    type Error = ValidationError;

    fn try_from(r: CrewRecord) -> Result<Self, Self::Error> {
        require("crew_id", &r.crew_id)?;
        require("base", &r.base)?;
        let role: CrewRole = r.role.parse()?;
        let status = r.leave_status.trim().to_ascii_lowercase();

        let mut crew = Crew::new(r.crew_id.trim(), role, r.base.trim()).with_name(r.name.trim());
        crew.qualified_types = split_list(&r.qualified_types, &['|', ',']).collect();
        crew.weekly_max_duty_hours = r.weekly_max_duty_hrs;
        crew.available = !UNAVAILABLE_STATUSES.contains(&status.as_str());
        crew.sccm_certified = r.sccm_certified.as_deref().is_some_and(parse_flag);
        crew.experience_months = r.experience_months.unwrap_or(0);
        Ok(crew)
    }
}

/// A raw preference row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceRecord {
    /// Crew identifier.
    pub crew_id: String,
    /// `|`-separated dates.
    #[serde(default)]
    pub requested_days_off: String,
    /// `|`-separated `DEP-ARR` sectors.
    #[serde(default)]
    pub preferred_sectors: String,
}

impl TryFrom<PreferenceRecord> for CrewPreference {
    type Error = ValidationError;

    fn try_from(r: PreferenceRecord) -> Result<Self, Self::Error> {
        require("crew_id", &r.crew_id)?;
        let mut pref = CrewPreference::new(r.crew_id.trim());
        for day in split_list(&r.requested_days_off, &['|']) {
            pref.requested_days_off.insert(parse_date(&day)?);
        }
        pref.preferred_sectors = split_list(&r.preferred_sectors, &['|']).collect();
        Ok(pref)
    }
}

/// A raw disruption row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisruptionRecord {
    /// Affected flight.
    pub flight_id: String,
    /// `Delay` or `Cancellation`.
    pub disruption_type: String,
    /// Delay minutes.
    #[serde(default)]
    pub delay_minutes: Option<i64>,
}

impl TryFrom<DisruptionRecord> for Disruption {
    type Error = ValidationError;

    fn try_from(r: DisruptionRecord) -> Result<Self, Self::Error> {
        require("flight_id", &r.flight_id)?;
        let kind = match r.disruption_type.trim().to_ascii_lowercase().as_str() {
            "delay" => DisruptionKind::Delay,
            "cancellation" | "cancel" | "cancelled" => DisruptionKind::Cancellation,
            other => {
                return Err(malformed(format!("Unknown disruption type '{other}'")));
            }
        };
        Ok(Disruption {
            flight_id: r.flight_id.trim().to_string(),
            kind,
            delay_minutes: r.delay_minutes.unwrap_or(0),
        })
    }
}

/// A raw sickness row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SicknessRecord {
    /// Crew identifier.
    pub crew_id: String,
    /// Sick date `YYYY-MM-DD`.
    pub sick_date: String,
}

impl SicknessRecord {
    /// Parses the sick date.
    pub fn day(&self) -> Result<NaiveDate, ValidationError> {
        parse_date(&self.sick_date)
    }
}
