//! Disruptions, preferences, sickness and the planning window.
//!
//! These inputs reshape the flight set or crew eligibility before any
//! model is built. Cancellations remove flights, delays shift both
//! timestamps, and sickness marks a crew member ineligible on
//! individual dates.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::Flight;
use crate::validation::{ValidationError, ValidationErrorKind};

/// Kind of operational disruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisruptionKind {
    /// Flight departs and arrives later by `delay_minutes`.
    Delay,
    /// Flight does not operate.
    Cancellation,
}

/// A disruption affecting one flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disruption {
    /// Affected flight.
    pub flight_id: String,
    /// Disruption kind.
    pub kind: DisruptionKind,
    /// Delay in minutes (ignored for cancellations).
    #[serde(default)]
    pub delay_minutes: i64,
}

impl Disruption {
    /// A delay of `minutes`.
    pub fn delay(flight_id: impl Into<String>, minutes: i64) -> Self {
        Self {
            flight_id: flight_id.into(),
            kind: DisruptionKind::Delay,
            delay_minutes: minutes,
        }
    }

    /// A cancellation.
    pub fn cancellation(flight_id: impl Into<String>) -> Self {
        Self {
            flight_id: flight_id.into(),
            kind: DisruptionKind::Cancellation,
            delay_minutes: 0,
        }
    }
}

/// Rostering preferences of one crew member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrewPreference {
    /// Crew the preference belongs to.
    pub crew_id: String,
    /// Dates the crew member asked to have off.
    pub requested_days_off: BTreeSet<NaiveDate>,
    /// Preferred sectors, as `"DEP-ARR"` strings.
    pub preferred_sectors: BTreeSet<String>,
}

impl CrewPreference {
    /// Creates an empty preference.
    pub fn new(crew_id: impl Into<String>) -> Self {
        Self {
            crew_id: crew_id.into(),
            ..Self::default()
        }
    }

    /// Adds a requested day off.
    pub fn with_day_off(mut self, day: NaiveDate) -> Self {
        self.requested_days_off.insert(day);
        self
    }

    /// Adds a preferred sector.
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.preferred_sectors.insert(sector.into());
        self
    }

    /// Whether `sector` violates a non-empty sector preference.
    pub fn dislikes_sector(&self, sector: &str) -> bool {
        !self.preferred_sectors.is_empty() && !self.preferred_sectors.contains(sector)
    }
}

/// Per-date sickness of crew members.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SicknessCalendar {
    days: BTreeMap<String, BTreeSet<NaiveDate>>,
}

impl SicknessCalendar {
    /// Creates an empty calendar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `crew_id` sick on `day`.
    pub fn mark(&mut self, crew_id: impl Into<String>, day: NaiveDate) {
        self.days.entry(crew_id.into()).or_default().insert(day);
    }

    /// Builder form of [`mark`](Self::mark).
    pub fn with_sick_day(mut self, crew_id: impl Into<String>, day: NaiveDate) -> Self {
        self.mark(crew_id, day);
        self
    }

    /// Whether `crew_id` is sick on `day`.
    pub fn is_sick(&self, crew_id: &str, day: NaiveDate) -> bool {
        self.days.get(crew_id).is_some_and(|d| d.contains(&day))
    }

    /// Crew with at least one sick day.
    pub fn crew_ids(&self) -> impl Iterator<Item = &str> {
        self.days.keys().map(String::as_str)
    }

    /// Whether no sickness is recorded.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Inclusive range of departure dates to roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningWindow {
    /// First departure date (inclusive). `None` = unbounded.
    pub start: Option<NaiveDate>,
    /// Last departure date (inclusive). `None` = unbounded.
    pub end: Option<NaiveDate>,
}

impl PlanningWindow {
    /// A window between two dates.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Whether a flight departs inside the window.
    pub fn contains(&self, flight: &Flight) -> bool {
        let day = flight.operating_day();
        self.start.map_or(true, |s| day >= s) && self.end.map_or(true, |e| day <= e)
    }
}

/// Produces the post-disruption flight set.
///
/// Flights outside `window` are dropped first (by scheduled departure
/// date), then cancellations are removed and delays shift both
/// timestamps. Disruptions naming unknown flights are ignored.
///
/// # Errors
/// An [`InvalidTimes`](ValidationErrorKind::InvalidTimes) error per
/// delayed flight whose shifted times fall outside the representable
/// date range.
pub fn apply_disruptions(
    flights: &[Flight],
    disruptions: &[Disruption],
    window: Option<&PlanningWindow>,
) -> Result<Vec<Flight>, Vec<ValidationError>> {
    let cancelled: BTreeSet<&str> = disruptions
        .iter()
        .filter(|d| d.kind == DisruptionKind::Cancellation)
        .map(|d| d.flight_id.as_str())
        .collect();
    let mut delays: BTreeMap<&str, i64> = BTreeMap::new();
    for d in disruptions.iter().filter(|d| d.kind == DisruptionKind::Delay) {
        delays.insert(d.flight_id.as_str(), d.delay_minutes);
    }

    let mut errors = Vec::new();
    let out = flights
        .iter()
        .filter(|f| window.map_or(true, |w| w.contains(f)))
        .filter(|f| !cancelled.contains(f.id.as_str()))
        .filter_map(|f| {
            let mut f = f.clone();
            if let Some(&minutes) = delays.get(f.id.as_str()) {
                let Some((dep, arr)) = delayed(&f, minutes) else {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvalidTimes,
                        format!("Flight {}: delay of {minutes} minutes is out of range", f.id),
                    ));
                    return None;
                };
                f.dep = dep;
                f.arr = arr;
            }
            Some(f)
        })
        .collect();
    if errors.is_empty() {
        Ok(out)
    } else {
        Err(errors)
    }
}

/// Departure and arrival shifted by `minutes`, if representable.
fn delayed(flight: &Flight, minutes: i64) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let delta = TimeDelta::try_minutes(minutes)?;
    Some((
        flight.dep.checked_add_signed(delta)?,
        flight.arr.checked_add_signed(delta)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn sample_flights() -> Vec<Flight> {
        vec![
            Flight::new("F1", "DEL", "BOM", at(8, 8), at(8, 10), "A320"),
            Flight::new("F2", "BOM", "DEL", at(8, 12), at(8, 14), "A320"),
            Flight::new("F3", "DEL", "BLR", at(9, 8), at(9, 11), "A320"),
        ]
    }

    #[test]
    fn test_cancellation_removes_flight() {
        let out =
            apply_disruptions(&sample_flights(), &[Disruption::cancellation("F2")], None).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|f| f.id != "F2"));
    }

    #[test]
    fn test_delay_shifts_both_times() {
        let delays = [Disruption::delay("F1", 90)];
        let out = apply_disruptions(&sample_flights(), &delays, None).unwrap();
        let f1 = out.iter().find(|f| f.id == "F1").unwrap();
        assert_eq!(f1.dep, at(8, 9) + TimeDelta::minutes(30));
        assert_eq!(f1.duration_minutes(), 120);
    }

    #[test]
    fn test_negative_delay_moves_flight_earlier() {
        let delays = [Disruption::delay("F3", -60)];
        let out = apply_disruptions(&sample_flights(), &delays, None).unwrap();
        let f3 = out.iter().find(|f| f.id == "F3").unwrap();
        assert_eq!(f3.dep, at(9, 7));
        assert_eq!(f3.arr, at(9, 10));
    }

    #[test]
    fn test_overflowing_delay_is_rejected() {
        // too large for a time delta at all
        let errors = apply_disruptions(
            &sample_flights(),
            &[Disruption::delay("F1", i64::MAX / 1000)],
            None,
        )
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidTimes);
        assert!(errors[0].message.contains("F1"));

        // a valid delta that runs past the last representable date
        let five_hundred_millennia = 500_000 * 366 * 24 * 60;
        let errors = apply_disruptions(
            &sample_flights(),
            &[
                Disruption::delay("F2", five_hundred_millennia),
                Disruption::delay("F3", -five_hundred_millennia),
            ],
            None,
        )
        .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_overflowing_delay_on_cancelled_flight_is_ignored() {
        let out = apply_disruptions(
            &sample_flights(),
            &[
                Disruption::cancellation("F1"),
                Disruption::delay("F1", i64::MAX),
            ],
            None,
        )
        .unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_planning_window() {
        let day = NaiveDate::from_ymd_opt(2025, 9, 9).unwrap();
        let window = PlanningWindow::between(day, day);
        let out = apply_disruptions(&sample_flights(), &[], Some(&window)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "F3");
    }

    #[test]
    fn test_sickness_is_per_day() {
        let d8 = NaiveDate::from_ymd_opt(2025, 9, 8).unwrap();
        let d9 = NaiveDate::from_ymd_opt(2025, 9, 9).unwrap();
        let sick = SicknessCalendar::new().with_sick_day("C1", d8);
        assert!(sick.is_sick("C1", d8));
        assert!(!sick.is_sick("C1", d9));
        assert!(!sick.is_sick("C2", d8));
    }

    #[test]
    fn test_sector_preference() {
        let p = CrewPreference::new("C1").with_sector("DEL-BOM");
        assert!(!p.dislikes_sector("DEL-BOM"));
        assert!(p.dislikes_sector("BOM-DEL"));
        assert!(!CrewPreference::new("C2").dislikes_sector("BOM-DEL"));
    }
}
