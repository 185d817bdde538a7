//! Time-of-day windows and duty intervals.
//!
//! Regulatory windows (night duty, WOCL) are expressed in local
//! wall-clock minutes and may wrap midnight (e.g., 22:00–05:00).
//!
//! # Time Model
//! All timestamps are naive local times. Timezone-aware circadian
//! modelling is out of scope; a window is matched against the local
//! clock of the departure/arrival timestamps.
//!
//! # Interval Semantics
//! A window occurrence is half-open `[start, end)`. A duty `[dep, arr]`
//! touches a window if the two intersect on any calendar day.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::validation::{ValidationError, ValidationErrorKind};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// A recurring daily window `[start, end)` in local minutes after midnight.
///
/// If `start_minute > end_minute` the window wraps midnight.
/// Serialized as `{"start_local": "HH:MM", "end_local": "HH:MM"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LocalWindow", into = "LocalWindow")]
pub struct DailyWindow {
    /// Window start (minutes after local midnight, inclusive).
    pub start_minute: u32,
    /// Window end (minutes after local midnight, exclusive).
    pub end_minute: u32,
}

/// Wire form of a [`DailyWindow`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LocalWindow {
    start_local: String,
    end_local: String,
}

impl DailyWindow {
    /// Creates a window from `(hour, minute)` pairs.
    pub fn from_hm(start: (u32, u32), end: (u32, u32)) -> Self {
        Self {
            start_minute: (start.0 * 60 + start.1) % MINUTES_PER_DAY,
            end_minute: (end.0 * 60 + end.1) % MINUTES_PER_DAY,
        }
    }

    /// Parses `"HH:MM"` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            start_minute: parse_hhmm(start)?,
            end_minute: parse_hhmm(end)?,
        })
    }

    /// Whether the window crosses local midnight.
    #[inline]
    pub fn wraps(&self) -> bool {
        self.start_minute > self.end_minute
    }

    /// Window length in minutes.
    pub fn length_minutes(&self) -> i64 {
        if self.wraps() {
            (MINUTES_PER_DAY - self.start_minute + self.end_minute) as i64
        } else {
            (self.end_minute - self.start_minute) as i64
        }
    }

    /// Whether a local clock time falls inside the window.
    pub fn contains_time(&self, time: NaiveTime) -> bool {
        let m = time.hour() * 60 + time.minute();
        if self.wraps() {
            m >= self.start_minute || m < self.end_minute
        } else {
            self.start_minute <= m && m < self.end_minute
        }
    }

    /// Whether a timestamp's local clock time falls inside the window.
    #[inline]
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.contains_time(at.time())
    }

    /// Whether any part of `[start, end]` lies inside the window.
    ///
    /// Checks every window occurrence anchored between the day before
    /// `start` and the day of `end`, so multi-day duties and wrapping
    /// windows are both handled.
    pub fn touches(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        if self.contains(start) || self.contains(end) {
            return true;
        }
        if self.length_minutes() == 0 {
            return false;
        }
        let first = start.date() - Duration::days(1);
        let mut day = first;
        while day <= end.date() {
            let (occ_start, occ_end) = self.occurrence(day);
            if occ_start < end && start < occ_end {
                return true;
            }
            day += Duration::days(1);
        }
        false
    }

    /// The occurrence of this window that opens on `day`.
    fn occurrence(&self, day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let open = day.and_time(NaiveTime::MIN) + Duration::minutes(self.start_minute as i64);
        (open, open + Duration::minutes(self.length_minutes()))
    }
}

impl TryFrom<LocalWindow> for DailyWindow {
    type Error = ValidationError;

    fn try_from(raw: LocalWindow) -> Result<Self, Self::Error> {
        Self::parse(&raw.start_local, &raw.end_local)
    }
}

impl From<DailyWindow> for LocalWindow {
    fn from(w: DailyWindow) -> Self {
        Self {
            start_local: format_hhmm(w.start_minute),
            end_local: format_hhmm(w.end_minute),
        }
    }
}

fn parse_hhmm(s: &str) -> Result<u32, ValidationError> {
    let time = NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|e| {
        ValidationError::new(
            ValidationErrorKind::MalformedField,
            format!("Expected local time as HH:MM, got '{s}': {e}"),
        )
    })?;
    Ok(time.hour() * 60 + time.minute())
}

fn format_hhmm(minute: u32) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// A closed duty interval `[start, end]` in naive local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyInterval {
    /// Interval start.
    pub start: NaiveDateTime,
    /// Interval end.
    pub end: NaiveDateTime,
}

impl DutyInterval {
    /// Creates a new interval.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Extends the end by `minutes` (turnaround padding).
    pub fn padded(self, minutes: i64) -> Self {
        Self {
            start: self.start,
            end: self.end + Duration::minutes(minutes),
        }
    }

    /// Whether two intervals overlap. Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}
