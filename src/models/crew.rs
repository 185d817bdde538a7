//! Crew model.
//!
//! Crew members are the resources that fill flight seats. Each has a
//! normalized role, a home base, a set of aircraft type ratings, and the
//! per-person attributes consulted by composition rules (SCCM
//! certification, experience).
//!
//! # Role Normalization
//! Raw role strings are normalized exactly once, at the ingestion
//! boundary, via [`CrewRole::from_str`]. Internal logic only ever
//! matches on the closed enumeration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::validation::{ValidationError, ValidationErrorKind};

/// Normalized crew role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CrewRole {
    /// Pilot in command.
    Captain,
    /// Second pilot.
    FirstOfficer,
    /// Senior cabin crew (purser).
    SeniorCrew,
    /// Cabin crew.
    CabinCrew,
}

impl CrewRole {
    /// All roles in slot-emission order.
    pub const ALL: [CrewRole; 4] = [
        CrewRole::Captain,
        CrewRole::FirstOfficer,
        CrewRole::SeniorCrew,
        CrewRole::CabinCrew,
    ];

    /// Whether this role sits on the flight deck.
    #[inline]
    pub fn is_pilot(self) -> bool {
        matches!(self, CrewRole::Captain | CrewRole::FirstOfficer)
    }

    /// Whether this role works in the cabin.
    #[inline]
    pub fn is_cabin(self) -> bool {
        !self.is_pilot()
    }

    /// Canonical display name.
    pub fn as_str(self) -> &'static str {
        match self {
            CrewRole::Captain => "Captain",
            CrewRole::FirstOfficer => "First Officer",
            CrewRole::SeniorCrew => "Senior Crew",
            CrewRole::CabinCrew => "Cabin Crew",
        }
    }
}

impl fmt::Display for CrewRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CrewRole {
    type Err = ValidationError;

    /// Normalizes a raw role string.
    ///
    /// Matching is case-insensitive and ignores spaces, underscores
    /// and hyphens. Unknown roles are a data error.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key: String = raw
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "captain" | "cpt" | "capt" => Ok(CrewRole::Captain),
            "firstofficer" | "fo" => Ok(CrewRole::FirstOfficer),
            "seniorcrew" | "seniorcabincrew" | "seniorcabin" | "sc" | "purser" => {
                Ok(CrewRole::SeniorCrew)
            }
            "cabincrew" | "juniorcabincrew" | "cc" | "flightattendant" => Ok(CrewRole::CabinCrew),
            _ => Err(ValidationError::new(
                ValidationErrorKind::UnknownRole,
                format!("Unknown crew role '{raw}'"),
            )),
        }
    }
}

/// A crew member who can be rostered onto flights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crew {
    /// Unique crew identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Normalized role.
    pub role: CrewRole,
    /// Home base airport code.
    pub base: String,
    /// Aircraft types this crew member is rated on.
    pub qualified_types: BTreeSet<String>,
    /// Personal weekly duty-hour cap; `None` uses the rules default.
    pub weekly_max_duty_hours: Option<u32>,
    /// Precomputed availability for the whole run.
    pub available: bool,
    /// Senior cabin crew member certification.
    pub sccm_certified: bool,
    /// Line experience in months.
    pub experience_months: u32,
}

impl Crew {
    /// Creates an available crew member with no type ratings.
    pub fn new(id: impl Into<String>, role: CrewRole, base: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            role,
            base: base.into(),
            qualified_types: BTreeSet::new(),
            weekly_max_duty_hours: None,
            available: true,
            sccm_certified: false,
            experience_months: 0,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds an aircraft type rating.
    pub fn with_type(mut self, aircraft_type: impl Into<String>) -> Self {
        self.qualified_types.insert(aircraft_type.into());
        self
    }

    /// Sets a personal weekly duty-hour cap.
    pub fn with_weekly_cap(mut self, hours: u32) -> Self {
        self.weekly_max_duty_hours = Some(hours);
        self
    }

    /// Marks the crew member unavailable for the run.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Sets SCCM certification and experience.
    pub fn with_sccm(mut self, certified: bool, experience_months: u32) -> Self {
        self.sccm_certified = certified;
        self.experience_months = experience_months;
        self
    }

    /// Whether this crew member is rated on `aircraft_type`.
    #[inline]
    pub fn qualified_for(&self, aircraft_type: &str) -> bool {
        self.qualified_types.contains(aircraft_type)
    }
}
