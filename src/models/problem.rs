//! A validated, read-only rostering problem.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

use super::{Crew, CrewPreference, Flight, Rules, SicknessCalendar};
use crate::error::RosterError;
use crate::validation::validate_input;

/// Everything one optimization run reads.
///
/// Built once per run via [`RosterProblem::new`], which validates the
/// inputs. Both solving paths borrow it immutably.
#[derive(Debug, Clone)]
pub struct RosterProblem {
    /// Post-disruption flights, sorted by departure then ID.
    pub flights: Vec<Flight>,
    /// Crew roster.
    pub crew: Vec<Crew>,
    /// Regulatory configuration.
    pub rules: Rules,
    /// Preferences keyed by crew ID.
    pub preferences: BTreeMap<String, CrewPreference>,
    /// Per-date sickness.
    pub sickness: SicknessCalendar,
    flight_index: BTreeMap<String, usize>,
    crew_index: BTreeMap<String, usize>,
}

impl RosterProblem {
    /// Validates inputs and builds the problem.
    ///
    /// # Errors
    /// [`RosterError::InvalidData`] with every detected issue.
    pub fn new(mut flights: Vec<Flight>, crew: Vec<Crew>, rules: Rules) -> Result<Self, RosterError> {
        validate_input(&flights, &crew, &rules).map_err(RosterError::InvalidData)?;
        flights.sort_by(|a, b| a.dep.cmp(&b.dep).then_with(|| a.id.cmp(&b.id)));
        let flight_index = flights
            .iter()
            .enumerate()
            .map(|(i, f)| (f.id.clone(), i))
            .collect();
        let crew_index = crew.iter().enumerate().map(|(i, c)| (c.id.clone(), i)).collect();
        Ok(Self {
            flights,
            crew,
            rules,
            preferences: BTreeMap::new(),
            sickness: SicknessCalendar::new(),
            flight_index,
            crew_index,
        })
    }

    /// Attaches crew preferences.
    pub fn with_preferences(mut self, prefs: impl IntoIterator<Item = CrewPreference>) -> Self {
        self.preferences = prefs.into_iter().map(|p| (p.crew_id.clone(), p)).collect();
        self
    }

    /// Attaches per-date sickness.
    pub fn with_sickness(mut self, sickness: SicknessCalendar) -> Self {
        self.sickness = sickness;
        self
    }

    /// Looks up a flight.
    pub fn flight(&self, id: &str) -> Option<&Flight> {
        self.flight_index.get(id).map(|&i| &self.flights[i])
    }

    /// Looks up a crew member.
    pub fn crew_member(&self, id: &str) -> Option<&Crew> {
        self.crew_index.get(id).map(|&i| &self.crew[i])
    }

    /// Preference for a crew member, if any.
    pub fn preference(&self, crew_id: &str) -> Option<&CrewPreference> {
        self.preferences.get(crew_id)
    }

    /// Sorted distinct departure dates.
    pub fn operating_days(&self) -> BTreeSet<NaiveDate> {
        self.flights.iter().map(Flight::operating_day).collect()
    }

    /// Crew marked available for the run.
    pub fn available_crew(&self) -> impl Iterator<Item = &Crew> {
        self.crew.iter().filter(|c| c.available)
    }

    /// Total required role slots.
    pub fn total_role_slots(&self) -> usize {
        self.flights.iter().map(|f| f.total_required() as usize).sum()
    }
}
