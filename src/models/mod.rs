//! Rostering domain models.
//!
//! Provides the typed entities of a rostering run (flights, crew,
//! preferences, disruptions, sickness), the regulatory [`Rules`] with
//! their derived lookups, and the solution types.
//!
//! # Domain Mappings
//!
//! | u-roster | Scheduling term |
//! |----------|-----------------|
//! | Flight | Activity with fixed start/end |
//! | Crew | Human resource |
//! | Role slot | Resource requirement |
//! | Assignment | Activity-resource allocation |

mod crew;
mod disruption;
mod flight;
mod problem;
pub mod records;
mod roster;
mod rules;
mod weights;
mod window;

pub use crew::{Crew, CrewRole};
pub use disruption::{
    apply_disruptions, CrewPreference, Disruption, DisruptionKind, PlanningWindow,
    SicknessCalendar,
};
pub use flight::{Flight, SeatDemand};
pub use problem::RosterProblem;
pub use roster::{minutes_by_crew, Assignment, RosterAssignment, Violation, ViolationType};
pub use rules::{
    CabinComposition, Composition, DailyDutyCaps, DutyTimeLimits, FdpBracket, FlightTimeLimits,
    LandingBrackets, Rules, SccmRule, SeatBand, WoclReduction,
};
pub use weights::ObjectiveWeights;
pub use window::{DailyWindow, DutyInterval};
