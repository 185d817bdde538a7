//! Regulatory rules and derived lookups.
//!
//! [`Rules`] is the single source of regulatory arithmetic: duty caps,
//! rest, turnaround padding, night/WOCL membership, FDP landing
//! brackets, WOCL reductions, cumulative flight-time caps and crew
//! composition. The CP encoder, the GA fitness/repair code and the
//! post-solve audit all call these methods rather than re-deriving the
//! numbers.
//!
//! Every table is `#[serde(default)]`, so a partial rules document is
//! defaulted once at load time and then treated as read-only.
//!
//! # Approximations
//! Local-time windows are matched against naive timestamps, and daily
//! duty time is approximated by summed block time. The documented
//! thresholds are the contract; stricter real-world law is not inferred.
//!
//! # Reference
//! DGCA CAR Section 7, Series J, Part III (flight duty time limitations)

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::{Crew, CrewRole, DailyWindow, DutyInterval, Flight};

/// Daily duty-hour caps per role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyDutyCaps {
    /// Captain cap (hours).
    pub captain: u32,
    /// First officer cap (hours).
    pub first_officer: u32,
    /// Senior cabin crew cap (hours).
    pub senior_crew: u32,
    /// Cabin crew cap (hours).
    pub cabin_crew: u32,
}

impl Default for DailyDutyCaps {
    fn default() -> Self {
        Self {
            captain: 10,
            first_officer: 10,
            senior_crew: 12,
            cabin_crew: 11,
        }
    }
}

/// One row of the FDP table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FdpBracket {
    /// Upper bound of daily flight time for this row (hours).
    pub max_flight_time_hours: f64,
    /// Maximum flight duty period (hours).
    pub max_fdp_hours: f64,
    /// Maximum landings.
    pub max_landings: u32,
    /// Ultra-long-range row.
    #[serde(default)]
    pub ulr: bool,
}

impl FdpBracket {
    fn new(ft: f64, fdp: f64, landings: u32, ulr: bool) -> Self {
        Self {
            max_flight_time_hours: ft,
            max_fdp_hours: fdp,
            max_landings: landings,
            ulr,
        }
    }
}

/// Fractions of the WOCL length removed from the daily cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WoclReduction {
    /// Applied when a duty starts inside the WOCL.
    pub starts_in_wocl_factor: f64,
    /// Applied when a duty merely overlaps the WOCL.
    pub overlaps_wocl_factor: f64,
}

impl Default for WoclReduction {
    fn default() -> Self {
        Self {
            starts_in_wocl_factor: 1.0,
            overlaps_wocl_factor: 0.5,
        }
    }
}

/// Cumulative flight-time caps over rolling windows (hours).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightTimeLimits {
    /// 7-day cap.
    pub hours_7_days: u32,
    /// 28-day cap.
    pub hours_28_days: u32,
    /// 90-day cap.
    pub hours_90_days: u32,
    /// 365-day cap.
    pub hours_365_days: u32,
}

impl Default for FlightTimeLimits {
    fn default() -> Self {
        Self {
            hours_7_days: 40,
            hours_28_days: 115,
            hours_90_days: 300,
            hours_365_days: 1000,
        }
    }
}

/// Cumulative duty-time caps over rolling windows (hours).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DutyTimeLimits {
    /// 7-day cap.
    pub hours_7_days: u32,
    /// 28-day cap.
    pub hours_28_days: u32,
}

impl Default for DutyTimeLimits {
    fn default() -> Self {
        Self {
            hours_7_days: 65,
            hours_28_days: 210,
        }
    }
}

/// A seat-count band of the minimum cabin crew table.
///
/// Fixed bands carry `max_seats` and `min_cabin_crew`; the open-ended
/// band carries `step` and `extra_per_step` and adds crew on top of the
/// largest fixed band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatBand {
    /// First seat count in the band.
    pub min_seats: u32,
    /// Last seat count in the band (fixed bands).
    #[serde(default)]
    pub max_seats: Option<u32>,
    /// Cabin crew required (fixed bands).
    #[serde(default)]
    pub min_cabin_crew: Option<u32>,
    /// Seats per extra crew member (open band).
    #[serde(default)]
    pub step: Option<u32>,
    /// Crew added per step (open band).
    #[serde(default)]
    pub extra_per_step: Option<u32>,
}

/// SCCM composition rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SccmRule {
    /// Require an SCCM when cabin demand exceeds one.
    pub required_if_cc_gt_1: bool,
    /// SCCMs required on ultra-long-haul flights.
    pub min_sccm_ulh: u32,
    /// Minimum experience for a certified cabin crew member to act as SCCM.
    pub experience_min_months: u32,
}

impl Default for SccmRule {
    fn default() -> Self {
        Self {
            required_if_cc_gt_1: true,
            min_sccm_ulh: 2,
            experience_min_months: 12,
        }
    }
}

/// Cabin composition rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CabinComposition {
    /// Minimum cabin crew by seat count.
    pub min_by_seats: Vec<SeatBand>,
    /// SCCM requirement.
    pub sccm: SccmRule,
}

impl Default for CabinComposition {
    fn default() -> Self {
        Self {
            min_by_seats: vec![
                SeatBand {
                    min_seats: 10,
                    max_seats: Some(50),
                    min_cabin_crew: Some(1),
                    step: None,
                    extra_per_step: None,
                },
                SeatBand {
                    min_seats: 51,
                    max_seats: Some(100),
                    min_cabin_crew: Some(2),
                    step: None,
                    extra_per_step: None,
                },
                SeatBand {
                    min_seats: 101,
                    max_seats: None,
                    min_cabin_crew: None,
                    step: Some(50),
                    extra_per_step: Some(1),
                },
            ],
            sccm: SccmRule::default(),
        }
    }
}

/// Crew composition rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Composition {
    /// Cabin rules.
    pub cabin: CabinComposition,
}

/// Daily flight-time thresholds and landing limits derived from the FDP table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandingBrackets {
    /// Upper bound of the first bracket (minutes, inclusive).
    pub first_threshold: i64,
    /// Upper bound of the second bracket (minutes, inclusive).
    pub second_threshold: i64,
    /// Landing limits for the three brackets.
    pub landings: [u32; 3],
}

impl LandingBrackets {
    /// Landing limit for a day with `minutes` of flight time.
    pub fn limit_for(&self, minutes: i64) -> u32 {
        if minutes <= self.first_threshold {
            self.landings[0]
        } else if minutes <= self.second_threshold {
            self.landings[1]
        } else {
            self.landings[2]
        }
    }
}

/// Process-wide regulatory configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Daily duty caps per role.
    pub daily_max_duty_hours: DailyDutyCaps,
    /// Weekly duty cap for crew without a personal cap.
    pub weekly_max_duty_hours_default: u32,
    /// Minimum rest between consecutive duties.
    pub min_rest_hours_between_duties: u32,
    /// Maximum night duties per week.
    pub max_overnight_duties_per_week: u32,
    /// Ground buffer appended after each arrival.
    pub turnaround_minutes: u32,
    /// Night-duty window (local).
    pub night_duty_window: DailyWindow,
    /// Maximum night duties on consecutive dates.
    pub max_consecutive_night_duties: u32,
    /// Window of circadian low (local).
    pub wocl_window: DailyWindow,
    /// FDP table.
    pub fdp_rules: Vec<FdpBracket>,
    /// WOCL reduction factors.
    pub fdp_wocl_reduction: WoclReduction,
    /// Cumulative flight-time caps.
    pub flight_time_limits: FlightTimeLimits,
    /// Cumulative duty-time caps.
    pub duty_time_limits: DutyTimeLimits,
    /// Composition rules.
    pub composition: Composition,
    /// Flight time above which a flight is ultra-long-haul (hours).
    pub ulh_ft_threshold_hours: f64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            daily_max_duty_hours: DailyDutyCaps::default(),
            weekly_max_duty_hours_default: 45,
            min_rest_hours_between_duties: 12,
            max_overnight_duties_per_week: 4,
            turnaround_minutes: 45,
            night_duty_window: DailyWindow::from_hm((22, 0), (5, 0)),
            max_consecutive_night_duties: 3,
            wocl_window: DailyWindow::from_hm((2, 0), (6, 0)),
            fdp_rules: vec![
                FdpBracket::new(8.0, 12.0, 6, false),
                FdpBracket::new(11.0, 15.0, 3, false),
                FdpBracket::new(14.0, 18.0, 1, false),
                FdpBracket::new(22.0, 22.0, 1, true),
            ],
            fdp_wocl_reduction: WoclReduction::default(),
            flight_time_limits: FlightTimeLimits::default(),
            duty_time_limits: DutyTimeLimits::default(),
            composition: Composition::default(),
            ulh_ft_threshold_hours: 11.0,
        }
    }
}

impl Rules {
    // ---- duty caps ----

    /// Daily duty cap for `role` in hours.
    pub fn daily_cap_for_role(&self, role: CrewRole) -> u32 {
        let caps = &self.daily_max_duty_hours;
        match role {
            CrewRole::Captain => caps.captain,
            CrewRole::FirstOfficer => caps.first_officer,
            CrewRole::SeniorCrew => caps.senior_crew,
            CrewRole::CabinCrew => caps.cabin_crew,
        }
    }

    /// Daily duty cap for `role` in minutes.
    #[inline]
    pub fn daily_cap_minutes(&self, role: CrewRole) -> i64 {
        self.daily_cap_for_role(role) as i64 * 60
    }

    /// Weekly duty cap for a crew member in minutes.
    pub fn weekly_cap_minutes(&self, crew: &Crew) -> i64 {
        crew.weekly_max_duty_hours
            .unwrap_or(self.weekly_max_duty_hours_default) as i64
            * 60
    }

    /// Hard 7-day cumulative flight-time cap in minutes.
    #[inline]
    pub fn flight_time_cap_7d_minutes(&self) -> i64 {
        self.flight_time_limits.hours_7_days as i64 * 60
    }

    // ---- turnaround & rest ----

    /// Minimum rest in minutes.
    #[inline]
    pub fn min_rest_minutes(&self) -> i64 {
        self.min_rest_hours_between_duties as i64 * 60
    }

    /// Flight interval `[dep, arr + turnaround]`.
    pub fn padded_interval(&self, flight: &Flight) -> DutyInterval {
        flight.interval().padded(self.turnaround_minutes as i64)
    }

    /// Whether two flights' turnaround-padded intervals overlap.
    pub fn overlaps_with_turnaround(&self, a: &Flight, b: &Flight) -> bool {
        self.padded_interval(a).overlaps(&self.padded_interval(b))
    }

    /// Whether the ground time between two flights is below minimum rest.
    ///
    /// Order-independent: the gap is measured from the earlier
    /// departure's arrival to the later departure.
    pub fn rest_insufficient(&self, a: &Flight, b: &Flight) -> bool {
        let (first, second) = if a.dep <= b.dep { (a, b) } else { (b, a) };
        second.dep - first.arr < Duration::minutes(self.min_rest_minutes())
    }

    // ---- night & WOCL ----

    /// Whether any part of the flight falls in the night-duty window.
    #[inline]
    pub fn is_night_duty(&self, flight: &Flight) -> bool {
        self.night_duty_window.touches(flight.dep, flight.arr)
    }

    /// Whether the flight departs inside the WOCL.
    #[inline]
    pub fn starts_in_wocl(&self, flight: &Flight) -> bool {
        self.wocl_window.contains(flight.dep)
    }

    /// Whether any part of the flight falls in the WOCL.
    #[inline]
    pub fn overlaps_wocl(&self, flight: &Flight) -> bool {
        self.wocl_window.touches(flight.dep, flight.arr)
    }

    /// Daily-cap reductions `(full, half)` in minutes for `role`.
    ///
    /// `full` applies when a duty starts in the WOCL, `half` when it only
    /// overlaps. Both are clamped to the role's daily cap.
    pub fn wocl_reductions(&self, role: CrewRole) -> (i64, i64) {
        let cap = self.daily_cap_minutes(role);
        let len = self.wocl_window.length_minutes() as f64;
        let f = &self.fdp_wocl_reduction;
        let full = (len * f.starts_in_wocl_factor).floor() as i64;
        let half = (len * f.overlaps_wocl_factor).floor() as i64;
        (full.clamp(0, cap), half.clamp(0, cap))
    }

    /// Effective daily cap given the day's WOCL exposure.
    pub fn effective_daily_cap(&self, role: CrewRole, starts_in: bool, overlaps: bool) -> i64 {
        let cap = self.daily_cap_minutes(role);
        let (full, half) = self.wocl_reductions(role);
        let mut effective = cap;
        if starts_in {
            effective = effective.min(cap - full);
        }
        if overlaps {
            effective = effective.min(cap - half);
        }
        effective
    }

    // ---- FDP brackets ----

    /// Three-bracket landing limits from the non-ULR FDP rows.
    ///
    /// Rows are ordered by flight time; the first two rows give the
    /// bracket thresholds and the first three give the landing limits.
    /// Falls back to the default table when fewer than three rows exist.
    pub fn landing_brackets(&self) -> LandingBrackets {
        let mut rows: Vec<&FdpBracket> = self.fdp_rules.iter().filter(|r| !r.ulr).collect();
        rows.sort_by(|a, b| a.max_flight_time_hours.total_cmp(&b.max_flight_time_hours));
        if rows.len() < 3 {
            return LandingBrackets {
                first_threshold: 8 * 60,
                second_threshold: 11 * 60,
                landings: [6, 3, 1],
            };
        }
        LandingBrackets {
            first_threshold: (rows[0].max_flight_time_hours * 60.0).round() as i64,
            second_threshold: (rows[1].max_flight_time_hours * 60.0).round() as i64,
            landings: [rows[0].max_landings, rows[1].max_landings, rows[2].max_landings],
        }
    }

    // ---- composition ----

    /// Whether the flight is ultra-long-haul.
    pub fn is_ulh(&self, flight: &Flight) -> bool {
        flight.duration_hours() > self.ulh_ft_threshold_hours
    }

    /// SCCMs required on a flight (0 when no requirement applies).
    pub fn sccm_required(&self, flight: &Flight) -> u32 {
        let sccm = &self.composition.cabin.sccm;
        if !sccm.required_if_cc_gt_1 || flight.demand.cabin() <= 1 {
            return 0;
        }
        if self.is_ulh(flight) {
            sccm.min_sccm_ulh.max(1)
        } else {
            1
        }
    }

    /// Whether a crew member can act as SCCM.
    ///
    /// Senior crew always qualify; cabin crew need certification and the
    /// minimum experience.
    pub fn is_sccm_qualified(&self, crew: &Crew) -> bool {
        match crew.role {
            CrewRole::SeniorCrew => true,
            CrewRole::CabinCrew => {
                crew.sccm_certified
                    && crew.experience_months >= self.composition.cabin.sccm.experience_min_months
            }
            _ => false,
        }
    }

    /// Minimum cabin crew for a passenger seat count.
    pub fn min_cabin_crew_for_seats(&self, seats: u32) -> u32 {
        let bands = &self.composition.cabin.min_by_seats;
        let mut fixed_max = 0;
        for band in bands {
            if let (Some(max), Some(crew)) = (band.max_seats, band.min_cabin_crew) {
                fixed_max = fixed_max.max(crew);
                if band.min_seats <= seats && seats <= max {
                    return crew;
                }
            }
        }
        for band in bands {
            if let (Some(step), Some(extra)) = (band.step, band.extra_per_step) {
                if seats >= band.min_seats && step > 0 {
                    return fixed_max + extra * ((seats - band.min_seats) / step + 1);
                }
            }
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeatDemand;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn flight(id: &str, dep: NaiveDateTime, arr: NaiveDateTime) -> Flight {
        Flight::new(id, "DEL", "BOM", dep, arr, "A320")
    }

    #[test]
    fn test_default_caps() {
        let r = Rules::default();
        assert_eq!(r.daily_cap_for_role(CrewRole::Captain), 10);
        assert_eq!(r.daily_cap_for_role(CrewRole::SeniorCrew), 12);
        assert_eq!(r.daily_cap_minutes(CrewRole::CabinCrew), 660);

        let c = Crew::new("C1", CrewRole::Captain, "DEL");
        assert_eq!(r.weekly_cap_minutes(&c), 45 * 60);
        assert_eq!(r.weekly_cap_minutes(&c.with_weekly_cap(30)), 30 * 60);
    }

    #[test]
    fn test_turnaround_overlap() {
        let r = Rules::default();
        let a = flight("A", at(8, 8, 0), at(8, 10, 0));
        let b = flight("B", at(8, 10, 30), at(8, 12, 0));
        let c = flight("C", at(8, 11, 0), at(8, 12, 0));
        assert!(r.overlaps_with_turnaround(&a, &b));
        assert!(!r.overlaps_with_turnaround(&a, &c));
    }

    #[test]
    fn test_rest_insufficient_is_symmetric() {
        let r = Rules::default();
        let a = flight("A", at(8, 8, 0), at(8, 10, 0));
        let b = flight("B", at(8, 20, 0), at(8, 22, 0));
        let c = flight("C", at(9, 8, 0), at(9, 10, 0));
        assert!(r.rest_insufficient(&a, &b));
        assert!(r.rest_insufficient(&b, &a));
        assert!(!r.rest_insufficient(&a, &c));
    }

    #[test]
    fn test_wocl_reductions_and_effective_cap() {
        let r = Rules::default();
        assert_eq!(r.wocl_reductions(CrewRole::Captain), (240, 120));
        assert_eq!(r.effective_daily_cap(CrewRole::Captain, false, false), 600);
        assert_eq!(r.effective_daily_cap(CrewRole::Captain, false, true), 480);
        assert_eq!(r.effective_daily_cap(CrewRole::Captain, true, true), 360);

        let early = flight("E", at(8, 3, 0), at(8, 5, 0));
        assert!(r.starts_in_wocl(&early));
        assert!(r.overlaps_wocl(&early));
        assert!(r.is_night_duty(&early));
    }

    #[test]
    fn test_landing_brackets() {
        let b = Rules::default().landing_brackets();
        assert_eq!(b.first_threshold, 480);
        assert_eq!(b.second_threshold, 660);
        assert_eq!(b.limit_for(480), 6);
        assert_eq!(b.limit_for(481), 3);
        assert_eq!(b.limit_for(661), 1);
    }

    #[test]
    fn test_sccm_rules() {
        let r = Rules::default();
        let short = flight("S", at(8, 8, 0), at(8, 10, 0)).with_demand(SeatDemand::new(1, 1, 0, 2));
        let ulh = flight("U", at(8, 0, 0), at(8, 12, 0)).with_demand(SeatDemand::new(1, 1, 1, 3));
        let tiny = flight("T", at(8, 8, 0), at(8, 9, 0)).with_demand(SeatDemand::new(1, 1, 0, 1));
        assert_eq!(r.sccm_required(&short), 1);
        assert_eq!(r.sccm_required(&ulh), 2);
        assert_eq!(r.sccm_required(&tiny), 0);

        let junior = Crew::new("J", CrewRole::CabinCrew, "DEL").with_sccm(true, 6);
        let senior_cc = Crew::new("S", CrewRole::CabinCrew, "DEL").with_sccm(true, 24);
        assert!(!r.is_sccm_qualified(&junior));
        assert!(r.is_sccm_qualified(&senior_cc));
        assert!(r.is_sccm_qualified(&Crew::new("P", CrewRole::SeniorCrew, "DEL")));
    }

    #[test]
    fn test_min_cabin_crew_by_seats() {
        let r = Rules::default();
        assert_eq!(r.min_cabin_crew_for_seats(5), 0);
        assert_eq!(r.min_cabin_crew_for_seats(50), 1);
        assert_eq!(r.min_cabin_crew_for_seats(72), 2);
        assert_eq!(r.min_cabin_crew_for_seats(101), 3);
        assert_eq!(r.min_cabin_crew_for_seats(180), 4);
    }

    #[test]
    fn test_partial_rules_json_defaults() {
        let json = r#"{
            "turnaround_minutes": 30,
            "night_duty_window": {"start_local": "23:00", "end_local": "04:00"},
            "daily_max_duty_hours": {"captain": 9}
        }"#;
        let r: Rules = serde_json::from_str(json).unwrap();
        assert_eq!(r.turnaround_minutes, 30);
        assert_eq!(r.night_duty_window.start_minute, 23 * 60);
        assert_eq!(r.daily_cap_for_role(CrewRole::Captain), 9);
        assert_eq!(r.daily_cap_for_role(CrewRole::CabinCrew), 11);
        assert_eq!(r.min_rest_hours_between_duties, 12);
        assert_eq!(r.fdp_rules.len(), 4);
    }

    #[test]
    fn test_malformed_window_rejected() {
        let json = r#"{"wocl_window": {"start_local": "2am", "end_local": "06:00"}}"#;
        assert!(serde_json::from_str::<Rules>(json).is_err());
    }
}
