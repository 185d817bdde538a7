//! Post-solve rule audit.
//!
//! Checks any roster against the shared [`Rules`] and reports advisory
//! [`Violation`]s. Exact-path rosters should come back clean apart
//! from soft terms; genetic rosters are explained by it.
//!
//! # Checks
//!
//! | Check | Scope |
//! |-------|-------|
//! | Overlap with turnaround | crew, flight pair |
//! | Rest shortfall | crew, adjacent flights |
//! | Daily cap (WOCL-reduced) | crew, operating day |
//! | Landings per FDP bracket | crew, operating day |
//! | Night limits (weekly, consecutive) | crew |
//! | 7-day flight time | crew |
//! | Continuity | crew, adjacent flights |
//! | Uncovered slot | flight, role |
//! | SCCM shortfall | flight |

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

use crate::ga::itineraries;
use crate::models::{
    Assignment, Crew, CrewRole, Flight, RosterProblem, Rules, Violation, ViolationType,
};

/// Audits a roster, returning violations sorted by descending severity.
///
/// Assignments naming unknown flights or crew are skipped.
pub fn audit_roster(assignments: &[Assignment], problem: &RosterProblem) -> Vec<Violation> {
    let known: Vec<Assignment> = assignments
        .iter()
        .filter(|a| {
            let ok = problem.flight(&a.flight_id).is_some() && problem.crew_member(&a.crew_id).is_some();
            if !ok {
                warn!(crew = %a.crew_id, flight = %a.flight_id, "audit skips unknown reference");
            }
            ok
        })
        .cloned()
        .collect();

    let rules = &problem.rules;
    let mut out = Vec::new();

    for (crew_id, flights) in itineraries(&known, problem) {
        let Some(crew) = problem.crew_member(&crew_id) else {
            continue;
        };
        audit_pairs(crew, &flights, rules, &mut out);
        audit_days(crew, &flights, rules, &mut out);
        audit_nights(crew, &flights, rules, &mut out);
        audit_flight_time(crew, &flights, rules, &mut out);
    }
    audit_flights(&known, problem, &mut out);

    out.sort_by(|a, b| b.severity.cmp(&a.severity));
    debug!(assignments = assignments.len(), violations = out.len(), "roster audited");
    out
}

fn audit_pairs(crew: &Crew, flights: &[&Flight], rules: &Rules, out: &mut Vec<Violation>) {
    let turnaround = Duration::minutes(rules.turnaround_minutes as i64);
    for (i, a) in flights.iter().enumerate() {
        for b in &flights[i + 1..] {
            if b.dep >= a.arr + turnaround {
                break;
            }
            if rules.overlaps_with_turnaround(a, b) {
                out.push(Violation::new(
                    ViolationType::Overlap,
                    &crew.id,
                    format!("{} and {} overlap within turnaround", a.id, b.id),
                ));
            }
        }
    }

    for w in flights.windows(2) {
        let (a, b) = (w[0], w[1]);
        if !b.continues_from(a) {
            out.push(Violation::new(
                ViolationType::ContinuityBreak,
                &crew.id,
                format!(
                    "{} arrives {} but {} departs {}",
                    a.id, a.arr_airport, b.id, b.dep_airport
                ),
            ));
        }
        if !rules.overlaps_with_turnaround(a, b) && rules.rest_insufficient(a, b) {
            out.push(Violation::new(
                ViolationType::RestShortfall,
                &crew.id,
                format!(
                    "{}m between {} and {} (minimum {}m)",
                    (b.dep - a.arr).num_minutes(),
                    a.id,
                    b.id,
                    rules.min_rest_minutes()
                ),
            ));
        }
    }
}

fn by_day<'p>(flights: &[&'p Flight]) -> BTreeMap<NaiveDate, Vec<&'p Flight>> {
    let mut days: BTreeMap<NaiveDate, Vec<&Flight>> = BTreeMap::new();
    for f in flights {
        days.entry(f.operating_day()).or_default().push(*f);
    }
    days
}

fn audit_days(crew: &Crew, flights: &[&Flight], rules: &Rules, out: &mut Vec<Violation>) {
    let brackets = rules.landing_brackets();
    for (day, flights) in by_day(flights) {
        let minutes: i64 = flights.iter().map(|f| f.duration_minutes()).sum();
        let starts = flights.iter().any(|f| rules.starts_in_wocl(f));
        let touches = flights.iter().any(|f| rules.overlaps_wocl(f));
        let cap = rules.effective_daily_cap(crew.role, starts, touches);
        if minutes > cap {
            out.push(Violation::new(
                ViolationType::DailyCapExceeded,
                &crew.id,
                format!("{minutes}m on {day} exceeds cap of {cap}m"),
            ));
        }

        let landings = flights.len() as u32;
        let limit = brackets.limit_for(minutes);
        if landings > limit {
            out.push(Violation::new(
                ViolationType::LandingsExceeded,
                &crew.id,
                format!("{landings} landings on {day} exceed limit of {limit}"),
            ));
        }
    }
}

fn audit_nights(crew: &Crew, flights: &[&Flight], rules: &Rules, out: &mut Vec<Violation>) {
    let nights: Vec<&&Flight> = flights.iter().filter(|f| rules.is_night_duty(f)).collect();
    let weekly = rules.max_overnight_duties_per_week as usize;
    if nights.len() > weekly {
        out.push(Violation::new(
            ViolationType::NightLimit,
            &crew.id,
            format!("{} night duties exceed weekly limit of {weekly}", nights.len()),
        ));
    }

    let max = rules.max_consecutive_night_duties as i64;
    let dates: BTreeSet<NaiveDate> = nights.iter().map(|f| f.operating_day()).collect();
    let breach = dates.iter().find(|&&start| {
        dates.range(start..=start + Duration::days(max)).count() as i64 > max
    });
    if let Some(start) = breach {
        out.push(Violation::new(
            ViolationType::NightLimit,
            &crew.id,
            format!("more than {max} night duties in a row from {start}"),
        ));
    }
}

fn audit_flight_time(crew: &Crew, flights: &[&Flight], rules: &Rules, out: &mut Vec<Violation>) {
    let cap = rules.flight_time_cap_7d_minutes();
    let days = by_day(flights);
    for &start in days.keys() {
        let minutes: i64 = days
            .range(start..=start + Duration::days(6))
            .flat_map(|(_, fs)| fs.iter())
            .map(|f| f.duration_minutes())
            .sum();
        if minutes > cap {
            out.push(Violation::new(
                ViolationType::FlightTimeCap,
                &crew.id,
                format!("{minutes}m in 7 days from {start} exceeds {cap}m"),
            ));
            return;
        }
    }
}

fn audit_flights(assignments: &[Assignment], problem: &RosterProblem, out: &mut Vec<Violation>) {
    let rules = &problem.rules;
    let mut seated: BTreeMap<(&str, CrewRole), u32> = BTreeMap::new();
    let mut sccm: BTreeMap<&str, u32> = BTreeMap::new();
    let mut seen = BTreeSet::new();
    for a in assignments {
        if !seen.insert((a.crew_id.as_str(), a.flight_id.as_str())) {
            continue;
        }
        *seated.entry((a.flight_id.as_str(), a.role)).or_insert(0) += 1;
        let qualified = problem
            .crew_member(&a.crew_id)
            .is_some_and(|c| c.role.is_cabin() && rules.is_sccm_qualified(c));
        if qualified {
            *sccm.entry(a.flight_id.as_str()).or_insert(0) += 1;
        }
    }

    for f in &problem.flights {
        for role in CrewRole::ALL {
            let needed = f.needed(role);
            let have = seated.get(&(f.id.as_str(), role)).copied().unwrap_or(0);
            if have < needed {
                out.push(Violation::new(
                    ViolationType::UncoveredSlot,
                    &f.id,
                    format!("{} of {needed} {role} seats filled", have),
                ));
            }
        }
        let required = rules.sccm_required(f);
        let have = sccm.get(f.id.as_str()).copied().unwrap_or(0);
        if have < required {
            out.push(Violation::new(
                ViolationType::SccmShortfall,
                &f.id,
                format!("{have} of {required} SCCM on board"),
            ));
        }
    }
}
