//! Number-to-text conversions used by the report fields.

use chrono::NaiveDate;

use crate::processing::types::{Discipline, DurationRange, ValueRange, WorkoutRecord};

pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_VALUE: &str = "--";
pub const NO_SWIM_PACE: &str = "--:--/100m";
pub const NO_RUN_PACE: &str = "--:--/km";
pub const NO_BIKE_SPEED: &str = "--.- km/h";

/// Split seconds into whole minutes and rounded seconds, carrying 60 s into
/// the next minute.
pub fn minutes_and_seconds(total_seconds: f64) -> (u64, u64) {
    let total = total_seconds.max(0.0);
    let mut minutes = (total / 60.0).floor() as u64;
    let mut seconds = (total - minutes as f64 * 60.0).round() as u64;

    if seconds >= 60 {
        minutes += 1;
        seconds = 0;
    }

    (minutes, seconds)
}

fn usable(velocity_mps: f64) -> bool {
    velocity_mps.is_finite() && velocity_mps > 0.0
}

pub fn swim_pace(velocity_mps: f64) -> String {
    if !usable(velocity_mps) {
        return NO_SWIM_PACE.to_string();
    }
    let (minutes, seconds) = minutes_and_seconds(100.0 / velocity_mps);
    format!("{minutes}:{seconds:02}/100m")
}

pub fn run_pace(velocity_mps: f64) -> String {
    if !usable(velocity_mps) {
        return NO_RUN_PACE.to_string();
    }
    let (minutes, seconds) = minutes_and_seconds(1000.0 / velocity_mps);
    format!("{minutes}:{seconds:02}/km")
}

pub fn kmh(velocity_mps: f64) -> f64 {
    velocity_mps * 3.6
}

pub fn bike_speed(velocity_mps: f64) -> String {
    if !usable(velocity_mps) {
        return NO_BIKE_SPEED.to_string();
    }
    format!("{:.1} km/h", kmh(velocity_mps))
}

/// Pace for swim / run, speed for bike.
pub fn velocity_for(discipline: Discipline, velocity_mps: f64) -> String {
    match discipline {
        Discipline::Swim => swim_pace(velocity_mps),
        Discipline::Bike => bike_speed(velocity_mps),
        Discipline::Run => run_pace(velocity_mps),
    }
}

/// Pace or speed band, slow end first for paces and low end first for speed.
pub fn velocity_range_for(discipline: Discipline, velocity: ValueRange) -> String {
    match discipline {
        Discipline::Bike if usable(velocity.low) && usable(velocity.high) => format!(
            "{:.1} - {:.1} km/h",
            kmh(velocity.low),
            kmh(velocity.high)
        ),
        Discipline::Bike => NO_BIKE_SPEED.to_string(),
        _ => format!(
            "{} - {}",
            velocity_for(discipline, velocity.high),
            velocity_for(discipline, velocity.low)
        ),
    }
}

/// Inverse of the pace formatters: `"4:05/km"` -> `245.0`.
pub fn parse_pace_seconds(pace: &str) -> Option<f64> {
    let clock = pace.split('/').next()?.trim();
    let (minutes, seconds) = clock.split_once(':')?;
    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    Some((minutes * 60 + seconds) as f64)
}

/// `Xh Ymin`, `Ymin` or `Xh`; `--` for nothing.
pub fn hours_duration(hours: f64) -> String {
    if !hours.is_finite() {
        return NO_VALUE.to_string();
    }
    minutes_duration(hours * 60.0)
}

pub fn minutes_duration(minutes: f64) -> String {
    if !minutes.is_finite() {
        return NO_VALUE.to_string();
    }

    let total = minutes.round();
    if total <= 0.0 {
        return NO_VALUE.to_string();
    }

    let total = total as u64;
    let (hours, minutes) = (total / 60, total % 60);
    match (hours, minutes) {
        (0, m) => format!("{m}min"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}min"),
    }
}

pub fn seconds_duration(seconds: f64) -> String {
    minutes_duration(seconds / 60.0)
}

pub fn duration_range(range: DurationRange) -> String {
    if range.max_s <= 0.0 {
        return NO_VALUE.to_string();
    }
    format!(
        "{} - {}",
        seconds_duration(range.min_s),
        seconds_duration(range.max_s)
    )
}

pub fn clock_minutes(seconds: f64) -> String {
    format!("{:.0} min", (seconds.max(0.0) / 60.0).round())
}

pub fn short_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m").to_string())
        .unwrap_or_else(|| NO_VALUE.to_string())
}

pub fn long_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| NO_VALUE.to_string())
}

/// `"Jan - Mar 2025"`, `"Mar 2025"` or `"Dec 2024 - Feb 2025"`.
pub fn training_period(first: Option<NaiveDate>, last: Option<NaiveDate>) -> String {
    match (first, last) {
        (Some(first), Some(last)) => {
            let start = first.format("%b").to_string();
            let end = last.format("%b %Y").to_string();
            if first.format("%Y-%m").to_string() == last.format("%Y-%m").to_string() {
                end
            } else if first.format("%Y").to_string() == last.format("%Y").to_string() {
                format!("{start} - {end}")
            } else {
                format!("{} - {end}", first.format("%b %Y"))
            }
        }
        _ => NO_VALUE.to_string(),
    }
}

pub fn distance_km(meters: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, meters / 1000.0)
}

/// Race distances without trailing zeros: `1.9`, `0.75`, `90`.
pub fn compact_km(meters: f64) -> String {
    let fixed = distance_km(meters, 2);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn heart_rate(bpm: f64) -> String {
    if bpm.is_finite() && bpm > 0.0 {
        format!("{:.0} bpm", bpm.round())
    } else {
        NOT_AVAILABLE.to_string()
    }
}

pub fn power(watts: f64) -> String {
    if watts.is_finite() && watts > 0.0 {
        format!("{:.0}W", watts.round())
    } else {
        NOT_AVAILABLE.to_string()
    }
}

pub fn heart_rate_range(range: ValueRange) -> String {
    format!("{:.0}-{:.0} bpm", range.low.round(), range.high.round())
}

pub fn power_range(range: ValueRange) -> String {
    format!("{:.0}-{:.0}W", range.low.round(), range.high.round())
}

/// `"<km> km - <pace or speed>"`, or `N/A` without a best workout.
pub fn best_workout(discipline: Discipline, record: Option<&WorkoutRecord>) -> String {
    match record {
        Some(record) if usable(record.velocity_mps) => {
            let decimals = if discipline == Discipline::Swim { 2 } else { 1 };
            format!(
                "{} km - {}",
                distance_km(record.distance_m, decimals),
                velocity_for(discipline, record.velocity_mps)
            )
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}
