//! Distance-thresholded views over the discipline subsets.
//!
//! Everything here is advisory: zone, brick and race detection annotate the
//! report but never feed back into the headline statistics or projections.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::config::ZoneThresholds;
use crate::processing::summary::{positive_mean, stats_over};
use crate::processing::types::{
    BrickSession, BrickSummary, ClassifiedWorkouts, Discipline, DisciplineSubset, LongRunSummary,
    LongWorkouts, RaceDistanceClass, RaceEffort, WorkoutRecord, ZoneAnalysis,
};

/// How many of the fastest zone velocities are kept for display.
pub const TOP_PACES: usize = 3;

/// Statistics over the records at or above `threshold_m`.
pub fn zone_analysis(subset: &DisciplineSubset, threshold_m: f64) -> ZoneAnalysis {
    let zone = subset.at_least(threshold_m);
    let stats = stats_over(&zone.records);

    let mut top_velocities: Vec<f64> = zone
        .iter()
        .map(|record| record.velocity_mps)
        .filter(|velocity| *velocity > 0.0)
        .collect();
    top_velocities.sort_by(|a, b| b.total_cmp(a));
    top_velocities.truncate(TOP_PACES);

    ZoneAnalysis {
        discipline: subset.discipline,
        threshold_m,
        subset: zone,
        stats,
        top_velocities,
    }
}

/// Per-discipline long-workout listings, most recent first.
pub fn long_workouts(workouts: &ClassifiedWorkouts, thresholds: &ZoneThresholds) -> LongWorkouts {
    let listing = |discipline: Discipline| {
        let mut records = workouts
            .subset(discipline)
            .at_least(thresholds.long_m(discipline))
            .records;
        most_recent_first(&mut records);
        records
    };

    LongWorkouts {
        swim: listing(Discipline::Swim),
        bike: listing(Discipline::Bike),
        run: listing(Discipline::Run),
    }
}

/// Stable sort by date descending; undated records go last.
pub fn most_recent_first(records: &mut [WorkoutRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Find same-day long bike + long run pairs, one brick per calendar day.
pub fn detect_bricks(
    bike: &DisciplineSubset,
    run: &DisciplineSubset,
    thresholds: &ZoneThresholds,
) -> BrickSummary {
    let mut days: BTreeMap<NaiveDate, (Option<&WorkoutRecord>, Option<&WorkoutRecord>)> =
        BTreeMap::new();

    for record in bike.iter().filter(|r| r.distance_m >= thresholds.brick_bike_m) {
        if let Some(date) = record.date {
            days.entry(date).or_default().0.get_or_insert(record);
        }
    }
    for record in run.iter().filter(|r| r.distance_m >= thresholds.brick_run_m) {
        if let Some(date) = record.date {
            days.entry(date).or_default().1.get_or_insert(record);
        }
    }

    let sessions: Vec<BrickSession> = days
        .into_iter()
        .filter_map(|(date, pair)| match pair {
            (Some(bike), Some(run)) => Some(BrickSession {
                date,
                bike: bike.clone(),
                run: run.clone(),
            }),
            _ => None,
        })
        .collect();

    BrickSummary {
        mean_run_velocity_mps: positive_mean(sessions.iter().map(|s| s.run.velocity_mps)),
        mean_run_heart_rate_bpm: positive_mean(sessions.iter().filter_map(|s| s.run.heart_rate_bpm)),
        sessions,
    }
}

/// Distance / velocity window that marks a training record as race-like.
#[derive(Debug, Clone, Copy)]
pub struct RaceBand {
    pub discipline: Discipline,
    pub min_m: f64,
    pub max_m: f64,
    /// Velocity must be strictly above this.
    pub min_velocity_mps: f64,
    /// Distances below this are sprint efforts, the rest olympic.
    pub olympic_from_m: f64,
}

pub const RACE_BANDS: [RaceBand; 3] = [
    RaceBand {
        discipline: Discipline::Swim,
        min_m: 1_500.0,
        max_m: 2_000.0,
        min_velocity_mps: 0.6,
        olympic_from_m: 1_600.0,
    },
    RaceBand {
        discipline: Discipline::Bike,
        min_m: 38_000.0,
        max_m: 42_000.0,
        min_velocity_mps: 7.0,
        olympic_from_m: 40_000.0,
    },
    RaceBand {
        discipline: Discipline::Run,
        min_m: 9_000.0,
        max_m: 11_000.0,
        min_velocity_mps: 3.0,
        olympic_from_m: 10_000.0,
    },
];

impl RaceBand {
    pub fn matches(&self, record: &WorkoutRecord) -> bool {
        (self.min_m..=self.max_m).contains(&record.distance_m)
            && record.velocity_mps > self.min_velocity_mps
    }

    pub fn class_of(&self, record: &WorkoutRecord) -> RaceDistanceClass {
        if record.distance_m < self.olympic_from_m {
            RaceDistanceClass::Sprint
        } else {
            RaceDistanceClass::Olympic
        }
    }
}

/// Race-like efforts across all disciplines, most recent first.
pub fn detect_races(workouts: &ClassifiedWorkouts) -> Vec<RaceEffort> {
    let mut races: Vec<RaceEffort> = RACE_BANDS
        .iter()
        .flat_map(|band| {
            workouts
                .subset(band.discipline)
                .iter()
                .filter(|record| band.matches(record))
                .map(|record| RaceEffort {
                    discipline: band.discipline,
                    class: band.class_of(record),
                    record: record.clone(),
                })
        })
        .collect();

    races.sort_by(|a, b| b.record.date.cmp(&a.record.date));
    races
}

/// Runs labelled as race-pace work by their title or description.
pub fn race_pace_sessions(run: &DisciplineSubset) -> Vec<WorkoutRecord> {
    let mut sessions: Vec<WorkoutRecord> = run
        .iter()
        .filter(|record| {
            record.title.to_lowercase().contains("pace")
                || record.description.to_lowercase().contains("race pace")
        })
        .cloned()
        .collect();
    most_recent_first(&mut sessions);
    sessions
}

/// Long-run statistics for running-race mode.
pub fn long_run_summary(run: &DisciplineSubset, threshold_m: f64) -> LongRunSummary {
    let long = run.at_least(threshold_m);
    let key_run = long
        .iter()
        .fold(None, |longest: Option<&WorkoutRecord>, record| match longest {
            Some(current) if current.distance_m >= record.distance_m => Some(current),
            _ => Some(record),
        })
        .cloned();

    LongRunSummary {
        threshold_m,
        stats: stats_over(&long.records),
        key_run,
    }
}
