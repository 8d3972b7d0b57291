use crate::config::RaceCategory;
use crate::processing::types::{
    AggregateStats, ClassifiedWorkouts, DisciplineSubset, GeneralMetrics, PreparationLevel,
    WorkoutRecord,
};

/// Weekly score (workouts per week + hours per week) needed for each level.
pub const EXCELLENT_WEEKLY_SCORE: f64 = 12.0;
pub const GOOD_WEEKLY_SCORE: f64 = 8.0;

/// Aggregate a validated discipline subset.
pub fn compute_stats(subset: &DisciplineSubset) -> AggregateStats {
    stats_over(&subset.records)
}

/// Aggregate any slice of already-validated records.
///
/// Totals trust the input; means only look at strictly positive readings and
/// fall back to `0.0` when none qualify.
pub fn stats_over(records: &[WorkoutRecord]) -> AggregateStats {
    AggregateStats {
        count: records.len(),
        total_distance_m: records.iter().map(|r| r.distance_m).sum(),
        total_duration_h: records.iter().map(|r| r.duration_h).sum(),
        mean_velocity_mps: positive_mean(records.iter().map(|r| r.velocity_mps)),
        mean_power_w: positive_mean(records.iter().filter_map(|r| r.power_w)),
        mean_heart_rate_bpm: positive_mean(records.iter().filter_map(|r| r.heart_rate_bpm)),
        max_heart_rate_bpm: records
            .iter()
            .filter_map(|r| r.max_heart_rate_bpm)
            .filter(|hr| *hr > 0.0)
            .fold(0.0, f64::max),
        best_workout: fastest(records).cloned(),
    }
}

/// Arithmetic mean of the positive, finite values; `0.0` if there are none.
pub fn positive_mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .filter(|value| value.is_finite() && *value > 0.0)
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));

    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Highest-velocity record; the first one wins a tie.
pub fn fastest(records: &[WorkoutRecord]) -> Option<&WorkoutRecord> {
    records
        .iter()
        .filter(|record| record.velocity_mps > 0.0)
        .fold(None, |best: Option<&WorkoutRecord>, record| match best {
            Some(current) if current.velocity_mps >= record.velocity_mps => Some(current),
            _ => Some(record),
        })
}

/// Headline counts and the preparation level over every validated workout.
pub fn general_metrics(workouts: &ClassifiedWorkouts) -> GeneralMetrics {
    metrics_over(&workouts.validated().collect::<Vec<_>>())
}

/// Headline counts scoped to the disciplines the race actually contains.
///
/// A running race only looks at run workouts, so the training period and the
/// week count follow the run block.
pub fn general_metrics_for(
    workouts: &ClassifiedWorkouts,
    category: &RaceCategory,
) -> GeneralMetrics {
    if category.is_triathlon() {
        general_metrics(workouts)
    } else {
        metrics_over(&workouts.run.iter().collect::<Vec<_>>())
    }
}

fn metrics_over(records: &[&WorkoutRecord]) -> GeneralMetrics {
    let total_workouts = records.len();
    let total_hours: f64 = records.iter().map(|r| r.duration_h).sum();

    let first_day = records.iter().filter_map(|r| r.date).min();
    let last_day = records.iter().filter_map(|r| r.date).max();

    let total_weeks = match (first_day, last_day) {
        (Some(first), Some(last)) => ((last - first).num_days() as f64 / 7.0).round() as u32,
        _ => 0,
    };

    GeneralMetrics {
        total_workouts,
        total_hours,
        total_weeks,
        first_day,
        last_day,
        level: preparation_level(total_workouts, total_hours, total_weeks),
    }
}

pub fn preparation_level(workouts: usize, hours: f64, weeks: u32) -> PreparationLevel {
    let weeks = f64::from(weeks.max(1));
    let score = workouts as f64 / weeks + hours / weeks;

    if score >= EXCELLENT_WEEKLY_SCORE {
        PreparationLevel::Excellent
    } else if score >= GOOD_WEEKLY_SCORE {
        PreparationLevel::Good
    } else {
        PreparationLevel::Moderate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::classify::classify;
    use crate::processing::types::Discipline;
    use chrono::NaiveDate;

    fn swim(distance_m: f64, velocity_mps: f64) -> WorkoutRecord {
        WorkoutRecord {
            discipline_tag: Some("Swim".into()),
            distance_m,
            duration_h: distance_m / velocity_mps / 3600.0,
            velocity_mps,
            ..WorkoutRecord::default()
        }
    }

    #[test]
    fn mean_velocity_is_unweighted() {
        let subset = DisciplineSubset {
            discipline: Discipline::Swim,
            records: vec![swim(2000.0, 1.0), swim(1800.0, 1.2), swim(1500.0, 1.4)],
        };

        let stats = compute_stats(&subset);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total_distance_m, 5300.0);
        assert!((stats.mean_velocity_mps - 1.2).abs() < 1e-9);
        assert_eq!(
            stats.best_workout.map(|record| record.distance_m),
            Some(1500.0)
        );
    }

    #[test]
    fn empty_subset_degrades_to_zero() {
        let stats = compute_stats(&DisciplineSubset::new(Discipline::Run));

        assert_eq!(stats.count, 0);
        assert_eq!(stats.total_distance_m, 0.0);
        assert_eq!(stats.mean_velocity_mps, 0.0);
        assert_eq!(stats.mean_heart_rate_bpm, 0.0);
        assert!(stats.best_workout.is_none());
        assert_eq!(stats.mean_distance_m(), 0.0);
    }

    #[test]
    fn heart_rate_and_power_ignore_missing_readings() {
        let mut first = swim(1000.0, 1.0);
        first.heart_rate_bpm = Some(140.0);
        first.power_w = Some(200.0);
        let mut second = swim(1000.0, 1.0);
        second.heart_rate_bpm = Some(150.0);

        let stats = stats_over(&[first, second]);
        assert_eq!(stats.mean_heart_rate_bpm, 145.0);
        assert_eq!(stats.mean_power_w, 200.0);
    }

    #[test]
    fn ties_for_fastest_keep_the_first_record() {
        let mut first = swim(1000.0, 1.3);
        first.row = 1;
        let mut second = swim(2000.0, 1.3);
        second.row = 2;

        assert_eq!(fastest(&[first, second]).map(|r| r.row), Some(1));
    }

    #[test]
    fn general_metrics_cover_validated_workouts_only() {
        let day = |d| NaiveDate::from_ymd_opt(2025, 1, d);
        let mut records = Vec::new();
        for d in [1, 8, 15, 29] {
            let mut record = swim(2000.0, 1.1);
            record.date = day(d);
            records.push(record);
        }
        let mut invalid = swim(0.0, 1.0);
        invalid.duration_h = 1.0;
        invalid.date = NaiveDate::from_ymd_opt(2024, 6, 1);
        records.push(invalid);

        let metrics = general_metrics(&classify(&records));
        assert_eq!(metrics.total_workouts, 4);
        assert_eq!(metrics.total_weeks, 4);
        assert_eq!(metrics.first_day, day(1));
        assert_eq!(metrics.level, PreparationLevel::Moderate);
    }

    #[test]
    fn running_races_scope_general_metrics_to_runs() {
        let day = |d| NaiveDate::from_ymd_opt(2025, 1, d);
        let mut early_swim = swim(2000.0, 1.1);
        early_swim.date = day(1);
        let run = |d| WorkoutRecord {
            discipline_tag: Some("Run".into()),
            date: day(d),
            distance_m: 10_000.0,
            duration_h: 1.0,
            velocity_mps: 2.78,
            ..WorkoutRecord::default()
        };
        let workouts = classify(&[early_swim, run(8), run(22)]);

        let running = general_metrics_for(
            &workouts,
            &RaceCategory::Running {
                distance_m: 10_000.0,
            },
        );
        assert_eq!(running.total_workouts, 2);
        assert_eq!(running.first_day, day(8));
        assert_eq!(running.total_weeks, 2);

        let triathlon = general_metrics_for(&workouts, &RaceCategory::Olympic);
        assert_eq!(triathlon.total_workouts, 3);
        assert_eq!(triathlon.first_day, day(1));
        assert_eq!(triathlon.total_weeks, 3);
    }

    #[test]
    fn weekly_score_sets_the_preparation_level() {
        assert_eq!(preparation_level(40, 40.0, 4), PreparationLevel::Excellent);
        assert_eq!(preparation_level(20, 12.0, 4), PreparationLevel::Good);
        assert_eq!(preparation_level(3, 2.0, 0), PreparationLevel::Moderate);
    }
}
