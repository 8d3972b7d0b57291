pub mod classify;
pub mod display;
pub mod parse;
pub mod preprocess;
pub mod scenarios;
pub mod summary;
pub mod types;
pub mod zones;

use crate::config::ReportConfig;
use classify::classify;
use parse::parse_training_log;
use preprocess::normalize_rows;
use scenarios::{DisciplineStats, project_scenarios};
use summary::{compute_stats, general_metrics_for};

pub use types::{
    AggregateStats, ClassifiedWorkouts, Discipline, RaceReport, ReportError, ReportRequest,
    ReportWarning, WorkoutRecord,
};

/// Parse a training-log CSV export and build the full race report.
///
/// The stages run strictly forward:
/// 1. [`parse::parse_training_log`] reads the CSV and checks for the
///    `WorkoutType` column and at least one row.
/// 2. [`preprocess::normalize_rows`] turns raw cells into [`WorkoutRecord`]s,
///    collecting malformed-cell warnings.
/// 3. [`generate_report`] runs everything downstream.
pub fn process_training_log(
    bytes: &[u8],
    request: &ReportRequest,
    config: &ReportConfig,
) -> Result<RaceReport, ReportError> {
    let table = parse_training_log(bytes)?;
    tracing::info!(
        rows = table.rows.len(),
        columns = table.headers.len(),
        "parsed training log"
    );

    let normalized = normalize_rows(&table);
    let mut report = generate_report(&normalized.records, request, config)?;

    let mut warnings = normalized.warnings;
    warnings.append(&mut report.warnings);
    report.warnings = warnings;

    Ok(report)
}

/// Build the report from already-normalized records.
///
/// Classification, statistics, zone analysis and projections are all pure; a
/// discipline with no qualifying workouts degrades to zeros and is reported as
/// a warning rather than an error.
pub fn generate_report(
    records: &[WorkoutRecord],
    request: &ReportRequest,
    config: &ReportConfig,
) -> Result<RaceReport, ReportError> {
    if records.is_empty() {
        return Err(ReportError::EmptyInput);
    }

    let category = request.category;
    let profile = category.profile();
    let thresholds = *config.thresholds_for(&category);

    let workouts = classify(records);
    tracing::info!(
        swim = workouts.swim.len(),
        bike = workouts.bike.len(),
        run = workouts.run.len(),
        other = workouts.other.len(),
        unclassified = workouts.unclassified.len(),
        excluded = workouts.excluded.len(),
        "classified workouts"
    );

    let swim = compute_stats(&workouts.swim);
    let bike = compute_stats(&workouts.bike);
    let run = compute_stats(&workouts.run);

    let swim_tempo = zones::zone_analysis(&workouts.swim, thresholds.tempo_swim_m);
    let bike_tempo = zones::zone_analysis(&workouts.bike, thresholds.tempo_bike_m);
    let run_race_pace = zones::zone_analysis(&workouts.run, thresholds.race_pace_run_m);
    let long_workouts = zones::long_workouts(&workouts, &thresholds);
    let long_runs = zones::long_run_summary(&workouts.run, thresholds.long_run_m);
    let bricks = zones::detect_bricks(&workouts.bike, &workouts.run, &thresholds);
    let races = zones::detect_races(&workouts);
    let race_pace_sessions = zones::race_pace_sessions(&workouts.run);
    tracing::debug!(
        bricks = bricks.sessions.len(),
        races = races.len(),
        race_pace_sessions = race_pace_sessions.len(),
        "zone analysis complete"
    );

    let general = general_metrics_for(&workouts, &category);

    let scenarios = project_scenarios(
        DisciplineStats {
            swim: &swim,
            bike: &bike,
            run: &run,
        },
        &profile,
        config,
    );

    let mut warnings = Vec::new();
    let disciplines: &[Discipline] = if category.is_triathlon() {
        &Discipline::ALL
    } else {
        &[Discipline::Run]
    };
    for discipline in disciplines {
        if workouts.subset(*discipline).is_empty() {
            warnings.push(ReportWarning::NoQualifyingWorkouts {
                scope: discipline.label().to_string(),
            });
        }
    }
    let zone_scopes = [
        (&swim_tempo, "swim tempo zone"),
        (&bike_tempo, "bike tempo zone"),
        (&run_race_pace, "run race-pace zone"),
    ];
    for (zone, scope) in zone_scopes {
        let relevant = category.is_triathlon() || zone.discipline == Discipline::Run;
        if relevant && zone.stats.count == 0 && !workouts.subset(zone.discipline).is_empty() {
            warnings.push(ReportWarning::NoQualifyingWorkouts {
                scope: scope.to_string(),
            });
        }
    }
    for warning in &warnings {
        tracing::warn!(%warning, "report degraded");
    }

    tracing::info!(
        category = %category,
        workouts = general.total_workouts,
        weeks = general.total_weeks,
        level = general.level.label(),
        "report generated"
    );

    Ok(RaceReport {
        request: request.clone(),
        profile,
        thresholds,
        workouts,
        swim,
        bike,
        run,
        general,
        long_workouts,
        swim_tempo,
        bike_tempo,
        run_race_pace,
        long_runs,
        bricks,
        races,
        race_pace_sessions,
        scenarios,
        warnings,
    })
}
