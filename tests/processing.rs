use chrono::NaiveDate;
use raceready::config::{RaceCategory, ReportConfig};
use raceready::processing::types::{PreparationLevel, RaceDistanceClass};
use raceready::processing::{
    Discipline, RaceReport, ReportError, ReportRequest, ReportWarning, process_training_log,
};
use raceready::templates::{render_report_page, report_fields};

fn fixture_bytes() -> Vec<u8> {
    std::fs::read("tests/fixtures/training_log.csv").expect("fixture should be present")
}

fn half_report() -> RaceReport {
    process_training_log(
        &fixture_bytes(),
        &ReportRequest {
            athlete_name: Some("Marta".into()),
            event_name: Some("Ironman 70.3 Cascais".into()),
            category: RaceCategory::Half,
            ..ReportRequest::default()
        },
        &ReportConfig::default(),
    )
    .expect("processing should succeed")
}

#[test]
fn fixture_is_partitioned_by_discipline() {
    let report = half_report();

    assert_eq!(report.swim.count, 4);
    assert_eq!(report.bike.count, 4);
    assert_eq!(report.run.count, 7);
    assert_eq!(report.workouts.excluded.len(), 2);
    assert_eq!(report.workouts.other.len(), 2);
    assert_eq!(report.workouts.unclassified.len(), 1);
    assert_eq!(report.general.total_workouts, 15);

    assert_eq!(report.swim.total_distance_m, 10_600.0);
    assert_eq!(report.bike.total_distance_m, 295_000.0);
    assert_eq!(report.run.total_distance_m, 89_000.0);
    assert!((report.bike.mean_velocity_mps - 8.17).abs() < 1e-9);
    assert!((report.bike.mean_power_w - 186.25).abs() < 1e-9);
}

#[test]
fn zero_distance_rows_never_count() {
    let report = half_report();

    for discipline in Discipline::ALL {
        assert!(
            report
                .workouts
                .subset(discipline)
                .iter()
                .all(|record| record.distance_m > 0.0)
        );
    }
    assert!(report.workouts.excluded.iter().all(|r| r.distance_m <= 0.0));
}

#[test]
fn general_metrics_span_the_training_block() {
    let report = half_report();

    assert_eq!(report.general.first_day, NaiveDate::from_ymd_opt(2025, 1, 6));
    assert_eq!(report.general.last_day, NaiveDate::from_ymd_opt(2025, 3, 15));
    assert_eq!(report.general.total_weeks, 10);
    assert_eq!(report.general.level, PreparationLevel::Moderate);
}

#[test]
fn zones_bricks_and_races_follow_half_distance_thresholds() {
    let report = half_report();

    assert_eq!(report.swim_tempo.stats.count, 2);
    assert_eq!(report.bike_tempo.stats.count, 2);
    assert_eq!(report.run_race_pace.stats.count, 2);
    assert_eq!(report.run_race_pace.top_velocities, vec![3.13, 2.99]);

    assert_eq!(report.long_workouts.swim.len(), 2);
    assert_eq!(
        report.long_workouts.run[0].date,
        NaiveDate::from_ymd_opt(2025, 3, 2)
    );

    assert_eq!(report.bricks.sessions.len(), 2);
    assert!((report.bricks.mean_run_velocity_mps - 3.11).abs() < 1e-9);

    let races: Vec<_> = report
        .races
        .iter()
        .map(|race| (race.discipline, race.class))
        .collect();
    assert_eq!(
        races,
        vec![
            (Discipline::Swim, RaceDistanceClass::Sprint),
            (Discipline::Run, RaceDistanceClass::Olympic),
            (Discipline::Bike, RaceDistanceClass::Olympic),
        ]
    );

    assert_eq!(report.race_pace_sessions.len(), 1);
    assert_eq!(report.race_pace_sessions[0].title, "Race pace intervals");
}

#[test]
fn malformed_cells_are_reported_not_fatal() {
    let report = half_report();

    assert_eq!(
        report.warnings,
        vec![ReportWarning::MalformedNumericField {
            row: 19,
            column: "DistanceInMeters".to_string(),
            value: "abc".to_string(),
        }]
    );
}

#[test]
fn report_fields_carry_formatted_values() {
    let fields = report_fields(&half_report());

    assert_eq!(fields["ATHLETE_NAME"], "Marta");
    assert_eq!(fields["EVENT_NAME"], "Ironman 70.3 Cascais");
    assert_eq!(fields["EVENT_DATE"], "--");
    assert_eq!(fields["TRAINING_PERIOD"], "Jan - Mar 2025");
    assert_eq!(fields["SWIM_AVG_PACE"], "1:37/100m");
    assert_eq!(fields["BIKE_AVG_SPEED"], "29.4 km/h");
    assert_eq!(fields["RUN_AVG_PACE"], "5:20/km");
    assert_eq!(fields["BIKE_AVG_POWER"], "186W");
    assert_eq!(fields["SWIM_BEST_WORKOUT"], "3.80 km - 1:34/100m");
    assert_eq!(fields["RACE_DISTANCE_SWIM"], "1.9");
    assert_eq!(fields["RACE_DISTANCE_RUN"], "21.1");
    assert_eq!(fields["REALISTIC_T1"], "4-5 min");
    assert!(fields["WARNINGS"].contains("DistanceInMeters"));
    assert!(fields["BRICK_SESSIONS"].contains("18/01/2025"));
}

#[test]
fn realistic_pacing_plan_is_derived_from_training_averages() {
    let fields = report_fields(&half_report());

    assert_eq!(fields["REALISTIC_SWIM_ZONE1_PACE"], "1:51/100m");
    assert_eq!(fields["REALISTIC_BIKE_ZONE2_SPEED"], "29.4 km/h");
    assert_eq!(fields["REALISTIC_BIKE_ZONE2_HR"], "139 bpm");
    assert_eq!(fields["REALISTIC_BIKE_ZONE2_POWER"], "177W");
    assert_eq!(fields["REALISTIC_BIKE_ZONE1_POWER"], "153W");
    assert_eq!(fields["REALISTIC_RUN_ZONE1_PACE"], "6:16/km");
    assert_eq!(fields["REALISTIC_RUN_ZONE2_PACE"], "5:26/km");
    assert_eq!(fields["REALISTIC_RUN_ZONE2_HR"], "148 bpm");
    assert_eq!(fields["REALISTIC_RUN_ZONE1_TIME"], "32min");
    assert_eq!(fields["REALISTIC_RUN_ZONE2_TIME"], "1h 17min");
    assert_eq!(fields["REALISTIC_RUN_ZONE3_TIME"], "10min");
    assert!(!fields.contains_key("REALISTIC_SWIM_ZONE1_HR"));
    assert!(fields["AGGRESSIVE_PACING_PLAN"].contains("<th>NP</th>"));
}

#[test]
fn every_placeholder_in_the_report_is_filled() {
    let rendered = render_report_page(&half_report());

    assert!(!rendered.contains("{{"), "unfilled placeholder left in report");
    assert!(rendered.contains("Marta"));
    assert!(rendered.contains("class=\"tempo\""));
}

#[test]
fn running_mode_reports_long_runs_without_transitions() {
    let report = process_training_log(
        &fixture_bytes(),
        &ReportRequest {
            category: RaceCategory::Running {
                distance_m: 21_097.5,
            },
            ..ReportRequest::default()
        },
        &ReportConfig::default(),
    )
    .expect("processing should succeed");

    assert_eq!(report.long_runs.stats.count, 2);
    assert_eq!(
        report.long_runs.key_run.as_ref().map(|run| run.distance_m),
        Some(21_000.0)
    );
    assert_eq!(report.long_runs.stats.max_heart_rate_bpm, 170.0);
    assert_eq!(report.scenarios.realistic.total, report.scenarios.realistic.run.duration);

    assert_eq!(report.general.total_workouts, 7);
    assert_eq!(report.general.first_day, NaiveDate::from_ymd_opt(2025, 1, 9));
    assert_eq!(report.general.last_day, NaiveDate::from_ymd_opt(2025, 3, 8));

    let fields = report_fields(&report);
    assert_eq!(fields["EVENT_NAME"], "Half Marathon");
    assert_eq!(fields["LONG_RUNS_COUNT"], "2");
    assert_eq!(fields["TOTAL_WEEKS"], "8");
    assert_eq!(fields["TRAINING_PERIOD"], "Jan - Mar 2025");

    let rendered = render_report_page(&report);
    assert!(!rendered.contains("{{"));
    assert!(!rendered.contains("T1"));
    assert!(rendered.contains("Race-day pacing plan"));
    assert!(!rendered.contains("<th>NP</th>"));
}

#[test]
fn latin1_titles_do_not_sink_the_report() {
    let log = b"WorkoutType,WorkoutDay,Title,DistanceInMeters,TimeTotalInHours,VelocityAverage\n\
Run,2025-02-01,Easy,10000,0.9,3.1\n\
Swim,2025-02-02,Nata\xE7\xE3o,2000,0.6,0.95\n";

    let report = process_training_log(log, &ReportRequest::default(), &ReportConfig::default())
        .expect("processing should succeed");

    assert_eq!(report.run.count, 1);
    assert_eq!(report.swim.count, 1);
    assert!(report.workouts.swim.records[0].title.starts_with("Nata"));
    assert!(
        report
            .warnings
            .contains(&ReportWarning::InvalidText { row: 2 })
    );
}

#[test]
fn structural_problems_are_fatal() {
    let missing_column = process_training_log(
        b"Title,DistanceInMeters\nEasy,5000\n",
        &ReportRequest::default(),
        &ReportConfig::default(),
    );
    assert!(matches!(
        missing_column,
        Err(ReportError::MissingRequiredColumn(_))
    ));

    let header_only = process_training_log(
        b"WorkoutType,DistanceInMeters\n",
        &ReportRequest::default(),
        &ReportConfig::default(),
    );
    assert!(matches!(header_only, Err(ReportError::EmptyInput)));
}
