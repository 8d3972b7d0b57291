use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::{RaceCategory, RaceDistanceProfile, Scenario, ZoneThresholds};

/// Column names of the training-log export.
pub mod columns {
    pub const WORKOUT_TYPE: &str = "WorkoutType";
    pub const WORKOUT_DAY: &str = "WorkoutDay";
    pub const TITLE: &str = "Title";
    pub const DESCRIPTION: &str = "WorkoutDescription";
    pub const DISTANCE: &str = "DistanceInMeters";
    pub const DURATION: &str = "TimeTotalInHours";
    pub const VELOCITY: &str = "VelocityAverage";
    pub const HEART_RATE: &str = "HeartRateAverage";
    pub const HEART_RATE_MAX: &str = "HeartRateMax";
    pub const POWER: &str = "PowerAverage";
}

/// Header plus data rows exactly as they came out of the CSV reader.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// 1-based data rows that held bytes outside UTF-8.
    pub lossy_rows: Vec<usize>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }
}

/// One normalized row of the training log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutRecord {
    /// 1-based data row in the source file.
    pub row: usize,
    pub discipline_tag: Option<String>,
    pub date: Option<NaiveDate>,
    /// Invalid or absent numeric cells normalize to 0.
    pub distance_m: f64,
    pub duration_h: f64,
    pub velocity_mps: f64,
    pub heart_rate_bpm: Option<f64>,
    pub max_heart_rate_bpm: Option<f64>,
    pub power_w: Option<f64>,
    pub title: String,
    pub description: String,
}

impl WorkoutRecord {
    pub fn distance_km(&self) -> f64 {
        self.distance_m / 1000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Discipline {
    Swim,
    Bike,
    Run,
}

impl Discipline {
    pub const ALL: [Discipline; 3] = [Discipline::Swim, Discipline::Bike, Discipline::Run];

    pub fn label(&self) -> &'static str {
        match self {
            Discipline::Swim => "Swim",
            Discipline::Bike => "Bike",
            Discipline::Run => "Run",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Discipline::Swim => "SWIM",
            Discipline::Bike => "BIKE",
            Discipline::Run => "RUN",
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of classifying a single discipline tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Discipline(Discipline),
    Other,
    Unclassified,
}

/// Validated records of one discipline, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct DisciplineSubset {
    pub discipline: Discipline,
    pub records: Vec<WorkoutRecord>,
}

impl DisciplineSubset {
    pub fn new(discipline: Discipline) -> Self {
        Self {
            discipline,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkoutRecord> {
        self.records.iter()
    }

    /// Records whose distance is at least `threshold_m`, input order kept.
    pub fn at_least(&self, threshold_m: f64) -> DisciplineSubset {
        DisciplineSubset {
            discipline: self.discipline,
            records: self
                .records
                .iter()
                .filter(|record| record.distance_m >= threshold_m)
                .cloned()
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedWorkouts {
    pub swim: DisciplineSubset,
    pub bike: DisciplineSubset,
    pub run: DisciplineSubset,
    /// Strength, rest days and unrecognized tags.
    pub other: Vec<WorkoutRecord>,
    /// Rows without any discipline tag.
    pub unclassified: Vec<WorkoutRecord>,
    /// Swim / bike / run rows that failed the validity policy.
    pub excluded: Vec<WorkoutRecord>,
}

impl ClassifiedWorkouts {
    pub fn subset(&self, discipline: Discipline) -> &DisciplineSubset {
        match discipline {
            Discipline::Swim => &self.swim,
            Discipline::Bike => &self.bike,
            Discipline::Run => &self.run,
        }
    }

    pub fn validated_count(&self) -> usize {
        self.swim.len() + self.bike.len() + self.run.len()
    }

    pub fn validated(&self) -> impl Iterator<Item = &WorkoutRecord> {
        self.swim.iter().chain(self.bike.iter()).chain(self.run.iter())
    }
}

/// Aggregate figures over one subset.
///
/// Means are plain arithmetic means of per-workout averages, not weighted by
/// distance. A mean of `0.0` means "no qualifying values".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateStats {
    pub count: usize,
    pub total_distance_m: f64,
    pub total_duration_h: f64,
    pub mean_velocity_mps: f64,
    pub mean_power_w: f64,
    pub mean_heart_rate_bpm: f64,
    pub max_heart_rate_bpm: f64,
    pub best_workout: Option<WorkoutRecord>,
}

impl AggregateStats {
    pub fn mean_distance_m(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_distance_m / self.count as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreparationLevel {
    Excellent,
    Good,
    Moderate,
}

impl PreparationLevel {
    pub fn label(&self) -> &'static str {
        match self {
            PreparationLevel::Excellent => "EXCELLENT",
            PreparationLevel::Good => "GOOD",
            PreparationLevel::Moderate => "MODERATE",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PreparationLevel::Excellent => {
                "Consistent, high-volume preparation with a solid aerobic base."
            }
            PreparationLevel::Good => "Steady preparation with room to add volume before race day.",
            PreparationLevel::Moderate => {
                "Light preparation so far; prioritise consistency in the remaining weeks."
            }
        }
    }
}

/// Headline figures over every validated workout.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralMetrics {
    pub total_workouts: usize,
    pub total_hours: f64,
    pub total_weeks: u32,
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
    pub level: PreparationLevel,
}

/// Distance-thresholded subset of one discipline with its statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneAnalysis {
    pub discipline: Discipline,
    pub threshold_m: f64,
    pub subset: DisciplineSubset,
    pub stats: AggregateStats,
    /// Fastest velocities in the zone, descending, at most three.
    pub top_velocities: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LongWorkouts {
    pub swim: Vec<WorkoutRecord>,
    pub bike: Vec<WorkoutRecord>,
    pub run: Vec<WorkoutRecord>,
}

impl LongWorkouts {
    pub fn get(&self, discipline: Discipline) -> &[WorkoutRecord] {
        match discipline {
            Discipline::Swim => &self.swim,
            Discipline::Bike => &self.bike,
            Discipline::Run => &self.run,
        }
    }
}

/// Same-day long bike followed by long run.
#[derive(Debug, Clone, PartialEq)]
pub struct BrickSession {
    pub date: NaiveDate,
    pub bike: WorkoutRecord,
    pub run: WorkoutRecord,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrickSummary {
    pub sessions: Vec<BrickSession>,
    pub mean_run_velocity_mps: f64,
    pub mean_run_heart_rate_bpm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceDistanceClass {
    Sprint,
    Olympic,
}

impl RaceDistanceClass {
    pub fn label(&self) -> &'static str {
        match self {
            RaceDistanceClass::Sprint => "Sprint",
            RaceDistanceClass::Olympic => "Olympic",
        }
    }
}

/// Advisory race-like effort found in ordinary training data.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceEffort {
    pub discipline: Discipline,
    pub class: RaceDistanceClass,
    pub record: WorkoutRecord,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LongRunSummary {
    pub threshold_m: f64,
    pub stats: AggregateStats,
    /// Longest qualifying run, first-encountered on ties.
    pub key_run: Option<WorkoutRecord>,
}

/// `[low, high]` pair of plain numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ValueRange {
    pub low: f64,
    pub high: f64,
}

/// Predicted duration bounds in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DurationRange {
    pub min_s: f64,
    pub max_s: f64,
}

impl std::ops::Add for DurationRange {
    type Output = DurationRange;

    fn add(self, other: DurationRange) -> DurationRange {
        DurationRange {
            min_s: self.min_s + other.min_s,
            max_s: self.max_s + other.max_s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    pub discipline: Discipline,
    pub distance_m: f64,
    /// Velocity the band was scaled from, after fallback substitution.
    pub base_velocity_mps: f64,
    pub velocity: ValueRange,
    /// Fastest time comes from `velocity.high`.
    pub duration: DurationRange,
    pub base_heart_rate_bpm: f64,
    pub heart_rate_bpm: ValueRange,
}

/// One zone of a race-day pacing plan. Optional targets are only set where the
/// plan prescribes them for that discipline.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ZoneTarget {
    pub velocity_mps: f64,
    pub heart_rate_bpm: Option<f64>,
    pub power_w: Option<f64>,
    pub distance_m: Option<f64>,
    pub duration_s: Option<f64>,
}

/// Zone 1 to zone 3 targets per discipline.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PacingPlan {
    pub swim: [ZoneTarget; 3],
    pub bike: [ZoneTarget; 3],
    pub run: [ZoneTarget; 3],
}

impl PacingPlan {
    pub fn zones(&self, discipline: Discipline) -> &[ZoneTarget; 3] {
        match discipline {
            Discipline::Swim => &self.swim,
            Discipline::Bike => &self.bike,
            Discipline::Run => &self.run,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioProjection {
    pub scenario: Scenario,
    pub swim: SegmentProjection,
    pub bike: SegmentProjection,
    pub run: SegmentProjection,
    pub t1: DurationRange,
    pub t2: DurationRange,
    pub total: DurationRange,
    /// Mean bike power the targets were scaled from, after fallback substitution.
    pub base_power_w: f64,
    pub bike_power_w: ValueRange,
    pub pacing: PacingPlan,
}

impl ScenarioProjection {
    pub fn segment(&self, discipline: Discipline) -> &SegmentProjection {
        match discipline {
            Discipline::Swim => &self.swim,
            Discipline::Bike => &self.bike,
            Discipline::Run => &self.run,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSet {
    pub aggressive: ScenarioProjection,
    pub realistic: ScenarioProjection,
    pub conservative: ScenarioProjection,
}

impl ScenarioSet {
    pub fn get(&self, scenario: Scenario) -> &ScenarioProjection {
        match scenario {
            Scenario::Aggressive => &self.aggressive,
            Scenario::Realistic => &self.realistic,
            Scenario::Conservative => &self.conservative,
        }
    }
}

/// Report header supplied by the user alongside the log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportRequest {
    pub athlete_name: Option<String>,
    pub event_name: Option<String>,
    pub event_date: Option<String>,
    pub event_location: Option<String>,
    pub category: RaceCategory,
}

impl ReportRequest {
    pub fn athlete_name(&self) -> String {
        non_blank(&self.athlete_name).unwrap_or_else(|| "Athlete".to_string())
    }

    pub fn event_name(&self) -> String {
        non_blank(&self.event_name).unwrap_or_else(|| self.category.display_name())
    }

    pub fn event_date(&self) -> String {
        non_blank(&self.event_date).unwrap_or_else(|| "--".to_string())
    }

    pub fn event_location(&self) -> String {
        non_blank(&self.event_location).unwrap_or_else(|| "--".to_string())
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Everything derived from one training log.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceReport {
    pub request: ReportRequest,
    pub profile: RaceDistanceProfile,
    pub thresholds: ZoneThresholds,
    pub workouts: ClassifiedWorkouts,
    pub swim: AggregateStats,
    pub bike: AggregateStats,
    pub run: AggregateStats,
    pub general: GeneralMetrics,
    pub long_workouts: LongWorkouts,
    pub swim_tempo: ZoneAnalysis,
    pub bike_tempo: ZoneAnalysis,
    pub run_race_pace: ZoneAnalysis,
    pub long_runs: LongRunSummary,
    pub bricks: BrickSummary,
    pub races: Vec<RaceEffort>,
    pub race_pace_sessions: Vec<WorkoutRecord>,
    pub scenarios: ScenarioSet,
    pub warnings: Vec<ReportWarning>,
}

impl RaceReport {
    pub fn stats(&self, discipline: Discipline) -> &AggregateStats {
        match discipline {
            Discipline::Swim => &self.swim,
            Discipline::Bike => &self.bike,
            Discipline::Run => &self.run,
        }
    }
}

/// Fatal conditions: the report cannot be produced at all.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("training log contains no data rows")]
    EmptyInput,
    #[error("training log is missing required column `{0}`")]
    MissingRequiredColumn(String),
    #[error("failed to read training log: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid report configuration: {0}")]
    Config(String),
}

/// Absorbed conditions, surfaced next to the report.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportWarning {
    MalformedNumericField {
        row: usize,
        column: String,
        value: String,
    },
    MalformedDate {
        row: usize,
        value: String,
    },
    InvalidText {
        row: usize,
    },
    NoQualifyingWorkouts {
        scope: String,
    },
}

impl fmt::Display for ReportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportWarning::MalformedNumericField { row, column, value } => {
                write!(f, "row {row}: `{value}` in {column} is not a number")
            }
            ReportWarning::MalformedDate { row, value } => {
                write!(f, "row {row}: `{value}` is not a recognised date")
            }
            ReportWarning::InvalidText { row } => {
                write!(f, "row {row}: text is not valid UTF-8 and was partly replaced")
            }
            ReportWarning::NoQualifyingWorkouts { scope } => {
                write!(f, "no qualifying workouts for {scope}")
            }
        }
    }
}
