//! Static race tables and tunable projection factors.
//!
//! Everything the analysis treats as "fixed" lives here: race distances per
//! category, the distance thresholds that define long / tempo / brick sessions,
//! and the percentage bands used to build the three race scenarios. The
//! built-in values are plain constants; a TOML file can override any table.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::processing::types::{Discipline, ReportError};

/// Race the report is being prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RaceCategory {
    Sprint,
    Olympic,
    #[default]
    Half,
    Full,
    /// Stand-alone running race of the given distance.
    Running { distance_m: f64 },
}

pub const FIVE_K_M: f64 = 5_000.0;
pub const TEN_K_M: f64 = 10_000.0;
pub const HALF_MARATHON_M: f64 = 21_097.5;
pub const MARATHON_M: f64 = 42_195.0;

impl RaceCategory {
    pub fn is_triathlon(&self) -> bool {
        !matches!(self, RaceCategory::Running { .. })
    }

    pub fn display_name(&self) -> String {
        match self {
            RaceCategory::Sprint => "Sprint Triathlon".to_string(),
            RaceCategory::Olympic => "Olympic Triathlon".to_string(),
            RaceCategory::Half => "Ironman 70.3".to_string(),
            RaceCategory::Full => "Ironman".to_string(),
            RaceCategory::Running { distance_m } => match *distance_m {
                d if d == HALF_MARATHON_M => "Half Marathon".to_string(),
                d if d == MARATHON_M => "Marathon".to_string(),
                d => format!("{} km Run", trim_km(d)),
            },
        }
    }

    /// Per-discipline race distances for this category.
    pub fn profile(&self) -> RaceDistanceProfile {
        match self {
            RaceCategory::Sprint => RaceDistanceProfile::new(750.0, 20_000.0, 5_000.0),
            RaceCategory::Olympic => RaceDistanceProfile::new(1_500.0, 40_000.0, 10_000.0),
            RaceCategory::Half => RaceDistanceProfile::new(1_900.0, 90_000.0, 21_100.0),
            RaceCategory::Full => RaceDistanceProfile::new(3_800.0, 180_000.0, 42_200.0),
            RaceCategory::Running { distance_m } => RaceDistanceProfile::new(0.0, 0.0, *distance_m),
        }
    }
}

fn trim_km(meters: f64) -> String {
    let km = meters / 1000.0;
    if km.fract() == 0.0 {
        format!("{km:.0}")
    } else {
        format!("{km:.1}")
    }
}

impl fmt::Display for RaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown race category `{0}`")]
pub struct ParseRaceCategoryError(pub String);

impl FromStr for RaceCategory {
    type Err = ParseRaceCategoryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim().to_lowercase();
        let category = match value.as_str() {
            "sprint" => RaceCategory::Sprint,
            "olympic" | "olimpico" | "olímpico" => RaceCategory::Olympic,
            "70.3" | "half" | "half-ironman" => RaceCategory::Half,
            "full" | "ironman" | "140.6" => RaceCategory::Full,
            "5k" => RaceCategory::Running { distance_m: FIVE_K_M },
            "10k" => RaceCategory::Running { distance_m: TEN_K_M },
            "21k" | "half-marathon" => RaceCategory::Running {
                distance_m: HALF_MARATHON_M,
            },
            "42k" | "marathon" => RaceCategory::Running {
                distance_m: MARATHON_M,
            },
            other => {
                let meters = other
                    .strip_prefix("running:")
                    .or_else(|| other.strip_prefix("run:"))
                    .and_then(|m| m.trim().parse::<f64>().ok())
                    .filter(|m| m.is_finite() && *m > 0.0)
                    .ok_or_else(|| ParseRaceCategoryError(raw.to_string()))?;
                RaceCategory::Running { distance_m: meters }
            }
        };
        Ok(category)
    }
}

/// Race distances in meters per discipline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaceDistanceProfile {
    pub swim_m: f64,
    pub bike_m: f64,
    pub run_m: f64,
}

impl RaceDistanceProfile {
    pub const fn new(swim_m: f64, bike_m: f64, run_m: f64) -> Self {
        Self {
            swim_m,
            bike_m,
            run_m,
        }
    }

    pub fn distance_m(&self, discipline: Discipline) -> f64 {
        match discipline {
            Discipline::Swim => self.swim_m,
            Discipline::Bike => self.bike_m,
            Discipline::Run => self.run_m,
        }
    }

    pub fn distance_km(&self, discipline: Discipline) -> f64 {
        self.distance_m(discipline) / 1000.0
    }

    pub fn total_m(&self) -> f64 {
        self.swim_m + self.bike_m + self.run_m
    }

    /// Only multisport races pay T1 / T2.
    pub fn has_transitions(&self) -> bool {
        self.swim_m > 0.0 && self.bike_m > 0.0 && self.run_m > 0.0
    }
}

/// Distance cut-offs (meters) used by the zone analyzer for one race category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneThresholds {
    /// Minimum distance for the long-workout listings.
    pub long_swim_m: f64,
    pub long_bike_m: f64,
    pub long_run_m: f64,
    /// Minimum distance for the swim / bike tempo-zone analysis.
    pub tempo_swim_m: f64,
    pub tempo_bike_m: f64,
    /// Minimum distance for the run race-pace analysis.
    pub race_pace_run_m: f64,
    /// Bike and run minimums for a same-day brick.
    pub brick_bike_m: f64,
    pub brick_run_m: f64,
}

impl ZoneThresholds {
    pub fn long_m(&self, discipline: Discipline) -> f64 {
        match discipline {
            Discipline::Swim => self.long_swim_m,
            Discipline::Bike => self.long_bike_m,
            Discipline::Run => self.long_run_m,
        }
    }

    pub fn tempo_m(&self, discipline: Discipline) -> f64 {
        match discipline {
            Discipline::Swim => self.tempo_swim_m,
            Discipline::Bike => self.tempo_bike_m,
            Discipline::Run => self.race_pace_run_m,
        }
    }
}

pub const SPRINT_THRESHOLDS: ZoneThresholds = ZoneThresholds {
    long_swim_m: 600.0,
    long_bike_m: 15_000.0,
    long_run_m: 3_500.0,
    tempo_swim_m: 750.0,
    tempo_bike_m: 20_000.0,
    race_pace_run_m: 5_000.0,
    brick_bike_m: 15_000.0,
    brick_run_m: 3_000.0,
};

pub const OLYMPIC_THRESHOLDS: ZoneThresholds = ZoneThresholds {
    long_swim_m: 1_200.0,
    long_bike_m: 35_000.0,
    long_run_m: 8_000.0,
    tempo_swim_m: 1_500.0,
    tempo_bike_m: 40_000.0,
    race_pace_run_m: 10_000.0,
    brick_bike_m: 35_000.0,
    brick_run_m: 5_000.0,
};

pub const HALF_THRESHOLDS: ZoneThresholds = ZoneThresholds {
    long_swim_m: 2_500.0,
    long_bike_m: 70_000.0,
    long_run_m: 15_000.0,
    tempo_swim_m: 3_000.0,
    tempo_bike_m: 90_000.0,
    race_pace_run_m: 18_000.0,
    brick_bike_m: 70_000.0,
    brick_run_m: 8_000.0,
};

pub const FULL_THRESHOLDS: ZoneThresholds = ZoneThresholds {
    long_swim_m: 3_500.0,
    long_bike_m: 140_000.0,
    long_run_m: 28_000.0,
    tempo_swim_m: 4_000.0,
    tempo_bike_m: 150_000.0,
    race_pace_run_m: 30_000.0,
    brick_bike_m: 140_000.0,
    brick_run_m: 15_000.0,
};

/// Running mode only reads the run thresholds; swim / bike mirror 70.3.
pub const RUNNING_THRESHOLDS: ZoneThresholds = ZoneThresholds {
    long_run_m: 15_000.0,
    race_pace_run_m: 18_000.0,
    ..HALF_THRESHOLDS
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdTable {
    pub sprint: ZoneThresholds,
    pub olympic: ZoneThresholds,
    pub half: ZoneThresholds,
    pub full: ZoneThresholds,
    pub running: ZoneThresholds,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            sprint: SPRINT_THRESHOLDS,
            olympic: OLYMPIC_THRESHOLDS,
            half: HALF_THRESHOLDS,
            full: FULL_THRESHOLDS,
            running: RUNNING_THRESHOLDS,
        }
    }
}

impl ThresholdTable {
    pub fn for_category(&self, category: &RaceCategory) -> &ZoneThresholds {
        match category {
            RaceCategory::Sprint => &self.sprint,
            RaceCategory::Olympic => &self.olympic,
            RaceCategory::Half => &self.half,
            RaceCategory::Full => &self.full,
            RaceCategory::Running { .. } => &self.running,
        }
    }
}

/// Named race-day assumption used to scale training averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    Aggressive,
    Realistic,
    Conservative,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [
        Scenario::Aggressive,
        Scenario::Realistic,
        Scenario::Conservative,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Scenario::Aggressive => "Aggressive",
            Scenario::Realistic => "Realistic",
            Scenario::Conservative => "Conservative",
        }
    }

    /// Upper-case key used for report placeholders.
    pub fn key(&self) -> &'static str {
        match self {
            Scenario::Aggressive => "AGGRESSIVE",
            Scenario::Realistic => "REALISTIC",
            Scenario::Conservative => "CONSERVATIVE",
        }
    }
}

/// Multiplicative `[low, high]` band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisciplineBands {
    pub swim: Band,
    pub bike: Band,
    pub run: Band,
}

impl DisciplineBands {
    pub fn get(&self, discipline: Discipline) -> Band {
        match discipline {
            Discipline::Swim => self.swim,
            Discipline::Bike => self.bike,
            Discipline::Run => self.run,
        }
    }
}

/// Everything one scenario scales: velocities, transitions, HR and power targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFactors {
    pub velocity: DisciplineBands,
    pub t1_minutes: Band,
    pub t2_minutes: Band,
    pub heart_rate: DisciplineBands,
    pub power: Band,
}

pub const AGGRESSIVE: ScenarioFactors = ScenarioFactors {
    velocity: DisciplineBands {
        swim: Band::new(1.12, 1.18),
        bike: Band::new(1.10, 1.14),
        run: Band::new(1.11, 1.15),
    },
    t1_minutes: Band::new(3.0, 4.0),
    t2_minutes: Band::new(2.0, 3.0),
    heart_rate: DisciplineBands {
        swim: Band::new(1.03, 1.08),
        bike: Band::new(1.03, 1.08),
        run: Band::new(1.03, 1.07),
    },
    power: Band::new(1.05, 1.10),
};

pub const REALISTIC: ScenarioFactors = ScenarioFactors {
    velocity: DisciplineBands {
        swim: Band::new(0.98, 1.02),
        bike: Band::new(0.98, 1.02),
        run: Band::new(0.98, 1.02),
    },
    t1_minutes: Band::new(4.0, 5.0),
    t2_minutes: Band::new(3.0, 4.0),
    heart_rate: DisciplineBands {
        swim: Band::new(0.98, 1.03),
        bike: Band::new(0.98, 1.03),
        run: Band::new(0.98, 1.02),
    },
    power: Band::new(0.98, 1.03),
};

pub const CONSERVATIVE: ScenarioFactors = ScenarioFactors {
    velocity: DisciplineBands {
        swim: Band::new(0.90, 0.94),
        bike: Band::new(0.92, 0.96),
        run: Band::new(0.91, 0.95),
    },
    t1_minutes: Band::new(4.0, 5.0),
    t2_minutes: Band::new(4.0, 5.0),
    heart_rate: DisciplineBands {
        swim: Band::new(0.93, 0.98),
        bike: Band::new(0.93, 0.98),
        run: Band::new(0.95, 0.99),
    },
    power: Band::new(0.92, 0.97),
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioTable {
    pub aggressive: ScenarioFactors,
    pub realistic: ScenarioFactors,
    pub conservative: ScenarioFactors,
}

impl Default for ScenarioTable {
    fn default() -> Self {
        Self {
            aggressive: AGGRESSIVE,
            realistic: REALISTIC,
            conservative: CONSERVATIVE,
        }
    }
}

impl ScenarioTable {
    pub fn get(&self, scenario: Scenario) -> &ScenarioFactors {
        match scenario {
            Scenario::Aggressive => &self.aggressive,
            Scenario::Realistic => &self.realistic,
            Scenario::Conservative => &self.conservative,
        }
    }
}

/// Share of the run leg spent in each pacing zone: settle in, hold, finish.
pub const RUN_ZONE_SPLIT: [f64; 3] = [0.24, 0.67, 0.09];

/// Zone 1 to zone 3 multipliers of one scenario's race-day pacing plan.
///
/// Velocities scale the base training velocity, heart rates the mean training
/// heart rate and power the mean bike power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneFactors {
    pub swim_velocity: [f64; 3],
    pub bike_velocity: [f64; 3],
    pub bike_heart_rate: [f64; 3],
    pub bike_power: [f64; 3],
    pub run_velocity: [f64; 3],
    pub run_heart_rate: [f64; 3],
}

pub const AGGRESSIVE_ZONES: ZoneFactors = ZoneFactors {
    swim_velocity: [0.90, 1.05, 1.10],
    bike_velocity: [0.85, 1.05, 0.95],
    bike_heart_rate: [0.90, 1.00, 0.95],
    bike_power: [0.85, 1.00, 0.90],
    run_velocity: [0.88, 1.02, 1.06],
    run_heart_rate: [0.93, 0.98, 1.02],
};

pub const REALISTIC_ZONES: ZoneFactors = ZoneFactors {
    swim_velocity: [0.88, 1.00, 1.05],
    bike_velocity: [0.82, 1.00, 0.92],
    bike_heart_rate: [0.88, 0.98, 0.93],
    bike_power: [0.82, 0.95, 0.88],
    run_velocity: [0.85, 0.98, 1.02],
    run_heart_rate: [0.90, 0.96, 0.99],
};

pub const CONSERVATIVE_ZONES: ZoneFactors = ZoneFactors {
    swim_velocity: [0.85, 0.95, 1.00],
    bike_velocity: [0.78, 0.95, 0.88],
    bike_heart_rate: [0.85, 0.95, 0.90],
    bike_power: [0.78, 0.90, 0.85],
    run_velocity: [0.82, 0.95, 0.98],
    run_heart_rate: [0.88, 0.94, 0.97],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneTable {
    pub aggressive: ZoneFactors,
    pub realistic: ZoneFactors,
    pub conservative: ZoneFactors,
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self {
            aggressive: AGGRESSIVE_ZONES,
            realistic: REALISTIC_ZONES,
            conservative: CONSERVATIVE_ZONES,
        }
    }
}

impl ZoneTable {
    pub fn get(&self, scenario: Scenario) -> &ZoneFactors {
        match scenario {
            Scenario::Aggressive => &self.aggressive,
            Scenario::Realistic => &self.realistic,
            Scenario::Conservative => &self.conservative,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisciplineValues {
    pub swim: f64,
    pub bike: f64,
    pub run: f64,
}

impl DisciplineValues {
    pub fn get(&self, discipline: Discipline) -> f64 {
        match discipline {
            Discipline::Swim => self.swim,
            Discipline::Bike => self.bike,
            Discipline::Run => self.run,
        }
    }
}

pub const FALLBACK_VELOCITY_MPS: DisciplineValues = DisciplineValues {
    swim: 1.0,
    bike: 8.0,
    run: 3.2,
};

pub const FALLBACK_HEART_RATE_BPM: DisciplineValues = DisciplineValues {
    swim: 130.0,
    bike: 140.0,
    run: 165.0,
};

pub const FALLBACK_POWER_W: f64 = 175.0;

/// Values substituted when a discipline has no qualifying data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fallbacks {
    pub velocity_mps: DisciplineValues,
    pub heart_rate_bpm: DisciplineValues,
    pub power_w: f64,
}

impl Default for Fallbacks {
    fn default() -> Self {
        Self {
            velocity_mps: FALLBACK_VELOCITY_MPS,
            heart_rate_bpm: FALLBACK_HEART_RATE_BPM,
            power_w: FALLBACK_POWER_W,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub scenarios: ScenarioTable,
    pub zones: ZoneTable,
    pub fallbacks: Fallbacks,
    pub thresholds: ThresholdTable,
}

impl ReportConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ReportError> {
        toml::from_str(raw).map_err(|err| ReportError::Config(err.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|err| ReportError::Config(format!("{}: {err}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub fn thresholds_for(&self, category: &RaceCategory) -> &ZoneThresholds {
        self.thresholds.for_category(category)
    }
}
