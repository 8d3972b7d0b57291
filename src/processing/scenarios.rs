//! Race-time projections from training averages.
//!
//! Each discipline's mean training velocity is scaled by the scenario's factor
//! band, and the race distance is divided by both ends of the band. Durations
//! are therefore ranges: the fast end comes from the high velocity factor.

use crate::config::{
    Band, RUN_ZONE_SPLIT, RaceDistanceProfile, ReportConfig, Scenario, ScenarioFactors,
    ZoneFactors,
};
use crate::processing::types::{
    AggregateStats, Discipline, DurationRange, PacingPlan, ScenarioProjection, ScenarioSet,
    SegmentProjection, ValueRange, ZoneTarget,
};

/// Training aggregates the projector reads, one per discipline.
#[derive(Debug, Clone, Copy)]
pub struct DisciplineStats<'a> {
    pub swim: &'a AggregateStats,
    pub bike: &'a AggregateStats,
    pub run: &'a AggregateStats,
}

impl<'a> DisciplineStats<'a> {
    pub fn get(&self, discipline: Discipline) -> &'a AggregateStats {
        match discipline {
            Discipline::Swim => self.swim,
            Discipline::Bike => self.bike,
            Discipline::Run => self.run,
        }
    }
}

pub fn project_scenarios(
    stats: DisciplineStats<'_>,
    profile: &RaceDistanceProfile,
    config: &ReportConfig,
) -> ScenarioSet {
    let project = |scenario| project_scenario(scenario, stats, profile, config);

    ScenarioSet {
        aggressive: project(Scenario::Aggressive),
        realistic: project(Scenario::Realistic),
        conservative: project(Scenario::Conservative),
    }
}

pub fn project_scenario(
    scenario: Scenario,
    stats: DisciplineStats<'_>,
    profile: &RaceDistanceProfile,
    config: &ReportConfig,
) -> ScenarioProjection {
    let factors = config.scenarios.get(scenario);
    let segment = |discipline| project_segment(discipline, stats.get(discipline), profile, factors, config);

    let swim = segment(Discipline::Swim);
    let bike = segment(Discipline::Bike);
    let run = segment(Discipline::Run);

    let (t1, t2) = if profile.has_transitions() {
        (
            minutes_range(factors.t1_minutes),
            minutes_range(factors.t2_minutes),
        )
    } else {
        (DurationRange::default(), DurationRange::default())
    };

    let base_power_w = positive_or(stats.bike.mean_power_w, config.fallbacks.power_w);
    let pacing = pacing_plan(&swim, &bike, &run, base_power_w, config.zones.get(scenario));

    ScenarioProjection {
        scenario,
        total: swim.duration + bike.duration + run.duration + t1 + t2,
        swim,
        bike,
        run,
        t1,
        t2,
        base_power_w,
        bike_power_w: scale(base_power_w, factors.power),
        pacing,
    }
}

/// Zone 1 to zone 3 race-day targets.
///
/// Scales the same bases as the projected segments, so a discipline without
/// training data is planned from its fallback velocity and heart rate. The run
/// leg is split over the zones by [`RUN_ZONE_SPLIT`].
pub fn pacing_plan(
    swim: &SegmentProjection,
    bike: &SegmentProjection,
    run: &SegmentProjection,
    base_power_w: f64,
    zones: &ZoneFactors,
) -> PacingPlan {
    PacingPlan {
        swim: std::array::from_fn(|zone| ZoneTarget {
            velocity_mps: swim.base_velocity_mps * zones.swim_velocity[zone],
            ..ZoneTarget::default()
        }),
        bike: std::array::from_fn(|zone| ZoneTarget {
            velocity_mps: bike.base_velocity_mps * zones.bike_velocity[zone],
            heart_rate_bpm: Some(bike.base_heart_rate_bpm * zones.bike_heart_rate[zone]),
            power_w: Some(base_power_w * zones.bike_power[zone]),
            ..ZoneTarget::default()
        }),
        run: std::array::from_fn(|zone| {
            let velocity_mps = run.base_velocity_mps * zones.run_velocity[zone];
            let distance_m = run.distance_m * RUN_ZONE_SPLIT[zone];
            ZoneTarget {
                velocity_mps,
                heart_rate_bpm: Some(run.base_heart_rate_bpm * zones.run_heart_rate[zone]),
                distance_m: Some(distance_m),
                duration_s: (velocity_mps > 0.0).then(|| distance_m / velocity_mps),
                ..ZoneTarget::default()
            }
        }),
    }
}

fn project_segment(
    discipline: Discipline,
    stats: &AggregateStats,
    profile: &RaceDistanceProfile,
    factors: &ScenarioFactors,
    config: &ReportConfig,
) -> SegmentProjection {
    let base_velocity_mps = positive_or(
        stats.mean_velocity_mps,
        config.fallbacks.velocity_mps.get(discipline),
    );
    let velocity = scale(base_velocity_mps, factors.velocity.get(discipline));
    let distance_m = profile.distance_m(discipline);

    let base_heart_rate = positive_or(
        stats.mean_heart_rate_bpm,
        config.fallbacks.heart_rate_bpm.get(discipline),
    );

    SegmentProjection {
        discipline,
        distance_m,
        base_velocity_mps,
        velocity,
        duration: segment_duration(distance_m, velocity),
        base_heart_rate_bpm: base_heart_rate,
        heart_rate_bpm: scale(base_heart_rate, factors.heart_rate.get(discipline)),
    }
}

/// Time to cover `distance_m` at each end of the velocity range.
pub fn segment_duration(distance_m: f64, velocity: ValueRange) -> DurationRange {
    if distance_m <= 0.0 || velocity.low <= 0.0 || velocity.high <= 0.0 {
        return DurationRange::default();
    }

    DurationRange {
        min_s: distance_m / velocity.high,
        max_s: distance_m / velocity.low,
    }
}

fn scale(base: f64, band: Band) -> ValueRange {
    ValueRange {
        low: base * band.low,
        high: base * band.high,
    }
}

fn minutes_range(band: Band) -> DurationRange {
    DurationRange {
        min_s: band.low * 60.0,
        max_s: band.high * 60.0,
    }
}

/// Zero, negative or non-finite training values fall back to the default.
fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}
