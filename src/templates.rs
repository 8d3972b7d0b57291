use std::collections::BTreeMap;

use crate::config::Scenario;
use crate::processing::display::{
    self, best_workout, compact_km, distance_km, duration_range, heart_rate, heart_rate_range,
    hours_duration, long_date, power, power_range, run_pace, seconds_duration, velocity_for,
    velocity_range_for,
};
use crate::processing::types::{
    BrickSummary, Discipline, PacingPlan, RaceEffort, RaceReport, WorkoutRecord, ZoneAnalysis,
    ZoneTarget,
};

const LANDING_TEMPLATE: &str = include_str!("../templates/landing.html");
const TRIATHLON_TEMPLATE: &str = include_str!("../templates/report.html");
const RUNNING_TEMPLATE: &str = include_str!("../templates/running_report.html");

pub type ReportFields = BTreeMap<String, String>;

/// Most recent long sessions listed per discipline.
pub const LONG_TABLE_ROWS: usize = 15;

/// Minimal escaping for text that came from the uploaded log or the form.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Replace every `{{KEY}}` with its field. Unknown keys are left untouched.
pub fn render_template(template: &str, fields: &ReportFields) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        rendered.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        match after_open.find("}}") {
            Some(end) => {
                let key = &after_open[..end];
                match fields.get(key) {
                    Some(value) => rendered.push_str(value),
                    None => {
                        rendered.push_str("{{");
                        rendered.push_str(key);
                        rendered.push_str("}}");
                    }
                }
                rest = &after_open[end + 2..];
            }
            None => {
                rendered.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    rendered.push_str(rest);
    rendered
}

pub fn render_landing_page() -> String {
    LANDING_TEMPLATE.to_string()
}

/// Standalone report, as offered for download.
pub fn render_report_page(report: &RaceReport) -> String {
    let mut fields = report_fields(report);
    fields.insert("DOWNLOAD_LINK".into(), String::new());
    render_template(template_for(report), &fields)
}

/// Report shown right after an upload, with a link to the stored copy.
pub fn render_upload_result(report: &RaceReport, download_url: &str) -> String {
    let mut fields = report_fields(report);
    fields.insert(
        "DOWNLOAD_LINK".into(),
        format!(
            "<a class=\"cta\" download=\"race-report.html\" href=\"{}\">Download report</a>",
            escape_html(download_url)
        ),
    );
    render_template(template_for(report), &fields)
}

fn template_for(report: &RaceReport) -> &'static str {
    if report.request.category.is_triathlon() {
        TRIATHLON_TEMPLATE
    } else {
        RUNNING_TEMPLATE
    }
}

/// Every named value the report templates may reference.
pub fn report_fields(report: &RaceReport) -> ReportFields {
    let mut fields = ReportFields::new();
    let mut set = |key: &str, value: String| {
        fields.insert(key.to_string(), value);
    };

    let request = &report.request;
    set("ATHLETE_NAME", escape_html(&request.athlete_name()));
    set("EVENT_NAME", escape_html(&request.event_name()));
    set("EVENT_DATE", escape_html(&request.event_date()));
    set("EVENT_LOCATION", escape_html(&request.event_location()));
    set("RACE_CATEGORY", escape_html(&request.category.display_name()));

    let general = &report.general;
    set("TOTAL_WEEKS", general.total_weeks.to_string());
    set("TOTAL_HOURS", format!("{:.1}", general.total_hours));
    set("TOTAL_WORKOUTS", general.total_workouts.to_string());
    set("PERFORMANCE_CLASSIFICATION", general.level.label().to_string());
    set("PERFORMANCE_DESCRIPTION", general.level.description().to_string());
    set(
        "TRAINING_PERIOD",
        display::training_period(general.first_day, general.last_day),
    );

    for discipline in Discipline::ALL {
        let key = discipline.key();
        let stats = report.stats(discipline);
        set(&format!("{key}_WORKOUTS"), stats.count.to_string());
        set(&format!("{key}_TOTAL_KM"), distance_km(stats.total_distance_m, 1));
        set(&format!("{key}_TOTAL_HOURS"), hours_duration(stats.total_duration_h));
        set(&format!("{key}_AVG_HR"), heart_rate(stats.mean_heart_rate_bpm));
        set(
            &format!("{key}_BEST_WORKOUT"),
            best_workout(discipline, stats.best_workout.as_ref()),
        );
        let velocity_key = match discipline {
            Discipline::Bike => "BIKE_AVG_SPEED".to_string(),
            _ => format!("{key}_AVG_PACE"),
        };
        set(&velocity_key, velocity_for(discipline, stats.mean_velocity_mps));
        set(
            &format!("RACE_DISTANCE_{key}"),
            compact_km(report.profile.distance_m(discipline)),
        );
        set(
            &format!("{key}_LONG_TABLE"),
            long_table(
                discipline,
                report.long_workouts.get(discipline),
                report.thresholds.tempo_m(discipline),
            ),
        );
    }
    set("BIKE_AVG_POWER", power(report.bike.mean_power_w));
    set("RACE_DISTANCE_TOTAL", compact_km(report.profile.total_m()));

    for scenario in Scenario::ALL {
        let key = scenario.key();
        let projection = report.scenarios.get(scenario);
        for discipline in Discipline::ALL {
            let segment = projection.segment(discipline);
            let d = discipline.key();
            set(&format!("{key}_{d}_TIME"), duration_range(segment.duration));
            let velocity_key = match discipline {
                Discipline::Bike => format!("{key}_BIKE_SPEED"),
                _ => format!("{key}_{d}_PACE"),
            };
            set(&velocity_key, velocity_range_for(discipline, segment.velocity));
            set(&format!("{key}_{d}_HR"), heart_rate_range(segment.heart_rate_bpm));
        }
        set(&format!("{key}_T1"), transition(projection.t1.min_s, projection.t1.max_s));
        set(&format!("{key}_T2"), transition(projection.t2.min_s, projection.t2.max_s));
        set(&format!("{key}_TOTAL_TIME"), duration_range(projection.total));
        set(&format!("{key}_BIKE_POWER"), power_range(projection.bike_power_w));

        for discipline in Discipline::ALL {
            let d = discipline.key();
            for (index, zone) in projection.pacing.zones(discipline).iter().enumerate() {
                let prefix = format!("{key}_{d}_ZONE{}", index + 1);
                let velocity_key = match discipline {
                    Discipline::Bike => format!("{prefix}_SPEED"),
                    _ => format!("{prefix}_PACE"),
                };
                set(&velocity_key, velocity_for(discipline, zone.velocity_mps));
                if let Some(bpm) = zone.heart_rate_bpm {
                    set(&format!("{prefix}_HR"), heart_rate(bpm));
                }
                if let Some(watts) = zone.power_w {
                    set(&format!("{prefix}_POWER"), power(watts));
                }
                if let Some(seconds) = zone.duration_s {
                    set(&format!("{prefix}_TIME"), seconds_duration(seconds));
                }
            }
        }
        set(
            &format!("{key}_PACING_PLAN"),
            pacing_plan(&projection.pacing, &Discipline::ALL),
        );
        set(
            &format!("{key}_RUN_PACING_PLAN"),
            pacing_plan(&projection.pacing, &[Discipline::Run]),
        );
    }

    let long_runs = &report.long_runs;
    set("LONG_RUNS_THRESHOLD", compact_km(long_runs.threshold_m));
    set("LONG_RUNS_COUNT", long_runs.stats.count.to_string());
    set("LONG_RUNS_AVG_PACE", run_pace(long_runs.stats.mean_velocity_mps));
    set("LONG_RUNS_AVG_HR", heart_rate(long_runs.stats.mean_heart_rate_bpm));
    set("LONG_RUNS_AVG_POWER", power(long_runs.stats.mean_power_w));
    set("LONG_RUNS_MAX_HR", heart_rate(long_runs.stats.max_heart_rate_bpm));
    set(
        "KEY_LONG_RUN",
        match &long_runs.key_run {
            Some(run) => format!(
                "{} km - {} - {}",
                distance_km(run.distance_m, 1),
                run_pace(run.velocity_mps),
                long_date(run.date)
            ),
            None => display::NOT_AVAILABLE.to_string(),
        },
    );

    set("SWIM_TEMPO_ZONE", zone_card(&report.swim_tempo));
    set("BIKE_TEMPO_ZONE", zone_card(&report.bike_tempo));
    set("RUN_RACE_PACE", zone_card(&report.run_race_pace));
    set("BRICK_SESSIONS", brick_sessions(&report.bricks));
    set("RACE_HISTORY", race_history(&report.races));
    set("RACE_PACE_SESSIONS", race_pace_sessions(&report.race_pace_sessions));
    set("WARNINGS", warnings(report));

    fields
}

fn transition(min_s: f64, max_s: f64) -> String {
    if max_s <= 0.0 {
        return display::NO_VALUE.to_string();
    }
    format!("{:.0}-{:.0} min", (min_s / 60.0).round(), (max_s / 60.0).round())
}

fn long_table(discipline: Discipline, records: &[WorkoutRecord], tempo_m: f64) -> String {
    let mut body = String::new();
    let velocity_header = if discipline == Discipline::Bike {
        "Speed"
    } else {
        "Pace"
    };

    body.push_str("<table class=\"long-table\"><thead><tr>");
    body.push_str(&format!(
        "<th>Date</th><th>Distance</th><th>Time</th><th>{velocity_header}</th><th>HR</th>"
    ));
    body.push_str("</tr></thead><tbody>");

    if records.is_empty() {
        body.push_str("<tr><td colspan=\"5\" class=\"empty\">No long sessions logged</td></tr>");
    }
    for record in records.iter().take(LONG_TABLE_ROWS) {
        let class = if record.distance_m >= tempo_m {
            " class=\"tempo\""
        } else {
            ""
        };
        body.push_str(&format!(
            "<tr{class}><td>{}</td><td>{} km</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            long_date(record.date),
            distance_km(record.distance_m, 1),
            hours_duration(record.duration_h),
            velocity_for(discipline, record.velocity_mps),
            heart_rate(record.heart_rate_bpm.unwrap_or(0.0)),
        ));
    }

    body.push_str("</tbody></table>");
    body
}

fn zone_card(zone: &ZoneAnalysis) -> String {
    let discipline = zone.discipline;
    let mut body = String::new();

    body.push_str("<div class=\"zone-card\">");
    body.push_str(&format!(
        "<p class=\"eyebrow\">{} sessions of at least {} km</p>",
        discipline.label(),
        compact_km(zone.threshold_m)
    ));

    let stats = &zone.stats;
    let Some(best) = &stats.best_workout else {
        body.push_str("<p class=\"empty\">No qualifying sessions yet.</p></div>");
        return body;
    };

    body.push_str("<div class=\"summary-grid\">");
    for (label, value) in [
        ("Sessions", stats.count.to_string()),
        ("Average distance", format!("{} km", distance_km(stats.mean_distance_m(), 1))),
        ("Average", velocity_for(discipline, stats.mean_velocity_mps)),
        ("Average HR", heart_rate(stats.mean_heart_rate_bpm)),
    ] {
        body.push_str(&format!(
            "<div class=\"summary-card\"><p class=\"label\">{label}</p><p class=\"value\">{value}</p></div>"
        ));
    }
    body.push_str("</div>");

    body.push_str(&format!(
        "<p class=\"best\"><strong>Best performance:</strong> {} &middot; {} km &middot; {} &middot; {} &middot; {}</p>",
        long_date(best.date),
        distance_km(best.distance_m, 1),
        hours_duration(best.duration_h),
        velocity_for(discipline, best.velocity_mps),
        heart_rate(best.heart_rate_bpm.unwrap_or(0.0)),
    ));

    if discipline == Discipline::Run && !zone.top_velocities.is_empty() {
        let paces: Vec<String> = zone.top_velocities.iter().map(|v| run_pace(*v)).collect();
        body.push_str(&format!(
            "<p class=\"top-paces\"><strong>Top race paces:</strong> {}</p>",
            paces.join(", ")
        ));
    }

    body.push_str("</div>");
    body
}

fn brick_sessions(bricks: &BrickSummary) -> String {
    if bricks.sessions.is_empty() {
        return "<p class=\"empty\">No brick sessions detected.</p>".to_string();
    }

    let mut body = String::new();
    body.push_str(&format!(
        "<p>{} brick session(s); average run off the bike {} at {}.</p>",
        bricks.sessions.len(),
        run_pace(bricks.mean_run_velocity_mps),
        heart_rate(bricks.mean_run_heart_rate_bpm)
    ));
    body.push_str("<table><thead><tr><th>Date</th><th>Bike</th><th>Speed</th><th>Run</th><th>Pace</th><th>HR</th></tr></thead><tbody>");
    for session in &bricks.sessions {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{} km</td><td>{}</td><td>{} km</td><td>{}</td><td>{}</td></tr>",
            long_date(Some(session.date)),
            distance_km(session.bike.distance_m, 1),
            velocity_for(Discipline::Bike, session.bike.velocity_mps),
            distance_km(session.run.distance_m, 1),
            run_pace(session.run.velocity_mps),
            heart_rate(session.run.heart_rate_bpm.unwrap_or(0.0)),
        ));
    }
    body.push_str("</tbody></table>");
    body
}

fn race_history(races: &[RaceEffort]) -> String {
    if races.is_empty() {
        return "<p class=\"empty\">No race-like efforts found in the log.</p>".to_string();
    }

    let mut body = String::new();
    body.push_str("<table><thead><tr><th>Date</th><th>Session</th><th>Discipline</th><th>Distance class</th><th>Distance</th><th>Time</th><th>Pace / speed</th></tr></thead><tbody>");
    for race in races {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{} km</td><td>{}</td><td>{}</td></tr>",
            long_date(race.record.date),
            escape_html(&race.record.title),
            race.discipline.label(),
            race.class.label(),
            distance_km(race.record.distance_m, 2),
            hours_duration(race.record.duration_h),
            velocity_for(race.discipline, race.record.velocity_mps),
        ));
    }
    body.push_str("</tbody></table>");
    body
}

fn race_pace_sessions(sessions: &[WorkoutRecord]) -> String {
    if sessions.is_empty() {
        return "<p class=\"empty\">No race-pace sessions labelled in the log.</p>".to_string();
    }

    let mut body = String::new();
    body.push_str("<table><thead><tr><th>Date</th><th>Session</th><th>Distance</th><th>Pace</th><th>HR</th></tr></thead><tbody>");
    for record in sessions {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{} km</td><td>{}</td><td>{}</td></tr>",
            long_date(record.date),
            escape_html(&record.title),
            distance_km(record.distance_m, 1),
            run_pace(record.velocity_mps),
            heart_rate(record.heart_rate_bpm.unwrap_or(0.0)),
        ));
    }
    body.push_str("</tbody></table>");
    body
}

fn pacing_plan(plan: &PacingPlan, disciplines: &[Discipline]) -> String {
    let mut body = String::from("<div class=\"pacing-plan\">");

    for &discipline in disciplines {
        let zones = plan.zones(discipline);
        let velocity_header = if discipline == Discipline::Bike {
            "Speed"
        } else {
            "Pace"
        };
        let extra_header = match discipline {
            Discipline::Swim => "",
            Discipline::Bike => "<th>HR</th><th>NP</th>",
            Discipline::Run => "<th>HR</th><th>Distance</th><th>Time</th>",
        };

        body.push_str(&format!(
            "<h4>{}</h4><table><thead><tr><th>Zone</th><th>{velocity_header}</th>{extra_header}</tr></thead><tbody>",
            discipline.label()
        ));
        for (index, zone) in zones.iter().enumerate() {
            body.push_str(&format!(
                "<tr><td>Zone {}</td><td>{}</td>{}</tr>",
                index + 1,
                velocity_for(discipline, zone.velocity_mps),
                zone_extras(zone),
            ));
        }
        body.push_str("</tbody></table>");
    }

    body.push_str("</div>");
    body
}

fn zone_extras(zone: &ZoneTarget) -> String {
    let mut cells = String::new();
    if let Some(bpm) = zone.heart_rate_bpm {
        cells.push_str(&format!("<td>{}</td>", heart_rate(bpm)));
    }
    if let Some(watts) = zone.power_w {
        cells.push_str(&format!("<td>{}</td>", power(watts)));
    }
    if let Some(meters) = zone.distance_m {
        cells.push_str(&format!("<td>{} km</td>", distance_km(meters, 1)));
    }
    if let Some(seconds) = zone.duration_s {
        cells.push_str(&format!("<td>{}</td>", seconds_duration(seconds)));
    }
    cells
}

fn warnings(report: &RaceReport) -> String {
    if report.warnings.is_empty() {
        return String::new();
    }

    let mut body = String::from("<ul class=\"warnings\">");
    for warning in &report.warnings {
        body.push_str(&format!("<li>{}</li>", escape_html(&warning.to_string())));
    }
    body.push_str("</ul>");
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::types::RaceDistanceClass;

    fn fields(pairs: &[(&str, &str)]) -> ReportFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitution_replaces_every_occurrence() {
        let rendered = render_template(
            "{{NAME}} / {{NAME}} / {{UNKNOWN}}",
            &fields(&[("NAME", "Ana")]),
        );
        assert_eq!(rendered, "Ana / Ana / {{UNKNOWN}}");
    }

    #[test]
    fn unterminated_placeholder_is_kept_verbatim() {
        let rendered = render_template("a {{NAME} b", &fields(&[("NAME", "x")]));
        assert_eq!(rendered, "a {{NAME} b");
    }

    #[test]
    fn free_text_is_escaped() {
        assert_eq!(
            escape_html("<b>Tom & \"Jerry\"</b>"),
            "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn long_table_highlights_tempo_rows() {
        let records = vec![
            WorkoutRecord {
                distance_m: 95_000.0,
                duration_h: 3.2,
                velocity_mps: 8.2,
                ..WorkoutRecord::default()
            },
            WorkoutRecord {
                distance_m: 75_000.0,
                duration_h: 2.6,
                velocity_mps: 8.0,
                ..WorkoutRecord::default()
            },
        ];

        let table = long_table(Discipline::Bike, &records, 90_000.0);
        assert_eq!(table.matches("class=\"tempo\"").count(), 1);
        assert!(table.contains("29.5 km/h"));
        assert!(table.contains("<th>Speed</th>"));
    }

    #[test]
    fn long_table_lists_at_most_fifteen_sessions() {
        let records: Vec<WorkoutRecord> = (0..20)
            .map(|i| WorkoutRecord {
                row: i + 1,
                distance_m: 16_000.0,
                duration_h: 1.5,
                velocity_mps: 2.96,
                ..WorkoutRecord::default()
            })
            .collect();

        let table = long_table(Discipline::Run, &records, 18_000.0);
        assert_eq!(table.matches("<tr>").count(), LONG_TABLE_ROWS + 1);
    }

    #[test]
    fn pacing_plan_lists_three_zones_per_discipline() {
        let run_zone = ZoneTarget {
            velocity_mps: 3.0,
            heart_rate_bpm: Some(150.0),
            distance_m: Some(5_000.0),
            duration_s: Some(5_000.0 / 3.0),
            ..ZoneTarget::default()
        };
        let plan = PacingPlan {
            run: [run_zone; 3],
            ..PacingPlan::default()
        };

        let run_only = pacing_plan(&plan, &[Discipline::Run]);
        assert_eq!(run_only.matches("<td>Zone ").count(), 3);
        assert!(run_only.contains("<td>5:33/km</td><td>150 bpm</td><td>5.0 km</td><td>28min</td>"));
        assert!(!run_only.contains("Swim"));

        let full = pacing_plan(&plan, &Discipline::ALL);
        assert_eq!(full.matches("<td>Zone ").count(), 9);
        assert!(full.contains("<th>NP</th>"));
    }

    #[test]
    fn race_history_shows_the_escaped_title() {
        let races = vec![RaceEffort {
            discipline: Discipline::Run,
            class: RaceDistanceClass::Olympic,
            record: WorkoutRecord {
                title: "10k <test> & PB".into(),
                distance_m: 10_000.0,
                duration_h: 0.85,
                velocity_mps: 3.27,
                ..WorkoutRecord::default()
            },
        }];

        let history = race_history(&races);
        assert!(history.contains("<th>Session</th>"));
        assert!(history.contains("<td>10k &lt;test&gt; &amp; PB</td>"));
    }
}
