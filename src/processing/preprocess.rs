use crate::processing::types::{RawTable, ReportWarning, WorkoutRecord, columns};
use chrono::NaiveDate;

/// Outcome of reading one numeric cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericCell {
    Absent,
    Value(f64),
    Malformed,
}

impl NumericCell {
    /// Absent and malformed cells both collapse to zero.
    pub fn or_zero(self) -> f64 {
        match self {
            NumericCell::Value(value) => value,
            NumericCell::Absent | NumericCell::Malformed => 0.0,
        }
    }

    /// Only strictly positive readings count as present.
    pub fn positive(self) -> Option<f64> {
        match self {
            NumericCell::Value(value) if value > 0.0 => Some(value),
            _ => None,
        }
    }
}

pub fn parse_numeric(raw: &str) -> NumericCell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return NumericCell::Absent;
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => NumericCell::Value(value),
        _ => NumericCell::Malformed,
    }
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

/// Parse a `WorkoutDay` cell. Timestamps keep only their calendar date.
pub fn parse_workout_day(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let date_part = trimmed
        .split(['T', ' '])
        .next()
        .unwrap_or(trimmed);

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
}

#[derive(Debug, Clone, Default)]
pub struct NormalizedLog {
    pub records: Vec<WorkoutRecord>,
    pub warnings: Vec<ReportWarning>,
}

/// Turn raw CSV cells into typed workout records.
///
/// Never fails: bad cells become zero / absent and are reported as warnings.
pub fn normalize_rows(table: &RawTable) -> NormalizedLog {
    let lookup = ColumnLookup::new(table);
    let mut log = NormalizedLog::default();

    for (index, cells) in table.rows.iter().enumerate() {
        let row = index + 1;
        if table.lossy_rows.contains(&row) {
            log.warnings.push(ReportWarning::InvalidText { row });
        }
        let mut numeric = |column: &'static str| {
            let raw = lookup.cell(cells, column);
            let parsed = parse_numeric(raw);
            if parsed == NumericCell::Malformed {
                tracing::debug!(row, column, value = raw, "malformed numeric cell");
                log.warnings.push(ReportWarning::MalformedNumericField {
                    row,
                    column: column.to_string(),
                    value: raw.to_string(),
                });
            }
            parsed
        };

        let distance_m = numeric(columns::DISTANCE).or_zero();
        let duration_h = numeric(columns::DURATION).or_zero();
        let velocity_mps = numeric(columns::VELOCITY).or_zero();
        let heart_rate_bpm = numeric(columns::HEART_RATE).positive();
        let max_heart_rate_bpm = numeric(columns::HEART_RATE_MAX).positive();
        let power_w = numeric(columns::POWER).positive();

        let raw_day = lookup.cell(cells, columns::WORKOUT_DAY);
        let date = parse_workout_day(raw_day);
        if date.is_none() && !raw_day.trim().is_empty() {
            tracing::debug!(row, value = raw_day, "unrecognised workout day");
            log.warnings.push(ReportWarning::MalformedDate {
                row,
                value: raw_day.to_string(),
            });
        }

        let tag = lookup.cell(cells, columns::WORKOUT_TYPE).trim();

        log.records.push(WorkoutRecord {
            row,
            discipline_tag: (!tag.is_empty()).then(|| tag.to_string()),
            date,
            distance_m,
            duration_h,
            velocity_mps,
            heart_rate_bpm,
            max_heart_rate_bpm,
            power_w,
            title: lookup.cell(cells, columns::TITLE).trim().to_string(),
            description: lookup.cell(cells, columns::DESCRIPTION).trim().to_string(),
        });
    }

    log
}

struct ColumnLookup<'a> {
    table: &'a RawTable,
}

impl<'a> ColumnLookup<'a> {
    fn new(table: &'a RawTable) -> Self {
        Self { table }
    }

    /// Missing columns and short rows read as empty cells.
    fn cell<'r>(&self, cells: &'r [String], column: &str) -> &'r str {
        self.table
            .column_index(column)
            .and_then(|index| cells.get(index))
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
            ..RawTable::default()
        }
    }

    #[test]
    fn numeric_cells_distinguish_absent_from_malformed() {
        assert_eq!(parse_numeric(" 12.5 "), NumericCell::Value(12.5));
        assert_eq!(parse_numeric(""), NumericCell::Absent);
        assert_eq!(parse_numeric("abc"), NumericCell::Malformed);
        assert_eq!(parse_numeric("NaN"), NumericCell::Malformed);
        assert_eq!(parse_numeric("-3").positive(), None);
    }

    #[test]
    fn workout_days_accept_dates_and_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 9);
        assert_eq!(parse_workout_day("2025-03-09"), expected);
        assert_eq!(parse_workout_day("2025-03-09T06:30:00"), expected);
        assert_eq!(parse_workout_day("2025-03-09 06:30"), expected);
        assert_eq!(parse_workout_day("09/03/2025"), expected);
        assert_eq!(parse_workout_day("yesterday"), None);
        assert_eq!(parse_workout_day(""), None);
    }

    #[test]
    fn malformed_distance_becomes_zero_with_a_warning() {
        let log = normalize_rows(&table(
            &["WorkoutType", "DistanceInMeters", "VelocityAverage"],
            &[&["Run", "abc", "3.1"]],
        ));

        assert_eq!(log.records.len(), 1);
        assert_eq!(log.records[0].distance_m, 0.0);
        assert_eq!(log.records[0].velocity_mps, 3.1);
        assert_eq!(
            log.warnings,
            vec![ReportWarning::MalformedNumericField {
                row: 1,
                column: "DistanceInMeters".to_string(),
                value: "abc".to_string(),
            }]
        );
    }

    #[test]
    fn untagged_rows_are_kept_without_a_tag() {
        let log = normalize_rows(&table(
            &["WorkoutType", "Title", "WorkoutDay"],
            &[&["", "Mystery", "2025-01-02"], &["Swim"]],
        ));

        assert_eq!(log.records.len(), 2);
        assert_eq!(log.records[0].discipline_tag, None);
        assert_eq!(log.records[0].title, "Mystery");
        assert_eq!(log.records[1].discipline_tag.as_deref(), Some("Swim"));
        assert_eq!(log.records[1].date, None);
        assert!(log.warnings.is_empty());
    }

    #[test]
    fn unrecognised_workout_day_is_reported() {
        let log = normalize_rows(&table(
            &["WorkoutType", "WorkoutDay", "DistanceInMeters"],
            &[&["Run", "yesterday", "8000"], &["Run", "2025-02-01", "5000"]],
        ));

        assert_eq!(log.records.len(), 2);
        assert_eq!(log.records[0].date, None);
        assert_eq!(log.records[0].distance_m, 8000.0);
        assert_eq!(log.records[1].date, NaiveDate::from_ymd_opt(2025, 2, 1));
        assert_eq!(
            log.warnings,
            vec![ReportWarning::MalformedDate {
                row: 1,
                value: "yesterday".to_string(),
            }]
        );
    }

    #[test]
    fn lossy_rows_carry_an_invalid_text_warning() {
        let mut raw = table(
            &["WorkoutType", "Title"],
            &[&["Run", "Easy"], &["Swim", "Nata\u{fffd}o"]],
        );
        raw.lossy_rows = vec![2];

        let log = normalize_rows(&raw);
        assert_eq!(log.records[1].title, "Nata\u{fffd}o");
        assert_eq!(log.warnings, vec![ReportWarning::InvalidText { row: 2 }]);
    }

    #[test]
    fn zero_heart_rate_reads_as_absent() {
        let log = normalize_rows(&table(
            &["WorkoutType", "HeartRateAverage", "PowerAverage"],
            &[&["Bike", "0", "210"]],
        ));

        assert_eq!(log.records[0].heart_rate_bpm, None);
        assert_eq!(log.records[0].power_w, Some(210.0));
    }
}
