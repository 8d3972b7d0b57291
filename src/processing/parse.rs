use crate::processing::types::{RawTable, ReportError, columns};
use csv::{ReaderBuilder, Trim};

/// Read a training-log CSV export into a header plus rows of raw cells.
///
/// Rows may be shorter or longer than the header; blank rows are dropped. Cells
/// that are not valid UTF-8 are decoded lossily and their row is recorded in
/// `lossy_rows`. The only structural requirements are a `WorkoutType` column and
/// at least one data row.
pub fn parse_training_log(bytes: &[u8]) -> Result<RawTable, ReportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_string())
        .collect();

    if headers.iter().all(|header| header.is_empty()) {
        return Err(ReportError::EmptyInput);
    }

    let table = RawTable {
        headers,
        ..RawTable::default()
    };
    if table.column_index(columns::WORKOUT_TYPE).is_none() {
        return Err(ReportError::MissingRequiredColumn(
            columns::WORKOUT_TYPE.to_string(),
        ));
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut lossy_rows = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim_ascii().is_empty()) {
            continue;
        }
        let mut lossy = false;
        let cells: Vec<String> = record
            .iter()
            .map(|cell| match std::str::from_utf8(cell) {
                Ok(text) => text.to_string(),
                Err(_) => {
                    lossy = true;
                    String::from_utf8_lossy(cell).into_owned()
                }
            })
            .collect();
        rows.push(cells);
        if lossy {
            tracing::debug!(row = rows.len(), "row decoded with replacement characters");
            lossy_rows.push(rows.len());
        }
    }

    if rows.is_empty() {
        return Err(ReportError::EmptyInput);
    }

    Ok(RawTable {
        rows,
        lossy_rows,
        ..table
    })
}
