use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook_auto};
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::model::RecordSet;

/// Loads the first worksheet of the workbook at `path` (xlsx, xls or ods).
///
/// The first row provides the headers and every other cell is kept as text.
pub fn read_record_set(path: &Path) -> Result<RecordSet> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| {
            ToolError::InvalidWorkbook(format!("'{}' has no worksheet", path.display()))
        })?
        .map_err(ToolError::from)?;

    let records = range_to_record_set(&range);
    debug!(
        path = %path.display(),
        columns = records.headers().len(),
        rows = records.len(),
        "read first worksheet"
    );
    Ok(records)
}

/// Loads the first worksheet of an in-memory xlsx workbook.
pub fn read_record_set_from_bytes(bytes: &[u8]) -> Result<RecordSet> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ToolError::InvalidWorkbook("workbook has no worksheet".into()))?
        .map_err(ToolError::from)?;
    Ok(range_to_record_set(&range))
}

fn range_to_record_set(range: &Range<DataType>) -> RecordSet {
    let mut rows = range.rows();
    let raw_headers: Vec<String> = match rows.next() {
        Some(first_row) => first_row
            .iter()
            .map(|cell| cell_to_string(Some(cell)))
            .collect(),
        None => Vec::new(),
    };

    let mut records = RecordSet::new(unique_headers(raw_headers));
    for row in rows {
        if row.iter().all(|cell| matches!(cell, DataType::Empty)) {
            continue;
        }
        let cells = row.iter().map(cell_to_text).collect();
        records.push_row(cells);
    }
    records
}

/// Names blank headers after their position and suffixes repeated headers
/// with `.1`, `.2`, ... so that every column can be addressed by name.
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut headers = Vec::with_capacity(raw.len());

    for (index, header) in raw.into_iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {index}")
        } else {
            header
        };

        let mut candidate = base.clone();
        let mut counter = 1;
        while used.contains(&candidate) {
            candidate = format!("{base}.{counter}");
            counter += 1;
        }
        used.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}

fn cell_to_text(cell: &DataType) -> Option<String> {
    match cell {
        DataType::Empty => None,
        other => Some(cell_to_string(Some(other))),
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_repeated_headers_get_unique_names() {
        let headers = unique_headers(vec![
            "Depo".into(),
            "".into(),
            "Depo".into(),
            "Depo".into(),
        ]);
        assert_eq!(headers, vec!["Depo", "Unnamed: 1", "Depo.1", "Depo.2"]);
    }

    #[test]
    fn numeric_cells_keep_their_plain_text_form() {
        assert_eq!(cell_to_text(&DataType::Float(5.0)).as_deref(), Some("5"));
        assert_eq!(cell_to_text(&DataType::Int(42)).as_deref(), Some("42"));
        assert_eq!(
            cell_to_text(&DataType::String("0042".into())).as_deref(),
            Some("0042")
        );
        assert_eq!(cell_to_text(&DataType::Empty), None);
    }
}
