use super::{Cell, ResultTable};
use crate::error::Result;
use std::path::Path;

/// Read a CSV file with a header row. Ragged records are tolerated.
pub fn read_csv(path: &Path) -> Result<ResultTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::parse).collect());
    }

    Ok(ResultTable::new(columns, rows))
}
