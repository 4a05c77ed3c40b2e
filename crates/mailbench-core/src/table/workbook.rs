use super::{Cell, ResultTable};
use crate::error::{Error, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::path::Path;

/// Read the first worksheet of an .xlsx workbook; its first row is the header.
pub fn read_xlsx(path: &Path) -> Result<ResultTable> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => {
            return Err(Error::UnsupportedFormat(format!(
                "{} has no worksheets",
                path.display()
            )))
        }
    };

    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| c.to_string().trim().to_string()).collect(),
        None => return Ok(ResultTable::default()),
    };

    let body = rows.map(|row| row.iter().map(to_cell).collect()).collect();
    Ok(ResultTable::new(columns, body))
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => Cell::parse(s),
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_cells_go_through_null_detection() {
        assert_eq!(to_cell(&Data::String("N/A".to_string())), Cell::Empty);
        assert_eq!(to_cell(&Data::String("Tech".to_string())), Cell::Text("Tech".to_string()));
        assert_eq!(to_cell(&Data::Float(3.0)), Cell::Float(3.0));
        assert_eq!(to_cell(&Data::Empty), Cell::Empty);
    }
}
