//! Header-plus-rows tables read from CSV or spreadsheet files

use crate::{detect_format, TableError, TableFormat};
use calamine::{open_workbook_auto, Data, Reader};
use ptdgen_core::CellValue;
use std::path::Path;

/// A rectangular table with a header row.
///
/// Header names are trimmed. Rows shorter than the header read as empty in
/// the missing positions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at (`row`, `column`), or `Empty` when either is absent
    pub fn value(&self, row: usize, column: &str) -> CellValue {
        self.column_index(column)
            .and_then(|col| self.rows.get(row)?.get(col))
            .cloned()
            .unwrap_or_default()
    }

    fn push_row(&mut self, row: Vec<CellValue>) {
        if row.iter().any(|v| !v.is_empty()) {
            self.rows.push(row);
        }
    }
}

/// Read a table, choosing the reader from the file extension
pub fn read_table(path: &Path) -> Result<Table, TableError> {
    match detect_format(path) {
        Some(TableFormat::Csv) => read_csv(path),
        Some(TableFormat::Spreadsheet) => read_spreadsheet(path),
        None => Err(TableError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

fn read_csv(path: &Path) -> Result<Table, TableError> {
    let csv_err = |source| TableError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let columns = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let mut table = Table::new(columns);

    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        table.push_row(record.iter().map(CellValue::parse).collect());
    }

    Ok(table)
}

fn read_spreadsheet(path: &Path) -> Result<Table, TableError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| TableError::Workbook {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TableError::NoWorksheet {
            path: path.to_path_buf(),
        })?
        .map_err(|e| TableError::Workbook {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };
    let mut table = Table::new(header.iter().map(|c| c.to_string().trim().to_string()).collect());

    for row in rows {
        table.push_row(row.iter().map(spreadsheet_value).collect());
    }

    Ok(table)
}

fn spreadsheet_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == "nan" || trimmed == "NaN" {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Float(f) => CellValue::from_f64(*f),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.into()),
        Data::DateTime(dt) => CellValue::from_f64(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}
