//! # ptdgen-parser
//!
//! Readers for the schedule grid inputs.
//!
//! This crate provides:
//! - Tabular readers for CSV and spreadsheet files (`.xlsx`, `.xlsm`, `.xls`, `.ods`)
//! - Conversion of tables into `Visit` and `FormRecord` sequences
//! - Configuration loading from JSON or TOML
//!
//! ## Example
//!
//! ```rust,ignore
//! use ptdgen_parser::{read_forms, read_visits};
//!
//! let visits = read_visits(Path::new("visits_with_groups.xlsx"))?;
//! let forms = read_forms(Path::new("soa_matrix.csv"))?;
//! ```

pub mod config;
pub mod table;

pub use config::{load_config, load_config_strict, parse_config, ConfigError, ConfigFormat};
pub use table::{read_table, Table};

use ptdgen_core::{FormRecord, Visit};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Column holding the visit's event group
pub const EVENT_GROUP_COLUMN: &str = "Event Group";
/// Column holding the visit label
pub const VISIT_NAME_COLUMN: &str = "Visit Name";

/// Table reading error
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to open workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    #[error("workbook has no worksheets: {path}")]
    NoWorksheet { path: PathBuf },

    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    #[error("unsupported table format: {path}")]
    UnsupportedFormat { path: PathBuf },
}

/// Supported table formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Comma-separated text
    Csv,
    /// Any spreadsheet format calamine can open
    Spreadsheet,
}

/// Detect table format from extension
pub fn detect_format(path: &Path) -> Option<TableFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Some(TableFormat::Csv),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(TableFormat::Spreadsheet),
        _ => None,
    }
}

/// Read the ordered visit table.
///
/// `Event Group` and `Visit Name` are required; the offset and day-range
/// columns are optional and default to empty.
pub fn read_visits(path: &Path) -> Result<Vec<Visit>, TableError> {
    let table = read_table(path)?;
    visits_from_table(&table, path)
}

/// Convert an already-loaded table into visits
pub fn visits_from_table(table: &Table, path: &Path) -> Result<Vec<Visit>, TableError> {
    for required in [EVENT_GROUP_COLUMN, VISIT_NAME_COLUMN] {
        if table.column_index(required).is_none() {
            return Err(TableError::MissingColumn {
                column: required.to_string(),
                path: path.to_path_buf(),
            });
        }
    }

    let visits = (0..table.rows.len())
        .map(|row| Visit {
            event_group: table.value(row, EVENT_GROUP_COLUMN).to_string(),
            visit_name: table.value(row, VISIT_NAME_COLUMN).to_string(),
            offset_type: table.value(row, "Offset Type"),
            offset_days: table.value(row, "Offset Days"),
            day_range_early: table.value(row, "Day Range - Early"),
            day_range_late: table.value(row, "Day Range - Late"),
        })
        .collect::<Vec<_>>();

    tracing::debug!("Read {} visits from {}", visits.len(), path.display());
    Ok(visits)
}

/// Read the forms-applicability table; row order is preserved.
pub fn read_forms(path: &Path) -> Result<Vec<FormRecord>, TableError> {
    let table = read_table(path)?;
    let forms = forms_from_table(&table);
    tracing::debug!("Read {} form rows from {}", forms.len(), path.display());
    Ok(forms)
}

/// Convert an already-loaded table into form records
pub fn forms_from_table(table: &Table) -> Vec<FormRecord> {
    table
        .rows
        .iter()
        .map(|row| {
            let mut record = FormRecord::new();
            for (column, value) in table.columns.iter().zip(row.iter()) {
                record.insert(column.clone(), value.clone());
            }
            record
        })
        .collect()
}
