//! # ptdgen-graft
//!
//! Places generated sheets into a PTD template workbook.
//!
//! This crate provides:
//! - `graft_sheets`: replace (or append) the schedule and forms sheets of a
//!   template with the first sheet of two source workbooks
//! - `replace_sheet`: the same operation on an in-memory `Spreadsheet`
//! - `finalize_formatting`: header banding, borders and column widths on a
//!   saved workbook's sheet
//!
//! A replaced sheet keeps the index it had in the template; every other
//! sheet keeps its name, position and content.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ptdgen_core::TracingEmitter;
//! use ptdgen_graft::{graft_sheets, GraftOptions};
//! use std::path::Path;
//!
//! let report = graft_sheets(
//!     Path::new("template.xlsx"),
//!     Path::new("schedule_grid.xlsx"),
//!     Path::new("study_forms.xlsx"),
//!     Path::new("ptd.xlsx"),
//!     &GraftOptions::default(),
//!     &mut TracingEmitter,
//! )?;
//! println!("{:?}", report.sheet_order);
//! # Ok::<(), ptdgen_graft::GraftError>(())
//! ```

pub mod copy;
pub mod format;

pub use copy::{copy_sheet, CopyMode, RowFilter};
pub use format::{auto_format_sheet, finalize_formatting, FormatSummary};

use ptdgen_core::{DiagnosticEmitter, GraftConfig};
use std::path::{Path, PathBuf};
use thiserror::Error;
use umya_spreadsheet::{Spreadsheet, Worksheet};

/// Errors raised while grafting or formatting workbooks
#[derive(Debug, Error)]
pub enum GraftError {
    #[error("Failed to open workbook {path}: {message}")]
    Open { path: PathBuf, message: String },

    #[error("Workbook {path} has no worksheets")]
    EmptySource { path: PathBuf },

    #[error("Invalid sheet '{name}': {message}")]
    SheetName { name: String, message: String },

    #[error("Failed to write workbook {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where a replacement sheet ended up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SheetPlacement {
    /// An existing sheet of the same name was replaced at `index`
    Replaced { index: usize },
    /// No sheet of that name existed; the copy was appended at `index`
    Appended { index: usize },
}

impl SheetPlacement {
    pub fn index(self) -> usize {
        match self {
            Self::Replaced { index } | Self::Appended { index } => index,
        }
    }
}

/// Target sheet names and copy mode for each source
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraftOptions {
    pub schedule_sheet_name: String,
    pub forms_sheet_name: String,
    pub schedule_mode: CopyMode,
    pub forms_mode: CopyMode,
}

impl GraftOptions {
    /// Options from configuration; `fast` selects values-only copies with
    /// header styling limited to the configured row counts
    pub fn from_config(config: &GraftConfig, fast: bool) -> Self {
        let (schedule_mode, forms_mode) = if fast {
            (
                CopyMode::Fast { header_rows: config.schedule_header_rows },
                CopyMode::Fast { header_rows: config.forms_header_rows },
            )
        } else {
            (CopyMode::Full, CopyMode::Full)
        };
        Self {
            schedule_sheet_name: config.schedule_sheet_name.clone(),
            forms_sheet_name: config.forms_sheet_name.clone(),
            schedule_mode,
            forms_mode,
        }
    }

    pub fn is_fast(&self) -> bool {
        matches!(self.schedule_mode, CopyMode::Fast { .. })
            || matches!(self.forms_mode, CopyMode::Fast { .. })
    }
}

impl Default for GraftOptions {
    fn default() -> Self {
        Self::from_config(&GraftConfig::default(), false)
    }
}

/// Outcome of a graft
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraftReport {
    /// Sheet names of the written workbook, in order
    pub sheet_order: Vec<String>,
    pub schedule: SheetPlacement,
    pub forms: SheetPlacement,
}

/// Graft the first sheet of `schedule` and `forms` into `template`, writing
/// the result to `out`. `out` may equal `template`.
pub fn graft_sheets(
    template: &Path,
    schedule: &Path,
    forms: &Path,
    out: &Path,
    options: &GraftOptions,
    emitter: &mut dyn DiagnosticEmitter,
) -> Result<GraftReport, GraftError> {
    let mut book = open_workbook(template)?;
    let schedule_book = open_workbook(schedule)?;
    let forms_book = open_workbook(forms)?;

    let schedule_source = first_sheet(&schedule_book, schedule)?;
    let forms_source = first_sheet(&forms_book, forms)?;

    let schedule_placement = replace_sheet(
        &mut book,
        &options.schedule_sheet_name,
        schedule_source,
        options.schedule_mode,
        emitter,
    )?;
    let forms_placement = replace_sheet(
        &mut book,
        &options.forms_sheet_name,
        forms_source,
        options.forms_mode,
        emitter,
    )?;

    save_workbook(&book, out)?;

    let report = GraftReport {
        sheet_order: sheet_names(&book),
        schedule: schedule_placement,
        forms: forms_placement,
    };
    tracing::info!(
        "Grafted '{}' and '{}' into {} ({} sheets)",
        options.schedule_sheet_name,
        options.forms_sheet_name,
        out.display(),
        report.sheet_order.len()
    );
    Ok(report)
}

/// Replace the sheet named `target` with a copy of `source`, keeping its
/// index, or append the copy when no such sheet exists
pub fn replace_sheet(
    book: &mut Spreadsheet,
    target: &str,
    source: &Worksheet,
    mode: CopyMode,
    emitter: &mut dyn DiagnosticEmitter,
) -> Result<SheetPlacement, GraftError> {
    let existing = book
        .get_sheet_collection_no_check()
        .iter()
        .position(|s| s.get_name() == target);

    if existing.is_some() {
        book.remove_sheet_by_name(target).map_err(|e| GraftError::SheetName {
            name: target.to_string(),
            message: e.to_string(),
        })?;
    }

    let created = book.new_sheet(target).map_err(|e| GraftError::SheetName {
        name: target.to_string(),
        message: e.to_string(),
    })?;
    copy_sheet(source, created, mode, emitter);

    let last = book.get_sheet_collection_no_check().len() - 1;
    let placement = match existing {
        Some(index) if index < last => {
            let sheets = book.get_sheet_collection_mut();
            let sheet = sheets.remove(last);
            sheets.insert(index, sheet);
            SheetPlacement::Replaced { index }
        }
        Some(index) => SheetPlacement::Replaced { index },
        None => SheetPlacement::Appended { index: last },
    };

    tracing::debug!("Sheet '{}' placed: {:?}", target, placement);
    Ok(placement)
}

/// Sheet names in workbook order
pub fn sheet_names(book: &Spreadsheet) -> Vec<String> {
    book.get_sheet_collection_no_check()
        .iter()
        .map(|s| s.get_name().to_string())
        .collect()
}

pub(crate) fn open_workbook(path: &Path) -> Result<Spreadsheet, GraftError> {
    umya_spreadsheet::reader::xlsx::read(path).map_err(|e| GraftError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

pub(crate) fn save_workbook(book: &Spreadsheet, path: &Path) -> Result<(), GraftError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    umya_spreadsheet::writer::xlsx::write(book, path).map_err(|e| GraftError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn first_sheet<'a>(book: &'a Spreadsheet, path: &Path) -> Result<&'a Worksheet, GraftError> {
    book.get_sheet_collection_no_check()
        .first()
        .ok_or_else(|| GraftError::EmptySource {
            path: path.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptdgen_core::CollectingEmitter;

    fn book_with(names: &[&str]) -> Spreadsheet {
        let mut book = umya_spreadsheet::new_file();
        book.get_sheet_collection_mut()[0].set_name(names[0]);
        for name in &names[1..] {
            book.new_sheet(*name).unwrap();
        }
        book
    }

    fn source(value: &str) -> Spreadsheet {
        let mut book = umya_spreadsheet::new_file();
        book.get_sheet_collection_mut()[0]
            .get_cell_mut((1, 1))
            .set_value(value);
        book
    }

    #[test]
    fn replaces_in_place() {
        let mut book = book_with(&["Cover", "Schedule Grid", "Notes"]);
        let src = source("new");
        let mut emitter = CollectingEmitter::new();

        let placement = replace_sheet(
            &mut book,
            "Schedule Grid",
            &src.get_sheet_collection_no_check()[0],
            CopyMode::Full,
            &mut emitter,
        )
        .unwrap();

        assert_eq!(placement, SheetPlacement::Replaced { index: 1 });
        assert_eq!(sheet_names(&book), vec!["Cover", "Schedule Grid", "Notes"]);
        let sheet = book.get_sheet_by_name("Schedule Grid").unwrap();
        assert_eq!(sheet.get_cell((1, 1)).unwrap().get_value(), "new");
    }

    #[test]
    fn appends_when_absent() {
        let mut book = book_with(&["Cover", "Notes"]);
        let src = source("new");
        let mut emitter = CollectingEmitter::new();

        let placement = replace_sheet(
            &mut book,
            "Study Specific Forms",
            &src.get_sheet_collection_no_check()[0],
            CopyMode::Fast { header_rows: 3 },
            &mut emitter,
        )
        .unwrap();

        assert_eq!(placement, SheetPlacement::Appended { index: 2 });
        assert_eq!(
            sheet_names(&book),
            vec!["Cover", "Notes", "Study Specific Forms"]
        );
    }

    #[test]
    fn replacing_last_sheet_keeps_index() {
        let mut book = book_with(&["Cover", "Schedule Grid"]);
        let src = source("x");
        let placement = replace_sheet(
            &mut book,
            "Schedule Grid",
            &src.get_sheet_collection_no_check()[0],
            CopyMode::Full,
            &mut CollectingEmitter::new(),
        )
        .unwrap();
        assert_eq!(placement, SheetPlacement::Replaced { index: 1 });
        assert_eq!(placement.index(), 1);
    }

    #[test]
    fn options_from_config() {
        let config = GraftConfig::default();
        let full = GraftOptions::from_config(&config, false);
        assert_eq!(full.schedule_mode, CopyMode::Full);
        assert!(!full.is_fast());

        let fast = GraftOptions::from_config(&config, true);
        assert_eq!(fast.schedule_mode, CopyMode::Fast { header_rows: 5 });
        assert_eq!(fast.forms_mode, CopyMode::Fast { header_rows: 3 });
        assert_eq!(fast.forms_sheet_name, "Study Specific Forms");
    }
}
