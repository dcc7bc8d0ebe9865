//! Header banding and column sizing for a grafted sheet

use crate::{open_workbook, save_workbook, GraftError};
use ptdgen_core::{Diagnostic, DiagnosticEmitter};
use std::path::Path;
use umya_spreadsheet::{
    Alignment, Border, HorizontalAlignmentValues, PatternValues, Style, VerticalAlignmentValues,
    Worksheet,
};

/// Default header fill (ARGB)
pub const HEADER_FILL: &str = "FFD9E1F2";
/// Row-1 columns beyond this one belong to the event-group band and keep
/// their own fill
pub const GROUP_BAND_FIRST_COLUMN: u32 = 4;
pub const MIN_WIDTH: f64 = 10.0;
pub const MAX_WIDTH: f64 = 80.0;
pub const WIDTH_PADDING: f64 = 3.0;

/// What `auto_format_sheet` touched
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormatSummary {
    pub header_rows: u32,
    pub data_rows: u32,
    pub columns: u32,
}

/// Format `sheet` in place:
/// - header rows `1..=header_rows` (clamped to the sheet) become bold,
///   centered, wrapped and bordered, and get the header fill unless they
///   already carry a fill or sit in the row-1 group band
/// - remaining rows are wrapped, vertically centered and bordered
/// - every column is sized to its longest value
pub fn auto_format_sheet(sheet: &mut Worksheet, header_rows: u32) -> FormatSummary {
    let max_row = sheet.get_highest_row();
    let max_col = sheet.get_highest_column();
    if max_row == 0 || max_col == 0 {
        return FormatSummary::default();
    }
    let header_rows = header_rows.clamp(1, max_row);

    for row in 1..=header_rows {
        for col in 1..=max_col {
            let style = sheet.get_cell_mut((col, row)).get_style_mut();
            style.get_font_mut().set_bold(true);
            let alignment = style.get_alignment_mut();
            alignment.set_horizontal(HorizontalAlignmentValues::Center);
            alignment.set_vertical(VerticalAlignmentValues::Center);
            alignment.set_wrap_text(true);
            if !has_fill(style) && !(row == 1 && col > GROUP_BAND_FIRST_COLUMN) {
                style.set_background_color(HEADER_FILL);
            }
            set_thin_border(style);
        }
    }

    for row in header_rows + 1..=max_row {
        for col in 1..=max_col {
            let style = sheet.get_cell_mut((col, row)).get_style_mut();
            let mut alignment = Alignment::default();
            alignment.set_wrap_text(true);
            alignment.set_vertical(VerticalAlignmentValues::Center);
            style.set_alignment(alignment);
            set_thin_border(style);
        }
    }

    for (col, width) in column_widths(sheet, max_col) {
        sheet.get_column_dimension_by_number_mut(&col).set_width(width);
    }

    FormatSummary {
        header_rows,
        data_rows: max_row - header_rows,
        columns: max_col,
    }
}

/// Open `path`, format `sheet_name` and save it back. Returns `false`
/// without touching the file when the sheet is absent.
pub fn finalize_formatting(
    path: &Path,
    sheet_name: &str,
    header_rows: u32,
    emitter: &mut dyn DiagnosticEmitter,
) -> Result<bool, GraftError> {
    let mut book = open_workbook(path)?;
    let Some(sheet) = book.get_sheet_by_name_mut(sheet_name) else {
        emitter.emit(Diagnostic::warning(format!(
            "Sheet '{sheet_name}' not found in {}; formatting skipped",
            path.display()
        )));
        return Ok(false);
    };

    let summary = auto_format_sheet(sheet, header_rows);
    save_workbook(&book, path)?;
    tracing::info!(
        "Formatted '{}': {} header rows, {} data rows, {} columns",
        sheet_name,
        summary.header_rows,
        summary.data_rows,
        summary.columns
    );
    Ok(true)
}

/// `max(MIN_WIDTH, min(MAX_WIDTH, longest + WIDTH_PADDING))` per column
fn column_widths(sheet: &Worksheet, max_col: u32) -> Vec<(u32, f64)> {
    let mut longest = vec![0usize; max_col as usize + 1];
    for cell in sheet.get_cell_collection() {
        let col = *cell.get_coordinate().get_col_num() as usize;
        if col < longest.len() {
            let len = cell.get_value().chars().count();
            longest[col] = longest[col].max(len);
        }
    }

    (1..=max_col)
        .map(|col| {
            let width = (longest[col as usize] as f64 + WIDTH_PADDING).min(MAX_WIDTH);
            (col, width.max(MIN_WIDTH))
        })
        .collect()
}

fn has_fill(style: &Style) -> bool {
    style
        .get_fill()
        .and_then(|fill| fill.get_pattern_fill())
        .map_or(false, |pattern| *pattern.get_pattern_type() != PatternValues::None)
}

fn set_thin_border(style: &mut Style) {
    let borders = style.get_borders_mut();
    borders.get_left_mut().set_border_style(Border::BORDER_THIN);
    borders.get_right_mut().set_border_style(Border::BORDER_THIN);
    borders.get_top_mut().set_border_style(Border::BORDER_THIN);
    borders.get_bottom_mut().set_border_style(Border::BORDER_THIN);
}
