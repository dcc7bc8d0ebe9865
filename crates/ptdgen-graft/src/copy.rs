//! Worksheet-to-worksheet copy
//!
//! Two modes share the same primitives: values are copied cell by cell,
//! styles through `copy_cell_styles` with a row filter, merges through
//! `recreate_merges`.

use ptdgen_core::{Diagnostic, DiagnosticEmitter};
use std::collections::HashSet;
use umya_spreadsheet::helper::coordinate::index_from_coordinate;
use umya_spreadsheet::Worksheet;

/// How much of a source sheet is carried over
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CopyMode {
    /// Values and styles of every cell, merges, column widths, row heights
    #[default]
    Full,
    /// Values and merges; styles only on the first `header_rows` rows
    Fast { header_rows: u32 },
}

/// Rows whose styles are copied
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowFilter {
    All,
    /// Rows `1..=k` (one-based), clamped to the sheet height
    FirstRows(u32),
}

impl RowFilter {
    fn includes(self, row: u32) -> bool {
        match self {
            Self::All => true,
            Self::FirstRows(k) => row <= k,
        }
    }
}

/// Inclusive one-based merge rectangle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeRect {
    pub first_col: u32,
    pub first_row: u32,
    pub last_col: u32,
    pub last_row: u32,
}

impl MergeRect {
    /// Parse an A1 range such as `B1:D1`
    pub fn parse(range: &str) -> Option<Self> {
        let (start, end) = range.split_once(':').unwrap_or((range, range));
        let (Some(c0), Some(r0), _, _) = index_from_coordinate(start) else {
            return None;
        };
        let (Some(c1), Some(r1), _, _) = index_from_coordinate(end) else {
            return None;
        };
        Some(Self {
            first_col: c0.min(c1),
            first_row: r0.min(r1),
            last_col: c0.max(c1),
            last_row: r0.max(r1),
        })
    }

    fn contains(&self, col: u32, row: u32) -> bool {
        (self.first_col..=self.last_col).contains(&col)
            && (self.first_row..=self.last_row).contains(&row)
    }
}

/// Position of a cell relative to the sheet's merges
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellRole {
    /// Top-left of a merge: carries the merged value
    Anchor,
    /// Covered by a merge but not its top-left
    Member,
    Free,
}

/// Merge layout of a source sheet
#[derive(Debug, Default)]
pub struct MergeMap {
    rects: Vec<MergeRect>,
    ranges: Vec<String>,
}

impl MergeMap {
    pub fn from_sheet(sheet: &Worksheet) -> Self {
        let ranges: Vec<String> = sheet.get_merge_cells().iter().map(|r| r.get_range()).collect();
        let rects = ranges.iter().filter_map(|r| MergeRect::parse(r)).collect();
        Self { rects, ranges }
    }

    pub fn role(&self, col: u32, row: u32) -> CellRole {
        match self.rects.iter().find(|m| m.contains(col, row)) {
            Some(m) if m.first_col == col && m.first_row == row => CellRole::Anchor,
            Some(_) => CellRole::Member,
            None => CellRole::Free,
        }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Copy `src` into the empty `dest` according to `mode`
pub fn copy_sheet(
    src: &Worksheet,
    dest: &mut Worksheet,
    mode: CopyMode,
    emitter: &mut dyn DiagnosticEmitter,
) {
    let merges = MergeMap::from_sheet(src);
    match mode {
        CopyMode::Full => {
            copy_dimensions(src, dest);
            recreate_merges(&merges, dest, emitter);
            copy_values(src, dest, &merges);
            copy_cell_styles(src, dest, &merges, RowFilter::All);
        }
        CopyMode::Fast { header_rows } => {
            copy_values(src, dest, &merges);
            recreate_merges(&merges, dest, emitter);
            if header_rows > 0 {
                copy_cell_styles(src, dest, &merges, RowFilter::FirstRows(header_rows));
            }
        }
    }
    tracing::debug!(
        "Copied sheet '{}' -> '{}' ({:?}, {} merges)",
        src.get_name(),
        dest.get_name(),
        mode,
        merges.len()
    );
}

/// Copy typed cell values (formulas included) by position, skipping merge
/// members. Values are never re-parsed from their display text.
pub fn copy_values(src: &Worksheet, dest: &mut Worksheet, merges: &MergeMap) {
    for cell in src.get_cell_collection() {
        let coordinate = cell.get_coordinate();
        let col = *coordinate.get_col_num();
        let row = *coordinate.get_row_num();
        if merges.role(col, row) == CellRole::Member {
            continue;
        }
        if cell.get_value().is_empty() && !cell.is_formula() {
            continue;
        }
        dest.get_cell_mut((col, row))
            .set_cell_value(cell.get_cell_value().clone());
    }
}

/// Copy font, alignment, fill, border and number format of every source
/// cell whose row passes `filter`. Merge members are skipped.
pub fn copy_cell_styles(
    src: &Worksheet,
    dest: &mut Worksheet,
    merges: &MergeMap,
    filter: RowFilter,
) {
    let last_row = match filter {
        RowFilter::All => src.get_highest_row(),
        RowFilter::FirstRows(k) => k.min(src.get_highest_row()),
    };

    for cell in src.get_cell_collection() {
        let coordinate = cell.get_coordinate();
        let col = *coordinate.get_col_num();
        let row = *coordinate.get_row_num();
        if row > last_row || !filter.includes(row) {
            continue;
        }
        if merges.role(col, row) == CellRole::Member {
            continue;
        }
        dest.get_cell_mut((col, row)).set_style(cell.get_style().clone());
    }
}

/// Recreate every parseable source merge on `dest`
pub fn recreate_merges(merges: &MergeMap, dest: &mut Worksheet, emitter: &mut dyn DiagnosticEmitter) {
    let mut seen = HashSet::new();
    for range in &merges.ranges {
        if MergeRect::parse(range).is_none() {
            emitter.emit(Diagnostic::warning(format!(
                "Skipped unreadable merge range '{range}' on '{}'",
                dest.get_name()
            )));
            continue;
        }
        if seen.insert(range.as_str()) {
            dest.add_merge_cells(range.as_str());
        }
    }
}

/// Copy explicit column widths and custom row heights
pub fn copy_dimensions(src: &Worksheet, dest: &mut Worksheet) {
    for column in src.get_column_dimensions() {
        let width = *column.get_width();
        if width > 0.0 {
            dest.get_column_dimension_by_number_mut(column.get_col_num())
                .set_width(width);
        }
    }
    for row in src.get_row_dimensions() {
        let height = *row.get_height();
        if *row.get_custom_height() && height > 0.0 {
            let dest_row = dest.get_row_dimension_mut(row.get_row_num());
            dest_row.set_height(height);
            dest_row.set_custom_height(true);
        }
    }
}
