//! In-memory grid workbook
//!
//! A `Grid` is a sparse matrix of styled cells plus a set of rectangular,
//! non-overlapping merge ranges. Every cell covered by a merge is either the
//! range's anchor (top-left, holding the value and style) or a member that
//! points back at its anchor.
//!
//! Coordinates are zero-based, matching `rust_xlsxwriter`.

use crate::{CellValue, LayoutError};
use std::collections::BTreeMap;
use std::fmt;

/// Zero-based cell coordinate. Orders row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
}

impl CellRef {
    pub const fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Column letters for a zero-based column index (0 -> "A", 26 -> "AA")
    pub fn column_letters(col: u16) -> String {
        let mut result = String::new();
        let mut n = col as u32 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::column_letters(self.col), self.row + 1)
    }
}

/// Named cell styles used by the schedule grid.
///
/// Renderers map each variant to concrete font/alignment/fill/border settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellStyle {
    /// Bold, centered, blue header fill, thin border
    Header,
    /// Header fill and border only (blank header cells)
    HeaderBlank,
    /// Bold, centered, grey fill, thin border
    SectionTitle,
    /// Bold, left-aligned, grey fill, thin border
    AttributeLabel,
    /// Centered, thin border
    AttributeValue,
    /// Thin border only
    Bordered,
    /// Left-aligned, wrapped
    BodyText,
    /// Centered, wrapped
    BodyMark,
}

/// A populated grid position
#[derive(Clone, Debug, PartialEq)]
pub enum GridCell {
    /// A cell holding its own value: a standalone cell or a merge's top-left
    Anchor {
        value: CellValue,
        style: Option<CellStyle>,
    },
    /// A cell merged away into the range anchored at `anchor`
    Member { anchor: CellRef },
}

/// Inclusive rectangular merge range
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeRange {
    pub first: CellRef,
    pub last: CellRef,
}

impl MergeRange {
    pub fn contains(&self, at: CellRef) -> bool {
        at.row >= self.first.row
            && at.row <= self.last.row
            && at.col >= self.first.col
            && at.col <= self.last.col
    }

    pub fn width(&self) -> u16 {
        self.last.col - self.first.col + 1
    }

    pub fn height(&self) -> u32 {
        self.last.row - self.first.row + 1
    }
}

impl fmt::Display for MergeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.first, self.last)
    }
}

/// A single-sheet grid workbook
#[derive(Clone, Debug, Default)]
pub struct Grid {
    /// Worksheet name
    pub name: String,
    cells: BTreeMap<CellRef, GridCell>,
    merges: Vec<MergeRange>,
    column_widths: BTreeMap<u16, f64>,
    freeze: Option<CellRef>,
}

impl Grid {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Write a value and style at `at`.
    ///
    /// Merged-away members carry no content of their own; writes to them are
    /// ignored and `false` is returned.
    pub fn set(&mut self, at: CellRef, value: impl Into<CellValue>, style: Option<CellStyle>) -> bool {
        if let Some(GridCell::Member { .. }) = self.cells.get(&at) {
            return false;
        }
        self.cells.insert(
            at,
            GridCell::Anchor {
                value: value.into(),
                style,
            },
        );
        true
    }

    /// Merge `first..=last`, placing `value` and `style` on the anchor.
    pub fn merge(
        &mut self,
        first: CellRef,
        last: CellRef,
        value: impl Into<CellValue>,
        style: Option<CellStyle>,
    ) -> Result<(), LayoutError> {
        let range = MergeRange { first, last };
        if last.row < first.row || last.col < first.col {
            return Err(LayoutError::InvertedRange(range.to_string()));
        }
        if first == last {
            return Err(LayoutError::SingleCellMerge(range.to_string()));
        }
        if self
            .merges
            .iter()
            .any(|m| ranges_overlap(m, &range))
        {
            return Err(LayoutError::MergeOverlap(range.to_string()));
        }

        for row in first.row..=last.row {
            for col in first.col..=last.col {
                let at = CellRef::new(row, col);
                if at != first {
                    self.cells.insert(at, GridCell::Member { anchor: first });
                }
            }
        }
        self.cells.insert(
            first,
            GridCell::Anchor {
                value: value.into(),
                style,
            },
        );
        self.merges.push(range);
        Ok(())
    }

    pub fn get(&self, at: CellRef) -> Option<&GridCell> {
        self.cells.get(&at)
    }

    /// The value shown at `at`; merge members resolve to their anchor's value.
    pub fn value(&self, at: CellRef) -> CellValue {
        match self.cells.get(&at) {
            Some(GridCell::Anchor { value, .. }) => value.clone(),
            Some(GridCell::Member { anchor }) => match self.cells.get(anchor) {
                Some(GridCell::Anchor { value, .. }) => value.clone(),
                _ => CellValue::Empty,
            },
            None => CellValue::Empty,
        }
    }

    /// Style of the cell at `at`; members report their anchor's style.
    pub fn style(&self, at: CellRef) -> Option<CellStyle> {
        match self.cells.get(&at)? {
            GridCell::Anchor { style, .. } => *style,
            GridCell::Member { anchor } => match self.cells.get(anchor)? {
                GridCell::Anchor { style, .. } => *style,
                GridCell::Member { .. } => None,
            },
        }
    }

    /// The merge range covering `at`, if any
    pub fn merge_at(&self, at: CellRef) -> Option<&MergeRange> {
        self.merges.iter().find(|m| m.contains(at))
    }

    pub fn merges(&self) -> &[MergeRange] {
        &self.merges
    }

    /// All populated cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (CellRef, &GridCell)> {
        self.cells.iter().map(|(at, cell)| (*at, cell))
    }

    /// Anchor cells only (the cells a writer must emit)
    pub fn anchors(&self) -> impl Iterator<Item = (CellRef, &CellValue, Option<CellStyle>)> {
        self.cells.iter().filter_map(|(at, cell)| match cell {
            GridCell::Anchor { value, style } => Some((*at, value, *style)),
            GridCell::Member { .. } => None,
        })
    }

    /// Number of rows spanned by populated cells
    pub fn row_count(&self) -> u32 {
        self.cells.keys().map(|at| at.row + 1).max().unwrap_or(0)
    }

    /// Number of columns spanned by populated cells
    pub fn column_count(&self) -> u16 {
        self.cells.keys().map(|at| at.col + 1).max().unwrap_or(0)
    }

    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.column_widths.insert(col, width);
    }

    pub fn column_width(&self, col: u16) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    pub fn column_widths(&self) -> impl Iterator<Item = (u16, f64)> + '_ {
        self.column_widths.iter().map(|(col, width)| (*col, *width))
    }

    /// Size every column to its longest anchor value plus `margin`, never
    /// narrower than `min_width`.
    pub fn auto_fit_columns(&mut self, min_width: f64, margin: f64) {
        let mut longest: BTreeMap<u16, usize> = BTreeMap::new();
        for (at, value, _) in self.anchors() {
            let entry = longest.entry(at.col).or_default();
            *entry = (*entry).max(value.display_len());
        }
        for col in 0..self.column_count() {
            let len = longest.get(&col).copied().unwrap_or(0) as f64;
            self.column_widths.insert(col, (len + margin).max(min_width));
        }
    }

    /// Freeze rows above and columns left of `at`
    pub fn freeze_panes(&mut self, at: CellRef) {
        self.freeze = Some(at);
    }

    pub fn freeze(&self) -> Option<CellRef> {
        self.freeze
    }
}

fn ranges_overlap(a: &MergeRange, b: &MergeRange) -> bool {
    !(a.last.col < b.first.col
        || b.last.col < a.first.col
        || a.last.row < b.first.row
        || b.last.row < a.first.row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(CellRef::column_letters(0), "A");
        assert_eq!(CellRef::column_letters(25), "Z");
        assert_eq!(CellRef::column_letters(26), "AA");
        assert_eq!(CellRef::column_letters(51), "AZ");
        assert_eq!(CellRef::new(3, 27).to_string(), "AB4");
    }

    #[test]
    fn merge_marks_members() {
        let mut grid = Grid::new("Test");
        grid.merge(CellRef::new(0, 1), CellRef::new(0, 3), "Treatment", Some(CellStyle::Header))
            .unwrap();

        assert!(matches!(grid.get(CellRef::new(0, 1)), Some(GridCell::Anchor { .. })));
        assert_eq!(
            grid.get(CellRef::new(0, 2)),
            Some(&GridCell::Member { anchor: CellRef::new(0, 1) })
        );
        assert_eq!(grid.value(CellRef::new(0, 3)), CellValue::from("Treatment"));
        assert_eq!(grid.style(CellRef::new(0, 3)), Some(CellStyle::Header));
        assert_eq!(grid.merges().len(), 1);
        assert_eq!(grid.merges()[0].to_string(), "B1:D1");
    }

    #[test]
    fn overlapping_merge_rejected() {
        let mut grid = Grid::new("Test");
        grid.merge(CellRef::new(0, 0), CellRef::new(1, 1), "a", None).unwrap();
        let err = grid.merge(CellRef::new(1, 1), CellRef::new(1, 2), "b", None);
        assert!(matches!(err, Err(LayoutError::MergeOverlap(_))));
    }

    #[test]
    fn single_cell_and_inverted_merges_rejected() {
        let mut grid = Grid::new("Test");
        assert!(matches!(
            grid.merge(CellRef::new(0, 0), CellRef::new(0, 0), "a", None),
            Err(LayoutError::SingleCellMerge(_))
        ));
        assert!(matches!(
            grid.merge(CellRef::new(2, 2), CellRef::new(0, 0), "a", None),
            Err(LayoutError::InvertedRange(_))
        ));
    }

    #[test]
    fn writes_to_members_are_ignored() {
        let mut grid = Grid::new("Test");
        grid.merge(CellRef::new(0, 0), CellRef::new(0, 1), "kept", None).unwrap();
        assert!(!grid.set(CellRef::new(0, 1), "dropped", None));
        assert_eq!(grid.value(CellRef::new(0, 1)), CellValue::from("kept"));
    }

    #[test]
    fn auto_fit_uses_floor_and_margin() {
        let mut grid = Grid::new("Test");
        grid.set(CellRef::new(0, 0), "abc", None);
        grid.set(CellRef::new(0, 1), "a much longer header label", None);
        grid.auto_fit_columns(10.0, 2.0);
        assert_eq!(grid.column_width(0), Some(10.0));
        assert_eq!(grid.column_width(1), Some(28.0));
    }

    #[test]
    fn dimensions_follow_populated_cells() {
        let mut grid = Grid::new("Test");
        assert_eq!(grid.row_count(), 0);
        grid.set(CellRef::new(4, 2), 1_i64, None);
        assert_eq!(grid.row_count(), 5);
        assert_eq!(grid.column_count(), 3);
    }
}
