//! XLSX writer for schedule grids
//!
//! Maps each `CellStyle` to a `rust_xlsxwriter::Format`, writes anchor cells,
//! recreates merge ranges, then applies column widths and frozen panes.
//!
//! ## Styles
//!
//! | Style            | Font | Alignment             | Fill      | Border |
//! |------------------|------|-----------------------|-----------|--------|
//! | `Header`         | bold | center, wrap          | `D9E1F2`  | thin   |
//! | `HeaderBlank`    |      |                       | `D9E1F2`  | thin   |
//! | `SectionTitle`   | bold | center, wrap          | `E7E6E6`  | thin   |
//! | `AttributeLabel` | bold | left, wrap            | `E7E6E6`  | thin   |
//! | `AttributeValue` |      | center, wrap          |           | thin   |
//! | `Bordered`       |      |                       |           | thin   |
//! | `BodyText`       |      | left, wrap            |           |        |
//! | `BodyMark`       |      | center, wrap          |           |        |

use ptdgen_core::{CellRef, CellStyle, CellValue, Grid, RenderError, Renderer};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::collections::HashSet;
use std::path::Path;

/// Header band fill
pub const HEADER_FILL: u32 = 0xD9E1F2;
/// Section and attribute-label fill
pub const SECTION_FILL: u32 = 0xE7E6E6;

/// Writes a `Grid` as a single-sheet XLSX workbook
#[derive(Clone, Debug)]
pub struct ExcelGridRenderer {
    /// Apply frozen panes recorded on the grid
    pub freeze_panes: bool,
}

impl Default for ExcelGridRenderer {
    fn default() -> Self {
        Self { freeze_panes: true }
    }
}

impl ExcelGridRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave panes unfrozen
    pub fn no_freeze(mut self) -> Self {
        self.freeze_panes = false;
        self
    }

    /// Generate Excel workbook bytes
    pub fn render_to_bytes(&self, grid: &Grid) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();
        let formats = ExcelFormats::new();

        let sheet = workbook.add_worksheet();
        if !grid.name.is_empty() {
            sheet
                .set_name(&grid.name)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }
        self.write_sheet(sheet, grid, &formats)?;

        workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))
    }

    /// Render and write the workbook to `path`
    pub fn save(&self, grid: &Grid, path: &Path) -> Result<(), RenderError> {
        let bytes = self.render_to_bytes(grid)?;
        std::fs::write(path, bytes)?;
        tracing::info!("Schedule grid saved to {}", path.display());
        Ok(())
    }

    fn write_sheet(
        &self,
        sheet: &mut Worksheet,
        grid: &Grid,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let mut merged_anchors = HashSet::new();
        for range in grid.merges() {
            let anchor = range.first;
            merged_anchors.insert(anchor);

            let format = formats.get(grid.style(anchor));
            let value = grid.value(anchor);
            let text = match &value {
                CellValue::Text(s) => s.as_str(),
                _ => "",
            };
            sheet
                .merge_range(
                    range.first.row,
                    range.first.col,
                    range.last.row,
                    range.last.col,
                    text,
                    format,
                )
                .map_err(|e| RenderError::Format(format!("merge {range}: {e}")))?;

            // Non-text anchors are written over the merged string cell
            if let CellValue::Integer(_) | CellValue::Number(_) = value {
                write_value(sheet, anchor, &value, format)?;
            }
        }

        for (at, value, style) in grid.anchors() {
            if merged_anchors.contains(&at) {
                continue;
            }
            match style {
                Some(style) => write_value(sheet, at, value, formats.get(Some(style)))?,
                None if value.is_empty() => {}
                None => write_value(sheet, at, value, &formats.plain)?,
            }
        }

        for (col, width) in grid.column_widths() {
            sheet.set_column_width(col, width).ok();
        }

        if self.freeze_panes {
            if let Some(at) = grid.freeze() {
                sheet.set_freeze_panes(at.row, at.col).ok();
            }
        }

        tracing::debug!(
            "Wrote sheet '{}': {} merges, {} rows",
            grid.name,
            grid.merges().len(),
            grid.row_count()
        );
        Ok(())
    }
}

fn write_value(
    sheet: &mut Worksheet,
    at: CellRef,
    value: &CellValue,
    format: &Format,
) -> Result<(), RenderError> {
    let written = match value {
        CellValue::Empty => sheet.write_blank(at.row, at.col, format),
        CellValue::Text(s) if s.is_empty() => sheet.write_blank(at.row, at.col, format),
        CellValue::Text(s) => sheet.write_string_with_format(at.row, at.col, s, format),
        CellValue::Integer(n) => sheet.write_number_with_format(at.row, at.col, *n as f64, format),
        CellValue::Number(n) => sheet.write_number_with_format(at.row, at.col, *n, format),
    };
    written.map_err(|e| RenderError::Format(format!("cell {at}: {e}")))?;
    Ok(())
}

/// Reusable formats, one per cell style
struct ExcelFormats {
    plain: Format,
    header: Format,
    header_blank: Format,
    section_title: Format,
    attribute_label: Format,
    attribute_value: Format,
    bordered: Format,
    body_text: Format,
    body_mark: Format,
}

impl ExcelFormats {
    fn new() -> Self {
        let centered = Format::new()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap();
        let left = Format::new()
            .set_align(FormatAlign::Left)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap();

        let header = centered
            .clone()
            .set_bold()
            .set_background_color(HEADER_FILL)
            .set_border(FormatBorder::Thin);

        let header_blank = Format::new()
            .set_background_color(HEADER_FILL)
            .set_border(FormatBorder::Thin);

        let section_title = centered
            .clone()
            .set_bold()
            .set_background_color(SECTION_FILL)
            .set_border(FormatBorder::Thin);

        let attribute_label = left
            .clone()
            .set_bold()
            .set_background_color(SECTION_FILL)
            .set_border(FormatBorder::Thin);

        let attribute_value = centered.clone().set_border(FormatBorder::Thin);

        Self {
            plain: Format::new(),
            header,
            header_blank,
            section_title,
            attribute_label,
            attribute_value,
            bordered: Format::new().set_border(FormatBorder::Thin),
            body_text: left,
            body_mark: centered,
        }
    }

    fn get(&self, style: Option<CellStyle>) -> &Format {
        match style {
            None => &self.plain,
            Some(CellStyle::Header) => &self.header,
            Some(CellStyle::HeaderBlank) => &self.header_blank,
            Some(CellStyle::SectionTitle) => &self.section_title,
            Some(CellStyle::AttributeLabel) => &self.attribute_label,
            Some(CellStyle::AttributeValue) => &self.attribute_value,
            Some(CellStyle::Bordered) => &self.bordered,
            Some(CellStyle::BodyText) => &self.body_text,
            Some(CellStyle::BodyMark) => &self.body_mark,
        }
    }
}

impl Renderer for ExcelGridRenderer {
    type Output = Vec<u8>;

    fn render(&self, grid: &Grid) -> Result<Vec<u8>, RenderError> {
        if grid.row_count() == 0 {
            return Err(RenderError::InvalidData("Grid has no cells".into()));
        }
        self.render_to_bytes(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grid() -> Grid {
        let mut grid = Grid::new("Final PTD");
        grid.set(CellRef::new(1, 0), "Form Label", Some(CellStyle::Header));
        grid.merge(CellRef::new(0, 1), CellRef::new(0, 2), "Treatment", Some(CellStyle::Header))
            .unwrap();
        grid.set(CellRef::new(2, 1), 14_i64, Some(CellStyle::AttributeValue));
        grid.set(CellRef::new(2, 2), CellValue::Empty, Some(CellStyle::Bordered));
        grid.auto_fit_columns(10.0, 2.0);
        grid.freeze_panes(CellRef::new(2, 1));
        grid
    }

    #[test]
    fn render_produces_xlsx() {
        let bytes = ExcelGridRenderer::new().render(&small_grid()).unwrap();
        assert!(!bytes.is_empty());
        // XLSX is a ZIP archive
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn empty_grid_is_invalid() {
        let result = ExcelGridRenderer::new().render(&Grid::new("Final PTD"));
        assert!(matches!(result, Err(RenderError::InvalidData(_))));
    }

    #[test]
    fn numeric_merge_anchor() {
        let mut grid = Grid::new("Numbers");
        grid.merge(CellRef::new(0, 0), CellRef::new(1, 0), 42_i64, None).unwrap();
        let bytes = ExcelGridRenderer::new().no_freeze().render(&grid).unwrap();
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn every_style_has_a_format() {
        let formats = ExcelFormats::new();
        let styles = [
            CellStyle::Header,
            CellStyle::HeaderBlank,
            CellStyle::SectionTitle,
            CellStyle::AttributeLabel,
            CellStyle::AttributeValue,
            CellStyle::Bordered,
            CellStyle::BodyText,
            CellStyle::BodyMark,
        ];
        for style in styles {
            assert_ne!(formats.get(Some(style)), &formats.plain);
        }
    }
}
