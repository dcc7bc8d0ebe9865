//! # ptdgen-layout
//!
//! Schedule grid layout builder.
//!
//! Turns an ordered visit list and a forms-applicability table into a single
//! `Grid` worksheet:
//! - Three header rows (event group bands, long event labels, short codes)
//! - Visit Dynamic Properties and Event Window Configuration sections
//! - A fixed RTSM row followed by one row per form
//!
//! ## Example
//!
//! ```rust
//! use ptdgen_core::{FormRecord, LayoutConfig, Visit};
//! use ptdgen_layout::build_grid;
//!
//! let visits = vec![Visit::new("Screening", "V1"), Visit::new("Treatment", "V2")];
//! let forms = vec![FormRecord::new().with("Form Label", "Vitals").with("V2", "X")];
//! let grid = build_grid(&visits, &forms, &LayoutConfig::default()).unwrap();
//! assert_eq!(grid.name, "Final PTD");
//! ```

pub mod sections;

use ptdgen_core::{
    derive_event_name, event_label, randomisation_index, CellRef, CellStyle, CellValue,
    Diagnostic, DiagnosticEmitter, FormRecord, Grid, LayoutConfig, LayoutError, TracingEmitter,
    Visit,
};
use sections::{VisitContext, SECTIONS};

/// Name of the generated grid worksheet
pub const GRID_SHEET_NAME: &str = "Final PTD";

/// Number of header rows at the top of the grid
pub const HEADER_ROWS: u32 = 3;

const MIN_COLUMN_WIDTH: f64 = 10.0;
const COLUMN_MARGIN: f64 = 2.0;

/// Values written positionally into the identity columns of the RTSM row
const RTSM_ROW_IDENTITY: [&str; 3] = ["RTSM", "RTSM", "Library"];

/// Field-name aliases tried, in order, for an extra header column.
/// Headers without an alias set are left blank on form rows.
fn extra_header_aliases(header: &str) -> &'static [&'static str] {
    match header {
        "Is Form Dynamic?" => &["Is Form Dynamic?", "Is Form Dynamic", "IsDynamic"],
        "Form Dynamic Criteria" => &["Form Dynamic Criteria"],
        _ => &[],
    }
}

/// A maximal run of adjacent visits sharing one event group
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupBand {
    /// Zero-based position of the first visit in the run
    pub start: usize,
    /// Number of visits in the run
    pub span: usize,
    pub group: String,
}

/// Run-length group the ordered event-group labels.
///
/// The bands partition `0..groups.len()` exactly, in order.
pub fn group_bands<S: AsRef<str>>(groups: &[S]) -> Vec<GroupBand> {
    let mut bands: Vec<GroupBand> = Vec::new();
    for (idx, group) in groups.iter().enumerate() {
        let group = group.as_ref();
        match bands.last_mut() {
            Some(band) if band.group == group => band.span += 1,
            _ => bands.push(GroupBand {
                start: idx,
                span: 1,
                group: group.to_string(),
            }),
        }
    }
    bands
}

/// Column positions of the grid, all zero-based
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnPlan {
    pub left_columns: u16,
    /// The "Event Group: / Event Label: / Event Name:" column
    pub event_column: u16,
    pub rtsm_column: u16,
    pub first_visit_column: u16,
    pub visit_columns: u16,
    pub first_extra_column: u16,
    pub extra_columns: u16,
}

impl ColumnPlan {
    pub fn new(left_columns: usize, visits: usize, extras: usize) -> Self {
        let left_columns = left_columns as u16;
        let visit_columns = visits as u16;
        let event_column = left_columns;
        let rtsm_column = event_column + 1;
        let first_visit_column = rtsm_column + 1;
        Self {
            left_columns,
            event_column,
            rtsm_column,
            first_visit_column,
            visit_columns,
            first_extra_column: first_visit_column + visit_columns,
            extra_columns: extras as u16,
        }
    }

    pub fn visit_column(&self, j: usize) -> u16 {
        self.first_visit_column + j as u16
    }

    pub fn extra_column(&self, idx: usize) -> u16 {
        self.first_extra_column + idx as u16
    }
}

/// Builds the schedule grid for one configuration
pub struct GridBuilder<'a> {
    config: &'a LayoutConfig,
}

impl<'a> GridBuilder<'a> {
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self { config }
    }

    /// Short event-name codes for `visits`, in order
    pub fn event_names(&self, visits: &[Visit]) -> Vec<String> {
        visits
            .iter()
            .enumerate()
            .map(|(idx, v)| {
                derive_event_name(&v.event_group, &v.visit_name, idx, &self.config.event_name_mapping)
            })
            .collect()
    }

    pub fn build(
        &self,
        visits: &[Visit],
        forms: &[FormRecord],
        emitter: &mut dyn DiagnosticEmitter,
    ) -> Result<Grid, LayoutError> {
        emitter.emit(Diagnostic::info(format!(
            "Building schedule grid: {} visits, {} forms",
            visits.len(),
            forms.len()
        )));

        let event_names = self.event_names(visits);
        let rand_idx = randomisation_index(visits.iter().map(|v| v.event_group.as_str()));
        let plan = ColumnPlan::new(
            self.config.left_columns.len(),
            visits.len(),
            self.config.extra_headers.len(),
        );
        tracing::debug!(?plan, rand_idx, "Column plan");

        let mut grid = Grid::new(GRID_SHEET_NAME);
        self.write_headers(&mut grid, &plan, visits, &event_names)?;

        let ctx = VisitContext {
            visits,
            event_names: &event_names,
            randomisation_index: rand_idx,
            mapping: &self.config.event_name_mapping,
        };
        let forms_start_row = self.write_sections(&mut grid, &plan, &ctx)?;
        self.write_forms(&mut grid, &plan, forms_start_row, visits, &event_names, forms);

        grid.auto_fit_columns(MIN_COLUMN_WIDTH, COLUMN_MARGIN);
        grid.freeze_panes(CellRef::new(forms_start_row, plan.rtsm_column));

        emitter.emit(Diagnostic::info(format!(
            "Schedule grid complete: {} rows x {} columns",
            grid.row_count(),
            grid.column_count()
        )));
        Ok(grid)
    }

    fn write_headers(
        &self,
        grid: &mut Grid,
        plan: &ColumnPlan,
        visits: &[Visit],
        event_names: &[String],
    ) -> Result<(), LayoutError> {
        let header = Some(CellStyle::Header);

        for (col, label) in self.config.left_columns.iter().enumerate() {
            let col = col as u16;
            grid.set(CellRef::new(0, col), CellValue::Empty, header);
            grid.set(CellRef::new(1, col), label.as_str(), header);
            grid.set(CellRef::new(2, col), CellValue::Empty, header);
        }

        for (row, label) in ["Event Group:", "Event Label:", "Event Name:"].iter().enumerate() {
            grid.set(CellRef::new(row as u32, plan.event_column), *label, header);
        }
        for row in 0..HEADER_ROWS {
            grid.set(CellRef::new(row, plan.rtsm_column), "RTSM", header);
        }

        let mapping = &self.config.event_name_mapping;
        for (j, code) in event_names.iter().enumerate() {
            let col = plan.visit_column(j);
            let label = event_label(code, mapping).map_or(CellValue::Empty, CellValue::from);
            grid.set(CellRef::new(1, col), label, header);
            grid.set(CellRef::new(2, col), code.as_str(), header);
        }

        let groups: Vec<&str> = visits.iter().map(|v| v.event_group.as_str()).collect();
        for band in group_bands(&groups) {
            let first = CellRef::new(0, plan.visit_column(band.start));
            let last = CellRef::new(0, plan.visit_column(band.start + band.span - 1));
            if band.span > 1 {
                grid.merge(first, last, band.group, header)?;
            } else {
                grid.set(first, band.group, header);
            }
        }

        for (idx, label) in self.config.extra_headers.iter().enumerate() {
            let col = plan.extra_column(idx);
            grid.set(CellRef::new(0, col), CellValue::Empty, Some(CellStyle::HeaderBlank));
            grid.set(CellRef::new(1, col), label.as_str(), header);
            grid.set(CellRef::new(2, col), CellValue::Empty, Some(CellStyle::HeaderBlank));
        }

        Ok(())
    }

    /// Write both metadata sections; returns the first forms row
    fn write_sections(
        &self,
        grid: &mut Grid,
        plan: &ColumnPlan,
        ctx: &VisitContext<'_>,
    ) -> Result<u32, LayoutError> {
        let mut row = HEADER_ROWS;

        for section in SECTIONS {
            span_left_columns(grid, plan, row, section.title, CellStyle::SectionTitle)?;
            row += 1;

            for &attribute in section.attributes {
                span_left_columns(grid, plan, row, attribute.label(), CellStyle::AttributeLabel)?;
                for j in 0..ctx.visits.len() {
                    grid.set(
                        CellRef::new(row, plan.visit_column(j)),
                        ctx.attribute_value(attribute, j),
                        Some(CellStyle::AttributeValue),
                    );
                }
                grid.set(
                    CellRef::new(row, plan.rtsm_column),
                    CellValue::Empty,
                    Some(CellStyle::Bordered),
                );
                row += 1;
            }
        }

        Ok(row)
    }

    fn write_forms(
        &self,
        grid: &mut Grid,
        plan: &ColumnPlan,
        start_row: u32,
        visits: &[Visit],
        event_names: &[String],
        forms: &[FormRecord],
    ) {
        let text = Some(CellStyle::BodyText);
        let mark = Some(CellStyle::BodyMark);

        for (col, value) in RTSM_ROW_IDENTITY.iter().take(plan.left_columns as usize).enumerate() {
            grid.set(CellRef::new(start_row, col as u16), *value, text);
        }
        grid.set(CellRef::new(start_row, plan.rtsm_column), "X", mark);
        for idx in 0..plan.extra_columns as usize {
            grid.set(CellRef::new(start_row, plan.extra_column(idx)), CellValue::Empty, mark);
        }

        for (offset, form) in forms.iter().enumerate() {
            let row = start_row + 1 + offset as u32;

            for (col, column) in self.config.left_columns.iter().enumerate() {
                grid.set(CellRef::new(row, col as u16), form.value(column), text);
            }
            grid.set(CellRef::new(row, plan.rtsm_column), CellValue::Empty, mark);

            for (j, visit) in visits.iter().enumerate() {
                grid.set(
                    CellRef::new(row, plan.visit_column(j)),
                    visit_mark(form, &visit.visit_name, &event_names[j]),
                    mark,
                );
            }

            for (idx, header) in self.config.extra_headers.iter().enumerate() {
                grid.set(
                    CellRef::new(row, plan.extra_column(idx)),
                    form.first_present(extra_header_aliases(header)),
                    mark,
                );
            }
        }
    }
}

/// Applicability mark for one visit: the label column wins when the record
/// has it, even if blank; otherwise the event-name column.
pub fn visit_mark(form: &FormRecord, visit_label: &str, event_name: &str) -> CellValue {
    if form.contains(visit_label) {
        form.value(visit_label)
    } else {
        form.value(event_name)
    }
}

/// Place `value` across the identity columns of `row`
fn span_left_columns(
    grid: &mut Grid,
    plan: &ColumnPlan,
    row: u32,
    value: &str,
    style: CellStyle,
) -> Result<(), LayoutError> {
    if plan.left_columns > 1 {
        grid.merge(
            CellRef::new(row, 0),
            CellRef::new(row, plan.left_columns - 1),
            value,
            Some(style),
        )
    } else {
        grid.set(CellRef::new(row, 0), value, Some(style));
        Ok(())
    }
}

/// Build the schedule grid, logging through `tracing`
pub fn build_grid(
    visits: &[Visit],
    forms: &[FormRecord],
    config: &LayoutConfig,
) -> Result<Grid, LayoutError> {
    GridBuilder::new(config).build(visits, forms, &mut TracingEmitter)
}
