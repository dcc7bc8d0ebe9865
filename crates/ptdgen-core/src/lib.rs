//! # ptdgen-core
//!
//! Core domain model and traits for the ptdgen Protocol Tracking Document generator.
//!
//! This crate provides:
//! - Domain types: `CellValue`, `Visit`, `FormRecord`, `Grid`
//! - Event-name derivation for visits (`SCRN`, `RAND`, `V2`, `P3`, ...)
//! - Configuration types with documented defaults
//! - Core traits: `Renderer`, `DiagnosticEmitter`
//! - Error types
//!
//! ## Example
//!
//! ```rust
//! use ptdgen_core::{derive_event_name, EventNameMapping, Visit};
//!
//! let mapping = EventNameMapping::default();
//! let visits = vec![
//!     Visit::new("Screening", "V1"),
//!     Visit::new("Treatment", "V2"),
//! ];
//! let names: Vec<String> = visits
//!     .iter()
//!     .enumerate()
//!     .map(|(idx, v)| derive_event_name(&v.event_group, &v.visit_name, idx, &mapping))
//!     .collect();
//! assert_eq!(names, vec!["SCRN", "V2"]);
//! ```

pub mod config;
pub mod event;
pub mod grid;

pub use config::{EventNameMapping, GraftConfig, LayoutConfig, PtdConfig};
pub use event::{derive_event_name, event_label, randomisation_index};
pub use grid::{CellRef, CellStyle, Grid, GridCell, MergeRange};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

// ============================================================================
// Cell Values
// ============================================================================

/// A single scalar held by a table field or a grid cell.
///
/// Integral numbers are always stored as `Integer` so they display without a
/// trailing `.0`; missing and NaN values collapse to `Empty`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Integer(i64),
    Number(f64),
}

impl CellValue {
    /// Normalize a float: NaN becomes `Empty`, integral values become `Integer`.
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            Self::Empty
        } else if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
            Self::Integer(value as i64)
        } else {
            Self::Number(value)
        }
    }

    /// Interpret raw text from a CSV field or spreadsheet cell.
    ///
    /// Blank text and the literal `nan`/`NaN` are treated as missing.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "nan" || trimmed == "NaN" {
            return Self::Empty;
        }
        if let Ok(n) = trimmed.parse::<i64>() {
            return Self::Integer(n);
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => Self::from_f64(f),
            _ => Self::Text(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            Self::Integer(_) | Self::Number(_) => false,
        }
    }

    /// Length of the displayed text, in characters
    pub fn display_len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Text(s) => s.chars().count(),
            other => other.to_string().chars().count(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

// ============================================================================
// Visits
// ============================================================================

/// One planned visit (event) from the schedule of activities.
///
/// Visit order is significant: it fixes the grid's column order and the
/// "previous event" lookups of the triggering rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    /// Event group label ("Screening", "Treatment", "End of Study", ...)
    pub event_group: String,
    /// Free-text visit label
    pub visit_name: String,
    pub offset_type: CellValue,
    pub offset_days: CellValue,
    pub day_range_early: CellValue,
    pub day_range_late: CellValue,
}

impl Visit {
    pub fn new(event_group: impl Into<String>, visit_name: impl Into<String>) -> Self {
        Self {
            event_group: event_group.into(),
            visit_name: visit_name.into(),
            offset_type: CellValue::Empty,
            offset_days: CellValue::Empty,
            day_range_early: CellValue::Empty,
            day_range_late: CellValue::Empty,
        }
    }

    /// Set the offset type ("Previous Event", "Specific Event", "None")
    pub fn offset_type(mut self, value: impl Into<CellValue>) -> Self {
        self.offset_type = value.into();
        self
    }

    /// Set the planned offset in days
    pub fn offset_days(mut self, value: impl Into<CellValue>) -> Self {
        self.offset_days = value.into();
        self
    }

    /// Set the early and late visit-window bounds
    pub fn day_range(mut self, early: impl Into<CellValue>, late: impl Into<CellValue>) -> Self {
        self.day_range_early = early.into();
        self.day_range_late = late.into();
        self
    }
}

// ============================================================================
// Forms
// ============================================================================

/// One row of the forms-applicability table, keyed by column name.
///
/// Lookups of absent columns yield `CellValue::Empty`; a missing optional
/// field is never an error.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FormRecord {
    fields: HashMap<String, CellValue>,
}

impl FormRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Value of `column`, or `Empty` when absent
    pub fn value(&self, column: &str) -> CellValue {
        self.fields.get(column).cloned().unwrap_or_default()
    }

    /// First non-empty value among `aliases`, in order
    pub fn first_present(&self, aliases: &[&str]) -> CellValue {
        aliases
            .iter()
            .filter_map(|alias| self.fields.get(*alias))
            .find(|value| !value.is_empty())
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Severity of a diagnostic
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A message reported by a pipeline stage
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }
}

/// Logging collaborator injected into the layout and grafting stages.
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: Diagnostic);
}

/// Collects diagnostics in memory (tests, batch summaries)
#[derive(Debug, Default)]
pub struct CollectingEmitter {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
}

impl DiagnosticEmitter for CollectingEmitter {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Forwards diagnostics to the process-wide `tracing` subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEmitter;

impl DiagnosticEmitter for TracingEmitter {
    fn emit(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Debug => tracing::debug!("{}", diagnostic.message),
            Severity::Info => tracing::info!("{}", diagnostic.message),
            Severity::Warning => tracing::warn!("{}", diagnostic.message),
            Severity::Error => tracing::error!("{}", diagnostic.message),
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output rendering
pub trait Renderer {
    type Output;

    /// Render a grid to the output format
    fn render(&self, grid: &Grid) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Grid construction error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Merge range {0} overlaps an existing merge")]
    MergeOverlap(String),

    #[error("Merge range {0} must span more than one cell")]
    SingleCellMerge(String),

    #[error("Merge range {0} is inverted")]
    InvertedRange(String),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_floats_become_integers() {
        assert_eq!(CellValue::from_f64(3.0), CellValue::Integer(3));
        assert_eq!(CellValue::from_f64(-7.0), CellValue::Integer(-7));
        assert_eq!(CellValue::from_f64(2.5), CellValue::Number(2.5));
        assert_eq!(CellValue::from_f64(3.0).to_string(), "3");
    }

    #[test]
    fn nan_is_empty_never_text() {
        let v = CellValue::from_f64(f64::NAN);
        assert_eq!(v, CellValue::Empty);
        assert_eq!(v.to_string(), "");
        assert_eq!(CellValue::parse("nan"), CellValue::Empty);
        assert_eq!(CellValue::parse("NaN"), CellValue::Empty);
    }

    #[test]
    fn parse_classifies_text_and_numbers() {
        assert_eq!(CellValue::parse("X"), CellValue::Text("X".into()));
        assert_eq!(CellValue::parse("14"), CellValue::Integer(14));
        assert_eq!(CellValue::parse("14.0"), CellValue::Integer(14));
        assert_eq!(CellValue::parse("-3"), CellValue::Integer(-3));
        assert_eq!(CellValue::parse("1.5"), CellValue::Number(1.5));
        assert_eq!(CellValue::parse("   "), CellValue::Empty);
        assert_eq!(CellValue::parse("inf"), CellValue::Text("inf".into()));
    }

    #[test]
    fn display_len_counts_characters() {
        assert_eq!(CellValue::Empty.display_len(), 0);
        assert_eq!(CellValue::from("Randomisation").display_len(), 13);
        assert_eq!(CellValue::Integer(-120).display_len(), 4);
    }

    #[test]
    fn form_record_lookups() {
        let record = FormRecord::new()
            .with("Form Label", "Demographics")
            .with("IsDynamic", "Y")
            .with("Is Form Dynamic", "");

        assert_eq!(record.value("Form Label"), CellValue::from("Demographics"));
        assert_eq!(record.value("Source"), CellValue::Empty);
        assert_eq!(
            record.first_present(&["Is Form Dynamic?", "Is Form Dynamic", "IsDynamic"]),
            CellValue::from("Y")
        );
        assert!(record.contains("Is Form Dynamic"));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn visit_builder() {
        let visit = Visit::new("Treatment", "Visit 3")
            .offset_type("Previous Event")
            .offset_days(14_i64)
            .day_range(-3_i64, 3_i64);
        assert_eq!(visit.offset_days, CellValue::Integer(14));
        assert_eq!(visit.day_range_early, CellValue::Integer(-3));
        assert_eq!(visit.day_range_late, CellValue::Integer(3));
    }

    #[test]
    fn collecting_emitter_filters_warnings() {
        let mut emitter = CollectingEmitter::new();
        emitter.emit(Diagnostic::info("started"));
        emitter.emit(Diagnostic::warning("merge skipped"));
        assert_eq!(emitter.diagnostics.len(), 2);
        assert_eq!(emitter.warnings().count(), 1);
    }

    #[test]
    fn layout_error_display() {
        let err = LayoutError::MergeOverlap("A1:B1".into());
        assert!(err.to_string().contains("A1:B1"));
    }
}
