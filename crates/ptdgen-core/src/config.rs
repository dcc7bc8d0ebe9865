//! Configuration types
//!
//! Every field carries a documented default, so a partial (or absent)
//! configuration document is always valid.

use serde::{Deserialize, Serialize};

/// Codes and templates used when deriving short event names
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventNameMapping {
    /// Code for visits whose group mentions "screen"
    pub screening: String,
    /// Code for visits whose group mentions "random"
    pub random: String,
    /// Code for visits whose group mentions "rtsm"
    pub rtsm: String,
    /// Template for numbered site visits; `{number}` is substituted
    pub visit_pattern: String,
    /// Template for numbered phone visits; `{number}` is substituted
    pub phone_pattern: String,
}

impl Default for EventNameMapping {
    fn default() -> Self {
        Self {
            screening: "SCRN".into(),
            random: "RAND".into(),
            rtsm: "RTSM".into(),
            visit_pattern: "V{number}".into(),
            phone_pattern: "P{number}".into(),
        }
    }
}

/// Schedule grid layout settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub event_name_mapping: EventNameMapping,
    /// Identity columns at the left edge of the grid
    pub left_columns: Vec<String>,
    /// Trailing header-only columns after the visit columns
    pub extra_headers: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            event_name_mapping: EventNameMapping::default(),
            left_columns: vec!["Form Label".into(), "Form Name".into(), "Source".into()],
            extra_headers: vec![
                "Common Forms".into(),
                "N/A".into(),
                "Is Form Dynamic?".into(),
                "Form Dynamic Criteria".into(),
                "Additional Programming Instructions".into(),
            ],
        }
    }
}

/// Template grafting settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraftConfig {
    pub schedule_sheet_name: String,
    pub forms_sheet_name: String,
    /// Header rows restyled after a fast copy of the schedule sheet
    pub schedule_header_rows: u32,
    /// Header rows restyled after a fast copy of the forms sheet
    pub forms_header_rows: u32,
    /// Header rows bolded and bordered by the forms post-formatting pass
    pub format_header_rows: u32,
}

impl Default for GraftConfig {
    fn default() -> Self {
        Self {
            schedule_sheet_name: "Schedule Grid".into(),
            forms_sheet_name: "Study Specific Forms".into(),
            schedule_header_rows: 5,
            forms_header_rows: 3,
            format_header_rows: 3,
        }
    }
}

/// Complete configuration document
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PtdConfig {
    pub layout: LayoutConfig,
    pub graft: GraftConfig,
}
