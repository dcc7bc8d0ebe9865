//! Visit Dynamic Properties and Event Window Configuration rows
//!
//! Each attribute row holds one computed value per visit column.

use ptdgen_core::{CellValue, EventNameMapping, Visit};

/// An attribute row in one of the two metadata sections
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attribute {
    VisitDynamics,
    TriggeringEvent,
    TriggeringForm,
    TriggeringItem,
    AssignVisitWindow,
    OffsetType,
    OffsetDays,
    DayRangeEarly,
    DayRangeLate,
}

impl Attribute {
    /// Row label written across the identity columns
    pub fn label(self) -> &'static str {
        match self {
            Self::VisitDynamics => {
                "Visit Dynamics (If Y, then Event should appear based on triggering criteria)"
            }
            Self::TriggeringEvent => "Triggering: Event",
            Self::TriggeringForm => "Triggering: Form",
            Self::TriggeringItem => {
                "Triggering: Item = Response (if specific response expected, else leave to accept any entered result)"
            }
            Self::AssignVisitWindow => "Assign Visit Window",
            Self::OffsetType => "Offset Type (Previous Event, Specific Event, or None)",
            Self::OffsetDays => "Offset Days (Planned Visit Date, as calculated from Offset Event)",
            Self::DayRangeEarly => "Day Range - Early",
            Self::DayRangeLate => "Day Range - Late",
        }
    }
}

/// A titled block of attribute rows
#[derive(Clone, Copy, Debug)]
pub struct Section {
    pub title: &'static str,
    pub attributes: &'static [Attribute],
}

/// The two metadata sections, in grid order
pub const SECTIONS: [Section; 2] = [
    Section {
        title: "Visit Dynamic Properties",
        attributes: &[
            Attribute::VisitDynamics,
            Attribute::TriggeringEvent,
            Attribute::TriggeringForm,
            Attribute::TriggeringItem,
        ],
    },
    Section {
        title: "Event Window Configuration",
        attributes: &[
            Attribute::AssignVisitWindow,
            Attribute::OffsetType,
            Attribute::OffsetDays,
            Attribute::DayRangeEarly,
            Attribute::DayRangeLate,
        ],
    },
];

/// Per-grid facts the attribute rules read
pub struct VisitContext<'a> {
    pub visits: &'a [Visit],
    pub event_names: &'a [String],
    pub randomisation_index: usize,
    pub mapping: &'a EventNameMapping,
}

impl VisitContext<'_> {
    fn is_randomisation_visit(&self, j: usize) -> bool {
        self.event_names[j] == self.mapping.random
    }

    /// Value of `attribute` for the visit column at position `j`
    pub fn attribute_value(&self, attribute: Attribute, j: usize) -> CellValue {
        let visit = &self.visits[j];
        let code = self.event_names[j].as_str();

        match attribute {
            Attribute::VisitDynamics => {
                let group = visit.event_group.to_lowercase();
                let closing = group.contains("end of treatment") || group.contains("end of study");
                if j >= self.randomisation_index && !closing {
                    CellValue::from("Y")
                } else {
                    CellValue::Empty
                }
            }
            Attribute::TriggeringEvent => {
                if self.is_randomisation_visit(j) {
                    CellValue::from(self.mapping.screening.as_str())
                } else if code.starts_with('V') && j > 0 {
                    CellValue::from(self.event_names[j - 1].as_str())
                } else if code.eq_ignore_ascii_case("follow-up") {
                    CellValue::from("EOT")
                } else {
                    CellValue::Empty
                }
            }
            Attribute::TriggeringForm => {
                if self.is_randomisation_visit(j) {
                    CellValue::from("ELIGIBILITY_CRITERIA")
                } else if j > self.randomisation_index && visit.visit_name.contains('V') {
                    CellValue::from("RANDOMISATION")
                } else {
                    CellValue::Empty
                }
            }
            Attribute::TriggeringItem => CellValue::Empty,
            Attribute::AssignVisitWindow => CellValue::from("Y"),
            Attribute::OffsetType => visit.offset_type.clone(),
            Attribute::OffsetDays => visit.offset_days.clone(),
            Attribute::DayRangeEarly => visit.day_range_early.clone(),
            Attribute::DayRangeLate => visit.day_range_late.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptdgen_core::derive_event_name;

    fn names(visits: &[Visit], mapping: &EventNameMapping) -> Vec<String> {
        visits
            .iter()
            .enumerate()
            .map(|(i, v)| derive_event_name(&v.event_group, &v.visit_name, i, mapping))
            .collect()
    }

    fn row(ctx: &VisitContext<'_>, attribute: Attribute) -> Vec<String> {
        (0..ctx.visits.len())
            .map(|j| ctx.attribute_value(attribute, j).to_string())
            .collect()
    }

    #[test]
    fn section_shape() {
        assert_eq!(SECTIONS[0].attributes.len(), 4);
        assert_eq!(SECTIONS[1].attributes.len(), 5);
        assert_eq!(Attribute::DayRangeLate.label(), "Day Range - Late");
    }

    #[test]
    fn triggering_rules() {
        let mapping = EventNameMapping::default();
        let visits = vec![
            Visit::new("Screening", "V1"),
            Visit::new("Randomisation", "V2"),
            Visit::new("Treatment", "V3"),
            Visit::new("Treatment", "Day 29"),
            Visit::new("End of Study", "Visit 5"),
        ];
        let event_names = names(&visits, &mapping);
        assert_eq!(event_names, vec!["SCRN", "RAND", "V3", "V4", "V5"]);

        let ctx = VisitContext {
            visits: &visits,
            event_names: &event_names,
            randomisation_index: 1,
            mapping: &mapping,
        };

        assert_eq!(row(&ctx, Attribute::VisitDynamics), vec!["", "Y", "Y", "Y", ""]);
        assert_eq!(row(&ctx, Attribute::TriggeringEvent), vec!["", "SCRN", "RAND", "V3", "V4"]);
        assert_eq!(
            row(&ctx, Attribute::TriggeringForm),
            vec!["", "ELIGIBILITY_CRITERIA", "RANDOMISATION", "", "RANDOMISATION"]
        );
        assert_eq!(row(&ctx, Attribute::TriggeringItem), vec!["", "", "", "", ""]);
        assert_eq!(row(&ctx, Attribute::AssignVisitWindow), vec!["Y"; 5]);
    }

    #[test]
    fn no_randomisation_visit_gates_from_first_column() {
        let mapping = EventNameMapping::default();
        let visits = vec![
            Visit::new("Treatment", "V1"),
            Visit::new("End of Treatment", "V2"),
        ];
        let event_names = names(&visits, &mapping);
        let ctx = VisitContext {
            visits: &visits,
            event_names: &event_names,
            randomisation_index: 0,
            mapping: &mapping,
        };
        assert_eq!(row(&ctx, Attribute::VisitDynamics), vec!["Y", ""]);
        assert_eq!(row(&ctx, Attribute::TriggeringEvent), vec!["", "V1"]);
        assert_eq!(row(&ctx, Attribute::TriggeringForm), vec!["", "RANDOMISATION"]);
    }

    #[test]
    fn window_fields_copied_verbatim() {
        let mapping = EventNameMapping::default();
        let visits = vec![Visit::new("Treatment", "V2")
            .offset_type("Previous Event")
            .offset_days(14.0)
            .day_range(-3_i64, f64::NAN)];
        let event_names = names(&visits, &mapping);
        let ctx = VisitContext {
            visits: &visits,
            event_names: &event_names,
            randomisation_index: 0,
            mapping: &mapping,
        };
        assert_eq!(ctx.attribute_value(Attribute::OffsetType, 0), CellValue::from("Previous Event"));
        assert_eq!(ctx.attribute_value(Attribute::OffsetDays, 0), CellValue::Integer(14));
        assert_eq!(ctx.attribute_value(Attribute::DayRangeEarly, 0), CellValue::Integer(-3));
        assert_eq!(ctx.attribute_value(Attribute::DayRangeLate, 0).to_string(), "");
    }
}
