//! Event-name derivation
//!
//! Each visit gets a short event-name code (`SCRN`, `RAND`, `RTSM`, `V4`,
//! `P2`, ...) and, from that code, a long event label for the grid header.
//! Derivation is total: every (group, label, position) triple yields a code.

use crate::config::EventNameMapping;
use regex::Regex;
use std::sync::OnceLock;

/// Visit-number patterns, tried in order; the first match wins.
fn visit_number_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"\bV\s*?(\d+)\b").expect("valid visit pattern"),
            Regex::new(r"\bVisit\s*?(\d+)\b").expect("valid visit pattern"),
            Regex::new(r"\bP(\d+)\b").expect("valid phone pattern"),
        ]
    })
}

/// Derive the short event-name code for the visit at position `idx`.
///
/// Priority: group mentions "screen", then "random", then "rtsm"
/// (case-insensitive); otherwise a visit number found in the label; otherwise
/// `V{idx + 1}`.
pub fn derive_event_name(group: &str, label: &str, idx: usize, mapping: &EventNameMapping) -> String {
    let group = group.trim().to_lowercase();

    if group.contains("screen") {
        return mapping.screening.clone();
    }
    if group.contains("random") {
        return mapping.random.clone();
    }
    if group.contains("rtsm") {
        return mapping.rtsm.clone();
    }

    let label = label.trim();
    for pattern in visit_number_patterns() {
        if let Some(caps) = pattern.captures(label) {
            let matched = caps.get(0).map_or("", |m| m.as_str());
            let number = caps.get(1).map_or("", |m| m.as_str());
            let template = if matched.contains('P') {
                &mapping.phone_pattern
            } else {
                &mapping.visit_pattern
            };
            return template.replace("{number}", number);
        }
    }

    format!("V{}", idx + 1)
}

/// Long label shown in header row 2 for an event-name code.
///
/// Returns `None` for codes with no defined long form (e.g. the RTSM code).
pub fn event_label(code: &str, mapping: &EventNameMapping) -> Option<String> {
    if code == mapping.screening {
        return Some("Screening".into());
    }
    if code == mapping.random {
        return Some("Randomisation".into());
    }
    if let Some(number) = code.strip_prefix('V') {
        return Some(format!("Visit {number}"));
    }
    if let Some(number) = code.strip_prefix('P') {
        return Some(format!("Phone Visit {number}"));
    }
    None
}

/// Position of the first group mentioning "random" (case-insensitive), or 0.
pub fn randomisation_index<'a, I>(groups: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    groups
        .into_iter()
        .position(|g| g.to_lowercase().contains("random"))
        .unwrap_or(0)
}
