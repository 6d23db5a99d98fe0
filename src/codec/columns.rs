//! Column layout of the project CSV format

use csv::StringRecord;
use std::collections::HashMap;

pub const SECTION: &str = "section";

// Project
pub const NAME: &str = "name";
pub const LIFETIME: &str = "lifetime";

// Safety function (`id` and `description` are shared with other sections)
pub const ID: &str = "id";
pub const DESCRIPTION: &str = "description";
pub const TARGET_INTEGRITY_LEVEL: &str = "target_integrity_level";

/// Metric columns, only written when metrics are exported
pub const METRIC_COLUMNS: [&str; 7] = ["RF", "MPFL", "MPFD", "MPHF", "SPFM", "LFM", "safetyrelated"];

// Component
pub const TYPE: &str = "type";
pub const FAILURE_RATE: &str = "failure_rate";
pub const RELATED_SF_IDS: &str = "related_sf_ids";
pub const IS_SAFETY_RELATED: &str = "is_safety_related";

// Failure mode
pub const COMPONENT_ID: &str = "component_id";
pub const FAILURE_RATE_TOTAL: &str = "Failure_rate_total";
pub const SYSTEM_LEVEL_EFFECT: &str = "system_level_effect";
pub const IS_SPF: &str = "is_SPF";
pub const SPF_SAFETY_MECHANISM: &str = "SPF_safety_mechanism";
pub const SPF_DIAGNOSTIC_COVERAGE: &str = "SPF_diagnostic_coverage";
pub const IS_MPF: &str = "is_MPF";
pub const MPF_SAFETY_MECHANISM: &str = "MPF_safety_mechanism";
pub const MPF_DIAGNOSTIC_COVERAGE: &str = "MPF_diagnostic_coverage";

/// Alternative headers accepted for the external id on import
pub const SF_ID_ALIAS: &str = "sf_id";
pub const COMP_ID_ALIAS: &str = "comp_id";

/// The section tag of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Project,
    SafetyFunction,
    Component,
    FailureMode,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Project => "project",
            Section::SafetyFunction => "sf",
            Section::Component => "component",
            Section::FailureMode => "fm",
        }
    }

    /// Parse a section tag; unknown tags yield `None`
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "project" => Some(Section::Project),
            "sf" => Some(Section::SafetyFunction),
            "component" => Some(Section::Component),
            "fm" => Some(Section::FailureMode),
            _ => None,
        }
    }
}

/// Full header in output order
pub fn header(include_metrics: bool) -> Vec<&'static str> {
    let mut columns = vec![SECTION, NAME, LIFETIME, ID, DESCRIPTION, TARGET_INTEGRITY_LEVEL];
    if include_metrics {
        columns.extend(METRIC_COLUMNS);
    }
    columns.extend([
        TYPE,
        FAILURE_RATE,
        RELATED_SF_IDS,
        IS_SAFETY_RELATED,
        COMPONENT_ID,
        FAILURE_RATE_TOTAL,
        SYSTEM_LEVEL_EFFECT,
        IS_SPF,
        SPF_SAFETY_MECHANISM,
        SPF_DIAGNOSTIC_COVERAGE,
        IS_MPF,
        MPF_SAFETY_MECHANISM,
        MPF_DIAGNOSTIC_COVERAGE,
    ]);
    columns
}

/// Quote a field if it contains a comma, quote or line break
pub fn escape_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Build a map from lower-cased header name to column index
pub fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_lowercase(), i))
        .collect()
}

/// Get a trimmed, non-empty field by column name (case-insensitive)
pub fn get_field(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    column: &str,
) -> Option<String> {
    header_map
        .get(&column.to_lowercase())
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("simple"), "simple");
        assert_eq!(escape_field("SF1,SF2"), "\"SF1,SF2\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
        assert_eq!(escape_field("bare\rreturn"), "\"bare\rreturn\"");
    }

    #[test]
    fn test_header_with_and_without_metrics() {
        let full = header(true);
        let lean = header(false);
        assert_eq!(full.len(), 26);
        assert_eq!(lean.len(), 19);
        assert_eq!(full[6], "RF");
        assert_eq!(lean[6], "type");
        assert_eq!(full.last(), Some(&MPF_DIAGNOSTIC_COVERAGE));
    }

    #[test]
    fn test_section_parse() {
        assert_eq!(Section::parse(" SF "), Some(Section::SafetyFunction));
        assert_eq!(Section::parse("fm"), Some(Section::FailureMode));
        assert_eq!(Section::parse("notes"), None);
    }

    #[test]
    fn test_get_field_is_case_insensitive() {
        let headers = StringRecord::from(vec!["Section", "FAILURE_RATE_TOTAL"]);
        let map = build_header_map(&headers);
        let record = StringRecord::from(vec!["fm", " 12 "]);
        assert_eq!(
            get_field(&record, &map, FAILURE_RATE_TOTAL).as_deref(),
            Some("12")
        );
        assert_eq!(get_field(&record, &map, IS_SPF), None);
    }
}
