//! CSV to project
//!
//! Import always replaces the whole store. The replacement is built in a
//! fresh [`Store`] and only swapped in once the file has been read, so a
//! structurally broken file leaves the current data untouched.

use csv::{ReaderBuilder, StringRecord};
use rand::distr::Alphanumeric;
use rand::rngs::ThreadRng;
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::codec::columns::{self, build_header_map, get_field, Section};
use crate::codec::CsvError;
use crate::core::lenient::{parse_bool, parse_f64_opt};
use crate::core::{ComponentId, ProjectId, SafetyFunctionId, Store};
use crate::entities::{NewComponent, NewFailureMode, NewSafetyFunction};

/// Name given to a project whose row has no name
pub const DEFAULT_PROJECT_NAME: &str = "Imported Project";

/// What an import created and what it had to leave out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub project: ProjectId,
    pub project_name: String,
    pub safety_functions: usize,
    pub components: usize,
    pub failure_modes: usize,
    /// Rows that failed to parse or carried an unknown section
    pub skipped_rows: usize,
    /// Failure-mode rows whose component id did not resolve
    pub dropped_failure_modes: usize,
    /// `related_sf_ids` entries that did not resolve
    pub dropped_links: usize,
    /// External ids generated for rows that had none
    pub generated_ids: usize,
}

/// One data row with its header lookup
struct Row<'a> {
    record: StringRecord,
    header_map: &'a HashMap<String, usize>,
}

impl Row<'_> {
    fn get(&self, column: &str) -> Option<String> {
        get_field(&self.record, self.header_map, column)
    }

    fn text(&self, column: &str) -> String {
        self.get(column).unwrap_or_default()
    }

    fn number(&self, column: &str) -> f64 {
        parse_f64_opt(self.get(column).as_deref())
    }

    fn flag(&self, column: &str) -> bool {
        self.get(column).is_some_and(|v| parse_bool(&v))
    }

    /// External id, from `id` or the per-section alias column
    fn external_id(&self, alias: &str) -> Option<String> {
        self.get(columns::ID).or_else(|| self.get(alias))
    }
}

/// Generates `PREFIX-XXXXX` ids that do not clash with any id in the file
struct SyntheticIds {
    rng: ThreadRng,
    taken: HashSet<String>,
}

impl SyntheticIds {
    fn new(taken: HashSet<String>) -> Self {
        Self {
            rng: rand::rng(),
            taken,
        }
    }

    fn generate(&mut self, prefix: &str) -> String {
        loop {
            let suffix: String = (&mut self.rng)
                .sample_iter(Alphanumeric)
                .take(5)
                .map(|b| char::from(b).to_ascii_uppercase())
                .collect();
            let id = format!("{prefix}-{suffix}");
            if self.taken.insert(id.clone()) {
                return id;
            }
        }
    }
}

/// Replace the contents of `store` with the project described by `input`
///
/// Fails without touching `store` if the file has no `section` column or no
/// project row. Row-level problems are dropped and counted in the summary.
pub fn import_csv(store: &mut Store, input: &[u8]) -> Result<ImportSummary, CsvError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = rdr.headers()?.clone();
    let header_map = build_header_map(&headers);
    if !header_map.contains_key(columns::SECTION) {
        return Err(CsvError::MissingSectionColumn);
    }

    let mut summary = ImportSummary::default();
    let mut project_rows = Vec::new();
    let mut sf_rows = Vec::new();
    let mut component_rows = Vec::new();
    let mut fm_rows = Vec::new();

    for (row_idx, result) in rdr.records().enumerate() {
        let row_num = row_idx + 2; // +2 for 1-indexed and header row
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(row = row_num, error = %e, "skipping unreadable CSV row");
                summary.skipped_rows += 1;
                continue;
            }
        };
        let row = Row {
            record,
            header_map: &header_map,
        };
        match row.get(columns::SECTION).as_deref().and_then(Section::parse) {
            Some(Section::Project) => project_rows.push(row),
            Some(Section::SafetyFunction) => sf_rows.push(row),
            Some(Section::Component) => component_rows.push(row),
            Some(Section::FailureMode) => fm_rows.push(row),
            None => {
                tracing::debug!(row = row_num, "skipping row with unknown section");
                summary.skipped_rows += 1;
            }
        }
    }

    let project_row = project_rows.first().ok_or(CsvError::MissingProject)?;

    let mut fresh = Store::new();
    let name = project_row
        .get(columns::NAME)
        .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string());
    let lifetime = project_row.number(columns::LIFETIME);
    let project = fresh.create_project(name, lifetime).id;

    let taken: HashSet<String> = sf_rows
        .iter()
        .filter_map(|r| r.external_id(columns::SF_ID_ALIAS))
        .chain(
            component_rows
                .iter()
                .filter_map(|r| r.external_id(columns::COMP_ID_ALIAS)),
        )
        .collect();
    let mut synthetic = SyntheticIds::new(taken);

    // Safety functions; a later duplicate id wins resolution
    let mut sf_map: HashMap<String, SafetyFunctionId> = HashMap::new();
    for row in &sf_rows {
        let sf_id = row
            .external_id(columns::SF_ID_ALIAS)
            .unwrap_or_else(|| {
                summary.generated_ids += 1;
                synthetic.generate("SF")
            });
        let id = fresh
            .create_safety_function(NewSafetyFunction {
                project,
                sf_id: sf_id.clone(),
                description: row.text(columns::DESCRIPTION),
                target_integrity_level: row.text(columns::TARGET_INTEGRITY_LEVEL),
            })?
            .id;
        sf_map.insert(sf_id, id);
        summary.safety_functions += 1;
    }

    let mut comp_map: HashMap<String, ComponentId> = HashMap::new();
    for row in &component_rows {
        let mut related_sfs = BTreeSet::new();
        for sf_id in row
            .text(columns::RELATED_SF_IDS)
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            match sf_map.get(sf_id) {
                Some(&id) => {
                    related_sfs.insert(id);
                }
                None => {
                    tracing::debug!(sf_id, "dropping unresolved safety function link");
                    summary.dropped_links += 1;
                }
            }
        }

        let comp_id = row
            .external_id(columns::COMP_ID_ALIAS)
            .unwrap_or_else(|| {
                summary.generated_ids += 1;
                synthetic.generate("COMP")
            });
        let is_safety_related = row.flag(columns::IS_SAFETY_RELATED) || !related_sfs.is_empty();
        let id = fresh
            .create_component(NewComponent {
                project,
                comp_id: comp_id.clone(),
                component_type: row.text(columns::TYPE),
                failure_rate: row.number(columns::FAILURE_RATE),
                is_safety_related,
                related_sfs,
            })?
            .id;
        comp_map.insert(comp_id, id);
        summary.components += 1;
    }

    for row in &fm_rows {
        let component_id = row.text(columns::COMPONENT_ID);
        let Some(&component) = comp_map.get(&component_id) else {
            tracing::warn!(component_id = %component_id, "dropping failure mode of unknown component");
            summary.dropped_failure_modes += 1;
            continue;
        };
        fresh.create_failure_mode(NewFailureMode {
            component,
            description: row.text(columns::DESCRIPTION),
            failure_rate_total: row.number(columns::FAILURE_RATE_TOTAL),
            system_level_effect: row.text(columns::SYSTEM_LEVEL_EFFECT),
            is_spf: row.flag(columns::IS_SPF),
            spf_safety_mechanism: row.text(columns::SPF_SAFETY_MECHANISM),
            spf_diagnostic_coverage: row.number(columns::SPF_DIAGNOSTIC_COVERAGE),
            is_mpf: row.flag(columns::IS_MPF),
            mpf_safety_mechanism: row.text(columns::MPF_SAFETY_MECHANISM),
            mpf_diagnostic_coverage: row.number(columns::MPF_DIAGNOSTIC_COVERAGE),
        })?;
        summary.failure_modes += 1;
    }

    fresh.calculate(project)?;

    summary.project = project;
    summary.project_name = fresh.project(project)?.name.clone();
    *store = fresh;

    tracing::info!(
        project = %summary.project_name,
        safety_functions = summary.safety_functions,
        components = summary.components,
        failure_modes = summary.failure_modes,
        "imported project"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{export_csv, ExportOptions};
    use crate::core::StoreError;
    use crate::entities::ComponentPatch;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= 1e-9 * expected.abs().max(1.0),
            "expected {expected}, got {actual}"
        );
    }

    const SAMPLE: &str = "\
section,name,lifetime,id,description,target_integrity_level,type,failure_rate,related_sf_ids,is_safety_related,component_id,Failure_rate_total,system_level_effect,is_SPF,SPF_safety_mechanism,SPF_diagnostic_coverage,is_MPF,MPF_safety_mechanism,MPF_diagnostic_coverage
project,Brake ECU,100000,,,,,,,,,,,,,,,,
sf,,,SF1,No unintended braking,ASIL D,,,,,,,,,,,,,
component,,,C1,,,MCU,1000,SF1,true,,,,,,,,,
fm,,,,stuck,,,,,,C1,600,loss of braking,true,watchdog,90,false,,0
fm,,,,drift,,,,,,C1,400,degraded,false,,0,true,self test,50
";

    #[test]
    fn test_import_builds_fresh_store_with_metrics() {
        let mut store = Store::new();
        let summary = import_csv(&mut store, SAMPLE.as_bytes()).unwrap();

        assert_eq!(summary.project_name, "Brake ECU");
        assert_eq!(summary.safety_functions, 1);
        assert_eq!(summary.components, 1);
        assert_eq!(summary.failure_modes, 2);
        assert_eq!(summary.skipped_rows, 0);

        let sf = store.safety_functions(None).next().unwrap();
        assert!(!store.is_stale(sf));
        assert_close(sf.metrics().spfm, 0.94);
        assert_close(sf.metrics().mphf, 6.4e-8);

        let fm = store.failure_modes(None).next().unwrap();
        assert_eq!(fm.system_level_effect, "loss of braking");
        assert_close(fm.rates().rf, 60.0);
    }

    #[test]
    fn test_import_replaces_previous_data() {
        let mut store = Store::new();
        store.create_project("Old", 1.0);
        import_csv(&mut store, SAMPLE.as_bytes()).unwrap();

        assert_eq!(store.projects().count(), 1);
        assert_eq!(store.current_project().unwrap().name, "Brake ECU");
        // Counters restarted
        assert_eq!(store.current_project().unwrap().id, ProjectId::new(1));
    }

    #[test]
    fn test_missing_project_row_leaves_store_intact() {
        let mut store = Store::new();
        let project = store.create_project("Keep me", 10.0).id;
        let before = store.to_dataset();

        let csv = "section,id,description\nsf,SF1,orphan\n";
        let err = import_csv(&mut store, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, CsvError::MissingProject));
        assert_eq!(store.to_dataset(), before);
        assert_eq!(store.project(project).unwrap().name, "Keep me");
    }

    #[test]
    fn test_missing_section_column_is_rejected() {
        let mut store = Store::new();
        let err = import_csv(&mut store, b"name,lifetime\nX,1\n").unwrap_err();
        assert!(matches!(err, CsvError::MissingSectionColumn));
    }

    #[test]
    fn test_unresolved_references_are_dropped() {
        let csv = "\
section,name,lifetime,id,related_sf_ids,component_id,Failure_rate_total
project,P,10,,,,
sf,,,SF1,,,
component,,,C1,\"SF1,SF9\",,
fm,,,,,C1,5
fm,,,,,C7,5
notes,,,,,,
";
        let mut store = Store::new();
        let summary = import_csv(&mut store, csv.as_bytes()).unwrap();

        assert_eq!(summary.failure_modes, 1);
        assert_eq!(summary.dropped_failure_modes, 1);
        assert_eq!(summary.dropped_links, 1);
        assert_eq!(summary.skipped_rows, 1);

        let c1 = store.components(None).next().unwrap();
        assert_eq!(c1.related_sfs.len(), 1);
        // Inferred from the resolved link
        assert!(c1.is_safety_related);
    }

    #[test]
    fn test_missing_ids_are_generated() {
        let csv = "\
section,name,lifetime,id,failure_rate
project,,,,
sf,,,,
sf,,,,
component,,,,12
";
        let mut store = Store::new();
        let summary = import_csv(&mut store, csv.as_bytes()).unwrap();
        assert_eq!(summary.generated_ids, 3);
        assert_eq!(summary.project_name, DEFAULT_PROJECT_NAME);
        assert_eq!(store.current_project().unwrap().lifetime, 0.0);

        let ids: Vec<&str> = store
            .safety_functions(None)
            .map(|sf| sf.sf_id.as_str())
            .collect();
        assert_ne!(ids[0], ids[1]);
        for id in &ids {
            assert!(id.starts_with("SF-"));
            assert_eq!(id.len(), 8);
            assert!(id[3..]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
        let comp = store.components(None).next().unwrap();
        assert!(comp.comp_id.starts_with("COMP-"));
        assert!(!comp.is_safety_related);
    }

    #[test]
    fn test_duplicate_ids_resolve_to_last() {
        let csv = "\
section,name,lifetime,id,related_sf_ids
project,P,1,,
sf,,,SF1,
sf,,,SF1,
component,,,C1,SF1
";
        let mut store = Store::new();
        import_csv(&mut store, csv.as_bytes()).unwrap();
        let last = store.safety_functions(None).last().unwrap().id;
        let c1 = store.components(None).next().unwrap();
        assert!(c1.is_related_to(last));
        assert_eq!(c1.related_sfs.len(), 1);
    }

    #[test]
    fn test_lenient_cells_and_case_insensitive_headers() {
        let csv = "\
SECTION,Name,LIFETIME,ID,Failure_Rate,COMPONENT_ID,failure_rate_total,IS_SPF,spf_diagnostic_coverage
project,P,lots,,,,,,
component,,,C1,n/a,,,,
fm,,,,,C1,100,1,80
fm,,,,,C1,100,YES,abc
";
        let mut store = Store::new();
        import_csv(&mut store, csv.as_bytes()).unwrap();
        assert_eq!(store.current_project().unwrap().lifetime, 0.0);
        assert_eq!(store.components(None).next().unwrap().failure_rate, 0.0);

        let rates: Vec<f64> = store.failure_modes(None).map(|fm| fm.rates().rf).collect();
        assert_close(rates[0], 20.0);
        // Malformed coverage reads as 0%, so the whole rate is residual
        assert_close(rates[1], 100.0);
    }

    #[test]
    fn test_export_import_roundtrip() {
        let mut source = Store::new();
        import_csv(&mut source, SAMPLE.as_bytes()).unwrap();
        let project = source.current_project().unwrap().id;

        // Give the component a second link and a quoted description
        let sf2 = source
            .create_safety_function(NewSafetyFunction {
                project,
                sf_id: "SF2".to_string(),
                description: "says \"stop\", twice".to_string(),
                target_integrity_level: "ASIL B".to_string(),
            })
            .unwrap()
            .id;
        let c1 = source.components(None).next().unwrap().id;
        let mut related = source.component(c1).unwrap().related_sfs.clone();
        related.insert(sf2);
        source
            .patch_component(
                c1,
                ComponentPatch {
                    related_sfs: Some(related),
                    ..Default::default()
                },
            )
            .unwrap();

        let csv = export_csv(&mut source, project, &ExportOptions::default()).unwrap();
        let mut restored = Store::new();
        let summary = import_csv(&mut restored, csv.as_bytes()).unwrap();
        // Every exported id resolved; none had to be invented
        assert_eq!(summary.generated_ids, 0);
        assert_eq!(summary.dropped_links, 0);

        let c = restored.find_component(project, "C1").unwrap();
        assert_eq!(c.failure_rate, 1000.0);
        let linked: BTreeSet<&str> = restored
            .safety_functions(None)
            .filter(|sf| c.is_related_to(sf.id))
            .map(|sf| sf.sf_id.as_str())
            .collect();
        assert_eq!(linked, BTreeSet::from(["SF1", "SF2"]));

        let sf2 = restored.find_safety_function(project, "SF2").unwrap();
        assert_eq!(sf2.description, "says \"stop\", twice");

        let before: Vec<_> = source.failure_modes(None).map(|fm| *fm.rates()).collect();
        let after: Vec<_> = restored.failure_modes(None).map(|fm| *fm.rates()).collect();
        assert_eq!(before, after);

        let metrics_before: Vec<_> = source
            .safety_functions(None)
            .map(|sf| sf.metrics().spfm)
            .collect();
        let metrics_after: Vec<_> = restored
            .safety_functions(None)
            .map(|sf| sf.metrics().spfm)
            .collect();
        assert_eq!(metrics_before, metrics_after);
    }

    #[test]
    fn test_blank_sf_id_never_reaches_export() {
        let mut source = Store::new();
        import_csv(&mut source, SAMPLE.as_bytes()).unwrap();
        let project = source.current_project().unwrap().id;

        let err = source
            .create_safety_function(NewSafetyFunction {
                project,
                sf_id: String::new(),
                description: "unnamed".to_string(),
                target_integrity_level: String::new(),
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::BlankExternalId { .. }));

        let csv = export_csv(&mut source, project, &ExportOptions::default()).unwrap();
        assert!(!csv.lines().any(|l| l.starts_with("sf,,,,")));

        let mut restored = Store::new();
        let summary = import_csv(&mut restored, csv.as_bytes()).unwrap();
        assert_eq!(summary.safety_functions, 1);
        assert_eq!(summary.generated_ids, 0);
        let c = restored.find_component(project, "C1").unwrap();
        let sf1 = restored.find_safety_function(project, "SF1").unwrap();
        assert!(c.is_related_to(sf1.id));
    }

    #[test]
    fn test_carriage_return_in_value_survives_roundtrip() {
        let mut source = Store::new();
        import_csv(&mut source, SAMPLE.as_bytes()).unwrap();
        let project = source.current_project().unwrap().id;
        source
            .create_safety_function(NewSafetyFunction {
                project,
                sf_id: "SF2".to_string(),
                description: "first\rsecond".to_string(),
                target_integrity_level: "QM".to_string(),
            })
            .unwrap();

        let csv = export_csv(&mut source, project, &ExportOptions::default()).unwrap();
        let mut restored = Store::new();
        let summary = import_csv(&mut restored, csv.as_bytes()).unwrap();

        assert_eq!(summary.skipped_rows, 0);
        assert_eq!(summary.safety_functions, 2);
        let sf2 = restored.find_safety_function(project, "SF2").unwrap();
        assert_eq!(sf2.description, "first\rsecond");
        assert_eq!(sf2.target_integrity_level, "QM");
    }
}
