//! Project to CSV

use serde::{Deserialize, Serialize};

use crate::codec::columns::{self, escape_field, Section};
use crate::codec::CsvError;
use crate::core::{ProjectId, Store};

/// Options for [`export_csv`] and [`encode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Write the seven safety-function metric columns
    pub include_metrics: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_metrics: true,
        }
    }
}

/// Recalculate (when metrics are included) and encode a project
pub fn export_csv(
    store: &mut Store,
    project: ProjectId,
    options: &ExportOptions,
) -> Result<String, CsvError> {
    if options.include_metrics {
        store.calculate(project)?;
    }
    encode(store, project, options)
}

/// Encode a project using whatever metrics are currently stored
pub fn encode(
    store: &Store,
    project: ProjectId,
    options: &ExportOptions,
) -> Result<String, CsvError> {
    let p = store.project(project)?;
    let mut out = RowWriter::new(columns::header(options.include_metrics));

    out.row(
        Section::Project,
        vec![
            (columns::NAME, p.name.clone()),
            (columns::LIFETIME, p.lifetime.to_string()),
        ],
    );

    for sf in store.safety_functions(Some(project)) {
        let mut cells = vec![
            (columns::ID, sf.sf_id.clone()),
            (columns::DESCRIPTION, sf.description.clone()),
            (
                columns::TARGET_INTEGRITY_LEVEL,
                sf.target_integrity_level.clone(),
            ),
        ];
        if options.include_metrics {
            let m = sf.metrics();
            let values = [m.rf, m.mpfl, m.mpfd, m.mphf, m.spfm, m.lfm, m.safetyrelated];
            cells.extend(
                columns::METRIC_COLUMNS
                    .iter()
                    .zip(values)
                    .map(|(&col, value)| (col, value.to_string())),
            );
        }
        out.row(Section::SafetyFunction, cells);
    }

    for c in store.components(Some(project)) {
        let related: Vec<&str> = store
            .safety_functions(Some(project))
            .filter(|sf| c.is_related_to(sf.id))
            .map(|sf| sf.sf_id.as_str())
            .collect();
        out.row(
            Section::Component,
            vec![
                (columns::ID, c.comp_id.clone()),
                (columns::TYPE, c.component_type.clone()),
                (columns::FAILURE_RATE, c.failure_rate.to_string()),
                (columns::RELATED_SF_IDS, related.join(",")),
                (columns::IS_SAFETY_RELATED, c.is_safety_related.to_string()),
            ],
        );
    }

    for c in store.components(Some(project)) {
        for fm in store.failure_modes_of(c.id) {
            out.row(
                Section::FailureMode,
                vec![
                    (columns::COMPONENT_ID, c.comp_id.clone()),
                    (columns::DESCRIPTION, fm.description.clone()),
                    (columns::FAILURE_RATE_TOTAL, fm.failure_rate_total.to_string()),
                    (columns::SYSTEM_LEVEL_EFFECT, fm.system_level_effect.clone()),
                    (columns::IS_SPF, fm.is_spf.to_string()),
                    (columns::SPF_SAFETY_MECHANISM, fm.spf_safety_mechanism.clone()),
                    (
                        columns::SPF_DIAGNOSTIC_COVERAGE,
                        fm.spf_diagnostic_coverage.to_string(),
                    ),
                    (columns::IS_MPF, fm.is_mpf.to_string()),
                    (columns::MPF_SAFETY_MECHANISM, fm.mpf_safety_mechanism.clone()),
                    (
                        columns::MPF_DIAGNOSTIC_COVERAGE,
                        fm.mpf_diagnostic_coverage.to_string(),
                    ),
                ],
            );
        }
    }

    tracing::debug!(%project, rows = out.rows, "encoded project CSV");
    Ok(out.finish())
}

/// Accumulates rows laid out against a fixed header
struct RowWriter {
    columns: Vec<&'static str>,
    buf: String,
    rows: usize,
}

impl RowWriter {
    fn new(columns: Vec<&'static str>) -> Self {
        let mut buf = columns.join(",");
        buf.push('\n');
        Self {
            columns,
            buf,
            rows: 0,
        }
    }

    /// Write one row; columns not named in `cells` are left empty
    fn row(&mut self, section: Section, cells: Vec<(&'static str, String)>) {
        let line: Vec<String> = self
            .columns
            .iter()
            .map(|&col| {
                if col == columns::SECTION {
                    return section.as_str().to_string();
                }
                cells
                    .iter()
                    .find(|(name, _)| *name == col)
                    .map(|(_, value)| escape_field(value))
                    .unwrap_or_default()
            })
            .collect();
        self.buf.push_str(&line.join(","));
        self.buf.push('\n');
        self.rows += 1;
    }

    fn finish(self) -> String {
        self.buf
    }
}
