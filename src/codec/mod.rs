//! Project CSV codec
//!
//! A whole project is flattened into one table. Every row carries a
//! `section` tag (`project`, `sf`, `component` or `fm`) and leaves the
//! columns of other sections empty. Cross references use external ids
//! only, so an exported file can be re-imported into an empty store.

pub mod columns;
pub mod decode;
pub mod encode;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::StoreError;

pub use decode::{import_csv, ImportSummary};
pub use encode::{encode, export_csv, ExportOptions};

/// Errors raised while encoding or decoding project CSV
#[derive(Debug, Error, Diagnostic)]
pub enum CsvError {
    #[error("CSV contains no project row")]
    #[diagnostic(
        code(fmeda::csv::missing_project),
        help("add a row with section 'project' carrying the name and lifetime")
    )]
    MissingProject,

    #[error("CSV header has no 'section' column")]
    #[diagnostic(code(fmeda::csv::missing_section))]
    MissingSectionColumn,

    #[error("failed to read CSV: {0}")]
    #[diagnostic(code(fmeda::csv::read))]
    Read(#[from] csv::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}
