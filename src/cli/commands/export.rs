//! `fmeda export` command - Write the project as CSV

use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{write_output, Session};
use crate::cli::GlobalOpts;
use crate::codec::{export_csv, ExportOptions};

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Project id or name (default: the live project)
    #[arg(long)]
    pub project: Option<String>,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Leave out the safety-function metric columns (no recalculation)
    #[arg(long)]
    pub no_metrics: bool,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let project = session.project_id(args.project.as_deref())?;

    let options = ExportOptions {
        include_metrics: !args.no_metrics && session.config.export_metrics(),
    };
    let csv = export_csv(&mut session.store, project, &options)?;
    if options.include_metrics {
        // Recalculated metrics are kept
        session.save()?;
    }

    tracing::debug!(%project, include_metrics = options.include_metrics, bytes = csv.len(), "exported");
    // stdout output must stay pure CSV
    let quiet = global.quiet || args.output.is_none();
    write_output(&csv, args.output, quiet)?;
    Ok(())
}
