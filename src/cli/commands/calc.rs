//! `fmeda calc` command - Recalculate every safety function of a project

use console::style;
use miette::Result;

use crate::analysis::StoredResult;
use crate::cli::commands::results::print_results;
use crate::cli::helpers::Session;
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct CalcArgs {
    /// Project id or name (default: the live project)
    #[arg(long)]
    pub project: Option<String>,
}

pub fn run(args: CalcArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let project = session.project_id(args.project.as_deref())?;

    let results = session.store.calculate(project)?;
    session.save()?;

    let rows: Vec<StoredResult> = results
        .into_iter()
        .map(|result| StoredResult {
            result,
            stale: false,
        })
        .collect();

    let format = session.format(global, OutputFormat::Tsv);
    print_results(&rows, format, global.quiet)?;

    if !global.quiet && matches!(format, OutputFormat::Tsv) {
        println!();
        println!(
            "{} Calculated {} safety function(s)",
            style("✓").green(),
            style(rows.len()).cyan()
        );
    }
    Ok(())
}
