//! `fmeda import` command - Replace the workspace with a project CSV

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{confirm, print_structured, Session};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::codec::import_csv;

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// CSV file to import
    pub file: PathBuf,

    /// Replace existing data without asking
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    if !session.store.is_empty()
        && !confirm(
            "Importing replaces everything in this workspace. Continue?",
            args.yes,
        )?
    {
        println!("Aborted.");
        return Ok(());
    }

    let bytes = std::fs::read(&args.file).into_diagnostic()?;
    let summary = import_csv(&mut session.store, &bytes)?;
    session.save()?;

    match global.format {
        f @ (OutputFormat::Yaml | OutputFormat::Json) => return print_structured(&summary, f),
        OutputFormat::Id => {
            println!("{}", summary.project);
            return Ok(());
        }
        _ => {}
    }
    if global.quiet {
        return Ok(());
    }

    println!(
        "{} Imported project {} ({}) from {}",
        style("✓").green(),
        style(summary.project).cyan(),
        style(&summary.project_name).yellow(),
        style(args.file.display()).cyan()
    );
    println!(
        "   {} safety function(s), {} component(s), {} failure mode(s)",
        summary.safety_functions, summary.components, summary.failure_modes
    );
    if summary.generated_ids > 0 {
        println!(
            "{} Generated {} missing external id(s)",
            style("!").yellow(),
            summary.generated_ids
        );
    }
    if summary.skipped_rows > 0 {
        println!(
            "{} Skipped {} unreadable row(s)",
            style("!").yellow(),
            summary.skipped_rows
        );
    }
    if summary.dropped_failure_modes > 0 {
        println!(
            "{} Dropped {} failure mode(s) with an unknown component",
            style("!").yellow(),
            summary.dropped_failure_modes
        );
    }
    if summary.dropped_links > 0 {
        println!(
            "{} Dropped {} link(s) to unknown safety functions",
            style("!").yellow(),
            summary.dropped_links
        );
    }
    Ok(())
}
