//! `fmeda results` command - Show the last calculated metrics

use console::style;
use miette::Result;
use tabled::{builder::Builder, settings::Style};

use crate::analysis::{format_percent, format_value, MetricRating, StoredResult};
use crate::cli::helpers::{escape_csv, print_structured, Session};
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct ResultsArgs {
    /// Project id or name (default: the live project)
    #[arg(long)]
    pub project: Option<String>,
}

pub fn run(args: ResultsArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let project = session.project_id(args.project.as_deref())?;
    let rows = session.store.stored_results(project)?;

    let format = session.format(global, OutputFormat::Tsv);
    print_results(&rows, format, global.quiet)?;

    if !global.quiet && matches!(format, OutputFormat::Tsv) && rows.iter().any(|r| r.stale) {
        println!();
        println!(
            "{} Some results predate the latest change. Run {} to refresh them.",
            style("!").yellow(),
            style("fmeda calc").yellow()
        );
    }
    Ok(())
}

/// Print metric rows in the requested format
pub(crate) fn print_results(rows: &[StoredResult], format: OutputFormat, quiet: bool) -> Result<()> {
    match format {
        f @ (OutputFormat::Yaml | OutputFormat::Json) => print_structured(rows, f)?,
        OutputFormat::Id => {
            for row in rows {
                println!("{}", row.result.sf_id);
            }
        }
        OutputFormat::Csv => {
            println!("sf_id,spfm,lfm,mphf,rf,mpfl,mpfd,safetyrelated,stale");
            for row in rows {
                let r = &row.result;
                println!(
                    "{},{},{},{},{},{},{},{},{}",
                    escape_csv(&r.sf_id),
                    r.spfm,
                    r.lfm,
                    r.mphf,
                    r.rf,
                    r.mpfl,
                    r.mpfd,
                    r.safetyrelated,
                    row.stale
                );
            }
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(["SF", "SPFM", "LFM", "MPHF", "RF", "MPFL", "MPFD", "λ SR"]);
            for row in rows {
                let r = &row.result;
                builder.push_record([
                    r.sf_id.clone(),
                    format_percent(r.spfm),
                    format_percent(r.lfm),
                    format_value(r.mphf),
                    format_value(r.rf),
                    format_value(r.mpfl),
                    format_value(r.mpfd),
                    format_value(r.safetyrelated),
                ]);
            }
            println!("{}", builder.build().with(Style::markdown()));
        }
        _ => {
            println!(
                "{:<14} {:<20} {:<20} {:<12} {}",
                style("SF").bold(),
                style("SPFM").bold(),
                style("LFM").bold(),
                style("MPHF").bold(),
                style("λ SR").bold()
            );
            println!("{}", "-".repeat(80));
            for row in rows {
                let r = &row.result;
                let spfm = format!(
                    "{} ({})",
                    format_percent(r.spfm),
                    MetricRating::for_percent(r.spfm)
                );
                let lfm = format!(
                    "{} ({})",
                    format_percent(r.lfm),
                    MetricRating::for_percent(r.lfm)
                );
                print!(
                    "{:<14} {:<20} {:<20} {:<12} {}",
                    style(&r.sf_id).cyan(),
                    spfm,
                    lfm,
                    format_value(r.mphf),
                    format_value(r.safetyrelated)
                );
                if row.stale {
                    print!(" {}", style("stale").yellow());
                }
                println!();
            }
            if rows.is_empty() && !quiet {
                println!("{}", style("No safety functions in this project.").dim());
            }
        }
    }
    Ok(())
}
