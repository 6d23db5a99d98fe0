//! `fmeda report` command - Markdown FMEDA report

use chrono::Utc;
use miette::Result;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::analysis::{format_percent, format_value, MetricRating, MetricResult};
use crate::cli::helpers::{or_dash, truncate_str, write_output, Session};
use crate::cli::GlobalOpts;
use crate::core::{ProjectId, Store};

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// Project id or name (default: the live project)
    #[arg(long)]
    pub project: Option<String>,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: ReportArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let project = session.project_id(args.project.as_deref())?;

    let results = session.store.calculate(project)?;
    session.save()?;

    let output = render(&session.store, project, &results)?;
    write_output(&output, args.output, global.quiet)?;
    Ok(())
}

fn render(store: &Store, project: ProjectId, results: &[MetricResult]) -> Result<String> {
    let p = store.project(project)?;
    let components: Vec<_> = store.components(Some(project)).collect();
    let safety_related = components.iter().filter(|c| c.is_safety_related).count();
    let failure_modes = store.failure_modes(Some(project)).count();

    let mut output = String::new();
    output.push_str(&format!("# FMEDA Report: {}\n\n", p.name));
    output.push_str(&format!("- **Lifetime:** {} h\n", p.lifetime));
    output.push_str(&format!(
        "- **Generated:** {}\n",
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    ));
    output.push_str(&format!("- **Safety Functions:** {}\n", results.len()));
    output.push_str(&format!(
        "- **Components:** {} ({} safety related)\n",
        components.len(),
        safety_related
    ));
    output.push_str(&format!("- **Failure Modes:** {}\n", failure_modes));

    output.push_str("\n## Safety Function Metrics\n\n");
    if results.is_empty() {
        output.push_str("_No safety functions defined._\n");
    } else {
        let mut builder = Builder::default();
        builder.push_record([
            "SF", "Level", "SPFM", "Rating", "LFM", "Rating", "MPHF", "λ SR (FIT)",
        ]);
        for r in results {
            let level = store
                .safety_function(r.safety_function)
                .map(|sf| or_dash(&sf.target_integrity_level).to_string())
                .unwrap_or_default();
            builder.push_record([
                r.sf_id.clone(),
                level,
                format_percent(r.spfm),
                MetricRating::for_percent(r.spfm).to_string(),
                format_percent(r.lfm),
                MetricRating::for_percent(r.lfm).to_string(),
                format_value(r.mphf),
                format_value(r.safetyrelated),
            ]);
        }
        output.push_str(&builder.build().with(Style::markdown()).to_string());
        output.push('\n');
    }

    output.push_str("\n## Failure Modes\n\n");
    if failure_modes == 0 {
        output.push_str("_No failure modes defined._\n");
    } else {
        let mut builder = Builder::default();
        builder.push_record([
            "Component", "Failure Mode", "λ (FIT)", "SPF", "SPF DC", "MPF", "MPF DC", "RF",
            "MPFL", "MPFD",
        ]);
        for c in &components {
            for fm in store.failure_modes_of(c.id) {
                let rates = fm.rates();
                builder.push_record([
                    c.comp_id.clone(),
                    truncate_str(or_dash(&fm.description), 30),
                    fm.failure_rate_total.to_string(),
                    yes_no(fm.is_spf).to_string(),
                    format!("{}%", fm.spf_diagnostic_coverage),
                    yes_no(fm.is_mpf).to_string(),
                    format!("{}%", fm.mpf_diagnostic_coverage),
                    format_value(rates.rf),
                    format_value(rates.mpfl),
                    format_value(rates.mpfd),
                ]);
            }
        }
        output.push_str(&builder.build().with(Style::markdown()).to_string());
        output.push('\n');
    }

    Ok(output)
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
