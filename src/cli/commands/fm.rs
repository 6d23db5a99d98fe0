//! `fmeda fm` command - Failure mode management

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::analysis::format_value;
use crate::cli::helpers::{
    escape_csv, or_dash, print_created, print_deleted, print_structured, print_updated,
    resolve_cmp, resolve_fm, truncate_str, Session,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::lenient::{parse_bool, parse_f64};
use crate::core::Store;
use crate::entities::{FailureMode, FailureModePatch, NewFailureMode};

#[derive(Subcommand, Debug)]
pub enum FmCommands {
    /// Create a failure mode on a component
    New(NewArgs),

    /// List failure modes
    List(ListArgs),

    /// Show a failure mode with its derived rates
    Show(RefArgs),

    /// Change fields of a failure mode
    Edit(EditArgs),

    /// Delete a failure mode
    Delete(RefArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Owning component (external or internal id)
    #[arg(long, short = 'c')]
    pub component: String,

    /// Failure mode description
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Failure rate of this mode in FIT
    #[arg(long, short = 'r', default_value = "0")]
    pub rate: String,

    /// Effect at system level
    #[arg(long, default_value = "")]
    pub effect: String,

    /// Single point failure
    #[arg(long)]
    pub spf: bool,

    /// Safety mechanism covering the single point fault
    #[arg(long, default_value = "")]
    pub spf_mechanism: String,

    /// Diagnostic coverage of the SPF mechanism, percent
    #[arg(long, default_value = "0")]
    pub spf_dc: String,

    /// Multiple point failure
    #[arg(long)]
    pub mpf: bool,

    /// Safety mechanism covering the latent fault
    #[arg(long, default_value = "")]
    pub mpf_mechanism: String,

    /// Diagnostic coverage of the MPF mechanism, percent
    #[arg(long, default_value = "0")]
    pub mpf_dc: String,

    /// Project id or name used to resolve the component (default: the live project)
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only failure modes of this component
    #[arg(long, short = 'c')]
    pub component: Option<String>,

    /// Project id or name (default: the live project)
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RefArgs {
    /// Failure mode internal id
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Failure mode internal id
    pub id: String,

    /// Move to another component of the same project
    #[arg(long, short = 'c')]
    pub component: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Failure rate in FIT
    #[arg(long, short = 'r')]
    pub rate: Option<String>,

    #[arg(long)]
    pub effect: Option<String>,

    /// Single point failure flag (true/false)
    #[arg(long)]
    pub spf: Option<String>,

    #[arg(long)]
    pub spf_mechanism: Option<String>,

    #[arg(long)]
    pub spf_dc: Option<String>,

    /// Multiple point failure flag (true/false)
    #[arg(long)]
    pub mpf: Option<String>,

    #[arg(long)]
    pub mpf_mechanism: Option<String>,

    #[arg(long)]
    pub mpf_dc: Option<String>,

    /// Project id or name used to resolve `--component`
    #[arg(long)]
    pub project: Option<String>,
}

pub fn run(cmd: FmCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        FmCommands::New(args) => run_new(args, global),
        FmCommands::List(args) => run_list(args, global),
        FmCommands::Show(args) => run_show(args, global),
        FmCommands::Edit(args) => run_edit(args, global),
        FmCommands::Delete(args) => run_delete(args, global),
    }
}

fn flags(is_spf: bool, is_mpf: bool) -> &'static str {
    match (is_spf, is_mpf) {
        (true, true) => "SPF+MPF",
        (true, false) => "SPF",
        (false, true) => "MPF",
        (false, false) => "-",
    }
}

/// External id of the owning component
fn comp_id(store: &Store, fm: &FailureMode) -> String {
    store
        .component(fm.component)
        .map(|c| c.comp_id.clone())
        .unwrap_or_default()
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let project = session.project_id(args.project.as_deref())?;
    let component = resolve_cmp(&session.store, project, &args.component)?;

    let fm = session
        .store
        .create_failure_mode(NewFailureMode {
            component,
            description: args.description,
            failure_rate_total: parse_f64(&args.rate),
            system_level_effect: args.effect,
            is_spf: args.spf,
            spf_safety_mechanism: args.spf_mechanism,
            spf_diagnostic_coverage: parse_f64(&args.spf_dc),
            is_mpf: args.mpf,
            mpf_safety_mechanism: args.mpf_mechanism,
            mpf_diagnostic_coverage: parse_f64(&args.mpf_dc),
        })?
        .clone();
    session.save()?;

    if global.format == OutputFormat::Id {
        println!("{}", fm.id);
    } else {
        print_created(&fm, global.quiet);
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let project = session.project_id(args.project.as_deref())?;
    let store = &session.store;

    let fms: Vec<_> = match &args.component {
        Some(r) => store
            .failure_modes_of(resolve_cmp(store, project, r)?)
            .collect(),
        None => store.failure_modes(Some(project)).collect(),
    };

    match session.format(global, OutputFormat::Tsv) {
        f @ (OutputFormat::Yaml | OutputFormat::Json) => print_structured(&fms, f)?,
        OutputFormat::Id => {
            for fm in &fms {
                println!("{}", fm.id);
            }
        }
        OutputFormat::Csv => {
            println!("id,component,description,failure_rate_total,is_SPF,SPF_diagnostic_coverage,is_MPF,MPF_diagnostic_coverage,RF,MPFL,MPFD");
            for fm in &fms {
                let r = fm.rates();
                println!(
                    "{},{},{},{},{},{},{},{},{},{},{}",
                    fm.id,
                    escape_csv(&comp_id(store, fm)),
                    escape_csv(&fm.description),
                    fm.failure_rate_total,
                    fm.is_spf,
                    fm.spf_diagnostic_coverage,
                    fm.is_mpf,
                    fm.mpf_diagnostic_coverage,
                    r.rf,
                    r.mpfl,
                    r.mpfd
                );
            }
        }
        OutputFormat::Md => {
            println!("| ID | Component | Description | λ (FIT) | Type | SPF DC | MPF DC |");
            println!("|---|---|---|---|---|---|---|");
            for fm in &fms {
                println!(
                    "| {} | {} | {} | {} | {} | {}% | {}% |",
                    fm.id,
                    comp_id(store, fm),
                    or_dash(&fm.description),
                    fm.failure_rate_total,
                    flags(fm.is_spf, fm.is_mpf),
                    fm.spf_diagnostic_coverage,
                    fm.mpf_diagnostic_coverage
                );
            }
        }
        _ => {
            println!(
                "{:<6} {:<12} {:<26} {:<10} {:<8} {:<8} {}",
                style("ID").bold(),
                style("COMPONENT").bold(),
                style("DESCRIPTION").bold(),
                style("FIT").bold(),
                style("TYPE").bold(),
                style("SPF DC").bold(),
                style("MPF DC").bold()
            );
            println!("{}", "-".repeat(80));
            for fm in &fms {
                println!(
                    "{:<6} {:<12} {:<26} {:<10} {:<8} {:<8} {}",
                    style(fm.id).cyan(),
                    truncate_str(&comp_id(store, fm), 10),
                    truncate_str(or_dash(&fm.description), 24),
                    fm.failure_rate_total,
                    flags(fm.is_spf, fm.is_mpf),
                    format!("{}%", fm.spf_diagnostic_coverage),
                    format!("{}%", fm.mpf_diagnostic_coverage)
                );
            }
            if !global.quiet {
                println!();
                println!("{} failure mode(s) found.", style(fms.len()).cyan());
            }
        }
    }
    Ok(())
}

fn run_show(args: RefArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let store = &session.store;
    let fm = store.failure_mode(resolve_fm(store, &args.id)?)?;

    match session.format(global, OutputFormat::Auto) {
        f @ (OutputFormat::Yaml | OutputFormat::Json) => print_structured(fm, f)?,
        OutputFormat::Id => println!("{}", fm.id),
        _ => {
            let component = store.component(fm.component)?;
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(fm.id).cyan());
            println!(
                "{}: {}",
                style("Component").bold(),
                style(&component.comp_id).yellow()
            );
            println!("{}: {}", style("Description").bold(), or_dash(&fm.description));
            println!("{}: {} FIT", style("Failure Rate").bold(), fm.failure_rate_total);
            println!(
                "{}: {}",
                style("System Effect").bold(),
                or_dash(&fm.system_level_effect)
            );
            println!("{}", style("─".repeat(60)).dim());
            if fm.is_spf {
                println!(
                    "{}: {} ({}% DC)",
                    style("SPF Mechanism").bold(),
                    or_dash(&fm.spf_safety_mechanism),
                    fm.spf_diagnostic_coverage
                );
            }
            if fm.is_mpf {
                println!(
                    "{}: {} ({}% DC)",
                    style("MPF Mechanism").bold(),
                    or_dash(&fm.mpf_safety_mechanism),
                    fm.mpf_diagnostic_coverage
                );
            }
            if !fm.is_spf && !fm.is_mpf {
                println!("{}", style("Neither SPF nor MPF").dim());
            }

            let rates = fm.rates();
            println!();
            println!("{}", style("Derived Rates:").bold());
            println!("  {}: {}", style("RF").dim(), format_value(rates.rf));
            println!("  {}: {}", style("MPFL").dim(), format_value(rates.mpfl));
            println!("  {}: {}", style("MPFD").dim(), format_value(rates.mpfd));
        }
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = resolve_fm(&session.store, &args.id)?;

    let component = match &args.component {
        Some(r) => {
            let project = match args.project.as_deref() {
                Some(p) => session.project_id(Some(p))?,
                None => session
                    .store
                    .component(session.store.failure_mode(id)?.component)?
                    .project,
            };
            Some(resolve_cmp(&session.store, project, r)?)
        }
        None => None,
    };

    let patch = FailureModePatch {
        component,
        description: args.description,
        failure_rate_total: args.rate.as_deref().map(parse_f64),
        system_level_effect: args.effect,
        is_spf: args.spf.as_deref().map(parse_bool),
        spf_safety_mechanism: args.spf_mechanism,
        spf_diagnostic_coverage: args.spf_dc.as_deref().map(parse_f64),
        is_mpf: args.mpf.as_deref().map(parse_bool),
        mpf_safety_mechanism: args.mpf_mechanism,
        mpf_diagnostic_coverage: args.mpf_dc.as_deref().map(parse_f64),
    };
    let fm = session.store.patch_failure_mode(id, patch)?.clone();
    session.save()?;

    print_updated(&fm, global.quiet);
    Ok(())
}

fn run_delete(args: RefArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = resolve_fm(&session.store, &args.id)?;

    let fm = session.store.delete_failure_mode(id)?;
    session.save()?;

    print_deleted(&fm, global.quiet);
    Ok(())
}
