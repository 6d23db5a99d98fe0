//! `fmeda sf` command - Safety function management

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::analysis::{format_percent, format_value, MetricResult};
use crate::cli::helpers::{
    escape_csv, or_dash, print_created, print_deleted, print_structured, print_updated,
    resolve_sf, truncate_str, Session,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::{NewSafetyFunction, SafetyFunctionPatch};

#[derive(Subcommand, Debug)]
pub enum SfCommands {
    /// Create a safety function
    New(NewArgs),

    /// List safety functions
    List(ListArgs),

    /// Show a safety function with its linked components and last metrics
    Show(ShowArgs),

    /// Change fields of a safety function
    Edit(EditArgs),

    /// Delete a safety function and unlink it from all components
    Delete(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// External id (e.g. SF-01)
    #[arg(long = "id")]
    pub sf_id: String,

    /// What the safety function does
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Target integrity level (e.g. "ASIL D")
    #[arg(long, short = 'l', default_value = "")]
    pub level: String,

    /// Project id or name (default: the live project)
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Project id or name (default: the live project)
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Safety function external id or internal id
    pub sf: String,

    /// Project id or name (default: the live project)
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Safety function external id or internal id
    pub sf: String,

    /// New external id
    #[arg(long = "id")]
    pub sf_id: Option<String>,

    /// New description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// New target integrity level
    #[arg(long, short = 'l')]
    pub level: Option<String>,

    /// Project id or name (default: the live project)
    #[arg(long)]
    pub project: Option<String>,
}

pub fn run(cmd: SfCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SfCommands::New(args) => run_new(args, global),
        SfCommands::List(args) => run_list(args, global),
        SfCommands::Show(args) => run_show(args, global),
        SfCommands::Edit(args) => run_edit(args, global),
        SfCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let project = session.project_id(args.project.as_deref())?;

    let sf = session
        .store
        .create_safety_function(NewSafetyFunction {
            project,
            sf_id: args.sf_id,
            description: args.description,
            target_integrity_level: args.level,
        })?
        .clone();
    session.save()?;

    if global.format == OutputFormat::Id {
        println!("{}", sf.id);
    } else {
        print_created(&sf, global.quiet);
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let project = session.project_id(args.project.as_deref())?;
    let store = &session.store;
    let sfs: Vec<_> = store.safety_functions(Some(project)).collect();

    let linked = |sf_id| store.components(Some(project)).filter(|c| c.is_related_to(sf_id)).count();

    match session.format(global, OutputFormat::Tsv) {
        f @ (OutputFormat::Yaml | OutputFormat::Json) => print_structured(&sfs, f)?,
        OutputFormat::Id => {
            for sf in &sfs {
                println!("{}", sf.sf_id);
            }
        }
        OutputFormat::Csv => {
            println!("id,sf_id,target_integrity_level,components,description");
            for sf in &sfs {
                println!(
                    "{},{},{},{},{}",
                    sf.id,
                    escape_csv(&sf.sf_id),
                    escape_csv(&sf.target_integrity_level),
                    linked(sf.id),
                    escape_csv(&sf.description)
                );
            }
        }
        OutputFormat::Md => {
            println!("| ID | SF | Level | Components | Description |");
            println!("|---|---|---|---|---|");
            for sf in &sfs {
                println!(
                    "| {} | {} | {} | {} | {} |",
                    sf.id,
                    sf.sf_id,
                    or_dash(&sf.target_integrity_level),
                    linked(sf.id),
                    sf.description
                );
            }
        }
        _ => {
            println!(
                "{:<6} {:<14} {:<10} {:<6} {}",
                style("ID").bold(),
                style("SF").bold(),
                style("LEVEL").bold(),
                style("CMPS").bold(),
                style("DESCRIPTION").bold()
            );
            println!("{}", "-".repeat(80));
            for sf in &sfs {
                println!(
                    "{:<6} {:<14} {:<10} {:<6} {}",
                    style(sf.id).cyan(),
                    truncate_str(&sf.sf_id, 12),
                    truncate_str(or_dash(&sf.target_integrity_level), 8),
                    linked(sf.id),
                    truncate_str(&sf.description, 40)
                );
            }
            if !global.quiet {
                println!();
                println!("{} safety function(s) found.", style(sfs.len()).cyan());
            }
        }
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let project = session.project_id(args.project.as_deref())?;
    let store = &session.store;
    let sf = store.safety_function(resolve_sf(store, project, &args.sf)?)?;

    match session.format(global, OutputFormat::Auto) {
        f @ (OutputFormat::Yaml | OutputFormat::Json) => print_structured(sf, f)?,
        OutputFormat::Id => println!("{}", sf.id),
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(sf.id).cyan());
            println!("{}: {}", style("SF").bold(), style(&sf.sf_id).yellow());
            println!(
                "{}: {}",
                style("Target Level").bold(),
                or_dash(&sf.target_integrity_level)
            );
            if !sf.description.is_empty() {
                println!("{}: {}", style("Description").bold(), sf.description);
            }
            println!("{}", style("─".repeat(60)).dim());

            let components: Vec<_> = store
                .components(Some(project))
                .filter(|c| c.is_related_to(sf.id))
                .collect();
            println!();
            println!("{}", style("Linked Components:").bold());
            if components.is_empty() {
                println!("  {}", style("none").dim());
            }
            for c in &components {
                println!(
                    "  • {} {} ({} FIT)",
                    style(&c.comp_id).cyan(),
                    or_dash(&c.component_type),
                    c.failure_rate
                );
            }

            let m = MetricResult::from_safety_function(sf);
            println!();
            print!("{}", style("Metrics").bold());
            if store.is_stale(sf) {
                print!(" {}", style("(stale, run 'fmeda calc')").yellow());
            }
            println!(":");
            println!("  {}: {}", style("SPFM").dim(), format_percent(m.spfm));
            println!("  {}: {}", style("LFM").dim(), format_percent(m.lfm));
            println!("  {}: {}", style("MPHF").dim(), format_value(m.mphf));
            println!("  {}: {}", style("RF").dim(), format_value(m.rf));
            println!("  {}: {}", style("MPFL").dim(), format_value(m.mpfl));
            println!("  {}: {}", style("MPFD").dim(), format_value(m.mpfd));
            println!(
                "  {}: {}",
                style("Safety-related λ").dim(),
                format_value(m.safetyrelated)
            );
        }
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let project = session.project_id(args.project.as_deref())?;
    let id = resolve_sf(&session.store, project, &args.sf)?;

    let sf = session
        .store
        .patch_safety_function(
            id,
            SafetyFunctionPatch {
                sf_id: args.sf_id,
                description: args.description,
                target_integrity_level: args.level,
            },
        )?
        .clone();
    session.save()?;

    print_updated(&sf, global.quiet);
    Ok(())
}

fn run_delete(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let project = session.project_id(args.project.as_deref())?;
    let id = resolve_sf(&session.store, project, &args.sf)?;

    let sf = session.store.delete_safety_function(id)?;
    session.save()?;

    print_deleted(&sf, global.quiet);
    Ok(())
}
