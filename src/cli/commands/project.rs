//! `fmeda project` command - Project management

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{confirm, print_deleted, print_structured, print_updated, Session};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::lenient;
use crate::entities::ProjectPatch;

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a project, replacing everything in the workspace
    New(NewArgs),

    /// Show the project and entity counts
    Show(ShowArgs),

    /// List projects
    List,

    /// Change the project name or lifetime
    Edit(EditArgs),

    /// Delete the project and everything it owns
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Operating lifetime in hours (default from config, else 100000)
    #[arg(long, short = 'l')]
    pub lifetime: Option<String>,

    /// Replace existing data without asking
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Project id or name (default: the live project)
    pub project: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Project id or name (default: the live project)
    pub project: Option<String>,

    /// New name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// New lifetime in hours
    #[arg(long, short = 'l')]
    pub lifetime: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Project id or name (default: the live project)
    pub project: Option<String>,

    /// Delete without asking
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: ProjectCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProjectCommands::New(args) => run_new(args, global),
        ProjectCommands::Show(args) => run_show(args, global),
        ProjectCommands::List => run_list(global),
        ProjectCommands::Edit(args) => run_edit(args, global),
        ProjectCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    if let Some(existing) = session.store.current_project() {
        let prompt = format!(
            "Replace project '{}' and all of its data?",
            existing.name
        );
        if !confirm(&prompt, args.yes)? {
            println!("Aborted.");
            return Ok(());
        }
    }

    let lifetime = args
        .lifetime
        .as_deref()
        .map(lenient::parse_f64)
        .unwrap_or_else(|| session.config.lifetime());

    let project = session.store.create_project(args.name, lifetime).clone();
    session.save()?;

    if global.format == OutputFormat::Id {
        println!("{}", project.id);
    } else if !global.quiet {
        println!(
            "{} Created project {} ({})",
            style("✓").green(),
            style(project.id).cyan(),
            style(&project.name).yellow()
        );
        println!("   Lifetime: {} h", project.lifetime);
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let id = session.project_id(args.project.as_deref())?;
    let store = &session.store;
    let project = store.project(id)?;

    match session.format(global, OutputFormat::Auto) {
        f @ (OutputFormat::Yaml | OutputFormat::Json) => print_structured(project, f)?,
        OutputFormat::Id => println!("{}", project.id),
        _ => {
            let sfs = store.safety_functions(Some(id)).count();
            let components = store.components(Some(id)).count();
            let safety_related = store
                .components(Some(id))
                .filter(|c| c.is_safety_related)
                .count();
            let fms = store.failure_modes(Some(id)).count();

            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(project.id).cyan());
            println!("{}: {}", style("Name").bold(), style(&project.name).yellow());
            println!("{}: {} h", style("Lifetime").bold(), project.lifetime);
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("Safety Functions").bold(), sfs);
            println!(
                "{}: {} ({} safety related)",
                style("Components").bold(),
                components,
                safety_related
            );
            println!("{}: {}", style("Failure Modes").bold(), fms);
            println!();
            println!(
                "{} {}  {} {}",
                style("Created:").dim(),
                project.created.format("%Y-%m-%d %H:%M"),
                style("Updated:").dim(),
                project.updated.format("%Y-%m-%d %H:%M")
            );
        }
    }
    Ok(())
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let projects: Vec<_> = session.store.projects().collect();

    match session.format(global, OutputFormat::Tsv) {
        f @ (OutputFormat::Yaml | OutputFormat::Json) => print_structured(&projects, f)?,
        OutputFormat::Id => {
            for p in &projects {
                println!("{}", p.id);
            }
        }
        OutputFormat::Csv => {
            println!("id,name,lifetime");
            for p in &projects {
                println!(
                    "{},{},{}",
                    p.id,
                    crate::cli::helpers::escape_csv(&p.name),
                    p.lifetime
                );
            }
        }
        OutputFormat::Md => {
            println!("| ID | Name | Lifetime (h) |");
            println!("|---|---|---|");
            for p in &projects {
                println!("| {} | {} | {} |", p.id, p.name, p.lifetime);
            }
        }
        _ => {
            println!(
                "{:<6} {:<30} {}",
                style("ID").bold(),
                style("NAME").bold(),
                style("LIFETIME").bold()
            );
            for p in &projects {
                println!(
                    "{:<6} {:<30} {}",
                    style(p.id).cyan(),
                    crate::cli::helpers::truncate_str(&p.name, 28),
                    p.lifetime
                );
            }
            if projects.is_empty() && !global.quiet {
                println!();
                println!(
                    "No project yet. Use {} to create one.",
                    style("fmeda project new").yellow()
                );
            }
        }
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = session.project_id(args.project.as_deref())?;

    let patch = ProjectPatch {
        name: args.name,
        lifetime: args.lifetime.as_deref().map(lenient::parse_f64),
    };
    let project = session.store.patch_project(id, patch)?.clone();
    session.save()?;

    print_updated(&project, global.quiet);
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = session.project_id(args.project.as_deref())?;

    let prompt = format!(
        "Delete project '{}' and all of its safety functions, components and failure modes?",
        session.store.project(id)?.name
    );
    if !confirm(&prompt, args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let project = session.store.delete_project(id)?;
    session.save()?;

    print_deleted(&project, global.quiet);
    Ok(())
}
