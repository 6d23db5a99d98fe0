//! `fmeda cmp` command - Component management

use clap::Subcommand;
use console::style;
use miette::Result;
use std::collections::BTreeSet;

use crate::cli::helpers::{
    escape_csv, or_dash, print_created, print_deleted, print_structured, print_updated,
    resolve_cmp, resolve_sf, truncate_str, Session,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{lenient, ProjectId, SafetyFunctionId, Store};
use crate::entities::{Component, ComponentPatch, NewComponent};

#[derive(Subcommand, Debug)]
pub enum CmpCommands {
    /// Create a component
    New(NewArgs),

    /// List components
    List(ListArgs),

    /// Show a component with its failure modes
    Show(RefArgs),

    /// Change fields of a component
    Edit(EditArgs),

    /// Delete a component and its failure modes
    Delete(RefArgs),

    /// Link a component to safety functions
    Link(LinkArgs),

    /// Remove links between a component and safety functions
    Unlink(LinkArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// External id (e.g. U12)
    #[arg(long = "id")]
    pub comp_id: String,

    /// Component type (free text)
    #[arg(long = "type", short = 't', default_value = "")]
    pub component_type: String,

    /// Base failure rate in FIT
    #[arg(long, short = 'r', default_value = "0")]
    pub rate: String,

    /// Mark the component as safety related
    #[arg(long)]
    pub safety_related: bool,

    /// Related safety functions (external or internal ids, comma separated)
    #[arg(long = "sf", value_delimiter = ',')]
    pub sfs: Vec<String>,

    /// Project id or name (default: the live project)
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only components linked to this safety function
    #[arg(long)]
    pub sf: Option<String>,

    /// Only safety-related components
    #[arg(long)]
    pub safety_related: bool,

    /// Project id or name (default: the live project)
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RefArgs {
    /// Component external id or internal id
    pub cmp: String,

    /// Project id or name (default: the live project)
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Component external id or internal id
    pub cmp: String,

    /// New external id
    #[arg(long = "id")]
    pub comp_id: Option<String>,

    /// New component type
    #[arg(long = "type", short = 't')]
    pub component_type: Option<String>,

    /// New failure rate in FIT
    #[arg(long, short = 'r')]
    pub rate: Option<String>,

    /// Safety related flag (true/false)
    #[arg(long)]
    pub safety_related: Option<String>,

    /// Replace the related safety functions (comma separated)
    #[arg(long = "sf", value_delimiter = ',', conflicts_with = "clear_sfs")]
    pub sfs: Vec<String>,

    /// Remove every safety function link
    #[arg(long)]
    pub clear_sfs: bool,

    /// Project id or name (default: the live project)
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct LinkArgs {
    /// Component external id or internal id
    pub cmp: String,

    /// Safety functions (external or internal ids)
    #[arg(required = true, num_args = 1..)]
    pub sfs: Vec<String>,

    /// Project id or name (default: the live project)
    #[arg(long)]
    pub project: Option<String>,
}

pub fn run(cmd: CmpCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CmpCommands::New(args) => run_new(args, global),
        CmpCommands::List(args) => run_list(args, global),
        CmpCommands::Show(args) => run_show(args, global),
        CmpCommands::Edit(args) => run_edit(args, global),
        CmpCommands::Delete(args) => run_delete(args, global),
        CmpCommands::Link(args) => run_link(args, global, true),
        CmpCommands::Unlink(args) => run_link(args, global, false),
    }
}

fn resolve_sfs(
    store: &Store,
    project: ProjectId,
    refs: &[String],
) -> Result<BTreeSet<SafetyFunctionId>> {
    refs.iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .map(|r| resolve_sf(store, project, r))
        .collect()
}

/// External ids of the safety functions a component is linked to
fn linked_sf_ids<'a>(store: &'a Store, component: &Component) -> Vec<&'a str> {
    store
        .safety_functions(Some(component.project))
        .filter(|sf| component.is_related_to(sf.id))
        .map(|sf| sf.sf_id.as_str())
        .collect()
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let project = session.project_id(args.project.as_deref())?;
    let related_sfs = resolve_sfs(&session.store, project, &args.sfs)?;

    let component = session
        .store
        .create_component(NewComponent {
            project,
            comp_id: args.comp_id,
            component_type: args.component_type,
            failure_rate: lenient::parse_f64(&args.rate),
            is_safety_related: args.safety_related,
            related_sfs,
        })?
        .clone();
    session.save()?;

    if global.format == OutputFormat::Id {
        println!("{}", component.id);
    } else {
        print_created(&component, global.quiet);
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let project = session.project_id(args.project.as_deref())?;
    let store = &session.store;

    let sf_filter = match &args.sf {
        Some(r) => Some(resolve_sf(store, project, r)?),
        None => None,
    };
    let components: Vec<_> = store
        .components(Some(project))
        .filter(|c| sf_filter.map_or(true, |sf| c.is_related_to(sf)))
        .filter(|c| !args.safety_related || c.is_safety_related)
        .collect();

    match session.format(global, OutputFormat::Tsv) {
        f @ (OutputFormat::Yaml | OutputFormat::Json) => print_structured(&components, f)?,
        OutputFormat::Id => {
            for c in &components {
                println!("{}", c.comp_id);
            }
        }
        OutputFormat::Csv => {
            println!("id,comp_id,type,failure_rate,is_safety_related,related_sf_ids,failure_modes");
            for c in &components {
                println!(
                    "{},{},{},{},{},{},{}",
                    c.id,
                    escape_csv(&c.comp_id),
                    escape_csv(&c.component_type),
                    c.failure_rate,
                    c.is_safety_related,
                    escape_csv(&linked_sf_ids(store, c).join(",")),
                    store.failure_modes_of(c.id).count()
                );
            }
        }
        OutputFormat::Md => {
            println!("| ID | Component | Type | λ (FIT) | Safety Related | SFs | FMs |");
            println!("|---|---|---|---|---|---|---|");
            for c in &components {
                println!(
                    "| {} | {} | {} | {} | {} | {} | {} |",
                    c.id,
                    c.comp_id,
                    or_dash(&c.component_type),
                    c.failure_rate,
                    if c.is_safety_related { "yes" } else { "no" },
                    linked_sf_ids(store, c).join(", "),
                    store.failure_modes_of(c.id).count()
                );
            }
        }
        _ => {
            println!(
                "{:<6} {:<14} {:<12} {:<10} {:<4} {:<20} {}",
                style("ID").bold(),
                style("COMPONENT").bold(),
                style("TYPE").bold(),
                style("FIT").bold(),
                style("SR").bold(),
                style("SAFETY FUNCTIONS").bold(),
                style("FMS").bold()
            );
            println!("{}", "-".repeat(80));
            for c in &components {
                println!(
                    "{:<6} {:<14} {:<12} {:<10} {:<4} {:<20} {}",
                    style(c.id).cyan(),
                    truncate_str(&c.comp_id, 12),
                    truncate_str(or_dash(&c.component_type), 10),
                    c.failure_rate,
                    if c.is_safety_related { "yes" } else { "no" },
                    truncate_str(&linked_sf_ids(store, c).join(","), 18),
                    store.failure_modes_of(c.id).count()
                );
            }
            if !global.quiet {
                println!();
                println!("{} component(s) found.", style(components.len()).cyan());
            }
        }
    }
    Ok(())
}

fn run_show(args: RefArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let project = session.project_id(args.project.as_deref())?;
    let store = &session.store;
    let c = store.component(resolve_cmp(store, project, &args.cmp)?)?;

    match session.format(global, OutputFormat::Auto) {
        f @ (OutputFormat::Yaml | OutputFormat::Json) => print_structured(c, f)?,
        OutputFormat::Id => println!("{}", c.id),
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(c.id).cyan());
            println!("{}: {}", style("Component").bold(), style(&c.comp_id).yellow());
            println!("{}: {}", style("Type").bold(), or_dash(&c.component_type));
            println!("{}: {} FIT", style("Failure Rate").bold(), c.failure_rate);
            println!(
                "{}: {}",
                style("Safety Related").bold(),
                if c.is_safety_related {
                    style("yes").green()
                } else {
                    style("no").dim()
                }
            );
            let linked = linked_sf_ids(store, c);
            println!(
                "{}: {}",
                style("Safety Functions").bold(),
                if linked.is_empty() {
                    "-".to_string()
                } else {
                    linked.join(", ")
                }
            );
            println!("{}", style("─".repeat(60)).dim());

            let fms: Vec<_> = store.failure_modes_of(c.id).collect();
            println!();
            println!("{}", style("Failure Modes:").bold());
            if fms.is_empty() {
                println!("  {}", style("none").dim());
            }
            for fm in &fms {
                let mut flags = Vec::new();
                if fm.is_spf {
                    flags.push(format!("SPF {}%", fm.spf_diagnostic_coverage));
                }
                if fm.is_mpf {
                    flags.push(format!("MPF {}%", fm.mpf_diagnostic_coverage));
                }
                println!(
                    "  • {} {} ({} FIT) {}",
                    style(format!("#{}", fm.id)).cyan(),
                    or_dash(&fm.description),
                    fm.failure_rate_total,
                    style(flags.join(", ")).dim()
                );
            }
        }
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let project = session.project_id(args.project.as_deref())?;
    let id = resolve_cmp(&session.store, project, &args.cmp)?;

    let related_sfs = if args.clear_sfs {
        Some(BTreeSet::new())
    } else if !args.sfs.is_empty() {
        Some(resolve_sfs(&session.store, project, &args.sfs)?)
    } else {
        None
    };

    let patch = ComponentPatch {
        comp_id: args.comp_id,
        component_type: args.component_type,
        failure_rate: args.rate.as_deref().map(lenient::parse_f64),
        is_safety_related: args.safety_related.as_deref().map(lenient::parse_bool),
        related_sfs,
    };
    let component = session.store.patch_component(id, patch)?.clone();
    session.save()?;

    print_updated(&component, global.quiet);
    Ok(())
}

fn run_delete(args: RefArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let project = session.project_id(args.project.as_deref())?;
    let id = resolve_cmp(&session.store, project, &args.cmp)?;

    let cascaded = session.store.failure_modes_of(id).count();
    let component = session.store.delete_component(id)?;
    session.save()?;

    print_deleted(&component, global.quiet);
    if cascaded > 0 && !global.quiet {
        println!("   {} failure mode(s) removed", cascaded);
    }
    Ok(())
}

fn run_link(args: LinkArgs, global: &GlobalOpts, link: bool) -> Result<()> {
    let mut session = Session::open(global)?;
    let project = session.project_id(args.project.as_deref())?;
    let id = resolve_cmp(&session.store, project, &args.cmp)?;
    let targets = resolve_sfs(&session.store, project, &args.sfs)?;

    let mut related = session.store.component(id)?.related_sfs.clone();
    if link {
        related.extend(targets);
    } else {
        related.retain(|sf| !targets.contains(sf));
    }

    let component = session
        .store
        .patch_component(
            id,
            ComponentPatch {
                related_sfs: Some(related),
                ..Default::default()
            },
        )?
        .clone();
    session.save()?;

    if !global.quiet {
        let linked = linked_sf_ids(&session.store, &component);
        println!(
            "{} {} {} linked to: {}",
            style("✓").green(),
            style(&component.comp_id).cyan(),
            if link { "now" } else { "still" },
            if linked.is_empty() {
                "-".to_string()
            } else {
                linked.join(", ")
            }
        );
    }
    Ok(())
}
