//! `fmeda tree` command - Safety function → component → failure mode graph

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{or_dash, print_structured, Session};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{ProjectId, Store};
use crate::entities::{Component, FailureMode, SafetyFunction};

#[derive(clap::Args, Debug)]
pub struct TreeArgs {
    /// Project id or name (default: the live project)
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(Serialize)]
struct TreeView<'a> {
    project: &'a str,
    lifetime: f64,
    safety_functions: Vec<SfNode<'a>>,
    /// Components linked to no safety function
    unlinked_components: Vec<ComponentNode<'a>>,
}

#[derive(Serialize)]
struct SfNode<'a> {
    #[serde(flatten)]
    safety_function: &'a SafetyFunction,
    components: Vec<ComponentNode<'a>>,
}

#[derive(Serialize)]
struct ComponentNode<'a> {
    #[serde(flatten)]
    component: &'a Component,
    failure_modes: Vec<&'a FailureMode>,
}

fn build(store: &Store, project: ProjectId) -> Result<TreeView<'_>> {
    let p = store.project(project)?;

    let safety_functions = store
        .safety_functions(Some(project))
        .map(|sf| SfNode {
            safety_function: sf,
            components: store
                .components(Some(project))
                .filter(|c| c.is_related_to(sf.id))
                .map(|c| component_node(store, c))
                .collect(),
        })
        .collect();
    let unlinked_components = store
        .components(Some(project))
        .filter(|c| c.related_sfs.is_empty())
        .map(|c| component_node(store, c))
        .collect();

    Ok(TreeView {
        project: &p.name,
        lifetime: p.lifetime,
        safety_functions,
        unlinked_components,
    })
}

fn component_node<'a>(store: &'a Store, component: &'a Component) -> ComponentNode<'a> {
    ComponentNode {
        component,
        failure_modes: store.failure_modes_of(component.id).collect(),
    }
}

pub fn run(args: TreeArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let project = session.project_id(args.project.as_deref())?;
    let view = build(&session.store, project)?;

    match session.format(global, OutputFormat::Auto) {
        f @ (OutputFormat::Yaml | OutputFormat::Json) => print_structured(&view, f)?,
        _ => {
            println!(
                "{} ({} h)",
                style(view.project).yellow().bold(),
                view.lifetime
            );
            let sf_count = view.safety_functions.len();
            for (i, sf) in view.safety_functions.iter().enumerate() {
                let last = i + 1 == sf_count && view.unlinked_components.is_empty();
                println!(
                    "{} {} {}",
                    if last { "└──" } else { "├──" },
                    style(&sf.safety_function.sf_id).cyan(),
                    style(or_dash(&sf.safety_function.target_integrity_level)).dim()
                );
                print_components(&sf.components, if last { "    " } else { "│   " });
            }
            if !view.unlinked_components.is_empty() {
                println!("└── {}", style("(not linked)").dim());
                print_components(&view.unlinked_components, "    ");
            }
        }
    }
    Ok(())
}

fn print_components(components: &[ComponentNode<'_>], indent: &str) {
    for (i, node) in components.iter().enumerate() {
        let last = i + 1 == components.len();
        let c = node.component;
        println!(
            "{}{} {} {} ({} FIT)",
            indent,
            if last { "└──" } else { "├──" },
            style(&c.comp_id).green(),
            or_dash(&c.component_type),
            c.failure_rate
        );
        let child_indent = format!("{}{}", indent, if last { "    " } else { "│   " });
        for (j, fm) in node.failure_modes.iter().enumerate() {
            let fm_last = j + 1 == node.failure_modes.len();
            println!(
                "{}{} #{} {} ({} FIT)",
                child_indent,
                if fm_last { "└──" } else { "├──" },
                fm.id,
                or_dash(&fm.description),
                fm.failure_rate_total
            );
        }
    }
}
