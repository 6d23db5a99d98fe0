//! `fmeda clear` command - Delete everything in the workspace

use console::style;
use miette::Result;

use crate::cli::helpers::{confirm, Session};
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct ClearArgs {
    /// Clear without asking
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: ClearArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    if session.store.is_empty() {
        if !global.quiet {
            println!("{}", style("Workspace is already empty.").dim());
        }
        return Ok(());
    }

    if !confirm(
        "Delete every project, safety function, component and failure mode?",
        args.yes,
    )? {
        println!("Aborted.");
        return Ok(());
    }

    session.store.clear_all();
    session.save()?;

    if !global.quiet {
        println!("{} Workspace cleared", style("✓").green());
    }
    Ok(())
}
