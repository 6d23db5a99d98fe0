//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    calc::CalcArgs, clear::ClearArgs, cmp::CmpCommands, completions::CompletionsArgs,
    export::ExportArgs, fm::FmCommands, import::ImportArgs, init::InitArgs,
    project::ProjectCommands, report::ReportArgs, results::ResultsArgs, sf::SfCommands,
    tree::TreeArgs,
};

#[derive(Parser)]
#[command(name = "fmeda")]
#[command(author, version, about = "FMEDA Toolkit")]
#[command(
    long_about = "Record safety functions, components and failure modes, and compute SPFM, LFM and MPHF hardware metrics."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace root (default: auto-detect by finding .fmeda/)
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new FMEDA workspace
    Init(InitArgs),

    /// Project management (one live project per workspace)
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Safety function management
    #[command(subcommand)]
    Sf(SfCommands),

    /// Component management
    #[command(subcommand)]
    Cmp(CmpCommands),

    /// Failure mode management
    #[command(subcommand)]
    Fm(FmCommands),

    /// Calculate SPFM, LFM and MPHF for every safety function
    Calc(CalcArgs),

    /// Show the last calculated metrics without recalculating
    Results(ResultsArgs),

    /// Generate a Markdown FMEDA report
    Report(ReportArgs),

    /// Show the whole project graph
    Tree(TreeArgs),

    /// Export the project as CSV
    Export(ExportArgs),

    /// Replace the workspace contents with a project CSV
    Import(ImportArgs),

    /// Delete every entity in the workspace
    Clear(ClearArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (pretty for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
