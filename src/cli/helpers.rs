//! Shared helper functions for CLI commands
//!
//! Workspace loading, reference resolution and small formatting utilities
//! used across the command modules.

use clap::ValueEnum;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{
    ComponentId, Config, Entity, FailureModeId, ProjectId, SafetyFunctionId, Store, Workspace,
};

/// A loaded workspace: its store and merged configuration
pub struct Session {
    pub workspace: Workspace,
    pub store: Store,
    pub config: Config,
}

impl Session {
    /// Discover the workspace (or use `--workspace`) and load its store
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let workspace = match &global.workspace {
            Some(path) => Workspace::discover_from(path)?,
            None => Workspace::discover()?,
        };
        let store = workspace.load_store()?;
        let config = Config::load_for(Some(&workspace));
        tracing::debug!(
            root = %workspace.root().display(),
            revision = store.revision(),
            "workspace loaded"
        );
        Ok(Self {
            workspace,
            store,
            config,
        })
    }

    /// Persist the store, replacing the previous file
    pub fn save(&self) -> Result<()> {
        self.workspace.save_store(&self.store)?;
        Ok(())
    }

    /// Resolve `--project`, falling back to the live project
    pub fn project_id(&self, reference: Option<&str>) -> Result<ProjectId> {
        match reference {
            Some(r) => resolve_project(&self.store, r),
            None => self.store.current_project().map(|p| p.id).ok_or_else(|| {
                miette::miette!(
                    help = "run 'fmeda project new --name <NAME>' or 'fmeda import <FILE>'",
                    "No project in this workspace"
                )
            }),
        }
    }

    /// Output format after applying the configured default; `auto` maps to
    /// `fallback`
    pub fn format(&self, global: &GlobalOpts, fallback: OutputFormat) -> OutputFormat {
        resolve_format(global.format, &self.config, fallback)
    }
}

fn resolve_format(requested: OutputFormat, config: &Config, fallback: OutputFormat) -> OutputFormat {
    match requested {
        OutputFormat::Auto => config
            .default_format
            .as_deref()
            .and_then(|f| OutputFormat::from_str(f, true).ok())
            .filter(|f| *f != OutputFormat::Auto)
            .unwrap_or(fallback),
        f => f,
    }
}

/// Resolve a project by internal id or by name
pub fn resolve_project(store: &Store, reference: &str) -> Result<ProjectId> {
    if let Some(p) = store.projects().find(|p| p.name == reference) {
        return Ok(p.id);
    }
    let id: ProjectId = reference
        .parse()
        .map_err(|_| miette::miette!("No project found matching '{}'", reference))?;
    Ok(store.project(id)?.id)
}

/// Resolve a safety function by external id (`sf_id`) or internal id
pub fn resolve_sf(store: &Store, project: ProjectId, reference: &str) -> Result<SafetyFunctionId> {
    if let Some(sf) = store.find_safety_function(project, reference) {
        return Ok(sf.id);
    }
    let id: SafetyFunctionId = reference
        .parse()
        .map_err(|_| miette::miette!("No safety function found matching '{}'", reference))?;
    Ok(store.safety_function(id)?.id)
}

/// Resolve a component by external id (`comp_id`) or internal id
pub fn resolve_cmp(store: &Store, project: ProjectId, reference: &str) -> Result<ComponentId> {
    if let Some(c) = store.find_component(project, reference) {
        return Ok(c.id);
    }
    let id: ComponentId = reference
        .parse()
        .map_err(|_| miette::miette!("No component found matching '{}'", reference))?;
    Ok(store.component(id)?.id)
}

/// Failure modes have no external id; only the internal id is accepted
pub fn resolve_fm(store: &Store, reference: &str) -> Result<FailureModeId> {
    let id: FailureModeId = reference
        .parse()
        .map_err(|e| miette::miette!("{}", e))?;
    Ok(store.failure_mode(id)?.id)
}

/// Ask before a destructive operation; `--yes` skips the prompt
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}

/// Print the standard one-line confirmation for a created entity
pub fn print_created<E: Entity>(entity: &E, quiet: bool) {
    if quiet {
        return;
    }
    println!(
        "{} Created {} {} ({})",
        style("✓").green(),
        E::KIND,
        style(entity.id()).cyan(),
        style(entity.label()).yellow()
    );
}

/// Print the standard one-line confirmation for an updated entity
pub fn print_updated<E: Entity>(entity: &E, quiet: bool) {
    if quiet {
        return;
    }
    println!(
        "{} Updated {} {} ({})",
        style("✓").green(),
        E::KIND,
        style(entity.id()).cyan(),
        style(entity.label()).yellow()
    );
}

/// Print the standard one-line confirmation for a deleted entity
pub fn print_deleted<E: Entity>(entity: &E, quiet: bool) {
    if quiet {
        return;
    }
    println!(
        "{} Deleted {} {} ({})",
        style("✓").green(),
        E::KIND,
        style(entity.id()).cyan(),
        entity.label()
    );
}

/// Print a value as pretty JSON or YAML
pub fn print_structured<T: serde::Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
        }
        _ => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
        }
    }
    Ok(())
}

/// Write to a file, or to stdout when no path is given
pub fn write_output(content: &str, output_path: Option<PathBuf>, quiet: bool) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            writer.flush().into_diagnostic()?;
            if !quiet {
                println!(
                    "{} Written to {}",
                    style("✓").green(),
                    style(path.display()).cyan()
                );
            }
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Show an empty text field as a dash
pub fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

/// Quote a field for CSV list output
pub fn escape_csv(s: &str) -> String {
    crate::codec::columns::escape_field(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::NewSafetyFunction;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("a much longer description", 10), "a much ...");
        // Multi-byte characters are not split
        assert_eq!(truncate_str("λλλλλλλλλλλλ", 6), "λλλ...");
    }

    #[test]
    fn test_resolve_sf_by_external_or_internal_id() {
        let mut store = Store::new();
        let project = store.create_project("P", 1.0).id;
        let sf = store
            .create_safety_function(NewSafetyFunction {
                project,
                sf_id: "SF-A".to_string(),
                description: String::new(),
                target_integrity_level: String::new(),
            })
            .unwrap()
            .id;

        assert_eq!(resolve_sf(&store, project, "SF-A").unwrap(), sf);
        assert_eq!(resolve_sf(&store, project, "1").unwrap(), sf);
        assert!(resolve_sf(&store, project, "SF-B").is_err());
        assert!(resolve_sf(&store, project, "9").is_err());
    }

    #[test]
    fn test_resolve_format_uses_config_default() {
        let config = Config {
            default_format: Some("json".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_format(OutputFormat::Auto, &config, OutputFormat::Tsv),
            OutputFormat::Json
        );
        assert_eq!(
            resolve_format(OutputFormat::Csv, &config, OutputFormat::Tsv),
            OutputFormat::Csv
        );
        assert_eq!(
            resolve_format(OutputFormat::Auto, &Config::default(), OutputFormat::Tsv),
            OutputFormat::Tsv
        );
    }
}
