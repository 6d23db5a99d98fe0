//! Workspace discovery and persistence
//!
//! A workspace is any directory containing `.fmeda/`. The whole store lives
//! in `.fmeda/store.yaml` and is replaced wholesale on every save.

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::store::{Dataset, Store};

const MARKER_DIR: &str = ".fmeda";
const STORE_FILE: &str = "store.yaml";
const CONFIG_FILE: &str = "config.yaml";

/// An FMEDA workspace on disk
#[derive(Debug)]
pub struct Workspace {
    /// Root directory of the workspace (parent of .fmeda/)
    root: PathBuf,
}

impl Workspace {
    /// Find the workspace root by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current =
            std::env::current_dir().map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the workspace root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        loop {
            if current.join(MARKER_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new workspace at the given path
    pub fn init(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if root.join(MARKER_DIR).exists() {
            return Err(WorkspaceError::AlreadyExists(root));
        }
        Self::create(root)
    }

    /// Initialize even if .fmeda/ exists, resetting config and store
    pub fn init_force(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::create(root)
    }

    fn create(root: PathBuf) -> Result<Self, WorkspaceError> {
        let dir = root.join(MARKER_DIR);
        std::fs::create_dir_all(&dir).map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        std::fs::write(dir.join(CONFIG_FILE), Self::default_config())
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        let workspace = Self { root };
        workspace.save_store(&Store::new())?;
        tracing::debug!(root = %workspace.root.display(), "workspace initialized");
        Ok(workspace)
    }

    fn default_config() -> &'static str {
        r#"# FMEDA workspace configuration

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto

# Lifetime in hours used when `fmeda project new` omits --lifetime
# default_lifetime: 100000

# Include calculated metric columns in CSV exports
# export_metrics: true
"#
    }

    /// Get the workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .fmeda directory
    pub fn fmeda_dir(&self) -> PathBuf {
        self.root.join(MARKER_DIR)
    }

    pub fn store_path(&self) -> PathBuf {
        self.fmeda_dir().join(STORE_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.fmeda_dir().join(CONFIG_FILE)
    }

    /// Read the persisted store; a missing file is an empty store
    pub fn load_store(&self) -> Result<Store, WorkspaceError> {
        let path = self.store_path();
        if !path.exists() {
            return Ok(Store::new());
        }
        let contents =
            std::fs::read_to_string(&path).map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        let dataset: Dataset =
            serde_yml::from_str(&contents).map_err(|e| WorkspaceError::Malformed {
                path: path.clone(),
                message: e.to_string(),
            })?;
        Ok(Store::from_dataset(dataset))
    }

    /// Replace the persisted store with `store`
    pub fn save_store(&self, store: &Store) -> Result<(), WorkspaceError> {
        let path = self.store_path();
        let yaml = serde_yml::to_string(&store.to_dataset())
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        let tmp = path.with_extension("yaml.tmp");
        std::fs::write(&tmp, yaml).map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        std::fs::rename(&tmp, &path).map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        tracing::debug!(path = %path.display(), revision = store.revision(), "store saved");
        Ok(())
    }
}

/// Workspace-related errors
#[derive(Debug, Error, Diagnostic)]
pub enum WorkspaceError {
    #[error("not an FMEDA workspace (searched from {searched_from:?})")]
    #[diagnostic(
        code(fmeda::workspace::not_found),
        help("run 'fmeda init' to create one")
    )]
    NotFound { searched_from: PathBuf },

    #[error("FMEDA workspace already exists at {0:?}")]
    #[diagnostic(code(fmeda::workspace::exists), help("use --force to reinitialize"))]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    #[diagnostic(code(fmeda::workspace::io))]
    IoError(String),

    #[error("malformed store file {path:?}: {message}")]
    #[diagnostic(code(fmeda::workspace::malformed))]
    Malformed { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_workspace_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();

        assert!(ws.fmeda_dir().is_dir());
        assert!(ws.config_path().exists());
        assert!(ws.store_path().exists());
        assert!(ws.load_store().unwrap().is_empty());
    }

    #[test]
    fn test_workspace_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path()).unwrap();

        let err = Workspace::init(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::AlreadyExists(_)));
        assert!(Workspace::init_force(tmp.path()).is_ok());
    }

    #[test]
    fn test_workspace_discover_from_subdirectory() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("reports/2026");
        std::fs::create_dir_all(&subdir).unwrap();

        let ws = Workspace::discover_from(&subdir).unwrap();
        assert_eq!(
            ws.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_workspace_discover_fails_outside() {
        let tmp = tempdir().unwrap();
        let err = Workspace::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound { .. }));
    }

    #[test]
    fn test_store_save_and_load() {
        let tmp = tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();

        let mut store = Store::new();
        let project = store.create_project("Brake ECU", 8760.0).id;
        ws.save_store(&store).unwrap();

        let loaded = ws.load_store().unwrap();
        assert_eq!(loaded.project(project).unwrap().name, "Brake ECU");
        assert_eq!(loaded.revision(), store.revision());
    }

    #[test]
    fn test_malformed_store_is_reported() {
        let tmp = tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();
        std::fs::write(ws.store_path(), "projects: [not, a, project").unwrap();

        let err = ws.load_store().unwrap_err();
        assert!(matches!(err, WorkspaceError::Malformed { .. }));
    }
}
