//! Environment discovery under the home.
//!
//! There is no persisted index: every call rescans the filesystem, so the
//! registry can never disagree with what is actually on disk. An
//! environment is a non-hidden folder below the home carrying a
//! `pyproject.toml`; whether it also has a runtime interpreter decides its
//! [`EnvState`].

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::den::{self, Den};
use crate::error::{Error, Result};

/// Completeness policy for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvFilter {
    /// Only environments whose runtime interpreter exists. A descriptor
    /// without a runtime cannot be activated, so this is what every
    /// production caller wants.
    Complete,
    /// Every descriptor-bearing folder, runnable or not. For diagnostics.
    Any,
}

/// Whether an environment can actually be activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvState {
    /// Descriptor present, runtime interpreter missing.
    Incomplete,
    /// Descriptor and runtime interpreter both present.
    Complete { runtime: PathBuf },
}

/// A managed environment found under the home.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Name relative to the home, e.g. `webapp` or `nested/subproj`.
    pub name: String,
    /// Absolute folder path.
    pub root: PathBuf,
    /// Absolute path of the folder's `pyproject.toml`.
    pub descriptor: PathBuf,
    pub state: EnvState,
}

impl Environment {
    pub fn is_complete(&self) -> bool {
        matches!(self.state, EnvState::Complete { .. })
    }

    /// The runtime interpreter, for complete environments.
    pub fn runtime(&self) -> Option<&Path> {
        match &self.state {
            EnvState::Complete { runtime } => Some(runtime),
            EnvState::Incomplete => None,
        }
    }
}

/// What a descriptor declares.
#[derive(Debug, Clone, Default)]
pub struct Descriptor {
    pub project_name: Option<String>,
    /// Declared dependencies; empty when the field or the whole
    /// `[project]` table is missing.
    pub dependencies: Vec<String>,
    pub requires_python: Option<String>,
}

// Raw shape of the descriptor; only [project] is interesting here.
#[derive(Debug, Deserialize, Default)]
struct RawPyProject {
    project: Option<ProjectSection>,
}

#[derive(Debug, Deserialize, Default)]
struct ProjectSection {
    name: Option<String>,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(rename = "requires-python")]
    requires_python: Option<String>,
}

/// Scan the home for environments.
///
/// Top-level hidden folders and symlinks are skipped; below that, hidden
/// folders are skipped at every depth, which keeps anything vendored
/// inside a `.venv` from surfacing as its own environment. Ordering is
/// filesystem iteration order; callers needing determinism must sort.
pub fn list_environments(den: &Den, filter: EnvFilter) -> Result<Vec<Environment>> {
    let mut descriptors = Vec::new();
    for entry in fs::read_dir(&den.home)? {
        let entry = entry?;
        if is_hidden(&entry.file_name()) || !entry.file_type()?.is_dir() {
            continue;
        }
        collect_descriptors(&entry.path(), &mut descriptors)?;
    }

    let mut environments = Vec::new();
    for descriptor in descriptors {
        let Some(root) = descriptor.parent().map(Path::to_path_buf) else {
            continue;
        };
        let Ok(relative) = root.strip_prefix(&den.home) else {
            continue;
        };
        // Hidden-folder skipping already covers `.venv`, but a runtime
        // subtree must never surface as an environment even if that name
        // changes.
        if relative
            .components()
            .any(|c| c.as_os_str() == den::VENV_DIR_NAME)
        {
            continue;
        }

        let runtime = den::venv_python_path(&root.join(den::VENV_DIR_NAME));
        let state = if runtime.exists() {
            EnvState::Complete { runtime }
        } else {
            EnvState::Incomplete
        };
        if filter == EnvFilter::Complete && state == EnvState::Incomplete {
            continue;
        }

        environments.push(Environment {
            name: relative.to_string_lossy().to_string(),
            root,
            descriptor,
            state,
        });
    }

    Ok(environments)
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Depth-first hunt for descriptor files, skipping hidden folders.
fn collect_descriptors(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if is_hidden(&entry.file_name()) {
            continue;
        }
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_descriptors(&entry.path(), out)?;
        } else if file_type.is_file() && entry.file_name() == den::DESCRIPTOR_NAME {
            out.push(entry.path());
        }
    }
    Ok(())
}

/// Parse an environment's `pyproject.toml` into its declared view.
pub fn load_descriptor(path: &Path) -> Result<Descriptor> {
    let content = fs::read_to_string(path).map_err(|source| Error::DescriptorRead {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: RawPyProject = toml::from_str(&content).map_err(|source| Error::DescriptorParse {
        path: path.to_path_buf(),
        source,
    })?;
    let project = raw.project.unwrap_or_default();
    Ok(Descriptor {
        project_name: project.name,
        dependencies: project.dependencies,
        requires_python: project.requires_python,
    })
}

/// The whole descriptor as one TOML value, for `list --full`.
pub fn load_descriptor_value(path: &Path) -> Result<toml::Value> {
    let content = fs::read_to_string(path).map_err(|source| Error::DescriptorRead {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| Error::DescriptorParse {
        path: path.to_path_buf(),
        source,
    })
}
