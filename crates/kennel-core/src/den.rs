//! Home discovery and the per-process context.
//!
//! kennel works the same from anywhere inside the home tree, so every
//! invocation starts with the same walk: climb from the current directory
//! until a folder carries the `.kennel` marker. Everything else the process
//! needs (host interpreter, `uv` binary, strictness) is resolved once into
//! an immutable [`Den`] and passed around by reference.

use std::env;
use std::path::{Path, PathBuf};

use log::debug;

use crate::command;
use crate::error::{Error, Result};
use crate::prompt::Prompt;

/// Marker file whose presence makes a directory the kennel home.
pub const HOME_MARKER: &str = ".kennel";

/// Command-history log, appended to in the home directory.
pub const LOG_FILE_NAME: &str = "bark.log";

/// Manifest file an environment is recognized by.
pub const DESCRIPTOR_NAME: &str = "pyproject.toml";

/// Private runtime subtree inside each environment folder.
pub const VENV_DIR_NAME: &str = ".venv";

/// One-liner handed to the interpreter to learn its `MAJOR.MINOR`.
const PYTHON_VERSION_PROBE: &str = "import sys; print('%d.%d' % sys.version_info[:2])";

/// Immutable per-process context, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Den {
    /// Directory containing the `.kennel` marker.
    pub home: PathBuf,
    /// Host interpreter new environments are pinned to.
    pub python: PathBuf,
    /// `MAJOR.MINOR` of the host interpreter, e.g. `3.12`.
    pub python_version: String,
    /// The `uv` binary delegated commands run through.
    pub uv: PathBuf,
    /// Treat non-zero exits from delegated commands as errors.
    pub strict: bool,
}

impl Den {
    /// Resolve the whole context from the current directory and environment.
    ///
    /// Fails when no home marker is found or no host interpreter answers
    /// the version probe. On the first run against a home this also drops
    /// the arrival line into `bark.log`.
    pub fn discover(prompter: &dyn Prompt, strict: bool) -> Result<Self> {
        let cwd = env::current_dir()?;
        let home = find_home(&cwd, prompter)?;
        let (python, python_version) = resolve_python()?;
        let den = Den {
            home,
            python,
            python_version,
            uv: resolve_uv(),
            strict,
        };
        debug!(
            "kennel home {} (python {})",
            den.home.display(),
            den.python_version
        );
        command::greet(&den);
        Ok(den)
    }

    /// The command-history log, `bark.log` in the home.
    pub fn log_file(&self) -> PathBuf {
        self.home.join(LOG_FILE_NAME)
    }

    /// Pure join of home and a relative environment name. No existence
    /// check; existence is the caller's concern.
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.home.join(name)
    }

    /// The environment's `pyproject.toml`.
    pub fn descriptor_path(&self, name: &str) -> PathBuf {
        self.resolve(name).join(DESCRIPTOR_NAME)
    }

    /// The environment's private runtime subtree.
    pub fn venv_dir(&self, name: &str) -> PathBuf {
        self.resolve(name).join(VENV_DIR_NAME)
    }

    /// The interpreter inside the environment's `.venv`.
    pub fn venv_python(&self, name: &str) -> PathBuf {
        venv_python_path(&self.venv_dir(name))
    }

    /// Where the environment's installed packages land.
    pub fn site_packages(&self, name: &str) -> PathBuf {
        site_packages_path(&self.venv_dir(name), &self.python_version)
    }
}

/// Walk upward from `start` until a directory carries the home marker.
///
/// The deepest marker wins. At the filesystem root without a match, an
/// interactive prompter is offered the new-home question for discoverability,
/// but nothing is materialized either way: the caller still gets
/// [`Error::HomeNotFound`] and bootstrap stays a manual `touch .kennel`.
pub fn find_home(start: &Path, prompter: &dyn Prompt) -> Result<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(HOME_MARKER).exists() {
            return Ok(current);
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent.to_path_buf(),
            _ => break,
        }
    }

    if prompter.is_interactive() {
        prompter.confirm(
            &format!(
                "no {HOME_MARKER} found in {} or its parents; set up a new kennel there?",
                start.display()
            ),
            false,
        );
    }
    Err(Error::HomeNotFound {
        start: start.to_path_buf(),
    })
}

/// Interpreter location inside a `.venv` directory.
pub fn venv_python_path(venv_dir: &Path) -> PathBuf {
    #[cfg(target_os = "windows")]
    let python = venv_dir.join("Scripts").join("python.exe");
    #[cfg(not(target_os = "windows"))]
    let python = venv_dir.join("bin").join("python");
    python
}

/// site-packages location inside a `.venv` directory.
#[cfg(target_os = "windows")]
pub fn site_packages_path(venv_dir: &Path, _python_version: &str) -> PathBuf {
    venv_dir.join("Lib").join("site-packages")
}

/// site-packages location inside a `.venv` directory. Non-Windows layouts
/// bake the interpreter's `MAJOR.MINOR` into the path.
#[cfg(not(target_os = "windows"))]
pub fn site_packages_path(venv_dir: &Path, python_version: &str) -> PathBuf {
    venv_dir
        .join("lib")
        .join(format!("python{python_version}"))
        .join("site-packages")
}

/// Resolve the host interpreter new environments are seeded from.
///
/// `KENNEL_PYTHON` wins when set (and must answer the probe); otherwise
/// `python3` then `python` are tried on PATH.
fn resolve_python() -> Result<(PathBuf, String)> {
    if let Ok(explicit) = env::var("KENNEL_PYTHON") {
        let path = PathBuf::from(explicit);
        return match probe_version(&path) {
            Some(version) => Ok((path, version)),
            None => Err(Error::PythonNotFound),
        };
    }

    for candidate in ["python3", "python"] {
        let path = PathBuf::from(candidate);
        if let Some(version) = probe_version(&path) {
            return Ok((path, version));
        }
    }

    Err(Error::PythonNotFound)
}

/// The `uv` binary, overridable via `KENNEL_UV`.
fn resolve_uv() -> PathBuf {
    env::var("KENNEL_UV")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("uv"))
}

/// Ask an interpreter for its `MAJOR.MINOR`, captured rather than inherited.
fn probe_version(python: &Path) -> Option<String> {
    let output = std::process::Command::new(python)
        .args(["-c", PYTHON_VERSION_PROBE])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    parse_version_output(&String::from_utf8_lossy(&output.stdout))
}

/// Validate the probe output; anything but `MAJOR.MINOR` is a bad probe.
fn parse_version_output(stdout: &str) -> Option<String> {
    let version = stdout.trim();
    let mut parts = version.split('.');
    let major = parts.next()?;
    let minor = parts.next()?;
    if parts.next().is_some() || major.is_empty() || minor.is_empty() {
        return None;
    }
    let numeric = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if numeric(major) && numeric(minor) {
        Some(version.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::AutoConfirm;
    use tempfile::TempDir;

    fn make_home(dir: &Path) {
        std::fs::write(dir.join(HOME_MARKER), "").unwrap();
    }

    fn test_den(home: &Path) -> Den {
        Den {
            home: home.to_path_buf(),
            python: PathBuf::from("python3"),
            python_version: "3.12".to_string(),
            uv: PathBuf::from("uv"),
            strict: false,
        }
    }

    #[test]
    fn test_find_home_same_dir() {
        let temp = TempDir::new().unwrap();
        make_home(temp.path());

        let home = find_home(temp.path(), &AutoConfirm).unwrap();
        assert_eq!(home, temp.path());
    }

    #[test]
    fn test_find_home_from_any_depth() {
        let temp = TempDir::new().unwrap();
        make_home(temp.path());
        let shallow = temp.path().join("a");
        let deep = temp.path().join("a").join("b").join("c");
        std::fs::create_dir_all(&deep).unwrap();

        let from_shallow = find_home(&shallow, &AutoConfirm).unwrap();
        let from_deep = find_home(&deep, &AutoConfirm).unwrap();
        assert_eq!(from_shallow, temp.path());
        assert_eq!(from_deep, from_shallow);
    }

    #[test]
    fn test_find_home_prefers_deepest_marker() {
        let temp = TempDir::new().unwrap();
        make_home(temp.path());
        let inner = temp.path().join("inner");
        let below = inner.join("below");
        std::fs::create_dir_all(&below).unwrap();
        make_home(&inner);

        let home = find_home(&below, &AutoConfirm).unwrap();
        assert_eq!(home, inner);
    }

    #[test]
    fn test_find_home_not_found() {
        let temp = TempDir::new().unwrap();

        let err = find_home(temp.path(), &AutoConfirm).unwrap_err();
        assert!(matches!(err, Error::HomeNotFound { .. }));
    }

    #[test]
    fn test_resolve_is_a_pure_join() {
        let den = test_den(Path::new("/h"));
        assert_eq!(den.resolve("nested/sub"), PathBuf::from("/h/nested/sub"));
        assert_eq!(
            den.descriptor_path("proj"),
            PathBuf::from("/h/proj/pyproject.toml")
        );
    }

    #[test]
    fn test_venv_python_lives_under_venv() {
        let den = test_den(Path::new("/h"));
        let python = den.venv_python("proj");
        assert!(python.starts_with(den.venv_dir("proj")));
        #[cfg(target_os = "windows")]
        assert!(python.ends_with("python.exe"));
        #[cfg(not(target_os = "windows"))]
        assert!(python.ends_with("bin/python"));
    }

    #[test]
    fn test_site_packages_layout() {
        let den = test_den(Path::new("/h"));
        let site_packages = den.site_packages("proj");
        assert!(site_packages.starts_with(den.venv_dir("proj")));
        assert!(site_packages.ends_with("site-packages"));
        #[cfg(not(target_os = "windows"))]
        assert!(site_packages.to_string_lossy().contains("python3.12"));
    }

    #[test]
    fn test_parse_version_output() {
        assert_eq!(parse_version_output("3.12\n"), Some("3.12".to_string()));
        assert_eq!(parse_version_output("3.8"), Some("3.8".to_string()));
        assert_eq!(parse_version_output(""), None);
        assert_eq!(parse_version_output("Python 3.12"), None);
        assert_eq!(parse_version_output("3.12.1"), None);
    }
}
