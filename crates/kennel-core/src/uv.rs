//! Environment lifecycle, delegated to `uv`.
//!
//! kennel never writes descriptors or venvs itself: `uv init` materializes
//! the project skeleton, `uv venv` the runtime, `uv add`/`uv remove`
//! rewrite the descriptor, and `uv sync` reconciles the runtime with it.
//! None of this is atomic; a failure partway leaves a partial environment
//! behind, which a later create offers to overwrite.

use std::path::Path;

use log::info;

use crate::command;
use crate::den::{self, Den};
use crate::error::{Error, Result};
use crate::prompt::Prompt;

/// Folder names that can never be environments.
pub const RESERVED_NAMES: &[&str] = &[den::HOME_MARKER, den::VENV_DIR_NAME, den::LOG_FILE_NAME];

/// Create a project folder and its private runtime.
///
/// Prompts for the folder when not given. An existing folder asks for
/// overwrite confirmation (default yes, and auto-confirmed when
/// non-interactive); declining aborts silently.
pub fn create(den: &Den, prompter: &dyn Prompt, name: Option<&str>) -> Result<()> {
    let name = match name {
        Some(n) => n.to_string(),
        None => prompter.ask("Folder to create the venv in"),
    };
    command::hear(den, &format!("new {name}"));
    validate_name(&name)?;

    let root = den.resolve(&name);
    if root.exists()
        && !prompter.confirm(
            &format!("Folder `{name}` already exists. Overwrite the venv?"),
            true,
        )
    {
        info!("keeping `{name}` untouched");
        return Ok(());
    }

    command::run(den, &den.uv, &init_args(den, &root), true)?;
    command::run(
        den,
        &den.uv,
        &venv_args(den, &root.join(den::VENV_DIR_NAME)),
        true,
    )?;
    Ok(())
}

/// Install packages into an environment, creating it first when missing.
///
/// Prompts fill in a missing name or package list; an empty answer turns
/// the whole call into a no-op returning false. True means an install was
/// actually dispatched.
pub fn add_packages(
    den: &Den,
    prompter: &dyn Prompt,
    name: Option<&str>,
    packages: &[String],
) -> Result<bool> {
    let name = match name {
        Some(n) => n.to_string(),
        None => prompter.ask("Folder/venv to add packages to"),
    };
    if name.is_empty() {
        return Ok(false);
    }

    let root = den.resolve(&name);
    if !root.exists() {
        create(den, prompter, Some(&name))?;
    }

    let packages = resolve_packages(prompter, packages, "Packages to install");
    if packages.is_empty() {
        return Ok(false);
    }

    command::hear(den, &format!("add {name} {}", packages.join(" ")));
    command::run(den, &den.uv, &package_args("add", &root, &packages), true)?;
    Ok(true)
}

/// Remove packages from an environment.
///
/// Symmetric to [`add_packages`] but never creates anything; removing
/// from a missing environment is a user error to surface, not repair.
pub fn remove_packages(
    den: &Den,
    prompter: &dyn Prompt,
    name: Option<&str>,
    packages: &[String],
) -> Result<()> {
    let name = match name {
        Some(n) => n.to_string(),
        None => prompter.ask("Folder/venv to remove packages from"),
    };
    if name.is_empty() {
        return Ok(());
    }

    let packages = resolve_packages(prompter, packages, "Packages to remove");
    if packages.is_empty() {
        return Ok(());
    }

    command::hear(den, &format!("remove {name} {}", packages.join(" ")));
    let root = den.resolve(&name);
    command::run(den, &den.uv, &package_args("remove", &root, &packages), true)?;
    Ok(())
}

/// Reconcile an environment's runtime with its descriptor.
///
/// The folder and descriptor must already exist; the runtime is
/// materialized first when missing. `upgrade` lets uv move past versions
/// an earlier sync already settled on.
pub fn sync(den: &Den, name: &str, upgrade: bool) -> Result<()> {
    let flag = if upgrade { " --upgrade" } else { "" };
    command::hear(den, &format!("sync {name}{flag}"));
    validate_name(name)?;

    let root = den.resolve(name);
    if !root.is_dir() {
        return Err(Error::MissingEnvironment { path: root });
    }
    if !root.join(den::DESCRIPTOR_NAME).is_file() {
        return Err(Error::MissingDescriptor { path: root });
    }

    let venv_dir = root.join(den::VENV_DIR_NAME);
    if !den::venv_python_path(&venv_dir).exists() {
        command::run(den, &den.uv, &venv_args(den, &venv_dir), true)?;
    }
    command::run(den, &den.uv, &sync_args(&root, upgrade), true)?;
    Ok(())
}

/// Reject names that alias the home itself or collide with kennel's files.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." {
        return Err(Error::ReservedName {
            name: name.to_string(),
            reason: "that is the home folder; manage its own pyproject.toml directly".to_string(),
        });
    }
    if RESERVED_NAMES.contains(&name) {
        return Err(Error::ReservedName {
            name: name.to_string(),
            reason: "kennel keeps its own files there".to_string(),
        });
    }
    Ok(())
}

fn resolve_packages(prompter: &dyn Prompt, packages: &[String], question: &str) -> Vec<String> {
    if packages.is_empty() {
        prompter
            .ask(question)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    } else {
        packages.to_vec()
    }
}

fn init_args(den: &Den, root: &Path) -> Vec<String> {
    vec![
        "init".to_string(),
        root.display().to_string(),
        "-p".to_string(),
        den.python.display().to_string(),
        "--no-workspace".to_string(),
    ]
}

fn venv_args(den: &Den, venv_dir: &Path) -> Vec<String> {
    vec![
        "venv".to_string(),
        venv_dir.display().to_string(),
        "-p".to_string(),
        den.python.display().to_string(),
    ]
}

fn package_args(verb: &str, root: &Path, packages: &[String]) -> Vec<String> {
    let mut args = vec![verb.to_string()];
    args.extend(packages.iter().cloned());
    args.push("--project".to_string());
    args.push(root.display().to_string());
    args.push("--python".to_string());
    args.push(
        den::venv_python_path(&root.join(den::VENV_DIR_NAME))
            .display()
            .to_string(),
    );
    args
}

fn sync_args(root: &Path, upgrade: bool) -> Vec<String> {
    let mut args = vec![
        "sync".to_string(),
        "--project".to_string(),
        root.display().to_string(),
        "--python".to_string(),
        den::venv_python_path(&root.join(den::VENV_DIR_NAME))
            .display()
            .to_string(),
    ];
    if upgrade {
        args.push("--upgrade".to_string());
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Interactive prompter that declines everything.
    struct Deny;

    impl Prompt for Deny {
        fn is_interactive(&self) -> bool {
            true
        }
        fn confirm(&self, _message: &str, _default_yes: bool) -> bool {
            false
        }
        fn ask(&self, _message: &str) -> String {
            String::new()
        }
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
    fn test_validate_rejects_home_aliases() {
        assert!(matches!(
            validate_name(""),
            Err(Error::ReservedName { .. })
        ));
        assert!(matches!(
            validate_name("."),
            Err(Error::ReservedName { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_reserved_names() {
        for name in RESERVED_NAMES {
            assert!(matches!(
                validate_name(name),
                Err(Error::ReservedName { .. })
            ));
        }
        assert!(validate_name("webapp").is_ok());
        assert!(validate_name("nested/sub").is_ok());
    }

    #[test]
    fn test_create_dot_is_fatal() {
        let temp = TempDir::new().unwrap();
        let den = test_den(temp.path());

        let err = create(&den, &Deny, Some(".")).unwrap_err();
        assert!(matches!(err, Error::ReservedName { .. }));
    }

    #[test]
    fn test_create_declined_overwrite_is_a_quiet_noop() {
        let temp = TempDir::new().unwrap();
        let den = test_den(temp.path());
        std::fs::create_dir(den.resolve("taken")).unwrap();

        create(&den, &Deny, Some("taken")).unwrap();
        assert!(!den.venv_dir("taken").exists());
    }

    #[test]
    fn test_add_without_name_or_answer_is_a_noop() {
        let temp = TempDir::new().unwrap();
        let den = test_den(temp.path());

        assert!(!add_packages(&den, &Deny, None, &[]).unwrap());
    }

    #[test]
    fn test_add_nothing_to_install_is_a_noop() {
        let temp = TempDir::new().unwrap();
        let den = test_den(temp.path());
        std::fs::create_dir(den.resolve("webapp")).unwrap();

        assert!(!add_packages(&den, &Deny, Some("webapp"), &[]).unwrap());
    }

    #[test]
    fn test_remove_nothing_to_remove_is_a_noop() {
        let temp = TempDir::new().unwrap();
        let den = test_den(temp.path());

        remove_packages(&den, &Deny, Some("webapp"), &[]).unwrap();
    }

    #[test]
    fn test_sync_requires_the_environment() {
        let temp = TempDir::new().unwrap();
        let den = test_den(temp.path());

        let err = sync(&den, "ghost", false).unwrap_err();
        assert!(matches!(err, Error::MissingEnvironment { .. }));
    }

    #[test]
    fn test_sync_requires_the_descriptor() {
        let temp = TempDir::new().unwrap();
        let den = test_den(temp.path());
        std::fs::create_dir(den.resolve("empty")).unwrap();

        let err = sync(&den, "empty", false).unwrap_err();
        assert!(matches!(err, Error::MissingDescriptor { .. }));
    }

    #[test]
    fn test_init_args_pin_the_host_interpreter() {
        let den = test_den(Path::new("/h"));
        let args = init_args(&den, &den.resolve("proj"));

        assert_eq!(args[0], "init");
        assert!(args.contains(&"--no-workspace".to_string()));
        assert!(args
            .windows(2)
            .any(|pair| pair[0] == "-p" && pair[1] == "python3"));
    }

    #[test]
    fn test_package_args_scope_project_and_interpreter() {
        let args = package_args(
            "add",
            Path::new("/h/proj"),
            &["requests".to_string(), "flask".to_string()],
        );

        assert_eq!(args[0], "add");
        assert_eq!(args[1], "requests");
        assert_eq!(args[2], "flask");
        let project_at = args.iter().position(|a| a == "--project").unwrap();
        assert_eq!(args[project_at + 1], Path::new("/h/proj").display().to_string());
        let python_at = args.iter().position(|a| a == "--python").unwrap();
        assert!(args[python_at + 1].contains(".venv"));
    }

    #[test]
    fn test_sync_args_upgrade_flag() {
        let plain = sync_args(Path::new("/h/proj"), false);
        assert_eq!(plain[0], "sync");
        assert!(!plain.contains(&"--upgrade".to_string()));

        let upgraded = sync_args(Path::new("/h/proj"), true);
        assert!(upgraded.contains(&"--upgrade".to_string()));
    }
}
