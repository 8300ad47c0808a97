//! Fetch: make an environment present, then splice it into this process.
//!
//! This is the library-only entry point: a program embedding kennel calls
//! [`fetch`] to pull a named environment's installed packages onto the
//! process-wide search path, creating the environment and installing
//! packages on the way when needed. The protocol runs in two explicit
//! phases: ensure the environment exists, then activate it.

use std::path::PathBuf;

use log::warn;

use crate::command;
use crate::den::Den;
use crate::error::Result;
use crate::prompt::Prompt;
use crate::registry::{self, EnvFilter};
use crate::search_path;
use crate::uv;

/// What [`fetch`] splices into the search path.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Append the environment's site-packages directory.
    pub site_packages: bool,
    /// Append the environment root itself, for source-layout imports of
    /// in-development packages.
    pub root: bool,
    /// Skip the informational listing around activation.
    pub quiet: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            site_packages: true,
            root: false,
            quiet: false,
        }
    }
}

/// How a fetch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// A prompt went unanswered or there was nothing to install; nothing
    /// changed.
    Aborted,
    /// The environment was activated; paths partitioned by whether this
    /// call added them or found them already present.
    Activated {
        added: Vec<PathBuf>,
        already_present: Vec<PathBuf>,
    },
}

/// Ensure `name` exists (installing `packages` on the way), then activate
/// it.
///
/// With no `name` the prompter picks one; an empty answer is the
/// documented way to cancel and yields [`Fetched::Aborted`], as does a
/// missing environment with nothing to install. Activation itself is
/// idempotent: each path lands on the search path at most once per
/// process, and repeat fetches report it as already present.
pub fn fetch(
    den: &Den,
    prompter: &dyn Prompt,
    name: Option<&str>,
    packages: &[String],
    options: &FetchOptions,
) -> Result<Fetched> {
    if !options.quiet {
        let known = registry::list_environments(den, EnvFilter::Complete)?;
        let names: Vec<&str> = known.iter().map(|e| e.name.as_str()).collect();
        command::note(den, &format!("virtual envs available: {names:?}"), false);
    }

    let name = match name {
        Some(n) => n.to_string(),
        None => prompter.ask("Venv to fetch"),
    };
    if name.is_empty() {
        return Ok(Fetched::Aborted);
    }

    if !ensure_environment(den, prompter, &name, packages)? {
        return Ok(Fetched::Aborted);
    }

    let (added, already_present) = activate(den, &name, options);

    if !options.quiet {
        match registry::load_descriptor(&den.descriptor_path(&name)) {
            Ok(descriptor) => command::note(
                den,
                &format!("`{name}` declares: {:?}", descriptor.dependencies),
                false,
            ),
            Err(e) => warn!("could not read `{name}`'s descriptor: {e}"),
        }
    }

    Ok(Fetched::Activated {
        added,
        already_present,
    })
}

/// Phase one: the environment must exist and hold `packages`.
///
/// Missing site-packages means the environment is absent or incomplete;
/// either way the lifecycle's add repairs it, creating the folder on
/// demand. An existing environment still receives `packages`, so fetch
/// doubles as "ensure these are present and active". False means there
/// was nothing to do for a missing environment.
fn ensure_environment(
    den: &Den,
    prompter: &dyn Prompt,
    name: &str,
    packages: &[String],
) -> Result<bool> {
    if den.site_packages(name).exists() {
        if !packages.is_empty() {
            uv::add_packages(den, prompter, Some(name), packages)?;
        }
        return Ok(true);
    }
    uv::add_packages(den, prompter, Some(name), packages)
}

/// Phase two: append the chosen paths, noting added versus already there.
fn activate(den: &Den, name: &str, options: &FetchOptions) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut targets = Vec::new();
    if options.site_packages {
        targets.push(den.site_packages(name));
    }
    if options.root {
        targets.push(den.resolve(name));
    }

    let mut added = Vec::new();
    let mut already_present = Vec::new();
    for target in targets {
        if search_path::append(&target) {
            command::note(
                den,
                &format!(
                    "fetched `{name}`: {} added to the search path",
                    target.display()
                ),
                false,
            );
            added.push(target);
        } else {
            command::note(
                den,
                &format!("`{}` already on the search path", target.display()),
                false,
            );
            already_present.push(target);
        }
    }
    (added, already_present)
}
