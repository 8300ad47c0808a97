//! Error type shared across kennel operations.
//!
//! Declined confirmations and empty prompt answers are deliberately not in
//! here: those are user-chosen aborts, and operations report them through
//! quiet no-op return values instead.

use std::path::PathBuf;
use std::process::ExitStatus;

/// Errors surfaced by kennel-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No `.kennel` marker between the starting directory and the
    /// filesystem root. Fatal; there is nothing to manage.
    #[error("no `{}` marker found in `{}` or any of its parents", crate::den::HOME_MARKER, .start.display())]
    HomeNotFound { start: PathBuf },

    /// The requested environment name collides with the home itself or
    /// with a file kennel owns.
    #[error("`{name}` cannot be an environment: {reason}")]
    ReservedName { name: String, reason: String },

    /// No host interpreter answered the version probe.
    #[error("no usable python interpreter found (set KENNEL_PYTHON to override)")]
    PythonNotFound,

    #[error("failed to read `{}`: {source}", .path.display())]
    DescriptorRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse `{}`: {source}", .path.display())]
    DescriptorParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Sync precondition: the environment folder must already exist.
    #[error("no environment at `{}`", .path.display())]
    MissingEnvironment { path: PathBuf },

    /// Sync precondition: the environment must already have a descriptor.
    #[error("no `pyproject.toml` under `{}`; run `kennel new` first", .path.display())]
    MissingDescriptor { path: PathBuf },

    /// The delegated command could not even start (typically: not on PATH).
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A delegated command exited non-zero and strict mode is on. Without
    /// strict mode a non-zero exit is logged and tolerated.
    #[error("`{program}` exited with {status}")]
    CommandFailed { program: String, status: ExitStatus },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
