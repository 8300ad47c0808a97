//! kennel-core - One home directory, many python environments.
//!
//! This crate holds everything the `kennel` CLI does beneath its argument
//! parsing: locating the home directory by walking up to the `.kennel`
//! marker, scanning the home for environments (a folder with a
//! `pyproject.toml` and a `.venv` runtime), delegating creation and package
//! installs to `uv`, and splicing an environment's site-packages into the
//! running process via [`fetch`].
//!
//! Everything is synchronous: delegated `uv` commands inherit stdio and
//! block until they exit.

pub mod command;
pub mod den;
pub mod error;
pub mod fetch;
pub mod prompt;
pub mod registry;
pub mod search_path;
pub mod uv;

pub use den::Den;
pub use error::{Error, Result};
pub use fetch::{fetch, FetchOptions, Fetched};

/// Crate version, reported by `kennel hi`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
