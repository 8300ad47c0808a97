//! kennel CLI entry point.
//!
//! All argument parsing lives here; everything underneath — home
//! discovery, the environment registry, `uv` delegation, activation — is
//! kennel-core. Every command starts the same way: resolve the `Den`
//! once, then hand it by reference to the library.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use kennel_core::den::Den;
use kennel_core::registry::{self, EnvFilter};
use kennel_core::{command, prompt, uv};

#[derive(Parser)]
#[command(name = "kennel")]
#[command(version, about = "One home directory, many python venvs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Treat a non-zero exit from a delegated uv command as fatal
    #[arg(long, global = true)]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Say hi to kennel (version, home, host python)
    Hi,
    /// Create a new venv in a home subfolder
    New {
        /// Folder to create the venv in, relative to the home
        folder: Option<String>,
    },
    /// Install packages into a venv, creating it first when missing
    Add {
        /// Folder/venv to add packages to
        folder: Option<String>,
        /// Packages to install
        packages: Vec<String>,
    },
    /// Remove packages from a venv
    Remove {
        /// Folder/venv to remove packages from
        folder: Option<String>,
        /// Packages to remove
        packages: Vec<String>,
    },
    /// Reconcile a venv with its pyproject.toml
    Sync {
        /// Folder/venv to sync
        folder: String,
        /// Allow upgrades past already-settled versions
        #[arg(long)]
        upgrade: bool,
    },
    /// List venvs and their declared dependencies as JSON
    List {
        /// Only this venv
        venv: Option<String>,
        /// Emit each venv's whole descriptor, not just its dependencies
        #[arg(long)]
        full: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    let prompter = prompt::default_prompter();
    let den = Den::discover(prompter.as_ref(), cli.strict)?;

    match cli.command {
        Commands::Hi => say_hi(&den),
        Commands::New { folder } => {
            uv::create(&den, prompter.as_ref(), folder.as_deref())?;
        }
        Commands::Add { folder, packages } => {
            uv::add_packages(&den, prompter.as_ref(), folder.as_deref(), &packages)?;
        }
        Commands::Remove { folder, packages } => {
            uv::remove_packages(&den, prompter.as_ref(), folder.as_deref(), &packages)?;
        }
        Commands::Sync { folder, upgrade } => {
            uv::sync(&den, &folder, upgrade)?;
        }
        Commands::List { venv, full } => list_venvs(&den, venv.as_deref(), full)?,
    }

    Ok(())
}

fn say_hi(den: &Den) {
    command::hear(den, "hi");
    let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("kennel"));
    command::note(
        den,
        &format!("kennel v{}: {}", kennel_core::VERSION, exe.display()),
        true,
    );
    command::note(den, &format!("home: {}", den.home.display()), true);
    command::note(
        den,
        &format!(
            "python {}: {}",
            den.python_version,
            den.python.display()
        ),
        true,
    );
    println!("woof! check bark.log for kennel command history");
}

/// `kennel list`: one JSON object, venv name to declared dependencies (or
/// the whole descriptor with `--full`). A requested venv that does not
/// exist maps to null.
fn list_venvs(den: &Den, venv: Option<&str>, full: bool) -> anyhow::Result<()> {
    match venv {
        Some(v) => command::hear(den, &format!("list {v}")),
        None => command::hear(den, "list"),
    }

    let environments = registry::list_environments(den, EnvFilter::Complete)?;
    let mut listing = serde_json::Map::new();
    for environment in &environments {
        if venv.is_some_and(|wanted| wanted != environment.name) {
            continue;
        }
        let value = if full {
            serde_json::to_value(registry::load_descriptor_value(&environment.descriptor)?)?
        } else {
            serde_json::to_value(registry::load_descriptor(&environment.descriptor)?.dependencies)?
        };
        listing.insert(environment.name.clone(), value);
    }
    if let Some(wanted) = venv {
        listing
            .entry(wanted.to_string())
            .or_insert(serde_json::Value::Null);
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::Value::Object(listing))?
    );
    Ok(())
}
