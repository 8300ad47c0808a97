//! Console-plus-logfile notes and delegated command execution.
//!
//! Every user-visible line goes through [`note`]: stamped, printed, and
//! usually appended to `bark.log` so the home keeps its own command
//! history. Delegated commands inherit stdio, so their output and their
//! own prompts pass straight through to the user.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::process::{Command, ExitStatus};

use log::warn;

use crate::den::Den;
use crate::error::{Error, Result};

/// Timestamp layout for `bark.log` lines.
const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What a delegated command came back with.
#[derive(Debug, Clone, Copy)]
pub struct CommandOutcome {
    pub status: ExitStatus,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Child exit code, when the platform reports one.
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }
}

/// Print a stamped message; `tee` also appends it to `bark.log`.
///
/// A log file that cannot be written costs a warning, never the operation.
pub fn note(den: &Den, message: &str, tee: bool) {
    let stamped = format!(
        "[{}] {}",
        chrono::Local::now().format(LOG_TIME_FORMAT),
        message
    );
    println!("{stamped}");
    if tee {
        if let Err(e) = append_line(&den.log_file(), &stamped) {
            warn!("could not append to {}: {}", den.log_file().display(), e);
        }
    }
}

/// Echo what the user asked for into the command history.
pub fn hear(den: &Den, message: &str) {
    note(den, &format!("kennel heard: {message}"), true);
}

/// First visit to a home: leave the arrival line.
pub fn greet(den: &Den) {
    if !den.log_file().exists() {
        note(
            den,
            &format!("kennel has arrived at {}", den.home.display()),
            true,
        );
    }
}

/// Run a delegated command, inheriting stdio, blocking until it exits.
///
/// The rendered command line is noted first so `bark.log` records what
/// ran. A non-zero exit is tolerated (and logged) unless the den is
/// strict; the typed outcome carries the status either way.
pub fn run(den: &Den, program: &Path, args: &[String], tee: bool) -> Result<CommandOutcome> {
    let rendered = render(program, args);
    note(den, &format!("kennel runs: {rendered}"), tee);

    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| Error::Spawn {
            program: program.display().to_string(),
            source,
        })?;

    if !status.success() {
        if den.strict {
            return Err(Error::CommandFailed {
                program: program.display().to_string(),
                status,
            });
        }
        warn!("`{rendered}` exited with {status}");
    }

    Ok(CommandOutcome { status })
}

/// One-line rendering of a command for the history.
fn render(program: &Path, args: &[String]) -> String {
    let mut rendered = program.display().to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")
}
