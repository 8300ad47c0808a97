//! Confirmation and free-form prompts.
//!
//! Interactivity is decided once at startup from where stdin points: a
//! terminal gets real questions, anything else (pipes, CI) gets the
//! affirmative default so automation never blocks on a read nobody can
//! answer.

use std::io::{self, IsTerminal, Write};

/// How kennel asks the user things.
pub trait Prompt {
    /// Whether a human can actually answer.
    fn is_interactive(&self) -> bool;

    /// A yes/no question. `default_yes` is the answer taken for empty input.
    fn confirm(&self, message: &str, default_yes: bool) -> bool;

    /// A free-form question. Returns the trimmed answer; empty means the
    /// user declined.
    fn ask(&self, message: &str) -> String;
}

/// Prompter for a human on a terminal. Questions go to stderr so stdout
/// stays clean for command output.
pub struct Terminal;

impl Prompt for Terminal {
    fn is_interactive(&self) -> bool {
        true
    }

    fn confirm(&self, message: &str, default_yes: bool) -> bool {
        let suffix = if default_yes { "[Y/n]" } else { "[y/N]" };
        loop {
            eprint!("{message} {suffix}: ");
            let _ = io::stderr().flush();

            let mut input = String::new();
            if io::stdin().read_line(&mut input).is_err() {
                return default_yes;
            }
            match input.trim().to_lowercase().as_str() {
                "" => return default_yes,
                "y" | "yes" => return true,
                "n" | "no" => return false,
                _ => continue,
            }
        }
    }

    fn ask(&self, message: &str) -> String {
        eprint!("{message}: ");
        let _ = io::stderr().flush();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            return String::new();
        }
        input.trim().to_string()
    }
}

/// Prompter for non-interactive contexts: every confirmation is a yes,
/// every open question goes unanswered.
pub struct AutoConfirm;

impl Prompt for AutoConfirm {
    fn is_interactive(&self) -> bool {
        false
    }

    fn confirm(&self, _message: &str, _default_yes: bool) -> bool {
        true
    }

    fn ask(&self, _message: &str) -> String {
        String::new()
    }
}

/// Pick the prompter for this process.
pub fn default_prompter() -> Box<dyn Prompt> {
    if io::stdin().is_terminal() {
        Box::new(Terminal)
    } else {
        Box::new(AutoConfirm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_confirm_always_yes() {
        assert!(AutoConfirm.confirm("overwrite?", true));
        assert!(AutoConfirm.confirm("overwrite?", false));
    }

    #[test]
    fn test_auto_confirm_declines_open_questions() {
        assert_eq!(AutoConfirm.ask("which venv?"), "");
        assert!(!AutoConfirm.is_interactive());
    }
}
