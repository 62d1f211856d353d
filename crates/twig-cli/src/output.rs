//! Terminal output formatting utilities.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally. Call once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Print an error message (always prints to stderr).
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a warning message (always prints to stderr).
pub fn warn(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an info message (suppressed in quiet mode).
pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "→".blue(), msg);
    }
}

/// Print a detail line without prefix (suppressed in quiet mode).
///
/// Use for indented lines that accompany a success or info message.
pub fn detail(msg: &str) {
    if !is_quiet() {
        println!("{msg}");
    }
}

/// Print essential machine-readable output (always prints).
///
/// Use for step results a script reader pipes elsewhere, like history lines.
pub fn essential(msg: &str) {
    println!("{msg}");
}

/// Format a commit id for display.
#[must_use]
pub fn commit_id(id: &str) -> String {
    id.yellow().to_string()
}

/// Format a repository name for display.
#[must_use]
pub fn repo_name(name: &str) -> String {
    format!("'{}'", name.cyan().bold())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatters_color_when_forced() {
        colored::control::set_override(true);
        assert_eq!(commit_id("7"), "7".yellow().to_string());
        assert_eq!(repo_name("main"), format!("'{}'", "main".cyan().bold()));
        colored::control::set_override(false);
    }
}
