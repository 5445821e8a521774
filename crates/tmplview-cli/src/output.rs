//! Terminal output formatting for the tmplview CLI.
//!
//! Status lines go to stderr so rendered views on stdout stay clean.

use console::style;

/// Section title for a command, underlined to its own width.
pub fn print_header(text: &str) {
    eprintln!("\n{}", style(text).bold().cyan());
    eprintln!("{}", style("=".repeat(text.len())).dim());
}

pub fn print_success(text: &str) {
    eprintln!("{} {}", style("[OK]").green().bold(), text);
}

/// Used by `main` for the final error chain before exiting non-zero.
pub fn print_error(text: &str) {
    eprintln!("{} {}", style("[ERROR]").red().bold(), text);
}

/// `[step/total] text`, e.g. `[1/2] Without cache`.
pub fn print_step(step: u32, total: u32, text: &str) {
    eprintln!("{} {}", style(format!("[{step}/{total}]")).dim(), text);
}

/// Indented `key: value` line for bench settings and results.
pub fn print_key_value(key: &str, value: &str) {
    eprintln!("  {}: {}", style(key).dim(), value);
}
