//! Terminal output styling for the CLI.
//!
//! Sections, status lines, and result markers share one visual language so
//! analyze and export runs read the same. Color is delegated to the
//! `console` crate, which already respects terminal capabilities and
//! NO_COLOR.

use console::style;

const SECTION_PREFIX: &str = "===== ";
const SECTION_SUFFIX: &str = " =====";
const STATUS_INDENT: &str = "  ";

/// Prints a section header.
pub fn print_section(title: &str) {
    println!();
    println!(
        "{}",
        style(format!("{SECTION_PREFIX}{title}{SECTION_SUFFIX}")).bold()
    );
}

/// Prints an indented "Label: value" status line; `emphasize` highlights the
/// value.
pub fn print_status(label: &str, value: &str, emphasize: bool) {
    let rendered = if emphasize {
        style(value.to_string()).green().bold().to_string()
    } else {
        value.to_string()
    };
    println!("{STATUS_INDENT}{}: {rendered}", style(label).dim());
}

/// Prints a success line.
pub fn print_success(message: &str) {
    println!("{STATUS_INDENT}{} {message}", style("✓").green().bold());
}

/// Prints a neutral sub-item line.
pub fn print_subsection(title: &str) {
    println!("{STATUS_INDENT}{}", style(title).bold());
}

/// Prints an error with optional suggestion.
pub fn print_error(title: &str, message: &str, suggestion: Option<&str>) {
    eprintln!("{STATUS_INDENT}{} {}: {message}", style("✗").red().bold(), style(title).red());
    if let Some(suggestion) = suggestion {
        eprintln!("{STATUS_INDENT}  {}", style(suggestion).dim());
    }
}

/// Prints a warning line.
pub fn print_warning(message: &str) {
    println!("{STATUS_INDENT}{} {message}", style("!").yellow().bold());
}
