//! Terminal output utilities

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tabled::settings::Style as TableStyle;
use tabled::{Table, Tabled};

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", style("✔").green().bold(), msg);
}

/// Print a success message tagged with a product label
pub fn labeled_success(label: &str, msg: &str) {
    println!("{} {}", style(format!("✔  {}:", label)).green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✖").red().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Print a warning message tagged with a label
pub fn labeled_warning(label: &str, msg: &str) {
    eprintln!("{} {}", style(format!("⚠  {}:", label)).yellow().bold(), msg);
}

/// Print a bullet
pub fn bullet(msg: &str) {
    println!("{} {}", style("i ").cyan().bold(), msg);
}

/// Print a bullet tagged with a label
pub fn labeled_bullet(label: &str, msg: &str) {
    println!("{} {}", style(format!("i  {}:", label)).cyan().bold(), msg);
}

/// Print a plain line
pub fn line(msg: &str) {
    println!("{}", msg);
}

/// Print a value as pretty JSON
pub fn json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render rows as a rounded table
pub fn table<T: Tabled>(rows: &[T]) -> String {
    Table::new(rows).with(TableStyle::rounded()).to_string()
}

/// Render `**bold**` spans of a markdown line for the terminal
pub fn markdown(text: &str) -> String {
    text.split("**")
        .enumerate()
        .map(|(i, part)| {
            if i % 2 == 1 {
                style(part).bold().to_string()
            } else {
                part.to_string()
            }
        })
        .collect()
}

/// Create a spinner
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let template = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(template.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Stop a spinner and keep its message as a success line
pub fn spinner_succeed(pb: &ProgressBar) {
    pb.finish_and_clear();
    success(&pb.message());
}

/// Stop a spinner and keep its message as an error line
pub fn spinner_fail(pb: &ProgressBar) {
    pb.finish_and_clear();
    error(&pb.message());
}
