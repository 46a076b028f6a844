use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

pub fn print_success(message: &str) {
    println!("{} {}", "✅".green(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "❌".red(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠️".yellow(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ️".blue(), message);
}

/// A section-count spinner for the `build` command, updated once per
/// flush rather than per section so it doesn't contend with `tracing`'s
/// stderr output.
pub fn build_spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar
}
