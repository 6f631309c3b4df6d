use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

/// Print success: "  + {msg}" in green
pub fn success(msg: &str) {
    println!("  {} {}", "+".green(), msg.green());
}

/// Print info: "  {msg}" in dimmed
pub fn info(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print warning: "  ! {msg}" in yellow
pub fn warn(msg: &str) {
    println!("  {} {}", "!".yellow(), msg.yellow());
}

/// Print error: "  x {msg}" in red
pub fn error(msg: &str) {
    eprintln!("  {} {}", "x".red(), msg.red());
}

/// Print a tx hash: "  label: hash" with hash in cyan
pub fn tx_hash(label: &str, hash: &str) {
    println!("  {}: {}", label.dimmed(), hash.cyan());
}

/// Print an address: "  label: addr" with addr in cyan
pub fn address(label: &str, addr: &str) {
    println!("  {}: {}", label.dimmed(), addr.cyan());
}

/// Print a key-value pair: "  key: value" with key dimmed
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a section divider: "\n-- title --"
pub fn section(title: &str) {
    println!("\n{} {} {}", "--".dimmed(), title.bold(), "--".dimmed());
}

/// Create a spinner with a message, returns ProgressBar handle.
/// Call `.finish_and_clear()` when done.
pub fn wait_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("  {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["|", "/", "-", "\\", ""]);
    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Format elapsed duration as human-readable
pub fn format_elapsed(start: Instant) -> String {
    let elapsed = start.elapsed();
    if elapsed.as_secs() >= 60 {
        format!(
            "{}m{:.1}s",
            elapsed.as_secs() / 60,
            elapsed.as_secs_f64() % 60.0
        )
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}

/// "Yes"/"No" for boolean table cells
pub fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}
