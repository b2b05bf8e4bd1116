//! Terminal feedback while a captured command runs.
//!
//! Log lines go to stdout through `tracing`; the spinner lives on stderr and
//! is only drawn when stderr is a terminal.  Inside a container it stays
//! hidden, so job logs contain nothing but log lines.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Braille spinner frames, same style as indicatif's default.
static SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create and start an indeterminate spinner for `label`.
///
/// Callers must call [`ProgressBar::finish_and_clear`] before logging again.
pub fn spinner(label: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let template = ProgressStyle::with_template("  {spinner:.cyan}  {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(template.tick_chars(SPINNER_CHARS));
    pb.set_message(format!("{}", style(label).dim()));
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
