//! Report structures, formatters and progress display

pub mod formatter;
pub mod report;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for one stage; hidden when `visible` is false
pub fn progress_bar(len: usize, prefix: &'static str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(len as u64).with_prefix(prefix);
    if let Ok(style) = ProgressStyle::with_template("{prefix:>18} [{bar:30}] {pos}/{len} {wide_msg}") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}
