//! Download progress bars.

use indicatif::{ProgressBar, ProgressStyle};

const DOWNLOAD_TEMPLATE: &str =
    "{msg} [{bar:30.magenta/dim}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const DOWNLOAD_UNKNOWN_TEMPLATE: &str = "{spinner:.magenta} {msg} {bytes} ({bytes_per_sec})";

/// Byte progress bar for a download of `len` bytes (or unknown length).
///
/// Returns a hidden bar when `show` is false, so callers can wrap readers
/// unconditionally.
pub fn download_bar(len: Option<u64>, label: &str, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }

    let bar = match len {
        Some(len) => {
            let bar = ProgressBar::new(len);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template(DOWNLOAD_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template(DOWNLOAD_UNKNOWN_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar
        }
    };
    bar.set_message(short_label(label));
    bar
}

/// Last path segment of a URL, for compact progress labels.
fn short_label(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .to_string()
}
