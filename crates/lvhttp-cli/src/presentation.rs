//! Terminal output helpers.
//!
//! Format-only: payload values come in, text goes out.

use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use lvhttp_client::DownloadListener;
use lvhttp_core::RequestError;
use serde_json::Value;

/// Render an envelope's data for stdout.
///
/// Strings print raw, other values as pretty JSON, missing data as `null`.
pub fn format_data(data: Option<&Value>) -> String {
    match data {
        None | Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

pub fn print_data(data: Option<&Value>) {
    println!("{}", format_data(data));
}

/// Human-readable byte count.
///
/// ```rust
/// use lvhttp_cli::presentation::format_bytes;
///
/// assert_eq!(format_bytes(512), "512 B");
/// assert_eq!(format_bytes(1536), "1.5 KiB");
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.1} {unit}")
}

/// Prints download progress on a single, rewritten line.
pub struct ConsoleProgress<W: Write + Send = io::Stderr> {
    out: Mutex<W>,
}

impl ConsoleProgress {
    pub fn stderr() -> Self {
        Self::with_writer(io::stderr())
    }
}

impl<W: Write + Send> ConsoleProgress<W> {
    pub const fn with_writer(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}

impl<W: Write + Send> DownloadListener for ConsoleProgress<W> {
    fn on_create(&self, total_bytes: Option<u64>) {
        match total_bytes {
            Some(total) => self.write(&format!("Downloading {}\n", format_bytes(total))),
            None => self.write("Downloading (size unknown)\n"),
        }
    }

    fn on_progress(&self, percent: f32) {
        self.write(&format!("\r{percent:>5.1}%"));
    }

    fn on_error(&self, error: &RequestError) {
        tracing::debug!(%error, "Download failed");
        self.write("\n");
    }

    fn on_done(&self, path: &Path) {
        self.write(&format!("\nSaved to {}\n", path.display()));
    }
}
