//! Streaming downloads to a file with progress reporting.
//!
//! The backend streams the body into a [`ChunkSink`]; [`FileSink`] writes
//! it to the target file and reports to a [`DownloadListener`]:
//! `on_create` once with the announced size, throttled `on_progress`
//! percentages, then a final `on_progress(100.0)` followed by `on_done`.
//! On failure the partial file is removed and `on_error` fires instead.

mod throttle;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use lvhttp_core::{RequestError, RequestResult};

pub use throttle::{DEFAULT_PROGRESS_INTERVAL, ProgressThrottle};

/// Where a download is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub dir: PathBuf,
    pub file_name: String,
}

impl DownloadTarget {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
        }
    }

    /// Full path of the downloaded file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Observer for a single download.
#[cfg_attr(test, mockall::automock)]
pub trait DownloadListener: Send + Sync {
    /// The response arrived; `total_bytes` is the announced length, if any.
    fn on_create(&self, total_bytes: Option<u64>);

    /// Percentage of the announced length written so far.
    fn on_progress(&self, percent: f32);

    fn on_error(&self, error: &RequestError);

    fn on_done(&self, path: &Path);
}

/// Listener that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl DownloadListener for NoopListener {
    fn on_create(&self, _total_bytes: Option<u64>) {}
    fn on_progress(&self, _percent: f32) {}
    fn on_error(&self, _error: &RequestError) {}
    fn on_done(&self, _path: &Path) {}
}

/// Destination for a streamed response body.
pub trait ChunkSink: Send {
    /// Called once before the first chunk.
    fn begin(&mut self, total_bytes: Option<u64>) -> RequestResult<()>;

    fn write_chunk(&mut self, chunk: &[u8]) -> RequestResult<()>;
}

/// Writes a download to disk and reports progress.
pub(crate) struct FileSink<'a> {
    path: PathBuf,
    file: Option<File>,
    total: Option<u64>,
    written: u64,
    throttle: ProgressThrottle,
    listener: &'a dyn DownloadListener,
}

impl<'a> FileSink<'a> {
    pub(crate) fn new(
        target: &DownloadTarget,
        listener: &'a dyn DownloadListener,
        throttle: ProgressThrottle,
    ) -> Self {
        Self {
            path: target.path(),
            file: None,
            total: None,
            written: 0,
            throttle,
            listener,
        }
    }

    #[allow(clippy::cast_precision_loss)] // percentages only need f32 precision
    fn percent(&self) -> Option<f32> {
        match self.total {
            Some(total) if total > 0 => {
                Some((self.written as f32 / total as f32 * 100.0).min(100.0))
            }
            _ => None,
        }
    }

    /// Flush the file and report completion progress.
    pub(crate) fn finish(mut self) -> RequestResult<PathBuf> {
        let mut file = match self.file.take() {
            Some(file) => file,
            None => create_file(&self.path)?,
        };
        file.flush().map_err(|e| RequestError::from_io_error(&e))?;
        self.listener.on_progress(100.0);
        tracing::debug!(path = %self.path.display(), bytes = self.written, "Download complete");
        Ok(self.path)
    }

    /// Drop the partial file.
    pub(crate) fn abort(mut self) {
        if self.file.take().is_some() {
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove partial download");
            }
        }
    }
}

impl ChunkSink for FileSink<'_> {
    fn begin(&mut self, total_bytes: Option<u64>) -> RequestResult<()> {
        self.file = Some(create_file(&self.path)?);
        self.total = total_bytes;
        self.listener.on_create(total_bytes);
        Ok(())
    }

    fn write_chunk(&mut self, chunk: &[u8]) -> RequestResult<()> {
        let file = match self.file.as_mut() {
            Some(file) => file,
            None => {
                return Err(RequestError::other("chunk written before download began"));
            }
        };
        file.write_all(chunk)
            .map_err(|e| RequestError::from_io_error(&e))?;
        self.written += chunk.len() as u64;

        if let Some(percent) = self.percent() {
            if self.throttle.admit(percent) {
                self.listener.on_progress(percent);
            }
        }
        Ok(())
    }
}

fn create_file(path: &Path) -> RequestResult<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| RequestError::from_io_error(&e))?;
    }
    File::create(path).map_err(|e| RequestError::from_io_error(&e))
}
