//! Log sinks: where rendered log lines end up.

use rag_twin_shared::{ErrorCode, RagError, Result};
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Rotate once the active file would exceed this many bytes.
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;
/// Number of rotated files kept next to the active one.
pub const DEFAULT_BACKUP_COUNT: usize = 5;

/// A sink that receives pre-formatted log lines.
pub trait LogSink: Send + Sync {
    /// Write a line to the sink.
    fn write_line(&self, line: &str);
}

/// Log sink that writes to stderr.
#[derive(Debug, Default)]
pub struct StderrLogSink;

impl LogSink for StderrLogSink {
    fn write_line(&self, line: &str) {
        let mut stderr = std::io::stderr().lock();
        if let Err(error) = stderr.write_all(line.as_bytes()) {
            eprintln!("log sink write failed: {error}");
        }
    }
}

/// Fans every line out to several sinks, in order.
#[derive(Clone, Default)]
pub struct TeeLogSink {
    sinks: Vec<Arc<dyn LogSink>>,
}

impl TeeLogSink {
    /// Build a tee over `sinks`.
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn LogSink>>) -> Self {
        Self { sinks }
    }

    /// Append another sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of downstream sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// True when no downstream sink is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl LogSink for TeeLogSink {
    fn write_line(&self, line: &str) {
        for sink in &self.sinks {
            sink.write_line(line);
        }
    }
}

/// Size-rotated log file.
///
/// When a write would push the active file past `max_bytes`, the file is
/// renamed to `<name>.1`, older backups shift up by one, and anything beyond
/// `<name>.<backup_count>` is removed. Rotation is disabled when either
/// limit is zero. Writes and rotation happen under one lock.
#[derive(Debug)]
pub struct RotatingFileLogSink {
    path: PathBuf,
    max_bytes: u64,
    backup_count: usize,
    state: Mutex<ActiveFile>,
}

#[derive(Debug)]
struct ActiveFile {
    file: File,
    written: u64,
}

impl RotatingFileLogSink {
    /// Open `path` for appending with the default limits.
    /// Parent directories are created as needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_limits(path, DEFAULT_MAX_BYTES, DEFAULT_BACKUP_COUNT)
    }

    /// Open `path` for appending with explicit rotation limits.
    pub fn with_limits(
        path: impl Into<PathBuf>,
        max_bytes: u64,
        backup_count: usize,
    ) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|error| sink_error(parent, error))?;
        }
        let state = ActiveFile::open(&path, false).map_err(|error| sink_error(&path, error))?;
        Ok(Self {
            path,
            max_bytes,
            backup_count,
            state: Mutex::new(state),
        })
    }

    /// Path of the active log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the `index`-th rotated file (`<name>.<index>`).
    #[must_use]
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    const fn rotation_enabled(&self) -> bool {
        self.max_bytes > 0 && self.backup_count > 0
    }

    fn rotate(&self, state: &mut ActiveFile) -> std::io::Result<()> {
        state.file.flush()?;
        let oldest = self.backup_path(self.backup_count);
        if oldest.exists() {
            std::fs::remove_file(&oldest)?;
        }
        for index in (1..self.backup_count).rev() {
            let source = self.backup_path(index);
            if source.exists() {
                std::fs::rename(&source, self.backup_path(index + 1))?;
            }
        }
        std::fs::rename(&self.path, self.backup_path(1))?;
        *state = ActiveFile::open(&self.path, true)?;
        Ok(())
    }
}

impl LogSink for RotatingFileLogSink {
    fn write_line(&self, line: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let incoming = u64::try_from(line.len()).unwrap_or(u64::MAX);
        if self.rotation_enabled()
            && state.written > 0
            && state.written.saturating_add(incoming) > self.max_bytes
            && let Err(error) = self.rotate(&mut state)
        {
            eprintln!("log file rotation failed for {}: {error}", self.path.display());
        }
        match state.file.write_all(line.as_bytes()) {
            Ok(()) => state.written = state.written.saturating_add(incoming),
            Err(error) => eprintln!("log file write failed for {}: {error}", self.path.display()),
        }
    }
}

impl ActiveFile {
    fn open(path: &Path, truncate: bool) -> std::io::Result<Self> {
        let file = if truncate {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)?
        } else {
            OpenOptions::new().create(true).append(true).open(path)?
        };
        let written = file.metadata()?.len();
        Ok(Self { file, written })
    }
}

fn sink_error(path: &Path, error: std::io::Error) -> RagError {
    RagError::system(
        format!("Failed to open log file {}: {error}", path.display()),
        ErrorCode::SystemInitializationFailed,
        "logging",
    )
    .with_detail("path", path.display().to_string())
    .with_cause(error)
}
