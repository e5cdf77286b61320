//! Append-only request log: one line to the console, one to a dated file.
//!
//! A single `LogSink` is constructed at startup and handed to the HTTP
//! handlers through `AppState`. Logging never fails the request it is
//! observing: file problems degrade the sink to console-only.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
    Debug,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Debug => "DEBUG",
        }
    }
}

/// One immutable log entry; never read back by the service itself.
#[derive(Debug)]
pub struct LogEntry {
    pub timestamp: String,
    pub severity: Severity,
    pub source: String,
    pub message: String,
    pub duration_ms: Option<u64>,
    pub metadata: Option<serde_json::Value>,
}

pub struct LogSink {
    file: Option<Mutex<File>>,
    path: Option<PathBuf>,
}

impl LogSink {
    /// Open (or create) `<dir>/app-YYYY-MM-DD.log`. The date is fixed at
    /// construction; there is no rotation.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let path = dir.join(format!("app-{}.log", Utc::now().format("%Y-%m-%d")));

        let file = fs::create_dir_all(dir)
            .and_then(|_| OpenOptions::new().create(true).append(true).open(&path))
            .map_err(|e| {
                warn!("Log file unavailable at {}: {} (console only)", path.display(), e);
                e
            })
            .ok();

        match file {
            Some(file) => Self {
                file: Some(Mutex::new(file)),
                path: Some(path),
            },
            None => Self {
                file: None,
                path: None,
            },
        }
    }

    /// Where entries are being appended, if the file could be opened.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(
        &self,
        source: &str,
        message: &str,
        duration_ms: Option<u64>,
        metadata: Option<serde_json::Value>,
    ) {
        self.write(Severity::Info, source, message, duration_ms, metadata);
    }

    pub fn warn(&self, source: &str, message: &str, metadata: Option<serde_json::Value>) {
        self.write(Severity::Warn, source, message, None, metadata);
    }

    /// The upstream error's message, when there is one, is folded into the
    /// entry's metadata under an `error` key.
    pub fn error(
        &self,
        source: &str,
        message: &str,
        cause: Option<&dyn std::fmt::Display>,
        metadata: Option<serde_json::Value>,
    ) {
        let metadata = match (cause, metadata) {
            (Some(cause), Some(serde_json::Value::Object(mut map))) => {
                map.insert("error".into(), serde_json::Value::String(cause.to_string()));
                Some(serde_json::Value::Object(map))
            }
            (Some(cause), other) => {
                let mut map = serde_json::Map::new();
                map.insert("error".into(), serde_json::Value::String(cause.to_string()));
                if let Some(other) = other {
                    map.insert("metadata".into(), other);
                }
                Some(serde_json::Value::Object(map))
            }
            (None, metadata) => metadata,
        };
        self.write(Severity::Error, source, message, None, metadata);
    }

    pub fn debug(&self, source: &str, message: &str, metadata: Option<serde_json::Value>) {
        self.write(Severity::Debug, source, message, None, metadata);
    }

    fn write(
        &self,
        severity: Severity,
        source: &str,
        message: &str,
        duration_ms: Option<u64>,
        metadata: Option<serde_json::Value>,
    ) {
        let entry = LogEntry {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            severity,
            source: source.to_string(),
            message: message.to_string(),
            duration_ms,
            metadata,
        };

        self.console(&entry);

        if let Some(file) = &self.file {
            let line = format_entry(&entry);
            let result = file
                .lock()
                .map_err(|_| {
                    std::io::Error::new(std::io::ErrorKind::Other, "log file mutex poisoned")
                })
                .and_then(|mut f| f.write_all(line.as_bytes()));
            if let Err(e) = result {
                // Swallowed: logging must never fail the observed request.
                warn!("Failed to write to log file: {}", e);
            }
        }
    }

    fn console(&self, entry: &LogEntry) {
        let duration = entry
            .duration_ms
            .map(|d| format!(" ({}ms)", d))
            .unwrap_or_default();
        match entry.severity {
            Severity::Info => info!("[{}] {}{}", entry.source, entry.message, duration),
            Severity::Warn => warn!("[{}] {}{}", entry.source, entry.message, duration),
            Severity::Error => error!("[{}] {}{}", entry.source, entry.message, duration),
            Severity::Debug => debug!("[{}] {}{}", entry.source, entry.message, duration),
        }
    }
}

/// File line format:
/// `[ts] [LEVEL] [Source] message | Duration: Nms | Metadata: {...}`
pub fn format_entry(entry: &LogEntry) -> String {
    let mut line = format!(
        "[{}] [{}] [{}] {}",
        entry.timestamp,
        entry.severity.label(),
        entry.source,
        entry.message
    );

    if let Some(duration) = entry.duration_ms {
        line.push_str(&format!(" | Duration: {}ms", duration));
    }

    if let Some(metadata) = &entry.metadata {
        if metadata.as_object().map_or(true, |m| !m.is_empty()) {
            line.push_str(&format!(" | Metadata: {}", metadata));
        }
    }

    line.push('\n');
    line
}
