//! JSONL file writer for vote audit events.
//!
//! Each [`AuditEvent`] is serialized as a single JSON line with a
//! `type` field and `timestamp`, appended to the file via a buffered writer.

use panicbot_application::{AuditEvent, AuditLog};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Append-only JSONL audit log.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every record and on `Drop`.
pub struct JsonlAuditLog {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlAuditLog {
    /// Open (or create) the log at `path`, appending to existing content.
    ///
    /// Creates parent directories as needed. Returns `None` if the file
    /// cannot be opened; the bot then runs without an audit trail.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create audit log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open audit log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn to_record(event: AuditEvent) -> serde_json::Value {
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

    if let serde_json::Value::Object(mut map) = event.payload {
        map.insert(
            "type".to_string(),
            serde_json::Value::String(event.event_type.to_string()),
        );
        map.insert(
            "timestamp".to_string(),
            serde_json::Value::String(timestamp),
        );
        serde_json::Value::Object(map)
    } else {
        serde_json::json!({
            "type": event.event_type,
            "timestamp": timestamp,
            "data": event.payload,
        })
    }
}

impl AuditLog for JsonlAuditLog {
    fn record(&self, event: AuditEvent) {
        let Ok(line) = serde_json::to_string(&to_record(event)) else {
            return;
        };

        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            warn!(path = %self.path.display(), error = %e, "Failed to write audit event");
        }
    }
}

impl Drop for JsonlAuditLog {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
