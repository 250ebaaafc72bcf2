use std::fs::{File, OpenOptions};
use std::io::Write;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::warn;

/// How much of each page body the message log keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLogMode {
    /// Full response bodies.
    Full,
    /// Body length only.
    Summary,
}

/// Appends one NDJSON line per HTTP request and response.
pub(crate) struct MessageLogger {
    mode: MessageLogMode,
    file: File,
}

impl MessageLogger {
    pub fn new(mode: MessageLogMode, path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { mode, file })
    }

    pub fn log_request(&mut self, method: &str, path: &str) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "req",
            "method": method,
            "path": path,
        });
        self.write_line(&entry);
    }

    pub fn log_response(&mut self, method: &str, path: &str, status: u16, body: &str) {
        let mut entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "resp",
            "method": method,
            "path": path,
            "status": status,
        });
        match self.mode {
            MessageLogMode::Full => entry["body"] = Value::from(body),
            MessageLogMode::Summary => entry["len"] = Value::from(body.len()),
        }
        self.write_line(&entry);
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write log entry: {e}");
        }
    }
}
