// src/automation/log_buffer.rs
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

pub const LOG_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogColor {
    Default,
    Info,
    Success,
    Warning,
    Error,
    Muted,
}

impl LogColor {
    /// Map a backend log level (`success`, `error`, ...) onto a color tag
    pub fn from_level(level: Option<&str>) -> Self {
        match level.map(|l| l.to_lowercase()).as_deref() {
            Some("success") => LogColor::Success,
            Some("error") | Some("failed") => LogColor::Error,
            Some("warning") | Some("warn") => LogColor::Warning,
            Some("info") => LogColor::Info,
            Some("debug") => LogColor::Muted,
            _ => LogColor::Default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: String,
    pub text: String,
    pub color: LogColor,
}

#[derive(Debug, Default)]
struct LogRing {
    next_id: u64,
    entries: VecDeque<LogEntry>,
}

/// Shared, bounded log of the latest automation lines.
///
/// Clones share the same ring, so the simulated engine and the remote
/// poller can append from their own tasks.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    inner: Arc<Mutex<LogRing>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn ring(&self) -> MutexGuard<'_, LogRing> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn append(&self, text: impl Into<String>, color: LogColor) -> LogEntry {
        let text = text.into();
        match color {
            LogColor::Error => error!(target: "automation", "{}", text),
            LogColor::Warning => warn!(target: "automation", "{}", text),
            LogColor::Muted => debug!(target: "automation", "{}", text),
            _ => info!(target: "automation", "{}", text),
        }

        let mut ring = self.ring();
        ring.next_id += 1;
        let entry = LogEntry {
            id: ring.next_id,
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            text,
            color,
        };
        ring.entries.push_back(entry.clone());
        while ring.entries.len() > LOG_CAPACITY {
            ring.entries.pop_front();
        }
        entry
    }

    /// Oldest-first copy of the retained entries
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.ring().entries.iter().cloned().collect()
    }

    /// Entries with an id greater than `after_id`
    pub fn since(&self, after_id: u64) -> Vec<LogEntry> {
        self.ring()
            .entries
            .iter()
            .filter(|entry| entry.id > after_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ring().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.ring().entries.clear();
    }
}
