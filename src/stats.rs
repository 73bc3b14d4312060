use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::gesture::GestureLabel;

/// Counters for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub frames: u64,
    pub hand_absent: u64,
    pub malformed: u64,
    pub busy: u64,
    pub dropped_frames: u64,
    /// Sent emissions per wire token.
    pub sent: BTreeMap<String, u64>,
}

impl SessionStats {
    pub fn record_sent(&mut self, label: GestureLabel) {
        if let Some(token) = label.token() {
            *self.sent.entry(token.to_string()).or_default() += 1;
        }
    }

    pub fn total_sent(&self) -> u64 {
        self.sent.values().sum()
    }

    pub fn summary(&self) -> String {
        let per_token = self
            .sent
            .iter()
            .map(|(token, n)| format!("{token}={n}"))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "{} frames ({} without hand, {} malformed, {} dropped), {} sent [{}], {} busy",
            self.frames,
            self.hand_absent,
            self.malformed,
            self.dropped_frames,
            self.total_sent(),
            per_token,
            self.busy,
        )
    }
}

/// A finished session with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub ended_at: String,
    pub end_reason: String,
    pub stats: SessionStats,
}

/// Persistent session history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
}

impl History {
    /// Directory: ~/.local/share/gesture-link/
    fn dir() -> PathBuf {
        let mut p = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("gesture-link");
        p
    }

    pub fn default_path() -> PathBuf {
        Self::dir().join("sessions.json")
    }

    /// Load from disk, returning defaults if missing.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Persist to disk.
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    pub fn record_session(&mut self, end_reason: &str, stats: SessionStats) {
        self.sessions.push(SessionRecord {
            ended_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            end_reason: end_reason.to_string(),
            stats,
        });
    }
}
