use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{RecadoError, Result};

/// Timestamp format used in history records (local wall clock).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The single persisted pending job.
///
/// At most one entry exists at a time; scheduling again overwrites the slot.
/// The interactive program creates it with `active = true`, the daemon flips
/// `active` to `false` once the entry has fired or its window was missed. The
/// entry is never deleted, only deactivated in place.
///
/// Serialized field names match the on-disk `schedule.json` layout (`body`
/// is stored as `message`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub recipient: String,
    #[serde(rename = "message")]
    pub body: String,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub hour: u32,
    pub minute: u32,
    pub active: bool,
}

impl ScheduleEntry {
    pub fn new(
        recipient: impl Into<String>,
        body: impl Into<String>,
        date: NaiveDate,
        hour: u32,
        minute: u32,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            body: body.into(),
            day: date.day(),
            month: date.month(),
            year: date.year(),
            hour,
            minute,
            active: true,
        }
    }

    /// Resolve the five date/time integers into the target moment.
    ///
    /// Returns `None` for an impossible calendar date (e.g. February 30th)
    /// or an out-of-range hour/minute.
    pub fn target(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?
            .and_hms_opt(self.hour, self.minute, 0)
    }

    /// Check the data-model invariants the daemon must not fire without:
    /// non-empty recipient and body, and a resolvable target moment.
    ///
    /// Whether the moment lies in the future is deliberately not checked
    /// here: a past target is the missed-window case, not a malformed one.
    pub fn validate(&self) -> Result<()> {
        if self.recipient.trim().is_empty() {
            return Err(RecadoError::InvalidEntry("recipient is empty".into()));
        }
        if self.body.trim().is_empty() {
            return Err(RecadoError::InvalidEntry("message is empty".into()));
        }
        if self.target().is_none() {
            return Err(RecadoError::InvalidEntry(format!(
                "{:04}-{:02}-{:02} {:02}:{:02} is not a valid moment",
                self.year, self.month, self.day, self.hour, self.minute
            )));
        }
        Ok(())
    }

    /// True when `other` describes the same slot contents, ignoring `active`.
    ///
    /// The engine uses this to recognise an entry it has already fired while
    /// the deactivation write is still pending.
    pub fn same_slot(&self, other: &ScheduleEntry) -> bool {
        self.recipient == other.recipient
            && self.body == other.body
            && (self.year, self.month, self.day) == (other.year, other.month, other.day)
            && (self.hour, self.minute) == (other.hour, other.minute)
    }

    /// Human-readable target moment for logs and notifications.
    pub fn target_display(&self) -> String {
        format!(
            "{:04}-{:02}-{:02} {:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        )
    }
}

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendStatus {
    Success,
    Failed,
}

impl std::fmt::Display for SendStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendStatus::Success => write!(f, "Success"),
            SendStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// One line of the append-only execution history.
///
/// Serialized field names match the on-disk `send_history.json` layout
/// (`recipient` is stored as `number`, `body` as `message`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: String,
    #[serde(rename = "number")]
    pub recipient: String,
    #[serde(rename = "message")]
    pub body: String,
    pub status: SendStatus,
    #[serde(default)]
    pub error: String,
}

impl HistoryRecord {
    pub fn success(recipient: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            recipient: recipient.into(),
            body: body.into(),
            status: SendStatus::Success,
            error: String::new(),
        }
    }

    pub fn failure(
        recipient: impl Into<String>,
        body: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            recipient: recipient.into(),
            body: body.into(),
            status: SendStatus::Failed,
            error: reason.into(),
        }
    }
}

/// What the daemon does with an active entry whose target minute has already
/// passed without the engine ever arming it (daemon was down, or started
/// after the moment).
///
/// Either way the entry is deactivated without firing; a missed window is
/// never retried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissedWindowPolicy {
    /// Log a warning and emit a notification before deactivating.
    #[default]
    Warn,
    /// Deactivate quietly.
    Silent,
}
