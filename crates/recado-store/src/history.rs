use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use recado_core::types::HistoryRecord;
use tracing::warn;

use crate::atomic::replace_file;
use crate::error::Result;

/// Append-only execution history (`send_history.json`), oldest first.
///
/// Both the interactive program (test sends) and the daemon (scheduled sends)
/// append here. `append` is a read-modify-write of the whole array: two
/// writers racing can lose one append, but the atomic replace guarantees the
/// file itself is never corrupted. Accepted limitation of a best-effort log
/// (see DESIGN.md).
pub struct HistoryLedger {
    path: PathBuf,
}

impl HistoryLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full ledger. Missing or unreadable file is an empty ledger.
    pub fn load(&self) -> Vec<HistoryRecord> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), "history read failed: {e}");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(path = %self.path.display(), "history file is malformed, ignoring: {e}");
                Vec::new()
            }
        }
    }

    /// Append one record and persist the full sequence atomically.
    pub fn append(&self, record: HistoryRecord) -> Result<()> {
        let mut records = self.load();
        records.push(record);
        let json = serde_json::to_string_pretty(&records)?;
        replace_file(&self.path, &json)?;
        Ok(())
    }

    /// The last `n` records, in insertion order.
    pub fn recent(&self, n: usize) -> Vec<HistoryRecord> {
        let records = self.load();
        let skip = records.len().saturating_sub(n);
        records.into_iter().skip(skip).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_in(dir: &tempfile::TempDir) -> HistoryLedger {
        HistoryLedger::new(dir.path().join("send_history.json"))
    }

    fn record(i: usize) -> HistoryRecord {
        HistoryRecord::success("+56911112222", format!("message {i}"))
    }

    #[test]
    fn appends_accumulate_in_call_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let ledger = ledger_in(&dir);

        for i in 0..4 {
            ledger.append(record(i)).unwrap();
        }

        let all = ledger.load();
        assert_eq!(all.len(), 4);
        let bodies: Vec<_> = all.iter().map(|r| r.body.as_str()).collect();
        assert_eq!(bodies, ["message 0", "message 1", "message 2", "message 3"]);
    }

    #[test]
    fn recent_returns_the_tail_in_insertion_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let ledger = ledger_in(&dir);
        for i in 0..5 {
            ledger.append(record(i)).unwrap();
        }

        let tail = ledger.recent(2);
        let bodies: Vec<_> = tail.iter().map(|r| r.body.as_str()).collect();
        assert_eq!(bodies, ["message 3", "message 4"]);
    }

    #[test]
    fn recent_with_large_n_returns_everything() {
        let dir = tempfile::TempDir::new().unwrap();
        let ledger = ledger_in(&dir);
        ledger.append(record(0)).unwrap();

        assert_eq!(ledger.recent(100).len(), 1);
    }

    #[test]
    fn missing_file_is_an_empty_ledger() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(ledger_in(&dir).load().is_empty());
        assert!(ledger_in(&dir).recent(3).is_empty());
    }

    #[test]
    fn malformed_file_is_treated_as_empty_and_recovered_on_append() {
        let dir = tempfile::TempDir::new().unwrap();
        let ledger = ledger_in(&dir);

        fs::write(ledger.path(), "[{broken").unwrap();
        assert!(ledger.load().is_empty());

        ledger.append(record(0)).unwrap();
        assert_eq!(ledger.load().len(), 1);
    }
}
