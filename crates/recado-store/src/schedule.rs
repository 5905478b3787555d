use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use recado_core::types::ScheduleEntry;
use tracing::warn;

use crate::atomic::replace_file;
use crate::error::Result;

/// File-backed repository for the single schedule slot (`schedule.json`).
///
/// The interactive program writes the slot, the daemon reads it and
/// eventually flips it inactive. There is no lock between the two: writes are
/// atomic replaces and the last writer wins, which is acceptable for a
/// single-slot store (see DESIGN.md).
pub struct ScheduleStore {
    path: PathBuf,
}

impl ScheduleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the slot. Missing file is an empty slot; a malformed file is
    /// logged and treated as empty. Never an error to the caller.
    pub fn load(&self) -> Option<ScheduleEntry> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), "schedule read failed: {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(path = %self.path.display(), "schedule file is malformed, ignoring: {e}");
                None
            }
        }
    }

    /// Overwrite the slot unconditionally with an atomic replace.
    pub fn save(&self, entry: &ScheduleEntry) -> Result<()> {
        let json = serde_json::to_string_pretty(entry)?;
        replace_file(&self.path, &json)?;
        Ok(())
    }

    /// Mark the slot no longer eligible to fire.
    ///
    /// Returns `Ok(false)` when no entry exists. Idempotent: an already
    /// inactive entry is left untouched. A save racing between our load and
    /// our write is overwritten (last-writer-wins, see DESIGN.md).
    pub fn deactivate(&self) -> Result<bool> {
        let Some(mut entry) = self.load() else {
            return Ok(false);
        };
        if entry.active {
            entry.active = false;
            self.save(&entry)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> ScheduleEntry {
        ScheduleEntry {
            recipient: "+56911112222".to_string(),
            body: "hi".to_string(),
            day: 1,
            month: 6,
            year: 2025,
            hour: 9,
            minute: 0,
            active: true,
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> ScheduleStore {
        ScheduleStore::new(dir.path().join("schedule.json"))
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save(&entry()).unwrap();
        assert_eq!(store.load(), Some(entry()));
    }

    #[test]
    fn missing_file_is_an_empty_slot() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(store_in(&dir).load(), None);
    }

    #[test]
    fn malformed_file_is_an_empty_slot() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = store_in(&dir);

        fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn deactivate_flips_active_and_is_idempotent() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&entry()).unwrap();

        assert!(store.deactivate().unwrap());
        assert!(!store.load().unwrap().active);

        // Second call leaves the already-inactive entry untouched.
        assert!(store.deactivate().unwrap());
        assert!(!store.load().unwrap().active);
    }

    #[test]
    fn deactivate_on_empty_slot_is_a_noop() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(!store.deactivate().unwrap());
        assert!(store.load().is_none());
    }

    #[test]
    fn save_overwrites_the_single_slot() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&entry()).unwrap();

        let mut replacement = entry();
        replacement.body = "new plan".to_string();
        replacement.hour = 10;
        store.save(&replacement).unwrap();

        assert_eq!(store.load(), Some(replacement));
    }
}
