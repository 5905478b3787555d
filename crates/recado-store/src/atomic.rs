use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Replace `path` atomically: write a temp sibling, then rename it over the
/// target. A concurrent reader observes either the old or the new content,
/// never a truncated file.
pub(crate) fn replace_file(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = staging_path(path);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

// Per-process staging name: the interactive program and the daemon may write
// the same file concurrently.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}.tmp", std::process::id()));
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_creates_parents_and_leaves_no_staging_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("slot.json");

        replace_file(&path, "{}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn replace_overwrites_existing_content() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("slot.json");

        replace_file(&path, "old").unwrap();
        replace_file(&path, "new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }
}
