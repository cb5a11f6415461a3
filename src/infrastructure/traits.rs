//! I/O boundary traits for testability
//!
//! Services talk to the disk through [`FileSystem`] so they can be tested
//! against a temp directory or an in-memory double.

use std::io;
use std::path::Path;

use tempfile::NamedTempFile;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace the file with `content`, creating parent directories.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    /// Writes to a temp file next to `path` and renames it over the target,
    /// so readers never see a half-written outline.
    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        io::Write::write_all(&mut tmp, content.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_missing_parent_dirs_when_writing_then_creates_them() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a/b/outline.toml");

        RealFileSystem.write(&path, "x = 1\n").unwrap();

        assert!(RealFileSystem.exists(&path));
        assert_eq!(RealFileSystem.read_to_string(&path).unwrap(), "x = 1\n");
    }

    #[test]
    fn given_existing_file_when_writing_then_replaces_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("outline.toml");
        RealFileSystem.write(&path, "old").unwrap();

        RealFileSystem.write(&path, "new").unwrap();

        assert_eq!(RealFileSystem.read_to_string(&path).unwrap(), "new");
        // no temp files left behind
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 1);
    }
}
