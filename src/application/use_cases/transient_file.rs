use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// A uniquely named local copy of an uploaded blob.
///
/// Dropping the guard deletes the file and then the containing directory if
/// nothing else is left in it, on every exit path.
pub struct TransientFile {
    /// Only `None` once `drop` has closed it.
    file: Option<NamedTempFile>,
    path: PathBuf,
    dir: PathBuf,
}

impl TransientFile {
    pub fn create(dir: &Path, file_name: &str, bytes: &[u8]) -> io::Result<Self> {
        let mut file = Self::create_in(dir, file_name)?;
        file.write_all(bytes)?;
        file.flush()?;

        debug!("Staged {} bytes at {}", bytes.len(), file.path().display());

        Ok(Self {
            path: file.path().to_path_buf(),
            file: Some(file),
            dir: dir.to_path_buf(),
        })
    }

    fn create_in(dir: &Path, file_name: &str) -> io::Result<NamedTempFile> {
        let suffix = format!("-{}", file_name);
        let attempt = || {
            tempfile::Builder::new()
                .prefix("upload-")
                .suffix(&suffix)
                .tempfile_in(dir)
        };

        fs::create_dir_all(dir)?;
        match attempt() {
            // Another guard may have removed the shared directory in between.
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(dir)?;
                attempt()
            }
            other => other,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TransientFile {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(e) = file.close() {
                warn!("Failed to remove transient file {}: {}", self.path.display(), e);
            }
        }

        let is_empty = fs::read_dir(&self.dir)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if is_empty {
            if let Err(e) = fs::remove_dir(&self.dir) {
                debug!(
                    "Upload directory {} not removed: {}",
                    self.dir.display(),
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_removes_file_and_empty_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("uploads");

        let staged = TransientFile::create(&dir, "report.pdf", b"%PDF-1.4").unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.4");
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap()
            .ends_with("-report.pdf"));

        drop(staged);

        assert!(!path.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn path_points_at_the_staged_file() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("uploads");

        let staged = TransientFile::create(&dir, "notes.md", b"# notes").unwrap();

        assert!(staged.path().is_file());
        assert_ne!(staged.path(), dir.as_path());
        assert_eq!(staged.path().parent(), Some(dir.as_path()));
    }

    #[test]
    fn directory_kept_while_other_files_remain() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("uploads");

        let first = TransientFile::create(&dir, "a.txt", b"a").unwrap();
        let second = TransientFile::create(&dir, "a.txt", b"b").unwrap();
        assert_ne!(first.path(), second.path());

        drop(first);
        assert!(dir.exists());

        drop(second);
        assert!(!dir.exists());
    }
}
