//! File-list providers: the candidate universe and a reader keyed by path.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Supplies candidate file paths and their contents.
///
/// Paths are relative to the scan root. Whether the list is a full tree walk
/// or a version-control subset is up to the implementor.
pub trait SourceProvider: Sync {
    /// The candidate files.
    fn candidates(&self) -> Vec<PathBuf>;

    /// Reads one candidate as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8.
    fn read(&self, path: &Path) -> io::Result<String>;
}

/// Candidates on disk, relative to a root directory.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
    paths: Vec<PathBuf>,
}

impl FsSource {
    /// Creates a provider for `paths` (relative to `root`).
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, paths: Vec<PathBuf>) -> Self {
        Self {
            root: root.into(),
            paths,
        }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceProvider for FsSource {
    fn candidates(&self) -> Vec<PathBuf> {
        self.paths.clone()
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        let bytes = std::fs::read(self.root.join(path))?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// In-memory candidates, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemorySource {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text file.
    #[must_use]
    pub fn file(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.files.insert(path.into(), text.into().into_bytes());
        self
    }

    /// Adds a file with raw bytes.
    #[must_use]
    pub fn bytes(mut self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), bytes.into());
        self
    }
}

impl SourceProvider for MemorySource {
    fn candidates(&self) -> Vec<PathBuf> {
        self.files.keys().cloned().collect()
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        let bytes = self
            .files
            .get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))?;
        String::from_utf8(bytes.clone()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_reads_text() {
        let source = MemorySource::new().file("a.py", "print(1)");
        assert_eq!(source.candidates(), vec![PathBuf::from("a.py")]);
        assert_eq!(source.read(Path::new("a.py")).unwrap(), "print(1)");
    }

    #[test]
    fn memory_source_rejects_binary() {
        let source = MemorySource::new().bytes("blob.bin", vec![0xff, 0xfe, 0x00]);
        let err = source.read(Path::new("blob.bin")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn memory_source_missing_file() {
        let err = MemorySource::new().read(Path::new("nope")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
