//! Core traits for backing sources.

use crate::entry::ArchiveEntry;
use crate::error::{Result, VaultError};

/// A backing source that lists entries and extracts their decompressed bytes.
///
/// Implementations serialize reads internally, so extraction takes `&self`
/// and one source can be shared across threads.
pub trait ContainerReader: Send + Sync {
    /// Short description of the source, used in logs.
    fn label(&self) -> &str;

    /// All entries in source order.
    fn entries(&self) -> &[ArchiveEntry];

    /// Extract and decompress one entry.
    fn extract(&self, entry: &ArchiveEntry) -> Result<Vec<u8>>;

    /// Find an entry by path, ignoring ASCII case.
    fn entry_by_path(&self, path: &str) -> Option<&ArchiveEntry> {
        self.entries()
            .iter()
            .find(|e| e.virtual_path.eq_ignore_ascii_case(path))
    }

    /// Extract an entry by path.
    fn extract_by_path(&self, path: &str) -> Result<Vec<u8>> {
        let entry = self
            .entry_by_path(path)
            .ok_or_else(|| VaultError::entry_not_found(path))?;
        self.extract(entry)
    }
}
