//! Async DAT container.
//!
//! Same directory handling as [`crate::DatContainer`], with the storage
//! reader behind a `tokio::sync::Mutex` so extraction can be awaited.
//!
//! # Feature Flag
//!
//! Requires the `async` feature:
//!
//! ```toml
//! [dependencies]
//! vaultarc-archive = { version = "0.2", features = ["async"] }
//! ```

use crate::container::decompress;
use crate::detect::{DatLayout, read_directory_async};
use std::path::Path;
use tokio::io::{AsyncRead, AsyncSeek};
use tokio::sync::Mutex;
use tracing::info;
use vaultarc_core::error::{Result, VaultError};
use vaultarc_core::{ArchiveEntry, AsyncStorageReader, Endian, HandleId};

/// A parsed DAT archive read through tokio I/O.
#[derive(Debug)]
pub struct AsyncDatContainer<R = tokio::fs::File> {
    label: String,
    layout: DatLayout,
    entries: Vec<ArchiveEntry>,
    storage: Mutex<AsyncStorageReader<R>>,
}

impl AsyncDatContainer<tokio::fs::File> {
    /// Open a DAT file from disk.
    pub async fn open(path: impl AsRef<Path>, handle: HandleId) -> Result<Self> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path).await?;
        Self::new(path.display().to_string(), file, handle).await
    }
}

impl<R: AsyncRead + AsyncSeek + Unpin> AsyncDatContainer<R> {
    /// Detect the layout of `reader` and parse its directory.
    pub async fn new(label: impl Into<String>, reader: R, handle: HandleId) -> Result<Self> {
        let label = label.into();
        let mut storage = AsyncStorageReader::new(reader, Endian::Little).await?;
        let directory = read_directory_async(&mut storage, handle).await?;

        info!(
            archive = %label,
            layout = directory.layout.name(),
            entries = directory.entries.len(),
            "opened DAT archive"
        );

        Ok(Self {
            label,
            layout: directory.layout,
            entries: directory.entries,
            storage: Mutex::new(storage),
        })
    }

    /// Label used in logs.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Directory layout.
    pub fn layout(&self) -> DatLayout {
        self.layout
    }

    /// All entries in directory order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Find an entry by path, ignoring ASCII case.
    pub fn entry_by_path(&self, path: &str) -> Option<&ArchiveEntry> {
        self.entries
            .iter()
            .find(|e| e.virtual_path.eq_ignore_ascii_case(path))
    }

    /// Extract and decompress one entry.
    pub async fn extract(&self, entry: &ArchiveEntry) -> Result<Vec<u8>> {
        let len = usize::try_from(entry.stored_len()).map_err(|_| {
            VaultError::invalid_header(format!("entry {} is too large", entry.virtual_path))
        })?;
        let raw = {
            let mut storage = self.storage.lock().await;
            storage.read(len, Some(entry.locator.offset)).await?
        };
        decompress(entry, raw)
    }

    /// Extract an entry by path.
    pub async fn extract_by_path(&self, path: &str) -> Result<Vec<u8>> {
        let entry = self
            .entry_by_path(path)
            .ok_or_else(|| VaultError::entry_not_found(path))?;
        self.extract(entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn hello_dat2() -> Vec<u8> {
        let mut data = vec![1, 2, 3, 4];
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&5u32.to_le_bytes());
        data.extend_from_slice(b"hello");
        data.push(0);
        for v in [4u32, 4, 0, 26, 38] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data
    }

    #[tokio::test]
    async fn test_async_extract() {
        let container = AsyncDatContainer::new("mem", Cursor::new(hello_dat2()), HandleId(0))
            .await
            .unwrap();
        assert_eq!(container.layout(), DatLayout::Dat2);
        assert_eq!(container.extract_by_path("hello").await.unwrap(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_async_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("master.dat");
        std::fs::write(&path, hello_dat2()).unwrap();

        let container = AsyncDatContainer::open(&path, HandleId(1)).await.unwrap();
        assert_eq!(container.entries().len(), 1);
        assert!(container.extract_by_path("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_async_invalid() {
        let err = AsyncDatContainer::new("mem", Cursor::new(vec![0u8; 3]), HandleId(0))
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::InvalidContainer { .. }));
    }
}
