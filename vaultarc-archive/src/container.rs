//! Backing sources: DAT containers and loose files.
//!
//! A [`DatContainer`] owns one storage reader behind a mutex. Reads against
//! one container are serialized; separate containers read in parallel.

use crate::detect::{DatLayout, read_directory};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use vaultarc_core::error::{Result, VaultError};
use vaultarc_core::{
    ArchiveEntry, CompressionKind, ContainerReader, HandleId, Locator, StorageReader,
};

/// A parsed DAT archive.
#[derive(Debug)]
pub struct DatContainer<R = BufReader<File>> {
    label: String,
    layout: DatLayout,
    entries: Vec<ArchiveEntry>,
    storage: Mutex<StorageReader<R>>,
}

impl DatContainer<BufReader<File>> {
    /// Open a DAT file from disk.
    pub fn open(path: impl AsRef<Path>, handle: HandleId) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::new(path.display().to_string(), BufReader::new(file), handle)
    }
}

impl<R: Read + Seek> DatContainer<R> {
    /// Detect the layout of `reader` and parse its directory.
    pub fn new(label: impl Into<String>, reader: R, handle: HandleId) -> Result<Self> {
        let label = label.into();
        let mut storage = StorageReader::new(reader, vaultarc_core::Endian::Little)?;
        let directory = read_directory(&mut storage, handle)?;
        storage.set_endian(directory.layout.endian());

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

    /// Directory layout.
    pub fn layout(&self) -> DatLayout {
        self.layout
    }

    /// Size of the archive in bytes.
    pub fn size(&self) -> u64 {
        self.storage.lock().size()
    }

    /// Consume the container, returning its entries.
    pub fn into_entries(self) -> Vec<ArchiveEntry> {
        self.entries
    }

    fn read_raw(&self, entry: &ArchiveEntry) -> Result<Vec<u8>> {
        let len = usize::try_from(entry.stored_len()).map_err(|_| {
            VaultError::invalid_header(format!("entry {} is too large", entry.virtual_path))
        })?;
        let mut storage = self.storage.lock();
        storage.read(len, Some(entry.locator.offset))
    }
}

impl<R: Read + Seek + Send> ContainerReader for DatContainer<R> {
    fn label(&self) -> &str {
        &self.label
    }

    fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    fn extract(&self, entry: &ArchiveEntry) -> Result<Vec<u8>> {
        let raw = self.read_raw(entry)?;
        decompress(entry, raw)
    }
}

/// Decompress the stored bytes of `entry`, checking the result length.
pub fn decompress(entry: &ArchiveEntry, raw: Vec<u8>) -> Result<Vec<u8>> {
    let expected = usize::try_from(entry.size).map_err(|_| {
        VaultError::invalid_header(format!("entry {} is too large", entry.virtual_path))
    })?;

    let data = match entry.compression {
        CompressionKind::None => raw,
        CompressionKind::Lzss => vaultarc_lzss::decode_lzss(&raw, expected)?,
        CompressionKind::Deflate => inflate_zlib(&raw, expected)?,
    };

    if data.len() != expected {
        return Err(VaultError::size_mismatch(
            format!("{} entry {}", entry.compression, entry.virtual_path),
            entry.size,
            data.len() as u64,
        ));
    }
    debug!(
        path = %entry.virtual_path,
        method = entry.compression.name(),
        stored = entry.stored_len(),
        size = data.len(),
        "extracted entry"
    );
    Ok(data)
}

/// Initial output reservation per compressed byte.
const INFLATE_RESERVE_RATIO: usize = 4;

/// Inflate at most `expected + 1` bytes, so an oversized stream stops early
/// and fails the size check.
fn inflate_zlib(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    let limit = expected as u64 + 1;
    let mut decoder = flate2::read::ZlibDecoder::new(data).take(limit);
    let reserve = expected.min(data.len().saturating_mul(INFLATE_RESERVE_RATIO));
    let mut out = Vec::with_capacity(reserve);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| VaultError::decompression("Deflate", e.to_string()))?;
    Ok(out)
}

/// A single file on disk exposed as one entry.
#[derive(Debug)]
pub struct LooseFile {
    label: String,
    path: PathBuf,
    entries: [ArchiveEntry; 1],
}

impl LooseFile {
    /// Register `path` under `virtual_path`.
    pub fn new(
        path: impl Into<PathBuf>,
        virtual_path: impl Into<String>,
        handle: HandleId,
    ) -> Result<Self> {
        let path = path.into();
        let metadata = std::fs::metadata(&path)?;
        if !metadata.is_file() {
            return Err(VaultError::invalid_header(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        let entry = ArchiveEntry::new(
            virtual_path,
            Locator { handle, offset: 0 },
            metadata.len(),
            0,
            CompressionKind::None,
        )?;
        Ok(Self {
            label: path.display().to_string(),
            path,
            entries: [entry],
        })
    }

    /// Path on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContainerReader for LooseFile {
    fn label(&self) -> &str {
        &self.label
    }

    fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    fn extract(&self, _entry: &ArchiveEntry) -> Result<Vec<u8>> {
        Ok(std::fs::read(&self.path)?)
    }
}
