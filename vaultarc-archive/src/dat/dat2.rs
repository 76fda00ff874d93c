//! Fallout 2 DAT directory (little-endian, directory at the end).
//!
//! The last 8 bytes hold the directory size and the total archive size. The
//! directory sits just before that trailer and begins with a file count.

use tracing::warn;
use vaultarc_core::error::{Result, VaultError};
use vaultarc_core::{ArchiveEntry, ByteReader, CompressionKind, HandleId, Locator};

/// Size of the trailer.
pub const TRAILER_LEN: u64 = 8;

/// Smallest possible directory record (empty path).
const MIN_RECORD_LEN: usize = 17;

/// End-of-file trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dat2Trailer {
    /// Directory size, including its leading file count.
    pub tree_size: u32,
    /// Total archive size as recorded by the writer.
    pub file_size: u32,
}

impl Dat2Trailer {
    /// Parse the 8 trailer bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::little(bytes);
        Ok(Self {
            tree_size: reader.read_u32()?,
            file_size: reader.read_u32()?,
        })
    }

    /// Check the trailer against the real archive size.
    pub fn validate(&self, actual_size: u64) -> Result<()> {
        if u64::from(self.file_size) != actual_size {
            return Err(VaultError::size_mismatch(
                "DAT2 trailer file size",
                actual_size,
                u64::from(self.file_size),
            ));
        }
        if self.tree_size < 4 || u64::from(self.tree_size) + TRAILER_LEN > actual_size {
            return Err(VaultError::invalid_header(format!(
                "DAT2 tree size {} does not fit in {} bytes",
                self.tree_size, actual_size
            )));
        }
        Ok(())
    }

    /// Offset of the directory (its file count word).
    pub fn tree_offset(&self) -> u64 {
        u64::from(self.file_size) - TRAILER_LEN - u64::from(self.tree_size)
    }
}

/// Parse the directory bytes located by the trailer.
pub fn parse_tree(tree: &[u8], handle: HandleId) -> Result<Vec<ArchiveEntry>> {
    let mut reader = ByteReader::little(tree);
    let declared = reader.read_u32()?;

    let capacity = (declared as usize).min(reader.remaining() / MIN_RECORD_LEN);
    let mut entries = Vec::with_capacity(capacity);
    while !reader.at_end() {
        let path_len = reader.read_u32()? as usize;
        let path = reader.read_string(path_len)?;
        let compression = if reader.read_u8()? != 0 {
            CompressionKind::Deflate
        } else {
            CompressionKind::None
        };
        let size = reader.read_u32()?;
        let compressed_size = reader.read_u32()?;
        let offset = reader.read_u32()?;
        if compression.is_stored() && compressed_size != size {
            return Err(VaultError::size_mismatch(
                format!("DAT2 stored entry {}", path),
                u64::from(size),
                u64::from(compressed_size),
            ));
        }

        entries.push(ArchiveEntry::new(
            path,
            Locator {
                handle,
                offset: u64::from(offset),
            },
            u64::from(size),
            u64::from(compressed_size),
            compression,
        )?);
    }

    if entries.len() != declared as usize {
        warn!(
            declared,
            found = entries.len(),
            "DAT2 file count disagrees with directory"
        );
    }
    Ok(entries)
}
