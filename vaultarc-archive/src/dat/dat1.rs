//! Fallout 1 DAT directory (big-endian, directory at the start).
//!
//! ```text
//! header:  folder_count u32 | magic u32 | flags u32 (= 0) | timestamp u32
//! names:   folder_count x (len u8, name bytes)
//! folders: per folder
//!            file_count u32 | magic u32 | flags u32 | timestamp u32
//!            file_count x (len u8, name bytes,
//!                          flags u32, offset u32, size u32, compressed_size u32)
//! ```
//!
//! Both magic fields are derived from the count they follow; see
//! [`dat1_magic`].

use super::dat1_magic;
use tracing::trace;
use vaultarc_core::error::{Result, VaultError};
use vaultarc_core::{ArchiveEntry, ByteReader, CompressionKind, HandleId, Locator};

/// File flag bit marking LZSS compression.
pub const COMPRESSED_FLAG: u32 = 0x40;

/// Size of a folder or header block.
pub const BLOCK_HEADER_LEN: usize = 16;

/// Parse the directory from a prefix of the archive.
///
/// Returns [`VaultError::UnexpectedEof`] when `data` ends before the
/// directory does, so callers can retry with a longer prefix.
pub fn parse_directory(data: &[u8], handle: HandleId) -> Result<Vec<ArchiveEntry>> {
    let mut reader = ByteReader::big(data);

    let folder_count = reader.read_u32()?;
    let magic = reader.read_u32()?;
    let flags = reader.read_u32()?;
    let _timestamp = reader.read_u32()?;
    check_magic("DAT1 header", folder_count, magic)?;
    if flags != 0 {
        return Err(VaultError::invalid_header(format!(
            "DAT1 header flags are {:#x}, expected 0",
            flags
        )));
    }

    // a name takes at least its length byte
    let mut folders = Vec::with_capacity((folder_count as usize).min(reader.remaining()));
    for _ in 0..folder_count {
        folders.push(folder_prefix(&read_name(&mut reader)?));
    }

    let mut entries = Vec::new();
    for folder in &folders {
        let file_count = reader.read_u32()?;
        let magic = reader.read_u32()?;
        let _flags = reader.read_u32()?;
        let _timestamp = reader.read_u32()?;
        check_magic(format!("DAT1 folder '{}'", folder), file_count, magic)?;
        trace!(folder = %folder, files = file_count, "DAT1 folder");

        for _ in 0..file_count {
            let name = read_name(&mut reader)?;
            let flags = reader.read_u32()?;
            let offset = reader.read_u32()?;
            let size = reader.read_u32()?;
            let compressed_size = reader.read_u32()?;

            let compression = if flags & COMPRESSED_FLAG != 0 {
                CompressionKind::Lzss
            } else {
                CompressionKind::None
            };
            if compression.is_stored() && compressed_size != 0 {
                return Err(VaultError::size_mismatch(
                    format!("DAT1 stored entry {}{}", folder, name),
                    0,
                    u64::from(compressed_size),
                ));
            }

            entries.push(ArchiveEntry::new(
                format!("{}{}", folder, name),
                Locator {
                    handle,
                    offset: u64::from(offset),
                },
                u64::from(size),
                u64::from(compressed_size),
                compression,
            )?);
        }
    }

    Ok(entries)
}

fn check_magic(context: impl Into<String>, count: u32, magic: u32) -> Result<()> {
    let expected = dat1_magic(count);
    if magic != expected {
        return Err(VaultError::invalid_magic(
            context,
            u64::from(expected),
            u64::from(magic),
        ));
    }
    Ok(())
}

fn read_name(reader: &mut ByteReader<'_>) -> Result<String> {
    let len = reader.read_u8()? as usize;
    reader.read_string(len)
}

/// Folder names lose a leading `.`; non-empty names gain a trailing `/`.
fn folder_prefix(name: &str) -> String {
    let name = name.strip_prefix('.').unwrap_or(name);
    if name.is_empty() {
        String::new()
    } else {
        format!("{}/", name.replace('\\', "/"))
    }
}
