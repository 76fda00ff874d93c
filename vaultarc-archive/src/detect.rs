//! DAT layout detection.
//!
//! Neither layout carries a signature, so detection is attempt-and-fallback:
//! the DAT2 trailer is tried first since its recorded size rarely matches by
//! accident, then the DAT1 directory at the start of the file.

use crate::dat::{Dat2Trailer, dat1, dat2};
use std::io::{Read, Seek};
use tracing::debug;
use vaultarc_core::error::{Result, VaultError};
use vaultarc_core::{ArchiveEntry, Endian, HandleId, StorageReader};

/// Initial prefix fetched when looking for a DAT1 directory.
pub const DAT1_PREFIX_LEN: u64 = 16 * 1024;

/// Directory layout of a DAT archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatLayout {
    /// Fallout 1: big-endian, LZSS.
    Dat1,
    /// Fallout 2: little-endian, zlib.
    Dat2,
}

impl DatLayout {
    /// Byte order of the directory fields.
    pub fn endian(&self) -> Endian {
        match self {
            Self::Dat1 => Endian::Big,
            Self::Dat2 => Endian::Little,
        }
    }

    /// Short layout name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dat1 => "DAT1",
            Self::Dat2 => "DAT2",
        }
    }

    /// Game that uses this layout.
    pub fn game(&self) -> &'static str {
        match self {
            Self::Dat1 => "Fallout 1",
            Self::Dat2 => "Fallout 2",
        }
    }
}

impl std::fmt::Display for DatLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.game())
    }
}

/// A parsed DAT directory.
#[derive(Debug, Clone)]
pub struct Directory {
    /// Layout that parsed successfully.
    pub layout: DatLayout,
    /// Entries in directory order.
    pub entries: Vec<ArchiveEntry>,
}

/// Detect the layout of `storage` and parse its directory.
///
/// Fails with [`VaultError::InvalidContainer`] wrapping the DAT1 error when
/// neither layout parses.
pub fn read_directory<R: Read + Seek>(
    storage: &mut StorageReader<R>,
    handle: HandleId,
) -> Result<Directory> {
    match read_dat2(storage, handle) {
        Ok(entries) => {
            return Ok(Directory {
                layout: DatLayout::Dat2,
                entries,
            });
        }
        Err(err) => debug!(%err, "not a DAT2 archive, trying DAT1"),
    }

    match read_dat1(storage, handle) {
        Ok(entries) => Ok(Directory {
            layout: DatLayout::Dat1,
            entries,
        }),
        Err(err) => Err(VaultError::invalid_container(err)),
    }
}

fn read_dat2<R: Read + Seek>(
    storage: &mut StorageReader<R>,
    handle: HandleId,
) -> Result<Vec<ArchiveEntry>> {
    let size = storage.size();
    if size < dat2::TRAILER_LEN {
        return Err(VaultError::unexpected_eof((dat2::TRAILER_LEN - size) as usize));
    }
    let trailer = Dat2Trailer::parse(&storage.read(8, Some(size - dat2::TRAILER_LEN))?)?;
    trailer.validate(size)?;
    let tree = storage.read(trailer.tree_size as usize, Some(trailer.tree_offset()))?;
    dat2::parse_tree(&tree, handle)
}

fn read_dat1<R: Read + Seek>(
    storage: &mut StorageReader<R>,
    handle: HandleId,
) -> Result<Vec<ArchiveEntry>> {
    let size = storage.size();
    let mut len = DAT1_PREFIX_LEN.min(size);
    loop {
        let prefix = storage.read(len as usize, Some(0))?;
        match dat1::parse_directory(&prefix, handle) {
            Err(err) if err.is_truncated() && len < size => {
                len = len.saturating_mul(2).min(size);
            }
            result => return result,
        }
    }
}

/// Async twin of [`read_directory`].
#[cfg(feature = "async")]
pub async fn read_directory_async<R>(
    storage: &mut vaultarc_core::AsyncStorageReader<R>,
    handle: HandleId,
) -> Result<Directory>
where
    R: tokio::io::AsyncRead + tokio::io::AsyncSeek + Unpin,
{
    match read_dat2_async(storage, handle).await {
        Ok(entries) => {
            return Ok(Directory {
                layout: DatLayout::Dat2,
                entries,
            });
        }
        Err(err) => debug!(%err, "not a DAT2 archive, trying DAT1"),
    }

    match read_dat1_async(storage, handle).await {
        Ok(entries) => Ok(Directory {
            layout: DatLayout::Dat1,
            entries,
        }),
        Err(err) => Err(VaultError::invalid_container(err)),
    }
}

#[cfg(feature = "async")]
async fn read_dat2_async<R>(
    storage: &mut vaultarc_core::AsyncStorageReader<R>,
    handle: HandleId,
) -> Result<Vec<ArchiveEntry>>
where
    R: tokio::io::AsyncRead + tokio::io::AsyncSeek + Unpin,
{
    let size = storage.size();
    if size < dat2::TRAILER_LEN {
        return Err(VaultError::unexpected_eof((dat2::TRAILER_LEN - size) as usize));
    }
    let trailer_bytes = storage.read(8, Some(size - dat2::TRAILER_LEN)).await?;
    let trailer = Dat2Trailer::parse(&trailer_bytes)?;
    trailer.validate(size)?;
    let tree = storage
        .read(trailer.tree_size as usize, Some(trailer.tree_offset()))
        .await?;
    dat2::parse_tree(&tree, handle)
}

#[cfg(feature = "async")]
async fn read_dat1_async<R>(
    storage: &mut vaultarc_core::AsyncStorageReader<R>,
    handle: HandleId,
) -> Result<Vec<ArchiveEntry>>
where
    R: tokio::io::AsyncRead + tokio::io::AsyncSeek + Unpin,
{
    let size = storage.size();
    let mut len = DAT1_PREFIX_LEN.min(size);
    loop {
        let prefix = storage.read(len as usize, Some(0)).await?;
        match dat1::parse_directory(&prefix, handle) {
            Err(err) if err.is_truncated() && len < size => {
                len = len.saturating_mul(2).min(size);
            }
            result => return result,
        }
    }
}
