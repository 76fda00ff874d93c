//! Async offset-addressed reads over a seekable byte source.
//!
//! The async counterpart of [`crate::storage::StorageReader`], for sources
//! exposed through tokio's `AsyncRead + AsyncSeek`.
//!
//! # Feature Flag
//!
//! This module is only available when the `async-io` feature is enabled:
//!
//! ```toml
//! [dependencies]
//! vaultarc-core = { version = "0.2", features = ["async-io"] }
//! ```

use crate::endian::{Endian, Primitive};
use crate::error::{Result, VaultError};
use std::io::SeekFrom;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

/// Async random-access reader.
#[derive(Debug)]
pub struct AsyncStorageReader<R> {
    inner: R,
    size: u64,
    cursor: u64,
    endian: Endian,
}

macro_rules! async_storage_reads {
    ($($name:ident, $ty:ty);* $(;)?) => {
        $(
            #[doc = concat!("Read a `", stringify!($ty), "` in the default byte order.")]
            pub async fn $name(&mut self) -> Result<$ty> {
                self.read_value::<$ty>(None).await
            }
        )*
    };
}

impl AsyncStorageReader<tokio::fs::File> {
    /// Open a file for async random-access reads.
    pub async fn open(path: impl AsRef<Path>, endian: Endian) -> Result<Self> {
        let file = tokio::fs::File::open(path).await?;
        Self::new(file, endian).await
    }
}

impl<R: AsyncRead + AsyncSeek + Unpin> AsyncStorageReader<R> {
    /// Wrap a seekable source, measuring its size.
    pub async fn new(mut inner: R, endian: Endian) -> Result<Self> {
        let size = inner.seek(SeekFrom::End(0)).await?;
        inner.seek(SeekFrom::Start(0)).await?;
        Ok(Self {
            inner,
            size,
            cursor: 0,
            endian,
        })
    }

    /// Total size of the source in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Current cursor position.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Move the cursor.
    pub fn set_cursor(&mut self, cursor: u64) {
        self.cursor = cursor;
    }

    /// Default byte order for primitive reads.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Read `count` bytes at `offset`, or at the cursor when `offset` is `None`.
    pub async fn read(&mut self, count: usize, offset: Option<u64>) -> Result<Vec<u8>> {
        let start = offset.unwrap_or(self.cursor);
        let end = start.saturating_add(count as u64);
        if end > self.size {
            return Err(VaultError::unexpected_eof((end - self.size) as usize));
        }

        let mut buf = vec![0u8; count];
        self.inner.seek(SeekFrom::Start(start)).await?;
        self.inner.read_exact(&mut buf).await?;
        self.cursor = end;
        Ok(buf)
    }

    /// Read a primitive value in the default byte order.
    pub async fn read_value<T: Primitive>(&mut self, offset: Option<u64>) -> Result<T> {
        self.read_value_as(self.endian, offset).await
    }

    /// Read a primitive value in the given byte order.
    pub async fn read_value_as<T: Primitive>(
        &mut self,
        endian: Endian,
        offset: Option<u64>,
    ) -> Result<T> {
        let bytes = self.read(T::SIZE, offset).await?;
        Ok(T::decode(&bytes, endian))
    }

    async_storage_reads! {
        read_u8, u8;
        read_i8, i8;
        read_u16, u16;
        read_i16, i16;
        read_u32, u32;
        read_i32, i32;
        read_u64, u64;
        read_i64, i64;
        read_f32, f32;
        read_f64, f64;
    }

    /// Consume the reader and return the source.
    pub fn into_inner(self) -> R {
        self.inner
    }
}
