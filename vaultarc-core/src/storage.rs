//! Offset-addressed reads over a seekable byte source.
//!
//! [`StorageReader`] wraps any `Read + Seek` source (usually a file) and
//! serves reads at an explicit offset or at an internal cursor. After every
//! read the cursor sits just past the bytes returned. Reading past the end of
//! the source fails with [`VaultError::UnexpectedEof`].

use crate::endian::{Endian, Primitive};
use crate::error::{Result, VaultError};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Random-access reader over a seekable source.
#[derive(Debug)]
pub struct StorageReader<R> {
    inner: R,
    size: u64,
    cursor: u64,
    endian: Endian,
}

macro_rules! storage_reads {
    ($($name:ident, $ty:ty);* $(;)?) => {
        $(
            #[doc = concat!("Read a `", stringify!($ty), "` in the default byte order.")]
            #[inline]
            pub fn $name(&mut self) -> Result<$ty> {
                self.read_value::<$ty>(None)
            }
        )*
    };
}

impl StorageReader<BufReader<File>> {
    /// Open a file for random-access reads.
    pub fn open(path: impl AsRef<Path>, endian: Endian) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file), endian)
    }
}

impl<R: Read + Seek> StorageReader<R> {
    /// Wrap a seekable source, measuring its size.
    pub fn new(mut inner: R, endian: Endian) -> Result<Self> {
        let size = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
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

    /// Change the default byte order.
    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    /// Read `count` bytes at `offset`, or at the cursor when `offset` is `None`.
    pub fn read(&mut self, count: usize, offset: Option<u64>) -> Result<Vec<u8>> {
        let start = offset.unwrap_or(self.cursor);
        let end = start.saturating_add(count as u64);
        if end > self.size {
            return Err(VaultError::unexpected_eof((end - self.size) as usize));
        }

        let mut buf = vec![0u8; count];
        self.inner.seek(SeekFrom::Start(start))?;
        self.inner.read_exact(&mut buf)?;
        self.cursor = end;
        Ok(buf)
    }

    /// Read a primitive value in the default byte order.
    pub fn read_value<T: Primitive>(&mut self, offset: Option<u64>) -> Result<T> {
        self.read_value_as(self.endian, offset)
    }

    /// Read a primitive value in the given byte order.
    pub fn read_value_as<T: Primitive>(
        &mut self,
        endian: Endian,
        offset: Option<u64>,
    ) -> Result<T> {
        let bytes = self.read(T::SIZE, offset)?;
        Ok(T::decode(&bytes, endian))
    }

    storage_reads! {
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
