//! # VaultArc Core
//!
//! Core components for the VaultArc archive library.
//!
//! This crate provides the building blocks shared by every decoder:
//!
//! - [`bitstream`]: Byte and bit-level reads over in-memory buffers
//! - [`bitfield`]: Named bitfields and flag sets over big integers
//! - [`storage`]: Offset-addressed reads over seekable sources
//! - [`ringbuffer`]: Sliding window for LZSS decompression
//! - [`entry`]: Archive entry metadata
//! - [`traits`]: The backing-source trait
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: Facade                                              │
//! │     Archive, decoder registry, CLI                      │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Container                                           │
//! │     DAT1 / DAT2 directory parsing, loose files          │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     LZSS, zlib, ACM subband audio                       │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Readers (this crate)                                │
//! │     ByteReader, StorageReader, RingBuffer               │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use vaultarc_core::{ByteReader, Endian};
//!
//! let data = [0x97, 0x28, 0x03, 0x01];
//! let mut reader = ByteReader::new(&data, Endian::Little);
//! assert_eq!(reader.read_bits(24).unwrap(), 0x032897);
//! assert_eq!(reader.read_bits(8).unwrap(), 1);
//! ```
//!
//! ## Feature Flags
//!
//! - `async-io`: [`async_storage::AsyncStorageReader`] over tokio sources

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitfield;
pub mod bitstream;
pub mod endian;
pub mod entry;
pub mod error;
pub mod ringbuffer;
pub mod storage;
pub mod traits;

#[cfg(feature = "async-io")]
pub mod async_storage;

// Re-exports for convenience
pub use bitfield::{BitFieldValues, FlagSet};
pub use bitstream::ByteReader;
pub use endian::{Endian, Primitive};
pub use entry::{ArchiveEntry, CompressionKind, HandleId, Locator};
pub use error::{Result, VaultError};
pub use ringbuffer::RingBuffer;
pub use storage::StorageReader;
pub use traits::ContainerReader;

#[cfg(feature = "async-io")]
pub use async_storage::AsyncStorageReader;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::ByteReader;
    pub use crate::endian::Endian;
    pub use crate::entry::{ArchiveEntry, CompressionKind, HandleId, Locator};
    pub use crate::error::{Result, VaultError};
    pub use crate::storage::StorageReader;
    pub use crate::traits::ContainerReader;
}
