//! # VaultArc Archive
//!
//! Fallout DAT archive support for VaultArc.
//!
//! - **DAT1** (Fallout 1): big-endian folder table at the start of the file,
//!   LZSS-compressed entries
//! - **DAT2** (Fallout 2): little-endian file table at the end of the file,
//!   zlib-compressed entries
//!
//! The [`Archive`] facade merges any number of DAT files and loose files into
//! one case-insensitive namespace and decodes known asset types (`.acm`,
//! `.lst`, `.msg`) on extraction.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Archive (merge, extract, cache) │ Lookups    │
//! ├──────────────────────────────────────────────┤
//! │ DecoderRegistry: ACM │ LST │ MSG │ custom    │
//! ├──────────────────────────────────────────────┤
//! │ DatContainer │ AsyncDatContainer │ LooseFile │
//! ├──────────────────────────────────────────────┤
//! │ detect: DAT2 trailer, then DAT1 directory    │
//! ├──────────────────────────────────────────────┤
//! │ vaultarc-core │ vaultarc-lzss │ flate2       │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use vaultarc_archive::{Archive, ArchiveOptions, Asset};
//!
//! let mut archive = Archive::new(ArchiveOptions::default());
//! archive.merge_dat_file("master.dat").unwrap();
//! archive.merge_dat_file("patch000.dat").unwrap();
//!
//! for entry in archive.entries(Some(".msg"), Some("dialog")) {
//!     println!("{}", entry.virtual_path);
//! }
//!
//! if let Asset::Messages(table) = archive.extract("text/english/game/misc.msg").unwrap() {
//!     println!("{} messages", table.len());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
#[cfg(feature = "async")]
pub mod async_container;
pub mod container;
pub mod dat;
pub mod decoders;
pub mod detect;
pub mod lookups;

// Re-exports
pub use archive::{Archive, ArchiveOptions, ExtractOptions};
#[cfg(feature = "async")]
pub use async_container::AsyncDatContainer;
pub use container::{DatContainer, LooseFile, decompress};
pub use dat::dat1_magic;
pub use decoders::{Asset, AssetDecoder, DecoderOptions, DecoderRegistry};
pub use detect::{DatLayout, Directory, read_directory};
pub use lookups::{AssetLookups, lookup_message, message_path};
