//! # VaultArc LZSS
//!
//! Decompressor for the dictionary scheme used by compressed entries in
//! Fallout 1 `.DAT` archives.
//!
//! The stream is a sequence of length-prefixed blocks. Literal blocks are
//! copied through; dictionary blocks decode against a 4 KB window that is
//! reset to spaces at the start of every block. See [`decode`] for the exact
//! layout.
//!
//! ## Example
//!
//! ```rust
//! use vaultarc_lzss::decode_lzss;
//!
//! // one literal block of three bytes
//! let input = [0xFF, 0xFD, b'f', b'o', b'o'];
//! assert_eq!(decode_lzss(&input, 3).unwrap(), b"foo");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod decode;

// Re-exports
pub use decode::{LzssDecoder, MIN_MATCH, decode_lzss};
