//! # VaultArc ACM
//!
//! Decoder for the Interplay ACM audio format used for music, speech and
//! sound effects in Fallout 1 and 2.
//!
//! An ACM stream is a bit-packed header followed by fixed-size blocks. Each
//! block holds `2^level` subbands of `subband_length` rows; every subband is
//! filled by one of a dozen small entropy decoders chosen by a 5-bit
//! selector. A butterfly "wrap" transform then merges the subbands into PCM,
//! carrying a short history from block to block.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ AcmDecoder (pull-based, WAVE output)     │
//! ├──────────────────────────────────────────┤
//! │ SubbandBlock (selectors) │ merge (wrap)  │
//! ├──────────────────────────────────────────┤
//! │ AcmHeader │ tables                       │
//! ├──────────────────────────────────────────┤
//! │ vaultarc-core ByteReader (LSB-first bits)│
//! └──────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use vaultarc_acm::{AcmDecoder, AcmOptions};
//!
//! let data = std::fs::read("music/01hub.acm").unwrap();
//! let mut decoder = AcmDecoder::new(&data, AcmOptions::default()).unwrap();
//! while let Some(block) = decoder.next_block().unwrap() {
//!     println!("{} samples", block.len());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod block;
pub mod decoder;
pub mod header;
pub mod merge;
pub mod tables;
pub mod wav;

#[cfg(test)]
mod test_util;

// Re-exports
pub use block::SubbandBlock;
pub use decoder::{AcmBlocks, AcmDecoder, AcmOptions};
pub use header::{ACM_MAGIC, AcmHeader, WAVC_MAGIC};
pub use merge::merge_subbands;
pub use wav::{WAVE_HEADER_LEN, WaveFormat};

/// Decode a complete ACM stream to a WAVE file.
pub fn decode_acm_to_wave(data: &[u8], options: AcmOptions) -> vaultarc_core::Result<Vec<u8>> {
    AcmDecoder::new(data, options)?.decode_to_wave()
}
