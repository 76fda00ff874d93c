//! ACM stream header.
//!
//! The header is read bit by bit, LSB first:
//!
//! | bits | field |
//! |------|-------|
//! | 24 | magic `0x032897` |
//! | 8  | version, must be 1 |
//! | 32 | sample count (all channels) |
//! | 16 | channel count, 1 or 2 (not reliable) |
//! | 16 | sample rate, at least 4096 |
//! | 4  | level: subband count is `1 << level` |
//! | 12 | subband length in rows |
//!
//! Some files are wrapped in a "WAVC" header whose magic `0x564157` replaces
//! the ACM magic. Unwrapping it is opt-in.

use crate::decoder::AcmOptions;
use vaultarc_core::error::{Result, VaultError};
use vaultarc_core::ByteReader;

/// ACM stream magic.
pub const ACM_MAGIC: u32 = 0x03_2897;
/// WAVC wrapper magic ("WAV" read little-endian).
pub const WAVC_MAGIC: u32 = 0x56_4157;
/// WAVC wrapper version ("V1.0").
pub const WAVC_VERSION: u32 = 0x3156_302E;
/// Only supported ACM version.
pub const ACM_VERSION: u32 = 1;
/// Lowest accepted sample rate.
pub const MIN_SAMPLE_RATE: u16 = 4096;
/// Output sample width.
pub const BITS_PER_SAMPLE: u16 = 16;
/// Bits of the per-block prefix: increment exponent and increment.
pub const BLOCK_PREFIX_BITS: usize = 4 + 16;
/// Bits of a subband selector.
pub const SELECTOR_BITS: usize = 5;

/// Parsed ACM header with derived block geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcmHeader {
    /// Total samples across all channels.
    pub num_samples: u32,
    /// Channel count to report, after any caller override.
    pub channels: u16,
    /// Channel count as stored in the stream.
    pub stored_channels: u16,
    /// Sample rate in hertz.
    pub sample_rate: u16,
    /// Quantization level.
    pub level: u8,
    /// Rows per subband in one block.
    pub subband_length: u16,
    /// Byte offset of the first block.
    pub data_offset: usize,
}

impl AcmHeader {
    /// Read and validate the header from the start of `reader`.
    pub fn read(reader: &mut ByteReader<'_>, options: &AcmOptions) -> Result<Self> {
        let mut magic = reader.read_bits(24)?;

        if magic == WAVC_MAGIC {
            if !options.accept_wavc {
                return Err(VaultError::UnsupportedWrapper { magic });
            }
            read_wavc(reader)?;
            magic = reader.read_bits(24)?;
        }

        if magic != ACM_MAGIC {
            return Err(VaultError::invalid_magic(
                "ACM header",
                u64::from(ACM_MAGIC),
                u64::from(magic),
            ));
        }

        let version = reader.read_bits(8)?;
        let num_samples = reader.read_bits(32)?;
        let stored_channels = reader.read_bits(16)? as u16;
        let sample_rate = reader.read_bits(16)? as u16;
        let level = reader.read_bits(4)? as u8;
        let subband_length = reader.read_bits(12)? as u16;

        if version != ACM_VERSION {
            return Err(VaultError::unsupported_version("ACM", u64::from(version)));
        }
        if stored_channels != 1 && stored_channels != 2 {
            return Err(VaultError::invalid_header(format!(
                "ACM channel count {} is not 1 or 2",
                stored_channels
            )));
        }
        if sample_rate < MIN_SAMPLE_RATE {
            return Err(VaultError::invalid_header(format!(
                "ACM sample rate {} is below {}",
                sample_rate, MIN_SAMPLE_RATE
            )));
        }
        if subband_length == 0 {
            return Err(VaultError::invalid_header("ACM subband length is zero"));
        }

        let header = Self {
            num_samples,
            channels: options.channels.unwrap_or(stored_channels),
            stored_channels,
            sample_rate,
            level,
            subband_length,
            data_offset: reader.offset(),
        };

        // The block buffer is sized from the geometry, so it must be one the
        // remaining input can fill at least once.
        let available = reader.remaining() * 8 + reader.leftover_bits() as usize;
        if available < header.min_block_bits() {
            return Err(VaultError::invalid_header(format!(
                "ACM block of {} subbands x {} rows needs at least {} bits, {} remain",
                header.num_subbands(),
                subband_length,
                header.min_block_bits(),
                available
            )));
        }
        Ok(header)
    }

    /// Number of subbands (columns) per block.
    pub fn num_subbands(&self) -> usize {
        1 << self.level
    }

    /// Samples per decoded block.
    pub fn block_length(&self) -> usize {
        self.num_subbands() * self.subband_length as usize
    }

    /// Fewest bits that can encode a whole block: the prefix plus one
    /// selector per subband, every column zero-filled.
    pub fn min_block_bits(&self) -> usize {
        BLOCK_PREFIX_BITS + SELECTOR_BITS * self.num_subbands()
    }

    /// Length of the history buffer carried between blocks.
    pub fn wrap_length(&self) -> usize {
        self.num_subbands() * 2 - 2
    }

    /// Rows merged per pass of the wrap transform.
    pub fn block_samples_per_subband(&self) -> usize {
        (2048 / self.num_subbands()).saturating_sub(2).max(1)
    }

    /// Samples covered by one pass of the wrap transform.
    pub fn block_total_samples(&self) -> usize {
        self.block_samples_per_subband() * self.num_subbands()
    }

    /// Output sample width.
    pub fn bits_per_sample(&self) -> u16 {
        BITS_PER_SAMPLE
    }

    /// Playback length in seconds, using the reported channel count.
    pub fn duration_secs(&self) -> f64 {
        let frames = f64::from(self.num_samples) / f64::from(self.channels.max(1));
        frames / f64::from(self.sample_rate)
    }
}

fn read_wavc(reader: &mut ByteReader<'_>) -> Result<()> {
    let tag = reader.read_bits(8)?;
    if tag != u32::from(b'C') {
        return Err(VaultError::invalid_magic("WAVC header", u64::from(b'C'), u64::from(tag)));
    }
    let version = reader.read_bits(32)?;
    if version != WAVC_VERSION {
        return Err(VaultError::unsupported_version("WAVC", u64::from(version)));
    }
    for i in 0..10 {
        let value = reader.read_bits(16)?;
        if i == 4 && value != 28 {
            return Err(VaultError::invalid_header(format!(
                "WAVC field 4 is {}, expected 28",
                value
            )));
        }
    }
    Ok(())
}
