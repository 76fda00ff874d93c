//! LZSS block-stream decoding.
//!
//! A compressed entry is a sequence of blocks, each introduced by a signed
//! big-endian 16-bit length:
//!
//! - negative `-N`: `N` raw bytes copied to the output
//! - positive `N`: `N` input bytes of dictionary-coded data
//! - zero: invalid
//!
//! Dictionary blocks start from a fresh 4 KB window filled with spaces and
//! written from position 4078. Items come in groups of eight governed by a
//! control byte read LSB first: a set bit is a literal byte, a clear bit is a
//! two-byte match `(b1, b2)` copying `(b2 & 0x0F) + 3` bytes from absolute
//! window position `b1 | (b2 & 0xF0) << 4`.

use tracing::{debug, warn};
use vaultarc_core::error::{Result, VaultError};
use vaultarc_core::{ByteReader, RingBuffer};

/// Minimum match length encoded by a length nibble of 0.
pub const MIN_MATCH: usize = 3;

/// Upper bound on output bytes per input byte: a control byte and eight
/// two-byte matches of 18 bytes each.
const MAX_EXPANSION: usize = 9;

/// LZSS decoder.
///
/// The window is kept between calls to avoid reallocating it for every entry.
#[derive(Debug)]
pub struct LzssDecoder {
    ring: RingBuffer,
}

impl Default for LzssDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LzssDecoder {
    /// Create a new decoder.
    pub fn new() -> Self {
        Self {
            ring: RingBuffer::lzss(),
        }
    }

    /// Decode `input` into exactly `output_size` bytes.
    ///
    /// Producing more bytes than declared is an error. Producing fewer is an
    /// error too, unless the last literal block was cut short by the end of
    /// input; then the output is zero-padded.
    pub fn decode(&mut self, input: &[u8], output_size: usize) -> Result<Vec<u8>> {
        let mut reader = ByteReader::big(input);
        let capacity = output_size.min(input.len().saturating_mul(MAX_EXPANSION));
        let mut output = Vec::with_capacity(capacity);
        let mut trimmed = false;

        while !reader.at_end() {
            let block_offset = reader.offset();
            let block_len = reader.read_i16()?;

            if block_len == 0 {
                return Err(VaultError::corrupted(
                    block_offset as u64,
                    "zero-length LZSS block",
                ));
            }

            if block_len < 0 {
                let wanted = block_len.unsigned_abs() as usize;
                let available = wanted.min(reader.remaining());
                if available < wanted {
                    debug!(
                        wanted,
                        available, "literal block runs past end of input, trimming"
                    );
                    trimmed = true;
                }
                let bytes = reader.read_bytes(available)?;
                ensure_room(&output, bytes.len(), output_size, block_offset)?;
                output.extend_from_slice(bytes);
            } else {
                self.decode_block(&mut reader, block_len as usize, &mut output, output_size)?;
            }
        }

        if output.len() < output_size {
            if !trimmed {
                return Err(VaultError::size_mismatch(
                    "LZSS output",
                    output_size as u64,
                    output.len() as u64,
                ));
            }
            warn!(
                expected = output_size,
                produced = output.len(),
                "LZSS output short after trimmed literal block, zero-padding"
            );
            output.resize(output_size, 0);
        }

        Ok(output)
    }

    fn decode_block(
        &mut self,
        reader: &mut ByteReader<'_>,
        block_len: usize,
        output: &mut Vec<u8>,
        output_size: usize,
    ) -> Result<()> {
        self.ring.reset_lzss();
        let start = reader.offset();

        loop {
            let flags = reader.read_u8()?;

            for bit in 0..8 {
                let item_offset = reader.offset();
                if flags & (1 << bit) != 0 {
                    let byte = reader.read_u8()?;
                    ensure_room(output, 1, output_size, item_offset)?;
                    output.push(byte);
                    self.ring.write_byte(byte);
                } else {
                    let b1 = reader.read_u8()? as usize;
                    let b2 = reader.read_u8()? as usize;
                    let position = b1 | ((b2 & 0xF0) << 4);
                    let length = (b2 & 0x0F) + MIN_MATCH;
                    ensure_room(output, length, output_size, item_offset)?;
                    self.ring.copy_absolute(position, length, output);
                }

                let consumed = reader.offset() - start;
                if consumed >= block_len {
                    if consumed > block_len {
                        return Err(VaultError::corrupted(
                            reader.offset() as u64,
                            format!(
                                "LZSS block overran its length: consumed {} of {}",
                                consumed, block_len
                            ),
                        ));
                    }
                    return Ok(());
                }
            }
        }
    }
}

fn ensure_room(output: &[u8], extra: usize, output_size: usize, offset: usize) -> Result<()> {
    if output.len() + extra > output_size {
        return Err(VaultError::corrupted(
            offset as u64,
            format!(
                "LZSS output exceeds declared size {} (would reach {})",
                output_size,
                output.len() + extra
            ),
        ));
    }
    Ok(())
}

/// Decode an LZSS stream into exactly `output_size` bytes.
pub fn decode_lzss(input: &[u8], output_size: usize) -> Result<Vec<u8>> {
    LzssDecoder::new().decode(input, output_size)
}
