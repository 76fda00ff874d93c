//! Stream builders shared by unit tests.

use crate::header::ACM_MAGIC;

/// LSB-first bit packer, the inverse of `ByteReader::read_bits`.
#[derive(Debug, Default)]
pub(crate) struct BitWriter {
    bytes: Vec<u8>,
    acc: u64,
    bits: u32,
}

impl BitWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn put(&mut self, value: u32, count: u32) -> &mut Self {
        let masked = u64::from(value) & ((1u64 << count) - 1);
        self.acc |= masked << self.bits;
        self.bits += count;
        while self.bits >= 8 {
            self.bytes.push(self.acc as u8);
            self.acc >>= 8;
            self.bits -= 8;
        }
        self
    }

    pub(crate) fn finish(&mut self) -> Vec<u8> {
        if self.bits > 0 {
            self.bytes.push(self.acc as u8);
            self.acc = 0;
            self.bits = 0;
        }
        std::mem::take(&mut self.bytes)
    }
}

/// Header bytes for a stream with the given fields.
pub(crate) fn header_bytes(
    version: u32,
    samples: u32,
    channels: u32,
    rate: u32,
    level: u32,
    length: u32,
) -> Vec<u8> {
    let mut w = BitWriter::new();
    w.put(ACM_MAGIC, 24)
        .put(version, 8)
        .put(samples, 32)
        .put(channels, 16)
        .put(rate, 16)
        .put(level, 4)
        .put(length, 12);
    w.finish()
}

/// Append one block that zero-fills every subband at `level`.
pub(crate) fn with_silent_block(mut data: Vec<u8>, level: u32) -> Vec<u8> {
    let bits = 20 + 5 * (1usize << level);
    data.resize(data.len() + bits.div_ceil(8), 0);
    data
}
