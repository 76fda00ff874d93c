//! Sequential byte and bit reads over an in-memory buffer.
//!
//! [`ByteReader`] serves every decoder in the workspace. It offers fixed-width
//! primitive reads with a default byte order that can be overridden per call,
//! and arbitrary-width bit reads of 1 to 32 bits.
//!
//! # Bit Ordering
//!
//! Bit reads are LSB-first. Bits left over from a partially consumed byte are
//! kept between calls, so three consecutive 5-bit reads span byte boundaries
//! correctly. A request that the leftover bits can satisfy consumes no new
//! bytes. Byte-aligned primitive reads advance the byte offset only and leave
//! the leftover bits alone.
//!
//! # Example
//!
//! ```
//! use vaultarc_core::bitstream::ByteReader;
//! use vaultarc_core::Endian;
//!
//! let data = [0xA5, 0x0F, 0x12, 0x34];
//! let mut reader = ByteReader::new(&data, Endian::Little);
//! assert_eq!(reader.read_bits(4).unwrap(), 0x5);
//! assert_eq!(reader.read_bits(4).unwrap(), 0xA);
//! assert_eq!(reader.read_u8().unwrap(), 0x0F);
//! assert_eq!(reader.read_u16_as(Endian::Big).unwrap(), 0x1234);
//! ```

use crate::bitfield::{self, BitFieldValues, FlagSet};
use crate::endian::{Endian, Primitive};
use crate::error::{Result, VaultError};
use num_bigint::{BigInt, BigUint};

/// Maximum number of bits a single [`ByteReader::read_bits`] call returns.
pub const MAX_BITS: u32 = 32;

/// A cursor over a byte slice with primitive and bit-level reads.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
    endian: Endian,
    /// Bits already fetched from the stream but not yet returned.
    leftover_value: u64,
    /// Number of valid bits in `leftover_value`.
    leftover_bits: u32,
}

macro_rules! primitive_reads {
    ($($name:ident, $name_as:ident, $ty:ty);* $(;)?) => {
        $(
            #[doc = concat!("Read a `", stringify!($ty), "` in the default byte order.")]
            #[inline]
            pub fn $name(&mut self) -> Result<$ty> {
                self.read::<$ty>()
            }

            #[doc = concat!("Read a `", stringify!($ty), "` in the given byte order.")]
            #[inline]
            pub fn $name_as(&mut self, endian: Endian) -> Result<$ty> {
                self.read_as::<$ty>(endian)
            }
        )*
    };
}

impl<'a> ByteReader<'a> {
    /// Create a reader over `data` with a default byte order.
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        Self {
            data,
            offset: 0,
            endian,
            leftover_value: 0,
            leftover_bits: 0,
        }
    }

    /// Create a little-endian reader.
    pub fn little(data: &'a [u8]) -> Self {
        Self::new(data, Endian::Little)
    }

    /// Create a big-endian reader.
    pub fn big(data: &'a [u8]) -> Self {
        Self::new(data, Endian::Big)
    }

    /// Current byte offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Total length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Whether every byte has been consumed.
    pub fn at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Default byte order.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Change the default byte order.
    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    /// The underlying buffer.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Number of buffered leftover bits.
    pub fn leftover_bits(&self) -> u32 {
        self.leftover_bits
    }

    /// Move to an absolute byte offset and drop any leftover bits.
    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(VaultError::unexpected_eof(offset - self.data.len()));
        }
        self.offset = offset;
        self.reset_bits();
        Ok(())
    }

    /// Skip `count` bytes.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.take(count).map(|_| ())
    }

    /// Drop any leftover bits.
    pub fn reset_bits(&mut self) {
        self.leftover_value = 0;
        self.leftover_bits = 0;
    }

    #[inline]
    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(count)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| VaultError::unexpected_eof(count - self.remaining()))?;
        let bytes = &self.data[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    /// Read a primitive value in the default byte order.
    #[inline]
    pub fn read<T: Primitive>(&mut self) -> Result<T> {
        self.read_as(self.endian)
    }

    /// Read a primitive value in the given byte order.
    #[inline]
    pub fn read_as<T: Primitive>(&mut self, endian: Endian) -> Result<T> {
        let bytes = self.take(T::SIZE)?;
        Ok(T::decode(bytes, endian))
    }

    primitive_reads! {
        read_u8, read_u8_as, u8;
        read_i8, read_i8_as, i8;
        read_u16, read_u16_as, u16;
        read_i16, read_i16_as, i16;
        read_u32, read_u32_as, u32;
        read_i32, read_i32_as, i32;
        read_u64, read_u64_as, u64;
        read_i64, read_i64_as, i64;
        read_f32, read_f32_as, f32;
        read_f64, read_f64_as, f64;
    }

    /// Read `count` raw bytes.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.take(count)
    }

    /// Read `count` primitive values in the default byte order.
    pub fn read_array<T: Primitive>(&mut self, count: usize) -> Result<Vec<T>> {
        let total = count
            .checked_mul(T::SIZE)
            .ok_or_else(|| VaultError::unexpected_eof(usize::MAX))?;
        let bytes = self.take(total)?;
        Ok(bytes
            .chunks_exact(T::SIZE)
            .map(|chunk| T::decode(chunk, self.endian))
            .collect())
    }

    /// Read an ASCII string of `count` bytes, replacing invalid UTF-8.
    pub fn read_string(&mut self, count: usize) -> Result<String> {
        let bytes = self.take(count)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read `count` bits (1..=32), LSB-first.
    ///
    /// On error neither the byte offset nor the leftover bits change.
    pub fn read_bits(&mut self, count: u32) -> Result<u32> {
        if count == 0 || count > MAX_BITS {
            return Err(VaultError::InvalidBitCount { count });
        }

        if self.leftover_bits == count {
            let value = self.leftover_value;
            self.reset_bits();
            return Ok(value as u32);
        }

        if self.leftover_bits > count {
            let value = self.leftover_value & mask(count);
            self.leftover_value >>= count;
            self.leftover_bits -= count;
            return Ok(value as u32);
        }

        let needed = count - self.leftover_bits;
        let byte_count = needed.div_ceil(8) as usize;
        let bytes = self.take(byte_count)?;

        let mut fresh = bytes
            .iter()
            .rev()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));

        let spare = needed % 8;
        let (next_value, next_bits) = if spare != 0 {
            let value = fresh >> needed;
            fresh &= mask(needed);
            (value, 8 - spare)
        } else {
            (0, 0)
        };

        let value = self.leftover_value | (fresh << self.leftover_bits);
        self.leftover_value = next_value;
        self.leftover_bits = next_bits;
        Ok(value as u32)
    }

    /// Read an unsigned integer of arbitrary precision from `count` bytes.
    pub fn read_big_uint(&mut self, count: usize, endian: Endian) -> Result<BigUint> {
        let bytes = self.take(count)?;
        Ok(match endian {
            Endian::Little => BigUint::from_bytes_le(bytes),
            Endian::Big => BigUint::from_bytes_be(bytes),
        })
    }

    /// Read a two's complement signed integer of arbitrary precision from `count` bytes.
    pub fn read_big_int(&mut self, count: usize, endian: Endian) -> Result<BigInt> {
        let bytes = self.take(count)?;
        Ok(match endian {
            Endian::Little => BigInt::from_signed_bytes_le(bytes),
            Endian::Big => BigInt::from_signed_bytes_be(bytes),
        })
    }

    /// Read named sub-fields covering a whole number of bytes.
    ///
    /// `template` lists `(name, width)` pairs from the most significant field
    /// to the least significant one. The call fails before consuming input if
    /// the widths do not add up to a multiple of 8.
    pub fn read_bitfield(
        &mut self,
        template: &[(&str, u32)],
        endian: Endian,
    ) -> Result<BitFieldValues> {
        let total = bitfield::template_width(template)?;
        let value = self.read_big_uint((total / 8) as usize, endian)?;
        bitfield::decode_bitfield(&value, template)
    }

    /// Read `count` bytes as an integer and test it against named masks.
    pub fn read_flags(
        &mut self,
        count: usize,
        flags: &[(&str, u64)],
        endian: Endian,
    ) -> Result<FlagSet> {
        let value = self.read_big_uint(count, endian)?;
        Ok(bitfield::decode_flags(&value, flags))
    }
}

#[inline]
fn mask(bits: u32) -> u64 {
    if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_reads_default_and_override() {
        let data = [0x01, 0x00, 0x00, 0x02, 0xFF];
        let mut reader = ByteReader::little(&data);
        assert_eq!(reader.read_u16().unwrap(), 1);
        assert_eq!(reader.read_u16_as(Endian::Big).unwrap(), 2);
        assert_eq!(reader.read_i8().unwrap(), -1);
        assert!(reader.at_end());
    }

    #[test]
    fn test_read_past_end_keeps_offset() {
        let data = [0x01, 0x02];
        let mut reader = ByteReader::big(&data);
        assert!(matches!(
            reader.read_u32(),
            Err(VaultError::UnexpectedEof { expected: 2 })
        ));
        assert_eq!(reader.offset(), 0);
        assert_eq!(reader.read_u16().unwrap(), 0x0102);
    }

    #[test]
    fn test_read_array_uses_default_order() {
        let data = [0x00, 0x01, 0x00, 0x02];
        let mut reader = ByteReader::big(&data);
        assert_eq!(reader.read_array::<u16>(2).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_three_five_bit_reads_span_bytes() {
        // 15 bits: 0b10110_01101_00011, LSB-first
        let packed: u16 = 0b10110_01101_00011;
        let data = packed.to_le_bytes();
        let mut reader = ByteReader::little(&data);
        assert_eq!(reader.read_bits(5).unwrap(), 0b00011);
        assert_eq!(reader.read_bits(5).unwrap(), 0b01101);
        assert_eq!(reader.read_bits(5).unwrap(), 0b10110);
    }

    #[test]
    fn test_leftover_satisfies_small_read() {
        let data = [0xF3, 0xAA];
        let mut reader = ByteReader::little(&data);
        assert_eq!(reader.read_bits(2).unwrap(), 0b11);
        assert_eq!(reader.offset(), 1);
        assert_eq!(reader.leftover_bits(), 6);
        assert_eq!(reader.read_bits(3).unwrap(), 0b100);
        assert_eq!(reader.offset(), 1);
        assert_eq!(reader.read_bits(3).unwrap(), 0b111);
        assert_eq!(reader.leftover_bits(), 0);
        assert_eq!(reader.offset(), 1);
    }

    #[test]
    fn test_read_full_32_bits() {
        let data = [0x78, 0x56, 0x34, 0x12, 0xFF];
        let mut reader = ByteReader::little(&data);
        assert_eq!(reader.read_bits(4).unwrap(), 0x8);
        assert_eq!(reader.read_bits(32).unwrap(), 0xF123_4567);
        assert_eq!(reader.leftover_bits(), 4);
    }

    #[test]
    fn test_invalid_bit_counts() {
        let data = [0u8; 8];
        let mut reader = ByteReader::little(&data);
        assert!(matches!(
            reader.read_bits(0),
            Err(VaultError::InvalidBitCount { count: 0 })
        ));
        assert!(matches!(
            reader.read_bits(33),
            Err(VaultError::InvalidBitCount { count: 33 })
        ));
    }

    #[test]
    fn test_bit_read_eof_leaves_state() {
        let data = [0xFF];
        let mut reader = ByteReader::little(&data);
        assert_eq!(reader.read_bits(3).unwrap(), 0b111);
        assert!(reader.read_bits(16).unwrap_err().is_truncated());
        assert_eq!(reader.leftover_bits(), 5);
        assert_eq!(reader.read_bits(5).unwrap(), 0b11111);
    }

    #[test]
    fn test_big_integers() {
        let data = [0xFF, 0xFE, 0x01, 0x00];
        let mut reader = ByteReader::little(&data);
        assert_eq!(
            reader.read_big_int(2, Endian::Big).unwrap(),
            BigInt::from(-2)
        );
        assert_eq!(
            reader.read_big_uint(2, Endian::Little).unwrap(),
            BigUint::from(1u32)
        );
    }

    #[test]
    fn test_read_bitfield() {
        let data = [0b1010_0101];
        let mut reader = ByteReader::little(&data);
        let fields = reader
            .read_bitfield(&[("a", 4), ("b", 4)], Endian::Little)
            .unwrap();
        assert_eq!(fields.get_u64("a"), Some(10));
        assert_eq!(fields.get_u64("b"), Some(5));
    }

    #[test]
    fn test_read_bitfield_misaligned_consumes_nothing() {
        let data = [0xFF, 0xFF];
        let mut reader = ByteReader::little(&data);
        let err = reader
            .read_bitfield(&[("a", 4), ("b", 6)], Endian::Little)
            .unwrap_err();
        assert!(matches!(err, VaultError::BitFieldMisaligned { missing: 6 }));
        assert_eq!(reader.offset(), 0);
    }

    #[test]
    fn test_read_flags() {
        let data = [0x40, 0x00, 0x00, 0x00];
        let mut reader = ByteReader::little(&data);
        let flags = reader
            .read_flags(4, &[("compressed", 0x40), ("hidden", 0x02)], Endian::Little)
            .unwrap();
        assert!(flags.is_set("compressed"));
        assert!(!flags.is_set("hidden"));
    }
}
