//! Fallout DAT directory parsing.
//!
//! Fallout 1 and Fallout 2 use unrelated directory layouts under the same
//! `.dat` extension:
//!
//! - [`dat1`]: big-endian, folder table at the start of the file, LZSS
//!   compressed entries
//! - [`dat2`]: little-endian, flat file table at the end of the file, zlib
//!   compressed entries
//!
//! Both parsers work on in-memory directory bytes; [`crate::detect`] decides
//! which bytes to fetch and which layout to try.

pub mod dat1;
pub mod dat2;

pub use dat2::Dat2Trailer;

/// Check value stored after every DAT1 folder and file count.
///
/// Counts below 8 map to `0b1010`. Larger counts take an all-ones mask of the
/// count's bit width with bit 0 and the second-highest bit cleared; if that
/// is smaller than the count it is shifted up one bit and `0b10` is set.
pub fn dat1_magic(count: u32) -> u32 {
    let bits = u32::BITS - count.leading_zeros();
    if bits < 4 {
        return 0b1010;
    }
    let mask = (1u64 << bits) - 1;
    let suggested = mask & !1 & !(1u64 << (bits - 2));
    if suggested >= u64::from(count) {
        suggested as u32
    } else {
        (suggested << 1 | 0b10) as u32
    }
}
