//! Byte order selection and fixed-width primitive decoding.

/// Byte order used for multi-byte reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    /// Least significant byte first.
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

impl Endian {
    /// Name of this byte order.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Little => "little-endian",
            Self::Big => "big-endian",
        }
    }
}

/// A fixed-width value that can be decoded from raw bytes.
pub trait Primitive: Copy {
    /// Encoded width in bytes.
    const SIZE: usize;

    /// Decode from exactly `SIZE` bytes in the given byte order.
    fn decode(bytes: &[u8], endian: Endian) -> Self;
}

macro_rules! impl_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn decode(bytes: &[u8], endian: Endian) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::SIZE]);
                    match endian {
                        Endian::Little => <$ty>::from_le_bytes(raw),
                        Endian::Big => <$ty>::from_be_bytes(raw),
                    }
                }
            }
        )*
    };
}

impl_primitive!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_both_orders() {
        let bytes = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(u32::decode(&bytes, Endian::Little), 0x0403_0201);
        assert_eq!(u32::decode(&bytes, Endian::Big), 0x0102_0304);
        assert_eq!(i16::decode(&[0xFF, 0xFE], Endian::Big), -2);
        assert_eq!(f32::decode(&1.5f32.to_le_bytes(), Endian::Little), 1.5);
    }
}
