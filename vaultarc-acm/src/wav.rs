//! 44-byte canonical WAVE header for 16-bit PCM output.

use crate::header::AcmHeader;

/// Size of the header in bytes.
pub const WAVE_HEADER_LEN: usize = 44;

/// Fields needed to describe a PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveFormat {
    /// Total samples across all channels.
    pub num_samples: u32,
    /// Sample rate in hertz.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
    /// Bits per sample.
    pub bits_per_sample: u16,
}

impl WaveFormat {
    /// Format of a decoded ACM stream.
    pub fn from_acm(header: &AcmHeader) -> Self {
        Self {
            num_samples: header.num_samples,
            sample_rate: u32::from(header.sample_rate),
            channels: header.channels,
            bits_per_sample: header.bits_per_sample(),
        }
    }

    /// Size of the `data` chunk.
    pub fn data_len(&self) -> u32 {
        self.num_samples
            .wrapping_mul(u32::from(self.bits_per_sample / 8))
    }

    /// Encode the RIFF/WAVE header.
    pub fn header_bytes(&self) -> [u8; WAVE_HEADER_LEN] {
        let bytes_per_sample = u32::from(self.bits_per_sample / 8);
        let block_align = self.bits_per_sample / 8 * self.channels;
        let byte_rate = self.sample_rate * bytes_per_sample * u32::from(self.channels);

        let mut out = [0u8; WAVE_HEADER_LEN];
        let mut pos = 0;
        let mut put = |bytes: &[u8]| {
            out[pos..pos + bytes.len()].copy_from_slice(bytes);
            pos += bytes.len();
        };

        put(b"RIFF");
        put(&36u32.wrapping_add(self.data_len()).to_le_bytes());
        put(b"WAVE");
        put(b"fmt ");
        put(&16u32.to_le_bytes());
        put(&1u16.to_le_bytes()); // PCM
        put(&self.channels.to_le_bytes());
        put(&self.sample_rate.to_le_bytes());
        put(&byte_rate.to_le_bytes());
        put(&block_align.to_le_bytes());
        put(&self.bits_per_sample.to_le_bytes());
        put(b"data");
        put(&self.data_len().to_le_bytes());
        out
    }
}

/// Serialize samples as little-endian 16-bit PCM.
pub fn samples_to_bytes(samples: &[i16], out: &mut Vec<u8>) {
    out.reserve(samples.len() * 2);
    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let format = WaveFormat {
            num_samples: 1000,
            sample_rate: 22050,
            channels: 2,
            bits_per_sample: 16,
        };
        let h = format.header_bytes();
        assert_eq!(&h[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes([h[4], h[5], h[6], h[7]]), 36 + 2000);
        assert_eq!(&h[8..16], b"WAVEfmt ");
        assert_eq!(u32::from_le_bytes([h[16], h[17], h[18], h[19]]), 16);
        assert_eq!(u16::from_le_bytes([h[20], h[21]]), 1);
        assert_eq!(u16::from_le_bytes([h[22], h[23]]), 2);
        assert_eq!(u32::from_le_bytes([h[24], h[25], h[26], h[27]]), 22050);
        assert_eq!(u32::from_le_bytes([h[28], h[29], h[30], h[31]]), 88200);
        assert_eq!(u16::from_le_bytes([h[32], h[33]]), 4);
        assert_eq!(u16::from_le_bytes([h[34], h[35]]), 16);
        assert_eq!(&h[36..40], b"data");
        assert_eq!(u32::from_le_bytes([h[40], h[41], h[42], h[43]]), 2000);
    }

    #[test]
    fn test_samples_to_bytes() {
        let mut out = Vec::new();
        samples_to_bytes(&[1, -1], &mut out);
        assert_eq!(out, vec![0x01, 0x00, 0xFF, 0xFF]);
    }
}
