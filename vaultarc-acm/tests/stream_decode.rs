//! End-to-end decoding of synthetic ACM streams.

use proptest::prelude::*;
use vaultarc_acm::{ACM_MAGIC, AcmDecoder, AcmOptions, WAVC_MAGIC};
use vaultarc_core::VaultError;

#[derive(Default)]
struct Bits {
    bytes: Vec<u8>,
    acc: u64,
    count: u32,
}

impl Bits {
    fn put(&mut self, value: u32, bits: u32) -> &mut Self {
        self.acc |= (u64::from(value) & ((1u64 << bits) - 1)) << self.count;
        self.count += bits;
        while self.count >= 8 {
            self.bytes.push(self.acc as u8);
            self.acc >>= 8;
            self.count -= 8;
        }
        self
    }

    fn finish(mut self) -> Vec<u8> {
        if self.count > 0 {
            self.bytes.push(self.acc as u8);
        }
        self.bytes
    }
}

fn header(bits: &mut Bits, samples: u32, channels: u32, level: u32, length: u32) {
    bits.put(ACM_MAGIC, 24)
        .put(1, 8)
        .put(samples, 32)
        .put(channels, 16)
        .put(22050, 16)
        .put(level, 4)
        .put(length, 12);
}

/// One block whose subbands are each a single 4-bit linear value.
fn linear_block(bits: &mut Bits, values: &[i32]) {
    bits.put(0, 4).put(1, 16);
    for &v in values {
        bits.put(4, 5).put((v + 8) as u32, 4);
    }
}

fn two_subband_stream() -> Vec<u8> {
    let mut bits = Bits::default();
    header(&mut bits, 2, 2, 1, 1);
    linear_block(&mut bits, &[5, 7]);
    bits.finish()
}

#[test]
fn test_merge_applied_and_shifted() {
    let data = two_subband_stream();
    let mut decoder = AcmDecoder::new(&data, AcmOptions::default()).unwrap();
    // merged [5, 3] shifted right by the level
    assert_eq!(decoder.decode_to_vec().unwrap(), vec![2, 1]);
}

#[test]
fn test_restart_reproduces_after_clearing_history() {
    let data = two_subband_stream();
    let mut decoder = AcmDecoder::new(&data, AcmOptions::default()).unwrap();

    let first = decoder.decode_to_vec().unwrap();

    let carried = decoder.decode_to_vec().unwrap();
    assert_ne!(first, carried);
    assert_eq!(carried, vec![12, -2]);

    decoder.restart().unwrap();
    decoder.clear_history();
    assert_eq!(decoder.decode_to_vec().unwrap(), first);
}

#[test]
fn test_level_zero_passes_values_through() {
    let mut bits = Bits::default();
    header(&mut bits, 3, 1, 0, 3);
    bits.put(0, 4).put(1, 16).put(4, 5);
    for v in [-8, 0, 7] {
        bits.put((v + 8) as u32, 4);
    }
    let data = bits.finish();

    let mut decoder = AcmDecoder::new(&data, AcmOptions::default()).unwrap();
    assert_eq!(decoder.decode_to_vec().unwrap(), vec![-8, 0, 7]);
}

#[test]
fn test_short_stream_ends_without_error() {
    let mut bits = Bits::default();
    header(&mut bits, 100, 1, 1, 1);
    linear_block(&mut bits, &[1, 1]);
    let data = bits.finish();

    let mut decoder = AcmDecoder::new(&data, AcmOptions::default()).unwrap();
    let samples = decoder.decode_to_vec().unwrap();
    assert!(samples.len() < 100);
    assert!(!samples.is_empty());
    assert!(!decoder.in_progress());
}

#[test]
fn test_channel_override() {
    let data = two_subband_stream();
    let decoder = AcmDecoder::new(&data, AcmOptions::default()).unwrap();
    assert_eq!(decoder.header().channels, 2);

    let mut bits = Bits::default();
    header(&mut bits, 2, 1, 1, 1);
    linear_block(&mut bits, &[0, 0]);
    let mono = bits.finish();
    let stored = AcmDecoder::new(&mono, AcmOptions::default().with_channels(None)).unwrap();
    assert_eq!(stored.header().channels, 1);
    let forced = AcmDecoder::new(&mono, AcmOptions::default()).unwrap();
    assert_eq!(forced.header().channels, 2);
}

#[test]
fn test_wavc_wrapper_rejected() {
    let mut bits = Bits::default();
    bits.put(WAVC_MAGIC, 24).put(u32::from(b'C'), 8);
    let data = bits.finish();
    let err = AcmDecoder::new(&data, AcmOptions::default()).unwrap_err();
    assert!(matches!(err, VaultError::UnsupportedWrapper { .. }));
    assert!(err.is_format_error());
}

#[test]
fn test_wave_header_reports_sample_rate() {
    let data = two_subband_stream();
    let wave = vaultarc_acm::decode_acm_to_wave(&data, AcmOptions::default()).unwrap();
    assert_eq!(&wave[0..4], b"RIFF");
    assert_eq!(u32::from_le_bytes([wave[24], wave[25], wave[26], wave[27]]), 22050);
    assert_eq!(wave.len(), vaultarc_acm::WAVE_HEADER_LEN + 4);
}

proptest! {
    #[test]
    fn prop_block_lengths_sum_to_sample_count(samples in 1u32..60, length in 1u32..5) {
        let block_len = 2 * length;
        let blocks = samples.div_ceil(block_len);

        let mut bits = Bits::default();
        header(&mut bits, samples, 2, 1, length);
        for _ in 0..blocks {
            bits.put(0, 4).put(1, 16).put(0, 5).put(0, 5);
        }
        let data = bits.finish();

        let mut decoder = AcmDecoder::new(&data, AcmOptions::default()).unwrap();
        let mut total = 0usize;
        while let Some(block) = decoder.next_block().unwrap() {
            prop_assert!(block.len() <= block_len as usize);
            total += block.len();
        }
        prop_assert_eq!(total, samples as usize);
    }
}
