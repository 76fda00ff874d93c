//! ACM audio to WAVE.

use super::{Asset, AssetDecoder, DecoderOptions};
use vaultarc_acm::AcmDecoder as StreamDecoder;
use vaultarc_core::error::Result;

/// [`AssetDecoder`] for `.acm`. Produces PCM, with a WAVE header unless the
/// ACM options turn it off.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcmDecoder;

impl AssetDecoder for AcmDecoder {
    fn name(&self) -> &str {
        "ACM"
    }

    fn decode(&self, data: Vec<u8>, options: &DecoderOptions) -> Result<Asset> {
        let mut decoder = StreamDecoder::new(&data, options.acm)?;
        let header = *decoder.header();
        let bytes = decoder.to_bytes()?;
        Ok(Asset::Audio {
            bytes,
            sample_rate: u32::from(header.sample_rate),
            channels: header.channels,
            wave_header: options.acm.wave_header,
        })
    }
}
