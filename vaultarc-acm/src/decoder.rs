//! Pull-based ACM block decoder.
//!
//! [`AcmDecoder`] owns the bit cursor, the subband block and the wrap history.
//! Each call to [`AcmDecoder::next_block`] decodes and merges one block and
//! hands back its PCM samples. When the declared sample count has been
//! produced, or the input runs out, the next call returns `None` and rewinds
//! the decoder to the first block so another pass can begin.

use crate::block::SubbandBlock;
use crate::header::AcmHeader;
use crate::merge::merge_subbands;
use crate::wav::{WAVE_HEADER_LEN, WaveFormat, samples_to_bytes};
use tracing::{debug, warn};
use vaultarc_core::ByteReader;
use vaultarc_core::error::{Result, VaultError};

/// Options for opening an ACM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcmOptions {
    /// Channel count to report instead of the stored one. `None` keeps the
    /// stored value. Defaults to 2, since the stored count is often wrong.
    pub channels: Option<u16>,
    /// Whether [`AcmDecoder::to_bytes`] prepends a WAVE header.
    pub wave_header: bool,
    /// Unwrap streams that carry a WAVC sub-header instead of rejecting them.
    pub accept_wavc: bool,
}

impl Default for AcmOptions {
    fn default() -> Self {
        Self {
            channels: Some(2),
            wave_header: true,
            accept_wavc: false,
        }
    }
}

impl AcmOptions {
    /// Set the channel override.
    pub fn with_channels(mut self, channels: Option<u16>) -> Self {
        self.channels = channels;
        self
    }

    /// Set whether a WAVE header is emitted.
    pub fn with_wave_header(mut self, wave_header: bool) -> Self {
        self.wave_header = wave_header;
        self
    }

    /// Set whether WAVC-wrapped streams are accepted.
    pub fn with_accept_wavc(mut self, accept_wavc: bool) -> Self {
        self.accept_wavc = accept_wavc;
        self
    }
}

/// Stateful decoder over one ACM stream.
#[derive(Debug)]
pub struct AcmDecoder<'a> {
    reader: ByteReader<'a>,
    header: AcmHeader,
    options: AcmOptions,
    block: SubbandBlock,
    wrap: Vec<i32>,
    output: Vec<i16>,
    produced: usize,
    in_progress: bool,
    exhausted: bool,
}

impl<'a> AcmDecoder<'a> {
    /// Parse the header of `data` and prepare for decoding.
    pub fn new(data: &'a [u8], options: AcmOptions) -> Result<Self> {
        let mut reader = ByteReader::little(data);
        let header = AcmHeader::read(&mut reader, &options)?;

        debug!(
            samples = header.num_samples,
            channels = header.channels,
            rate = header.sample_rate,
            level = header.level,
            subband_length = header.subband_length,
            "opened ACM stream"
        );

        let block = SubbandBlock::new(header.num_subbands(), header.subband_length as usize);
        Ok(Self {
            reader,
            block,
            wrap: vec![0; header.wrap_length()],
            output: Vec::with_capacity(header.block_length()),
            header,
            options,
            produced: 0,
            in_progress: false,
            exhausted: false,
        })
    }

    /// Parsed stream header.
    pub fn header(&self) -> &AcmHeader {
        &self.header
    }

    /// Options the decoder was opened with.
    pub fn options(&self) -> &AcmOptions {
        &self.options
    }

    /// Whether a pull pass has started and not yet finished.
    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Samples produced so far in the current pass.
    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Decode the next block.
    ///
    /// Returns `Ok(None)` once the pass is over, after rewinding to the first
    /// block. The wrap history is kept across passes; see
    /// [`clear_history`](Self::clear_history).
    pub fn next_block(&mut self) -> Result<Option<&[i16]>> {
        let total = self.header.num_samples as usize;
        if self.exhausted || self.produced >= total {
            self.restart()?;
            return Ok(None);
        }
        self.in_progress = true;

        if let Err(err) = self.block.read(&mut self.reader) {
            if !err.is_truncated() {
                self.restart()?;
                return Err(err);
            }
            self.exhausted = true;
            if self.block.filled() == 0 {
                warn!(
                    produced = self.produced,
                    expected = total,
                    "ACM stream ended before the declared sample count"
                );
                self.restart()?;
                return Ok(None);
            }
        }

        merge_subbands(&self.header, self.block.values_mut(), &mut self.wrap);

        let count = (total - self.produced).min(self.header.block_length());
        let shift = self.header.level;
        self.output.clear();
        self.output.extend(
            self.block.values()[..count]
                .iter()
                .map(|&value| (value >> shift) as i16),
        );
        self.produced += count;

        if self.exhausted && self.produced < total {
            warn!(
                produced = self.produced,
                expected = total,
                "ACM stream ended before the declared sample count"
            );
        }
        Ok(Some(self.output.as_slice()))
    }

    /// Rewind to the first block, ending any pass in progress.
    pub fn restart(&mut self) -> Result<()> {
        self.reader.seek(self.header.data_offset)?;
        self.block.reset();
        self.produced = 0;
        self.in_progress = false;
        self.exhausted = false;
        Ok(())
    }

    /// Zero the wrap history carried between blocks.
    pub fn clear_history(&mut self) {
        self.wrap.fill(0);
    }

    /// Decode a whole pass into `out`, returning the number of samples written.
    ///
    /// `out` must hold the declared sample count.
    pub fn decode_into(&mut self, out: &mut [i16]) -> Result<usize> {
        self.ensure_idle()?;
        let needed = self.header.num_samples as usize;
        if out.len() < needed {
            return Err(VaultError::buffer_too_small(needed, out.len()));
        }

        let mut written = 0;
        while let Some(block) = self.next_block()? {
            out[written..written + block.len()].copy_from_slice(block);
            written += block.len();
        }
        Ok(written)
    }

    /// Decode a whole pass into `out` as a WAVE file, returning the number of
    /// bytes written.
    ///
    /// `out` must hold the header plus the declared sample count. The header
    /// describes the samples actually decoded, which is fewer on a short
    /// stream.
    pub fn decode_wave_into(&mut self, out: &mut [u8]) -> Result<usize> {
        self.ensure_idle()?;
        let needed = WAVE_HEADER_LEN + self.header.num_samples as usize * 2;
        if out.len() < needed {
            return Err(VaultError::buffer_too_small(needed, out.len()));
        }

        let mut pos = WAVE_HEADER_LEN;
        while let Some(block) = self.next_block()? {
            for sample in block {
                out[pos..pos + 2].copy_from_slice(&sample.to_le_bytes());
                pos += 2;
            }
        }

        let format = WaveFormat {
            num_samples: ((pos - WAVE_HEADER_LEN) / 2) as u32,
            ..WaveFormat::from_acm(&self.header)
        };
        out[..WAVE_HEADER_LEN].copy_from_slice(&format.header_bytes());
        Ok(pos)
    }

    /// Decode a whole pass into a new vector.
    pub fn decode_to_vec(&mut self) -> Result<Vec<i16>> {
        self.ensure_idle()?;
        let mut samples = Vec::new();
        while let Some(block) = self.next_block()? {
            samples.extend_from_slice(block);
        }
        Ok(samples)
    }

    /// Decode a whole pass as a WAVE file.
    pub fn decode_to_wave(&mut self) -> Result<Vec<u8>> {
        let samples = self.decode_to_vec()?;
        Ok(self.encode(&samples, true))
    }

    /// Decode a whole pass as bytes, with a WAVE header if the options ask
    /// for one.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let samples = self.decode_to_vec()?;
        Ok(self.encode(&samples, self.options.wave_header))
    }

    /// Iterate over decoded blocks. The iterator stops after the first error.
    pub fn blocks(&mut self) -> AcmBlocks<'_, 'a> {
        AcmBlocks {
            decoder: self,
            done: false,
        }
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.in_progress {
            return Err(VaultError::PassInProgress);
        }
        Ok(())
    }

    fn encode(&self, samples: &[i16], wave_header: bool) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(samples.len() * 2 + WAVE_HEADER_LEN);
        if wave_header {
            let format = WaveFormat {
                num_samples: samples.len() as u32,
                ..WaveFormat::from_acm(&self.header)
            };
            bytes.extend_from_slice(&format.header_bytes());
        }
        samples_to_bytes(samples, &mut bytes);
        bytes
    }
}

/// Iterator over the blocks of one pass. See [`AcmDecoder::blocks`].
#[derive(Debug)]
pub struct AcmBlocks<'d, 'a> {
    decoder: &'d mut AcmDecoder<'a>,
    done: bool,
}

impl Iterator for AcmBlocks<'_, '_> {
    type Item = Result<Vec<i16>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.decoder.next_block() {
            Ok(Some(block)) => Some(Ok(block.to_vec())),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for AcmBlocks<'_, '_> {}
