//! Per-block subband decoding.
//!
//! Each block opens with a 4-bit increment exponent (unused) and a 16-bit
//! increment, followed by one 5-bit selector per subband choosing the
//! entropy decoder that fills that subband's column. Every decoded value is
//! multiplied by the increment before it is stored.

use crate::tables::{MAP_1BIT, MAP_2BIT, MAP_2BIT_FAR, MAP_3BIT, MUL_2X11, MUL_3X3, MUL_3X5};
use vaultarc_core::error::{Result, VaultError};
use vaultarc_core::ByteReader;

/// How a run of zeros is signalled before a mapped value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZeroEscape {
    /// `0` writes one zero.
    Single,
    /// `0` writes two zeros, `10` writes one zero.
    Double,
}

/// Outcome of checking the zero escape.
enum ZeroRun {
    /// Zeros were written; `true` if that completed the subband.
    Wrote(bool),
    /// A mapped value follows.
    Value,
}

/// Dense block of subband-domain samples, stored row-major.
#[derive(Debug, Clone)]
pub struct SubbandBlock {
    values: Vec<i32>,
    num_subbands: usize,
    subband_length: usize,
    row: usize,
    column: usize,
    filled: usize,
    increment: i32,
}

impl SubbandBlock {
    /// Allocate a block of `num_subbands` columns by `subband_length` rows.
    pub fn new(num_subbands: usize, subband_length: usize) -> Self {
        Self {
            values: vec![0; num_subbands * subband_length],
            num_subbands,
            subband_length,
            row: 0,
            column: 0,
            filled: 0,
            increment: 0,
        }
    }

    /// Samples in the block.
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    /// Mutable samples, for the merge transform.
    pub fn values_mut(&mut self) -> &mut [i32] {
        &mut self.values
    }

    /// Number of slots written since the last reset.
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Zero every slot and rewind the write position.
    pub fn reset(&mut self) {
        self.values.fill(0);
        self.row = 0;
        self.column = 0;
        self.filled = 0;
    }

    /// Decode one block from `reader`.
    ///
    /// On a truncated stream the error is returned with every slot written so
    /// far left in place and the remaining slots zero.
    pub fn read(&mut self, reader: &mut ByteReader<'_>) -> Result<()> {
        self.reset();

        let _max_increment = 1u32 << reader.read_bits(4)?;
        self.increment = reader.read_bits(16)? as i32;

        for subband in 0..self.num_subbands {
            let selector = reader.read_bits(5)?;
            self.decode_subband(reader, selector, subband)?;
        }
        Ok(())
    }

    fn decode_subband(
        &mut self,
        reader: &mut ByteReader<'_>,
        selector: u32,
        subband: usize,
    ) -> Result<()> {
        match selector {
            0 => self.fill_zero(),
            3..=16 => self.fill_linear(reader, selector),
            17 => self.fill_mapped(reader, &MAP_1BIT, 1, ZeroEscape::Double),
            18 => self.fill_mapped(reader, &MAP_1BIT, 1, ZeroEscape::Single),
            19 => self.fill_packed(reader, 5, &MUL_3X3, 8, 1),
            20 => self.fill_mapped(reader, &MAP_2BIT, 2, ZeroEscape::Double),
            21 => self.fill_mapped(reader, &MAP_2BIT, 2, ZeroEscape::Single),
            22 => self.fill_packed(reader, 7, &MUL_3X5, 8, 2),
            23 => self.fill_two_tier(reader, ZeroEscape::Double),
            24 => self.fill_two_tier(reader, ZeroEscape::Single),
            26 => self.fill_mapped(reader, &MAP_3BIT, 3, ZeroEscape::Double),
            27 => self.fill_mapped(reader, &MAP_3BIT, 3, ZeroEscape::Single),
            29 => self.fill_packed(reader, 7, &MUL_2X11, 4, 5),
            _ => Err(VaultError::unimplemented_selector(selector, subband)),
        }
    }

    /// Store one value; returns `true` when the current subband is complete.
    fn write(&mut self, value: i32) -> bool {
        let index = self.row * self.num_subbands + self.column;
        self.values[index] = value.wrapping_mul(self.increment);
        self.filled += 1;
        self.row += 1;
        if self.row == self.subband_length {
            self.row = 0;
            self.column += 1;
            if self.column == self.num_subbands {
                self.column = 0;
            }
            return true;
        }
        false
    }

    fn fill_zero(&mut self) -> Result<()> {
        while !self.write(0) {}
        Ok(())
    }

    fn fill_linear(&mut self, reader: &mut ByteReader<'_>, bits: u32) -> Result<()> {
        let middle = 1i32 << (bits - 1);
        loop {
            let raw = reader.read_bits(bits)? as i32;
            if self.write(raw - middle) {
                return Ok(());
            }
        }
    }

    fn zero_escape(
        &mut self,
        reader: &mut ByteReader<'_>,
        escape: ZeroEscape,
    ) -> Result<ZeroRun> {
        if escape == ZeroEscape::Double && reader.read_bits(1)? == 0 {
            if self.write(0) {
                return Ok(ZeroRun::Wrote(true));
            }
            return Ok(ZeroRun::Wrote(self.write(0)));
        }
        if reader.read_bits(1)? == 0 {
            return Ok(ZeroRun::Wrote(self.write(0)));
        }
        Ok(ZeroRun::Value)
    }

    fn fill_mapped(
        &mut self,
        reader: &mut ByteReader<'_>,
        map: &[i32],
        bits: u32,
        escape: ZeroEscape,
    ) -> Result<()> {
        loop {
            let done = match self.zero_escape(reader, escape)? {
                ZeroRun::Wrote(done) => done,
                ZeroRun::Value => {
                    let code = reader.read_bits(bits)? as usize;
                    self.write(map[code])
                }
            };
            if done {
                return Ok(());
            }
        }
    }

    fn fill_two_tier(&mut self, reader: &mut ByteReader<'_>, escape: ZeroEscape) -> Result<()> {
        loop {
            let done = match self.zero_escape(reader, escape)? {
                ZeroRun::Wrote(done) => done,
                ZeroRun::Value => {
                    if reader.read_bits(1)? == 0 {
                        let code = reader.read_bits(1)? as usize;
                        self.write(MAP_1BIT[code])
                    } else {
                        let code = reader.read_bits(2)? as usize;
                        self.write(MAP_2BIT_FAR[code])
                    }
                }
            };
            if done {
                return Ok(());
            }
        }
    }

    /// Several small values packed as nibbles behind one table index.
    fn fill_packed(
        &mut self,
        reader: &mut ByteReader<'_>,
        index_bits: u32,
        table: &[u16],
        max_shift: u32,
        bias: i32,
    ) -> Result<()> {
        loop {
            let index = reader.read_bits(index_bits)? as usize;
            let packed = *table.get(index).ok_or_else(|| {
                VaultError::corrupted(
                    reader.offset() as u64,
                    format!("packed table index {} out of range {}", index, table.len()),
                )
            })?;
            let mut shift = 0;
            while shift <= max_shift {
                let value = i32::from((packed >> shift) & 0x0F) - bias;
                if self.write(value) {
                    return Ok(());
                }
                shift += 4;
            }
        }
    }
}
