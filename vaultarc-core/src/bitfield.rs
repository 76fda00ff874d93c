//! Named bitfields and flag sets over arbitrary-precision integers.

use crate::error::{Result, VaultError};
use num_bigint::BigUint;

/// Named sub-fields decoded from one integer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitFieldValues {
    fields: Vec<(String, BigUint)>,
}

impl BitFieldValues {
    /// Value of a field by name.
    pub fn get(&self, name: &str) -> Option<&BigUint> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Value of a field by name, if it fits in a `u64`.
    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(|v| u64::try_from(v).ok())
    }

    /// Fields in template order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BigUint)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Named boolean flags decoded from one integer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    flags: Vec<(String, bool)>,
}

impl FlagSet {
    /// Flag state by name, `None` if the name was not in the template.
    pub fn get(&self, name: &str) -> Option<bool> {
        self.flags.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    /// Whether the named flag is set. Unknown names are unset.
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).unwrap_or(false)
    }

    /// Flags in template order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(n, v)| (n.as_str(), *v))
    }
}

/// Total width of a bitfield template, which must be a multiple of 8.
pub fn template_width(template: &[(&str, u32)]) -> Result<u32> {
    let total: u32 = template.iter().map(|(_, width)| *width).sum();
    let spare = total % 8;
    if spare != 0 {
        return Err(VaultError::BitFieldMisaligned { missing: 8 - spare });
    }
    Ok(total)
}

/// Split `value` into named fields listed from most to least significant.
pub fn decode_bitfield(value: &BigUint, template: &[(&str, u32)]) -> Result<BitFieldValues> {
    template_width(template)?;

    let mut fields = vec![(String::new(), BigUint::default()); template.len()];
    let mut shift = 0usize;
    for (slot, (name, width)) in fields.iter_mut().zip(template.iter()).rev() {
        let mask = (BigUint::from(1u8) << *width as usize) - 1u8;
        *slot = ((*name).to_string(), (value >> shift) & mask);
        shift += *width as usize;
    }
    Ok(BitFieldValues { fields })
}

/// Test `value` against named bitmasks.
pub fn decode_flags(value: &BigUint, flags: &[(&str, u64)]) -> FlagSet {
    let zero = BigUint::default();
    FlagSet {
        flags: flags
            .iter()
            .map(|(name, bits)| ((*name).to_string(), (value & &BigUint::from(*bits)) != zero))
            .collect(),
    }
}
