//! Address decomposition.
//!
//! An address splits into three bit fields, low to high: the block offset,
//! the set index and the tag. Block size and set count are powers of two, so
//! each field is a shift followed by a mask.

use std::ops::Not;

use crate::error::CacheError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Addr {
    pub offset: u64,
    pub set: usize,
    pub tag: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct BitSection {
    shift: u32,
    mask: u64,
}

impl BitSection {
    fn apply(&self, num: u64) -> u64 {
        (num >> self.shift) & self.mask
    }
}

/// Field layout for one cache geometry.
#[derive(Debug, Clone, Copy)]
pub struct AddrLayout {
    offset_sec: BitSection,
    set_sec: BitSection,
    tag_sec: BitSection,
}

impl AddrLayout {
    /// Both arguments must be powers of two.
    pub fn new(block_size: u64, n_sets: u64) -> Self {
        debug_assert!(block_size.is_power_of_two());
        debug_assert!(n_sets.is_power_of_two());

        let offset_sec = BitSection {
            shift: 0,
            mask: block_size - 1,
        };

        let set_shift = block_size.ilog2();
        let set_sec = BitSection {
            shift: set_shift,
            mask: n_sets - 1,
        };

        let tag_shift = n_sets.ilog2() + set_shift;
        let tag_sec = BitSection {
            shift: tag_shift,
            mask: 0u64.not(),
        };

        AddrLayout {
            offset_sec,
            set_sec,
            tag_sec,
        }
    }

    pub fn split(&self, addr: u64) -> Addr {
        let offset = self.offset_sec.apply(addr);
        let set = self.set_sec.apply(addr) as usize;
        let tag = self.tag_sec.apply(addr);
        Addr { offset, set, tag }
    }

    pub fn offset_bits(&self) -> u32 {
        self.set_sec.shift
    }

    pub fn index_bits(&self) -> u32 {
        self.tag_sec.shift - self.set_sec.shift
    }
}

/// Parses a decimal or `0x`-prefixed hexadecimal address literal.
///
/// Anything that is not a non-negative integer, such as `-4` or `12.5`, is
/// rejected with [`CacheError::InvalidAddress`].
pub fn parse_address(raw: &str) -> Result<u64, CacheError> {
    let text = raw.trim();
    let parsed = if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16)
    } else {
        text.parse::<u64>()
    };
    parsed.map_err(|_| CacheError::InvalidAddress(raw.to_string()))
}

pub fn from_signed(addr: i64) -> Result<u64, CacheError> {
    u64::try_from(addr).map_err(|_| CacheError::InvalidAddress(addr.to_string()))
}
