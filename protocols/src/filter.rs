//! Rx data filter request and statistics blocks.
//!
//! A filter matches `pattern` against the frame starting at `offset`. Each mask
//! bit enables one pattern byte; one mask byte covers a granule of eight pattern
//! bytes.

use wlbridge_common::network::mac::ETH_ALEN;

use crate::{PayloadError, ensure_len, read_u32};

pub const MAX_MASK_LEN: usize = 8;
pub const MAX_DATA_FILTER_PATTERN_LEN: usize = 64;
/// Patterns are hardware-address prefixes, never longer than an address.
pub const MAX_PATTERN_LEN: usize = ETH_ALEN;
pub const MAX_DATA_FILTERS: usize = 4;

pub const FILTER_REQUEST_LEN: usize = 3 + MAX_MASK_LEN + MAX_DATA_FILTER_PATTERN_LEN;
pub const FILTER_STATISTICS_LEN: usize = 4 + 4 * MAX_DATA_FILTERS;

const GRANULE: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterDescriptor {
    offset: u8,
    mask: Vec<u8>,
    pattern: Vec<u8>,
}

impl FilterDescriptor {
    /// Descriptor matching `pattern` at the start of the frame with every
    /// pattern byte enabled.
    pub fn new(pattern: &[u8]) -> Result<Self, PayloadError> {
        if pattern.is_empty() || pattern.len() > MAX_PATTERN_LEN {
            return Err(PayloadError::PatternLength(pattern.len()));
        }

        let mask = pattern
            .chunks(GRANULE)
            .map(|granule| ((1u16 << granule.len()) - 1) as u8)
            .collect();

        Ok(Self {
            offset: 0,
            mask,
            pattern: pattern.to_vec(),
        })
    }

    pub fn offset(&self) -> u8 {
        self.offset
    }

    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buffer: Vec<u8> = vec![0u8; FILTER_REQUEST_LEN];
        let mut cursor: usize = 0;

        buffer[cursor] = self.offset;
        cursor += 1;
        buffer[cursor] = self.mask.len() as u8;
        cursor += 1;
        buffer[cursor..cursor + self.mask.len()].copy_from_slice(&self.mask);
        cursor += MAX_MASK_LEN;
        buffer[cursor] = self.pattern.len() as u8;
        cursor += 1;
        buffer[cursor..cursor + self.pattern.len()].copy_from_slice(&self.pattern);

        buffer
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        ensure_len(bytes, FILTER_REQUEST_LEN)?;

        let mask_len = bytes[1] as usize;
        let pattern_len = bytes[2 + MAX_MASK_LEN] as usize;
        if mask_len > MAX_MASK_LEN {
            return Err(PayloadError::InvalidField("mask length"));
        }
        if pattern_len == 0 || pattern_len > MAX_PATTERN_LEN {
            return Err(PayloadError::PatternLength(pattern_len));
        }
        if mask_len != pattern_len.div_ceil(GRANULE) {
            return Err(PayloadError::InvalidField("mask length"));
        }

        let pattern_start = 3 + MAX_MASK_LEN;
        Ok(Self {
            offset: bytes[0],
            mask: bytes[2..2 + mask_len].to_vec(),
            pattern: bytes[pattern_start..pattern_start + pattern_len].to_vec(),
        })
    }
}

/// Per-filter match counters kept by the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStatistics {
    pub unmatched: u32,
    pub matched: [u32; MAX_DATA_FILTERS],
}

impl FilterStatistics {
    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(FILTER_STATISTICS_LEN);
        buffer.extend_from_slice(&self.unmatched.to_le_bytes());
        for count in self.matched {
            buffer.extend_from_slice(&count.to_le_bytes());
        }
        buffer
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        ensure_len(bytes, FILTER_STATISTICS_LEN)?;
        let mut matched = [0u32; MAX_DATA_FILTERS];
        for (idx, slot) in matched.iter_mut().enumerate() {
            *slot = read_u32(bytes, 4 + idx * 4);
        }
        Ok(Self {
            unmatched: read_u32(bytes, 0),
            matched,
        })
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_byte_pattern_uses_one_mask_byte() {
        let desc = FilterDescriptor::new(&[0xff; 6]).unwrap();
        assert_eq!(desc.offset(), 0);
        assert_eq!(desc.mask(), &[0x3f]);
        assert_eq!(desc.pattern().len(), 6);
    }

    #[test]
    fn mask_tracks_pattern_length() {
        assert_eq!(FilterDescriptor::new(&[0x01, 0x00, 0x5e]).unwrap().mask(), &[0x07]);
        assert_eq!(FilterDescriptor::new(&[0x33, 0x33]).unwrap().mask(), &[0x03]);
    }

    #[test]
    fn rejects_patterns_longer_than_an_address() {
        assert_eq!(
            FilterDescriptor::new(&[0u8; 7]),
            Err(PayloadError::PatternLength(7))
        );
        assert_eq!(FilterDescriptor::new(&[]), Err(PayloadError::PatternLength(0)));
    }

    #[test]
    fn encode_lays_out_fixed_fields() {
        let bytes = FilterDescriptor::new(&[0x33, 0x33]).unwrap().encode();
        assert_eq!(bytes.len(), FILTER_REQUEST_LEN);
        assert_eq!(&bytes[..3], &[0, 1, 0x03]);
        assert_eq!(bytes[2 + MAX_MASK_LEN], 2);
        assert_eq!(&bytes[3 + MAX_MASK_LEN..5 + MAX_MASK_LEN], &[0x33, 0x33]);
        assert!(bytes[5 + MAX_MASK_LEN..].iter().all(|b| *b == 0));
    }

    #[test]
    fn decode_rejects_mismatched_mask_width() {
        let mut bytes = FilterDescriptor::new(&[0xff; 6]).unwrap().encode();
        bytes[1] = 2;
        assert_eq!(
            FilterDescriptor::decode(&bytes),
            Err(PayloadError::InvalidField("mask length"))
        );
    }

    #[test]
    fn statistics_decode_reads_counters_in_order() {
        let mut bytes = Vec::new();
        for word in [7u32, 1, 2, 3, 4] {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        let stats = FilterStatistics::decode(&bytes).unwrap();
        assert_eq!(stats.unmatched, 7);
        assert_eq!(stats.matched, [1, 2, 3, 4]);
    }
}
