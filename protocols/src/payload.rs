//! Small fixed payloads: status words, power management, RSSI.

use wlbridge_common::device::PowerMode;

use crate::{PayloadError, ensure_len, read_u32};

pub const WORD_LEN: usize = 4;
pub const POWER_MODE_LEN: usize = 8;
pub const RSSI_REPORT_LEN: usize = 16;
/// Power manager priority of requests issued on the user's behalf.
pub const POWER_MANAGER_USER_PRIORITY: u32 = 0;

pub fn encode_word(value: u32) -> Vec<u8> {
    value.to_le_bytes().to_vec()
}

pub fn decode_word(bytes: &[u8]) -> Result<u32, PayloadError> {
    ensure_len(bytes, WORD_LEN)?;
    Ok(read_u32(bytes, 0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerModeBlock {
    pub mode: PowerMode,
    pub priority: u32,
}

impl PowerModeBlock {
    pub fn user(mode: PowerMode) -> Self {
        Self {
            mode,
            priority: POWER_MANAGER_USER_PRIORITY,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(POWER_MODE_LEN);
        buffer.extend_from_slice(&self.mode.code().to_le_bytes());
        buffer.extend_from_slice(&self.priority.to_le_bytes());
        buffer
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        ensure_len(bytes, POWER_MODE_LEN)?;
        let mode = PowerMode::try_from(read_u32(bytes, 0))
            .map_err(|_| PayloadError::InvalidField("power mode"))?;
        Ok(Self {
            mode,
            priority: read_u32(bytes, 4),
        })
    }
}

/// Signal strength of the current association, in dBm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RssiReport {
    /// Averaged over data frames.
    pub data: i8,
    /// Averaged over beacons.
    pub beacon: i8,
}

impl RssiReport {
    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = vec![0u8; RSSI_REPORT_LEN];
        buffer[0] = self.data as u8;
        buffer[1] = self.beacon as u8;
        buffer
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        ensure_len(bytes, RSSI_REPORT_LEN)?;
        Ok(Self {
            data: bytes[0] as i8,
            beacon: bytes[1] as i8,
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
    fn power_mode_block_rejects_unknown_mode() {
        let mut bytes = PowerModeBlock::user(PowerMode::Auto).encode();
        bytes[0] = 9;
        assert_eq!(
            PowerModeBlock::decode(&bytes),
            Err(PayloadError::InvalidField("power mode"))
        );
    }

    #[test]
    fn rssi_report_keeps_sign() {
        let report = RssiReport::decode(&RssiReport { data: -61, beacon: -58 }.encode()).unwrap();
        assert_eq!(report.data, -61);
        assert_eq!(report.beacon, -58);
    }

    #[test]
    fn decode_word_needs_four_bytes() {
        assert_eq!(decode_word(&[1, 0, 0, 0]), Ok(1));
        assert!(decode_word(&[1, 0]).is_err());
    }
}
