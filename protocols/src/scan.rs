//! # Application scan parameter block
//!
//! Fixed-shape request handed to the radio with [`Opcode::StartAppScan`](crate::Opcode).
//!
//! Layout (little endian):
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 1 | desired SSID length |
//! | 1 | 32 | desired SSID, zero padded |
//! | 33 | 1 | scan type |
//! | 34 | 1 | band |
//! | 35 | 1 | probe requests per channel |
//! | 36 | 4 | probe request rate mask |
//! | 40 | 1 | TID |
//! | 41 | 1 | number of channel entries |
//! | 42 | 2 | reserved |
//! | 44 | 18 × [`MAX_CHANNELS`] | channel entries |

use pnet::util::MacAddr;
use wlbridge_common::config::MAX_CHANNELS_PER_SCAN;
use wlbridge_common::device::ScanKind;
use wlbridge_common::network::mac;
use wlbridge_common::network::ssid::{MAX_SSID_LEN, Ssid};

use crate::{PayloadError, ensure_len, read_u32};

pub const MAX_CHANNELS: usize = MAX_CHANNELS_PER_SCAN as usize;
/// Per-channel residency of a broadcast active scan.
pub const SHORT_DWELL_US: u32 = 30_000;
/// Per-channel residency of passive scans and directed probes.
pub const LONG_DWELL_US: u32 = 110_000;
pub const PROBE_REQUESTS_PER_CHANNEL: u8 = 3;
pub const DEFAULT_TX_POWER: u8 = 205;
pub const BAND_2_4_GHZ: u8 = 0;
/// Let the firmware pick the probe request rate.
pub const RATE_MASK_UNSPECIFIED: u32 = 0;
pub const ET_COND_DISABLE: u8 = 0;

const HEADER_LEN: usize = 44;
const ENTRY_LEN: usize = 18;
pub const SCAN_PARAMS_LEN: usize = HEADER_LEN + ENTRY_LEN * MAX_CHANNELS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEntry {
    pub channel: u8,
    pub bssid: MacAddr,
    pub min_dwell_us: u32,
    pub max_dwell_us: u32,
    pub early_termination: u8,
    pub et_max_frames: u8,
    pub tx_power: u8,
}

impl ChannelEntry {
    /// Entry that accepts any BSS on `channel` and never terminates early.
    pub fn new(channel: u8, dwell_us: u32) -> Self {
        Self {
            channel,
            bssid: MacAddr::broadcast(),
            min_dwell_us: dwell_us,
            max_dwell_us: dwell_us,
            early_termination: ET_COND_DISABLE,
            et_max_frames: 0,
            tx_power: DEFAULT_TX_POWER,
        }
    }

    fn encode_into(&self, buf: &mut [u8]) {
        buf[0..6].copy_from_slice(&self.bssid.octets());
        buf[6..10].copy_from_slice(&self.max_dwell_us.to_le_bytes());
        buf[10..14].copy_from_slice(&self.min_dwell_us.to_le_bytes());
        buf[14] = self.early_termination;
        buf[15] = self.et_max_frames;
        buf[16] = self.tx_power;
        buf[17] = self.channel;
    }

    fn decode(buf: &[u8]) -> Result<Self, PayloadError> {
        Ok(Self {
            bssid: mac::from_bytes(&buf[0..6]).ok_or(PayloadError::InvalidField("bssid"))?,
            max_dwell_us: read_u32(buf, 6),
            min_dwell_us: read_u32(buf, 10),
            early_termination: buf[14],
            et_max_frames: buf[15],
            tx_power: buf[16],
            channel: buf[17],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub kind: ScanKind,
    /// Present only for directed probing.
    pub ssid: Option<Ssid>,
    pub band: u8,
    pub probe_requests: u8,
    pub channels: Vec<ChannelEntry>,
}

impl ScanRequest {
    /// Sweeps channels `1..=channel_count` with the same dwell on each.
    pub fn new(kind: ScanKind, channel_count: u8, dwell_us: u32) -> Result<Self, PayloadError> {
        let count = channel_count as usize;
        if count == 0 || count > MAX_CHANNELS {
            return Err(PayloadError::ChannelCount(count));
        }

        let channels = (1..=channel_count)
            .map(|channel| ChannelEntry::new(channel, dwell_us))
            .collect();

        Ok(Self {
            kind,
            ssid: None,
            band: BAND_2_4_GHZ,
            probe_requests: PROBE_REQUESTS_PER_CHANNEL,
            channels,
        })
    }

    pub fn with_ssid(mut self, ssid: Ssid) -> Self {
        self.ssid = Some(ssid);
        self
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buffer: Vec<u8> = vec![0u8; SCAN_PARAMS_LEN];

        if let Some(ssid) = &self.ssid {
            buffer[0] = ssid.len() as u8;
            buffer[1..1 + ssid.len()].copy_from_slice(ssid.as_bytes());
        }
        buffer[33] = self.kind.code();
        buffer[34] = self.band;
        buffer[35] = self.probe_requests;
        buffer[36..40].copy_from_slice(&RATE_MASK_UNSPECIFIED.to_le_bytes());
        buffer[40] = 0;
        buffer[41] = self.channels.len() as u8;

        for (idx, entry) in self.channels.iter().take(MAX_CHANNELS).enumerate() {
            let start = HEADER_LEN + idx * ENTRY_LEN;
            entry.encode_into(&mut buffer[start..start + ENTRY_LEN]);
        }

        buffer
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        ensure_len(bytes, SCAN_PARAMS_LEN)?;

        let ssid_len = bytes[0] as usize;
        if ssid_len > MAX_SSID_LEN {
            return Err(PayloadError::InvalidField("ssid length"));
        }
        let ssid = match ssid_len {
            0 => None,
            len => Some(
                Ssid::new(&bytes[1..1 + len]).map_err(|_| PayloadError::InvalidField("ssid"))?,
            ),
        };

        let kind = match bytes[33] {
            0 => ScanKind::Passive,
            1 => ScanKind::Active,
            _ => return Err(PayloadError::InvalidField("scan type")),
        };

        let count = bytes[41] as usize;
        if count == 0 || count > MAX_CHANNELS {
            return Err(PayloadError::ChannelCount(count));
        }
        let channels = (0..count)
            .map(|idx| {
                let start = HEADER_LEN + idx * ENTRY_LEN;
                ChannelEntry::decode(&bytes[start..start + ENTRY_LEN])
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            kind,
            ssid,
            band: bytes[34],
            probe_requests: bytes[35],
            channels,
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
