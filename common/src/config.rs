use std::time::Duration;

use crate::device::ScanKind;

/// Channel count of the FCC regulatory domain, used when the platform says nothing.
pub const NUMBER_SCAN_CHANNELS_FCC: u8 = 11;
/// Upper bound on the per-channel entries a single scan request can carry.
pub const MAX_CHANNELS_PER_SCAN: u8 = 14;
/// Time the device needs after a start command before further commands are meaningful.
pub const START_SETTLE_DELAY: Duration = Duration::from_millis(400);
/// Logical scan-duration guard armed after every accepted scan request.
pub const SCAN_TIMEOUT: Duration = Duration::from_secs(15);

const SCAN_CHANNELS_ENV: &str = "WLBRIDGE_SCAN_CHANNELS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of channels swept by each scan request, starting at channel 1.
    pub scan_channels: u8,
    /// Scan kind used unless a directed scan forces active probing.
    pub scan_kind: ScanKind,
    /// Delay observed after a successful start command.
    pub settle_delay: Duration,
    /// Completion deadline armed after each scan request.
    pub scan_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_channels: NUMBER_SCAN_CHANNELS_FCC,
            scan_kind: ScanKind::Active,
            settle_delay: START_SETTLE_DELAY,
            scan_timeout: SCAN_TIMEOUT,
        }
    }
}

impl Config {
    /// Builds the defaults, taking the platform channel count from
    /// `WLBRIDGE_SCAN_CHANNELS` when it holds a usable value.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(channels) = std::env::var(SCAN_CHANNELS_ENV)
            .ok()
            .and_then(|raw| parse_channel_count(&raw))
        {
            cfg.scan_channels = channels;
        }
        cfg
    }
}

fn parse_channel_count(raw: &str) -> Option<u8> {
    match raw.trim().parse::<u8>() {
        Ok(n) if n > 0 && n <= MAX_CHANNELS_PER_SCAN => Some(n),
        Ok(n) => {
            tracing::warn!("Ignoring out-of-range platform channel count {n}");
            None
        }
        Err(_) => None,
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
