//! Device-level vocabulary shared by every layer.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Identifies one managed interface (e.g. `wlan0`).
///
/// Cheap to clone; collaborators receive it with every notification so that two
/// sessions never get mixed up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(Arc<str>);

impl SessionId {
    pub fn new(ifname: &str) -> Self {
        Self(Arc::from(ifname))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value outside the range a device enum accepts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{value} is not a valid {what}")]
pub struct UnknownValue {
    pub what: &'static str,
    pub value: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanKind {
    Active,
    Passive,
}

impl ScanKind {
    /// Device encoding of the scan type.
    pub fn code(self) -> u8 {
        match self {
            ScanKind::Passive => 0,
            ScanKind::Active => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    Auto,
    Active,
    ShortDoze,
    LongDoze,
    PsOnly,
}

impl PowerMode {
    pub fn code(self) -> u32 {
        match self {
            PowerMode::Auto => 0,
            PowerMode::Active => 1,
            PowerMode::ShortDoze => 2,
            PowerMode::LongDoze => 3,
            PowerMode::PsOnly => 4,
        }
    }
}

impl TryFrom<u32> for PowerMode {
    type Error = UnknownValue;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PowerMode::Auto),
            1 => Ok(PowerMode::Active),
            2 => Ok(PowerMode::ShortDoze),
            3 => Ok(PowerMode::LongDoze),
            4 => Ok(PowerMode::PsOnly),
            value => Err(UnknownValue { what: "power mode", value }),
        }
    }
}

/// Bluetooth coexistence mode as the supplicant's user interface numbers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoexMode {
    Enabled,
    Disabled,
    Sense,
}

impl CoexMode {
    pub fn code(self) -> u32 {
        match self {
            CoexMode::Enabled => 0,
            CoexMode::Disabled => 1,
            CoexMode::Sense => 2,
        }
    }

    /// The radio's own ("soft gemini") numbering of the same setting.
    pub fn device_code(self) -> u32 {
        match self {
            CoexMode::Disabled => 0,
            CoexMode::Sense => 1,
            CoexMode::Enabled => 2,
        }
    }
}

impl TryFrom<u32> for CoexMode {
    type Error = UnknownValue;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CoexMode::Enabled),
            1 => Ok(CoexMode::Disabled),
            2 => Ok(CoexMode::Sense),
            value => Err(UnknownValue { what: "coexistence mode", value }),
        }
    }
}

/// Classes of inbound frames an rx data filter can accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Frames addressed to our own hardware address.
    Own,
    Broadcast,
    Ipv4Multicast,
    Ipv6Multicast,
}

impl TryFrom<u32> for FilterKind {
    type Error = UnknownValue;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FilterKind::Own),
            1 => Ok(FilterKind::Broadcast),
            2 => Ok(FilterKind::Ipv4Multicast),
            3 => Ok(FilterKind::Ipv6Multicast),
            value => Err(UnknownValue { what: "filter kind", value }),
        }
    }
}

/// Single-shot notifications raised towards the supplicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Started,
    Stopped,
    /// The device is presumed unresponsive.
    Hung,
}

impl EventKind {
    /// State keyword of the supplicant's driver-state event.
    pub fn state(self) -> &'static str {
        match self {
            EventKind::Started => "STARTED",
            EventKind::Stopped => "STOPPED",
            EventKind::Hung => "HANGED",
        }
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
    fn filter_kind_rejects_unknown() {
        assert_eq!(FilterKind::try_from(3), Ok(FilterKind::Ipv6Multicast));
        assert!(FilterKind::try_from(4).is_err());
    }

    #[test]
    fn power_mode_rejects_max() {
        assert_eq!(PowerMode::try_from(4), Ok(PowerMode::PsOnly));
        assert_eq!(
            PowerMode::try_from(5),
            Err(UnknownValue { what: "power mode", value: 5 })
        );
    }

    #[test]
    fn coex_mode_maps_to_device_numbering() {
        assert_eq!(CoexMode::Enabled.device_code(), 2);
        assert_eq!(CoexMode::Sense.device_code(), 1);
        assert_eq!(CoexMode::Disabled.device_code(), 0);
        assert!(CoexMode::try_from(3).is_err());
    }
}
