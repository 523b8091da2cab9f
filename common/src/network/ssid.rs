use std::fmt;

use thiserror::Error;

/// Maximum length of an SSID in octets.
pub const MAX_SSID_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("SSID of {0} bytes exceeds the {MAX_SSID_LEN}-byte limit")]
pub struct SsidTooLong(pub usize);

/// Network identifier advertised by an access point.
///
/// The length bound is enforced on construction, so an `Ssid` always fits the
/// scan request's identifier field. The empty SSID is the broadcast (wildcard)
/// identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Ssid(Vec<u8>);

impl Ssid {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, SsidTooLong> {
        let bytes = bytes.into();
        if bytes.len() > MAX_SSID_LEN {
            return Err(SsidTooLong(bytes.len()));
        }
        Ok(Self(bytes))
    }

    pub fn broadcast() -> Self {
        Self(Vec::new())
    }

    pub fn is_broadcast(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<&str> for Ssid {
    type Error = SsidTooLong;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.as_bytes())
    }
}

impl fmt::Display for Ssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
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
    fn accepts_up_to_32_bytes() {
        assert!(Ssid::new(vec![b'a'; 32]).is_ok());
        assert_eq!(Ssid::new(vec![b'a'; 33]), Err(SsidTooLong(33)));
    }

    #[test]
    fn empty_is_broadcast() {
        assert!(Ssid::try_from("").unwrap().is_broadcast());
        assert!(!Ssid::try_from("CorpNet").unwrap().is_broadcast());
    }
}
