//! # Scan Result Model
//!
//! One access point as reported by a single scan cycle.

use pnet::util::MacAddr;

use super::ssid::Ssid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResultEntry {
    pub bssid: MacAddr,
    pub ssid: Ssid,
    /// Signal level in device units; higher is better.
    pub level: i32,
    pub channel: u8,
    /// Capability bits and information elements, carried through untouched.
    pub security: Vec<u8>,
}

impl ScanResultEntry {
    pub fn new(bssid: MacAddr, level: i32) -> Self {
        Self {
            bssid,
            ssid: Ssid::broadcast(),
            level,
            channel: 0,
            security: Vec::new(),
        }
    }

    pub fn with_ssid(mut self, ssid: Ssid) -> Self {
        self.ssid = ssid;
        self
    }

    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_security(mut self, security: Vec<u8>) -> Self {
        self.security = security;
        self
    }
}
