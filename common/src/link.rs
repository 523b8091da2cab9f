//! Generic link-layer collaborators.
//!
//! The bridge forwards these operations after checking that the device is loaded;
//! implementing them is the job of the wireless-extensions layer underneath.

use pnet::util::MacAddr;
use thiserror::Error;

use crate::network::bss::ScanResultEntry;
use crate::network::ssid::Ssid;

pub const IFF_UP: u32 = 0x1;
pub const PMKID_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("{0} is not supported by this link layer")]
    Unsupported(&'static str),
    #[error("link-control request failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Pairwise master key cache operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PmksaOp {
    Add { bssid: MacAddr, pmkid: [u8; PMKID_LEN] },
    Remove { bssid: MacAddr, pmkid: [u8; PMKID_LEN] },
    Flush,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MlmeOp {
    Deauthenticate,
    Disassociate,
}

/// Key installation request. `alg` uses the supplicant's own numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParams {
    pub alg: u32,
    pub addr: MacAddr,
    pub index: u8,
    pub set_tx: bool,
    pub seq: Vec<u8>,
    pub key: Vec<u8>,
}

pub trait LinkControl: Send {
    fn bssid(&self) -> Result<MacAddr, LinkError>;
    /// Current transmit rate in Mbit/s.
    fn link_speed(&self) -> Result<u32, LinkError>;
    fn set_bssid(&mut self, bssid: MacAddr) -> Result<(), LinkError>;
    fn ssid(&self) -> Result<Ssid, LinkError>;
    fn set_ssid(&mut self, ssid: &Ssid) -> Result<(), LinkError>;
    fn if_flags(&self) -> Result<u32, LinkError>;
    fn set_if_flags(&mut self, flags: u32) -> Result<(), LinkError>;
    fn set_key(&mut self, key: &KeyParams) -> Result<(), LinkError>;
    fn set_gen_ie(&mut self, ie: &[u8]) -> Result<(), LinkError>;
    fn pmksa(&mut self, op: PmksaOp) -> Result<(), LinkError>;
    fn mlme(&mut self, op: MlmeOp, addr: MacAddr, reason: u16) -> Result<(), LinkError>;
    fn set_operstate(&mut self, up: bool) -> Result<(), LinkError>;
}

/// Producer of raw scan batches; runs the radio-layer scan asynchronously to us.
pub trait ScanSource: Send {
    /// Returns at most `max` entries from the latest completed scan.
    fn scan_results(&mut self, max: usize) -> Result<Vec<ScanResultEntry>, LinkError>;
}
