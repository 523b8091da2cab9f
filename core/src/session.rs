//! # Driver Session
//!
//! One [`Session`] per managed interface. It owns the transport channel, the
//! scan state and the retained result set, and it forwards link-control
//! operations once the device is loaded.
//!
//! Sessions share nothing with each other: two sessions on different
//! interfaces keep separate counters, preferences and result sets.

use std::sync::Arc;

use pnet::util::MacAddr;
use tracing::{debug, info, warn};
use wlbridge_common::config::Config;
use wlbridge_common::control::ControlPrimitive;
use wlbridge_common::device::{CoexMode, EventKind, ScanKind, SessionId};
use wlbridge_common::events::EventSink;
use wlbridge_common::link::{
    IFF_UP, KeyParams, LinkControl, MlmeOp, PMKID_LEN, PmksaOp, ScanSource,
};
use wlbridge_common::network::bss::ScanResultEntry;
use wlbridge_common::network::ssid::Ssid;
use wlbridge_common::scheduler::DeadlineScheduler;

use crate::error::{DriverError, ScanError};
use crate::merge::ResultMerger;
use crate::scanner::ScanController;
use crate::transport::TransportChannel;

/// The first results event after start-up is synthetic; association waits for
/// the second one.
const REAL_RESULTS_THRESHOLD: u8 = 2;

/// Everything a session talks to.
pub struct Collaborators {
    pub primitive: Box<dyn ControlPrimitive>,
    pub link: Box<dyn LinkControl>,
    pub scan_source: Box<dyn ScanSource>,
    pub events: Arc<dyn EventSink>,
    pub scheduler: Arc<dyn DeadlineScheduler>,
}

/// Parameters of an association request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociateParams {
    pub ssid: Ssid,
    /// Zero when the supplicant leaves BSS selection to the device.
    pub bssid: MacAddr,
    pub ie: Vec<u8>,
}

impl AssociateParams {
    pub fn new(ssid: Ssid) -> Self {
        Self {
            ssid,
            bssid: MacAddr::zero(),
            ie: Vec::new(),
        }
    }

    pub fn with_bssid(mut self, bssid: MacAddr) -> Self {
        self.bssid = bssid;
        self
    }

    pub fn with_ie(mut self, ie: Vec<u8>) -> Self {
        self.ie = ie;
        self
    }
}

pub struct Session {
    id: SessionId,
    pub(crate) transport: TransportChannel,
    pub(crate) scanner: ScanController,
    merger: ResultMerger,
    pub(crate) link: Box<dyn LinkControl>,
    scan_source: Box<dyn ScanSource>,
    pub(crate) own_addr: Option<MacAddr>,
    pub(crate) coex_mode: Option<CoexMode>,
    scan_results_received: u8,
}

impl Session {
    /// Binds a new session to `ifname`. The device is assumed loaded.
    pub fn init(ifname: &str, collaborators: Collaborators, cfg: &Config) -> Result<Self, DriverError> {
        let id = SessionId::new(ifname);
        let Collaborators {
            primitive,
            link,
            scan_source,
            events,
            scheduler,
        } = collaborators;

        let mut scanner = ScanController::new(id.clone(), scheduler, cfg);
        scanner.set_channel_count(cfg.scan_channels)?;

        info!(session = %id, "Session initialised with {} scan channels", cfg.scan_channels);
        Ok(Self {
            transport: TransportChannel::new(id.clone(), primitive, events, cfg.settle_delay),
            scanner,
            merger: ResultMerger::new(),
            link,
            scan_source,
            own_addr: None,
            coex_mode: None,
            scan_results_received: 0,
            id,
        })
    }

    /// Tears the session down, cancelling any pending scan deadline.
    pub fn deinit(self) {
        debug!(session = %self.id, "Session released");
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn is_loaded(&self) -> bool {
        self.transport.is_loaded()
    }

    /// Last own hardware address reported by the device.
    pub fn own_addr(&self) -> Option<MacAddr> {
        self.own_addr
    }

    /// Coexistence mode last accepted by the device.
    pub fn coex_mode(&self) -> Option<CoexMode> {
        self.coex_mode
    }

    pub fn retained_results(&self) -> Vec<ScanResultEntry> {
        self.merger.retained().cloned().collect()
    }

    pub(crate) fn ensure_loaded(&self) -> Result<(), DriverError> {
        Ok(self.transport.ensure_loaded()?)
    }

    pub fn start(&mut self) -> Result<(), DriverError> {
        Ok(self.transport.start()?)
    }

    pub fn stop(&mut self) -> Result<(), DriverError> {
        Ok(self.transport.stop()?)
    }

    /// Asks the supplicant to reload the driver. No device I/O.
    pub fn reload(&mut self) {
        warn!(session = %self.id, "Driver reload requested");
        self.transport.notify(EventKind::Hung);
    }

    // ------------------------------------------------------------------
    // Scanning
    // ------------------------------------------------------------------

    pub fn request_scan(&mut self, target: Option<&Ssid>) -> Result<(), DriverError> {
        self.scanner.request(&mut self.transport, target)?;
        Ok(())
    }

    pub fn scan_preference(&self) -> ScanKind {
        self.scanner.preference()
    }

    pub fn set_scan_preference(&mut self, kind: ScanKind) {
        debug!(session = %self.id, "Scan preference set to {kind:?}");
        self.scanner.set_preference(kind);
    }

    pub fn channel_count(&self) -> u8 {
        self.scanner.channel_count()
    }

    pub fn set_channel_count(&mut self, count: u8) -> Result<(), DriverError> {
        self.scanner
            .set_channel_count(count)
            .map_err(|err: ScanError| DriverError::InvalidArgument(err.to_string()))
    }

    /// Pulls the latest raw batch and returns the merged view of at most
    /// `capacity` entries, strongest first.
    pub fn get_scan_results(&mut self, capacity: usize) -> Result<Vec<ScanResultEntry>, DriverError> {
        if self.scan_results_received < REAL_RESULTS_THRESHOLD {
            self.scan_results_received += 1;
        }
        self.ensure_loaded()?;

        let batch = self.scan_source.scan_results(capacity)?;
        debug!(session = %self.id, "Device reported {} APs", batch.len());

        let merged = self
            .merger
            .merge(batch, self.scanner.force_merge(), capacity);
        debug!(session = %self.id, "{} APs after merge", merged.len());
        Ok(merged)
    }

    // ------------------------------------------------------------------
    // Link control
    // ------------------------------------------------------------------

    fn link(&mut self) -> Result<&mut dyn LinkControl, DriverError> {
        self.ensure_loaded()?;
        Ok(self.link.as_mut())
    }

    pub fn bssid(&mut self) -> Result<MacAddr, DriverError> {
        Ok(self.link()?.bssid()?)
    }

    pub fn set_bssid(&mut self, bssid: MacAddr) -> Result<(), DriverError> {
        Ok(self.link()?.set_bssid(bssid)?)
    }

    /// Transmit rate of the current link in Mbit/s.
    pub fn link_speed(&mut self) -> Result<u32, DriverError> {
        Ok(self.link()?.link_speed()?)
    }

    pub fn ssid(&mut self) -> Result<Ssid, DriverError> {
        Ok(self.link()?.ssid()?)
    }

    pub fn set_ssid(&mut self, ssid: &Ssid) -> Result<(), DriverError> {
        Ok(self.link()?.set_ssid(ssid)?)
    }

    pub fn if_flags(&mut self) -> Result<u32, DriverError> {
        Ok(self.link()?.if_flags()?)
    }

    pub fn set_if_flags(&mut self, flags: u32) -> Result<(), DriverError> {
        Ok(self.link()?.set_if_flags(flags)?)
    }

    pub fn set_key(&mut self, key: &KeyParams) -> Result<(), DriverError> {
        Ok(self.link()?.set_key(key)?)
    }

    pub fn set_gen_ie(&mut self, ie: &[u8]) -> Result<(), DriverError> {
        Ok(self.link()?.set_gen_ie(ie)?)
    }

    pub fn add_pmkid(&mut self, bssid: MacAddr, pmkid: [u8; PMKID_LEN]) -> Result<(), DriverError> {
        Ok(self.link()?.pmksa(PmksaOp::Add { bssid, pmkid })?)
    }

    pub fn remove_pmkid(&mut self, bssid: MacAddr, pmkid: [u8; PMKID_LEN]) -> Result<(), DriverError> {
        Ok(self.link()?.pmksa(PmksaOp::Remove { bssid, pmkid })?)
    }

    pub fn flush_pmkid(&mut self) -> Result<(), DriverError> {
        Ok(self.link()?.pmksa(PmksaOp::Flush)?)
    }

    pub fn deauthenticate(&mut self, addr: MacAddr, reason: u16) -> Result<(), DriverError> {
        Ok(self.link()?.mlme(MlmeOp::Deauthenticate, addr, reason)?)
    }

    /// Disassociates and drops the peer from the retained scan set.
    pub fn disassociate(&mut self, addr: MacAddr, reason: u16) -> Result<(), DriverError> {
        self.link()?.mlme(MlmeOp::Disassociate, addr, reason)?;
        if self.merger.forget(addr) {
            debug!(session = %self.id, "Forgot {addr} after disassociation");
        }
        Ok(())
    }

    pub fn set_operstate(&mut self, up: bool) -> Result<(), DriverError> {
        Ok(self.link()?.set_operstate(up)?)
    }

    /// Brings the interface up, programs the peer and finally the SSID.
    ///
    /// The SSID step, which actually triggers association, is refused with
    /// [`DriverError::AssociationDeferred`] until real scan results have arrived.
    pub fn associate(&mut self, params: &AssociateParams) -> Result<(), DriverError> {
        let id = self.id.clone();
        let link = self.link()?;

        match link.if_flags() {
            Ok(flags) if flags & IFF_UP == 0 => {
                if let Err(err) = link.set_if_flags(flags | IFF_UP) {
                    warn!(session = %id, "Could not bring interface up: {err}");
                }
            }
            Ok(_) => {}
            Err(err) => warn!(session = %id, "Could not read interface flags: {err}"),
        }

        if !params.ie.is_empty() {
            link.set_gen_ie(&params.ie)?;
        }
        if params.bssid != MacAddr::zero() {
            link.set_bssid(params.bssid)?;
        }

        if self.scan_results_received < REAL_RESULTS_THRESHOLD {
            debug!(session = %id, "Association deferred, no real scan results yet");
            return Err(DriverError::AssociationDeferred(id));
        }

        info!(session = %id, "Associating with {}", params.ssid);
        Ok(self.link.set_ssid(&params.ssid)?)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.scanner.cancel_deadline();
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
