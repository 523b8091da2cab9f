//! # Scan Controller
//!
//! Turns the session's scan preferences into a device scan request, and arms
//! the completion deadline once the device accepts it.
//!
//! A directed scan (one naming an SSID) always probes actively and marks the
//! following result merge as additive: the device only reports the requested
//! network, so absence from that batch says nothing about the others.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};
use wlbridge_common::config::{Config, MAX_CHANNELS_PER_SCAN};
use wlbridge_common::device::{ScanKind, SessionId};
use wlbridge_common::network::ssid::Ssid;
use wlbridge_common::scheduler::DeadlineScheduler;
use wlbridge_protocols::PayloadError;
use wlbridge_protocols::command::{CommandDescriptor, Opcode};
use wlbridge_protocols::scan::{LONG_DWELL_US, SHORT_DWELL_US, ScanRequest};

use crate::error::ScanError;
use crate::transport::TransportChannel;

pub struct ScanController {
    session: SessionId,
    scheduler: Arc<dyn DeadlineScheduler>,
    preference: ScanKind,
    channels: u8,
    timeout: Duration,
    force_merge: bool,
    last_scan: Option<ScanKind>,
}

impl ScanController {
    pub fn new(session: SessionId, scheduler: Arc<dyn DeadlineScheduler>, cfg: &Config) -> Self {
        Self {
            session,
            scheduler,
            preference: cfg.scan_kind,
            channels: cfg.scan_channels,
            timeout: cfg.scan_timeout,
            force_merge: false,
            last_scan: None,
        }
    }

    pub fn preference(&self) -> ScanKind {
        self.preference
    }

    pub fn set_preference(&mut self, kind: ScanKind) {
        self.preference = kind;
    }

    pub fn channel_count(&self) -> u8 {
        self.channels
    }

    pub fn set_channel_count(&mut self, count: u8) -> Result<(), ScanError> {
        if count == 0 || count > MAX_CHANNELS_PER_SCAN {
            return Err(PayloadError::ChannelCount(count as usize).into());
        }
        self.channels = count;
        Ok(())
    }

    /// Whether the next merge must keep entries missing from the batch untouched.
    pub fn force_merge(&self) -> bool {
        self.force_merge
    }

    /// Kind of the last scan the device accepted.
    pub fn last_scan(&self) -> Option<ScanKind> {
        self.last_scan
    }

    /// Builds the request for one scan, plus the force-merge flag it implies.
    pub fn build_request(&self, target: Option<&Ssid>) -> Result<(ScanRequest, bool), ScanError> {
        let directed = target.filter(|ssid| !ssid.is_empty());
        let kind = if directed.is_some() {
            ScanKind::Active
        } else {
            self.preference
        };

        let dwell = match (kind, directed) {
            (ScanKind::Active, None) => SHORT_DWELL_US,
            _ => LONG_DWELL_US,
        };

        let request = ScanRequest::new(kind, self.channels, dwell)?;
        Ok(match directed {
            Some(ssid) => (request.with_ssid(ssid.clone()), true),
            None => (request, false),
        })
    }

    /// Submits a scan and, once accepted, re-arms the completion deadline.
    pub fn request(
        &mut self,
        transport: &mut TransportChannel,
        target: Option<&Ssid>,
    ) -> Result<(), ScanError> {
        transport.ensure_loaded()?;

        let (request, force_merge) = self.build_request(target)?;
        self.force_merge = force_merge;

        let descriptor = CommandDescriptor::set(Opcode::StartAppScan, request.encode())?;
        transport.submit(descriptor).inspect_err(|err| {
            error!(session = %self.session, "Failed to start scan: {err}");
        })?;

        debug!(
            session = %self.session,
            "{:?} scan over {} channels requested",
            request.kind,
            request.channels.len()
        );
        self.last_scan = Some(request.kind);
        self.scheduler.cancel(&self.session);
        self.scheduler.arm(&self.session, self.timeout);
        Ok(())
    }

    pub fn cancel_deadline(&self) {
        self.scheduler.cancel(&self.session);
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
