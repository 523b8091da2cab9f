//! # In-memory Device
//!
//! Stand-ins for every collaborator a [`Session`](crate::session::Session)
//! needs: a control primitive that understands the private command set, a link
//! layer with canned scan batches, an event recorder and a scheduler that only
//! remembers what it was asked to do.
//!
//! Handles are cheap clones over shared state, so a test can box one copy into
//! the session and keep inspecting the other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use pnet::util::MacAddr;
use wlbridge_common::control::{ControlPrimitive, PrimitiveError};
use wlbridge_common::device::{EventKind, PowerMode, SessionId};
use wlbridge_common::events::EventSink;
use wlbridge_common::link::{KeyParams, LinkControl, LinkError, MlmeOp, PmksaOp, ScanSource};
use wlbridge_common::network::bss::ScanResultEntry;
use wlbridge_common::network::ssid::Ssid;
use wlbridge_common::scheduler::DeadlineScheduler;
use wlbridge_protocols::command::Opcode;
use wlbridge_protocols::filter::{FilterDescriptor, FilterStatistics};
use wlbridge_protocols::payload::{self, PowerModeBlock, RssiReport};
use wlbridge_protocols::scan::ScanRequest;

const EIO: i32 = 5;
const EINVAL: i32 = 22;
const EOPNOTSUPP: i32 = 95;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One call as seen by the primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub opcode: u32,
    pub flags: u32,
    pub input: Vec<u8>,
}

#[derive(Debug)]
struct DeviceState {
    calls: Vec<RecordedCall>,
    failures_left: u32,
    mac: MacAddr,
    rssi: RssiReport,
    power: PowerModeBlock,
    coex_status: u32,
    filters: Vec<FilterDescriptor>,
    filters_enabled: bool,
    statistics: FilterStatistics,
    last_scan: Option<ScanRequest>,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            failures_left: 0,
            mac: MacAddr::new(0x08, 0x00, 0x28, 0x5a, 0x11, 0x02),
            rssi: RssiReport::default(),
            power: PowerModeBlock::user(PowerMode::Auto),
            coex_status: 0,
            filters: Vec::new(),
            filters_enabled: false,
            statistics: FilterStatistics::default(),
            last_scan: None,
        }
    }
}

/// Control primitive that keeps the device's side of every private command.
#[derive(Debug, Clone, Default)]
pub struct MockDevice {
    state: Arc<Mutex<DeviceState>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mac(self, mac: MacAddr) -> Self {
        lock(&self.state).mac = mac;
        self
    }

    pub fn with_rssi(self, rssi: RssiReport) -> Self {
        lock(&self.state).rssi = rssi;
        self
    }

    /// Fails the next `count` transactions with `EIO`.
    pub fn fail_next(&self, count: u32) {
        lock(&self.state).failures_left = count;
    }

    pub fn set_statistics(&self, statistics: FilterStatistics) {
        lock(&self.state).statistics = statistics;
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.state).calls.clone()
    }

    pub fn calls_with(&self, opcode: Opcode) -> Vec<RecordedCall> {
        lock(&self.state)
            .calls
            .iter()
            .filter(|call| call.opcode == opcode.code())
            .cloned()
            .collect()
    }

    pub fn last_scan(&self) -> Option<ScanRequest> {
        lock(&self.state).last_scan.clone()
    }

    pub fn filters(&self) -> Vec<FilterDescriptor> {
        lock(&self.state).filters.clone()
    }

    pub fn filters_enabled(&self) -> bool {
        lock(&self.state).filters_enabled
    }

    pub fn power(&self) -> PowerModeBlock {
        lock(&self.state).power
    }

    pub fn coex_status(&self) -> u32 {
        lock(&self.state).coex_status
    }
}

impl DeviceState {
    fn handle(&mut self, opcode: Opcode, input: &[u8], output: &mut [u8]) -> Result<(), i32> {
        match opcode {
            Opcode::DriverStart | Opcode::DriverStop => Ok(()),
            Opcode::MacAddress => reply(output, &self.mac.octets()),
            Opcode::StartAppScan => {
                self.last_scan = Some(ScanRequest::decode(input).map_err(|_| EINVAL)?);
                Ok(())
            }
            Opcode::Rssi => reply(output, &self.rssi.encode()),
            Opcode::PowerModeSet => {
                self.power = PowerModeBlock::decode(input).map_err(|_| EINVAL)?;
                Ok(())
            }
            Opcode::PowerModeGet => reply(output, &self.power.encode()),
            Opcode::CoexSetEnable => {
                self.coex_status = payload::decode_word(input).map_err(|_| EINVAL)?;
                Ok(())
            }
            Opcode::CoexGetConfig => reply(output, &payload::encode_word(self.coex_status)),
            Opcode::AddRxDataFilter => {
                let filter = FilterDescriptor::decode(input).map_err(|_| EINVAL)?;
                if !self.filters.contains(&filter) {
                    self.filters.push(filter);
                }
                Ok(())
            }
            Opcode::RemoveRxDataFilter => {
                let filter = FilterDescriptor::decode(input).map_err(|_| EINVAL)?;
                self.filters.retain(|installed| *installed != filter);
                Ok(())
            }
            Opcode::EnableRxDataFilters => {
                self.filters_enabled = payload::decode_word(input).map_err(|_| EINVAL)? != 0;
                Ok(())
            }
            Opcode::RxDataFilterStatistics => reply(output, &self.statistics.encode()),
        }
    }
}

fn reply(output: &mut [u8], bytes: &[u8]) -> Result<(), i32> {
    let slot = output.get_mut(..bytes.len()).ok_or(EINVAL)?;
    slot.copy_from_slice(bytes);
    Ok(())
}

impl ControlPrimitive for MockDevice {
    fn transact(
        &mut self,
        opcode: u32,
        flags: u32,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(), PrimitiveError> {
        let mut state = lock(&self.state);
        state.calls.push(RecordedCall {
            opcode,
            flags,
            input: input.to_vec(),
        });

        if state.failures_left > 0 {
            state.failures_left -= 1;
            return Err(PrimitiveError { code: EIO });
        }

        let opcode = Opcode::from_code(opcode).ok_or(PrimitiveError { code: EOPNOTSUPP })?;
        state
            .handle(opcode, input, output)
            .map_err(|code| PrimitiveError { code })
    }
}

/// Link-layer operation as recorded by [`MockLink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCall {
    SetBssid(MacAddr),
    SetSsid(Ssid),
    SetIfFlags(u32),
    SetKey(KeyParams),
    SetGenIe(Vec<u8>),
    Pmksa(PmksaOp),
    Mlme(MlmeOp, MacAddr, u16),
    SetOperstate(bool),
    ScanResults(usize),
}

#[derive(Debug)]
struct LinkState {
    bssid: MacAddr,
    ssid: Ssid,
    flags: u32,
    link_speed: u32,
    batch: Vec<ScanResultEntry>,
    calls: Vec<LinkCall>,
}

impl Default for LinkState {
    fn default() -> Self {
        Self {
            bssid: MacAddr::zero(),
            ssid: Ssid::broadcast(),
            flags: 0,
            link_speed: 0,
            batch: Vec::new(),
            calls: Vec::new(),
        }
    }
}

/// Link layer and scan source backed by plain fields.
#[derive(Debug, Clone, Default)]
pub struct MockLink {
    state: Arc<Mutex<LinkState>>,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_association(self, bssid: MacAddr, ssid: Ssid) -> Self {
        {
            let mut state = lock(&self.state);
            state.bssid = bssid;
            state.ssid = ssid;
        }
        self
    }

    pub fn with_link_speed(self, mbps: u32) -> Self {
        lock(&self.state).link_speed = mbps;
        self
    }

    pub fn with_flags(self, flags: u32) -> Self {
        lock(&self.state).flags = flags;
        self
    }

    /// The batch every following `scan_results` call returns.
    pub fn set_batch(&self, batch: Vec<ScanResultEntry>) {
        lock(&self.state).batch = batch;
    }

    pub fn calls(&self) -> Vec<LinkCall> {
        lock(&self.state).calls.clone()
    }

    pub fn flags(&self) -> u32 {
        lock(&self.state).flags
    }

    fn record(&self, call: LinkCall) {
        lock(&self.state).calls.push(call);
    }
}

impl LinkControl for MockLink {
    fn bssid(&self) -> Result<MacAddr, LinkError> {
        Ok(lock(&self.state).bssid)
    }

    fn link_speed(&self) -> Result<u32, LinkError> {
        Ok(lock(&self.state).link_speed)
    }

    fn set_bssid(&mut self, bssid: MacAddr) -> Result<(), LinkError> {
        self.record(LinkCall::SetBssid(bssid));
        lock(&self.state).bssid = bssid;
        Ok(())
    }

    fn ssid(&self) -> Result<Ssid, LinkError> {
        Ok(lock(&self.state).ssid.clone())
    }

    fn set_ssid(&mut self, ssid: &Ssid) -> Result<(), LinkError> {
        self.record(LinkCall::SetSsid(ssid.clone()));
        lock(&self.state).ssid = ssid.clone();
        Ok(())
    }

    fn if_flags(&self) -> Result<u32, LinkError> {
        Ok(lock(&self.state).flags)
    }

    fn set_if_flags(&mut self, flags: u32) -> Result<(), LinkError> {
        self.record(LinkCall::SetIfFlags(flags));
        lock(&self.state).flags = flags;
        Ok(())
    }

    fn set_key(&mut self, key: &KeyParams) -> Result<(), LinkError> {
        self.record(LinkCall::SetKey(key.clone()));
        Ok(())
    }

    fn set_gen_ie(&mut self, ie: &[u8]) -> Result<(), LinkError> {
        self.record(LinkCall::SetGenIe(ie.to_vec()));
        Ok(())
    }

    fn pmksa(&mut self, op: PmksaOp) -> Result<(), LinkError> {
        self.record(LinkCall::Pmksa(op));
        Ok(())
    }

    fn mlme(&mut self, op: MlmeOp, addr: MacAddr, reason: u16) -> Result<(), LinkError> {
        self.record(LinkCall::Mlme(op, addr, reason));
        Ok(())
    }

    fn set_operstate(&mut self, up: bool) -> Result<(), LinkError> {
        self.record(LinkCall::SetOperstate(up));
        Ok(())
    }
}

impl ScanSource for MockLink {
    fn scan_results(&mut self, max: usize) -> Result<Vec<ScanResultEntry>, LinkError> {
        self.record(LinkCall::ScanResults(max));
        Ok(lock(&self.state).batch.iter().take(max).cloned().collect())
    }
}

#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<(SessionId, EventKind)>>,
}

impl RecordingEventSink {
    pub fn events(&self) -> Vec<(SessionId, EventKind)> {
        lock(&self.events).clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        lock(&self.events).iter().map(|(_, kind)| *kind).collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        lock(&self.events)
            .iter()
            .filter(|(_, seen)| *seen == kind)
            .count()
    }
}

impl EventSink for RecordingEventSink {
    fn notify(&self, session: &SessionId, event: EventKind) {
        lock(&self.events).push((session.clone(), event));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerOp {
    Arm(SessionId, Duration),
    Cancel(SessionId),
}

/// Deadline scheduler that never fires on its own.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    armed: Mutex<HashMap<SessionId, Duration>>,
    ops: Mutex<Vec<SchedulerOp>>,
}

impl ManualScheduler {
    pub fn armed(&self, session: &SessionId) -> Option<Duration> {
        lock(&self.armed).get(session).copied()
    }

    pub fn ops(&self) -> Vec<SchedulerOp> {
        lock(&self.ops).clone()
    }
}

impl DeadlineScheduler for ManualScheduler {
    fn arm(&self, session: &SessionId, after: Duration) {
        lock(&self.ops).push(SchedulerOp::Arm(session.clone(), after));
        lock(&self.armed).insert(session.clone(), after);
    }

    fn cancel(&self, session: &SessionId) {
        lock(&self.ops).push(SchedulerOp::Cancel(session.clone()));
        lock(&self.armed).remove(session);
    }
}
