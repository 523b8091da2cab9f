//! # Device Control
//!
//! Vendor-specific knobs reached through the private command set: own address,
//! signal strength, power management, Bluetooth coexistence and the Rx data
//! filters.

use pnet::util::MacAddr;
use tracing::{debug, error};
use wlbridge_common::device::{CoexMode, FilterKind, PowerMode};
use wlbridge_common::network::mac::ETH_ALEN;
use wlbridge_protocols::command::{CommandDescriptor, Opcode};
use wlbridge_protocols::filter::{FILTER_STATISTICS_LEN, FilterStatistics};
use wlbridge_protocols::payload::{
    self, POWER_MODE_LEN, PowerModeBlock, RSSI_REPORT_LEN, RssiReport, WORD_LEN,
};

use crate::error::{DriverError, TransportError};
use crate::filter;
use crate::session::Session;
use crate::transport::TransportChannel;

/// Queries the own hardware address and refreshes the cached copy.
fn refresh_own_addr(
    transport: &mut TransportChannel,
    cache: &mut Option<MacAddr>,
) -> Result<MacAddr, TransportError> {
    *cache = None;

    let mut octets = [0u8; ETH_ALEN];
    transport.submit(CommandDescriptor::get(Opcode::MacAddress, &mut octets)?)?;

    let mac = MacAddr::from(octets);
    *cache = Some(mac);
    Ok(mac)
}

impl Session {
    pub fn mac_addr(&mut self) -> Result<MacAddr, DriverError> {
        let mac = refresh_own_addr(&mut self.transport, &mut self.own_addr)?;
        debug!(session = %self.id(), "Own address {mac}");
        Ok(mac)
    }

    /// Signal strength of the current association, data and beacon averages.
    pub fn rssi(&mut self) -> Result<RssiReport, DriverError> {
        self.ensure_loaded()?;
        let bssid = self.link.bssid()?;
        if bssid == MacAddr::zero() {
            return Err(DriverError::NoLink(self.id().clone()));
        }

        let mut buffer = [0u8; RSSI_REPORT_LEN];
        self.transport
            .submit(CommandDescriptor::get(Opcode::Rssi, &mut buffer)?)?;
        Ok(RssiReport::decode(&buffer)?)
    }

    pub fn set_power_mode(&mut self, mode: PowerMode) -> Result<(), DriverError> {
        let block = PowerModeBlock::user(mode);
        self.transport
            .submit(CommandDescriptor::set(Opcode::PowerModeSet, block.encode())?)?;
        debug!(session = %self.id(), "Power mode set to {mode:?}");
        Ok(())
    }

    pub fn power_mode(&mut self) -> Result<PowerMode, DriverError> {
        let mut buffer = [0u8; POWER_MODE_LEN];
        self.transport
            .submit(CommandDescriptor::get(Opcode::PowerModeGet, &mut buffer)?)?;
        Ok(PowerModeBlock::decode(&buffer)?.mode)
    }

    pub fn set_coexistence_mode(&mut self, mode: CoexMode) -> Result<(), DriverError> {
        let word = payload::encode_word(mode.device_code());
        self.transport
            .submit(CommandDescriptor::set(Opcode::CoexSetEnable, word)?)?;
        self.coex_mode = Some(mode);
        debug!(session = %self.id(), "Coexistence mode set to {mode:?}");
        Ok(())
    }

    /// Raw status word reported by the coexistence manager.
    pub fn coexistence_status(&mut self) -> Result<u32, DriverError> {
        let mut buffer = [0u8; WORD_LEN];
        self.transport
            .submit(CommandDescriptor::get(Opcode::CoexGetConfig, &mut buffer)?)?;
        Ok(payload::decode_word(&buffer)?)
    }

    pub fn install_filter(&mut self, kind: FilterKind) -> Result<(), DriverError> {
        self.program_filter(Opcode::AddRxDataFilter, kind)
    }

    pub fn remove_filter(&mut self, kind: FilterKind) -> Result<(), DriverError> {
        self.program_filter(Opcode::RemoveRxDataFilter, kind)
    }

    fn program_filter(&mut self, opcode: Opcode, kind: FilterKind) -> Result<(), DriverError> {
        self.ensure_loaded()?;

        let transport = &mut self.transport;
        let cache = &mut self.own_addr;
        let descriptor = filter::build(kind, || refresh_own_addr(transport, cache))?;

        self.transport
            .submit(CommandDescriptor::set(opcode, descriptor.encode())?)
            .inspect_err(|err| error!(session = %self.id(), "{kind:?} filter not applied: {err}"))?;
        debug!(session = %self.id(), "{opcode} applied for {kind:?}");
        Ok(())
    }

    pub fn enable_filters(&mut self) -> Result<(), DriverError> {
        self.switch_filters(true)
    }

    pub fn disable_filters(&mut self) -> Result<(), DriverError> {
        self.switch_filters(false)
    }

    fn switch_filters(&mut self, enabled: bool) -> Result<(), DriverError> {
        let word = payload::encode_word(u32::from(enabled));
        self.transport
            .submit(CommandDescriptor::set(Opcode::EnableRxDataFilters, word)?)?;
        Ok(())
    }

    pub fn filter_statistics(&mut self) -> Result<FilterStatistics, DriverError> {
        let mut buffer = [0u8; FILTER_STATISTICS_LEN];
        self.transport
            .submit(CommandDescriptor::get(Opcode::RxDataFilterStatistics, &mut buffer)?)?;
        Ok(FilterStatistics::decode(&buffer)?)
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
