//! # Driver Commands
//!
//! The supplicant's `DRIVER <cmd>` operations as a closed set. Text is decoded
//! by the front end; the session only sees [`DriverCommand`] values and
//! answers with the reply line the supplicant expects.

use std::fmt;

use tracing::debug;
use wlbridge_common::device::{CoexMode, FilterKind, PowerMode, ScanKind};

use crate::error::DriverError;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCommand {
    Start,
    Stop,
    Reload,
    MacAddr,
    ScanPassive,
    ScanActive,
    ScanMode,
    LinkSpeed,
    /// `None` only reports the current count.
    ScanChannels(Option<u8>),
    Rssi,
    PowerMode(u32),
    GetPower,
    BtCoexMode(u32),
    BtCoexStatus,
    RxFilterStart,
    RxFilterStop,
    RxFilterStatistics,
    RxFilterAdd(u32),
    RxFilterRemove(u32),
}

impl fmt::Display for DriverCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverCommand::Start => write!(f, "start"),
            DriverCommand::Stop => write!(f, "stop"),
            DriverCommand::Reload => write!(f, "reload"),
            DriverCommand::MacAddr => write!(f, "macaddr"),
            DriverCommand::ScanPassive => write!(f, "scan-passive"),
            DriverCommand::ScanActive => write!(f, "scan-active"),
            DriverCommand::ScanMode => write!(f, "scan-mode"),
            DriverCommand::LinkSpeed => write!(f, "linkspeed"),
            DriverCommand::ScanChannels(None) => write!(f, "scan-channels"),
            DriverCommand::ScanChannels(Some(n)) => write!(f, "scan-channels {n}"),
            DriverCommand::Rssi => write!(f, "rssi"),
            DriverCommand::PowerMode(mode) => write!(f, "powermode {mode}"),
            DriverCommand::GetPower => write!(f, "getpower"),
            DriverCommand::BtCoexMode(mode) => write!(f, "btcoexmode {mode}"),
            DriverCommand::BtCoexStatus => write!(f, "btcoexstat"),
            DriverCommand::RxFilterStart => write!(f, "rxfilter-start"),
            DriverCommand::RxFilterStop => write!(f, "rxfilter-stop"),
            DriverCommand::RxFilterStatistics => write!(f, "rxfilter-statistics"),
            DriverCommand::RxFilterAdd(kind) => write!(f, "rxfilter-add {kind}"),
            DriverCommand::RxFilterRemove(kind) => write!(f, "rxfilter-remove {kind}"),
        }
    }
}

impl Session {
    /// Runs one driver command and returns the reply text. An empty reply
    /// means plain success.
    pub fn execute(&mut self, command: DriverCommand) -> Result<String, DriverError> {
        if command != DriverCommand::Start {
            self.ensure_loaded()?;
        }
        debug!(session = %self.id(), "Driver command '{command}'");

        let reply = match command {
            DriverCommand::Start => {
                self.start()?;
                String::new()
            }
            DriverCommand::Stop => {
                self.stop()?;
                String::new()
            }
            DriverCommand::Reload => {
                self.reload();
                String::new()
            }
            DriverCommand::MacAddr => format!("Macaddr = {}\n", self.mac_addr()?),
            DriverCommand::ScanPassive => {
                self.set_scan_preference(ScanKind::Passive);
                String::new()
            }
            DriverCommand::ScanActive => {
                self.set_scan_preference(ScanKind::Active);
                String::new()
            }
            DriverCommand::ScanMode => format!("ScanMode = {}\n", self.scan_preference().code()),
            DriverCommand::LinkSpeed => format!("LinkSpeed {}\n", self.link_speed()?),
            DriverCommand::ScanChannels(count) => {
                if let Some(count) = count {
                    self.set_channel_count(count)?;
                }
                format!("Scan-Channels = {}\n", self.channel_count())
            }
            DriverCommand::Rssi => {
                let report = self.rssi()?;
                let ssid = self.ssid()?;
                format!("{ssid} rssi {}\n", report.beacon)
            }
            DriverCommand::PowerMode(raw) => {
                self.set_power_mode(PowerMode::try_from(raw)?)?;
                String::new()
            }
            DriverCommand::GetPower => format!("powermode = {}\n", self.power_mode()?.code()),
            DriverCommand::BtCoexMode(raw) => {
                self.set_coexistence_mode(CoexMode::try_from(raw)?)?;
                String::new()
            }
            DriverCommand::BtCoexStatus => {
                format!("btcoexstatus = {:#x}\n", self.coexistence_status()?)
            }
            DriverCommand::RxFilterStart => {
                self.enable_filters()?;
                String::new()
            }
            DriverCommand::RxFilterStop => {
                self.disable_filters()?;
                String::new()
            }
            DriverCommand::RxFilterStatistics => {
                let stats = self.filter_statistics()?;
                let matched: Vec<String> = stats.matched.iter().map(u32::to_string).collect();
                format!("RxFilterStat: {} {}\n", stats.unmatched, matched.join(" "))
            }
            DriverCommand::RxFilterAdd(raw) => {
                self.install_filter(FilterKind::try_from(raw)?)?;
                String::new()
            }
            DriverCommand::RxFilterRemove(raw) => {
                self.remove_filter(FilterKind::try_from(raw)?)?;
                String::new()
            }
        };
        Ok(reply)
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
    use std::sync::Arc;
    use std::time::Duration;

    use pnet::util::MacAddr;
    use wlbridge_common::config::Config;
    use wlbridge_common::device::EventKind;
    use wlbridge_common::network::ssid::Ssid;
    use wlbridge_protocols::command::Opcode;
    use wlbridge_protocols::filter::FilterStatistics;
    use wlbridge_protocols::payload::RssiReport;

    use crate::mock::{ManualScheduler, MockDevice, MockLink, RecordingEventSink};
    use crate::session::Collaborators;

    fn session(device: &MockDevice, link: &MockLink, events: &Arc<RecordingEventSink>) -> Session {
        let cfg = Config {
            settle_delay: Duration::ZERO,
            ..Config::default()
        };
        Session::init(
            "wlan0",
            Collaborators {
                primitive: Box::new(device.clone()),
                link: Box::new(link.clone()),
                scan_source: Box::new(link.clone()),
                events: events.clone(),
                scheduler: Arc::new(ManualScheduler::default()),
            },
            &cfg,
        )
        .unwrap()
    }

    #[test]
    fn display_should_render_supplicant_keywords() {
        assert_eq!(DriverCommand::ScanChannels(None).to_string(), "scan-channels");
        assert_eq!(DriverCommand::ScanChannels(Some(11)).to_string(), "scan-channels 11");
        assert_eq!(DriverCommand::RxFilterStatistics.to_string(), "rxfilter-statistics");
    }

    #[test]
    fn execute_should_only_accept_start_while_stopped() {
        let device = MockDevice::new();
        let events = Arc::new(RecordingEventSink::default());
        let mut session = session(&device, &MockLink::new(), &events);

        session.execute(DriverCommand::Stop).unwrap();
        let before = device.calls().len();

        assert!(session.execute(DriverCommand::MacAddr).unwrap_err().is_not_loaded());
        assert!(session.execute(DriverCommand::ScanActive).unwrap_err().is_not_loaded());
        assert!(session.execute(DriverCommand::Reload).unwrap_err().is_not_loaded());
        assert_eq!(device.calls().len(), before);

        session.execute(DriverCommand::Start).unwrap();
        assert!(session.is_loaded());
        assert_eq!(events.kinds(), vec![EventKind::Stopped, EventKind::Started]);
    }

    #[test]
    fn execute_should_format_replies() {
        let mac = MacAddr::new(0x08, 0x00, 0x28, 0x5a, 0x11, 0x02);
        let device = MockDevice::new().with_mac(mac).with_rssi(RssiReport {
            data: -60,
            beacon: -57,
        });
        let link = MockLink::new()
            .with_association(
                MacAddr::new(0x00, 0x1b, 0x63, 0x84, 0x45, 0xe6),
                Ssid::try_from("CorpNet").unwrap(),
            )
            .with_link_speed(54);
        let events = Arc::new(RecordingEventSink::default());
        let mut session = session(&device, &link, &events);

        assert_eq!(session.execute(DriverCommand::MacAddr).unwrap(), "Macaddr = 08:00:28:5a:11:02\n");
        assert_eq!(session.execute(DriverCommand::LinkSpeed).unwrap(), "LinkSpeed 54\n");
        assert_eq!(session.execute(DriverCommand::ScanPassive).unwrap(), "");
        assert_eq!(session.execute(DriverCommand::ScanMode).unwrap(), "ScanMode = 0\n");
        assert_eq!(session.execute(DriverCommand::ScanChannels(Some(13))).unwrap(), "Scan-Channels = 13\n");
        assert_eq!(session.execute(DriverCommand::Rssi).unwrap(), "CorpNet rssi -57\n");

        session.execute(DriverCommand::PowerMode(3)).unwrap();
        assert_eq!(session.execute(DriverCommand::GetPower).unwrap(), "powermode = 3\n");

        session.execute(DriverCommand::BtCoexMode(0)).unwrap();
        assert_eq!(session.execute(DriverCommand::BtCoexStatus).unwrap(), "btcoexstatus = 0x2\n");

        device.set_statistics(FilterStatistics {
            unmatched: 12,
            matched: [3, 0, 1, 0],
        });
        assert_eq!(
            session.execute(DriverCommand::RxFilterStatistics).unwrap(),
            "RxFilterStat: 12 3 0 1 0\n"
        );
    }

    #[test]
    fn execute_should_reject_out_of_range_arguments_before_io() {
        let device = MockDevice::new();
        let events = Arc::new(RecordingEventSink::default());
        let mut session = session(&device, &MockLink::new(), &events);

        for command in [
            DriverCommand::PowerMode(5),
            DriverCommand::BtCoexMode(3),
            DriverCommand::RxFilterAdd(4),
            DriverCommand::ScanChannels(Some(15)),
        ] {
            let err = session.execute(command).unwrap_err();
            assert!(matches!(err, DriverError::InvalidArgument(_)), "{command}: {err}");
        }
        assert!(device.calls().is_empty());
    }

    #[test]
    fn execute_reload_should_emit_hang_without_io() {
        let device = MockDevice::new();
        let events = Arc::new(RecordingEventSink::default());
        let mut session = session(&device, &MockLink::new(), &events);

        assert_eq!(session.execute(DriverCommand::Reload).unwrap(), "");
        assert_eq!(events.kinds(), vec![EventKind::Hung]);
        assert!(device.calls().is_empty());
    }

    #[test]
    fn execute_rxfilter_add_should_install_broadcast_filter() {
        let device = MockDevice::new();
        let events = Arc::new(RecordingEventSink::default());
        let mut session = session(&device, &MockLink::new(), &events);

        session.execute(DriverCommand::RxFilterAdd(1)).unwrap();

        assert_eq!(device.calls_with(Opcode::AddRxDataFilter).len(), 1);
        assert_eq!(device.filters()[0].pattern(), &[0xff; 6]);
    }
}
