use std::sync::Arc;
use std::time::Duration;

use pnet::util::MacAddr;
use wlbridge_common::config::Config;
use wlbridge_common::network::bss::ScanResultEntry;
use wlbridge_core::mock::{ManualScheduler, MockDevice, MockLink, RecordingEventSink};
use wlbridge_core::{Collaborators, Session};

/// A session wired to in-memory collaborators, plus handles to inspect them.
pub struct Bench {
    pub device: MockDevice,
    pub link: MockLink,
    pub events: Arc<RecordingEventSink>,
    pub scheduler: Arc<ManualScheduler>,
    pub session: Session,
}

pub fn config() -> Config {
    Config {
        settle_delay: Duration::ZERO,
        ..Config::default()
    }
}

pub fn bench(ifname: &str) -> Bench {
    bench_with(ifname, MockDevice::new(), MockLink::new(), &config())
}

pub fn bench_with(ifname: &str, device: MockDevice, link: MockLink, cfg: &Config) -> Bench {
    let events = Arc::new(RecordingEventSink::default());
    let scheduler = Arc::new(ManualScheduler::default());
    let session = Session::init(
        ifname,
        Collaborators {
            primitive: Box::new(device.clone()),
            link: Box::new(link.clone()),
            scan_source: Box::new(link.clone()),
            events: events.clone(),
            scheduler: scheduler.clone(),
        },
        cfg,
    )
    .unwrap();

    Bench {
        device,
        link,
        events,
        scheduler,
        session,
    }
}

pub fn bssid(last: u8) -> MacAddr {
    MacAddr::new(0x00, 0x1b, 0x63, 0x00, 0x00, last)
}

pub fn ap(last: u8, level: i32) -> ScanResultEntry {
    ScanResultEntry::new(bssid(last), level)
}

pub fn summary(entries: &[ScanResultEntry]) -> Vec<(MacAddr, i32)> {
    entries.iter().map(|e| (e.bssid, e.level)).collect()
}
