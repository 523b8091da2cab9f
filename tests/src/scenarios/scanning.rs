use std::time::Duration;

use wlbridge_common::device::ScanKind;
use wlbridge_common::network::ssid::Ssid;
use wlbridge_core::DriverCommand;
use wlbridge_core::mock::SchedulerOp;
use wlbridge_protocols::command::Opcode;
use wlbridge_protocols::scan::{LONG_DWELL_US, SHORT_DWELL_US};

use crate::util::{ap, bench, bssid, summary};

#[test]
fn directed_scan_should_probe_actively_with_long_dwell() -> anyhow::Result<()> {
    let mut bench = bench("wlan0");
    bench.session.execute(DriverCommand::ScanPassive)?;

    let ssid = Ssid::try_from("CorpNet")?;
    bench.session.request_scan(Some(&ssid))?;

    let request = bench.device.last_scan().expect("scan reached the device");
    assert_eq!(request.kind, ScanKind::Active);
    assert_eq!(request.ssid, Some(ssid));
    assert_eq!(request.channels.len(), 11);
    assert!(request
        .channels
        .iter()
        .all(|c| c.min_dwell_us == LONG_DWELL_US && c.max_dwell_us == LONG_DWELL_US));
    Ok(())
}

#[test]
fn broadcast_active_scan_should_use_short_dwell() {
    let mut bench = bench("wlan0");

    bench.session.request_scan(None).unwrap();

    let request = bench.device.last_scan().unwrap();
    assert_eq!(request.kind, ScanKind::Active);
    assert_eq!(request.ssid, None);
    assert!(request.channels.iter().all(|c| c.max_dwell_us == SHORT_DWELL_US));
}

#[test]
fn stopped_session_should_not_scan_or_arm_deadline() {
    let mut bench = bench("wlan0");
    bench.session.stop().unwrap();

    let err = bench.session.request_scan(None).unwrap_err();

    assert!(err.is_not_loaded());
    assert!(bench.device.calls_with(Opcode::StartAppScan).is_empty());
    assert!(bench.scheduler.ops().is_empty());
}

#[test]
fn every_scan_should_rearm_single_deadline() {
    let mut bench = bench("wlan0");
    let id = bench.session.id().clone();

    bench.session.request_scan(None).unwrap();
    bench.session.request_scan(None).unwrap();

    assert_eq!(
        bench.scheduler.ops(),
        vec![
            SchedulerOp::Cancel(id.clone()),
            SchedulerOp::Arm(id.clone(), Duration::from_secs(15)),
            SchedulerOp::Cancel(id.clone()),
            SchedulerOp::Arm(id.clone(), Duration::from_secs(15)),
        ]
    );
    assert_eq!(bench.scheduler.armed(&id), Some(Duration::from_secs(15)));
}

#[test]
fn fresher_entry_should_replace_retained_and_sort_by_level() {
    let mut bench = bench("wlan0");

    bench.link.set_batch(vec![ap(0xa, -40)]);
    bench.session.get_scan_results(2).unwrap();

    bench.link.set_batch(vec![ap(0xa, -55), ap(0xb, -30)]);
    let results = bench.session.get_scan_results(2).unwrap();

    assert_eq!(summary(&results), vec![(bssid(0xb), -30), (bssid(0xa), -55)]);
}

#[test]
fn directed_results_should_augment_retained_set() {
    let mut bench = bench("wlan0");
    bench.session.request_scan(None).unwrap();
    bench.link.set_batch(vec![ap(1, -50), ap(2, -60), ap(3, -70)]);
    bench.session.get_scan_results(16).unwrap();

    let hidden = Ssid::try_from("Hidden").unwrap();
    bench.session.request_scan(Some(&hidden)).unwrap();
    bench.link.set_batch(vec![ap(4, -65)]);
    let results = bench.session.get_scan_results(16).unwrap();

    assert_eq!(
        summary(&results),
        vec![
            (bssid(1), -50),
            (bssid(2), -60),
            (bssid(4), -65),
            (bssid(3), -70)
        ]
    );
}

#[test]
fn repeated_batch_should_give_same_results() {
    let mut bench = bench("wlan0");
    bench.link.set_batch(vec![ap(1, -50), ap(2, -50), ap(3, -80)]);

    let first = bench.session.get_scan_results(16).unwrap();
    let second = bench.session.get_scan_results(16).unwrap();

    assert_eq!(first, second);
}

#[test]
fn shrinking_batch_should_stay_stable_across_cycles() {
    let mut bench = bench("wlan0");
    bench.link.set_batch(vec![ap(1, -50), ap(2, -60)]);
    bench.session.get_scan_results(16).unwrap();

    bench.link.set_batch(vec![ap(2, -60)]);
    let cycles: Vec<_> = (0..5)
        .map(|_| bench.session.get_scan_results(16).unwrap())
        .collect();

    assert!(cycles.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(summary(&cycles[4]), vec![(bssid(1), -50), (bssid(2), -60)]);
}

#[test]
fn results_should_respect_capacity() {
    let mut bench = bench("wlan0");
    bench
        .link
        .set_batch((1..=10).map(|i| ap(i, -90 + i as i32)).collect());
    assert_eq!(bench.session.get_scan_results(16).unwrap().len(), 10);

    let results = bench.session.get_scan_results(3).unwrap();

    assert_eq!(
        summary(&results),
        vec![(bssid(10), -80), (bssid(9), -81), (bssid(8), -82)]
    );
}

#[test]
fn empty_batch_should_keep_retained_set() {
    let mut bench = bench("wlan0");
    bench.link.set_batch(vec![ap(1, -50), ap(2, -60)]);
    bench.session.get_scan_results(16).unwrap();

    bench.link.set_batch(Vec::new());
    let results = bench.session.get_scan_results(16).unwrap();

    assert_eq!(summary(&results), vec![(bssid(1), -50), (bssid(2), -60)]);
}
