use wlbridge_common::device::{EventKind, SessionId};
use wlbridge_common::network::ssid::Ssid;
use wlbridge_core::{AssociateParams, DriverError};

use crate::util::{ap, bench};

#[test]
fn failure_runs_should_be_counted_per_session() {
    let mut first = bench("wlan0");
    let mut second = bench("wlan1");

    first.device.fail_next(4);
    second.device.fail_next(4);
    for _ in 0..4 {
        assert!(first.session.enable_filters().is_err());
        assert!(second.session.enable_filters().is_err());
    }

    assert_eq!(first.events.count(EventKind::Hung), 0);
    assert_eq!(second.events.count(EventKind::Hung), 0);
}

#[test]
fn events_should_carry_session_identity() {
    let mut bench = bench("wlan1");

    bench.session.stop().unwrap();
    bench.session.start().unwrap();

    assert_eq!(
        bench.events.events(),
        vec![
            (SessionId::new("wlan1"), EventKind::Stopped),
            (SessionId::new("wlan1"), EventKind::Started),
        ]
    );
}

#[test]
fn association_gate_should_be_per_session() {
    let mut first = bench("wlan0");
    let mut second = bench("wlan1");
    let params = AssociateParams::new(Ssid::try_from("CorpNet").unwrap());

    first.link.set_batch(vec![ap(1, -40)]);
    first.session.get_scan_results(8).unwrap();
    first.session.get_scan_results(8).unwrap();
    first.session.associate(&params).unwrap();

    second.session.get_scan_results(8).unwrap();
    let err = second.session.associate(&params).unwrap_err();
    assert!(matches!(err, DriverError::AssociationDeferred(_)));
}

#[test]
fn retained_results_should_not_leak_between_sessions() {
    let mut first = bench("wlan0");
    let mut second = bench("wlan1");

    first.link.set_batch(vec![ap(1, -40), ap(2, -60)]);
    first.session.get_scan_results(8).unwrap();

    assert!(second.session.get_scan_results(8).unwrap().is_empty());
    assert_eq!(first.session.retained_results().len(), 2);
}
