use pnet::util::MacAddr;
use wlbridge_common::device::FilterKind;
use wlbridge_core::{DriverCommand, DriverError};
use wlbridge_core::error::BuildError;
use wlbridge_core::mock::{MockDevice, MockLink};
use wlbridge_protocols::command::Opcode;
use wlbridge_protocols::filter::FilterStatistics;

use crate::util::{bench, bench_with, config};

#[test]
fn own_filter_should_not_be_sent_without_address() {
    let mut bench = bench("wlan0");
    bench.device.fail_next(1);

    let err = bench.session.install_filter(FilterKind::Own).unwrap_err();

    assert!(matches!(
        err,
        DriverError::Build(BuildError::AddressUnavailable(_))
    ));
    assert!(bench.device.calls_with(Opcode::AddRxDataFilter).is_empty());
    assert_eq!(bench.session.own_addr(), None);
}

#[test]
fn driver_commands_should_manage_full_filter_set() -> anyhow::Result<()> {
    let mac = MacAddr::new(0x08, 0x00, 0x28, 0x5a, 0x11, 0x02);
    let mut bench = bench_with("wlan0", MockDevice::new().with_mac(mac), MockLink::new(), &config());

    for command in [
        DriverCommand::RxFilterAdd(0),
        DriverCommand::RxFilterAdd(1),
        DriverCommand::RxFilterAdd(2),
        DriverCommand::RxFilterAdd(3),
        DriverCommand::RxFilterStart,
    ] {
        let reply = bench.session.execute(command)?;
        assert!(reply.is_empty());
    }

    let patterns: Vec<Vec<u8>> = bench
        .device
        .filters()
        .iter()
        .map(|f| f.pattern().to_vec())
        .collect();
    assert_eq!(
        patterns,
        vec![
            mac.octets().to_vec(),
            vec![0xff; 6],
            vec![0x01, 0x00, 0x5e],
            vec![0x33, 0x33],
        ]
    );
    assert!(bench.device.filters_enabled());

    bench.device.set_statistics(FilterStatistics {
        unmatched: 40,
        matched: [5, 9, 2, 0],
    });
    let reply = bench.session.execute(DriverCommand::RxFilterStatistics)?;
    assert_eq!(reply, "RxFilterStat: 40 5 9 2 0\n");

    bench.session.execute(DriverCommand::RxFilterRemove(2))?;
    bench.session.execute(DriverCommand::RxFilterStop)?;
    assert_eq!(bench.device.filters().len(), 3);
    assert!(!bench.device.filters_enabled());
    Ok(())
}

#[test]
fn unknown_filter_kind_should_be_rejected_before_io() {
    let mut bench = bench("wlan0");

    let err = bench
        .session
        .execute(DriverCommand::RxFilterAdd(7))
        .unwrap_err();

    assert!(matches!(err, DriverError::InvalidArgument(_)));
    assert!(bench.device.calls().is_empty());
}
