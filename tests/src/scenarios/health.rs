use wlbridge_common::device::EventKind;
use wlbridge_core::DriverError;
use wlbridge_core::error::TransportError;
use wlbridge_protocols::command::Opcode;

use crate::util::bench;

#[test]
fn five_consecutive_failures_should_emit_single_hang() {
    let mut bench = bench("wlan0");
    bench.device.fail_next(5);

    let outcomes: Vec<DriverError> = (0..5)
        .map(|_| bench.session.enable_filters().unwrap_err())
        .collect();

    assert!(outcomes[..4]
        .iter()
        .all(|err| matches!(err, DriverError::Transport(TransportError::IoFailure { .. }))));
    assert!(matches!(
        outcomes[4],
        DriverError::Transport(TransportError::Hung {
            opcode: Opcode::EnableRxDataFilters,
            ..
        })
    ));
    assert_eq!(bench.events.count(EventKind::Hung), 1);
}

#[test]
fn ten_consecutive_failures_should_emit_two_hangs() {
    let mut bench = bench("wlan0");
    bench.device.fail_next(10);

    for _ in 0..10 {
        assert!(bench.session.power_mode().is_err());
    }

    assert_eq!(bench.events.count(EventKind::Hung), 2);
}

#[test]
fn success_should_reset_failure_run() {
    let mut bench = bench("wlan0");

    bench.device.fail_next(4);
    for _ in 0..4 {
        assert!(bench.session.coexistence_status().is_err());
    }
    bench.session.coexistence_status().unwrap();

    bench.device.fail_next(4);
    for _ in 0..4 {
        assert!(bench.session.coexistence_status().is_err());
    }

    assert_eq!(bench.events.count(EventKind::Hung), 0);
}

#[test]
fn hung_session_should_keep_accepting_commands() -> anyhow::Result<()> {
    let mut bench = bench("wlan0");
    bench.device.fail_next(5);
    for _ in 0..5 {
        let _ = bench.session.filter_statistics();
    }

    let stats = bench.session.filter_statistics()?;

    assert_eq!(stats.unmatched, 0);
    assert!(bench.session.is_loaded());
    assert_eq!(bench.device.calls_with(Opcode::RxDataFilterStatistics).len(), 6);
    Ok(())
}
