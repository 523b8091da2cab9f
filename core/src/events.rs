use tracing::info;
use wlbridge_common::device::{EventKind, SessionId};
use wlbridge_common::events::EventSink;

/// Reports session events as supplicant-style driver-state log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn notify(&self, session: &SessionId, event: EventKind) {
        info!(session = %session, "CTRL-EVENT-DRIVER-STATE {}", event.state());
    }
}
