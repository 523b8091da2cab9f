use crate::device::{EventKind, SessionId};

/// Fire-and-forget notifications towards the supplicant.
pub trait EventSink: Send + Sync {
    fn notify(&self, session: &SessionId, event: EventKind);
}
