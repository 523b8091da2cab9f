use std::time::Duration;

use crate::device::SessionId;

/// Arms and cancels the per-session scan completion deadline.
///
/// The expiry handler is bound when the scheduler is built. Callers keep at most
/// one deadline armed per session by always cancelling before arming.
pub trait DeadlineScheduler: Send + Sync {
    fn arm(&self, session: &SessionId, after: Duration);
    fn cancel(&self, session: &SessionId);
}
