//! Scan completion deadlines on top of the tokio timer.
//!
//! Each armed deadline is a spawned task sleeping for the requested duration.
//! Cancelling or re-arming aborts the pending task, so at most one deadline per
//! session is ever live.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;
use wlbridge_common::device::SessionId;
use wlbridge_common::scheduler::DeadlineScheduler;

pub type ExpiryHandler = Arc<dyn Fn(&SessionId) + Send + Sync>;

pub struct TokioDeadlines {
    runtime: Handle,
    on_expire: ExpiryHandler,
    pending: Mutex<HashMap<SessionId, JoinHandle<()>>>,
}

impl TokioDeadlines {
    pub fn new(runtime: Handle, on_expire: impl Fn(&SessionId) + Send + Sync + 'static) -> Self {
        Self {
            runtime,
            on_expire: Arc::new(on_expire),
            pending: Mutex::new(HashMap::new()),
        }
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<SessionId, JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeadlineScheduler for TokioDeadlines {
    fn arm(&self, session: &SessionId, after: Duration) {
        let on_expire = self.on_expire.clone();
        let owner = session.clone();
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(after).await;
            debug!(session = %owner, "Scan deadline expired");
            on_expire(&owner);
        });

        if let Some(previous) = self.pending().insert(session.clone(), task) {
            previous.abort();
        }
    }

    fn cancel(&self, session: &SessionId) {
        if let Some(task) = self.pending().remove(session) {
            task.abort();
        }
    }
}

impl Drop for TokioDeadlines {
    fn drop(&mut self) {
        for (_, task) in self.pending().drain() {
            task.abort();
        }
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
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting() -> (TokioDeadlines, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let deadlines = TokioDeadlines::new(Handle::current(), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (deadlines, fired)
    }

    #[tokio::test(start_paused = true)]
    async fn arm_should_fire_once_after_timeout() {
        let (deadlines, fired) = counting();
        let session = SessionId::new("wlan0");

        deadlines.arm(&session, Duration::from_secs(15));

        tokio::time::sleep(Duration::from_secs(14)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_should_prevent_expiry() {
        let (deadlines, fired) = counting();
        let session = SessionId::new("wlan0");

        deadlines.arm(&session, Duration::from_secs(15));
        deadlines.cancel(&session);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rearm_should_replace_pending_deadline() {
        let (deadlines, fired) = counting();
        let session = SessionId::new("wlan0");

        deadlines.arm(&session, Duration::from_secs(15));
        tokio::time::sleep(Duration::from_secs(10)).await;
        deadlines.arm(&session, Duration::from_secs(15));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sessions_should_have_independent_deadlines() {
        let (deadlines, fired) = counting();
        let first = SessionId::new("wlan0");
        let second = SessionId::new("wlan1");

        deadlines.arm(&first, Duration::from_secs(15));
        deadlines.arm(&second, Duration::from_secs(15));
        deadlines.cancel(&first);

        tokio::time::sleep(Duration::from_secs(16)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
