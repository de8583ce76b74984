use std::time::Duration;

use stream_cancel::{Trigger, Tripwire};
use tokio::runtime::Handle;
use tokio::time::Instant;

use crate::{Error, Result};

/// Stand-in deadline for intervals too long to add to the current instant.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Work to run once a timer elapses.
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// One-shot timers used to drive a notification chain.
///
/// Implementations must not invoke the callback before `arm` returns, since the
/// scheduler arms new timers while holding its own state.
pub trait Timer: Send + Sync + 'static {
    type Handle: Send + 'static;

    /// Run `callback` once `after` has elapsed.
    fn arm(&self, after: Duration, callback: Callback) -> Self::Handle;

    /// Prevent a pending callback from running. Cancelling a timer that already
    /// fired or was already cancelled does nothing.
    fn cancel(&self, handle: Self::Handle);
}

/// Timer that spawns one task per armed timer on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioTimer {
    runtime: Handle,
}

impl TokioTimer {
    /// Uses the runtime of the calling context.
    pub fn new() -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        Ok(Self::with_runtime(runtime))
    }

    pub fn with_runtime(runtime: Handle) -> Self {
        Self { runtime }
    }
}

/// Pending [`TokioTimer`] task. Dropping it cancels the timer as well.
pub struct TimerHandle {
    trigger: Trigger,
}

impl Timer for TokioTimer {
    type Handle = TimerHandle;

    fn arm(&self, after: Duration, callback: Callback) -> TimerHandle {
        let now = Instant::now();
        let deadline = now.checked_add(after).unwrap_or_else(|| now + FAR_FUTURE);
        let (trigger, tripwire) = Tripwire::new();

        self.runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = tripwire => log::trace!("Notification timer cancelled"),
                _ = tokio::time::sleep_until(deadline) => callback(),
            }
        });

        TimerHandle { trigger }
    }

    fn cancel(&self, handle: TimerHandle) {
        handle.trigger.cancel();
    }
}
