#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use blepulse::timer::{Callback, Timer};
use blepulse::{Error, Result, Transport};

#[derive(Default)]
struct Armed {
    next_id: u64,
    pending: BTreeMap<u64, (Duration, Callback)>,
    armed_total: usize,
    max_pending: usize,
}

/// Timer that only fires when the test says so.
#[derive(Clone, Default)]
pub struct ManualTimer {
    armed: Arc<Mutex<Armed>>,
}

impl ManualTimer {
    pub fn pending(&self) -> usize {
        self.armed.lock().unwrap().pending.len()
    }

    /// Highest number of simultaneously pending timers ever observed
    pub fn max_pending(&self) -> usize {
        self.armed.lock().unwrap().max_pending
    }

    pub fn armed_total(&self) -> usize {
        self.armed.lock().unwrap().armed_total
    }

    pub fn last_duration(&self) -> Option<Duration> {
        let armed = self.armed.lock().unwrap();
        armed.pending.values().next_back().map(|(after, _)| *after)
    }

    /// Remove the oldest pending callback without running it, as if it had
    /// elapsed and were about to run.
    pub fn take_next(&self) -> Option<Callback> {
        let mut armed = self.armed.lock().unwrap();
        let id = *armed.pending.keys().next()?;
        armed.pending.remove(&id).map(|(_, callback)| callback)
    }

    /// Run the oldest pending callback. Returns false if nothing was pending.
    pub fn fire_next(&self) -> bool {
        match self.take_next() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl Timer for ManualTimer {
    type Handle = u64;

    fn arm(&self, after: Duration, callback: Callback) -> u64 {
        let mut armed = self.armed.lock().unwrap();
        let id = armed.next_id;
        armed.next_id += 1;
        armed.pending.insert(id, (after, callback));
        armed.armed_total += 1;
        armed.max_pending = armed.max_pending.max(armed.pending.len());
        id
    }

    fn cancel(&self, handle: u64) {
        self.armed.lock().unwrap().pending.remove(&handle);
    }
}

/// Transport that records every pushed value.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    subscribing: Arc<AtomicBool>,
    failing: Arc<AtomicBool>,
    pushed: Arc<Mutex<Vec<i64>>>,
}

impl RecordingTransport {
    pub fn subscribed() -> Self {
        let transport = Self::default();
        transport.set_subscribing(true);
        transport
    }

    pub fn set_subscribing(&self, subscribing: bool) {
        self.subscribing.store(subscribing, Ordering::SeqCst);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn pushed(&self) -> Vec<i64> {
        self.pushed.lock().unwrap().clone()
    }
}

impl Transport<i64> for RecordingTransport {
    fn is_subscribing(&self) -> bool {
        self.subscribing.load(Ordering::SeqCst)
    }

    fn push(&self, value: i64) -> Result<()> {
        self.pushed.lock().unwrap().push(value);

        if self.failing.load(Ordering::SeqCst) {
            Err(Error::NoListeners)
        } else {
            Ok(())
        }
    }
}
