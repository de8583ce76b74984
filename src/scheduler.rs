use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::time::Instant;

use crate::source::ValueSource;
use crate::timer::Timer;
use crate::transport::Transport;
use crate::{Error, Result};

/// Cadence and rate limit of a notification chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Delay between two timer firings.
    interval: Duration,
    /// Pushes closer together than this are skipped. Half the interval unless set.
    min_spacing: Option<Duration>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            min_spacing: None,
        }
    }
}

impl SchedulerConfig {
    /// Delay between two pushes. Intervals too long to schedule never fire.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Minimum time between two timer-driven pushes
    pub fn min_spacing(mut self, min_spacing: Duration) -> Self {
        self.min_spacing = Some(min_spacing);
        self
    }

    pub fn notify_interval(&self) -> Duration {
        self.interval
    }

    pub fn rate_limit(&self) -> Duration {
        self.min_spacing.unwrap_or(self.interval / 2)
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::ZeroInterval);
        }
        if self.rate_limit().is_zero() {
            return Err(Error::ZeroMinSpacing);
        }
        Ok(())
    }
}

/// Whether a notification chain is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Scheduled,
}

enum Chain<H> {
    Idle,
    Scheduled { generation: u64, handle: H },
}

struct Inner<S, H> {
    source: S,
    chain: Chain<H>,
    last_fire: Option<Instant>,
    generation: u64,
}

impl<S, H> Inner<S, H> {
    fn take_handle(&mut self) -> Option<H> {
        match mem::replace(&mut self.chain, Chain::Idle) {
            Chain::Scheduled { handle, .. } => Some(handle),
            Chain::Idle => None,
        }
    }
}

struct Shared<S, T, C: Timer> {
    config: SchedulerConfig,
    transport: T,
    timer: C,
    inner: Mutex<Inner<S, C::Handle>>,
}

impl<S, T, C: Timer> Drop for Shared<S, T, C> {
    fn drop(&mut self) {
        let inner = self
            .inner
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(handle) = inner.take_handle() {
            log::debug!("Cancelling pending notification timer on teardown");
            self.timer.cancel(handle);
        }
    }
}

/// Drives the periodic notifications of one characteristic.
///
/// Subscription changes and timer firings are serialized through one lock, so
/// at most one timer is ever pending. Clones share the same chain.
pub struct NotificationScheduler<S, T, C: Timer> {
    shared: Arc<Shared<S, T, C>>,
}

impl<S, T, C: Timer> Clone for NotificationScheduler<S, T, C> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<S, T, C> NotificationScheduler<S, T, C>
where
    S: ValueSource + 'static,
    T: Transport<S::Value> + 'static,
    C: Timer,
{
    pub fn new(config: SchedulerConfig, source: S, transport: T, timer: C) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                transport,
                timer,
                inner: Mutex::new(Inner {
                    source,
                    chain: Chain::Idle,
                    last_fire: None,
                    generation: 0,
                }),
            }),
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.shared.config
    }

    pub fn transport(&self) -> &T {
        &self.shared.transport
    }

    pub fn state(&self) -> State {
        match self.lock().chain {
            Chain::Idle => State::Idle,
            Chain::Scheduled { .. } => State::Scheduled,
        }
    }

    /// Run `f` against the value source while holding the scheduler state.
    pub fn with_source<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.lock().source)
    }

    /// A client subscribed. Pushes a value right away and starts the chain.
    pub fn on_subscribe(&self) {
        let mut inner = self.lock();

        if let Chain::Scheduled { .. } = inner.chain {
            log::debug!("Notifications are already running");
            return;
        }

        log::info!(
            "Client subscribed, notifying every {:?}",
            self.shared.config.interval
        );

        self.push(&mut inner, Instant::now());
        self.arm(&mut inner);
    }

    /// The client unsubscribed. No push happens for this chain once this returns.
    pub fn on_unsubscribe(&self) {
        let mut inner = self.lock();

        match inner.take_handle() {
            Some(handle) => {
                self.shared.timer.cancel(handle);
                log::info!("Client unsubscribed, notifications stopped");
            }
            None => log::debug!("Notifications are already stopped"),
        }
    }

    /// Handle an elapsed interval for the pending timer.
    pub fn on_timer_fire(&self) {
        let mut inner = self.lock();

        match inner.take_handle() {
            Some(handle) => {
                self.shared.timer.cancel(handle);
                self.tick(&mut inner);
            }
            None => log::warn!("Timer fired while no notification chain is active, ignoring"),
        }
    }

    /// Stop the chain as part of tearing the characteristic down.
    pub fn shutdown(&self) {
        let mut inner = self.lock();

        if let Some(handle) = inner.take_handle() {
            log::info!("Cancelling notifications on shutdown");
            self.shared.timer.cancel(handle);
        }
    }

    fn fire(&self, generation: u64) {
        let mut inner = self.lock();

        match inner.chain {
            Chain::Scheduled { generation: armed, .. } if armed == generation => {}
            _ => {
                log::debug!("Discarding stale notification timer #{}", generation);
                return;
            }
        }

        if let Some(handle) = inner.take_handle() {
            self.shared.timer.cancel(handle);
        }
        self.tick(&mut inner);
    }

    /// Expects the chain to be idle; leaves it either rearmed or idle.
    fn tick(&self, inner: &mut Inner<S, C::Handle>) {
        if !self.shared.transport.is_subscribing() {
            log::info!("Client is no longer subscribed, notifications stopped");
            return;
        }

        let now = Instant::now();
        let rate_limit = self.shared.config.rate_limit();

        match inner.last_fire {
            Some(last) if now.saturating_duration_since(last) < rate_limit => {
                log::debug!(
                    "Skipping notification, only {:?} since the previous one",
                    now.saturating_duration_since(last)
                );
            }
            _ => self.push(inner, now),
        }

        self.arm(inner);
    }

    fn push(&self, inner: &mut Inner<S, C::Handle>, now: Instant) {
        let value = inner.source.next_value();
        inner.last_fire = Some(now);

        log::trace!("Notifying with value {:?}", value);

        if let Err(e) = self.shared.transport.push(value) {
            log::warn!("Could not push value {:?}: {}", value, e);
        }
    }

    fn arm(&self, inner: &mut Inner<S, C::Handle>) {
        inner.generation = inner.generation.wrapping_add(1);
        let generation = inner.generation;

        let scheduler: Weak<Shared<S, T, C>> = Arc::downgrade(&self.shared);
        let handle = self.shared.timer.arm(
            self.shared.config.interval,
            Box::new(move || {
                if let Some(shared) = scheduler.upgrade() {
                    NotificationScheduler { shared }.fire(generation);
                }
            }),
        );

        let previous = mem::replace(&mut inner.chain, Chain::Scheduled { generation, handle });
        if let Chain::Scheduled { handle, .. } = previous {
            log::error!(
                "Notification timer armed while another was pending, cancelling the older one"
            );
            self.shared.timer.cancel(handle);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S, C::Handle>> {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_one_second_cadence() {
        let config = SchedulerConfig::default();

        assert_eq!(config.notify_interval(), Duration::from_secs(1));
        assert_eq!(config.rate_limit(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn explicit_min_spacing_overrides_default() {
        let config = SchedulerConfig::default()
            .interval(Duration::from_secs(5))
            .min_spacing(Duration::from_secs(4));

        assert_eq!(config.rate_limit(), Duration::from_secs(4));
    }

    #[test]
    fn zero_durations_are_rejected() {
        assert!(matches!(
            SchedulerConfig::default().interval(Duration::ZERO).validate(),
            Err(Error::ZeroInterval)
        ));
        assert!(matches!(
            SchedulerConfig::default()
                .min_spacing(Duration::ZERO)
                .validate(),
            Err(Error::ZeroMinSpacing)
        ));
        // Half of a single nanosecond rounds down to zero.
        assert!(matches!(
            SchedulerConfig::default()
                .interval(Duration::from_nanos(1))
                .validate(),
            Err(Error::ZeroMinSpacing)
        ));
    }
}
