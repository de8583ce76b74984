use uuid::Uuid;

use crate::scheduler::{NotificationScheduler, SchedulerConfig, State};
use crate::source::ValueSource;
use crate::timer::TokioTimer;
use crate::transport::{ChannelTransport, NotificationStream, Payload};
use crate::Result;

pub type ChannelScheduler<S> = NotificationScheduler<S, ChannelTransport, TokioTimer>;

/// A characteristic that notifies subscribers with values from `S`.
pub struct NotifyingCharacteristic<S: ValueSource> {
    uuid: Uuid,
    transport: ChannelTransport,
    scheduler: ChannelScheduler<S>,
}

impl<S: ValueSource> Clone for NotifyingCharacteristic<S> {
    fn clone(&self) -> Self {
        Self {
            uuid: self.uuid,
            transport: self.transport.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<S> NotifyingCharacteristic<S>
where
    S: ValueSource + 'static,
    S::Value: Payload,
{
    /// Must be called from within a tokio runtime.
    pub fn new(uuid: Uuid, source: S, config: SchedulerConfig) -> Result<Self> {
        let transport = ChannelTransport::new();
        let scheduler =
            NotificationScheduler::new(config, source, transport.clone(), TokioTimer::new()?)?;

        Ok(Self {
            uuid,
            transport,
            scheduler,
        })
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// The most recently notified value, empty until the first push.
    pub fn read(&self) -> Vec<u8> {
        self.transport.value()
    }

    /// A client enabled notifications.
    pub fn start_notify(&self) {
        self.transport.set_subscribing(true);
        self.scheduler.on_subscribe();
    }

    /// A client disabled notifications.
    pub fn stop_notify(&self) {
        self.transport.set_subscribing(false);
        self.scheduler.on_unsubscribe();
    }

    /// Create a new stream that receives notified payloads.
    pub fn notifications(&self) -> NotificationStream {
        self.transport.notification_stream()
    }

    #[inline]
    pub fn state(&self) -> State {
        self.scheduler.state()
    }

    pub fn scheduler(&self) -> &ChannelScheduler<S> {
        &self.scheduler
    }

    pub(crate) fn teardown(&self) {
        self.transport.set_subscribing(false);
        self.scheduler.shutdown();
        self.transport.close();
    }
}
