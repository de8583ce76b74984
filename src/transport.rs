use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use futures::{Stream, StreamExt};
use stream_cancel::{Trigger, Valved};
use tokio::sync::broadcast;
use tokio::sync::broadcast::Sender;
use tokio_stream::wrappers::BroadcastStream;

use crate::{Error, Result};

/// The GATT side of a notifying characteristic.
///
/// Implementations must not call back into the scheduler from either method.
pub trait Transport<V>: Send + Sync {
    /// Whether a client is currently subscribed.
    fn is_subscribing(&self) -> bool;

    /// Deliver a new value to the subscribed client(s).
    fn push(&self, value: V) -> Result<()>;
}

/// Wire encoding of a characteristic value.
pub trait Payload {
    fn to_payload(&self) -> Vec<u8>;
}

/// Little-endian IEEE-754 double, 8 bytes.
impl Payload for f64 {
    fn to_payload(&self) -> Vec<u8> {
        self.to_le_bytes().to_vec()
    }
}

/// Integer values go out as doubles as well.
impl Payload for i64 {
    fn to_payload(&self) -> Vec<u8> {
        (*self as f64).to_payload()
    }
}

/// Decodes a payload produced by the `f64` [`Payload`] implementation.
pub fn decode_f64(payload: &[u8]) -> Option<f64> {
    let bytes: [u8; 8] = payload.try_into().ok()?;
    Some(f64::from_le_bytes(bytes))
}

pub type NotificationStream = Valved<Pin<Box<dyn Stream<Item = Vec<u8>> + Send>>>;

/// Ends one notification stream. `listener` dies with the stream it belongs to.
struct StreamStopper {
    _trigger: Trigger,
    listener: Weak<()>,
}

struct Channel {
    subscribing: AtomicBool,
    value: RwLock<Vec<u8>>,
    sender: Sender<Vec<u8>>,
    stream_stoppers: RwLock<Vec<StreamStopper>>,
}

/// In-process transport that fans notifications out over a broadcast channel.
#[derive(Clone)]
pub struct ChannelTransport {
    channel: Arc<Channel>,
}

impl Default for ChannelTransport {
    fn default() -> Self {
        ChannelTransport::new()
    }
}

impl ChannelTransport {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(16);

        Self {
            channel: Arc::new(Channel {
                subscribing: AtomicBool::new(false),
                value: RwLock::new(Vec::new()),
                sender,
                stream_stoppers: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Record a subscription change reported by the client.
    pub fn set_subscribing(&self, subscribing: bool) {
        self.channel.subscribing.store(subscribing, Ordering::SeqCst);
    }

    /// Latest encoded attribute value. Empty until the first push.
    pub fn value(&self) -> Vec<u8> {
        self.channel
            .value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Create a new stream that receives pushed payloads.
    pub fn notification_stream(&self) -> NotificationStream {
        let receiver = self.channel.sender.subscribe();
        let listener = Arc::new(());
        let stopper_listener = Arc::downgrade(&listener);

        let stream: Pin<Box<dyn Stream<Item = Vec<u8>> + Send>> =
            Box::pin(BroadcastStream::new(receiver).filter_map(move |x| {
                let _listener = &listener;
                async move { x.ok() }
            }));

        let (trigger, stream) = Valved::new(stream);

        let mut stoppers = self
            .channel
            .stream_stoppers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        stoppers.retain(|stopper| stopper.listener.strong_count() > 0);
        stoppers.push(StreamStopper {
            _trigger: trigger,
            listener: stopper_listener,
        });

        stream
    }

    /// Number of notification streams that are still alive.
    pub fn stream_count(&self) -> usize {
        self.channel
            .stream_stoppers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|stopper| stopper.listener.strong_count() > 0)
            .count()
    }

    /// End every stream handed out by [`notification_stream`](Self::notification_stream).
    pub fn close(&self) {
        self.channel
            .stream_stoppers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<V: Payload> Transport<V> for ChannelTransport {
    fn is_subscribing(&self) -> bool {
        self.channel.subscribing.load(Ordering::SeqCst)
    }

    fn push(&self, value: V) -> Result<()> {
        let payload = value.to_payload();

        *self
            .channel
            .value
            .write()
            .unwrap_or_else(PoisonError::into_inner) = payload.clone();

        self.channel
            .sender
            .send(payload)
            .map(|_| ())
            .map_err(|_| Error::NoListeners)
    }
}
