//! Periodic BLE GATT notifications.
//!
//! When a client subscribes to a characteristic, a [`NotificationScheduler`] pushes
//! one value right away and then keeps pushing fresh values from a [`ValueSource`]
//! at a fixed interval, until the client unsubscribes or the characteristic is torn
//! down. Subscription changes and timer firings are serialized per scheduler, so a
//! characteristic never runs two timer chains and never notifies after
//! unsubscribing.
//!
//! ## Usage
//!
//! Here is an example that serves a simulated heart rate measurement and prints
//! the values a subscribed client receives:
//!
//! ```rust,no_run
//! use blepulse::common::characteristics::HEART_RATE_MEASUREMENT;
//! use blepulse::heart_rate::HeartRateMonitor;
//! use blepulse::transport::decode_f64;
//! use blepulse::{Error, NotifyingCharacteristic, Peripheral, SchedulerConfig};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     pretty_env_logger::init();
//!
//!     let measurement = NotifyingCharacteristic::new(
//!         HEART_RATE_MEASUREMENT,
//!         HeartRateMonitor::new(),
//!         SchedulerConfig::default(),
//!     )?;
//!
//!     let mut peripheral = Peripheral::new("heart-rate");
//!     peripheral.add_characteristic(&measurement);
//!
//!     // Listen before subscribing so the first push is received
//!     let mut notifications = measurement.notifications();
//!     measurement.start_notify();
//!
//!     while let Some(payload) = notifications.next().await {
//!         println!("{:?}", decode_f64(&payload));
//!     }
//!
//!     Ok(())
//! }
//!```

#![warn(clippy::all, future_incompatible, nonstandard_style, rust_2018_idioms)]

pub use error::{Error, Result};

pub use characteristic::{ChannelScheduler, NotifyingCharacteristic};
pub use peripheral::Peripheral;
pub use scheduler::{NotificationScheduler, SchedulerConfig, State};
pub use source::{Counter, Overflow, ValueSource};
pub use timer::{Timer, TokioTimer};
pub use transport::{ChannelTransport, Transport};

mod characteristic;
mod error;
mod peripheral;
mod scheduler;
mod source;

pub mod common;
pub mod heart_rate;
pub mod timer;
pub mod transport;
