//! This example serves a simulated heart rate measurement, lets a local client
//! subscribe to it for a few seconds, resubscribes once and then tears the
//! peripheral down.

use blepulse::common::characteristics::HEART_RATE_MEASUREMENT;
use blepulse::common::HEART_RATE_SENSOR_APPEARANCE;
use blepulse::heart_rate::HeartRateMonitor;
use blepulse::transport::decode_f64;
use blepulse::{Error, NotifyingCharacteristic, Peripheral, SchedulerConfig};
use futures::StreamExt;
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() -> Result<(), Error> {
    pretty_env_logger::init();

    let measurement = NotifyingCharacteristic::new(
        HEART_RATE_MEASUREMENT,
        HeartRateMonitor::new(),
        SchedulerConfig::default().interval(Duration::from_secs(1)),
    )?;

    let mut peripheral =
        Peripheral::new("superpaahdin3000").appearance(HEART_RATE_SENSOR_APPEARANCE);
    peripheral.add_characteristic(&measurement);

    // Print notifications in a separate task as they arrive
    let mut notifications = measurement.notifications();
    let join_handle = tokio::spawn(async move {
        while let Some(payload) = notifications.next().await {
            match decode_f64(&payload) {
                Some(value) => println!("Notified: {:.3}", value),
                None => println!("Unexpected payload: {:x?}", payload),
            }
        }
    });

    measurement.start_notify();
    sleep(Duration::from_millis(3500)).await;

    measurement.stop_notify();
    println!("Unsubscribed, last value: {:?}", decode_f64(&measurement.read()));
    sleep(Duration::from_secs(2)).await;

    // Reset the energy counter the way a control point write would
    measurement
        .scheduler()
        .with_source(|monitor| monitor.write_control_point(&[0x01]))?;

    measurement.start_notify();
    sleep(Duration::from_millis(2500)).await;

    peripheral.shutdown();

    join_handle.await.unwrap();

    Ok(())
}
