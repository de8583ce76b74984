use uuid::Uuid;

use crate::characteristic::NotifyingCharacteristic;
use crate::scheduler::State;
use crate::source::ValueSource;
use crate::transport::Payload;

/// Type-erased view of a registered characteristic.
trait Registered: Send + Sync {
    fn uuid(&self) -> Uuid;
    fn state(&self) -> State;
    fn teardown(&self);
}

impl<S> Registered for NotifyingCharacteristic<S>
where
    S: ValueSource + 'static,
    S::Value: Payload,
{
    fn uuid(&self) -> Uuid {
        NotifyingCharacteristic::uuid(self)
    }

    fn state(&self) -> State {
        NotifyingCharacteristic::state(self)
    }

    fn teardown(&self) {
        NotifyingCharacteristic::teardown(self)
    }
}

/// Owns the characteristics of a peripheral and stops their notifications on teardown.
pub struct Peripheral {
    local_name: String,
    appearance: Option<u16>,
    characteristics: Vec<Box<dyn Registered>>,
}

impl Peripheral {
    pub fn new(local_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            appearance: None,
            characteristics: Vec::new(),
        }
    }

    /// GAP appearance value advertised by the peripheral
    pub fn appearance(mut self, appearance: u16) -> Self {
        self.appearance = Some(appearance);
        self
    }

    #[inline]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    #[inline]
    pub fn appearance_value(&self) -> Option<u16> {
        self.appearance
    }

    /// Register a characteristic. The peripheral keeps its own handle to it.
    pub fn add_characteristic<S>(&mut self, characteristic: &NotifyingCharacteristic<S>)
    where
        S: ValueSource + 'static,
        S::Value: Payload,
    {
        log::debug!(
            "Registering characteristic {} on {}",
            characteristic.uuid(),
            self.local_name
        );
        self.characteristics.push(Box::new(characteristic.clone()));
    }

    pub fn characteristic_count(&self) -> usize {
        self.characteristics.len()
    }

    /// Number of characteristics with a running notification chain
    pub fn active_notifications(&self) -> usize {
        self.characteristics
            .iter()
            .filter(|c| c.state() == State::Scheduled)
            .count()
    }

    /// Cancel every notification chain and end all notification streams.
    pub fn shutdown(&mut self) {
        if self.characteristics.is_empty() {
            return;
        }

        log::info!(
            "Shutting down {} with {} active notification(s)",
            self.local_name,
            self.active_notifications()
        );

        for characteristic in self.characteristics.drain(..) {
            log::trace!("Tearing down characteristic {}", characteristic.uuid());
            characteristic.teardown();
        }
    }
}

impl Drop for Peripheral {
    fn drop(&mut self) {
        self.shutdown();
    }
}
