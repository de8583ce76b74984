//! Simulated heart rate sensor used as an example notification source.

use crate::source::{Counter, ValueSource};
use crate::{Error, Result};

pub const MIN_HEART_RATE: i64 = 60;
pub const MAX_HEART_RATE: i64 = 180;

/// Where the simulated sensor is worn.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySensorLocation {
    Other = 0,
    Chest = 1,
    Wrist = 2,
    Finger = 3,
    Hand = 4,
    EarLobe = 5,
    Foot = 6,
}

impl BodySensorLocation {
    /// Value of the body sensor location characteristic
    pub fn to_payload(self) -> Vec<u8> {
        vec![self as u8]
    }
}

/// Opcodes accepted by the heart rate control point.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPoint {
    ResetEnergyExpended = 1,
}

impl TryFrom<u8> for ControlPoint {
    type Error = Error;

    fn try_from(opcode: u8) -> Result<Self> {
        match opcode {
            1 => Ok(ControlPoint::ResetEnergyExpended),
            other => Err(Error::UnsupportedOpcode(other)),
        }
    }
}

/// Heart rate cycling through 60..=180 bpm with a running energy counter.
///
/// Each reading is the heart rate plus the energy expended in thousandths, so
/// both counters are visible in a single double.
#[derive(Debug, Clone)]
pub struct HeartRateMonitor {
    heart_rate: Counter,
    energy_expended: u32,
    location: BodySensorLocation,
}

impl Default for HeartRateMonitor {
    fn default() -> Self {
        HeartRateMonitor::new()
    }
}

impl HeartRateMonitor {
    pub fn new() -> Self {
        Self {
            heart_rate: Counter::from_bounds(MIN_HEART_RATE, MAX_HEART_RATE),
            energy_expended: 0,
            location: BodySensorLocation::Chest,
        }
    }

    pub fn location(mut self, location: BodySensorLocation) -> Self {
        self.location = location;
        self
    }

    #[inline]
    pub fn energy_expended(&self) -> u32 {
        self.energy_expended
    }

    #[inline]
    pub fn sensor_location(&self) -> BodySensorLocation {
        self.location
    }

    pub fn reset_energy_expended(&mut self) {
        log::info!("Resetting energy expended");
        self.energy_expended = 0;
    }

    /// Handle a write to the heart rate control point.
    pub fn write_control_point(&mut self, value: &[u8]) -> Result<()> {
        let [opcode] = value else {
            return Err(Error::InvalidControlPoint(value.len()));
        };

        match ControlPoint::try_from(*opcode)? {
            ControlPoint::ResetEnergyExpended => self.reset_energy_expended(),
        }

        Ok(())
    }
}

impl ValueSource for HeartRateMonitor {
    type Value = f64;

    fn next_value(&mut self) -> f64 {
        let heart_rate = self.heart_rate.next_value();
        self.energy_expended = self.energy_expended.saturating_add(1);

        heart_rate as f64 + f64::from(self.energy_expended) / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_combine_heart_rate_and_energy() {
        let mut monitor = HeartRateMonitor::new();

        assert_eq!(monitor.next_value(), 60.001);
        assert_eq!(monitor.next_value(), 61.002);
        assert_eq!(monitor.energy_expended(), 2);
    }

    #[test]
    fn control_point_resets_energy_expended() {
        let mut monitor = HeartRateMonitor::new();
        monitor.next_value();
        monitor.next_value();

        monitor.write_control_point(&[0x01]).unwrap();

        assert_eq!(monitor.energy_expended(), 0);
        assert_eq!(monitor.next_value(), 62.001);
    }

    #[test]
    fn control_point_rejects_bad_writes() {
        let mut monitor = HeartRateMonitor::new();
        monitor.next_value();

        assert!(matches!(
            monitor.write_control_point(&[]),
            Err(Error::InvalidControlPoint(0))
        ));
        assert!(matches!(
            monitor.write_control_point(&[1, 0]),
            Err(Error::InvalidControlPoint(2))
        ));
        assert!(matches!(
            monitor.write_control_point(&[0x07]),
            Err(Error::UnsupportedOpcode(0x07))
        ));
        assert_eq!(monitor.energy_expended(), 1);
    }

    #[test]
    fn sensor_location_is_one_byte() {
        assert_eq!(HeartRateMonitor::new().sensor_location().to_payload(), vec![1]);
        assert_eq!(
            HeartRateMonitor::new()
                .location(BodySensorLocation::Wrist)
                .sensor_location()
                .to_payload(),
            vec![2]
        );
    }
}
