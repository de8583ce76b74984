use std::fmt::Debug;
use std::num::NonZeroU32;

use crate::{Error, Result};

/// Produces the values pushed by a notification scheduler.
pub trait ValueSource: Send {
    type Value: Copy + Debug + Send;

    /// Returns the next value. Never blocks and never fails.
    fn next_value(&mut self) -> Self::Value;
}

/// What a [`Counter`] does when advancing would pass its maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    /// Start over from the minimum.
    #[default]
    Wrap,
    /// Stay at the maximum and report exhaustion.
    Clamp,
}

/// Bounded integer counter that yields its current value and then steps forward.
#[derive(Debug, Clone)]
pub struct Counter {
    current: i64,
    min: i64,
    max: i64,
    step: NonZeroU32,
    overflow: Overflow,
    exhausted: bool,
}

impl Counter {
    /// Counter over `min..=max`, starting at `min`.
    pub fn new(min: i64, max: i64) -> Result<Self> {
        if min > max {
            return Err(Error::InvalidRange { min, max });
        }

        Ok(Self::from_bounds(min, max))
    }

    pub(crate) const fn from_bounds(min: i64, max: i64) -> Self {
        Self {
            current: min,
            min,
            max,
            step: NonZeroU32::MIN,
            overflow: Overflow::Wrap,
            exhausted: false,
        }
    }

    /// First value to yield. Values outside the range are clamped into it.
    pub fn start_at(mut self, start: i64) -> Self {
        self.current = start.clamp(self.min, self.max);
        self.exhausted = false;
        self
    }

    /// Amount added on every step
    pub fn step(mut self, step: NonZeroU32) -> Self {
        self.step = step;
        self
    }

    pub fn overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    #[inline]
    pub fn current(&self) -> i64 {
        self.current
    }

    #[inline]
    pub fn min(&self) -> i64 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> i64 {
        self.max
    }

    /// Whether a clamping counter has run into its maximum.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn advance(&mut self) {
        match self.current.checked_add(i64::from(self.step.get())) {
            Some(next) if next <= self.max => self.current = next,
            _ => match self.overflow {
                Overflow::Wrap => self.current = self.min,
                Overflow::Clamp => {
                    self.current = self.max;
                    self.exhausted = true;
                }
            },
        }
    }
}

impl ValueSource for Counter {
    type Value = i64;

    fn next_value(&mut self) -> i64 {
        let value = self.current;
        self.advance();
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_back_to_min_after_max() {
        let mut counter = Counter::new(60, 180).unwrap();

        let values = (0..123).map(|_| counter.next_value()).collect::<Vec<_>>();

        assert_eq!(&values[..121], (60..=180).collect::<Vec<_>>().as_slice());
        assert_eq!(&values[121..], &[60, 61]);
        assert!(!counter.is_exhausted());
    }

    #[test]
    fn clamp_stays_at_max_and_reports_exhaustion() {
        let mut counter = Counter::new(0, 2).unwrap().overflow(Overflow::Clamp);

        assert_eq!(counter.next_value(), 0);
        assert_eq!(counter.next_value(), 1);
        assert!(!counter.is_exhausted());
        assert_eq!(counter.next_value(), 2);
        assert!(counter.is_exhausted());
        assert_eq!(counter.next_value(), 2);
        assert_eq!(counter.current(), 2);
    }

    #[test]
    fn larger_steps_wrap_when_passing_max() {
        let mut counter = Counter::new(0, 10)
            .unwrap()
            .start_at(6)
            .step(NonZeroU32::new(3).unwrap());

        assert_eq!(counter.next_value(), 6);
        assert_eq!(counter.next_value(), 9);
        assert_eq!(counter.next_value(), 0);
    }

    #[test]
    fn start_is_clamped_into_range() {
        assert_eq!(Counter::new(5, 8).unwrap().start_at(100).current(), 8);
        assert_eq!(Counter::new(5, 8).unwrap().start_at(-3).current(), 5);
    }

    #[test]
    fn rejects_inverted_range() {
        assert!(matches!(
            Counter::new(10, 1),
            Err(Error::InvalidRange { min: 10, max: 1 })
        ));
    }

    #[test]
    fn single_value_range_repeats() {
        let mut counter = Counter::new(7, 7).unwrap();

        assert_eq!(counter.next_value(), 7);
        assert_eq!(counter.next_value(), 7);
    }
}
