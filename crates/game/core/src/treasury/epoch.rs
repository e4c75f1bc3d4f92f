//! Epoch clock with lazy rollover.
use crate::types::{Epoch, Timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpochClock {
    pub current: Epoch,
    pub started_at: Timestamp,
    pub duration: Timestamp,
}

impl EpochClock {
    pub fn new(started_at: Timestamp, duration: Timestamp) -> Self {
        Self {
            current: 0,
            started_at,
            duration: duration.max(1),
        }
    }

    /// Epoch and start time as of `now`, without mutating.
    ///
    /// Skips whole elapsed durations, so a long idle gap lands directly in
    /// the right epoch.
    pub fn at(&self, now: Timestamp) -> (Epoch, Timestamp) {
        if now < self.started_at.saturating_add(self.duration) {
            return (self.current, self.started_at);
        }
        let passed = (now - self.started_at) / self.duration;
        (
            self.current + passed,
            self.started_at + passed * self.duration,
        )
    }

    /// Rolls the clock forward. Returns `(from, to)` when the epoch changed.
    pub fn advance(&mut self, now: Timestamp) -> Option<(Epoch, Epoch)> {
        let (epoch, started_at) = self.at(now);
        if epoch == self.current {
            return None;
        }
        let from = self.current;
        self.current = epoch;
        self.started_at = started_at;
        Some((from, epoch))
    }

    pub fn time_remaining(&self, now: Timestamp) -> Timestamp {
        let (_, started_at) = self.at(now);
        started_at
            .saturating_add(self.duration)
            .saturating_sub(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_put_inside_duration() {
        let mut clock = EpochClock::new(1_000, 100);
        assert_eq!(clock.advance(1_099), None);
        assert_eq!(clock.current, 0);
        assert_eq!(clock.time_remaining(1_050), 50);
    }

    #[test]
    fn rolls_over_at_boundary() {
        let mut clock = EpochClock::new(1_000, 100);
        assert_eq!(clock.advance(1_100), Some((0, 1)));
        assert_eq!(clock.started_at, 1_100);
        assert_eq!(clock.time_remaining(1_100), 100);
    }

    #[test]
    fn skips_multiple_epochs() {
        let mut clock = EpochClock::new(0, 10);
        assert_eq!(clock.at(35), (3, 30));
        assert_eq!(clock.advance(35), Some((0, 3)));
        assert_eq!(clock.time_remaining(35), 5);
        assert_eq!(clock.advance(39), None);
    }
}
