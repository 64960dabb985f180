use crate::core::board::TICK_MILLIS;

use super::config::SessionConfig;

/// Decides when gravity pulls the current piece down.
///
/// The clock accumulates simulated time in [`TICK_MILLIS`] steps. The fall
/// interval starts at the configured value, is doubled once per slow-time
/// applied until restored, and shrinks by a fixed step at regular intervals down to a floor.
#[derive(Debug, Clone)]
pub struct FallClock {
    base_interval: u32,
    min_interval: u32,
    slow_doublings: u32,
    fall_elapsed: u32,
    speed_up_every: u32,
    speed_up_step: u32,
    speed_up_elapsed: u32,
}

impl FallClock {
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            base_interval: config.fall_interval_millis,
            min_interval: config.min_fall_interval_millis,
            slow_doublings: 0,
            fall_elapsed: 0,
            speed_up_every: config.speed_up_every_millis,
            speed_up_step: config.speed_up_step_millis,
            speed_up_elapsed: 0,
        }
    }

    /// Fall interval without slow-time applied.
    #[must_use]
    pub fn base_interval(&self) -> u32 {
        self.base_interval
    }

    /// Fall interval currently in effect.
    #[must_use]
    pub fn interval(&self) -> u32 {
        self.base_interval
            .saturating_mul(2_u32.saturating_pow(self.slow_doublings))
    }

    #[must_use]
    pub fn is_slowed(&self) -> bool {
        self.slow_doublings > 0
    }

    /// Doubles the fall interval in effect until [`Self::restore`].
    pub fn slow_down(&mut self) {
        self.slow_doublings = self.slow_doublings.saturating_add(1);
    }

    /// Returns to the base interval.
    pub fn restore(&mut self) {
        self.slow_doublings = 0;
    }

    /// Advances the fall accumulator by one tick.
    ///
    /// Returns `true` when a gravity step is due; the accumulator is reset.
    pub fn tick(&mut self) -> bool {
        self.fall_elapsed += TICK_MILLIS;
        if self.fall_elapsed < self.interval() {
            return false;
        }
        self.fall_elapsed = 0;
        true
    }

    /// Advances the speed-up schedule by one tick.
    ///
    /// Returns the new base interval when a speed-up happened.
    pub fn advance_speed_up(&mut self) -> Option<u32> {
        self.speed_up_elapsed += TICK_MILLIS;
        if self.speed_up_elapsed < self.speed_up_every {
            return None;
        }
        self.speed_up_elapsed -= self.speed_up_every;
        let faster = self
            .base_interval
            .saturating_sub(self.speed_up_step)
            .max(self.min_interval);
        if faster >= self.base_interval {
            return None;
        }
        self.base_interval = faster;
        Some(faster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> FallClock {
        FallClock::new(&SessionConfig::default())
    }

    #[test]
    fn test_fall_every_interval() {
        let mut clock = clock();
        // 800ms / 16ms = 50 ticks.
        for _ in 0..49 {
            assert!(!clock.tick());
        }
        assert!(clock.tick());
        for _ in 0..49 {
            assert!(!clock.tick());
        }
        assert!(clock.tick());
    }

    #[test]
    fn test_slow_down_doubles_until_restored() {
        let mut clock = clock();
        clock.slow_down();
        assert!(clock.is_slowed());
        assert_eq!(clock.interval(), 1600);
        for _ in 0..99 {
            assert!(!clock.tick());
        }
        assert!(clock.tick());

        clock.restore();
        assert!(!clock.is_slowed());
        assert_eq!(clock.interval(), 800);
    }

    #[test]
    fn test_slow_down_stacks() {
        let mut clock = clock();
        clock.slow_down();
        clock.slow_down();
        assert_eq!(clock.interval(), 3200);
        // 3200ms / 16ms = 200 ticks.
        for _ in 0..199 {
            assert!(!clock.tick());
        }
        assert!(clock.tick());

        clock.restore();
        assert_eq!(clock.interval(), 800);
    }

    #[test]
    fn test_slow_down_saturates() {
        let mut clock = clock();
        for _ in 0..40 {
            clock.slow_down();
        }
        assert_eq!(clock.interval(), u32::MAX);
    }

    #[test]
    fn test_speed_up_schedule() {
        let mut clock = clock();
        // 30000ms is 1875 ticks.
        for _ in 0..1874 {
            assert_eq!(clock.advance_speed_up(), None);
        }
        assert_eq!(clock.advance_speed_up(), Some(740));
        assert_eq!(clock.base_interval(), 740);
    }

    #[test]
    fn test_speed_up_is_monotonic_and_floored() {
        let mut clock = clock();
        let mut last = clock.base_interval();
        for _ in 0..(1875 * 20) {
            if let Some(interval) = clock.advance_speed_up() {
                assert!(interval < last);
                last = interval;
            }
        }
        assert_eq!(clock.base_interval(), 80);

        clock.slow_down();
        assert_eq!(clock.interval(), 160);
    }
}
