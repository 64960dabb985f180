use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// A card effect that stays active for a number of ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum TimedEffect {
    #[display("multiplier")]
    Multiplier,
    #[display("slow time")]
    SlowTime,
    #[display("ghost")]
    Ghost,
    #[display("reverse gravity")]
    GravityReverse,
    #[display("time freeze")]
    Freeze,
    #[display("golden touch")]
    Golden,
}

impl TimedEffect {
    pub const LEN: usize = 6;

    pub const ALL: [Self; Self::LEN] = [
        TimedEffect::Multiplier,
        TimedEffect::SlowTime,
        TimedEffect::Ghost,
        TimedEffect::GravityReverse,
        TimedEffect::Freeze,
        TimedEffect::Golden,
    ];
}

/// Remaining-tick counters of every timed effect plus the score multiplier.
///
/// An effect is active exactly while its counter is positive; the multiplier
/// is active while it is above 1. Counters are decremented by [`Self::tick`].
///
/// Reversed gravity and ghost mode only carry this lifecycle: nothing in the
/// simulation reads them besides the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveEffects {
    multiplier: u32,
    timers: [u32; TimedEffect::LEN],
}

impl Default for ActiveEffects {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveEffects {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            multiplier: 1,
            timers: [0; TimedEffect::LEN],
        }
    }

    #[must_use]
    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    #[must_use]
    pub fn remaining(&self, effect: TimedEffect) -> u32 {
        self.timers[effect as usize]
    }

    #[must_use]
    pub fn is_active(&self, effect: TimedEffect) -> bool {
        match effect {
            TimedEffect::Multiplier => self.multiplier > 1,
            _ => self.remaining(effect) > 0,
        }
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.is_active(TimedEffect::Freeze)
    }

    #[must_use]
    pub fn is_golden(&self) -> bool {
        self.is_active(TimedEffect::Golden)
    }

    /// Effects currently active, in declaration order.
    pub fn active(&self) -> impl Iterator<Item = (TimedEffect, u32)> + '_ {
        TimedEffect::ALL
            .into_iter()
            .filter(|effect| self.is_active(*effect))
            .map(|effect| (effect, self.remaining(effect)))
    }

    /// (Re)starts `effect` with `duration` ticks.
    pub fn start(&mut self, effect: TimedEffect, duration: u32) {
        self.timers[effect as usize] = duration;
    }

    /// Sets the score multiplier without touching its timer.
    pub fn set_multiplier(&mut self, multiplier: u32) {
        self.multiplier = multiplier;
    }

    /// Sets the multiplier and runs its timer for `duration` ticks.
    pub fn start_multiplier(&mut self, multiplier: u32, duration: u32) {
        self.multiplier = multiplier;
        self.start(TimedEffect::Multiplier, duration);
    }

    /// Decrements every running counter by one tick.
    ///
    /// Returns the effects whose counter reached zero on this tick. The
    /// multiplier drops back to 1 when its own timer expires, and when golden
    /// touch expires while it is above 3.
    pub fn tick(&mut self) -> ArrayVec<TimedEffect, { TimedEffect::LEN }> {
        let mut expired = ArrayVec::new();
        for effect in TimedEffect::ALL {
            let timer = &mut self.timers[effect as usize];
            if *timer == 0 {
                continue;
            }
            *timer -= 1;
            if *timer == 0 {
                expired.push(effect);
            }
        }

        for effect in &expired {
            match effect {
                TimedEffect::Multiplier => self.multiplier = 1,
                TimedEffect::Golden if self.multiplier > 3 => self.multiplier = 1,
                _ => {}
            }
        }
        expired
    }
}
