//! Overflow detection
//!
//! Hysteresis over "is any settled item past the fill line". Overflow must
//! hold on every tick of the grace window; a single clear tick resets it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Published danger state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DangerState {
    /// Tick at which the current warning window opened (None = safe)
    pub window_start_tick: Option<u64>,
}

impl DangerState {
    #[inline]
    pub fn is_warning(&self) -> bool {
        self.window_start_tick.is_some()
    }
}

/// Result of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DangerSignal {
    Safe,
    /// Warning window just opened
    Entered,
    /// Still inside an open window
    Warning,
    /// Overflow cleared; window closed
    Cleared,
    /// Grace elapsed; terminal until restart
    GameOver,
}

#[derive(Debug, Clone)]
pub struct DangerMonitor {
    state: DangerState,
    grace_ticks: u64,
    tripped: bool,
}

impl DangerMonitor {
    pub fn new(grace_ticks: u64) -> Self {
        Self {
            state: DangerState::default(),
            grace_ticks,
            tripped: false,
        }
    }

    pub fn state(&self) -> DangerState {
        self.state
    }

    /// Advance the state machine for `tick`
    pub fn evaluate(&mut self, overflowing: bool, tick: u64) -> DangerSignal {
        if self.tripped {
            return DangerSignal::GameOver;
        }

        if !overflowing {
            return if self.state.window_start_tick.take().is_some() {
                DangerSignal::Cleared
            } else {
                DangerSignal::Safe
            };
        }

        match self.state.window_start_tick {
            None => {
                self.state.window_start_tick = Some(tick);
                if self.grace_ticks == 0 {
                    self.tripped = true;
                    DangerSignal::GameOver
                } else {
                    DangerSignal::Entered
                }
            }
            Some(start) if tick.saturating_sub(start) >= self.grace_ticks => {
                self.tripped = true;
                DangerSignal::GameOver
            }
            Some(_) => DangerSignal::Warning,
        }
    }
}

/// Overflow predicate: some item is settled on the launcher side of the fill line
pub fn is_overflowing<I>(items: I, fill_line_y: f32, settle_speed: f32) -> bool
where
    I: IntoIterator<Item = (Vec2, f32)>,
{
    items
        .into_iter()
        .any(|(position, speed)| position.y > fill_line_y && speed < settle_speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const GRACE: u64 = 120;

    impl DangerMonitor {
        fn is_tripped(&self) -> bool {
            self.tripped
        }
    }

    #[test]
    fn test_interrupted_window_never_trips() {
        let mut m = DangerMonitor::new(GRACE);
        let mut tick = 1;
        for _round in 0..5 {
            for _ in 0..GRACE - 1 {
                assert_ne!(m.evaluate(true, tick), DangerSignal::GameOver);
                tick += 1;
            }
            assert_eq!(m.evaluate(false, tick), DangerSignal::Cleared);
            assert!(!m.state().is_warning());
            tick += 1;
        }
        assert!(!m.is_tripped());
    }

    #[test]
    fn test_sustained_overflow_trips_once() {
        let mut m = DangerMonitor::new(GRACE);
        assert_eq!(m.evaluate(true, 10), DangerSignal::Entered);
        assert_eq!(m.state().window_start_tick, Some(10));

        let mut game_overs = 0;
        let mut first_trip = None;
        for tick in 11..10 + 3 * GRACE {
            if m.evaluate(true, tick) == DangerSignal::GameOver {
                game_overs += 1;
                first_trip.get_or_insert(tick);
            }
        }
        assert_eq!(first_trip, Some(10 + GRACE));
        assert!(m.is_tripped());
        // Every later evaluation reports the terminal state; callers stop at the first
        assert!(game_overs >= 1);
    }

    #[test]
    fn test_tripped_is_terminal() {
        let mut m = DangerMonitor::new(2);
        m.evaluate(true, 1);
        m.evaluate(true, 2);
        assert_eq!(m.evaluate(true, 3), DangerSignal::GameOver);
        assert_eq!(m.evaluate(false, 4), DangerSignal::GameOver);
    }

    #[test]
    fn test_predicate_requires_settled_and_past_line() {
        let line = 600.0;
        let eps = 0.2;
        assert!(!is_overflowing([(Vec2::new(0.0, 650.0), 5.0)], line, eps));
        assert!(!is_overflowing([(Vec2::new(0.0, 550.0), 0.0)], line, eps));
        assert!(is_overflowing(
            [(Vec2::new(0.0, 550.0), 0.0), (Vec2::new(0.0, 650.0), 0.1)],
            line,
            eps
        ));
    }

    proptest! {
        #[test]
        fn prop_trips_only_after_unbroken_window(pattern in prop::collection::vec(any::<bool>(), 1..400)) {
            let grace = 20;
            let mut m = DangerMonitor::new(grace);
            let mut run: u64 = 0;
            for (i, &over) in pattern.iter().enumerate() {
                let tick = i as u64 + 1;
                let signal = m.evaluate(over, tick);
                run = if over { run + 1 } else { 0 };
                if signal == DangerSignal::GameOver {
                    prop_assert!(run > grace);
                    break;
                }
                prop_assert!(run <= grace);
            }
        }
    }
}
