//! Fixed-timestep driver
//!
//! Converts wall-clock frame time into a whole number of simulation ticks.
//! The driver owns no simulation state; the caller runs the ticks it reports.

use std::time::Duration;

use crate::consts::TICK_MS;

/// Default cap on a single frame's delta, so a stall doesn't replay seconds of ticks
pub const DEFAULT_MAX_FRAME_DELTA: Duration = Duration::from_millis(250);
/// Default maximum ticks per frame to prevent spiral of death
pub const DEFAULT_MAX_SUBSTEPS: u32 = 8;

/// Accumulator-based periodic driver
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: Duration,
    max_frame_delta: Duration,
    max_substeps: u32,
    accumulator: Duration,
    running: bool,
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(TICK_MS),
            DEFAULT_MAX_FRAME_DELTA,
            DEFAULT_MAX_SUBSTEPS,
        )
    }
}

impl FixedStep {
    pub fn new(step: Duration, max_frame_delta: Duration, max_substeps: u32) -> Self {
        Self {
            step: step.max(Duration::from_millis(1)),
            max_frame_delta,
            max_substeps: max_substeps.max(1),
            accumulator: Duration::ZERO,
            running: true,
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop producing ticks; pending time is discarded
    pub fn stop(&mut self) {
        self.running = false;
        self.accumulator = Duration::ZERO;
    }

    /// Cancel whatever was pending and start from a clean accumulator
    pub fn restart(&mut self) {
        self.accumulator = Duration::ZERO;
        self.running = true;
    }

    /// Feed elapsed frame time, returning how many ticks are due now
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if !self.running {
            return 0;
        }
        self.accumulator += elapsed.min(self.max_frame_delta);

        let mut due = 0;
        while self.accumulator >= self.step && due < self.max_substeps {
            self.accumulator -= self.step;
            due += 1;
        }
        due
    }

    /// Time left until the next tick is due
    pub fn until_next(&self) -> Duration {
        self.step.saturating_sub(self.accumulator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_accumulates_partial_frames() {
        let mut driver = FixedStep::default();
        assert_eq!(driver.advance(ms(10)), 0);
        assert_eq!(driver.advance(ms(10)), 1);
        assert_eq!(driver.until_next(), ms(12));
        assert_eq!(driver.advance(ms(32)), 2);
    }

    #[test]
    fn test_substep_cap() {
        let mut driver = FixedStep::new(ms(16), ms(1000), 3);
        assert_eq!(driver.advance(ms(160)), 3);
        // Backlog is still pending for following frames
        assert_eq!(driver.advance(ms(0)), 3);
    }

    #[test]
    fn test_frame_delta_cap() {
        let mut driver = FixedStep::new(ms(16), ms(32), 100);
        assert_eq!(driver.advance(ms(5000)), 2);
    }

    #[test]
    fn test_stop_and_restart() {
        let mut driver = FixedStep::default();
        driver.advance(ms(15));
        driver.stop();
        assert!(!driver.is_running());
        assert_eq!(driver.advance(ms(100)), 0);

        driver.restart();
        assert!(driver.is_running());
        assert_eq!(driver.advance(ms(15)), 0);
        assert_eq!(driver.advance(ms(1)), 1);
    }
}
