//! Timed progress steps.

use std::time::Duration;

/// One scheduled progress update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickStep {
    /// Time since the sequence started.
    pub offset: Duration,
    pub progress: u8,
}

/// The finite sequence "after `interval × k`, show `step × k`" for every `k`
/// until progress reaches 100.
#[derive(Clone, Debug)]
pub struct ProgressSchedule {
    interval: Duration,
    step: u8,
    k: u32,
}

impl ProgressSchedule {
    /// `step` must be non-zero and divide 100.
    pub fn new(interval: Duration, step: u8) -> Self {
        Self { interval, step, k: 0 }
    }

    pub fn tick_count(&self) -> u32 {
        100 / u32::from(self.step.max(1))
    }
}

impl Iterator for ProgressSchedule {
    type Item = TickStep;

    fn next(&mut self) -> Option<TickStep> {
        if self.k >= self.tick_count() {
            return None;
        }
        self.k += 1;
        Some(TickStep {
            offset: self.interval * self.k,
            progress: (u32::from(self.step) * self.k) as u8,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule_has_ten_ticks() {
        let steps: Vec<_> = ProgressSchedule::new(Duration::from_millis(100), 10).collect();
        assert_eq!(steps.len(), 10);
        assert_eq!(
            steps.iter().map(|s| s.progress).collect::<Vec<_>>(),
            vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]
        );
        assert_eq!(steps[0].offset, Duration::from_millis(100));
        assert_eq!(steps[9].offset, Duration::from_secs(1));
    }

    #[test]
    fn test_offsets_strictly_increase() {
        let steps: Vec<_> = ProgressSchedule::new(Duration::from_millis(100), 25).collect();
        assert_eq!(steps.len(), 4);
        assert!(steps.windows(2).all(|w| w[0].offset < w[1].offset));
        assert_eq!(steps.last().map(|s| s.progress), Some(100));
    }
}
