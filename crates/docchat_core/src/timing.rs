use std::time::Duration;

/// Number of labeled ingestion phases; `active_step` never exceeds it.
pub const STEP_COUNT: u8 = 3;

/// Periods and increments of the simulated ingestion indicator.
///
/// The values are cosmetic: they only shape how progress is displayed while the
/// real `ingest` call is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTiming {
    pub step_period: Duration,
    pub progress_period: Duration,
    pub progress_increment: u8,
    pub progress_ceiling: u8,
    /// Delay between a successful ingest and the hand-off to the chat view.
    pub handoff_delay: Duration,
}

impl ProgressTiming {
    /// Ceiling actually applied by the progress ticker. Always below 100 so that
    /// only a real completion can finish the bar.
    pub fn effective_ceiling(&self) -> u8 {
        self.progress_ceiling.min(99)
    }
}

impl Default for ProgressTiming {
    fn default() -> Self {
        Self {
            step_period: Duration::from_millis(1500),
            progress_period: Duration::from_millis(100),
            progress_increment: 2,
            progress_ceiling: 95,
            handoff_delay: Duration::from_millis(1000),
        }
    }
}
