use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ConfigError, UpdateError};
use crate::model::{
    CountSnapshot, Direction, GreenTiming, SchedulerStatus, SignalPlan, DEFAULT_DIRECTION,
};
use crate::parse::parse_update;

/// Message returned to callers after a successful count update.
pub const UPDATE_OK_MESSAGE: &str = "Counts updated successfully";

/// Picks the approach that gets the next green.
///
/// The approach served last is never a candidate. Among the remaining ones the
/// highest count wins, ties going to the earliest in declaration order. When
/// no candidate has any demand the idle rotation decides instead.
pub fn select_next(last_green: Option<Direction>, counts: &CountSnapshot) -> Direction {
    let mut best: Option<(Direction, u32)> = None;
    for d in Direction::ALL.into_iter().filter(|d| Some(*d) != last_green) {
        let count = counts.get(d);
        match best {
            Some((_, top)) if count <= top => {}
            _ => best = Some((d, count)),
        }
    }

    match (best, last_green) {
        (Some((d, count)), _) if count > 0 => d,
        (_, None) => DEFAULT_DIRECTION,
        (_, Some(prev)) => prev.next_in_rotation(),
    }
}

/// Single-intersection green allocator.
///
/// Not synchronized; callers sharing one across tasks must serialize access
/// to both operations behind one lock.
#[derive(Debug, Clone, Default)]
pub struct SignalScheduler {
    counts: CountSnapshot,
    last_green: Option<Direction>,
    timing: GreenTiming,
}

impl SignalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timing(timing: GreenTiming) -> Result<Self, ConfigError> {
        timing.validate()?;
        Ok(Self {
            timing,
            ..Self::default()
        })
    }

    pub fn counts(&self) -> &CountSnapshot {
        &self.counts
    }

    pub fn last_green(&self) -> Option<Direction> {
        self.last_green
    }

    pub fn timing(&self) -> GreenTiming {
        self.timing
    }

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            counts: self.counts.clone(),
            last_green: self.last_green,
            timing: self.timing,
        }
    }

    /// Overwrites the counts of the known directions present in `update`.
    ///
    /// Every present value is validated before any is applied: a rejected
    /// update leaves the snapshot exactly as it was.
    pub fn update_counts(&mut self, update: &Map<String, Value>) -> Result<(), UpdateError> {
        let parsed = parse_update(update)?;
        for (direction, count) in parsed {
            self.counts.set(direction, count);
        }
        debug!(counts = ?self.counts, "counts updated");
        Ok(())
    }

    /// [`Self::update_counts`] flattened to a success flag and a message.
    pub fn update_counts_report(&mut self, update: &Map<String, Value>) -> (bool, String) {
        match self.update_counts(update) {
            Ok(()) => (true, UPDATE_OK_MESSAGE.to_string()),
            Err(e) => (false, format!("Error: {e}")),
        }
    }

    pub fn set_count(&mut self, direction: Direction, count: u32) {
        self.counts.set(direction, count);
    }

    /// Chooses the next green approach and its duration, then remembers it.
    pub fn compute_schedule(&mut self) -> SignalPlan {
        let next = select_next(self.last_green, &self.counts);
        let secs = self.timing.duration_for(self.counts.get(next));
        debug!(
            previous = ?self.last_green,
            next = %next,
            count = self.counts.get(next),
            secs,
            "green phase selected"
        );
        self.last_green = Some(next);
        SignalPlan::single(next, secs)
    }
}
