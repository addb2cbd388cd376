//! Per-tick results and cumulative counters.
//!
//! Reports carry only what happened during one pump callback. Renderers
//! observe progress through their own `update` callbacks; reports exist for
//! hosts and tests that need to know whether work was done.

use serde::{Deserialize, Serialize};

/// What a single `tick` call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickOutcome {
    /// The set was stopped; the callback was stale and nothing was rescheduled.
    Idle,
    /// Throttled: too soon after the last processed tick.
    Skipped,
    /// Clips were evaluated for this logical frame.
    Processed,
}

/// Outcome of one `tick`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub outcome: TickOutcome,
    /// Number of `update` calls made.
    #[serde(default)]
    pub dispatched: usize,
    /// Ids of finite clips whose completion snap was delivered this tick.
    #[serde(default)]
    pub completed: Vec<String>,
}

impl TickReport {
    pub(crate) fn idle() -> Self {
        Self::with_outcome(TickOutcome::Idle)
    }

    pub(crate) fn skipped() -> Self {
        Self::with_outcome(TickOutcome::Skipped)
    }

    pub(crate) fn processed() -> Self {
        Self::with_outcome(TickOutcome::Processed)
    }

    fn with_outcome(outcome: TickOutcome) -> Self {
        Self {
            outcome,
            dispatched: 0,
            completed: Vec::new(),
        }
    }

    #[inline]
    pub fn is_processed(&self) -> bool {
        self.outcome == TickOutcome::Processed
    }
}

/// Counters accumulated over the lifetime of a set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStats {
    /// Pump callbacks received while running.
    pub pumped: u64,
    /// Callbacks that evaluated clips.
    pub processed: u64,
    /// Callbacks dropped by throttling.
    pub skipped: u64,
    /// Callbacks delivered after the set stopped.
    pub stale: u64,
    /// Completion snaps delivered.
    pub completions: u64,
    /// Completed `start` calls.
    pub runs: u64,
}

impl FrameStats {
    pub(crate) fn record(&mut self, report: &TickReport) {
        match report.outcome {
            TickOutcome::Idle => self.stale += 1,
            TickOutcome::Skipped => {
                self.pumped += 1;
                self.skipped += 1;
            }
            TickOutcome::Processed => {
                self.pumped += 1;
                self.processed += 1;
                self.completions += report.completed.len() as u64;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_count_by_outcome() {
        let mut stats = FrameStats::default();
        stats.record(&TickReport::skipped());
        stats.record(&TickReport::idle());
        let mut done = TickReport::processed();
        done.completed.push("a".into());
        stats.record(&done);
        assert_eq!(stats.pumped, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.stale, 1);
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.completions, 1);
    }

    #[test]
    fn outcome_serializes_snake_case() {
        let json = serde_json::to_string(&TickReport::processed()).unwrap();
        assert!(json.contains("\"processed\""));
    }
}
