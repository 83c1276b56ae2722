//! Query timing instrumentation
//!
//! A [`TimerGroup`] accumulates wall-clock time per [`QueryTiming`]. Timers
//! are RAII guards: a timer that is not stopped explicitly stops when it goes
//! out of scope, so early returns are still accounted for.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Named phases of answering a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryTiming {
    /// The whole evaluate-and-render call
    TotalEvalTime,
    /// Acquiring the evaluation context
    TotalQueryPreparationTime,
    /// Evaluating the node itself
    InnerEvalTime,
}

impl QueryTiming {
    /// Get all timings in reporting order
    pub fn all() -> &'static [QueryTiming] {
        &[
            Self::TotalEvalTime,
            Self::TotalQueryPreparationTime,
            Self::InnerEvalTime,
        ]
    }
}

impl std::fmt::Display for QueryTiming {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TotalEvalTime => write!(f, "Total eval time"),
            Self::TotalQueryPreparationTime => write!(f, "Total query preparation time"),
            Self::InnerEvalTime => write!(f, "Inner eval time"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct TimerStats {
    total: Duration,
    count: usize,
}

/// Accumulated timings for one query
#[derive(Debug, Default)]
pub struct TimerGroup {
    timers: Mutex<HashMap<QueryTiming, TimerStats>>,
}

impl TimerGroup {
    /// Create a group with nothing recorded
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing a phase
    pub fn start(&self, timing: QueryTiming) -> RunningTimer<'_> {
        RunningTimer {
            group: self,
            timing,
            started: Instant::now(),
            stopped: false,
        }
    }

    /// Total time recorded for a phase
    pub fn elapsed(&self, timing: QueryTiming) -> Duration {
        self.lock()
            .get(&timing)
            .map(|stats| stats.total)
            .unwrap_or_default()
    }

    /// Number of completed timer runs for a phase
    pub fn count(&self, timing: QueryTiming) -> usize {
        self.lock().get(&timing).map(|stats| stats.count).unwrap_or(0)
    }

    fn record(&self, timing: QueryTiming, elapsed: Duration) {
        let mut timers = self.lock();
        let stats = timers.entry(timing).or_default();
        stats.total += elapsed;
        stats.count += 1;
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryTiming, TimerStats>> {
        // A panic while holding the lock cannot leave a half-written entry
        self.timers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Display for TimerGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let timers = self.lock();
        let mut first = true;
        for timing in QueryTiming::all() {
            if let Some(stats) = timers.get(timing) {
                if !first {
                    writeln!(f)?;
                }
                first = false;
                write!(f, "{}: {:?}", timing, stats.total)?;
            }
        }
        Ok(())
    }
}

/// A started timer; records into its group when stopped or dropped
#[derive(Debug)]
pub struct RunningTimer<'a> {
    group: &'a TimerGroup,
    timing: QueryTiming,
    started: Instant,
    stopped: bool,
}

impl RunningTimer<'_> {
    /// Stop the timer and return the time it ran
    pub fn stop(mut self) -> Duration {
        self.finish()
    }

    fn finish(&mut self) -> Duration {
        let elapsed = self.started.elapsed();
        if !self.stopped {
            self.stopped = true;
            self.group.record(self.timing, elapsed);
        }
        elapsed
    }
}

impl Drop for RunningTimer<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}
