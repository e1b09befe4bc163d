//! Virtual-clock timer wheel
//!
//! Replaces free-floating interval/timeout callbacks with owned timers that
//! fire plain task values. The session pops due tasks one at a time, so a
//! task that cancels timers (stop, mode switch) takes effect before the next
//! pop.

use serde::{Deserialize, Serialize};

/// Handle returned by the schedule calls, used to cancel a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Timer<T> {
    id: TimerId,
    due_ms: f64,
    /// Repeat period for intervals, `None` for one-shots
    period_ms: Option<f64>,
    task: T,
}

/// Owns every pending timer and the current virtual time
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now_ms: f64,
    timers: Vec<Timer<T>>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            timers: Vec::new(),
            next_id: 1,
        }
    }

    /// Current virtual time in milliseconds
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn push(&mut self, due_ms: f64, period_ms: Option<f64>, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due_ms,
            period_ms,
            task,
        });
        id
    }

    /// Fire `task` every `period_ms`, first after one full period
    pub fn schedule_interval(&mut self, period_ms: f64, task: T) -> TimerId {
        let period = period_ms.max(1.0);
        self.push(self.now_ms + period, Some(period), task)
    }

    /// Fire `task` once after `delay_ms`
    pub fn schedule_once(&mut self, delay_ms: f64, task: T) -> TimerId {
        self.push(self.now_ms + delay_ms.max(0.0), None, task)
    }

    /// Cancel one timer; returns whether it was still pending
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Drop every pending timer
    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Move the clock forward to `target_ms` without firing anything
    pub fn settle(&mut self, target_ms: f64) {
        if target_ms > self.now_ms {
            self.now_ms = target_ms;
        }
    }
}

impl<T: Clone> Scheduler<T> {
    /// Pop the earliest timer due at or before `target_ms`
    ///
    /// Ties fire in scheduling order. The clock advances to the timer's due
    /// time, and intervals are re-armed one period later.
    pub fn pop_due(&mut self, target_ms: f64) -> Option<T> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= target_ms)
            .min_by(|(_, a), (_, b)| {
                a.due_ms
                    .partial_cmp(&b.due_ms)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.id.cmp(&b.id))
            })
            .map(|(i, _)| i)?;

        let due = self.timers[index].due_ms;
        if due > self.now_ms {
            self.now_ms = due;
        }

        match self.timers[index].period_ms {
            Some(period) => {
                let timer = &mut self.timers[index];
                timer.due_ms += period;
                Some(timer.task.clone())
            }
            None => Some(self.timers.remove(index).task),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(s: &mut Scheduler<&'static str>, target: f64) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some(task) = s.pop_due(target) {
            fired.push(task);
        }
        s.settle(target);
        fired
    }

    #[test]
    fn test_once_fires_once() {
        let mut s = Scheduler::new();
        s.schedule_once(100.0, "a");
        assert!(drain(&mut s, 99.0).is_empty());
        assert_eq!(drain(&mut s, 100.0), vec!["a"]);
        assert!(drain(&mut s, 1000.0).is_empty());
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn test_interval_repeats_in_order() {
        let mut s = Scheduler::new();
        s.schedule_interval(10.0, "tick");
        s.schedule_once(25.0, "once");
        assert_eq!(drain(&mut s, 30.0), vec!["tick", "tick", "once", "tick"]);
        assert_eq!(s.now_ms(), 30.0);
    }

    #[test]
    fn test_cancel() {
        let mut s = Scheduler::new();
        let a = s.schedule_interval(10.0, "a");
        s.schedule_once(5.0, "b");
        assert!(s.cancel(a));
        assert!(!s.cancel(a));
        assert_eq!(drain(&mut s, 100.0), vec!["b"]);
    }

    #[test]
    fn test_cancel_all_mid_drain() {
        let mut s = Scheduler::new();
        s.schedule_once(1.0, "stop");
        s.schedule_once(2.0, "stale");
        assert_eq!(s.pop_due(10.0), Some("stop"));
        s.cancel_all();
        assert_eq!(s.pop_due(10.0), None);
    }

    #[test]
    fn test_schedule_relative_to_now() {
        let mut s = Scheduler::new();
        s.settle(1000.0);
        s.schedule_once(50.0, "late");
        assert!(drain(&mut s, 1049.0).is_empty());
        assert_eq!(drain(&mut s, 1050.0), vec!["late"]);
    }
}
