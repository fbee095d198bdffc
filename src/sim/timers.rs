//! Cooperative timer queue on a virtual millisecond clock
//!
//! Stands in for the browser's interval/timeout callbacks. The host advances
//! the clock; due timers pop in (due time, arm order) order. Repeating timers
//! re-arm themselves at their nominal rate whether or not the payload ran.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Which activity a timer drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Player movement
    Motion,
    /// Obstacle fall + collision resolution
    Fall,
    /// Score/time accrual
    Heartbeat,
    /// Next obstacle spawn (self-rescheduling one-shot)
    Spawn,
    /// End of the shield window
    ShieldExpiry,
    /// Release of a swipe-initiated hold
    SwipeRelease,
}

/// A timer that came due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Firing {
    pub kind: TimerKind,
    /// Scheduled time (ms)
    pub at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    due: u64,
    seq: u64,
    kind: TimerKind,
    period: Option<u64>,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the earliest first
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Timer queue. Once halted it accepts no further timers.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: u64,
    seq: u64,
    queue: BinaryHeap<Entry>,
    halted: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time (ms)
    pub fn now(&self) -> u64 {
        self.now
    }

    fn push(&mut self, kind: TimerKind, delay: u64, period: Option<u64>) {
        if self.halted {
            return;
        }
        self.seq += 1;
        self.queue.push(Entry {
            due: self.now + delay,
            seq: self.seq,
            kind,
            period,
        });
    }

    /// Fire `kind` every `period_ms`, first firing one period from now
    pub fn every(&mut self, kind: TimerKind, period_ms: u64) {
        let period = period_ms.max(1);
        self.push(kind, period, Some(period));
    }

    /// Fire `kind` once after `delay_ms`
    pub fn after(&mut self, kind: TimerKind, delay_ms: u64) {
        self.push(kind, delay_ms, None);
    }

    /// Drop every pending timer of `kind`
    pub fn cancel(&mut self, kind: TimerKind) {
        self.queue.retain(|e| e.kind != kind);
    }

    /// Whether a timer of `kind` is pending
    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.queue.iter().any(|e| e.kind == kind)
    }

    /// Cancel everything and refuse new timers
    pub fn halt(&mut self) {
        if !self.halted {
            log::info!("Scheduler halted at {} ms ({} timers dropped)", self.now, self.queue.len());
        }
        self.halted = true;
        self.queue.clear();
    }

    /// Pop the next timer due at or before `until`, moving the clock to its
    /// due time. Repeating timers are re-armed before returning.
    pub fn pop_due(&mut self, until: u64) -> Option<Firing> {
        if self.queue.peek().is_none_or(|e| e.due > until) {
            return None;
        }
        let entry = self.queue.pop()?;
        self.now = self.now.max(entry.due);

        if let Some(period) = entry.period {
            self.seq += 1;
            self.queue.push(Entry {
                due: entry.due + period,
                seq: self.seq,
                kind: entry.kind,
                period: Some(period),
            });
        }

        Some(Firing {
            kind: entry.kind,
            at: entry.due,
        })
    }

    /// Move the clock forward to `until` (after draining due timers)
    pub fn settle(&mut self, until: u64) {
        self.now = self.now.max(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(s: &mut Scheduler, until: u64) -> Vec<(TimerKind, u64)> {
        let mut fired = Vec::new();
        while let Some(f) = s.pop_due(until) {
            fired.push((f.kind, f.at));
        }
        s.settle(until);
        fired
    }

    #[test]
    fn test_repeating_timer_keeps_rate() {
        let mut s = Scheduler::new();
        s.every(TimerKind::Heartbeat, 1000);
        let fired = drain(&mut s, 3500);
        assert_eq!(
            fired,
            vec![
                (TimerKind::Heartbeat, 1000),
                (TimerKind::Heartbeat, 2000),
                (TimerKind::Heartbeat, 3000),
            ]
        );
        assert_eq!(s.now(), 3500);
        assert_eq!(drain(&mut s, 4000), vec![(TimerKind::Heartbeat, 4000)]);
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut s = Scheduler::new();
        s.after(TimerKind::ShieldExpiry, 5000);
        assert!(drain(&mut s, 4999).is_empty());
        assert_eq!(drain(&mut s, 5000), vec![(TimerKind::ShieldExpiry, 5000)]);
        assert!(!s.is_pending(TimerKind::ShieldExpiry));
    }

    #[test]
    fn test_ties_fire_in_arm_order() {
        let mut s = Scheduler::new();
        s.every(TimerKind::Fall, 20);
        s.every(TimerKind::Motion, 20);
        let fired = drain(&mut s, 20);
        assert_eq!(fired, vec![(TimerKind::Fall, 20), (TimerKind::Motion, 20)]);
    }

    #[test]
    fn test_clock_follows_firings() {
        let mut s = Scheduler::new();
        s.every(TimerKind::Fall, 20);
        let f = s.pop_due(100).unwrap();
        assert_eq!(f.at, 20);
        assert_eq!(s.now(), 20);
        // Re-arming from inside a firing is relative to the firing time
        s.after(TimerKind::Spawn, 15);
        let f = s.pop_due(100).unwrap();
        assert_eq!((f.kind, f.at), (TimerKind::Spawn, 35));
    }

    #[test]
    fn test_halt_cancels_everything() {
        let mut s = Scheduler::new();
        s.every(TimerKind::Fall, 20);
        s.after(TimerKind::Spawn, 10);
        s.halt();
        assert!(drain(&mut s, 10_000).is_empty());
        s.after(TimerKind::Spawn, 10);
        assert!(!s.is_pending(TimerKind::Spawn));
    }

    #[test]
    fn test_cancel_single_kind() {
        let mut s = Scheduler::new();
        s.after(TimerKind::SwipeRelease, 200);
        s.after(TimerKind::Spawn, 300);
        s.cancel(TimerKind::SwipeRelease);
        assert_eq!(drain(&mut s, 1000), vec![(TimerKind::Spawn, 300)]);
    }
}
