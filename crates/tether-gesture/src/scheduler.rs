// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Delayed callbacks for the long-press timer.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::time::Duration;

/// Handle to a scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

/// Single-threaded timer source.
///
/// Callbacks run on the same event loop as touch events, never re-entrantly
/// from `schedule` or `cancel`. Cancelling a timer that already fired or was
/// never armed is a no-op.
pub trait Scheduler {
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId;
    fn cancel(&self, id: TimerId);
}

/// Virtual-time scheduler driven by [`ManualScheduler::advance`].
///
/// Used by hosts without an event loop (the replay tool) and by tests.
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    pending: RefCell<BTreeMap<(Duration, TimerId), Box<dyn FnOnce()>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Move virtual time forward, running every callback that comes due in
    /// deadline order. Returns how many ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now.get() + by;
        let mut fired = 0;
        loop {
            let next = {
                let mut pending = self.pending.borrow_mut();
                match pending.keys().next().copied() {
                    Some(key) if key.0 <= target => pending.remove(&key).map(|cb| (key.0, cb)),
                    _ => None,
                }
            };
            let Some((due, callback)) = next else { break };
            self.now.set(due);
            callback();
            fired += 1;
        }
        self.now.set(target);
        fired
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.pending
            .borrow_mut()
            .insert((self.now.get() + delay, id), callback);
        id
    }

    fn cancel(&self, id: TimerId) {
        self.pending.borrow_mut().retain(|(_, pending), _| *pending != id);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn fires_in_deadline_order() {
        let scheduler = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (name, ms) in [("late", 300), ("early", 100)] {
            let log = Rc::clone(&log);
            scheduler.schedule(Duration::from_millis(ms), Box::new(move || log.borrow_mut().push(name)));
        }

        assert_eq!(scheduler.advance(Duration::from_millis(50)), 0);
        assert_eq!(scheduler.advance(Duration::from_millis(300)), 2);
        assert_eq!(*log.borrow(), vec!["early", "late"]);
        assert_eq!(scheduler.now(), Duration::from_millis(350));
    }

    #[test]
    fn cancel_is_idempotent() {
        let scheduler = ManualScheduler::new();
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        let id = scheduler.schedule(Duration::from_millis(10), Box::new(move || flag.set(true)));

        scheduler.cancel(id);
        scheduler.cancel(id);
        scheduler.advance(Duration::from_millis(20));
        assert!(!fired.get());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn callback_may_schedule_more() {
        let scheduler = Rc::new(ManualScheduler::new());
        let count = Rc::new(Cell::new(0));
        let (s, c) = (Rc::clone(&scheduler), Rc::clone(&count));
        scheduler.schedule(
            Duration::from_millis(10),
            Box::new(move || {
                c.set(c.get() + 1);
                let c2 = Rc::clone(&c);
                s.schedule(Duration::from_millis(10), Box::new(move || c2.set(c2.get() + 1)));
            }),
        );

        scheduler.advance(Duration::from_millis(25));
        assert_eq!(count.get(), 2);
    }
}
