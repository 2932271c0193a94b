use std::cell::RefCell;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use crate::deferred::Deferred;

/// Upper bound on tasks drained by one `run_until_idle`, in case tasks keep rescheduling.
const MAX_TASKS_PER_DRAIN: usize = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Timer {
    due: Duration,
    id: u64,
    task: Box<dyn FnOnce()>,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.id == other.id
    }
}
impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due.cmp(&other.due).then(self.id.cmp(&other.id))
    }
}

#[derive(Default)]
struct LoopInner {
    now: Duration,
    next_id: u64,
    timers: BinaryHeap<Reverse<Timer>>,
    cancelled: HashSet<u64>,
}

/// Single-threaded cooperative task queue on a virtual clock.
///
/// Tasks never run re-entrantly: each one runs to completion on its own turn,
/// in due-time order (ties in scheduling order). Time only moves when the
/// owner calls [`EventLoop::advance`] or [`EventLoop::run_until_idle`].
#[derive(Clone, Default)]
pub struct EventLoop {
    inner: Rc<RefCell<LoopInner>>,
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since the loop was created.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of scheduled, not yet cancelled tasks.
    pub fn pending(&self) -> usize {
        let inner = self.inner.borrow();
        inner
            .timers
            .iter()
            .filter(|Reverse(t)| !inner.cancelled.contains(&t.id))
            .count()
    }

    /// Runs `task` on the next turn.
    pub fn queue(&self, task: impl FnOnce() + 'static) -> TimerId {
        self.set_timeout(Duration::ZERO, task)
    }

    pub fn set_timeout(&self, delay: Duration, task: impl FnOnce() + 'static) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let due = inner.now + delay;
        inner.timers.push(Reverse(Timer {
            due,
            id,
            task: Box::new(task),
        }));
        TimerId(id)
    }

    /// Returns false if the task already ran or was cancelled.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let scheduled = inner.timers.iter().any(|Reverse(t)| t.id == id.0);
        scheduled && inner.cancelled.insert(id.0)
    }

    /// A deferred that settles with `outcome` after `after`.
    pub fn delay<T: 'static, E: 'static>(&self, outcome: Result<T, E>, after: Duration) -> Deferred<T, E> {
        let (deferred, completer) = Deferred::pending();
        self.set_timeout(after, move || completer.settle(outcome));
        deferred
    }

    /// Moves the clock forward by `by`, running every task that falls due.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut ran = 0;
        while let Some(task) = self.pop_due(Some(target)) {
            task();
            ran += 1;
        }
        self.inner.borrow_mut().now = target;
        ran
    }

    /// Runs tasks until the queue is empty, jumping the clock to each due time.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.pop_due(None) {
            task();
            ran += 1;
            if ran >= MAX_TASKS_PER_DRAIN {
                log::warn!("event loop: stopped after {ran} tasks; tasks keep rescheduling");
                break;
            }
        }
        ran
    }

    fn pop_due(&self, limit: Option<Duration>) -> Option<Box<dyn FnOnce()>> {
        let mut inner = self.inner.borrow_mut();
        loop {
            let due = inner.timers.peek().map(|Reverse(t)| t.due)?;
            if limit.is_some_and(|limit| due > limit) {
                return None;
            }
            let Reverse(timer) = inner.timers.pop()?;
            if inner.cancelled.remove(&timer.id) {
                continue;
            }
            inner.now = inner.now.max(timer.due);
            return Some(timer.task);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_run_in_due_order() {
        let ev = EventLoop::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (delay, tag) in [(30, "c"), (10, "a"), (10, "b")] {
            let log = log.clone();
            ev.set_timeout(Duration::from_millis(delay), move || log.borrow_mut().push(tag));
        }
        assert_eq!(ev.advance(Duration::from_millis(10)), 2);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert_eq!(ev.now(), Duration::from_millis(10));

        assert_eq!(ev.run_until_idle(), 1);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(ev.now(), Duration::from_millis(30));
    }

    #[test]
    fn cleared_timer_never_runs() {
        let ev = EventLoop::new();
        let hit = Rc::new(RefCell::new(false));
        let h = hit.clone();
        let id = ev.set_timeout(Duration::from_millis(5), move || *h.borrow_mut() = true);
        assert!(ev.clear_timeout(id));
        assert_eq!(ev.pending(), 0);
        ev.run_until_idle();
        assert!(!*hit.borrow());
        assert!(!ev.clear_timeout(id));
    }

    #[test]
    fn tasks_may_schedule_more_tasks() {
        let ev = EventLoop::new();
        let count = Rc::new(RefCell::new(0));
        let (ev2, c) = (ev.clone(), count.clone());
        ev.queue(move || {
            *c.borrow_mut() += 1;
            let c = c.clone();
            ev2.set_timeout(Duration::from_millis(1), move || *c.borrow_mut() += 1);
        });
        assert_eq!(ev.run_until_idle(), 2);
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn pending_ignores_cancelled_tasks() {
        let ev = EventLoop::new();
        let a = ev.queue(|| {});
        ev.set_timeout(Duration::from_millis(5), || {});
        assert_eq!(ev.pending(), 2);
        assert!(ev.clear_timeout(a));
        assert_eq!(ev.pending(), 1);
        assert_eq!(ev.run_until_idle(), 1);
        assert_eq!(ev.now(), Duration::from_millis(5));
    }
}
