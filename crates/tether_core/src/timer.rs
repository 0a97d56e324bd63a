//! Timer host
//!
//! A single-threaded timer queue that plays the part of the host event
//! loop's `setTimeout` facility. Time is virtual: it only moves when the
//! host advances it, either explicitly with [`Timers::advance`] or by
//! following the tokio clock with [`Timers::sleep`] and [`Timers::settle`].
//!
//! While a sleep is driving the queue, virtual time tracks the tokio clock,
//! so a timer armed from another task mid-sleep is measured from the moment
//! it was armed and fires on time rather than when the sleep ends. Only one
//! sleep should drive a queue at a time.
//!
//! Timers fire in deadline order; timers sharing a deadline fire in the
//! order they were armed. Callbacks run with no internal borrow held, so a
//! callback may arm or clear other timers (including re-arming itself).

use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::trace;

new_key_type! {
    /// Handle for an armed timer
    pub struct TimerId;
}

/// One-shot callback run when a timer fires
pub type TimerCallback = Box<dyn FnOnce()>;

struct TimerEntry {
    deadline: Duration,
    /// Arming order, breaks ties between equal deadlines
    seq: u64,
    callback: TimerCallback,
}

/// Ties the virtual clock to the tokio clock while a sleep is running
#[derive(Clone, Copy)]
struct DriveOrigin {
    started: Instant,
    /// Virtual time at `started`
    base: Duration,
    /// Virtual time the sleep ends at
    end: Duration,
}

impl DriveOrigin {
    fn elapsed_virtual(&self) -> Duration {
        self.base.saturating_add(self.started.elapsed()).min(self.end)
    }
}

#[derive(Default)]
struct TimerQueue {
    entries: SlotMap<TimerId, TimerEntry>,
    now: Duration,
    next_seq: u64,
    driving: Option<DriveOrigin>,
}

impl TimerQueue {
    /// Virtual time, following the tokio clock while a sleep drives the queue
    fn current_time(&self) -> Duration {
        match self.driving {
            Some(origin) => self.now.max(origin.elapsed_virtual()),
            None => self.now,
        }
    }

    /// Earliest timer due at or before `limit`
    fn next_due(&self, limit: Duration) -> Option<TimerId> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.deadline <= limit)
            .min_by_key(|(_, entry)| (entry.deadline, entry.seq))
            .map(|(id, _)| id)
    }

    fn next_deadline(&self) -> Option<Duration> {
        self.entries.values().map(|entry| entry.deadline).min()
    }
}

/// Shared handle to a timer queue
///
/// Cloning is cheap and every clone drives the same queue and clock.
#[derive(Clone, Default)]
pub struct Timers {
    queue: Rc<RefCell<TimerQueue>>,
    /// Wakes a running sleep when a timer is armed
    armed: Rc<Notify>,
}

impl Timers {
    /// Create an empty timer queue with its clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time, measured from queue creation
    pub fn now(&self) -> Duration {
        self.queue.borrow().current_time()
    }

    /// Number of armed timers
    pub fn pending(&self) -> usize {
        self.queue.borrow().entries.len()
    }

    /// Check if no timer is armed
    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Deadline of the earliest armed timer
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.borrow().next_deadline()
    }

    /// Check whether `id` is still armed
    pub fn is_armed(&self, id: TimerId) -> bool {
        self.queue.borrow().entries.contains_key(id)
    }

    /// Arm a one-shot timer that fires `wait` from now
    ///
    /// A zero wait is valid: the timer fires on the next advance.
    pub fn set_timeout<F>(&self, wait: Duration, callback: F) -> TimerId
    where
        F: FnOnce() + 'static,
    {
        let id = {
            let mut queue = self.queue.borrow_mut();
            let deadline = queue.current_time().saturating_add(wait);
            let seq = queue.next_seq;
            queue.next_seq += 1;
            let id = queue.entries.insert(TimerEntry {
                deadline,
                seq,
                callback: Box::new(callback),
            });
            trace!(?id, deadline_ms = deadline.as_millis() as u64, "timer armed");
            id
        };
        self.armed.notify_one();
        id
    }

    /// Disarm a timer
    ///
    /// Returns `false` if the timer already fired or was cleared.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        let removed = self.queue.borrow_mut().entries.remove(id).is_some();
        if removed {
            trace!(?id, "timer cleared");
        }
        removed
    }

    /// Move the clock forward by `by`, firing every timer that falls due
    ///
    /// Timers armed by callbacks during the advance fire too if their
    /// deadline is inside the window. A panicking callback unwinds out of
    /// this call; the queue stays consistent because the entry is removed
    /// before its callback runs.
    ///
    /// Returns the number of callbacks fired.
    pub fn advance(&self, by: Duration) -> usize {
        self.advance_to(self.now().saturating_add(by))
    }

    fn advance_to(&self, target: Duration) -> usize {
        let mut fired = 0;

        loop {
            let (id, callback) = {
                let mut queue = self.queue.borrow_mut();
                let Some(id) = queue.next_due(target) else {
                    break;
                };
                let Some(entry) = queue.entries.remove(id) else {
                    break;
                };
                queue.now = entry.deadline;
                (id, entry.callback)
            };

            trace!(?id, "timer fired");
            callback();
            fired += 1;
        }

        let mut queue = self.queue.borrow_mut();
        queue.now = queue.now.max(target);
        fired
    }

    /// Fire timers until the queue is empty, jumping the clock to each deadline
    ///
    /// A callback that re-arms itself forever keeps this running forever.
    pub fn run_until_idle(&self) -> usize {
        let mut fired = 0;
        while let Some(deadline) = self.next_deadline() {
            fired += self.advance(deadline.saturating_sub(self.now()));
        }
        fired
    }

    /// Sleep on the tokio clock for `duration`, firing timers as they fall due
    ///
    /// Timers armed by other tasks while this sleep is pending are picked up
    /// immediately. The virtual clock ends exactly `duration` later than it
    /// started.
    pub async fn sleep(&self, duration: Duration) -> usize {
        let base = self.now();
        let end = base.saturating_add(duration);
        let _drive = DriveGuard::start(
            self,
            DriveOrigin {
                started: Instant::now(),
                base,
                end,
            },
        );
        let mut fired = 0;

        loop {
            let now = self.now();
            fired += self.advance_to(now);
            if now >= end {
                break;
            }

            let step = match self.next_deadline() {
                Some(deadline) => deadline.saturating_sub(now).min(end - now),
                None => end - now,
            };
            // Either the step elapses or a newly armed timer needs a shorter one
            let _ = tokio::time::timeout(step, self.armed.notified()).await;
        }

        fired
    }

    /// Sleep on the tokio clock until no timer is armed
    pub async fn settle(&self) -> usize {
        let mut fired = 0;
        while let Some(deadline) = self.next_deadline() {
            fired += self.sleep(deadline.saturating_sub(self.now())).await;
        }
        fired
    }
}

/// Clears the drive origin when a sleep finishes, unwinds or is dropped
struct DriveGuard<'a> {
    timers: &'a Timers,
}

impl<'a> DriveGuard<'a> {
    fn start(timers: &'a Timers, origin: DriveOrigin) -> Self {
        timers.queue.borrow_mut().driving = Some(origin);
        Self { timers }
    }
}

impl Drop for DriveGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut queue) = self.timers.queue.try_borrow_mut() {
            queue.driving = None;
        }
    }
}

impl fmt::Debug for Timers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.queue.borrow();
        f.debug_struct("Timers")
            .field("now", &queue.now)
            .field("pending", &queue.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_fires_after_deadline() {
        let timers = Timers::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();

        timers.set_timeout(ms(100), move || flag.set(true));

        assert_eq!(timers.advance(ms(99)), 0);
        assert!(!fired.get());

        assert_eq!(timers.advance(ms(1)), 1);
        assert!(fired.get());
        assert!(timers.is_idle());
        assert_eq!(timers.now(), ms(100));
    }

    #[test]
    fn test_clear_timeout() {
        let timers = Timers::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();

        let id = timers.set_timeout(ms(10), move || flag.set(true));
        assert!(timers.is_armed(id));
        assert!(timers.clear_timeout(id));
        assert!(!timers.clear_timeout(id));

        timers.advance(ms(50));
        assert!(!fired.get());
    }

    #[test]
    fn test_deadline_then_arming_order() {
        let timers = Timers::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for (label, wait) in [("c", 30), ("a", 10), ("b1", 20), ("b2", 20)] {
            let order = order.clone();
            timers.set_timeout(ms(wait), move || order.borrow_mut().push(label));
        }

        assert_eq!(timers.advance(ms(100)), 4);
        assert_eq!(*order.borrow(), vec!["a", "b1", "b2", "c"]);
    }

    #[test]
    fn test_callback_can_arm_timer_inside_window() {
        let timers = Timers::new();
        let hits = Rc::new(Cell::new(0u32));

        let inner_timers = timers.clone();
        let inner_hits = hits.clone();
        timers.set_timeout(ms(10), move || {
            inner_hits.set(inner_hits.get() + 1);
            let hits = inner_hits.clone();
            inner_timers.set_timeout(ms(10), move || hits.set(hits.get() + 1));
        });

        assert_eq!(timers.advance(ms(25)), 2);
        assert_eq!(hits.get(), 2);
        assert_eq!(timers.now(), ms(25));
    }

    #[test]
    fn test_zero_wait_fires_on_next_advance() {
        let timers = Timers::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();

        timers.set_timeout(Duration::ZERO, move || flag.set(true));
        assert!(!fired.get());

        timers.advance(Duration::ZERO);
        assert!(fired.get());
    }

    #[test]
    fn test_run_until_idle() {
        let timers = Timers::new();
        timers.set_timeout(ms(500), || {});
        timers.set_timeout(ms(20), || {});

        assert_eq!(timers.run_until_idle(), 2);
        assert_eq!(timers.now(), ms(500));
    }

    #[test]
    fn test_panicking_callback_leaves_queue_consistent() {
        let timers = Timers::new();
        timers.set_timeout(ms(10), || panic!("boom"));
        timers.set_timeout(ms(20), || {});

        let driver = timers.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            driver.advance(ms(50));
        }));

        assert!(result.is_err());
        assert_eq!(timers.pending(), 1);
        assert_eq!(timers.now(), ms(10));
        assert_eq!(timers.advance(ms(40)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_follows_tokio_clock() {
        let timers = Timers::new();
        let fired = Rc::new(Cell::new(0u32));
        let counter = fired.clone();
        timers.set_timeout(ms(100), move || counter.set(counter.get() + 1));

        let start = tokio::time::Instant::now();
        assert_eq!(timers.sleep(ms(150)).await, 1);

        assert_eq!(fired.get(), 1);
        assert_eq!(timers.now(), ms(150));
        assert!(start.elapsed() >= ms(150));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_drains_queue() {
        let timers = Timers::new();
        timers.set_timeout(ms(30), || {});
        timers.set_timeout(ms(700), || {});

        assert_eq!(timers.settle().await, 2);
        assert!(timers.is_idle());
        assert_eq!(timers.now(), ms(700));
    }
}
