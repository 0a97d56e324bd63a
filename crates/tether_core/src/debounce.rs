//! Trailing-edge debounce
//!
//! [`debounce`] wraps a function so that a burst of calls collapses into a
//! single call, made `wait` after the last call of the burst, with that last
//! call's arguments. There is no leading-edge call.
//!
//! At most one invocation is pending per [`Debounced`] instance. It exists
//! exactly while a timer is armed, and is settled by whichever happens
//! first: the timer firing, [`Debounced::flush`], or [`Debounced::cancel`].
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use std::time::Duration;
//! use tether_core::{debounce, Timers};
//!
//! let timers = Timers::new();
//! let saved = Rc::new(Cell::new(0));
//! let sink = saved.clone();
//! let save = debounce(&timers, move |value: i32| sink.set(value), Duration::from_millis(100));
//!
//! save.call(1);
//! save.call(2);
//! timers.advance(Duration::from_millis(150));
//! assert_eq!(saved.get(), 2);
//! ```

use crate::timer::{TimerId, Timers};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use tracing::trace;

/// The call waiting for its quiet period to end
struct PendingInvocation<A> {
    timer: TimerId,
    args: A,
}

struct DebounceInner<A> {
    func: Box<dyn Fn(A)>,
    wait: Duration,
    timers: Timers,
    pending: RefCell<Option<PendingInvocation<A>>>,
}

impl<A> DebounceInner<A> {
    fn fire(&self) {
        // Cleared before `func` runs so `func` may call back into its own handle
        let pending = self.pending.borrow_mut().take();
        if let Some(pending) = pending {
            trace!(timer = ?pending.timer, "debounced call fired");
            (self.func)(pending.args);
        }
    }
}

/// A debounced function handle
///
/// Clones share the same pending invocation; use [`Debounced::ptr_eq`] to
/// compare identities.
pub struct Debounced<A> {
    inner: Rc<DebounceInner<A>>,
}

/// Wrap `func` so that rapid calls collapse into one trailing call
///
/// `A` is the argument tuple (use `()` for no arguments and a tuple for
/// several). Whatever `func` returns is discarded. Panics raised by `func`
/// on a timer firing unwind out of the [`Timers`] driver, not out of
/// [`Debounced::call`].
pub fn debounce<A, R, F>(timers: &Timers, func: F, wait: Duration) -> Debounced<A>
where
    A: 'static,
    F: Fn(A) -> R + 'static,
{
    Debounced {
        inner: Rc::new(DebounceInner {
            func: Box::new(move |args| {
                let _ = func(args);
            }),
            wait,
            timers: timers.clone(),
            pending: RefCell::new(None),
        }),
    }
}

impl<A: 'static> Debounced<A> {
    /// Record `args` and restart the quiet period
    pub fn call(&self, args: A) {
        let mut pending = self.inner.pending.borrow_mut();
        if let Some(previous) = pending.take() {
            self.inner.timers.clear_timeout(previous.timer);
        }

        // The timer owns a strong handle: dropping every `Debounced` does not
        // cancel a pending call.
        let inner = Rc::clone(&self.inner);
        let timer = self
            .inner
            .timers
            .set_timeout(self.inner.wait, move || inner.fire());

        trace!(?timer, wait_ms = self.inner.wait.as_millis() as u64, "debounced call armed");
        *pending = Some(PendingInvocation { timer, args });
    }
}

impl<A> Debounced<A> {
    /// Drop the pending invocation, if any, without calling the function
    pub fn cancel(&self) {
        let pending = self.inner.pending.borrow_mut().take();
        if let Some(pending) = pending {
            self.inner.timers.clear_timeout(pending.timer);
            trace!(timer = ?pending.timer, "debounced call cancelled");
        }
    }

    /// Run the pending invocation now, if any
    ///
    /// When nothing is pending this does nothing: flush settles a pending
    /// call, it never forces a fresh one.
    pub fn flush(&self) {
        let pending = self.inner.pending.borrow_mut().take();
        if let Some(pending) = pending {
            self.inner.timers.clear_timeout(pending.timer);
            trace!(timer = ?pending.timer, "debounced call flushed");
            (self.inner.func)(pending.args);
        }
    }

    /// Check if a call is waiting for its quiet period to end
    pub fn is_pending(&self) -> bool {
        self.inner.pending.borrow().is_some()
    }

    /// The quiet period
    pub fn wait(&self) -> Duration {
        self.inner.wait
    }

    /// Check if two handles refer to the same debounced function
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }
}

impl<A> Clone for Debounced<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A> fmt::Debug for Debounced<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debounced")
            .field("wait", &self.inner.wait)
            .field("pending", &self.is_pending())
            .finish()
    }
}
