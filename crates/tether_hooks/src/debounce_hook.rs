//! Render-stable debounced callbacks
//!
//! [`DebounceHook`] applies [`tether_core::debounce`] once per component
//! through a [`HighOrder`], so the debounced handle keeps its pending timer
//! across renders while still calling the latest input function.
//!
//! Pending calls are not settled on unmount. If a component needs that, it
//! calls [`Debounced::flush`] or [`Debounced::cancel`] in its own teardown.

use crate::high_order::{HighOrder, Relay};
use std::fmt;
use std::time::Duration;
use tether_core::{debounce, Debounced, Timers};

/// Quiet period used when none is given
pub const DEFAULT_DEBOUNCE_WAIT: Duration = Duration::from_millis(500);

/// Per-component state of one debounced callback
pub struct DebounceHook<A, R = ()> {
    timers: Timers,
    hook: HighOrder<A, R, Debounced<A>>,
}

impl<A: 'static, R: 'static> DebounceHook<A, R> {
    /// Create the hook state; the debounced function is built on first render
    pub fn new(timers: &Timers) -> Self {
        Self {
            timers: timers.clone(),
            hook: HighOrder::new(),
        }
    }

    /// Render step
    ///
    /// `wait` only matters on the first render; `None` means
    /// [`DEFAULT_DEBOUNCE_WAIT`].
    pub fn use_debounce<F>(&self, input: F, wait: Option<Duration>) -> Debounced<A>
    where
        F: Fn(A) -> R + 'static,
    {
        let timers = self.timers.clone();
        self.hook.use_any_high_order_function(
            move |relay: Relay<A, R>, wait: Duration| {
                debounce(&timers, move |args| relay.call(args), wait)
            },
            input,
            wait.unwrap_or(DEFAULT_DEBOUNCE_WAIT),
        )
    }

    /// The debounced handle, if the first render has happened
    pub fn debounced(&self) -> Option<&Debounced<A>> {
        self.hook.output()
    }
}

impl<A, R> fmt::Debug for DebounceHook<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebounceHook")
            .field("hook", &self.hook)
            .finish()
    }
}
