//! Single-application wrapper for high-order functions
//!
//! A high-order function takes an input function (plus extra arguments) and
//! returns an output function that usually keeps state of its own, such as
//! the pending timer of a debounced function. Re-applying it on every render
//! would throw that state away, so [`HighOrder`] applies it exactly once per
//! component and caches the output.
//!
//! The input function is different on every render (new closure, new
//! captures). The cached output is therefore built around a [`Relay`] that
//! reads the input through a [`CurrentRef`] refreshed each render, so calls
//! through the unchanging output always reach the latest input.
//!
//! Changing the high-order function or its extra arguments after the first
//! render is not supported: later values are ignored.

use crate::current_ref::CurrentRef;
use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;
use tether_core::Debounced;
use tracing::debug;

/// Input function as stored between renders
pub type InputFn<A, R> = Rc<dyn Fn(A) -> R>;

/// Forwards each call to whatever input function the latest render supplied
pub struct Relay<A, R> {
    input: CurrentRef<InputFn<A, R>>,
}

impl<A, R> Relay<A, R> {
    /// Call the latest input function
    pub fn call(&self, args: A) -> R {
        // Clone out so the input may trigger a refresh of its own holder
        let input = self.input.get();
        input(args)
    }
}

impl<A, R> Clone for Relay<A, R> {
    fn clone(&self) -> Self {
        Self {
            input: self.input.clone(),
        }
    }
}

impl<A, R> fmt::Debug for Relay<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relay").finish_non_exhaustive()
    }
}

/// A function callable with the signature `A -> R`
///
/// Output functions that keep the input's exact signature implement this,
/// which is what [`HighOrder::use_high_order_function`] requires.
pub trait OutputFunction<A, R> {
    fn invoke(&self, args: A) -> R;
}

impl<A, R> OutputFunction<A, R> for Relay<A, R> {
    fn invoke(&self, args: A) -> R {
        self.call(args)
    }
}

impl<A, R, F> OutputFunction<A, R> for Rc<F>
where
    F: Fn(A) -> R + ?Sized,
{
    fn invoke(&self, args: A) -> R {
        (**self)(args)
    }
}

impl<A: 'static> OutputFunction<A, ()> for Debounced<A> {
    fn invoke(&self, args: A) {
        self.call(args)
    }
}

/// Per-component state of one high-order hook
///
/// Holds the latest input function and the write-once output.
pub struct HighOrder<A, R, O> {
    input: OnceCell<CurrentRef<InputFn<A, R>>>,
    output: OnceCell<O>,
}

impl<A: 'static, R: 'static, O: Clone> HighOrder<A, R, O> {
    /// Create the hook state; nothing is applied until the first render
    pub fn new() -> Self {
        Self {
            input: OnceCell::new(),
            output: OnceCell::new(),
        }
    }

    /// Render step for any high-order function
    ///
    /// Refreshes the input, applies `high_order(relay, extra)` on the first
    /// render only, and returns the cached output.
    pub fn use_any_high_order_function<H, F, X>(&self, high_order: H, input: F, extra: X) -> O
    where
        H: FnOnce(Relay<A, R>, X) -> O,
        F: Fn(A) -> R + 'static,
    {
        let input: InputFn<A, R> = Rc::new(input);
        let current = match self.input.get() {
            Some(current) => {
                current.refresh(input);
                current
            }
            None => self.input.get_or_init(|| CurrentRef::new(input)),
        };

        self.output
            .get_or_init(|| {
                debug!("applying high-order function");
                high_order(
                    Relay {
                        input: current.clone(),
                    },
                    extra,
                )
            })
            .clone()
    }

    /// Render step for a high-order function that keeps the input's signature
    ///
    /// Behaves exactly like [`HighOrder::use_any_high_order_function`].
    pub fn use_high_order_function<H, F, X>(&self, high_order: H, input: F, extra: X) -> O
    where
        H: FnOnce(Relay<A, R>, X) -> O,
        F: Fn(A) -> R + 'static,
        O: OutputFunction<A, R>,
    {
        self.use_any_high_order_function(high_order, input, extra)
    }

    /// The cached output, if the first render has happened
    pub fn output(&self) -> Option<&O> {
        self.output.get()
    }

    /// Check whether the high-order function has been applied
    pub fn is_initialized(&self) -> bool {
        self.output.get().is_some()
    }
}

impl<A: 'static, R: 'static, O: Clone> Default for HighOrder<A, R, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R, O> fmt::Debug for HighOrder<A, R, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HighOrder")
            .field("initialized", &self.output.get().is_some())
            .finish()
    }
}
