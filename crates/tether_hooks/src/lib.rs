//! Tether Hooks
//!
//! Render-stable callbacks for component-based UIs:
//!
//! - **CurrentRef**: a per-component cell that always holds the latest value
//! - **HighOrder**: applies a high-order function once per component while the
//!   produced function keeps calling the latest input
//! - **DebounceHook**: a debounced callback whose identity survives re-renders
//! - **HookScope / Component**: keyed hook storage and an explicit
//!   mount / re-render / unmount lifecycle to drive it
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use std::time::Duration;
//! use tether_core::{Debounced, Timers};
//! use tether_hooks::HookScope;
//!
//! let timers = Timers::new();
//! let mut scope = HookScope::new(&timers);
//! let last = Rc::new(Cell::new(0));
//!
//! let sink = last.clone();
//! let first = scope.use_debounce("search", move |n: u32| sink.set(n), Some(Duration::from_millis(100)));
//! first.call(1);
//!
//! // Next render: same handle, new closure
//! let sink = last.clone();
//! let second = scope.use_debounce("search", move |n: u32| sink.set(n * 10), Some(Duration::from_millis(100)));
//! assert!(Debounced::ptr_eq(&first, &second));
//!
//! timers.advance(Duration::from_millis(100));
//! assert_eq!(last.get(), 10);
//! ```

pub mod config;
pub mod current_ref;
pub mod debounce_hook;
pub mod error;
pub mod high_order;
pub mod scope;

pub use config::{DebounceConfig, HooksConfig};
pub use current_ref::CurrentRef;
pub use debounce_hook::{DebounceHook, DEFAULT_DEBOUNCE_WAIT};
pub use error::{HooksError, Result};
pub use high_order::{HighOrder, InputFn, OutputFunction, Relay};
pub use scope::{Component, HookKey, HookScope, RenderFn};

pub use tether_core::{debounce, Debounced, Timers};
