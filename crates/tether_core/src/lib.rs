//! Tether Core Runtime
//!
//! Framework-agnostic building blocks for the Tether hooks:
//!
//! - **Timer Host**: a single-threaded timer queue on a virtual clock, driven
//!   explicitly or by the tokio clock
//! - **Debounce**: trailing-edge call coalescing with cancel and flush
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use std::time::Duration;
//! use tether_core::{debounce, Timers};
//!
//! let timers = Timers::new();
//! let calls = Rc::new(Cell::new(0));
//! let hits = calls.clone();
//!
//! let resize = debounce(&timers, move |(_w, _h): (u32, u32)| hits.set(hits.get() + 1), Duration::from_millis(100));
//! resize.call((800, 600));
//! resize.call((1024, 768));
//!
//! timers.advance(Duration::from_millis(100));
//! assert_eq!(calls.get(), 1);
//! ```

pub mod debounce;
pub mod timer;

pub use debounce::{debounce, Debounced};
pub use timer::{TimerCallback, TimerId, Timers};
