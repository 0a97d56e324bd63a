//! Latest-value holder
//!
//! A [`CurrentRef`] is allocated once per component and refreshed on every
//! render. Closures capture the handle, not the value, so they always read
//! what the latest render supplied.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

/// Identity-stable handle to a mutable cell holding the latest value
pub struct CurrentRef<T> {
    cell: Rc<RefCell<T>>,
}

impl<T> CurrentRef<T> {
    /// Create a holder with an initial value
    pub fn new(value: T) -> Self {
        Self {
            cell: Rc::new(RefCell::new(value)),
        }
    }

    /// Overwrite the held value (the host's per-render refresh step)
    pub fn refresh(&self, value: T) {
        *self.cell.borrow_mut() = value;
    }

    /// Overwrite the held value, returning the previous one
    pub fn replace(&self, value: T) -> T {
        self.cell.replace(value)
    }

    /// Borrow the held value
    ///
    /// # Panics
    ///
    /// Panics if called while a refresh is in progress on the same holder.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.cell.borrow()
    }

    /// Run `f` against the held value
    pub fn with<U>(&self, f: impl FnOnce(&T) -> U) -> U {
        f(&self.cell.borrow())
    }

    /// Check if two handles share one cell
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.cell, &b.cell)
    }
}

impl<T: Clone> CurrentRef<T> {
    /// Clone out the held value
    pub fn get(&self) -> T {
        self.cell.borrow().clone()
    }
}

impl<T: PartialEq> CurrentRef<T> {
    /// Refresh only when `value` differs from the held one
    ///
    /// Returns whether the cell was written.
    pub fn refresh_if_changed(&self, value: T) -> bool {
        let changed = *self.cell.borrow() != value;
        if changed {
            self.refresh(value);
        }
        changed
    }
}

impl<T> Clone for CurrentRef<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for CurrentRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CurrentRef").field(&*self.cell.borrow()).finish()
    }
}
