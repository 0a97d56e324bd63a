//! Component hook scope
//!
//! The host framework's render lifecycle, made explicit. A [`HookScope`]
//! stores the persistent state of every hook a component uses, keyed by a
//! caller-chosen string plus the hook state's type, so the same key can be
//! reused by hooks of different types without clashing.
//!
//! [`Component`] drives a render closure against one scope: it runs the
//! closure on mount, again on every re-render with new props, and drops the
//! scope on unmount.
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use std::time::Duration;
//! use tether_core::Timers;
//! use tether_hooks::Component;
//!
//! let timers = Timers::new();
//! let saved = Rc::new(Cell::new(0));
//! let sink = saved.clone();
//!
//! let mut editor = Component::mount(&timers, 1, move |scope, value: &i32| {
//!     let (sink, value) = (sink.clone(), *value);
//!     scope.use_debounce("autosave", move |()| sink.set(value), Some(Duration::from_millis(100)))
//! });
//!
//! editor.result().call(());
//! editor.rerender(2);
//! timers.advance(Duration::from_millis(100));
//! assert_eq!(saved.get(), 2);
//! ```
//!
//! Unmounting performs no cleanup of pending debounced calls; flush or
//! cancel them first if they must be settled.

use crate::config::HooksConfig;
use crate::current_ref::CurrentRef;
use crate::debounce_hook::DebounceHook;
use crate::high_order::{HighOrder, OutputFunction, Relay};
use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::time::Duration;
use tether_core::{Debounced, Timers};
use tracing::debug;

/// Key identifying one hook slot
///
/// The caller's key is stored whole, so two distinct keys never share a slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HookKey {
    key: Box<str>,
    /// Type of the stored hook state
    type_id: TypeId,
}

impl HookKey {
    /// Create a key from a string key and the slot type
    pub fn from_string<T: 'static>(key: &str) -> Self {
        Self {
            key: key.into(),
            type_id: TypeId::of::<T>(),
        }
    }

    /// The caller-chosen part of the key
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Persistent hook storage for one component instance
pub struct HookScope {
    timers: Timers,
    config: HooksConfig,
    slots: FxHashMap<HookKey, Box<dyn Any>>,
}

impl HookScope {
    /// Create an empty scope using the default configuration
    pub fn new(timers: &Timers) -> Self {
        Self::with_config(timers, HooksConfig::default())
    }

    /// Create an empty scope with explicit configuration
    pub fn with_config(timers: &Timers, config: HooksConfig) -> Self {
        Self {
            timers: timers.clone(),
            config,
            slots: FxHashMap::default(),
        }
    }

    /// Timer host this scope's hooks schedule on
    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn config(&self) -> &HooksConfig {
        &self.config
    }

    /// Number of hook slots created so far
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Get the slot for `key`, creating it with `init` on first use
    fn slot<T: 'static>(&mut self, key: &str, init: impl FnOnce() -> T) -> &T {
        let hook_key = HookKey::from_string::<T>(key);
        let slot = self.slots.entry(hook_key).or_insert_with(|| {
            debug!(key, "hook slot created");
            Box::new(init()) as Box<dyn Any>
        });

        match slot.downcast_ref::<T>() {
            Some(state) => state,
            None => unreachable!("hook slot type is part of its key"),
        }
    }

    /// Latest-value holder, refreshed with `value` on every render
    pub fn use_current_ref<T: 'static>(&mut self, key: &str, value: T) -> CurrentRef<T> {
        let hook_key = HookKey::from_string::<CurrentRef<T>>(key);
        if let Some(current) = self
            .slots
            .get(&hook_key)
            .and_then(|slot| slot.downcast_ref::<CurrentRef<T>>())
        {
            current.refresh(value);
            return current.clone();
        }

        debug!(key, "hook slot created");
        let current = CurrentRef::new(value);
        self.slots.insert(hook_key, Box::new(current.clone()));
        current
    }

    /// Apply `high_order` once for this component and return its output
    ///
    /// See [`HighOrder::use_any_high_order_function`].
    pub fn use_any_high_order_function<A, R, O, H, F, X>(
        &mut self,
        key: &str,
        high_order: H,
        input: F,
        extra: X,
    ) -> O
    where
        A: 'static,
        R: 'static,
        O: Clone + 'static,
        H: FnOnce(Relay<A, R>, X) -> O,
        F: Fn(A) -> R + 'static,
    {
        self.slot(key, HighOrder::<A, R, O>::new)
            .use_any_high_order_function(high_order, input, extra)
    }

    /// Like [`HookScope::use_any_high_order_function`], for outputs with the
    /// input's exact signature
    pub fn use_high_order_function<A, R, O, H, F, X>(
        &mut self,
        key: &str,
        high_order: H,
        input: F,
        extra: X,
    ) -> O
    where
        A: 'static,
        R: 'static,
        O: OutputFunction<A, R> + Clone + 'static,
        H: FnOnce(Relay<A, R>, X) -> O,
        F: Fn(A) -> R + 'static,
    {
        self.slot(key, HighOrder::<A, R, O>::new)
            .use_high_order_function(high_order, input, extra)
    }

    /// Render-stable debounced callback
    ///
    /// `None` falls back to the configured default wait.
    pub fn use_debounce<A, R, F>(&mut self, key: &str, input: F, wait: Option<Duration>) -> Debounced<A>
    where
        A: 'static,
        R: 'static,
        F: Fn(A) -> R + 'static,
    {
        let wait = wait.unwrap_or_else(|| self.config.debounce_wait());
        let timers = self.timers.clone();
        self.slot(key, move || DebounceHook::<A, R>::new(&timers))
            .use_debounce(input, Some(wait))
    }
}

impl fmt::Debug for HookScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookScope")
            .field("slots", &self.slots.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Render closure of a [`Component`]
pub type RenderFn<P, O> = Box<dyn FnMut(&mut HookScope, &P) -> O>;

/// A mounted component: one hook scope plus the closure that renders it
pub struct Component<P, O> {
    scope: HookScope,
    render: RenderFn<P, O>,
    props: P,
    result: O,
    renders: usize,
}

impl<P, O> Component<P, O> {
    /// Mount: create the scope and run the first render
    pub fn mount<F>(timers: &Timers, props: P, render: F) -> Self
    where
        F: FnMut(&mut HookScope, &P) -> O + 'static,
    {
        Self::mount_with_config(timers, HooksConfig::default(), props, render)
    }

    /// Mount with explicit hook configuration
    pub fn mount_with_config<F>(timers: &Timers, config: HooksConfig, props: P, render: F) -> Self
    where
        F: FnMut(&mut HookScope, &P) -> O + 'static,
    {
        let mut scope = HookScope::with_config(timers, config);
        let mut render: RenderFn<P, O> = Box::new(render);
        let result = render(&mut scope, &props);
        debug!(slots = scope.slot_count(), "component mounted");

        Self {
            scope,
            render,
            props,
            result,
            renders: 1,
        }
    }

    /// Re-render with new props
    pub fn rerender(&mut self, props: P) -> &O {
        self.props = props;
        self.render_again()
    }

    /// Output of the latest render
    pub fn result(&self) -> &O {
        &self.result
    }

    /// Props of the latest render
    pub fn props(&self) -> &P {
        &self.props
    }

    /// Number of renders so far, including the mount
    pub fn renders(&self) -> usize {
        self.renders
    }

    pub fn scope(&self) -> &HookScope {
        &self.scope
    }

    /// Unmount: drop every hook slot, returning the last render's output
    ///
    /// Pending debounced calls stay armed on the timer host.
    pub fn unmount(self) -> O {
        debug!(
            slots = self.scope.slot_count(),
            renders = self.renders,
            "component unmounted"
        );
        self.result
    }

    /// Re-render with the current props
    pub fn refresh(&mut self) -> &O {
        self.render_again()
    }

    fn render_again(&mut self) -> &O {
        self.result = (self.render)(&mut self.scope, &self.props);
        self.renders += 1;
        &self.result
    }
}

impl<P: fmt::Debug, O> fmt::Debug for Component<P, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("props", &self.props)
            .field("renders", &self.renders)
            .field("scope", &self.scope)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_hook_key() {
        let key1 = HookKey::from_string::<i32>("counter");
        let key2 = HookKey::from_string::<i32>("counter");
        let key3 = HookKey::from_string::<String>("counter");
        let key4 = HookKey::from_string::<i32>("other");

        assert_eq!(key1, key2);
        assert_ne!(key1, key3);
        assert_ne!(key1, key4);
        assert_eq!(key4.key(), "other");
    }

    #[test]
    fn test_distinct_keys_get_distinct_slots() {
        let timers = Timers::new();
        let mut scope = HookScope::new(&timers);

        let keys: Vec<String> = (0..64).map(|n| format!("field-{n}")).collect();
        let refs: Vec<_> = keys
            .iter()
            .enumerate()
            .map(|(n, key)| scope.use_current_ref(key, n))
            .collect();

        assert_eq!(scope.slot_count(), keys.len());
        for (n, current) in refs.iter().enumerate() {
            assert_eq!(current.get(), n);
        }
    }

    #[test]
    fn test_high_order_ignores_later_input_application() {
        let timers = Timers::new();
        let mut scope = HookScope::new(&timers);
        let first_applied = Rc::new(Cell::new(0));
        let second_applied = Rc::new(Cell::new(0));

        let counter = first_applied.clone();
        let first = scope.use_any_high_order_function(
            "wrapped",
            move |relay: Relay<i32, i32>, ()| -> Rc<dyn Fn(i32) -> i32> {
                counter.set(counter.get() + 1);
                Rc::new(move |x| relay.call(x) + 1)
            },
            |x: i32| x * 2,
            (),
        );

        // A different high-order closure on the next render is never applied
        let counter = second_applied.clone();
        let second = scope.use_any_high_order_function(
            "wrapped",
            move |relay: Relay<i32, i32>, ()| -> Rc<dyn Fn(i32) -> i32> {
                counter.set(counter.get() + 1);
                Rc::new(move |x| relay.call(x) - 1)
            },
            |x: i32| x * 3,
            (),
        );

        assert_eq!(first_applied.get(), 1);
        assert_eq!(second_applied.get(), 0);
        assert!(Rc::ptr_eq(&first, &second));
        // First wrapper, latest input
        assert_eq!(second(5), 16);
        assert_eq!(scope.slot_count(), 1);
    }

    #[test]
    fn test_current_ref_slot_persists() {
        let timers = Timers::new();
        let mut scope = HookScope::new(&timers);

        let first = scope.use_current_ref("value", 1);
        let second = scope.use_current_ref("value", 2);

        assert!(CurrentRef::ptr_eq(&first, &second));
        assert_eq!(first.get(), 2);
        assert_eq!(scope.slot_count(), 1);
    }

    #[test]
    fn test_same_key_different_types() {
        let timers = Timers::new();
        let mut scope = HookScope::new(&timers);

        let number = scope.use_current_ref("value", 1);
        let text = scope.use_current_ref("value", String::from("one"));

        assert_eq!(number.get(), 1);
        assert_eq!(text.get(), "one");
        assert_eq!(scope.slot_count(), 2);
    }

    #[test]
    fn test_high_order_slot_applies_once() {
        let timers = Timers::new();
        let mut scope = HookScope::new(&timers);
        let applied = Rc::new(Cell::new(0));

        for n in 0..3 {
            let applied = applied.clone();
            let output = scope.use_high_order_function(
                "doubled",
                move |relay: Relay<i32, i32>, ()| {
                    applied.set(applied.get() + 1);
                    relay
                },
                move |x: i32| x + n,
                (),
            );
            assert_eq!(output.invoke(10), 10 + n);
        }

        assert_eq!(applied.get(), 1);
    }

    #[test]
    fn test_component_lifecycle() {
        let timers = Timers::new();
        let mut component = Component::mount(&timers, 1, |scope, value: &i32| {
            scope.use_current_ref("value", *value)
        });
        let first = component.result().clone();
        assert_eq!(component.renders(), 1);

        component.rerender(2);
        component.rerender(3);
        assert_eq!(component.renders(), 3);
        assert!(CurrentRef::ptr_eq(&first, component.result()));
        assert_eq!(first.get(), 3);

        component.refresh();
        assert_eq!(component.renders(), 4);
        assert_eq!(*component.props(), 3);

        let last = component.unmount();
        assert_eq!(last.get(), 3);
    }

    #[test]
    fn test_configured_default_wait() {
        let timers = Timers::new();
        let config = HooksConfig::from_toml_str("[debounce]\nwait_ms = 50\n").unwrap();
        let component = Component::mount_with_config(&timers, config, (), |scope, _: &()| {
            scope.use_debounce("noop", |()| {}, None)
        });

        assert_eq!(component.result().wait(), Duration::from_millis(50));
    }
}
