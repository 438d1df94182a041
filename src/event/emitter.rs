//! Typed pub/sub between related elements.
//!
//! A grid listens to its items through a [`SyntheticEmitter`] keyed by an
//! event enum, so an item changing its span can ask the grid to re-layout
//! without holding a reference to it.

use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use crate::collections::OrderedMap;

type Listener<A> = Rc<dyn Fn(&A)>;

struct EmitterState<K: Hash + Eq, A> {
    listeners: OrderedMap<K, OrderedMap<u64, Listener<A>>>,
    next_id: u64,
}

/// Keyed listener registry. Cloning yields another handle to the same
/// registry.
pub struct SyntheticEmitter<K: Hash + Eq, A = ()> {
    state: Rc<RefCell<EmitterState<K, A>>>,
}

impl<K: Hash + Eq + Clone + 'static, A: 'static> SyntheticEmitter<K, A> {
    /// Create an emitter with no listeners.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(EmitterState {
                listeners: OrderedMap::new(),
                next_id: 0,
            })),
        }
    }

    /// Register `callback` for `key`. Listeners run in registration order.
    pub fn on(&self, key: K, callback: impl Fn(&A) + 'static) -> Subscription {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let id = state.next_id;
        state.next_id += 1;
        if !state.listeners.contains_key(&key) {
            state.listeners.set(key.clone(), OrderedMap::new());
        }
        if let Some(listeners) = state.listeners.get_mut(&key) {
            listeners.set(id, Rc::new(callback));
        }
        drop(guard);

        let weak: Weak<RefCell<EmitterState<K, A>>> = Rc::downgrade(&self.state);
        Subscription {
            remove: Some(Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    let mut state = state.borrow_mut();
                    if let Some(listeners) = state.listeners.get_mut(&key) {
                        listeners.remove(&id);
                        if listeners.is_empty() {
                            state.listeners.remove(&key);
                        }
                    }
                }
            })),
        }
    }

    /// Call every listener of `key` with `args`.
    ///
    /// Listeners added or removed during the emission take effect for the
    /// next one.
    pub fn emit(&self, key: &K, args: &A) {
        let listeners: Vec<Listener<A>> = match self.state.borrow().listeners.get(key) {
            Some(listeners) => listeners.values().cloned().collect(),
            None => return,
        };
        for listener in listeners {
            listener(args);
        }
    }

    /// Drop every listener.
    pub fn clear(&self) {
        self.state.borrow_mut().listeners.clear();
    }

    pub fn listener_count(&self, key: &K) -> usize {
        self.state
            .borrow()
            .listeners
            .get(key)
            .map_or(0, OrderedMap::len)
    }
}

impl<K: Hash + Eq + Clone + 'static, A: 'static> Default for SyntheticEmitter<K, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, A> Clone for SyntheticEmitter<K, A> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<K: Hash + Eq, A> fmt::Debug for SyntheticEmitter<K, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SyntheticEmitter")
            .field("keys", &state.listeners.len())
            .finish()
    }
}

/// Handle to a registered listener.
///
/// Dropping it keeps the listener registered; call [`remove`](Self::remove).
pub struct Subscription {
    remove: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Unregister the listener. Does nothing if the emitter is gone.
    pub fn remove(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    enum ItemEvent {
        Resized,
        Removed,
    }

    #[test]
    fn emits_to_listeners_of_the_key_in_order() {
        let emitter: SyntheticEmitter<ItemEvent, u32> = SyntheticEmitter::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (a, b, c) = (log.clone(), log.clone(), log.clone());
        emitter.on(ItemEvent::Resized, move |n| a.borrow_mut().push(("first", *n)));
        emitter.on(ItemEvent::Resized, move |n| b.borrow_mut().push(("second", *n)));
        emitter.on(ItemEvent::Removed, move |n| c.borrow_mut().push(("removed", *n)));

        emitter.emit(&ItemEvent::Resized, &7);
        assert_eq!(*log.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn remove_unsubscribes() {
        let emitter: SyntheticEmitter<ItemEvent> = SyntheticEmitter::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let sub = emitter.on(ItemEvent::Resized, move |_| c.set(c.get() + 1));
        emitter.emit(&ItemEvent::Resized, &());
        sub.remove();
        emitter.emit(&ItemEvent::Resized, &());

        assert_eq!(count.get(), 1);
        assert_eq!(emitter.listener_count(&ItemEvent::Resized), 0);
    }

    #[test]
    fn listener_may_unsubscribe_during_emit() {
        let emitter: SyntheticEmitter<ItemEvent> = SyntheticEmitter::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let s = slot.clone();
        let sub = emitter.on(ItemEvent::Removed, move |_| {
            if let Some(sub) = s.borrow_mut().take() {
                sub.remove();
            }
        });
        *slot.borrow_mut() = Some(sub);

        emitter.emit(&ItemEvent::Removed, &());
        assert_eq!(emitter.listener_count(&ItemEvent::Removed), 0);
    }

    #[test]
    fn clear_and_stale_subscriptions() {
        let emitter: SyntheticEmitter<ItemEvent> = SyntheticEmitter::new();
        let sub = emitter.on(ItemEvent::Resized, |_| {});
        emitter.clear();
        assert_eq!(emitter.listener_count(&ItemEvent::Resized), 0);
        sub.remove();

        let dropped = SyntheticEmitter::<ItemEvent>::new();
        let sub = dropped.on(ItemEvent::Resized, |_| {});
        drop(dropped);
        sub.remove();
    }
}
