//! The event emitter registry.
//!
//! This module provides the central registry that handles listener
//! registration, removal, and synchronous event dispatch.

use crate::event::listener::{Listener, ListenerId, Predicate};
use crate::utils::error::{EmitterError, Result};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// How a registration is consumed by dispatch.
pub(crate) enum Delivery<T> {
    /// Invoked on every emit of its event.
    Every,
    /// Removed before its first invocation.
    Once,
    /// Removed before its first invocation on the first emit whose arguments
    /// satisfy the predicate; non-matching emits leave it registered and do
    /// not invoke it.
    OnceWhen(Predicate<T>),
}

impl<T> Clone for Delivery<T> {
    fn clone(&self) -> Self {
        match self {
            Delivery::Every => Delivery::Every,
            Delivery::Once => Delivery::Once,
            Delivery::OnceWhen(when) => Delivery::OnceWhen(Arc::clone(when)),
        }
    }
}

/// One slot in an event's ordered listener sequence.
struct Registration<T> {
    id: ListenerId,
    listener: Listener<T>,
    delivery: Delivery<T>,
}

impl<T> Clone for Registration<T> {
    fn clone(&self) -> Self {
        Registration {
            id: self.id,
            listener: self.listener.clone(),
            delivery: self.delivery.clone(),
        }
    }
}

type Registry<T> = HashMap<String, Vec<Registration<T>>>;

/// A publish/subscribe registry mapping event names to ordered listener
/// sequences.
///
/// Dispatch is synchronous and sequential on the emitting thread. The
/// registry lock is never held while a listener runs, so listeners may
/// re-enter the emitter (register, unregister, or emit) during dispatch;
/// mutations made during a pass take effect for the next emit of that event.
pub struct Emitter<T> {
    /// Map of event names to their registration sequences. An event whose
    /// sequence becomes empty is removed from the map.
    registry: RwLock<Registry<T>>,
}

impl<T: Clone + Send + Sync + 'static> Emitter<T> {
    /// Create a new emitter with an empty registry.
    pub fn new() -> Self {
        Emitter {
            registry: RwLock::new(HashMap::new()),
        }
    }

    /// Register a listener for `event`, appending it to the event's ordered
    /// sequence (creating the sequence if absent).
    ///
    /// Returns the id keyed on by [`off`](Self::off). Every call creates a
    /// distinct slot, so registering the same callback twice yields two
    /// invocations per emit.
    ///
    /// Fails with [`EmitterError::InvalidListener`] when the listener is not
    /// invocable (a handler-form listener whose target has been dropped);
    /// the registry is left unchanged in that case.
    pub fn on(&self, event: &str, listener: Listener<T>) -> Result<ListenerId> {
        self.check_invocable(event, &listener)?;
        Ok(self.register(event, listener, Delivery::Every))
    }

    /// Register a one-shot listener for `event`.
    ///
    /// The registration is removed from the registry before its single
    /// invocation, so re-entrant emits during the same dispatch cannot
    /// trigger it again.
    pub fn once(&self, event: &str, listener: Listener<T>) -> Result<ListenerId> {
        self.check_invocable(event, &listener)?;
        Ok(self.register(event, listener, Delivery::Once))
    }

    /// Register a predicate-gated one-shot listener for `event`.
    ///
    /// On each emit the predicate is evaluated against the emitted
    /// arguments. A non-matching emit neither invokes the listener nor
    /// consumes the registration; the first matching emit removes the
    /// registration and invokes the listener once.
    pub fn once_when<P>(&self, event: &str, when: P, listener: Listener<T>) -> Result<ListenerId>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.check_invocable(event, &listener)?;
        Ok(self.register(event, listener, Delivery::OnceWhen(Arc::new(when))))
    }

    /// Remove the single registration `id` from `event`'s sequence. Other
    /// listeners on the event are unaffected.
    ///
    /// Returns whether the registration was present; removing an untracked
    /// listener is a silent no-op.
    pub fn off(&self, event: &str, id: ListenerId) -> bool {
        let removed = self.take(event, id);
        if removed {
            log::trace!("Removed listener {} from event '{}'.", id, event);
        }
        removed
    }

    /// Remove all listeners for `event`.
    pub fn off_event(&self, event: &str) {
        if let Some(removed) = self.write().remove(event) {
            log::trace!(
                "Cleared {} listener(s) for event '{}'.",
                removed.len(),
                event
            );
        }
    }

    /// Remove all listeners for all events.
    pub fn off_all(&self) {
        let mut registry = self.write();
        let total: usize = registry.values().map(|v| v.len()).sum();
        registry.clear();
        log::trace!("Cleared all {} listener(s).", total);
    }

    /// Synchronously invoke every currently registered listener for `event`,
    /// in registration order, passing `args`.
    ///
    /// Listeners run sequentially on the calling thread. The event's
    /// sequence is snapshotted before anything is invoked, so no listener is
    /// skipped or double-invoked by re-entrant mutation within one pass.
    /// Handler-form listeners whose target has died are skipped and pruned.
    ///
    /// Returns the number of listeners delivered to; emitting an event with
    /// no listeners is a no-op returning 0.
    pub fn emit(&self, event: &str, args: T) -> usize {
        let snapshot: Vec<Registration<T>> =
            self.read().get(event).cloned().unwrap_or_default();
        if snapshot.is_empty() {
            log::trace!("No listeners registered for event '{}'.", event);
            return 0;
        }

        let mut delivered = 0;
        let mut dead = Vec::new();
        for registration in &snapshot {
            let fire = match &registration.delivery {
                Delivery::Every => true,
                // One-shot entries fire only if this call wins the removal;
                // a re-entrant emit that already consumed the slot makes
                // `take` return false here.
                Delivery::Once => self.take(event, registration.id),
                Delivery::OnceWhen(when) => when(&args) && self.take(event, registration.id),
            };
            if !fire {
                continue;
            }
            if registration.listener.invoke(self, event, &args) {
                delivered += 1;
            } else {
                dead.push(registration.id);
            }
        }

        for id in dead {
            if self.take(event, id) {
                log::debug!("Pruned dead handler {} from event '{}'.", id, event);
            }
        }

        log::trace!("Delivered event '{}' to {} listener(s).", event, delivered);
        delivered
    }

    /// Get the number of listeners currently registered for `event`.
    pub fn count(&self, event: &str) -> usize {
        self.read().get(event).map_or(0, |v| v.len())
    }

    /// Get the total number of listeners across all events.
    pub fn total_count(&self) -> usize {
        self.read().values().map(|v| v.len()).sum()
    }

    /// Append a registration to `event`'s sequence. Infallible; callers
    /// validate invocability first where required.
    pub(crate) fn register(
        &self,
        event: &str,
        listener: Listener<T>,
        delivery: Delivery<T>,
    ) -> ListenerId {
        let id = ListenerId::new();
        self.write()
            .entry(event.to_string())
            .or_default()
            .push(Registration {
                id,
                listener,
                delivery,
            });
        log::trace!("Registered listener {} for event '{}'.", id, event);
        id
    }

    fn check_invocable(&self, event: &str, listener: &Listener<T>) -> Result<()> {
        if listener.is_invocable() {
            Ok(())
        } else {
            Err(EmitterError::InvalidListener(event.to_string()))
        }
    }

    /// Remove registration `id` from `event`'s sequence, dropping the map
    /// entry when the sequence empties. Returns whether it was present.
    fn take(&self, event: &str, id: ListenerId) -> bool {
        let mut registry = self.write();
        let Some(registrations) = registry.get_mut(event) else {
            return false;
        };
        let before = registrations.len();
        registrations.retain(|r| r.id != id);
        let removed = registrations.len() < before;
        if registrations.is_empty() {
            registry.remove(event);
        }
        removed
    }

    // Lock sections never span a listener invocation, so a poisoned lock
    // still guards consistent data; recover instead of panicking.
    fn read(&self) -> RwLockReadGuard<'_, Registry<T>> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry<T>> {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone + Send + Sync + 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Emitter")
            .field("events", &registry.len())
            .field(
                "listeners",
                &registry.values().map(|v| v.len()).sum::<usize>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::listener::EventHandler;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn registration_and_removal_update_count() {
        let emitter: Emitter<u32> = Emitter::new();

        let id = emitter.on("tick", Listener::callback(|_, _| {})).unwrap();
        assert_eq!(emitter.count("tick"), 1);

        assert!(emitter.off("tick", id));
        assert_eq!(emitter.count("tick"), 0);
    }

    #[test]
    fn emit_invokes_registered_callback() {
        let emitter: Emitter<u32> = Emitter::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_clone = calls.clone();
        emitter
            .on(
                "tick",
                Listener::callback(move |_, n| {
                    assert_eq!(*n, 7);
                    calls_clone.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        assert_eq!(emitter.emit("tick", 7), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn duplicate_registrations_occupy_distinct_slots() {
        let emitter: Emitter<u32> = Emitter::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let make = |calls: &Arc<AtomicUsize>| {
            let calls = calls.clone();
            Listener::callback(move |_: &Emitter<u32>, _: &u32| {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };
        let first = emitter.on("tick", make(&calls)).unwrap();
        let second = emitter.on("tick", make(&calls)).unwrap();
        assert_ne!(first, second);
        assert_eq!(emitter.count("tick"), 2);

        emitter.emit("tick", 0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn off_event_clears_only_that_event() {
        let emitter: Emitter<u32> = Emitter::new();
        emitter.on("a", Listener::callback(|_, _| {})).unwrap();
        emitter.on("a", Listener::callback(|_, _| {})).unwrap();
        emitter.on("b", Listener::callback(|_, _| {})).unwrap();

        emitter.off_event("a");
        assert_eq!(emitter.count("a"), 0);
        assert_eq!(emitter.count("b"), 1);
    }

    #[test]
    fn off_all_clears_every_event() {
        let emitter: Emitter<u32> = Emitter::new();
        emitter.on("a", Listener::callback(|_, _| {})).unwrap();
        emitter.on("b", Listener::callback(|_, _| {})).unwrap();
        assert_eq!(emitter.total_count(), 2);

        emitter.off_all();
        assert_eq!(emitter.count("a"), 0);
        assert_eq!(emitter.count("b"), 0);
        assert_eq!(emitter.total_count(), 0);
    }

    #[test]
    fn registering_dead_handler_fails_and_leaves_registry_unchanged() {
        struct Noop;
        impl EventHandler<u32> for Noop {
            fn handle_event(&self, _event: &str, _args: &u32) {}
        }

        let emitter: Emitter<u32> = Emitter::new();
        let handler = Arc::new(Noop);
        let listener = Listener::handler(&handler);
        drop(handler);

        let result = emitter.on("tick", listener);
        assert!(matches!(result, Err(EmitterError::InvalidListener(_))));
        assert_eq!(emitter.count("tick"), 0);
    }

    #[test]
    fn emit_without_listeners_is_a_no_op() {
        let emitter: Emitter<u32> = Emitter::new();
        assert_eq!(emitter.emit("nothing", 1), 0);
    }
}
