//! Listener definitions for the event emitter.
//!
//! A listener is either a plain callback or a capability object exposing a
//! single dispatch method. Handler objects are held weakly: the emitter never
//! keeps a handler alive, and a registration whose handler has been dropped
//! is no longer invocable.

use crate::event::emitter::Emitter;
use std::fmt;
use std::sync::{Arc, Weak};
use uuid::Uuid;

/// Opaque identifier returned by registration and used for individual
/// removal. Every registration gets a fresh id, so registering the same
/// callback twice creates two independent slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub(crate) fn new() -> Self {
        ListenerId(Uuid::new_v4())
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Type alias for callback-form listeners.
///
/// The first argument is the emitter the event was emitted on, so a callback
/// may re-enter it (register, unregister, or emit) during dispatch. The
/// second is the emitted argument payload.
pub type Callback<T> = Arc<dyn Fn(&Emitter<T>, &T) + Send + Sync>;

/// Type alias for predicates gating one-shot listeners.
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Object-form listener: one dispatch method receiving the event name along
/// with the arguments, so a single object can multiplex several event types.
pub trait EventHandler<T>: Send + Sync {
    /// Called once per matching emit with the event name and the emitted
    /// arguments.
    fn handle_event(&self, event: &str, args: &T);
}

/// A registrable listener, in either of its two forms.
pub enum Listener<T> {
    /// A plain callback, invoked with the emitter and the arguments.
    Callback(Callback<T>),
    /// A weakly-held handler object, invoked with the event name and the
    /// arguments while its target is alive.
    Handler(Weak<dyn EventHandler<T>>),
}

impl<T> Listener<T> {
    /// Wrap a plain function or closure as a callback-form listener.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&Emitter<T>, &T) + Send + Sync + 'static,
    {
        Listener::Callback(Arc::new(f))
    }

    /// Register a handler object without taking ownership of it. The
    /// registration stays invocable only while `handler` has other strong
    /// references.
    pub fn handler<H>(handler: &Arc<H>) -> Self
    where
        H: EventHandler<T> + 'static,
    {
        let weak = Arc::downgrade(handler);
        Listener::Handler(weak as Weak<dyn EventHandler<T>>)
    }

    /// Whether this listener can currently be invoked. Callbacks always can;
    /// a handler can only while its target is alive.
    pub fn is_invocable(&self) -> bool {
        match self {
            Listener::Callback(_) => true,
            Listener::Handler(weak) => weak.strong_count() > 0,
        }
    }

    /// Invoke the listener for `event` with `args`. Returns `false` when a
    /// handler-form listener's target has been dropped and nothing ran.
    pub(crate) fn invoke(&self, emitter: &Emitter<T>, event: &str, args: &T) -> bool {
        match self {
            Listener::Callback(callback) => {
                callback(emitter, args);
                true
            }
            Listener::Handler(weak) => match weak.upgrade() {
                Some(handler) => {
                    handler.handle_event(event, args);
                    true
                }
                None => false,
            },
        }
    }
}

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self {
        match self {
            Listener::Callback(callback) => Listener::Callback(Arc::clone(callback)),
            Listener::Handler(weak) => Listener::Handler(Weak::clone(weak)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        calls: AtomicUsize,
    }

    impl EventHandler<u32> for CountingHandler {
        fn handle_event(&self, _event: &str, _args: &u32) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn callback_is_always_invocable() {
        let listener: Listener<u32> = Listener::callback(|_, _| {});
        assert!(listener.is_invocable());
    }

    #[test]
    fn handler_invocability_tracks_target_liveness() {
        let handler = Arc::new(CountingHandler {
            calls: AtomicUsize::new(0),
        });
        let listener = Listener::handler(&handler);
        assert!(listener.is_invocable());

        drop(handler);
        assert!(!listener.is_invocable());
    }

    #[test]
    fn dead_handler_invoke_is_a_no_op() {
        let handler = Arc::new(CountingHandler {
            calls: AtomicUsize::new(0),
        });
        let listener = Listener::handler(&handler);
        drop(handler);

        let emitter: Emitter<u32> = Emitter::new();
        assert!(!listener.invoke(&emitter, "x", &1));
    }
}
