//! Capability trait for entities that own an emitter.
//!
//! Any type acquires the full publish/subscribe surface by holding an
//! [`Emitter`] and implementing the single accessor; the provided methods
//! delegate to it. This replaces attaching a registry to arbitrary foreign
//! objects at runtime: the capability is acquired by composition instead.

use crate::event::emitter::Emitter;
use crate::event::listener::{Listener, ListenerId};
use crate::utils::error::Result;

/// The publish/subscribe capability: `on`, `once`, `off`, `emit`, `count`.
pub trait Observable<T: Clone + Send + Sync + 'static> {
    /// The emitter backing this entity's events.
    fn emitter(&self) -> &Emitter<T>;

    /// Register a listener for `event`. See [`Emitter::on`].
    fn on(&self, event: &str, listener: Listener<T>) -> Result<ListenerId> {
        self.emitter().on(event, listener)
    }

    /// Register a one-shot listener for `event`. See [`Emitter::once`].
    fn once(&self, event: &str, listener: Listener<T>) -> Result<ListenerId> {
        self.emitter().once(event, listener)
    }

    /// Register a predicate-gated one-shot listener for `event`. See
    /// [`Emitter::once_when`].
    fn once_when<P>(&self, event: &str, when: P, listener: Listener<T>) -> Result<ListenerId>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.emitter().once_when(event, when, listener)
    }

    /// Remove one registration from `event`. See [`Emitter::off`].
    fn off(&self, event: &str, id: ListenerId) -> bool {
        self.emitter().off(event, id)
    }

    /// Remove all listeners for `event`. See [`Emitter::off_event`].
    fn off_event(&self, event: &str) {
        self.emitter().off_event(event)
    }

    /// Remove all listeners for all events. See [`Emitter::off_all`].
    fn off_all(&self) {
        self.emitter().off_all()
    }

    /// Emit `event` with `args` to every registered listener. See
    /// [`Emitter::emit`].
    fn emit(&self, event: &str, args: T) -> usize {
        self.emitter().emit(event, args)
    }

    /// The number of listeners registered for `event`. See
    /// [`Emitter::count`].
    fn count(&self, event: &str) -> usize {
        self.emitter().count(event)
    }
}
