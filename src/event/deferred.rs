//! Future-based one-shot registrations.
//!
//! Instead of supplying a callback, a caller may take a [`Deferred`] that
//! resolves with a clone of the emitted arguments on the first (matching)
//! emit of its event.

use crate::event::emitter::{Delivery, Emitter};
use crate::event::listener::{Listener, ListenerId};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// A pending one-shot wait on an event.
///
/// Resolves to `Some(args)` on the first emit that matches the registration
/// (any emit for [`once_deferred`](Emitter::once_deferred), the first
/// predicate-satisfying emit for
/// [`once_deferred_when`](Emitter::once_deferred_when)). Resolves to `None`
/// when the backing registration is removed before a match, whether by
/// `off`, `off_event`, `off_all`, or the emitter being dropped.
pub struct Deferred<T> {
    id: ListenerId,
    rx: oneshot::Receiver<T>,
}

impl<T> Deferred<T> {
    /// The id of the backing registration. Passing it to
    /// [`Emitter::off`](Emitter::off) cancels the wait.
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl<T> Future for Deferred<T> {
    type Output = Option<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|result| result.ok())
    }
}

impl<T: Clone + Send + Sync + 'static> Emitter<T> {
    /// Register a one-shot wait on `event`, resolved by the next emit.
    pub fn once_deferred(&self, event: &str) -> Deferred<T> {
        self.deferred(event, Delivery::Once)
    }

    /// Register a predicate-gated one-shot wait on `event`, resolved by the
    /// first emit whose arguments satisfy `when`. Non-matching emits leave
    /// the wait pending.
    pub fn once_deferred_when<P>(&self, event: &str, when: P) -> Deferred<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.deferred(event, Delivery::OnceWhen(Arc::new(when)))
    }

    fn deferred(&self, event: &str, delivery: Delivery<T>) -> Deferred<T> {
        let (tx, rx) = oneshot::channel();
        // The sender lives inside the registered callback; removing the
        // registration drops it, which resolves the receiver with `None`.
        let slot = Mutex::new(Some(tx));
        let listener = Listener::callback(move |_: &Emitter<T>, args: &T| {
            let sender = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
            if let Some(sender) = sender {
                // The receiver may have been dropped by an impatient caller.
                let _ = sender.send(args.clone());
            }
        });
        let id = self.register(event, listener, delivery);
        Deferred { id, rx }
    }
}
