//! Event emitter module.
//!
//! This module provides an in-memory publish-subscribe registry mapping event
//! names to ordered listener sequences, with synchronous delivery on the
//! emitting thread.

pub mod deferred;
pub mod emitter;
pub mod listener;
pub mod observable;

pub use deferred::Deferred;
pub use emitter::Emitter;
pub use listener::{Callback, EventHandler, Listener, ListenerId, Predicate};
pub use observable::Observable;
