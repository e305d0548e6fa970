//! A synchronous publish/subscribe event emitter.
//!
//! An [`Emitter`] maps event names to ordered listener sequences. Emitting an
//! event invokes every listener registered for that name, in registration
//! order, on the calling thread. Listeners may be plain callbacks or
//! capability objects (one dispatch method multiplexing several event types),
//! and may be registered as one-shot, optionally gated on a predicate over
//! the emitted arguments.
//!
//! ```
//! use emitter::{Emitter, Listener};
//!
//! let emitter: Emitter<u32> = Emitter::new();
//! let id = emitter
//!     .on("tick", Listener::callback(|_, n| println!("tick {n}")))
//!     .unwrap();
//!
//! emitter.emit("tick", 1);
//! emitter.off("tick", id);
//! assert_eq!(emitter.count("tick"), 0);
//! ```
//!
//! Any type can acquire the emitter surface by composing an [`Emitter`] and
//! implementing [`Observable`].

pub mod event;
pub mod utils;

pub use event::deferred::Deferred;
pub use event::emitter::Emitter;
pub use event::listener::{Callback, EventHandler, Listener, ListenerId, Predicate};
pub use event::observable::Observable;
pub use utils::error::{EmitterError, Result};
