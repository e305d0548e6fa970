//! Error types for the emitter crate.

use thiserror::Error;

/// Errors raised by emitter operations.
///
/// Registration is the only fallible operation; everything else
/// (unregistering an untracked listener, emitting with no listeners) is a
/// silent no-op.
#[derive(Error, Debug)]
pub enum EmitterError {
    /// The supplied listener is not invocable. Raised by registration when a
    /// handler-form listener's target has already been dropped.
    #[error("listener for event '{0}' is not invocable: handler has been dropped")]
    InvalidListener(String),
}

/// Convenience result type for emitter operations.
pub type Result<T> = std::result::Result<T, EmitterError>;
