use crate::binding::HandlerError;
use std::borrow::Cow;

/// Errors that can occur during event bus operations.
#[herald_derive::herald_error]
pub enum EventBusError {
    /// A handler returned an error while an event was being raised.
    /// Dispatch stops at the failing binding; the rest of the snapshot is skipped.
    #[error("Handler failed{}: {source}", format_context(.context))]
    Handler { source: HandlerError, context: Option<Cow<'static, str>> },

    /// The exact same binding was registered twice while the bus rejects duplicates.
    #[error("Duplicate registration{}: {message}", format_context(.context))]
    DuplicateRegistration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Occurs when an internal dynamic cast fails.
    /// This usually indicates an invariant violation in the bus registry.
    #[error("Type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A bus refused to release its bindings during a lifecycle reset.
    #[error("Clear failed{}: {message}", format_context(.context))]
    Clear { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
