use crate::bus::Event;
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};

/// The error a handler reports when it cannot process an event.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What every handler returns. `Ok(())` means the handler completed.
pub type HandlerResult = Result<(), HandlerError>;

type PayloadFn<T> = Arc<dyn Fn(&T) -> HandlerResult + Send + Sync>;
type SignalFn = Arc<dyn Fn() -> HandlerResult + Send + Sync>;

enum HandlerKind<T> {
    Payload(PayloadFn<T>),
    Signal(SignalFn),
}

/// A single handler function, either receiving the raised value (`payload`) or
/// just being notified that a value was raised (`signal`).
///
/// Handlers compare by identity: a clone equals its original, while two handlers
/// built from identical closures are distinct. Keep a clone around to
/// [`remove`](EventBinding::remove) it later.
pub struct Handler<T> {
    kind: HandlerKind<T>,
}

impl<T: Event> Handler<T> {
    /// Wraps a handler that receives the raised value.
    pub fn payload<F>(handler: F) -> Self
    where
        F: Fn(&T) -> HandlerResult + Send + Sync + 'static,
    {
        Self { kind: HandlerKind::Payload(Arc::new(handler)) }
    }

    /// Wraps a handler that fires on every raise without looking at the value.
    pub fn signal<F>(handler: F) -> Self
    where
        F: Fn() -> HandlerResult + Send + Sync + 'static,
    {
        Self { kind: HandlerKind::Signal(Arc::new(handler)) }
    }

    #[must_use]
    pub const fn is_payload(&self) -> bool {
        matches!(self.kind, HandlerKind::Payload(_))
    }

    #[must_use]
    pub const fn is_signal(&self) -> bool {
        matches!(self.kind, HandlerKind::Signal(_))
    }
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            HandlerKind::Payload(f) => HandlerKind::Payload(Arc::clone(f)),
            HandlerKind::Signal(f) => HandlerKind::Signal(Arc::clone(f)),
        };
        Self { kind }
    }
}

impl<T> PartialEq for Handler<T> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (HandlerKind::Payload(a), HandlerKind::Payload(b)) => Arc::ptr_eq(a, b),
            (HandlerKind::Signal(a), HandlerKind::Signal(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<T> Eq for Handler<T> {}

impl<T> fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            HandlerKind::Payload(_) => "payload",
            HandlerKind::Signal(_) => "signal",
        };
        f.debug_struct("Handler").field("kind", &kind).finish_non_exhaustive()
    }
}

pub(crate) struct BindingInner<T> {
    payload: RwLock<Vec<PayloadFn<T>>>,
    signal: RwLock<Vec<SignalFn>>,
}

impl<T> BindingInner<T> {
    /// Handler lists are copied out before running so a handler may edit its own binding.
    pub(crate) fn invoke_with_payload(&self, event: &T) -> HandlerResult {
        let handlers = self.payload.read().clone();
        for handler in &handlers {
            handler(event)?;
        }
        Ok(())
    }

    pub(crate) fn invoke_no_payload(&self) -> HandlerResult {
        let handlers = self.signal.read().clone();
        for handler in &handlers {
            handler()?;
        }
        Ok(())
    }

    /// Payload handlers, then signal handlers, as long as `registered` holds.
    ///
    /// Each list is copied when its phase starts, so signal handlers added by a
    /// payload handler of this call still fire. `registered` is consulted before
    /// every handler, so a binding that leaves its bus halfway through stops
    /// firing at once.
    pub(crate) fn dispatch(&self, event: &T, registered: impl Fn() -> bool) -> HandlerResult {
        let payload = self.payload.read().clone();
        for handler in &payload {
            if !registered() {
                return Ok(());
            }
            handler(event)?;
        }

        let signal = self.signal.read().clone();
        for handler in &signal {
            if !registered() {
                return Ok(());
            }
            handler()?;
        }
        Ok(())
    }
}

/// A bundle of handlers for one event shape, registered on an [`EventBus`](crate::EventBus)
/// as a single unit.
///
/// `EventBinding` is a cheap handle: clones refer to the same binding, and a bus
/// only ever holds a weak reference to it. Dropping the last handle ends the
/// binding even if it is still registered somewhere.
///
/// # Examples
/// ```rust
/// use herald_event_bus::{Event, EventBinding, Handler};
///
/// #[derive(Debug, Event)]
/// struct Ping(u32);
///
/// let binding = EventBinding::new(Handler::payload(|ping: &Ping| {
///     assert_eq!(ping.0, 7);
///     Ok(())
/// }));
/// binding.add(Handler::signal(|| Ok(())));
///
/// binding.invoke_with_payload(&Ping(7)).unwrap();
/// binding.invoke_no_payload().unwrap();
/// ```
pub struct EventBinding<T> {
    inner: Arc<BindingInner<T>>,
}

impl<T: Event> EventBinding<T> {
    /// Creates a binding holding exactly one handler.
    #[must_use]
    pub fn new(handler: Handler<T>) -> Self {
        let binding = Self {
            inner: Arc::new(BindingInner {
                payload: RwLock::new(Vec::new()),
                signal: RwLock::new(Vec::new()),
            }),
        };
        binding.add(handler);
        binding
    }

    /// Appends a handler. The same handler added twice fires twice.
    pub fn add(&self, handler: Handler<T>) {
        match handler.kind {
            HandlerKind::Payload(f) => self.inner.payload.write().push(f),
            HandlerKind::Signal(f) => self.inner.signal.write().push(f),
        }
    }

    /// Removes the first entry equal to `handler`.
    ///
    /// Returns `false` when the handler was not part of this binding.
    pub fn remove(&self, handler: &Handler<T>) -> bool {
        match &handler.kind {
            HandlerKind::Payload(f) => remove_first(&mut self.inner.payload.write(), f),
            HandlerKind::Signal(f) => remove_first(&mut self.inner.signal.write(), f),
        }
    }

    /// Runs every payload handler in insertion order, stopping at the first failure.
    ///
    /// # Errors
    /// Returns the first error reported by a handler.
    pub fn invoke_with_payload(&self, event: &T) -> HandlerResult {
        self.inner.invoke_with_payload(event)
    }

    /// Runs every signal handler in insertion order, stopping at the first failure.
    ///
    /// # Errors
    /// Returns the first error reported by a handler.
    pub fn invoke_no_payload(&self) -> HandlerResult {
        self.inner.invoke_no_payload()
    }

    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.inner.payload.read().len()
    }

    #[must_use]
    pub fn signal_len(&self) -> usize {
        self.inner.signal.read().len()
    }

    /// `true` when the binding has no handlers at all and would never fire.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload_len() == 0 && self.signal_len() == 0
    }

    /// Returns `true` if both handles refer to the same binding.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Creates a handle that does not keep the binding alive.
    ///
    /// Useful for handlers that need to deregister their own binding.
    #[must_use]
    pub fn downgrade(&self) -> WeakEventBinding<T> {
        WeakEventBinding { inner: Arc::downgrade(&self.inner) }
    }

    pub(crate) fn weak_inner(&self) -> Weak<BindingInner<T>> {
        Arc::downgrade(&self.inner)
    }
}

fn remove_first<F: ?Sized>(handlers: &mut Vec<Arc<F>>, target: &Arc<F>) -> bool {
    let Some(index) = handlers.iter().position(|h| Arc::ptr_eq(h, target)) else {
        return false;
    };
    handlers.remove(index);
    true
}

impl<T> Clone for EventBinding<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T> PartialEq for EventBinding<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for EventBinding<T> {}

impl<T> fmt::Debug for EventBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBinding")
            .field("event", &std::any::type_name::<T>())
            .field("payload", &self.inner.payload.read().len())
            .field("signal", &self.inner.signal.read().len())
            .finish()
    }
}

/// A non-owning handle to an [`EventBinding`].
pub struct WeakEventBinding<T> {
    inner: Weak<BindingInner<T>>,
}

impl<T> WeakEventBinding<T> {
    /// Returns the binding if any strong handle is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<EventBinding<T>> {
        self.inner.upgrade().map(|inner| EventBinding { inner })
    }
}

impl<T> Clone for WeakEventBinding<T> {
    fn clone(&self) -> Self {
        Self { inner: Weak::clone(&self.inner) }
    }
}

impl<T> fmt::Debug for WeakEventBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakEventBinding")
            .field("event", &std::any::type_name::<T>())
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq, crate::Event)]
    struct Ping(u32);

    fn recorder() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn test_new_seeds_matching_collection() {
        let payload = EventBinding::new(Handler::payload(|_: &Ping| Ok(())));
        assert_eq!((payload.payload_len(), payload.signal_len()), (1, 0));

        let signal = EventBinding::<Ping>::new(Handler::signal(|| Ok(())));
        assert_eq!((signal.payload_len(), signal.signal_len()), (0, 1));
    }

    #[test]
    fn test_invocation_follows_insertion_order() {
        let log = recorder();
        let (a, b) = (log.clone(), log.clone());
        let binding = EventBinding::new(Handler::payload(move |p: &Ping| {
            a.lock().push(format!("first:{}", p.0));
            Ok(())
        }));
        binding.add(Handler::payload(move |p: &Ping| {
            b.lock().push(format!("second:{}", p.0));
            Ok(())
        }));

        binding.invoke_with_payload(&Ping(3)).unwrap();
        assert_eq!(*log.lock(), vec!["first:3", "second:3"]);
    }

    #[test]
    fn test_same_handler_added_twice_fires_twice() {
        let log = recorder();
        let sink = log.clone();
        let handler = Handler::<Ping>::signal(move || {
            sink.lock().push("tick".to_owned());
            Ok(())
        });
        let binding = EventBinding::new(handler.clone());
        binding.add(handler.clone());

        binding.invoke_no_payload().unwrap();
        assert_eq!(log.lock().len(), 2);

        assert!(binding.remove(&handler));
        binding.invoke_no_payload().unwrap();
        assert_eq!(log.lock().len(), 3, "only one copy should be removed");
    }

    #[test]
    fn test_remove_absent_handler_is_noop() {
        let binding = EventBinding::new(Handler::payload(|_: &Ping| Ok(())));
        let stranger = Handler::payload(|_: &Ping| Ok(()));
        assert!(!binding.remove(&stranger));
        assert_eq!(binding.payload_len(), 1);

        let signal = Handler::signal(|| Ok(()));
        assert!(!binding.remove(&signal));
    }

    #[test]
    fn test_identical_closures_are_distinct_handlers() {
        let a = Handler::payload(|_: &Ping| Ok(()));
        let b = Handler::payload(|_: &Ping| Ok(()));
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_failure_stops_remaining_handlers() {
        let log = recorder();
        let sink = log.clone();
        let binding = EventBinding::new(Handler::payload(|_: &Ping| Err("boom".into())));
        binding.add(Handler::payload(move |_: &Ping| {
            sink.lock().push("unreachable".to_owned());
            Ok(())
        }));

        let err = binding.invoke_with_payload(&Ping(1)).unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_handler_added_during_invocation_waits_for_next_call() {
        let log = recorder();
        let binding = EventBinding::<Ping>::new(Handler::signal(|| Ok(())));
        let weak = binding.downgrade();
        let sink = log.clone();
        binding.add(Handler::signal(move || {
            let sink = sink.clone();
            if let Some(binding) = weak.upgrade() {
                binding.add(Handler::signal(move || {
                    sink.lock().push("late".to_owned());
                    Ok(())
                }));
            }
            Ok(())
        }));

        binding.invoke_no_payload().unwrap();
        assert!(log.lock().is_empty());
        assert_eq!(binding.signal_len(), 3);

        binding.invoke_no_payload().unwrap();
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn test_identity_and_weak_handles() {
        let binding = EventBinding::new(Handler::payload(|_: &Ping| Ok(())));
        let twin = EventBinding::new(Handler::payload(|_: &Ping| Ok(())));
        assert_eq!(binding, binding.clone());
        assert_ne!(binding, twin);

        let weak = binding.downgrade();
        assert!(weak.upgrade().is_some_and(|b| b.ptr_eq(&binding)));
        drop(binding);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_empty_after_removing_everything() {
        let handler = Handler::payload(|_: &Ping| Ok(()));
        let binding = EventBinding::new(handler.clone());
        assert!(!binding.is_empty());
        assert!(binding.remove(&handler));
        assert!(binding.is_empty());
        binding.invoke_with_payload(&Ping(0)).unwrap();
    }

    #[test]
    fn test_dispatch_runs_signals_added_by_payload_handlers() {
        let log = recorder();
        let binding = EventBinding::new(Handler::payload(|_: &Ping| Ok(())));
        let weak = binding.downgrade();
        let sink = log.clone();
        binding.add(Handler::payload(move |_: &Ping| {
            let sink = sink.clone();
            if let Some(binding) = weak.upgrade()
                && binding.signal_len() == 0
            {
                binding.add(Handler::signal(move || {
                    sink.lock().push("signal".to_owned());
                    Ok(())
                }));
            }
            Ok(())
        }));

        binding.inner.dispatch(&Ping(1), || true).unwrap();
        assert_eq!(*log.lock(), vec!["signal"]);
    }
}
