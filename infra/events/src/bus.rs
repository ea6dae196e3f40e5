use crate::binding::{BindingInner, EventBinding};
use crate::config::{BusConfig, DuplicatePolicy};
use crate::error::EventBusError;
use crate::registry::BusHandle;
use fxhash::FxHashSet;
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

/// Marker trait for types that can be raised on an [`EventBus`].
///
/// Implement it with `#[derive(Event)]`. Events are plain data; the trait has no
/// methods, it only tags the type as eligible for delivery.
pub trait Event: Any + Send + Sync {}

/// Membership set of weakly-held bindings.
///
/// Entries are keyed by allocation address. A stored `Weak` keeps the
/// allocation itself reserved, so an address cannot be reused by another
/// binding while its entry is still present.
struct BindingSet<T> {
    entries: Vec<Weak<BindingInner<T>>>,
    members: FxHashSet<usize>,
}

impl<T> BindingSet<T> {
    fn new() -> Self {
        Self { entries: Vec::new(), members: FxHashSet::default() }
    }

    fn insert(&mut self, binding: Weak<BindingInner<T>>) -> bool {
        if !self.members.insert(address(&binding)) {
            return false;
        }
        self.entries.push(binding);
        true
    }

    fn remove(&mut self, key: usize) -> bool {
        if !self.members.remove(&key) {
            return false;
        }
        self.entries.retain(|entry| address(entry) != key);
        true
    }

    fn contains(&self, key: usize) -> bool {
        self.members.contains(&key)
    }

    fn snapshot(&self) -> Vec<Weak<BindingInner<T>>> {
        self.entries.clone()
    }

    fn clear(&mut self) -> usize {
        let released = self.entries.len();
        self.entries.clear();
        self.members.clear();
        released
    }

    /// Drops entries whose binding was released without being deregistered.
    fn prune(&mut self) -> usize {
        let before = self.entries.len();
        let members = &mut self.members;
        self.entries.retain(|entry| {
            let alive = entry.strong_count() > 0;
            if !alive {
                members.remove(&address(entry));
            }
            alive
        });
        before - self.entries.len()
    }

    fn live_len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.strong_count() > 0).count()
    }
}

fn address<T>(binding: &Weak<BindingInner<T>>) -> usize {
    binding.as_ptr().addr()
}

struct BusInner<T> {
    bindings: RwLock<BindingSet<T>>,
    config: BusConfig,
}

/// The bus for one event shape `T`: the set of registered bindings plus dispatch.
///
/// Buses are obtained from a [`BusRegistry`](crate::BusRegistry), which hands out
/// exactly one bus per shape; `EventBus` itself is a cheap handle and all clones
/// address the same binding set.
///
/// The bus never owns a binding. It keeps weak references, so consumers stay
/// responsible for calling [`EventBus::deregister`]; a binding dropped without
/// it simply stops firing.
///
/// The order in which bindings are dispatched is not part of the contract.
///
/// # Examples
/// ```rust
/// use herald_event_bus::{BusRegistry, Event, EventBinding, Handler};
///
/// #[derive(Debug, Event)]
/// struct Ping {
///     value: i32,
/// }
///
/// # fn main() -> Result<(), herald_event_bus::EventBusError> {
/// let registry = BusRegistry::new();
/// let bus = registry.bus::<Ping>()?;
///
/// let binding = EventBinding::new(Handler::payload(|ping: &Ping| {
///     assert_eq!(ping.value, 7);
///     Ok(())
/// }));
/// bus.register(&binding)?;
/// assert_eq!(bus.raise(&Ping { value: 7 })?, 1);
///
/// bus.deregister(&binding);
/// assert_eq!(bus.raise(&Ping { value: 8 })?, 0);
/// # Ok(())
/// # }
/// ```
pub struct EventBus<T> {
    inner: Arc<BusInner<T>>,
}

impl<T: Event> EventBus<T> {
    pub(crate) fn new(config: BusConfig) -> Self {
        trace!(event = std::any::type_name::<T>(), "Initializing new event bus");
        Self { inner: Arc::new(BusInner { bindings: RwLock::new(BindingSet::new()), config }) }
    }

    /// Adds `binding` to the bus.
    ///
    /// Entries of bindings dropped without deregistering are pruned first, so a
    /// bus that is never raised does not keep their allocations alive.
    ///
    /// Registering the same binding twice keeps a single entry. It is treated as
    /// misuse: logged, and rejected when the bus was built with
    /// [`DuplicatePolicy::Reject`].
    ///
    /// # Errors
    /// Returns [`EventBusError::DuplicateRegistration`] for a repeated registration
    /// under [`DuplicatePolicy::Reject`].
    pub fn register(&self, binding: &EventBinding<T>) -> Result<(), EventBusError> {
        let (pruned, inserted) = {
            let mut bindings = self.inner.bindings.write();
            let pruned = bindings.prune();
            (pruned, bindings.insert(binding.weak_inner()))
        };
        if pruned > 0 {
            debug!(event = std::any::type_name::<T>(), pruned, "Pruned dropped bindings");
        }
        if inserted {
            trace!(event = std::any::type_name::<T>(), "Binding registered");
            return Ok(());
        }

        warn!(
            event = std::any::type_name::<T>(),
            "Binding registered twice; keeping a single entry"
        );
        match self.inner.config.duplicate_registration {
            DuplicatePolicy::Tolerate => Ok(()),
            DuplicatePolicy::Reject => Err(EventBusError::DuplicateRegistration {
                message: std::any::type_name::<T>().into(),
                context: Some("Binding is already registered".into()),
            }),
        }
    }

    /// Removes `binding` from the bus. Returns `false` if it was not registered.
    pub fn deregister(&self, binding: &EventBinding<T>) -> bool {
        let removed = self.inner.bindings.write().remove(address(&binding.weak_inner()));
        if removed {
            trace!(event = std::any::type_name::<T>(), "Binding deregistered");
        }
        removed
    }

    /// Delivers `event` to every binding registered when the call starts.
    ///
    /// The binding set is copied first. Before each binding runs, and again
    /// before each of its handlers, live membership is checked: a binding
    /// deregistered by a handler of this raise (itself included) fires nothing
    /// more, and a binding registered during this raise is not part of the
    /// copy. For each binding the payload handlers run first, then the signal
    /// handlers. No lock is held while handlers run, so
    /// handlers may register, deregister or raise (re-entrantly) on any bus.
    ///
    /// Returns the number of bindings dispatched.
    ///
    /// # Errors
    /// Returns [`EventBusError::Handler`] for the first failing handler. Bindings
    /// after it are not invoked for this call.
    pub fn raise(&self, event: &T) -> Result<usize, EventBusError> {
        let snapshot = self.inner.bindings.read().snapshot();

        let mut dispatched = 0;
        let mut stale = false;
        for entry in &snapshot {
            let key = address(entry);
            if !self.is_member(key) {
                trace!(
                    event = std::any::type_name::<T>(),
                    "Binding left the bus during dispatch; skipping"
                );
                continue;
            }
            let Some(binding) = entry.upgrade() else {
                stale = true;
                continue;
            };

            dispatched += 1;
            binding.dispatch(event, || self.is_member(key)).map_err(handler_error::<T>)?;
        }

        if stale {
            let pruned = self.inner.bindings.write().prune();
            debug!(event = std::any::type_name::<T>(), pruned, "Pruned dropped bindings");
        }

        trace!(event = std::any::type_name::<T>(), dispatched, "Event dispatched");
        Ok(dispatched)
    }

    fn is_member(&self, key: usize) -> bool {
        self.inner.bindings.read().contains(key)
    }

    /// Releases every binding. Reserved for lifecycle resets through the registry.
    pub(crate) fn clear(&self) -> usize {
        let released = self.inner.bindings.write().clear();
        debug!(event = std::any::type_name::<T>(), released, "Event bus cleared");
        released
    }

    /// Returns `true` if `binding` is currently registered.
    #[must_use]
    pub fn contains(&self, binding: &EventBinding<T>) -> bool {
        self.inner.bindings.read().contains(address(&binding.weak_inner()))
    }

    /// Number of registered bindings that are still alive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.bindings.read().live_len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The event shape this bus carries.
    #[must_use]
    pub fn shape(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    /// Returns `true` if both handles refer to the same bus.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

fn handler_error<T>(source: crate::HandlerError) -> EventBusError {
    EventBusError::Handler { source, context: Some(std::any::type_name::<T>().into()) }
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T> fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("event", &std::any::type_name::<T>())
            .field("bindings", &self.inner.bindings.read().entries.len())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl<T: Event> BusHandle for EventBus<T> {
    fn shape(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn clear(&self) -> Result<usize, EventBusError> {
        Ok(Self::clear(self))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
