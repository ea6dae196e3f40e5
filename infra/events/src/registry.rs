use crate::bus::{Event, EventBus};
use crate::config::BusConfig;
use crate::error::{EventBusError, EventBusErrorExt};
use crate::shape::EventShape;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, warn};

/// Type-erased view of a bus, used for lifecycle operations that do not care
/// about the event shape.
pub(crate) trait BusHandle: Debug + Send + Sync {
    fn shape(&self) -> &'static str;

    /// Releases every binding held by the bus.
    ///
    /// Fallible so that [`BusRegistry::clear_all`] can stop at the first bus
    /// that refuses; `EventBus` itself always succeeds.
    fn clear(&self) -> Result<usize, EventBusError>;

    /// Helper to allow downcasting to the concrete `EventBus<T>`.
    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug, Default)]
struct RegistryState {
    buses: FxHashMap<TypeId, Arc<dyn BusHandle>>,
    /// Index-aligned with `handles`.
    shapes: Vec<EventShape>,
    handles: Vec<Arc<dyn BusHandle>>,
    initialized: bool,
}

/// Owns exactly one [`EventBus`] per event shape and resets them all at
/// lifecycle boundaries.
///
/// The registry is an explicit object: clone it (clones share state) or pass it
/// by reference to whoever needs a bus.
///
/// # Examples
/// ```rust
/// use herald_event_bus::{BusRegistry, Event, EventBinding, Handler, event_shapes};
///
/// #[derive(Debug, Event)]
/// struct Ping;
/// #[derive(Debug, Event)]
/// struct Pong;
///
/// # fn main() -> Result<(), herald_event_bus::EventBusError> {
/// let registry = BusRegistry::new();
/// registry.initialize(event_shapes![Ping, Pong]);
///
/// let binding = EventBinding::new(Handler::signal(|| Ok(())));
/// registry.bus::<Ping>()?.register(&binding)?;
///
/// assert_eq!(registry.clear_all()?, 1);
/// assert_eq!(registry.bus::<Ping>()?.raise(&Ping)?, 0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct BusRegistry {
    state: Arc<RwLock<RegistryState>>,
    config: BusConfig,
}

impl BusRegistry {
    /// Creates an empty registry whose buses tolerate double registration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry; every bus it builds uses `config`.
    #[must_use]
    pub fn with_config(config: BusConfig) -> Self {
        Self { state: Arc::default(), config }
    }

    /// Returns the bus for `T`, creating it on first use.
    ///
    /// Every call for the same `T` returns a handle to the same bus.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] if the slot for `T` holds a bus of
    /// another shape.
    pub fn bus<T: Event>(&self) -> Result<EventBus<T>, EventBusError> {
        let id = TypeId::of::<T>();

        let existing = self.state.read().buses.get(&id).cloned();
        let handle = existing.unwrap_or_else(|| {
            let mut state = self.state.write();
            Arc::clone(
                state.buses.entry(id).or_insert_with(|| EventShape::of::<T>().create(self.config)),
            )
        });

        handle.as_any().downcast_ref::<EventBus<T>>().cloned().ok_or_else(|| {
            EventBusError::TypeMismatch {
                message: std::any::type_name::<T>().into(),
                context: Some(format!("Slot holds a bus for {}", handle.shape()).into()),
            }
        })
    }

    /// Records the shapes of this program and materializes one bus for each.
    ///
    /// Calling it again replaces the recorded lists instead of merging them.
    /// Buses that already exist are reused as they are: their bindings are kept.
    /// A shape listed more than once is recorded once.
    pub fn initialize<I>(&self, shapes: I)
    where
        I: IntoIterator<Item = EventShape>,
    {
        let mut state = self.state.write();

        let mut recorded: Vec<EventShape> = Vec::new();
        let mut handles = Vec::new();
        for shape in shapes {
            if recorded.contains(&shape) {
                warn!(event = shape.name(), "Event shape listed twice; recording it once");
                continue;
            }
            let handle = state.buses.entry(shape.id()).or_insert_with(|| shape.create(self.config));
            handles.push(Arc::clone(handle));
            recorded.push(shape);
        }

        debug!(shapes = recorded.len(), "Bus registry initialized");
        state.shapes = recorded;
        state.handles = handles;
        state.initialized = true;
    }

    /// Clears every recorded bus. Returns how many bindings were released.
    ///
    /// Before [`initialize`](Self::initialize), or with an empty shape list, there
    /// is nothing to clear and `Ok(0)` is returned. Buses obtained through
    /// [`bus`](Self::bus) but absent from the shape list are left untouched.
    ///
    /// # Errors
    /// Stops at the first bus that fails to clear and returns its error; later
    /// buses are not touched.
    pub fn clear_all(&self) -> Result<usize, EventBusError> {
        let handles = {
            let state = self.state.read();
            if !state.initialized || state.shapes.is_empty() {
                debug!("Bus registry has nothing to clear");
                return Ok(0);
            }
            state.handles.clone()
        };

        let mut released = 0;
        for handle in &handles {
            released += handle.clear().context(format!("Clearing bus for {}", handle.shape()))?;
        }

        debug!(buses = handles.len(), released, "Bus registry cleared");
        Ok(released)
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.read().initialized
    }

    /// Names of the recorded shapes, in the order they were supplied.
    #[must_use]
    pub fn shapes(&self) -> Vec<&'static str> {
        self.state.read().shapes.iter().map(EventShape::name).collect()
    }

    /// Number of recorded shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub const fn config(&self) -> BusConfig {
        self.config
    }
}
