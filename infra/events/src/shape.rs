use crate::bus::{Event, EventBus};
use crate::config::BusConfig;
use crate::registry::BusHandle;
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identifies one event shape and knows how to build its bus.
///
/// Shapes are listed explicitly at startup and handed to
/// [`BusRegistry::initialize`](crate::BusRegistry::initialize); see
/// [`event_shapes!`](crate::event_shapes) for the usual way to write that list.
/// Two shapes are equal when they describe the same Rust type.
#[derive(Clone, Copy)]
pub struct EventShape {
    id: TypeId,
    name: &'static str,
    factory: fn(BusConfig) -> Arc<dyn BusHandle>,
}

impl EventShape {
    #[must_use]
    pub fn of<T: Event>() -> Self {
        Self { id: TypeId::of::<T>(), name: std::any::type_name::<T>(), factory: new_bus::<T> }
    }

    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn create(&self, config: BusConfig) -> Arc<dyn BusHandle> {
        (self.factory)(config)
    }
}

fn new_bus<T: Event>(config: BusConfig) -> Arc<dyn BusHandle> {
    Arc::new(EventBus::<T>::new(config))
}

impl PartialEq for EventShape {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventShape {}

impl Hash for EventShape {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventShape").field(&self.name).finish()
    }
}

/// Builds a `Vec<EventShape>` from a list of event types.
///
/// ```rust
/// use herald_event_bus::{Event, event_shapes};
///
/// #[derive(Debug, Event)]
/// struct Ping;
/// #[derive(Debug, Event)]
/// struct Pong;
///
/// let shapes = event_shapes![Ping, Pong];
/// assert_eq!(shapes.len(), 2);
/// ```
#[macro_export]
macro_rules! event_shapes {
    ($($shape:ty),* $(,)?) => {
        ::std::vec![$($crate::EventShape::of::<$shape>()),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, crate::Event)]
    struct Ping;

    #[derive(Debug, crate::Event)]
    struct Pong;

    #[test]
    fn test_shapes_compare_by_type() {
        assert_eq!(EventShape::of::<Ping>(), EventShape::of::<Ping>());
        assert_ne!(EventShape::of::<Ping>(), EventShape::of::<Pong>());
        assert!(EventShape::of::<Pong>().name().ends_with("Pong"));
    }

    #[test]
    fn test_factory_builds_bus_for_shape() {
        let handle = EventShape::of::<Ping>().create(BusConfig::default());
        assert!(handle.as_any().downcast_ref::<EventBus<Ping>>().is_some());
        assert_eq!(handle.shape(), std::any::type_name::<Ping>());
    }

    #[test]
    fn test_macro_keeps_listed_order() {
        let shapes = crate::event_shapes![Pong, Ping,];
        assert_eq!(shapes, vec![EventShape::of::<Pong>(), EventShape::of::<Ping>()]);
    }
}
