//! # Event Bus
//!
//! A synchronous, type-safe, in-process event bus with one bus per event shape.
//!
//! ## Overview
//!
//! * [`EventBinding`] bundles handlers for one event shape: payload handlers
//!   receive the raised value, signal handlers only learn that it happened.
//! * [`EventBus`] holds the bindings registered for its shape and dispatches
//!   raised values to them.
//! * [`BusRegistry`] hands out exactly one bus per shape, records the shapes of
//!   the program ([`EventShape`], [`event_shapes!`]) and clears every bus at
//!   lifecycle boundaries.
//!
//! ## Dispatch
//!
//! [`EventBus::raise`] copies the binding set, then re-checks live membership
//! before each handler runs. Handlers can therefore register, deregister
//! (themselves included) and raise further events while a raise is in
//! progress. The first handler failure ends the raise and comes back as
//! [`EventBusError::Handler`]; there is no isolation or retry.
//!
//! ## Threading
//!
//! Everything is synchronous and handlers run on the caller's thread. Buses,
//! bindings and the registry guard their state with `parking_lot` locks and
//! never hold them while handlers run, so handles may be shared across threads.
//!
//! # Example
//!
//! ```rust
//! use herald_event_bus::{BusRegistry, Event, EventBinding, EventBusError, Handler, event_shapes};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI32, Ordering};
//!
//! #[derive(Debug, Clone, Event)]
//! struct UserCreated {
//!     id: i32,
//! }
//!
//! fn main() -> Result<(), EventBusError> {
//!     let registry = BusRegistry::new();
//!     registry.initialize(event_shapes![UserCreated]);
//!
//!     let seen = Arc::new(AtomicI32::new(0));
//!     let sink = seen.clone();
//!     let binding = EventBinding::new(Handler::payload(move |event: &UserCreated| {
//!         sink.store(event.id, Ordering::SeqCst);
//!         Ok(())
//!     }));
//!
//!     let bus = registry.bus::<UserCreated>()?;
//!     bus.register(&binding)?;
//!     bus.raise(&UserCreated { id: 42 })?;
//!     assert_eq!(seen.load(Ordering::SeqCst), 42);
//!
//!     registry.clear_all()?;
//!     Ok(())
//! }
//! ```

#[cfg(test)]
extern crate self as herald_event_bus;

mod binding;
mod bus;
mod config;
mod error;
mod registry;
mod shape;

pub use binding::{EventBinding, Handler, HandlerError, HandlerResult, WeakEventBinding};
pub use bus::{Event, EventBus};
pub use config::{BusConfig, DuplicatePolicy};
pub use error::{EventBusError, EventBusErrorExt};
pub use herald_derive::Event;
pub use registry::BusRegistry;
pub use shape::EventShape;
