//! Facade crate for the Herald event bus.
//! Re-exports the bus and composes configuration, logging and registry setup.
//! Keep this crate thin: it should wire other crates together, not implement dispatch.
//!
//! ## Usage
//! - Load a [`HeraldConfig`] with [`config::load_config`] (file + `HERALD__*` env).
//! - Call [`logging::init`] once and keep the returned guard.
//! - Call [`bootstrap`] with the event shapes of the program, then hand the
//!   [`BusRegistry`] to whoever raises or subscribes.
//!
//! ```rust
//! use herald::{Event, EventBinding, Handler, HeraldConfig, HeraldError, event_shapes};
//!
//! #[derive(Debug, Event)]
//! struct Started;
//!
//! fn main() -> Result<(), HeraldError> {
//!     let registry = herald::bootstrap(&HeraldConfig::default(), event_shapes![Started]);
//!
//!     let binding = EventBinding::new(Handler::signal(|| Ok(())));
//!     let bus = registry.bus::<Started>()?;
//!     bus.register(&binding)?;
//!     assert_eq!(bus.raise(&Started)?, 1);
//!
//!     registry.clear_all()?;
//!     Ok(())
//! }
//! ```

pub mod config;
mod error;
pub mod logging;

pub use crate::config::{HeraldConfig, LoggingConfig, load_config};
pub use crate::error::{HeraldError, HeraldErrorExt};
pub use crate::logging::LoggingGuard;
pub use herald_derive::herald_error;
pub use herald_event_bus as bus;
pub use herald_event_bus::{
    BusConfig, BusRegistry, Event, EventBinding, EventBus, EventShape, Handler, HandlerResult,
    event_shapes,
};

use tracing::debug;

/// Builds a [`BusRegistry`] from `config.bus` and records `shapes` as the
/// program's event shapes, creating one bus for each.
///
/// Logging is left alone; call [`logging::init`] separately.
#[must_use]
pub fn bootstrap<I>(config: &HeraldConfig, shapes: I) -> BusRegistry
where
    I: IntoIterator<Item = EventShape>,
{
    let registry = BusRegistry::with_config(config.bus);
    registry.initialize(shapes);
    debug!(shapes = registry.len(), policy = ?config.bus.duplicate_registration, "Herald bootstrapped");
    registry
}
