use serde::{Deserialize, Serialize};

/// What a bus does when the exact same binding is registered twice.
///
/// Either way the bus keeps a single entry for the binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the existing entry and log the misuse.
    #[default]
    Tolerate,
    /// Keep the existing entry and return [`EventBusError::DuplicateRegistration`](crate::EventBusError::DuplicateRegistration).
    Reject,
}

/// Settings shared by every bus created through one [`BusRegistry`](crate::BusRegistry).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    pub duplicate_registration: DuplicatePolicy,
}

impl BusConfig {
    /// A config that turns double registration into an error.
    #[must_use]
    pub const fn strict() -> Self {
        Self { duplicate_registration: DuplicatePolicy::Reject }
    }
}
