//! Error types for stylekit operations.
//!
//! Only data and configuration problems are errors. Programming mistakes,
//! such as handing a builder a key from a different registry, panic instead.

use thiserror::Error;

/// Errors that can occur while registering keys, parsing values or reading
/// export configuration.
#[derive(Error, Debug)]
pub enum StyleError {
    /// A key was registered after [`KeyRegistry::lock`](crate::KeyRegistry::lock).
    #[error("key registry is locked; cannot register style key '{name}'")]
    RegistryLocked {
        /// Name of the rejected key.
        name: String,
    },

    /// A property name does not belong to the registry.
    #[error("unknown style key '{name}'")]
    UnknownKey {
        /// The unrecognized property name.
        name: String,
    },

    /// A raw CSS fragment could not be turned into a value.
    #[error("invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        /// Property the value was meant for.
        key: String,
        /// The offending text.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A configuration flag carried something other than `true`/`false`.
    #[error("invalid configuration value '{value}' for '{key}'")]
    InvalidConfig {
        /// The configuration property name.
        key: String,
        /// The offending text.
        value: String,
    },
}

/// Result alias for fallible stylekit operations.
pub type Result<T> = std::result::Result<T, StyleError>;
