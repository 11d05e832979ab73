//! Error taxonomy for the bridge.
//!
//! Every fallible operation returns [`Result`]. Nothing in this crate
//! retries; the engine or the host decides what to do with a failure.
//!
//! **Propagation rules:**
//! - Classification failures are recoverable (reject the rule argument).
//! - `UnregisteredCallback` is logged by the registry *and* returned.
//! - Host failures keep the original error boxed in `source`, so the
//!   host binding can re-raise it unchanged.

use thiserror::Error;

use crate::argument::ValueKind;

/// Result type alias using [`BridgeError`].
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Error raised by a host-side function during a callback invocation.
pub type HostFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// The host value matched none of the classifier's shapes.
    #[error("unsupported host value of type `{type_name}`")]
    ConversionFailure { type_name: String },

    #[error("logical variable name must not be empty")]
    InvalidVariableName,

    #[error("callback `{0}` is not registered")]
    UnregisteredCallback(String),

    /// The host function ran and failed. The token was already released.
    #[error("callback `{name}` failed: {source}")]
    Host {
        name: String,
        #[source]
        source: HostFailure,
    },

    #[error("type mismatch at position {position}: expected {expected}, got {found}")]
    TypeMismatch {
        position: usize,
        expected: ValueKind,
        found: String,
    },

    #[error("logical variable `{name}` of type {kind} not found")]
    UnknownVariable { name: String, kind: ValueKind },

    #[error("could not cast `{input}` to {kind}")]
    Cast { input: String, kind: ValueKind },
}

impl BridgeError {
    /// Short stable code, used as a structured field in log events.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::ConversionFailure { .. } => "conversion_failure",
            BridgeError::InvalidVariableName => "invalid_variable_name",
            BridgeError::UnregisteredCallback(_) => "unregistered_callback",
            BridgeError::Host { .. } => "host_failure",
            BridgeError::TypeMismatch { .. } => "type_mismatch",
            BridgeError::UnknownVariable { .. } => "unknown_variable",
            BridgeError::Cast { .. } => "cast_failure",
        }
    }
}
