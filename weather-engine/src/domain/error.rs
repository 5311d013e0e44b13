//! Domain error types.
//!
//! These represent programmer errors in how the engine is called or
//! assembled. Data availability is never a domain error: failed
//! fetches surface as gaps in the result sequence instead.

use super::{InvalidCoordinate, ProviderId};

/// Errors raised by the public weather API for invalid requests.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    /// Coordinate outside the valid latitude/longitude ranges.
    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),

    /// Request window with `start >= end`.
    #[error("invalid time range: start must be before end")]
    InvalidRange,

    /// Request duration that is zero or negative.
    #[error("invalid duration: must be positive")]
    InvalidDuration,

    /// The router selected a provider with no registered adapter.
    #[error("no adapter registered for provider {0}")]
    AdapterNotRegistered(ProviderId),
}
