//! Core domain types for the weather engine.
//!
//! These types represent validated forecast data. Invariants are
//! enforced at construction time, so code that receives these types
//! can trust their validity: coordinates are always in range,
//! timestamps are always timezone-aware, probabilities are always
//! within [0, 100].

mod condition;
mod coordinate;
mod error;
mod provider;
mod sample;

pub use condition::ConditionCode;
pub use coordinate::{Coordinate, InvalidCoordinate};
pub use error::DomainError;
pub use provider::ProviderId;
pub use sample::{ForecastBlock, ForecastSample};
