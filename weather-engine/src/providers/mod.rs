//! Regional forecast providers.
//!
//! Each adapter wraps one external weather API behind the
//! [`ForecastAdapter`] trait: it fetches raw payloads, speaks the
//! provider's native units and condition vocabulary, and signals
//! failure through the shared [`FetchError`] taxonomy. Nothing
//! outside this module interprets provider wire formats.
//!
//! Key characteristics:
//! - Adapters never return a partial sample list disguised as
//!   success; any failure is an explicit error.
//! - Raw samples stay provider-native until [`normalize`] maps them
//!   into the canonical [`crate::domain::ForecastSample`] model.
//! - Each provider declares its own resolution policy (finer blocks
//!   near-term, coarser far out) via [`ProviderDescriptor`].

mod adapter;
mod error;
mod global;
mod iberian;
pub mod mock;
mod nordic;
mod normalize;
mod raw;

pub use adapter::{AdapterRegistry, ForecastAdapter, ProviderDescriptor};
pub use error::FetchError;
pub use global::{GlobalAdapter, GlobalConfig};
pub use iberian::{IberianAdapter, IberianConfig, IberianRegion};
pub use nordic::{NordicAdapter, NordicConfig};
pub use normalize::normalize;
pub use raw::{RawSample, TemperatureUnit, WindSpeedUnit};
