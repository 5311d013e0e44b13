//! Weather aggregation and caching engine.
//!
//! Routes a coordinate to the regional forecast provider responsible
//! for it, normalizes heterogeneous provider payloads into one
//! canonical forecast model, folds raw samples into fixed-duration
//! blocks, and caches results across an ephemeral per-run tier and a
//! durable cross-run tier with provider-declared freshness rules.
//!
//! The entry point is [`orchestrator::Orchestrator::get_weather`],
//! which returns an ordered (possibly gappy) sequence of
//! [`domain::ForecastBlock`]s for a coordinate and time window.
//! "Data unavailable" is never an error: failed fetches leave gaps
//! and the call still succeeds with whatever is cached.

pub mod aggregate;
pub mod cache;
pub mod domain;
pub mod orchestrator;
pub mod providers;
pub mod router;
