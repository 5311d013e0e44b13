//! Cache error types.

/// Errors from the durable cache tier.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Reading or writing the cache file failed.
    #[error("cache io error: {message}")]
    Io { message: String },

    /// Serializing entries for the cache file failed.
    #[error("cache serialization error: {message}")]
    Serialize { message: String },

    /// Rejected entry whose expiry precedes its fetch time.
    #[error("cache entry expires before it was fetched")]
    InvalidExpiry,
}
