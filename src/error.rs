//! Error types for the lrudict crate.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: invalid construction or resize parameters (zero capacity).
//! - [`InvariantError`]: returned by [`LruDict::check_invariants`](crate::LruDict::check_invariants)
//!   when the index, list, and size accounting disagree.
//! - [`ListenerError`]: what an eviction listener returns on failure.
//! - [`CacheError`]: everything a mutating cache operation can fail with.
//!
//! A cache miss is never an error; lookups return `Option`.
//!
//! ## Example Usage
//!
//! ```
//! use lrudict::error::CacheError;
//! use lrudict::LruDict;
//!
//! let err = LruDict::<u64, u64>::new(0).unwrap_err();
//! assert!(err.to_string().contains("capacity"));
//!
//! let mut cache: LruDict<u64, u64> = LruDict::new(4).unwrap();
//! let err = cache.resize(0).unwrap_err();
//! assert!(matches!(err, CacheError::InvalidArgument(_)));
//! ```

use thiserror::Error;

/// Boxed error produced by an eviction listener.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error returned when cache configuration parameters are invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn zero_capacity() -> Self {
        Self::new("capacity must be a positive number")
    }
}

/// Error returned when the internal structures of a cache disagree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cache invariant violated: {0}")]
pub struct InvariantError(String);

impl InvariantError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Failure of a cache operation.
#[derive(Debug, Error)]
pub enum CacheError {
    /// An argument was rejected before the cache was touched.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ConfigError),

    /// The registered eviction listener failed. Evictions that completed
    /// before the failure stay applied; the entry being evicted is kept.
    #[error("eviction listener failed: {0}")]
    Listener(#[source] ListenerError),
}

impl CacheError {
    /// Unwraps the listener's own error, if that is what this is.
    pub fn into_listener_error(self) -> Option<ListenerError> {
        match self {
            CacheError::Listener(err) => Some(err),
            CacheError::InvalidArgument(_) => None,
        }
    }
}
