//! Error types for the poolru library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when construction parameters are invalid
//!   (zero cache limit, zero pool block size).
//! - [`AllocError`]: Returned by the fallible pool paths when a block or bulk
//!   array cannot be obtained from the system allocator.
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (`check_invariants` methods).
//!
//! A lookup miss is never an error; it is reported as `None`.
//!
//! ## Example Usage
//!
//! ```
//! use poolru::error::ConfigError;
//! use poolru::LruCache;
//!
//! let cache: Result<LruCache<u64, u64>, ConfigError> = LruCache::try_new(16);
//! assert!(cache.is_ok());
//!
//! // A zero limit is caught without panicking
//! let bad = LruCache::<u64, u64>::try_new(0);
//! assert!(bad.is_err());
//! ```

use std::alloc::Layout;
use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by [`LruCache::check_invariants`](crate::policy::lru::LruCache::check_invariants).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when construction parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`LruCache::try_new`](crate::policy::lru::LruCache::try_new),
/// [`Pool::try_with_config`](crate::ds::pool::Pool::try_with_config) and
/// [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
/// The infallible constructors panic with the same message.
///
/// # Example
///
/// ```
/// use poolru::LruCache;
///
/// let err = LruCache::<u64, u64>::try_new(0).unwrap_err();
/// assert!(err.to_string().contains("limit"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// AllocError
// ---------------------------------------------------------------------------

/// Error returned when the pool cannot obtain memory for a new block or a
/// bulk array.
///
/// The pool never retries; the caller decides whether to abort or reject
/// the request. The infallible paths hand the same failure to
/// [`std::alloc::handle_alloc_error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocError {
    slots: usize,
    layout: Option<Layout>,
}

impl AllocError {
    /// Creates a new `AllocError` for a request of `slots` elements.
    ///
    /// `layout` is `None` when the request size overflowed before a layout
    /// could be formed.
    #[inline]
    pub fn new(slots: usize, layout: Option<Layout>) -> Self {
        Self { slots, layout }
    }

    /// Returns the number of slots that were requested.
    #[inline]
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Returns the layout of the failed request, if it could be computed.
    #[inline]
    pub fn layout(&self) -> Option<Layout> {
        self.layout
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.layout {
            Some(layout) => write!(
                f,
                "out of memory allocating {} slots ({} bytes)",
                self.slots,
                layout.size()
            ),
            None => write!(f, "capacity overflow allocating {} slots", self.slots),
        }
    }
}

impl std::error::Error for AllocError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("index length mismatch");
        assert_eq!(err.to_string(), "index length mismatch");
    }

    #[test]
    fn invariant_message_accessor() {
        let err = InvariantError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn invariant_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<InvariantError>();
    }

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("limit must be > 0");
        assert_eq!(err.to_string(), "limit must be > 0");
    }

    #[test]
    fn config_clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(b.message(), "x");
    }

    // -- AllocError -------------------------------------------------------

    #[test]
    fn alloc_display_with_layout() {
        let layout = Layout::array::<u64>(4).unwrap();
        let err = AllocError::new(4, Some(layout));
        assert_eq!(err.slots(), 4);
        assert_eq!(err.layout(), Some(layout));
        assert_eq!(err.to_string(), "out of memory allocating 4 slots (32 bytes)");
    }

    #[test]
    fn alloc_display_without_layout() {
        let err = AllocError::new(usize::MAX, None);
        assert!(err.to_string().contains("capacity overflow"));
        assert_eq!(err.layout(), None);
    }

    #[test]
    fn alloc_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<AllocError>();
    }
}
