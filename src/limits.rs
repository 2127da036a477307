//! Parsing limits and response settings
//!
//! # Security-First Defaults
//!
//! Default limits are conservative so that a hostile request head cannot
//! make the snapshot grow without bound:
//! - Oversized request heads
//! - Header flooding
//! - Query/form parameter explosion
//!
//! # Examples
//!
//! ```
//! use http_facade::{limits::ReqLimits, RequestContext};
//!
//! let limits = ReqLimits {
//!     query_parts: 64, // Filtering APIs with many parameters
//!     ..ReqLimits::default()
//! };
//!
//! let ctx = RequestContext::from_head(
//!     b"GET /app/search?q=rust HTTP/1.1\r\nHost: example.com\r\n\r\n",
//!     &limits,
//! )
//! .unwrap();
//! assert_eq!(ctx.query("q"), Some("rust"));
//! ```

use crate::Version;

/// Limits applied when a [`RequestContext`](crate::RequestContext) is built
/// from raw bytes.
///
/// # Trade-off Considerations
///
/// - **Small limits**: less memory, but may reject legitimate requests
/// - **Large limits**: handles complex forms, at the cost of larger snapshots
#[derive(Debug, Clone)]
pub struct ReqLimits {
    /// Maximum size of the request head in bytes, up to and including the
    /// blank line (default: `8 KB`)
    pub head_size: usize,

    /// Maximum number of headers per request (default: `32 headers`)
    ///
    /// Typical browsers send 10-12 headers; proxies add a few more.
    pub header_count: usize,

    /// Maximum number of query parameters (default: `32`)
    ///
    /// `?sort=name&debug` has 2 pairs. Prevents query parameter explosion.
    pub query_parts: usize,

    /// Maximum number of urlencoded form fields (default: `64`)
    pub form_parts: usize,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for ReqLimits {
    fn default() -> Self {
        Self {
            head_size: 8 * 1024, // Matches common proxy defaults
            header_count: 32,
            query_parts: 32,
            form_parts: 64,

            _priv: (),
        }
    }
}

/// Settings for the in-crate [`Response`](crate::Response) sink.
#[derive(Debug, Clone)]
pub struct RespLimits {
    /// Initial body buffer capacity (default: `1024 B`)
    pub default_capacity: usize,
    /// Protocol written into status lines (default: `HTTP/1.1`)
    pub version: Version,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for RespLimits {
    fn default() -> Self {
        Self {
            default_capacity: 1024,
            version: Version::Http11,

            _priv: (),
        }
    }
}
