//! http_facade - stateless helpers for web request handlers
//!
//! Small, allocation-light utilities for the chores every request handler
//! repeats: emitting status lines, redirecting, reading query and form
//! parameters, deriving the base and current URL, splitting the request path
//! into segments and spotting AJAX requests.
//!
//! # Design
//!
//! - **No hidden state** - request data is an explicit [`RequestContext`]
//!   snapshot, output goes to a [`HeaderSink`]
//! - **Compile-time status table** - [`StatusCode`] and its phrases are
//!   generated once, never mutated
//! - **Termination as a value** - redirects and shutdowns hand back a
//!   [`Halt`] token instead of exiting the process
//! - **Absent means `None`** - unknown status codes, missing parameters and
//!   out-of-range segments are ordinary outcomes, never errors
//!
//! # Examples
//!
//! Front-controller routing on path segments:
//! ```
//! use http_facade::{Halt, Http, RequestContext, Response, limits::RespLimits};
//!
//! fn handle(ctx: &RequestContext, resp: &mut Response) -> Result<(), Halt> {
//!     let segments = Http::uri_segments(ctx);
//!     match segments.iter().map(String::as_str).collect::<Vec<_>>()[..] {
//!         ["users", id] => {
//!             Http::set_response_status(resp, 200);
//!             Http::set_request_headers(resp, ["Content-Type: text/plain"]);
//!             resp_body(resp, &format!("user {id}"));
//!             Ok(())
//!         }
//!         ["old-users", id] => {
//!             let target = format!("{}/users/{id}", Http::base_url(ctx));
//!             Err(Http::redirect(resp, &target, 301, None).unwrap_or(Http::request_shutdown()))
//!         }
//!         _ => {
//!             Http::set_response_status(resp, 404);
//!             Err(Http::request_shutdown())
//!         }
//!     }
//! }
//!
//! fn resp_body(resp: &mut Response, text: &str) {
//!     use http_facade::HeaderSink;
//!     resp.write_body(text.as_bytes());
//! }
//!
//! let ctx = RequestContext::builder()
//!     .request_uri("/shop/index.php/old-users/7")
//!     .script_path("/shop/index.php")
//!     .host("example.com")
//!     .build();
//!
//! let mut resp = Response::new(&RespLimits::default());
//! assert!(handle(&ctx, &mut resp).is_err());
//! assert_eq!(resp.status_line(), Some("HTTP/1.1 301 Moved Permanently"));
//! assert_eq!(resp.headers(), ["Location: http://example.com/shop/users/7"]);
//! ```
//!
//! Building the snapshot from a raw request head:
//! ```
//! use http_facade::{Http, RequestContext, limits::ReqLimits};
//!
//! let limits = ReqLimits::default();
//! let ctx = RequestContext::from_head(
//!     b"POST /index.php/login HTTP/1.1\r\nHost: example.com\r\nX-Requested-With: XMLHttpRequest\r\n\r\n",
//!     &limits,
//! )
//! .unwrap()
//! .with_script_path("/index.php")
//! .with_form_body(b"user=ann&remember", &limits)
//! .unwrap();
//!
//! assert!(Http::is_ajax_request(&ctx));
//! assert_eq!(Http::post(&ctx, "user"), Some("ann"));
//! assert_eq!(Http::post(&ctx, "remember"), Some(""));
//! assert_eq!(Http::uri_segment(&ctx, 0).as_deref(), Some("login"));
//! ```

pub(crate) mod http {
    pub(crate) mod context;
    pub mod query;
    pub(crate) mod response;
    pub mod status;
    pub mod uri;
}
pub(crate) mod errors;
pub(crate) mod facade;
pub mod limits;

pub use crate::{
    errors::Error,
    facade::Http,
    http::{
        context::{ContextBuilder, RequestContext},
        query,
        response::{Halt, HeaderSink, Response},
        status::{self, StatusCode, Version},
        uri,
    },
};

#[cfg(test)]
pub mod tools {
    use std::str::from_utf8;

    #[inline]
    pub fn str_op(value: &[u8]) -> &str {
        from_utf8(value).unwrap()
    }
}
