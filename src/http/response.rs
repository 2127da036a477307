//! Header emission and request termination.

use crate::{limits::RespLimits, StatusCode, Version};
use std::io::Write;

/// Destination for response header lines.
///
/// Hosting environments implement this for whatever actually carries the
/// response. [`Response`] is the implementation shipped with the crate.
///
/// # Examples
/// ```
/// use http_facade::HeaderSink;
///
/// #[derive(Default)]
/// struct Recorder {
///     lines: Vec<String>,
///     sent: bool,
/// }
///
/// impl HeaderSink for Recorder {
///     fn emit_header(&mut self, line: &str) {
///         if !self.sent {
///             self.lines.push(line.to_owned());
///         }
///     }
///
///     fn headers_finalized(&self) -> bool {
///         self.sent
///     }
///
///     fn write_body(&mut self, _: &[u8]) {
///         self.sent = true;
///     }
/// }
/// ```
pub trait HeaderSink {
    /// Appends one header line (no CRLF). A line starting with `HTTP/` is a
    /// status line.
    ///
    /// Must be a no-op once [`headers_finalized`](Self::headers_finalized)
    /// returns `true`.
    fn emit_header(&mut self, line: &str);

    /// Whether header emission is no longer possible.
    fn headers_finalized(&self) -> bool;

    /// Appends body bytes. The first write finalizes the headers.
    fn write_body(&mut self, data: &[u8]);

    /// Protocol written in front of status lines.
    #[inline]
    fn version(&self) -> Version {
        Version::Http11
    }
}

/// Marker meaning "stop processing this request".
///
/// Returned by [`Http::request_shutdown`](crate::Http::request_shutdown) and
/// [`Http::redirect`](crate::Http::redirect). Handlers return it up the call
/// chain instead of exiting the process.
///
/// # Examples
/// ```
/// use http_facade::{Halt, Http, RequestContext};
///
/// fn handle(ctx: &RequestContext) -> Result<String, Halt> {
///     match Http::get(ctx, "action") {
///         Some(action) => Ok(format!("running {action}")),
///         None => Err(Http::request_shutdown()),
///     }
/// }
///
/// assert!(handle(&RequestContext::default()).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "the request must stop once `Halt` is produced"]
pub struct Halt(());

impl Halt {
    #[inline(always)]
    pub(crate) const fn new() -> Self {
        Halt(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ResponseState {
    Open,
    Finalized,
}

/// Buffered response used as a [`HeaderSink`].
///
/// Collects a status line, header lines and a body, and renders them as an
/// `HTTP/1.x` message with [`to_bytes`](Response::to_bytes).
///
/// # Examples
/// ```
/// use http_facade::{HeaderSink, Http, Response, limits::RespLimits};
///
/// let mut resp = Response::new(&RespLimits::default());
/// Http::set_response_status(&mut resp, 404);
/// resp.emit_header("Content-Type: text/plain");
/// resp.write_body(b"missing");
///
/// assert_eq!(
///     resp.to_bytes(),
///     b"HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\ncontent-length: 7\r\n\r\nmissing"
/// );
/// ```
#[derive(Debug)]
pub struct Response {
    version: Version,
    status_line: Option<String>,
    headers: Vec<String>,
    body: Vec<u8>,
    state: ResponseState,
}

impl Response {
    #[inline]
    pub fn new(limits: &RespLimits) -> Self {
        Self {
            version: limits.version,
            status_line: None,
            headers: Vec::new(),
            body: Vec::with_capacity(limits.default_capacity),
            state: ResponseState::Open,
        }
    }

    /// The emitted status line, if any.
    #[inline]
    pub fn status_line(&self) -> Option<&str> {
        self.status_line.as_deref()
    }

    /// Emitted header lines, in order, without the status line.
    #[inline]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Marks the headers as sent. Later header lines are ignored.
    #[inline]
    pub fn finalize(&mut self) {
        self.state = ResponseState::Finalized;
    }

    /// Renders the whole message.
    ///
    /// Without an emitted status line the response is `200 OK`. A
    /// `content-length` header is always appended.
    pub fn to_bytes(&self) -> Vec<u8> {
        let status = match &self.status_line {
            Some(line) => line.as_str(),
            None => StatusCode::Ok.first_line(self.version),
        };

        let mut buffer = Vec::with_capacity(self.body.len() + 128);
        buffer.extend_from_slice(status.as_bytes());
        buffer.extend_from_slice(b"\r\n");
        for line in &self.headers {
            buffer.extend_from_slice(line.as_bytes());
            buffer.extend_from_slice(b"\r\n");
        }

        // Writing into a Vec cannot fail.
        let _ = write!(buffer, "content-length: {}\r\n\r\n", self.body.len());
        buffer.extend_from_slice(&self.body);
        buffer
    }
}

impl HeaderSink for Response {
    fn emit_header(&mut self, line: &str) {
        if self.state == ResponseState::Finalized {
            tracing::warn!(header = line, "headers already sent, header ignored");
            return;
        }

        match line.starts_with("HTTP/") {
            true => self.status_line = Some(line.to_owned()),
            false => self.headers.push(line.to_owned()),
        }
    }

    #[inline]
    fn headers_finalized(&self) -> bool {
        self.state == ResponseState::Finalized
    }

    #[inline]
    fn write_body(&mut self, data: &[u8]) {
        self.state = ResponseState::Finalized;
        self.body.extend_from_slice(data);
    }

    #[inline]
    fn version(&self) -> Version {
        self.version
    }
}
