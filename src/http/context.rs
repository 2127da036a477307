//! Per-request snapshot of the values a handler may look up.

use crate::{errors::Error, limits::ReqLimits, query::Query, Version};
use memchr::{memchr, memmem};

/// Immutable view of one request.
///
/// Holds everything the helpers in [`Http`](crate::Http) read: the raw
/// request URI, the path of the entry script, host names, the HTTPS flag,
/// query and form parameters, and request headers. A context is built once
/// per request, either field by field with [`RequestContext::builder`] or
/// from a raw request head with [`RequestContext::from_head`], and is never
/// modified afterwards.
///
/// # Examples
/// ```
/// use http_facade::RequestContext;
///
/// let ctx = RequestContext::builder()
///     .request_uri("/app/index.php/blog/42?page=2")
///     .script_path("/app/index.php")
///     .host("example.com")
///     .query_param("page", "2")
///     .header("X-Requested-With", "XMLHttpRequest")
///     .build();
///
/// assert_eq!(ctx.query("page"), Some("2"));
/// assert_eq!(ctx.header("x-requested-with"), Some("XMLHttpRequest"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    request_uri: String,
    script_path: String,
    host: String,
    server_name: String,
    https: Option<String>,
    query: Vec<(String, String)>,
    form: Vec<(String, String)>,
    headers: HeaderMap,
}

impl RequestContext {
    /// Starts an empty context.
    #[inline]
    pub fn builder() -> ContextBuilder {
        ContextBuilder {
            ctx: RequestContext::default(),
        }
    }

    /// Builds a context from a raw `HTTP/1.x` request head.
    ///
    /// Expected layout:
    /// ```text
    /// [METHOD] SP [TARGET] SP "HTTP/1." ("0" | "1") CRLF
    /// ([NAME] ":" [VALUE] CRLF)*
    /// CRLF
    /// ```
    ///
    /// Anything after the blank line is ignored. The target becomes the
    /// request URI and its query string is split into parameters. The `Host`
    /// header fills both the host and, without its port, the server name.
    /// Script path, HTTPS flag and form data are not part of a request head;
    /// set them with [`with_script_path`](Self::with_script_path),
    /// [`with_https`](Self::with_https) and
    /// [`with_form_body`](Self::with_form_body).
    ///
    /// # Examples
    /// ```
    /// use http_facade::{limits::ReqLimits, RequestContext};
    ///
    /// let ctx = RequestContext::from_head(
    ///     b"GET /app/index.php/users/7?tab=posts HTTP/1.1\r\nHost: example.com:8080\r\n\r\n",
    ///     &ReqLimits::default(),
    /// )
    /// .unwrap()
    /// .with_script_path("/app/index.php");
    ///
    /// assert_eq!(ctx.request_uri(), "/app/index.php/users/7?tab=posts");
    /// assert_eq!(ctx.host(), "example.com:8080");
    /// assert_eq!(ctx.server_name(), "example.com");
    /// assert_eq!(ctx.query("tab"), Some("posts"));
    /// ```
    pub fn from_head(head: &[u8], limits: &ReqLimits) -> Result<Self, Error> {
        let (head, size) = match memmem::find(head, b"\r\n\r\n") {
            Some(end) => (&head[..end], end + 4),
            None => (head, head.len()),
        };
        if size > limits.head_size {
            return Err(Error::HeadTooLarge(limits.head_size));
        }

        let head = simdutf8::basic::from_utf8(head)?;
        let mut lines = head.split("\r\n");

        let target = Self::parse_request_line(lines.next().unwrap_or_default())?;

        let mut ctx = RequestContext {
            request_uri: target.to_owned(),
            ..RequestContext::default()
        };

        for line in lines.take_while(|line| !line.is_empty()) {
            if ctx.headers.len() >= limits.header_count {
                return Err(Error::TooManyHeaders(limits.header_count));
            }

            let (name, value) = line.split_once(':').ok_or(Error::InvalidHeader)?;
            if name.is_empty() || name.bytes().any(|b| b.is_ascii_whitespace()) {
                return Err(Error::InvalidHeader);
            }

            ctx.headers.push(name, value.trim_matches([' ', '\t']));
        }

        if let Some(host) = ctx.headers.get("host") {
            ctx.server_name = strip_port(host).to_owned();
            ctx.host = host.to_owned();
        }

        if let Some(index) = memchr(b'?', target.as_bytes()) {
            let query = &target[index + 1..];
            if !query.is_empty() {
                ctx.query = to_owned_pairs(Query::parse(query, limits.query_parts)?);
            }
        }

        tracing::trace!(
            uri = %ctx.request_uri,
            headers = ctx.headers.len(),
            params = ctx.query.len(),
            "request head parsed"
        );

        Ok(ctx)
    }

    // Returns the request target.
    fn parse_request_line(line: &str) -> Result<&str, Error> {
        let mut parts = line.split(' ');

        let (Some(method), Some(target), Some(version), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::InvalidRequestLine);
        };
        if method.is_empty() || target.is_empty() {
            return Err(Error::InvalidRequestLine);
        }

        Version::from_bytes(version.as_bytes()).ok_or(Error::UnsupportedVersion)?;
        Ok(target)
    }

    /// Sets the path of the entry script (e.g. `/app/index.php`).
    #[inline]
    pub fn with_script_path<S: Into<String>>(mut self, path: S) -> Self {
        self.script_path = path.into();
        self
    }

    /// Sets the raw HTTPS flag as reported by the hosting server
    /// (typically `"on"`).
    #[inline]
    pub fn with_https<S: Into<String>>(mut self, flag: S) -> Self {
        self.https = Some(flag.into());
        self
    }

    /// Adds the fields of an `application/x-www-form-urlencoded` body.
    ///
    /// An empty body adds nothing.
    pub fn with_form_body(mut self, body: &[u8], limits: &ReqLimits) -> Result<Self, Error> {
        if body.is_empty() {
            return Ok(self);
        }

        let body = simdutf8::basic::from_utf8(body)?;
        let pairs = Query::parse(body, limits.form_parts)?;
        self.form.extend(to_owned_pairs(pairs));
        Ok(self)
    }
}

// Public API
impl RequestContext {
    /// Returns a query-string parameter.
    ///
    /// When a key repeats, the last value wins.
    #[inline]
    pub fn query(&self, key: &str) -> Option<&str> {
        lookup(&self.query, key)
    }

    /// Returns a form field. When a key repeats, the last value wins.
    #[inline]
    pub fn form(&self, key: &str) -> Option<&str> {
        lookup(&self.form, key)
    }

    /// Returns a request header, matching the name case-insensitively.
    #[inline]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Raw request target, query string included.
    #[inline]
    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    /// Path of the entry script.
    #[inline]
    pub fn script_path(&self) -> &str {
        &self.script_path
    }

    /// Value of the `Host` header, port included.
    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Server name, i.e. the host without its port.
    #[inline]
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Raw HTTPS flag, `None` when the hosting server did not set one.
    #[inline]
    pub fn https(&self) -> Option<&str> {
        self.https.as_deref()
    }
}

#[inline]
fn lookup<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[inline]
fn to_owned_pairs(pairs: Vec<(&str, &str)>) -> Vec<(String, String)> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
}

fn strip_port(host: &str) -> &str {
    // [::1]:8080
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }

    match host.rsplit_once(':') {
        Some((name, port)) if port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Fluent constructor for [`RequestContext`].
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    ctx: RequestContext,
}

impl ContextBuilder {
    /// Raw request target, query string included.
    pub fn request_uri<S: Into<String>>(mut self, uri: S) -> Self {
        self.ctx.request_uri = uri.into();
        self
    }

    /// Path of the entry script.
    pub fn script_path<S: Into<String>>(mut self, path: S) -> Self {
        self.ctx.script_path = path.into();
        self
    }

    /// Host as sent by the client. Also sets the server name unless one was
    /// given explicitly.
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.ctx.host = host.into();
        if self.ctx.server_name.is_empty() {
            self.ctx.server_name = strip_port(&self.ctx.host).to_owned();
        }
        self
    }

    /// Server name used by [`Http::current_url`](crate::Http::current_url).
    pub fn server_name<S: Into<String>>(mut self, name: S) -> Self {
        self.ctx.server_name = name.into();
        self
    }

    /// Raw HTTPS flag.
    pub fn https<S: Into<String>>(mut self, flag: S) -> Self {
        self.ctx.https = Some(flag.into());
        self
    }

    pub fn query_param<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.ctx.query.push((key.into(), value.into()));
        self
    }

    pub fn form_param<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.ctx.form.push((key.into(), value.into()));
        self
    }

    pub fn header<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.ctx.headers.push(name, value);
        self
    }

    #[inline]
    pub fn build(self) -> RequestContext {
        self.ctx
    }
}

// HEADER MAP

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct HeaderMap {
    headers: Vec<Header>,
}

impl HeaderMap {
    #[inline]
    pub(crate) fn push<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        self.headers.push(Header {
            name: name.into(),
            value: value.into(),
        });
    }

    #[inline]
    pub(crate) fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.headers.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Header {
    name: String,
    value: String,
}
