//! One-call helpers for the common chores of a request handler.

use crate::{
    http::{status, uri},
    HeaderSink, Halt, RequestContext, StatusCode,
};
use std::{thread, time::Duration};

/// Request/response helpers.
///
/// Every helper takes what it works on explicitly: a [`RequestContext`] for
/// lookups, a [`HeaderSink`] for output. Nothing is cached between calls.
///
/// # Examples
/// ```
/// use http_facade::{Http, RequestContext, Response, limits::RespLimits};
///
/// let ctx = RequestContext::builder()
///     .request_uri("/app/index.php/users/42/edit?tab=profile")
///     .script_path("/app/index.php")
///     .host("example.com")
///     .query_param("tab", "profile")
///     .build();
///
/// assert_eq!(Http::uri_string(&ctx), "users/42/edit");
/// assert_eq!(Http::uri_segment(&ctx, 1).as_deref(), Some("42"));
/// assert_eq!(Http::get(&ctx, "tab"), Some("profile"));
/// assert_eq!(Http::base_url(&ctx), "http://example.com/app");
///
/// let mut resp = Response::new(&RespLimits::default());
/// let halt = Http::redirect(&mut resp, "/login", 302, None);
/// assert!(halt.is_some());
/// assert_eq!(resp.headers(), ["Location: /login"]);
/// ```
pub struct Http;

// Output
impl Http {
    /// Emits the status line for `code`, e.g. `HTTP/1.1 404 Not Found`.
    ///
    /// Unregistered codes emit nothing.
    pub fn set_response_status<H: HeaderSink + ?Sized>(sink: &mut H, code: u16) {
        match StatusCode::from_u16(code) {
            Some(status) => sink.emit_header(status.first_line(sink.version())),
            None => tracing::debug!(code, "unregistered status code, no status line emitted"),
        }
    }

    /// Redirects the client to `url`.
    ///
    /// While headers can still be emitted this writes the redirect status
    /// line, blocks the calling thread for `delay` when one is given, writes
    /// the `Location` header and returns [`Halt`]: the request is over.
    ///
    /// The status phrase is `Moved Permanently` for `301` and `Found` for
    /// any other code, while the numeric code is kept as given
    /// (`307` is sent as `307 Found`).
    ///
    /// Once headers are finalized, a `<script>` that changes
    /// `document.location` is written to the body instead and `None` is
    /// returned; the request may continue.
    ///
    /// Dropping the result is flagged:
    /// ```compile_fail
    /// #![deny(unused_must_use)]
    /// use http_facade::{Http, Response, limits::RespLimits};
    ///
    /// let mut resp = Response::new(&RespLimits::default());
    /// Http::redirect(&mut resp, "/login", 302, None);
    /// ```
    #[must_use = "return the `Halt` to stop handling the request"]
    pub fn redirect<H: HeaderSink + ?Sized>(
        sink: &mut H,
        url: &str,
        status: u16,
        delay: Option<Duration>,
    ) -> Option<Halt> {
        if sink.headers_finalized() {
            tracing::debug!(url, "headers already sent, redirecting with a script");
            sink.write_body(format!("<script>document.location.href='{url}';</script>\n").as_bytes());
            return None;
        }

        sink.emit_header(&status::redirect_status_line(status, sink.version()));

        if let Some(delay) = delay {
            thread::sleep(delay);
        }

        sink.emit_header(&format!("Location: {url}"));
        tracing::debug!(url, status, "redirect issued");

        Some(Self::request_shutdown())
    }

    /// Emits header lines in order.
    ///
    /// # Examples
    /// ```
    /// use http_facade::{Http, Response, limits::RespLimits};
    ///
    /// let mut resp = Response::new(&RespLimits::default());
    /// Http::set_request_headers(&mut resp, ["Cache-Control: no-store", "X-Frame-Options: DENY"]);
    ///
    /// assert_eq!(resp.headers(), ["Cache-Control: no-store", "X-Frame-Options: DENY"]);
    /// ```
    pub fn set_request_headers<H, I, S>(sink: &mut H, headers: I)
    where
        H: HeaderSink + ?Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for header in headers {
            sink.emit_header(header.as_ref());
        }
    }

    /// Ends the request. Return the token up to the request handler.
    #[inline(always)]
    pub fn request_shutdown() -> Halt {
        Halt::new()
    }
}

// Lookups
impl Http {
    /// Query-string parameter, `None` when absent.
    #[inline]
    pub fn get<'a>(ctx: &'a RequestContext, key: &str) -> Option<&'a str> {
        ctx.query(key)
    }

    /// Form field, `None` when absent.
    #[inline]
    pub fn post<'a>(ctx: &'a RequestContext, key: &str) -> Option<&'a str> {
        ctx.form(key)
    }

    /// URL of the directory holding the entry script.
    ///
    /// The scheme is `https` only when the HTTPS flag equals `on`
    /// (case-insensitive). Trailing `/` and `\` are removed.
    ///
    /// | Host               | Script path        | Result                       |
    /// |--------------------|--------------------|------------------------------|
    /// | `example.com`      | `/app/index.php`   | `http://example.com/app`     |
    /// | `example.com/`     | `/index.php`       | `http://example.com`         |
    pub fn base_url(ctx: &RequestContext) -> String {
        let scheme = match ctx.https() {
            Some(flag) if flag.eq_ignore_ascii_case("on") => "https://",
            _ => "http://",
        };

        let host = ctx.host().trim_end_matches(['\\', '/']);
        let location = format!("{host}{}", uri::dirname(ctx.script_path()));

        format!("{scheme}{}", location.trim_end_matches(['\\', '/']))
    }

    /// Full URL of the current request: scheme, server name and request URI.
    ///
    /// The scheme is `https` when the HTTPS flag is set to anything but
    /// `""` or `"0"`.
    pub fn current_url(ctx: &RequestContext) -> String {
        let scheme = match ctx.https() {
            None | Some("") | Some("0") => "http",
            Some(_) => "https",
        };

        format!("{scheme}://{}{}", ctx.server_name(), ctx.request_uri())
    }

    /// Logical request path; see [`uri::resolve_path`].
    #[inline]
    pub fn uri_string(ctx: &RequestContext) -> String {
        uri::resolve_path(ctx.request_uri(), ctx.script_path())
    }

    /// Segments of [`uri_string`](Self::uri_string). Never empty: an empty
    /// path gives `[""]`.
    pub fn uri_segments(ctx: &RequestContext) -> Vec<String> {
        uri::segments(&Self::uri_string(ctx))
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Segment at `index`, `None` when out of range.
    pub fn uri_segment(ctx: &RequestContext, index: usize) -> Option<String> {
        uri::segment(&Self::uri_string(ctx), index).map(str::to_owned)
    }

    /// Whether the request carries `X-Requested-With: XMLHttpRequest`.
    ///
    /// The value must match exactly.
    #[inline]
    pub fn is_ajax_request(ctx: &RequestContext) -> bool {
        ctx.header("X-Requested-With") == Some("XMLHttpRequest")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{limits::RespLimits, tools::*, Response, Version};
    use std::time::Instant;
    use tracing_test::traced_test;

    fn response() -> Response {
        Response::new(&RespLimits::default())
    }

    #[test]
    fn status_lines() {
        #[rustfmt::skip]
        let cases = [
            (200, Some("HTTP/1.1 200 OK")),
            (404, Some("HTTP/1.1 404 Not Found")),
            (503, Some("HTTP/1.1 503 Service Unavailable")),
            (999, None),
            (421, None),
        ];

        for (code, expected) in cases {
            let mut resp = response();
            Http::set_response_status(&mut resp, code);

            assert_eq!(resp.status_line(), expected);
            assert!(resp.headers().is_empty());
        }
    }

    #[test]
    fn status_line_follows_version() {
        let mut resp = Response::new(&RespLimits {
            version: Version::Http10,
            ..RespLimits::default()
        });
        Http::set_response_status(&mut resp, 201);

        assert_eq!(resp.status_line(), Some("HTTP/1.0 201 Created"));
    }

    #[test]
    fn redirect() {
        #[rustfmt::skip]
        let cases = [
            (301, "HTTP/1.1 301 Moved Permanently"),
            (302, "HTTP/1.1 302 Found"),
            (307, "HTTP/1.1 307 Found"),
        ];

        for (code, line) in cases {
            let mut resp = response();
            let halt = Http::redirect(&mut resp, "http://site.com/", code, None);

            assert_eq!(halt, Some(Http::request_shutdown()));
            assert_eq!(resp.status_line(), Some(line));
            assert_eq!(resp.headers(), ["Location: http://site.com/"]);
            assert!(resp.body().is_empty());
        }
    }

    #[test]
    fn redirect_waits_for_delay() {
        let mut resp = response();
        let start = Instant::now();
        let halt = Http::redirect(&mut resp, "/next", 302, Some(Duration::from_millis(20)));

        assert!(halt.is_some());
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(resp.headers(), ["Location: /next"]);
    }

    #[test]
    #[traced_test]
    fn redirect_after_headers_sent() {
        let mut resp = response();
        resp.write_body(b"<p>hi</p>");

        let halt = Http::redirect(&mut resp, "/login", 302, None);

        assert_eq!(halt, None);
        assert_eq!(resp.status_line(), None);
        assert!(resp.headers().is_empty());
        assert_eq!(
            str_op(resp.body()),
            "<p>hi</p><script>document.location.href='/login';</script>\n"
        );
        assert!(logs_contain("redirecting with a script"));
    }

    #[test]
    fn headers_in_order() {
        let mut resp = response();
        Http::set_request_headers(&mut resp, vec![String::from("A: 1"), String::from("B: 2")]);
        Http::set_request_headers(&mut resp, ["C: 3"]);

        assert_eq!(resp.headers(), ["A: 1", "B: 2", "C: 3"]);
    }

    #[test]
    fn parameters() {
        let ctx = RequestContext::builder()
            .query_param("action", "edit")
            .form_param("login", "ann")
            .build();

        assert_eq!(Http::get(&ctx, "action"), Some("edit"));
        assert_eq!(Http::get(&ctx, "login"), None);
        assert_eq!(Http::post(&ctx, "login"), Some("ann"));
        assert_eq!(Http::post(&ctx, "action"), None);
    }

    #[test]
    fn base_url() {
        #[rustfmt::skip]
        let cases = [
            ("example.com",  "/app/index.php", None,          "http://example.com/app"),
            ("example.com/", "/index.php",     None,          "http://example.com"),
            ("example.com",  "/a/b/index.php", Some("on"),    "https://example.com/a/b"),
            ("example.com",  "/index.php",     Some("ON"),    "https://example.com"),
            ("example.com",  "/index.php",     Some("1"),     "http://example.com"),
            ("example.com\\", "",              Some("off"),   "http://example.com"),
        ];

        for (host, script, https, expected) in cases {
            let mut builder = RequestContext::builder().host(host).script_path(script);
            if let Some(flag) = https {
                builder = builder.https(flag);
            }

            assert_eq!(Http::base_url(&builder.build()), expected);
        }
    }

    #[test]
    fn current_url() {
        #[rustfmt::skip]
        let cases = [
            (None,        "http://example.com/app/x?y=1"),
            (Some(""),    "http://example.com/app/x?y=1"),
            (Some("0"),   "http://example.com/app/x?y=1"),
            (Some("on"),  "https://example.com/app/x?y=1"),
            (Some("off"), "https://example.com/app/x?y=1"),
        ];

        for (https, expected) in cases {
            let mut builder = RequestContext::builder()
                .host("example.com:8080")
                .request_uri("/app/x?y=1");
            if let Some(flag) = https {
                builder = builder.https(flag);
            }

            assert_eq!(Http::current_url(&builder.build()), expected);
        }
    }

    #[test]
    fn uri_helpers() {
        let ctx = RequestContext::builder()
            .request_uri("/app/index.php/foo/bar?x=1")
            .script_path("/app/index.php")
            .build();

        assert_eq!(Http::uri_string(&ctx), "foo/bar");
        assert_eq!(Http::uri_segments(&ctx), ["foo", "bar"]);
        assert_eq!(Http::uri_segment(&ctx, 0).as_deref(), Some("foo"));
        assert_eq!(Http::uri_segment(&ctx, 5), None);
    }

    #[test]
    fn uri_helpers_on_script_itself() {
        let ctx = RequestContext::builder()
            .request_uri("/app/index.php")
            .script_path("/app/index.php")
            .build();

        assert_eq!(Http::uri_string(&ctx), "");
        assert_eq!(Http::uri_segments(&ctx), [""]);
        assert_eq!(Http::uri_segment(&ctx, 0).as_deref(), Some(""));
        assert_eq!(Http::uri_segment(&ctx, 1), None);
    }

    #[test]
    fn ajax() {
        #[rustfmt::skip]
        let cases = [
            (Some("XMLHttpRequest"), true),
            (Some("xmlhttprequest"), false),
            (Some("XMLHttpRequest "), false),
            (Some("fetch"),          false),
            (None,                   false),
        ];

        for (value, expected) in cases {
            let mut builder = RequestContext::builder();
            if let Some(value) = value {
                builder = builder.header("x-requested-with", value);
            }

            assert_eq!(Http::is_ajax_request(&builder.build()), expected);
        }
    }
}
