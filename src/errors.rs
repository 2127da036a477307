use crate::query;
use std::{error, fmt};

/// Errors produced while building a [`RequestContext`](crate::RequestContext)
/// from a raw request head.
///
/// Lookups never fail: missing parameters, headers and segments are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The request head is not valid UTF-8.
    InvalidUtf8,
    /// The head is larger than [`ReqLimits::head_size`](crate::limits::ReqLimits::head_size).
    HeadTooLarge(usize),

    /// The first line is not `METHOD SP TARGET SP VERSION`.
    InvalidRequestLine,
    /// The version token is neither `HTTP/1.0` nor `HTTP/1.1`.
    UnsupportedVersion,

    /// A header line has no `:` or an empty name.
    InvalidHeader,
    /// More headers than [`ReqLimits::header_count`](crate::limits::ReqLimits::header_count).
    TooManyHeaders(usize),

    /// The query string or form body could not be split.
    Query(query::Error),
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Query(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidUtf8 => write!(f, "Request head is not valid UTF-8"),
            Error::HeadTooLarge(limit) => write!(f, "Request head too large: limit={}", limit),
            Error::InvalidRequestLine => write!(f, "Invalid request line"),
            Error::UnsupportedVersion => write!(f, "HTTP version not supported"),
            Error::InvalidHeader => write!(f, "Invalid header format"),
            Error::TooManyHeaders(limit) => write!(f, "Too many headers: limit={}", limit),
            Error::Query(err) => write!(f, "Invalid query string: {}", err),
        }
    }
}

impl From<query::Error> for Error {
    fn from(err: query::Error) -> Self {
        Error::Query(err)
    }
}

impl From<simdutf8::basic::Utf8Error> for Error {
    fn from(_: simdutf8::basic::Utf8Error) -> Self {
        Error::InvalidUtf8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            Error::from(query::Error::OverLimit(2)).to_string(),
            "Invalid query string: Query parameter limit exceeded: limit=2"
        );
        assert_eq!(Error::TooManyHeaders(8).to_string(), "Too many headers: limit=8");
    }

    #[test]
    fn source_chain() {
        use std::error::Error as _;

        assert!(Error::Query(query::Error::Empty).source().is_some());
        assert!(Error::InvalidHeader.source().is_none());
    }
}
