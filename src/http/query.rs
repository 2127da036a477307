//! Query-string and form-body splitter.

use memchr::memchr;
use std::{error, fmt};

/// Splits `application/x-www-form-urlencoded` data into key/value pairs.
///
/// Used for both the query part of the request target and urlencoded form
/// bodies. Pairs keep their order and are borrowed from the input; **no
/// percent-decoding is performed**.
///
/// # Examples
/// ```rust
/// use http_facade::query::Query;
///
/// let params = Query::parse("name=john&age=25&city", 10).unwrap();
/// assert_eq!(params, [("name", "john"), ("age", "25"), ("city", "")]);
///
/// // Handle limits
/// assert!(Query::parse("a=1&b=2", 1).is_err());
/// ```
/// All possible formats:
/// ```rust
/// use http_facade::query::Query;
///
/// let params = Query::parse("debug&name=&=Qwe&key=sda&&", 10).unwrap();
///
/// assert_eq!(params.len(), 5);
/// assert_eq!(params[0], ("debug", ""));
/// assert_eq!(params[1], ("name", ""));
/// assert_eq!(params[2], ("", "Qwe"));
/// assert_eq!(params[3], ("key", "sda"));
/// assert_eq!(params[4], ("", ""));
/// ```
pub struct Query;

impl Query {
    /// Parses a query string into a new vector.
    ///
    /// - `input`: the query string; a leading `?` is skipped, so `?a=1` and
    ///   `a=1` are equivalent
    /// - `limit`: maximum number of pairs
    #[inline]
    pub fn parse(input: &str, limit: usize) -> Result<Vec<(&str, &str)>, Error> {
        let mut result = Vec::with_capacity(limit.min(16));
        Self::parse_into(&mut result, input, limit)?;
        Ok(result)
    }

    /// Parses a query string, appending to an existing vector.
    ///
    /// The limit counts the pairs already present in `result`.
    pub fn parse_into<'a>(
        result: &mut Vec<(&'a str, &'a str)>,
        input: &'a str,
        limit: usize,
    ) -> Result<(), Error> {
        let data = match input.as_bytes().first().ok_or(Error::Empty)? {
            b'?' => &input[1..],
            _ => input,
        };

        let bytes = data.as_bytes();
        let mut start = 0;
        while start < data.len() {
            if result.len() >= limit {
                return Err(Error::OverLimit(limit));
            }

            let end = memchr(b'&', &bytes[start..])
                .map(|pos| start + pos)
                .unwrap_or(data.len());

            let split = start + memchr(b'=', &bytes[start..end]).unwrap_or(end - start);

            let key = &data[start..split];
            let value = match split < end {
                true => &data[split + 1..end],
                false => "",
            };

            result.push((key, value));
            start = end + 1;
        }

        Ok(())
    }
}

/// Errors produced by [`Query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// More pairs than the allowed maximum.
    ///
    /// # Fields
    /// - `0`: the maximum allowed number of pairs
    OverLimit(usize),

    /// The input is empty.
    Empty,
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OverLimit(limit) => {
                write!(f, "Query parameter limit exceeded: limit={}", limit)
            }
            Error::Empty => write!(f, "Query string is empty"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic() {
        for line in ["a=1&b=2", "?a=1&b=2"] {
            let params = Query::parse(line, 8).unwrap();
            assert_eq!(params, [("a", "1"), ("b", "2")]);
        }
    }

    #[test]
    fn full() {
        let params = Query::parse("flag&empty=&=val&&key=value", 10).unwrap();

        assert_eq!(
            params,
            [("flag", ""), ("empty", ""), ("", "val"), ("", ""), ("key", "value")]
        );
    }

    #[test]
    fn value_keeps_later_equals_and_encoding() {
        let params = Query::parse("next=/a?b=c&mail=user%40example.com", 4).unwrap();

        assert_eq!(params[0], ("next", "/a?b=c"));
        assert_eq!(params[1], ("mail", "user%40example.com"));
    }

    #[test]
    fn only_question_mark() {
        assert_eq!(Query::parse("?", 4), Ok(vec![]));
    }

    #[test]
    fn append() {
        let mut params = Vec::new();
        Query::parse_into(&mut params, "a=1", 4).unwrap();
        Query::parse_into(&mut params, "b=2", 4).unwrap();

        assert_eq!(params, [("a", "1"), ("b", "2")]);
        assert_eq!(
            Query::parse_into(&mut params, "c&d&e", 3),
            Err(Error::OverLimit(3))
        );
    }

    #[test]
    fn limit_error() {
        assert_eq!(Query::parse("a&a", 1), Err(Error::OverLimit(1)));
    }

    #[test]
    fn empty_error() {
        assert_eq!(Query::parse("", 10), Err(Error::Empty));
    }
}
