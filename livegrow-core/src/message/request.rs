//! Query field extraction
//!
//! Only two fields are recognised, `user` and `message`. Values are taken
//! verbatim up to the next `&` (or space), then decoded by turning `+` and
//! `%20` into spaces. No other escapes are decoded.

use core::fmt;

/// Substring that marks a request we parse fields from
pub const READ_REQUEST_MARKER: &str = "GET /";

/// Fields found in one request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestFields<'a> {
    /// Sender name
    pub user: Option<FormValue<'a>>,
    /// Message text
    pub message: Option<FormValue<'a>>,
}

/// Extract `user` and `message` from a raw request
///
/// Requests without [`READ_REQUEST_MARKER`] yield no fields. Never fails.
pub fn extract(request: &str) -> RequestFields<'_> {
    if !request.contains(READ_REQUEST_MARKER) {
        return RequestFields::default();
    }

    RequestFields {
        user: field(request, "user"),
        message: field(request, "message"),
    }
}

/// Locate the first `<name>=` and slice out its raw value
fn field<'a>(request: &'a str, name: &str) -> Option<FormValue<'a>> {
    let start = request
        .match_indices(name)
        .map(|(at, _)| at + name.len())
        .find(|&end| request[end..].starts_with('='))?
        + 1;

    let rest = &request[start..];
    let end = rest
        .find('&')
        .or_else(|| rest.find(' '))
        .unwrap_or(rest.len());

    Some(FormValue { raw: &rest[..end] })
}

/// A form-encoded value borrowed from the request buffer
///
/// Decoding happens on the fly through [`FormValue::chars`] and the
/// `Display` impl, so nothing is copied until the value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormValue<'a> {
    raw: &'a str,
}

impl<'a> FormValue<'a> {
    /// Wrap an undecoded value
    pub const fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    /// The value as it appeared in the request
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Whether the value is empty
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Decoded characters
    pub fn chars(&self) -> Decoded<'a> {
        Decoded { rest: self.raw }
    }
}

impl fmt::Display for FormValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;
        self.chars().try_for_each(|c| f.write_char(c))
    }
}

impl PartialEq<str> for FormValue<'_> {
    fn eq(&self, other: &str) -> bool {
        self.chars().eq(other.chars())
    }
}

impl PartialEq<&str> for FormValue<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.chars().eq(other.chars())
    }
}

/// Iterator over the decoded characters of a [`FormValue`]
#[derive(Debug, Clone)]
pub struct Decoded<'a> {
    rest: &'a str,
}

impl Iterator for Decoded<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        if let Some(rest) = self.rest.strip_prefix("%20") {
            self.rest = rest;
            return Some(' ');
        }

        let mut chars = self.rest.chars();
        let c = chars.next()?;
        self.rest = chars.as_str();
        Some(if c == '+' { ' ' } else { c })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_both_fields() {
        let fields = extract("GET /?user=Ann&message=Hi+there HTTP/1.1");
        assert_eq!(fields.user.unwrap(), "Ann");
        assert_eq!(fields.message.unwrap(), "Hi there");
    }

    #[test]
    fn test_extract_percent_space() {
        let fields = extract("GET /?message=Hello%20World HTTP/1.1");
        assert!(fields.user.is_none());
        assert_eq!(fields.message.unwrap(), "Hello World");
    }

    #[test]
    fn test_no_query_fields() {
        let fields = extract("GET /favicon.ico HTTP/1.1");
        assert!(fields.user.is_none());
        assert!(fields.message.is_none());
    }

    #[test]
    fn test_requires_read_marker() {
        let fields = extract("POST /?user=Ann&message=Hi HTTP/1.1");
        assert_eq!(fields, RequestFields::default());
    }

    #[test]
    fn test_empty_value_is_present() {
        let fields = extract("GET /?user=&message=hi HTTP/1.1");
        let user = fields.user.unwrap();
        assert!(user.is_empty());
        assert_eq!(user, "");
    }

    #[test]
    fn test_value_runs_to_end_without_delimiters() {
        let fields = extract("GET /?message=tail");
        assert_eq!(fields.message.unwrap().raw(), "tail");
    }

    #[test]
    fn test_ampersand_wins_over_space() {
        // An '&' anywhere after the value takes priority over an earlier space
        let fields = extract("GET /?message=a b HTTP/1.1\r\nX-Q: c&d");
        assert_eq!(fields.message.unwrap().raw(), "a b HTTP/1.1\r\nX-Q: c");
    }

    #[test]
    fn test_other_escapes_left_alone() {
        let fields = extract("GET /?message=100%25+sure%21 HTTP/1.1");
        assert_eq!(fields.message.unwrap(), "100%25 sure%21");
    }

    #[test]
    fn test_name_without_equals_is_skipped() {
        let fields = extract("GET /user/profile?user=Bob HTTP/1.1");
        assert_eq!(fields.user.unwrap(), "Bob");
    }

    #[test]
    fn test_first_occurrence_wins() {
        let fields = extract("GET /?user=one&user=two HTTP/1.1");
        assert_eq!(fields.user.unwrap(), "one");
    }

    #[test]
    fn test_decode_order_matches_sequential_replace() {
        let value = FormValue::new("a+%20+b%2");
        assert_eq!(value, "a   b%2");
    }
}
