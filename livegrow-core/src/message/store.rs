//! The last received chat message

use core::fmt::Write;

use heapless::String;

use super::request::FormValue;

/// Text shown before any message arrives
pub const NO_MESSAGE: &str = "No message";

/// Byte capacity: a full request buffer plus the `": "` separator
pub const MESSAGE_CAPACITY: usize = 1040;

/// Single stored message
///
/// Written by the connection handler, read by the display scheduler.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    text: String<MESSAGE_CAPACITY>,
}

impl StoredMessage {
    /// Create with the "No message" sentinel
    pub fn new() -> Self {
        let mut text = String::new();
        let _ = text.push_str(NO_MESSAGE);
        Self { text }
    }

    /// Current text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace with `"<user>: <message>"`
    ///
    /// An absent user is written as empty. Text past capacity is dropped
    /// at a character boundary.
    pub fn record(&mut self, user: Option<FormValue<'_>>, message: FormValue<'_>) {
        self.text.clear();
        let mut out = Truncating(&mut self.text);
        if let Some(user) = user {
            let _ = write!(out, "{}", user);
        }
        let _ = write!(out, ": {}", message);
    }
}

impl Default for StoredMessage {
    fn default() -> Self {
        Self::new()
    }
}

/// Writer that silently stops at capacity
struct Truncating<'a, const N: usize>(&'a mut String<N>);

impl<const N: usize> Write for Truncating<'_, N> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_sentinel() {
        let stored = StoredMessage::new();
        assert_eq!(stored.text(), NO_MESSAGE);
    }

    #[test]
    fn test_record_formats_user_and_message() {
        let mut stored = StoredMessage::new();
        stored.record(Some(FormValue::new("Bob")), FormValue::new("Hi+there"));
        assert_eq!(stored.text(), "Bob: Hi there");
    }

    #[test]
    fn test_record_without_user() {
        let mut stored = StoredMessage::new();
        stored.record(None, FormValue::new("hello"));
        assert_eq!(stored.text(), ": hello");

        stored.record(Some(FormValue::new("")), FormValue::new("again"));
        assert_eq!(stored.text(), ": again");
    }

    #[test]
    fn test_record_truncates_at_char_boundary() {
        let mut stored = StoredMessage::new();
        let long = [b'x'; MESSAGE_CAPACITY];
        let long = core::str::from_utf8(&long).unwrap();
        stored.record(Some(FormValue::new("é")), FormValue::new(long));
        assert!(stored.text().len() <= MESSAGE_CAPACITY);
        assert!(stored.text().starts_with("é: xxx"));
    }
}
