//! Accept, parse, acknowledge

use crate::fault::Fault;
use crate::message::{extract, StoredMessage};
use crate::traits::{Connection, ConnectionAttempt, Listener, NetworkError};

/// Bytes read from each request
pub const REQUEST_BUFFER_SIZE: usize = 1024;

/// Response sent on every accepted connection
pub const ACKNOWLEDGEMENT: &[u8] =
    b"HTTP/1.0 200 OK\r\nContent-type: text/plain\r\n\r\nMessage received";

/// What happened during one [`ConnectionHandler::handle`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandleOutcome {
    /// No client within the accept timeout
    Idle,
    /// A request was answered
    Served {
        /// The stored message was replaced
        updated: bool,
    },
    /// A client connected but the request was dropped
    Rejected(Fault),
    /// Accept failed; the listener is still usable
    Transient(NetworkError),
    /// The listener is broken and must be recreated
    ListenerFailed(NetworkError),
}

/// Services one connection per tick
pub struct ConnectionHandler {
    accept_timeout_ms: u32,
    buffer: [u8; REQUEST_BUFFER_SIZE],
}

impl ConnectionHandler {
    /// Create a handler waiting up to `accept_timeout_ms` per tick
    pub fn new(accept_timeout_ms: u32) -> Self {
        Self {
            accept_timeout_ms,
            buffer: [0; REQUEST_BUFFER_SIZE],
        }
    }

    /// Accept at most one connection and answer it
    pub async fn handle<L: Listener>(
        &mut self,
        listener: &mut L,
        message: &mut StoredMessage,
    ) -> HandleOutcome {
        let mut connection = match listener.accept(self.accept_timeout_ms).await {
            ConnectionAttempt::Accepted(connection) => connection,
            ConnectionAttempt::TimedOut => return HandleOutcome::Idle,
            ConnectionAttempt::TransientError(e) => {
                warn!("accept failed: {}", e);
                return HandleOutcome::Transient(e);
            }
            ConnectionAttempt::FatalError(e) => {
                error!("listener failed: {}", e);
                return HandleOutcome::ListenerFailed(e);
            }
        };

        let outcome = self.serve(&mut connection, message).await;
        connection.close().await;
        outcome
    }

    async fn serve<C: Connection>(
        &mut self,
        connection: &mut C,
        message: &mut StoredMessage,
    ) -> HandleOutcome {
        let len = match connection.receive(&mut self.buffer).await {
            Ok(len) => len,
            Err(e) => {
                warn!("receive failed: {}", e);
                return HandleOutcome::Rejected(Fault::NetworkTransient(e));
            }
        };

        let request = match core::str::from_utf8(&self.buffer[..len]) {
            Ok(request) => request,
            Err(_) => {
                warn!("request is not valid UTF-8 ({} bytes)", len);
                return HandleOutcome::Rejected(Fault::Decode);
            }
        };

        let fields = extract(request);
        let updated = match fields.message {
            Some(text) if !text.is_empty() => {
                message.record(fields.user, text);
                info!("stored message ({} bytes)", message.text().len());
                true
            }
            _ => false,
        };

        if let Err(e) = connection.send(ACKNOWLEDGEMENT).await {
            warn!("acknowledgement failed: {}", e);
        }

        HandleOutcome::Served { updated }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::*;

    const ACK_TEXT: &str = "HTTP/1.0 200 OK\r\nContent-type: text/plain\r\n\r\nMessage received";

    fn handle(listener: &mut MockListener, message: &mut StoredMessage) -> HandleOutcome {
        let mut handler = ConnectionHandler::new(1000);
        block_on(handler.handle(listener, message))
    }

    #[test]
    fn test_message_stored_and_acknowledged() {
        let mut listener =
            MockListener::with(&[Script::Request(b"GET /?user=Bob&message=Test HTTP/1.1\r\n\r\n")]);
        let mut message = StoredMessage::new();

        let outcome = handle(&mut listener, &mut message);

        assert_eq!(outcome, HandleOutcome::Served { updated: true });
        assert_eq!(message.text(), "Bob: Test");
        assert!(listener.response().contains("Message received"));
        assert_eq!(listener.response(), ACK_TEXT);
        assert_eq!(listener.closed, 1);
    }

    #[test]
    fn test_timeout_is_idle() {
        let mut listener = MockListener::default();
        let mut message = StoredMessage::new();

        assert_eq!(handle(&mut listener, &mut message), HandleOutcome::Idle);
        assert_eq!(message.text(), "No message");
        assert_eq!(listener.closed, 0);
    }

    #[test]
    fn test_request_without_message_still_acknowledged() {
        let mut listener = MockListener::with(&[Script::Request(b"GET /favicon.ico HTTP/1.1\r\n\r\n")]);
        let mut message = StoredMessage::new();

        let outcome = handle(&mut listener, &mut message);

        assert_eq!(outcome, HandleOutcome::Served { updated: false });
        assert_eq!(message.text(), "No message");
        assert_eq!(listener.response(), ACK_TEXT);
        assert_eq!(listener.closed, 1);
    }

    #[test]
    fn test_empty_message_field_ignored() {
        let mut listener = MockListener::with(&[Script::Request(b"GET /?user=Ann&message= HTTP/1.1")]);
        let mut message = StoredMessage::new();

        let outcome = handle(&mut listener, &mut message);

        assert_eq!(outcome, HandleOutcome::Served { updated: false });
        assert_eq!(message.text(), "No message");
    }

    #[test]
    fn test_missing_user_stored_with_empty_name() {
        let mut listener = MockListener::with(&[Script::Request(b"GET /?message=hi+all HTTP/1.1")]);
        let mut message = StoredMessage::new();

        handle(&mut listener, &mut message);

        assert_eq!(message.text(), ": hi all");
    }

    #[test]
    fn test_invalid_utf8_dropped_without_reply() {
        let mut listener = MockListener::with(&[Script::Request(b"GET /?message=\xff\xfe HTTP/1.1")]);
        let mut message = StoredMessage::new();

        let outcome = handle(&mut listener, &mut message);

        assert_eq!(outcome, HandleOutcome::Rejected(Fault::Decode));
        assert_eq!(message.text(), "No message");
        assert!(listener.sent.is_empty());
        assert_eq!(listener.closed, 1);
    }

    #[test]
    fn test_receive_failure_closes_connection() {
        let mut listener = MockListener::with(&[Script::ReceiveFails]);
        let mut message = StoredMessage::new();

        let outcome = handle(&mut listener, &mut message);

        assert_eq!(
            outcome,
            HandleOutcome::Rejected(Fault::NetworkTransient(NetworkError::ConnectionReset))
        );
        assert_eq!(listener.closed, 1);
    }

    #[test]
    fn test_transient_and_fatal_accept_errors() {
        let mut listener = MockListener::with(&[Script::Transient, Script::Fatal]);
        let mut message = StoredMessage::new();

        assert_eq!(
            handle(&mut listener, &mut message),
            HandleOutcome::Transient(NetworkError::ConnectionReset)
        );
        assert_eq!(
            handle(&mut listener, &mut message),
            HandleOutcome::ListenerFailed(NetworkError::InvalidState)
        );
        assert_eq!(listener.accepts, 2);
    }

    #[test]
    fn test_later_message_replaces_earlier() {
        let mut listener = MockListener::with(&[
            Script::Request(b"GET /?user=A&message=first HTTP/1.1"),
            Script::Request(b"GET /?user=B&message=second HTTP/1.1"),
        ]);
        let mut message = StoredMessage::new();

        handle(&mut listener, &mut message);
        handle(&mut listener, &mut message);

        assert_eq!(message.text(), "B: second");
    }
}
