//! Inbound connection handling
//!
//! One bounded accept per tick. Every accepted request gets the same
//! plain-text acknowledgement.

pub mod handler;

pub use handler::{ConnectionHandler, HandleOutcome, ACKNOWLEDGEMENT, REQUEST_BUFFER_SIZE};
