//! Inbound chat messages
//!
//! Field extraction from raw requests and the single stored message the
//! display recalls.

pub mod request;
pub mod store;

pub use request::{extract, Decoded, FormValue, RequestFields, READ_REQUEST_MARKER};
pub use store::{StoredMessage, MESSAGE_CAPACITY, NO_MESSAGE};
