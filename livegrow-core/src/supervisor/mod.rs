//! Top-level loop
//!
//! Keeps the Wi-Fi link and the listener alive, then services one
//! connection and one display screen per tick. No fault ends the loop.

pub mod runner;
pub mod state;

pub use runner::Supervisor;
pub use state::{LinkEvent, LinkState};
