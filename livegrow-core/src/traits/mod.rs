//! Collaborator traits
//!
//! These traits define the interface between the application logic
//! and the board: the character display, the climate sensor and the
//! network stack.

pub mod display;
pub mod network;
pub mod sensor;

pub use display::{CharDisplay, DisplayError};
pub use network::{Connection, ConnectionAttempt, Listener, NetworkError, NetworkLink};
pub use sensor::{ClimateReading, ClimateSensor, SensorError};
