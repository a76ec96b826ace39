//! Fault taxonomy
//!
//! Everything that can go wrong inside one tick. Accept timeouts are not
//! faults; they surface as [`ConnectionAttempt::TimedOut`]. Any fault that
//! escapes a tick is caught by [`Supervisor::step`].
//!
//! [`Supervisor::step`]: crate::supervisor::Supervisor::step
//! [`ConnectionAttempt::TimedOut`]: crate::traits::ConnectionAttempt::TimedOut

use crate::traits::{DisplayError, NetworkError, SensorError};

/// A fault raised during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Climate sensor failed
    Sensor(SensorError),
    /// Display could not be drawn
    Display(DisplayError),
    /// Connection-level failure, listener still usable
    NetworkTransient(NetworkError),
    /// Listener or link unusable
    NetworkFatal(NetworkError),
    /// Request bytes were not valid UTF-8
    Decode,
}

impl From<SensorError> for Fault {
    fn from(e: SensorError) -> Self {
        Fault::Sensor(e)
    }
}

impl From<DisplayError> for Fault {
    fn from(e: DisplayError) -> Self {
        Fault::Display(e)
    }
}
