//! Display content scheduler
//!
//! Each tick the scheduler rolls a number in `[0, 100)` and shows either
//! the stored message, the idle banner or the climate readings. The hold
//! time after drawing is the loop's only throttle.

pub mod content;
pub mod display;

pub use content::{roll_percent, Content};
pub use display::{show_banner, DisplayScheduler};

/// Shown when the climate sensor cannot be read
pub const SENSOR_ERROR: &str = "Sensor Error";

/// Shown when a message cannot be drawn
pub const DISPLAY_ERROR: &str = "Display Error";

/// Shown when a fault reaches the supervisor
pub const MAIN_ERROR: &str = "Main Error";
