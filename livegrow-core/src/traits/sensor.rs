//! Climate sensor trait

/// Errors from the climate sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Sensor did not answer within the protocol window
    Timeout,
    /// Frame checksum mismatch
    Checksum,
    /// Pin or bus access failed
    Bus,
}

/// One temperature/humidity sample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClimateReading {
    /// Temperature in degrees Celsius
    pub temperature_c: f32,
    /// Relative humidity in percent
    pub humidity_percent: f32,
}

impl ClimateReading {
    /// Temperature in whole degrees Fahrenheit, truncated toward zero
    pub fn fahrenheit(&self) -> i32 {
        (self.temperature_c * 9.0 / 5.0 + 32.0) as i32
    }

    /// Humidity in whole percent, truncated toward zero
    pub fn humidity(&self) -> i32 {
        self.humidity_percent as i32
    }
}

/// Trait for temperature/humidity sensors
pub trait ClimateSensor {
    /// Take one measurement
    fn measure(&mut self) -> impl core::future::Future<Output = Result<ClimateReading, SensorError>>;
}

impl<T: ClimateSensor + ?Sized> ClimateSensor for &mut T {
    fn measure(&mut self) -> impl core::future::Future<Output = Result<ClimateReading, SensorError>> {
        T::measure(self)
    }
}
