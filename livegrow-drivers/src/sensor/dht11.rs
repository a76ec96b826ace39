//! DHT11 temperature/humidity sensor driver
//!
//! Single-wire protocol on an open-drain pin with pull-up:
//!
//! 1. Host pulls the line low for at least 18 ms, then releases it.
//! 2. Sensor answers with ~80 us low, ~80 us high.
//! 3. 40 data bits follow, MSB first. Each bit is ~50 us low then a high
//!    pulse of ~27 us (0) or ~70 us (1).
//!
//! Bits are decoded by sampling the line 35 us into each high pulse. The
//! bit timing is busy-waited with a blocking delay.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use livegrow_core::traits::{ClimateReading, ClimateSensor, SensorError};

/// Host start pulse length
const START_LOW_MS: u32 = 18;

/// Sample point inside each high pulse
const BIT_SAMPLE_US: u32 = 35;

/// Longest wait for any edge
const EDGE_TIMEOUT_US: u32 = 100;

/// Decode a raw 5-byte frame
///
/// Layout: humidity integer, humidity decimal, temperature integer,
/// temperature decimal (bit 7 = below zero), checksum.
pub fn decode_frame(frame: &[u8; 5]) -> Result<ClimateReading, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    if sum != frame[4] {
        return Err(SensorError::Checksum);
    }

    let humidity_percent = f32::from(frame[0]) + f32::from(frame[1]) * 0.1;
    let magnitude = f32::from(frame[2]) + f32::from(frame[3] & 0x7f) * 0.1;
    let temperature_c = if frame[3] & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    };

    Ok(ClimateReading {
        temperature_c,
        humidity_percent,
    })
}

/// DHT11 driver
pub struct Dht11<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    /// Create a driver on an open-drain pin
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// Take one reading
    pub fn read(&mut self) -> Result<ClimateReading, SensorError> {
        let frame = self.read_frame()?;
        let reading = decode_frame(&frame);
        #[cfg(feature = "defmt")]
        if reading.is_err() {
            defmt::debug!("DHT11 frame rejected: {:x}", frame);
        }
        reading
    }

    fn read_frame(&mut self) -> Result<[u8; 5], SensorError> {
        self.pin.set_low().map_err(|_| SensorError::Bus)?;
        self.delay.delay_ms(START_LOW_MS);
        self.pin.set_high().map_err(|_| SensorError::Bus)?;

        // Response: low, high, then the first bit's low phase
        self.wait_for(false)?;
        self.wait_for(true)?;
        self.wait_for(false)?;

        let mut frame = [0u8; 5];
        for byte in frame.iter_mut() {
            for _ in 0..8 {
                *byte = (*byte << 1) | u8::from(self.read_bit()?);
            }
        }
        Ok(frame)
    }

    fn read_bit(&mut self) -> Result<bool, SensorError> {
        self.wait_for(true)?;
        self.delay.delay_us(BIT_SAMPLE_US);
        let bit = self.pin.is_high().map_err(|_| SensorError::Bus)?;
        self.wait_for(false)?;
        Ok(bit)
    }

    /// Busy-wait until the line reads `high`
    fn wait_for(&mut self, high: bool) -> Result<(), SensorError> {
        for _ in 0..EDGE_TIMEOUT_US {
            if self.pin.is_high().map_err(|_| SensorError::Bus)? == high {
                return Ok(());
            }
            self.delay.delay_us(1);
        }
        Err(SensorError::Timeout)
    }
}

impl<P, D> ClimateSensor for Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    async fn measure(&mut self) -> Result<ClimateReading, SensorError> {
        self.read()
    }
}
