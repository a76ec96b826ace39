//! Screen rendering for each content kind

use core::fmt::Write;

use embedded_hal_async::delay::DelayNs;
use heapless::String;
use rand_core::RngCore;

use super::content::{roll_percent, Content};
use super::{DISPLAY_ERROR, SENSOR_ERROR};
use crate::config::{DeviceConfig, DisplayGeometry, TimingConfig, MAX_BANNER_LEN};
use crate::fault::Fault;
use crate::message::StoredMessage;
use crate::text::{wrap, Line};
use crate::traits::{CharDisplay, ClimateReading, ClimateSensor, DisplayError};

/// Clear the panel and write `text` from the home position
pub async fn show_banner<D: CharDisplay + ?Sized>(
    display: &mut D,
    text: &str,
) -> Result<(), DisplayError> {
    display.clear().await?;
    display.write_text(text).await
}

/// Clear the panel and write one line per row, starting at row 0
async fn draw_page<D, I>(display: &mut D, lines: I) -> Result<(), DisplayError>
where
    D: CharDisplay + ?Sized,
    I: Iterator<Item = Line>,
{
    display.clear().await?;
    for (row, line) in (0u8..).zip(lines) {
        display.move_cursor(0, row).await?;
        display.write_text(&line).await?;
    }
    Ok(())
}

/// Picks and draws the content for each tick
pub struct DisplayScheduler<R> {
    rng: R,
    geometry: DisplayGeometry,
    timing: TimingConfig,
    idle_banner: String<MAX_BANNER_LEN>,
}

impl<R: RngCore> DisplayScheduler<R> {
    /// Create a scheduler paging text with `config.display.scroll`
    pub fn new(rng: R, config: &DeviceConfig) -> Self {
        Self {
            rng,
            geometry: config.display.scroll,
            timing: config.timing,
            idle_banner: config.display.idle_banner.clone(),
        }
    }

    /// Idle banner text
    pub fn idle_banner(&self) -> &str {
        &self.idle_banner
    }

    /// Choose, draw and hold one screen
    ///
    /// Sensor and display faults are shown as banners and absorbed. An
    /// error is returned only when a banner itself cannot be drawn.
    pub async fn tick<D, S, P>(
        &mut self,
        display: &mut D,
        sensor: &mut S,
        delay: &mut P,
        message: &StoredMessage,
    ) -> Result<Content, Fault>
    where
        D: CharDisplay,
        S: ClimateSensor,
        P: DelayNs,
    {
        let content = Content::from_roll(roll_percent(&mut self.rng));
        debug!("display tick: {}", content);

        match content {
            Content::Recall => {
                self.show_message(display, delay, message.text(), self.timing.scroll_page_ms)
                    .await?;
            }
            Content::Banner => {
                show_banner(display, &self.idle_banner).await?;
                delay.delay_ms(self.timing.banner_ms).await;
            }
            Content::Climate => self.show_climate(display, sensor, delay).await?,
        }

        Ok(content)
    }

    /// Scroll `text` one page at a time, holding each page for `page_ms`
    ///
    /// Runs one full pass. A display fault aborts the pass and shows the
    /// display error banner instead.
    pub async fn show_message<D, P>(
        &self,
        display: &mut D,
        delay: &mut P,
        text: &str,
        page_ms: u32,
    ) -> Result<(), Fault>
    where
        D: CharDisplay,
        P: DelayNs,
    {
        let rows = usize::from(self.geometry.rows());
        let mut lines = wrap(text, usize::from(self.geometry.columns())).peekable();

        while lines.peek().is_some() {
            if let Err(e) = draw_page(display, lines.by_ref().take(rows)).await {
                warn!("display fault while scrolling: {}", e);
                self.show_fault(display, delay, DISPLAY_ERROR).await?;
                return Ok(());
            }
            delay.delay_ms(page_ms).await;
        }

        Ok(())
    }

    async fn show_climate<D, S, P>(
        &self,
        display: &mut D,
        sensor: &mut S,
        delay: &mut P,
    ) -> Result<(), Fault>
    where
        D: CharDisplay,
        S: ClimateSensor,
        P: DelayNs,
    {
        let drawn = match sensor.measure().await {
            Ok(reading) => draw_climate(display, &reading).await.map_err(Fault::from),
            Err(e) => Err(Fault::from(e)),
        };

        match drawn {
            Ok(()) => {
                delay.delay_ms(self.timing.climate_ms).await;
                Ok(())
            }
            Err(fault) => {
                warn!("climate screen failed: {}", fault);
                self.show_fault(display, delay, SENSOR_ERROR).await
            }
        }
    }

    /// Draw a fault banner and hold it for the fault time
    async fn show_fault<D, P>(&self, display: &mut D, delay: &mut P, banner: &str) -> Result<(), Fault>
    where
        D: CharDisplay,
        P: DelayNs,
    {
        show_banner(display, banner).await?;
        delay.delay_ms(self.timing.fault_ms).await;
        Ok(())
    }
}

async fn draw_climate<D: CharDisplay>(
    display: &mut D,
    reading: &ClimateReading,
) -> Result<(), DisplayError> {
    let mut temperature: String<20> = String::new();
    let mut humidity: String<20> = String::new();
    // i32 values always fit
    let _ = write!(temperature, "Temp: {} F", reading.fahrenheit());
    let _ = write!(humidity, "Humidity: {} %", reading.humidity());

    display.clear().await?;
    display.move_cursor(0, 0).await?;
    display.write_text(&temperature).await?;
    display.move_cursor(0, 1).await?;
    display.write_text(&humidity).await
}
