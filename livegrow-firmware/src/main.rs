//! LiveGrow - grow-tent status display firmware
//!
//! Raspberry Pi Pico W with a 20x4 HD44780 on an I2C backpack and a DHT11.
//! Shows climate readings, a banner, and the last message posted to the
//! built-in HTTP endpoint.
//!
//! Wiring:
//! - GP0 / GP1: I2C0 SDA / SCL to the PCF8574 backpack
//! - GP16: DHT11 data (module carries its own pull-up)
//! - GP23 / GP24 / GP25 / GP29: on-board CYW43 (power, data, chip select, clock)

#![no_std]
#![no_main]

use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::*;
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, DhcpConfig, StackResources};
use embassy_rp::bind_interrupts;
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::{Level, Output, OutputOpenDrain};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C0, PIO0};
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use embassy_time::Delay;
use rand_core::RngCore;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use livegrow_core::config::{parse_config, DeviceConfig};
use livegrow_drivers::display::Hd44780;
use livegrow_drivers::sensor::Dht11;

use crate::net::{SocketBuffers, SOCKET_BUFFER_SIZE};
use crate::tasks::Credentials;

mod net;
mod tasks;

/// Embedded configuration (compiled into firmware)
/// Edit device.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../device.toml");

/// Credentials come from the build environment, never from device.toml
const WIFI_SSID: &str = match option_env!("WIFI_SSID") {
    Some(ssid) => ssid,
    None => "",
};
const WIFI_PASSWORD: &str = match option_env!("WIFI_PASSWORD") {
    Some(password) => password,
    None => "",
};

/// I2C bus speed for the LCD backpack
const I2C_FREQUENCY_HZ: u32 = 400_000;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

static CYW43_STATE: StaticCell<cyw43::State> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<2>> = StaticCell::new();
static SOCKET_BUFFERS: StaticCell<SocketBuffers> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("LiveGrow firmware starting...");

    let p = embassy_rp::init(Default::default());
    let config = load_config();

    // LCD behind the PCF8574 backpack
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQUENCY_HZ;
    let i2c = I2c::new_async(p.I2C0, p.PIN_1, p.PIN_0, Irqs, i2c_config);
    let mut display = Hd44780::new(i2c, Delay, config.display.i2c_address, config.display.panel);
    match display.init().await {
        Ok(()) => {
            let geometry = display.geometry();
            info!("Display initialized ({}x{})", geometry.columns(), geometry.rows());
        }
        Err(e) => error!("Display init failed: {}", e),
    }

    let sensor = Dht11::new(OutputOpenDrain::new(p.PIN_16, Level::High), Delay);

    // CYW43 over PIO SPI
    let fw = include_bytes!("../cyw43-firmware/43439A0.bin");
    let clm = include_bytes!("../cyw43-firmware/43439A0_clm.bin");

    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    let state = CYW43_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    spawner.spawn(tasks::cyw43_task(runner)).unwrap();

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;
    info!("Radio initialized");

    let mut rng = RoscRng;
    let seed = rng.next_u64();
    let (stack, runner) = embassy_net::new(
        net_device,
        NetConfig::dhcpv4(DhcpConfig::default()),
        NET_RESOURCES.init(StackResources::new()),
        seed,
    );
    spawner.spawn(tasks::net_task(runner)).unwrap();

    if WIFI_SSID.is_empty() {
        warn!("Built without WIFI_SSID, association will keep failing");
    }
    let credentials = Credentials {
        ssid: WIFI_SSID,
        password: WIFI_PASSWORD,
    };
    let buffers = SOCKET_BUFFERS.init(([0; SOCKET_BUFFER_SIZE], [0; SOCKET_BUFFER_SIZE]));

    spawner
        .spawn(tasks::supervisor_task(
            config,
            control,
            stack,
            buffers,
            credentials,
            display,
            sensor,
            rng,
        ))
        .unwrap();

    info!("All tasks spawned, firmware running");
}

/// Parse the embedded device.toml, falling back to built-in defaults
fn load_config() -> DeviceConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!(
                "Config: port {}, panel {}x{}, text {}x{}",
                config.network.port,
                config.display.panel.columns(),
                config.display.panel.rows(),
                config.display.scroll.columns(),
                config.display.scroll.rows()
            );
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {}", e);
            error!("Using built-in defaults");
            DeviceConfig::default()
        }
    }
}
