//! Embassy async tasks
//!
//! The radio and the IP stack each need a runner polled forever. All
//! application logic lives in the supervisor task.

use cyw43_pio::PioSpi;
use defmt::*;
use embassy_net::Stack;
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::{Output, OutputOpenDrain};
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::{DMA_CH0, I2C0, PIO0};
use embassy_time::Delay;

use livegrow_core::config::DeviceConfig;
use livegrow_core::supervisor::Supervisor;
use livegrow_drivers::display::Hd44780;
use livegrow_drivers::sensor::Dht11;

use crate::net::{listen_socket, SocketBuffers, WifiLink};

/// LCD as wired on this board
pub type Lcd = Hd44780<I2c<'static, I2C0, Async>, Delay>;

/// Climate sensor as wired on this board
pub type Sensor = Dht11<OutputOpenDrain<'static>, Delay>;

/// Wi-Fi credentials baked in at build time
pub struct Credentials {
    pub ssid: &'static str,
    pub password: &'static str,
}

/// Drives the CYW43 bus and firmware event loop
#[embassy_executor::task]
pub async fn cyw43_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

/// Drives the embassy-net stack (DHCP, ARP, TCP timers)
#[embassy_executor::task]
pub async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Runs the supervisor loop
///
/// The listening socket lives in this task's frame so the link and every
/// listener it hands out can share it.
#[embassy_executor::task]
#[allow(clippy::too_many_arguments)]
pub async fn supervisor_task(
    config: DeviceConfig,
    control: cyw43::Control<'static>,
    stack: Stack<'static>,
    buffers: &'static mut SocketBuffers,
    credentials: Credentials,
    display: Lcd,
    sensor: Sensor,
    rng: RoscRng,
) -> ! {
    info!("Supervisor task started");

    let socket = listen_socket(stack, buffers);
    let link = WifiLink::new(
        control,
        stack,
        &socket,
        credentials.ssid,
        credentials.password,
    );

    let mut supervisor = Supervisor::new(config, link, display, sensor, Delay, rng);
    supervisor.run().await
}
