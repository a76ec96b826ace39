//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in livegrow-core:
//!
//! - Character LCD (HD44780 behind a PCF8574 I2C backpack)
//! - Temperature/humidity sensor (DHT11)

#![no_std]
#![deny(unsafe_code)]

pub mod display;
pub mod sensor;
