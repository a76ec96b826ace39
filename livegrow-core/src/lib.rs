//! Board-agnostic core logic for the LiveGrow status display
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits for the display, the climate sensor and the network
//! - Word wrapping and pagination for fixed-pitch displays
//! - Request field extraction and the stored chat message
//! - Display content scheduler
//! - Connection handler and supervisor loop
//! - Configuration types and the embedded TOML parser

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod connection;
pub mod fault;
pub mod message;
pub mod scheduler;
pub mod supervisor;
pub mod text;
pub mod traits;

#[cfg(test)]
mod mock;
