//! Device configuration
//!
//! The firmware embeds `device.toml` and parses it at boot with
//! [`parse_config`]. Every field has a default, so a missing key leaves
//! the stock behaviour in place.

pub mod toml;
pub mod types;

pub use toml::{parse_config, ConfigError};
pub use types::{
    AssociationConfig, DeviceConfig, DisplayConfig, DisplayGeometry, NetworkConfig, TimingConfig,
    MAX_BANNER_LEN, MAX_ROWS,
};
