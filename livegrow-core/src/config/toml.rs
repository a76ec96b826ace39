//! Simple TOML parser for device configuration
//!
//! This is a minimal, allocation-free parser that handles only the subset
//! used by `device.toml`. It does NOT support all of TOML.
//!
//! Supported features:
//! - Key = value pairs (string, integer, hex integer, boolean)
//! - [section] headers
//! - Comments (# ...)
//!
//! Unknown keys are ignored so older firmware keeps booting with newer
//! config files. Unknown sections are an error.

use heapless::String;

use super::types::{DeviceConfig, DisplayGeometry};

/// Usable 7-bit I2C addresses; the rest are reserved by the bus
const I2C_ADDRESSES: core::ops::RangeInclusive<u8> = 0x08..=0x77;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Invalid section header
    InvalidSection,
    /// Invalid value type or out of range
    InvalidValue,
    /// Display geometry outside the supported range
    InvalidGeometry,
    /// A timing value of zero
    ZeroDuration,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Display,
    Network,
    Association,
    Timing,
}

/// Geometry fields are collected first and validated once the file is read
#[derive(Default)]
struct PendingGeometry {
    panel_columns: Option<u8>,
    panel_rows: Option<u8>,
    scroll_columns: Option<u8>,
    scroll_rows: Option<u8>,
}

/// Parse TOML configuration into DeviceConfig
pub fn parse_config(input: &str) -> Result<DeviceConfig, ConfigError> {
    let mut config = DeviceConfig::default();
    let mut geometry = PendingGeometry::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config, &mut geometry)?;
        }
    }

    config.display.panel = resolve_geometry(
        geometry.panel_columns,
        geometry.panel_rows,
        config.display.panel,
    )?;
    config.display.scroll = resolve_geometry(
        geometry.scroll_columns,
        geometry.scroll_rows,
        config.display.scroll,
    )?;

    validate(&config)?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ConfigError> {
    match header.trim() {
        "display" => Ok(Section::Display),
        "network" => Ok(Section::Network),
        "association" => Ok(Section::Association),
        "timing" => Ok(Section::Timing),
        _ => Err(ConfigError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = match value.find('#') {
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => {
            value[..hash_pos].trim()
        }
        _ => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Parse an integer value, accepting `0x` hex
fn parse_int<T: TryFrom<u32>>(value: &str) -> Result<T, ConfigError> {
    let digits = strip_underscores(value);
    let raw = match digits.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => digits.parse(),
    }
    .map_err(|_| ConfigError::InvalidValue)?;
    T::try_from(raw).map_err(|_| ConfigError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue),
    }
}

/// Drop the `_` digit separators TOML allows
fn strip_underscores(value: &str) -> String<16> {
    let mut out = String::new();
    for c in value.chars().filter(|&c| c != '_') {
        if out.push(c).is_err() {
            // Longer than any u32; leave something the number parser rejects
            out.clear();
            let _ = out.push('!');
            break;
        }
    }
    out
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut DeviceConfig,
    geometry: &mut PendingGeometry,
) -> Result<(), ConfigError> {
    match section {
        Section::Root => {
            if key == "announce_on_receive" {
                config.announce_on_receive = parse_bool(value)?;
            }
        }
        Section::Display => match key {
            "panel_columns" => geometry.panel_columns = Some(parse_int(value)?),
            "panel_rows" => geometry.panel_rows = Some(parse_int(value)?),
            "scroll_columns" => geometry.scroll_columns = Some(parse_int(value)?),
            "scroll_rows" => geometry.scroll_rows = Some(parse_int(value)?),
            "i2c_address" => {
                let address: u8 = parse_int(value)?;
                if !I2C_ADDRESSES.contains(&address) {
                    return Err(ConfigError::InvalidValue);
                }
                config.display.i2c_address = address;
            }
            "idle_banner" => {
                config.display.idle_banner =
                    String::try_from(parse_string(value)).map_err(|_| ConfigError::InvalidValue)?;
            }
            _ => {}
        },
        Section::Network => match key {
            "port" => config.network.port = parse_int(value)?,
            "accept_timeout_ms" => config.network.accept_timeout_ms = parse_int(value)?,
            _ => {}
        },
        Section::Association => match key {
            "max_polls" => config.association.max_polls = parse_int(value)?,
            "poll_interval_ms" => config.association.poll_interval_ms = parse_int(value)?,
            "retry_backoff_ms" => config.association.retry_backoff_ms = parse_int(value)?,
            _ => {}
        },
        Section::Timing => match key {
            "banner_ms" => config.timing.banner_ms = parse_int(value)?,
            "climate_ms" => config.timing.climate_ms = parse_int(value)?,
            "fault_ms" => config.timing.fault_ms = parse_int(value)?,
            "scroll_page_ms" => config.timing.scroll_page_ms = parse_int(value)?,
            "splash_ms" => config.timing.splash_ms = parse_int(value)?,
            _ => {}
        },
    }
    Ok(())
}

fn resolve_geometry(
    columns: Option<u8>,
    rows: Option<u8>,
    default: DisplayGeometry,
) -> Result<DisplayGeometry, ConfigError> {
    DisplayGeometry::new(
        columns.unwrap_or(default.columns()),
        rows.unwrap_or(default.rows()),
    )
    .ok_or(ConfigError::InvalidGeometry)
}

fn validate(config: &DeviceConfig) -> Result<(), ConfigError> {
    let display = &config.display;
    if !display.panel.single_controller() || !display.panel.contains(&display.scroll) {
        return Err(ConfigError::InvalidGeometry);
    }

    let t = &config.timing;
    let a = &config.association;
    let durations = [
        t.banner_ms,
        t.climate_ms,
        t.fault_ms,
        t.scroll_page_ms,
        t.splash_ms,
        a.poll_interval_ms,
        a.retry_backoff_ms,
        config.network.accept_timeout_ms,
    ];
    if durations.contains(&0) {
        return Err(ConfigError::ZeroDuration);
    }
    if a.max_polls == 0 || config.network.port == 0 {
        return Err(ConfigError::InvalidValue);
    }
    Ok(())
}
