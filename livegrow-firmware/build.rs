//! Build script for livegrow-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates device.toml at compile time
//! - Warns when no Wi-Fi SSID is set in the build environment

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();

    println!("cargo:rerun-if-env-changed=WIFI_SSID");
    println!("cargo:rerun-if-env-changed=WIFI_PASSWORD");
    if env::var("WIFI_SSID").map_or(true, |ssid| ssid.is_empty()) {
        println!("cargo:warning=WIFI_SSID is not set, the device will never associate");
    }
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate device.toml at compile time
///
/// The firmware falls back to defaults when the embedded file does not
/// parse, so anything that would trigger that fallback is caught here.
fn validate_config() {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: device.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds a device.toml configuration file.           ║\n\
            ║  Please create one in the livegrow-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read device.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in device.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_display(&config, &mut errors);
    validate_network(&config, &mut errors);
    validate_durations(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid device configuration                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=device.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Only these tables are understood by the on-device parser
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };

    for (name, value) in root {
        match (name.as_str(), value) {
            ("announce_on_receive", toml::Value::Boolean(_)) => {}
            ("announce_on_receive", _) => {
                errors.push("announce_on_receive must be true or false".to_string())
            }
            ("display" | "network" | "association" | "timing", toml::Value::Table(_)) => {}
            ("display" | "network" | "association" | "timing", _) => {
                errors.push(format!("[{}] must be a table", name))
            }
            (_, toml::Value::Table(_)) => errors.push(format!("unknown section [{}]", name)),
            _ => {}
        }
    }
}

fn int_in(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    config.get(section)?.get(key)?.as_integer()
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    for key in ["panel_columns", "scroll_columns"] {
        if let Some(columns) = int_in(config, "display", key) {
            if !(1..=40).contains(&columns) {
                errors.push(format!("[display] {} must be 1-40", key));
            }
        }
    }

    for key in ["panel_rows", "scroll_rows"] {
        if let Some(rows) = int_in(config, "display", key) {
            if !(1..=4).contains(&rows) {
                errors.push(format!("[display] {} must be 1-4", key));
            }
        }
    }

    // Effective geometry, with the firmware defaults for missing keys
    let panel_columns = int_in(config, "display", "panel_columns").unwrap_or(20);
    let panel_rows = int_in(config, "display", "panel_rows").unwrap_or(4);
    let scroll_columns = int_in(config, "display", "scroll_columns").unwrap_or(16);
    let scroll_rows = int_in(config, "display", "scroll_rows").unwrap_or(2);

    if panel_rows > 2 && panel_columns > 20 {
        errors.push("[display] panels over 2 rows allow at most 20 columns".to_string());
    }
    if scroll_columns > panel_columns || scroll_rows > panel_rows {
        errors.push(format!(
            "[display] scroll window {}x{} must fit the {}x{} panel",
            scroll_columns, scroll_rows, panel_columns, panel_rows
        ));
    }

    if let Some(address) = int_in(config, "display", "i2c_address") {
        if !(0x08..=0x77).contains(&address) {
            errors.push("[display] i2c_address must be 0x08-0x77".to_string());
        }
    }

    if let Some(banner) = config
        .get("display")
        .and_then(|d| d.get("idle_banner"))
        .and_then(|b| b.as_str())
    {
        if banner.len() > 20 {
            errors.push("[display] idle_banner must be at most 20 bytes".to_string());
        }
    }
}

fn validate_network(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(port) = int_in(config, "network", "port") {
        if !(1..=65535).contains(&port) {
            errors.push("[network] port must be 1-65535".to_string());
        }
    }

    if let Some(polls) = int_in(config, "association", "max_polls") {
        if !(1..=255).contains(&polls) {
            errors.push("[association] max_polls must be 1-255".to_string());
        }
    }
}

/// Every `*_ms` value must be a positive integer
fn validate_durations(config: &toml::Value, errors: &mut Vec<String>) {
    for section in ["network", "association", "timing"] {
        let Some(table) = config.get(section).and_then(|s| s.as_table()) else {
            continue;
        };

        for (key, value) in table {
            if !key.ends_with("_ms") {
                continue;
            }
            match value.as_integer() {
                Some(ms) if ms > 0 && ms <= i64::from(u32::MAX) => {}
                _ => errors.push(format!("[{}] {} must be a positive integer", section, key)),
            }
        }
    }
}
