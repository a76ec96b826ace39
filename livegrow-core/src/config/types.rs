//! Configuration type definitions

use heapless::String;

use crate::text::MAX_COLUMNS;

/// Most rows on a supported panel
pub const MAX_ROWS: usize = 4;

/// Widest panel with more than two rows a single controller can address
pub const MAX_MULTILINE_COLUMNS: u8 = 20;

/// Longest idle banner
pub const MAX_BANNER_LEN: usize = 20;

/// Character grid size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayGeometry {
    columns: u8,
    rows: u8,
}

impl DisplayGeometry {
    /// 16x2 layout used for paging text
    pub const SCROLL: Self = Self {
        columns: 16,
        rows: 2,
    };

    /// 20x4 panel as initialised at boot
    pub const PANEL: Self = Self {
        columns: 20,
        rows: 4,
    };

    /// Create a geometry, rejecting zero or oversize dimensions
    pub fn new(columns: u8, rows: u8) -> Option<Self> {
        let columns_ok = (1..=MAX_COLUMNS).contains(&usize::from(columns));
        let rows_ok = (1..=MAX_ROWS).contains(&usize::from(rows));
        (columns_ok && rows_ok).then_some(Self { columns, rows })
    }

    /// Characters per row
    pub fn columns(&self) -> u8 {
        self.columns
    }

    /// Rows on screen
    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Whether one HD44780 controller can address every cell
    ///
    /// Four-line panels wider than 20 columns (40x4) carry two
    /// controllers and are not supported.
    pub fn single_controller(&self) -> bool {
        self.rows <= 2 || self.columns <= MAX_MULTILINE_COLUMNS
    }

    /// Whether `other` fits inside this geometry
    pub fn contains(&self, other: &DisplayGeometry) -> bool {
        other.columns <= self.columns && other.rows <= self.rows
    }
}

/// Display hardware and layout
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// Geometry the controller is initialised with
    pub panel: DisplayGeometry,
    /// Geometry used to page messages
    pub scroll: DisplayGeometry,
    /// 7-bit I2C address of the PCF8574 backpack
    pub i2c_address: u8,
    /// Text shown on the idle screen and at boot
    pub idle_banner: String<MAX_BANNER_LEN>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let mut idle_banner = String::new();
        let _ = idle_banner.push_str("LiveGrow");
        Self {
            panel: DisplayGeometry::PANEL,
            scroll: DisplayGeometry::SCROLL,
            i2c_address: 0x27,
            idle_banner,
        }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetworkConfig {
    /// TCP port to listen on
    pub port: u16,
    /// How long each tick waits for a client (ms)
    pub accept_timeout_ms: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            port: 80,
            accept_timeout_ms: 1000,
        }
    }
}

/// Wi-Fi association retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AssociationConfig {
    /// Link polls per attempt before giving up
    pub max_polls: u8,
    /// Pause between polls (ms)
    pub poll_interval_ms: u32,
    /// Pause after a failed attempt (ms)
    pub retry_backoff_ms: u32,
}

impl Default for AssociationConfig {
    fn default() -> Self {
        Self {
            max_polls: 15,
            poll_interval_ms: 1000,
            retry_backoff_ms: 5000,
        }
    }
}

/// Screen hold times, all in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    /// Idle banner
    pub banner_ms: u32,
    /// Temperature and humidity screen
    pub climate_ms: u32,
    /// Error banners
    pub fault_ms: u32,
    /// Each page of a scrolled message
    pub scroll_page_ms: u32,
    /// Boot splash
    pub splash_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            banner_ms: 5000,
            climate_ms: 5000,
            fault_ms: 2000,
            scroll_page_ms: 3000,
            splash_ms: 2000,
        }
    }
}

/// Complete device configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    /// Display layout
    pub display: DisplayConfig,
    /// Listener
    pub network: NetworkConfig,
    /// Association policy
    pub association: AssociationConfig,
    /// Hold times
    pub timing: TimingConfig,
    /// Scroll a new message as soon as it arrives
    pub announce_on_receive: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            network: NetworkConfig::default(),
            association: AssociationConfig::default(),
            timing: TimingConfig::default(),
            announce_on_receive: true,
        }
    }
}
