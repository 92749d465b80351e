//! Configuration for the lift controller and its server.
//!
//! Uses `heapless::String` and `heapless::Vec` for bounded text and lists.
//! With the `serde` feature every section can be loaded from TOML; missing
//! keys fall back to the defaults below.
//!
//! # Example
//!
//! ```rust
//! use rs_lift::config::{Config, SafetyConfig, SensorMode, WebConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.web.port, 5000);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_web(WebConfig::default().with_port(8080))
//!     .with_safety(SafetyConfig::default().with_inactivity_threshold_ms(3000));
//! assert_eq!(config.sensors.mode, SensorMode::Auto);
//! ```

use heapless::String as HString;

use crate::level::Level;

/// Maximum length for short config strings (chip names, labels)
pub const MAX_SHORT_STRING: usize = 64;

/// Maximum length for longer config strings (paths)
pub const MAX_LONG_STRING: usize = 128;

/// Maximum number of sensor ports.
pub const MAX_SENSOR_PORTS: usize = 8;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Type alias for longer config strings
pub type LongString = HString<MAX_LONG_STRING>;

// ============================================================================
// Helpers for creating heapless strings
// ============================================================================

/// Copy `s` into a bounded string, truncating on a UTF-8 boundary if too long.
pub fn truncated<const N: usize>(s: &str) -> HString<N> {
    let mut hs = HString::new();
    let valid_end = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|end| *end <= N)
        .last()
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    truncated(s)
}

/// Create a LongString from a &str, truncating if too long
pub fn long_string(s: &str) -> LongString {
    truncated(s)
}

// ============================================================================
// Errors
// ============================================================================

/// Failure to load a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`Config`].
    #[cfg(feature = "serde")]
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Web server configuration
    pub web: WebConfig,
    /// Relay backend configuration
    pub relays: RelayConfig,
    /// Sensor port configuration
    pub sensors: SensorConfig,
    /// Heartbeat watchdog configuration
    pub safety: SafetyConfig,
    /// Virtual plant configuration
    pub simulation: SimulationConfig,
    /// Controller timing
    pub controller: ControllerConfig,
}

impl Config {
    /// Set web configuration
    pub fn with_web(mut self, web: WebConfig) -> Self {
        self.web = web;
        self
    }

    /// Set relay configuration
    pub fn with_relays(mut self, relays: RelayConfig) -> Self {
        self.relays = relays;
        self
    }

    /// Set sensor configuration
    pub fn with_sensors(mut self, sensors: SensorConfig) -> Self {
        self.sensors = sensors;
        self
    }

    /// Set safety configuration
    pub fn with_safety(mut self, safety: SafetyConfig) -> Self {
        self.safety = safety;
        self
    }

    /// Set simulation configuration
    pub fn with_simulation(mut self, simulation: SimulationConfig) -> Self {
        self.simulation = simulation;
        self
    }

    /// Set controller configuration
    pub fn with_controller(mut self, controller: ControllerConfig) -> Self {
        self.controller = controller;
        self
    }

    /// Parse a TOML document. Missing sections and keys keep their defaults.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file.
    #[cfg(feature = "serde")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

// ============================================================================
// Web Config
// ============================================================================

/// Web server configuration
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WebConfig {
    /// HTTP port to listen on
    pub port: u16,
    /// Whether to enable permissive CORS
    pub cors_permissive: bool,
    /// Directory holding the browser UI build; empty disables static files
    pub static_dir: LongString,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            cors_permissive: true,
            static_dir: long_string("client/build"),
        }
    }
}

impl WebConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enable or disable permissive CORS
    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Set the static file directory
    pub fn with_static_dir(mut self, dir: &str) -> Self {
        self.static_dir = long_string(dir);
        self
    }
}

// ============================================================================
// Relay Config
// ============================================================================

/// GPIO relay configuration.
///
/// Each direction drives two relay pins together.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RelayConfig {
    /// GPIO chip passed to `gpioset`
    pub chip: ShortString,
    /// Pins for the "up" relay
    pub up_pins: [u32; 2],
    /// Pins for the "down" relay
    pub down_pins: [u32; 2],
    /// Upper bound on one relay write
    pub write_timeout_ms: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            chip: short_string("0"),
            up_pins: [23, 24],
            down_pins: [12, 16],
            write_timeout_ms: 500,
        }
    }
}

impl RelayConfig {
    /// Set the GPIO chip
    pub fn with_chip(mut self, chip: &str) -> Self {
        self.chip = short_string(chip);
        self
    }

    /// Set the "up" relay pins
    pub fn with_up_pins(mut self, pins: [u32; 2]) -> Self {
        self.up_pins = pins;
        self
    }

    /// Set the "down" relay pins
    pub fn with_down_pins(mut self, pins: [u32; 2]) -> Self {
        self.down_pins = pins;
        self
    }

    /// Set the write timeout
    pub fn with_write_timeout_ms(mut self, ms: u32) -> Self {
        self.write_timeout_ms = ms;
        self
    }
}

// ============================================================================
// Sensor Config
// ============================================================================

/// Where presence events come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SensorMode {
    /// Use the ports that open at startup; simulate if none do.
    #[default]
    Auto,
    /// Always read the configured ports.
    Hardware,
    /// Always use the virtual plant.
    Simulated,
}

/// Serial sensor configuration
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SensorConfig {
    /// Serial device paths, one sensor node each
    pub ports: heapless::Vec<LongString, MAX_SENSOR_PORTS>,
    /// Line speed applied with `stty` before reading
    pub baud_rate: u32,
    /// Source selection
    pub mode: SensorMode,
}

impl Default for SensorConfig {
    fn default() -> Self {
        let mut ports = heapless::Vec::new();
        for path in ["/dev/ttyUSB0", "/dev/ttyUSB1", "/dev/ttyUSB2", "/dev/ttyUSB3"] {
            let _ = ports.push(long_string(path));
        }
        Self {
            ports,
            baud_rate: 57_600,
            mode: SensorMode::Auto,
        }
    }
}

impl SensorConfig {
    /// Replace the port list; paths beyond [`MAX_SENSOR_PORTS`] are dropped.
    pub fn with_ports<'a>(mut self, ports: impl IntoIterator<Item = &'a str>) -> Self {
        self.ports.clear();
        for path in ports {
            if self.ports.push(long_string(path)).is_err() {
                break;
            }
        }
        self
    }

    /// Set the line speed
    pub fn with_baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = baud;
        self
    }

    /// Set the source selection
    pub fn with_mode(mut self, mode: SensorMode) -> Self {
        self.mode = mode;
        self
    }
}

// ============================================================================
// Safety Config
// ============================================================================

/// Heartbeat watchdog configuration
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SafetyConfig {
    /// How often the watchdog runs
    pub check_interval_ms: u32,
    /// Silence after which an energized lift is stopped
    pub inactivity_threshold_ms: u32,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: 1000,
            inactivity_threshold_ms: 2000,
        }
    }
}

impl SafetyConfig {
    /// Set the check interval
    pub fn with_check_interval_ms(mut self, ms: u32) -> Self {
        self.check_interval_ms = ms;
        self
    }

    /// Set the inactivity threshold
    pub fn with_inactivity_threshold_ms(mut self, ms: u32) -> Self {
        self.inactivity_threshold_ms = ms;
        self
    }
}

// ============================================================================
// Simulation Config
// ============================================================================

/// Virtual plant configuration
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// Time between position steps
    pub tick_ms: u32,
    /// Distance moved per step, in metres
    pub step_m: f32,
    /// A level reads present within this distance of its height
    pub tolerance_m: f32,
    /// Where the virtual cab starts
    pub start_level: Level,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            step_m: 0.05,
            tolerance_m: 0.05,
            start_level: Level::Ground,
        }
    }
}

impl SimulationConfig {
    /// Set the tick period
    pub fn with_tick_ms(mut self, ms: u32) -> Self {
        self.tick_ms = ms.max(1);
        self
    }

    /// Set the step size (negative values are treated as zero)
    pub fn with_step_m(mut self, step: f32) -> Self {
        self.step_m = step.max(0.0);
        self
    }

    /// Set the presence tolerance
    pub fn with_tolerance_m(mut self, tolerance: f32) -> Self {
        self.tolerance_m = tolerance.max(0.0);
        self
    }

    /// Set the start level
    pub fn with_start_level(mut self, level: Level) -> Self {
        self.start_level = level;
        self
    }
}

// ============================================================================
// Controller Config
// ============================================================================

/// Controller timing
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerConfig {
    /// How often the feed is polled
    pub update_interval_ms: u32,
    /// How long a display message stays before reverting to the state label
    pub message_revert_ms: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: 20,
            message_revert_ms: 2000,
        }
    }
}

impl ControllerConfig {
    /// Set the update interval
    pub fn with_update_interval_ms(mut self, ms: u32) -> Self {
        self.update_interval_ms = ms;
        self
    }

    /// Set the message revert delay
    pub fn with_message_revert_ms(mut self, ms: u32) -> Self {
        self.message_revert_ms = ms;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.web.port, 5000);
        assert_eq!(config.web.static_dir.as_str(), "client/build");
        assert_eq!(config.relays.up_pins, [23, 24]);
        assert_eq!(config.relays.down_pins, [12, 16]);
        assert_eq!(config.sensors.ports.len(), 4);
        assert_eq!(config.sensors.ports[3].as_str(), "/dev/ttyUSB3");
        assert_eq!(config.sensors.baud_rate, 57_600);
        assert_eq!(config.safety.inactivity_threshold_ms, 2000);
        assert_eq!(config.simulation.start_level, Level::Ground);
        assert_eq!(config.controller.message_revert_ms, 2000);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::default()
            .with_web(WebConfig::default().with_port(3000).with_cors(false))
            .with_relays(RelayConfig::default().with_chip("gpiochip1"))
            .with_sensors(SensorConfig::default().with_ports(["/dev/ttyACM0"]))
            .with_controller(ControllerConfig::default().with_update_interval_ms(50));

        assert_eq!(config.web.port, 3000);
        assert!(!config.web.cors_permissive);
        assert_eq!(config.relays.chip.as_str(), "gpiochip1");
        assert_eq!(config.sensors.ports.len(), 1);
        assert_eq!(config.controller.update_interval_ms, 50);
    }

    #[test]
    fn too_many_ports_are_dropped() {
        let paths: Vec<String> = (0..12).map(|i| format!("/dev/ttyUSB{i}")).collect();
        let sensors = SensorConfig::default().with_ports(paths.iter().map(String::as_str));
        assert_eq!(sensors.ports.len(), MAX_SENSOR_PORTS);
    }

    #[test]
    fn simulation_builder_clamps() {
        let sim = SimulationConfig::default()
            .with_tick_ms(0)
            .with_step_m(-1.0)
            .with_start_level(Level::Second);
        assert_eq!(sim.tick_ms, 1);
        assert_eq!(sim.step_m, 0.0);
        assert_eq!(sim.start_level, Level::Second);
    }

    // =========================================================================
    // String Helper Tests
    // =========================================================================

    #[test]
    fn short_string_truncation() {
        let long_input = "a".repeat(100);
        let s = short_string(&long_input);
        assert_eq!(s.len(), MAX_SHORT_STRING);
    }

    #[test]
    fn truncated_respects_utf8_boundary() {
        let s: HString<5> = truncated("ééé");
        assert_eq!(s.as_str(), "éé");

        let s: HString<8> = truncated("lift");
        assert_eq!(s.as_str(), "lift");
    }

    // =========================================================================
    // TOML Tests
    // =========================================================================

    #[cfg(feature = "serde")]
    #[test]
    fn toml_partial_document_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [web]
            port = 8080

            [sensors]
            mode = "simulated"

            [simulation]
            start_level = "1"
            "#,
        )
        .unwrap();

        assert_eq!(config.web.port, 8080);
        assert!(config.web.cors_permissive);
        assert_eq!(config.sensors.mode, SensorMode::Simulated);
        assert_eq!(config.sensors.ports.len(), 4);
        assert_eq!(config.simulation.start_level, Level::First);
        assert_eq!(config.safety, SafetyConfig::default());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn toml_rejects_unknown_mode() {
        let err = Config::from_toml_str("[sensors]\nmode = \"psychic\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn load_missing_file_is_io_error() {
        let err = Config::load("/nonexistent/lift.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
