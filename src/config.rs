//! # Hand Follower Configuration
//!
//! All tunables are loaded once from a TOML file before tracking starts and are
//! immutable afterwards. Every field has a default matching the reference
//! deployment, so an empty file is a valid configuration.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [robot]
//! address = "192.168.1.10"
//! username = "operator"
//!
//! [feed]
//! port = 9000
//!
//! [control]
//! max_speed = 0.2
//! gain = 0.8
//! tick_period_ms = 50
//!
//! [workspace]
//! x_min = 0.1
//! x_max = 0.9
//!
//! # Tracker Z drives robot X, tracker X drives robot Y, tracker Y drives robot Z.
//! [mapping]
//! units_per_meter = 100.0
//! x = { source = "z" }
//! y = { source = "x" }
//! z = { source = "y", invert = false }
//! ```
//!
//! Call [`Config::validate`] (done by [`load_config`]) before handing sections to
//! the tracking components.

// src/config.rs - Single configuration file
use crate::motion::{Axis, Position3};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration struct for the robot link, hand feed, controller, and safety box.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub robot: RobotConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub workspace: WorkspaceBounds,
    #[serde(default)]
    pub mapping: MappingConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

impl Config {
    /// Check every section. The first violated invariant is reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.feed.validate()?;
        self.control.validate()?;
        self.workspace.validate()?;
        self.mapping.validate()?;
        self.simulator.validate()?;
        Ok(())
    }
}

/// Connection details handed to the vendor robot link.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RobotConfig {
    #[serde(default = "default_robot_address")]
    pub address: String,
    #[serde(default = "default_robot_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_session_inactivity_timeout_ms")]
    pub session_inactivity_timeout_ms: u64,
    #[serde(default = "default_connection_inactivity_timeout_ms")]
    pub connection_inactivity_timeout_ms: u64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            address: default_robot_address(),
            port: default_robot_port(),
            username: String::new(),
            password: String::new(),
            session_inactivity_timeout_ms: default_session_inactivity_timeout_ms(),
            connection_inactivity_timeout_ms: default_connection_inactivity_timeout_ms(),
        }
    }
}

/// UDP listener for hand samples.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,
    #[serde(default = "default_feed_port")]
    pub port: u16,
    #[serde(default = "default_max_datagram_size")]
    pub max_datagram_size: usize,
}

impl FeedConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_datagram_size == 0 {
            return Err(ConfigError::Invalid("feed.max_datagram_size must be > 0".to_string()));
        }
        Ok(())
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_feed_port(),
            max_datagram_size: default_max_datagram_size(),
        }
    }
}

/// Proportional controller and loop pacing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlConfig {
    /// m/s, applied per axis
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,
    #[serde(default = "default_gain")]
    pub gain: f64,
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,
    /// Ticks between status records.
    #[serde(default = "default_status_every")]
    pub status_every: u64,
}

impl ControlConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "control.max_speed must be a positive number, got {}",
                self.max_speed
            )));
        }
        if !(self.gain.is_finite() && self.gain > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "control.gain must be a positive number, got {}",
                self.gain
            )));
        }
        if self.tick_period_ms == 0 {
            return Err(ConfigError::Invalid("control.tick_period_ms must be > 0".to_string()));
        }
        if self.status_every == 0 {
            return Err(ConfigError::Invalid("control.status_every must be >= 1".to_string()));
        }
        Ok(())
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            max_speed: default_max_speed(),
            gain: default_gain(),
            tick_period_ms: default_tick_period_ms(),
            status_every: default_status_every(),
        }
    }
}

/// Axis-aligned safety box in robot base coordinates (meters).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct WorkspaceBounds {
    #[serde(default = "default_x_min")]
    pub x_min: f64,
    #[serde(default = "default_x_max")]
    pub x_max: f64,
    #[serde(default = "default_y_min")]
    pub y_min: f64,
    #[serde(default = "default_y_max")]
    pub y_max: f64,
    #[serde(default = "default_z_min")]
    pub z_min: f64,
    #[serde(default = "default_z_max")]
    pub z_max: f64,
}

impl WorkspaceBounds {
    pub fn range(&self, axis: Axis) -> (f64, f64) {
        match axis {
            Axis::X => (self.x_min, self.x_max),
            Axis::Y => (self.y_min, self.y_max),
            Axis::Z => (self.z_min, self.z_max),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for axis in Axis::ALL {
            let (min, max) = self.range(axis);
            if !min.is_finite() || !max.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "workspace bounds for axis '{}' must be finite",
                    axis
                )));
            }
            if min > max {
                return Err(ConfigError::Invalid(format!(
                    "workspace {}_min ({}) is greater than {}_max ({})",
                    axis, min, axis, max
                )));
            }
        }
        Ok(())
    }
}

impl Default for WorkspaceBounds {
    fn default() -> Self {
        Self {
            x_min: default_x_min(),
            x_max: default_x_max(),
            y_min: default_y_min(),
            y_max: default_y_max(),
            z_min: default_z_min(),
            z_max: default_z_max(),
        }
    }
}

/// Which tracker axis feeds a robot axis.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct AxisSource {
    pub source: Axis,
    #[serde(default)]
    pub invert: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MappingConfig {
    /// Tracker units per robot meter (100 for centimeters).
    #[serde(default = "default_units_per_meter")]
    pub units_per_meter: f64,
    #[serde(default = "default_map_x")]
    pub x: AxisSource,
    #[serde(default = "default_map_y")]
    pub y: AxisSource,
    #[serde(default = "default_map_z")]
    pub z: AxisSource,
}

impl MappingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.units_per_meter.is_finite() && self.units_per_meter > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "mapping.units_per_meter must be a positive number, got {}",
                self.units_per_meter
            )));
        }
        for axis in Axis::ALL {
            let used = [self.x, self.y, self.z]
                .iter()
                .filter(|m| m.source == axis)
                .count();
            if used != 1 {
                return Err(ConfigError::Invalid(format!(
                    "mapping must use tracker axis '{}' exactly once (used {} times)",
                    axis, used
                )));
            }
        }
        Ok(())
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            units_per_meter: default_units_per_meter(),
            x: default_map_x(),
            y: default_map_y(),
            z: default_map_z(),
        }
    }
}

/// Hardware-free robot used when no vendor link is attached.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulatorConfig {
    #[serde(default = "default_initial_pose")]
    pub initial_pose: Position3,
    /// First-order velocity lag in seconds. Zero tracks commands instantly.
    #[serde(default = "default_response_time")]
    pub response_time: f64,
}

impl SimulatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_pose.is_finite() {
            return Err(ConfigError::Invalid("simulator.initial_pose must be finite".to_string()));
        }
        if !(self.response_time.is_finite() && self.response_time >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "simulator.response_time must be >= 0, got {}",
                self.response_time
            )));
        }
        Ok(())
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            initial_pose: default_initial_pose(),
            response_time: default_response_time(),
        }
    }
}

// Default value functions
fn default_robot_address() -> String { "192.168.1.10".to_string() }
fn default_robot_port() -> u16 { 10000 }
fn default_session_inactivity_timeout_ms() -> u64 { 60_000 }
fn default_connection_inactivity_timeout_ms() -> u64 { 2_000 }
fn default_bind_address() -> IpAddr { IpAddr::V4(Ipv4Addr::LOCALHOST) }
fn default_feed_port() -> u16 { 9000 }
fn default_max_datagram_size() -> usize { 1024 }
fn default_max_speed() -> f64 { 0.2 }
fn default_gain() -> f64 { 0.8 }
fn default_tick_period_ms() -> u64 { 50 }
fn default_status_every() -> u64 { 20 }
fn default_x_min() -> f64 { 0.1 }
fn default_x_max() -> f64 { 0.9 }
fn default_y_min() -> f64 { -0.4 }
fn default_y_max() -> f64 { 0.4 }
fn default_z_min() -> f64 { 0.1 }
fn default_z_max() -> f64 { 0.9 }
fn default_units_per_meter() -> f64 { 100.0 }
fn default_map_x() -> AxisSource { AxisSource { source: Axis::Z, invert: false } }
fn default_map_y() -> AxisSource { AxisSource { source: Axis::X, invert: false } }
fn default_map_z() -> AxisSource { AxisSource { source: Axis::Y, invert: false } }
fn default_initial_pose() -> Position3 { Position3::new(0.5, 0.0, 0.5) }
fn default_response_time() -> f64 { 0.1 }

/// Load and validate configuration from a TOML file at the given path.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!("Failed to read config file '{}': {}", path, e);
        ConfigError::Io(e)
    })?;
    let config: Config = toml::from_str(&contents).map_err(|e| {
        tracing::error!("Failed to parse config TOML: {}", e);
        ConfigError::Toml(e)
    })?;
    config.validate()?;
    Ok(config)
}
