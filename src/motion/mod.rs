// src/motion/mod.rs - Cartesian value types shared by the tracking pipeline
pub mod controller;
pub mod mapping;
pub mod workspace;

pub use controller::{proportional_velocity, VelocityController};
pub use mapping::AxisMapper;
pub use workspace::{GuardError, WorkspaceGuard};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// One Cartesian axis. Used to address components and to describe axis mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// A point in 3D space. Meters in the robot frame, centimeters in the tracking
/// source frame before mapping.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct Position3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position3 {
    pub const ZERO: Position3 = Position3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Build a point by evaluating `f` once per axis.
    pub fn from_fn(mut f: impl FnMut(Axis) -> f64) -> Self {
        Self {
            x: f(Axis::X),
            y: f(Axis::Y),
            z: f(Axis::Z),
        }
    }

    /// First axis holding a NaN or infinite value, if any.
    pub fn first_non_finite(&self) -> Option<Axis> {
        Axis::ALL.into_iter().find(|axis| !self.get(*axis).is_finite())
    }

    pub fn is_finite(&self) -> bool {
        self.first_non_finite().is_none()
    }
}

impl Add for Position3 {
    type Output = Position3;

    fn add(self, rhs: Position3) -> Position3 {
        Position3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Position3 {
    type Output = Position3;

    fn sub(self, rhs: Position3) -> Position3 {
        Position3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl fmt::Display for Position3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// Linear velocity command in m/s. Orientation is held fixed, so the angular
/// part of the twist is always zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct VelocityCommand {
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
}

impl VelocityCommand {
    pub const ZERO: VelocityCommand = VelocityCommand { vx: 0.0, vy: 0.0, vz: 0.0 };

    pub const fn new(vx: f64, vy: f64, vz: f64) -> Self {
        Self { vx, vy, vz }
    }

    pub fn linear(&self) -> [f64; 3] {
        [self.vx, self.vy, self.vz]
    }

    pub fn angular(&self) -> [f64; 3] {
        [0.0; 3]
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.vx,
            Axis::Y => self.vy,
            Axis::Z => self.vz,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.linear().iter().all(|v| *v == 0.0)
    }
}

impl fmt::Display for VelocityCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.vx, self.vy, self.vz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_arithmetic() {
        let a = Position3::new(0.5, 0.0, 0.5);
        let b = Position3::new(0.1, -0.2, 0.3);
        assert_eq!(a + b, Position3::new(0.6, -0.2, 0.8));
        assert_eq!((a + b) - b, a);
    }

    #[test]
    fn test_first_non_finite() {
        assert_eq!(Position3::new(1.0, 2.0, 3.0).first_non_finite(), None);
        assert_eq!(Position3::new(1.0, f64::NAN, f64::INFINITY).first_non_finite(), Some(Axis::Y));
        assert!(!Position3::new(f64::NEG_INFINITY, 0.0, 0.0).is_finite());
    }

    #[test]
    fn test_velocity_command_angular_is_zero() {
        let cmd = VelocityCommand::new(0.1, -0.2, 0.05);
        assert_eq!(cmd.angular(), [0.0, 0.0, 0.0]);
        assert_eq!(cmd.get(Axis::Y), -0.2);
        assert!(!cmd.is_zero());
        assert!(VelocityCommand::ZERO.is_zero());
    }
}
