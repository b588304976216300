// src/motion/mapping.rs - Tracking source frame to robot base frame
use super::{Axis, Position3};
use crate::config::{AxisSource, MappingConfig};

/// Maps tracker samples (centimeters, tracker axes) onto robot base axes
/// (meters). The permutation is deployment calibration, not a constant of the
/// controller, so it comes from `[mapping]` in the config file.
#[derive(Debug, Clone)]
pub struct AxisMapper {
    x: AxisSource,
    y: AxisSource,
    z: AxisSource,
    units_per_meter: f64,
}

impl AxisMapper {
    pub fn new(config: &MappingConfig) -> Self {
        Self {
            x: config.x,
            y: config.y,
            z: config.z,
            units_per_meter: config.units_per_meter,
        }
    }

    pub fn source_for(&self, robot_axis: Axis) -> AxisSource {
        match robot_axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn map(&self, source: Position3) -> Position3 {
        Position3::from_fn(|robot_axis| {
            let from = self.source_for(robot_axis);
            let sign = if from.invert { -1.0 } else { 1.0 };
            sign * source.get(from.source) / self.units_per_meter
        })
    }
}

impl Default for AxisMapper {
    fn default() -> Self {
        Self::new(&MappingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_permutation() {
        let mapper = AxisMapper::default();
        assert_eq!(mapper.map(Position3::new(0.0, 0.0, 100.0)), Position3::new(1.0, 0.0, 0.0));
        assert_eq!(mapper.map(Position3::new(100.0, 0.0, 0.0)), Position3::new(0.0, 1.0, 0.0));
        assert_eq!(mapper.map(Position3::new(0.0, 100.0, 0.0)), Position3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_origin_maps_to_origin() {
        assert_eq!(AxisMapper::default().map(Position3::ZERO), Position3::ZERO);
    }

    #[test]
    fn test_inverted_axis() {
        let config = MappingConfig {
            y: AxisSource { source: Axis::X, invert: true },
            ..MappingConfig::default()
        };
        let mapper = AxisMapper::new(&config);
        assert_eq!(mapper.map(Position3::new(25.0, 0.0, 0.0)), Position3::new(0.0, -0.25, 0.0));
    }
}
