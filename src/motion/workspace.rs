// src/motion/workspace.rs - Safety box enforced on every target
use super::{Axis, Position3};
use crate::config::{ConfigError, WorkspaceBounds};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GuardError {
    #[error("Non-finite {axis} coordinate {value} in target")]
    NonFinite { axis: Axis, value: f64 },
}

/// Clamp `p` into `bounds`, axis by axis.
///
/// A NaN or infinite component is rejected rather than clamped, so the caller
/// never commands motion towards an undefined point.
pub fn clamp_to_bounds(p: Position3, bounds: &WorkspaceBounds) -> Result<Position3, GuardError> {
    if let Some(axis) = p.first_non_finite() {
        return Err(GuardError::NonFinite { axis, value: p.get(axis) });
    }
    Ok(Position3::from_fn(|axis| {
        let (min, max) = bounds.range(axis);
        p.get(axis).max(min).min(max)
    }))
}

/// Owns a validated set of bounds.
#[derive(Debug, Clone)]
pub struct WorkspaceGuard {
    bounds: WorkspaceBounds,
}

impl WorkspaceGuard {
    pub fn new(bounds: WorkspaceBounds) -> Result<Self, ConfigError> {
        bounds.validate()?;
        Ok(Self { bounds })
    }

    pub fn bounds(&self) -> &WorkspaceBounds {
        &self.bounds
    }

    pub fn clamp(&self, p: Position3) -> Result<Position3, GuardError> {
        clamp_to_bounds(p, &self.bounds)
    }

    /// True when every component of `p` lies inside the box.
    pub fn contains(&self, p: Position3) -> bool {
        Axis::ALL.into_iter().all(|axis| {
            let (min, max) = self.bounds.range(axis);
            let v = p.get(axis);
            v >= min && v <= max
        })
    }
}
