//! Dimension standardization policy
//!
//! Decides the uniform scale factor that brings a model's longest bounding
//! box edge to a requested target size. The policy always scales to the
//! target when one is given, whether the model is larger or smaller.

use tracing::warn;

use crate::geometry::bounds::Bounds;

/// Extents below this are treated as degenerate (meters)
pub const DEGENERATE_EXTENT: f64 = 1e-9;

/// Model extents along each axis, in the unit of the caller's choosing
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimensions {
    /// Extent along X
    pub x: f64,
    /// Extent along Y
    pub y: f64,
    /// Extent along Z
    pub z: f64,
}

impl Dimensions {
    /// Extents of a bounding box; an empty box measures zero on every axis
    pub fn from_bounds(bounds: &Bounds) -> Self {
        match bounds.size() {
            Some(size) => Self {
                x: f64::from(size.x),
                y: f64::from(size.y),
                z: f64::from(size.z),
            },
            None => Self::default(),
        }
    }

    /// Longest axis extent
    pub fn max_extent(&self) -> f64 {
        self.x.max(self.y).max(self.z)
    }

    /// Convert meter extents to centimeters, the unit reported to callers
    pub fn to_centimeters(&self) -> Self {
        Self {
            x: meters_to_centimeters(self.x),
            y: meters_to_centimeters(self.y),
            z: meters_to_centimeters(self.z),
        }
    }
}

/// Convert meters (the buffer unit) to centimeters
pub fn meters_to_centimeters(meters: f64) -> f64 {
    meters * 100.0
}

/// Convert millimeters to meters
///
/// Sources converted from STL-style formats report raw millimeter extents;
/// the policy itself never detects units, callers convert first.
pub fn millimeters_to_meters(millimeters: f64) -> f64 {
    millimeters / 1000.0
}

/// The factor a standardization decision settled on
#[derive(Debug, Clone, PartialEq)]
pub struct ScalePlan {
    /// Uniform scale factor to apply
    pub factor: f64,
    /// Human-readable note when the decision fell back to 1.0
    pub warning: Option<String>,
}

impl ScalePlan {
    fn unit(warning: Option<String>) -> Self {
        Self {
            factor: 1.0,
            warning,
        }
    }
}

/// Decide the scale factor for a target extent in meters
///
/// A non-positive target disables standardization. A degenerate current
/// extent (empty or near-zero model) keeps the model as-is with a warning
/// rather than producing an infinite factor.
pub fn plan_standardization(current_extent: f64, target_extent: f64) -> ScalePlan {
    if target_extent <= 0.0 {
        return ScalePlan::unit(None);
    }
    if current_extent <= DEGENERATE_EXTENT {
        let note = format!(
            "model extent {current_extent} is degenerate; skipping standardization to {target_extent} m"
        );
        warn!("{note}");
        return ScalePlan::unit(Some(note));
    }
    ScalePlan {
        factor: target_extent / current_extent,
        warning: None,
    }
}
