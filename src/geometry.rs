//! Geometry engine
//!
//! Everything that touches vertex data lives here: strided accessor reads
//! and writes, bounding box and pivot computation, the whole-model vertex
//! transform, and the dimension standardization policy.
//!
//! All world-space math runs in f64 and is truncated to f32 only when the
//! results are written back into the vertex buffers.

pub mod accessor;
pub mod bounds;
pub mod scaling;
pub mod transform;

pub use self::accessor::{read_indices, read_positions, write_positions};
pub use self::bounds::{Bounds, BoundsScope, compute_bounds};
pub use self::scaling::{
    Dimensions, ScalePlan, meters_to_centimeters, millimeters_to_meters, plan_standardization,
};
pub use self::transform::{TransformRequest, apply_transform};
