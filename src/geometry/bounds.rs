//! Bounding box and pivot computation
//!
//! Bounds always fold raw vertex positions, ignoring node TRS transforms.
//! Whole-model edits mutate vertex buffers directly, so the raw positions
//! are the ground truth the rest of the pipeline reasons about.

use nalgebra::{Point3, Vector3};
use parry3d::bounding_volume::Aabb;
use parry3d::math::Vector;

use crate::error::Result;
use crate::geometry::accessor::read_positions;
use crate::model::Document;

/// Which primitives a bounds query folds over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsScope {
    /// Every primitive in every mesh
    Scene,
    /// Primitives of one mesh
    Mesh(usize),
}

/// Axis-aligned bounds of a set of vertices
///
/// A model with no vertices has no box at all; `Empty` is a designated
/// value, not an error and not a zero-sized box at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds {
    /// No vertex contributed
    Empty,
    /// At least one vertex contributed
    Finite(Aabb),
}

impl Bounds {
    /// Fold another box into this one
    pub fn merge(&mut self, aabb: &Aabb) {
        match self {
            Bounds::Empty => *self = Bounds::Finite(*aabb),
            Bounds::Finite(existing) => {
                existing.mins = existing.mins.min(aabb.mins);
                existing.maxs = existing.maxs.max(aabb.maxs);
            }
        }
    }

    /// The box, if any vertex contributed
    pub fn aabb(&self) -> Option<&Aabb> {
        match self {
            Bounds::Empty => None,
            Bounds::Finite(aabb) => Some(aabb),
        }
    }

    /// Edge lengths of the box
    pub fn size(&self) -> Option<Vector3<f32>> {
        self.aabb().map(|aabb| {
            let extents = aabb.maxs - aabb.mins;
            Vector3::new(extents.x, extents.y, extents.z)
        })
    }

    /// Geometric center of the box, the pivot for whole-model edits
    pub fn centroid(&self) -> Option<Point3<f32>> {
        self.aabb().map(|aabb| {
            let center = aabb.center();
            Point3::new(center.x, center.y, center.z)
        })
    }

    /// Longest edge of the box
    pub fn max_extent(&self) -> Option<f32> {
        self.size().map(|s| s.x.max(s.y).max(s.z))
    }
}

/// Compute the bounds of the requested scope
///
/// Primitives without a POSITION attribute are skipped. Shared accessors
/// are read once per accessor, not once per referencing primitive.
pub fn compute_bounds(doc: &Document, scope: BoundsScope) -> Result<Bounds> {
    let mut seen = std::collections::BTreeSet::new();
    let mut bounds = Bounds::Empty;

    for (mesh_index, primitive) in doc.root().primitives() {
        if let BoundsScope::Mesh(wanted) = scope
            && mesh_index != wanted
        {
            continue;
        }
        let Some(accessor) = primitive.position_accessor() else {
            continue;
        };
        if !seen.insert(accessor) {
            continue;
        }
        let points = read_positions(doc, accessor)?;
        if points.is_empty() {
            continue;
        }
        bounds.merge(&Aabb::from_points(
            points.iter().map(|p| Vector::new(p.x, p.y, p.z)),
        ));
    }

    Ok(bounds)
}
