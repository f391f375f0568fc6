//! Vertex filter fallback clipper
//!
//! Keeps only triangles whose three vertices all lie on the kept side of
//! the plane, within tolerance. No triangle is split and no cap is built,
//! so the cut surface is jagged, but the strategy cannot produce degenerate
//! geometry and serves as the safety net when the splitting clipper fails.

use tracing::debug;

use crate::error::{Error, Result};
use crate::slicer::{PLANE_EPSILON, Plane, PlaneClipper, SoupMesh};

/// Whole-triangle filter, the fallback strategy
#[derive(Debug, Clone, Copy)]
pub struct VertexFilterClipper;

impl PlaneClipper for VertexFilterClipper {
    fn name(&self) -> &'static str {
        "vertex-filter"
    }

    fn clip(&self, mesh: &SoupMesh, plane: &Plane) -> Result<SoupMesh> {
        let kept: Vec<bool> = mesh
            .vertices
            .iter()
            .map(|v| plane.distance(v) >= -PLANE_EPSILON)
            .collect();

        let mut out = SoupMesh::default();
        let mut vertex_map: Vec<Option<usize>> = vec![None; mesh.vertices.len()];

        for face in &mesh.faces {
            if !face.iter().all(|&v| kept[v]) {
                continue;
            }
            let remapped = face.map(|v| {
                *vertex_map[v].get_or_insert_with(|| {
                    out.vertices.push(mesh.vertices[v]);
                    out.vertices.len() - 1
                })
            });
            out.faces.push(remapped);
        }

        if out.faces.is_empty() {
            return Err(Error::EmptySliceResult);
        }
        debug!(
            faces_in = mesh.faces.len(),
            faces_out = out.faces.len(),
            "vertex filter clip complete"
        );
        Ok(out)
    }
}
