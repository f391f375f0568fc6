//! Primary interpolating clipper
//!
//! Clips each triangle against the plane's positive half-space. Straddling
//! triangles are split at their edge-plane intersections; intersection
//! vertices are computed once per mesh edge so neighbouring triangles share
//! them and the cut boundary stays watertight. With capping enabled, the
//! boundary segments are chained into closed loops, projected onto a plane
//! basis, and triangulated with earcutr.

use std::collections::HashMap;

use nalgebra::{Point2, Point3, Vector3};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::slicer::{PLANE_EPSILON, Plane, PlaneClipper, SoupMesh};

/// Splitting clipper with an optional planar cap over the cut
#[derive(Debug, Clone, Copy)]
pub struct CappedClipper {
    /// Close each cut loop with a triangulated cap
    pub cap: bool,
}

impl PlaneClipper for CappedClipper {
    fn name(&self) -> &'static str {
        "capped"
    }

    fn clip(&self, mesh: &SoupMesh, plane: &Plane) -> Result<SoupMesh> {
        let distances: Vec<f64> = mesh.vertices.iter().map(|v| plane.distance(v)).collect();
        let kept: Vec<bool> = distances.iter().map(|&d| d >= -PLANE_EPSILON).collect();

        let mut out = SoupMesh::default();
        // Source vertex index to output index, filled on first use
        let mut vertex_map: Vec<Option<usize>> = vec![None; mesh.vertices.len()];
        // One intersection vertex per cut mesh edge, keyed (lo, hi)
        let mut edge_points: HashMap<(usize, usize), usize> = HashMap::new();
        // Cut boundary segments, as output vertex index pairs
        let mut boundary: Vec<(usize, usize)> = Vec::new();

        let mut remap = |index: usize, out: &mut SoupMesh| -> usize {
            *vertex_map[index].get_or_insert_with(|| {
                out.vertices.push(mesh.vertices[index]);
                out.vertices.len() - 1
            })
        };

        for face in &mesh.faces {
            let inside = face.iter().filter(|&&v| kept[v]).count();
            match inside {
                3 => {
                    let a = remap(face[0], &mut out);
                    let b = remap(face[1], &mut out);
                    let c = remap(face[2], &mut out);
                    out.faces.push([a, b, c]);
                }
                0 => {}
                _ => {
                    // Walk the triangle's edges in winding order, emitting
                    // kept corners and edge-plane intersections. The result
                    // is a triangle or a quad, fan-triangulated below.
                    let mut polygon: Vec<usize> = Vec::with_capacity(4);
                    let mut cut: Vec<usize> = Vec::with_capacity(2);
                    for corner in 0..3 {
                        let a = face[corner];
                        let b = face[(corner + 1) % 3];
                        if kept[a] {
                            polygon.push(remap(a, &mut out));
                        }
                        if kept[a] != kept[b] {
                            let key = (a.min(b), a.max(b));
                            let index = *edge_points.entry(key).or_insert_with(|| {
                                let t = distances[a] / (distances[a] - distances[b]);
                                let p = mesh.vertices[a] + (mesh.vertices[b] - mesh.vertices[a]) * t;
                                out.vertices.push(p);
                                out.vertices.len() - 1
                            });
                            polygon.push(index);
                            cut.push(index);
                        }
                    }
                    for i in 1..polygon.len().saturating_sub(1) {
                        out.faces.push([polygon[0], polygon[i], polygon[i + 1]]);
                    }
                    if cut.len() == 2 && cut[0] != cut[1] {
                        boundary.push((cut[0], cut[1]));
                    }
                }
            }
        }

        if out.faces.is_empty() {
            return Err(Error::EmptySliceResult);
        }

        if self.cap && !boundary.is_empty() {
            cap_boundary(&mut out, &boundary, plane)?;
        }

        debug!(
            faces_in = mesh.faces.len(),
            faces_out = out.faces.len(),
            boundary_segments = boundary.len(),
            "capped clip complete"
        );
        Ok(out)
    }
}

/// Chain boundary segments into closed loops and triangulate each as a cap
fn cap_boundary(out: &mut SoupMesh, segments: &[(usize, usize)], plane: &Plane) -> Result<()> {
    let loops = chain_loops(segments);
    let (u, v) = plane_basis(&plane.normal);

    for ring in &loops {
        if ring.len() < 3 {
            continue;
        }
        // Project onto the plane basis for 2D triangulation
        let projected: Vec<Point2<f64>> = ring
            .iter()
            .map(|&index| {
                let p = out.vertices[index];
                Point2::new(u.dot(&p.coords), v.dot(&p.coords))
            })
            .collect();
        let mut coords = Vec::with_capacity(projected.len() * 2);
        for p in &projected {
            coords.push(p.x);
            coords.push(p.y);
        }
        let triangles = earcutr::earcut(&coords, &Vec::<usize>::new(), 2).map_err(|e| {
            Error::InvariantViolation(format!("cap triangulation failed: {e}"))
        })?;

        for tri in triangles.chunks_exact(3) {
            let mut face = [ring[tri[0]], ring[tri[1]], ring[tri[2]]];
            // The cap is the kept solid's outer surface at the plane, so it
            // must face opposite the kept-side normal.
            if triangle_normal(out, &face).dot(&plane.normal) > 0.0 {
                face.swap(1, 2);
            }
            out.faces.push(face);
        }
        trace!(loop_len = ring.len(), "capped boundary loop");
    }
    Ok(())
}

/// Chain undirected segments into vertex loops; open chains are dropped
fn chain_loops(segments: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut adjacency: HashMap<usize, Vec<usize>> = HashMap::new();
    for &(a, b) in segments {
        adjacency.entry(a).or_default().push(b);
        adjacency.entry(b).or_default().push(a);
    }

    let mut visited: std::collections::HashSet<(usize, usize)> = std::collections::HashSet::new();
    let mut loops = Vec::new();

    for &(start, _) in segments {
        let mut ring = vec![start];
        let mut current = start;
        loop {
            let Some(neighbors) = adjacency.get(&current) else {
                break;
            };
            let next = neighbors.iter().copied().find(|&n| {
                !visited.contains(&(current.min(n), current.max(n)))
            });
            let Some(next) = next else {
                break;
            };
            visited.insert((current.min(next), current.max(next)));
            if next == start {
                if ring.len() >= 3 {
                    loops.push(std::mem::take(&mut ring));
                }
                break;
            }
            ring.push(next);
            current = next;
        }
    }

    loops
}

/// An orthonormal basis spanning the plane
fn plane_basis(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let reference = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = normal.cross(&reference).normalize();
    let v = normal.cross(&u);
    (u, v)
}

fn triangle_normal(mesh: &SoupMesh, face: &[usize; 3]) -> Vector3<f64> {
    let a: Point3<f64> = mesh.vertices[face[0]];
    let b = mesh.vertices[face[1]];
    let c = mesh.vertices[face[2]];
    (b - a).cross(&(c - a))
}
