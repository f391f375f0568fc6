//! Whole-model vertex transform
//!
//! Scale and rotation are applied by rewriting vertex buffers around the
//! scene pivot, never by editing node TRS. This keeps the scene graph
//! untouched and makes the result viewer-independent: `v' = pivot +
//! R * (s * (v - pivot))` with the pivot at the scene bounding box center.

use nalgebra::{Point3, Rotation3};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geometry::accessor::{read_positions, write_positions};
use crate::geometry::bounds::{BoundsScope, compute_bounds};
use crate::model::Document;

/// A uniform scale plus an Euler rotation, both about the scene pivot
///
/// Rotation angles are degrees, applied extrinsically about the fixed world
/// axes in X, then Y, then Z order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformRequest {
    /// Uniform scale factor
    pub scale: f64,
    /// Euler angles in degrees, (x, y, z)
    pub rotation_degrees: [f64; 3],
}

impl Default for TransformRequest {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation_degrees: [0.0; 3],
        }
    }
}

impl TransformRequest {
    /// True when applying this request would not move any vertex
    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.rotation_degrees == [0.0; 3]
    }
}

/// Apply a transform request to every vertex in the document
///
/// The scale factor must be positive and finite; zero or negative factors
/// would collapse or mirror the model and are rejected. Identity requests
/// return without touching the container, so serializing afterwards still
/// reproduces the input bytes. A model with no vertices is a no-op as well.
/// All math runs in f64; results are truncated to f32 on write-back.
pub fn apply_transform(doc: &mut Document, request: &TransformRequest) -> Result<()> {
    if request.scale <= 0.0 || !request.scale.is_finite() {
        return Err(Error::invalid_request(
            "transform.scale",
            format!("{} is not a positive finite factor", request.scale),
        ));
    }
    if request.is_identity() {
        return Ok(());
    }

    let bounds = compute_bounds(doc, BoundsScope::Scene)?;
    let Some(centroid) = bounds.centroid() else {
        return Ok(());
    };
    let pivot = Point3::new(
        f64::from(centroid.x),
        f64::from(centroid.y),
        f64::from(centroid.z),
    );

    // Baking rotation into vertices of a skinned mesh desynchronizes the
    // bind pose; the edit still proceeds, but loudly.
    if doc.root().nodes.iter().any(|n| n.skin.is_some()) {
        warn!("document contains skinned meshes; baked vertex transform may break skinning");
    }

    let [rx, ry, rz] = request.rotation_degrees;
    let rotation =
        Rotation3::from_euler_angles(rx.to_radians(), ry.to_radians(), rz.to_radians());
    let scale = request.scale;

    let accessors: std::collections::BTreeSet<usize> = doc
        .root()
        .primitives()
        .filter_map(|(_, p)| p.position_accessor())
        .collect();

    let mut moved = 0usize;
    for accessor in accessors {
        let points = read_positions(doc, accessor)?;
        let transformed: Vec<Point3<f32>> = points
            .iter()
            .map(|p| {
                let local = Point3::new(
                    f64::from(p.x) - pivot.x,
                    f64::from(p.y) - pivot.y,
                    f64::from(p.z) - pivot.z,
                );
                let rotated = rotation * (local * scale);
                Point3::new(
                    (pivot.x + rotated.x) as f32,
                    (pivot.y + rotated.y) as f32,
                    (pivot.z + rotated.z) as f32,
                )
            })
            .collect();
        moved += transformed.len();
        write_positions(doc, accessor, &transformed)?;
    }

    debug!(
        scale,
        rotation_degrees = ?request.rotation_degrees,
        vertices = moved,
        "applied vertex transform"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Accessor, Buffer, BufferView, COMPONENT_F32, Mesh, Primitive, Root, TYPE_VEC3,
    };
    use approx::assert_relative_eq;
    use serde_json::Map;

    fn doc_with_points(points: &[[f32; 3]]) -> Document {
        let mut bin = Vec::new();
        for p in points {
            for c in p {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        let mut primitive = Primitive::default();
        primitive
            .attributes
            .insert(crate::model::ATTR_POSITION.to_string(), 0);
        let root = Root {
            meshes: vec![Mesh {
                name: None,
                primitives: vec![primitive],
                extra: Map::new(),
            }],
            accessors: vec![Accessor {
                buffer_view: Some(0),
                byte_offset: None,
                component_type: COMPONENT_F32,
                count: points.len(),
                element_type: TYPE_VEC3.to_string(),
                min: None,
                max: None,
                normalized: None,
                name: None,
                extra: Map::new(),
            }],
            buffer_views: vec![BufferView {
                buffer: 0,
                byte_offset: None,
                byte_length: bin.len(),
                byte_stride: None,
                target: None,
                name: None,
                extra: Map::new(),
            }],
            buffers: vec![Buffer {
                byte_length: bin.len(),
                uri: None,
                name: None,
                extra: Map::new(),
            }],
            ..Root::default()
        };
        Document::from_parts(root, bin)
    }

    #[test]
    fn test_identity_request_leaves_buffers_untouched() {
        let mut doc = doc_with_points(&[[1.0, 2.0, 3.0]]);
        let before = doc.buffer_data(0).unwrap().to_vec();
        apply_transform(&mut doc, &TransformRequest::default()).unwrap();
        assert_eq!(doc.buffer_data(0).unwrap(), &before[..]);
        // min/max untouched too: no write happened
        assert!(doc.root().accessors[0].min.is_none());
    }

    #[test]
    fn test_scale_about_pivot_keeps_centroid() {
        let mut doc = doc_with_points(&[[0.0, 0.0, 0.0], [2.0, 2.0, 2.0]]);
        apply_transform(
            &mut doc,
            &TransformRequest {
                scale: 3.0,
                rotation_degrees: [0.0; 3],
            },
        )
        .unwrap();
        let bounds = compute_bounds(&doc, BoundsScope::Scene).unwrap();
        let centroid = bounds.centroid().unwrap();
        assert_relative_eq!(centroid.x, 1.0);
        assert_relative_eq!(bounds.max_extent().unwrap(), 6.0);
    }

    #[test]
    fn test_scale_then_inverse_restores_positions() {
        let original = [[0.25, -1.5, 3.0], [2.0, 0.0, -0.5], [1.0, 1.0, 1.0]];
        let mut doc = doc_with_points(&original);
        for scale in [4.0, 0.25] {
            apply_transform(
                &mut doc,
                &TransformRequest {
                    scale,
                    rotation_degrees: [0.0; 3],
                },
            )
            .unwrap();
        }
        let points = read_positions(&doc, 0).unwrap();
        for (got, want) in points.iter().zip(original.iter()) {
            assert_relative_eq!(got.x, want[0], epsilon = 1e-4);
            assert_relative_eq!(got.y, want[1], epsilon = 1e-4);
            assert_relative_eq!(got.z, want[2], epsilon = 1e-4);
        }
    }

    #[test]
    fn test_rotation_x_90_degrees() {
        // Cube spanning [0,1]^3, pivot at (0.5, 0.5, 0.5)
        let mut doc = doc_with_points(&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]);
        apply_transform(
            &mut doc,
            &TransformRequest {
                scale: 1.0,
                rotation_degrees: [90.0, 0.0, 0.0],
            },
        )
        .unwrap();
        let points = read_positions(&doc, 0).unwrap();
        // (0,0,0): local (-0.5,-0.5,-0.5), Rx90 -> (-0.5, 0.5, -0.5), +pivot -> (0, 1, 0)
        assert_relative_eq!(points[0].x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(points[0].y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(points[0].z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_non_positive_scale_rejected() {
        let mut doc = doc_with_points(&[[1.0, 2.0, 3.0]]);
        let before = doc.buffer_data(0).unwrap().to_vec();
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = apply_transform(
                &mut doc,
                &TransformRequest {
                    scale,
                    rotation_degrees: [0.0; 3],
                },
            )
            .unwrap_err();
            assert!(matches!(err, Error::InvalidRequest(_)), "scale {scale}");
        }
        assert_eq!(doc.buffer_data(0).unwrap(), &before[..]);
    }

    #[test]
    fn test_empty_model_is_noop() {
        let mut doc = doc_with_points(&[]);
        apply_transform(
            &mut doc,
            &TransformRequest {
                scale: 2.0,
                rotation_degrees: [0.0; 3],
            },
        )
        .unwrap();
    }
}
