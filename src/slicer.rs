//! Plane slicing
//!
//! Cuts a model against an infinite plane and keeps one side. All
//! primitives are flattened into a single triangle soup before cutting, and
//! the result is rebuilt as a fresh single-mesh, single-buffer container.
//! Attributes other than position do not survive the cut; the first
//! material of the source document is carried over when present.
//!
//! Two clipper strategies implement [`PlaneClipper`]: the primary
//! interpolating clipper in [`clip`] splits straddling triangles and caps
//! the cut, and the [`fallback`] filter keeps only whole triangles. The
//! fallback engages when the primary fails, so a cut request degrades to a
//! coarser result instead of an error whenever any geometry survives.

pub mod clip;
pub mod fallback;

use nalgebra::{Point3, Unit, Vector3};
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::geometry::accessor::{component_extents, read_indices, read_positions};
use crate::model::{
    Accessor, Buffer, BufferView, COMPONENT_F32, COMPONENT_U32, Document, Mesh, Primitive, Root,
    TYPE_SCALAR, TYPE_VEC3,
};

pub use self::clip::CappedClipper;
pub use self::fallback::VertexFilterClipper;

/// Distance tolerance for on-plane classification (meters)
pub const PLANE_EPSILON: f64 = 1e-7;

/// Which half-space survives the cut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeepSide {
    /// Keep vertices with non-negative signed distance along the normal
    #[default]
    Positive,
    /// Keep the other side; implemented by negating the normal
    Negative,
}

/// A slice request: plane, side to keep, whether to cap the cut
#[derive(Debug, Clone, PartialEq)]
pub struct SliceRequest {
    /// A point on the cutting plane
    pub origin: Point3<f64>,
    /// Plane normal; need not be unit length
    pub normal: Vector3<f64>,
    /// Half-space to keep
    pub keep: KeepSide,
    /// Whether to close the cut with a planar cap
    pub cap: bool,
}

/// An oriented cutting plane with a unit normal
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    /// A point on the plane
    pub origin: Point3<f64>,
    /// Unit normal; the kept side is the positive half-space
    pub normal: Unit<Vector3<f64>>,
}

impl Plane {
    /// Signed distance of a point; positive on the kept side
    pub fn distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&(point - self.origin))
    }
}

/// Indexed triangle soup, the slicer's working representation
#[derive(Debug, Clone, Default)]
pub struct SoupMesh {
    /// Vertex positions in model space
    pub vertices: Vec<Point3<f64>>,
    /// Triangles as vertex index triples
    pub faces: Vec<[usize; 3]>,
}

impl SoupMesh {
    /// True when no face survived
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

/// A strategy for clipping a triangle soup against a plane
pub trait PlaneClipper {
    /// Strategy name for logs and warnings
    fn name(&self) -> &'static str;

    /// Clip the mesh, keeping the positive side of the plane
    ///
    /// Returns [`Error::EmptySliceResult`] when nothing survives.
    fn clip(&self, mesh: &SoupMesh, plane: &Plane) -> Result<SoupMesh>;
}

/// Outcome of a slice: the rebuilt document plus non-fatal notes
#[derive(Debug)]
pub struct SliceOutcome {
    /// The rebuilt single-mesh container holding the kept side
    pub document: Document,
    /// Set when the primary clipper failed and the filter fallback ran
    pub fallback_engaged: bool,
}

/// Cut the document against a plane and rebuild the kept side
///
/// # Errors
///
/// [`Error::InvalidRequest`] for a zero-length normal,
/// [`Error::EmptySliceResult`] when no geometry survives on the kept side.
pub fn slice(doc: &Document, request: &SliceRequest) -> Result<SliceOutcome> {
    let normal = match request.keep {
        KeepSide::Positive => request.normal,
        KeepSide::Negative => -request.normal,
    };
    let normal = Unit::try_new(normal, PLANE_EPSILON).ok_or_else(|| {
        Error::invalid_request("slice.normal", "plane normal must have non-zero length")
    })?;
    let plane = Plane {
        origin: request.origin,
        normal,
    };

    let soup = collect_soup(doc)?;
    if soup.is_empty() {
        return Err(Error::EmptySliceResult);
    }
    info!(
        vertices = soup.vertices.len(),
        faces = soup.faces.len(),
        keep = ?request.keep,
        cap = request.cap,
        "slicing triangle soup"
    );

    let primary = CappedClipper { cap: request.cap };
    let (kept, fallback_engaged) = match primary.clip(&soup, &plane) {
        Ok(mesh) => (mesh, false),
        Err(err) => {
            warn!(
                clipper = primary.name(),
                error = %err,
                "primary clipper failed, trying vertex filter fallback"
            );
            let fallback = VertexFilterClipper;
            (fallback.clip(&soup, &plane)?, true)
        }
    };

    debug!(
        vertices = kept.vertices.len(),
        faces = kept.faces.len(),
        fallback_engaged,
        "slice complete"
    );
    Ok(SliceOutcome {
        document: rebuild_document(doc, &kept),
        fallback_engaged,
    })
}

/// Flatten every primitive with a POSITION attribute into one soup
fn collect_soup(doc: &Document) -> Result<SoupMesh> {
    let mut soup = SoupMesh::default();
    for (_, primitive) in doc.root().primitives() {
        let Some(accessor) = primitive.position_accessor() else {
            continue;
        };
        let positions = read_positions(doc, accessor)?;
        let offset = soup.vertices.len();
        soup.vertices.extend(
            positions
                .iter()
                .map(|p| Point3::new(f64::from(p.x), f64::from(p.y), f64::from(p.z))),
        );

        match primitive.indices {
            Some(index_accessor) => {
                let indices = read_indices(doc, index_accessor)?;
                for tri in indices.chunks_exact(3) {
                    soup.faces.push([
                        offset + tri[0] as usize,
                        offset + tri[1] as usize,
                        offset + tri[2] as usize,
                    ]);
                }
            }
            None => {
                // Non-indexed primitives are sequential triangles
                for i in (0..positions.len() / 3 * 3).step_by(3) {
                    soup.faces.push([offset + i, offset + i + 1, offset + i + 2]);
                }
            }
        }
    }
    Ok(soup)
}

/// Rebuild a fresh single-mesh container holding the clipped soup
fn rebuild_document(source: &Document, mesh: &SoupMesh) -> Document {
    let positions: Vec<Point3<f32>> = mesh
        .vertices
        .iter()
        .map(|p| Point3::new(p.x as f32, p.y as f32, p.z as f32))
        .collect();

    let mut bin = Vec::with_capacity(positions.len() * 12 + mesh.faces.len() * 12);
    for p in &positions {
        bin.extend_from_slice(&p.x.to_le_bytes());
        bin.extend_from_slice(&p.y.to_le_bytes());
        bin.extend_from_slice(&p.z.to_le_bytes());
    }
    let position_bytes = bin.len();
    for face in &mesh.faces {
        for &index in face {
            bin.extend_from_slice(&(index as u32).to_le_bytes());
        }
    }

    let (min, max) = component_extents(&positions);
    let mut root = Root {
        asset: Some(json!({"version": "2.0"})),
        accessors: vec![
            Accessor {
                buffer_view: Some(0),
                byte_offset: None,
                component_type: COMPONENT_F32,
                count: positions.len(),
                element_type: TYPE_VEC3.to_string(),
                min: Some(min),
                max: Some(max),
                normalized: None,
                name: None,
                extra: Map::new(),
            },
            Accessor {
                buffer_view: Some(1),
                byte_offset: None,
                component_type: COMPONENT_U32,
                count: mesh.faces.len() * 3,
                element_type: TYPE_SCALAR.to_string(),
                min: None,
                max: None,
                normalized: None,
                name: None,
                extra: Map::new(),
            },
        ],
        buffer_views: vec![
            BufferView {
                buffer: 0,
                byte_offset: Some(0),
                byte_length: position_bytes,
                byte_stride: None,
                target: None,
                name: None,
                extra: Map::new(),
            },
            BufferView {
                buffer: 0,
                byte_offset: Some(position_bytes),
                byte_length: bin.len() - position_bytes,
                byte_stride: None,
                target: None,
                name: None,
                extra: Map::new(),
            },
        ],
        buffers: vec![Buffer {
            byte_length: bin.len(),
            uri: None,
            name: None,
            extra: Map::new(),
        }],
        ..Root::default()
    };

    let mut primitive = Primitive::default();
    primitive
        .attributes
        .insert(crate::model::ATTR_POSITION.to_string(), 0);
    primitive.indices = Some(1);
    if let Some(material) = source.root().materials.first() {
        root.materials.push(material.clone());
        primitive.material = Some(0);
    }

    root.meshes.push(Mesh {
        name: Some("sliced".to_string()),
        primitives: vec![primitive],
        extra: Map::new(),
    });
    root.nodes.push(crate::model::Node {
        mesh: Some(0),
        ..Default::default()
    });
    root.extra.insert(
        "scenes".to_string(),
        Value::Array(vec![json!({"nodes": [0]})]),
    );
    root.extra.insert("scene".to_string(), json!(0));

    Document::from_parts(root, bin)
}
