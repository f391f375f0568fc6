//! Core scene descriptor types
//!
//! Typed serde views of the GLB JSON scene descriptor. Every struct carries a
//! flattened extras map so fields this crate does not model (animations,
//! skins, textures, samplers, extensions, vendor extras) survive a
//! re-serialization untouched. Edits only ever write through the typed
//! fields, which is what keeps skinning and animation data out of reach of
//! the geometry engine by construction.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Component type tag for 32-bit floats
pub const COMPONENT_F32: u32 = 5126;
/// Component type tag for unsigned 8-bit integers
pub const COMPONENT_U8: u32 = 5121;
/// Component type tag for unsigned 16-bit integers
pub const COMPONENT_U16: u32 = 5123;
/// Component type tag for unsigned 32-bit integers
pub const COMPONENT_U32: u32 = 5125;

/// Accessor element type for 3-component vectors
pub const TYPE_VEC3: &str = "VEC3";
/// Accessor element type for scalars
pub const TYPE_SCALAR: &str = "SCALAR";

/// Attribute key for vertex positions
pub const ATTR_POSITION: &str = "POSITION";

/// Top-level scene descriptor
///
/// Only the sections the editor reads or writes are typed; everything else
/// rides along in `extra` (scenes, animations, skins, textures, images,
/// samplers, cameras, extensions).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Root {
    /// Asset metadata block (kept opaque)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<Value>,

    /// Scene graph nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Node>,

    /// Meshes, each a list of primitives
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meshes: Vec<Mesh>,

    /// PBR materials
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<super::Material>,

    /// Typed views into buffer views
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accessors: Vec<Accessor>,

    /// Byte ranges into buffers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffer_views: Vec<BufferView>,

    /// Binary buffers (BIN chunk or embedded data URIs)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffers: Vec<Buffer>,

    /// Everything else, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Root {
    /// Iterate over `(mesh_index, primitive)` pairs for the whole scene
    pub fn primitives(&self) -> impl Iterator<Item = (usize, &Primitive)> {
        self.meshes
            .iter()
            .enumerate()
            .flat_map(|(i, mesh)| mesh.primitives.iter().map(move |p| (i, p)))
    }
}

/// A scene graph node
///
/// Local TRS / matrix transforms are parsed so the descriptor re-encodes
/// faithfully, but the geometry engine never writes them: whole-model edits
/// mutate vertex buffers instead (see the transform engine).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Child node indices
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<usize>,

    /// Referenced mesh index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<usize>,

    /// Referenced skin index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skin: Option<usize>,

    /// Column-major local transform matrix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<[f64; 16]>,

    /// Local translation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<[f64; 3]>,

    /// Local rotation quaternion (x, y, z, w)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f64; 4]>,

    /// Local scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f64; 3]>,

    /// Node name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Unmodeled fields (weights, extensions, extras)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A mesh: a named list of primitives
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mesh {
    /// Mesh name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Primitives making up this mesh
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primitives: Vec<Primitive>,

    /// Unmodeled fields (weights, extensions, extras)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A drawable primitive within a mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Primitive {
    /// Attribute name to accessor index (POSITION, NORMAL, TEXCOORD_0, ...)
    #[serde(default, skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub attributes: std::collections::BTreeMap<String, usize>,

    /// Index accessor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<usize>,

    /// Material index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<usize>,

    /// Primitive topology mode (4 = triangles, the default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,

    /// Unmodeled fields (targets, extensions, extras)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Primitive {
    /// Accessor index of this primitive's POSITION attribute, if any
    ///
    /// A primitive without POSITION is inert for geometry operations and is
    /// skipped, never an error.
    pub fn position_accessor(&self) -> Option<usize> {
        self.attributes.get(ATTR_POSITION).copied()
    }
}

/// A typed, strided view into a buffer view
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    /// Backing buffer view index (absent means all-zeros per convention;
    /// such accessors are skipped by geometry operations)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<usize>,

    /// Byte offset into the buffer view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_offset: Option<usize>,

    /// Component type tag (5126 = f32, 5123 = u16, ...)
    pub component_type: u32,

    /// Number of elements
    pub count: usize,

    /// Element type ("VEC3", "SCALAR", ...)
    #[serde(rename = "type")]
    pub element_type: String,

    /// Componentwise minimum of the data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Vec<f64>>,

    /// Componentwise maximum of the data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Vec<f64>>,

    /// Whether integer data is normalized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized: Option<bool>,

    /// Accessor name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Unmodeled fields (sparse, extensions, extras)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Accessor {
    /// Size in bytes of one component of this accessor
    pub fn component_size(&self) -> usize {
        match self.component_type {
            COMPONENT_U8 => 1,
            COMPONENT_U16 => 2,
            COMPONENT_U32 | COMPONENT_F32 => 4,
            // 5120 (i8) and 5122 (i16) per the glTF component table
            5120 => 1,
            5122 => 2,
            _ => 0,
        }
    }

    /// Number of components per element ("VEC3" = 3, "SCALAR" = 1, ...)
    pub fn components_per_element(&self) -> usize {
        match self.element_type.as_str() {
            TYPE_SCALAR => 1,
            "VEC2" => 2,
            TYPE_VEC3 => 3,
            "VEC4" | "MAT2" => 4,
            "MAT3" => 9,
            "MAT4" => 16,
            _ => 0,
        }
    }

    /// Tightly packed byte size of one element
    pub fn element_size(&self) -> usize {
        self.component_size() * self.components_per_element()
    }
}

/// A byte range into a buffer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    /// Backing buffer index
    pub buffer: usize,

    /// Byte offset into the buffer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_offset: Option<usize>,

    /// Byte length of the view
    pub byte_length: usize,

    /// Byte stride between elements (absent means tightly packed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_stride: Option<usize>,

    /// GPU buffer binding target hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,

    /// View name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Unmodeled fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A binary buffer
///
/// A buffer without a `uri` is backed by the container's BIN chunk; a
/// `data:` URI is decoded at parse time. External file URIs are rejected
/// because the editor's contract requires a self-contained container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    /// Byte length of the buffer
    pub byte_length: usize,

    /// Buffer URI (absent for the BIN chunk)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Buffer name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Unmodeled fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
