//! # glbedit
//!
//! In-place editing of binary glTF (GLB) containers for AR model delivery.
//!
//! This library parses a GLB container, applies geometric and material edits
//! directly to the scene descriptor and vertex buffers, and serializes the
//! result. Scene structure the editor does not model (animations, skins,
//! textures, extensions) is preserved verbatim.
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - Byte-faithful container round trip when nothing is edited
//! - Bounding box and pivot computation over heterogeneous scenes
//! - Pivot-centered whole-model rescale and rotation baked into vertex data
//! - Dimension standardization to a target real-world size
//! - Plane slicing with a capped cut surface and a robust fallback
//! - PBR material edits with a foliage/transparency exemption
//!
//! ## Example
//!
//! ```no_run
//! use glbedit::{Document, EditRequest, TransformEdit, apply_edits};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = Document::from_file("model.glb")?;
//!
//! // Standardize the model to 30 cm and lay it flat
//! let outcome = apply_edits(
//!     &mut doc,
//!     &EditRequest {
//!         transform: Some(TransformEdit {
//!             target_size: Some(0.3),
//!             rotation_degrees: [-90.0, 0.0, 0.0],
//!             ..TransformEdit::default()
//!         }),
//!         ..EditRequest::default()
//!     },
//! )?;
//!
//! println!(
//!     "{} vertices, {:.1} cm tall",
//!     outcome.info.vertex_count, outcome.info.dimensions.max
//! );
//! doc.write_to_file("model_edited.glb")?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod edit;
pub mod error;
pub mod geometry;
pub mod glb;
pub mod model;
pub mod slicer;

pub use edit::{
    DimensionsCm, EditOutcome, EditRequest, MaterialEdit, MaterialEditOptions, ModelInfo,
    TransformEdit, apply_edits, model_info,
};
pub use error::{Error, Result};
pub use model::{
    Accessor, AlphaMode, Buffer, BufferView, Document, Material, Mesh, Node,
    PbrMetallicRoughness, Primitive, Root,
};
pub use slicer::{KeepSide, SliceRequest};
