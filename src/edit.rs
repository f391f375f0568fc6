//! Edit pipeline
//!
//! [`apply_edits`] is the single entry point the surrounding service layer
//! calls: it takes a parsed document plus a typed edit request, applies the
//! requested operations in a fixed order, and reports the resulting model
//! metadata along with any non-fatal warnings.
//!
//! Operations run material, then transform, then slice. Materials first
//! because they never move geometry; transform before slice so the slicing
//! plane addresses the model at its final size; and the transform pivot is
//! computed from pre-transform geometry by construction.

pub mod material;

pub use self::material::{
    DEFAULT_EXEMPT_KEYWORDS, MaterialClass, MaterialEdit, MaterialEditOptions,
    apply_material_edit, classify, parse_hex_color,
};

use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::geometry::{
    BoundsScope, Dimensions, TransformRequest, apply_transform, compute_bounds,
    meters_to_centimeters, plan_standardization,
};
use crate::model::Document;
use crate::slicer::{self, SliceRequest};

/// Geometry part of an edit request
///
/// An explicit `scale` factor takes precedence over `target_size`; the
/// latter standardizes the longest bounding box edge to the given extent
/// in meters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformEdit {
    /// Explicit uniform scale factor; must be positive
    pub scale: Option<f64>,
    /// Target longest extent in meters
    pub target_size: Option<f64>,
    /// Euler rotation in degrees, applied about fixed axes X, then Y, then Z
    pub rotation_degrees: [f64; 3],
}

/// A complete edit request; absent parts are skipped
#[derive(Debug, Clone, Default)]
pub struct EditRequest {
    /// Material parameter changes, applied to every material
    pub material: Option<MaterialEdit>,
    /// Scale and rotation about the scene pivot
    pub transform: Option<TransformEdit>,
    /// At most one plane cut per edit
    pub slice: Option<SliceRequest>,
    /// Material modifier tuning (exemption keywords)
    pub material_options: MaterialEditOptions,
}

/// Model extents in centimeters, the unit the service reports
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DimensionsCm {
    /// Extent along X in centimeters
    pub x: f64,
    /// Extent along Y in centimeters
    pub y: f64,
    /// Extent along Z in centimeters
    pub z: f64,
    /// Longest extent in centimeters
    pub max: f64,
}

impl DimensionsCm {
    fn from_meters(dimensions: &Dimensions) -> Self {
        let cm = dimensions.to_centimeters();
        Self {
            x: cm.x,
            y: cm.y,
            z: cm.z,
            max: meters_to_centimeters(dimensions.max_extent()),
        }
    }
}

/// Metadata record describing the edited model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    /// Bounding box extents in centimeters; zero for an empty model
    pub dimensions: DimensionsCm,
    /// Vertices across all primitives with positions
    pub vertex_count: usize,
    /// Triangles across all primitives with positions
    pub face_count: usize,
}

/// Result of an edit: metadata plus non-fatal warnings
#[derive(Debug, Clone)]
pub struct EditOutcome {
    /// Metadata record for the edited model
    pub info: ModelInfo,
    /// Degenerate-geometry or fallback notes worth surfacing to the caller
    pub warnings: Vec<String>,
}

/// Compute the metadata record for a document without editing it
pub fn model_info(doc: &Document) -> Result<ModelInfo> {
    let bounds = compute_bounds(doc, BoundsScope::Scene)?;
    let dimensions = Dimensions::from_bounds(&bounds);
    Ok(ModelInfo {
        dimensions: DimensionsCm::from_meters(&dimensions),
        vertex_count: doc.vertex_count(),
        face_count: doc.face_count(),
    })
}

/// Apply an edit request to a document in place
///
/// Runs material, then transform, then slice, then measures the result.
/// A failed operation aborts the whole edit with an error; warnings carry
/// the non-fatal degradations (degenerate geometry skipping
/// standardization, the fallback clipper engaging).
pub fn apply_edits(doc: &mut Document, request: &EditRequest) -> Result<EditOutcome> {
    let mut warnings = Vec::new();

    if let Some(material_edit) = &request.material {
        apply_material_edit(doc, material_edit, &request.material_options)?;
    }

    if let Some(transform_edit) = &request.transform {
        let scale = resolve_scale(doc, transform_edit, &mut warnings)?;
        apply_transform(
            doc,
            &TransformRequest {
                scale,
                rotation_degrees: transform_edit.rotation_degrees,
            },
        )?;
    }

    if let Some(slice_request) = &request.slice {
        let outcome = slicer::slice(doc, slice_request)?;
        if outcome.fallback_engaged {
            warnings.push(
                "slice used the whole-triangle fallback; the cut surface is uncapped".to_string(),
            );
        }
        *doc = outcome.document;
    }

    let info = model_info(doc)?;
    info!(
        vertex_count = info.vertex_count,
        face_count = info.face_count,
        max_cm = info.dimensions.max,
        warnings = warnings.len(),
        "edit complete"
    );
    Ok(EditOutcome { info, warnings })
}

fn resolve_scale(
    doc: &Document,
    edit: &TransformEdit,
    warnings: &mut Vec<String>,
) -> Result<f64> {
    if let Some(scale) = edit.scale {
        if scale <= 0.0 || !scale.is_finite() {
            return Err(Error::invalid_request(
                "transform.scale",
                format!("{scale} is not a positive finite factor"),
            ));
        }
        return Ok(scale);
    }
    let Some(target) = edit.target_size else {
        return Ok(1.0);
    };
    let bounds = compute_bounds(doc, BoundsScope::Scene)?;
    let current = Dimensions::from_bounds(&bounds).max_extent();
    let plan = plan_standardization(current, target);
    if let Some(warning) = plan.warning {
        warnings.push(warning);
    }
    Ok(plan.factor)
}
