//! Strided accessor reads and writes
//!
//! Accessor byte ranges are validated here, on first touch, against both the
//! buffer view extent and the actual buffer length. A document whose broken
//! accessors are never read stays loadable.

use nalgebra::Point3;
use tracing::trace;

use crate::error::{Error, Result};
use crate::model::{
    COMPONENT_F32, COMPONENT_U8, COMPONENT_U16, COMPONENT_U32, Document, TYPE_SCALAR, TYPE_VEC3,
};

/// Resolved byte layout of an accessor inside its buffer
struct Layout {
    buffer: usize,
    /// Offset of element 0 from the start of the buffer
    base: usize,
    stride: usize,
    count: usize,
}

fn resolve(doc: &Document, accessor_index: usize) -> Result<Option<Layout>> {
    let root = doc.root();
    let accessor = root
        .accessors
        .get(accessor_index)
        .ok_or_else(|| Error::bad_index("accessor", accessor_index, root.accessors.len()))?;

    // No buffer view means the accessor reads as all zeros.
    let Some(view_index) = accessor.buffer_view else {
        return Ok(None);
    };
    let view = root
        .buffer_views
        .get(view_index)
        .ok_or_else(|| Error::bad_index("bufferView", view_index, root.buffer_views.len()))?;

    let element_size = accessor.element_size();
    if element_size == 0 {
        return Err(Error::Unsupported(format!(
            "accessor {} has unsupported componentType {} / type '{}'",
            accessor_index, accessor.component_type, accessor.element_type
        )));
    }
    let stride = view.byte_stride.unwrap_or(element_size);
    if stride < element_size {
        return Err(Error::InvalidDescriptor(format!(
            "bufferView {} stride {} is smaller than element size {}",
            view_index, stride, element_size
        )));
    }

    // Offsets, counts, and strides come straight from the descriptor and may
    // be hostile; arithmetic that overflows is just another out-of-range case.
    let view_offset = view.byte_offset.unwrap_or(0);
    let accessor_offset = accessor.byte_offset.unwrap_or(0);
    let buffer_len = doc.buffer_data(view.buffer)?.len();
    let available = view.byte_length.min(buffer_len.saturating_sub(view_offset));
    let needed = if accessor.count == 0 {
        Some(0)
    } else {
        stride
            .checked_mul(accessor.count - 1)
            .and_then(|span| span.checked_add(accessor_offset))
            .and_then(|span| span.checked_add(element_size))
    };
    let view_end = view_offset.checked_add(view.byte_length);
    match (needed, view_end) {
        (Some(needed), Some(view_end)) if needed <= available && view_end <= buffer_len => {
            Ok(Some(Layout {
                buffer: view.buffer,
                base: view_offset.saturating_add(accessor_offset),
                stride,
                count: accessor.count,
            }))
        }
        _ => Err(Error::BadAccessorRange {
            accessor: accessor_index,
            needed: needed.unwrap_or(usize::MAX),
            available,
        }),
    }
}

fn require_position_accessor(doc: &Document, accessor_index: usize) -> Result<()> {
    let accessor = &doc.root().accessors[accessor_index];
    if accessor.component_type != COMPONENT_F32 || accessor.element_type != TYPE_VEC3 {
        return Err(Error::Unsupported(format!(
            "accessor {} is componentType {} / type '{}'; positions must be float VEC3",
            accessor_index, accessor.component_type, accessor.element_type
        )));
    }
    Ok(())
}

/// Read a POSITION accessor as a vector of points
///
/// Honors the buffer view stride. An accessor without a buffer view yields
/// `count` origin points per the zero-fill convention.
///
/// # Errors
///
/// [`Error::Unsupported`] if the accessor is not float VEC3,
/// [`Error::BadAccessorRange`] if its byte range escapes the buffer.
pub fn read_positions(doc: &Document, accessor_index: usize) -> Result<Vec<Point3<f32>>> {
    let root = doc.root();
    if accessor_index >= root.accessors.len() {
        return Err(Error::bad_index("accessor", accessor_index, root.accessors.len()));
    }
    require_position_accessor(doc, accessor_index)?;

    let Some(layout) = resolve(doc, accessor_index)? else {
        return Ok(vec![Point3::origin(); root.accessors[accessor_index].count]);
    };
    let data = doc.buffer_data(layout.buffer)?;

    let mut points = Vec::with_capacity(layout.count);
    for i in 0..layout.count {
        let at = layout.base + i * layout.stride;
        let x = f32::from_le_bytes(data[at..at + 4].try_into().unwrap());
        let y = f32::from_le_bytes(data[at + 4..at + 8].try_into().unwrap());
        let z = f32::from_le_bytes(data[at + 8..at + 12].try_into().unwrap());
        points.push(Point3::new(x, y, z));
    }
    trace!(accessor = accessor_index, count = layout.count, "read positions");
    Ok(points)
}

/// Write a POSITION accessor in place and refresh its min/max
///
/// The new data must have exactly the accessor's element count; in-place
/// writes never change buffer layout.
///
/// # Errors
///
/// [`Error::InvariantViolation`] on a count mismatch, [`Error::Unsupported`]
/// if the accessor has no buffer view or is not float VEC3.
pub fn write_positions(
    doc: &mut Document,
    accessor_index: usize,
    positions: &[Point3<f32>],
) -> Result<()> {
    let root = doc.root();
    if accessor_index >= root.accessors.len() {
        return Err(Error::bad_index("accessor", accessor_index, root.accessors.len()));
    }
    require_position_accessor(doc, accessor_index)?;

    let Some(layout) = resolve(doc, accessor_index)? else {
        return Err(Error::Unsupported(format!(
            "accessor {} has no buffer view and cannot be written",
            accessor_index
        )));
    };
    if positions.len() != layout.count {
        return Err(Error::InvariantViolation(format!(
            "accessor {} holds {} elements, got {} replacement positions",
            accessor_index,
            layout.count,
            positions.len()
        )));
    }

    let (base, stride) = (layout.base, layout.stride);
    let data = doc.buffer_data_mut(layout.buffer)?;
    for (i, p) in positions.iter().enumerate() {
        let at = base + i * stride;
        data[at..at + 4].copy_from_slice(&p.x.to_le_bytes());
        data[at + 4..at + 8].copy_from_slice(&p.y.to_le_bytes());
        data[at + 8..at + 12].copy_from_slice(&p.z.to_le_bytes());
    }

    // Viewers trust accessor min/max for culling; keep them honest.
    let (min, max) = component_extents(positions);
    let accessor = &mut doc.root_mut().accessors[accessor_index];
    accessor.min = Some(min);
    accessor.max = Some(max);
    trace!(accessor = accessor_index, count = positions.len(), "wrote positions");
    Ok(())
}

/// Componentwise min and max of a non-empty position slice
pub(crate) fn component_extents(positions: &[Point3<f32>]) -> (Vec<f64>, Vec<f64>) {
    let mut min = [f64::INFINITY; 3];
    let mut max = [f64::NEG_INFINITY; 3];
    for p in positions {
        for axis in 0..3 {
            let v = f64::from(p[axis]);
            min[axis] = min[axis].min(v);
            max[axis] = max[axis].max(v);
        }
    }
    if positions.is_empty() {
        (vec![0.0; 3], vec![0.0; 3])
    } else {
        (min.to_vec(), max.to_vec())
    }
}

/// Read an index accessor, widening u8/u16/u32 indices to u32
///
/// # Errors
///
/// [`Error::Unsupported`] for non-scalar or non-integer accessors,
/// [`Error::BadAccessorRange`] if the byte range escapes the buffer.
pub fn read_indices(doc: &Document, accessor_index: usize) -> Result<Vec<u32>> {
    let root = doc.root();
    let accessor = root
        .accessors
        .get(accessor_index)
        .ok_or_else(|| Error::bad_index("accessor", accessor_index, root.accessors.len()))?;
    if accessor.element_type != TYPE_SCALAR {
        return Err(Error::Unsupported(format!(
            "index accessor {} has type '{}'; indices must be SCALAR",
            accessor_index, accessor.element_type
        )));
    }
    let component_type = accessor.component_type;
    if !matches!(component_type, COMPONENT_U8 | COMPONENT_U16 | COMPONENT_U32) {
        return Err(Error::Unsupported(format!(
            "index accessor {} has componentType {}; expected u8, u16, or u32",
            accessor_index, component_type
        )));
    }

    let Some(layout) = resolve(doc, accessor_index)? else {
        return Ok(vec![0; accessor.count]);
    };
    let data = doc.buffer_data(layout.buffer)?;

    let mut indices = Vec::with_capacity(layout.count);
    for i in 0..layout.count {
        let at = layout.base + i * layout.stride;
        let value = match component_type {
            COMPONENT_U8 => u32::from(data[at]),
            COMPONENT_U16 => u32::from(u16::from_le_bytes(data[at..at + 2].try_into().unwrap())),
            _ => u32::from_le_bytes(data[at..at + 4].try_into().unwrap()),
        };
        indices.push(value);
    }
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Accessor, Buffer, BufferView, Root};
    use approx::assert_relative_eq;
    use serde_json::Map;

    fn position_doc(points: &[[f32; 3]]) -> Document {
        let mut bin = Vec::new();
        for p in points {
            for c in p {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        let root = Root {
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
    fn test_read_positions_tightly_packed() {
        let doc = position_doc(&[[1.0, 2.0, 3.0], [-1.0, 0.5, 0.0]]);
        let points = read_positions(&doc, 0).unwrap();
        assert_eq!(points.len(), 2);
        assert_relative_eq!(points[1].y, 0.5);
    }

    #[test]
    fn test_read_positions_with_stride() {
        // Interleaved position + normal, stride 24, positions first
        let mut bin = Vec::new();
        for p in [[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]] {
            for c in p {
                bin.extend_from_slice(&c.to_le_bytes());
            }
            bin.extend_from_slice(&[0u8; 12]);
        }
        let mut doc = position_doc(&[[0.0; 3], [0.0; 3]]);
        doc.root_mut().buffer_views[0].byte_stride = Some(24);
        doc.root_mut().buffer_views[0].byte_length = bin.len();
        doc.root_mut().buffers[0].byte_length = bin.len();
        let doc = Document::from_parts(doc.root().clone(), bin);

        let points = read_positions(&doc, 0).unwrap();
        assert_relative_eq!(points[1].x, 4.0);
    }

    #[test]
    fn test_write_positions_updates_min_max() {
        let mut doc = position_doc(&[[0.0; 3], [1.0, 1.0, 1.0]]);
        write_positions(
            &mut doc,
            0,
            &[Point3::new(-2.0, 0.0, 3.0), Point3::new(5.0, -1.0, 0.0)],
        )
        .unwrap();
        let accessor = &doc.root().accessors[0];
        assert_eq!(accessor.min.as_deref(), Some(&[-2.0, -1.0, 0.0][..]));
        assert_eq!(accessor.max.as_deref(), Some(&[5.0, 0.0, 3.0][..]));
        let points = read_positions(&doc, 0).unwrap();
        assert_relative_eq!(points[0].z, 3.0);
    }

    #[test]
    fn test_write_count_mismatch_rejected() {
        let mut doc = position_doc(&[[0.0; 3], [1.0, 1.0, 1.0]]);
        let err = write_positions(&mut doc, 0, &[Point3::origin()]).unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
    }

    #[test]
    fn test_range_overflow_reported_lazily() {
        let mut doc = position_doc(&[[0.0; 3]]);
        // Claim more elements than the buffer holds
        doc.root_mut().accessors[0].count = 10;
        let err = read_positions(&doc, 0).unwrap_err();
        match err {
            Error::BadAccessorRange { accessor, needed, available } => {
                assert_eq!(accessor, 0);
                assert!(needed > available);
            }
            other => panic!("expected BadAccessorRange, got {other}"),
        }
    }

    #[test]
    fn test_hostile_count_overflow_is_range_error() {
        // A count near usize::MAX makes stride * (count - 1) overflow; that
        // must come back as a range error, never a panic.
        let mut doc = position_doc(&[[0.0; 3]]);
        doc.root_mut().accessors[0].count = usize::MAX / 8;
        let err = read_positions(&doc, 0).unwrap_err();
        assert!(matches!(err, Error::BadAccessorRange { accessor: 0, .. }));
    }

    #[test]
    fn test_hostile_view_offset_overflow_is_range_error() {
        let mut doc = position_doc(&[[0.0; 3]]);
        doc.root_mut().buffer_views[0].byte_offset = Some(usize::MAX);
        let err = read_positions(&doc, 0).unwrap_err();
        assert!(matches!(err, Error::BadAccessorRange { accessor: 0, .. }));
    }

    #[test]
    fn test_hostile_accessor_offset_overflow_is_range_error() {
        let mut doc = position_doc(&[[0.0; 3]]);
        doc.root_mut().accessors[0].byte_offset = Some(usize::MAX - 4);
        let err = read_positions(&doc, 0).unwrap_err();
        assert!(matches!(err, Error::BadAccessorRange { accessor: 0, .. }));
    }

    #[test]
    fn test_non_float_positions_rejected() {
        let mut doc = position_doc(&[[0.0; 3]]);
        doc.root_mut().accessors[0].component_type = COMPONENT_U16;
        let err = read_positions(&doc, 0).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn test_read_u16_indices() {
        let mut doc = position_doc(&[[0.0; 3]]);
        let bin: Vec<u8> = [0u16, 1, 2, 2, 1, 3]
            .iter()
            .flat_map(|i| i.to_le_bytes())
            .collect();
        let mut root = doc.root().clone();
        root.buffer_views[0].byte_length = bin.len();
        root.buffers[0].byte_length = bin.len();
        root.accessors[0] = Accessor {
            buffer_view: Some(0),
            byte_offset: None,
            component_type: COMPONENT_U16,
            count: 6,
            element_type: TYPE_SCALAR.to_string(),
            min: None,
            max: None,
            normalized: None,
            name: None,
            extra: Map::new(),
        };
        doc = Document::from_parts(root, bin);
        assert_eq!(read_indices(&doc, 0).unwrap(), vec![0, 1, 2, 2, 1, 3]);
    }

    #[test]
    fn test_missing_buffer_view_reads_zeros() {
        let mut doc = position_doc(&[[7.0; 3], [7.0; 3]]);
        doc.root_mut().accessors[0].buffer_view = None;
        let points = read_positions(&doc, 0).unwrap();
        assert_eq!(points, vec![Point3::origin(); 2]);
    }
}
