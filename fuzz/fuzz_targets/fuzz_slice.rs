#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nalgebra::{Point3, Vector3};

/// Structured input: a small triangle soup plus an arbitrary cutting plane
#[derive(Debug, Arbitrary)]
struct SliceInput {
    vertices: Vec<(f32, f32, f32)>,
    faces: Vec<(u8, u8, u8)>,
    origin: (f32, f32, f32),
    normal: (f32, f32, f32),
    keep_negative: bool,
    cap: bool,
}

fuzz_target!(|input: SliceInput| {
    let vertex_count = input.vertices.len().min(64);
    if vertex_count == 0 {
        return;
    }

    let mut bin = Vec::new();
    for &(x, y, z) in input.vertices.iter().take(vertex_count) {
        for v in [x, y, z] {
            if !v.is_finite() {
                return;
            }
            bin.extend_from_slice(&v.to_le_bytes());
        }
    }
    let position_bytes = bin.len();
    let mut index_count = 0usize;
    for &(a, b, c) in input.faces.iter().take(128) {
        for v in [a, b, c] {
            bin.push(v % vertex_count as u8);
        }
        index_count += 3;
    }
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let json = format!(
        r#"{{"asset":{{"version":"2.0"}},"meshes":[{{"primitives":[{{"attributes":{{"POSITION":0}},"indices":1}}]}}],"accessors":[{{"bufferView":0,"componentType":5126,"count":{vertex_count},"type":"VEC3"}},{{"bufferView":1,"componentType":5121,"count":{index_count},"type":"SCALAR"}}],"bufferViews":[{{"buffer":0,"byteOffset":0,"byteLength":{position_bytes}}},{{"buffer":0,"byteOffset":{position_bytes},"byteLength":{index_count}}}],"buffers":[{{"byteLength":{total}}}]}}"#,
        total = bin.len(),
    );
    let mut payload = json.into_bytes();
    glbedit::glb::pad_json_chunk(&mut payload);
    let bytes = glbedit::glb::serialize(&glbedit::glb::RawGlb {
        json: payload,
        bin: Some(bin),
        extra: Vec::new(),
    });

    let doc = match glbedit::Document::from_bytes(&bytes) {
        Ok(doc) => doc,
        Err(_) => return,
    };

    // Slicing may legitimately fail (empty result, zero normal) but must
    // never panic; a produced document must serialize.
    let request = glbedit::SliceRequest {
        origin: Point3::new(
            f64::from(input.origin.0),
            f64::from(input.origin.1),
            f64::from(input.origin.2),
        ),
        normal: Vector3::new(
            f64::from(input.normal.0),
            f64::from(input.normal.1),
            f64::from(input.normal.2),
        ),
        keep: if input.keep_negative {
            glbedit::KeepSide::Negative
        } else {
            glbedit::KeepSide::Positive
        },
        cap: input.cap,
    };
    if let Ok(outcome) = glbedit::slicer::slice(&doc, &request) {
        let _ = outcome.document.to_bytes().unwrap();
    }
});
