//! Shared helpers for integration tests
//!
//! Builds small but complete GLB containers programmatically so tests do not
//! depend on binary fixtures.

use glbedit::glb::{self, RawGlb};

/// Assemble a GLB container from a JSON descriptor string and optional BIN
/// chunk payload.
pub fn glb_from_parts(json: &str, bin: Option<Vec<u8>>) -> Vec<u8> {
    let mut payload = json.as_bytes().to_vec();
    glb::pad_json_chunk(&mut payload);
    let bin = bin.map(|mut data| {
        glb::pad_bin_chunk(&mut data);
        data
    });
    glb::serialize(&RawGlb {
        json: payload,
        bin,
        extra: Vec::new(),
    })
}

/// A complete indexed unit cube spanning `[-size/2, size/2]` on every axis,
/// with one material of the given name.
///
/// Layout: 8 corner vertices (f32 VEC3), 36 u16 indices, single mesh and
/// node, asset block, BIN-chunk buffer. One extra descriptor field
/// (`animations`) is included so preservation of unmodeled sections is
/// exercised everywhere the cube is used.
pub fn unit_cube_glb(size: f32, material_name: &str) -> Vec<u8> {
    let h = size / 2.0;
    let corners: [[f32; 3]; 8] = [
        [-h, -h, -h],
        [h, -h, -h],
        [h, h, -h],
        [-h, h, -h],
        [-h, -h, h],
        [h, -h, h],
        [h, h, h],
        [-h, h, h],
    ];
    let indices: [u16; 36] = [
        0, 2, 1, 0, 3, 2, // -z
        4, 5, 6, 4, 6, 7, // +z
        0, 1, 5, 0, 5, 4, // -y
        2, 3, 7, 2, 7, 6, // +y
        1, 2, 6, 1, 6, 5, // +x
        3, 0, 4, 3, 4, 7, // -x
    ];

    let mut bin = Vec::new();
    for c in &corners {
        for v in c {
            bin.extend_from_slice(&v.to_le_bytes());
        }
    }
    let position_bytes = bin.len();
    for i in &indices {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    let index_bytes = bin.len() - position_bytes;

    let json = format!(
        r#"{{
  "asset": {{"version": "2.0", "generator": "glbedit-tests"}},
  "scene": 0,
  "scenes": [{{"nodes": [0]}}],
  "nodes": [{{"mesh": 0, "name": "cube"}}],
  "meshes": [{{"name": "cube", "primitives": [{{"attributes": {{"POSITION": 0}}, "indices": 1, "material": 0}}]}}],
  "materials": [{{"name": "{material_name}", "pbrMetallicRoughness": {{"baseColorFactor": [0.8, 0.8, 0.8, 1.0]}}}}],
  "accessors": [
    {{"bufferView": 0, "componentType": 5126, "count": 8, "type": "VEC3", "min": [{min}, {min}, {min}], "max": [{max}, {max}, {max}]}},
    {{"bufferView": 1, "componentType": 5123, "count": 36, "type": "SCALAR"}}
  ],
  "bufferViews": [
    {{"buffer": 0, "byteOffset": 0, "byteLength": {position_bytes}}},
    {{"buffer": 0, "byteOffset": {position_bytes}, "byteLength": {index_bytes}}}
  ],
  "buffers": [{{"byteLength": {total}}}],
  "animations": [{{"name": "placeholder"}}]
}}"#,
        min = -h,
        max = h,
        total = bin.len(),
    );
    glb_from_parts(&json, Some(bin))
}
