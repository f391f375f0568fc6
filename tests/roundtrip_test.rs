//! Container round-trip integration tests

mod common;

use common::{glb_from_parts, unit_cube_glb};
use glbedit::{Document, Error};

#[test]
fn test_clean_parse_serialize_is_byte_identical() {
    let bytes = unit_cube_glb(1.0, "paint");
    let doc = Document::from_bytes(&bytes).unwrap();
    assert_eq!(doc.to_bytes().unwrap(), bytes);
}

#[test]
fn test_unmodeled_sections_survive_a_material_edit() {
    let bytes = unit_cube_glb(1.0, "paint");
    let mut doc = Document::from_bytes(&bytes).unwrap();

    glbedit::apply_edits(
        &mut doc,
        &glbedit::EditRequest {
            material: Some(glbedit::MaterialEdit {
                base_color_hex: Some("#336699".to_string()),
                ..glbedit::MaterialEdit::default()
            }),
            ..glbedit::EditRequest::default()
        },
    )
    .unwrap();

    let reparsed = Document::from_bytes(&doc.to_bytes().unwrap()).unwrap();
    assert!(reparsed.root().extra.contains_key("animations"));
    assert!(reparsed.root().extra.contains_key("scenes"));
    assert_eq!(reparsed.root().nodes[0].name.as_deref(), Some("cube"));
}

#[test]
fn test_unknown_trailing_chunk_preserved() {
    let mut bytes = unit_cube_glb(1.0, "paint");
    // Append a vendor chunk and fix up the declared total length
    let vendor = [4u32.to_le_bytes(), 0x56_45_4E_44u32.to_le_bytes()].concat();
    bytes.extend_from_slice(&vendor);
    bytes.extend_from_slice(&[0xAB, 0xCD, 0xEF, 0x01]);
    let total = bytes.len() as u32;
    bytes[8..12].copy_from_slice(&total.to_le_bytes());

    let doc = Document::from_bytes(&bytes).unwrap();
    assert_eq!(doc.to_bytes().unwrap(), bytes);
}

#[test]
fn test_bad_magic_rejected() {
    let mut bytes = unit_cube_glb(1.0, "paint");
    bytes[0] = b'X';
    match Document::from_bytes(&bytes) {
        Err(Error::MalformedHeader(msg)) => assert!(msg.contains("magic")),
        other => panic!("expected MalformedHeader, got {other:?}"),
    }
}

#[test]
fn test_truncated_container_rejected() {
    let bytes = unit_cube_glb(1.0, "paint");
    let err = Document::from_bytes(&bytes[..bytes.len() - 10]).unwrap_err();
    assert!(matches!(
        err,
        Error::TruncatedChunk(_) | Error::MalformedHeader(_)
    ));
}

#[test]
fn test_broken_accessor_parses_but_fails_on_read() {
    // Accessor claims 1000 vertices against a 96-byte view
    let json = r#"{
  "asset": {"version": "2.0"},
  "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
  "accessors": [{"bufferView": 0, "componentType": 5126, "count": 1000, "type": "VEC3"}],
  "bufferViews": [{"buffer": 0, "byteOffset": 0, "byteLength": 96}],
  "buffers": [{"byteLength": 96}]
}"#;
    let bytes = glb_from_parts(json, Some(vec![0u8; 96]));
    let doc = Document::from_bytes(&bytes).unwrap();
    let err = glbedit::geometry::read_positions(&doc, 0).unwrap_err();
    assert!(matches!(err, Error::BadAccessorRange { accessor: 0, .. }));
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cube.glb");
    std::fs::write(&path, unit_cube_glb(1.0, "paint")).unwrap();

    let doc = Document::from_file(&path).unwrap();
    let out = dir.path().join("cube_out.glb");
    doc.write_to_file(&out).unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), std::fs::read(&out).unwrap());
}
