//! GLB container framing
//!
//! This module handles the binary layer of the GLB container convention:
//! a 12-byte header (magic, version, total length) followed by chunks, each
//! prefixed with a little-endian length and a four-byte type tag. The first
//! chunk is the JSON scene descriptor, the optional second chunk is the
//! binary buffer (BIN), and any further chunks are preserved verbatim.
//!
//! Chunk payloads are kept exactly as declared, including any trailing
//! padding bytes, so that an unmodified document can be re-emitted
//! byte-identically. Padding is only synthesized when a chunk is rebuilt
//! after a logical mutation.

use crate::error::{Error, Result};
use tracing::debug;

/// Magic bytes at the start of every GLB container
pub const MAGIC: [u8; 4] = *b"glTF";

/// Container version supported by this crate
pub const VERSION: u32 = 2;

/// Byte length of the fixed container header
pub const HEADER_LEN: usize = 12;

/// Byte length of each chunk prefix (length + type)
pub const CHUNK_HEADER_LEN: usize = 8;

/// Chunk type tag for the JSON scene descriptor ("JSON")
pub const CHUNK_JSON: u32 = 0x4E4F_534A;

/// Chunk type tag for the binary buffer ("BIN\0")
pub const CHUNK_BIN: u32 = 0x004E_4942;

/// A raw chunk: type tag plus payload bytes exactly as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Four-byte chunk type tag
    pub kind: u32,
    /// Payload bytes, including any padding the producer wrote
    pub data: Vec<u8>,
}

/// The raw chunk-level view of a GLB container
///
/// `json` holds the descriptor chunk payload verbatim (it may carry trailing
/// space padding); `bin` holds the binary buffer chunk payload if present;
/// `extra` holds any additional chunks in their original order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGlb {
    /// JSON descriptor chunk payload
    pub json: Vec<u8>,
    /// Binary buffer chunk payload
    pub bin: Option<Vec<u8>>,
    /// Unknown trailing chunks, preserved verbatim
    pub extra: Vec<Chunk>,
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Parse a byte buffer into its raw chunks
///
/// Validates the header magic, version, and declared total length, then
/// walks the chunk table. The first chunk must be the JSON descriptor.
///
/// # Errors
///
/// Returns [`Error::MalformedHeader`] for a bad magic/version/length and
/// [`Error::TruncatedChunk`] when a declared chunk length exceeds the
/// remaining bytes.
pub fn parse(bytes: &[u8]) -> Result<RawGlb> {
    if bytes.len() < HEADER_LEN {
        return Err(Error::malformed_header(
            "length",
            format!("container is {} bytes, header needs {}", bytes.len(), HEADER_LEN),
        ));
    }

    if bytes[0..4] != MAGIC {
        return Err(Error::malformed_header(
            "magic",
            format!(
                "expected {:02x?}, got {:02x?}",
                MAGIC,
                &bytes[0..4]
            ),
        ));
    }

    let version = read_u32(bytes, 4);
    if version != VERSION {
        return Err(Error::malformed_header(
            "version",
            format!("expected {}, got {}", VERSION, version),
        ));
    }

    let declared_len = read_u32(bytes, 8) as usize;
    if declared_len > bytes.len() {
        return Err(Error::malformed_header(
            "total length",
            format!("declares {} bytes, stream has {}", declared_len, bytes.len()),
        ));
    }

    let mut offset = HEADER_LEN;
    let mut json: Option<Vec<u8>> = None;
    let mut bin: Option<Vec<u8>> = None;
    let mut extra = Vec::new();

    while offset + CHUNK_HEADER_LEN <= declared_len {
        let chunk_len = read_u32(bytes, offset) as usize;
        let kind = read_u32(bytes, offset + 4);
        let data_start = offset + CHUNK_HEADER_LEN;

        let Some(data_end) = data_start.checked_add(chunk_len) else {
            return Err(Error::TruncatedChunk(format!(
                "chunk at offset {} declares an overflowing length",
                offset
            )));
        };
        if data_end > declared_len {
            return Err(Error::TruncatedChunk(format!(
                "chunk at offset {} declares {} bytes, only {} remain",
                offset,
                chunk_len,
                declared_len - data_start
            )));
        }

        let data = bytes[data_start..data_end].to_vec();
        match kind {
            CHUNK_JSON if json.is_none() => json = Some(data),
            CHUNK_BIN if bin.is_none() => bin = Some(data),
            _ => extra.push(Chunk { kind, data }),
        }

        offset = data_end;
    }

    let json = json.ok_or_else(|| {
        Error::malformed_header("chunks", "container has no JSON descriptor chunk")
    })?;

    debug!(
        json_len = json.len(),
        bin_len = bin.as_ref().map_or(0, Vec::len),
        extra_chunks = extra.len(),
        "parsed GLB chunk table"
    );

    Ok(RawGlb { json, bin, extra })
}

/// Serialize raw chunks back into a GLB byte buffer
///
/// Chunk payloads are emitted exactly as given; the header's total length is
/// recomputed. Callers that rebuilt a payload are responsible for padding it
/// first (see [`pad_json_chunk`] and [`pad_bin_chunk`]).
pub fn serialize(glb: &RawGlb) -> Vec<u8> {
    let mut total = HEADER_LEN + CHUNK_HEADER_LEN + glb.json.len();
    if let Some(bin) = &glb.bin {
        total += CHUNK_HEADER_LEN + bin.len();
    }
    for chunk in &glb.extra {
        total += CHUNK_HEADER_LEN + chunk.data.len();
    }

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());

    let mut write_chunk = |kind: u32, data: &[u8]| {
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&kind.to_le_bytes());
        out.extend_from_slice(data);
    };

    write_chunk(CHUNK_JSON, &glb.json);
    if let Some(bin) = &glb.bin {
        write_chunk(CHUNK_BIN, bin);
    }
    for chunk in &glb.extra {
        write_chunk(chunk.kind, &chunk.data);
    }

    out
}

/// Pad a rebuilt JSON chunk payload to a 4-byte boundary with spaces
pub fn pad_json_chunk(data: &mut Vec<u8>) {
    while data.len() % 4 != 0 {
        data.push(b' ');
    }
}

/// Pad a rebuilt binary chunk payload to a 4-byte boundary with zeros
pub fn pad_bin_chunk(data: &mut Vec<u8>) {
    while data.len() % 4 != 0 {
        data.push(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_glb(json: &[u8], bin: Option<&[u8]>) -> Vec<u8> {
        let glb = RawGlb {
            json: json.to_vec(),
            bin: bin.map(<[u8]>::to_vec),
            extra: Vec::new(),
        };
        serialize(&glb)
    }

    #[test]
    fn test_parse_round_trip_json_only() {
        let bytes = minimal_glb(b"{}  ", None);
        let glb = parse(&bytes).unwrap();
        assert_eq!(glb.json, b"{}  ");
        assert!(glb.bin.is_none());
        assert_eq!(serialize(&glb), bytes);
    }

    #[test]
    fn test_parse_round_trip_with_bin() {
        let bin = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let bytes = minimal_glb(b"{}  ", Some(&bin));
        let glb = parse(&bytes).unwrap();
        assert_eq!(glb.bin.as_deref(), Some(&bin[..]));
        assert_eq!(serialize(&glb), bytes);
    }

    #[test]
    fn test_parse_preserves_extra_chunks() {
        let mut glb = RawGlb {
            json: b"{}  ".to_vec(),
            bin: Some(vec![0u8; 4]),
            extra: vec![Chunk {
                kind: 0xDEAD_BEEF,
                data: vec![9, 9, 9, 9],
            }],
        };
        let bytes = serialize(&glb);
        let reparsed = parse(&bytes).unwrap();
        assert_eq!(reparsed.extra.len(), 1);
        assert_eq!(reparsed.extra[0].kind, 0xDEAD_BEEF);
        assert_eq!(serialize(&reparsed), bytes);

        // Order-independent of bin presence
        glb.bin = None;
        let bytes = serialize(&glb);
        assert_eq!(parse(&bytes).unwrap().extra.len(), 1);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut bytes = minimal_glb(b"{}  ", None);
        bytes[0] = b'X';
        let err = parse(&bytes).unwrap_err();
        assert!(err.to_string().contains("magic"));
    }

    #[test]
    fn test_bad_version_rejected() {
        let mut bytes = minimal_glb(b"{}  ", None);
        bytes[4] = 1;
        let err = parse(&bytes).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn test_truncated_stream_rejected() {
        let bytes = minimal_glb(b"{}  ", None);
        // Cut the stream short of the declared total length
        let err = parse(&bytes[..bytes.len() - 2]).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader(_)));
    }

    #[test]
    fn test_oversized_chunk_rejected() {
        let mut bytes = minimal_glb(b"{}  ", None);
        // Inflate the JSON chunk's declared length past the stream end
        bytes[HEADER_LEN..HEADER_LEN + 4].copy_from_slice(&1000u32.to_le_bytes());
        // Keep the header total length consistent with the buffer
        let total = bytes.len() as u32;
        bytes[8..12].copy_from_slice(&total.to_le_bytes());
        let err = parse(&bytes).unwrap_err();
        assert!(matches!(err, Error::TruncatedChunk(_)));
    }

    #[test]
    fn test_missing_json_chunk_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&VERSION.to_le_bytes());
        bytes.extend_from_slice(&(HEADER_LEN as u32).to_le_bytes());
        let err = parse(&bytes).unwrap_err();
        assert!(err.to_string().contains("JSON descriptor"));
    }

    #[test]
    fn test_padding_helpers() {
        let mut json = b"{}".to_vec();
        pad_json_chunk(&mut json);
        assert_eq!(json, b"{}  ");

        let mut bin = vec![1u8, 2, 3];
        pad_bin_chunk(&mut bin);
        assert_eq!(bin, vec![1, 2, 3, 0]);

        let mut aligned = vec![0u8; 8];
        pad_bin_chunk(&mut aligned);
        assert_eq!(aligned.len(), 8);
    }
}
