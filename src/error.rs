//! Error types for GLB editing
//!
//! This module provides comprehensive error handling for GLB container
//! operations. All errors include error codes for categorization and detailed
//! context to help with debugging.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: I/O and container framing errors
//! - **E2xxx**: JSON scene descriptor errors
//! - **E3xxx**: Geometry contract errors (accessor ranges, caller invariants)
//! - **E4xxx**: Edit operation errors
//!
//! ## Common Error Codes
//!
//! - `E1001`: I/O error reading or writing the container
//! - `E1002`: Malformed GLB header
//! - `E1003`: Truncated or oversized chunk
//! - `E2001`: JSON parsing or encoding error
//! - `E2002`: Structurally invalid scene descriptor
//! - `E3001`: Accessor byte range outside its buffer
//! - `E3002`: Caller-side contract violation
//! - `E3003`: Unsupported buffer or accessor layout
//! - `E4001`: Slice plane removed all geometry
//! - `E4002`: Invalid edit request

use std::io;
use thiserror::Error;

/// Result type for GLB operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when parsing or editing GLB containers
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred while reading or writing the container
    ///
    /// **Error Code**: E1001
    ///
    /// **Common Causes**:
    /// - File not found
    /// - Insufficient permissions
    /// - Disk read error
    #[error("[E1001] I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed GLB header
    ///
    /// **Error Code**: E1002
    ///
    /// **Common Causes**:
    /// - File is not a GLB container (wrong magic bytes)
    /// - Unsupported container version
    /// - Declared total length disagrees with the byte stream
    ///
    /// **Suggestions**:
    /// - Verify the file starts with the `glTF` magic and version 2
    /// - Try re-exporting the file from the upstream converter
    #[error("[E1002] Malformed GLB header: {0}")]
    MalformedHeader(String),

    /// Chunk length exceeds the available bytes
    ///
    /// **Error Code**: E1003
    ///
    /// **Common Causes**:
    /// - Truncated download or copy
    /// - Corrupted chunk table
    #[error("[E1003] Truncated chunk: {0}")]
    TruncatedChunk(String),

    /// JSON parsing or encoding error in the scene descriptor
    ///
    /// **Error Code**: E2001
    ///
    /// **Common Causes**:
    /// - Malformed JSON syntax in the descriptor chunk
    /// - Invalid UTF-8 in the descriptor chunk
    #[error("[E2001] JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Structurally invalid scene descriptor
    ///
    /// **Error Code**: E2002
    ///
    /// **Common Causes**:
    /// - Index references a node, mesh, accessor, or buffer that does not exist
    /// - Required descriptor section missing
    ///
    /// **Suggestions**:
    /// - Verify the file was produced by a conforming exporter
    #[error("[E2002] Invalid scene descriptor: {0}")]
    InvalidDescriptor(String),

    /// Accessor byte range falls outside its backing buffer
    ///
    /// **Error Code**: E3001
    ///
    /// Raised lazily the first time the offending accessor is read, so that
    /// documents with unused defects still parse.
    ///
    /// **Common Causes**:
    /// - Accessor count/offset/stride combination overruns the buffer
    /// - Buffer view points past the end of the binary chunk
    #[error(
        "[E3001] Accessor {accessor} range out of bounds: needs {needed} bytes, buffer has {available}"
    )]
    BadAccessorRange {
        /// Index of the offending accessor
        accessor: usize,
        /// Bytes the accessor's range requires
        needed: usize,
        /// Bytes actually available in the backing buffer
        available: usize,
    },

    /// Caller-side contract violation
    ///
    /// **Error Code**: E3002
    ///
    /// Indicates a bug in the calling code rather than bad user input, for
    /// example writing a position sequence whose length does not match the
    /// accessor's declared count.
    #[error("[E3002] Invariant violation: {0}")]
    InvariantViolation(String),

    /// Unsupported buffer or accessor layout
    ///
    /// **Error Code**: E3003
    ///
    /// **Common Causes**:
    /// - Buffer references an external file URI (the container must be
    ///   self-contained)
    /// - Position accessor is not 3x float32
    #[error("[E3003] Unsupported: {0}")]
    Unsupported(String),

    /// Slice plane removed all geometry
    ///
    /// **Error Code**: E4001
    ///
    /// Recoverable: valid input, but no triangles remain on the kept side of
    /// the plane. Reported as a named error so callers can tell it apart from
    /// success with a very small mesh.
    #[error("[E4001] Slice produced an empty result: no geometry remains on the kept side")]
    EmptySliceResult,

    /// Invalid edit request
    ///
    /// **Error Code**: E4002
    ///
    /// **Common Causes**:
    /// - Non-positive scale factor
    /// - Zero-length slice plane normal
    /// - Malformed hex color string
    #[error("[E4002] Invalid edit request: {0}")]
    InvalidRequest(String),
}

impl Error {
    /// Create a MalformedHeader error with field context
    ///
    /// # Arguments
    /// * `field` - The header field that failed (e.g., "magic", "version")
    /// * `message` - Description of the error
    pub fn malformed_header(field: &str, message: impl std::fmt::Display) -> Self {
        Error::MalformedHeader(format!("{}: {}", field, message))
    }

    /// Create an InvalidDescriptor error for an out-of-range index reference
    ///
    /// # Arguments
    /// * `kind` - What is being referenced (e.g., "bufferView", "material")
    /// * `index` - The referenced index
    /// * `len` - Number of entries actually present
    pub fn bad_index(kind: &str, index: usize, len: usize) -> Self {
        Error::InvalidDescriptor(format!(
            "{} index {} out of range ({} present)",
            kind, index, len
        ))
    }

    /// Create an InvalidRequest error with field context
    ///
    /// # Arguments
    /// * `field` - The request field that is invalid
    /// * `message` - Description of the problem
    pub fn invalid_request(field: &str, message: impl std::fmt::Display) -> Self {
        Error::InvalidRequest(format!("{}: {}", field, message))
    }
}
