//! In-memory GLB document
//!
//! A [`Document`] owns the typed scene descriptor plus the binary buffers it
//! indexes into. Parsing keeps the raw descriptor chunk bytes around so that
//! an unmodified document serializes byte-identically; the typed re-encode
//! path only runs once something has logically changed.
//!
//! Buffers are owned exclusively by the document. Accessors and buffer views
//! are non-owning index references resolved on demand, and their byte ranges
//! are validated lazily the first time each accessor is read.

pub mod core;
pub mod material;

pub use self::core::{
    ATTR_POSITION, Accessor, Buffer, BufferView, COMPONENT_F32, COMPONENT_U8, COMPONENT_U16,
    COMPONENT_U32, Mesh, Node, Primitive, Root, TYPE_SCALAR, TYPE_VEC3,
};
pub use self::material::{AlphaMode, Material, PbrMetallicRoughness};

use crate::error::{Error, Result};
use crate::glb::{self, Chunk, RawGlb};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::debug;

/// A parsed GLB container: typed descriptor plus owned binary storage
#[derive(Debug, Clone)]
pub struct Document {
    root: Root,
    /// Descriptor chunk payload exactly as read; re-emitted while clean
    raw_json: Vec<u8>,
    json_dirty: bool,
    /// BIN chunk payload; mutated in place by geometry writes
    bin: Option<Vec<u8>>,
    /// Decoded `data:` URI buffers, index-aligned with `root.buffers`
    inline: Vec<Option<Vec<u8>>>,
    inline_dirty: Vec<bool>,
    /// Unknown trailing chunks, preserved verbatim
    extra_chunks: Vec<Chunk>,
}

impl Document {
    /// Parse a GLB container from bytes
    ///
    /// Structural framing (header, chunk table) and descriptor JSON are
    /// validated here; accessor byte ranges are validated lazily on first
    /// read so that documents with unused defects still load.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedHeader`], [`Error::TruncatedChunk`] for framing
    /// problems, [`Error::Json`] for a bad descriptor chunk,
    /// [`Error::Unsupported`] for external-file buffer URIs.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw = glb::parse(bytes)?;

        // Producers pad the JSON chunk with spaces; tolerate NUL padding from
        // non-conforming writers as well.
        let trimmed = trim_chunk_padding(&raw.json);
        let root: Root = serde_json::from_slice(trimmed)?;

        let mut inline = Vec::with_capacity(root.buffers.len());
        for (index, buffer) in root.buffers.iter().enumerate() {
            match &buffer.uri {
                None => inline.push(None),
                Some(uri) if uri.starts_with("data:") => {
                    let payload = uri.split_once(',').map(|(_, data)| data).ok_or_else(|| {
                        Error::InvalidDescriptor(format!(
                            "buffer {} data URI has no payload separator",
                            index
                        ))
                    })?;
                    let decoded = BASE64.decode(payload).map_err(|e| {
                        Error::InvalidDescriptor(format!(
                            "buffer {} data URI is not valid base64: {}",
                            index, e
                        ))
                    })?;
                    inline.push(Some(decoded));
                }
                Some(uri) => {
                    return Err(Error::Unsupported(format!(
                        "buffer {} references external URI '{}'; the container must be self-contained",
                        index, uri
                    )));
                }
            }
        }

        let inline_dirty = vec![false; inline.len()];

        debug!(
            nodes = root.nodes.len(),
            meshes = root.meshes.len(),
            materials = root.materials.len(),
            buffers = root.buffers.len(),
            "parsed GLB document"
        );

        Ok(Self {
            root,
            raw_json: raw.json,
            json_dirty: false,
            bin: raw.bin,
            inline,
            inline_dirty,
            extra_chunks: raw.extra,
        })
    }

    /// Build a fresh document from a descriptor and a BIN payload
    ///
    /// Used when an edit rebuilds the container from scratch (plane slicing).
    /// The descriptor is considered dirty, so serialization always re-encodes.
    pub fn from_parts(root: Root, bin: Vec<u8>) -> Self {
        let buffer_count = root.buffers.len();
        Self {
            root,
            raw_json: Vec::new(),
            json_dirty: true,
            bin: Some(bin),
            inline: vec![None; buffer_count],
            inline_dirty: vec![false; buffer_count],
            extra_chunks: Vec::new(),
        }
    }

    /// Serialize the document back into GLB bytes
    ///
    /// With no logical mutation this reproduces the input byte-for-byte.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let rebuild = self.json_dirty || self.inline_dirty.iter().any(|d| *d);

        let json = if rebuild {
            let mut root = self.root.clone();
            for (index, dirty) in self.inline_dirty.iter().enumerate() {
                if !dirty {
                    continue;
                }
                let data = self.inline[index].as_deref().ok_or_else(|| {
                    Error::InvariantViolation(format!(
                        "buffer {} marked dirty without decoded data",
                        index
                    ))
                })?;
                root.buffers[index].uri = Some(format!(
                    "data:application/octet-stream;base64,{}",
                    BASE64.encode(data)
                ));
                root.buffers[index].byte_length = data.len();
            }
            let mut payload = serde_json::to_vec(&root)?;
            glb::pad_json_chunk(&mut payload);
            payload
        } else {
            self.raw_json.clone()
        };

        Ok(glb::serialize(&RawGlb {
            json,
            bin: self.bin.clone(),
            extra: self.extra_chunks.clone(),
        }))
    }

    /// Read access to the scene descriptor
    pub fn root(&self) -> &Root {
        &self.root
    }

    /// Mutable access to the scene descriptor
    ///
    /// Marks the descriptor dirty: the next serialization re-encodes the
    /// typed structure instead of re-emitting the raw chunk.
    pub fn root_mut(&mut self) -> &mut Root {
        self.json_dirty = true;
        &mut self.root
    }

    /// Resolve a buffer index to its backing bytes
    pub fn buffer_data(&self, index: usize) -> Result<&[u8]> {
        let buffer = self
            .root
            .buffers
            .get(index)
            .ok_or_else(|| Error::bad_index("buffer", index, self.root.buffers.len()))?;
        if buffer.uri.is_some() {
            self.inline[index].as_deref().ok_or_else(|| {
                Error::InvalidDescriptor(format!("buffer {} has no decoded data", index))
            })
        } else {
            self.bin.as_deref().ok_or_else(|| {
                Error::InvalidDescriptor(format!(
                    "buffer {} expects a BIN chunk, but the container has none",
                    index
                ))
            })
        }
    }

    /// Resolve a buffer index to mutable backing bytes
    ///
    /// Callers must not care whether the buffer lives in the BIN chunk or an
    /// embedded data URI; a mutated data-URI buffer is re-encoded on the next
    /// serialization.
    pub fn buffer_data_mut(&mut self, index: usize) -> Result<&mut [u8]> {
        let buffer = self
            .root
            .buffers
            .get(index)
            .ok_or_else(|| Error::bad_index("buffer", index, self.root.buffers.len()))?;
        if buffer.uri.is_some() {
            self.inline_dirty[index] = true;
            self.inline[index].as_deref_mut().ok_or_else(|| {
                Error::InvalidDescriptor(format!("buffer {} has no decoded data", index))
            })
        } else {
            self.bin.as_deref_mut().ok_or_else(|| {
                Error::InvalidDescriptor(format!(
                    "buffer {} expects a BIN chunk, but the container has none",
                    index
                ))
            })
        }
    }

    /// Parse a GLB container from a reader
    pub fn from_reader<R: std::io::Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    /// Parse a GLB container from a file on disk
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Self::from_bytes(&std::fs::read(path)?)
    }

    /// Serialize the document to a writer
    pub fn to_writer<W: std::io::Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.to_bytes()?)?;
        Ok(())
    }

    /// Serialize the document to a file on disk
    pub fn write_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Total vertex count across all primitives with a POSITION attribute
    pub fn vertex_count(&self) -> usize {
        self.root
            .primitives()
            .filter_map(|(_, p)| p.position_accessor())
            .filter_map(|a| self.root.accessors.get(a))
            .map(|a| a.count)
            .sum()
    }

    /// Total triangle count across all primitives with a POSITION attribute
    ///
    /// Indexed primitives contribute `indices.count / 3`; non-indexed ones
    /// contribute `position.count / 3`.
    pub fn face_count(&self) -> usize {
        self.root
            .primitives()
            .filter(|(_, p)| p.position_accessor().is_some())
            .map(|(_, p)| {
                let count = p
                    .indices
                    .and_then(|i| self.root.accessors.get(i))
                    .map(|a| a.count)
                    .or_else(|| {
                        p.position_accessor()
                            .and_then(|i| self.root.accessors.get(i))
                            .map(|a| a.count)
                    })
                    .unwrap_or(0);
                count / 3
            })
            .sum()
    }
}

fn trim_chunk_padding(data: &[u8]) -> &[u8] {
    let mut end = data.len();
    while end > 0 && (data[end - 1] == 0 || data[end - 1].is_ascii_whitespace()) {
        end -= 1;
    }
    &data[..end]
}
