//! Error types for GL resource setup and geometry validation.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::backend::ShaderStage;

/// A failed GPU operation.
///
/// Only setup-time operations report errors. Per-frame calls (clear, bind,
/// draw) are fire-and-forget, like the underlying GL API.
#[derive(Debug)]
pub enum GraphicsError {
    /// A GL object name could not be generated.
    AllocationFailed {
        /// The kind of object, e.g. `"vertex array"`.
        resource: &'static str,
        /// Driver message.
        reason: String,
    },
    /// `glGetError` reported an error after a bind/upload/layout sequence.
    BindFailed {
        /// The sequence that was checked.
        operation: &'static str,
        /// The raw GL error code.
        code: u32,
    },
    /// A shader stage failed to compile.
    CompileFailed {
        /// The failing stage.
        stage: ShaderStage,
        /// The shader info log.
        log: String,
    },
    /// The shader program failed to link.
    LinkFailed {
        /// The program info log.
        log: String,
    },
    /// The geometry handed to the mesh setup cannot be drawn.
    InvalidGeometry(GeometryError),
    /// A shader source file could not be read.
    ShaderIo {
        /// The file that was requested.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailed { resource, reason } => {
                write!(f, "failed to allocate {resource}: {reason}")
            }
            Self::BindFailed { operation, code } => {
                write!(f, "GL error 0x{code:04x} during {operation}")
            }
            Self::CompileFailed { stage, log } => {
                write!(f, "{stage} shader compile error: {log}")
            }
            Self::LinkFailed { log } => write!(f, "program link error: {log}"),
            Self::InvalidGeometry(_) => f.write_str("invalid geometry"),
            Self::ShaderIo { path, .. } => {
                write!(f, "failed to read shader source {}", path.display())
            }
        }
    }
}

impl std::error::Error for GraphicsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ShaderIo { source, .. } => Some(source),
            Self::InvalidGeometry(source) => Some(source),
            _ => None,
        }
    }
}

impl From<GeometryError> for GraphicsError {
    fn from(err: GeometryError) -> Self {
        Self::InvalidGeometry(err)
    }
}

/// Vertex or index data that does not describe drawable geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// No vertex data at all.
    NoVertices,
    /// The float count is not a whole number of vertices.
    PartialVertex {
        /// Number of floats supplied.
        floats: usize,
    },
    /// An index list was supplied but is empty.
    NoIndices,
    /// An index points past the last vertex.
    IndexOutOfRange {
        /// Position of the offending entry in the index list.
        position: usize,
        /// The offending index.
        index: u32,
        /// Number of vertices available.
        vertex_count: usize,
    },
    /// More vertices or indices than a single GL draw call can address.
    TooLarge {
        /// The requested draw count.
        count: usize,
    },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoVertices => f.write_str("geometry has no vertices"),
            Self::PartialVertex { floats } => write!(
                f,
                "{floats} floats is not a whole number of {}-float vertices",
                crate::types::FLOATS_PER_VERTEX
            ),
            Self::NoIndices => f.write_str("index list is empty"),
            Self::IndexOutOfRange {
                position,
                index,
                vertex_count,
            } => write!(
                f,
                "index {index} at position {position} is out of range for {vertex_count} vertices"
            ),
            Self::TooLarge { count } => write!(f, "{count} elements exceed the GL draw limit"),
        }
    }
}

impl std::error::Error for GeometryError {}
