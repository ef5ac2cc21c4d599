//! Vertex layout shared by the CPU-side geometry and the GL attribute setup.
//!
//! The buffer holds interleaved `[position.xyz, color.rgb]` records; the
//! attribute table below is the only description of that layout the GPU
//! ever sees.

use bytemuck::{Pod, Zeroable};

/// Number of `f32` components in one interleaved vertex.
pub const FLOATS_PER_VERTEX: usize = 6;

/// Size of one `f32` in bytes, as GL wants it.
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const F32_SIZE: i32 = std::mem::size_of::<f32>() as i32;

/// Byte distance between consecutive vertices: 6 floats, 24 bytes.
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const VERTEX_STRIDE: i32 = std::mem::size_of::<Vertex>() as i32;

/// A vertex of the triangle, ready for the GPU.
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    /// Position in normalized device coordinates.
    pub position: [f32; 3],
    /// Linear RGB color.
    pub color: [f32; 3],
}

impl Vertex {
    /// Build a vertex from a position and a color.
    pub const fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self { position, color }
    }
}

/// One float vertex attribute inside the interleaved buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader input location (`layout(location = N)`).
    pub location: u32,
    /// Number of `f32` components.
    pub components: i32,
    /// Byte offset of the first component within a vertex.
    pub offset: i32,
}

/// `a_position`, location 0: three floats at the start of the vertex.
pub const POSITION_ATTRIBUTE: VertexAttribute = VertexAttribute {
    location: 0,
    components: 3,
    offset: 0,
};

/// `a_color`, location 1: three floats after the position.
pub const COLOR_ATTRIBUTE: VertexAttribute = VertexAttribute {
    location: 1,
    components: 3,
    offset: 3 * F32_SIZE,
};

/// Every attribute declared for [`Vertex`], in location order.
pub const VERTEX_ATTRIBUTES: [VertexAttribute; 2] = [POSITION_ATTRIBUTE, COLOR_ATTRIBUTE];
