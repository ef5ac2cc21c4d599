//! CPU-side description of what gets uploaded.

use crate::error::GeometryError;
use crate::types::{Vertex, FLOATS_PER_VERTEX};

/// Interleaved `[x, y, z, r, g, b]` vertex data plus an optional index list.
///
/// With `indices == None` the vertices are drawn in order with
/// `glDrawArrays`; otherwise the indices select vertices for
/// `glDrawElements`.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    /// Flat float list, six floats per vertex.
    pub vertices: Vec<f32>,
    /// Optional index list into `vertices`.
    pub indices: Option<Vec<u32>>,
}

/// The default triangle: red bottom right, green bottom left, blue top.
pub const TRIANGLE: [Vertex; 3] = [
    Vertex::new([0.5, -0.5, 0.0], [1.0, 0.0, 0.0]),
    Vertex::new([-0.5, -0.5, 0.0], [0.0, 1.0, 0.0]),
    Vertex::new([0.0, 0.5, 0.0], [0.0, 0.0, 1.0]),
];

/// Index order used by the indexed variant.
pub const TRIANGLE_INDICES: [u32; 3] = [0, 2, 1];

impl Geometry {
    /// Non-indexed geometry from vertex records.
    pub fn from_vertices(vertices: &[Vertex]) -> Self {
        Self {
            vertices: bytemuck::cast_slice(vertices).to_vec(),
            indices: None,
        }
    }

    /// The built-in triangle, drawn with `glDrawArrays`.
    pub fn triangle() -> Self {
        Self::from_vertices(&TRIANGLE)
    }

    /// The built-in triangle, drawn through an element buffer.
    pub fn indexed_triangle() -> Self {
        Self::triangle().with_indices(TRIANGLE_INDICES.to_vec())
    }

    /// Attach an index list.
    #[must_use]
    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Number of whole vertices in `vertices`.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / FLOATS_PER_VERTEX
    }

    /// How many vertices one draw call processes: the index count when
    /// indexed, the vertex count otherwise.
    pub fn draw_count(&self) -> usize {
        self.indices
            .as_ref()
            .map_or_else(|| self.vertex_count(), Vec::len)
    }

    /// Whether this geometry is drawn through an element buffer.
    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    /// Check that the data can be uploaded and drawn as declared.
    ///
    /// # Errors
    ///
    /// - [`GeometryError::NoVertices`] for an empty vertex list.
    /// - [`GeometryError::PartialVertex`] when the float count is not a
    ///   multiple of six.
    /// - [`GeometryError::NoIndices`] for `Some(vec![])`.
    /// - [`GeometryError::IndexOutOfRange`] for any index `>= vertex_count`.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.vertices.is_empty() {
            return Err(GeometryError::NoVertices);
        }
        if self.vertices.len() % FLOATS_PER_VERTEX != 0 {
            return Err(GeometryError::PartialVertex {
                floats: self.vertices.len(),
            });
        }

        let Some(indices) = &self.indices else {
            return Ok(());
        };
        if indices.is_empty() {
            return Err(GeometryError::NoIndices);
        }

        let vertex_count = self.vertex_count();
        match indices
            .iter()
            .enumerate()
            .find(|&(_, &i)| usize::try_from(i).map_or(true, |i| i >= vertex_count))
        {
            Some((position, &index)) => Err(GeometryError::IndexOutOfRange {
                position,
                index,
                vertex_count,
            }),
            None => Ok(()),
        }
    }

    /// Raw vertex bytes, exactly as the attribute layout describes them.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes, if indexed.
    pub fn index_bytes(&self) -> Option<&[u8]> {
        self.indices.as_deref().map(bytemuck::cast_slice)
    }
}
