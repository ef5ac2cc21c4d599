//! GPU-resident geometry: one VAO, one vertex buffer, and an optional
//! element buffer.
//!
//! [`Mesh::upload`] records the attribute layout from
//! [`VERTEX_ATTRIBUTES`](crate::types::VERTEX_ATTRIBUTES) into the VAO, and,
//! for indexed geometry, binds the element buffer while the VAO is bound so
//! the VAO captures it. Drawing only needs the VAO rebound afterwards.

use std::fmt;

use crate::backend::{BufferTarget, GraphicsBackend, Primitive};
use crate::error::{GeometryError, GraphicsError};
use crate::geometry::Geometry;
use crate::types::{VERTEX_ATTRIBUTES, VERTEX_STRIDE};

/// Uploaded geometry.
///
/// Owns its GL names. [`destroy`](Self::destroy) consumes the mesh, so a
/// name cannot be deleted twice or used after deletion.
pub struct Mesh<B: GraphicsBackend> {
    vao: B::VertexArray,
    vbo: B::Buffer,
    ebo: Option<B::Buffer>,
    count: i32,
}

impl<B: GraphicsBackend> Mesh<B> {
    /// Validate `geometry` and upload it.
    ///
    /// Leaves no VAO bound on return. On failure, every object created so far
    /// is deleted again.
    ///
    /// # Errors
    ///
    /// - [`GraphicsError::InvalidGeometry`] if validation fails (nothing is
    ///   allocated in that case).
    /// - [`GraphicsError::AllocationFailed`] if a GL name cannot be created.
    /// - [`GraphicsError::BindFailed`] if GL reports an error raised during
    ///   the upload and attribute setup. Errors pending on entry are
    ///   discarded.
    pub fn upload(gl: &B, geometry: &Geometry) -> Result<Self, GraphicsError> {
        geometry.validate()?;
        let count = geometry.draw_count();
        let count = i32::try_from(count).map_err(|_| GeometryError::TooLarge { count })?;

        // Errors left by earlier calls must not be blamed on this upload.
        let stale = gl.clear_errors();
        if stale > 0 {
            log::debug!("cleared {stale} GL error(s) pending before mesh upload");
        }

        let vao = gl.create_vertex_array()?;
        let vbo = match gl.create_buffer() {
            Ok(vbo) => vbo,
            Err(err) => {
                gl.delete_vertex_array(vao);
                return Err(err);
            }
        };
        let ebo = match geometry.index_bytes().map(|_| gl.create_buffer()).transpose() {
            Ok(ebo) => ebo,
            Err(err) => {
                gl.delete_buffer(vbo);
                gl.delete_vertex_array(vao);
                return Err(err);
            }
        };

        let mesh = Self {
            vao,
            vbo,
            ebo,
            count,
        };

        gl.bind_vertex_array(Some(vao));

        gl.bind_buffer(BufferTarget::Array, Some(vbo));
        gl.buffer_data_static(BufferTarget::Array, geometry.vertex_bytes());

        if let (Some(ebo), Some(bytes)) = (ebo, geometry.index_bytes()) {
            gl.bind_buffer(BufferTarget::ElementArray, Some(ebo));
            gl.buffer_data_static(BufferTarget::ElementArray, bytes);
        }

        for attribute in VERTEX_ATTRIBUTES {
            gl.vertex_attrib_pointer_f32(attribute, VERTEX_STRIDE);
        }
        for attribute in VERTEX_ATTRIBUTES {
            gl.enable_vertex_attrib_array(attribute.location);
        }

        gl.bind_vertex_array(None);

        if let Err(err) = gl.check_error("vertex array setup") {
            mesh.destroy(gl);
            return Err(err);
        }

        log::debug!(
            "uploaded mesh: {} vertices, {} indices",
            geometry.vertex_count(),
            geometry.indices.as_ref().map_or(0, Vec::len),
        );

        Ok(mesh)
    }

    /// Bind the VAO, and with it the vertex layout and element buffer.
    pub fn bind(&self, gl: &B) {
        gl.bind_vertex_array(Some(self.vao));
    }

    /// Issue the draw call. The mesh must be bound.
    pub fn draw(&self, gl: &B, primitive: Primitive) {
        if self.ebo.is_some() {
            gl.draw_elements_u32(primitive, self.count, 0);
        } else {
            gl.draw_arrays(primitive, 0, self.count);
        }
    }

    /// Vertices (or indices) processed per draw.
    pub fn draw_count(&self) -> i32 {
        self.count
    }

    /// Whether draws go through the element buffer.
    pub fn is_indexed(&self) -> bool {
        self.ebo.is_some()
    }

    /// The VAO name.
    pub fn vertex_array(&self) -> B::VertexArray {
        self.vao
    }

    /// Delete the buffers and the VAO.
    pub fn destroy(self, gl: &B) {
        gl.delete_buffer(self.vbo);
        if let Some(ebo) = self.ebo {
            gl.delete_buffer(ebo);
        }
        gl.delete_vertex_array(self.vao);
    }
}

impl<B: GraphicsBackend> fmt::Debug for Mesh<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mesh")
            .field("vao", &self.vao)
            .field("vbo", &self.vbo)
            .field("ebo", &self.ebo)
            .field("count", &self.count)
            .finish()
    }
}
