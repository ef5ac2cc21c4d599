//! The renderer: owns the shader program and the mesh, and issues the
//! per-frame command sequence.

use std::fmt;

use crate::backend::GraphicsBackend;
use crate::config::{AppConfig, FrameConfig};
use crate::error::GraphicsError;
use crate::mesh::Mesh;
use crate::shaders::ShaderProgram;

/// Convert a `u32` pixel size to the `i32` GL expects, saturating.
fn gl_size(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Draws one triangle mesh with one shader program.
///
/// # Example
///
/// ```no_run
/// # use gl_triangle::{backend::GlowBackend, config::AppConfig, render::Renderer};
/// # use std::sync::Arc;
/// # fn example(gl: Arc<glow::Context>) -> Result<(), gl_triangle::error::GraphicsError> {
/// // With a current GL context:
/// let backend = unsafe { GlowBackend::new(gl) };
/// let renderer = Renderer::new(backend, &AppConfig::default())?;
///
/// // Each frame, before swapping buffers:
/// renderer.render_frame();
///
/// // Once, before the context goes away:
/// renderer.destroy();
/// # Ok(())
/// # }
/// ```
pub struct Renderer<B: GraphicsBackend> {
    gl: B,
    program: ShaderProgram<B>,
    /// Location of the offset uniform, looked up once after linking.
    offset_location: Option<B::UniformLocation>,
    mesh: Mesh<B>,
    frame: FrameConfig,
}

impl<B: GraphicsBackend> Renderer<B> {
    /// Build the shader program and upload the geometry.
    ///
    /// # Errors
    ///
    /// Any shader or mesh setup error. Objects created before the failure
    /// are released.
    pub fn new(gl: B, config: &AppConfig) -> Result<Self, GraphicsError> {
        let program = ShaderProgram::load(&gl, &config.shaders)?;

        let offset_location = program.uniform_location(&gl, &config.frame.offset_uniform);
        if offset_location.is_none() {
            log::warn!(
                "uniform {:?} not found in shader program; offset will have no effect",
                config.frame.offset_uniform
            );
        }

        let mesh = match Mesh::upload(&gl, &config.geometry) {
            Ok(mesh) => mesh,
            Err(err) => {
                program.destroy(&gl);
                return Err(err);
            }
        };

        Ok(Self {
            gl,
            program,
            offset_location,
            mesh,
            frame: config.frame.clone(),
        })
    }

    /// Set the viewport to cover a `width` x `height` framebuffer.
    pub fn resize(&self, width: u32, height: u32) {
        self.gl.viewport(0, 0, gl_size(width), gl_size(height));
    }

    /// Record one frame into the current framebuffer.
    ///
    /// Order: clear, select program, upload offset, bind VAO, draw, unbind.
    /// The program is made current before the uniform upload because
    /// `glUniform*` writes to the program in use.
    pub fn render_frame(&self) {
        let gl = &self.gl;

        gl.clear_color(self.frame.clear_color);
        gl.clear_color_buffer();

        self.program.use_program(gl);
        gl.uniform_1_f32(self.offset_location.as_ref(), self.frame.offset);

        self.mesh.bind(gl);
        self.mesh.draw(gl, self.frame.primitive);
        gl.bind_vertex_array(None);
    }

    /// The backend this renderer draws with.
    pub fn backend(&self) -> &B {
        &self.gl
    }

    /// The uploaded mesh.
    pub fn mesh(&self) -> &Mesh<B> {
        &self.mesh
    }

    /// Release the mesh and the program.
    pub fn destroy(self) {
        let Self {
            gl, program, mesh, ..
        } = self;
        mesh.destroy(&gl);
        program.destroy(&gl);
        log::debug!("renderer resources released");
    }
}

impl<B: GraphicsBackend> fmt::Debug for Renderer<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("program", &self.program)
            .field("offset_location", &self.offset_location)
            .field("mesh", &self.mesh)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}
