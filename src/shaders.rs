//! GLSL shader sources and program compilation.
//!
//! The shaders target GLSL 3.30 core, matching the 3.3 core context the
//! window layer requests.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::backend::{GraphicsBackend, ShaderStage};
use crate::error::GraphicsError;

/// Vertex shader: passes the vertex color through and shifts the position.
///
/// # Inputs
///
/// | Location | Name       | Type   |
/// |----------|------------|--------|
/// | `0`      | `position` | `vec3` |
/// | `1`      | `color`    | `vec3` |
///
/// # Uniforms
///
/// | Name     | Type    | Description                          |
/// |----------|---------|--------------------------------------|
/// | `Offset` | `float` | Added to the x coordinate (NDC)      |
pub const VERTEX_SRC: &str = include_str!("../shaders/shader.vert");

/// Fragment shader: writes the interpolated vertex color, fully opaque.
pub const FRAGMENT_SRC: &str = include_str!("../shaders/shader.frag");

/// Where shader source text comes from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ShaderSource {
    /// [`VERTEX_SRC`] and [`FRAGMENT_SRC`], compiled into the binary.
    #[default]
    Embedded,
    /// Read from disk at start-up.
    Files {
        /// Vertex shader path.
        vertex: PathBuf,
        /// Fragment shader path.
        fragment: PathBuf,
    },
}

impl ShaderSource {
    /// The shader files shipped in `shaders/`, relative to `root`.
    pub fn files_in(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::Files {
            vertex: root.join("shader.vert"),
            fragment: root.join("shader.frag"),
        }
    }
}

/// A linked shader program.
///
/// Like [`Mesh`](crate::mesh::Mesh), the program is released by consuming
/// [`destroy`](Self::destroy).
pub struct ShaderProgram<B: GraphicsBackend> {
    program: B::Program,
}

impl<B: GraphicsBackend> ShaderProgram<B> {
    /// Build a program from `source`.
    ///
    /// # Errors
    ///
    /// [`GraphicsError::ShaderIo`] if a file cannot be read, otherwise as
    /// [`from_sources`](Self::from_sources).
    pub fn load(gl: &B, source: &ShaderSource) -> Result<Self, GraphicsError> {
        match source {
            ShaderSource::Embedded => Self::from_sources(gl, VERTEX_SRC, FRAGMENT_SRC),
            ShaderSource::Files { vertex, fragment } => Self::from_files(gl, vertex, fragment),
        }
    }

    /// Read both stages from disk and build a program.
    ///
    /// # Errors
    ///
    /// [`GraphicsError::ShaderIo`] if a file cannot be read, otherwise as
    /// [`from_sources`](Self::from_sources).
    pub fn from_files(
        gl: &B,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, GraphicsError> {
        let vertex = read_source(vertex_path.as_ref())?;
        let fragment = read_source(fragment_path.as_ref())?;
        Self::from_sources(gl, &vertex, &fragment)
    }

    /// Compile both stages and link them.
    ///
    /// The compiled shader objects are detached and deleted after successful
    /// linking, so only the program needs to be cleaned up by the caller. On
    /// failure nothing is left allocated.
    ///
    /// # Errors
    ///
    /// - [`GraphicsError::AllocationFailed`] if a shader or program name
    ///   cannot be created.
    /// - [`GraphicsError::CompileFailed`] with the info log of the failing
    ///   stage.
    /// - [`GraphicsError::LinkFailed`] with the program info log.
    pub fn from_sources(
        gl: &B,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Self, GraphicsError> {
        let vs = compile_shader(gl, ShaderStage::Vertex, vertex_src)?;
        let fs = match compile_shader(gl, ShaderStage::Fragment, fragment_src) {
            Ok(fs) => fs,
            Err(err) => {
                gl.delete_shader(vs);
                return Err(err);
            }
        };

        let program = match gl.create_program() {
            Ok(program) => program,
            Err(err) => {
                gl.delete_shader(vs);
                gl.delete_shader(fs);
                return Err(err);
            }
        };

        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.link_program(program);

        if !gl.program_link_status(program) {
            let log = gl.program_info_log(program);
            gl.delete_program(program);
            gl.delete_shader(vs);
            gl.delete_shader(fs);
            log::error!("shader program failed to link: {log}");
            return Err(GraphicsError::LinkFailed { log });
        }

        gl.detach_shader(program, vs);
        gl.detach_shader(program, fs);
        gl.delete_shader(vs);
        gl.delete_shader(fs);

        log::debug!("linked shader program {program:?}");
        Ok(Self { program })
    }

    /// Make this the current program.
    pub fn use_program(&self, gl: &B) {
        gl.use_program(Some(self.program));
    }

    /// Look up a uniform by name; `None` if the linker dropped it.
    pub fn uniform_location(&self, gl: &B, name: &str) -> Option<B::UniformLocation> {
        gl.uniform_location(self.program, name)
    }

    /// The program name.
    pub fn program(&self) -> B::Program {
        self.program
    }

    /// Delete the program.
    pub fn destroy(self, gl: &B) {
        gl.delete_program(self.program);
    }
}

impl<B: GraphicsBackend> fmt::Debug for ShaderProgram<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("program", &self.program)
            .finish()
    }
}

fn read_source(path: &Path) -> Result<String, GraphicsError> {
    std::fs::read_to_string(path).map_err(|source| GraphicsError::ShaderIo {
        path: path.to_path_buf(),
        source,
    })
}

/// Compile a single shader stage from source.
fn compile_shader<B: GraphicsBackend>(
    gl: &B,
    stage: ShaderStage,
    source: &str,
) -> Result<B::Shader, GraphicsError> {
    let shader = gl.create_shader(stage)?;
    gl.compile_shader(shader, source);

    if !gl.shader_compile_status(shader) {
        let log = gl.shader_info_log(shader);
        gl.delete_shader(shader);
        log::error!("{stage} shader failed to compile: {log}");
        return Err(GraphicsError::CompileFailed { stage, log });
    }

    Ok(shader)
}
