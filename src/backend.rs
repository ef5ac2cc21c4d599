//! The GL surface area the renderer needs, as a trait.
//!
//! [`GlowBackend`] forwards to a real [`glow::Context`]. Everything above this
//! module is generic over [`GraphicsBackend`], so the setup and frame
//! sequences can be checked against a recording double without a GPU.

use std::fmt;
use std::sync::Arc;

use glow::HasContext;

use crate::error::GraphicsError;
use crate::types::VertexAttribute;

/// Buffer binding points used by this crate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// `GL_ARRAY_BUFFER`: vertex data.
    Array,
    /// `GL_ELEMENT_ARRAY_BUFFER`: index data, captured by the bound VAO.
    ElementArray,
}

impl BufferTarget {
    fn to_gl(self) -> u32 {
        match self {
            Self::Array => glow::ARRAY_BUFFER,
            Self::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
        }
    }
}

/// Programmable pipeline stages.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader.
    Vertex,
    /// Fragment shader.
    Fragment,
}

impl ShaderStage {
    fn to_gl(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        })
    }
}

/// How consecutive vertices are assembled.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Primitive {
    /// `GL_TRIANGLES`.
    #[default]
    Triangles,
    /// `GL_LINE_LOOP`: outline only.
    LineLoop,
}

impl Primitive {
    fn to_gl(self) -> u32 {
        match self {
            Self::Triangles => glow::TRIANGLES,
            Self::LineLoop => glow::LINE_LOOP,
        }
    }
}

/// The subset of OpenGL used by the mesh, shader and frame code.
///
/// Methods mirror their GL counterparts one-to-one. Object creation returns
/// [`GraphicsError::AllocationFailed`] instead of a zero name; everything
/// else is unchecked, and callers use [`check_error`](Self::check_error) at
/// the points where a failure should be surfaced.
pub trait GraphicsBackend {
    /// Vertex array object name.
    type VertexArray: Copy + fmt::Debug;
    /// Buffer object name.
    type Buffer: Copy + fmt::Debug;
    /// Shader object name.
    type Shader: Copy + fmt::Debug;
    /// Program object name.
    type Program: Copy + fmt::Debug;
    /// Uniform location inside a program.
    type UniformLocation: Clone + fmt::Debug;

    /// `glGenVertexArrays`.
    fn create_vertex_array(&self) -> Result<Self::VertexArray, GraphicsError>;
    /// `glGenBuffers`.
    fn create_buffer(&self) -> Result<Self::Buffer, GraphicsError>;
    /// `glBindVertexArray`; `None` unbinds.
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    /// `glBindBuffer`; `None` unbinds.
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>);
    /// `glBufferData` with `GL_STATIC_DRAW` into the buffer bound at `target`.
    fn buffer_data_static(&self, target: BufferTarget, data: &[u8]);
    /// `glVertexAttribPointer` for a non-normalized float attribute.
    fn vertex_attrib_pointer_f32(&self, attribute: VertexAttribute, stride: i32);
    /// `glEnableVertexAttribArray`.
    fn enable_vertex_attrib_array(&self, location: u32);
    /// `glDeleteVertexArrays`.
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);
    /// `glDeleteBuffers`.
    fn delete_buffer(&self, buffer: Self::Buffer);

    /// `glCreateShader`.
    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, GraphicsError>;
    /// `glShaderSource` followed by `glCompileShader`.
    fn compile_shader(&self, shader: Self::Shader, source: &str);
    /// `GL_COMPILE_STATUS`.
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    /// `glGetShaderInfoLog`.
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    /// `glDeleteShader`.
    fn delete_shader(&self, shader: Self::Shader);
    /// `glCreateProgram`.
    fn create_program(&self) -> Result<Self::Program, GraphicsError>;
    /// `glAttachShader`.
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    /// `glDetachShader`.
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    /// `glLinkProgram`.
    fn link_program(&self, program: Self::Program);
    /// `GL_LINK_STATUS`.
    fn program_link_status(&self, program: Self::Program) -> bool;
    /// `glGetProgramInfoLog`.
    fn program_info_log(&self, program: Self::Program) -> String;
    /// `glDeleteProgram`.
    fn delete_program(&self, program: Self::Program);
    /// `glUseProgram`; `None` unbinds.
    fn use_program(&self, program: Option<Self::Program>);
    /// `glGetUniformLocation`; `None` when the uniform is absent or unused.
    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;
    /// `glUniform1f` on the program currently in use.
    fn uniform_1_f32(&self, location: Option<&Self::UniformLocation>, value: f32);

    /// `glViewport`.
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    /// `glClearColor`.
    fn clear_color(&self, rgba: [f32; 4]);
    /// `glClear(GL_COLOR_BUFFER_BIT)`.
    fn clear_color_buffer(&self);
    /// `glDrawArrays`.
    fn draw_arrays(&self, primitive: Primitive, first: i32, count: i32);
    /// `glDrawElements` with `GL_UNSIGNED_INT` indices from the element
    /// buffer captured by the bound VAO, starting at byte `offset`.
    fn draw_elements_u32(&self, primitive: Primitive, count: i32, offset: i32);

    /// `glGetError`; `None` for `GL_NO_ERROR`.
    fn take_error(&self) -> Option<u32>;

    /// Drain every pending GL error flag and return how many were set.
    ///
    /// GL keeps one flag per error kind, so a single `glGetError` may leave
    /// others pending. The drain stops after [`MAX_ERROR_FLAGS`] reads.
    fn clear_errors(&self) -> usize {
        let mut cleared = 0;
        while cleared < MAX_ERROR_FLAGS {
            match self.take_error() {
                Some(code) => {
                    log::trace!("discarding GL error 0x{code:04x}");
                    cleared += 1;
                }
                None => break,
            }
        }
        cleared
    }

    /// Fail with [`GraphicsError::BindFailed`] if GL has a pending error.
    ///
    /// All pending flags are drained; the first one is reported.
    ///
    /// # Errors
    ///
    /// Returns the first pending GL error code tagged with `operation`.
    fn check_error(&self, operation: &'static str) -> Result<(), GraphicsError> {
        match self.take_error() {
            None => Ok(()),
            Some(code) => {
                self.clear_errors();
                Err(GraphicsError::BindFailed { operation, code })
            }
        }
    }
}

/// Upper bound on `glGetError` reads per drain. A lost context can keep
/// reporting errors.
pub const MAX_ERROR_FLAGS: usize = 16;

/// [`GraphicsBackend`] over a [`glow::Context`].
///
/// The context is shared via [`Arc`] so the window layer can keep its own
/// handle for diagnostics.
#[derive(Clone)]
pub struct GlowBackend {
    gl: Arc<glow::Context>,
}

impl GlowBackend {
    /// Wrap a loaded GL context.
    ///
    /// # Safety
    ///
    /// `gl` must have been loaded for a context that is current on this
    /// thread, and must stay current for as long as the backend (or anything
    /// created through it) is used. The safe trait methods rely on this.
    pub unsafe fn new(gl: Arc<glow::Context>) -> Self {
        Self { gl }
    }

    /// The wrapped context.
    pub fn context(&self) -> &glow::Context {
        &self.gl
    }
}

impl fmt::Debug for GlowBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlowBackend").finish_non_exhaustive()
    }
}

fn allocation(resource: &'static str) -> impl FnOnce(String) -> GraphicsError {
    move |reason| GraphicsError::AllocationFailed { resource, reason }
}

// SAFETY (applies to every `unsafe` block below): `GlowBackend::new` requires
// a current context for the backend's whole lifetime, and every object name
// passed in was produced by this same context.
impl GraphicsBackend for GlowBackend {
    type VertexArray = glow::VertexArray;
    type Buffer = glow::Buffer;
    type Shader = glow::Shader;
    type Program = glow::Program;
    type UniformLocation = glow::UniformLocation;

    fn create_vertex_array(&self) -> Result<Self::VertexArray, GraphicsError> {
        unsafe { self.gl.create_vertex_array() }.map_err(allocation("vertex array"))
    }

    fn create_buffer(&self) -> Result<Self::Buffer, GraphicsError> {
        unsafe { self.gl.create_buffer() }.map_err(allocation("buffer"))
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { self.gl.bind_vertex_array(vertex_array) };
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>) {
        unsafe { self.gl.bind_buffer(target.to_gl(), buffer) };
    }

    fn buffer_data_static(&self, target: BufferTarget, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(target.to_gl(), data, glow::STATIC_DRAW);
        }
    }

    fn vertex_attrib_pointer_f32(&self, attribute: VertexAttribute, stride: i32) {
        unsafe {
            self.gl.vertex_attrib_pointer_f32(
                attribute.location,
                attribute.components,
                glow::FLOAT,
                false,
                stride,
                attribute.offset,
            );
        }
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(location) };
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { self.gl.delete_vertex_array(vertex_array) };
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { self.gl.delete_buffer(buffer) };
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, GraphicsError> {
        unsafe { self.gl.create_shader(stage.to_gl()) }.map_err(allocation("shader"))
    }

    fn compile_shader(&self, shader: Self::Shader, source: &str) {
        unsafe {
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
        }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.delete_shader(shader) };
    }

    fn create_program(&self) -> Result<Self::Program, GraphicsError> {
        unsafe { self.gl.create_program() }.map_err(allocation("program"))
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.attach_shader(program, shader) };
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.detach_shader(program, shader) };
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { self.gl.link_program(program) };
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.gl.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.gl.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) };
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.gl.use_program(program) };
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn uniform_1_f32(&self, location: Option<&Self::UniformLocation>, value: f32) {
        unsafe { self.gl.uniform_1_f32(location, value) };
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) };
    }

    fn clear_color(&self, [r, g, b, a]: [f32; 4]) {
        unsafe { self.gl.clear_color(r, g, b, a) };
    }

    fn clear_color_buffer(&self) {
        unsafe { self.gl.clear(glow::COLOR_BUFFER_BIT) };
    }

    fn draw_arrays(&self, primitive: Primitive, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(primitive.to_gl(), first, count) };
    }

    fn draw_elements_u32(&self, primitive: Primitive, count: i32, offset: i32) {
        unsafe {
            self.gl
                .draw_elements(primitive.to_gl(), count, glow::UNSIGNED_INT, offset);
        }
    }

    fn take_error(&self) -> Option<u32> {
        match unsafe { self.gl.get_error() } {
            glow::NO_ERROR => None,
            code => Some(code),
        }
    }
}
