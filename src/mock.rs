//! Recording [`GraphicsBackend`] for tests.
//!
//! Names are plain integers handed out from one counter. The double keeps
//! enough GL state (bindings, buffer contents, per-VAO attribute and element
//! buffer capture) to answer the questions the tests ask, and panics on
//! anything a real driver would treat as undefined: deleting a name twice,
//! drawing without a VAO, uploading with nothing bound.

use std::cell::{Ref, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::backend::{BufferTarget, GraphicsBackend, Primitive, ShaderStage};
use crate::error::GraphicsError;
use crate::types::VertexAttribute;

/// Object kinds tracked for create/delete balance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    VertexArray,
    Buffer,
    Shader,
    Program,
}

/// One recorded GL call.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateVertexArray(u32),
    CreateBuffer(u32),
    BindVertexArray(Option<u32>),
    BindBuffer(BufferTarget, Option<u32>),
    BufferData { buffer: u32, bytes: usize },
    VertexAttribPointer { location: u32, offset: i32, stride: i32 },
    EnableVertexAttribArray(u32),
    DeleteVertexArray(u32),
    DeleteBuffer(u32),
    CreateShader(ShaderStage, u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader(u32, u32),
    DetachShader(u32, u32),
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(Option<u32>),
    UniformLocation(String),
    Uniform1f { location: Option<u32>, value: f32 },
    Viewport(i32, i32, i32, i32),
    ClearColor([f32; 4]),
    Clear,
    DrawArrays { primitive: Primitive, first: i32, count: i32 },
    DrawElements { primitive: Primitive, count: i32, visited: Vec<u32> },
    /// Not GL: pushed by surface doubles so window calls interleave with GL.
    PollEvents,
    SwapBuffers,
}

/// Attribute pointer state as `glGetVertexAttrib*` would report it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AttributeState {
    pub components: i32,
    pub offset: i32,
    pub stride: i32,
    pub buffer: u32,
    pub enabled: bool,
}

#[derive(Default)]
struct VaoState {
    element_buffer: Option<u32>,
    attributes: HashMap<u32, AttributeState>,
}

#[derive(Default)]
struct State {
    next_name: u32,
    calls: Vec<Call>,
    created: HashMap<Kind, usize>,
    deleted: HashMap<Kind, usize>,
    live: HashMap<u32, Kind>,

    bound_vao: Option<u32>,
    bound_array_buffer: Option<u32>,
    unbound_element_buffer: Option<u32>,
    vaos: HashMap<u32, VaoState>,
    buffers: HashMap<u32, Vec<u8>>,

    shader_stage: HashMap<u32, ShaderStage>,
    shader_source: HashMap<u32, String>,
    attached: HashMap<u32, Vec<u32>>,
    linked: HashMap<u32, bool>,
    uniform_names: Vec<String>,

    fail_compile: Option<ShaderStage>,
    fail_link: bool,
    fail_allocation: Option<Kind>,
    pending_errors: VecDeque<u32>,
    error_on_upload: Option<u32>,
}

impl State {
    fn alloc(&mut self, kind: Kind) -> Result<u32, GraphicsError> {
        if self.fail_allocation == Some(kind) {
            return Err(GraphicsError::AllocationFailed {
                resource: "mock object",
                reason: "out of names".into(),
            });
        }
        self.next_name += 1;
        let name = self.next_name;
        *self.created.entry(kind).or_default() += 1;
        self.live.insert(name, kind);
        Ok(name)
    }

    fn release(&mut self, kind: Kind, name: u32) {
        match self.live.remove(&name) {
            Some(k) if k == kind => *self.deleted.entry(kind).or_default() += 1,
            other => panic!("deleting {kind:?} {name} which is {other:?}"),
        }
    }

    fn bound(&self, target: BufferTarget) -> Option<u32> {
        match target {
            BufferTarget::Array => self.bound_array_buffer,
            BufferTarget::ElementArray => match self.bound_vao {
                Some(vao) => self.vaos.get(&vao).and_then(|v| v.element_buffer),
                None => self.unbound_element_buffer,
            },
        }
    }
}

/// Cloning shares the recorded state, so a test can keep a handle while the
/// code under test owns another.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Rc<RefCell<State>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next compile of `stage` fail.
    pub fn fail_compile(&self, stage: ShaderStage) {
        self.state.borrow_mut().fail_compile = Some(stage);
    }

    pub fn fail_link(&self) {
        self.state.borrow_mut().fail_link = true;
    }

    pub fn fail_allocation(&self, kind: Kind) {
        self.state.borrow_mut().fail_allocation = Some(kind);
    }

    /// Queue a GL error code; `take_error` returns queued codes in order.
    pub fn raise_error(&self, code: u32) {
        self.state.borrow_mut().pending_errors.push_back(code);
    }

    /// Raise `code` on the next `buffer_data_static`.
    pub fn raise_error_on_upload(&self, code: u32) {
        self.state.borrow_mut().error_on_upload = Some(code);
    }

    pub fn pending_errors(&self) -> usize {
        self.state.borrow().pending_errors.len()
    }

    pub fn calls(&self) -> Ref<'_, Vec<Call>> {
        Ref::map(self.state.borrow(), |s| &s.calls)
    }

    /// Append a non-GL call to the log.
    pub fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn created(&self, kind: Kind) -> usize {
        self.state.borrow().created.get(&kind).copied().unwrap_or(0)
    }

    pub fn deleted(&self, kind: Kind) -> usize {
        self.state.borrow().deleted.get(&kind).copied().unwrap_or(0)
    }

    pub fn live_objects(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn bound_vertex_array(&self) -> Option<u32> {
        self.state.borrow().bound_vao
    }

    pub fn buffer_contents(&self, buffer: u32) -> Vec<u8> {
        self.state
            .borrow()
            .buffers
            .get(&buffer)
            .cloned()
            .unwrap_or_default()
    }

    pub fn element_buffer_of(&self, vao: u32) -> Option<u32> {
        self.state
            .borrow()
            .vaos
            .get(&vao)
            .and_then(|v| v.element_buffer)
    }

    pub fn attribute(&self, vao: u32, location: u32) -> Option<AttributeState> {
        self.state
            .borrow()
            .vaos
            .get(&vao)
            .and_then(|v| v.attributes.get(&location).copied())
    }

    /// Names of the uniforms `uniform_location` has been asked for.
    pub fn uniform_lookups(&self) -> Vec<String> {
        self.state.borrow().uniform_names.clone()
    }
}

impl GraphicsBackend for MockBackend {
    type VertexArray = u32;
    type Buffer = u32;
    type Shader = u32;
    type Program = u32;
    type UniformLocation = u32;

    fn create_vertex_array(&self) -> Result<u32, GraphicsError> {
        let mut s = self.state.borrow_mut();
        let name = s.alloc(Kind::VertexArray)?;
        s.vaos.insert(name, VaoState::default());
        s.calls.push(Call::CreateVertexArray(name));
        Ok(name)
    }

    fn create_buffer(&self) -> Result<u32, GraphicsError> {
        let mut s = self.state.borrow_mut();
        let name = s.alloc(Kind::Buffer)?;
        s.buffers.insert(name, Vec::new());
        s.calls.push(Call::CreateBuffer(name));
        Ok(name)
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        let mut s = self.state.borrow_mut();
        if let Some(vao) = vertex_array {
            assert_eq!(s.live.get(&vao), Some(&Kind::VertexArray), "binding dead VAO");
        }
        s.bound_vao = vertex_array;
        s.calls.push(Call::BindVertexArray(vertex_array));
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<u32>) {
        let mut s = self.state.borrow_mut();
        let bound_vao = s.bound_vao;
        match target {
            BufferTarget::Array => s.bound_array_buffer = buffer,
            BufferTarget::ElementArray => match bound_vao {
                Some(vao) => {
                    if let Some(v) = s.vaos.get_mut(&vao) {
                        v.element_buffer = buffer;
                    }
                }
                None => s.unbound_element_buffer = buffer,
            },
        }
        s.calls.push(Call::BindBuffer(target, buffer));
    }

    fn buffer_data_static(&self, target: BufferTarget, data: &[u8]) {
        let mut s = self.state.borrow_mut();
        let buffer = s
            .bound(target)
            .unwrap_or_else(|| panic!("glBufferData with no buffer bound at {target:?}"));
        s.buffers.insert(buffer, data.to_vec());
        if let Some(code) = s.error_on_upload.take() {
            s.pending_errors.push_back(code);
        }
        s.calls.push(Call::BufferData {
            buffer,
            bytes: data.len(),
        });
    }

    fn vertex_attrib_pointer_f32(&self, attribute: VertexAttribute, stride: i32) {
        let mut s = self.state.borrow_mut();
        let vao = s.bound_vao.expect("glVertexAttribPointer with no VAO bound");
        let buffer = s
            .bound_array_buffer
            .expect("glVertexAttribPointer with no array buffer bound");
        let entry = s
            .vaos
            .get_mut(&vao)
            .expect("bound VAO is tracked")
            .attributes
            .entry(attribute.location)
            .or_insert(AttributeState {
                components: 0,
                offset: 0,
                stride: 0,
                buffer,
                enabled: false,
            });
        entry.components = attribute.components;
        entry.offset = attribute.offset;
        entry.stride = stride;
        entry.buffer = buffer;
        s.calls.push(Call::VertexAttribPointer {
            location: attribute.location,
            offset: attribute.offset,
            stride,
        });
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        let mut s = self.state.borrow_mut();
        let vao = s.bound_vao.expect("glEnableVertexAttribArray with no VAO bound");
        if let Some(attr) = s
            .vaos
            .get_mut(&vao)
            .and_then(|v| v.attributes.get_mut(&location))
        {
            attr.enabled = true;
        }
        s.calls.push(Call::EnableVertexAttribArray(location));
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        let mut s = self.state.borrow_mut();
        s.release(Kind::VertexArray, vertex_array);
        s.vaos.remove(&vertex_array);
        if s.bound_vao == Some(vertex_array) {
            s.bound_vao = None;
        }
        s.calls.push(Call::DeleteVertexArray(vertex_array));
    }

    fn delete_buffer(&self, buffer: u32) {
        let mut s = self.state.borrow_mut();
        s.release(Kind::Buffer, buffer);
        s.buffers.remove(&buffer);
        s.calls.push(Call::DeleteBuffer(buffer));
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, GraphicsError> {
        let mut s = self.state.borrow_mut();
        let name = s.alloc(Kind::Shader)?;
        s.shader_stage.insert(name, stage);
        s.calls.push(Call::CreateShader(stage, name));
        Ok(name)
    }

    fn compile_shader(&self, shader: u32, source: &str) {
        let mut s = self.state.borrow_mut();
        s.shader_source.insert(shader, source.to_owned());
        s.calls.push(Call::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        let s = self.state.borrow();
        s.fail_compile.is_none() || s.fail_compile != s.shader_stage.get(&shader).copied()
    }

    fn shader_info_log(&self, shader: u32) -> String {
        if self.shader_compile_status(shader) {
            String::new()
        } else {
            "0:1: mock compile error".into()
        }
    }

    fn delete_shader(&self, shader: u32) {
        let mut s = self.state.borrow_mut();
        s.release(Kind::Shader, shader);
        s.calls.push(Call::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<u32, GraphicsError> {
        let mut s = self.state.borrow_mut();
        let name = s.alloc(Kind::Program)?;
        s.calls.push(Call::CreateProgram(name));
        Ok(name)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut s = self.state.borrow_mut();
        s.attached.entry(program).or_default().push(shader);
        s.calls.push(Call::AttachShader(program, shader));
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        let mut s = self.state.borrow_mut();
        if let Some(list) = s.attached.get_mut(&program) {
            list.retain(|&sh| sh != shader);
        }
        s.calls.push(Call::DetachShader(program, shader));
    }

    fn link_program(&self, program: u32) {
        let mut s = self.state.borrow_mut();
        let ok = !s.fail_link;
        s.linked.insert(program, ok);
        s.calls.push(Call::LinkProgram(program));
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state
            .borrow()
            .linked
            .get(&program)
            .copied()
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: u32) -> String {
        if self.program_link_status(program) {
            String::new()
        } else {
            "mock link error".into()
        }
    }

    fn delete_program(&self, program: u32) {
        let mut s = self.state.borrow_mut();
        s.release(Kind::Program, program);
        s.calls.push(Call::DeleteProgram(program));
    }

    fn use_program(&self, program: Option<u32>) {
        self.state.borrow_mut().calls.push(Call::UseProgram(program));
    }

    /// A uniform is found when any shader that went into `program` mentions
    /// its name. Locations are 1-based positions in the lookup history.
    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        let mut s = self.state.borrow_mut();
        s.calls.push(Call::UniformLocation(name.to_owned()));
        s.uniform_names.push(name.to_owned());
        let mentioned = s
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::AttachShader(p, sh) if *p == program => s.shader_source.get(sh),
                _ => None,
            })
            .any(|src| src.contains(name));
        mentioned.then(|| u32::try_from(s.uniform_names.len()).unwrap_or(u32::MAX))
    }

    fn uniform_1_f32(&self, location: Option<&u32>, value: f32) {
        self.state.borrow_mut().calls.push(Call::Uniform1f {
            location: location.copied(),
            value,
        });
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.state
            .borrow_mut()
            .calls
            .push(Call::Viewport(x, y, width, height));
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        self.state.borrow_mut().calls.push(Call::ClearColor(rgba));
    }

    fn clear_color_buffer(&self) {
        self.state.borrow_mut().calls.push(Call::Clear);
    }

    fn draw_arrays(&self, primitive: Primitive, first: i32, count: i32) {
        let mut s = self.state.borrow_mut();
        assert!(s.bound_vao.is_some(), "glDrawArrays with no VAO bound");
        s.calls.push(Call::DrawArrays {
            primitive,
            first,
            count,
        });
    }

    fn draw_elements_u32(&self, primitive: Primitive, count: i32, offset: i32) {
        let mut s = self.state.borrow_mut();
        let buffer = s
            .bound(BufferTarget::ElementArray)
            .expect("glDrawElements with no element buffer captured by the VAO");
        let bytes = &s.buffers[&buffer];
        let start = usize::try_from(offset).expect("non-negative offset") / 4;
        let count_usize = usize::try_from(count).expect("non-negative count");
        let visited: Vec<u32> = bytes
            .chunks_exact(4)
            .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .skip(start)
            .take(count_usize)
            .collect();
        assert_eq!(visited.len(), count_usize, "index read past buffer end");
        s.calls.push(Call::DrawElements {
            primitive,
            count,
            visited,
        });
    }

    fn take_error(&self) -> Option<u32> {
        self.state.borrow_mut().pending_errors.pop_front()
    }
}
