//! In-memory graphics device for tests and headless runs
//!
//! Records every call it receives and tracks outstanding allocations so
//! tests can assert resource round-trips (load then unload leaves nothing
//! behind) and inspect the exact draw sequence a frame produced.

use std::collections::{HashMap, HashSet};

use super::{
    AttributeLocation, BufferHandle, GpuError, GpuResult, GraphicsDevice, ProgramHandle,
    UniformLocation,
};
use crate::foundation::math::{Matrix4x4, Vector3};

/// One recorded device call
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    /// Program created under the given name
    CreateProgram(String),
    /// Program destroyed
    DestroyProgram(ProgramHandle),
    /// Program bound
    UseProgram(ProgramHandle),
    /// Buffer created with the given float count
    CreateVertexBuffer(usize),
    /// Index buffer created with the given index count
    CreateIndexBuffer(usize),
    /// Buffer destroyed
    DestroyBuffer(BufferHandle),
    /// Attribute bound
    BindAttribute {
        /// Buffer bound to the attribute
        buffer: BufferHandle,
        /// Attribute location
        location: AttributeLocation,
        /// Components per vertex
        components: u32,
    },
    /// Matrix uniform uploaded
    SetUniformMatrix(UniformLocation, Matrix4x4),
    /// Vec3 uniform uploaded
    SetUniformVec3(UniformLocation, Vector3),
    /// Scalar uniform uploaded
    SetUniformF32(UniformLocation, f32),
    /// Indexed draw issued
    DrawIndexed {
        /// Bound index buffer
        indices: BufferHandle,
        /// Index count
        count: u32,
    },
    /// Non-indexed draw issued
    DrawArrays {
        /// First vertex
        first: u32,
        /// Vertex count
        count: u32,
    },
    /// Viewport set
    SetViewport(i32, i32, u32, u32),
    /// Targets cleared
    Clear([f32; 4]),
}

/// Recording in-memory [`GraphicsDevice`]
///
/// Attribute names beginning with `a_` and uniform names beginning with `u_`
/// resolve to deterministic locations; anything else is treated as
/// undeclared, which lets tests exercise the optional-uniform paths.
#[derive(Default)]
pub struct RecordingDevice {
    calls: Vec<DeviceCall>,
    next_handle: u64,
    live_buffers: HashSet<BufferHandle>,
    live_programs: HashSet<ProgramHandle>,
    /// Uniform names each program should pretend not to declare
    hidden_uniforms: HashMap<ProgramHandle, HashSet<String>>,
    fail_next_compile: Option<String>,
}

impl RecordingDevice {
    /// Create an empty recording device
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls recorded so far, in order
    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    /// Clear the recorded call log, keeping live allocations
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of buffers created and not yet destroyed
    pub fn outstanding_buffers(&self) -> usize {
        self.live_buffers.len()
    }

    /// Number of programs created and not yet destroyed
    pub fn outstanding_programs(&self) -> usize {
        self.live_programs.len()
    }

    /// Make the next `create_program` call fail with the given reason
    pub fn fail_next_compile(&mut self, reason: &str) {
        self.fail_next_compile = Some(reason.to_string());
    }

    /// Hide a uniform name from reflection on the given program
    pub fn hide_uniform(&mut self, program: ProgramHandle, name: &str) {
        self.hidden_uniforms
            .entry(program)
            .or_default()
            .insert(name.to_string());
    }

    fn next(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn name_slot(name: &str) -> u32 {
        // Stable per-name location, good enough for call matching in tests
        name.bytes().fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b))) % 1024
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_program(
        &mut self,
        name: &str,
        _vertex_src: &str,
        _fragment_src: &str,
    ) -> GpuResult<ProgramHandle> {
        if let Some(reason) = self.fail_next_compile.take() {
            return Err(GpuError::ShaderCompile {
                name: name.to_string(),
                reason,
            });
        }
        let handle = ProgramHandle(self.next());
        self.live_programs.insert(handle);
        self.calls.push(DeviceCall::CreateProgram(name.to_string()));
        Ok(handle)
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        self.live_programs.remove(&program);
        self.calls.push(DeviceCall::DestroyProgram(program));
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.calls.push(DeviceCall::UseProgram(program));
    }

    fn attribute_location(&self, _program: ProgramHandle, name: &str) -> Option<AttributeLocation> {
        name.starts_with("a_").then(|| AttributeLocation(Self::name_slot(name)))
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        if let Some(hidden) = self.hidden_uniforms.get(&program) {
            if hidden.contains(name) {
                return None;
            }
        }
        name.starts_with("u_").then(|| UniformLocation(Self::name_slot(name)))
    }

    fn create_vertex_buffer(&mut self, data: &[f32]) -> GpuResult<BufferHandle> {
        let handle = BufferHandle(self.next());
        self.live_buffers.insert(handle);
        self.calls.push(DeviceCall::CreateVertexBuffer(data.len()));
        Ok(handle)
    }

    fn create_index_buffer(&mut self, data: &[u32]) -> GpuResult<BufferHandle> {
        let handle = BufferHandle(self.next());
        self.live_buffers.insert(handle);
        self.calls.push(DeviceCall::CreateIndexBuffer(data.len()));
        Ok(handle)
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        self.live_buffers.remove(&buffer);
        self.calls.push(DeviceCall::DestroyBuffer(buffer));
    }

    fn bind_vertex_attribute(
        &mut self,
        buffer: BufferHandle,
        location: AttributeLocation,
        components: u32,
    ) {
        self.calls.push(DeviceCall::BindAttribute {
            buffer,
            location,
            components,
        });
    }

    fn set_uniform_matrix(&mut self, location: UniformLocation, value: &Matrix4x4) {
        self.calls.push(DeviceCall::SetUniformMatrix(location, *value));
    }

    fn set_uniform_vec3(&mut self, location: UniformLocation, value: &Vector3) {
        self.calls.push(DeviceCall::SetUniformVec3(location, *value));
    }

    fn set_uniform_f32(&mut self, location: UniformLocation, value: f32) {
        self.calls.push(DeviceCall::SetUniformF32(location, value));
    }

    fn draw_indexed(&mut self, indices: BufferHandle, count: u32) {
        self.calls.push(DeviceCall::DrawIndexed { indices, count });
    }

    fn draw_arrays(&mut self, first: u32, count: u32) {
        self.calls.push(DeviceCall::DrawArrays { first, count });
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.calls.push(DeviceCall::SetViewport(x, y, width, height));
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.calls.push(DeviceCall::Clear(color));
    }
}
