//! Graphics device abstraction
//!
//! The engine never creates a graphics context itself; bootstrap code hands
//! it an implementation of [`GraphicsDevice`] and the core only touches the
//! narrow surface defined here: buffer and program lifecycle, reflection by
//! name, uniform upload, and draw dispatch.
//!
//! Handles are opaque integers owned by whoever created the resource.
//! Renderables own their buffer handles exclusively; a handle that is not
//! destroyed before its owner is discarded leaks, since there is no
//! finalizer-style reclamation.

mod recording;

pub use recording::{DeviceCall, RecordingDevice};

use crate::foundation::math::{Matrix4x4, Vector3};

/// Handle to a GPU buffer object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

/// Handle to a compiled and linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u64);

/// Location of a vertex attribute within a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeLocation(pub u32);

/// Location of a uniform within a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Errors raised by graphics device implementations
#[derive(thiserror::Error, Debug)]
pub enum GpuError {
    /// Shader source failed to compile or link
    #[error("shader compile/link failure in '{name}': {reason}")]
    ShaderCompile {
        /// Name of the failing program
        name: String,
        /// Backend-reported reason
        reason: String,
    },

    /// Backend-specific failure (device lost, out of memory, ...)
    #[error("graphics backend error: {0}")]
    Backend(String),
}

/// Result type for device operations
pub type GpuResult<T> = Result<T, GpuError>;

/// Narrow interface to the graphics API collaborator
///
/// The core calls these operations only inside renderable load/draw/unload,
/// shader compilation, and the per-frame pipeline pass.
pub trait GraphicsDevice {
    /// Compile and link a shader program from vertex and fragment source
    fn create_program(&mut self, name: &str, vertex_src: &str, fragment_src: &str)
        -> GpuResult<ProgramHandle>;

    /// Destroy a program and release its GPU resources
    fn destroy_program(&mut self, program: ProgramHandle);

    /// Make a program the active one for subsequent uniform and draw calls
    fn use_program(&mut self, program: ProgramHandle);

    /// Look up a vertex attribute by name; `None` if the program does not
    /// declare it
    fn attribute_location(&self, program: ProgramHandle, name: &str) -> Option<AttributeLocation>;

    /// Look up a uniform by name; `None` if the program does not declare it
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Allocate and upload a vertex data buffer
    fn create_vertex_buffer(&mut self, data: &[f32]) -> GpuResult<BufferHandle>;

    /// Allocate and upload an index buffer
    fn create_index_buffer(&mut self, data: &[u32]) -> GpuResult<BufferHandle>;

    /// Release a buffer allocation
    fn destroy_buffer(&mut self, buffer: BufferHandle);

    /// Bind a buffer to a vertex attribute with the given component count
    fn bind_vertex_attribute(
        &mut self,
        buffer: BufferHandle,
        location: AttributeLocation,
        components: u32,
    );

    /// Upload a 4x4 matrix uniform
    fn set_uniform_matrix(&mut self, location: UniformLocation, value: &Matrix4x4);

    /// Upload a vec3 uniform
    fn set_uniform_vec3(&mut self, location: UniformLocation, value: &Vector3);

    /// Upload a scalar uniform
    fn set_uniform_f32(&mut self, location: UniformLocation, value: f32);

    /// Issue an indexed draw from the given index buffer
    fn draw_indexed(&mut self, indices: BufferHandle, count: u32);

    /// Issue a non-indexed draw over `count` vertices starting at `first`
    fn draw_arrays(&mut self, first: u32, count: u32);

    /// Set the viewport in pixels
    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Clear the color and depth targets
    fn clear(&mut self, color: [f32; 4]);
}
