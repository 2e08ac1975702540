//! Rendering layer
//!
//! Drawable geometry, shaders, cameras, lights, and the pipeline manager
//! that batches drawables by shader program. All GPU access goes through
//! the [`crate::gpu::GraphicsDevice`] collaborator; this module owns no
//! graphics context of its own.

mod camera;
pub mod geometry;
mod lighting;
mod pipeline;
mod renderable;
mod shader;

pub use camera::{Camera, Projection};
pub use lighting::DirectionalLight;
pub use pipeline::{Pipeline, PipelineManager};
pub use renderable::Renderable;
pub use shader::Shader;

use crate::config::RenderConfig;
use crate::gpu::{GpuError, GraphicsDevice};

/// Apply the configured viewport and clear the frame targets
///
/// Call once at the top of every frame, before pipeline updates.
pub fn begin_frame(device: &mut dyn GraphicsDevice, config: &RenderConfig) {
    let [width, height] = config.viewport;
    device.set_viewport(0, 0, width, height);
    device.clear(config.clear_color);
}

/// Errors raised by the rendering layer
///
/// Everything here is fatal to setup: it propagates to bootstrap rather
/// than being degraded into per-frame error handling.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    /// Device-level failure
    #[error(transparent)]
    Gpu(#[from] GpuError),

    /// A required vertex attribute is not declared by the shader
    #[error("shader '{shader}' does not declare required attribute '{name}'")]
    MissingAttribute {
        /// Shader program name
        shader: String,
        /// Attribute name looked up
        name: String,
    },

    /// A required uniform is not declared by the shader
    #[error("shader '{shader}' does not declare required uniform '{name}'")]
    MissingUniform {
        /// Shader program name
        shader: String,
        /// Uniform name looked up
        name: String,
    },

    /// Renderable already holds GPU buffers; unload before reloading
    #[error("renderable '{name}' is already loaded; unload it before loading again")]
    AlreadyLoaded {
        /// Renderable name
        name: String,
    },

    /// Named pipeline does not exist
    #[error("no pipeline named '{name}'")]
    UnknownPipeline {
        /// Pipeline name looked up
        name: String,
    },
}
