//! Shader program wrapper

use crate::gpu::{AttributeLocation, GraphicsDevice, ProgramHandle, UniformLocation};
use crate::render::RenderError;

/// A compiled and linked shader program
///
/// Owns the opaque program handle; the buffer layouts of any renderables
/// loaded against this shader are coupled to its attribute locations.
#[derive(Debug)]
pub struct Shader {
    name: String,
    program: ProgramHandle,
}

impl Shader {
    /// Compile and link a program from source
    ///
    /// Compile or link failure is fatal and propagates to the caller.
    pub fn compile(
        device: &mut dyn GraphicsDevice,
        name: &str,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Self, RenderError> {
        let program = device.create_program(name, vertex_src, fragment_src)?;
        log::debug!("compiled shader program '{name}'");
        Ok(Self {
            name: name.to_string(),
            program,
        })
    }

    /// Shader name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying program handle
    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    /// Make this program active
    pub fn bind(&self, device: &mut dyn GraphicsDevice) {
        device.use_program(self.program);
    }

    /// Required attribute lookup; missing attributes are fatal
    pub fn attribute(
        &self,
        device: &dyn GraphicsDevice,
        name: &str,
    ) -> Result<AttributeLocation, RenderError> {
        device
            .attribute_location(self.program, name)
            .ok_or_else(|| RenderError::MissingAttribute {
                shader: self.name.clone(),
                name: name.to_string(),
            })
    }

    /// Optional attribute lookup
    pub fn try_attribute(&self, device: &dyn GraphicsDevice, name: &str) -> Option<AttributeLocation> {
        device.attribute_location(self.program, name)
    }

    /// Required uniform lookup; missing uniforms are fatal
    pub fn uniform(
        &self,
        device: &dyn GraphicsDevice,
        name: &str,
    ) -> Result<UniformLocation, RenderError> {
        device
            .uniform_location(self.program, name)
            .ok_or_else(|| RenderError::MissingUniform {
                shader: self.name.clone(),
                name: name.to_string(),
            })
    }

    /// Optional uniform lookup, for uniforms a shader may legitimately omit
    pub fn try_uniform(&self, device: &dyn GraphicsDevice, name: &str) -> Option<UniformLocation> {
        device.uniform_location(self.program, name)
    }

    /// Destroy the program on the device
    pub fn destroy(self, device: &mut dyn GraphicsDevice) {
        device.destroy_program(self.program);
    }
}
