//! Buffer-owning drawable

use crate::foundation::math::Matrix4x4;
use crate::gpu::{AttributeLocation, BufferHandle, GraphicsDevice};
use crate::render::geometry::GeometryData;
use crate::render::{RenderError, Shader};

/// GPU-side state held while a renderable is loaded
#[derive(Debug)]
struct LoadedState {
    position: (BufferHandle, AttributeLocation),
    normal: Option<(BufferHandle, AttributeLocation)>,
    color: Option<(BufferHandle, AttributeLocation)>,
    uv: Option<(BufferHandle, AttributeLocation)>,
    index: Option<BufferHandle>,
}

/// A drawable object owning its GPU buffers
///
/// Geometry arrays are plain numeric vectors set once before [`load`]
/// allocates buffers against a specific shader's attribute locations.
/// Loading couples the buffer layout to that shader; moving a renderable to
/// a different shader requires an explicit [`unload`] + [`load`] cycle.
/// [`unload`] must run before the renderable is discarded or the buffer
/// handles leak.
///
/// [`load`]: Renderable::load
/// [`unload`]: Renderable::unload
#[derive(Debug)]
pub struct Renderable {
    name: String,
    geometry: GeometryData,
    model_matrix: Matrix4x4,
    loaded: Option<LoadedState>,
}

impl Renderable {
    /// Create a renderable from prepared geometry
    pub fn new(name: &str, geometry: GeometryData) -> Self {
        Self {
            name: name.to_string(),
            geometry,
            model_matrix: Matrix4x4::identity(),
            loaded: None,
        }
    }

    /// Renderable name, used for pipeline unload lookups
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current world (model) matrix
    pub fn model_matrix(&self) -> &Matrix4x4 {
        &self.model_matrix
    }

    /// Replace the world (model) matrix
    pub fn set_model_matrix(&mut self, matrix: Matrix4x4) {
        self.model_matrix = matrix;
    }

    /// Whether GPU buffers are currently allocated
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Number of vertices in the position array
    pub fn vertex_count(&self) -> usize {
        self.geometry.vertex_count()
    }

    /// Allocate GPU buffers and resolve attribute bindings for `shader`
    ///
    /// The position attribute (`a_position`) is required; its absence is a
    /// fatal error. Normal, color, and uv arrays are uploaded only when
    /// both the array and the matching shader attribute are present.
    pub fn load(
        &mut self,
        device: &mut dyn GraphicsDevice,
        shader: &Shader,
    ) -> Result<(), RenderError> {
        if self.loaded.is_some() {
            return Err(RenderError::AlreadyLoaded {
                name: self.name.clone(),
            });
        }

        let position_loc = shader.attribute(device, "a_position")?;
        let position = device.create_vertex_buffer(&self.geometry.positions)?;

        let normal = Self::load_optional(device, shader, &self.geometry.normals, "a_normal")?;
        let color = Self::load_optional(device, shader, &self.geometry.colors, "a_color")?;
        let uv = Self::load_optional(device, shader, &self.geometry.uvs, "a_uv")?;

        let index = if self.geometry.indices.is_empty() {
            None
        } else {
            Some(device.create_index_buffer(&self.geometry.indices)?)
        };

        self.loaded = Some(LoadedState {
            position: (position, position_loc),
            normal,
            color,
            uv,
            index,
        });
        log::debug!(
            "loaded renderable '{}' against shader '{}'",
            self.name,
            shader.name()
        );
        Ok(())
    }

    fn load_optional(
        device: &mut dyn GraphicsDevice,
        shader: &Shader,
        data: &[f32],
        attribute: &str,
    ) -> Result<Option<(BufferHandle, AttributeLocation)>, RenderError> {
        if data.is_empty() {
            return Ok(None);
        }
        match shader.try_attribute(device, attribute) {
            Some(location) => {
                let buffer = device.create_vertex_buffer(data)?;
                Ok(Some((buffer, location)))
            }
            None => {
                log::debug!(
                    "shader '{}' has no attribute '{attribute}', skipping upload",
                    shader.name()
                );
                Ok(None)
            }
        }
    }

    /// Bind buffers and issue the draw call
    ///
    /// Indexed geometry draws from the index buffer; otherwise the draw
    /// covers the vertex count of the position array. A renderable that was
    /// never loaded draws nothing.
    pub fn draw(&self, device: &mut dyn GraphicsDevice) {
        let Some(state) = &self.loaded else {
            return;
        };

        let (position, position_loc) = state.position;
        device.bind_vertex_attribute(position, position_loc, 3);
        if let Some((buffer, location)) = state.normal {
            device.bind_vertex_attribute(buffer, location, 3);
        }
        if let Some((buffer, location)) = state.color {
            device.bind_vertex_attribute(buffer, location, 4);
        }
        if let Some((buffer, location)) = state.uv {
            device.bind_vertex_attribute(buffer, location, 2);
        }

        if let Some(index) = state.index {
            device.draw_indexed(index, self.geometry.indices.len() as u32);
        } else {
            device.draw_arrays(0, self.geometry.vertex_count() as u32);
        }
    }

    /// Release every owned buffer
    ///
    /// A no-op for a renderable that is not loaded.
    pub fn unload(&mut self, device: &mut dyn GraphicsDevice) {
        let Some(state) = self.loaded.take() else {
            return;
        };

        device.destroy_buffer(state.position.0);
        for buffer in [state.normal, state.color, state.uv].into_iter().flatten() {
            device.destroy_buffer(buffer.0);
        }
        if let Some(index) = state.index {
            device.destroy_buffer(index);
        }
        log::debug!("unloaded renderable '{}'", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{DeviceCall, RecordingDevice};
    use crate::render::geometry;

    fn test_shader(device: &mut RecordingDevice) -> Shader {
        Shader::compile(device, "test", "vs", "fs").unwrap()
    }

    #[test]
    fn test_load_unload_leaves_no_allocations() {
        let mut device = RecordingDevice::new();
        let shader = test_shader(&mut device);
        let mut renderable = Renderable::new("cube", geometry::cube(1.0));

        renderable.load(&mut device, &shader).unwrap();
        assert!(renderable.is_loaded());
        assert!(device.outstanding_buffers() > 0);

        renderable.unload(&mut device);
        assert!(!renderable.is_loaded());
        assert_eq!(device.outstanding_buffers(), 0);
    }

    #[test]
    fn test_double_load_is_rejected() {
        let mut device = RecordingDevice::new();
        let shader = test_shader(&mut device);
        let mut renderable = Renderable::new("cube", geometry::cube(1.0));

        renderable.load(&mut device, &shader).unwrap();
        let err = renderable.load(&mut device, &shader).unwrap_err();
        assert!(matches!(err, RenderError::AlreadyLoaded { .. }));

        // Explicit unload + load cycle works
        renderable.unload(&mut device);
        renderable.load(&mut device, &shader).unwrap();
    }

    #[test]
    fn test_indexed_draw_uses_index_count() {
        let mut device = RecordingDevice::new();
        let shader = test_shader(&mut device);
        let mut renderable = Renderable::new("quad", geometry::quad(1.0, 1.0));
        renderable.load(&mut device, &shader).unwrap();

        device.clear_calls();
        renderable.draw(&mut device);
        assert!(device
            .calls()
            .iter()
            .any(|call| matches!(call, DeviceCall::DrawIndexed { count: 6, .. })));
    }

    #[test]
    fn test_non_indexed_draw_uses_vertex_count() {
        let mut device = RecordingDevice::new();
        let shader = test_shader(&mut device);
        let mut renderable = Renderable::new("tri", geometry::triangle(1.0));
        renderable.load(&mut device, &shader).unwrap();

        device.clear_calls();
        renderable.draw(&mut device);
        assert!(device
            .calls()
            .iter()
            .any(|call| matches!(call, DeviceCall::DrawArrays { first: 0, count: 3 })));
    }

    #[test]
    fn test_draw_before_load_is_a_no_op() {
        let mut device = RecordingDevice::new();
        let renderable = Renderable::new("tri", geometry::triangle(1.0));
        renderable.draw(&mut device);
        assert!(device.calls().is_empty());
    }

    #[test]
    fn test_unload_is_idempotent() {
        let mut device = RecordingDevice::new();
        let shader = test_shader(&mut device);
        let mut renderable = Renderable::new("quad", geometry::quad(1.0, 1.0));

        renderable.load(&mut device, &shader).unwrap();
        renderable.unload(&mut device);
        renderable.unload(&mut device);
        assert_eq!(device.outstanding_buffers(), 0);
    }
}
