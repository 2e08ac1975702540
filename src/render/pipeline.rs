//! Shader-batched draw pipelines

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::foundation::math::Matrix4x4;
use crate::gpu::GraphicsDevice;
use crate::render::{Camera, DirectionalLight, RenderError, Renderable, Shader};

/// A shader program with its registered renderables
///
/// A pipeline batches every renderable drawn with one shader so the program
/// is bound once per frame. Registration is shared, not owning: renderables
/// live in `Rc<RefCell<..>>` cells so scene components can keep writing model
/// matrices into objects the pipeline draws. Camera and light are weak
/// references; a pipeline with no live camera skips its renderables rather
/// than drawing with a stale view.
pub struct Pipeline {
    name: String,
    shader: Shader,
    renderables: Vec<Rc<RefCell<Renderable>>>,
    camera: Weak<RefCell<Camera>>,
    light: Weak<RefCell<DirectionalLight>>,
}

impl Pipeline {
    fn new(name: &str, shader: Shader) -> Self {
        Self {
            name: name.to_string(),
            shader,
            renderables: Vec::new(),
            camera: Weak::new(),
            light: Weak::new(),
        }
    }

    /// Pipeline name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of registered renderables
    pub fn renderable_count(&self) -> usize {
        self.renderables.len()
    }

    /// Bind the camera whose view-projection this pipeline uploads
    pub fn set_camera(&mut self, camera: &Rc<RefCell<Camera>>) {
        self.camera = Rc::downgrade(camera);
    }

    /// Bind the directional light this pipeline uploads
    pub fn set_light(&mut self, light: &Rc<RefCell<DirectionalLight>>) {
        self.light = Rc::downgrade(light);
    }

    /// Draw every registered renderable
    ///
    /// Binds the shader once, uploads the frame-constant uniforms
    /// (`u_view_projection`, `u_light_direction`, `u_light_intensity`), then
    /// per renderable uploads `u_model` and, when the shader declares it,
    /// `u_normal_matrix` as the inverse-transpose of the model matrix.
    /// Camera and light are nullable: an unbound one skips its uniforms,
    /// never the draws. Uniforms the shader does not declare are skipped.
    pub fn update(&mut self, device: &mut dyn GraphicsDevice) {
        self.shader.bind(device);

        if let Some(camera) = self.camera.upgrade() {
            if let Some(location) = self.shader.try_uniform(device, "u_view_projection") {
                let mut vp = Matrix4x4::identity();
                camera.borrow().view_projection_into(&mut vp);
                device.set_uniform_matrix(location, &vp);
            }
        } else {
            log::debug!(
                "pipeline '{}' has no camera, drawing without view-projection",
                self.name
            );
        }

        if let Some(light) = self.light.upgrade() {
            let light = light.borrow();
            if let Some(location) = self.shader.try_uniform(device, "u_light_direction") {
                device.set_uniform_vec3(location, &light.direction());
            }
            if let Some(location) = self.shader.try_uniform(device, "u_light_intensity") {
                device.set_uniform_f32(location, light.intensity());
            }
        }

        let model_loc = self.shader.try_uniform(device, "u_model");
        let normal_loc = self.shader.try_uniform(device, "u_normal_matrix");

        for renderable in &self.renderables {
            let renderable = renderable.borrow();
            if let Some(location) = model_loc {
                device.set_uniform_matrix(location, renderable.model_matrix());
            }
            if let Some(location) = normal_loc {
                let mut normal = Matrix4x4::identity();
                let mut inverse = Matrix4x4::identity();
                if Matrix4x4::invert_into(&mut inverse, renderable.model_matrix()) {
                    Matrix4x4::transpose_into(&mut normal, &inverse);
                } else {
                    log::warn!(
                        "renderable '{}' has a singular model matrix, using identity normal matrix",
                        renderable.name()
                    );
                }
                device.set_uniform_matrix(location, &normal);
            }
            renderable.draw(device);
        }
    }
}

/// Owns every pipeline and routes renderables to them by name
///
/// Pipelines keep insertion order; duplicate names are permitted and lookups
/// resolve to the first match.
#[derive(Default)]
pub struct PipelineManager {
    pipelines: Vec<Pipeline>,
}

impl PipelineManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pipelines
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    /// Compile a shader and register a pipeline for it
    ///
    /// Compile failure is fatal and leaves the manager unchanged.
    pub fn add_pipeline(
        &mut self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<(), RenderError> {
        let shader = Shader::compile(device, name, vertex_src, fragment_src)?;
        self.pipelines.push(Pipeline::new(name, shader));
        log::debug!("added pipeline '{name}'");
        Ok(())
    }

    /// First pipeline with the given name
    pub fn get_pipeline(&mut self, name: &str) -> Option<&mut Pipeline> {
        self.pipelines.iter_mut().find(|p| p.name == name)
    }

    /// Remove the first pipeline with the given name
    ///
    /// Unloads every registered renderable and destroys the shader program.
    /// Unknown names are a no-op.
    pub fn remove_pipeline(&mut self, device: &mut dyn GraphicsDevice, name: &str) {
        let Some(index) = self.pipelines.iter().position(|p| p.name == name) else {
            return;
        };
        let pipeline = self.pipelines.remove(index);
        for renderable in &pipeline.renderables {
            renderable.borrow_mut().unload(device);
        }
        pipeline.shader.destroy(device);
        log::debug!("removed pipeline '{name}'");
    }

    /// Bind a pipeline's shader, then load and register a renderable with it
    ///
    /// The target pipeline must exist; loading into an unknown pipeline is a
    /// fatal setup error.
    pub fn load_to_pipeline(
        &mut self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        renderable: Rc<RefCell<Renderable>>,
    ) -> Result<(), RenderError> {
        let Some(pipeline) = self.pipelines.iter_mut().find(|p| p.name == name) else {
            return Err(RenderError::UnknownPipeline {
                name: name.to_string(),
            });
        };
        pipeline.shader.bind(device);
        renderable.borrow_mut().load(device, &pipeline.shader)?;
        pipeline.renderables.push(renderable);
        Ok(())
    }

    /// Unload and deregister a renderable by name, searching every pipeline
    ///
    /// A renderable that is not registered anywhere logs a warning.
    pub fn unload_from_pipeline(&mut self, device: &mut dyn GraphicsDevice, renderable_name: &str) {
        for pipeline in &mut self.pipelines {
            if let Some(index) = pipeline
                .renderables
                .iter()
                .position(|r| r.borrow().name() == renderable_name)
            {
                let renderable = pipeline.renderables.remove(index);
                renderable.borrow_mut().unload(device);
                return;
            }
        }
        log::warn!("renderable '{renderable_name}' is not registered with any pipeline");
    }

    /// Draw every pipeline in insertion order
    pub fn update(&mut self, device: &mut dyn GraphicsDevice) {
        for pipeline in &mut self.pipelines {
            pipeline.update(device);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vector3;
    use crate::gpu::{DeviceCall, RecordingDevice};
    use crate::render::geometry;

    fn manager_with_pipeline(device: &mut RecordingDevice, name: &str) -> PipelineManager {
        let mut manager = PipelineManager::new();
        manager.add_pipeline(device, name, "vs", "fs").unwrap();
        manager
    }

    fn shared_cube(name: &str) -> Rc<RefCell<Renderable>> {
        Rc::new(RefCell::new(Renderable::new(name, geometry::cube(1.0))))
    }

    #[test]
    fn test_load_to_unknown_pipeline_is_fatal() {
        let mut device = RecordingDevice::new();
        let mut manager = manager_with_pipeline(&mut device, "lit");

        let err = manager
            .load_to_pipeline(&mut device, "missing", shared_cube("cube"))
            .unwrap_err();
        assert!(matches!(err, RenderError::UnknownPipeline { .. }));
    }

    #[test]
    fn test_duplicate_names_resolve_to_first_match() {
        let mut device = RecordingDevice::new();
        let mut manager = manager_with_pipeline(&mut device, "lit");
        manager.add_pipeline(&mut device, "lit", "vs2", "fs2").unwrap();

        manager
            .load_to_pipeline(&mut device, "lit", shared_cube("cube"))
            .unwrap();
        assert_eq!(manager.pipelines[0].renderable_count(), 1);
        assert_eq!(manager.pipelines[1].renderable_count(), 0);
    }

    #[test]
    fn test_remove_pipeline_unloads_and_destroys() {
        let mut device = RecordingDevice::new();
        let mut manager = manager_with_pipeline(&mut device, "lit");
        manager
            .load_to_pipeline(&mut device, "lit", shared_cube("cube"))
            .unwrap();
        assert!(device.outstanding_buffers() > 0);

        manager.remove_pipeline(&mut device, "lit");
        assert_eq!(device.outstanding_buffers(), 0);
        assert_eq!(device.outstanding_programs(), 0);
        assert_eq!(manager.pipeline_count(), 0);

        // Unknown name is a no-op
        manager.remove_pipeline(&mut device, "lit");
    }

    #[test]
    fn test_unload_from_pipeline_by_name() {
        let mut device = RecordingDevice::new();
        let mut manager = manager_with_pipeline(&mut device, "lit");
        let cube = shared_cube("cube");
        manager
            .load_to_pipeline(&mut device, "lit", Rc::clone(&cube))
            .unwrap();

        manager.unload_from_pipeline(&mut device, "cube");
        assert_eq!(device.outstanding_buffers(), 0);
        assert!(!cube.borrow().is_loaded());
        assert_eq!(manager.pipelines[0].renderable_count(), 0);

        // Missing renderable logs and returns
        manager.unload_from_pipeline(&mut device, "cube");
    }

    #[test]
    fn test_update_binds_once_and_draws_each_renderable() {
        let mut device = RecordingDevice::new();
        let mut manager = manager_with_pipeline(&mut device, "lit");
        manager
            .load_to_pipeline(&mut device, "lit", shared_cube("a"))
            .unwrap();
        manager
            .load_to_pipeline(&mut device, "lit", shared_cube("b"))
            .unwrap();

        let camera = Rc::new(RefCell::new(Camera::perspective(
            std::f32::consts::FRAC_PI_3,
            1.0,
            0.1,
            100.0,
        )));
        let light = Rc::new(RefCell::new(DirectionalLight::default()));
        let pipeline = manager.get_pipeline("lit").unwrap();
        pipeline.set_camera(&camera);
        pipeline.set_light(&light);

        device.clear_calls();
        manager.update(&mut device);

        let binds = device
            .calls()
            .iter()
            .filter(|c| matches!(c, DeviceCall::UseProgram(_)))
            .count();
        let draws = device
            .calls()
            .iter()
            .filter(|c| matches!(c, DeviceCall::DrawIndexed { .. }))
            .count();
        assert_eq!(binds, 1);
        assert_eq!(draws, 2);
    }

    #[test]
    fn test_update_without_camera_still_draws() {
        let mut device = RecordingDevice::new();
        let mut manager = manager_with_pipeline(&mut device, "lit");
        manager
            .load_to_pipeline(&mut device, "lit", shared_cube("cube"))
            .unwrap();
        let program = manager.pipelines[0].shader.program();
        let vp_loc = device.uniform_location(program, "u_view_projection").unwrap();

        device.clear_calls();
        manager.update(&mut device);

        let draws = device
            .calls()
            .iter()
            .filter(|c| matches!(c, DeviceCall::DrawIndexed { .. }))
            .count();
        assert_eq!(draws, 1);
        // The view-projection upload is what the missing camera skips
        assert!(!device
            .calls()
            .iter()
            .any(|c| matches!(c, DeviceCall::SetUniformMatrix(loc, _) if *loc == vp_loc)));
    }

    #[test]
    fn test_dropped_camera_draws_without_view_projection() {
        let mut device = RecordingDevice::new();
        let mut manager = manager_with_pipeline(&mut device, "lit");
        manager
            .load_to_pipeline(&mut device, "lit", shared_cube("cube"))
            .unwrap();
        let program = manager.pipelines[0].shader.program();
        let vp_loc = device.uniform_location(program, "u_view_projection").unwrap();

        let camera = Rc::new(RefCell::new(Camera::perspective(1.0, 1.0, 0.1, 10.0)));
        manager.get_pipeline("lit").unwrap().set_camera(&camera);
        drop(camera);

        device.clear_calls();
        manager.update(&mut device);

        let draws = device
            .calls()
            .iter()
            .filter(|c| matches!(c, DeviceCall::DrawIndexed { .. }))
            .count();
        assert_eq!(draws, 1);
        assert!(!device
            .calls()
            .iter()
            .any(|c| matches!(c, DeviceCall::SetUniformMatrix(loc, _) if *loc == vp_loc)));
    }

    #[test]
    fn test_hidden_normal_matrix_skips_upload_only() {
        let mut device = RecordingDevice::new();
        let mut manager = manager_with_pipeline(&mut device, "lit");
        manager
            .load_to_pipeline(&mut device, "lit", shared_cube("cube"))
            .unwrap();
        let program = manager.pipelines[0].shader.program();
        let normal_loc = device.uniform_location(program, "u_normal_matrix").unwrap();
        let model_loc = device.uniform_location(program, "u_model").unwrap();
        device.hide_uniform(program, "u_normal_matrix");

        let camera = Rc::new(RefCell::new(Camera::perspective(1.0, 1.0, 0.1, 10.0)));
        manager.get_pipeline("lit").unwrap().set_camera(&camera);

        device.clear_calls();
        manager.update(&mut device);

        assert!(!device
            .calls()
            .iter()
            .any(|c| matches!(c, DeviceCall::SetUniformMatrix(loc, _) if *loc == normal_loc)));

        // The model matrix still uploads, and before the draw call
        let model_pos = device
            .calls()
            .iter()
            .position(|c| matches!(c, DeviceCall::SetUniformMatrix(loc, _) if *loc == model_loc))
            .unwrap();
        let draw_pos = device
            .calls()
            .iter()
            .position(|c| matches!(c, DeviceCall::DrawIndexed { .. }))
            .unwrap();
        assert!(model_pos < draw_pos);
    }

    #[test]
    fn test_load_binds_shader_before_buffer_upload() {
        let mut device = RecordingDevice::new();
        let mut manager = manager_with_pipeline(&mut device, "lit");

        device.clear_calls();
        manager
            .load_to_pipeline(&mut device, "lit", shared_cube("cube"))
            .unwrap();

        let bind_pos = device
            .calls()
            .iter()
            .position(|c| matches!(c, DeviceCall::UseProgram(_)))
            .unwrap();
        let upload_pos = device
            .calls()
            .iter()
            .position(|c| matches!(c, DeviceCall::CreateVertexBuffer(_)))
            .unwrap();
        assert!(bind_pos < upload_pos);
    }

    #[test]
    fn test_light_uniforms_uploaded_when_bound() {
        let mut device = RecordingDevice::new();
        let mut manager = manager_with_pipeline(&mut device, "lit");
        manager
            .load_to_pipeline(&mut device, "lit", shared_cube("cube"))
            .unwrap();

        let camera = Rc::new(RefCell::new(Camera::perspective(1.0, 1.0, 0.1, 10.0)));
        let light = Rc::new(RefCell::new(DirectionalLight::new(
            Vector3::new(0.0, -1.0, 0.0),
            0.75,
        )));
        let pipeline = manager.get_pipeline("lit").unwrap();
        pipeline.set_camera(&camera);
        pipeline.set_light(&light);

        device.clear_calls();
        manager.update(&mut device);
        assert!(device
            .calls()
            .iter()
            .any(|c| matches!(c, DeviceCall::SetUniformF32(_, v) if (*v - 0.75).abs() < 1e-6)));
        assert!(device
            .calls()
            .iter()
            .any(|c| matches!(c, DeviceCall::SetUniformVec3(_, _))));
    }
}
