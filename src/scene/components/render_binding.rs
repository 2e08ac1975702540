//! Pipeline registration component

use std::rc::Rc;

use crate::gpu::GraphicsDevice;
use crate::scene::{Component, EngineContext, EntityState};

/// Binds the entity's renderable to a named pipeline
///
/// On initialize the renderable is loaded into the pipeline; every frame
/// the entity's world matrix is pushed into the renderable so the pipeline
/// draws it in place; on teardown the renderable is unloaded. An entity
/// without a renderable logs a warning and the component stays inert.
pub struct RenderBinding {
    pipeline: String,
    bound: bool,
}

impl RenderBinding {
    /// Bind to the pipeline with the given name
    pub fn new(pipeline: &str) -> Self {
        Self {
            pipeline: pipeline.to_string(),
            bound: false,
        }
    }
}

impl Component for RenderBinding {
    fn initialize(
        &mut self,
        state: &mut EntityState,
        ctx: &mut EngineContext,
        device: &mut dyn GraphicsDevice,
    ) {
        let Some(renderable) = state.renderable.as_ref() else {
            log::warn!(
                "entity '{}' has a render binding but no renderable",
                state.name
            );
            return;
        };
        match ctx
            .pipelines
            .load_to_pipeline(device, &self.pipeline, Rc::clone(renderable))
        {
            Ok(()) => self.bound = true,
            Err(err) => {
                log::error!(
                    "entity '{}' could not bind to pipeline '{}': {err}",
                    state.name,
                    self.pipeline
                );
            }
        }
    }

    fn update(
        &mut self,
        _delta: f32,
        state: &mut EntityState,
        _ctx: &mut EngineContext,
        _device: &mut dyn GraphicsDevice,
    ) {
        if !self.bound {
            return;
        }
        if let Some(renderable) = state.renderable.as_ref() {
            renderable.borrow_mut().set_model_matrix(state.world_matrix());
        }
    }

    fn teardown(
        &mut self,
        state: &mut EntityState,
        ctx: &mut EngineContext,
        device: &mut dyn GraphicsDevice,
    ) {
        if !self.bound {
            return;
        }
        if let Some(renderable) = state.renderable.as_ref() {
            let name = renderable.borrow().name().to_string();
            ctx.pipelines.unload_from_pipeline(device, &name);
        }
        self.bound = false;
    }
}
