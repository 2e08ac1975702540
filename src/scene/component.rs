//! Component behavior hooks

use crate::gpu::GraphicsDevice;
use crate::scene::{EngineContext, EntityState};

/// Per-entity behavior attached in an ordered list
///
/// All three hooks receive the owning entity's state, the engine context
/// (collision manager, pipeline manager, message bus), and the graphics
/// device. Hooks do not return errors; a component that fails internally
/// logs and degrades rather than aborting the frame.
pub trait Component {
    /// Called once when the owning entity joins a scene
    fn initialize(
        &mut self,
        state: &mut EntityState,
        ctx: &mut EngineContext,
        device: &mut dyn GraphicsDevice,
    ) {
        let _ = (state, ctx, device);
    }

    /// Called every frame in attachment order
    fn update(
        &mut self,
        delta: f32,
        state: &mut EntityState,
        ctx: &mut EngineContext,
        device: &mut dyn GraphicsDevice,
    ) {
        let _ = (delta, state, ctx, device);
    }

    /// Called once when the owning entity leaves the scene, in reverse
    /// attachment order
    fn teardown(
        &mut self,
        state: &mut EntityState,
        ctx: &mut EngineContext,
        device: &mut dyn GraphicsDevice,
    ) {
        let _ = (state, ctx, device);
    }
}
