//! Linear motion component

use crate::collision::ShapeKey;
use crate::foundation::math::Vector3;
use crate::gpu::GraphicsDevice;
use crate::scene::{Component, EngineContext, EntityState};

/// Explicit Euler integration with linear drag
///
/// Registers an AABB collision shape for the owning entity on initialize
/// and removes it on teardown. Default extents come from the collision
/// configuration unless overridden with [`with_extents`].
///
/// [`with_extents`]: RigidBody::with_extents
pub struct RigidBody {
    /// Linear velocity in world units per second
    pub velocity: Vector3,
    /// Velocity fraction lost per second; 0 keeps momentum forever
    pub drag: f32,
    extents: Option<[f32; 3]>,
    shape: Option<ShapeKey>,
}

impl RigidBody {
    /// Create a body with the given initial velocity and drag
    pub fn new(velocity: Vector3, drag: f32) -> Self {
        Self {
            velocity,
            drag,
            extents: None,
            shape: None,
        }
    }

    /// Override the collision box extents registered on initialize
    #[must_use]
    pub fn with_extents(mut self, width: f32, height: f32, depth: f32) -> Self {
        self.extents = Some([width, height, depth]);
        self
    }
}

impl Component for RigidBody {
    fn initialize(
        &mut self,
        state: &mut EntityState,
        ctx: &mut EngineContext,
        _device: &mut dyn GraphicsDevice,
    ) {
        let key = match self.extents {
            Some([width, height, depth]) => ctx.collision.add_shape(
                crate::collision::CollisionShape::new(
                    state.key,
                    crate::collision::ShapeKind::Aabb {
                        width,
                        height,
                        depth,
                    },
                ),
            ),
            None => ctx.collision.add_default_shape(state.key),
        };
        self.shape = Some(key);
    }

    fn update(
        &mut self,
        delta: f32,
        state: &mut EntityState,
        _ctx: &mut EngineContext,
        _device: &mut dyn GraphicsDevice,
    ) {
        state.transform.position = state.transform.position.add(&self.velocity.scale(delta));
        let damping = (1.0 - self.drag * delta).max(0.0);
        self.velocity = self.velocity.scale(damping);
    }

    fn teardown(
        &mut self,
        _state: &mut EntityState,
        ctx: &mut EngineContext,
        _device: &mut dyn GraphicsDevice,
    ) {
        if let Some(key) = self.shape.take() {
            ctx.collision.remove_shape(key);
        }
    }
}
