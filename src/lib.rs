//! # Orrery
//!
//! A minimal real-time 3D rendering engine core: a math library, a scene
//! graph of entities with attachable components, shader-batched draw
//! pipelines, brute-force collision detection, and a priority message bus.
//!
//! All GPU work goes through the [`gpu::GraphicsDevice`] trait; the crate
//! ships a recording in-memory implementation so scenes run headless in
//! tests. Windowing, input, and actual graphics API bindings stay outside.
//!
//! ## Quick Start
//!
//! ```rust
//! use orrery::prelude::*;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let mut device = RecordingDevice::new();
//! let config = EngineConfig::default();
//! let mut ctx = EngineContext::new(&config);
//! let mut scene = Scene::new();
//! let mut timer = Timer::new();
//!
//! ctx.pipelines.add_pipeline(&mut device, "lit", "vs src", "fs src")?;
//! let camera = Rc::new(RefCell::new(Camera::perspective(1.0, 16.0 / 9.0, 0.1, 100.0)));
//! ctx.pipelines.get_pipeline("lit").unwrap().set_camera(&camera);
//!
//! let cube = Rc::new(RefCell::new(Renderable::new("cube", geometry::cube(1.0))));
//! let key = scene.add_entity(
//!     Entity::new("crate")
//!         .with_renderable(cube)
//!         .with_component(Box::new(RenderBinding::new("lit"))),
//!     &mut ctx,
//!     &mut device,
//! );
//!
//! timer.update();
//! scene.update(timer.delta_time(), &mut ctx, &mut device);
//! ctx.pipelines.update(&mut device);
//!
//! scene.remove_entity(key, &mut ctx, &mut device);
//! # Ok::<(), orrery::render::RenderError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::cast_precision_loss
)]

pub mod assets;
pub mod collision;
pub mod config;
pub mod foundation;
pub mod gpu;
pub mod messaging;
pub mod render;
pub mod scene;

/// Commonly used types, re-exported for convenience
pub mod prelude {
    pub use crate::assets::{AssetCatalog, AssetError, MeshData};
    pub use crate::collision::{CollisionEvent, CollisionManager, CollisionShape, ShapeKind};
    pub use crate::config::EngineConfig;
    pub use crate::foundation::math::{Matrix4x4, Rotator, Transform, Vector2, Vector3};
    pub use crate::foundation::time::Timer;
    pub use crate::gpu::{GraphicsDevice, RecordingDevice};
    pub use crate::messaging::{Message, MessageBus, MessageData, MessageHandler, MessagePriority};
    pub use crate::render::{
        begin_frame, geometry, Camera, DirectionalLight, PipelineManager, RenderError,
        Renderable, Shader,
    };
    pub use crate::scene::components::{RenderBinding, RigidBody};
    pub use crate::scene::{Component, EngineContext, Entity, EntityKey, Scene};
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::foundation::math::Vector3;
    use crate::gpu::DeviceCall;
    use crate::messaging::{MessageData, MessagePriority};
    use crate::prelude::*;

    /// Full frame: clear, move entities, detect the collision, react on the
    /// bus, draw, then tear everything down without leaking GPU handles.
    #[test]
    fn test_full_frame_loop() {
        struct GameOver {
            triggered: bool,
        }

        impl MessageHandler for GameOver {
            fn handle(&mut self, message: &Message) {
                if message.code == "ship.hit" {
                    self.triggered = true;
                }
            }
        }

        let mut device = RecordingDevice::new();
        let config = EngineConfig::default();
        let mut ctx = EngineContext::new(&config);
        let mut scene = Scene::new();

        ctx.pipelines
            .add_pipeline(&mut device, "lit", "vs", "fs")
            .unwrap();
        let camera = Rc::new(RefCell::new(Camera::perspective(1.0, 1.0, 0.1, 100.0)));
        let light = Rc::new(RefCell::new(DirectionalLight::default()));
        {
            let pipeline = ctx.pipelines.get_pipeline("lit").unwrap();
            pipeline.set_camera(&camera);
            pipeline.set_light(&light);
        }

        let handler = Rc::new(RefCell::new(GameOver { triggered: false }));
        ctx.bus.subscribe("ship.hit", handler.clone());

        // Ship flying toward a stationary cube two units away
        let ship_mesh = Rc::new(RefCell::new(Renderable::new("ship", geometry::cube(1.0))));
        let ship = scene.add_entity(
            Entity::new("ship")
                .with_renderable(ship_mesh)
                .with_component(Box::new(RigidBody::new(Vector3::new(2.0, 0.0, 0.0), 0.0)))
                .with_component(Box::new(RenderBinding::new("lit"))),
            &mut ctx,
            &mut device,
        );
        let rock_mesh = Rc::new(RefCell::new(Renderable::new("rock", geometry::cube(1.0))));
        let mut rock = Entity::new("rock")
            .with_renderable(rock_mesh)
            .with_component(Box::new(RigidBody::new(Vector3::zero(), 0.0)))
            .with_component(Box::new(RenderBinding::new("lit")));
        rock.transform_mut().position = Vector3::new(2.0, 0.0, 0.0);
        let rock = scene.add_entity(rock, &mut ctx, &mut device);
        scene.set_controllable(ship);

        // One frame at rest: no contact yet at distance 2 with unit boxes
        begin_frame(&mut device, &config.render);
        scene.update(0.0, &mut ctx, &mut device);
        assert!(ctx.collision.update(&scene).is_empty());
        ctx.pipelines.update(&mut device);
        ctx.bus.update();
        assert!(!handler.borrow().triggered);

        // Half a second later the ship has closed the gap
        begin_frame(&mut device, &config.render);
        device.clear_calls();
        scene.update(0.5, &mut ctx, &mut device);
        let events = ctx.collision.update(&scene);
        assert_eq!(events.len(), 2);
        for event in &events {
            if event.first == ship {
                ctx.bus.post(Message::new(
                    "ship.hit",
                    MessagePriority::Normal,
                    MessageData::Entity(event.second),
                ));
            }
        }
        ctx.pipelines.update(&mut device);
        ctx.bus.update();
        assert!(handler.borrow().triggered);

        // Both entities drew, and the ship's motion reached its uniforms
        let draws = device
            .calls()
            .iter()
            .filter(|c| matches!(c, DeviceCall::DrawIndexed { .. }))
            .count();
        assert_eq!(draws, 2);

        scene.remove_entity(ship, &mut ctx, &mut device);
        scene.remove_entity(rock, &mut ctx, &mut device);
        assert_eq!(ctx.collision.shape_count(), 0);
        ctx.pipelines.remove_pipeline(&mut device, "lit");
        assert_eq!(device.outstanding_buffers(), 0);
        assert_eq!(device.outstanding_programs(), 0);
    }
}
