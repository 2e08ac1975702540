//! Entity and scene graph
//!
//! Entities are stored in a slotmap and addressed by opaque [`EntityKey`]
//! handles; an insertion-order key list keeps update and collision order
//! deterministic. Components attach to entities and run in attachment
//! order every frame.

pub mod components;

mod component;
mod context;
mod entity;

pub use component::Component;
pub use context::EngineContext;
pub use entity::{Entity, EntityKey, EntityState};

use slotmap::SlotMap;

use crate::foundation::math::{Matrix4x4, Vector3};
use crate::gpu::GraphicsDevice;

/// Owns every entity and drives component lifecycles
pub struct Scene {
    entities: SlotMap<EntityKey, Entity>,
    order: Vec<EntityKey>,
    controllable: Option<EntityKey>,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            order: Vec::new(),
            controllable: None,
        }
    }

    /// Number of entities
    pub fn entity_count(&self) -> usize {
        self.order.len()
    }

    /// Insert an entity and synchronously initialize its components in
    /// attachment order
    ///
    /// Returns the key that identifies the entity from here on. Taking the
    /// entity by value makes double insertion unrepresentable.
    pub fn add_entity(
        &mut self,
        entity: Entity,
        ctx: &mut EngineContext,
        device: &mut dyn GraphicsDevice,
    ) -> EntityKey {
        let key = self.entities.insert_with_key(|key| {
            let mut entity = entity;
            entity.state.key = key;
            entity
        });
        self.order.push(key);

        let entity = &mut self.entities[key];
        for component in &mut entity.components {
            component.initialize(&mut entity.state, ctx, device);
        }
        log::debug!("added entity '{}'", self.entities[key].name());
        key
    }

    /// Remove an entity, tearing its components down in reverse attachment
    /// order
    ///
    /// Teardown runs while the entity is already detached from the scene,
    /// so components see a consistent world. A stale key is a no-op. A
    /// renderable still loaded after teardown is deregistered from its
    /// pipeline by name, so no stale registration survives the entity.
    pub fn remove_entity(
        &mut self,
        key: EntityKey,
        ctx: &mut EngineContext,
        device: &mut dyn GraphicsDevice,
    ) {
        let Some(mut entity) = self.entities.remove(key) else {
            return;
        };
        self.order.retain(|k| *k != key);
        if self.controllable == Some(key) {
            self.controllable = None;
        }

        for component in entity.components.iter_mut().rev() {
            component.teardown(&mut entity.state, ctx, device);
        }
        if let Some(renderable) = entity.state.renderable.take() {
            if renderable.borrow().is_loaded() {
                let name = renderable.borrow().name().to_string();
                ctx.pipelines.unload_from_pipeline(device, &name);
            }
            // Loaded outside any pipeline: release the buffers ourselves
            if renderable.borrow().is_loaded() {
                renderable.borrow_mut().unload(device);
            }
        }
        log::debug!("removed entity '{}'", entity.name());
    }

    /// Update every entity in insertion order, components in attachment
    /// order
    ///
    /// Each entity's parent-chain world matrix is refreshed before its
    /// components run, so components read placement through
    /// [`EntityState::world_matrix`] that reflects this frame's parents.
    pub fn update(
        &mut self,
        delta: f32,
        ctx: &mut EngineContext,
        device: &mut dyn GraphicsDevice,
    ) {
        for key in &self.order {
            let parent = self.entities[*key].state.parent;
            let parent_world = self.chain_world(parent);
            let entity = &mut self.entities[*key];
            entity.state.parent_world = parent_world;
            for component in &mut entity.components {
                component.update(delta, &mut entity.state, ctx, device);
            }
        }
    }

    /// Reparent an entity
    ///
    /// `None` detaches the child back to the world root. Stale keys and
    /// reparentings that would close a cycle are logged no-ops.
    pub fn set_parent(&mut self, child: EntityKey, parent: Option<EntityKey>) {
        if !self.entities.contains_key(child) {
            log::warn!("set_parent on a stale child key");
            return;
        }
        if let Some(parent_key) = parent {
            if !self.entities.contains_key(parent_key) {
                log::warn!("set_parent to a stale parent key");
                return;
            }
            let mut cursor = Some(parent_key);
            while let Some(key) = cursor {
                if key == child {
                    log::warn!("set_parent would create a cycle, ignoring");
                    return;
                }
                cursor = self.entities.get(key).and_then(Entity::parent);
            }
        }
        self.entities[child].state.parent = parent;
    }

    /// World matrix of an entity, composed down its parent chain
    ///
    /// `None` for a stale key. A parent that has left the scene truncates
    /// the chain there, so orphaned children fall back to world root.
    pub fn world_matrix(&self, key: EntityKey) -> Option<Matrix4x4> {
        let entity = self.entities.get(key)?;
        let parent_world = self.chain_world(entity.state.parent);
        let mut out = Matrix4x4::identity();
        Matrix4x4::multiply_into(&mut out, &parent_world, &entity.transform().matrix());
        Some(out)
    }

    /// World-space position of an entity, including parent placement
    pub fn world_position(&self, key: EntityKey) -> Option<Vector3> {
        self.world_matrix(key)
            .map(|m| Vector3::new(m.m[12], m.m[13], m.m[14]))
    }

    /// Composed world matrix of a parent chain, root first
    fn chain_world(&self, start: Option<EntityKey>) -> Matrix4x4 {
        let mut chain = Vec::new();
        let mut cursor = start;
        while let Some(key) = cursor {
            let Some(entity) = self.entities.get(key) else {
                break;
            };
            chain.push(key);
            cursor = entity.state.parent;
        }

        let mut world = Matrix4x4::identity();
        let mut step = Matrix4x4::identity();
        for key in chain.iter().rev() {
            Matrix4x4::multiply_into(&mut step, &world, &self.entities[*key].transform().matrix());
            world = step;
        }
        world
    }

    /// Attach a component to an entity already in the scene and initialize
    /// it immediately
    ///
    /// Components attached before insertion initialize during
    /// [`add_entity`](Scene::add_entity) instead. A stale key is a no-op.
    pub fn add_component(
        &mut self,
        key: EntityKey,
        component: Box<dyn Component>,
        ctx: &mut EngineContext,
        device: &mut dyn GraphicsDevice,
    ) {
        let Some(entity) = self.entities.get_mut(key) else {
            log::warn!("add_component on a stale entity key");
            return;
        };
        entity.components.push(component);
        if let Some(component) = entity.components.last_mut() {
            component.initialize(&mut entity.state, ctx, device);
        }
    }

    /// Entity lookup; `None` for a stale key
    pub fn get(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    /// Mutable entity lookup; `None` for a stale key
    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    /// First entity with the given name, in insertion order
    ///
    /// Names are not unique; this is a convenience and not a reliable way
    /// to address a specific entity. Hold the [`EntityKey`] instead.
    pub fn find_by_name(&self, name: &str) -> Option<EntityKey> {
        self.order
            .iter()
            .copied()
            .find(|key| self.entities[*key].name() == name)
    }

    /// Mark an entity as the one under player control
    ///
    /// A stale key clears the marker.
    pub fn set_controllable(&mut self, key: EntityKey) {
        if self.entities.contains_key(key) {
            self.controllable = Some(key);
        } else {
            log::warn!("controllable key is stale, clearing");
            self.controllable = None;
        }
    }

    /// Key of the controllable entity, if one is set and still alive
    pub fn controllable(&self) -> Option<EntityKey> {
        self.controllable
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use approx::assert_relative_eq;

    use crate::config::EngineConfig;
    use crate::foundation::math::Vector3;
    use crate::gpu::RecordingDevice;
    use crate::render::{geometry, Renderable};
    use crate::scene::components::{RenderBinding, RigidBody};

    /// Component that appends lifecycle markers to a shared journal
    struct Probe {
        label: &'static str,
        journal: Rc<RefCell<Vec<String>>>,
    }

    impl Probe {
        fn boxed(label: &'static str, journal: &Rc<RefCell<Vec<String>>>) -> Box<Self> {
            Box::new(Self {
                label,
                journal: Rc::clone(journal),
            })
        }

        fn record(&self, event: &str) {
            self.journal.borrow_mut().push(format!("{}:{event}", self.label));
        }
    }

    impl Component for Probe {
        fn initialize(
            &mut self,
            _state: &mut EntityState,
            _ctx: &mut EngineContext,
            _device: &mut dyn GraphicsDevice,
        ) {
            self.record("init");
        }

        fn update(
            &mut self,
            _delta: f32,
            _state: &mut EntityState,
            _ctx: &mut EngineContext,
            _device: &mut dyn GraphicsDevice,
        ) {
            self.record("update");
        }

        fn teardown(
            &mut self,
            _state: &mut EntityState,
            _ctx: &mut EngineContext,
            _device: &mut dyn GraphicsDevice,
        ) {
            self.record("teardown");
        }
    }

    fn fixture() -> (RecordingDevice, EngineContext, Scene) {
        (
            RecordingDevice::new(),
            EngineContext::new(&EngineConfig::default()),
            Scene::new(),
        )
    }

    #[test]
    fn test_components_initialize_in_attachment_order() {
        let (mut device, mut ctx, mut scene) = fixture();
        let journal = Rc::new(RefCell::new(Vec::new()));

        let entity = Entity::new("probe")
            .with_component(Probe::boxed("a", &journal))
            .with_component(Probe::boxed("b", &journal));
        scene.add_entity(entity, &mut ctx, &mut device);

        assert_eq!(*journal.borrow(), vec!["a:init", "b:init"]);
    }

    #[test]
    fn test_teardown_runs_in_reverse_attachment_order() {
        let (mut device, mut ctx, mut scene) = fixture();
        let journal = Rc::new(RefCell::new(Vec::new()));

        let entity = Entity::new("probe")
            .with_component(Probe::boxed("a", &journal))
            .with_component(Probe::boxed("b", &journal));
        let key = scene.add_entity(entity, &mut ctx, &mut device);

        journal.borrow_mut().clear();
        scene.remove_entity(key, &mut ctx, &mut device);

        assert_eq!(*journal.borrow(), vec!["b:teardown", "a:teardown"]);
        assert_eq!(scene.entity_count(), 0);

        // Stale key is a no-op
        scene.remove_entity(key, &mut ctx, &mut device);
    }

    #[test]
    fn test_update_walks_entities_in_insertion_order() {
        let (mut device, mut ctx, mut scene) = fixture();
        let journal = Rc::new(RefCell::new(Vec::new()));

        scene.add_entity(
            Entity::new("first").with_component(Probe::boxed("first", &journal)),
            &mut ctx,
            &mut device,
        );
        scene.add_entity(
            Entity::new("second").with_component(Probe::boxed("second", &journal)),
            &mut ctx,
            &mut device,
        );

        journal.borrow_mut().clear();
        scene.update(0.016, &mut ctx, &mut device);

        assert_eq!(*journal.borrow(), vec!["first:update", "second:update"]);
    }

    #[test]
    fn test_late_component_initializes_immediately() {
        let (mut device, mut ctx, mut scene) = fixture();
        let journal = Rc::new(RefCell::new(Vec::new()));
        let key = scene.add_entity(Entity::new("probe"), &mut ctx, &mut device);

        scene.add_component(key, Probe::boxed("late", &journal), &mut ctx, &mut device);
        assert_eq!(*journal.borrow(), vec!["late:init"]);
        assert_eq!(scene.get(key).unwrap().component_count(), 1);
    }

    #[test]
    fn test_find_by_name_is_first_match() {
        let (mut device, mut ctx, mut scene) = fixture();
        let first = scene.add_entity(Entity::new("twin"), &mut ctx, &mut device);
        let _second = scene.add_entity(Entity::new("twin"), &mut ctx, &mut device);

        assert_eq!(scene.find_by_name("twin"), Some(first));
        assert_eq!(scene.find_by_name("nobody"), None);
    }

    #[test]
    fn test_controllable_cleared_on_removal() {
        let (mut device, mut ctx, mut scene) = fixture();
        let key = scene.add_entity(Entity::new("ship"), &mut ctx, &mut device);
        scene.set_controllable(key);
        assert_eq!(scene.controllable(), Some(key));

        scene.remove_entity(key, &mut ctx, &mut device);
        assert_eq!(scene.controllable(), None);

        scene.set_controllable(key);
        assert_eq!(scene.controllable(), None);
    }

    #[test]
    fn test_child_world_position_follows_parent() {
        let (mut device, mut ctx, mut scene) = fixture();
        let mut parent = Entity::new("rig");
        parent.transform_mut().position = Vector3::new(5.0, 0.0, 0.0);
        let parent = scene.add_entity(parent, &mut ctx, &mut device);

        let mut child = Entity::new("arm");
        child.transform_mut().position = Vector3::new(1.0, 2.0, 0.0);
        let child = scene.add_entity(child, &mut ctx, &mut device);
        scene.set_parent(child, Some(parent));

        let position = scene.world_position(child).unwrap();
        assert_relative_eq!(position.x, 6.0);
        assert_relative_eq!(position.y, 2.0);

        // Detaching puts the child back at its own transform
        scene.set_parent(child, None);
        assert_relative_eq!(scene.world_position(child).unwrap().x, 1.0);
    }

    #[test]
    fn test_render_binding_pushes_parented_world_matrix() {
        let (mut device, mut ctx, mut scene) = fixture();
        ctx.pipelines
            .add_pipeline(&mut device, "lit", "vs", "fs")
            .unwrap();

        let mut parent = Entity::new("rig");
        parent.transform_mut().position = Vector3::new(5.0, 0.0, 0.0);
        let parent = scene.add_entity(parent, &mut ctx, &mut device);

        let renderable = Rc::new(RefCell::new(Renderable::new("arm", geometry::cube(1.0))));
        let mut child = Entity::new("arm")
            .with_renderable(Rc::clone(&renderable))
            .with_component(Box::new(RenderBinding::new("lit")));
        child.transform_mut().position = Vector3::new(1.0, 0.0, 0.0);
        let child = scene.add_entity(child, &mut ctx, &mut device);
        scene.set_parent(child, Some(parent));

        scene.update(0.016, &mut ctx, &mut device);
        assert_relative_eq!(renderable.borrow().model_matrix().m[12], 6.0);
    }

    #[test]
    fn test_set_parent_rejects_cycles_and_stale_keys() {
        let (mut device, mut ctx, mut scene) = fixture();
        let a = scene.add_entity(Entity::new("a"), &mut ctx, &mut device);
        let b = scene.add_entity(Entity::new("b"), &mut ctx, &mut device);

        scene.set_parent(a, Some(b));
        scene.set_parent(b, Some(a));
        assert_eq!(scene.get(a).unwrap().parent(), Some(b));
        assert_eq!(scene.get(b).unwrap().parent(), None);

        scene.remove_entity(b, &mut ctx, &mut device);
        scene.set_parent(a, Some(b));
        assert_eq!(scene.get(a).unwrap().parent(), Some(b));

        // Orphaned chains truncate at the missing parent
        assert_relative_eq!(scene.world_position(a).unwrap().x, 0.0);
    }

    #[test]
    fn test_remove_entity_deregisters_directly_loaded_renderable() {
        let (mut device, mut ctx, mut scene) = fixture();
        ctx.pipelines
            .add_pipeline(&mut device, "lit", "vs", "fs")
            .unwrap();

        let renderable = Rc::new(RefCell::new(Renderable::new("orb", geometry::cube(1.0))));
        ctx.pipelines
            .load_to_pipeline(&mut device, "lit", Rc::clone(&renderable))
            .unwrap();
        let key = scene.add_entity(
            Entity::new("orb").with_renderable(Rc::clone(&renderable)),
            &mut ctx,
            &mut device,
        );

        scene.remove_entity(key, &mut ctx, &mut device);
        assert!(!renderable.borrow().is_loaded());
        assert_eq!(device.outstanding_buffers(), 0);
        assert_eq!(
            ctx.pipelines.get_pipeline("lit").unwrap().renderable_count(),
            0
        );
    }

    #[test]
    fn test_rigid_body_integrates_and_registers_shape() {
        let (mut device, mut ctx, mut scene) = fixture();
        let entity = Entity::new("mover")
            .with_component(Box::new(RigidBody::new(Vector3::new(2.0, 0.0, 0.0), 0.0)));
        let key = scene.add_entity(entity, &mut ctx, &mut device);
        assert_eq!(ctx.collision.shape_count(), 1);

        scene.update(0.5, &mut ctx, &mut device);
        let position = scene.get(key).unwrap().transform().position;
        assert_relative_eq!(position.x, 1.0);

        scene.remove_entity(key, &mut ctx, &mut device);
        assert_eq!(ctx.collision.shape_count(), 0);
    }

    #[test]
    fn test_rigid_body_drag_decays_velocity() {
        let (mut device, mut ctx, mut scene) = fixture();
        let entity = Entity::new("coaster")
            .with_component(Box::new(RigidBody::new(Vector3::new(1.0, 0.0, 0.0), 0.5)));
        let key = scene.add_entity(entity, &mut ctx, &mut device);

        scene.update(1.0, &mut ctx, &mut device);
        scene.update(1.0, &mut ctx, &mut device);

        // First step moves at full speed, second at half
        let position = scene.get(key).unwrap().transform().position;
        assert_relative_eq!(position.x, 1.5);
    }

    #[test]
    fn test_render_binding_full_lifecycle() {
        let (mut device, mut ctx, mut scene) = fixture();
        ctx.pipelines
            .add_pipeline(&mut device, "lit", "vs", "fs")
            .unwrap();

        let renderable = Rc::new(RefCell::new(Renderable::new("cube", geometry::cube(1.0))));
        let entity = Entity::new("crate")
            .with_renderable(Rc::clone(&renderable))
            .with_component(Box::new(RenderBinding::new("lit")));
        let key = scene.add_entity(entity, &mut ctx, &mut device);
        assert!(renderable.borrow().is_loaded());

        scene.get_mut(key).unwrap().transform_mut().position = Vector3::new(3.0, 0.0, 0.0);
        scene.update(0.016, &mut ctx, &mut device);
        // Translation lands in the fourth column of the pushed model matrix
        assert_relative_eq!(renderable.borrow().model_matrix().m[12], 3.0);

        scene.remove_entity(key, &mut ctx, &mut device);
        assert!(!renderable.borrow().is_loaded());
        assert_eq!(device.outstanding_buffers(), 0);
    }

    #[test]
    fn test_render_binding_without_renderable_is_inert() {
        let (mut device, mut ctx, mut scene) = fixture();
        ctx.pipelines
            .add_pipeline(&mut device, "lit", "vs", "fs")
            .unwrap();

        let entity = Entity::new("ghost").with_component(Box::new(RenderBinding::new("lit")));
        let key = scene.add_entity(entity, &mut ctx, &mut device);

        scene.update(0.016, &mut ctx, &mut device);
        scene.remove_entity(key, &mut ctx, &mut device);
        assert_eq!(device.outstanding_buffers(), 0);
    }
}
