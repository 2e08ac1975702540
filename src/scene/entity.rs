//! Scene entities

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::new_key_type;

use crate::foundation::math::{Matrix4x4, Transform};
use crate::render::Renderable;
use crate::scene::Component;

new_key_type! {
    /// Stable handle to an entity in a [`crate::scene::Scene`]
    ///
    /// Keys are the authoritative entity identity. Names are free-form
    /// labels and may repeat.
    pub struct EntityKey;
}

/// The part of an entity components operate on
///
/// Split from the component list so a component can mutate its owning
/// entity's transform and renderable while the list itself is being walked.
pub struct EntityState {
    /// Key assigned at insertion; null until the entity joins a scene
    pub key: EntityKey,
    /// Free-form label, not unique
    pub name: String,
    /// Placement relative to the parent, or the world when there is none
    pub transform: Transform,
    /// Drawable shared with the pipeline that renders it
    pub renderable: Option<Rc<RefCell<Renderable>>>,
    /// Parent entity; set through [`crate::scene::Scene::set_parent`]
    pub(crate) parent: Option<EntityKey>,
    /// Composed world matrix of the parent chain, refreshed by the scene
    /// every update before components run
    pub(crate) parent_world: Matrix4x4,
}

impl EntityState {
    /// World matrix: the parent chain's composed matrix, then the local
    /// transform
    ///
    /// Reflects the parent chain as of the current scene update; an entity
    /// with no parent composes against the identity.
    pub fn world_matrix(&self) -> Matrix4x4 {
        let mut out = Matrix4x4::identity();
        Matrix4x4::multiply_into(&mut out, &self.parent_world, &self.transform.matrix());
        out
    }
}

/// A named scene object with a transform, components, and an optional
/// drawable
pub struct Entity {
    pub(crate) state: EntityState,
    pub(crate) components: Vec<Box<dyn Component>>,
}

impl Entity {
    /// Create an entity with an identity transform and no components
    pub fn new(name: &str) -> Self {
        Self {
            state: EntityState {
                key: EntityKey::default(),
                name: name.to_string(),
                transform: Transform::identity(),
                renderable: None,
                parent: None,
                parent_world: Matrix4x4::identity(),
            },
            components: Vec::new(),
        }
    }

    /// Entity label
    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// Key assigned by the owning scene
    pub fn key(&self) -> EntityKey {
        self.state.key
    }

    /// Parent entity, if one has been assigned
    pub fn parent(&self) -> Option<EntityKey> {
        self.state.parent
    }

    /// World placement
    pub fn transform(&self) -> &Transform {
        &self.state.transform
    }

    /// Mutable world placement
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.state.transform
    }

    /// Attached drawable, if any
    pub fn renderable(&self) -> Option<&Rc<RefCell<Renderable>>> {
        self.state.renderable.as_ref()
    }

    /// Attach a drawable
    pub fn set_renderable(&mut self, renderable: Rc<RefCell<Renderable>>) {
        self.state.renderable = Some(renderable);
    }

    /// Builder form of [`set_renderable`](Entity::set_renderable)
    #[must_use]
    pub fn with_renderable(mut self, renderable: Rc<RefCell<Renderable>>) -> Self {
        self.state.renderable = Some(renderable);
        self
    }

    /// Append a component; attachment order is update order
    ///
    /// For an entity already in a scene, use
    /// [`Scene::add_component`](crate::scene::Scene::add_component) so the
    /// component initializes right away.
    pub fn add_component(&mut self, component: Box<dyn Component>) {
        self.components.push(component);
    }

    /// Builder form of [`add_component`](Entity::add_component)
    #[must_use]
    pub fn with_component(mut self, component: Box<dyn Component>) -> Self {
        self.components.push(component);
        self
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}
