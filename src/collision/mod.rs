//! O(n²) collision detection
//!
//! Every registered shape is tested against every other registered shape
//! each update, which is adequate for small scenes and a known scaling
//! limit for large ones. Shapes reference their owning entity by key and
//! read the entity's transform at test time, so moving an entity moves its
//! shape with no extra bookkeeping.

use slotmap::{new_key_type, SlotMap};

use crate::config::CollisionConfig;
use crate::foundation::math::Vector3;
use crate::scene::{EntityKey, Scene};

new_key_type! {
    /// Stable handle to a registered collision shape
    pub struct ShapeKey;
}

/// Geometry variants a shape can take
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    /// Axis-aligned box centered on the entity position
    Aabb {
        /// Full extent along x
        width: f32,
        /// Full extent along y
        height: f32,
        /// Full extent along z
        depth: f32,
    },
    /// Sphere centered on the entity position
    Sphere {
        /// Sphere radius
        radius: f32,
    },
}

/// A collision shape bound to an entity
///
/// The shape never copies the entity transform; min/max or center are
/// derived from the entity's current world position on every test.
#[derive(Debug, Clone, Copy)]
pub struct CollisionShape {
    /// Owning entity
    pub entity: EntityKey,
    /// Shape geometry, mutable after registration
    pub kind: ShapeKind,
}

impl CollisionShape {
    /// Bind a shape to an entity
    pub fn new(entity: EntityKey, kind: ShapeKind) -> Self {
        Self { entity, kind }
    }
}

/// One detected overlap, reported from the perspective of `first`
///
/// Pairs are tested in both orders, so an overlap between two entities
/// produces two events with `first` and `second` swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    /// Entity the test was run for
    pub first: EntityKey,
    /// Entity it overlaps
    pub second: EntityKey,
}

/// Registers shapes and runs the all-pairs overlap test
pub struct CollisionManager {
    shapes: SlotMap<ShapeKey, CollisionShape>,
    order: Vec<ShapeKey>,
    default_extents: [f32; 3],
}

impl CollisionManager {
    /// Create a manager from configuration
    pub fn new(config: &CollisionConfig) -> Self {
        Self {
            shapes: SlotMap::with_key(),
            order: Vec::new(),
            default_extents: config.default_extents,
        }
    }

    /// Number of registered shapes
    pub fn shape_count(&self) -> usize {
        self.order.len()
    }

    /// Register a shape
    pub fn add_shape(&mut self, shape: CollisionShape) -> ShapeKey {
        let key = self.shapes.insert(shape);
        self.order.push(key);
        key
    }

    /// Register an AABB with the configured default extents
    pub fn add_default_shape(&mut self, entity: EntityKey) -> ShapeKey {
        let [width, height, depth] = self.default_extents;
        self.add_shape(CollisionShape::new(
            entity,
            ShapeKind::Aabb {
                width,
                height,
                depth,
            },
        ))
    }

    /// Remove a shape; a stale key is a no-op
    pub fn remove_shape(&mut self, key: ShapeKey) {
        if self.shapes.remove(key).is_some() {
            self.order.retain(|k| *k != key);
        }
    }

    /// Shape lookup for post-registration extent changes
    pub fn get_shape_mut(&mut self, key: ShapeKey) -> Option<&mut CollisionShape> {
        self.shapes.get_mut(key)
    }

    /// Test every ordered shape pair against the scene's current transforms
    ///
    /// Each unordered pair is tested twice, so two overlapping entities
    /// yield two events. Shapes whose entity has left the scene are
    /// skipped.
    pub fn update(&self, scene: &Scene) -> Vec<CollisionEvent> {
        let mut events = Vec::new();
        for (i, first_key) in self.order.iter().enumerate() {
            for (j, second_key) in self.order.iter().enumerate() {
                if i == j {
                    continue;
                }
                let first = self.shapes[*first_key];
                let second = self.shapes[*second_key];
                let (Some(first_pos), Some(second_pos)) = (
                    scene.world_position(first.entity),
                    scene.world_position(second.entity),
                ) else {
                    continue;
                };
                if overlaps(&first.kind, &first_pos, &second.kind, &second_pos) {
                    log::debug!(
                        "collision: {:?} overlaps {:?}",
                        first.entity,
                        second.entity
                    );
                    events.push(CollisionEvent {
                        first: first.entity,
                        second: second.entity,
                    });
                }
            }
        }
        events
    }
}

/// Closed-interval overlap test; touching shapes collide
fn overlaps(a: &ShapeKind, a_pos: &Vector3, b: &ShapeKind, b_pos: &Vector3) -> bool {
    match (a, b) {
        (
            ShapeKind::Aabb {
                width: aw,
                height: ah,
                depth: ad,
            },
            ShapeKind::Aabb {
                width: bw,
                height: bh,
                depth: bd,
            },
        ) => {
            axis_overlaps(a_pos.x, *aw, b_pos.x, *bw)
                && axis_overlaps(a_pos.y, *ah, b_pos.y, *bh)
                && axis_overlaps(a_pos.z, *ad, b_pos.z, *bd)
        }
        (ShapeKind::Sphere { radius: ar }, ShapeKind::Sphere { radius: br }) => {
            b_pos.sub(a_pos).length() <= ar + br
        }
        _ => {
            log::debug!("unrecognized shape pairing {a:?} / {b:?}, reporting no collision");
            false
        }
    }
}

fn axis_overlaps(a_center: f32, a_extent: f32, b_center: f32, b_extent: f32) -> bool {
    let a_half = a_extent * 0.5;
    let b_half = b_extent * 0.5;
    a_center - a_half <= b_center + b_half && b_center - b_half <= a_center + a_half
}
