//! Built-in components

mod render_binding;
mod rigid_body;

pub use render_binding::RenderBinding;
pub use rigid_body::RigidBody;
