//! Shared engine services

use crate::collision::CollisionManager;
use crate::config::EngineConfig;
use crate::messaging::MessageBus;
use crate::render::PipelineManager;

/// The engine services components and systems share
///
/// Built once at startup from [`EngineConfig`] and passed by `&mut` to
/// whoever needs it; there is no global state.
pub struct EngineContext {
    /// All-pairs collision system
    pub collision: CollisionManager,
    /// Shader-batched draw pipelines
    pub pipelines: PipelineManager,
    /// Priority message bus
    pub bus: MessageBus,
}

impl EngineContext {
    /// Build the context from configuration
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            collision: CollisionManager::new(&config.collision),
            pipelines: PipelineManager::new(),
            bus: MessageBus::new(&config.messaging),
        }
    }
}
