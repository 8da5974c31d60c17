//! Shared state the handlers operate on.

use physics_shared::body::BodyRegistry;
use physics_shared::config::ServiceConfig;
use physics_shared::engine::{BallisticEngine, PhysicsEngine};
use physics_shared::measures::StepMeasures;

/// Everything a command handler may touch: the engine facade handle, the
/// live-body registry, the step-measure log, and the service config.
///
/// Passed `&mut` into each handler call, so ownership is explicit and a test
/// can swap in any `PhysicsEngine` implementation. There is no global engine
/// pointer anywhere.
pub struct ServiceContext {
    pub config: ServiceConfig,
    /// `None` until the first `Init`; body commands answer with a textual
    /// resource error until then.
    pub engine: Option<Box<dyn PhysicsEngine>>,
    pub registry: BodyRegistry,
    pub measures: StepMeasures,
}

impl ServiceContext {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            engine: None,
            registry: BodyRegistry::new(),
            measures: StepMeasures::new(),
        }
    }

    /// Drops any running world and builds a fresh one from config. The
    /// registry is reset; the measure log intentionally survives re-inits.
    pub fn reset_world(&mut self) {
        self.engine = Some(Box::new(BallisticEngine::new(self.config.world_settings())));
        self.registry.clear();
    }
}
