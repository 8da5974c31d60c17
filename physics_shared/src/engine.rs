//! Physics engine facade.
//!
//! The command layer never inspects engine internals; it marshals protocol
//! text into the small set of operations below and marshals the results back
//! into protocol text. Constructing an engine IS initializing a world — a
//! re-init drops the old instance and builds a fresh one.
//!
//! `BallisticEngine` is the built-in backend: fixed-timestep gravity
//! integration with a floor-plane bounce, enough to drive the service end to
//! end. Its numerical behavior is engine tuning, not a protocol concern, and
//! any other `PhysicsEngine` implementation (including a scripted mock) can
//! stand in for it.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::body::{ActorShape, BodyId};
use crate::math::Vec3;

/// Engine-level failures surfaced to the command layer as response text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("body with ID {0} already exists")]
    DuplicateBody(BodyId),
}

/// Everything the engine needs to create one body.
#[derive(Debug, Clone, Copy)]
pub struct BodySpawn {
    pub id: BodyId,
    pub shape: ActorShape,
    pub position: Vec3,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl BodySpawn {
    /// A body at rest at `position`.
    pub fn at_rest(id: BodyId, shape: ActorShape, position: Vec3) -> Self {
        Self {
            id,
            shape,
            position,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }
}

/// Per-body kinematics snapshot after a step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyState {
    pub position: Vec3,
    /// Euler angles, radians.
    pub rotation: Vec3,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

/// Narrow boundary to the simulation.
pub trait PhysicsEngine: Send {
    /// Creates a body. Duplicate IDs are an error; nothing is created then.
    fn add_body(&mut self, spawn: BodySpawn) -> Result<(), EngineError>;

    /// Destroys a body. Returns false when the ID was not present.
    fn remove_body(&mut self, id: BodyId) -> bool;

    /// Advances the simulation by exactly one fixed timestep and returns the
    /// kinematics of every body, in engine insertion order.
    fn step(&mut self) -> Vec<(BodyId, BodyState)>;
}

/// Tuning for the built-in backend.
#[derive(Debug, Clone, Copy)]
pub struct WorldSettings {
    /// Acceleration applied to dynamic bodies, world units per second^2.
    pub gravity: Vec3,
    /// Fixed simulation timestep, seconds.
    pub timestep: f64,
    /// Radius of spawned spheres, world units.
    pub sphere_radius: f64,
    /// Velocity retained after a floor bounce, 0..=1.
    pub restitution: f64,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            // Z-up gravity matching the game's world scale.
            gravity: Vec3::new(0.0, 0.0, -980.0),
            timestep: 1.0 / 60.0,
            sphere_radius: 50.0,
            restitution: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RigidBody {
    shape: ActorShape,
    state: BodyState,
}

/// Built-in fixed-timestep backend: ballistic integration plus a bounce on
/// the highest floor plane. Floors are static and never move.
#[derive(Debug)]
pub struct BallisticEngine {
    settings: WorldSettings,
    order: Vec<BodyId>,
    bodies: HashMap<BodyId, RigidBody>,
}

impl BallisticEngine {
    pub fn new(settings: WorldSettings) -> Self {
        Self {
            settings,
            order: Vec::new(),
            bodies: HashMap::new(),
        }
    }

    /// Top surface of the highest floor, if any floor exists.
    fn floor_top(&self) -> Option<f64> {
        self.order
            .iter()
            .filter_map(|id| self.bodies.get(id))
            .filter(|b| b.shape == ActorShape::Floor)
            .map(|b| b.state.position.z)
            .fold(None, |acc, z| Some(acc.map_or(z, |a: f64| a.max(z))))
    }
}

impl PhysicsEngine for BallisticEngine {
    fn add_body(&mut self, spawn: BodySpawn) -> Result<(), EngineError> {
        if self.bodies.contains_key(&spawn.id) {
            return Err(EngineError::DuplicateBody(spawn.id));
        }

        let state = BodyState {
            position: spawn.position,
            rotation: Vec3::ZERO,
            linear_velocity: spawn.linear_velocity,
            angular_velocity: spawn.angular_velocity,
        };
        self.bodies.insert(
            spawn.id,
            RigidBody {
                shape: spawn.shape,
                state,
            },
        );
        self.order.push(spawn.id);

        debug!(id = %spawn.id, shape = ?spawn.shape, "body created");
        Ok(())
    }

    fn remove_body(&mut self, id: BodyId) -> bool {
        if self.bodies.remove(&id).is_none() {
            return false;
        }
        self.order.retain(|known| *known != id);
        debug!(id = %id, "body destroyed");
        true
    }

    fn step(&mut self) -> Vec<(BodyId, BodyState)> {
        let dt = self.settings.timestep;
        let floor_top = self.floor_top();

        for id in &self.order {
            let body = self
                .bodies
                .get_mut(id)
                .expect("ordered id without a body entry");
            if body.shape == ActorShape::Floor {
                continue;
            }

            let state = &mut body.state;
            state.linear_velocity += self.settings.gravity.scaled(dt);
            state.position += state.linear_velocity.scaled(dt);
            state.rotation += state.angular_velocity.scaled(dt);

            // Resolve penetration against the highest floor plane.
            if let Some(top) = floor_top {
                let rest_height = top + self.settings.sphere_radius;
                if state.position.z < rest_height && state.linear_velocity.z < 0.0 {
                    state.position.z = rest_height;
                    state.linear_velocity.z =
                        -state.linear_velocity.z * self.settings.restitution;
                }
            }
        }

        self.order
            .iter()
            .map(|id| (*id, self.bodies[id].state))
            .collect()
    }
}
