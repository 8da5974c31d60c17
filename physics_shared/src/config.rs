//! Configuration system.
//!
//! Loads service configuration from JSON strings (file IO left to the app).

use serde::{Deserialize, Serialize};

use crate::engine::WorldSettings;
use crate::math::Vec3;

/// Root configuration for the physics service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Directory the step-measure dump is written to on clean shutdown.
    #[serde(default = "default_measures_dir")]
    pub measures_dir: String,
    /// Gravity acceleration on the z-axis, world units per second^2.
    #[serde(default = "default_gravity_z")]
    pub gravity_z: f64,
    /// Fixed simulation timestep, seconds.
    #[serde(default = "default_timestep")]
    pub timestep: f64,
    /// Radius of spawned spheres, world units.
    #[serde(default = "default_sphere_radius")]
    pub sphere_radius: f64,
    /// Velocity retained after a floor bounce, 0..=1.
    #[serde(default = "default_restitution")]
    pub restitution: f64,
}

fn default_measures_dir() -> String {
    "measures".to_string()
}

fn default_gravity_z() -> f64 {
    -980.0
}

fn default_timestep() -> f64 {
    1.0 / 60.0
}

fn default_sphere_radius() -> f64 {
    50.0
}

fn default_restitution() -> f64 {
    1.0
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            measures_dir: default_measures_dir(),
            gravity_z: default_gravity_z(),
            timestep: default_timestep(),
            sphere_radius: default_sphere_radius(),
            restitution: default_restitution(),
        }
    }
}

impl ServiceConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Engine tuning derived from this config.
    pub fn world_settings(&self) -> WorldSettings {
        WorldSettings {
            gravity: Vec3::new(0.0, 0.0, self.gravity_z),
            timestep: self.timestep,
            sphere_radius: self.sphere_radius,
            restitution: self.restitution,
        }
    }
}
