//! Scene and physics configuration

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};
use crate::foundation::math::Vec3;

/// Tunables for the rigid-body simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Length of one simulation sub-step in seconds
    pub fixed_time_step: f32,
    /// Maximum sub-steps per `step` call; 0 runs a single variable-length step
    pub max_sub_steps: u32,
    /// Distance around each shape within which speculative contacts are reported
    pub contact_margin: f32,
    /// Bounciness applied along contact normals (0 = inelastic)
    pub restitution: f32,
    /// Fraction of linear velocity removed per second
    pub linear_damping: f32,
    /// Fraction of the remaining penetration resolved positionally per sub-step
    pub position_correction: f32,
    /// Penetration depth tolerated before positional correction kicks in
    pub penetration_slop: f32,
    /// Seconds a body must stay below the sleep threshold before it sleeps
    pub deactivation_time: f32,
    /// Linear speed below which a body counts as resting
    pub sleep_linear_threshold: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_time_step: 1.0 / 60.0,
            max_sub_steps: 1,
            contact_margin: 0.04,
            restitution: 0.0,
            linear_damping: 0.0,
            position_correction: 0.8,
            penetration_slop: 0.005,
            deactivation_time: 2.0,
            sleep_linear_threshold: 0.8,
        }
    }
}

impl PhysicsConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_time_step.is_finite() && self.fixed_time_step > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "fixed_time_step must be positive, got {}",
                self.fixed_time_step
            )));
        }
        if !(self.contact_margin.is_finite() && self.contact_margin >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "contact_margin must be non-negative, got {}",
                self.contact_margin
            )));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(ConfigError::Invalid(format!(
                "restitution must be within 0..=1, got {}",
                self.restitution
            )));
        }
        if !(0.0..=1.0).contains(&self.position_correction) {
            return Err(ConfigError::Invalid(format!(
                "position_correction must be within 0..=1, got {}",
                self.position_correction
            )));
        }
        if self.linear_damping < 0.0 || self.penetration_slop < 0.0 || self.deactivation_time < 0.0 {
            return Err(ConfigError::Invalid(
                "damping, slop and deactivation time must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scene-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Gravity applied to every body whose gravity flag is set
    pub gravity: Vec3,
    /// Whether the scene starts paused
    pub start_paused: bool,
    /// Simulation tunables
    pub physics: PhysicsConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::zeros(),
            start_paused: false,
            physics: PhysicsConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Builder pattern: set gravity
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    /// Builder pattern: set physics tunables
    pub fn with_physics(mut self, physics: PhysicsConfig) -> Self {
        self.physics = physics;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gravity.iter().all(|c| c.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "gravity must be finite, got {:?}",
                self.gravity
            )));
        }
        self.physics.validate()
    }
}

impl Config for SceneConfig {}
