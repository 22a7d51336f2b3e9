use serde::{Deserialize, Serialize};

/// Locomotion and gameplay tuning. Defaults carry the shipped feel; a
/// demo scenario may override them from JSON.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Downward acceleration while airborne, units/s^2.
    pub gravity: f32,
    /// Planar impulse while walking, units/s^2.
    pub walk_accel: f32,
    /// Planar impulse while running, units/s^2.
    pub run_accel: f32,
    /// Vertical launch speed applied on a grounded jump, units/s.
    pub jump_speed: f32,
    /// Yaw rate for the left/right intents, rad/s.
    pub turn_rate: f32,
    /// Turn-rate multiplier while moving backward.
    pub backward_turn_scale: f32,
    /// Bounded rotate-towards step for camera-facing alignment, rad/s.
    pub rotation_lerp_rate: f32,
    /// Upper bound on a single tick's delta, seconds. Frame hitches beyond
    /// this are clamped rather than integrated.
    pub max_tick_delta: f32,
    /// Maximum number of concurrently collected items.
    pub inventory_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: 30.0,
            walk_accel: 5.0,
            run_accel: 10.0,
            jump_speed: 8.0,
            turn_rate: 1.5,
            backward_turn_scale: 0.1,
            rotation_lerp_rate: 5.0,
            max_tick_delta: 0.1,
            inventory_capacity: 8,
        }
    }
}

/// Durations (seconds) of the bound animation clips, keyed by state.
/// These come from the loaded rig; the defaults match the demo character.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipSet {
    pub idle: f32,
    pub walking: f32,
    pub running: f32,
    pub jump: f32,
    pub victory: f32,
}

impl Default for ClipSet {
    fn default() -> Self {
        Self {
            idle: 3.0,
            walking: 1.0,
            running: 0.7,
            jump: 1.0,
            victory: 2.0,
        }
    }
}
