use cgmath::{InnerSpace, Quaternion, Rad, Rotation, Rotation3, Vector3, Zero};
use log::trace;
use std::f32::consts::PI;

use crate::collision::StaticCollisionVolume;
use crate::config::WorldConfig;
use crate::input::IntentFlags;
use crate::spatial::{Aabb3, Capsule};

pub const PLAYER_CAPSULE_HEIGHT: f32 = 1.5;
pub const PLAYER_CAPSULE_RADIUS: f32 = 0.35;
/// How far below the capsule the grounded probe reaches when the capsule
/// itself is resting exactly on the surface with zero penetration.
const GROUND_PROBE_DISTANCE: f32 = 0.02;

/// The player-controlled agent: locomotion integrator state.
///
/// Owns the capsule collider, velocity and transform. `position` is the
/// capsule's lower segment point and is the single source of truth other
/// components read. `is_grounded` is recomputed from this tick's contact
/// only; a tick without a contact always reports airborne.
pub struct Player {
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
    pub velocity: Vector3<f32>,
    collider: Capsule,
    pub is_grounded: bool,
}

impl Player {
    pub fn new(spawn: Vector3<f32>) -> Self {
        Self {
            position: spawn,
            orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            velocity: Vector3::zero(),
            collider: Capsule::new(
                spawn,
                spawn + Vector3::new(0.0, PLAYER_CAPSULE_HEIGHT, 0.0),
                PLAYER_CAPSULE_RADIUS,
            ),
            is_grounded: false,
        }
    }

    pub fn collider(&self) -> &Capsule {
        &self.collider
    }

    /// Facing direction projected onto the horizontal plane and
    /// re-normalized, so pitch in the orientation never slows walking.
    pub fn forward(&self) -> Vector3<f32> {
        let dir = self.orientation.rotate_vector(-Vector3::unit_z());
        let planar = Vector3::new(dir.x, 0.0, dir.z);
        if planar.magnitude2() <= 1e-8 {
            return Vector3::zero();
        }
        planar.normalize()
    }

    /// Footprint bounds used by the trigger detector.
    pub fn bounds(&self) -> Aabb3 {
        self.collider.bounds()
    }

    /// One locomotion step. `dt` must already be validated and clamped at
    /// the system boundary. Returns whether a requested jump actually
    /// launched (grounded at the instant of input).
    pub fn update(
        &mut self,
        intent: &IntentFlags,
        jump_requested: bool,
        camera_orientation: Quaternion<f32>,
        dt: f32,
        volume: Option<&StaticCollisionVolume>,
        cfg: &WorldConfig,
    ) -> bool {
        let accel = if intent.run {
            cfg.run_accel
        } else {
            cfg.walk_accel
        };

        if intent.move_forward {
            self.velocity += self.forward() * accel * dt;
            // Lag toward the camera's facing rather than snapping; the
            // bounded step is the feel parameter, not a correctness one.
            self.orientation = rotate_towards(
                self.orientation,
                camera_orientation,
                cfg.rotation_lerp_rate * dt,
            );
        }
        if intent.move_backward {
            self.velocity -= self.forward() * accel * dt;
            let away = camera_orientation * Quaternion::from_angle_y(Rad(PI));
            self.orientation =
                rotate_towards(self.orientation, away, cfg.rotation_lerp_rate * dt);
        }

        let turn_scale = if intent.move_backward {
            cfg.backward_turn_scale
        } else {
            1.0
        };
        if intent.move_left {
            self.orientation =
                self.orientation * Quaternion::from_angle_y(Rad(cfg.turn_rate * turn_scale * dt));
        }
        if intent.move_right {
            self.orientation =
                self.orientation * Quaternion::from_angle_y(Rad(-cfg.turn_rate * turn_scale * dt));
        }

        let jump_executed = jump_requested && self.is_grounded;
        if jump_executed {
            self.velocity.y = cfg.jump_speed;
            self.is_grounded = false;
        } else if jump_requested {
            trace!("jump request ignored while airborne");
        }

        if self.is_grounded {
            // Ground friction as exponential damping toward rest.
            let damping = (-3.0 * dt).exp() - 1.0;
            self.velocity += self.velocity * damping;
        } else {
            self.velocity.y -= cfg.gravity * dt;
        }

        self.collider.translate(self.velocity * dt);
        self.resolve_collisions(volume);
        self.position = self.collider.start;
        jump_executed
    }

    fn resolve_collisions(&mut self, volume: Option<&StaticCollisionVolume>) {
        self.is_grounded = false;
        // No collision data yet: free-fall rather than getting stuck.
        let Some(volume) = volume else {
            return;
        };
        if let Some(contact) = volume.capsule_contact(&self.collider) {
            self.is_grounded = contact.normal.y > 0.0;
            if !self.is_grounded {
                // Slide along walls and ceilings.
                self.velocity -= contact.normal * contact.normal.dot(self.velocity);
            }
            self.collider.translate(contact.normal * contact.depth);
        } else {
            // Resting exactly on a surface produces zero penetration; a
            // short downward probe keeps the grounded flag stable instead
            // of flickering between ticks.
            let mut probe = self.collider;
            probe.translate(Vector3::new(0.0, -GROUND_PROBE_DISTANCE, 0.0));
            if let Some(contact) = volume.capsule_contact(&probe) {
                if contact.normal.y > 0.0 {
                    self.is_grounded = true;
                }
            }
        }
    }
}

/// Step `from` toward `to` by at most `max_step` radians along the
/// shortest arc.
fn rotate_towards(
    from: Quaternion<f32>,
    to: Quaternion<f32>,
    max_step: f32,
) -> Quaternion<f32> {
    let mut to = to;
    let mut dot = from.dot(to);
    if dot < 0.0 {
        to = to * -1.0;
        dot = -dot;
    }
    let angle = 2.0 * dot.clamp(-1.0, 1.0).acos();
    if angle <= max_step || angle < 1e-5 {
        return to;
    }
    from.slerp(to, max_step / angle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.016;

    fn settle_on_floor(volume: &StaticCollisionVolume) -> Player {
        let mut player = Player::new(Vector3::new(0.0, 0.5, 0.0));
        let cfg = WorldConfig::default();
        let idle = IntentFlags::default();
        for _ in 0..120 {
            player.update(&idle, false, player.orientation, DT, Some(volume), &cfg);
        }
        assert!(player.is_grounded, "player should have landed on the floor");
        player
    }

    #[test]
    fn falls_and_lands_grounded_on_flat_floor() {
        let volume = StaticCollisionVolume::flat_floor(0.0, 50.0);
        let player = settle_on_floor(&volume);
        assert!(
            (player.position.y - PLAYER_CAPSULE_RADIUS).abs() < 1e-2,
            "feet should rest one radius above the floor, got y={}",
            player.position.y
        );
        assert!(
            player.velocity.y.abs() < 0.5,
            "vertical velocity should be absorbed on landing, got {}",
            player.velocity.y
        );
    }

    #[test]
    fn no_contact_means_airborne_never_sticky() {
        let volume = StaticCollisionVolume::flat_floor(0.0, 50.0);
        let mut player = settle_on_floor(&volume);
        // Teleport the collider far above the floor by jumping hard.
        player.velocity = Vector3::new(0.0, 20.0, 0.0);
        player.is_grounded = false;
        let cfg = WorldConfig::default();
        player.update(
            &IntentFlags::default(),
            false,
            player.orientation,
            DT,
            Some(&volume),
            &cfg,
        );
        assert!(
            !player.is_grounded,
            "grounded must not persist through a contact-free tick"
        );
    }

    #[test]
    fn jump_only_launches_while_grounded() {
        let volume = StaticCollisionVolume::flat_floor(0.0, 50.0);
        let mut player = settle_on_floor(&volume);
        let cfg = WorldConfig::default();
        let idle = IntentFlags::default();

        let executed = player.update(&idle, true, player.orientation, DT, Some(&volume), &cfg);
        assert!(executed, "grounded jump should launch");
        assert!(!player.is_grounded, "launching clears the grounded flag");
        assert!(
            player.velocity.y > cfg.jump_speed - cfg.gravity * DT - 1e-3,
            "vertical velocity should be near launch speed, got {}",
            player.velocity.y
        );

        let executed = player.update(&idle, true, player.orientation, DT, Some(&volume), &cfg);
        assert!(!executed, "mid-air jump request must be ignored");
    }

    #[test]
    fn forward_intent_displaces_along_facing() {
        let volume = StaticCollisionVolume::flat_floor(0.0, 500.0);
        let mut player = settle_on_floor(&volume);
        let cfg = WorldConfig::default();
        let intent = IntentFlags {
            move_forward: true,
            ..IntentFlags::default()
        };
        // Identity orientation faces -Z.
        for _ in 0..62 {
            player.update(&intent, false, player.orientation, DT, Some(&volume), &cfg);
        }
        assert!(
            player.position.z < -0.5,
            "one second of walking should displace forward, got z={}",
            player.position.z
        );
        assert!(
            player.position.x.abs() < 1e-3,
            "straight walk should not drift sideways, got x={}",
            player.position.x
        );
        assert!(player.is_grounded, "walking on the floor stays grounded");
    }

    #[test]
    fn resting_player_does_not_drift() {
        let volume = StaticCollisionVolume::flat_floor(0.0, 50.0);
        let mut player = settle_on_floor(&volume);
        let before = player.position;
        let cfg = WorldConfig::default();
        for _ in 0..30 {
            player.update(
                &IntentFlags::default(),
                false,
                player.orientation,
                DT,
                Some(&volume),
                &cfg,
            );
        }
        let drift = (player.position - before).magnitude();
        assert!(
            drift < 1e-2,
            "agent at rest should stay put, drifted {drift}"
        );
    }

    #[test]
    fn wall_contact_removes_normal_velocity_component() {
        // Floorless world, only a wall at z = 0 facing -Z.
        let wall = StaticCollisionVolume::from_triangles([
            [
                Vector3::new(-10.0, -10.0, 0.0),
                Vector3::new(10.0, -10.0, 0.0),
                Vector3::new(-10.0, 10.0, 0.0),
            ],
            [
                Vector3::new(10.0, -10.0, 0.0),
                Vector3::new(10.0, 10.0, 0.0),
                Vector3::new(-10.0, 10.0, 0.0),
            ],
        ]);
        let mut player = Player::new(Vector3::new(0.0, 0.0, -0.36));
        player.velocity = Vector3::new(2.0, 0.0, 5.0);
        let cfg = WorldConfig::default();
        player.update(
            &IntentFlags::default(),
            false,
            player.orientation,
            DT,
            Some(&wall),
            &cfg,
        );
        assert!(
            !player.is_grounded,
            "a vertical wall is not a floor contact"
        );
        assert!(
            player.velocity.z <= 1e-3,
            "velocity into the wall should be cancelled, got vz={}",
            player.velocity.z
        );
        assert!(
            player.velocity.x > 1.0,
            "tangential velocity should survive the slide, got vx={}",
            player.velocity.x
        );
    }

    #[test]
    fn missing_volume_falls_back_to_free_fall() {
        let mut player = Player::new(Vector3::new(0.0, 10.0, 0.0));
        let cfg = WorldConfig::default();
        for _ in 0..10 {
            player.update(
                &IntentFlags::default(),
                false,
                player.orientation,
                DT,
                None,
                &cfg,
            );
        }
        assert!(!player.is_grounded);
        assert!(
            player.position.y < 10.0 && player.velocity.y < 0.0,
            "without collision data the agent free-falls, got y={} vy={}",
            player.position.y,
            player.velocity.y
        );
    }

    #[test]
    fn left_intent_turns_without_translating() {
        let volume = StaticCollisionVolume::flat_floor(0.0, 50.0);
        let mut player = settle_on_floor(&volume);
        let before_pos = player.position;
        let before_forward = player.forward();
        let cfg = WorldConfig::default();
        let intent = IntentFlags {
            move_left: true,
            ..IntentFlags::default()
        };
        for _ in 0..30 {
            player.update(&intent, false, player.orientation, DT, Some(&volume), &cfg);
        }
        assert!(
            (player.position - before_pos).magnitude() < 1e-2,
            "turning in place should not translate"
        );
        let turned = player.forward().dot(before_forward);
        assert!(
            turned < 0.95,
            "facing should have rotated, dot={turned}"
        );
    }
}
