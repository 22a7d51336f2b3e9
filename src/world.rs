use cgmath::{Quaternion, Vector3};
use log::{debug, warn};

use crate::animation::{ActionState, AnimationMachine};
use crate::collision::StaticCollisionVolume;
use crate::config::{ClipSet, WorldConfig};
use crate::events::WorldEvent;
use crate::input::IntentFlags;
use crate::player::Player;
use crate::spatial::vec3_is_finite;
use crate::triggers::{Inventory, TriggerDetector, TriggerId, TriggerRegistry, TriggerVolume};

const FADE_TO_IDLE: f32 = 1.2;
const FADE_TO_LOCOMOTION: f32 = 0.6;
const FADE_RUN_TOGGLE: f32 = 0.2;
const FADE_RUN_RELEASE: f32 = 0.3;
const FADE_VICTORY_IN: f32 = 0.2;

/// Owner of the per-tick simulation: locomotion, animation blending and
/// trigger detection, evaluated in that fixed order once per frame.
///
/// Collaborators feed it intents and a camera orientation, call `tick`,
/// then read the committed transform and drain the event queue. Nothing
/// here suspends or blocks; the whole tick is one synchronous unit.
pub struct World {
    config: WorldConfig,
    player: Player,
    animation: AnimationMachine,
    registry: TriggerRegistry,
    detector: TriggerDetector,
    inventory: Inventory,
    volume: Option<StaticCollisionVolume>,
    intent: IntentFlags,
    jump_queued: bool,
    camera_orientation: Quaternion<f32>,
    events: Vec<WorldEvent>,
}

impl World {
    pub fn new(config: WorldConfig, clips: ClipSet, spawn: Vector3<f32>) -> Self {
        Self {
            inventory: Inventory::new(config.inventory_capacity),
            config,
            player: Player::new(spawn),
            animation: AnimationMachine::new(&clips),
            registry: TriggerRegistry::new(),
            detector: TriggerDetector::new(),
            volume: None,
            intent: IntentFlags::default(),
            jump_queued: false,
            camera_orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            events: Vec::new(),
        }
    }

    /// Hand over the precomputed collision volume. Until this is called the
    /// integrator runs in free-fall fallback.
    pub fn set_collision_volume(&mut self, volume: StaticCollisionVolume) {
        self.volume = Some(volume);
    }

    pub fn register_trigger(&mut self, volume: TriggerVolume) {
        self.registry.register(volume);
    }

    // -- command surface -----------------------------------------------------

    pub fn set_intent(&mut self, intent: IntentFlags) {
        self.intent = intent;
    }

    pub fn set_camera_orientation(&mut self, orientation: Quaternion<f32>) {
        self.camera_orientation = orientation;
    }

    /// Queue a jump for the next tick; whether it launches is decided there
    /// against the grounded flag.
    pub fn request_jump(&mut self) {
        self.jump_queued = true;
    }

    /// One simulation step. Malformed `dt` skips the tick entirely and
    /// retains the previous state; a single corrupt frame must not
    /// desynchronize the avatar.
    pub fn tick(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            warn!("rejecting tick with invalid dt={dt}");
            return;
        }
        if !quat_is_finite(self.camera_orientation) {
            warn!("rejecting tick with non-finite camera orientation");
            return;
        }
        let dt = dt.min(self.config.max_tick_delta);

        let intent = self.intent;
        let jump_requested = std::mem::take(&mut self.jump_queued);
        let jump_executed = self.player.update(
            &intent,
            jump_requested,
            self.camera_orientation,
            dt,
            self.volume.as_ref(),
            &self.config,
        );

        self.drive_animation(&intent, jump_executed);
        self.animation.update(dt);
        // Clip loop notifications only feed the machine's own one-shot
        // returns; they are not surfaced to collaborators.
        self.animation.drain_events();

        self.detector.scan(
            &self.player.bounds(),
            &self.registry,
            intent.any_movement(),
            &mut self.events,
        );
    }

    /// Discrete activate action. Honored only while a trigger is entered;
    /// anything else is a silent no-op.
    pub fn request_interact(&mut self) {
        if let Some(id) = self.detector.active_collectible() {
            self.collect(id);
        }
        if let Some(id) = self.detector.active_npc() {
            debug!("npc trigger {id} activated");
            self.events.push(WorldEvent::NpcActivated(id));
        }
    }

    /// External inventory action: release a collected item back into the
    /// world, resetting its trigger latch.
    pub fn drop_item(&mut self, id: TriggerId) {
        if !self.inventory.remove(id) {
            return;
        }
        if let Some(volume) = self.registry.get_mut(id) {
            volume.collected = false;
        }
        self.events.push(WorldEvent::ItemDropped(id));
    }

    /// Events queued since the last drain, in emission order.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    // -- read-only surface ---------------------------------------------------

    pub fn position(&self) -> Vector3<f32> {
        self.player.position
    }

    pub fn orientation(&self) -> Quaternion<f32> {
        self.player.orientation
    }

    pub fn is_grounded(&self) -> bool {
        self.player.is_grounded
    }

    pub fn current_animation_state(&self) -> Option<ActionState> {
        self.animation.current_state()
    }

    pub fn animation(&self) -> &AnimationMachine {
        &self.animation
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    // -----------------------------------------------------------------------

    fn collect(&mut self, id: TriggerId) {
        let Some(volume) = self.registry.get_mut(id) else {
            return;
        };
        if volume.collected {
            return;
        }
        if !self.inventory.try_insert(id) {
            // Full bag: rejected silently, latch untouched.
            return;
        }
        volume.collected = true;
        self.events.push(WorldEvent::ItemCollected(id));
        self.events.push(WorldEvent::VictoryAnimationRequested);
        self.animation
            .request_transition(Some(ActionState::Victory), FADE_VICTORY_IN);
    }

    /// Locomotion-driven transition table. One-shot states run to
    /// completion on their own; the table only steers the locomotion
    /// cycle.
    fn drive_animation(&mut self, intent: &IntentFlags, jump_executed: bool) {
        if jump_executed {
            self.animation
                .request_transition(Some(ActionState::Jump), 0.0);
            return;
        }
        let current = self.animation.current_state();
        if matches!(current, Some(s) if s.is_one_shot()) {
            return;
        }

        if !intent.any_movement() {
            if matches!(
                current,
                Some(ActionState::Walking) | Some(ActionState::Running)
            ) {
                self.animation
                    .request_transition(Some(ActionState::Idle), FADE_TO_IDLE);
            }
            return;
        }

        if intent.forward_or_backward() {
            let wanted = if intent.run {
                ActionState::Running
            } else {
                ActionState::Walking
            };
            match current {
                Some(ActionState::Idle) | None => {
                    self.animation
                        .request_transition(Some(wanted), FADE_TO_LOCOMOTION);
                }
                Some(ActionState::Walking) if intent.run => {
                    // Run toggled while already moving: snappier fade.
                    self.animation
                        .request_transition(Some(ActionState::Running), FADE_RUN_TOGGLE);
                }
                Some(ActionState::Running) if !intent.run => {
                    self.animation
                        .request_transition(Some(ActionState::Walking), FADE_RUN_RELEASE);
                }
                _ => {}
            }
        }
    }
}

fn quat_is_finite(q: Quaternion<f32>) -> bool {
    q.s.is_finite() && vec3_is_finite(q.v)
}
