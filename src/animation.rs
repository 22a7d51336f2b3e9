use log::debug;

use crate::config::ClipSet;

/// Fade duration used when a one-shot clip (jump, victory) hands control
/// back to the stashed locomotion state.
const ONE_SHOT_RETURN_FADE: f32 = 1.3;
/// The idle clip always plays slowed down; the rig's idle loop is authored
/// too fast for a standing character.
const IDLE_TIME_SCALE: f32 = 0.2;

/// Closed set of blendable states. Keeping this a plain enum (rather than
/// name-keyed lookup) lets every transition site match exhaustively.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionState {
    Idle,
    Walking,
    Running,
    Jump,
    Victory,
}

impl ActionState {
    pub const ALL: [ActionState; 5] = [
        ActionState::Idle,
        ActionState::Walking,
        ActionState::Running,
        ActionState::Jump,
        ActionState::Victory,
    ];

    fn index(self) -> usize {
        match self {
            ActionState::Idle => 0,
            ActionState::Walking => 1,
            ActionState::Running => 2,
            ActionState::Jump => 3,
            ActionState::Victory => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActionState::Idle => "IDLE",
            ActionState::Walking => "WALKING",
            ActionState::Running => "RUNNING",
            ActionState::Jump => "JUMP",
            ActionState::Victory => "VICTORY",
        }
    }

    /// States the agent cycles through while moving on the ground.
    pub fn is_locomotion(self) -> bool {
        matches!(
            self,
            ActionState::Idle | ActionState::Walking | ActionState::Running
        )
    }

    /// States that play once and then return to the stashed locomotion
    /// state instead of looping.
    pub fn is_one_shot(self) -> bool {
        matches!(self, ActionState::Jump | ActionState::Victory)
    }
}

/// Per-state blend bookkeeping. `weight` is the instantaneous blend
/// weight, `time` the clip-local playback position.
#[derive(Clone, Copy, Debug)]
pub struct ClipAction {
    pub weight: f32,
    pub time_scale: f32,
    pub time: f32,
    pub clip_duration: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationEvent {
    /// A clip finished a full playback cycle this tick.
    LoopFinished(ActionState),
}

#[derive(Clone, Copy, Debug)]
struct Crossfade {
    /// `None` fades everything out, leaving no current state.
    target: Option<ActionState>,
    duration: f32,
    elapsed: f32,
    /// Weights of all five actions at the instant the fade started, so an
    /// interrupted fade blends from wherever it actually was.
    start_weights: [f32; 5],
}

/// Weighted cross-fade blend machine over the five named states.
///
/// Transition policy: every requested cross-fade executes immediately;
/// there is no deferral to a loop boundary. One-shot return transitions
/// key off the queued loop events instead.
pub struct AnimationMachine {
    actions: [ClipAction; 5],
    current: Option<ActionState>,
    fade: Option<Crossfade>,
    /// Locomotion state to restore after a one-shot clip completes.
    return_to: Option<ActionState>,
    events: Vec<AnimationEvent>,
}

impl AnimationMachine {
    pub fn new(clips: &ClipSet) -> Self {
        let durations = [
            clips.idle,
            clips.walking,
            clips.running,
            clips.jump,
            clips.victory,
        ];
        let mut actions = [ClipAction {
            weight: 0.0,
            time_scale: 1.0,
            time: 0.0,
            clip_duration: 1.0,
        }; 5];
        for (action, duration) in actions.iter_mut().zip(durations) {
            action.clip_duration = duration.max(1e-3);
        }
        actions[ActionState::Idle.index()].weight = 1.0;
        actions[ActionState::Idle.index()].time_scale = IDLE_TIME_SCALE;
        Self {
            actions,
            current: Some(ActionState::Idle),
            fade: None,
            return_to: None,
            events: Vec::new(),
        }
    }

    pub fn current_state(&self) -> Option<ActionState> {
        self.current
    }

    pub fn action(&self, state: ActionState) -> &ClipAction {
        &self.actions[state.index()]
    }

    pub fn weight(&self, state: ActionState) -> f32 {
        self.actions[state.index()].weight
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Begin a cross-fade to `to` over `duration` seconds (`None` = pure
    /// fade-out). A request for the already-current state is a no-op.
    pub fn request_transition(&mut self, to: Option<ActionState>, duration: f32) {
        if to == self.current {
            return;
        }
        debug!(
            "animation transition {} -> {} over {duration:.2}s",
            self.current.map_or("NONE", ActionState::label),
            to.map_or("NONE", ActionState::label),
        );

        if let Some(dest) = to {
            if dest.is_one_shot() {
                // Stash where to come back to; nested one-shots keep the
                // original locomotion target.
                if let Some(cur) = self.current {
                    if cur.is_locomotion() {
                        self.return_to = Some(cur);
                    }
                }
            }
            self.actions[dest.index()].time = 0.0;
        }

        let start_weights = [
            self.actions[0].weight,
            self.actions[1].weight,
            self.actions[2].weight,
            self.actions[3].weight,
            self.actions[4].weight,
        ];
        self.fade = Some(Crossfade {
            target: to,
            duration,
            elapsed: 0.0,
            start_weights,
        });
        self.current = to;
        if duration <= 0.0 {
            self.apply_fade(1.0);
            self.fade = None;
        }
    }

    /// Advance the blend and every audible clip by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if let Some(mut fade) = self.fade.take() {
            fade.elapsed += dt;
            let t = if fade.duration <= 0.0 {
                1.0
            } else {
                (fade.elapsed / fade.duration).min(1.0)
            };
            self.fade = Some(fade);
            self.apply_fade(t);
            if t >= 1.0 {
                self.fade = None;
            }
        }

        let mut finished_one_shot = None;
        for state in ActionState::ALL {
            let action = &mut self.actions[state.index()];
            if action.weight <= 0.0 {
                continue;
            }
            let before = action.time;
            action.time += dt * action.time_scale;
            if action.time < action.clip_duration {
                continue;
            }
            if state.is_one_shot() {
                action.time = action.clip_duration;
                // A finished clip stays clamped at its end while it fades
                // out; only the completing tick fires the event.
                if before >= action.clip_duration {
                    continue;
                }
                if self.current == Some(state) {
                    finished_one_shot = Some(state);
                }
            } else {
                action.time %= action.clip_duration;
            }
            self.events.push(AnimationEvent::LoopFinished(state));
        }

        if let Some(state) = finished_one_shot {
            let back = self.return_to.unwrap_or(ActionState::Idle);
            debug!("one-shot {} finished, returning to {}", state.label(), back.label());
            self.request_transition(Some(back), ONE_SHOT_RETURN_FADE);
        }
    }

    /// Events accumulated since the last drain, in emission order.
    pub fn drain_events(&mut self) -> Vec<AnimationEvent> {
        std::mem::take(&mut self.events)
    }

    fn apply_fade(&mut self, t: f32) {
        let Some(fade) = self.fade else {
            return;
        };
        for state in ActionState::ALL {
            let idx = state.index();
            let goal = if fade.target == Some(state) { 1.0 } else { 0.0 };
            let start = fade.start_weights[idx];
            self.actions[idx].weight = start + (goal - start) * t;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> AnimationMachine {
        AnimationMachine::new(&ClipSet::default())
    }

    fn step(m: &mut AnimationMachine, total: f32, dt: f32) {
        let steps = (total / dt).round() as usize;
        for _ in 0..steps {
            m.update(dt);
        }
    }

    #[test]
    fn starts_idle_at_full_weight_and_slowed_time_scale() {
        let m = machine();
        assert_eq!(m.current_state(), Some(ActionState::Idle));
        assert_eq!(m.weight(ActionState::Idle), 1.0);
        assert_eq!(m.action(ActionState::Idle).time_scale, IDLE_TIME_SCALE);
        for state in [ActionState::Walking, ActionState::Running] {
            assert_eq!(m.weight(state), 0.0, "{} should start unweighted", state.label());
        }
    }

    #[test]
    fn crossfade_weights_converge_within_duration() {
        let mut m = machine();
        m.request_transition(Some(ActionState::Walking), 0.6);
        assert_eq!(m.current_state(), Some(ActionState::Walking));
        step(&mut m, 0.3, 0.016);
        let mid = m.weight(ActionState::Walking);
        assert!(
            mid > 0.2 && mid < 0.8,
            "mid-fade walking weight should be partial, got {mid}"
        );
        step(&mut m, 0.4, 0.016);
        assert!(
            (m.weight(ActionState::Walking) - 1.0).abs() < 1e-3,
            "destination should settle at weight 1, got {}",
            m.weight(ActionState::Walking)
        );
        assert!(
            m.weight(ActionState::Idle) < 1e-3,
            "source should settle at weight 0, got {}",
            m.weight(ActionState::Idle)
        );
        assert!(!m.is_fading(), "completed fade should be cleared");
    }

    #[test]
    fn zero_duration_transition_applies_instantly() {
        let mut m = machine();
        m.request_transition(Some(ActionState::Jump), 0.0);
        assert_eq!(m.weight(ActionState::Jump), 1.0);
        assert_eq!(m.weight(ActionState::Idle), 0.0);
        assert!(!m.is_fading());
    }

    #[test]
    fn transition_to_current_state_is_a_no_op() {
        let mut m = machine();
        m.request_transition(Some(ActionState::Idle), 0.6);
        assert!(!m.is_fading(), "re-requesting the current state should do nothing");
        assert_eq!(m.weight(ActionState::Idle), 1.0);
    }

    #[test]
    fn interrupted_fade_blends_from_partial_weights() {
        let mut m = machine();
        m.request_transition(Some(ActionState::Walking), 0.6);
        step(&mut m, 0.3, 0.016);
        let partial = m.weight(ActionState::Walking);
        m.request_transition(Some(ActionState::Running), 0.2);
        m.update(1e-6);
        assert!(
            (m.weight(ActionState::Walking) - partial).abs() < 0.05,
            "interrupting fade should start from the partial weight {partial}, got {}",
            m.weight(ActionState::Walking)
        );
        step(&mut m, 0.25, 0.016);
        assert!(
            (m.weight(ActionState::Running) - 1.0).abs() < 1e-3,
            "running should win the interrupted blend"
        );
    }

    #[test]
    fn pure_fade_out_leaves_no_current_state() {
        let mut m = machine();
        m.request_transition(None, 0.5);
        assert_eq!(m.current_state(), None);
        step(&mut m, 0.6, 0.016);
        for state in ActionState::ALL {
            assert!(
                m.weight(state) < 1e-3,
                "{} should fade to zero",
                state.label()
            );
        }
    }

    #[test]
    fn one_shot_jump_returns_to_previous_locomotion_state() {
        let mut m = machine();
        m.request_transition(Some(ActionState::Walking), 0.0);
        m.request_transition(Some(ActionState::Jump), 0.0);
        assert_eq!(m.current_state(), Some(ActionState::Jump));

        // Jump clip is 1.0 s at time-scale 1; run it to completion.
        step(&mut m, 1.1, 0.016);
        assert_eq!(
            m.current_state(),
            Some(ActionState::Walking),
            "jump should hand back to the stashed locomotion state"
        );

        // Return fade is 1.3 s.
        step(&mut m, 1.4, 0.016);
        assert!(
            (m.weight(ActionState::Walking) - 1.0).abs() < 1e-3,
            "walking should settle at full weight after the return fade"
        );
        assert!(m.weight(ActionState::Jump) < 1e-3);
    }

    #[test]
    fn one_shot_from_idle_returns_to_idle() {
        let mut m = machine();
        m.request_transition(Some(ActionState::Victory), 0.2);
        step(&mut m, ClipSet::default().victory + 0.1, 0.016);
        assert_eq!(m.current_state(), Some(ActionState::Idle));
    }

    #[test]
    fn looping_clip_emits_loop_finished_events() {
        let mut m = machine();
        m.request_transition(Some(ActionState::Walking), 0.0);
        m.drain_events();
        // Walking clip is 1.0 s; run a little past one cycle.
        step(&mut m, 1.05, 0.016);
        let events = m.drain_events();
        assert!(
            events.contains(&AnimationEvent::LoopFinished(ActionState::Walking)),
            "expected a walking loop event, got {events:?}"
        );
    }

    #[test]
    fn idle_time_scale_survives_round_trips() {
        let mut m = machine();
        m.request_transition(Some(ActionState::Running), 0.2);
        step(&mut m, 0.3, 0.016);
        m.request_transition(Some(ActionState::Idle), 1.2);
        step(&mut m, 1.3, 0.016);
        assert_eq!(m.current_state(), Some(ActionState::Idle));
        assert!(
            (m.weight(ActionState::Idle) - 1.0).abs() < 1e-3,
            "idle should settle at weight 1"
        );
        assert_eq!(
            m.action(ActionState::Idle).time_scale,
            IDLE_TIME_SCALE,
            "idle must keep its slowed time-scale"
        );
    }
}
