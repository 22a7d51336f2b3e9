use winit::event::KeyEvent;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Debounced per-tick movement intent. This is the only input the
/// simulation core consumes; everything device-shaped stays in
/// [`InputState`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntentFlags {
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub run: bool,
}

impl IntentFlags {
    pub fn any_movement(&self) -> bool {
        self.move_forward || self.move_backward || self.move_left || self.move_right
    }

    pub fn forward_or_backward(&self) -> bool {
        self.move_forward || self.move_backward
    }
}

/// Keyboard-to-intent translation layer.
///
/// Held keys map to intent booleans; discrete actions (jump, interact) are
/// latched on the key-down edge and consumed once via `take_*`, so a held
/// key cannot re-fire them through key repeat.
pub struct InputState {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    run: bool,
    jump_requested: bool,
    interact_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            forward: false,
            backward: false,
            left: false,
            right: false,
            run: false,
            jump_requested: false,
            interact_requested: false,
        }
    }

    pub fn handle_key_event(&mut self, event: &KeyEvent) {
        let pressed = event.state.is_pressed();
        if let PhysicalKey::Code(code) = event.physical_key {
            match code {
                KeyCode::KeyW | KeyCode::ArrowUp => self.forward = pressed,
                KeyCode::KeyS | KeyCode::ArrowDown => self.backward = pressed,
                KeyCode::KeyA | KeyCode::ArrowLeft => self.left = pressed,
                KeyCode::KeyD | KeyCode::ArrowRight => self.right = pressed,
                KeyCode::ShiftLeft => self.run = pressed,
                KeyCode::Space => {
                    // Key-down edge only; filters key-repeat noise.
                    if pressed && !event.repeat {
                        self.jump_requested = true;
                    }
                }
                KeyCode::KeyE => {
                    if pressed && !event.repeat {
                        self.interact_requested = true;
                    }
                }
                _ => {}
            }
        }
    }

    pub fn intent(&self) -> IntentFlags {
        IntentFlags {
            move_forward: self.forward,
            move_backward: self.backward,
            move_left: self.left,
            move_right: self.right,
            run: self.run,
        }
    }

    pub fn take_jump(&mut self) -> bool {
        let v = self.jump_requested;
        self.jump_requested = false;
        v
    }

    pub fn take_interact(&mut self) -> bool {
        let v = self.interact_requested;
        self.interact_requested = false;
        v
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_reflects_held_movement_keys() {
        let mut input = InputState::new();
        input.forward = true;
        input.left = true;
        let intent = input.intent();
        assert!(intent.move_forward && intent.move_left);
        assert!(!intent.move_backward && !intent.move_right && !intent.run);
        assert!(intent.any_movement());
    }

    #[test]
    fn one_shot_requests_clear_on_take() {
        let mut input = InputState::new();
        input.jump_requested = true;
        input.interact_requested = true;
        assert!(input.take_jump(), "latched jump should be observable once");
        assert!(!input.take_jump(), "second take should see a cleared latch");
        assert!(input.take_interact());
        assert!(!input.take_interact());
    }

    #[test]
    fn idle_intent_reports_no_movement() {
        let input = InputState::new();
        assert!(!input.intent().any_movement());
        assert!(!input.intent().forward_or_backward());
    }
}
