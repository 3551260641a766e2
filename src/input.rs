use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::demo::DemoAction;

/// What a key press does.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Demo(DemoAction),
    PauseCamera,
    Quit,
}

/// Default key map.
pub const KEY_BINDINGS: &[(KeyCode, Command)] = &[
    (KeyCode::KeyB, Command::Demo(DemoAction::ToggleMotionBlur)),
    (KeyCode::KeyP, Command::Demo(DemoAction::ToggleParticleBlur)),
    (KeyCode::ArrowUp, Command::Demo(DemoAction::AdjustBlurStrength(0.5))),
    (KeyCode::ArrowDown, Command::Demo(DemoAction::AdjustBlurStrength(-0.5))),
    (KeyCode::ArrowRight, Command::Demo(DemoAction::AdjustBlurSamples(1))),
    (KeyCode::ArrowLeft, Command::Demo(DemoAction::AdjustBlurSamples(-1))),
    (KeyCode::KeyF, Command::Demo(DemoAction::ToggleFire)),
    (KeyCode::KeyR, Command::Demo(DemoAction::RestartFire)),
    (KeyCode::KeyM, Command::Demo(DemoAction::ToggleLightMarkers)),
    (KeyCode::Digit1, Command::Demo(DemoAction::ToggleLight(0))),
    (KeyCode::Digit2, Command::Demo(DemoAction::ToggleLight(1))),
    (KeyCode::Digit3, Command::Demo(DemoAction::ToggleLight(2))),
    (KeyCode::Digit4, Command::Demo(DemoAction::ToggleLight(3))),
    (KeyCode::KeyO, Command::Demo(DemoAction::ToggleOverlay)),
    (KeyCode::Tab, Command::Demo(DemoAction::CycleOverlay)),
    (KeyCode::KeyL, Command::Demo(DemoAction::ToggleWireframe)),
    (KeyCode::KeyN, Command::Demo(DemoAction::ToggleNormals)),
    (KeyCode::Backspace, Command::Demo(DemoAction::ResetAll)),
    (KeyCode::Space, Command::PauseCamera),
    (KeyCode::Escape, Command::Quit),
];

/// Turns keyboard events into commands, one per fresh press.
#[derive(Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: Vec<KeyCode>,
}

impl Input {
    /// Input with no keys held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a window event and update key state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if let PhysicalKey::Code(key) = event.physical_key {
                match event.state {
                    ElementState::Pressed => self.press(key),
                    ElementState::Released => self.release(key),
                }
            }
        }
    }

    /// Key repeat is ignored: a held key counts once.
    pub fn press(&mut self, key: KeyCode) {
        if self.keys_down.insert(key) {
            self.keys_pressed.push(key);
        }
    }

    /// Marks `key` as up so its next press counts again.
    pub fn release(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
    }

    /// Commands for every key pressed since the last call, in press order.
    pub fn drain_commands(&mut self) -> Vec<Command> {
        self.keys_pressed
            .drain(..)
            .filter_map(|key| {
                KEY_BINDINGS
                    .iter()
                    .find(|(bound, _)| *bound == key)
                    .map(|(_, command)| *command)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_key_fires_once() {
        let mut input = Input::new();
        input.press(KeyCode::KeyB);
        input.press(KeyCode::KeyB);

        assert_eq!(
            input.drain_commands(),
            vec![Command::Demo(DemoAction::ToggleMotionBlur)]
        );
        assert!(input.drain_commands().is_empty());
    }

    #[test]
    fn release_rearms_key() {
        let mut input = Input::new();
        input.press(KeyCode::KeyF);
        input.release(KeyCode::KeyF);
        input.press(KeyCode::KeyF);

        assert_eq!(input.drain_commands().len(), 2);
    }

    #[test]
    fn unbound_keys_are_dropped() {
        let mut input = Input::new();
        input.press(KeyCode::KeyZ);
        input.press(KeyCode::Escape);

        assert_eq!(input.drain_commands(), vec![Command::Quit]);
    }

    #[test]
    fn every_key_is_bound_once() {
        let keys: HashSet<KeyCode> = KEY_BINDINGS.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys.len(), KEY_BINDINGS.len());
    }
}
