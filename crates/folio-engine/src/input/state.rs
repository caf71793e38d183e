use std::collections::{HashMap, HashSet};

use super::frame::InputFrame;
use super::types::{ButtonState, InputEvent, Key, KeyState, Modifiers, MouseButton, TouchEvent, TouchPhase};

/// What is currently held down in one window.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,
    pub focused: bool,
    /// Logical px; `None` once the cursor leaves the window.
    pub pointer_pos: Option<(f32, f32)>,
    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
    /// Active touch points by id.
    pub touches: HashMap<u64, (f32, f32)>,
}

impl InputState {
    /// Folds `ev` into the held state and records it in `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match ev {
            InputEvent::ModifiersChanged(m) => self.modifiers = m,

            InputEvent::Focused(focused) => {
                self.focused = focused;
                if !focused {
                    // Releases never arrive for presses held across a focus loss.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                    self.touches.clear();
                }
            }

            InputEvent::PointerMoved { x, y } => self.pointer_pos = Some((x, y)),
            InputEvent::PointerLeft => self.pointer_pos = None,

            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    if self.keys_down.insert(key) {
                        frame.keys_pressed.insert(key);
                    }
                }
                KeyState::Released => {
                    if self.keys_down.remove(&key) {
                        frame.keys_released.insert(key);
                    }
                }
            },

            InputEvent::PointerButton { button, state, x, y } => {
                self.pointer_pos = Some((x, y));
                match state {
                    ButtonState::Pressed => {
                        if self.buttons_down.insert(button) {
                            frame.buttons_pressed.insert(button);
                        }
                    }
                    ButtonState::Released => {
                        if self.buttons_down.remove(&button) {
                            frame.buttons_released.insert(button);
                        }
                    }
                }
            }

            InputEvent::Touch(TouchEvent { id, phase, x, y }) => match phase {
                TouchPhase::Started | TouchPhase::Moved => {
                    self.touches.insert(id, (x, y));
                }
                TouchPhase::Ended | TouchPhase::Cancelled => {
                    self.touches.remove(&id);
                }
            },
        }

        frame.events.push(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(button: MouseButton) -> InputEvent {
        InputEvent::PointerButton { button, state: ButtonState::Pressed, x: 10.0, y: 20.0 }
    }

    #[test]
    fn button_press_is_recorded_once() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, press(MouseButton::Left));
        state.apply_event(&mut frame, press(MouseButton::Left));

        assert!(state.button_down(MouseButton::Left));
        assert_eq!(frame.buttons_pressed.len(), 1);
        assert_eq!(frame.events.len(), 2);
        assert_eq!(state.pointer_pos, Some((10.0, 20.0)));
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, press(MouseButton::Left));
        state.apply_event(&mut frame, InputEvent::Key { key: Key::Space, state: KeyState::Pressed, repeat: false });
        state.apply_event(
            &mut frame,
            InputEvent::Touch(TouchEvent { id: 3, phase: TouchPhase::Started, x: 1.0, y: 1.0 }),
        );

        state.apply_event(&mut frame, InputEvent::Focused(false));
        assert!(state.buttons_down.is_empty());
        assert!(state.keys_down.is_empty());
        assert!(state.touches.is_empty());
    }

    #[test]
    fn touches_track_by_id() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        let touch = |id, phase, x| InputEvent::Touch(TouchEvent { id, phase, x, y: 0.0 });

        state.apply_event(&mut frame, touch(1, TouchPhase::Started, 5.0));
        state.apply_event(&mut frame, touch(2, TouchPhase::Started, 6.0));
        state.apply_event(&mut frame, touch(1, TouchPhase::Moved, 7.0));
        assert_eq!(state.touches.get(&1), Some(&(7.0, 0.0)));

        state.apply_event(&mut frame, touch(1, TouchPhase::Ended, 7.0));
        assert_eq!(state.touches.len(), 1);
    }

    #[test]
    fn clear_resets_frame_only() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, InputEvent::Key { key: Key::ArrowLeft, state: KeyState::Pressed, repeat: false });
        assert!(frame.key_pressed(Key::ArrowLeft));

        frame.clear();
        assert!(!frame.key_pressed(Key::ArrowLeft));
        assert!(state.key_down(Key::ArrowLeft));
    }
}
