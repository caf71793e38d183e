use super::types::{ButtonState, InputEvent, MouseButton, TouchEvent, TouchPhase};

/// A single-finger page gesture in logical px.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Gesture {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up { x: f32, y: f32, duration_ms: u64 },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Source {
    Mouse,
    Touch(u64),
}

#[derive(Debug, Copy, Clone)]
struct Active {
    source: Source,
    started_ms: u64,
    last: (f32, f32),
}

/// Follows the left mouse button or the first touch point, ignoring every
/// other pointer until that one lifts.
#[derive(Debug, Default)]
pub struct GestureTracker {
    active: Option<Active>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Feeds one event observed at `at_ms` on any monotonic clock.
    pub fn process(&mut self, ev: &InputEvent, at_ms: u64) -> Option<Gesture> {
        match *ev {
            InputEvent::PointerButton { button: MouseButton::Left, state, x, y } => match state {
                ButtonState::Pressed => self.begin(Source::Mouse, x, y, at_ms),
                ButtonState::Released => self.end(Source::Mouse, x, y, at_ms),
            },
            InputEvent::PointerMoved { x, y } => self.track(Source::Mouse, x, y),
            InputEvent::Touch(TouchEvent { id, phase, x, y }) => {
                let source = Source::Touch(id);
                match phase {
                    TouchPhase::Started => self.begin(source, x, y, at_ms),
                    TouchPhase::Moved => self.track(source, x, y),
                    TouchPhase::Ended | TouchPhase::Cancelled => self.end(source, x, y, at_ms),
                }
            }
            // A lost window still owes the page a release.
            InputEvent::Focused(false) => {
                let active = self.active?;
                let (x, y) = active.last;
                self.end(active.source, x, y, at_ms)
            }
            _ => None,
        }
    }

    fn begin(&mut self, source: Source, x: f32, y: f32, at_ms: u64) -> Option<Gesture> {
        if self.active.is_some() {
            return None;
        }
        self.active = Some(Active { source, started_ms: at_ms, last: (x, y) });
        Some(Gesture::Down { x, y })
    }

    fn track(&mut self, source: Source, x: f32, y: f32) -> Option<Gesture> {
        let active = self.active.as_mut().filter(|a| a.source == source)?;
        active.last = (x, y);
        Some(Gesture::Move { x, y })
    }

    fn end(&mut self, source: Source, x: f32, y: f32, at_ms: u64) -> Option<Gesture> {
        let active = self.active.filter(|a| a.source == source)?;
        self.active = None;
        Some(Gesture::Up { x, y, duration_ms: at_ms.saturating_sub(active.started_ms) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse(state: ButtonState, x: f32) -> InputEvent {
        InputEvent::PointerButton { button: MouseButton::Left, state, x, y: 300.0 }
    }

    fn touch(id: u64, phase: TouchPhase, x: f32) -> InputEvent {
        InputEvent::Touch(TouchEvent { id, phase, x, y: 300.0 })
    }

    // ── mouse ─────────────────────────────────────────────────────────────

    #[test]
    fn mouse_drag_produces_down_move_up() {
        let mut t = GestureTracker::new();
        assert_eq!(t.process(&mouse(ButtonState::Pressed, 790.0), 1_000), Some(Gesture::Down { x: 790.0, y: 300.0 }));
        assert_eq!(
            t.process(&InputEvent::PointerMoved { x: 400.0, y: 300.0 }, 1_100),
            Some(Gesture::Move { x: 400.0, y: 300.0 })
        );
        assert_eq!(
            t.process(&mouse(ButtonState::Released, 400.0), 1_200),
            Some(Gesture::Up { x: 400.0, y: 300.0, duration_ms: 200 })
        );
        assert!(!t.is_active());
    }

    #[test]
    fn hover_and_other_buttons_are_ignored() {
        let mut t = GestureTracker::new();
        assert_eq!(t.process(&InputEvent::PointerMoved { x: 1.0, y: 1.0 }, 0), None);
        let right = InputEvent::PointerButton { button: MouseButton::Right, state: ButtonState::Pressed, x: 0.0, y: 0.0 };
        assert_eq!(t.process(&right, 0), None);
        assert!(!t.is_active());
    }

    // ── touch ─────────────────────────────────────────────────────────────

    #[test]
    fn second_finger_is_ignored() {
        let mut t = GestureTracker::new();
        assert!(matches!(t.process(&touch(1, TouchPhase::Started, 700.0), 0), Some(Gesture::Down { .. })));
        assert_eq!(t.process(&touch(2, TouchPhase::Started, 100.0), 10), None);
        assert_eq!(t.process(&touch(2, TouchPhase::Moved, 120.0), 20), None);
        assert_eq!(t.process(&touch(2, TouchPhase::Ended, 120.0), 30), None);
        assert!(matches!(t.process(&touch(1, TouchPhase::Moved, 650.0), 40), Some(Gesture::Move { .. })));
        assert!(matches!(
            t.process(&touch(1, TouchPhase::Cancelled, 650.0), 50),
            Some(Gesture::Up { duration_ms: 50, .. })
        ));
    }

    #[test]
    fn mouse_cannot_hijack_a_touch() {
        let mut t = GestureTracker::new();
        t.process(&touch(9, TouchPhase::Started, 700.0), 0);
        assert_eq!(t.process(&mouse(ButtonState::Pressed, 10.0), 5), None);
        assert_eq!(t.process(&mouse(ButtonState::Released, 10.0), 6), None);
        assert!(t.is_active());
    }

    #[test]
    fn focus_loss_releases_at_last_position() {
        let mut t = GestureTracker::new();
        t.process(&mouse(ButtonState::Pressed, 790.0), 100);
        t.process(&InputEvent::PointerMoved { x: 500.0, y: 310.0 }, 150);
        assert_eq!(
            t.process(&InputEvent::Focused(false), 400),
            Some(Gesture::Up { x: 500.0, y: 310.0, duration_ms: 300 })
        );
        assert_eq!(t.process(&InputEvent::Focused(false), 500), None);
    }
}
