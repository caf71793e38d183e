use std::fmt;

use super::layout::PageSide;

/// Terminal animation a released gesture settles into.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EndKind {
    /// Sheet finishes turning; textures swap.
    Forward,
    /// Previous sheet finishes turning back; textures swap.
    Backward,
    /// Sheet springs back to where it started; no swap.
    Restore,
}

/// Flip session state. Exactly one is active per engine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum FlipState {
    #[default]
    Idle,
    /// Finger is down, direction not decided yet.
    BeginFlip,
    ForwardFlip,
    BackwardFlip,
    /// Finger-driven, but the turn will not be allowed to complete.
    Restoring,
    /// Time-driven settle animation.
    Ending(EndKind),
}

impl FlipState {
    /// `true` while the settle animation runs.
    #[inline]
    pub fn is_animating(self) -> bool {
        matches!(self, FlipState::Ending(_))
    }

    /// `true` while the finger drives the fold.
    #[inline]
    pub fn is_dragging(self) -> bool {
        matches!(
            self,
            FlipState::ForwardFlip | FlipState::BackwardFlip | FlipState::Restoring
        )
    }

    #[inline]
    pub fn is_idle(self) -> bool {
        self == FlipState::Idle
    }
}

impl fmt::Display for FlipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlipState::Idle => f.write_str("idle"),
            FlipState::BeginFlip => f.write_str("begin"),
            FlipState::ForwardFlip => f.write_str("forward"),
            FlipState::BackwardFlip => f.write_str("backward"),
            FlipState::Restoring => f.write_str("restoring"),
            FlipState::Ending(EndKind::Forward) => f.write_str("ending(forward)"),
            FlipState::Ending(EndKind::Backward) => f.write_str("ending(backward)"),
            FlipState::Ending(EndKind::Restore) => f.write_str("ending(restore)"),
        }
    }
}

/// Book-level direction of a turn.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FlipDirection {
    Forward,
    Backward,
}

impl FlipDirection {
    pub(crate) fn drag_state(self) -> FlipState {
        match self {
            FlipDirection::Forward => FlipState::ForwardFlip,
            FlipDirection::Backward => FlipState::BackwardFlip,
        }
    }

    pub(crate) fn end_kind(self) -> EndKind {
        match self {
            FlipDirection::Forward => EndKind::Forward,
            FlipDirection::Backward => EndKind::Backward,
        }
    }
}

/// Journal entry describing something the host may want to react to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FlipEvent {
    StateChanged { from: FlipState, to: FlipState },
    /// Textures of `side` were swapped after a completed turn.
    Swapped { side: PageSide, kind: EndKind },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ending_animates() {
        assert!(FlipState::Ending(EndKind::Restore).is_animating());
        assert!(!FlipState::ForwardFlip.is_animating());
        assert!(!FlipState::Idle.is_animating());
    }

    #[test]
    fn dragging_states() {
        assert!(FlipState::Restoring.is_dragging());
        assert!(!FlipState::BeginFlip.is_dragging());
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(FlipState::Ending(EndKind::Forward).to_string(), "ending(forward)");
    }
}
