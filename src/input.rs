//! Pointer input modes
//!
//! The host forwards every canvas click to the session. What a click means
//! depends on which add/remove gesture is armed; a gesture is consumed by the
//! click that completes it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// What the next pointer press does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputMode {
    #[default]
    Idle,
    AddingPlayer,
    RemovingPlayer,
}

/// Command a pointer press resolves to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    AddPlayer(Vec2),
    RemovePlayer(Vec2),
    None,
}

impl InputMode {
    /// Resolve a press at `point`, returning the action and the mode after it
    pub fn press(self, point: Vec2) -> (PointerAction, InputMode) {
        match self {
            InputMode::Idle => (PointerAction::None, InputMode::Idle),
            InputMode::AddingPlayer => (PointerAction::AddPlayer(point), InputMode::Idle),
            InputMode::RemovingPlayer => (PointerAction::RemovePlayer(point), InputMode::Idle),
        }
    }

    /// Hint shown while a gesture is armed
    pub fn prompt(&self) -> Option<&'static str> {
        match self {
            InputMode::Idle => None,
            InputMode::AddingPlayer => Some("Click on the canvas edge to add a player."),
            InputMode::RemovingPlayer => Some("Click on a player to remove it."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_press_does_nothing() {
        let (action, next) = InputMode::Idle.press(Vec2::new(1.0, 2.0));
        assert_eq!(action, PointerAction::None);
        assert_eq!(next, InputMode::Idle);
    }

    #[test]
    fn test_gestures_are_one_shot() {
        let p = Vec2::new(10.0, 20.0);
        let (action, next) = InputMode::AddingPlayer.press(p);
        assert_eq!(action, PointerAction::AddPlayer(p));
        assert_eq!(next, InputMode::Idle);

        let (action, next) = InputMode::RemovingPlayer.press(p);
        assert_eq!(action, PointerAction::RemovePlayer(p));
        assert_eq!(next, InputMode::Idle);
    }

    #[test]
    fn test_prompt_only_when_armed() {
        assert!(InputMode::Idle.prompt().is_none());
        assert!(InputMode::AddingPlayer.prompt().is_some());
    }
}
