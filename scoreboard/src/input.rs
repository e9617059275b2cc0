use crate::config::TouchUndo;
use log::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub ctrl: bool,
    pub key: char,
}

impl KeyPress {
    pub fn ctrl(key: char) -> Self {
        Self { ctrl: true, key }
    }
}

/// What a touch landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchTarget {
    UndoControl,
    /// Anywhere on the scoreboard that isn't a control
    Surface,
    OtherControl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Undo,
}

/// Maps global key combinations and touches to match actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bindings {
    touch_undo: TouchUndo,
}

impl Bindings {
    pub fn new(touch_undo: TouchUndo) -> Self {
        Self { touch_undo }
    }

    pub fn key_action(&self, press: KeyPress) -> Option<Action> {
        // Only the bare lowercase key, ctrl+shift+z is left for other uses
        let action = match press {
            KeyPress {
                ctrl: true,
                key: 'z',
            } => Some(Action::Undo),
            _ => None,
        };
        trace!("Key {press:?} mapped to {action:?}");
        action
    }

    pub fn touch_action(&self, target: TouchTarget) -> Option<Action> {
        let action = match (self.touch_undo, target) {
            (_, TouchTarget::UndoControl) => Some(Action::Undo),
            (TouchUndo::WholeSurface, _) => Some(Action::Undo),
            (TouchUndo::UndoControl, TouchTarget::Surface | TouchTarget::OtherControl) => None,
        };
        trace!("Touch on {target:?} mapped to {action:?}");
        action
    }
}
