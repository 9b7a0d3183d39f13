use std::collections::BTreeSet;

use serde_json::Value;

use crate::types::MoveIntent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    MoveForward,
    MoveBackward,
    StrafeLeft,
    StrafeRight,
    TurnLeft,
    TurnRight,
}

impl Action {
    /// Maps a physical key code (`KeyboardEvent.code` naming) to an action.
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" | "ArrowUp" => Some(Self::MoveForward),
            "KeyS" | "ArrowDown" => Some(Self::MoveBackward),
            "KeyA" | "ArrowLeft" => Some(Self::StrafeLeft),
            "KeyD" | "ArrowRight" => Some(Self::StrafeRight),
            "KeyQ" => Some(Self::TurnLeft),
            "KeyE" => Some(Self::TurnRight),
            _ => None,
        }
    }
}

/// Currently held actions. Keyboard and on-screen buttons both feed this.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    held: BTreeSet<Action>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, action: Action) {
        self.held.insert(action);
    }

    pub fn release(&mut self, action: Action) {
        self.held.remove(&action);
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    pub fn intent(&self) -> MoveIntent {
        MoveIntent {
            move_forward: self.is_held(Action::MoveForward),
            move_backward: self.is_held(Action::MoveBackward),
            turn_left: self.is_held(Action::TurnLeft),
            turn_right: self.is_held(Action::TurnRight),
            strafe_left: self.is_held(Action::StrafeLeft),
            strafe_right: self.is_held(Action::StrafeRight),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputCommand {
    KeyDown(Action),
    KeyUp(Action),
    Wait { seconds: f32 },
    Retry,
}

pub fn parse_input_command(raw: &str) -> Option<InputCommand> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let command_type = object.get("type")?.as_str()?;

    match command_type {
        "keydown" => {
            let action = Action::from_key_code(object.get("code")?.as_str()?)?;
            Some(InputCommand::KeyDown(action))
        }
        "keyup" => {
            let action = Action::from_key_code(object.get("code")?.as_str()?)?;
            Some(InputCommand::KeyUp(action))
        }
        "wait" => {
            let seconds = object.get("seconds")?.as_f64()?;
            if !seconds.is_finite() || seconds < 0.0 {
                return None;
            }
            Some(InputCommand::Wait {
                seconds: seconds as f32,
            })
        }
        "retry" => Some(InputCommand::Retry),
        _ => None,
    }
}
