//! Gesture events produced by the resolvers and consumed by the dispatcher.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::GestureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaAction {
    Play,
    Pause,
    Next,
    Previous,
}

impl MediaAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Next => "next",
            Self::Previous => "previous",
        }
    }
}

/// Action bound to a finger count in a profile.
///
/// Written as `key:<name>` or `media:<play|pause|next|previous>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Command {
    Key(String),
    Media(MediaAction),
}

impl FromStr for Command {
    type Err = GestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GestureError::InvalidCommand(s.to_string());
        if let Some(key) = s.strip_prefix("key:") {
            if key.is_empty() {
                return Err(invalid());
            }
            return Ok(Command::Key(key.to_string()));
        }
        if let Some(action) = s.strip_prefix("media:") {
            let action = match action {
                "play" => MediaAction::Play,
                "pause" => MediaAction::Pause,
                "next" => MediaAction::Next,
                "previous" => MediaAction::Previous,
                _ => return Err(invalid()),
            };
            return Ok(Command::Media(action));
        }
        Err(invalid())
    }
}

impl TryFrom<String> for Command {
    type Error = GestureError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Command> for String {
    fn from(cmd: Command) -> Self {
        cmd.to_string()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Key(key) => write!(f, "key:{key}"),
            Command::Media(action) => write!(f, "media:{}", action.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExercisePose {
    RaiseHand,
    SitUp,
}

impl ExercisePose {
    pub fn label(&self) -> &'static str {
        match self {
            Self::RaiseHand => "Raise Hand",
            Self::SitUp => "Sit Up",
        }
    }
}

/// A resolved gesture, before debounce and dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Clap,
    /// System volume, 0.0..=1.0.
    VolumeAdjust { level: f32 },
    /// Normalized index-tip position; the pointer sink scales it to the display.
    CursorMove { x: f32, y: f32 },
    Click,
    KeyPress { key: char },
    ShortcutFired { finger_count: u8, command: Command },
    ExercisePose(ExercisePose),
}

impl Gesture {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Clap => "clap",
            Self::VolumeAdjust { .. } => "volume",
            Self::CursorMove { .. } => "cursor-move",
            Self::Click => "click",
            Self::KeyPress { .. } => "key-press",
            Self::ShortcutFired { .. } => "shortcut",
            Self::ExercisePose(_) => "exercise-pose",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GestureEvent {
    pub gesture: Gesture,
    pub at: Instant,
}

impl GestureEvent {
    pub fn new(gesture: Gesture, at: Instant) -> Self {
        Self { gesture, at }
    }
}
