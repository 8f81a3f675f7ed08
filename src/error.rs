//! Error taxonomy of the gesture core.

use std::fmt;

/// Failures the gesture core can report.
///
/// None of these stop the frame loop: a bad landmark set skips one frame,
/// a detector failure reads as "no hands", a sink failure drops one event.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureError {
    /// A hand did not carry the expected number of landmarks.
    InvalidLandmarkSet { expected: usize, found: usize },
    /// The landmark detector could not produce a result for this frame.
    DetectorUnavailable(String),
    /// An action sink rejected a call.
    SinkFailure { sink: &'static str, message: String },
    /// A profile name that is not in the profile book.
    UnknownProfile(String),
    /// A shortcut command without a `key:` or `media:` prefix.
    InvalidCommand(String),
}

impl fmt::Display for GestureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLandmarkSet { expected, found } => {
                write!(f, "invalid landmark set: expected {expected} points, found {found}")
            }
            Self::DetectorUnavailable(reason) => write!(f, "detector unavailable: {reason}"),
            Self::SinkFailure { sink, message } => write!(f, "{sink} sink failed: {message}"),
            Self::UnknownProfile(name) => write!(f, "unknown profile '{name}'"),
            Self::InvalidCommand(cmd) => write!(f, "invalid shortcut command '{cmd}'"),
        }
    }
}

impl std::error::Error for GestureError {}
