//! Action sinks the core dispatches into, and the routing between them.
//!
//! Sinks are fire-and-forget: a failing call is logged and only that one
//! event is lost.

use anyhow::Result;
use tracing::{info, warn};

use crate::error::GestureError;
use crate::events::{Command, ExercisePose, Gesture, GestureEvent, MediaAction};
use crate::profile::Theme;
use crate::two_hand::DisplayBounds;

pub trait DisplayGeometry {
    fn bounds(&self) -> DisplayBounds;
}

impl DisplayGeometry for DisplayBounds {
    fn bounds(&self) -> DisplayBounds {
        *self
    }
}

pub trait PointerSink {
    /// Move to a normalized position; the sink scales to its display.
    fn move_to(&mut self, x: f32, y: f32) -> Result<()>;
    fn click(&mut self) -> Result<()>;
}

pub trait KeySink {
    fn press_and_release(&mut self, key: &str) -> Result<()>;
}

pub trait VolumeSink {
    fn set_level(&mut self, level: f32) -> Result<()>;
}

pub trait ScreenshotSink {
    fn capture(&mut self) -> Result<()>;
}

pub trait MediaSink {
    fn control(&mut self, action: MediaAction) -> Result<()>;
}

/// Status display: exercise pose, mode line, theme.
pub trait StatusSink {
    fn show_pose(&mut self, pose: ExercisePose);
    fn show_mode(&mut self, label: &str);
    fn apply_theme(&mut self, theme: Theme);
}

pub struct Sinks {
    pub pointer: Box<dyn PointerSink>,
    pub keys: Box<dyn KeySink>,
    pub volume: Box<dyn VolumeSink>,
    pub screenshot: Box<dyn ScreenshotSink>,
    pub media: Box<dyn MediaSink>,
    pub status: Box<dyn StatusSink>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub screenshots: usize,
    pub failures: Vec<GestureError>,
}

pub struct Dispatcher {
    sinks: Sinks,
}

impl Dispatcher {
    pub fn new(sinks: Sinks) -> Self {
        Self { sinks }
    }

    pub fn status(&mut self) -> &mut dyn StatusSink {
        self.sinks.status.as_mut()
    }

    /// Route every event to its sink; failures never stop the batch.
    pub fn dispatch(&mut self, events: &[GestureEvent]) -> DispatchReport {
        let mut report = DispatchReport::default();
        for event in events {
            match self.route(&event.gesture) {
                Ok(()) => {
                    report.delivered += 1;
                    if event.gesture == Gesture::Clap {
                        report.screenshots += 1;
                    }
                }
                Err(e) => {
                    warn!(gesture = event.gesture.name(), "{e}");
                    report.failures.push(e);
                }
            }
        }
        report
    }

    fn route(&mut self, gesture: &Gesture) -> Result<(), GestureError> {
        match gesture {
            Gesture::CursorMove { x, y } => {
                sink_result("pointer", self.sinks.pointer.move_to(*x, *y))
            }
            Gesture::Click => {
                info!(">> [Mouse] click");
                sink_result("pointer", self.sinks.pointer.click())
            }
            Gesture::KeyPress { key } => {
                info!(">> [Keyboard] virtual key '{key}'");
                sink_result("key", self.sinks.keys.press_and_release(&key.to_string()))
            }
            Gesture::ShortcutFired {
                finger_count,
                command,
            } => {
                info!(">> [Shortcut] {finger_count} fingers -> {command}");
                match command {
                    Command::Key(key) => {
                        sink_result("key", self.sinks.keys.press_and_release(key))
                    }
                    Command::Media(action) => {
                        sink_result("media", self.sinks.media.control(*action))
                    }
                }
            }
            Gesture::Clap => {
                info!(">> [Clap] screenshot");
                sink_result("screenshot", self.sinks.screenshot.capture())
            }
            Gesture::VolumeAdjust { level } => {
                sink_result("volume", self.sinks.volume.set_level(*level))
            }
            Gesture::ExercisePose(pose) => {
                self.sinks.status.show_pose(*pose);
                Ok(())
            }
        }
    }
}

fn sink_result(sink: &'static str, result: Result<()>) -> Result<(), GestureError> {
    result.map_err(|e| GestureError::SinkFailure {
        sink,
        message: format!("{e:#}"),
    })
}
