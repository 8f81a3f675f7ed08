// ==========================================
// Per-frame pipeline: detect -> validate -> interpret -> dispatch
// ==========================================
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::GestureError;
use crate::landmarks::Hand;
use crate::modes::{Mode, Session};
use crate::profile::ProfileBook;
use crate::sinks::{DispatchReport, Dispatcher, DisplayGeometry};
use crate::source::LandmarkSource;

#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// The landmark source has no more frames.
    Finished,
    /// A landmark set was malformed; the whole frame was dropped.
    Skipped(GestureError),
    Processed { hands: usize, report: DispatchReport },
}

#[derive(Debug, Clone)]
pub struct EngineStats {
    pub frames: u64,
    pub skipped_frames: u64,
    pub detector_failures: u64,
    pub gestures: u64,
    pub screenshots: u64,
    pub started: Instant,
}

impl EngineStats {
    fn new(started: Instant) -> Self {
        Self {
            frames: 0,
            skipped_frames: 0,
            detector_failures: 0,
            gestures: 0,
            screenshots: 0,
            started,
        }
    }

    pub fn uptime(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }

    /// `Screenshots: N | Uptime: HH:MM:SS`
    pub fn summary(&self, now: Instant) -> String {
        let secs = self.uptime(now).as_secs();
        format!(
            "Screenshots: {} | Uptime: {:02}:{:02}:{:02}",
            self.screenshots,
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        )
    }
}

pub struct Engine {
    session: Session,
    source: Box<dyn LandmarkSource>,
    display: Box<dyn DisplayGeometry>,
    dispatcher: Dispatcher,
    stats: EngineStats,
}

impl Engine {
    pub fn new(
        session: Session,
        source: Box<dyn LandmarkSource>,
        display: Box<dyn DisplayGeometry>,
        dispatcher: Dispatcher,
        now: Instant,
    ) -> Self {
        let mut engine = Self {
            session,
            source,
            display,
            dispatcher,
            stats: EngineStats::new(now),
        };
        let profile = engine.session.profile();
        let (sensitivity, theme) = (profile.gesture_sensitivity, profile.theme);
        engine.source.reconfigure(sensitivity);
        engine.dispatcher.status().apply_theme(theme);
        let label = engine.session.modes().label();
        engine.dispatcher.status().show_mode(&label);
        engine
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub fn profiles(&self) -> &ProfileBook {
        self.session.profiles()
    }

    pub fn toggle(&mut self, mode: Mode) -> bool {
        let on = self.session.toggle(mode);
        let label = self.session.modes().label();
        self.dispatcher.status().show_mode(&label);
        on
    }

    pub fn select_profile(&mut self, name: &str) -> Result<(), GestureError> {
        let change = self.session.select_profile(name)?;
        self.source.reconfigure(change.sensitivity);
        self.dispatcher.status().apply_theme(change.theme);
        Ok(())
    }

    pub fn cycle_profile(&mut self) -> Result<(), GestureError> {
        let next = self.session.next_profile_name();
        self.select_profile(&next)
    }

    /// Run one frame to completion.
    pub fn process_frame(&mut self, now: Instant) -> FrameOutcome {
        let detected = match self.source.detect() {
            Ok(Some(detected)) => detected,
            Ok(None) => return FrameOutcome::Finished,
            Err(e) => {
                // Degrade to an empty frame.
                self.stats.detector_failures += 1;
                warn!("{e}");
                Vec::new()
            }
        };
        self.stats.frames += 1;

        let hands = match detected
            .iter()
            .map(|d| Hand::new(&d.points))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(hands) => hands,
            Err(e) => {
                self.stats.skipped_frames += 1;
                warn!(">> [Frame] skipped: {e}");
                return FrameOutcome::Skipped(e);
            }
        };

        let display = self.display.bounds();
        let events = self.session.interpret(&hands, display, now);
        let report = self.dispatcher.dispatch(&events);
        self.stats.gestures += report.delivered as u64;
        self.stats.screenshots += report.screenshots as u64;
        if !events.is_empty() {
            debug!(hands = hands.len(), events = events.len(), "frame dispatched");
        }

        FrameOutcome::Processed {
            hands: hands.len(),
            report,
        }
    }

    pub fn log_stats(&self, now: Instant) {
        info!(
            ">> [Stats] {} | Gestures: {} | Frames: {} (skipped {})",
            self.stats.summary(now),
            self.stats.gestures,
            self.stats.frames,
            self.stats.skipped_frames
        );
    }
}
