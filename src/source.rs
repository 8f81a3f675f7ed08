//! Landmark sources: where per-frame hand landmark sets come from.
//!
//! The neural detector lives outside this crate. A source hands over raw
//! landmark sets; validation into [`Hand`](crate::landmarks::Hand) happens in
//! the engine so a malformed set only costs its own frame.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::GestureError;
use crate::landmarks::Point2D;

/// One detection as reported by a landmark detector.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectedHand {
    #[serde(default = "full_confidence")]
    pub confidence: f32,
    pub points: Vec<Point2D>,
}

fn full_confidence() -> f32 {
    1.0
}

impl DetectedHand {
    pub fn new(points: Vec<Point2D>) -> Self {
        Self {
            confidence: 1.0,
            points,
        }
    }
}

pub trait LandmarkSource {
    /// Next frame's detections. `Ok(None)` ends the stream;
    /// `Err(DetectorUnavailable)` means no hands this frame.
    fn detect(&mut self) -> Result<Option<Vec<DetectedHand>>, GestureError>;

    /// Minimum detection confidence, re-armed on every profile switch.
    fn reconfigure(&mut self, sensitivity: f32);
}

#[derive(Debug, Clone, Deserialize)]
struct Recording {
    frames: Vec<RecordedFrame>,
}

#[derive(Debug, Clone, Deserialize)]
struct RecordedFrame {
    #[serde(default)]
    hands: Vec<DetectedHand>,
}

/// Replays a YAML landmark recording, one recorded frame per call.
pub struct ReplaySource {
    frames: Vec<Vec<DetectedHand>>,
    cursor: usize,
    looping: bool,
    min_confidence: f32,
}

impl ReplaySource {
    pub fn new(frames: Vec<Vec<DetectedHand>>, looping: bool) -> Self {
        Self {
            frames,
            cursor: 0,
            looping,
            min_confidence: 0.0,
        }
    }

    pub fn open(path: impl AsRef<Path>, looping: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("cannot open landmark recording {}", path.display()))?;
        let recording: Recording = serde_yaml::from_reader(file)
            .with_context(|| format!("malformed landmark recording {}", path.display()))?;
        info!(
            ">> [Source] replaying {} frames from {}",
            recording.frames.len(),
            path.display()
        );
        Ok(Self::new(
            recording.frames.into_iter().map(|f| f.hands).collect(),
            looping,
        ))
    }
}

impl LandmarkSource for ReplaySource {
    fn detect(&mut self) -> Result<Option<Vec<DetectedHand>>, GestureError> {
        if self.cursor >= self.frames.len() {
            if !self.looping || self.frames.is_empty() {
                return Ok(None);
            }
            self.cursor = 0;
        }
        let hands = self.frames[self.cursor]
            .iter()
            .filter(|h| h.confidence >= self.min_confidence)
            .cloned()
            .collect();
        self.cursor += 1;
        Ok(Some(hands))
    }

    fn reconfigure(&mut self, sensitivity: f32) {
        debug!(sensitivity, "replay source reconfigured");
        self.min_confidence = sensitivity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(confidence: f32) -> DetectedHand {
        DetectedHand {
            confidence,
            points: vec![Point2D::new(0.5, 0.5); 21],
        }
    }

    #[test]
    fn test_replay_ends_or_loops() {
        let mut once = ReplaySource::new(vec![vec![hand(1.0)], vec![]], false);
        assert_eq!(once.detect().unwrap().map(|h| h.len()), Some(1));
        assert_eq!(once.detect().unwrap().map(|h| h.len()), Some(0));
        assert_eq!(once.detect().unwrap(), None);

        let mut looping = ReplaySource::new(vec![vec![hand(1.0)]], true);
        for _ in 0..3 {
            assert_eq!(looping.detect().unwrap().map(|h| h.len()), Some(1));
        }

        let mut empty = ReplaySource::new(vec![], true);
        assert_eq!(empty.detect().unwrap(), None);
    }

    #[test]
    fn test_sensitivity_filters_low_confidence() {
        let mut source = ReplaySource::new(vec![vec![hand(0.9), hand(0.6)]], true);
        assert_eq!(source.detect().unwrap().unwrap().len(), 2);
        source.reconfigure(0.7);
        let hands = source.detect().unwrap().unwrap();
        assert_eq!(hands.len(), 1);
        assert_eq!(hands[0].confidence, 0.9);
    }

    #[test]
    fn test_recording_yaml_format() {
        let yaml = r#"
frames:
  - hands:
      - confidence: 0.8
        points: [[0.1, 0.2], [0.3, 0.4]]
  - {}
"#;
        let recording: Recording = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(recording.frames.len(), 2);
        assert_eq!(recording.frames[0].hands[0].points[1], Point2D::new(0.3, 0.4));
        assert!(recording.frames[1].hands.is_empty());
    }
}
