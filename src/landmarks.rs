//! Hand landmark types: 21 points per hand in normalized image space.

use serde::{Deserialize, Serialize};

use crate::error::GestureError;

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP: usize = 16;
pub const PINKY_TIP: usize = 20;

/// Normalized camera-frame coordinate. Origin top-left, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2D) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(&self, other: &Point2D) -> Point2D {
        Point2D::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

impl From<[f32; 2]> for Point2D {
    fn from(p: [f32; 2]) -> Self {
        Self::new(p[0], p[1])
    }
}

impl From<Point2D> for [f32; 2] {
    fn from(p: Point2D) -> Self {
        [p.x, p.y]
    }
}

/// One detected hand in one frame. Always exactly 21 landmarks; hands carry
/// no identity across frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    points: [Point2D; LANDMARK_COUNT],
}

impl Hand {
    pub fn new(points: &[Point2D]) -> Result<Self, GestureError> {
        let points: [Point2D; LANDMARK_COUNT] =
            points
                .try_into()
                .map_err(|_| GestureError::InvalidLandmarkSet {
                    expected: LANDMARK_COUNT,
                    found: points.len(),
                })?;
        Ok(Self { points })
    }

    /// Landmark by index. Panics on an index >= 21, like slice indexing.
    pub fn point(&self, index: usize) -> Point2D {
        self.points[index]
    }

    pub fn points(&self) -> &[Point2D; LANDMARK_COUNT] {
        &self.points
    }

    pub fn wrist(&self) -> Point2D {
        self.points[WRIST]
    }

    pub fn index_tip(&self) -> Point2D {
        self.points[INDEX_TIP]
    }

    pub fn thumb_tip(&self) -> Point2D {
        self.points[THUMB_TIP]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hand_requires_21_points() {
        let short = vec![Point2D::default(); 20];
        assert_eq!(
            Hand::new(&short),
            Err(GestureError::InvalidLandmarkSet {
                expected: 21,
                found: 20
            })
        );

        let long = vec![Point2D::default(); 22];
        assert!(Hand::new(&long).is_err());

        let exact = vec![Point2D::new(0.5, 0.5); 21];
        let hand = Hand::new(&exact).unwrap();
        assert_eq!(hand.wrist(), Point2D::new(0.5, 0.5));
    }

    #[test]
    fn test_distance_and_midpoint() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(0.3, 0.4);
        assert!((a.distance(&b) - 0.5).abs() < 1e-6);
        assert_eq!(a.midpoint(&b), Point2D::new(0.15, 0.2));
    }

    #[test]
    fn test_point_deserializes_from_pair() {
        let p: Point2D = serde_yaml::from_str("[0.25, 0.75]").unwrap();
        assert_eq!(p, Point2D::new(0.25, 0.75));
    }
}
