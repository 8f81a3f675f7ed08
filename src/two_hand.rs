//! Two-hand gestures: clap, volume, and the pinch virtual keyboard.
//!
//! Only invoked when the detector reports exactly two hands. Clap, volume
//! and virtual keys are independent and may all fire in the same frame.

use std::time::Instant;

use crate::events::{Gesture, GestureEvent};
use crate::landmarks::{Hand, MIDDLE_MCP};
use crate::modes::{Mode, ModeSet};
use crate::profile::Profile;

/// Index tips closer than this (normalized) press a virtual key.
pub const KEYBOARD_PINCH_DISTANCE: f32 = 0.1;

pub const KEYBOARD_COLUMNS: i64 = 4;
pub const KEYBOARD_ROWS: i64 = 3;

const KEYBOARD_LAYOUT: [[char; 4]; 3] = [
    ['a', 's', 'd', 'f'],
    ['q', 'w', 'e', 'r'],
    ['z', 'x', 'c', 'v'],
];

/// Target display size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayBounds {
    pub width: u32,
    pub height: u32,
}

impl DisplayBounds {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// `1 - min(|dy|, 0.5) * 2`, clamped to `[0, 1]`.
pub fn volume_level(index_y_a: f32, index_y_b: f32) -> f32 {
    let y_diff = (index_y_a - index_y_b).abs().min(0.5);
    (1.0 - y_diff * 2.0).clamp(0.0, 1.0)
}

/// Key under a screen pixel on the 4x3 grid spanning the display.
pub fn virtual_key_at(x: i64, y: i64, display: DisplayBounds) -> Option<char> {
    let cell_w = i64::from(display.width) / KEYBOARD_COLUMNS;
    let cell_h = i64::from(display.height) / KEYBOARD_ROWS;
    if cell_w == 0 || cell_h == 0 || x < 0 || y < 0 {
        return None;
    }
    let column = usize::try_from(x / cell_w).ok()?;
    let row = usize::try_from(y / cell_h).ok()?;
    KEYBOARD_LAYOUT.get(row)?.get(column).copied()
}

pub fn resolve(
    a: &Hand,
    b: &Hand,
    modes: ModeSet,
    profile: &Profile,
    display: DisplayBounds,
    now: Instant,
) -> Vec<GestureEvent> {
    let mut events = Vec::new();

    let palm_distance = a.point(MIDDLE_MCP).distance(&b.point(MIDDLE_MCP));
    if palm_distance < profile.clap_threshold {
        events.push(GestureEvent::new(Gesture::Clap, now));
    }

    if modes.contains(Mode::VirtualKeyboard) {
        let (tip_a, tip_b) = (a.index_tip(), b.index_tip());
        if tip_a.distance(&tip_b) < KEYBOARD_PINCH_DISTANCE {
            let mid = tip_a.midpoint(&tip_b);
            let screen_x = (mid.x * display.width as f32) as i64;
            let screen_y = (mid.y * display.height as f32) as i64;
            if let Some(key) = virtual_key_at(screen_x, screen_y, display) {
                events.push(GestureEvent::new(Gesture::KeyPress { key }, now));
            }
        }
    }

    let level = volume_level(a.index_tip().y, b.index_tip().y);
    events.push(GestureEvent::new(Gesture::VolumeAdjust { level }, now));

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Point2D, INDEX_TIP};

    const DISPLAY: DisplayBounds = DisplayBounds::new(1280, 900);

    fn hand_at(palm: Point2D, index_tip: Point2D) -> Hand {
        let mut points = vec![Point2D::new(0.5, 0.5); 21];
        points[MIDDLE_MCP] = palm;
        points[INDEX_TIP] = index_tip;
        Hand::new(&points).unwrap()
    }

    fn gestures(events: &[GestureEvent]) -> Vec<Gesture> {
        events.iter().map(|e| e.gesture.clone()).collect()
    }

    #[test]
    fn test_volume_mapping() {
        assert_eq!(volume_level(0.5, 0.0), 0.0);
        assert_eq!(volume_level(0.25, 0.25), 1.0);
        assert_eq!(volume_level(0.0, 0.75), 0.0);
        assert_eq!(volume_level(0.75, 0.0), 0.0);
        assert_eq!(volume_level(0.5, 0.25), 0.5);
    }

    #[test]
    fn test_clap_threshold_is_strict() {
        let profile = Profile::default();
        let a = hand_at(Point2D::new(0.0, 0.5), Point2D::new(0.0, 0.5));
        let b = hand_at(Point2D::new(0.3, 0.5), Point2D::new(0.3, 0.5));
        let events = resolve(&a, &b, ModeSet::empty(), &profile, DISPLAY, Instant::now());
        assert!(!gestures(&events).contains(&Gesture::Clap));

        let b = hand_at(Point2D::new(0.2, 0.5), Point2D::new(0.2, 0.5));
        let events = resolve(&a, &b, ModeSet::empty(), &profile, DISPLAY, Instant::now());
        assert!(gestures(&events).contains(&Gesture::Clap));
    }

    #[test]
    fn test_volume_emitted_every_two_hand_frame() {
        let a = hand_at(Point2D::new(0.1, 0.5), Point2D::new(0.1, 0.0));
        let b = hand_at(Point2D::new(0.9, 0.5), Point2D::new(0.9, 0.5));
        let events = resolve(&a, &b, ModeSet::empty(), &Profile::default(), DISPLAY, Instant::now());
        assert_eq!(gestures(&events), vec![Gesture::VolumeAdjust { level: 0.0 }]);
    }

    #[test]
    fn test_virtual_key_grid() {
        assert_eq!(virtual_key_at(128, 90, DISPLAY), Some('a'));
        assert_eq!(virtual_key_at(330, 90, DISPLAY), Some('s'));
        assert_eq!(virtual_key_at(1279, 899, DISPLAY), Some('v'));
        assert_eq!(virtual_key_at(700, 450, DISPLAY), Some('e'));
        assert_eq!(virtual_key_at(1280, 90, DISPLAY), None);
        assert_eq!(virtual_key_at(128, 900, DISPLAY), None);
        assert_eq!(virtual_key_at(-1, 90, DISPLAY), None);
        assert_eq!(virtual_key_at(0, 0, DisplayBounds::new(3, 2)), None);
    }

    #[test]
    fn test_virtual_keyboard_needs_mode_and_pinch() {
        // Palms far apart so no clap; index tips touching at (0.1, 0.1).
        let a = hand_at(Point2D::new(0.0, 0.9), Point2D::new(0.09, 0.1));
        let b = hand_at(Point2D::new(1.0, 0.9), Point2D::new(0.11, 0.1));
        let profile = Profile::default();

        let events = resolve(&a, &b, ModeSet::empty(), &profile, DISPLAY, Instant::now());
        assert!(!events
            .iter()
            .any(|e| matches!(e.gesture, Gesture::KeyPress { .. })));

        let keyboard = ModeSet::empty().with(Mode::VirtualKeyboard);
        let events = resolve(&a, &b, keyboard, &profile, DISPLAY, Instant::now());
        assert!(
            gestures(&events).contains(&Gesture::KeyPress { key: 'a' }),
            "got {:?}",
            events
        );

        // Tips too far apart.
        let b = hand_at(Point2D::new(1.0, 0.9), Point2D::new(0.4, 0.1));
        let events = resolve(&a, &b, keyboard, &profile, DISPLAY, Instant::now());
        assert!(!events
            .iter()
            .any(|e| matches!(e.gesture, Gesture::KeyPress { .. })));
    }

    #[test]
    fn test_pinch_outside_grid_presses_nothing() {
        let a = hand_at(Point2D::new(0.0, 0.9), Point2D::new(1.05, 0.1));
        let b = hand_at(Point2D::new(1.0, 0.9), Point2D::new(1.07, 0.1));
        let keyboard = ModeSet::empty().with(Mode::VirtualKeyboard);
        let events = resolve(&a, &b, keyboard, &Profile::default(), DISPLAY, Instant::now());
        assert!(!events
            .iter()
            .any(|e| matches!(e.gesture, Gesture::KeyPress { .. })));
    }
}
