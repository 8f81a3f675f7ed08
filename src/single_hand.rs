//! Single-hand gestures: cursor, click, finger shortcuts, exercise pose.

use std::time::Instant;

use crate::events::{ExercisePose, Gesture, GestureEvent};
use crate::fingers;
use crate::landmarks::Hand;
use crate::modes::{Mode, ModeSet};
use crate::profile::Profile;

pub const EXERCISE_THRESHOLD: f32 = 0.3;

/// Wrist-height posture classifier with a hysteresis band.
///
/// With `hysteresis == 0` the pose is a plain `wrist.y < threshold` test.
#[derive(Debug, Clone)]
pub struct ExerciseTracker {
    threshold: f32,
    hysteresis: f32,
    last: Option<ExercisePose>,
}

impl ExerciseTracker {
    pub fn new(threshold: f32, hysteresis: f32) -> Self {
        Self {
            threshold,
            hysteresis: hysteresis.max(0.0),
            last: None,
        }
    }

    pub fn classify(&mut self, wrist_y: f32) -> ExercisePose {
        let raise_below = match self.last {
            Some(ExercisePose::RaiseHand) => self.threshold + self.hysteresis,
            Some(ExercisePose::SitUp) => self.threshold - self.hysteresis,
            None => self.threshold,
        };
        let pose = if wrist_y < raise_below {
            ExercisePose::RaiseHand
        } else {
            ExercisePose::SitUp
        };
        self.last = Some(pose);
        pose
    }

    pub fn last(&self) -> Option<ExercisePose> {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for ExerciseTracker {
    fn default() -> Self {
        Self::new(EXERCISE_THRESHOLD, 0.0)
    }
}

pub struct SingleHandResolver {
    template: ExerciseTracker,
    /// One tracker per hand slot of the current frame.
    trackers: Vec<ExerciseTracker>,
}

impl SingleHandResolver {
    pub fn new(mut exercise: ExerciseTracker) -> Self {
        exercise.reset();
        Self {
            template: exercise,
            trackers: Vec::new(),
        }
    }

    /// Candidate events for a lone hand. Discrete events still need debouncing.
    pub fn resolve(
        &mut self,
        hand: &Hand,
        modes: ModeSet,
        profile: &Profile,
        now: Instant,
    ) -> Vec<GestureEvent> {
        self.resolve_frame(std::slice::from_ref(hand), modes, profile, now)
    }

    /// Candidate events for every hand of a frame, in hand order. Each hand
    /// slot keeps its own exercise pose history.
    pub fn resolve_frame(
        &mut self,
        hands: &[Hand],
        modes: ModeSet,
        profile: &Profile,
        now: Instant,
    ) -> Vec<GestureEvent> {
        let exercise = modes.contains(Mode::Exercise);
        if exercise {
            self.trackers.resize(hands.len(), self.template.clone());
        } else {
            self.reset_exercise();
        }

        let mut events = Vec::new();
        for (slot, hand) in hands.iter().enumerate() {
            resolve_hand(hand, modes, profile, now, &mut events);
            if exercise {
                let pose = self.trackers[slot].classify(hand.wrist().y);
                events.push(GestureEvent::new(Gesture::ExercisePose(pose), now));
            }
        }
        events
    }

    /// Forget every hand's last pose.
    pub fn reset_exercise(&mut self) {
        self.trackers.clear();
    }
}

fn resolve_hand(
    hand: &Hand,
    modes: ModeSet,
    profile: &Profile,
    now: Instant,
    events: &mut Vec<GestureEvent>,
) {
    if modes.contains(Mode::MouseControl) {
        let tip = hand.index_tip();
        events.push(GestureEvent::new(
            Gesture::CursorMove { x: tip.x, y: tip.y },
            now,
        ));
        // Thumb lower on screen than the pointing finger.
        if hand.thumb_tip().y > tip.y {
            events.push(GestureEvent::new(Gesture::Click, now));
        }
    }

    let finger_count = fingers::finger_count(hand);
    if let Some(command) = profile.shortcut(finger_count) {
        events.push(GestureEvent::new(
            Gesture::ShortcutFired {
                finger_count,
                command: command.clone(),
            },
            now,
        ));
    }
}

impl Default for SingleHandResolver {
    fn default() -> Self {
        Self::new(ExerciseTracker::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Command;
    use crate::landmarks::{Point2D, INDEX_TIP, MIDDLE_TIP, THUMB_TIP, WRIST};

    fn hand_with(edit: impl FnOnce(&mut Vec<Point2D>)) -> Hand {
        let mut points = vec![Point2D::new(0.5, 0.5); 21];
        edit(&mut points);
        Hand::new(&points).unwrap()
    }

    fn names(events: &[GestureEvent]) -> Vec<&'static str> {
        events.iter().map(|e| e.gesture.name()).collect()
    }

    #[test]
    fn test_normal_mode_without_shortcuts_is_silent() {
        let mut r = SingleHandResolver::default();
        let hand = hand_with(|_| {});
        let events = r.resolve(&hand, ModeSet::empty(), &Profile::default(), Instant::now());
        assert!(events.is_empty(), "got {:?}", events);
    }

    #[test]
    fn test_mouse_control_moves_and_clicks() {
        let mut r = SingleHandResolver::default();
        let modes = ModeSet::empty().with(Mode::MouseControl);

        let pointing = hand_with(|p| {
            p[INDEX_TIP] = Point2D::new(0.25, 0.4);
            p[THUMB_TIP].y = 0.3;
        });
        let events = r.resolve(&pointing, modes, &Profile::default(), Instant::now());
        assert_eq!(
            events[0].gesture,
            Gesture::CursorMove { x: 0.25, y: 0.4 }
        );
        assert_eq!(names(&events), vec!["cursor-move"]);

        let clicking = hand_with(|p| {
            p[INDEX_TIP] = Point2D::new(0.25, 0.4);
            p[THUMB_TIP].y = 0.6;
        });
        let events = r.resolve(&clicking, modes, &Profile::default(), Instant::now());
        assert_eq!(names(&events), vec!["cursor-move", "click"]);
    }

    #[test]
    fn test_shortcut_fires_for_mapped_count() {
        let mut r = SingleHandResolver::default();
        let mut profile = Profile::default();
        profile.shortcuts.insert(2, Command::Key("x".into()));

        let two = hand_with(|p| {
            p[INDEX_TIP].y = 0.2;
            p[MIDDLE_TIP].y = 0.2;
        });
        let events = r.resolve(&two, ModeSet::empty(), &profile, Instant::now());
        assert_eq!(
            events[0].gesture,
            Gesture::ShortcutFired {
                finger_count: 2,
                command: Command::Key("x".into())
            }
        );

        let one = hand_with(|p| p[INDEX_TIP].y = 0.2);
        assert!(r
            .resolve(&one, ModeSet::empty(), &profile, Instant::now())
            .is_empty());
    }

    #[test]
    fn test_exercise_pose_without_hysteresis() {
        let mut r = SingleHandResolver::default();
        let modes = ModeSet::empty().with(Mode::Exercise);
        let profile = Profile::default();

        let high = hand_with(|p| p[WRIST].y = 0.2);
        let events = r.resolve(&high, modes, &profile, Instant::now());
        assert_eq!(
            events[0].gesture,
            Gesture::ExercisePose(ExercisePose::RaiseHand)
        );

        let at_line = hand_with(|p| p[WRIST].y = 0.3);
        let events = r.resolve(&at_line, modes, &profile, Instant::now());
        assert_eq!(events[0].gesture, Gesture::ExercisePose(ExercisePose::SitUp));
    }

    #[test]
    fn test_hysteresis_holds_pose_near_boundary() {
        let mut t = ExerciseTracker::new(0.3, 0.05);
        assert_eq!(t.classify(0.2), ExercisePose::RaiseHand);
        // Inside the band: keep raising.
        assert_eq!(t.classify(0.32), ExercisePose::RaiseHand);
        assert_eq!(t.classify(0.34), ExercisePose::RaiseHand);
        assert_eq!(t.classify(0.36), ExercisePose::SitUp);
        // Back inside the band from below the line's other side.
        assert_eq!(t.classify(0.28), ExercisePose::SitUp);
        assert_eq!(t.classify(0.2), ExercisePose::RaiseHand);
    }

    #[test]
    fn test_leaving_exercise_mode_forgets_pose() {
        let mut r = SingleHandResolver::new(ExerciseTracker::new(0.3, 0.1));
        let profile = Profile::default();
        let hand = hand_with(|p| p[WRIST].y = 0.35);

        let exercise = ModeSet::empty().with(Mode::Exercise);
        let _ = r.resolve(&hand_with(|p| p[WRIST].y = 0.1), exercise, &profile, Instant::now());
        r.resolve(&hand, ModeSet::empty(), &profile, Instant::now());

        // Fresh classification: 0.35 is past the plain threshold.
        let events = r.resolve(&hand, exercise, &profile, Instant::now());
        assert_eq!(events[0].gesture, Gesture::ExercisePose(ExercisePose::SitUp));
    }

    #[test]
    fn test_each_hand_keeps_its_own_pose_history() {
        let mut r = SingleHandResolver::new(ExerciseTracker::new(0.3, 0.1));
        let exercise = ModeSet::empty().with(Mode::Exercise);
        let profile = Profile::default();
        let raised = hand_with(|p| p[WRIST].y = 0.1);
        // Inside the band: only a hand that was raised stays raised.
        let near_line = hand_with(|p| p[WRIST].y = 0.35);

        let frame = [raised, near_line.clone()];
        let events = r.resolve_frame(&frame, exercise, &profile, Instant::now());
        assert_eq!(
            events.iter().map(|e| e.gesture.clone()).collect::<Vec<_>>(),
            vec![
                Gesture::ExercisePose(ExercisePose::RaiseHand),
                Gesture::ExercisePose(ExercisePose::SitUp)
            ]
        );

        let frame = [near_line.clone(), near_line];
        let events = r.resolve_frame(&frame, exercise, &profile, Instant::now());
        assert_eq!(events[0].gesture, Gesture::ExercisePose(ExercisePose::RaiseHand));
        assert_eq!(events[1].gesture, Gesture::ExercisePose(ExercisePose::SitUp));
    }
}
