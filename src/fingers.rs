//! Finger-state classification.
//!
//! Known limitation: the thumb rule compares x coordinates only, so it
//! assumes one hand orientation (a right hand in a mirrored frame). A left
//! hand reads its thumb inverted.

use crate::landmarks::{Hand, INDEX_TIP, MIDDLE_TIP, PINKY_TIP, RING_TIP, THUMB_IP, THUMB_TIP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    fn tip(self) -> usize {
        match self {
            Finger::Thumb => THUMB_TIP,
            Finger::Index => INDEX_TIP,
            Finger::Middle => MIDDLE_TIP,
            Finger::Ring => RING_TIP,
            Finger::Pinky => PINKY_TIP,
        }
    }
}

/// Extended/folded bitset for the five fingers of one hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerState(u8);

impl FingerState {
    pub fn is_extended(&self, finger: Finger) -> bool {
        self.0 & finger.bit() != 0
    }

    pub fn with(mut self, finger: Finger) -> Self {
        self.0 |= finger.bit();
        self
    }

    /// Number of extended fingers, 0..=5.
    pub fn count(&self) -> u8 {
        self.0.count_ones() as u8
    }

    pub fn bits(&self) -> u8 {
        self.0
    }
}

/// Thumb: tip left of the IP joint. Other fingers: tip above the joint two
/// positions closer to the palm (PIP).
pub fn classify(hand: &Hand) -> FingerState {
    Finger::ALL
        .iter()
        .filter(|&&finger| is_extended(hand, finger))
        .fold(FingerState::default(), |state, &finger| state.with(finger))
}

pub fn finger_count(hand: &Hand) -> u8 {
    classify(hand).count()
}

fn is_extended(hand: &Hand, finger: Finger) -> bool {
    let tip = hand.point(finger.tip());
    match finger {
        Finger::Thumb => tip.x < hand.point(THUMB_IP).x,
        _ => tip.y < hand.point(finger.tip() - 2).y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Point2D;

    /// All joints at the same spot: nothing strictly above or left, so every
    /// finger reads folded.
    fn flat_hand() -> Vec<Point2D> {
        vec![Point2D::new(0.5, 0.5); 21]
    }

    fn raise(points: &mut [Point2D], tip: usize) {
        points[tip].y = points[tip - 2].y - 0.1;
    }

    #[test]
    fn test_flat_hand_has_no_fingers() {
        let hand = Hand::new(&flat_hand()).unwrap();
        let state = classify(&hand);
        assert_eq!(state.count(), 0);
        assert_eq!(state.bits(), 0);
    }

    #[test]
    fn test_thumb_uses_strict_x_rule() {
        let mut points = flat_hand();
        points[THUMB_TIP].x = 0.4;
        points[THUMB_IP].x = 0.45;
        let hand = Hand::new(&points).unwrap();
        assert!(classify(&hand).is_extended(Finger::Thumb));

        points[THUMB_TIP].x = 0.45;
        let hand = Hand::new(&points).unwrap();
        assert!(!classify(&hand).is_extended(Finger::Thumb), "equal x is folded");

        points[THUMB_TIP].x = 0.5;
        let hand = Hand::new(&points).unwrap();
        assert!(!classify(&hand).is_extended(Finger::Thumb));
    }

    #[test]
    fn test_each_finger_uses_y_against_pip() {
        for (finger, tip) in [
            (Finger::Index, INDEX_TIP),
            (Finger::Middle, MIDDLE_TIP),
            (Finger::Ring, RING_TIP),
            (Finger::Pinky, PINKY_TIP),
        ] {
            let mut points = flat_hand();
            raise(&mut points, tip);
            let state = classify(&Hand::new(&points).unwrap());
            assert!(state.is_extended(finger), "{finger:?} should be extended");
            assert_eq!(state.count(), 1);

            // Tip below the PIP joint: folded.
            points[tip].y = points[tip - 2].y + 0.1;
            let state = classify(&Hand::new(&points).unwrap());
            assert!(!state.is_extended(finger), "{finger:?} should be folded");
        }
    }

    #[test]
    fn test_open_hand_counts_five() {
        let mut points = flat_hand();
        points[THUMB_TIP].x = 0.3;
        for tip in [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP] {
            raise(&mut points, tip);
        }
        let hand = Hand::new(&points).unwrap();
        assert_eq!(finger_count(&hand), 5);
        assert_eq!(classify(&hand).bits(), 0b11111);
    }
}
