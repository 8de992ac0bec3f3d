//! Landmark-to-gesture classification.
//!
//! Classification is a pure function of one hand skeleton. Every input maps to
//! exactly one gesture: shapes that are neither an open hand nor a clean
//! scissors fall back to rock, including degenerate or ambiguous skeletons.

use super::types::{Finger, Gesture, LandmarkSet};
use strum::IntoEnumIterator;
use tracing::{instrument, trace};

/// Which of the four non-thumb fingers are extended.
///
/// Bit 0 is the index finger, bit 3 the little finger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FingerPattern(u8);

impl FingerPattern {
    /// All four fingers extended.
    pub const OPEN: FingerPattern = FingerPattern(0b1111);
    /// Index and middle extended, ring and little folded.
    pub const VICTORY: FingerPattern = FingerPattern(0b0011);

    /// Reads the pattern from a skeleton.
    ///
    /// A finger is extended when its tip sits strictly above (smaller image y)
    /// its PIP joint.
    pub fn from_landmarks(landmarks: &LandmarkSet) -> Self {
        let bits = Finger::iter()
            .enumerate()
            .filter(|(_, finger)| {
                landmarks.point(finger.tip()).y < landmarks.point(finger.pip()).y
            })
            .fold(0u8, |acc, (bit, _)| acc | (1 << bit));
        FingerPattern(bits)
    }

    /// Returns true if `finger` is extended.
    pub fn is_extended(&self, finger: Finger) -> bool {
        let bit = Finger::iter().position(|f| f == finger).unwrap_or(0);
        self.0 & (1 << bit) != 0
    }

    /// Raw 4-bit pattern.
    pub fn bits(&self) -> u8 {
        self.0
    }
}

/// Maps a hand skeleton to a gesture.
#[instrument(skip(landmarks))]
pub fn classify(landmarks: &LandmarkSet) -> Gesture {
    let pattern = FingerPattern::from_landmarks(landmarks);
    let gesture = match pattern {
        FingerPattern::OPEN => Gesture::Paper,
        FingerPattern::VICTORY => Gesture::Scissors,
        _ => Gesture::Rock,
    };
    trace!(pattern = pattern.bits(), %gesture, "Classified hand");
    gesture
}


#[cfg(test)]
mod tests {
    use super::fixtures::hand;
    use super::*;
    use crate::types::{Landmark, LANDMARK_COUNT};

    #[test]
    fn test_open_hand_is_paper() {
        assert_eq!(classify(&hand([true; 4], 0.5)), Gesture::Paper);
    }

    #[test]
    fn test_index_and_middle_is_scissors() {
        assert_eq!(
            classify(&hand([true, true, false, false], 0.5)),
            Gesture::Scissors
        );
    }

    #[test]
    fn test_fist_is_rock() {
        assert_eq!(classify(&hand([false; 4], 0.5)), Gesture::Rock);
    }

    #[test]
    fn test_ambiguous_shapes_fall_back_to_rock() {
        // Index only, three fingers, middle+ring: none match a positive rule.
        for extended in [
            [true, false, false, false],
            [true, true, true, false],
            [false, true, true, false],
            [false, false, false, true],
        ] {
            assert_eq!(classify(&hand(extended, 0.5)), Gesture::Rock, "{extended:?}");
        }
    }

    #[test]
    fn test_degenerate_landmarks_are_rock() {
        assert_eq!(classify(&LandmarkSet::default()), Gesture::Rock);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let points = [Landmark::new(0.1, 0.2, 0.3); LANDMARK_COUNT];
        let set = LandmarkSet::new(points);
        assert_eq!(classify(&set), classify(&set));
    }

    #[test]
    fn test_finger_pattern_bits() {
        let pattern = FingerPattern::from_landmarks(&hand([true, false, true, false], 0.5));
        assert_eq!(pattern.bits(), 0b0101);
        assert!(pattern.is_extended(Finger::Index));
        assert!(!pattern.is_extended(Finger::Middle));
        assert!(pattern.is_extended(Finger::Ring));
    }
}
