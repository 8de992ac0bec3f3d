//! Core domain types for gesture rock/paper/scissors.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString};

/// A hand gesture.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Gesture {
    /// Closed fist.
    Rock,
    /// Open hand.
    Paper,
    /// Index and middle finger extended.
    Scissors,
}

impl Gesture {
    /// Returns true if `self` defeats `other` under cyclic dominance.
    pub fn beats(self, other: Gesture) -> bool {
        matches!(
            (self, other),
            (Gesture::Rock, Gesture::Scissors)
                | (Gesture::Scissors, Gesture::Paper)
                | (Gesture::Paper, Gesture::Rock)
        )
    }
}

/// One side of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// First player (always a human).
    A,
    /// Second player (human or computer depending on mode).
    B,
}

/// Game mode, fixed for the lifetime of a session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Mode {
    /// One human against the computer.
    Computer,
    /// Two humans sharing one camera.
    Human,
}

impl Mode {
    /// Number of hands the detector should look for.
    pub fn max_hands(self) -> usize {
        match self {
            Mode::Computer => 1,
            Mode::Human => 2,
        }
    }
}

/// Result of comparing the gestures of one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Outcome {
    /// Side A won.
    #[display("side A wins")]
    WinA,
    /// Side B won.
    #[display("side B wins")]
    WinB,
    /// Both sides showed the same gesture.
    #[display("tie")]
    Tie,
    /// One or both sides had no readable gesture.
    #[display("incomplete")]
    Incomplete,
}

impl Outcome {
    /// Returns the winning side if there is one.
    pub fn winner(&self) -> Option<Side> {
        match self {
            Outcome::WinA => Some(Side::A),
            Outcome::WinB => Some(Side::B),
            Outcome::Tie | Outcome::Incomplete => None,
        }
    }

    /// Returns true if the round could not be scored.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Outcome::Incomplete)
    }
}

/// Number of keypoints in one hand skeleton.
pub const LANDMARK_COUNT: usize = 21;

/// Index of the wrist keypoint.
pub const WRIST: usize = 0;

/// A single normalized keypoint on a detected hand.
///
/// Coordinates are normalized to the frame, with `y` growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, derive_new::new)]
pub struct Landmark {
    /// Horizontal position (0.0 = left edge).
    pub x: f32,
    /// Vertical position (0.0 = top edge).
    pub y: f32,
    /// Depth relative to the wrist.
    pub z: f32,
}

/// The four non-thumb fingers, in anatomical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Finger {
    /// Index finger.
    Index,
    /// Middle finger.
    Middle,
    /// Ring finger.
    Ring,
    /// Little finger.
    Pinky,
}

impl Finger {
    /// Keypoint index of the fingertip.
    pub fn tip(self) -> usize {
        self.pip() + 2
    }

    /// Keypoint index of the lower (PIP) joint.
    pub fn pip(self) -> usize {
        match self {
            Finger::Index => 6,
            Finger::Middle => 10,
            Finger::Ring => 14,
            Finger::Pinky => 18,
        }
    }
}

/// Error building a [`LandmarkSet`].
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum LandmarkError {
    /// The detector produced the wrong number of keypoints.
    #[display("expected {} landmarks, got {}", LANDMARK_COUNT, _0)]
    WrongCount(#[error(not(source))] usize),
}

/// The 21-point skeleton of one detected hand for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSet {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkSet {
    /// Wraps a full skeleton.
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Builds a skeleton from detector output, rejecting wrong point counts.
    pub fn from_slice(points: &[Landmark]) -> Result<Self, LandmarkError> {
        let points: [Landmark; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| LandmarkError::WrongCount(points.len()))?;
        Ok(Self { points })
    }

    /// Returns the keypoint at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= LANDMARK_COUNT`.
    pub fn point(&self, index: usize) -> Landmark {
        self.points[index]
    }

    /// Returns the wrist keypoint.
    pub fn wrist(&self) -> Landmark {
        self.points[WRIST]
    }

    /// Returns all keypoints.
    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }
}

impl Default for LandmarkSet {
    fn default() -> Self {
        Self::new([Landmark::default(); LANDMARK_COUNT])
    }
}

impl TryFrom<Vec<Landmark>> for LandmarkSet {
    type Error = LandmarkError;

    fn try_from(points: Vec<Landmark>) -> Result<Self, Self::Error> {
        Self::from_slice(&points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_gesture_parses_case_insensitively() {
        assert_eq!(Gesture::from_str("ROCK"), Ok(Gesture::Rock));
        assert_eq!(Gesture::from_str("Scissors"), Ok(Gesture::Scissors));
        assert!(Gesture::from_str("lizard").is_err());
        assert_eq!(Gesture::Paper.to_string(), "paper");
    }

    #[test]
    fn test_finger_indices_match_hand_skeleton() {
        assert_eq!((Finger::Index.pip(), Finger::Index.tip()), (6, 8));
        assert_eq!((Finger::Pinky.pip(), Finger::Pinky.tip()), (18, 20));
    }

    #[test]
    fn test_landmark_set_rejects_wrong_count() {
        let short = vec![Landmark::default(); 20];
        assert_eq!(
            LandmarkSet::try_from(short),
            Err(LandmarkError::WrongCount(20))
        );

        let full = vec![Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        let set = LandmarkSet::try_from(full).expect("21 points");
        assert_eq!(set.wrist(), Landmark::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn test_mode_hand_limits() {
        assert_eq!(Mode::Computer.max_hands(), 1);
        assert_eq!(Mode::Human.max_hands(), 2);
        assert_eq!(Mode::from_str("human"), Ok(Mode::Human));
    }
}
