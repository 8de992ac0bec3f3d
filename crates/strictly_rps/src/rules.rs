//! Round resolution rules.

use super::types::{Gesture, Outcome};
use tracing::instrument;

/// Decides a round from whatever gestures were read.
///
/// A missing gesture on either side makes the round incomplete; otherwise
/// equal gestures tie and cyclic dominance picks the winner.
#[instrument]
pub fn resolve(gesture_a: Option<Gesture>, gesture_b: Option<Gesture>) -> Outcome {
    match (gesture_a, gesture_b) {
        (Some(a), Some(b)) if a == b => Outcome::Tie,
        (Some(a), Some(b)) if a.beats(b) => Outcome::WinA,
        (Some(_), Some(_)) => Outcome::WinB,
        _ => Outcome::Incomplete,
    }
}
