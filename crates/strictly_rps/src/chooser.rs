//! Gesture selection for the computer-controlled side.

use super::types::Gesture;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::collections::VecDeque;
use tracing::{debug, instrument};

const GESTURES: [Gesture; 3] = [Gesture::Rock, Gesture::Paper, Gesture::Scissors];

/// Draws a gesture uniformly from `rng`.
pub fn choose<R: Rng + ?Sized>(rng: &mut R) -> Gesture {
    GESTURES[rng.random_range(0..GESTURES.len())]
}

/// Source of the computer's gesture, one call per round.
pub trait ComputerChooser: Send {
    /// Picks the gesture for the next round.
    fn choose(&mut self) -> Gesture;
}

/// Uniform random chooser with an injectable seed.
#[derive(Debug, Clone)]
pub struct RandomChooser {
    rng: StdRng,
}

impl RandomChooser {
    /// Creates a chooser that replays the same sequence for the same seed.
    #[instrument]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a chooser seeded once from operating-system entropy.
    #[instrument]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a chooser from an optional seed.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl ComputerChooser for RandomChooser {
    fn choose(&mut self) -> Gesture {
        let gesture = choose(&mut self.rng);
        debug!(%gesture, "Computer chose gesture");
        gesture
    }
}

/// Replays a fixed gesture sequence, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedChooser {
    script: VecDeque<Gesture>,
}

impl ScriptedChooser {
    /// Creates a chooser from a script.
    ///
    /// An empty script always plays rock.
    pub fn new(script: impl IntoIterator<Item = Gesture>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl ComputerChooser for ScriptedChooser {
    fn choose(&mut self) -> Gesture {
        match self.script.pop_front() {
            Some(gesture) => {
                self.script.push_back(gesture);
                gesture
            }
            None => Gesture::Rock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = RandomChooser::seeded(42);
        let mut b = RandomChooser::seeded(42);
        let left: Vec<_> = (0..20).map(|_| a.choose()).collect();
        let right: Vec<_> = (0..20).map(|_| b.choose()).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_random_chooser_covers_all_gestures() {
        let mut chooser = RandomChooser::seeded(7);
        let seen: HashSet<_> = (0..200).map(|_| chooser.choose()).collect();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_scripted_chooser_cycles() {
        let mut chooser = ScriptedChooser::new([Gesture::Scissors, Gesture::Paper]);
        let picks: Vec<_> = (0..3).map(|_| chooser.choose()).collect();
        assert_eq!(picks, vec![Gesture::Scissors, Gesture::Paper, Gesture::Scissors]);
    }

    #[test]
    fn test_free_choose_accepts_any_rng() {
        let mut rng = StdRng::seed_from_u64(1);
        let g = choose(&mut rng);
        assert!(GESTURES.contains(&g));
    }
}
