//! Simulated camera and landmark model.
//!
//! Lets a full session run without hardware. The camera produces frames that
//! carry the gestures "in view"; the detector turns each one into a plausible
//! 21-point skeleton with a little positional noise.

use async_trait::async_trait;
use derive_more::{Display, Error};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::str::FromStr;
use strictly_rps::{
    CaptureError, Finger, FrameSource, Gesture, HandLandmarkDetector, Landmark, LandmarkSet, Mode,
    Pipeline, TrackerSettings, LANDMARK_COUNT, WRIST,
};
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument};

/// Noise added to every simulated coordinate.
const JITTER: f32 = 0.01;

/// A frame from the simulated camera: the gestures in view, in detection
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimFrame {
    hands: Vec<Gesture>,
}

/// Unknown gesture in a `--script` argument.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Unknown gesture {:?} in script round {}", token, round)]
pub struct ScriptError {
    /// 1-based round the token appeared in.
    pub round: usize,
    /// The offending token.
    pub token: String,
}

/// Parses a gesture script.
///
/// Rounds are separated by `;`, hands within a round by `,`. A blank round
/// shows no hands.
pub fn parse_script(script: &str) -> Result<Vec<Vec<Gesture>>, ScriptError> {
    script
        .split(';')
        .enumerate()
        .map(|(i, round)| {
            round
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(|token| {
                    Gesture::from_str(token).map_err(|_| ScriptError {
                        round: i + 1,
                        token: token.to_string(),
                    })
                })
                .collect()
        })
        .collect()
}

enum Feed {
    Scripted(VecDeque<Vec<Gesture>>),
    Random {
        rng: StdRng,
        hands: usize,
        presence: f64,
    },
}

/// Camera stand-in that shows scripted or random gestures.
pub struct SimulatedCamera {
    feed: Feed,
    open: bool,
    frames: u64,
}

impl SimulatedCamera {
    /// Replays `frames` in order, then shows no hands.
    pub fn scripted(frames: Vec<Vec<Gesture>>) -> Self {
        Self {
            feed: Feed::Scripted(frames.into()),
            open: false,
            frames: 0,
        }
    }

    /// Shows up to `hands` random gestures per frame, each in view with
    /// probability `presence`.
    pub fn random(hands: usize, presence: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            feed: Feed::Random {
                rng,
                hands,
                presence: presence.clamp(0.0, 1.0),
            },
            open: false,
            frames: 0,
        }
    }
}

#[async_trait]
impl FrameSource for SimulatedCamera {
    type Frame = SimFrame;

    async fn open(&mut self) -> Result<(), CaptureError> {
        info!("Simulated camera opened");
        self.open = true;
        Ok(())
    }

    async fn capture(&mut self) -> Result<SimFrame, CaptureError> {
        if !self.open {
            return Err(CaptureError::DeviceUnavailable(
                "simulated camera is not open".to_string(),
            ));
        }
        let hands = match &mut self.feed {
            Feed::Scripted(frames) => frames.pop_front().unwrap_or_default(),
            Feed::Random {
                rng,
                hands,
                presence,
            } => {
                let mut shown = Vec::with_capacity(*hands);
                for _ in 0..*hands {
                    if rng.random_bool(*presence) {
                        shown.push(strictly_rps::choose(rng));
                    }
                }
                shown
            }
        };
        self.frames += 1;
        debug!(frame = self.frames, ?hands, "Captured simulated frame");
        Ok(SimFrame { hands })
    }

    fn release(&mut self) {
        if self.open {
            info!(frames = self.frames, "Simulated camera released");
            self.open = false;
        }
    }
}

/// Landmark model stand-in that draws a skeleton for each gesture in view.
pub struct SyntheticDetector {
    rng: StdRng,
}

impl SyntheticDetector {
    /// Creates a detector with its own noise source.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }
}

impl HandLandmarkDetector for SyntheticDetector {
    type Frame = SimFrame;

    fn configure(&mut self, settings: &TrackerSettings) {
        debug!(
            max_hands = settings.max_hands(),
            detection = settings.min_detection_confidence(),
            tracking = settings.min_tracking_confidence(),
            "Synthetic detector configured"
        );
    }

    fn detect(&mut self, frame: &SimFrame) -> Result<Vec<LandmarkSet>, CaptureError> {
        let slots = frame.hands.len() as f32;
        Ok(frame
            .hands
            .iter()
            .enumerate()
            .map(|(i, gesture)| {
                let wrist_x = (i as f32 + 0.5) / slots;
                skeleton(*gesture, wrist_x, &mut self.rng)
            })
            .collect())
    }
}

fn is_extended(gesture: Gesture, finger: Finger) -> bool {
    match gesture {
        Gesture::Rock => false,
        Gesture::Paper => true,
        Gesture::Scissors => matches!(finger, Finger::Index | Finger::Middle),
    }
}

/// Draws an upright hand showing `gesture` with its wrist at `wrist_x`.
///
/// Image y grows downward. Extended fingers climb from knuckle to tip; curled
/// fingers fold back so the tip sits below the middle joint.
pub fn skeleton(gesture: Gesture, wrist_x: f32, rng: &mut impl Rng) -> LandmarkSet {
    let mut noise = || rng.random_range(-JITTER..=JITTER);
    let mut points = [Landmark::default(); LANDMARK_COUNT];
    points[WRIST] = Landmark::new(wrist_x + noise(), 0.9 + noise(), 0.0);

    // Thumb: landmarks 1..=4, off to one side.
    for (k, point) in points[1..=4].iter_mut().enumerate() {
        let k = k as f32;
        *point = Landmark::new(wrist_x - 0.06 - 0.02 * k + noise(), 0.82 - 0.03 * k + noise(), 0.0);
    }

    for (column, finger) in Finger::iter().enumerate() {
        let x = wrist_x - 0.03 + 0.025 * column as f32;
        let ys = if is_extended(gesture, finger) {
            [0.7, 0.6, 0.5, 0.4]
        } else {
            [0.7, 0.62, 0.67, 0.69]
        };
        let mcp = finger.pip() - 1;
        for (offset, y) in ys.into_iter().enumerate() {
            points[mcp + offset] = Landmark::new(x + noise(), y + noise(), 0.0);
        }
    }

    LandmarkSet::new(points)
}

/// Builds the simulated tracker for `mode`.
///
/// With a script the camera replays it; otherwise it shows random gestures
/// for as many hands as the mode reads.
#[instrument(skip(script))]
pub fn tracker(
    mode: Mode,
    script: Option<Vec<Vec<Gesture>>>,
    seed: Option<u64>,
    presence: f64,
) -> Pipeline<SimulatedCamera, SyntheticDetector> {
    let camera = match script {
        Some(frames) => {
            info!(frames = frames.len(), "Using scripted camera");
            SimulatedCamera::scripted(frames)
        }
        None => SimulatedCamera::random(mode.max_hands(), presence, seed),
    };
    let detector = SyntheticDetector::new(seed.map(|s| s.wrapping_add(1)));
    Pipeline::new(camera, detector)
}
