//! Shared fixtures for session tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use strictly_rps::{
    CaptureError, Finger, GameSession, Gesture, HandTracker, Landmark, LandmarkSet,
    RoundTiming, ScriptedChooser, SessionConfig, TrackerSettings, LANDMARK_COUNT, WRIST,
};

/// Builds a skeleton that classifies as `gesture`, wrist at `wrist_x`.
pub fn hand(gesture: Gesture, wrist_x: f32) -> LandmarkSet {
    let extended = match gesture {
        Gesture::Rock => [false; 4],
        Gesture::Paper => [true; 4],
        Gesture::Scissors => [true, true, false, false],
    };
    let fingers = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];
    let mut points = [Landmark::new(wrist_x, 0.6, 0.0); LANDMARK_COUNT];
    points[WRIST] = Landmark::new(wrist_x, 0.9, 0.0);
    for (finger, up) in fingers.into_iter().zip(extended) {
        points[finger.pip()] = Landmark::new(wrist_x, 0.5, 0.0);
        points[finger.tip()] = Landmark::new(wrist_x, if up { 0.3 } else { 0.55 }, 0.0);
    }
    LandmarkSet::new(points)
}

/// What the tracker reports for one capture request.
#[derive(Debug, Clone)]
pub enum Shot {
    /// These gestures are visible, in detection order.
    Hands(Vec<Gesture>),
    /// The device fails.
    Fail,
}

/// Counters shared with a [`ScriptedTracker`].
#[derive(Debug, Clone, Default)]
pub struct DeviceCounters {
    pub opens: Arc<AtomicUsize>,
    pub releases: Arc<AtomicUsize>,
    pub captures: Arc<AtomicUsize>,
}

impl DeviceCounters {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }
}

/// Tracker that replays a fixed list of shots. Runs dry as "no hands".
#[derive(Debug)]
pub struct ScriptedTracker {
    shots: VecDeque<Shot>,
    counters: DeviceCounters,
}

impl ScriptedTracker {
    pub fn new(shots: impl IntoIterator<Item = Shot>) -> (Self, DeviceCounters) {
        let counters = DeviceCounters::default();
        let tracker = Self {
            shots: shots.into_iter().collect(),
            counters: counters.clone(),
        };
        (tracker, counters)
    }

    /// One single-hand shot per gesture.
    pub fn single(gestures: impl IntoIterator<Item = Gesture>) -> (Self, DeviceCounters) {
        Self::new(gestures.into_iter().map(|g| Shot::Hands(vec![g])))
    }
}

#[async_trait]
impl HandTracker for ScriptedTracker {
    async fn open(&mut self, _settings: &TrackerSettings) -> Result<(), CaptureError> {
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn latest_hands(&mut self) -> Result<Vec<LandmarkSet>, CaptureError> {
        self.counters.captures.fetch_add(1, Ordering::SeqCst);
        match self.shots.pop_front() {
            Some(Shot::Hands(gestures)) => Ok(gestures
                .into_iter()
                .enumerate()
                .map(|(i, g)| hand(g, 0.25 + 0.5 * i as f32))
                .collect()),
            Some(Shot::Fail) => Err(CaptureError::DeviceUnavailable("camera unplugged".into())),
            None => Ok(Vec::new()),
        }
    }

    fn release(&mut self) {
        self.counters.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Creates a warmed-up session with instant timing.
pub async fn ready_session(
    config: SessionConfig,
    tracker: ScriptedTracker,
    computer: impl IntoIterator<Item = Gesture>,
) -> GameSession {
    let mut session = GameSession::create(config, tracker)
        .expect("valid config")
        .with_timing(RoundTiming::instant())
        .with_chooser(ScriptedChooser::new(computer));
    let ready = strictly_rps::warmup::paced(Duration::ZERO)
        .join()
        .await
        .expect("warm-up");
    session.mark_ready(ready);
    session
}
