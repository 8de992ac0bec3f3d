//! Phase-specific typestate structs for a single round.
//!
//! Each phase is its own type and every transition consumes the previous
//! phase, so a round can only move forward:
//!
//! ```text
//! RoundInit -> RoundCountdown -> RoundCapture -> RoundResolve -> RoundRecord
//!                    \________________\______________> RoundAborted
//! ```
//!
//! A [`RoundRecord`] is the sealed phase; it has no mutators.

use super::chooser::ComputerChooser;
use super::classifier::classify;
use super::device::DeviceLease;
use super::error::AbortReason;
use super::events::{EventSender, GameEvent};
use super::rules::resolve;
use super::types::{Gesture, LandmarkSet, Mode, Outcome};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Configuration
// ─────────────────────────────────────────────────────────────

/// Timing of the countdown and capture phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTiming {
    /// Duration of one countdown tick.
    pub tick: Duration,
    /// Number of countdown ticks.
    pub ticks: u32,
    /// Upper bound on one capture request. Expiry means no hands.
    pub capture_timeout: Duration,
}

impl Default for RoundTiming {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(700),
            ticks: 3,
            capture_timeout: Duration::from_secs(2),
        }
    }
}

impl RoundTiming {
    /// Timing with no waiting at all, for tests and replays.
    pub fn instant() -> Self {
        Self {
            tick: Duration::ZERO,
            ticks: 3,
            capture_timeout: Duration::from_secs(2),
        }
    }
}

/// How detected hands are assigned to sides in human mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandAssignment {
    /// First detected hand is side A, second is side B.
    #[default]
    DetectionOrder,
    /// Hands are ordered by wrist x (leftmost first) before assignment.
    WristX,
}

impl HandAssignment {
    /// Splits detected hands into side A and side B.
    ///
    /// In computer mode only side A is read from the camera. Hands beyond
    /// the mode's limit are ignored.
    pub fn assign(
        self,
        mode: Mode,
        mut hands: Vec<LandmarkSet>,
    ) -> (Option<LandmarkSet>, Option<LandmarkSet>) {
        if self == HandAssignment::WristX {
            hands.sort_by(|a, b| a.wrist().x.total_cmp(&b.wrist().x));
        }
        let mut hands = hands.into_iter();
        let side_a = hands.next();
        let side_b = match mode {
            Mode::Computer => None,
            Mode::Human => hands.next(),
        };
        (side_a, side_b)
    }
}

// ─────────────────────────────────────────────────────────────
//  Init Phase
// ─────────────────────────────────────────────────────────────

/// Round with its number assigned and nothing recorded yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundInit {
    index: u32,
    sequence: u32,
}

impl RoundInit {
    /// Creates round `index` (1-based) at log position `sequence`.
    pub fn new(index: u32, sequence: u32) -> Self {
        Self { index, sequence }
    }

    /// Round number.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Enters the countdown unless a stop was requested.
    #[instrument(skip(self, stop), fields(round = self.index))]
    pub fn begin(self, stop: &CancellationToken) -> Result<RoundCountdown, RoundAborted> {
        if stop.is_cancelled() {
            return Err(RoundAborted::new(self.index, AbortReason::Stopped));
        }
        Ok(RoundCountdown {
            index: self.index,
            sequence: self.sequence,
        })
    }
}

// ─────────────────────────────────────────────────────────────
//  Countdown Phase
// ─────────────────────────────────────────────────────────────

/// Timed phase that synchronizes the players. No gesture is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundCountdown {
    index: u32,
    sequence: u32,
}

impl RoundCountdown {
    /// Runs every tick, then checks for a stop at the capture boundary.
    ///
    /// A stop request cuts the current tick short.
    #[instrument(skip(self, timing, stop, events), fields(round = self.index))]
    pub async fn run(
        self,
        timing: &RoundTiming,
        stop: &CancellationToken,
        events: Option<&EventSender>,
    ) -> Result<RoundCapture, RoundAborted> {
        for remaining in (1..=timing.ticks).rev() {
            if stop.is_cancelled() {
                break;
            }
            debug!(remaining, "Countdown tick");
            emit(
                events,
                GameEvent::CountdownTick {
                    round: self.index,
                    remaining,
                },
            );
            tokio::select! {
                _ = tokio::time::sleep(timing.tick) => {}
                _ = stop.cancelled() => {}
            }
        }

        if stop.is_cancelled() {
            info!("Stop requested during countdown");
            return Err(RoundAborted::new(self.index, AbortReason::Stopped));
        }

        Ok(RoundCapture {
            index: self.index,
            sequence: self.sequence,
        })
    }
}

// ─────────────────────────────────────────────────────────────
//  Capture Phase
// ─────────────────────────────────────────────────────────────

/// Phase that reads gestures exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundCapture {
    index: u32,
    sequence: u32,
}

/// Collaborators consulted during capture.
pub struct CaptureInputs<'a> {
    /// Session mode.
    pub mode: Mode,
    /// Hand-to-side assignment policy.
    pub assignment: HandAssignment,
    /// Phase timing.
    pub timing: &'a RoundTiming,
    /// Held tracker.
    pub lease: &'a mut DeviceLease,
    /// Computer opponent, consulted only in computer mode.
    pub chooser: &'a mut dyn ComputerChooser,
    /// Presentation channel.
    pub events: Option<&'a EventSender>,
}

impl RoundCapture {
    /// Requests the latest hands once and reads gestures from them.
    ///
    /// A capture timeout yields no hands. A tracker failure aborts the round.
    #[instrument(skip(self, inputs), fields(round = self.index, mode = %inputs.mode))]
    pub async fn capture(self, inputs: CaptureInputs<'_>) -> Result<RoundResolve, RoundAborted> {
        emit(inputs.events, GameEvent::Capturing { round: self.index });

        let tracker = inputs
            .lease
            .acquire()
            .await
            .map_err(|e| RoundAborted::new(self.index, e.into()))?;

        let computer = match inputs.mode {
            Mode::Computer => Some(inputs.chooser.choose()),
            Mode::Human => None,
        };

        let hands = match tokio::time::timeout(inputs.timing.capture_timeout, tracker.latest_hands())
            .await
        {
            Ok(Ok(hands)) => hands,
            Ok(Err(e)) => {
                warn!(error = %e, "Capture failed");
                return Err(RoundAborted::new(self.index, e.into()));
            }
            Err(_) => {
                warn!(timeout = ?inputs.timing.capture_timeout, "Capture timed out, treating as no hands");
                Vec::new()
            }
        };

        debug!(detected = hands.len(), "Hands detected");
        let (hand_a, hand_b) = inputs.assignment.assign(inputs.mode, hands);
        let gesture_a = hand_a.as_ref().map(classify);
        let gesture_b = match inputs.mode {
            Mode::Computer => computer,
            Mode::Human => hand_b.as_ref().map(classify),
        };

        Ok(RoundResolve {
            index: self.index,
            sequence: self.sequence,
            gesture_a,
            gesture_b,
        })
    }
}

// ─────────────────────────────────────────────────────────────
//  Resolve Phase
// ─────────────────────────────────────────────────────────────

/// Gestures obtained, outcome not yet computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResolve {
    index: u32,
    sequence: u32,
    gesture_a: Option<Gesture>,
    gesture_b: Option<Gesture>,
}

impl RoundResolve {
    /// Creates a resolve phase directly from gestures.
    pub fn new(index: u32, sequence: u32, gesture_a: Option<Gesture>, gesture_b: Option<Gesture>) -> Self {
        Self {
            index,
            sequence,
            gesture_a,
            gesture_b,
        }
    }

    /// Computes the outcome and seals the round.
    #[instrument(skip(self), fields(round = self.index))]
    pub fn seal(self) -> RoundRecord {
        let outcome = resolve(self.gesture_a, self.gesture_b);
        info!(
            gesture_a = ?self.gesture_a,
            gesture_b = ?self.gesture_b,
            %outcome,
            "Round sealed"
        );
        RoundRecord {
            index: self.index,
            gesture_a: self.gesture_a,
            gesture_b: self.gesture_b,
            outcome,
            sequence: self.sequence,
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Sealed Phase
// ─────────────────────────────────────────────────────────────

/// Immutable record of a finished round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    index: u32,
    gesture_a: Option<Gesture>,
    gesture_b: Option<Gesture>,
    outcome: Outcome,
    sequence: u32,
}

impl RoundRecord {
    /// 1-based round number.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Side A's gesture, if one was read.
    pub fn gesture_a(&self) -> Option<Gesture> {
        self.gesture_a
    }

    /// Side B's gesture, if one was read or chosen.
    pub fn gesture_b(&self) -> Option<Gesture> {
        self.gesture_b
    }

    /// Round outcome.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// 0-based position in the session log.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

// ─────────────────────────────────────────────────────────────
//  Aborted
// ─────────────────────────────────────────────────────────────

/// Round that ended without a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundAborted {
    index: u32,
    reason: AbortReason,
}

impl RoundAborted {
    fn new(index: u32, reason: AbortReason) -> Self {
        Self { index, reason }
    }

    /// Round that was in flight.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Why the round stopped.
    pub fn reason(&self) -> &AbortReason {
        &self.reason
    }

    /// Consumes the abort, returning its reason.
    pub fn into_reason(self) -> AbortReason {
        self.reason
    }
}

fn emit(events: Option<&EventSender>, event: GameEvent) {
    if let Some(tx) = events {
        if tx.send(event).is_err() {
            debug!("Presentation channel closed, event dropped");
        }
    }
}
