//! Game session: configuration, scores, round log and the multi-round loop.

use super::chooser::{ComputerChooser, RandomChooser};
use super::device::{DeviceLease, HandTracker, TrackerSettings};
use super::error::{AbortReason, SessionError, ValidationError};
use super::events::{EventSender, GameEvent};
use super::invariants;
use super::round::{CaptureInputs, HandAssignment, RoundAborted, RoundInit, RoundRecord, RoundTiming};
use super::types::{Mode, Outcome};
use super::warmup::WarmupReady;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Default name for side A.
pub const DEFAULT_NAME_A: &str = "Player 1";
/// Default name for side B in human mode.
pub const DEFAULT_NAME_B: &str = "Player 2";
/// Name of side B in computer mode.
pub const COMPUTER_NAME: &str = "Computer";
/// Winner label when scores are equal.
pub const DRAW: &str = "Draw";

// ─────────────────────────────────────────────────────────────
//  Configuration
// ─────────────────────────────────────────────────────────────

/// Validated session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Game mode.
    mode: Mode,
    /// Side A's display name.
    name_a: String,
    /// Side B's display name.
    name_b: String,
    /// Number of rounds to play.
    total_rounds: u32,
}

impl SessionConfig {
    /// Validates raw configuration.
    ///
    /// Blank or missing names fall back to defaults, except that a name given
    /// for side B in human mode must not be blank. In computer mode side B is
    /// always the computer.
    #[instrument(skip(name_a, name_b))]
    pub fn new(
        mode: Mode,
        name_a: impl Into<String>,
        name_b: Option<String>,
        total_rounds: i64,
    ) -> Result<Self, ValidationError> {
        let total_rounds = validate_rounds(total_rounds)?;

        let name_a = name_a.into().trim().to_string();
        let name_a = if name_a.is_empty() {
            DEFAULT_NAME_A.to_string()
        } else {
            name_a
        };

        let name_b = match (mode, name_b) {
            (Mode::Computer, _) => COMPUTER_NAME.to_string(),
            (Mode::Human, None) => DEFAULT_NAME_B.to_string(),
            (Mode::Human, Some(name)) => {
                let name = name.trim();
                if name.is_empty() {
                    warn!("Blank name for side B in human mode");
                    return Err(ValidationError::BlankName("B"));
                }
                name.to_string()
            }
        };

        Ok(Self {
            mode,
            name_a,
            name_b,
            total_rounds,
        })
    }

    /// Parses a round count typed by a user.
    pub fn parse_rounds(input: &str) -> Result<i64, ValidationError> {
        input
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::NotAnInteger(input.to_string()))
    }

    /// Display name for `outcome`'s winner, if any.
    pub fn winner_name(&self, outcome: Outcome) -> Option<&str> {
        match outcome {
            Outcome::WinA => Some(&self.name_a),
            Outcome::WinB => Some(&self.name_b),
            Outcome::Tie | Outcome::Incomplete => None,
        }
    }
}

fn validate_rounds(total_rounds: i64) -> Result<u32, ValidationError> {
    if total_rounds <= 0 {
        return Err(ValidationError::NonPositiveRounds(total_rounds));
    }
    u32::try_from(total_rounds).map_err(|_| ValidationError::TooManyRounds(total_rounds))
}

// ─────────────────────────────────────────────────────────────
//  Snapshots
// ─────────────────────────────────────────────────────────────

/// Lifecycle of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Created, no round played yet.
    Ready,
    /// At least one round played, more to go.
    InProgress,
    /// All configured rounds played.
    Finished,
    /// Ended early.
    Aborted(AbortReason),
}

/// Score snapshot handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    /// Rounds won by side A.
    pub score_a: u32,
    /// Rounds won by side B.
    pub score_b: u32,
    /// Tied rounds.
    pub ties: u32,
    /// Rounds without a readable gesture.
    pub incomplete: u32,
    /// Rounds sealed so far.
    pub rounds_played: u32,
    /// Configured round count.
    pub total_rounds: u32,
}

/// Result of a finished or aborted session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalResult {
    /// Rounds won by side A.
    pub score_a: u32,
    /// Rounds won by side B.
    pub score_b: u32,
    /// Tied rounds.
    pub ties: u32,
    /// Rounds without a readable gesture.
    pub incomplete: u32,
    /// Rounds sealed before the session ended.
    pub rounds_played: u32,
    /// Winner's name, or `"Draw"` on equal scores.
    pub winner: String,
    /// Set if the session ended early.
    pub aborted: Option<AbortReason>,
}

impl FinalResult {
    /// Returns true if the scores were level.
    pub fn is_draw(&self) -> bool {
        self.winner == DRAW
    }
}

// ─────────────────────────────────────────────────────────────
//  Session
// ─────────────────────────────────────────────────────────────

/// A full game from configuration to final result.
///
/// The session is the only writer of its scores and log. Callers drive it
/// one round at a time with [`GameSession::advance`] and receive owned
/// copies of each sealed record.
pub struct GameSession {
    config: SessionConfig,
    timing: RoundTiming,
    assignment: HandAssignment,
    lease: DeviceLease,
    chooser: Box<dyn ComputerChooser>,
    events: Option<EventSender>,
    stop: CancellationToken,
    warmed_up: bool,
    current_round: u32,
    score_a: u32,
    score_b: u32,
    ties: u32,
    incomplete: u32,
    round_log: Vec<RoundRecord>,
    state: SessionState,
}

impl GameSession {
    /// Creates a session around `tracker`.
    ///
    /// The round count is re-validated. The computer opponent draws from
    /// operating-system entropy; use [`GameSession::with_chooser`] to inject
    /// a seeded or scripted one.
    #[instrument(skip(tracker), fields(mode = %config.mode, rounds = config.total_rounds))]
    pub fn create(
        config: SessionConfig,
        tracker: impl HandTracker + 'static,
    ) -> Result<Self, ValidationError> {
        validate_rounds(i64::from(config.total_rounds))?;
        let settings = TrackerSettings::new(config.mode.max_hands());
        info!(name_a = %config.name_a, name_b = %config.name_b, "Creating game session");
        Ok(Self {
            config,
            timing: RoundTiming::default(),
            assignment: HandAssignment::default(),
            lease: DeviceLease::new(Box::new(tracker), settings),
            chooser: Box::new(RandomChooser::from_entropy()),
            events: None,
            stop: CancellationToken::new(),
            warmed_up: false,
            current_round: 0,
            score_a: 0,
            score_b: 0,
            ties: 0,
            incomplete: 0,
            round_log: Vec::new(),
            state: SessionState::Ready,
        })
    }

    /// Replaces the computer opponent.
    pub fn with_chooser(mut self, chooser: impl ComputerChooser + 'static) -> Self {
        self.chooser = Box::new(chooser);
        self
    }

    /// Replaces the round timing.
    pub fn with_timing(mut self, timing: RoundTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Replaces the hand assignment policy.
    pub fn with_assignment(mut self, assignment: HandAssignment) -> Self {
        self.assignment = assignment;
        self
    }

    /// Replaces the tracker's detection thresholds.
    pub fn with_confidence(mut self, detection: f32, tracking: f32) -> Self {
        let settings = self.lease.settings().clone().with_confidence(detection, tracking);
        self.lease.reconfigure(settings);
        self
    }

    /// Sends presentation events to `events`.
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Records that warm-up finished. Required before the first round.
    pub fn mark_ready(&mut self, _ready: WarmupReady) {
        debug!("Warm-up joined");
        self.warmed_up = true;
    }

    /// Token that stops the session at the next phase boundary.
    pub fn stop_handle(&self) -> CancellationToken {
        self.stop.clone()
    }

    /// Plays one round and folds its outcome into the score.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Terminal`] if the session already ended.
    /// - [`SessionError::NotWarmedUp`] before [`GameSession::mark_ready`].
    /// - [`SessionError::Aborted`] if a stop was requested or capture failed;
    ///   the session is terminal afterwards and the device is released.
    #[instrument(skip(self), fields(round = self.current_round + 1, total = self.config.total_rounds))]
    pub async fn advance(&mut self) -> Result<RoundRecord, SessionError> {
        if self.is_finished() {
            warn!("advance called on a finished session");
            return Err(SessionError::Terminal);
        }
        if !self.warmed_up {
            return Err(SessionError::NotWarmedUp);
        }

        let init = RoundInit::new(self.current_round + 1, self.round_log.len() as u32);
        match self.run_round(init).await {
            Ok(record) => {
                self.seal(record);
                Ok(record)
            }
            Err(aborted) => Err(self.abort(aborted)),
        }
    }

    async fn run_round(&mut self, init: RoundInit) -> Result<RoundRecord, RoundAborted> {
        let countdown = init.begin(&self.stop)?;
        let capture = countdown
            .run(&self.timing, &self.stop, self.events.as_ref())
            .await?;

        let resolve = capture
            .capture(CaptureInputs {
                mode: self.config.mode,
                assignment: self.assignment,
                timing: &self.timing,
                lease: &mut self.lease,
                chooser: self.chooser.as_mut(),
                events: self.events.as_ref(),
            })
            .await?;
        Ok(resolve.seal())
    }

    fn seal(&mut self, record: RoundRecord) {
        match record.outcome() {
            Outcome::WinA => self.score_a += 1,
            Outcome::WinB => self.score_b += 1,
            Outcome::Tie => self.ties += 1,
            Outcome::Incomplete => self.incomplete += 1,
        }
        self.round_log.push(record);
        self.current_round += 1;
        self.state = if self.current_round == self.config.total_rounds {
            SessionState::Finished
        } else {
            SessionState::InProgress
        };

        debug_assert!(
            invariants::check_session(self).is_ok(),
            "session invariants violated after round {}",
            record.index()
        );

        let summary = self.describe(&record);
        info!(round = record.index(), %summary, score_a = self.score_a, score_b = self.score_b, "Round scored");
        self.emit(GameEvent::RoundSealed {
            record,
            scoreboard: self.scoreboard(),
            summary,
        });

        if self.state == SessionState::Finished {
            self.lease.release();
            self.finish();
        }
    }

    fn abort(&mut self, aborted: RoundAborted) -> SessionError {
        let round = aborted.index();
        let reason = aborted.into_reason();
        warn!(round, %reason, rounds_played = self.current_round, "Session aborted");
        self.lease.release();
        self.state = SessionState::Aborted(reason.clone());
        self.emit(GameEvent::SessionAborted {
            round,
            reason: reason.clone(),
        });
        self.finish();
        SessionError::Aborted { round, reason }
    }

    fn finish(&self) {
        if let Ok(result) = self.final_result() {
            info!(winner = %result.winner, score_a = result.score_a, score_b = result.score_b, "Session over");
            self.emit(GameEvent::SessionFinished(result));
        }
    }

    fn emit(&self, event: GameEvent) {
        if let Some(tx) = &self.events {
            if tx.send(event).is_err() {
                debug!("Presentation channel closed, event dropped");
            }
        }
    }

    /// True once every round is played or the session was aborted.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished | SessionState::Aborted(_))
    }

    /// Final scores and winner.
    ///
    /// Available once the session is finished or aborted; an aborted session
    /// reports the rounds completed before the abort.
    pub fn final_result(&self) -> Result<FinalResult, SessionError> {
        if !self.is_finished() {
            return Err(SessionError::NotFinished {
                played: self.current_round,
                total: self.config.total_rounds,
            });
        }

        let winner = match self.score_a.cmp(&self.score_b) {
            std::cmp::Ordering::Greater => self.config.name_a.clone(),
            std::cmp::Ordering::Less => self.config.name_b.clone(),
            std::cmp::Ordering::Equal => DRAW.to_string(),
        };

        Ok(FinalResult {
            score_a: self.score_a,
            score_b: self.score_b,
            ties: self.ties,
            incomplete: self.incomplete,
            rounds_played: self.current_round,
            winner,
            aborted: match &self.state {
                SessionState::Aborted(reason) => Some(reason.clone()),
                _ => None,
            },
        })
    }

    /// Presentation line for a sealed round.
    pub fn describe(&self, record: &RoundRecord) -> String {
        match record.outcome() {
            Outcome::Tie => "It's a Tie!".to_string(),
            Outcome::Incomplete => match self.config.mode {
                Mode::Computer => "No gesture detected!".to_string(),
                Mode::Human => "Waiting for both players...".to_string(),
            },
            outcome => {
                let name = self.config.winner_name(outcome).unwrap_or_default();
                format!("{name} Wins!")
            }
        }
    }

    /// Current score snapshot.
    pub fn scoreboard(&self) -> Scoreboard {
        Scoreboard {
            score_a: self.score_a,
            score_b: self.score_b,
            ties: self.ties,
            incomplete: self.incomplete,
            rounds_played: self.current_round,
            total_rounds: self.config.total_rounds,
        }
    }

    /// Validated configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Rounds sealed so far.
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Configured round count.
    pub fn total_rounds(&self) -> u32 {
        self.config.total_rounds
    }

    /// Sealed rounds in order.
    pub fn round_log(&self) -> &[RoundRecord] {
        &self.round_log
    }

    /// Lifecycle state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// True while the tracker is held open.
    pub fn device_open(&self) -> bool {
        self.lease.is_open()
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("current_round", &self.current_round)
            .field("scoreboard", &self.scoreboard())
            .finish_non_exhaustive()
    }
}

/// Plays every remaining round, pausing `result_hold` after each one so the
/// result can be shown.
///
/// Returns the final result, including after an abort.
#[instrument(skip(session))]
pub async fn play(session: &mut GameSession, result_hold: Duration) -> Result<FinalResult, SessionError> {
    while !session.is_finished() {
        match session.advance().await {
            Ok(record) => {
                debug!(round = record.index(), "Holding result");
                if !session.is_finished() && !result_hold.is_zero() {
                    tokio::time::sleep(result_hold).await;
                }
            }
            Err(SessionError::Aborted { round, reason }) => {
                info!(round, %reason, "Play ended early");
                break;
            }
            Err(e) => return Err(e),
        }
    }
    session.final_result()
}
