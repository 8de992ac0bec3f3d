//! First-class session invariants.
//!
//! Invariants are logical properties that must hold after every round.
//! They are checked in debug builds and can be tested independently.

use super::session::GameSession;
use tracing::warn;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3, I4> InvariantSet<S> for (I1, I2, I3, I4)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
    I4: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let checks = [
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
            (I4::holds(state), I4::description()),
        ];
        let violations: Vec<_> = checks
            .into_iter()
            .filter(|(holds, _)| !holds)
            .map(|(_, description)| InvariantViolation::new(description))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Round index stays within `0..=total_rounds`.
pub struct RoundBounds;

impl Invariant<GameSession> for RoundBounds {
    fn holds(session: &GameSession) -> bool {
        session.current_round() <= session.total_rounds() && session.total_rounds() >= 1
    }

    fn description() -> &'static str {
        "current round must stay within 0..=total rounds"
    }
}

/// Exactly one log entry per played round.
pub struct LogMatchesRound;

impl Invariant<GameSession> for LogMatchesRound {
    fn holds(session: &GameSession) -> bool {
        session.round_log().len() == session.current_round() as usize
    }

    fn description() -> &'static str {
        "round log length must equal rounds played"
    }
}

/// Wins and ties account for every scored round.
pub struct ScoresAccountForRounds;

impl Invariant<GameSession> for ScoresAccountForRounds {
    fn holds(session: &GameSession) -> bool {
        let board = session.scoreboard();
        let scored = session
            .round_log()
            .iter()
            .filter(|r| !r.outcome().is_incomplete())
            .count() as u32;
        board.score_a + board.score_b + board.ties == scored
    }

    fn description() -> &'static str {
        "wins plus ties must equal completed rounds"
    }
}

/// Records are appended in increasing round order.
pub struct LogOrdered;

impl Invariant<GameSession> for LogOrdered {
    fn holds(session: &GameSession) -> bool {
        session
            .round_log()
            .iter()
            .enumerate()
            .all(|(i, r)| r.sequence() as usize == i && r.index() as usize == i + 1)
    }

    fn description() -> &'static str {
        "records must be sealed in increasing round order"
    }
}

/// Every invariant a session must satisfy.
pub type SessionInvariants = (RoundBounds, LogMatchesRound, ScoresAccountForRounds, LogOrdered);

/// Checks all session invariants, logging any violation.
pub fn check_session(session: &GameSession) -> Result<(), Vec<InvariantViolation>> {
    SessionInvariants::check_all(session).inspect_err(|violations| {
        for v in violations {
            warn!(violation = %v.description, "Session invariant violated");
        }
    })
}
