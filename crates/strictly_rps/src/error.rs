//! Error types for session setup, capture and play.

use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};

/// Invalid session configuration. Raised before any round starts.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ValidationError {
    /// Round count was zero or negative.
    #[display("Round count must be positive, got {}", _0)]
    NonPositiveRounds(#[error(not(source))] i64),

    /// Round count does not fit the round counter.
    #[display("Round count {} is too large", _0)]
    TooManyRounds(#[error(not(source))] i64),

    /// Round count was not an integer.
    #[display("Round count must be an integer, got {:?}", _0)]
    NotAnInteger(#[error(not(source))] String),

    /// A required player name was blank.
    #[display("Player name for side {} must not be blank", _0)]
    BlankName(#[error(not(source))] &'static str),
}

/// Hard failure from the frame/detector collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum CaptureError {
    /// The capture device could not be opened or was lost.
    #[display("Capture device unavailable: {}", _0)]
    DeviceUnavailable(#[error(not(source))] String),

    /// The device is open but returned no frame.
    #[display("No frame available")]
    NoFrame,

    /// The landmark detector failed.
    #[display("Hand detector failed: {}", _0)]
    Detector(#[error(not(source))] String),
}

/// Why a session ended before all rounds were played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum AbortReason {
    /// An explicit stop request was honored.
    #[display("stopped on request")]
    Stopped,

    /// The capture collaborator failed.
    #[display("capture failed: {}", _0)]
    CaptureFailed(String),
}

impl From<CaptureError> for AbortReason {
    fn from(err: CaptureError) -> Self {
        AbortReason::CaptureFailed(err.to_string())
    }
}

/// Error returned by session operations.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum SessionError {
    /// Configuration rejected at creation.
    #[display("{}", _0)]
    #[from]
    Validation(ValidationError),

    /// The in-flight round was aborted; the session is now terminal.
    #[display("Round {} aborted: {}", round, reason)]
    Aborted {
        /// 1-based index of the aborted round.
        round: u32,
        /// Why the round was aborted.
        #[error(not(source))]
        reason: AbortReason,
    },

    /// `advance` was called on a finished or aborted session.
    #[display("Session is already over")]
    Terminal,

    /// `final_result` was called before the session ended.
    #[display("Session has not finished ({} of {} rounds played)", played, total)]
    NotFinished {
        /// Rounds sealed so far.
        played: u32,
        /// Configured round count.
        total: u32,
    },

    /// `advance` was called before warm-up completed.
    #[display("Warm-up has not completed")]
    NotWarmedUp,
}
