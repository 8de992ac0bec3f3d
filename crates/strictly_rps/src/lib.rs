//! Strictly RPS - gesture-driven rock/paper/scissors engine
//!
//! Turns detected hand skeletons into scored rounds, in human-vs-computer or
//! human-vs-human mode.
//!
//! # Architecture
//!
//! - **Classifier**: pure mapping from a 21-point hand skeleton to a gesture
//! - **Rules**: pure round resolution under cyclic dominance
//! - **Chooser**: the computer's move, from an injectable random source
//! - **Round**: typestate machine Init -> Countdown -> Capture -> Resolve -> Sealed
//! - **Session**: scores, round log and the multi-round loop
//! - **Device**: seams to the camera and landmark model, held by a scoped lease
//!
//! # Example
//!
//! ```no_run
//! use strictly_rps::{GameSession, HandTracker, Mode, SessionConfig, warmup};
//!
//! # async fn example(tracker: impl HandTracker + 'static) -> anyhow::Result<()> {
//! let config = SessionConfig::new(Mode::Computer, "Ada", None, 3)?;
//! let mut session = GameSession::create(config, tracker)?;
//!
//! let ready = warmup::paced(std::time::Duration::ZERO).join().await?;
//! session.mark_ready(ready);
//!
//! while !session.is_finished() {
//!     let record = session.advance().await?;
//!     println!("{}", session.describe(&record));
//! }
//! println!("Winner: {}", session.final_result()?.winner);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod chooser;
mod classifier;
mod device;
mod error;
mod round;
mod rules;
mod session;
mod types;

pub mod events;
pub mod invariants;
pub mod warmup;

// Crate-level exports - Domain types
pub use types::{
    Finger, Gesture, Landmark, LandmarkError, LandmarkSet, Mode, Outcome, Side, LANDMARK_COUNT,
    WRIST,
};

// Crate-level exports - Pure rules
pub use classifier::{classify, FingerPattern};
pub use rules::resolve;

// Crate-level exports - Computer opponent
pub use chooser::{choose, ComputerChooser, RandomChooser, ScriptedChooser};

// Crate-level exports - Collaborator seams
pub use device::{DeviceLease, FrameSource, HandLandmarkDetector, HandTracker, Pipeline, TrackerSettings};

// Crate-level exports - Errors
pub use error::{AbortReason, CaptureError, SessionError, ValidationError};

// Crate-level exports - Round engine
pub use round::{
    CaptureInputs, HandAssignment, RoundAborted, RoundCapture, RoundCountdown, RoundInit,
    RoundRecord, RoundResolve, RoundTiming,
};

// Crate-level exports - Session
pub use session::{
    play, FinalResult, GameSession, Scoreboard, SessionConfig, SessionState, COMPUTER_NAME,
    DEFAULT_NAME_A, DEFAULT_NAME_B, DRAW,
};

// Crate-level exports - Presentation
pub use events::{GameEvent, Renderer};
