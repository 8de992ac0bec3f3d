//! Messages from the game-logic task to the presentation layer.

use super::error::AbortReason;
use super::round::RoundRecord;
use super::session::{FinalResult, Scoreboard};
use tokio::sync::mpsc;
use tracing::{debug, instrument};

/// Events sent from the session to whoever renders it.
///
/// Every payload is an owned snapshot; the renderer never sees live session
/// state.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// One countdown tick before capture.
    CountdownTick {
        /// 1-based round index.
        round: u32,
        /// Ticks left including this one (3, 2, 1 by default).
        remaining: u32,
    },
    /// The round is reading gestures.
    Capturing {
        /// 1-based round index.
        round: u32,
    },
    /// A round was sealed and scored.
    RoundSealed {
        /// The sealed record.
        record: RoundRecord,
        /// Scores after folding in this round.
        scoreboard: Scoreboard,
        /// Human-readable result line.
        summary: String,
    },
    /// The session ended early.
    SessionAborted {
        /// Round that was in flight.
        round: u32,
        /// Why it stopped.
        reason: AbortReason,
    },
    /// The session is over and its final result is available.
    SessionFinished(FinalResult),
}

/// Sender half handed to the session.
pub type EventSender = mpsc::UnboundedSender<GameEvent>;

/// Receiver half held by the presentation layer.
pub type EventReceiver = mpsc::UnboundedReceiver<GameEvent>;

/// Creates an event channel.
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Draws game events. Has no access to session state.
///
/// Implementors override the hooks they care about; [`Renderer::render`]
/// routes each event to its hook.
pub trait Renderer: Send {
    /// One countdown tick.
    fn countdown_tick(&mut self, _round: u32, _remaining: u32) {}

    /// Gestures are being read.
    fn capturing(&mut self, _round: u32) {}

    /// A round was sealed.
    fn round_sealed(&mut self, record: &RoundRecord, scoreboard: &Scoreboard, summary: &str);

    /// The session ended early.
    fn session_aborted(&mut self, _round: u32, _reason: &AbortReason) {}

    /// The session is over.
    fn session_finished(&mut self, result: &FinalResult);

    /// Presents one event.
    fn render(&mut self, event: &GameEvent) {
        match event {
            GameEvent::CountdownTick { round, remaining } => self.countdown_tick(*round, *remaining),
            GameEvent::Capturing { round } => self.capturing(*round),
            GameEvent::RoundSealed {
                record,
                scoreboard,
                summary,
            } => self.round_sealed(record, scoreboard, summary),
            GameEvent::SessionAborted { round, reason } => self.session_aborted(*round, reason),
            GameEvent::SessionFinished(result) => self.session_finished(result),
        }
    }
}

/// Forwards every event from `events` to `renderer` until the session side
/// hangs up.
#[instrument(skip_all)]
pub async fn pump<R: Renderer + ?Sized>(mut events: EventReceiver, renderer: &mut R) -> usize {
    let mut count = 0;
    while let Some(event) = events.recv().await {
        renderer.render(&event);
        count += 1;
    }
    debug!(count, "Event channel closed");
    count
}
