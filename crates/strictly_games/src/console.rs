//! Plain-text renderer for terminals.

use std::io::Write;
use strictly_rps::warmup::WarmupProgress;
use strictly_rps::{AbortReason, FinalResult, Gesture, Renderer, RoundRecord, Scoreboard};
use tracing::warn;

/// Writes game events as lines of text.
pub struct ConsoleRenderer<W> {
    out: W,
    name_a: String,
    name_b: String,
    last_stage: Option<String>,
}

impl ConsoleRenderer<std::io::Stdout> {
    /// Renders to standard output.
    pub fn stdout(name_a: impl Into<String>, name_b: impl Into<String>) -> Self {
        Self::new(std::io::stdout(), name_a, name_b)
    }
}

impl<W: Write> ConsoleRenderer<W> {
    /// Renders to `out`, labelling sides with the player names.
    pub fn new(out: W, name_a: impl Into<String>, name_b: impl Into<String>) -> Self {
        Self {
            out,
            name_a: name_a.into(),
            name_b: name_b.into(),
            last_stage: None,
        }
    }

    /// Shows warm-up progress, one line per stage plus completion.
    pub fn progress(&mut self, progress: &WarmupProgress) {
        let new_stage = self.last_stage.as_deref() != Some(progress.stage.as_str());
        if new_stage || progress.percent == 100 {
            self.line(format_args!("[{:>3}%] {}", progress.percent, progress.stage));
            self.last_stage = Some(progress.stage.clone());
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(args).and_then(|()| self.out.write_all(b"\n")) {
            warn!(error = %e, "Failed to write to console");
        }
    }
}

fn shown(gesture: Option<Gesture>) -> String {
    gesture.map_or_else(|| "-".to_string(), |g| g.to_string())
}

impl<W: Write + Send> Renderer for ConsoleRenderer<W> {
    fn countdown_tick(&mut self, round: u32, remaining: u32) {
        self.line(format_args!("Round {round}: {remaining}..."));
    }

    fn capturing(&mut self, _round: u32) {
        self.line(format_args!("Show your hand!"));
    }

    fn round_sealed(&mut self, record: &RoundRecord, scoreboard: &Scoreboard, summary: &str) {
        let (name_a, name_b) = (self.name_a.clone(), self.name_b.clone());
        self.line(format_args!(
            "{name_a}: {} | {name_b}: {}",
            shown(record.gesture_a()),
            shown(record.gesture_b())
        ));
        self.line(format_args!("{summary}"));
        self.line(format_args!(
            "Score after {}/{}: {name_a} {} - {} {name_b} (ties {})",
            scoreboard.rounds_played,
            scoreboard.total_rounds,
            scoreboard.score_a,
            scoreboard.score_b,
            scoreboard.ties
        ));
    }

    fn session_aborted(&mut self, round: u32, reason: &AbortReason) {
        self.line(format_args!("Game stopped during round {round}: {reason}"));
    }

    fn session_finished(&mut self, result: &FinalResult) {
        let (name_a, name_b) = (self.name_a.clone(), self.name_b.clone());
        self.line(format_args!("Game Over!"));
        self.line(format_args!(
            "Final score: {name_a} {} - {} {name_b}",
            result.score_a, result.score_b
        ));
        if result.is_draw() {
            self.line(format_args!("It's a draw!"));
        } else {
            self.line(format_args!("Winner: {}", result.winner));
        }
    }
}
