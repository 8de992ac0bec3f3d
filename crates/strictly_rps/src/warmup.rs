//! One-shot preparation that must finish before the first round.
//!
//! Warm-up runs as its own task and reports coarse progress over a channel.
//! Joining it is the only way to obtain a [`WarmupReady`] token, and a
//! session will not advance without one.

use derive_more::{Display, Error};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Coarse progress of the warm-up task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarmupProgress {
    /// Completion from 0 to 100.
    pub percent: u8,
    /// Current stage label.
    pub stage: String,
}

/// Warm-up failure.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum WarmupError {
    /// The preparation step reported a failure.
    #[display("Warm-up failed: {}", _0)]
    Failed(#[error(not(source))] String),

    /// The warm-up task panicked or was cancelled.
    #[display("Warm-up task did not complete: {}", _0)]
    Interrupted(#[error(not(source))] String),
}

/// Proof that warm-up completed.
#[derive(Debug)]
pub struct WarmupReady {
    _private: (),
}

/// Progress sink handed to the preparation step.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    tx: mpsc::UnboundedSender<WarmupProgress>,
}

impl ProgressReporter {
    /// Reports progress. Ignored once nobody is listening.
    pub fn report(&self, percent: u8, stage: impl Into<String>) {
        let progress = WarmupProgress {
            percent: percent.min(100),
            stage: stage.into(),
        };
        if self.tx.send(progress).is_err() {
            debug!("Warm-up progress listener gone");
        }
    }
}

/// Stage labels shown while warming up, keyed by the percent they start at.
pub const STAGES: [(u8, &str); 4] = [
    (0, "Initializing game..."),
    (25, "Initializing camera..."),
    (50, "Loading AI models..."),
    (75, "Preparing game environment..."),
];

/// Spawns `prepare` as the warm-up task.
#[instrument(skip_all)]
pub fn spawn<F, Fut>(prepare: F) -> WarmupHandle
where
    F: FnOnce(ProgressReporter) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), WarmupError>> + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let reporter = ProgressReporter { tx };
    info!("Starting warm-up");
    let task = tokio::spawn(prepare(reporter));
    WarmupHandle { progress: rx, task }
}

/// Spawns a paced warm-up that walks 0..=100 percent, one `step` per percent,
/// announcing each stage in [`STAGES`].
pub fn paced(step: Duration) -> WarmupHandle {
    spawn(move |reporter| async move {
        let mut stage = STAGES[0].1;
        for percent in 0..=100u8 {
            if let Some((_, label)) = STAGES.iter().find(|(at, _)| *at == percent) {
                stage = *label;
            }
            reporter.report(percent, stage);
            if !step.is_zero() {
                tokio::time::sleep(step).await;
            }
        }
        Ok(())
    })
}

/// Handle to a running warm-up.
#[derive(Debug)]
pub struct WarmupHandle {
    progress: mpsc::UnboundedReceiver<WarmupProgress>,
    task: JoinHandle<Result<(), WarmupError>>,
}

impl WarmupHandle {
    /// Receives the next progress update, or `None` once warm-up has ended.
    pub async fn next_progress(&mut self) -> Option<WarmupProgress> {
        self.progress.recv().await
    }

    /// Waits for warm-up to finish. This is the single join point.
    #[instrument(skip(self))]
    pub async fn join(self) -> Result<WarmupReady, WarmupError> {
        match self.task.await {
            Ok(Ok(())) => {
                info!("Warm-up complete");
                Ok(WarmupReady { _private: () })
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Warm-up failed");
                Err(e)
            }
            Err(e) => {
                warn!(error = %e, "Warm-up task interrupted");
                Err(WarmupError::Interrupted(e.to_string()))
            }
        }
    }
}
