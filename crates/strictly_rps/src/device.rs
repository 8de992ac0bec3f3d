//! Seams to the camera and hand-landmark model.
//!
//! The engine never touches pixels. It asks a [`HandTracker`] for the hands
//! visible right now and holds the tracker through a [`DeviceLease`] that is
//! released on every exit path.

use super::error::CaptureError;
use super::types::LandmarkSet;
use async_trait::async_trait;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Detector parameters handed to the tracker when it is opened.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct TrackerSettings {
    /// Maximum number of hands to report.
    max_hands: usize,
    /// Minimum confidence for a new hand detection.
    min_detection_confidence: f32,
    /// Minimum confidence to keep tracking a hand across frames.
    min_tracking_confidence: f32,
}

impl TrackerSettings {
    /// Creates settings for `max_hands` with default confidences.
    pub fn new(max_hands: usize) -> Self {
        Self {
            max_hands,
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.5,
        }
    }

    /// Overrides the detection thresholds.
    pub fn with_confidence(mut self, detection: f32, tracking: f32) -> Self {
        self.min_detection_confidence = detection;
        self.min_tracking_confidence = tracking;
        self
    }
}

/// Produces frames from a camera or recording.
#[async_trait]
pub trait FrameSource: Send {
    /// Frame type understood by the paired detector.
    type Frame: Send;

    /// Opens the device.
    async fn open(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }

    /// Grabs the most recent frame.
    async fn capture(&mut self) -> Result<Self::Frame, CaptureError>;

    /// Releases the device. Must be idempotent.
    fn release(&mut self) {}
}

/// Extracts hand skeletons from a frame.
pub trait HandLandmarkDetector: Send {
    /// Frame type this detector consumes.
    type Frame;

    /// Applies detector parameters before the first frame.
    fn configure(&mut self, _settings: &TrackerSettings) {}

    /// Returns zero or more hand skeletons, in detection order.
    fn detect(&mut self, frame: &Self::Frame) -> Result<Vec<LandmarkSet>, CaptureError>;
}

/// Capture-plus-detection pipeline consulted once per round.
#[async_trait]
pub trait HandTracker: Send {
    /// Acquires the underlying device.
    async fn open(&mut self, settings: &TrackerSettings) -> Result<(), CaptureError>;

    /// Returns the hands visible in the latest frame.
    async fn latest_hands(&mut self) -> Result<Vec<LandmarkSet>, CaptureError>;

    /// Releases the underlying device. Must be idempotent.
    fn release(&mut self);
}

#[async_trait]
impl<T: HandTracker + ?Sized> HandTracker for Box<T> {
    async fn open(&mut self, settings: &TrackerSettings) -> Result<(), CaptureError> {
        (**self).open(settings).await
    }

    async fn latest_hands(&mut self) -> Result<Vec<LandmarkSet>, CaptureError> {
        (**self).latest_hands().await
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Joins a [`FrameSource`] with a [`HandLandmarkDetector`].
pub struct Pipeline<S, D> {
    source: S,
    detector: D,
    max_hands: usize,
}

impl<S, D> Pipeline<S, D>
where
    S: FrameSource,
    D: HandLandmarkDetector<Frame = S::Frame>,
{
    /// Creates a pipeline.
    pub fn new(source: S, detector: D) -> Self {
        Self {
            source,
            detector,
            max_hands: usize::MAX,
        }
    }
}

#[async_trait]
impl<S, D> HandTracker for Pipeline<S, D>
where
    S: FrameSource,
    D: HandLandmarkDetector<Frame = S::Frame>,
{
    async fn open(&mut self, settings: &TrackerSettings) -> Result<(), CaptureError> {
        self.detector.configure(settings);
        self.max_hands = *settings.max_hands();
        self.source.open().await
    }

    async fn latest_hands(&mut self) -> Result<Vec<LandmarkSet>, CaptureError> {
        let frame = self.source.capture().await?;
        let mut hands = self.detector.detect(&frame)?;
        hands.truncate(self.max_hands);
        Ok(hands)
    }

    fn release(&mut self) {
        self.source.release();
    }
}

/// Scoped ownership of a [`HandTracker`].
///
/// The tracker is opened lazily on first use and released exactly once, on
/// [`DeviceLease::release`] or on drop, whichever comes first.
pub struct DeviceLease {
    device: Box<dyn HandTracker>,
    settings: TrackerSettings,
    open: bool,
}

impl DeviceLease {
    /// Wraps a tracker without opening it.
    pub fn new(device: Box<dyn HandTracker>, settings: TrackerSettings) -> Self {
        Self {
            device,
            settings,
            open: false,
        }
    }

    /// Opens the tracker if needed and returns it.
    #[instrument(skip(self), fields(open = self.open))]
    pub async fn acquire(&mut self) -> Result<&mut Box<dyn HandTracker>, CaptureError> {
        if !self.open {
            info!(max_hands = self.settings.max_hands, "Opening hand tracker");
            self.device.open(&self.settings).await.inspect_err(|e| {
                warn!(error = %e, "Failed to open hand tracker");
            })?;
            self.open = true;
        }
        Ok(&mut self.device)
    }

    /// Releases the tracker if it is open.
    pub fn release(&mut self) {
        if self.open {
            debug!("Releasing hand tracker");
            self.device.release();
            self.open = false;
        }
    }

    /// Replaces the settings used the next time the tracker is opened.
    pub fn reconfigure(&mut self, settings: TrackerSettings) {
        if self.open {
            warn!("Tracker already open, new settings apply after release");
        }
        self.settings = settings;
    }

    /// Returns true while the tracker is held open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Settings the tracker is opened with.
    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }
}

impl Drop for DeviceLease {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for DeviceLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceLease")
            .field("settings", &self.settings)
            .field("open", &self.open)
            .finish()
    }
}
