//! Trait for tracking engine backends.

use ndarray::Array3;

use crate::error::EngineError;
use crate::marshal::Region;

/// A preprocessed frame as `(height, width, channels)` floating point intensities.
pub type ProcessedFrame = Array3<f32>;

/// Pixel format a tracking engine expects from its preprocessing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputKind {
    /// Single-channel intensity
    #[default]
    Gray,
    /// Three-channel color
    Rgb,
}

impl InputKind {
    /// Channel count of frames of this kind.
    pub fn channels(self) -> usize {
        match self {
            InputKind::Gray => 1,
            InputKind::Rgb => 3,
        }
    }
}

/// Trait for single-target tracking engines.
///
/// Implement this trait to drive any tracking algorithm from the command
/// layer. Every call receives the full chain of processed frames produced
/// by the session's pipeline for the current time step.
///
/// # Example
///
/// ```ignore
/// use trackcmd_rs::{EngineError, InputKind, ProcessedFrame, Region, TrackerEngine};
///
/// struct MyEngine { region: Region }
///
/// impl TrackerEngine for MyEngine {
///     fn name(&self) -> &str { "mine" }
///     fn input_kind(&self) -> InputKind { InputKind::Gray }
///     fn initialize(&mut self, _frames: &[ProcessedFrame], region: &Region) -> Result<(), EngineError> {
///         self.region = *region;
///         Ok(())
///     }
///     fn step(&mut self, _frames: &[ProcessedFrame]) -> Result<Region, EngineError> {
///         Ok(self.region)
///     }
///     fn set_region(&mut self, region: &Region) -> Result<(), EngineError> {
///         self.region = *region;
///         Ok(())
///     }
///     fn region(&self) -> Region { self.region }
/// }
/// ```
pub trait TrackerEngine {
    /// Variant name, for logging.
    fn name(&self) -> &str;

    /// Pixel format this engine wants from the pipeline.
    fn input_kind(&self) -> InputKind;

    /// Establish the target template from `frames` at `region`.
    fn initialize(&mut self, frames: &[ProcessedFrame], region: &Region)
    -> Result<(), EngineError>;

    /// Advance tracking by one time step and return the new estimate.
    fn step(&mut self, frames: &[ProcessedFrame]) -> Result<Region, EngineError>;

    /// Force the tracked region without touching image state.
    fn set_region(&mut self, region: &Region) -> Result<(), EngineError>;

    /// Current region estimate.
    fn region(&self) -> Region;
}

/// The frame an engine should operate on: the last one in the chain.
pub fn current_frame(frames: &[ProcessedFrame]) -> Result<&ProcessedFrame, EngineError> {
    frames
        .last()
        .ok_or_else(|| EngineError::new("InvalidArgument", "no processed frame was supplied"))
}
