//! Construction of engine and pipeline variants from configuration keys.

use crate::config::SessionConfig;
use crate::engine::fixed::StaticTracker;
use crate::engine::pipeline::{BuiltinPipeline, FramePipeline, Smoothing};
use crate::engine::template::TemplateTracker;
use crate::engine::tracker::{InputKind, TrackerEngine};
use crate::error::EngineError;

/// Creates the tracker engine and preprocessing pipeline of a new session.
pub trait EngineFactory {
    /// Create the engine variant named by `config.tracker`.
    fn create_tracker(&self, config: &SessionConfig) -> Result<Box<dyn TrackerEngine>, EngineError>;

    /// Create the pipeline variant named by `config.pre_proc`, producing `input` frames.
    fn create_pipeline(
        &self,
        input: InputKind,
        config: &SessionConfig,
    ) -> Result<Box<dyn FramePipeline>, EngineError>;
}

/// Factory for the engines and pipelines shipped with this crate.
///
/// Trackers: `"template"`, `"static"`. Pipelines: `"gauss"`, `"none"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFactory;

impl EngineFactory for BuiltinFactory {
    fn create_tracker(&self, config: &SessionConfig) -> Result<Box<dyn TrackerEngine>, EngineError> {
        match config.tracker.as_str() {
            "template" | "ssd" => Ok(Box::new(TemplateTracker::new(config.search_radius))),
            "static" => Ok(Box::new(StaticTracker::new())),
            other => Err(EngineError::new(
                "Factory",
                format!("invalid tracker type provided: {other}"),
            )),
        }
    }

    fn create_pipeline(
        &self,
        input: InputKind,
        config: &SessionConfig,
    ) -> Result<Box<dyn FramePipeline>, EngineError> {
        let smoothing = Smoothing::from_key(&config.pre_proc).ok_or_else(|| {
            EngineError::new(
                "Factory",
                format!("invalid pre processor type provided: {}", config.pre_proc),
            )
        })?;
        Ok(Box::new(BuiltinPipeline::new(input, smoothing)))
    }
}
