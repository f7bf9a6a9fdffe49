//! Collaborator interfaces for the tracking engine, its preprocessing
//! pipeline and interactive region selection, plus the built-in variants.

mod factory;
mod fixed;
mod pipeline;
mod selector;
mod template;
mod tracker;

pub use factory::{BuiltinFactory, EngineFactory};
pub use fixed::StaticTracker;
pub use pipeline::{BuiltinPipeline, FramePipeline, Smoothing};
pub use selector::{NoSelector, RegionSelector};
pub use template::TemplateTracker;
pub use tracker::{InputKind, ProcessedFrame, TrackerEngine, current_frame};
