//! A single tracker session and its lifecycle transitions.

use std::fmt;
use std::time::Instant;

use crate::config::SessionConfig;
use crate::engine::{EngineFactory, FramePipeline, RegionSelector, TrackerEngine};
use crate::error::{CommandError, EngineError, FormatError, Result};
use crate::marshal::{Frame, Region};
use crate::session::state::SessionState;

/// One independently tracked target.
///
/// Bundles an engine instance with the preprocessing pipeline feeding it,
/// plus the bookkeeping needed to enforce legal call ordering.
pub struct TrackerSession {
    engine: Box<dyn TrackerEngine>,
    pipeline: Box<dyn FramePipeline>,
    config: SessionConfig,
    state: SessionState,
    /// Frames tracked since the last initialization
    frame_id: u32,
    /// Frame dimensions recorded at initialization
    frame_dims: Option<(usize, usize, usize)>,
}

impl TrackerSession {
    /// Assemble a session from already constructed collaborators.
    pub fn new(
        engine: Box<dyn TrackerEngine>,
        pipeline: Box<dyn FramePipeline>,
        config: SessionConfig,
    ) -> Self {
        Self {
            engine,
            pipeline,
            config,
            state: SessionState::Created,
            frame_id: 0,
            frame_dims: None,
        }
    }

    /// Build the engine and its pipeline through `factory`.
    ///
    /// Nothing is returned unless both collaborators were created.
    pub fn create(
        factory: &dyn EngineFactory,
        config: SessionConfig,
    ) -> Result<Self, EngineError> {
        let engine = factory.create_tracker(&config)?;
        let pipeline = factory.create_pipeline(engine.input_kind(), &config)?;
        Ok(Self::new(engine, pipeline, config))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Frames tracked since the last initialization.
    pub fn frame_id(&self) -> u32 {
        self.frame_id
    }

    /// `(height, width, channels)` recorded at initialization.
    pub fn frame_dims(&self) -> Option<(usize, usize, usize)> {
        self.frame_dims
    }

    /// Configuration the session was created with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Name of the tracking engine variant.
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// The engine's current region estimate.
    pub fn region(&self) -> Region {
        self.engine.region()
    }

    /// Establish the target and move to [`SessionState::Initialized`].
    ///
    /// Without a `region` one is requested from `selector`. On failure the
    /// state is left as it was.
    pub fn initialize(
        &mut self,
        frame: &Frame,
        region: Option<Region>,
        selector: &mut dyn RegionSelector,
    ) -> Result<Region> {
        let region = match region {
            Some(region) => region,
            None => selector.select(frame, self.config.patch_size)?,
        };

        let (height, width, channels) = frame.dims();
        log::debug!("img_height: {height}, img_width: {width}, channels: {channels}");
        for (i, (x, y)) in region.corners().iter().enumerate() {
            log::debug!("init corner {i}: ({x}, {y})");
        }

        self.pipeline
            .initialize(frame)
            .map_err(|e| engine_failure("initializing the pre processor", e))?;
        let (size_x, size_y) = region.size();
        log::info!(
            "initializing {} tracker with object of size {size_x} x {size_y}",
            self.engine.name()
        );
        self.engine
            .initialize(self.pipeline.frames(), &region)
            .map_err(|e| engine_failure("initializing the tracker", e))?;

        self.state = SessionState::Initialized;
        self.frame_id = 0;
        self.frame_dims = Some(frame.dims());
        Ok(self.engine.region())
    }

    /// Track one more frame and return the new region estimate.
    pub fn update(&mut self, frame: &Frame) -> Result<Region> {
        if !self.state.is_initialized() {
            return Err(CommandError::NotInitialized { action: "updated" });
        }
        if let Some(expected) = self.frame_dims {
            if expected != frame.dims() {
                return Err(FormatError::InvalidShape {
                    what: "input image",
                    expected: dims_string(expected),
                    got: dims_string(frame.dims()),
                }
                .into());
            }
        }

        let start_with_input = Instant::now();
        self.pipeline
            .update(frame)
            .map_err(|e| engine_failure("updating the pre processor", e))?;
        let start = Instant::now();
        let region = self
            .engine
            .step(self.pipeline.frames())
            .map_err(|e| engine_failure("updating the tracker", e))?;

        if self.config.print_fps {
            let tracking = start.elapsed().as_secs_f64();
            let with_input = start_with_input.elapsed().as_secs_f64();
            log::info!(
                "fps: {:.3}\t fps_win: {:.3}",
                1.0 / tracking.max(f64::EPSILON),
                1.0 / with_input.max(f64::EPSILON)
            );
        }

        if self.config.reset_template {
            self.engine
                .initialize(self.pipeline.frames(), &region)
                .map_err(|e| engine_failure("resetting the tracker template", e))?;
        }

        self.frame_id += 1;
        Ok(self.engine.region())
    }

    /// Force the tracked region without touching image state.
    pub fn set_region(&mut self, region: &Region) -> Result<Region> {
        if !self.state.is_initialized() {
            return Err(CommandError::NotInitialized { action: "reset" });
        }
        self.engine
            .set_region(region)
            .map_err(|e| engine_failure("resetting the tracker", e))?;
        Ok(self.engine.region())
    }
}

impl fmt::Debug for TrackerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerSession")
            .field("engine", &self.engine.name())
            .field("state", &self.state)
            .field("frame_id", &self.frame_id)
            .field("frame_dims", &self.frame_dims)
            .finish()
    }
}

fn engine_failure(during: &str, err: EngineError) -> CommandError {
    log::warn!(
        "exception of type {} encountered while {during}: {}",
        err.category,
        err.message
    );
    CommandError::Engine(err)
}

fn dims_string((height, width, channels): (usize, usize, usize)) -> String {
    format!("{height} x {width} x {channels}")
}
