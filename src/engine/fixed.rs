use crate::engine::tracker::{InputKind, ProcessedFrame, TrackerEngine, current_frame};
use crate::error::EngineError;
use crate::marshal::Region;

/// Engine that holds its region in place; useful for annotation replay and testing hosts.
#[derive(Debug, Clone, Default)]
pub struct StaticTracker {
    region: Option<Region>,
}

impl StaticTracker {
    /// Tracker with an empty region until initialized.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrackerEngine for StaticTracker {
    fn name(&self) -> &str {
        "static"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Gray
    }

    fn initialize(
        &mut self,
        frames: &[ProcessedFrame],
        region: &Region,
    ) -> Result<(), EngineError> {
        current_frame(frames)?;
        self.region = Some(*region);
        Ok(())
    }

    fn step(&mut self, frames: &[ProcessedFrame]) -> Result<Region, EngineError> {
        current_frame(frames)?;
        self.region.ok_or_else(|| {
            EngineError::new(
                "InvalidTrackerState",
                "tracker must be initialized before it can be updated",
            )
        })
    }

    fn set_region(&mut self, region: &Region) -> Result<(), EngineError> {
        self.region = Some(*region);
        Ok(())
    }

    fn region(&self) -> Region {
        self.region.unwrap_or_default()
    }
}
