use crate::error::AcquisitionError;
use crate::marshal::{Frame, Region};

/// Interactive source of an initial region when `initialize` gets none.
pub trait RegionSelector {
    /// Ask the user for the object to track in `frame`.
    ///
    /// `patch_size` is a fixed selection size when non-zero.
    fn select(&mut self, frame: &Frame, patch_size: usize) -> Result<Region, AcquisitionError>;
}

/// Selector for hosts without an interactive display; always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSelector;

impl RegionSelector for NoSelector {
    fn select(&mut self, _frame: &Frame, _patch_size: usize) -> Result<Region, AcquisitionError> {
        Err(AcquisitionError(
            "no interactive region selector is available".to_string(),
        ))
    }
}
