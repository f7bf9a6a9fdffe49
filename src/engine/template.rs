//! Translation-only template tracker using sum-of-squared-differences search.

use ndarray::{Array2, ArrayView2, Axis, s};

use crate::engine::tracker::{InputKind, ProcessedFrame, TrackerEngine, current_frame};
use crate::error::EngineError;
use crate::marshal::Region;

/// Largest pixel coordinate a search origin may take.
const MAX_ORIGIN: f64 = i32::MAX as f64;

/// Tracks a rigid patch by exhaustive SSD search around its last position.
///
/// The template is the axis-aligned bounding box of the region, sampled on
/// the grayscale frame at initialization. Each step searches integer shifts
/// within `search_radius` pixels and moves the region by the best one.
#[derive(Debug, Clone)]
pub struct TemplateTracker {
    search_radius: usize,
    template: Option<Array2<f32>>,
    /// Top-left pixel of the template in the current frame (col, row).
    origin: (isize, isize),
    region: Region,
}

impl TemplateTracker {
    /// Tracker searching `search_radius` pixels around the last position.
    pub fn new(search_radius: usize) -> Self {
        Self {
            search_radius,
            template: None,
            origin: (0, 0),
            region: Region::default(),
        }
    }

    fn sample_template(
        image: ArrayView2<f32>,
        region: &Region,
    ) -> Result<(Array2<f32>, (isize, isize)), EngineError> {
        let (height, width) = image.dim();
        let [x1, y1, x2, y2] = region.bounds();
        let (c0, r0) = (x1.floor(), y1.floor());
        let (c1, r1) = (x2.ceil(), y2.ceil());
        if !(c0 >= 0.0 && r0 >= 0.0 && c1 <= width as f64 && r1 <= height as f64) {
            return Err(EngineError::new(
                "InvalidArgument",
                format!(
                    "region bounds [{x1}, {y1}, {x2}, {y2}] do not fit inside the {height} x {width} image"
                ),
            ));
        }
        let (c0, r0, c1, r1) = (c0 as usize, r0 as usize, c1 as usize, r1 as usize);
        if c1 <= c0 || r1 <= r0 {
            return Err(EngineError::new("InvalidArgument", "region encloses no pixels"));
        }
        let patch = image.slice(s![r0..r1, c0..c1]).to_owned();
        Ok((patch, (c0 as isize, r0 as isize)))
    }

    fn ssd(image: &ArrayView2<f32>, template: &Array2<f32>, col: usize, row: usize) -> f32 {
        let (th, tw) = template.dim();
        let window = image.slice(s![row..row + th, col..col + tw]);
        window
            .iter()
            .zip(template.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }
}

fn gray_view(frame: &ProcessedFrame) -> ArrayView2<'_, f32> {
    frame.index_axis(Axis(2), 0)
}

impl TrackerEngine for TemplateTracker {
    fn name(&self) -> &str {
        "template"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Gray
    }

    fn initialize(
        &mut self,
        frames: &[ProcessedFrame],
        region: &Region,
    ) -> Result<(), EngineError> {
        let image = gray_view(current_frame(frames)?);
        let (template, origin) = Self::sample_template(image, region)?;
        self.template = Some(template);
        self.origin = origin;
        self.region = *region;
        Ok(())
    }

    fn step(&mut self, frames: &[ProcessedFrame]) -> Result<Region, EngineError> {
        let template = self.template.as_ref().ok_or_else(|| {
            EngineError::new(
                "InvalidTrackerState",
                "tracker must be initialized before it can be updated",
            )
        })?;
        let image = gray_view(current_frame(frames)?);
        let (height, width) = image.dim();
        let (th, tw) = template.dim();
        let radius = self.search_radius as isize;

        let fits = |col: isize, row: isize| {
            col >= 0
                && row >= 0
                && (col as usize).checked_add(tw).is_some_and(|end| end <= width)
                && (row as usize).checked_add(th).is_some_and(|end| end <= height)
        };

        // Zero shift wins ties so a static scene keeps the region in place.
        let mut best: Option<(f32, isize, isize)> = None;
        if fits(self.origin.0, self.origin.1) {
            let cost = Self::ssd(&image, template, self.origin.0 as usize, self.origin.1 as usize);
            best = Some((cost, 0, 0));
        }
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let (Some(col), Some(row)) =
                    (self.origin.0.checked_add(dx), self.origin.1.checked_add(dy))
                else {
                    continue;
                };
                if !fits(col, row) {
                    continue;
                }
                let cost = Self::ssd(&image, template, col as usize, row as usize);
                if best.is_none_or(|(b, _, _)| cost < b) {
                    best = Some((cost, dx, dy));
                }
            }
        }

        let (_, dx, dy) = best.ok_or_else(|| {
            EngineError::new("TrackingFailure", "template no longer fits inside the image")
        })?;
        self.origin = (self.origin.0 + dx, self.origin.1 + dy);
        self.region = self.region.translate(dx as f64, dy as f64);
        Ok(self.region)
    }

    fn set_region(&mut self, region: &Region) -> Result<(), EngineError> {
        let [x1, y1, x2, y2] = region.bounds();
        let addressable = region.matrix().iter().all(|v| v.is_finite() && v.abs() <= MAX_ORIGIN);
        if !addressable {
            return Err(EngineError::new(
                "InvalidArgument",
                format!("region bounds [{x1}, {y1}, {x2}, {y2}] are outside the addressable pixel range"),
            ));
        }
        self.origin = (x1.floor() as isize, y1.floor() as isize);
        self.region = *region;
        Ok(())
    }

    fn region(&self) -> Region {
        self.region
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn blob_frame(height: usize, width: usize, top: usize, left: usize) -> ProcessedFrame {
        Array3::from_shape_fn((height, width, 1), |(r, c, _)| {
            if (top..top + 10).contains(&r) && (left..left + 12).contains(&c) {
                200.0 + (r - top) as f32 * 3.0 + (c - left) as f32
            } else {
                10.0
            }
        })
    }

    #[test]
    fn test_follows_translation() {
        let mut tracker = TemplateTracker::new(8);
        let init = blob_frame(60, 60, 20, 20);
        let region = Region::from_tlbr(20.0, 20.0, 32.0, 30.0);
        tracker.initialize(&[init], &region).unwrap();

        let moved = blob_frame(60, 60, 23, 25);
        let estimate = tracker.step(&[moved]).unwrap();

        assert!(estimate.approx_eq(&region.translate(5.0, 3.0), 1e-9));
        assert_eq!(tracker.region(), estimate);
    }

    #[test]
    fn test_static_scene_keeps_region() {
        let mut tracker = TemplateTracker::new(4);
        let frame = Array3::from_elem((30, 30, 1), 7.0f32);
        let region = Region::from_tlbr(5.0, 5.0, 15.0, 15.0);
        tracker.initialize(&[frame.clone()], &region).unwrap();

        let estimate = tracker.step(&[frame]).unwrap();
        assert_eq!(estimate, region);
    }

    #[test]
    fn test_region_outside_image_rejected() {
        let mut tracker = TemplateTracker::new(4);
        let frame = Array3::zeros((20, 20, 1));
        let err = tracker
            .initialize(&[frame], &Region::from_tlbr(10.0, 10.0, 25.0, 15.0))
            .unwrap_err();
        assert_eq!(err.category, "InvalidArgument");
    }

    #[test]
    fn test_step_before_initialize_fails() {
        let mut tracker = TemplateTracker::new(4);
        let err = tracker.step(&[Array3::zeros((5, 5, 1))]).unwrap_err();
        assert_eq!(err.category, "InvalidTrackerState");
    }

    #[test]
    fn test_set_region_moves_search_origin() {
        let mut tracker = TemplateTracker::new(3);
        let region = Region::from_tlbr(20.0, 20.0, 32.0, 30.0);
        tracker.initialize(&[blob_frame(80, 80, 20, 20)], &region).unwrap();

        // Jump beyond the search radius, then re-anchor next to the blob.
        let forced = Region::from_tlbr(40.0, 41.0, 52.0, 51.0);
        tracker.set_region(&forced).unwrap();
        let estimate = tracker.step(&[blob_frame(80, 80, 40, 42)]).unwrap();

        assert!(estimate.approx_eq(&forced.translate(2.0, -1.0), 1e-9));
    }

    #[test]
    fn test_set_region_rejects_unaddressable_bounds() {
        let mut tracker = TemplateTracker::new(3);
        let region = Region::from_tlbr(20.0, 20.0, 32.0, 30.0);
        tracker.initialize(&[blob_frame(80, 80, 20, 20)], &region).unwrap();

        let huge = Region::from_tlbr(1e300, 1e300, 1e300 + 40.0, 1e300 + 40.0);
        let err = tracker.set_region(&huge).unwrap_err();
        assert_eq!(err.category, "InvalidArgument");
        let nan = Region::from_tlbr(f64::NAN, 0.0, 10.0, 10.0);
        assert!(tracker.set_region(&nan).is_err());

        // The previous anchor is kept and tracking carries on.
        assert_eq!(tracker.region(), region);
        let estimate = tracker.step(&[blob_frame(80, 80, 20, 20)]).unwrap();
        assert_eq!(estimate, region);
    }

    #[test]
    fn test_far_origin_reports_tracking_failure() {
        let mut tracker = TemplateTracker::new(3);
        let region = Region::from_tlbr(20.0, 20.0, 32.0, 30.0);
        tracker.initialize(&[blob_frame(80, 80, 20, 20)], &region).unwrap();

        let far = Region::from_tlbr(2e9, 2e9, 2e9 + 12.0, 2e9 + 10.0);
        tracker.set_region(&far).unwrap();
        let err = tracker.step(&[blob_frame(80, 80, 20, 20)]).unwrap_err();
        assert_eq!(err.category, "TrackingFailure");
    }
}
