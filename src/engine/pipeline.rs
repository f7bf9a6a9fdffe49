//! Frame preprocessing pipelines.

use ndarray::{Array3, Axis, Zip};

use crate::engine::tracker::{InputKind, ProcessedFrame};
use crate::error::EngineError;
use crate::marshal::Frame;

/// Trait for per-session frame preprocessing.
///
/// A pipeline turns each decoded [`Frame`] into one or more processed frames
/// and may keep derived buffers between calls.
pub trait FramePipeline {
    /// Process the first frame of a tracking run.
    fn initialize(&mut self, frame: &Frame) -> Result<(), EngineError>;

    /// Process a subsequent frame.
    fn update(&mut self, frame: &Frame) -> Result<(), EngineError>;

    /// The processed frame chain for the last processed frame.
    fn frames(&self) -> &[ProcessedFrame];
}

/// Smoothing applied after channel conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Smoothing {
    None,
    /// 3x3 binomial blur
    Gauss,
}

impl Smoothing {
    /// Smoothing named by a configuration key.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "none" | "raw" => Some(Smoothing::None),
            "gauss" | "gaussian" => Some(Smoothing::Gauss),
            _ => None,
        }
    }
}

/// Channel conversion plus optional smoothing, producing a single processed frame.
#[derive(Debug, Clone)]
pub struct BuiltinPipeline {
    input: InputKind,
    smoothing: Smoothing,
    output: Vec<ProcessedFrame>,
    scratch: ProcessedFrame,
    initialized: bool,
}

impl BuiltinPipeline {
    /// Pipeline producing `input` frames with the given smoothing.
    pub fn new(input: InputKind, smoothing: Smoothing) -> Self {
        Self {
            input,
            smoothing,
            output: Vec::new(),
            scratch: Array3::zeros((0, 0, 0)),
            initialized: false,
        }
    }

    fn process(&mut self, frame: &Frame) -> Result<(), EngineError> {
        let (height, width, channels) = frame.dims();
        if height == 0 || width == 0 {
            return Err(EngineError::new(
                "InvalidArgument",
                format!("cannot process an empty {height} x {width} frame"),
            ));
        }
        if channels != 1 && channels != 3 {
            return Err(EngineError::new(
                "InvalidArgument",
                format!("unsupported channel count {channels}"),
            ));
        }
        let shape = (height, width, self.input.channels());
        // Reuse buffers while the frame size is unchanged.
        if self.output.len() != 1 || self.output[0].dim() != shape {
            self.output = vec![Array3::zeros(shape)];
            self.scratch = Array3::zeros(shape);
        }
        convert_channels(frame, self.input, &mut self.output[0]);
        if self.smoothing == Smoothing::Gauss {
            binomial_blur(&mut self.output[0], &mut self.scratch);
        }
        Ok(())
    }
}

impl FramePipeline for BuiltinPipeline {
    fn initialize(&mut self, frame: &Frame) -> Result<(), EngineError> {
        self.process(frame)?;
        self.initialized = true;
        Ok(())
    }

    fn update(&mut self, frame: &Frame) -> Result<(), EngineError> {
        if !self.initialized {
            return Err(EngineError::new(
                "InvalidTrackerState",
                "pre processor must be initialized before it can be updated",
            ));
        }
        self.process(frame)
    }

    fn frames(&self) -> &[ProcessedFrame] {
        &self.output
    }
}

fn convert_channels(frame: &Frame, input: InputKind, out: &mut ProcessedFrame) {
    let pixels = frame.pixels();
    match (input, frame.channels()) {
        (InputKind::Gray, 3) => {
            Zip::from(out.index_axis_mut(Axis(2), 0))
                .and(pixels.lanes(Axis(2)))
                .for_each(|o, px| {
                    *o = 0.299 * f32::from(px[0]) + 0.587 * f32::from(px[1]) + 0.114 * f32::from(px[2]);
                });
        }
        (InputKind::Rgb, 1) => {
            let gray = pixels.index_axis(Axis(2), 0);
            for mut plane in out.axis_iter_mut(Axis(2)) {
                Zip::from(&mut plane)
                    .and(&gray)
                    .for_each(|o, &p| *o = f32::from(p));
            }
        }
        _ => {
            Zip::from(out).and(pixels).for_each(|o, &p| *o = f32::from(p));
        }
    }
}

/// Separable [1 2 1] / 4 blur with edge replication, in place through `scratch`.
fn binomial_blur(img: &mut ProcessedFrame, scratch: &mut ProcessedFrame) {
    let (height, width, channels) = img.dim();
    for ch in 0..channels {
        for r in 0..height {
            for c in 0..width {
                let left = img[[r, c.saturating_sub(1), ch]];
                let right = img[[r, (c + 1).min(width - 1), ch]];
                scratch[[r, c, ch]] = 0.25 * left + 0.5 * img[[r, c, ch]] + 0.25 * right;
            }
        }
        for r in 0..height {
            for c in 0..width {
                let up = scratch[[r.saturating_sub(1), c, ch]];
                let down = scratch[[(r + 1).min(height - 1), c, ch]];
                img[[r, c, ch]] = 0.25 * up + 0.5 * scratch[[r, c, ch]] + 0.25 * down;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_to_gray() {
        let frame = Frame::from_row_major(1, 2, 3, vec![255, 255, 255, 255, 0, 0]).unwrap();
        let mut pipeline = BuiltinPipeline::new(InputKind::Gray, Smoothing::None);
        pipeline.initialize(&frame).unwrap();

        let out = &pipeline.frames()[0];
        assert_eq!(out.dim(), (1, 2, 1));
        assert!((out[[0, 0, 0]] - 255.0).abs() < 1e-3);
        assert!((out[[0, 1, 0]] - 0.299 * 255.0).abs() < 1e-3);
    }

    #[test]
    fn test_gray_to_rgb_replicates() {
        let frame = Frame::gray_from_fn(2, 2, |r, c| (r * 2 + c) as u8);
        let mut pipeline = BuiltinPipeline::new(InputKind::Rgb, Smoothing::None);
        pipeline.initialize(&frame).unwrap();

        let out = &pipeline.frames()[0];
        assert_eq!(out.dim(), (2, 2, 3));
        for ch in 0..3 {
            assert_eq!(out[[1, 0, ch]], 2.0);
        }
    }

    #[test]
    fn test_blur_keeps_constant_image() {
        let frame = Frame::gray_from_fn(4, 5, |_, _| 80);
        let mut pipeline = BuiltinPipeline::new(InputKind::Gray, Smoothing::Gauss);
        pipeline.initialize(&frame).unwrap();

        assert!(pipeline.frames()[0].iter().all(|&v| (v - 80.0).abs() < 1e-4));
    }

    #[test]
    fn test_blur_spreads_impulse() {
        let frame = Frame::gray_from_fn(3, 3, |r, c| if r == 1 && c == 1 { 160 } else { 0 });
        let mut pipeline = BuiltinPipeline::new(InputKind::Gray, Smoothing::Gauss);
        pipeline.initialize(&frame).unwrap();

        let out = &pipeline.frames()[0];
        assert!((out[[1, 1, 0]] - 40.0).abs() < 1e-4);
        assert!((out[[0, 1, 0]] - 20.0).abs() < 1e-4);
        assert!((out[[0, 0, 0]] - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_update_before_initialize_fails() {
        let frame = Frame::gray_from_fn(2, 2, |_, _| 0);
        let mut pipeline = BuiltinPipeline::new(InputKind::Gray, Smoothing::None);
        let err = pipeline.update(&frame).unwrap_err();
        assert_eq!(err.category, "InvalidTrackerState");
    }
}
