//! Image marshaling between host column-major buffers and row-major frames.

use ndarray::{Array3, ArrayView2, Axis, ShapeBuilder};

use crate::error::FormatError;
use crate::marshal::host_array::{HostArray, HostData};

/// Number of channels of a color frame.
pub const COLOR_CHANNELS: usize = 3;

/// A decoded image for a single time step.
///
/// Pixels are stored row-major with the channel as the fastest-varying
/// index, i.e. the element at `(row, col, ch)` lives at
/// `(row * width + col) * channels + ch`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pixels: Array3<u8>,
}

impl Frame {
    /// Wrap a `(height, width, channels)` array, copying it into standard layout if needed.
    pub fn from_array(pixels: Array3<u8>) -> Self {
        let pixels = if pixels.is_standard_layout() {
            pixels
        } else {
            pixels.as_standard_layout().into_owned()
        };
        Self { pixels }
    }

    /// Build a frame from interleaved row-major bytes.
    pub fn from_row_major(
        height: usize,
        width: usize,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<Self, FormatError> {
        let got = data.len();
        let pixels = Array3::from_shape_vec((height, width, channels), data).map_err(|_| {
            FormatError::DataLength {
                expected: height.saturating_mul(width).saturating_mul(channels),
                got,
            }
        })?;
        Ok(Self { pixels })
    }

    /// A single-channel frame filled by `f(row, col)`.
    pub fn gray_from_fn<F: Fn(usize, usize) -> u8>(height: usize, width: usize, f: F) -> Self {
        Self {
            pixels: Array3::from_shape_fn((height, width, 1), |(r, c, _)| f(r, c)),
        }
    }

    /// Number of pixel rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    /// Number of pixel columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    /// 1 for grayscale, 3 for color.
    #[inline]
    pub fn channels(&self) -> usize {
        self.pixels.dim().2
    }

    /// `(height, width, channels)`.
    #[inline]
    pub fn dims(&self) -> (usize, usize, usize) {
        self.pixels.dim()
    }

    /// Sample at `(row, col)` in channel `ch`.
    #[inline]
    pub fn pixel(&self, row: usize, col: usize, ch: usize) -> u8 {
        self.pixels[[row, col, ch]]
    }

    /// Pixel storage indexed `[row, col, channel]`.
    pub fn pixels(&self) -> &Array3<u8> {
        &self.pixels
    }

    /// Raw row-major bytes.
    pub fn as_slice(&self) -> Option<&[u8]> {
        self.pixels.as_slice()
    }
}

/// Decode a host image buffer into a row-major [`Frame`].
///
/// Accepts `uint8` arrays with 2 (grayscale, `H x W`) or 3 (color,
/// `H x W x 3`) dimensions.
pub fn decode_image(arr: &HostArray) -> Result<Frame, FormatError> {
    let data = arr.as_u8().ok_or(FormatError::InvalidClass {
        what: "input image",
        expected: "8 bit unsigned integral",
        got: arr.class_name(),
    })?;
    let dims = arr.dims();
    match arr.ndims() {
        2 => {
            let height = dims.first().copied().unwrap_or(1);
            let width = dims.get(1).copied().unwrap_or(1);
            // Column-major H x W is row-major W x H; a transpose puts rows back.
            let view = ArrayView2::from_shape((height, width).f(), data).map_err(|_| {
                FormatError::DataLength {
                    expected: height.saturating_mul(width),
                    got: data.len(),
                }
            })?;
            let gray = view.as_standard_layout().into_owned();
            Ok(Frame {
                pixels: gray.insert_axis(Axis(2)),
            })
        }
        3 => {
            let (height, width, channels) = (dims[0], dims[1], dims[2]);
            if channels != COLOR_CHANNELS {
                return Err(FormatError::InvalidShape {
                    what: "input color image",
                    expected: format!("H x W x {COLOR_CHANNELS}"),
                    got: format!("{height} x {width} x {channels}"),
                });
            }
            let expected = height.saturating_mul(width).saturating_mul(channels);
            if data.len() != expected {
                return Err(FormatError::DataLength {
                    expected,
                    got: data.len(),
                });
            }
            let plane = height * width;
            let pixels = Array3::from_shape_fn((height, width, channels), |(row, col, ch)| {
                data[row + col * height + ch * plane]
            });
            Ok(Frame { pixels })
        }
        n => Err(FormatError::InvalidDims {
            what: "input image",
            got: n,
        }),
    }
}

/// Encode a frame back into a host column-major `uint8` array.
///
/// Single-channel frames produce a 2-D array.
pub fn encode_image(frame: &Frame) -> HostArray {
    let (height, width, channels) = frame.dims();
    // Reversed axes iterate channel-slowest, row-fastest: column-major order.
    let data: Vec<u8> = frame.pixels.t().iter().copied().collect();
    let dims = if channels == 1 {
        vec![height, width]
    } else {
        vec![height, width, channels]
    };
    HostArray::from_raw(dims, HostData::UInt8(data))
}
