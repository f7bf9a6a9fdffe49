//! Quadrilateral target region with host conversion utilities.

use nalgebra::{Matrix2x4, Matrix4x2};

use crate::error::FormatError;
use crate::marshal::host_array::{HostArray, HostData};

/// Quadrilateral target boundary in image pixel coordinates.
///
/// Corners are stored as a 2x4 matrix: row 0 holds the x-coordinates and
/// row 1 the y-coordinates, columns ordered top-left, top-right,
/// bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    corners: Matrix2x4<f64>,
}

impl Default for Region {
    fn default() -> Self {
        Self {
            corners: Matrix2x4::zeros(),
        }
    }
}

impl Region {
    /// Create a region from a 2x4 corner matrix.
    #[inline]
    pub fn new(corners: Matrix2x4<f64>) -> Self {
        Self { corners }
    }

    /// Create a region from four `(x, y)` points in winding order.
    pub fn from_corners(points: [(f64, f64); 4]) -> Self {
        let mut corners = Matrix2x4::zeros();
        for (i, (x, y)) in points.into_iter().enumerate() {
            corners[(0, i)] = x;
            corners[(1, i)] = y;
        }
        Self { corners }
    }

    /// Create an axis-aligned region from TLBR format (x1, y1, x2, y2).
    #[inline]
    pub fn from_tlbr(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::from_corners([(x1, y1), (x2, y1), (x2, y2), (x1, y2)])
    }

    #[inline]
    pub fn matrix(&self) -> &Matrix2x4<f64> {
        &self.corners
    }

    /// Corner `i` as `(x, y)`.
    #[inline]
    pub fn corner(&self, i: usize) -> (f64, f64) {
        (self.corners[(0, i)], self.corners[(1, i)])
    }

    /// All four corners in order.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [self.corner(0), self.corner(1), self.corner(2), self.corner(3)]
    }

    /// Axis-aligned bounds as `[x1, y1, x2, y2]`.
    pub fn bounds(&self) -> [f64; 4] {
        let xs = self.corners.row(0);
        let ys = self.corners.row(1);
        [xs.min(), ys.min(), xs.max(), ys.max()]
    }

    /// Extent from the top-left to the bottom-right corner.
    #[inline]
    pub fn size(&self) -> (f64, f64) {
        let (x0, y0) = self.corner(0);
        let (x2, y2) = self.corner(2);
        (x2 - x0, y2 - y0)
    }

    /// Mean of the four corners.
    pub fn center(&self) -> (f64, f64) {
        (self.corners.row(0).mean(), self.corners.row(1).mean())
    }

    /// The same region shifted by `(dx, dy)`.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        let mut corners = self.corners;
        corners.row_mut(0).add_scalar_mut(dx);
        corners.row_mut(1).add_scalar_mut(dy);
        Self { corners }
    }

    /// Whether every coordinate is within `tol` of `other`.
    pub fn approx_eq(&self, other: &Region, tol: f64) -> bool {
        (self.corners - other.corners).amax() <= tol
    }
}

/// Decode a host corner array into a [`Region`].
///
/// The host stores a 2x4 corner matrix column-major, so its raw memory reads
/// as four rows of `(x, y)`; transposing that gives the 2x4 layout. A 4x2
/// host array (one point per row) is accepted as well.
pub fn decode_region(arr: &HostArray) -> Result<Region, FormatError> {
    let data = arr.as_f64().ok_or(FormatError::InvalidClass {
        what: "input corner array",
        expected: "64 bit floating point",
        got: arr.class_name(),
    })?;
    if arr.ndims() != 2 {
        return Err(FormatError::InvalidShape {
            what: "input corner array",
            expected: "2 x 4".to_string(),
            got: shape_string(arr.dims()),
        });
    }
    match arr.dims() {
        [2, 4] => {
            let points = Matrix4x2::from_row_slice(data);
            Ok(Region::new(points.transpose()))
        }
        [4, 2] => Ok(Region::new(Matrix4x2::from_column_slice(data).transpose())),
        dims => Err(FormatError::InvalidShape {
            what: "input corner array",
            expected: "2 x 4".to_string(),
            got: shape_string(dims),
        }),
    }
}

/// Encode a region as a 2x4 host `double` array.
pub fn encode_region(region: &Region) -> HostArray {
    // Inverse of the decode transpose: rows of (x, y) laid out back to back.
    let points = region.corners.transpose();
    let mut data = Vec::with_capacity(8);
    for row in points.row_iter() {
        data.extend(row.iter().copied());
    }
    HostArray::from_raw(vec![2, 4], HostData::Double(data))
}

fn shape_string(dims: &[usize]) -> String {
    dims.iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(" x ")
}
