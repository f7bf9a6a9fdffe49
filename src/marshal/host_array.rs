//! Host-native value representation.
//!
//! The host hands every argument over as a typed, column-major array with
//! explicit dimensions. Text arguments are carried as `Char` arrays of shape
//! `1 x len`.

use crate::error::FormatError;

/// Element storage of a host array.
#[derive(Debug, Clone, PartialEq)]
pub enum HostData {
    Char(String),
    UInt8(Vec<u8>),
    UInt32(Vec<u32>),
    Double(Vec<f64>),
}

/// A typed array as exchanged with the host, numeric data in column-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct HostArray {
    dims: Vec<usize>,
    data: HostData,
}

impl HostArray {
    /// Create a text argument.
    pub fn text<S: Into<String>>(s: S) -> Self {
        let s = s.into();
        Self {
            dims: vec![1, s.chars().count()],
            data: HostData::Char(s),
        }
    }

    /// Create a 1x1 double value, the shape of the status output.
    pub fn scalar(value: f64) -> Self {
        Self {
            dims: vec![1, 1],
            data: HostData::Double(vec![value]),
        }
    }

    /// Create an 8-bit unsigned array from column-major data.
    pub fn uint8(dims: &[usize], data: Vec<u8>) -> Result<Self, FormatError> {
        check_len(dims, data.len())?;
        Ok(Self {
            dims: dims.to_vec(),
            data: HostData::UInt8(data),
        })
    }

    /// Create a 32-bit unsigned array from column-major data.
    pub fn uint32(dims: &[usize], data: Vec<u32>) -> Result<Self, FormatError> {
        check_len(dims, data.len())?;
        Ok(Self {
            dims: dims.to_vec(),
            data: HostData::UInt32(data),
        })
    }

    /// Create a 1x1 32-bit unsigned value, the shape of a session index.
    pub fn index(value: u32) -> Self {
        Self {
            dims: vec![1, 1],
            data: HostData::UInt32(vec![value]),
        }
    }

    /// Create a 64-bit floating point array from column-major data.
    pub fn double(dims: &[usize], data: Vec<f64>) -> Result<Self, FormatError> {
        check_len(dims, data.len())?;
        Ok(Self {
            dims: dims.to_vec(),
            data: HostData::Double(data),
        })
    }

    pub(crate) fn from_raw(dims: Vec<usize>, data: HostData) -> Self {
        Self { dims, data }
    }

    /// Host class name of the element type.
    pub fn class_name(&self) -> &'static str {
        match self.data {
            HostData::Char(_) => "char",
            HostData::UInt8(_) => "uint8",
            HostData::UInt32(_) => "uint32",
            HostData::Double(_) => "double",
        }
    }

    /// Dimensions with trailing singletons beyond the second dropped.
    pub fn dims(&self) -> &[usize] {
        let mut n = self.dims.len();
        while n > 2 && self.dims[n - 1] == 1 {
            n -= 1;
        }
        &self.dims[..n]
    }

    /// Number of dimensions, never less than two.
    pub fn ndims(&self) -> usize {
        self.dims().len().max(2)
    }

    /// Number of elements; saturates at `usize::MAX` for dimensions no buffer can hold.
    pub fn numel(&self) -> usize {
        element_count(&self.dims).unwrap_or(usize::MAX)
    }

    /// Raw element storage.
    pub fn data(&self) -> &HostData {
        &self.data
    }

    /// The string of a `char` array.
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            HostData::Char(s) => Some(s),
            _ => None,
        }
    }

    /// The single value of a 1x1 numeric array, widened to `f64`.
    pub fn as_scalar(&self) -> Option<f64> {
        if self.numel() != 1 {
            return None;
        }
        match &self.data {
            HostData::Double(v) => Some(v[0]),
            HostData::UInt32(v) => Some(f64::from(v[0])),
            HostData::UInt8(v) => Some(f64::from(v[0])),
            HostData::Char(_) => None,
        }
    }

    /// Column-major elements of a `uint8` array.
    pub fn as_u8(&self) -> Option<&[u8]> {
        match &self.data {
            HostData::UInt8(v) => Some(v),
            _ => None,
        }
    }

    /// Column-major elements of a `uint32` array.
    pub fn as_u32(&self) -> Option<&[u32]> {
        match &self.data {
            HostData::UInt32(v) => Some(v),
            _ => None,
        }
    }

    /// Column-major elements of a `double` array.
    pub fn as_f64(&self) -> Option<&[f64]> {
        match &self.data {
            HostData::Double(v) => Some(v),
            _ => None,
        }
    }
}

/// Decode a session index argument, which must be a `uint32` scalar.
pub fn decode_session_index(arr: &HostArray) -> Result<usize, FormatError> {
    let values = arr.as_u32().ok_or(FormatError::InvalidClass {
        what: "tracker ID",
        expected: "32 bit unsigned integral",
        got: arr.class_name(),
    })?;
    match values {
        [index] => Ok(*index as usize),
        _ => Err(FormatError::InvalidShape {
            what: "tracker ID",
            expected: "1 x 1".to_string(),
            got: format!("{} elements", values.len()),
        }),
    }
}

fn element_count(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

fn check_len(dims: &[usize], len: usize) -> Result<(), FormatError> {
    let expected = element_count(dims).ok_or_else(|| FormatError::InvalidShape {
        what: "host array",
        expected: "dimensions addressable in memory".to_string(),
        got: format!("{dims:?}"),
    })?;
    if expected != len {
        return Err(FormatError::DataLength { expected, got: len });
    }
    Ok(())
}
