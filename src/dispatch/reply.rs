use crate::marshal::HostArray;

/// Status value reported for a successful call.
pub const STATUS_SUCCESS: f64 = 1.0;
/// Status value reported for a failed call.
pub const STATUS_FAILURE: f64 = 0.0;

/// What the host sees after a call.
///
/// `outputs[0]` is always the status scalar. On failure no command-specific
/// outputs follow it and `error` carries the message.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: f64,
    pub outputs: Vec<HostArray>,
    pub error: Option<String>,
}

impl Reply {
    /// Successful reply carrying `outputs`, status first.
    pub fn success(outputs: Vec<HostArray>) -> Self {
        Self {
            status: STATUS_SUCCESS,
            outputs,
            error: None,
        }
    }

    /// Failed reply with only the zero status output.
    pub fn failure<S: Into<String>>(message: S) -> Self {
        Self {
            status: STATUS_FAILURE,
            outputs: vec![HostArray::scalar(STATUS_FAILURE)],
            error: Some(message.into()),
        }
    }

    /// `true` unless an error message is attached.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The region output of `initialize`, `update` and `set_region`.
    pub fn region(&self) -> Option<&HostArray> {
        self.outputs.get(1)
    }
}
