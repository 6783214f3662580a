use thiserror::Error;

/// Internal failure reasons, each surfaced to callers as a response-level
/// `InvokeResponse { success: false, .. }` rather than a transport error —
/// see `spec.md` §4.3, "Validation (pre-transport)".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error("missing-field: {0}")]
    MissingField(&'static str),
    #[error("invalid-request-json: {0}")]
    InvalidRequestJson(String),
    #[error("streaming-unsupported")]
    StreamingUnsupported,
    #[error("dial-failed: {0}")]
    DialFailed(String),
    #[error("transport-error: {0}")]
    TransportError(String),
}

impl InvokeError {
    pub fn reason(&self) -> &'static str {
        match self {
            InvokeError::MissingField(_) => "missing-field",
            InvokeError::InvalidRequestJson(_) => "invalid-request-json",
            InvokeError::StreamingUnsupported => "streaming-unsupported",
            InvokeError::DialFailed(_) => "dial-failed",
            InvokeError::TransportError(_) => "transport-error",
        }
    }
}
