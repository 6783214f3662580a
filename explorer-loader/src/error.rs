use thiserror::Error;

/// All terminal outcomes of a single `Load` call. Every variant here is
/// surfaced by the Façade as `{success: false, error: <message>}`, never as
/// a transport-level error — a Loader failure is a legitimate "no", not a
/// caller-side contract violation.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("source-invalid: {0}")]
    SourceInvalid(String),

    #[error("compiler-failed: {0}")]
    CompilerFailed(String),

    #[error("source-unreachable: {0}")]
    SourceUnreachable(String),

    #[error("reflection-unsupported: {0}")]
    ReflectionUnsupported(String),

    #[error("decode-failed: {0}")]
    DecodeFailed(String),

    #[error("empty-result: {0}")]
    EmptyResult(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoaderError {
    /// The stable error-kind tag from the spec's error table, useful for
    /// tests that assert on *which* failure happened rather than the exact
    /// human-readable message.
    pub fn kind(&self) -> &'static str {
        match self {
            LoaderError::SourceInvalid(_) => "source-invalid",
            LoaderError::CompilerFailed(_) => "compiler-failed",
            LoaderError::SourceUnreachable(_) => "source-unreachable",
            LoaderError::ReflectionUnsupported(_) => "reflection-unsupported",
            LoaderError::DecodeFailed(_) => "decode-failed",
            LoaderError::EmptyResult(_) => "empty-result",
            LoaderError::Io(_) => "io",
        }
    }
}
