use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("register-invalid: {0}")]
    Invalid(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("service '{0}' not found")]
    ServiceNotFound(String),
    #[error("method '{method}' not found on service '{service}'")]
    MethodNotFound { service: String, method: String },
    #[error("message '{0}' not found")]
    MessageNotFound(String),
}
