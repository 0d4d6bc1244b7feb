use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DexError {
    /// No operation is registered under the requested name
    #[error("Unknown tool: {0}")]
    UnknownOperation(String),

    /// Required arguments were absent from the invocation
    #[error("Missing required arguments: {}", .missing.join(", "))]
    InvalidArguments { missing: Vec<String> },

    /// Transport failure before a complete response was received
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Upstream answered with a non-success status
    #[error("Upstream error {status}: {message}")]
    UpstreamError { status: u16, message: String },

    /// Upstream answered with success but the body did not match the payload shape
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Invalid startup configuration (zero quota, bad base URL, ...)
    #[error("Config Error: {0}")]
    ConfigError(String),
}

/// Fieldless tag for [`DexError`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    UnknownOperation,
    InvalidArguments,
    Network,
    Upstream,
    Decode,
    Config,
}

impl DexError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DexError::UnknownOperation(_) => ErrorKind::UnknownOperation,
            DexError::InvalidArguments { .. } => ErrorKind::InvalidArguments,
            DexError::NetworkError(_) => ErrorKind::Network,
            DexError::UpstreamError { .. } => ErrorKind::Upstream,
            DexError::DecodeError(_) => ErrorKind::Decode,
            DexError::ConfigError(_) => ErrorKind::Config,
        }
    }

    /// HTTP status carried by upstream failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            DexError::UpstreamError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human message without the kind prefix added by `Display`.
    pub fn message(&self) -> String {
        match self {
            DexError::UnknownOperation(name) => format!("Unknown tool: {}", name),
            DexError::InvalidArguments { missing } => {
                format!("Missing required arguments: {}", missing.join(", "))
            }
            DexError::NetworkError(msg)
            | DexError::DecodeError(msg)
            | DexError::ConfigError(msg) => msg.clone(),
            DexError::UpstreamError { message, .. } => message.clone(),
        }
    }

    /// Errors caused by the caller rather than by the upstream provider.
    pub fn is_caller_fault(&self) -> bool {
        matches!(
            self,
            DexError::UnknownOperation(_) | DexError::InvalidArguments { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DexError>;
