use thiserror::Error;

/// Top-level error type for Wagon.
///
/// The first seven variants form the API error taxonomy; every HTTP handler
/// maps them to a fixed status code. The rest are infrastructure failures.
#[derive(Debug, Error)]
pub enum WagonError {
    /// Bad input shape or format.
    #[error("validation error: {0}")]
    Validation(String),

    /// Bad credentials or invalid/expired token.
    #[error("auth error: {0}")]
    Auth(String),

    /// Acting account is not a group admin.
    #[error("permission error: {0}")]
    Permission(String),

    /// Missing resource.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate unique field.
    #[error("conflict: {0}")]
    Conflict(String),

    /// WhatsApp session not connected.
    #[error("whatsapp session not ready: {0}")]
    NotReady(String),

    /// Dispatch target resolved to zero valid recipients.
    #[error("no valid recipients: {0}")]
    EmptyTarget(String),

    /// Storage error.
    #[error("store error: {0}")]
    Store(String),

    /// Error from the WhatsApp transport.
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
