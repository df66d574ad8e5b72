use thiserror::Error;

/// Errors returned by x402 operations.
///
/// The first five variants form the protocol taxonomy surfaced to callers;
/// the rest are local failures that map to a generic 500.
#[derive(Debug, Error)]
pub enum X402Error {
    /// Bad or out-of-range input. Local, never retried.
    #[error("{0}")]
    ValidationError(String),

    /// The endpoint asked for payment and no retry is available.
    #[error("payment required: {0}")]
    PaymentRequired(String),

    /// The facilitator rejected the attached payment. Terminal.
    #[error("payment verification failed: {message}")]
    PaymentVerificationError { status: u16, message: String },

    /// The oracle, RPC endpoint or seller answered with a failure.
    #[error("{message}")]
    UpstreamError { status: Option<u16>, message: String },

    /// Response body in neither supported wire format.
    #[error("{0}")]
    FormatError(String),

    #[error("signature error: {0}")]
    SignatureError(String),

    #[error("invalid payment: {0}")]
    InvalidPayment(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("http error: {0}")]
    HttpError(String),

    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl X402Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Upstream failure without an HTTP status (e.g. an RPC call).
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::UpstreamError {
            status: None,
            message: message.into(),
        }
    }

    /// HTTP status that best represents this error to a caller.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ValidationError(_) => 400,
            Self::PaymentRequired(_) => 402,
            Self::PaymentVerificationError { status, .. } => *status,
            Self::UpstreamError { status, .. } => status.unwrap_or(502),
            Self::FormatError(_) => 502,
            _ => 500,
        }
    }
}
