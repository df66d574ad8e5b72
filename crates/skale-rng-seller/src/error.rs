use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use x402::response::ErrorResponse;
use x402::X402Error;

/// Message returned for every oracle failure; details stay in the logs.
pub const UPSTREAM_MESSAGE: &str = "Failed to fetch random value from SKALE";

/// Handler failures after payment was authorized. Always rendered as `{"error": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum SellerError {
    /// Bad `wordLength`
    #[error("{0}")]
    Validation(String),
    /// Oracle or RPC failure
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<X402Error> for SellerError {
    fn from(e: X402Error) -> Self {
        match e {
            X402Error::ValidationError(msg) => SellerError::Validation(msg),
            e @ (X402Error::UpstreamError { .. } | X402Error::FormatError(_)) => {
                SellerError::Upstream(e.to_string())
            }
            e => SellerError::Internal(e.to_string()),
        }
    }
}

impl ResponseError for SellerError {
    fn status_code(&self) -> StatusCode {
        match self {
            SellerError::Validation(_) => StatusCode::BAD_REQUEST,
            SellerError::Upstream(_) => StatusCode::BAD_GATEWAY,
            SellerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            SellerError::Validation(msg) => msg.as_str(),
            SellerError::Upstream(msg) => {
                tracing::error!(error = %msg, "oracle call failed");
                UPSTREAM_MESSAGE
            }
            SellerError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                "An internal error occurred"
            }
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(message))
    }
}
