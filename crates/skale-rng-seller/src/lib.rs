//! SKALE RNG seller: an x402-gated random-word service.
//!
//! Requests to the paid endpoint without a valid payment get HTTP 402 with
//! [`PaymentRequirements`](x402::PaymentRequirements). Verified requests are
//! validated, answered from the SKALE randomness oracle, and settled through
//! the facilitator before the response goes out.
//!
//! # Modules
//!
//! - [`config`]: environment configuration ([`SellerConfig`])
//! - [`middleware`]: payment gate ([`require_payment`](middleware::require_payment), [`settle_payment`](middleware::settle_payment))
//! - [`routes`]: `/health`, `/info`, `/metrics` and the paid endpoint
//! - [`metrics`]: Prometheus counters for requests, payments and oracle calls

pub mod config;
pub mod cors;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{ConfigError, SellerConfig};
pub use error::SellerError;
pub use routes::{configure, RANDOM_WORD_PATH};
pub use state::AppState;
