//! Buyer side of the SKALE RNG x402 service.
//!
//! Pays for random words on the seller: a request goes out unpaid, a 402
//! answer is met with a signed EIP-3009 authorization, and the request is
//! resent once with the `X-PAYMENT` header.
//!
//! # Quick example
//!
//! ```no_run
//! use x402_buyer::{BuyerConfig, PaidRandomWordClient};
//! use x402::WordLength;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let config = BuyerConfig::from_env().unwrap();
//! let client = PaidRandomWordClient::initialize(&config).unwrap();
//!
//! let word = client.random_word(WordLength::DEFAULT).await.unwrap();
//! println!("{}", word.random_value);
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
mod payment_transport;
mod scheme_client;

pub use client::{PaidRandomWordClient, RandomWordClient, RANDOM_WORD_PATH};
pub use config::{BuyerConfig, ConfigError};
pub use payment_transport::PaymentTransport;
pub use scheme_client::ExactEvmSchemeClient;

// Re-export commonly needed types from core
pub use x402::{
    RandomWordResponse, ReqwestTransport, SchemeClient, Transport, WordLength, X402Error,
};
