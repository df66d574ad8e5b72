//! x402 pay-per-request protocol for the SKALE random-word oracle.
//!
//! A seller gates `POST /tools/skale-rng/random-word` behind HTTP 402. A buyer
//! answers the 402 with an EIP-3009 `TransferWithAuthorization` signed under
//! the payment token's EIP-712 domain, and a facilitator verifies and settles it.
//!
//! # Three-party model
//!
//! - **Buyer** ([`SchemeClient`]): signs payment authorizations
//! - **Seller**: gates endpoints, returns 402 with [`PaymentRequirements`]
//! - **Facilitator** ([`Facilitator`], [`HttpFacilitator`]): verifies and settles
//!
//! This crate holds what both sides share: wire types, errors, input
//! validation, the response codec, EIP-712 helpers, the transport seam and
//! the oracle client.

// Core types and traits
pub mod constants;
pub mod error;
pub mod payment;
pub mod response;
pub mod scheme;

// Request and response handling
pub mod codec;
pub mod transport;
pub mod validation;

// Chain and facilitator access
pub mod eip712;
pub mod facilitator_client;
pub mod oracle;
pub mod security;

use alloy::sol;

// EIP-3009 authorization, hashed under the token's EIP-712 domain.
sol! {
    #[derive(Debug)]
    struct TransferWithAuthorization {
        address from;
        address to;
        uint256 value;
        uint256 validAfter;
        uint256 validBefore;
        bytes32 nonce;
    }
}

// SKALE randomness oracle.
sol! {
    #[sol(rpc)]
    interface SkaleRng {
        function getRandomWord(uint256 wordLength) external view returns (uint256);
    }
}

// Re-exports
pub use constants::*;
pub use error::X402Error;
pub use payment::*;
pub use response::*;
pub use scheme::*;

pub use codec::{Decoded, ResponseFormat};
pub use facilitator_client::HttpFacilitator;
pub use oracle::{RandomWordResponse, RandomnessOracle, SkaleRngOracle};
pub use transport::{OutboundRequest, ReqwestTransport, Transport, TransportResponse};
pub use validation::{NumericInput, WordLength};
