//! Trait seams of the three-party payment model.
//!
//! - [`SchemeClient`]: buyer side: turns a [`PaymentRequirements`] into a signed proof
//! - [`Facilitator`]: seller side: verifies and settles proofs through a trusted third party
//!
//! See [`crate::facilitator_client::HttpFacilitator`] for the HTTP facilitator.

use crate::error::X402Error;
use crate::payment::{PaymentPayload, PaymentRequirements};
use crate::response::{SettleResponse, VerifyResponse};

/// Client-side scheme: creates signed payment payloads.
pub trait SchemeClient: Send + Sync {
    /// CAIP-2 network this client can pay on.
    fn network(&self) -> &str;

    /// Create a signed payment payload for the given requirements.
    fn create_payment_payload(
        &self,
        x402_version: u32,
        requirements: &PaymentRequirements,
    ) -> impl std::future::Future<Output = Result<PaymentPayload, X402Error>> + Send;
}

/// Facilitator used by the seller to check and collect payments.
pub trait Facilitator: Send + Sync {
    /// Verify a payment payload against the endpoint's requirements.
    fn verify(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> impl std::future::Future<Output = Result<VerifyResponse, X402Error>> + Send;

    /// Settle a previously verified payment.
    fn settle(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> impl std::future::Future<Output = Result<SettleResponse, X402Error>> + Send;
}
