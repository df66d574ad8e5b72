use alloy::primitives::{Address, FixedBytes};
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::{SettleResponse, X402Error, X402_VERSION};

/// EIP-712 domain hints for the payment token, advertised in `extra`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDomain {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A single entry in the `accepts` array of a 402 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    pub scheme: String,
    pub network: String,
    /// Price in the token's smallest unit, as a decimal string.
    pub max_amount_required: String,
    pub max_timeout_seconds: u64,
    pub pay_to: Address,
    pub asset: Address,
    pub description: String,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<TokenDomain>,
}

/// The 402 response body returned by the seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequiredBody {
    pub x402_version: u32,
    pub accepts: Vec<PaymentRequirements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PaymentRequiredBody {
    pub fn new(requirements: PaymentRequirements) -> Self {
        Self {
            x402_version: X402_VERSION,
            accepts: vec![requirements],
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Find the requirement matching `scheme` and `network`, and `asset` when given.
    pub fn select(
        &self,
        scheme: &str,
        network: &str,
        asset: Option<Address>,
    ) -> Option<&PaymentRequirements> {
        self.accepts.iter().find(|r| {
            r.scheme == scheme && r.network == network && asset.is_none_or(|a| a == r.asset)
        })
    }
}

/// EIP-3009 `transferWithAuthorization` parameters, as they travel on the wire.
/// Integers are decimal strings so they survive JSON untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactEvmAuthorization {
    pub from: Address,
    pub to: Address,
    pub value: String,
    pub valid_after: String,
    pub valid_before: String,
    pub nonce: FixedBytes<32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactEvmPayload {
    /// 65-byte signature, 0x-prefixed hex.
    pub signature: String,
    pub authorization: ExactEvmAuthorization,
}

/// Wire-format payment proof (sent in the `X-PAYMENT` header, base64-encoded JSON).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub x402_version: u32,
    pub scheme: String,
    pub network: String,
    pub payload: ExactEvmPayload,
}

impl PaymentPayload {
    /// Whether this proof was built for the given requirement's scheme and network.
    pub fn matches(&self, requirements: &PaymentRequirements) -> bool {
        self.scheme == requirements.scheme && self.network == requirements.network
    }
}

/// Base64-encode a payment payload for the `X-PAYMENT` header.
pub fn encode_payment(payload: &PaymentPayload) -> Result<String, X402Error> {
    let json = serde_json::to_vec(payload)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(json))
}

/// Decode a payment payload from the `X-PAYMENT` header.
pub fn decode_payment(encoded: &str) -> Result<PaymentPayload, X402Error> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| X402Error::InvalidPayment(format!("invalid base64: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| X402Error::InvalidPayment(format!("invalid JSON: {e}")))
}

/// Base64-encode a settlement result for the `X-PAYMENT-RESPONSE` header.
pub fn encode_settlement(settle: &SettleResponse) -> Result<String, X402Error> {
    let json = serde_json::to_vec(settle)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(json))
}

/// Decode an `X-PAYMENT-RESPONSE` header, accepting base64 or plain JSON.
pub fn decode_settlement(value: &str) -> Option<SettleResponse> {
    base64::engine::general_purpose::STANDARD
        .decode(value)
        .ok()
        .and_then(|bytes| serde_json::from_slice::<SettleResponse>(&bytes).ok())
        .or_else(|| serde_json::from_str::<SettleResponse>(value).ok())
}
