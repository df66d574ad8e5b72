use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use x402::{
    eip712::{encode_signature_hex, random_nonce, signing_hash, token_domain},
    ChainConfig, ExactEvmAuthorization, ExactEvmPayload, PaymentPayload, PaymentRequirements,
    SchemeClient, TransferWithAuthorization, X402Error, DEFAULT_TOKEN_VERSION, SCHEME_NAME,
};

/// Buyer side of the `exact` EVM scheme: signs EIP-3009
/// `TransferWithAuthorization` messages for the amount the seller asks.
///
/// The token's EIP-712 name and version come from the requirement's
/// `extra` field when the seller advertises them, otherwise from local
/// configuration.
pub struct ExactEvmSchemeClient {
    signer: PrivateKeySigner,
    chain: ChainConfig,
    token_name: Option<String>,
    token_version: String,
}

impl ExactEvmSchemeClient {
    /// Create a client with SKALE Base Sepolia defaults.
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self::with_chain_config(signer, ChainConfig::default())
    }

    pub fn with_chain_config(signer: PrivateKeySigner, chain: ChainConfig) -> Self {
        Self {
            signer,
            chain,
            token_name: None,
            token_version: DEFAULT_TOKEN_VERSION.to_string(),
        }
    }

    /// Fallback EIP-712 domain for tokens whose seller does not advertise one.
    pub fn with_token_domain(mut self, name: Option<String>, version: impl Into<String>) -> Self {
        self.token_name = name;
        self.token_version = version.into();
        self
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    fn domain_fields(&self, requirements: &PaymentRequirements) -> Result<(String, String), X402Error> {
        let extra = requirements.extra.as_ref();
        let name = extra
            .map(|d| d.name.clone())
            .or_else(|| self.token_name.clone())
            .ok_or_else(|| {
                X402Error::ConfigError(
                    "payment token name unknown: seller sent no extra.name and PAYMENT_TOKEN_NAME is unset"
                        .to_string(),
                )
            })?;
        let version = extra
            .and_then(|d| d.version.clone())
            .unwrap_or_else(|| self.token_version.clone());
        Ok((name, version))
    }
}

impl SchemeClient for ExactEvmSchemeClient {
    fn network(&self) -> &str {
        &self.chain.network
    }

    async fn create_payment_payload(
        &self,
        x402_version: u32,
        requirements: &PaymentRequirements,
    ) -> Result<PaymentPayload, X402Error> {
        if requirements.scheme != SCHEME_NAME {
            return Err(X402Error::UnsupportedScheme(requirements.scheme.clone()));
        }

        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| X402Error::ConfigError(format!("system time error: {e}")))?
            .as_secs();

        let valid_after = now.saturating_sub(60);
        let valid_before = now.saturating_add(requirements.max_timeout_seconds);
        let nonce = random_nonce();

        let value = requirements
            .max_amount_required
            .parse::<U256>()
            .map_err(|e| X402Error::InvalidPayment(format!("invalid amount: {e}")))?;

        let auth = TransferWithAuthorization {
            from: self.signer.address(),
            to: requirements.pay_to,
            value,
            validAfter: U256::from(valid_after),
            validBefore: U256::from(valid_before),
            nonce,
        };

        let (name, version) = self.domain_fields(requirements)?;
        let domain = token_domain(&name, &version, self.chain.chain_id, requirements.asset);
        let sig = self
            .signer
            .sign_hash_sync(&signing_hash(&auth, &domain))
            .map_err(|e| X402Error::SignatureError(format!("signing failed: {e}")))?;

        tracing::debug!(
            payer = %self.signer.address(),
            pay_to = %requirements.pay_to,
            amount = %requirements.max_amount_required,
            network = %requirements.network,
            "signed payment authorization"
        );

        Ok(PaymentPayload {
            x402_version,
            scheme: requirements.scheme.clone(),
            network: requirements.network.clone(),
            payload: ExactEvmPayload {
                signature: encode_signature_hex(&sig),
                authorization: ExactEvmAuthorization {
                    from: self.signer.address(),
                    to: requirements.pay_to,
                    value: requirements.max_amount_required.clone(),
                    valid_after: valid_after.to_string(),
                    valid_before: valid_before.to_string(),
                    nonce,
                },
            },
        })
    }
}
