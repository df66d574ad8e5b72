use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use std::env;
use url::Url;
use x402::{DEFAULT_TOKEN_VERSION, SKALE_BASE_SEPOLIA_CHAIN_ID};

const DEFAULT_SELLER_BASE_URL: &str = "http://localhost:4000";
const DEFAULT_PORT: u16 = 3000;

#[derive(Clone)]
pub struct BuyerConfig {
    /// Wallet that signs payment authorizations
    pub signer: PrivateKeySigner,
    /// Base URL of the seller service
    pub seller_base_url: String,
    /// EVM chain ID used in the EIP-712 domain
    pub chain_id: u64,
    /// Only pay with this token when set
    pub payment_token_address: Option<Address>,
    /// EIP-712 token name, used when the seller does not advertise one
    pub payment_token_name: Option<String>,
    pub payment_token_version: String,
    /// Port of the local façade
    pub port: u16,
}

impl std::fmt::Debug for BuyerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuyerConfig")
            .field("signer", &"[REDACTED]")
            .field("address", &self.signer.address())
            .field("seller_base_url", &self.seller_base_url)
            .field("chain_id", &self.chain_id)
            .field("payment_token_address", &self.payment_token_address)
            .field("payment_token_name", &self.payment_token_name)
            .field("payment_token_version", &self.payment_token_version)
            .field("port", &self.port)
            .finish()
    }
}

impl BuyerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Required: signing key
        let signer: PrivateKeySigner = var("PRIVATE_KEY")
            .ok_or(ConfigError::MissingRequired("PRIVATE_KEY"))?
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPrivateKey)?;

        let seller_base_url = var("SELLER_BASE_URL")
            .unwrap_or_else(|| DEFAULT_SELLER_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Url::parse(&seller_base_url)
            .map_err(|_| ConfigError::InvalidUrl(seller_base_url.clone()))?;

        let chain_id = match var("NETWORK_CHAIN_ID") {
            Some(s) => s
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("NETWORK_CHAIN_ID", s))?,
            None => SKALE_BASE_SEPOLIA_CHAIN_ID,
        };

        let payment_token_address = var("PAYMENT_TOKEN_ADDRESS")
            .map(|s| {
                s.trim()
                    .parse::<Address>()
                    .map_err(|_| ConfigError::InvalidAddress(s))
            })
            .transpose()?;

        let payment_token_name = var("PAYMENT_TOKEN_NAME");
        let payment_token_version =
            var("PAYMENT_TOKEN_VERSION").unwrap_or_else(|| DEFAULT_TOKEN_VERSION.to_string());

        let port = var("PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            signer,
            seller_base_url,
            chain_id,
            payment_token_address,
            payment_token_name,
            payment_token_version,
            port,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),

    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid number for {0}: {1}")]
    InvalidNumber(&'static str, String),
}
