use alloy::primitives::{Address, U256};
use std::env;
use url::Url;
use x402::{
    ChainConfig, PaymentRequirements, TokenDomain, RPC_URL, SCHEME_NAME,
    SKALE_BASE_SEPOLIA_CHAIN_ID,
};

const DEFAULT_FACILITATOR_URL: &str = "http://localhost:4022";
const DEFAULT_PORT: u16 = 4000;
const DEFAULT_PRICE_AMOUNT: &str = "10000";
const DEFAULT_MAX_TIMEOUT_SECONDS: u64 = 5000;
const DEFAULT_RATE_LIMIT_RPM: u64 = 60;

pub const REQUIREMENT_DESCRIPTION: &str = "skale random word";
pub const REQUIREMENT_MIME_TYPE: &str = "application/json";

#[derive(Clone)]
pub struct SellerConfig {
    /// Payee of every payment
    pub pay_to: Address,
    /// Payment token contract
    pub asset: Address,
    /// Randomness oracle contract
    pub oracle_contract: Address,
    /// Facilitator URL for payment verification and settlement
    pub facilitator_url: String,
    /// HMAC shared secret for facilitator auth (None = unsigned requests)
    pub hmac_secret: Option<Vec<u8>>,
    pub chain_id: u64,
    /// RPC endpoint for oracle reads
    pub rpc_url: String,
    pub port: u16,
    /// Price in the token's smallest unit
    pub price_amount: String,
    pub max_timeout_seconds: u64,
    /// EIP-712 domain hints advertised to buyers in `extra`
    pub token_name: Option<String>,
    pub token_version: Option<String>,
    /// Rate limit requests per minute per IP
    pub rate_limit_rpm: u64,
    /// Bearer token required for /metrics
    pub metrics_token: Option<String>,
    /// Serve /metrics without a token when none is configured
    pub public_metrics: bool,
}

impl std::fmt::Debug for SellerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SellerConfig")
            .field("pay_to", &self.pay_to)
            .field("asset", &self.asset)
            .field("oracle_contract", &self.oracle_contract)
            .field("facilitator_url", &self.facilitator_url)
            .field(
                "hmac_secret",
                &self.hmac_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("chain_id", &self.chain_id)
            .field("rpc_url", &self.rpc_url)
            .field("port", &self.port)
            .field("price_amount", &self.price_amount)
            .field("max_timeout_seconds", &self.max_timeout_seconds)
            .field("token_name", &self.token_name)
            .field("token_version", &self.token_version)
            .field("rate_limit_rpm", &self.rate_limit_rpm)
            .field(
                "metrics_token",
                &self.metrics_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("public_metrics", &self.public_metrics)
            .finish()
    }
}

impl SellerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let address = |key: &'static str| -> Result<Address, ConfigError> {
            let raw = var(key).ok_or(ConfigError::MissingRequired(key))?;
            raw.parse().map_err(|_| ConfigError::InvalidAddress(raw))
        };

        // Required addresses
        let pay_to = address("RECEIVING_ADDRESS")?;
        let asset = address("TOKEN_PAYMENT_ADDRESS")?;
        let oracle_contract = address("SKALE_RANDOM_CONTRACT_ADDRESS")?;

        let facilitator_url = var("FACILITATOR_URL")
            .unwrap_or_else(|| DEFAULT_FACILITATOR_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Url::parse(&facilitator_url)
            .map_err(|_| ConfigError::InvalidUrl(facilitator_url.clone()))?;

        let hmac_secret = var("FACILITATOR_SHARED_SECRET").map(String::into_bytes);

        let chain_id = match var("NETWORK_CHAIN_ID") {
            Some(s) => s
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("NETWORK_CHAIN_ID", s))?,
            None => SKALE_BASE_SEPOLIA_CHAIN_ID,
        };

        let rpc_url = var("SKALE_RPC_URL").unwrap_or_else(|| RPC_URL.to_string());
        Url::parse(&rpc_url).map_err(|_| ConfigError::InvalidUrl(rpc_url.clone()))?;

        let port = var("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let price_amount = var("PRICE_AMOUNT").unwrap_or_else(|| DEFAULT_PRICE_AMOUNT.to_string());
        if price_amount.parse::<U256>().is_err() || !price_amount.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ConfigError::InvalidNumber("PRICE_AMOUNT", price_amount));
        }

        let max_timeout_seconds = match var("MAX_TIMEOUT_SECONDS") {
            Some(s) => s
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("MAX_TIMEOUT_SECONDS", s))?,
            None => DEFAULT_MAX_TIMEOUT_SECONDS,
        };

        let token_name = var("PAYMENT_TOKEN_NAME");
        let token_version = var("PAYMENT_TOKEN_VERSION");

        let rate_limit_rpm = var("RATE_LIMIT_RPM")
            .and_then(|s| s.parse().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_RATE_LIMIT_RPM);

        let metrics_token = var("METRICS_TOKEN");
        let public_metrics = var("X402_PUBLIC_METRICS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        if hmac_secret.is_none() {
            tracing::warn!("FACILITATOR_SHARED_SECRET not set, facilitator requests are unsigned");
        }
        if token_name.is_none() {
            tracing::warn!(
                "PAYMENT_TOKEN_NAME not set, buyers must know the token's EIP-712 domain"
            );
        }

        Ok(Self {
            pay_to,
            asset,
            oracle_contract,
            facilitator_url,
            hmac_secret,
            chain_id,
            rpc_url,
            port,
            price_amount,
            max_timeout_seconds,
            token_name,
            token_version,
            rate_limit_rpm,
            metrics_token,
            public_metrics,
        })
    }

    pub fn chain_config(&self) -> ChainConfig {
        ChainConfig::for_chain_id(self.chain_id).with_rpc_url(self.rpc_url.clone())
    }

    /// The requirement advertised for `resource`. Built once at startup.
    pub fn payment_requirements(&self, resource: &str) -> PaymentRequirements {
        PaymentRequirements {
            scheme: SCHEME_NAME.to_string(),
            network: self.chain_config().network,
            max_amount_required: self.price_amount.clone(),
            max_timeout_seconds: self.max_timeout_seconds,
            pay_to: self.pay_to,
            asset: self.asset,
            description: REQUIREMENT_DESCRIPTION.to_string(),
            mime_type: REQUIREMENT_MIME_TYPE.to_string(),
            resource: Some(resource.to_string()),
            extra: self.token_name.clone().map(|name| TokenDomain {
                name,
                version: self.token_version.clone(),
            }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid number for {0}: {1}")]
    InvalidNumber(&'static str, String),
}
