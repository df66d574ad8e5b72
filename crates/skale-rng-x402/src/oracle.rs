//! Client for the SKALE randomness contract.

use std::time::Duration;

use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use serde::{Deserialize, Serialize};

use crate::validation::WordLength;
use crate::{SkaleRng, X402Error, SKALE_BASE_SEPOLIA_NAME};

const RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Successful body of the paid random-word endpoint.
///
/// Integers travel as decimal strings; `randomValue` can exceed any JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomWordResponse {
    pub network: String,
    /// Passed through as text; buyers do not re-check it as an address.
    pub contract_address: String,
    pub rpc_url: String,
    pub word_length: String,
    pub random_value: String,
}

impl RandomWordResponse {
    pub fn new<O: RandomnessOracle + ?Sized>(
        oracle: &O,
        word_length: WordLength,
        random_value: U256,
    ) -> Self {
        Self {
            network: SKALE_BASE_SEPOLIA_NAME.to_string(),
            contract_address: oracle.contract_address().to_string(),
            rpc_url: oracle.rpc_url().to_string(),
            word_length: word_length.to_string(),
            random_value: random_value.to_string(),
        }
    }
}

/// Source of random words. Failures are reported as [`X402Error::UpstreamError`].
pub trait RandomnessOracle: Send + Sync {
    fn random_word(
        &self,
        word_length: WordLength,
    ) -> impl std::future::Future<Output = Result<U256, X402Error>> + Send;

    fn contract_address(&self) -> Address;

    fn rpc_url(&self) -> &str;
}

/// Calls `getRandomWord(uint256)` on the oracle contract.
pub struct SkaleRngOracle<P> {
    provider: P,
    contract: Address,
    rpc_url: String,
}

impl<P: Provider> SkaleRngOracle<P> {
    pub fn new(provider: P, contract: Address, rpc_url: impl Into<String>) -> Self {
        Self {
            provider,
            contract,
            rpc_url: rpc_url.into(),
        }
    }
}

impl SkaleRngOracle<DynProvider> {
    /// Read-only HTTP provider for `rpc_url`.
    pub fn connect_http(rpc_url: &str, contract: Address) -> Result<Self, X402Error> {
        let url = rpc_url
            .parse()
            .map_err(|e| X402Error::ConfigError(format!("invalid RPC URL '{rpc_url}': {e}")))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();
        Ok(Self::new(provider, contract, rpc_url))
    }
}

impl<P: Provider> RandomnessOracle for SkaleRngOracle<P> {
    async fn random_word(&self, word_length: WordLength) -> Result<U256, X402Error> {
        let contract = SkaleRng::new(self.contract, &self.provider);
        let value = tokio::time::timeout(
            RPC_TIMEOUT,
            contract.getRandomWord(word_length.as_u256()).call(),
        )
        .await
        .map_err(|_| X402Error::upstream("getRandomWord timed out after 30s"))?
        .map_err(|e| X402Error::upstream(format!("getRandomWord failed: {e}")))?;

        tracing::debug!(
            contract = %self.contract,
            word_length = %word_length,
            "random word fetched"
        );
        Ok(value)
    }

    fn contract_address(&self) -> Address {
        self.contract
    }

    fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}
