/// SKALE Base Sepolia testnet chain ID.
pub const SKALE_BASE_SEPOLIA_CHAIN_ID: u64 = 324_705_682;

/// CAIP-2 network identifier for SKALE Base Sepolia.
pub const SKALE_BASE_SEPOLIA_NETWORK: &str = "eip155:324705682";

/// Human-readable network name reported in random word responses.
pub const SKALE_BASE_SEPOLIA_NAME: &str = "skale-base-sepolia";

/// Default RPC endpoint for SKALE Base Sepolia.
pub const RPC_URL: &str = "https://base-sepolia-testnet.skalenodes.com/v1/jubilant-horrible-ancha";

/// x402 scheme name for EIP-3009 `transferWithAuthorization` payments.
pub const SCHEME_NAME: &str = "exact";

/// x402 protocol version spoken by both sides.
pub const X402_VERSION: u32 = 1;

/// Request header carrying the base64 payment payload.
pub const PAYMENT_HEADER: &str = "X-PAYMENT";

/// Response header carrying the base64 settlement result.
pub const PAYMENT_RESPONSE_HEADER: &str = "X-PAYMENT-RESPONSE";

/// Default EIP-712 domain version for payment tokens that do not advertise one.
pub const DEFAULT_TOKEN_VERSION: &str = "1";

/// Build the CAIP-2 identifier for an EVM chain ID.
pub fn caip2_network(chain_id: u64) -> String {
    format!("eip155:{chain_id}")
}

/// Runtime chain configuration. Decouples signing and oracle calls from
/// compile-time constants so any EVM chain ID can be targeted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub network: String,
    pub rpc_url: String,
}

impl ChainConfig {
    /// Chain config for an arbitrary chain ID, keeping the SKALE defaults for
    /// everything that is not derived from the ID.
    pub fn for_chain_id(chain_id: u64) -> Self {
        Self {
            chain_id,
            network: caip2_network(chain_id),
            ..Self::default()
        }
    }

    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }
}

impl Default for ChainConfig {
    /// Defaults to SKALE Base Sepolia.
    fn default() -> Self {
        Self {
            chain_id: SKALE_BASE_SEPOLIA_CHAIN_ID,
            network: SKALE_BASE_SEPOLIA_NETWORK.to_string(),
            rpc_url: RPC_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_network_matches_chain_id() {
        let config = ChainConfig::default();
        assert_eq!(config.network, caip2_network(config.chain_id));
    }

    #[test]
    fn test_for_chain_id_derives_network() {
        let config = ChainConfig::for_chain_id(84532).with_rpc_url("http://localhost:8545");
        assert_eq!(config.network, "eip155:84532");
        assert_eq!(config.rpc_url, "http://localhost:8545");
        assert_eq!(ChainConfig::default().rpc_url, RPC_URL);
    }
}
