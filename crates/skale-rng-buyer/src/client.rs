use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::{json, Value};
use x402::codec::{decode_body, encode_request_body, error_message, ResponseFormat};
use x402::{
    ChainConfig, Decoded, OutboundRequest, RandomWordResponse, ReqwestTransport, Transport,
    TransportResponse, WordLength, X402Error,
};

use crate::config::BuyerConfig;
use crate::payment_transport::PaymentTransport;
use crate::scheme_client::ExactEvmSchemeClient;

/// Path of the paid endpoint on the seller.
pub const RANDOM_WORD_PATH: &str = "/tools/skale-rng/random-word";

const ACCEPT_FORMATS: &str = "application/json, text/event-stream";

/// Client for the seller's paid endpoint, layered on any [`Transport`].
pub struct RandomWordClient<T> {
    transport: T,
    base_url: String,
}

/// The production stack: reqwest underneath, payment attachment on top.
pub type PaidRandomWordClient =
    RandomWordClient<PaymentTransport<ReqwestTransport, ExactEvmSchemeClient>>;

impl PaidRandomWordClient {
    /// Wire a paying client from configuration.
    pub fn initialize(config: &BuyerConfig) -> Result<Self, X402Error> {
        let scheme = ExactEvmSchemeClient::with_chain_config(
            config.signer.clone(),
            ChainConfig::for_chain_id(config.chain_id),
        )
        .with_token_domain(
            config.payment_token_name.clone(),
            config.payment_token_version.clone(),
        );
        let transport = PaymentTransport::new(ReqwestTransport::new()?, scheme)
            .with_asset(config.payment_token_address);

        tracing::info!(
            payer = %config.signer.address(),
            seller = %config.seller_base_url,
            chain_id = config.chain_id,
            "random word client initialized"
        );
        Ok(Self::new(transport, config.seller_base_url.clone()))
    }
}

impl<T: Transport> RandomWordClient<T> {
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body to `path`, paying if asked to.
    pub async fn post_with_payment(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<TransportResponse, X402Error> {
        let request = OutboundRequest::post(
            format!("{}{path}", self.base_url),
            encode_request_body(body)?,
        )
        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .header(ACCEPT, HeaderValue::from_static(ACCEPT_FORMATS));

        self.transport.send(request).await
    }

    /// Fetch one random word of the given length.
    pub async fn random_word(
        &self,
        word_length: WordLength,
    ) -> Result<RandomWordResponse, X402Error> {
        let resp = self
            .post_with_payment(RANDOM_WORD_PATH, &json!({ "wordLength": word_length.get() }))
            .await?;

        if !resp.status.is_success() {
            let status = resp.status.as_u16();
            return Err(X402Error::UpstreamError {
                status: Some(status),
                message: error_message(status, &resp.body),
            });
        }

        let format = ResponseFormat::from_content_type(resp.content_type());
        match decode_body::<RandomWordResponse>(format, &resp.body)? {
            Decoded::Structured(word) => Ok(word),
            Decoded::Text(text) => Err(X402Error::FormatError(format!(
                "unexpected response format: {text}"
            ))),
        }
    }

    /// Validate an untyped `wordLength` locally, then fetch.
    pub async fn random_word_from_json(
        &self,
        word_length: Option<&Value>,
    ) -> Result<RandomWordResponse, X402Error> {
        let word_length = WordLength::from_json(word_length)?;
        self.random_word(word_length).await
    }
}
