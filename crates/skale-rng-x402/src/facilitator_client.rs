//! HTTP client for a remote facilitator's `/verify` and `/settle` endpoints.
//!
//! When a shared secret is configured, each request body is signed with
//! HMAC-SHA256 and sent in the `X-Facilitator-Auth` header.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::error_message;
use crate::payment::{PaymentPayload, PaymentRequirements};
use crate::response::{SettleResponse, VerifyResponse};
use crate::scheme::Facilitator;
use crate::security::{compute_hmac, FACILITATOR_AUTH_HEADER};
use crate::{X402Error, X402_VERSION};

const FACILITATOR_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FacilitatorRequest<'a> {
    x402_version: u32,
    payment_payload: &'a PaymentPayload,
    payment_requirements: &'a PaymentRequirements,
}

#[derive(Clone)]
pub struct HttpFacilitator {
    client: reqwest::Client,
    base_url: String,
    hmac_secret: Option<Vec<u8>>,
}

impl HttpFacilitator {
    pub fn new(base_url: impl Into<String>) -> Result<Self, X402Error> {
        let client = reqwest::Client::builder()
            .timeout(FACILITATOR_TIMEOUT)
            .build()
            .map_err(|e| X402Error::HttpError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            hmac_secret: None,
        })
    }

    pub fn with_hmac_secret(mut self, secret: impl Into<Vec<u8>>) -> Self {
        self.hmac_secret = Some(secret.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<T, X402Error> {
        let url = format!("{}/{path}", self.base_url);
        let body = serde_json::to_vec(&FacilitatorRequest {
            x402_version: X402_VERSION,
            payment_payload: payload,
            payment_requirements: requirements,
        })?;

        let mut request = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(secret) = &self.hmac_secret {
            request = request.header(FACILITATOR_AUTH_HEADER, compute_hmac(secret, &body));
        }

        let resp = request
            .body(body)
            .send()
            .await
            .map_err(|e| X402Error::HttpError(format!("facilitator request failed: {e}")))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(X402Error::HttpError(
                "facilitator authentication failed".to_string(),
            ));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| X402Error::HttpError(format!("facilitator response read failed: {e}")))?;

        // Facilitators answer rejections with a typed body and a 4xx status.
        match serde_json::from_slice::<T>(&bytes) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(X402Error::HttpError(format!(
                "facilitator /{path} returned {}: {}",
                status.as_u16(),
                error_message(status.as_u16(), &bytes)
            ))),
            Err(e) => Err(X402Error::HttpError(format!(
                "facilitator response parse failed: {e}"
            ))),
        }
    }
}

impl Facilitator for HttpFacilitator {
    async fn verify(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse, X402Error> {
        self.post("verify", payload, requirements).await
    }

    async fn settle(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<SettleResponse, X402Error> {
        self.post("settle", payload, requirements).await
    }
}
