use alloy::primitives::Address;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::StatusCode;
use x402::codec::error_message;
use x402::{
    decode_settlement, encode_payment, OutboundRequest, PaymentRequiredBody, SchemeClient,
    Transport, TransportResponse, X402Error, PAYMENT_HEADER, PAYMENT_RESPONSE_HEADER,
    SCHEME_NAME,
};

/// Transport layer that answers HTTP 402 with a signed payment.
///
/// The request goes out once without payment. On a 402 the payment
/// requirements are parsed, a proof is signed via the [`SchemeClient`], and
/// the same request is resent exactly once with an `X-PAYMENT` header. A
/// second 402 is terminal.
pub struct PaymentTransport<T, S> {
    inner: T,
    scheme: S,
    asset: Option<Address>,
}

impl<T: Transport, S: SchemeClient> PaymentTransport<T, S> {
    pub fn new(inner: T, scheme: S) -> Self {
        Self {
            inner,
            scheme,
            asset: None,
        }
    }

    /// Only pay with this token.
    pub fn with_asset(mut self, asset: Option<Address>) -> Self {
        self.asset = asset;
        self
    }

    pub fn scheme(&self) -> &S {
        &self.scheme
    }
}

impl<T: Transport, S: SchemeClient> Transport for PaymentTransport<T, S> {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, X402Error> {
        let resp = self.inner.send(request.clone()).await?;
        if resp.status != StatusCode::PAYMENT_REQUIRED {
            return Ok(resp);
        }

        let body: PaymentRequiredBody = serde_json::from_slice(&resp.body).map_err(|e| {
            X402Error::PaymentRequired(format!(
                "unreadable 402 body ({e}): {}",
                error_message(402, &resp.body)
            ))
        })?;

        let requirements = body
            .select(SCHEME_NAME, self.scheme.network(), self.asset)
            .ok_or_else(|| {
                X402Error::UnsupportedScheme(format!(
                    "no '{SCHEME_NAME}' requirement for {} in {:?}",
                    self.scheme.network(),
                    body.accepts
                        .iter()
                        .map(|r| format!("{}@{}", r.scheme, r.network))
                        .collect::<Vec<_>>()
                ))
            })?;

        let payload = self
            .scheme
            .create_payment_payload(body.x402_version, requirements)
            .await?;
        let encoded = encode_payment(&payload)?;
        let header = HeaderValue::from_str(&encoded)
            .map_err(|e| X402Error::InvalidPayment(format!("invalid header value: {e}")))?;

        tracing::info!(
            url = %request.url,
            amount = %requirements.max_amount_required,
            pay_to = %requirements.pay_to,
            "402 received, retrying with payment"
        );

        let name = HeaderName::from_bytes(PAYMENT_HEADER.as_bytes())
            .map_err(|e| X402Error::InvalidPayment(format!("invalid header name: {e}")))?;
        let resp = self.inner.send(request.header(name, header)).await?;

        if resp.status == StatusCode::PAYMENT_REQUIRED {
            let message = serde_json::from_slice::<PaymentRequiredBody>(&resp.body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| error_message(402, &resp.body));
            tracing::warn!(reason = %message, "payment rejected");
            return Err(X402Error::PaymentVerificationError {
                status: 402,
                message,
            });
        }

        if let Some(settle) = resp
            .header_str(PAYMENT_RESPONSE_HEADER)
            .and_then(decode_settlement)
        {
            tracing::info!(
                success = settle.success,
                transaction = settle.transaction.as_deref().unwrap_or("-"),
                network = %settle.network,
                "payment settled"
            );
        }

        Ok(resp)
    }
}
