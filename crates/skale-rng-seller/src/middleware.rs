//! Payment gate for paid endpoints.
//!
//! A paid handler calls [`require_payment`] first. The paid work runs only
//! once the facilitator has accepted the proof, and [`settle_payment`] is
//! called only after the work succeeded.

use actix_web::{HttpRequest, HttpResponse};
use x402::{
    decode_payment, encode_settlement, Facilitator, PaymentPayload, PaymentRequiredBody,
    PaymentRequirements, SettleResponse, PAYMENT_HEADER,
};

use crate::metrics::{record_request, PAYMENT_ATTEMPTS};

/// Build the 402 response carrying the endpoint's requirement.
pub fn payment_required_response(
    requirements: &PaymentRequirements,
    error: Option<&str>,
) -> HttpResponse {
    let mut body = PaymentRequiredBody::new(requirements.clone());
    if let Some(e) = error {
        body = body.with_error(e);
    }
    HttpResponse::PaymentRequired().json(body)
}

/// Read the proof from `X-PAYMENT`, if present.
pub fn extract_payment(req: &HttpRequest) -> Option<Result<PaymentPayload, x402::X402Error>> {
    req.headers()
        .get(PAYMENT_HEADER)
        .map(|v| match v.to_str() {
            Ok(s) => decode_payment(s),
            Err(_) => Err(x402::X402Error::InvalidPayment(
                "header is not ASCII".to_string(),
            )),
        })
}

fn endpoint_label(req: &HttpRequest) -> String {
    // Matched route pattern, not the raw path, to keep label cardinality bounded.
    req.match_pattern().unwrap_or_else(|| "unknown".to_string())
}

/// Check the proof and verify it with the facilitator.
///
/// Returns the verified payload, or the 402 response to send back.
pub async fn require_payment<F: Facilitator>(
    req: &HttpRequest,
    requirements: &PaymentRequirements,
    facilitator: &F,
) -> Result<PaymentPayload, HttpResponse> {
    let endpoint = endpoint_label(req);

    let payload = match extract_payment(req) {
        None => {
            record_request(&endpoint, 402);
            return Err(payment_required_response(
                requirements,
                Some("X-PAYMENT header is required"),
            ));
        }
        Some(Err(e)) => {
            tracing::warn!(error = %e, "invalid payment header");
            PAYMENT_ATTEMPTS.with_label_values(&["malformed"]).inc();
            record_request(&endpoint, 402);
            return Err(payment_required_response(
                requirements,
                Some("invalid payment header"),
            ));
        }
        Some(Ok(p)) => p,
    };

    if !payload.matches(requirements) {
        tracing::warn!(
            scheme = %payload.scheme,
            network = %payload.network,
            "payment for another scheme or network"
        );
        PAYMENT_ATTEMPTS.with_label_values(&["mismatch"]).inc();
        record_request(&endpoint, 402);
        return Err(payment_required_response(
            requirements,
            Some("payment scheme or network mismatch"),
        ));
    }

    let payer = payload.payload.authorization.from;
    tracing::info!(
        payer = %payer,
        network = %payload.network,
        nonce = %format!("{:.8}", payload.payload.authorization.nonce),
        "payment attempt"
    );

    match facilitator.verify(&payload, requirements).await {
        Ok(v) if v.is_valid => {
            PAYMENT_ATTEMPTS.with_label_values(&["verified"]).inc();
            Ok(payload)
        }
        Ok(v) => {
            let reason = v
                .invalid_reason
                .unwrap_or_else(|| "payment verification failed".to_string());
            tracing::warn!(payer = %payer, reason = %reason, "payment rejected");
            PAYMENT_ATTEMPTS.with_label_values(&["rejected"]).inc();
            record_request(&endpoint, 402);
            Err(payment_required_response(requirements, Some(&reason)))
        }
        Err(e) => {
            tracing::error!(payer = %payer, error = %e, "facilitator verify failed");
            PAYMENT_ATTEMPTS.with_label_values(&["error"]).inc();
            record_request(&endpoint, 402);
            Err(payment_required_response(
                requirements,
                Some("payment verification failed"),
            ))
        }
    }
}

/// Settle a verified payment after the paid work succeeded.
pub async fn settle_payment<F: Facilitator>(
    req: &HttpRequest,
    payload: &PaymentPayload,
    requirements: &PaymentRequirements,
    facilitator: &F,
) -> Result<SettleResponse, HttpResponse> {
    let endpoint = endpoint_label(req);
    let payer = payload.payload.authorization.from;

    match facilitator.settle(payload, requirements).await {
        Ok(s) if s.success => {
            PAYMENT_ATTEMPTS.with_label_values(&["settled"]).inc();
            tracing::info!(
                payer = %payer,
                transaction = s.transaction.as_deref().unwrap_or("-"),
                network = %s.network,
                "payment settled"
            );
            Ok(s)
        }
        Ok(s) => {
            let reason = s
                .error_reason
                .unwrap_or_else(|| "payment settlement failed".to_string());
            tracing::warn!(payer = %payer, reason = %reason, "settlement rejected");
            PAYMENT_ATTEMPTS.with_label_values(&["settle_rejected"]).inc();
            record_request(&endpoint, 402);
            Err(payment_required_response(requirements, Some(&reason)))
        }
        Err(e) => {
            tracing::error!(payer = %payer, error = %e, "facilitator settle failed");
            PAYMENT_ATTEMPTS.with_label_values(&["settle_error"]).inc();
            record_request(&endpoint, 402);
            Err(payment_required_response(
                requirements,
                Some("payment settlement failed"),
            ))
        }
    }
}

/// Value of the `X-PAYMENT-RESPONSE` header.
pub fn payment_response_header(settle: &SettleResponse) -> Option<String> {
    match encode_settlement(settle) {
        Ok(encoded) => Some(encoded),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode settlement header");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use alloy::primitives::{Address, FixedBytes};
    use x402::{decode_settlement, encode_payment, ExactEvmAuthorization, ExactEvmPayload};

    fn requirements() -> PaymentRequirements {
        PaymentRequirements {
            scheme: "exact".to_string(),
            network: "eip155:324705682".to_string(),
            max_amount_required: "10000".to_string(),
            max_timeout_seconds: 5000,
            pay_to: Address::repeat_byte(0x11),
            asset: Address::repeat_byte(0x22),
            description: "skale random word".to_string(),
            mime_type: "application/json".to_string(),
            resource: None,
            extra: None,
        }
    }

    fn payload() -> PaymentPayload {
        PaymentPayload {
            x402_version: 1,
            scheme: "exact".to_string(),
            network: "eip155:324705682".to_string(),
            payload: ExactEvmPayload {
                signature: "0xdead".to_string(),
                authorization: ExactEvmAuthorization {
                    from: Address::ZERO,
                    to: Address::repeat_byte(0x11),
                    value: "10000".to_string(),
                    valid_after: "0".to_string(),
                    valid_before: "9999999999".to_string(),
                    nonce: FixedBytes::ZERO,
                },
            },
        }
    }

    #[test]
    fn test_extract_missing_header() {
        let req = TestRequest::default().to_http_request();
        assert!(extract_payment(&req).is_none());
    }

    #[test]
    fn test_extract_valid_header() {
        let req = TestRequest::default()
            .insert_header((PAYMENT_HEADER, encode_payment(&payload()).unwrap()))
            .to_http_request();
        let decoded = extract_payment(&req).unwrap().unwrap();
        assert_eq!(decoded, payload());
    }

    #[test]
    fn test_extract_garbage_header() {
        let req = TestRequest::default()
            .insert_header((PAYMENT_HEADER, "not-valid-base64!!!"))
            .to_http_request();
        assert!(extract_payment(&req).unwrap().is_err());
    }

    #[actix_rt::test]
    async fn test_payment_required_response_body() {
        let resp = payment_required_response(&requirements(), Some("nope"));
        assert_eq!(resp.status(), 402);
        let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let body: PaymentRequiredBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.x402_version, 1);
        assert_eq!(body.error.as_deref(), Some("nope"));
        assert_eq!(body.accepts, vec![requirements()]);
    }

    #[test]
    fn test_payment_response_header_decodes() {
        let settle = SettleResponse {
            success: true,
            error_reason: None,
            payer: Some(Address::ZERO),
            transaction: Some("0xabc".to_string()),
            network: "eip155:324705682".to_string(),
        };
        let header = payment_response_header(&settle).unwrap();
        assert_eq!(decode_settlement(&header), Some(settle));
    }
}
