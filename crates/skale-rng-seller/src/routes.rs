use actix_web::http::header::{ACCEPT, CONTENT_TYPE};
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use serde_json::{json, Value};
use x402::codec::{encode_event_stream, ResponseFormat};
use x402::security::constant_time_eq;
use x402::{Facilitator, RandomWordResponse, RandomnessOracle, WordLength, PAYMENT_RESPONSE_HEADER};

use crate::error::SellerError;
use crate::metrics::{metrics_output, record_request, ORACLE_CALLS};
use crate::middleware::{payment_response_header, require_payment, settle_payment};
use crate::state::AppState;

/// Path of the paid random-word endpoint.
pub const RANDOM_WORD_PATH: &str = "/tools/skale-rng/random-word";

pub const SERVICE_NAME: &str = "Simple SKALE RNG";
pub const SERVICE_DESCRIPTION: &str = "Paid SKALE RNG service on SKALE Base Sepolia testnet";

/// Register all seller routes.
pub fn configure<F, O>(cfg: &mut web::ServiceConfig)
where
    F: Facilitator + 'static,
    O: RandomnessOracle + 'static,
{
    cfg.route("/health", web::get().to(health))
        .route("/info", web::get().to(info))
        .route("/metrics", web::get().to(metrics_endpoint::<F, O>))
        .route(RANDOM_WORD_PATH, web::post().to(random_word::<F, O>));
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "healthy" }))
}

pub async fn info() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "name": SERVICE_NAME,
        "description": SERVICE_DESCRIPTION,
        "endpoints": [RANDOM_WORD_PATH],
    }))
}

pub async fn metrics_endpoint<F, O>(
    req: HttpRequest,
    state: web::Data<AppState<F, O>>,
) -> HttpResponse {
    match &state.config.metrics_token {
        Some(expected) => {
            let authorized = req
                .headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|token| constant_time_eq(token.as_bytes(), expected.as_bytes()))
                .unwrap_or(false);

            if !authorized {
                return HttpResponse::Unauthorized().json(json!({
                    "error": "Valid Bearer token required for /metrics"
                }));
            }
        }
        None => {
            if !state.config.public_metrics {
                return HttpResponse::Forbidden().json(json!({
                    "error": "Set METRICS_TOKEN or X402_PUBLIC_METRICS=true to access /metrics"
                }));
            }
        }
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics_output())
}

fn fail(err: SellerError) -> HttpResponse {
    record_request(RANDOM_WORD_PATH, err.status_code().as_u16());
    err.error_response()
}

/// POST /tools/skale-rng/random-word
pub async fn random_word<F, O>(
    req: HttpRequest,
    state: web::Data<AppState<F, O>>,
    body: web::Bytes,
) -> HttpResponse
where
    F: Facilitator,
    O: RandomnessOracle,
{
    let payload =
        match require_payment(&req, &state.requirements, state.facilitator.as_ref()).await {
            Ok(p) => p,
            Err(resp) => return resp,
        };

    // An unparsable body is treated as empty.
    let request: Value = serde_json::from_slice(&body).unwrap_or_else(|_| json!({}));
    let word_length = match WordLength::from_json(request.get("wordLength")) {
        Ok(wl) => wl,
        Err(e) => {
            tracing::warn!(error = %e, "invalid wordLength");
            return fail(e.into());
        }
    };

    let random_value = match state.oracle.random_word(word_length).await {
        Ok(v) => {
            ORACLE_CALLS.with_label_values(&["success"]).inc();
            v
        }
        Err(e) => {
            ORACLE_CALLS.with_label_values(&["error"]).inc();
            return fail(e.into());
        }
    };
    let result = RandomWordResponse::new(state.oracle.as_ref(), word_length, random_value);

    let settle =
        match settle_payment(&req, &payload, &state.requirements, state.facilitator.as_ref())
            .await
        {
            Ok(s) => s,
            Err(resp) => return resp,
        };

    let accept = req.headers().get(ACCEPT).and_then(|v| v.to_str().ok());
    let stream = match ResponseFormat::negotiate(accept) {
        ResponseFormat::Json => None,
        ResponseFormat::EventStream => match encode_event_stream(Some(&settle), &result) {
            Ok(stream) => Some(stream),
            Err(e) => return fail(e.into()),
        },
    };

    let mut resp = HttpResponse::Ok();
    if let Some(header) = payment_response_header(&settle) {
        resp.insert_header((PAYMENT_RESPONSE_HEADER, header));
    }
    record_request(RANDOM_WORD_PATH, 200);

    match stream {
        None => resp.json(result),
        Some(stream) => resp
            .insert_header((CONTENT_TYPE, ResponseFormat::EventStream.content_type()))
            .insert_header(("Cache-Control", "no-cache"))
            .body(stream),
    }
}
